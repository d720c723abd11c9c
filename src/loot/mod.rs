//! Loot contract commands
//!
//! Each command marshals its arguments into the contract's argument list and
//! hands the call to a [`ContractInvoker`].

pub mod item;

pub use item::LootItem;

use crate::chain::{CallRequest, ContractInvoker, Felt, SendReceipt, Uint256};
use crate::config::Settings;
use crate::error::LootResult;

use std::path::Path;
use tracing::{debug, info};

pub const MINT: &str = "mint";
pub const GET_ITEM_BY_TOKEN_ID: &str = "getItemByTokenId";
pub const SET_ITEM_BY_ID: &str = "setItemById";

/// New metadata for `setItemById`
#[derive(Debug, Clone, PartialEq)]
pub struct ItemUpdate {
    pub item: Felt,
    pub greatness: Felt,
    pub xp: Felt,
    pub adventurer: Felt,
    pub bag: Felt,
}

impl ItemUpdate {
    pub fn to_felts(&self) -> [Felt; 5] {
        [self.item, self.greatness, self.xp, self.adventurer, self.bag]
    }
}

/// Mint a random item to the configured account
pub async fn mint_loot(
    invoker: &dyn ContractInvoker,
    settings: &Settings,
    network: &str,
) -> LootResult<SendReceipt> {
    let address = settings.user_address()?;
    let request = CallRequest::new(network, &settings.loot.contract_alias, MINT)
        .with_arguments([address]);

    info!("Minting loot item for {:#x} on {}", address, network);
    invoker.send(&settings.account.alias, &request).await
}

/// Read item metadata by token id
pub async fn get_loot(
    invoker: &dyn ContractInvoker,
    settings: &Settings,
    token_id: &Uint256,
    network: &str,
) -> LootResult<LootItem> {
    let request = CallRequest::new(network, &settings.loot.contract_alias, GET_ITEM_BY_TOKEN_ID)
        .with_arguments(token_id.to_felts());

    let response = if settings.loot.abi.is_empty() {
        invoker.call(&request).await?
    } else {
        invoker
            .proxy_call(&request, Path::new(&settings.loot.abi))
            .await?
    };
    debug!("{} returned: {}", GET_ITEM_BY_TOKEN_ID, response);

    LootItem::decode(
        GET_ITEM_BY_TOKEN_ID,
        &response,
        &settings.loot.fields,
        &settings.loot.string_fields,
    )
}

/// Overwrite item metadata
pub async fn set_loot(
    invoker: &dyn ContractInvoker,
    settings: &Settings,
    token_id: &Uint256,
    update: &ItemUpdate,
    network: &str,
) -> LootResult<SendReceipt> {
    let request = CallRequest::new(network, &settings.loot.contract_alias, SET_ITEM_BY_ID)
        .with_arguments(token_id.to_felts())
        .with_arguments(update.to_felts());

    info!("Setting loot item {} on {}", token_id, network);
    invoker.send(&settings.account.alias, &request).await
}
