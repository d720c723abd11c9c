//! Command-line surface

use crate::chain::{ContractInvoker, Felt, SendReceipt, Uint256};
use crate::config::Settings;
use crate::error::{LootError, LootResult};
use crate::loot::{self, ItemUpdate};
use crate::output::write_columns;

use clap::{ArgAction, Parser, Subcommand};
use dialoguer::Input;
use std::io::Write;

#[derive(Parser, Debug)]
#[command(
    name = "realms-loot",
    version,
    about = "Mint, read and update Realms Loot items on StarkNet"
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Mint a Random Loot Item
    #[command(name = "mint_loot")]
    MintLoot {
        /// Network to use (defaults to the configured network)
        #[arg(long)]
        network: Option<String>,
    },

    /// Get Loot Item metadata
    #[command(name = "get_loot")]
    GetLoot {
        loot_token_id: Uint256,

        #[arg(long)]
        network: Option<String>,

        /// Print the item as JSON
        #[arg(long)]
        json: bool,

        /// Entries per printed row
        #[arg(long)]
        columns: Option<usize>,
    },

    /// Set Loot Item metadata
    #[command(name = "set_loot")]
    SetLoot {
        loot_token_id: Uint256,

        #[arg(long)]
        network: Option<String>,

        /// item id
        #[arg(long)]
        item: Option<Felt>,

        /// greatness
        #[arg(long)]
        greatness: Option<Felt>,

        /// xp
        #[arg(long)]
        xp: Option<Felt>,

        /// adventurer
        #[arg(long)]
        adventurer: Option<Felt>,

        /// bag
        #[arg(long)]
        bag: Option<Felt>,
    },
}

/// Execute a parsed command, writing user-facing output to `out`
pub async fn run(
    command: Command,
    settings: &Settings,
    invoker: &dyn ContractInvoker,
    out: &mut dyn Write,
) -> LootResult<()> {
    let network_or_default =
        |network: Option<String>| network.unwrap_or_else(|| settings.default_network.clone());

    match command {
        Command::MintLoot { network } => {
            let network = network_or_default(network);
            writeln!(out, "🎲 Minting random item ...")?;
            let receipt = loot::mint_loot(invoker, settings, &network).await?;
            write_receipt(out, &receipt)?;
            writeln!(out, "🎲 Minted random item ✅")?;
        }
        Command::GetLoot {
            loot_token_id,
            network,
            json,
            columns,
        } => {
            let network = network_or_default(network);
            let item = loot::get_loot(invoker, settings, &loot_token_id, &network).await?;
            if json {
                writeln!(out, "{}", item.to_json())?;
            } else {
                writeln!(out, "{}", item.header())?;
                write_columns(
                    out,
                    &item.pretty_lines(),
                    columns.unwrap_or(settings.loot.columns),
                )?;
            }
        }
        Command::SetLoot {
            loot_token_id,
            network,
            item,
            greatness,
            xp,
            adventurer,
            bag,
        } => {
            let network = network_or_default(network);
            let update = ItemUpdate {
                item: value_or_prompt(item, "Item", prompt_felt)?,
                greatness: value_or_prompt(greatness, "Greatness", prompt_felt)?,
                xp: value_or_prompt(xp, "Xp", prompt_felt)?,
                adventurer: value_or_prompt(adventurer, "Adventurer", prompt_felt)?,
                bag: value_or_prompt(bag, "Bag", prompt_felt)?,
            };
            writeln!(out, "🗡 Setting item by id ...")?;
            let receipt =
                loot::set_loot(invoker, settings, &loot_token_id, &update, &network).await?;
            write_receipt(out, &receipt)?;
        }
    }

    Ok(())
}

fn write_receipt(out: &mut dyn Write, receipt: &SendReceipt) -> LootResult<()> {
    if let Some(ref hash) = receipt.tx_hash {
        writeln!(out, "Transaction hash: {}", hash)?;
    }
    Ok(())
}

fn value_or_prompt<F>(value: Option<Felt>, label: &str, prompt: F) -> LootResult<Felt>
where
    F: FnOnce(&str) -> LootResult<Felt>,
{
    match value {
        Some(v) => Ok(v),
        None => prompt(label),
    }
}

fn prompt_felt(label: &str) -> LootResult<Felt> {
    let text = Input::<String>::new()
        .with_prompt(label)
        .validate_with(|input: &String| input.parse::<Felt>().map(|_| ()))
        .interact_text()
        .map_err(|e| LootError::Prompt(e.to_string()))?;
    text.parse()
}
