//! Chain module - contract invocation through the StarkNet tooling
//!
//! This module provides:
//! - Felt and uint256 marshaling
//! - Contract alias resolution from nile deployment files
//! - The `ContractInvoker` seam and its nile/starknet subprocess implementation

pub mod deployments;
pub mod felt;
pub mod nile;

pub use deployments::Deployments;
pub use felt::{felt_to_str, Felt, Uint256};
pub use nile::NileInvoker;

use crate::error::LootResult;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref TX_HASH_RE: Regex =
        Regex::new(r"(?i)transaction hash:\s*(0x[0-9a-f]+)").unwrap();
}

/// A contract function invocation
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    pub network: String,
    pub contract_alias: String,
    pub function: String,
    pub arguments: Vec<Felt>,
}

impl CallRequest {
    pub fn new(network: &str, contract_alias: &str, function: &str) -> Self {
        Self {
            network: network.to_string(),
            contract_alias: contract_alias.to_string(),
            function: function.to_string(),
            arguments: Vec::new(),
        }
    }

    pub fn with_arguments(mut self, arguments: impl IntoIterator<Item = Felt>) -> Self {
        self.arguments.extend(arguments);
        self
    }

    /// Arguments rendered the way the tooling expects them on the command line
    pub fn argument_strings(&self) -> Vec<String> {
        self.arguments.iter().map(|a| a.to_string()).collect()
    }
}

/// Result of a signed invoke
#[derive(Debug, Clone, PartialEq)]
pub struct SendReceipt {
    /// Raw tool output
    pub output: String,
    /// Transaction hash, when the tool reported one
    pub tx_hash: Option<String>,
}

impl SendReceipt {
    pub fn from_output(output: String) -> Self {
        let tx_hash = TX_HASH_RE
            .captures(&output)
            .map(|caps| caps[1].to_string());
        Self { output, tx_hash }
    }
}

/// Issues calls and transactions against deployed contracts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContractInvoker: Send + Sync {
    /// Read-only call by contract alias
    async fn call(&self, request: &CallRequest) -> LootResult<String>;

    /// Read-only call through a proxy, decoded with the implementation ABI
    async fn proxy_call(&self, request: &CallRequest, abi: &Path) -> LootResult<String>;

    /// Signed invoke
    async fn send(&self, signer_alias: &str, request: &CallRequest) -> LootResult<SendReceipt>;
}
