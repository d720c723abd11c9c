//! Contract invoker backed by the `nile` and `starknet` command-line tools

use super::{CallRequest, ContractInvoker, Deployments, SendReceipt};
use crate::config::{NetworkConfig, Settings};
use crate::error::{LootError, LootResult};

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// A fully resolved tool invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

impl ToolCommand {
    fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Command line for logs and error messages
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Drives the StarkNet tooling as subprocesses
pub struct NileInvoker {
    settings: Settings,
    timeout: Duration,
}

impl NileInvoker {
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
            timeout: settings.timeout(),
        }
    }

    fn project_dir(&self) -> &Path {
        &self.settings.tooling.project_dir
    }

    /// `nile call <contract> <function> <args...> --network <network>`
    pub fn call_command(&self, request: &CallRequest) -> ToolCommand {
        ToolCommand::new(&self.settings.tooling.nile_bin)
            .arg("call")
            .arg(&request.contract_alias)
            .arg(&request.function)
            .args(request.argument_strings())
            .arg("--network")
            .arg(&request.network)
    }

    /// `nile send <signer> <contract> <function> <args...> --network <network>`
    pub fn send_command(&self, signer_alias: &str, request: &CallRequest) -> ToolCommand {
        ToolCommand::new(&self.settings.tooling.nile_bin)
            .arg("send")
            .arg(signer_alias)
            .arg(&request.contract_alias)
            .arg(&request.function)
            .args(request.argument_strings())
            .arg("--network")
            .arg(&request.network)
    }

    /// `starknet call --address <proxy> --abi <abi> --function <f> [--inputs ...]`
    pub fn proxy_call_command(
        &self,
        request: &CallRequest,
        abi: &Path,
        address: &str,
    ) -> ToolCommand {
        let mut command = ToolCommand::new(&self.settings.tooling.starknet_bin)
            .arg("call")
            .arg("--address")
            .arg(address)
            .arg("--abi")
            .arg(abi.to_string_lossy())
            .arg("--function")
            .arg(&request.function);

        let network: NetworkConfig = self.settings.network(&request.network);
        if let Some(starknet_network) = network.starknet_network {
            command
                .envs
                .push(("STARKNET_NETWORK".to_string(), starknet_network));
        } else if let Some(url) = network.feeder_gateway_url {
            command = command.arg(format!("--feeder_gateway_url={}", url));
        }

        if !request.arguments.is_empty() {
            command = command.arg("--inputs").args(request.argument_strings());
        }

        command
    }

    /// Run a tool to completion and return its trimmed stdout
    async fn run(&self, command: ToolCommand) -> LootResult<String> {
        let command_line = command.display();
        debug!("Running `{}` in {:?}", command_line, self.project_dir());

        let mut process = Command::new(&command.program);
        process
            .args(&command.args)
            .envs(command.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(self.project_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = process.spawn().map_err(|e| LootError::Invocation {
            command: command_line.clone(),
            message: format!("failed to start: {}", e),
        })?;

        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| LootError::Timeout {
                command: command_line.clone(),
                secs: self.timeout.as_secs(),
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LootError::Invocation {
                command: command_line,
                message: format!("{} ({})", stderr.trim(), output.status),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl ContractInvoker for NileInvoker {
    async fn call(&self, request: &CallRequest) -> LootResult<String> {
        self.run(self.call_command(request)).await
    }

    async fn proxy_call(&self, request: &CallRequest, abi: &Path) -> LootResult<String> {
        let deployments = Deployments::load(self.project_dir(), &request.network)?;
        if deployments.is_empty() {
            warn!(
                "No deployments recorded for {} in {:?}",
                request.network,
                self.project_dir()
            );
        }
        let proxy = deployments.resolve(&request.contract_alias)?;
        debug!(
            "Resolved {} on {} to {}",
            request.contract_alias, request.network, proxy.address
        );

        let command = self.proxy_call_command(request, abi, &proxy.address);
        self.run(command).await
    }

    async fn send(&self, signer_alias: &str, request: &CallRequest) -> LootResult<SendReceipt> {
        let output = self.run(self.send_command(signer_alias, request)).await?;
        let receipt = SendReceipt::from_output(output);
        if let Some(ref hash) = receipt.tx_hash {
            info!("{} sent to {}: {}", request.function, request.contract_alias, hash);
        }
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{Felt, Uint256};

    fn invoker() -> NileInvoker {
        NileInvoker::new(&Settings::default())
    }

    fn get_item_request(network: &str) -> CallRequest {
        CallRequest::new(network, "proxy_Loot", "getItemByTokenId")
            .with_arguments(Uint256::parse("5").unwrap().to_felts())
    }

    #[test]
    fn test_send_command() {
        let request = CallRequest::new("goerli", "proxy_Loot", "mint")
            .with_arguments([Felt::from(0xabcu128)]);
        let command = invoker().send_command("STARKNET_PRIVATE_KEY", &request);

        assert_eq!(command.program, "nile");
        assert_eq!(
            command.args,
            vec![
                "send",
                "STARKNET_PRIVATE_KEY",
                "proxy_Loot",
                "mint",
                "2748",
                "--network",
                "goerli"
            ]
        );
        assert!(command.envs.is_empty());
    }

    #[test]
    fn test_call_command() {
        let command = invoker().call_command(&get_item_request("goerli"));
        assert_eq!(
            command.display(),
            "nile call proxy_Loot getItemByTokenId 5 0 --network goerli"
        );
    }

    #[test]
    fn test_proxy_call_on_public_network_sets_env() {
        let command = invoker().proxy_call_command(
            &get_item_request("goerli"),
            Path::new("artifacts/abis/Loot.json"),
            "0x0333",
        );

        assert_eq!(command.program, "starknet");
        assert_eq!(
            command.args,
            vec![
                "call",
                "--address",
                "0x0333",
                "--abi",
                "artifacts/abis/Loot.json",
                "--function",
                "getItemByTokenId",
                "--inputs",
                "5",
                "0"
            ]
        );
        assert_eq!(
            command.envs,
            vec![("STARKNET_NETWORK".to_string(), "alpha-goerli".to_string())]
        );
    }

    #[test]
    fn test_proxy_call_on_devnet_uses_feeder_gateway() {
        let mut settings = Settings::default();
        settings.networks.insert(
            "localhost".to_string(),
            NetworkConfig {
                starknet_network: None,
                feeder_gateway_url: Some("http://127.0.0.1:5050/".to_string()),
            },
        );
        let invoker = NileInvoker::new(&settings);

        let request = CallRequest::new("localhost", "proxy_Loot", "totalSupply");
        let command = invoker.proxy_call_command(&request, Path::new("Loot.json"), "0x1");

        assert!(command.envs.is_empty());
        assert_eq!(
            command.args.last().map(String::as_str),
            Some("--feeder_gateway_url=http://127.0.0.1:5050/")
        );
        assert!(!command.args.iter().any(|a| a == "--inputs"));
    }

    #[test]
    fn test_proxy_call_on_goerli_with_devnet_only_config() {
        let settings = Settings::from_toml(
            "[networks.devnet]\nfeeder_gateway_url = \"http://127.0.0.1:5050/\"",
        )
        .unwrap();
        let invoker = NileInvoker::new(&settings);

        let command = invoker.proxy_call_command(
            &get_item_request("goerli"),
            Path::new("Loot.json"),
            "0x1",
        );
        assert_eq!(
            command.envs,
            vec![("STARKNET_NETWORK".to_string(), "alpha-goerli".to_string())]
        );
        assert!(!command.args.iter().any(|a| a.starts_with("--feeder_gateway_url")));
    }

    #[tokio::test]
    async fn test_proxy_call_unknown_alias() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.tooling.project_dir = dir.path().to_path_buf();
        let invoker = NileInvoker::new(&settings);

        let result = invoker
            .proxy_call(&get_item_request("goerli"), Path::new("Loot.json"))
            .await;
        assert!(matches!(result, Err(LootError::AliasNotFound { .. })));
    }

    #[tokio::test]
    async fn test_missing_binary_is_invocation_error() {
        let mut settings = Settings::default();
        settings.tooling.nile_bin = "realms-loot-no-such-binary".to_string();
        let invoker = NileInvoker::new(&settings);

        let result = invoker.call(&get_item_request("goerli")).await;
        match result {
            Err(LootError::Invocation { command, .. }) => {
                assert!(command.starts_with("realms-loot-no-such-binary call"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
