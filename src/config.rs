//! Configuration management for the Realms Loot CLI
//!
//! Loads configuration from a TOML file with environment variable substitution.
//! Every section has defaults so the CLI also runs without a config file.

use crate::chain::Felt;
use crate::error::{LootError, LootResult};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_ENV: &str = "REALMS_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const USER_ADDRESS_ENV: &str = "USER_ADDRESS";

lazy_static! {
    static ref ENV_VAR_RE: Regex = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_network: String,
    pub account: AccountConfig,
    pub tooling: ToolingConfig,
    pub networks: HashMap<String, NetworkConfig>,
    pub loot: LootConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Signer alias handed to nile
    pub alias: String,
    /// Caller address, as decimal or 0x-prefixed hex
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolingConfig {
    pub nile_bin: String,
    pub starknet_bin: String,
    /// Working directory for the tools; holds `<network>.deployments.txt`
    pub project_dir: PathBuf,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkConfig {
    /// Exported as STARKNET_NETWORK for direct `starknet` calls
    pub starknet_network: Option<String>,
    pub feeder_gateway_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LootConfig {
    pub contract_alias: String,
    /// Implementation ABI for proxy calls; empty disables them
    pub abi: String,
    pub fields: Vec<String>,
    pub string_fields: Vec<usize>,
    pub columns: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_network: "goerli".to_string(),
            account: AccountConfig::default(),
            tooling: ToolingConfig::default(),
            networks: default_networks(),
            loot: LootConfig::default(),
        }
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            alias: "STARKNET_PRIVATE_KEY".to_string(),
            address: None,
        }
    }
}

impl Default for ToolingConfig {
    fn default() -> Self {
        Self {
            nile_bin: "nile".to_string(),
            starknet_bin: "starknet".to_string(),
            project_dir: PathBuf::from("."),
            timeout_secs: 300,
        }
    }
}

impl Default for LootConfig {
    fn default() -> Self {
        Self {
            contract_alias: "proxy_Loot".to_string(),
            abi: "artifacts/abis/Loot.json".to_string(),
            fields: [
                "Id",
                "Slot",
                "Type",
                "Material",
                "Rank",
                "Prefix_1",
                "Prefix_2",
                "Suffix",
                "Greatness",
                "CreatedBlock",
                "XP",
                "Adventurer",
                "Bag",
                "Name",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            string_fields: vec![13],
            columns: 1,
        }
    }
}

fn default_networks() -> HashMap<String, NetworkConfig> {
    let mut networks = HashMap::new();
    networks.insert(
        "goerli".to_string(),
        NetworkConfig {
            starknet_network: Some("alpha-goerli".to_string()),
            feeder_gateway_url: None,
        },
    );
    networks.insert(
        "mainnet".to_string(),
        NetworkConfig {
            starknet_network: Some("alpha-mainnet".to_string()),
            feeder_gateway_url: None,
        },
    );
    networks
}

impl Settings {
    /// Load settings from `$REALMS_CONFIG`, falling back to `config/default.toml`
    pub fn load() -> LootResult<Self> {
        let mut settings = match env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    tracing::debug!("No config file at {:?}, using defaults", path);
                    Self::default()
                }
            }
        };

        if let Ok(address) = env::var(USER_ADDRESS_ENV) {
            settings.account.address = Some(address);
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Load and parse a single config file
    pub fn from_file(path: &Path) -> LootResult<Self> {
        let config_str = std::fs::read_to_string(path).map_err(|e| {
            LootError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&config_str)
    }

    /// Parse settings from TOML text, substituting environment variables first
    pub fn from_toml(input: &str) -> LootResult<Self> {
        let config_str = substitute_env_vars(input);
        let mut settings: Settings = toml::from_str(&config_str)
            .map_err(|e| LootError::Config(format!("Failed to parse configuration: {}", e)))?;

        // Configured networks extend the built-in public ones
        for (name, network) in default_networks() {
            settings.networks.entry(name).or_insert(network);
        }

        Ok(settings)
    }

    /// Validate configuration
    pub fn validate(&self) -> LootResult<()> {
        if self.loot.fields.is_empty() {
            return Err(LootError::Config("loot.fields must not be empty".to_string()));
        }

        if let Some(index) = self
            .loot
            .string_fields
            .iter()
            .find(|i| **i >= self.loot.fields.len())
        {
            return Err(LootError::Config(format!(
                "loot.string_fields index {} is outside the {} configured fields",
                index,
                self.loot.fields.len()
            )));
        }

        if self.loot.columns == 0 {
            return Err(LootError::Config("loot.columns must be at least 1".to_string()));
        }

        if self.tooling.timeout_secs == 0 {
            return Err(LootError::Config(
                "tooling.timeout_secs must be at least 1".to_string(),
            ));
        }

        if self.loot.contract_alias.is_empty() {
            return Err(LootError::Config("loot.contract_alias must be set".to_string()));
        }

        if self.account.address.is_none() {
            tracing::debug!("No account address configured - mint_loot will fail");
        }

        Ok(())
    }

    /// Caller address as a felt
    pub fn user_address(&self) -> LootResult<Felt> {
        let raw = self.account.address.as_deref().ok_or_else(|| {
            LootError::Config(format!(
                "No account address configured. Set {} or account.address",
                USER_ADDRESS_ENV
            ))
        })?;
        raw.parse()
    }

    /// Network settings, empty for networks the config does not know (local devnets)
    pub fn network(&self, name: &str) -> NetworkConfig {
        self.networks.get(name).cloned().unwrap_or_default()
    }

    /// Subprocess timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.tooling.timeout_secs)
    }
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    ENV_VAR_RE
        .replace_all(input, |caps: &regex::Captures| {
            env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_env_var_substitution() {
        env::set_var("REALMS_TEST_VAR", "test_value");
        let input = "url = \"https://alpha4.starknet.io/${REALMS_TEST_VAR}/feeder\"";
        let result = substitute_env_vars(input);
        assert_eq!(result, "url = \"https://alpha4.starknet.io/test_value/feeder\"");
    }

    #[test]
    fn test_missing_env_var_becomes_empty() {
        let result = substitute_env_vars("alias = \"${REALMS_TEST_UNSET_VAR}\"");
        assert_eq!(result, "alias = \"\"");
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.default_network, "goerli");
        assert_eq!(settings.loot.contract_alias, "proxy_Loot");
        assert_eq!(settings.loot.fields.len(), 14);
        assert_eq!(settings.loot.fields[13], "Name");
        assert_eq!(settings.loot.string_fields, vec![13]);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        env::set_var("REALMS_TEST_ADDRESS", "0x1234");
        let settings = Settings::from_toml(
            r#"
            default_network = "devnet"

            [account]
            address = "${REALMS_TEST_ADDRESS}"

            [tooling]
            timeout_secs = 30

            [networks.devnet]
            feeder_gateway_url = "http://127.0.0.1:5050/feeder_gateway"
            "#,
        )
        .unwrap();

        assert_eq!(settings.default_network, "devnet");
        assert_eq!(settings.account.alias, "STARKNET_PRIVATE_KEY");
        assert_eq!(settings.user_address().unwrap(), Felt::from(0x1234u128));
        assert_eq!(settings.tooling.nile_bin, "nile");
        assert_eq!(settings.timeout(), Duration::from_secs(30));
        assert_eq!(
            settings.network("devnet").feeder_gateway_url.as_deref(),
            Some("http://127.0.0.1:5050/feeder_gateway")
        );
        assert_eq!(settings.loot.fields.len(), 14);
    }

    #[test]
    fn test_shipped_config_parses() {
        let settings = Settings::from_toml(include_str!("../config/default.toml")).unwrap();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.loot.fields, LootConfig::default().fields);
        assert_eq!(
            settings.network("localhost").feeder_gateway_url.as_deref(),
            Some("http://127.0.0.1:5050/feeder_gateway")
        );
    }

    #[test]
    fn test_configured_networks_extend_defaults() {
        let settings = Settings::from_toml(
            r#"
            [networks.devnet]
            feeder_gateway_url = "http://127.0.0.1:5050/feeder_gateway"

            [networks.mainnet]
            starknet_network = "alpha-mainnet-2"
            "#,
        )
        .unwrap();

        assert_eq!(
            settings.network("goerli").starknet_network.as_deref(),
            Some("alpha-goerli")
        );
        assert_eq!(
            settings.network("mainnet").starknet_network.as_deref(),
            Some("alpha-mainnet-2")
        );
        assert!(settings.network("devnet").feeder_gateway_url.is_some());
    }

    #[test]
    fn test_unknown_network_is_empty() {
        let settings = Settings::default();
        let network = settings.network("localhost");
        assert!(network.starknet_network.is_none());
        assert!(network.feeder_gateway_url.is_none());
        assert_eq!(
            settings.network("goerli").starknet_network.as_deref(),
            Some("alpha-goerli")
        );
    }

    #[test]
    fn test_validate_rejects_bad_string_field() {
        let mut settings = Settings::default();
        settings.loot.string_fields = vec![14];
        assert!(matches!(settings.validate(), Err(LootError::Config(_))));

        let mut settings = Settings::default();
        settings.loot.columns = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.tooling.timeout_secs = 0;
        assert!(matches!(settings.validate(), Err(LootError::Config(_))));
    }

    #[test]
    fn test_missing_user_address() {
        let settings = Settings::default();
        assert!(matches!(settings.user_address(), Err(LootError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[loot]\ncolumns = 4").unwrap();
        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.loot.columns, 4);

        assert!(Settings::from_file(Path::new("/nonexistent/realms.toml")).is_err());
    }
}
