//! Contract alias resolution from nile deployment files
//!
//! nile records each deployment on its own line of `<network>.deployments.txt`
//! as `address:abi_path[:alias...]`.

use crate::error::{LootError, LootResult};

use std::path::{Path, PathBuf};
use tracing::debug;

/// One recorded deployment
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    pub address: String,
    pub abi: String,
    pub aliases: Vec<String>,
}

impl Deployment {
    fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.split(':').map(str::trim);
        let address = parts.next().filter(|a| !a.is_empty())?;
        let abi = parts.next().unwrap_or_default();

        Some(Self {
            address: address.to_string(),
            abi: abi.to_string(),
            aliases: parts.filter(|a| !a.is_empty()).map(String::from).collect(),
        })
    }

    fn matches(&self, alias: &str) -> bool {
        self.address == alias || self.aliases.iter().any(|a| a == alias)
    }
}

/// Deployments recorded for a single network
#[derive(Debug, Clone)]
pub struct Deployments {
    network: String,
    entries: Vec<Deployment>,
}

impl Deployments {
    /// Path of the deployments file for a network
    pub fn file_path(project_dir: &Path, network: &str) -> PathBuf {
        project_dir.join(format!("{}.deployments.txt", network))
    }

    /// Load the deployments file for a network; a missing file means no deployments
    pub fn load(project_dir: &Path, network: &str) -> LootResult<Self> {
        let path = Self::file_path(project_dir, network);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No deployments file at {:?}", path);
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        let deployments = Self::parse(network, &content);
        debug!("Loaded {} deployments for {}", deployments.len(), network);
        Ok(deployments)
    }

    pub fn parse(network: &str, content: &str) -> Self {
        let entries = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .filter_map(Deployment::parse_line)
            .collect();

        Self {
            network: network.to_string(),
            entries,
        }
    }

    /// Latest deployment recorded under an alias (or address)
    pub fn resolve(&self, alias: &str) -> LootResult<&Deployment> {
        self.entries
            .iter()
            .rev()
            .find(|d| d.matches(alias))
            .ok_or_else(|| LootError::AliasNotFound {
                alias: alias.to_string(),
                network: self.network.clone(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
