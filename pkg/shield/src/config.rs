use std::{path::Path, path::PathBuf, time::Duration};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How log lines are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Client settings
///
/// Loaded from defaults, then an optional TOML file, then `SHIELD_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON-RPC endpoint of the chain
    pub rpc_url: String,
    /// Address of the pool contract
    pub contract_address: String,
    /// Hex secp256k1 key that signs ledger calls
    pub signer_secret_key: Option<String>,
    /// Depth of the commitment tree, must match the deployed circuits
    pub tree_depth: usize,
    /// Width of every amounts vector, must match the deployed circuits
    pub max_tokens: usize,
    /// Directory holding the circuit build artifacts
    pub circuit_build_dir: PathBuf,
    /// Seconds before a proof is abandoned
    pub prover_timeout: u64,
    /// Milliseconds between polls of the ledger's event filter
    pub poll_interval: u64,
    /// Floor for the gas price, in gwei
    pub minimum_gas_price_gwei: Option<u64>,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_owned(),
            contract_address: String::new(),
            signer_secret_key: None,
            tree_depth: notes::TREE_DEPTH,
            max_tokens: notes::MAX_TOKENS,
            circuit_build_dir: PathBuf::from("build"),
            prover_timeout: 300,
            poll_interval: 2000,
            minimum_gas_price_gwei: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// The layered sources, before extraction
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Config::default()));

        let figment = match file {
            Some(file) => figment.merge(Toml::file(file)),
            None => figment,
        };

        figment.merge(Env::prefixed("SHIELD_"))
    }

    /// Load and validate
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let config: Config = Self::figment(file).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings against the protocol constants this build was compiled with
    pub fn validate(&self) -> Result<()> {
        if self.tree_depth != notes::TREE_DEPTH {
            return Err(Error::InvalidConfig(format!(
                "tree_depth is {}, but this build uses {}",
                self.tree_depth,
                notes::TREE_DEPTH
            )));
        }

        if self.max_tokens != notes::MAX_TOKENS {
            return Err(Error::InvalidConfig(format!(
                "max_tokens is {}, but this build uses {}",
                self.max_tokens,
                notes::MAX_TOKENS
            )));
        }

        if self.prover_timeout == 0 {
            return Err(Error::InvalidConfig("prover_timeout must be positive".to_owned()));
        }

        Ok(())
    }

    /// [`prover_timeout`](Self::prover_timeout) as a duration
    #[must_use]
    pub fn prover_timeout(&self) -> Duration {
        Duration::from_secs(self.prover_timeout)
    }

    /// [`poll_interval`](Self::poll_interval) as a duration
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval)
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "shield.toml",
                r#"
                rpc_url = "http://node:8545"
                contract_address = "0x5fbdb2315678afecb367f032d93f642f64180aa3"
                poll_interval = 500
                log_format = "json"
                "#,
            )?;
            jail.set_env("SHIELD_POLL_INTERVAL", "250");

            let config = Config::load(Some(Path::new("shield.toml"))).unwrap();

            assert_eq!(config.rpc_url, "http://node:8545");
            assert_eq!(config.poll_interval(), Duration::from_millis(250));
            assert_eq!(config.log_format, LogFormat::Json);
            assert_eq!(config.tree_depth, notes::TREE_DEPTH);

            Ok(())
        });
    }

    #[test]
    fn mismatched_constants_are_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("SHIELD_TREE_DEPTH", "32");

            assert!(matches!(
                Config::load(None),
                Err(Error::InvalidConfig(message)) if message.contains("tree_depth")
            ));

            Ok(())
        });

        let config = Config {
            max_tokens: 4,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
