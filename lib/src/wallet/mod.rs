pub mod provider;

pub use provider::{Eip1193, HttpProvider};

use crate::error::{MintError, MintResult};
use derive_more::Display;
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;

/// A wallet address as reported by the provider.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash)]
pub struct Account(pub String);

impl Account {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for Account {
    fn from(s: &str) -> Self {
        Account(s.to_owned())
    }
}

/// Network identifier as reported by `eth_chainId`.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub struct ChainId(pub String);

impl From<&str> for ChainId {
    fn from(s: &str) -> Self {
        ChainId(s.to_owned())
    }
}

/// Account and network discovery over an optional wallet provider.
#[derive(Clone)]
pub struct WalletAdapter {
    provider: Option<Arc<dyn Eip1193>>,
}

impl WalletAdapter {
    pub fn new(provider: Option<Arc<dyn Eip1193>>) -> Self {
        WalletAdapter { provider }
    }

    pub fn from_url(url: Option<String>) -> MintResult<Self> {
        let provider = match url {
            Some(url) => Some(Arc::new(HttpProvider::new(url)?) as Arc<dyn Eip1193>),
            None => None,
        };
        Ok(Self::new(provider))
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Already authorized accounts, without prompting. Never fails.
    pub async fn detect_accounts(&self) -> Vec<Account> {
        let provider = match &self.provider {
            Some(provider) => provider,
            None => {
                info!("make sure you have a wallet provider configured");
                return vec![];
            }
        };
        match provider.request("eth_accounts", vec![]).await {
            Ok(value) => match parse_accounts(value) {
                Ok(accounts) => {
                    debug!("eth_accounts returned {} accounts", accounts.len());
                    accounts
                }
                Err(e) => {
                    warn!("failed to parse eth_accounts response: {}", e);
                    vec![]
                }
            },
            Err(e) => {
                warn!("eth_accounts failed: {}", e);
                vec![]
            }
        }
    }

    /// Prompts the wallet to authorize an account and returns the first one.
    pub async fn request_connection(&self) -> MintResult<Account> {
        let provider = self.provider.as_ref().ok_or(MintError::NoProvider)?;
        let value = provider.request("eth_requestAccounts", vec![]).await?;
        let account = parse_accounts(value)?
            .into_iter()
            .next()
            .ok_or(MintError::UserRejected)?;
        info!("connected {}", account);
        Ok(account)
    }

    pub async fn current_chain(&self) -> MintResult<ChainId> {
        let provider = self.provider.as_ref().ok_or(MintError::NoProvider)?;
        match provider.request("eth_chainId", vec![]).await? {
            Value::String(chain_id) => {
                info!("connected to chain {}", chain_id);
                Ok(ChainId(chain_id))
            }
            other => Err(MintError::Provider(format!(
                "eth_chainId should return a string, got {}",
                other
            ))),
        }
    }
}

fn parse_accounts(value: Value) -> MintResult<Vec<Account>> {
    let accounts: Vec<String> = serde_json::from_value(value)
        .map_err(|e| MintError::Provider(format!("invalid accounts response: {}", e)))?;
    Ok(accounts.into_iter().map(Account).collect())
}
