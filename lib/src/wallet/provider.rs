use crate::error::{MintError, MintResult};
use async_trait::async_trait;
use serde_json::Value;
use web3::transports::Http;
use web3::{Transport, Web3};

/// Raw request capability of an EIP-1193 wallet provider.
#[async_trait]
pub trait Eip1193: Send + Sync {
    async fn request(&self, method: &str, params: Vec<Value>) -> MintResult<Value>;
}

/// Wallet reached over a JSON-RPC http endpoint.
#[derive(Clone, Debug)]
pub struct HttpProvider {
    url: String,
    client: Web3<Http>,
}

impl HttpProvider {
    pub fn new(url: String) -> MintResult<HttpProvider> {
        let transport = Http::new(url.as_str())
            .map_err(|e| MintError::Provider(format!("failed to create transport: {}", e)))?;
        Ok(HttpProvider {
            url,
            client: Web3::new(transport),
        })
    }
}

#[async_trait]
impl Eip1193 for HttpProvider {
    async fn request(&self, method: &str, params: Vec<Value>) -> MintResult<Value> {
        log::debug!("wallet request {} to {}", method, self.url);
        let value = self.client.transport().execute(method, params).await?;
        Ok(value)
    }
}
