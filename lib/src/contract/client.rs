use super::{
    convert_eth_address, decode_mint_event, load_doors_abi, ContractBinding, ContractClient,
    MintEventStream, MintTransaction, MINT_FUNCTION,
};
use crate::error::{MintError, MintResult};
use crate::wallet::Account;
use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use web3::contract::{Contract, Options};
use web3::transports::Http;
use web3::types::{Address, FilterBuilder, TransactionReceipt, H256};
use web3::{Transport, Web3};

/// Talks to the mint contract through the wallet's JSON-RPC endpoint.
pub struct Web3ContractClient<T: Transport = Http> {
    client: Web3<T>,
    address: Address,
    abi: Arc<ethabi::Contract>,
    confirmation_poll_interval: Duration,
    confirmation_timeout: Option<Duration>,
    event_poll_interval: Duration,
}

impl Web3ContractClient<Http> {
    pub fn new(url: &str, contract_address: &str) -> MintResult<Self> {
        let transport = Http::new(url)
            .map_err(|e| MintError::Provider(format!("failed to create transport: {}", e)))?;
        Self::with_transport(transport, contract_address)
    }
}

impl<T: Transport> Web3ContractClient<T> {
    pub fn with_transport(transport: T, contract_address: &str) -> MintResult<Self> {
        Ok(Web3ContractClient {
            client: Web3::new(transport),
            address: convert_eth_address(contract_address)?,
            abi: Arc::new(load_doors_abi()?),
            confirmation_poll_interval: Duration::from_secs(1),
            confirmation_timeout: None,
            event_poll_interval: Duration::from_secs(1),
        })
    }

    pub fn with_confirmation_poll_interval(mut self, interval: Duration) -> Self {
        self.confirmation_poll_interval = interval;
        self
    }

    pub fn with_confirmation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub fn with_event_poll_interval(mut self, interval: Duration) -> Self {
        self.event_poll_interval = interval;
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn poll_receipt(&self, hash: H256) -> MintResult<TransactionReceipt> {
        loop {
            match self.client.eth().transaction_receipt(hash).await? {
                Some(receipt) => return Ok(receipt),
                None => {
                    debug!("mining {:?}, please wait", hash);
                    tokio::time::sleep(self.confirmation_poll_interval).await;
                }
            }
        }
    }
}

#[async_trait]
impl<T> ContractClient for Web3ContractClient<T>
where
    T: Transport + Send + Sync + 'static,
    T::Out: Send,
{
    fn bind(&self, account: &Account) -> ContractBinding {
        ContractBinding::new(self.address, self.abi.clone(), account.clone())
    }

    async fn submit_mint(&self, binding: &ContractBinding) -> MintResult<MintTransaction> {
        let from = convert_eth_address(binding.signer().as_str())
            .map_err(|e| MintError::TransactionSubmission(e.to_string()))?;
        let contract = Contract::new(
            self.client.eth(),
            binding.address(),
            binding.abi().clone(),
        );
        info!("going to pop wallet now to pay gas");
        let hash = contract
            .call(MINT_FUNCTION, (), from, Options::default())
            .await
            .map_err(|e| match MintError::from(e) {
                MintError::UserRejected => MintError::UserRejected,
                e => MintError::TransactionSubmission(e.to_string()),
            })?;
        info!("mint tx submitted: {:?}", hash);
        Ok(MintTransaction::pending(hash))
    }

    async fn await_confirmation(&self, tx: MintTransaction) -> MintResult<MintTransaction> {
        let receipt = match self.confirmation_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.poll_receipt(tx.hash))
                .await
                .map_err(|_| MintError::ConfirmationTimeout(tx.hash))??,
            None => self.poll_receipt(tx.hash).await?,
        };
        debug!("receipt: {:?}", &receipt);
        if let Some(status) = receipt.status {
            if status.is_zero() {
                return Err(MintError::TransactionReverted(tx.hash));
            }
        }
        info!("mined, tx {:?} in block {:?}", tx.hash, receipt.block_number);
        Ok(tx.confirm())
    }

    async fn subscribe_mint_events(
        &self,
        binding: &ContractBinding,
    ) -> MintResult<MintEventStream> {
        let event = binding.mint_event()?.clone();
        let filter = FilterBuilder::default()
            .address(vec![binding.address()])
            .topics(Some(vec![event.signature()]), None, None, None)
            .build();
        let filter = self.client.eth_filter().create_logs_filter(filter).await?;
        info!("setup event listener on {:?}", binding.address());
        let stream = filter
            .stream(self.event_poll_interval)
            .map(move |log| decode_mint_event(&event, log?));
        Ok(stream.boxed())
    }
}
