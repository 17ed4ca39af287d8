pub mod client;

pub use client::Web3ContractClient;

use crate::error::{MintError, MintResult};
use crate::wallet::Account;
use async_trait::async_trait;
use ethabi::{Event, RawLog, Token};
use futures::stream::BoxStream;
use std::sync::Arc;
use web3::types::{Address, Log, H160, H256, U256};

pub const ETH_ADDRESS_LENGTH: usize = 40;
pub const MINT_FUNCTION: &str = "openDoors";
pub const MINT_EVENT: &str = "doorMinted";

pub const DOORS_ABI: &[u8] = include_bytes!("doors_abi.json");

pub fn load_doors_abi() -> MintResult<ethabi::Contract> {
    ethabi::Contract::load(DOORS_ABI)
        .map_err(|e| MintError::Provider(format!("failed to parse contract abi: {}", e)))
}

/// Contract address, interface and the account that signs for it.
#[derive(Debug, Clone)]
pub struct ContractBinding {
    address: Address,
    abi: Arc<ethabi::Contract>,
    signer: Account,
}

impl ContractBinding {
    pub fn new(address: Address, abi: Arc<ethabi::Contract>, signer: Account) -> Self {
        ContractBinding {
            address,
            abi,
            signer,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &ethabi::Contract {
        &self.abi
    }

    pub fn signer(&self) -> &Account {
        &self.signer
    }

    pub fn mint_event(&self) -> MintResult<&Event> {
        self.abi
            .event(MINT_EVENT)
            .map_err(|e| MintError::Provider(format!("abi has no {} event: {}", MINT_EVENT, e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintTransaction {
    pub hash: H256,
    pub confirmed: bool,
}

impl MintTransaction {
    pub fn pending(hash: H256) -> Self {
        MintTransaction {
            hash,
            confirmed: false,
        }
    }

    pub fn confirm(self) -> Self {
        MintTransaction {
            confirmed: true,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintEvent {
    pub recipient: Address,
    pub token_id: U256,
}

pub type MintEventStream = BoxStream<'static, MintResult<MintEvent>>;

#[async_trait]
pub trait ContractClient: Send + Sync {
    fn bind(&self, account: &Account) -> ContractBinding;

    /// Sends the mint call. Resolves once the wallet approved it and the
    /// transaction hash is known.
    async fn submit_mint(&self, binding: &ContractBinding) -> MintResult<MintTransaction>;

    async fn await_confirmation(&self, tx: MintTransaction) -> MintResult<MintTransaction>;

    async fn subscribe_mint_events(&self, binding: &ContractBinding)
        -> MintResult<MintEventStream>;
}

/// Stand-in used when no wallet endpoint is configured.
pub struct NoProviderContract {
    address: Address,
    abi: Arc<ethabi::Contract>,
}

impl NoProviderContract {
    pub fn new(contract_address: &str) -> MintResult<Self> {
        Ok(NoProviderContract {
            address: convert_eth_address(contract_address)?,
            abi: Arc::new(load_doors_abi()?),
        })
    }
}

#[async_trait]
impl ContractClient for NoProviderContract {
    fn bind(&self, account: &Account) -> ContractBinding {
        ContractBinding::new(self.address, self.abi.clone(), account.clone())
    }

    async fn submit_mint(&self, _binding: &ContractBinding) -> MintResult<MintTransaction> {
        Err(MintError::NoProvider)
    }

    async fn await_confirmation(&self, _tx: MintTransaction) -> MintResult<MintTransaction> {
        Err(MintError::NoProvider)
    }

    async fn subscribe_mint_events(
        &self,
        _binding: &ContractBinding,
    ) -> MintResult<MintEventStream> {
        Err(MintError::NoProvider)
    }
}

pub fn decode_mint_event(event: &Event, log: Log) -> MintResult<MintEvent> {
    let parsed = event
        .parse_log(RawLog {
            topics: log.topics,
            data: log.data.0,
        })
        .map_err(|e| MintError::Provider(format!("failed to decode {} log: {}", MINT_EVENT, e)))?;
    let mut recipient = None;
    let mut token_id = None;
    for param in parsed.params {
        match param.value {
            Token::Address(address) => recipient = Some(address),
            Token::Uint(id) => token_id = Some(id),
            _ => {}
        }
    }
    match (recipient, token_id) {
        (Some(recipient), Some(token_id)) => Ok(MintEvent {
            recipient,
            token_id,
        }),
        _ => Err(MintError::Provider(format!(
            "{} log is missing recipient or token id",
            MINT_EVENT
        ))),
    }
}

pub fn convert_eth_address(mut address: &str) -> MintResult<H160> {
    if address.starts_with("0x") || address.starts_with("0X") {
        address = &address[2..];
    }
    if address.len() != ETH_ADDRESS_LENGTH {
        return Err(MintError::Provider(format!(
            "invalid eth address: {:?}",
            address
        )));
    }
    let bytes = hex::decode(address)
        .map_err(|e| MintError::Provider(format!("invalid eth address {:?}: {}", address, e)))?;
    Ok(H160::from_slice(bytes.as_slice()))
}
