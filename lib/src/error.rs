use derive_more::Display;
use web3::types::H256;

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum MintError {
    #[display(fmt = "no wallet provider found, install a wallet first")]
    NoProvider,
    #[display(fmt = "user rejected the wallet request")]
    UserRejected,
    #[display(fmt = "wrong network: expected chain {}, wallet is on {}", expected, actual)]
    NetworkMismatch { expected: String, actual: String },
    #[display(fmt = "failed to submit mint transaction: {}", _0)]
    TransactionSubmission(String),
    #[display(fmt = "mint transaction {:?} reverted", _0)]
    TransactionReverted(H256),
    #[display(fmt = "timed out waiting for confirmation of {:?}", _0)]
    ConfirmationTimeout(H256),
    #[display(fmt = "a mint is already pending")]
    MintInProgress,
    #[display(fmt = "no wallet account connected")]
    NotConnected,
    #[display(fmt = "provider error: {}", _0)]
    Provider(String),
}

impl std::error::Error for MintError {}

impl From<web3::Error> for MintError {
    fn from(e: web3::Error) -> Self {
        match e {
            web3::Error::Rpc(ref rpc) if rpc.code.code() == USER_REJECTED_CODE => {
                Self::UserRejected
            }
            e => Self::Provider(e.to_string()),
        }
    }
}

impl From<web3::contract::Error> for MintError {
    fn from(e: web3::contract::Error) -> Self {
        match e {
            web3::contract::Error::Api(e) => e.into(),
            e => Self::Provider(e.to_string()),
        }
    }
}

pub type MintResult<T> = std::result::Result<T, MintError>;
