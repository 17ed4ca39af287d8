use crate::wallet::Account;
use derive_more::Display;
use web3::types::H256;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Disconnected,
    Connected,
    MintPending,
    MintConfirmed,
}

/// Everything the view is allowed to see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowState {
    pub current_account: Option<Account>,
    pub mining_started: bool,
    pub mining_complete: bool,
    pub mint_message: Option<String>,
    pub last_tx: Option<H256>,
}

impl WorkflowState {
    pub fn phase(&self) -> Phase {
        match (
            &self.current_account,
            self.mining_started,
            self.mining_complete,
        ) {
            (None, _, _) => Phase::Disconnected,
            (Some(_), false, _) => Phase::Connected,
            (Some(_), true, false) => Phase::MintPending,
            (Some(_), true, true) => Phase::MintConfirmed,
        }
    }

    pub fn is_mint_pending(&self) -> bool {
        self.mining_started && !self.mining_complete
    }

    pub(crate) fn connected(&self, account: Account) -> Self {
        WorkflowState {
            current_account: Some(account),
            ..self.clone()
        }
    }

    pub(crate) fn disconnected(&self) -> Self {
        WorkflowState {
            current_account: None,
            mining_started: false,
            mining_complete: false,
            last_tx: None,
            ..self.clone()
        }
    }

    pub(crate) fn mint_started(&self, tx: H256) -> Self {
        WorkflowState {
            mining_started: true,
            mining_complete: false,
            last_tx: Some(tx),
            ..self.clone()
        }
    }

    pub(crate) fn mint_confirmed(&self) -> Self {
        debug_assert!(self.mining_started);
        WorkflowState {
            mining_complete: true,
            ..self.clone()
        }
    }

    pub(crate) fn mint_abandoned(&self) -> Self {
        WorkflowState {
            mining_started: false,
            mining_complete: false,
            ..self.clone()
        }
    }

    pub(crate) fn with_message(&self, message: String) -> Self {
        WorkflowState {
            mint_message: Some(message),
            ..self.clone()
        }
    }
}

/// Blocking notices shown to the user.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Alert {
    #[display(fmt = "Get a wallet! No wallet provider was found.")]
    InstallWallet,
    #[display(
        fmt = "You are not connected to the {} network! (wallet chain {}, expected {})",
        network_name,
        actual,
        expected
    )]
    WrongNetwork {
        network_name: String,
        expected: String,
        actual: String,
    },
}
