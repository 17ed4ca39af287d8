pub mod state;

pub use state::{Alert, Phase, WorkflowState};

use crate::config::MintConfig;
use crate::contract::{
    ContractClient, MintEventStream, MintTransaction, NoProviderContract, Web3ContractClient,
};
use crate::error::{MintError, MintResult};
use crate::network::NetworkValidator;
use crate::view::MintLinks;
use crate::wallet::{Account, ChainId, WalletAdapter};
use futures::StreamExt;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use web3::types::Address;

/// Read side handed to the view.
pub struct WorkflowView {
    state: watch::Receiver<WorkflowState>,
    alerts: mpsc::UnboundedReceiver<Alert>,
}

impl WorkflowView {
    pub fn snapshot(&self) -> WorkflowState {
        self.state.borrow().clone()
    }

    /// Waits for the next committed state. `None` once the workflow is gone.
    pub async fn changed(&mut self) -> Option<WorkflowState> {
        self.state.changed().await.ok()?;
        Some(self.snapshot())
    }

    pub fn try_next_alert(&mut self) -> Option<Alert> {
        self.alerts.try_recv().ok()
    }
}

/// Live mint event listener. Aborted when dropped.
struct Subscription {
    account: Account,
    task: JoinHandle<()>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!("tearing down event listener for {}", self.account);
        self.task.abort();
    }
}

struct Shared {
    state: WorkflowState,
    subscription: Option<Subscription>,
    /// Account whose listener is being created, lock released meanwhile.
    arming: Option<Account>,
    publisher: watch::Sender<WorkflowState>,
}

impl Shared {
    fn commit(&mut self, next: WorkflowState) {
        debug_assert!(!next.mining_complete || next.mining_started);
        if next == self.state {
            return;
        }
        self.state = next;
        let _ = self.publisher.send(self.state.clone());
    }

    fn drop_subscription(&mut self) {
        self.arming = None;
        self.subscription = None;
    }
}

/// Clears the in-flight submission flag, also when the mint future is dropped.
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A mint waiting for its receipt.
pub struct ConfirmationHandle {
    tx: MintTransaction,
    task: JoinHandle<MintResult<MintTransaction>>,
}

impl ConfirmationHandle {
    pub fn transaction(&self) -> MintTransaction {
        self.tx
    }

    pub async fn wait(self) -> MintResult<MintTransaction> {
        self.task
            .await
            .map_err(|e| MintError::Provider(format!("confirmation task failed: {}", e)))?
    }
}

pub struct MintWorkflow {
    wallet: WalletAdapter,
    contract: Arc<dyn ContractClient>,
    validator: NetworkValidator,
    links: MintLinks,
    shared: Arc<Mutex<Shared>>,
    submitting: AtomicBool,
    alerts: mpsc::UnboundedSender<Alert>,
}

impl MintWorkflow {
    pub fn new(
        wallet: WalletAdapter,
        contract: Arc<dyn ContractClient>,
        validator: NetworkValidator,
        links: MintLinks,
    ) -> (Self, WorkflowView) {
        let (publisher, state) = watch::channel(WorkflowState::default());
        let (alerts, alert_receiver) = mpsc::unbounded_channel();
        let workflow = MintWorkflow {
            wallet,
            contract,
            validator,
            links,
            shared: Arc::new(Mutex::new(Shared {
                state: WorkflowState::default(),
                subscription: None,
                arming: None,
                publisher,
            })),
            submitting: AtomicBool::new(false),
            alerts,
        };
        let view = WorkflowView {
            state,
            alerts: alert_receiver,
        };
        (workflow, view)
    }

    pub fn from_config(
        config: &MintConfig,
        network: &Option<String>,
    ) -> anyhow::Result<(Self, WorkflowView)> {
        let network_config = config.get_network_config(network)?;
        let links = MintLinks::from_config(config, network)?;
        let validator = NetworkValidator::new(ChainId(network_config.chain_id.clone()));
        let (wallet, contract): (WalletAdapter, Arc<dyn ContractClient>) =
            match network_config.provider_url {
                Some(url) => {
                    let contract = Web3ContractClient::new(&url, &config.contract_address)?
                        .with_confirmation_poll_interval(config.confirmation_poll_interval())
                        .with_confirmation_timeout(config.confirmation_timeout())
                        .with_event_poll_interval(config.event_poll_interval());
                    (WalletAdapter::from_url(Some(url))?, Arc::new(contract))
                }
                None => (
                    WalletAdapter::new(None),
                    Arc::new(NoProviderContract::new(&config.contract_address)?),
                ),
            };
        Ok(Self::new(wallet, contract, validator, links))
    }

    pub fn links(&self) -> &MintLinks {
        &self.links
    }

    pub async fn snapshot(&self) -> WorkflowState {
        self.shared.lock().await.state.clone()
    }

    /// Picks up an account the wallet already authorized, without prompting.
    pub async fn load(&self) -> Option<Account> {
        match self.wallet.detect_accounts().await.into_iter().next() {
            Some(account) => {
                info!("found an authorized account: {}", account);
                self.adopt_account(account.clone()).await;
                Some(account)
            }
            None => {
                info!("no authorized account found");
                None
            }
        }
    }

    pub async fn connect_wallet(&self) -> MintResult<Account> {
        let result = self.try_connect().await;
        match &result {
            Ok(account) => info!("wallet connected: {}", account),
            Err(MintError::NoProvider) => {
                warn!("connect wallet failed: {}", MintError::NoProvider);
                self.alert(Alert::InstallWallet);
            }
            Err(e) => warn!("connect wallet failed: {}", e),
        }
        result
    }

    async fn try_connect(&self) -> MintResult<Account> {
        let account = self.wallet.request_connection().await?;
        match self.wallet.current_chain().await {
            Ok(chain) => {
                if !self.validator.validate(&chain) {
                    let mismatch = MintError::NetworkMismatch {
                        expected: self.validator.expected().to_string(),
                        actual: chain.to_string(),
                    };
                    warn!("{}", mismatch);
                    self.alert(Alert::WrongNetwork {
                        network_name: self.links.network_name.clone(),
                        expected: self.validator.expected().to_string(),
                        actual: chain.to_string(),
                    });
                }
            }
            Err(e) => warn!("failed to query wallet chain: {}", e),
        }
        self.adopt_account(account.clone()).await;
        Ok(account)
    }

    /// Submits the mint and returns once the wallet handed back a hash.
    /// The receipt is awaited in the background.
    pub async fn mint(&self) -> MintResult<ConfirmationHandle> {
        let result = self.try_mint().await;
        if let Err(e) = &result {
            warn!("mint failed: {}", e);
        }
        result
    }

    async fn try_mint(&self) -> MintResult<ConfirmationHandle> {
        let (account, _submitting) = {
            let shared = self.shared.lock().await;
            if self.submitting.load(Ordering::SeqCst) || shared.state.is_mint_pending() {
                return Err(MintError::MintInProgress);
            }
            let account = shared
                .state
                .current_account
                .clone()
                .ok_or(MintError::NotConnected)?;
            self.submitting.store(true, Ordering::SeqCst);
            (account, SubmitGuard(&self.submitting))
        };

        let binding = self.contract.bind(&account);
        let tx = self.contract.submit_mint(&binding).await?;

        let mut shared = self.shared.lock().await;
        if shared.state.current_account.as_ref() == Some(&account) {
            info!("mining, please wait. tx: {}", self.links.tx_url(tx.hash));
            let next = shared.state.mint_started(tx.hash);
            shared.commit(next);
        } else {
            warn!(
                "wallet account changed while {} was minting, tx {:?} is not tracked",
                account, tx.hash
            );
        }
        drop(shared);

        let task = tokio::spawn(confirm_mint(
            Arc::downgrade(&self.shared),
            self.contract.clone(),
            tx,
            self.links.clone(),
        ));
        Ok(ConfirmationHandle { tx, task })
    }

    /// Provider-pushed account change.
    pub async fn accounts_changed(&self, accounts: Vec<Account>) {
        match accounts.into_iter().next() {
            None => {
                let mut shared = self.shared.lock().await;
                if shared.state.current_account.is_none() {
                    return;
                }
                info!("wallet disconnected");
                shared.drop_subscription();
                let next = shared.state.disconnected();
                shared.commit(next);
            }
            Some(account) => {
                if self.shared.lock().await.state.current_account.as_ref() == Some(&account) {
                    return;
                }
                info!("wallet account changed to {}", account);
                self.adopt_account(account).await;
            }
        }
    }

    /// Re-reads authorized accounts and applies any change.
    pub async fn refresh_accounts(&self) {
        if !self.wallet.has_provider() {
            return;
        }
        let accounts = self.wallet.detect_accounts().await;
        self.accounts_changed(accounts).await;
    }

    pub async fn shutdown(&self) {
        self.shared.lock().await.drop_subscription();
    }

    async fn adopt_account(&self, account: Account) {
        {
            let mut shared = self.shared.lock().await;
            let next = shared.state.connected(account.clone());
            shared.commit(next);
            let armed = shared.subscription.as_ref().map(|s| &s.account) == Some(&account);
            if armed || shared.arming.as_ref() == Some(&account) {
                debug!("event listener already armed for {}", account);
                return;
            }
            shared.subscription = None;
            shared.arming = Some(account.clone());
        }
        self.arm_subscription(account).await;
    }

    /// Creates the listener without holding the state lock. The result is
    /// discarded if the account changed or the workflow shut down meanwhile.
    async fn arm_subscription(&self, account: Account) {
        let binding = self.contract.bind(&account);
        let events = self.contract.subscribe_mint_events(&binding).await;

        let mut shared = self.shared.lock().await;
        if shared.arming.as_ref() != Some(&account) {
            debug!("dropping stale event listener for {}", account);
            return;
        }
        shared.arming = None;
        match events {
            Ok(events) => {
                let task = tokio::spawn(deliver_mint_events(
                    Arc::downgrade(&self.shared),
                    events,
                    self.links.clone(),
                    binding.address(),
                ));
                info!("setup event listener for {}", account);
                shared.subscription = Some(Subscription { account, task });
            }
            Err(e) => error!("failed to setup event listener: {}", e),
        }
    }

    fn alert(&self, alert: Alert) {
        warn!("alert: {}", alert);
        let _ = self.alerts.send(alert);
    }
}

async fn deliver_mint_events(
    shared: Weak<Mutex<Shared>>,
    mut events: MintEventStream,
    links: MintLinks,
    contract: Address,
) {
    while let Some(event) = events.next().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!("failed to receive mint event: {}", e);
                continue;
            }
        };
        info!("{:?} minted token {}", event.recipient, event.token_id);
        let strong = match shared.upgrade() {
            Some(strong) => strong,
            None => return,
        };
        let mut guard = strong.lock().await;
        let next = guard
            .state
            .with_message(links.mint_message(contract, event.token_id));
        guard.commit(next);
    }
    debug!("mint event stream closed");
}

async fn confirm_mint(
    shared: Weak<Mutex<Shared>>,
    contract: Arc<dyn ContractClient>,
    tx: MintTransaction,
    links: MintLinks,
) -> MintResult<MintTransaction> {
    let result = contract.await_confirmation(tx).await;
    match &result {
        Ok(_) => info!("mined, see transaction: {}", links.tx_url(tx.hash)),
        Err(e) => warn!("mint {:?} was not confirmed: {}", tx.hash, e),
    }
    if let Some(strong) = shared.upgrade() {
        let mut guard = strong.lock().await;
        if guard.state.last_tx == Some(tx.hash) && guard.state.mining_started {
            let next = match &result {
                Ok(_) => guard.state.mint_confirmed(),
                Err(_) => guard.state.mint_abandoned(),
            };
            guard.commit(next);
        }
    }
    result
}
