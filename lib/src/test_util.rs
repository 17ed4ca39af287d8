use crate::contract::{
    load_doors_abi, ContractBinding, ContractClient, MintEvent, MintEventStream, MintTransaction,
};
use crate::error::{MintError, MintResult};
use crate::wallet::{Account, Eip1193, WalletAdapter};
use async_trait::async_trait;
use futures::channel::mpsc as stream_channel;
use futures::StreamExt;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Mutex as AsyncMutex, Notify};
use web3::types::{Address, H256};
use web3::{RequestId, Transport};

pub const FAKE_CONTRACT: u64 = 0xd00;

/// Scripted wallet: one canned response per method.
#[derive(Clone, Default)]
pub struct FakeWallet {
    responses: Arc<Mutex<HashMap<String, MintResult<Value>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: &str, response: MintResult<Value>) {
        self.responses
            .lock()
            .unwrap()
            .insert(method.to_owned(), response);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn adapter(&self) -> WalletAdapter {
        WalletAdapter::new(Some(Arc::new(self.clone()) as Arc<dyn Eip1193>))
    }
}

#[async_trait]
impl Eip1193 for FakeWallet {
    async fn request(&self, method: &str, _params: Vec<Value>) -> MintResult<Value> {
        self.calls.lock().unwrap().push(method.to_owned());
        self.responses
            .lock()
            .unwrap()
            .get(method)
            .cloned()
            .unwrap_or_else(|| Err(MintError::Provider(format!("unexpected call {}", method))))
    }
}

/// Contract whose receipts and events are released by the test.
pub struct FakeContract {
    abi: Arc<ethabi::Contract>,
    submissions: Mutex<VecDeque<MintResult<H256>>>,
    submitted: Mutex<Vec<Account>>,
    confirmation_calls: Mutex<Vec<H256>>,
    confirmations_tx: mpsc::UnboundedSender<MintResult<()>>,
    confirmations_rx: AsyncMutex<mpsc::UnboundedReceiver<MintResult<()>>>,
    listeners: Mutex<Vec<stream_channel::UnboundedSender<MintResult<MintEvent>>>>,
    subscribe_calls: Mutex<Vec<Account>>,
    fail_subscribe: Mutex<bool>,
    submit_gate: Mutex<Option<Arc<Notify>>>,
    subscribe_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeContract {
    pub fn new() -> Arc<Self> {
        let (confirmations_tx, confirmations_rx) = mpsc::unbounded_channel();
        Arc::new(FakeContract {
            abi: Arc::new(load_doors_abi().unwrap()),
            submissions: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(vec![]),
            confirmation_calls: Mutex::new(vec![]),
            confirmations_tx,
            confirmations_rx: AsyncMutex::new(confirmations_rx),
            listeners: Mutex::new(vec![]),
            subscribe_calls: Mutex::new(vec![]),
            fail_subscribe: Mutex::new(false),
            submit_gate: Mutex::new(None),
            subscribe_gate: Mutex::new(None),
        })
    }

    pub fn address() -> Address {
        Address::from_low_u64_be(FAKE_CONTRACT)
    }

    pub fn push_submission(&self, result: MintResult<H256>) {
        self.submissions.lock().unwrap().push_back(result);
    }

    pub fn submitted(&self) -> Vec<Account> {
        self.submitted.lock().unwrap().clone()
    }

    /// Resolves the oldest outstanding `await_confirmation`.
    pub fn release_confirmation(&self, result: MintResult<()>) {
        self.confirmations_tx.send(result).unwrap();
    }

    pub fn confirmation_calls(&self) -> Vec<H256> {
        self.confirmation_calls.lock().unwrap().clone()
    }

    pub fn subscribe_calls(&self) -> Vec<Account> {
        self.subscribe_calls.lock().unwrap().clone()
    }

    pub fn fail_subscribe(&self, fail: bool) {
        *self.fail_subscribe.lock().unwrap() = fail;
    }

    /// From now on each submission waits for a `release_submission`,
    /// like a wallet prompt the user has not answered yet.
    pub fn hold_submissions(&self) {
        *self.submit_gate.lock().unwrap() = Some(Arc::new(Notify::new()));
    }

    pub fn release_submission(&self) {
        if let Some(gate) = self.submit_gate.lock().unwrap().as_ref() {
            gate.notify_one();
        }
    }

    /// From now on each subscription waits for a `release_subscription`.
    pub fn hold_subscriptions(&self) {
        *self.subscribe_gate.lock().unwrap() = Some(Arc::new(Notify::new()));
    }

    pub fn release_subscription(&self) {
        if let Some(gate) = self.subscribe_gate.lock().unwrap().as_ref() {
            gate.notify_one();
        }
    }

    pub fn live_listeners(&self) -> usize {
        self.listeners
            .lock()
            .unwrap()
            .iter()
            .filter(|l| !l.is_closed())
            .count()
    }

    /// Pushes an event to every live listener, returns how many got it.
    pub fn emit(&self, event: MintResult<MintEvent>) -> usize {
        self.listeners
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.unbounded_send(event.clone()).is_ok())
            .count()
    }
}

#[async_trait]
impl ContractClient for FakeContract {
    fn bind(&self, account: &Account) -> ContractBinding {
        ContractBinding::new(Self::address(), self.abi.clone(), account.clone())
    }

    async fn submit_mint(&self, binding: &ContractBinding) -> MintResult<MintTransaction> {
        let gate = self.submit_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(binding.signer().clone());
        let next = self
            .submissions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(H256::from_low_u64_be(submitted.len() as u64)));
        next.map(MintTransaction::pending)
    }

    async fn await_confirmation(&self, tx: MintTransaction) -> MintResult<MintTransaction> {
        self.confirmation_calls.lock().unwrap().push(tx.hash);
        let mut confirmations = self.confirmations_rx.lock().await;
        match confirmations.recv().await {
            Some(result) => result.map(|_| tx.confirm()),
            None => Err(MintError::Provider("confirmations closed".to_owned())),
        }
    }

    async fn subscribe_mint_events(
        &self,
        binding: &ContractBinding,
    ) -> MintResult<MintEventStream> {
        self.subscribe_calls
            .lock()
            .unwrap()
            .push(binding.signer().clone());
        let gate = self.subscribe_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if *self.fail_subscribe.lock().unwrap() {
            return Err(MintError::Provider("filter not supported".to_owned()));
        }
        let (sender, receiver) = stream_channel::unbounded();
        self.listeners.lock().unwrap().push(sender);
        Ok(receiver.boxed())
    }
}

/// JSON-RPC transport answering from a queue. Null once the queue is empty.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<Value, web3::Error>>>>,
    requests: Arc<Mutex<Vec<(String, Vec<Value>)>>>,
}

impl ScriptedTransport {
    pub fn push(&self, response: Result<Value, web3::Error>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<(String, Vec<Value>)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    type Out = futures::future::Ready<Result<Value, web3::Error>>;

    fn prepare(&self, method: &str, params: Vec<Value>) -> (RequestId, jsonrpc_core::Call) {
        let mut requests = self.requests.lock().unwrap();
        requests.push((method.to_owned(), params.clone()));
        let id = requests.len();
        (id, web3::helpers::build_request(id, method, params))
    }

    fn send(&self, _id: RequestId, _request: jsonrpc_core::Call) -> Self::Out {
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Value::Null));
        futures::future::ready(next)
    }
}

/// Lets spawned tasks run on the current-thread test runtime.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
