use crate::config::MintConfig;
use crate::workflow::{Phase, WorkflowState};
use anyhow::Result;
use web3::types::{Address, H256, U256};

/// Link templates shown next to the workflow state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintLinks {
    pub network_name: String,
    pub token_url_template: String,
    pub tx_url_template: String,
    pub collection_url: String,
    pub total_mint_count: u64,
}

impl MintLinks {
    pub fn from_config(config: &MintConfig, network: &Option<String>) -> Result<Self> {
        let network_config = config.get_network_config(network)?;
        Ok(MintLinks {
            network_name: network_config.network_name,
            token_url_template: config.token_url_template.clone(),
            tx_url_template: config.tx_url_template.clone(),
            collection_url: config.collection_url.clone(),
            total_mint_count: config.total_mint_count,
        })
    }

    pub fn token_url(&self, contract: Address, token_id: U256) -> String {
        self.token_url_template
            .replace("{contract}", &format_address(contract))
            .replace("{token_id}", &token_id.to_string())
    }

    pub fn tx_url(&self, tx: H256) -> String {
        self.tx_url_template
            .replace("{tx}", &format!("0x{}", hex::encode(tx.as_bytes())))
    }

    pub fn collection_line(&self) -> String {
        format!(
            "collection: {} doors at {}",
            self.total_mint_count, self.collection_url
        )
    }

    pub fn mint_message(&self, contract: Address, token_id: U256) -> String {
        format!(
            "Success! Minted and sent to wallet on {} network. It can take a few minutes to show up on the marketplace. Here's the link: {}",
            self.network_name,
            self.token_url(contract, token_id)
        )
    }
}

fn format_address(address: Address) -> String {
    format!("0x{}", hex::encode(address.as_bytes()))
}

/// Text lines for the current state, top to bottom.
pub fn render(state: &WorkflowState, links: &MintLinks) -> Vec<String> {
    let mut lines = vec![];
    match &state.current_account {
        None => lines.push("wallet: not connected (run `connect`)".to_owned()),
        Some(account) => lines.push(format!("wallet: {}", account)),
    }
    match state.phase() {
        Phase::MintPending => lines.push("mining in process...".to_owned()),
        Phase::MintConfirmed => lines.push("Success!".to_owned()),
        Phase::Disconnected | Phase::Connected => {}
    }
    if let Some(tx) = state.last_tx {
        lines.push(format!("transaction: {}", links.tx_url(tx)));
    }
    if let Some(message) = &state.mint_message {
        lines.push(message.clone());
    }
    lines
}
