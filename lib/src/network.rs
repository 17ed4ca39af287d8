use crate::wallet::ChainId;
use log::{info, warn};

/// Checks the wallet network against the single chain the contract lives on.
#[derive(Debug, Clone)]
pub struct NetworkValidator {
    expected: ChainId,
}

impl NetworkValidator {
    pub fn new(expected: ChainId) -> Self {
        NetworkValidator { expected }
    }

    pub fn expected(&self) -> &ChainId {
        &self.expected
    }

    pub fn validate(&self, chain: &ChainId) -> bool {
        let matched = match (parse_quantity(&chain.0), parse_quantity(&self.expected.0)) {
            (Some(actual), Some(expected)) => actual == expected,
            _ => chain.0 == self.expected.0,
        };
        if matched {
            info!("wallet is on expected chain {}", self.expected);
        } else {
            warn!(
                "wallet is on chain {}, expected chain {}",
                chain, self.expected
            );
        }
        matched
    }
}

fn parse_quantity(s: &str) -> Option<u64> {
    let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    u64::from_str_radix(hex, 16).ok()
}
