use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::{AccountId, ChainId, Micros};
use crate::error::{CraftError, Result};

// -------------------------------------------------------------------------------------------------

/// Lifecycle state of a [`Chain`].
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub enum ChainState {
    #[default]
    Draft,
    Ready,
    Fabricate,
    Complete,
    Failed,
    Erase,
}

impl ChainState {
    /// States this state may be changed to, including itself.
    pub fn allowed_transitions(&self) -> &'static [ChainState] {
        use ChainState::*;
        match self {
            Draft => &[Draft, Ready, Failed],
            Ready => &[Ready, Draft, Fabricate, Failed],
            Fabricate => &[Fabricate, Complete, Failed],
            Complete => &[Complete, Erase],
            Failed => &[Failed, Erase],
            Erase => &[Erase],
        }
    }

    /// Fail with an `InvalidChainTransition` error when changing to `to` is not allowed.
    pub fn protect_transition(&self, to: ChainState) -> Result<()> {
        if self.allowed_transitions().contains(&to) {
            Ok(())
        } else {
            Err(CraftError::InvalidChainTransition { from: *self, to })
        }
    }
}

impl Display for ChainState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

// -------------------------------------------------------------------------------------------------

/// Type of a [`Chain`].
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub enum ChainType {
    #[default]
    Preview,
    Production,
}

// -------------------------------------------------------------------------------------------------

/// An ordered fabrication job, producing a sequence of segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    pub id: ChainId,
    pub account_id: AccountId,
    pub name: String,
    #[serde(default)]
    state: ChainState,
    #[serde(default)]
    pub chain_type: ChainType,
    #[serde(default)]
    pub start_at: Option<Micros>,
    #[serde(default)]
    pub stop_at: Option<Micros>,
    #[serde(default)]
    pub embed_key: Option<String>,
}

impl Chain {
    /// Create a new draft preview chain.
    pub fn new(account_id: AccountId, name: &str) -> Self {
        Self {
            id: ChainId::unique(),
            account_id,
            name: name.to_string(),
            state: ChainState::default(),
            chain_type: ChainType::default(),
            start_at: None,
            stop_at: None,
            embed_key: None,
        }
    }

    /// Return a new chain instance with the given type.
    #[must_use]
    pub fn with_type(self, chain_type: ChainType) -> Self {
        Self { chain_type, ..self }
    }

    /// Return a new chain instance with the given start and optional stop time.
    #[must_use]
    pub fn with_times(self, start_at: Micros, stop_at: Option<Micros>) -> Self {
        let start_at = Some(start_at);
        Self {
            start_at,
            stop_at,
            ..self
        }
    }

    /// Return a new chain instance with the given embed key.
    #[must_use]
    pub fn with_embed_key(self, embed_key: &str) -> Self {
        let embed_key = Some(embed_key.to_string());
        Self { embed_key, ..self }
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Change the chain's state, when allowed by the chain's state transition table.
    pub fn set_state(&mut self, state: ChainState) -> Result<()> {
        self.state.protect_transition(state)?;
        self.state = state;
        Ok(())
    }

    /// Key which identifies the chain in storage keys: the embed key, when set, else its id.
    pub fn storage_prefix(&self) -> String {
        match &self.embed_key {
            Some(key) if !key.is_empty() => key.clone(),
            _ => format!("chain-{}", self.id),
        }
    }

    /// Check the chain's invariants.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CraftError::Validation("Chain name is required".to_string()));
        }
        if self.chain_type == ChainType::Production && self.start_at.is_none() {
            return Err(CraftError::Validation(
                "Production chain requires a start time".to_string(),
            ));
        }
        if let (Some(start), Some(stop)) = (self.start_at, self.stop_at) {
            if stop < start {
                return Err(CraftError::Validation(format!(
                    "Chain stop time {} is before its start time {}",
                    stop, start
                )));
            }
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let chain = Chain::new(AccountId::from(1), "Test");
        assert_eq!(chain.state(), ChainState::Draft);
        assert_eq!(chain.chain_type, ChainType::Preview);
        assert!(chain.validate().is_ok());

        let json = r#"{ "id": 5, "account_id": 1, "name": "From JSON" }"#;
        let chain: Chain = serde_json::from_str(json).unwrap();
        assert_eq!(chain.state(), ChainState::Draft);
        assert_eq!(chain.chain_type, ChainType::Preview);
    }

    #[test]
    fn validation() {
        assert!(Chain::new(AccountId::from(1), " ").validate().is_err());
        let production = Chain::new(AccountId::from(1), "Live").with_type(ChainType::Production);
        assert!(matches!(
            production.validate(),
            Err(CraftError::Validation(_))
        ));
        assert!(production.with_times(1_000, None).validate().is_ok());
        assert!(Chain::new(AccountId::from(1), "Backwards")
            .with_times(1_000, Some(10))
            .validate()
            .is_err());
    }

    #[test]
    fn transitions() {
        let mut chain = Chain::new(AccountId::from(1), "Test");
        assert!(chain.set_state(ChainState::Fabricate).is_err());
        assert!(chain.set_state(ChainState::Ready).is_ok());
        assert!(chain.set_state(ChainState::Fabricate).is_ok());
        assert_eq!(
            chain.set_state(ChainState::Draft),
            Err(CraftError::InvalidChainTransition {
                from: ChainState::Fabricate,
                to: ChainState::Draft
            })
        );
        assert!(chain.set_state(ChainState::Complete).is_ok());
        assert!(chain.set_state(ChainState::Erase).is_ok());
        assert!(chain.set_state(ChainState::Ready).is_err());
    }

    #[test]
    fn storage_prefix() {
        let chain = Chain::new(AccountId::from(1), "Test");
        assert_eq!(chain.storage_prefix(), format!("chain-{}", chain.id));
        assert_eq!(chain.with_embed_key("lofi").storage_prefix(), "lofi");
    }
}
