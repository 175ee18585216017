//! # Caller Authentication
//!
//! Guarded transitions receive the caller's identity and role as plain
//! strings from the invoking layer. Turning that claim into a [`Caller`] the
//! state machine can trust is the job of an [`Authenticator`].
//!
//! - [`TrustedAuthenticator`] accepts every claim verbatim. This matches
//!   deployments where the dispatch layer has already verified the caller.
//! - [`StaticDirectory`] accepts only parties registered under the role they
//!   claim.

use std::collections::HashMap;

use thiserror::Error;

use atc_core::PartyId;
use atc_state::{Caller, Role};

/// Identity and role exactly as the invoking layer supplied them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerClaim {
    /// Claimed party identifier.
    pub id: String,
    /// Claimed role string (`seller`, `transporter`, `lease_company`).
    pub role: String,
}

impl CallerClaim {
    /// Build a claim from its two strings.
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
        }
    }
}

/// Why a claim was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The party is not known to the authenticator.
    #[error("unknown party {0}")]
    UnknownParty(String),

    /// The party is known but does not hold the claimed role.
    #[error("party {party} does not hold role {claimed:?}")]
    RoleNotHeld {
        /// The party that made the claim.
        party: String,
        /// The role it claimed.
        claimed: String,
    },
}

/// Resolves a caller claim to a verified caller.
pub trait Authenticator: Send + Sync {
    /// Verify `claim`.
    fn authenticate(&self, claim: &CallerClaim) -> Result<Caller, AuthError>;
}

/// Accepts every claim as stated.
///
/// Unknown role strings are not rejected here; they yield a caller with no
/// role, which no transition rule accepts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustedAuthenticator;

impl Authenticator for TrustedAuthenticator {
    fn authenticate(&self, claim: &CallerClaim) -> Result<Caller, AuthError> {
        Ok(Caller {
            id: PartyId::new(claim.id.as_str()),
            role: Role::from_claim(&claim.role),
        })
    }
}

/// Fixed party → role registry.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    parties: HashMap<PartyId, Role>,
}

impl StaticDirectory {
    /// Empty directory. Rejects everyone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `party` under `role`, replacing any earlier registration.
    pub fn register(mut self, party: impl Into<PartyId>, role: Role) -> Self {
        self.parties.insert(party.into(), role);
        self
    }
}

impl Authenticator for StaticDirectory {
    fn authenticate(&self, claim: &CallerClaim) -> Result<Caller, AuthError> {
        let id = PartyId::new(claim.id.as_str());
        let registered = self
            .parties
            .get(&id)
            .copied()
            .ok_or_else(|| AuthError::UnknownParty(claim.id.clone()))?;
        if Role::from_claim(&claim.role) != Some(registered) {
            return Err(AuthError::RoleNotHeld {
                party: claim.id.clone(),
                claimed: claim.role.clone(),
            });
        }
        Ok(Caller::new(id, registered))
    }
}
