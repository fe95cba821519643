//! # Deletion Gate
//!
//! Destructive operations go through a two-step confirmation:
//!
//! ```text
//!        request(id)                 confirm(code) ok
//! Idle ─────────────▶ Awaiting ─────────────────────▶ (Confirmed) ──▶ Idle
//!   ▲                  │    ▲                               │
//!   │      cancel()    │    │ confirm(code) wrong           └─ one delete call
//!   └──────────────────┘    └──────── stays Awaiting
//! ```
//!
//! `Confirmed` and `Cancelled` are not resting states: the gate is back in
//! `Idle` by the time `confirm` or `cancel` returns.
//!
//! The confirmation code is a single shared secret from the configuration.
//! Wrong codes are not counted and there is no lockout.

use crate::error::{CareError, Result};
use crate::model::Collection;
use crate::store::RecordStore;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub collection: Collection,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Idle,
    AwaitingConfirmation(DeleteTarget),
}

#[derive(Debug, Clone)]
pub struct DeletionGate {
    code: String,
    state: GateState,
}

impl DeletionGate {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            state: GateState::Idle,
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn pending(&self) -> Option<&DeleteTarget> {
        match &self.state {
            GateState::AwaitingConfirmation(target) => Some(target),
            GateState::Idle => None,
        }
    }

    /// Captures a delete target. A newer request replaces a pending one.
    pub fn request(&mut self, collection: Collection, id: impl Into<String>) {
        self.state = GateState::AwaitingConfirmation(DeleteTarget {
            collection,
            id: id.into(),
        });
    }

    /// Drops the pending target, if any, and returns it.
    pub fn cancel(&mut self) -> Option<DeleteTarget> {
        match std::mem::take(&mut self.state) {
            GateState::AwaitingConfirmation(target) => Some(target),
            GateState::Idle => None,
        }
    }

    /// Checks `code` and, if it matches, issues exactly one delete for the
    /// pending target. The gate returns to `Idle` whatever the store answers.
    pub fn confirm<S: RecordStore>(&mut self, code: &str, store: &mut S) -> Result<DeleteTarget> {
        if self.pending().is_none() {
            return Err(CareError::NothingPending);
        }
        if code != self.code {
            warn!("deletion rejected: confirmation code mismatch");
            return Err(CareError::ConfirmationMismatch);
        }
        let Some(target) = self.cancel() else {
            return Err(CareError::NothingPending);
        };

        match store.delete_by_id(target.collection, &target.id) {
            Ok(()) => {
                info!(collection = %target.collection, id = %target.id, "record deleted");
                Ok(target)
            }
            Err(e) => {
                warn!(collection = %target.collection, id = %target.id, error = %e, "delete failed");
                Err(CareError::Delete {
                    id: target.id,
                    reason: e.to_string(),
                })
            }
        }
    }
}
