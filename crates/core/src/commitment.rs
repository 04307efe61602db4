// SPDX-License-Identifier: MIT

//! Commitment state machine: durable intentions tracked across heartbeats.

use crate::id::CommitmentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of a commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitmentState {
    Candidate,
    Active,
    Paused,
    Satisfied,
    Abandoned,
}

impl CommitmentState {
    pub fn is_terminal(self) -> bool {
        matches!(self, CommitmentState::Satisfied | CommitmentState::Abandoned)
    }

    /// Valid transition targets per spec.md §3.
    pub fn valid_targets(self) -> &'static [CommitmentState] {
        match self {
            CommitmentState::Candidate => &[CommitmentState::Active],
            CommitmentState::Active => &[
                CommitmentState::Paused,
                CommitmentState::Satisfied,
                CommitmentState::Abandoned,
            ],
            CommitmentState::Paused => &[CommitmentState::Active, CommitmentState::Abandoned],
            CommitmentState::Satisfied | CommitmentState::Abandoned => &[],
        }
    }

    pub fn can_transition_to(self, to: CommitmentState) -> bool {
        self.valid_targets().contains(&to)
    }
}

/// Horizon over which a commitment is expected to advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    Session,
    Week,
    Quarter,
    Long,
}

impl Horizon {
    /// Window size in days, per the GLOSSARY in spec.md.
    pub fn window_days(self) -> i64 {
        match self {
            Horizon::Session => 1,
            Horizon::Week => 7,
            Horizon::Quarter => 90,
            Horizon::Long => 180,
        }
    }
}

/// Whether the underlying desire driving a commitment is thick (genuinely
/// wanted) or thin (externally imposed), per spec.md §4.9's deferral rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesireClass {
    Thick,
    Thin,
    Unknown,
}

/// Whether the friction involved in advancing a commitment is constitutive
/// (part of the activity itself) or incidental (avoidable busywork).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrictionClass {
    Constitutive,
    Incidental,
    Unknown,
}

/// Who proposed a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposedBy {
    Engine,
    Human,
}

/// A recorded state change in a commitment's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: CommitmentState,
    pub to: CommitmentState,
    pub at: DateTime<Utc>,
    pub reason: String,
    #[serde(rename = "proposedBy")]
    pub proposed_by: ProposedBy,
    pub accepted: bool,
}

/// How an advancement signal was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalMethod {
    Direct,
    Inferred,
}

/// Evidence that a commitment moved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancementSignal {
    pub at: DateTime<Utc>,
    pub action: String,
    #[serde(rename = "relevanceScore")]
    pub relevance_score: f64,
    pub method: SignalMethod,
}

/// Threshold above which an advancement signal updates `last_advanced_at`.
pub const ADVANCEMENT_THRESHOLD: f64 = 0.5;

/// A drift measurement recorded against a commitment, appended when
/// `DriftDetector` finds `driftScore > 0.7` (spec.md §4.9 step 5a.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftSnapshot {
    pub at: DateTime<Utc>,
    #[serde(rename = "driftScore")]
    pub drift_score: f64,
    pub summary: String,
}

/// A durable intention in the typed state machine described by spec.md §3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commitment {
    pub id: CommitmentId,
    pub label: String,
    pub state: CommitmentState,
    pub priority: i32,
    pub horizon: Horizon,
    #[serde(rename = "desireClass", default = "default_desire_class")]
    pub desire_class: DesireClass,
    #[serde(rename = "frictionClass", default = "default_friction_class")]
    pub friction_class: FrictionClass,
    pub source: String,
    #[serde(rename = "lastAdvancedAt", default, skip_serializing_if = "Option::is_none")]
    pub last_advanced_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub evidence: Vec<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "stateHistory", default)]
    pub state_history: Vec<StateTransition>,
    #[serde(rename = "advancementSignals", default)]
    pub advancement_signals: Vec<AdvancementSignal>,
    #[serde(rename = "outcomePattern", default, skip_serializing_if = "Option::is_none")]
    pub outcome_pattern: Option<String>,
    #[serde(rename = "driftSnapshots", default, skip_serializing_if = "Option::is_none")]
    pub drift_snapshots: Option<Vec<DriftSnapshot>>,
    #[serde(rename = "desireClassRationale", default, skip_serializing_if = "Option::is_none")]
    pub desire_class_rationale: Option<String>,
}

fn default_desire_class() -> DesireClass {
    DesireClass::Unknown
}

fn default_friction_class() -> FrictionClass {
    FrictionClass::Unknown
}

/// Errors raised by commitment lifecycle operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommitmentError {
    #[error("cannot transition commitment {id} from {from:?} to {to:?}")]
    InvalidTransition {
        id: String,
        from: CommitmentState,
        to: CommitmentState,
    },
}

impl Commitment {
    /// Record a state transition, validating it against the allowed-target
    /// table in spec.md §3. Fails with `CommitmentError::InvalidTransition`
    /// without mutating the commitment.
    pub fn record_state_transition(
        &mut self,
        to: CommitmentState,
        reason: impl Into<String>,
        proposed_by: ProposedBy,
        at: DateTime<Utc>,
    ) -> Result<(), CommitmentError> {
        if !self.state.can_transition_to(to) {
            return Err(CommitmentError::InvalidTransition {
                id: self.id.as_str().to_string(),
                from: self.state,
                to,
            });
        }
        self.state_history.push(StateTransition {
            from: self.state,
            to,
            at,
            reason: reason.into(),
            proposed_by,
            accepted: true,
        });
        self.state = to;
        Ok(())
    }

    /// Record an advancement signal. If `score > 0.5`, `last_advanced_at`
    /// is updated, per spec.md §3's AdvancementSignal definition.
    pub fn record_advancement_signal(
        &mut self,
        action: impl Into<String>,
        score: f64,
        method: SignalMethod,
        at: DateTime<Utc>,
    ) {
        if score > ADVANCEMENT_THRESHOLD {
            self.last_advanced_at = Some(at);
        }
        self.advancement_signals.push(AdvancementSignal {
            at,
            action: action.into(),
            relevance_score: score,
            method,
        });
    }

    /// Append a drift snapshot (keeps all history; callers that want a
    /// bounded window should slice the returned vec).
    pub fn append_drift_snapshot(&mut self, snapshot: DriftSnapshot) {
        self.drift_snapshots.get_or_insert_with(Vec::new).push(snapshot);
    }

    pub fn is_active(&self) -> bool {
        self.state == CommitmentState::Active
    }
}

/// The durable store file: `ops/commitments.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitmentStoreFile {
    pub version: u32,
    pub commitments: Vec<Commitment>,
    #[serde(rename = "lastEvaluatedAt")]
    pub last_evaluated_at: DateTime<Utc>,
}

impl CommitmentStoreFile {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            version: 1,
            commitments: Vec::new(),
            last_evaluated_at: now,
        }
    }
}

#[cfg(test)]
#[path = "commitment_tests.rs"]
mod tests;
