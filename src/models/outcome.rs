//! Result provenance and batch outcomes.

use serde::{Deserialize, Serialize};

/// Whether a calculator result was computed from data or substituted.
///
/// Calculators that degrade on missing configuration or store failures
/// return zeros tagged [`Provenance::Degraded`], so callers can tell a true
/// zero from an unknown one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Provenance {
    /// Computed from the stored records.
    Computed,
    /// Substituted with zeros.
    Degraded {
        /// What prevented the computation.
        reason: String,
    },
}

impl Provenance {
    /// True for [`Provenance::Degraded`].
    pub fn is_degraded(&self) -> bool {
        matches!(self, Provenance::Degraded { .. })
    }
}

/// Outcome of a batch of independent writes.
///
/// One item failing never stops the others; each lands in exactly one of
/// the two lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome<K> {
    /// Keys written successfully.
    pub succeeded: Vec<K>,
    /// Keys that failed, with the reason.
    pub failed: Vec<(K, String)>,
}

impl<K> Default for BatchOutcome<K> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<K> BatchOutcome<K> {
    /// An empty outcome.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a success.
    pub fn succeed(&mut self, key: K) {
        self.succeeded.push(key);
    }

    /// Records a failure.
    pub fn fail(&mut self, key: K, reason: impl Into<String>) {
        self.failed.push((key, reason.into()));
    }

    /// `(success count, failure count)`.
    pub fn counts(&self) -> (usize, usize) {
        (self.succeeded.len(), self.failed.len())
    }

    /// True when nothing failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
