//! Result of the most recently completed transaction.

use serde::{Deserialize, Serialize};

/// Last-known result of a completed transaction.
///
/// The engine settles each transaction exactly once; the settling observer
/// overwrites the previously recorded outcome. `Unknown` is only observable
/// before the first transaction has ever completed.
///
/// Engine-level failures carry no structured detail across the boundary:
/// abort and error collapse into the corresponding variant and the host
/// decides whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxOutcome {
    /// No transaction has completed yet.
    #[default]
    Unknown,
    /// The most recent transaction committed; its buffered writes are durable.
    Success,
    /// The engine errored the transaction (e.g., constraint violation).
    Error,
    /// The engine aborted the transaction (e.g., quota exceeded).
    Abort,
}

impl TxOutcome {
    /// Whether the most recent transaction committed.
    pub fn is_success(self) -> bool {
        matches!(self, TxOutcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_unknown() {
        assert_eq!(TxOutcome::default(), TxOutcome::Unknown);
        assert!(!TxOutcome::default().is_success());
    }

    #[test]
    fn only_success_is_success() {
        assert!(TxOutcome::Success.is_success());
        assert!(!TxOutcome::Error.is_success());
        assert!(!TxOutcome::Abort.is_success());
    }
}
