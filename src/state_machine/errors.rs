use thiserror::Error;

use super::states::ContactStatus;

/// Why a contact transition was refused by the guard.
///
/// Refusals are not failures: ingestion treats them as no-ops.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("Contact is in terminal state {current}")]
    TerminalState { current: ContactStatus },

    #[error("Contact is already {current}")]
    AlreadyInState { current: ContactStatus },

    #[error("Transition from {from} to {to} is not permitted")]
    NotPermitted {
        from: ContactStatus,
        to: ContactStatus,
    },
}

pub type GuardResult<T> = Result<T, GuardError>;
