use super::errors::{GuardError, GuardResult};
use super::states::ContactStatus;
use ContactStatus::*;

const NON_TERMINAL: &[ContactStatus] = &[Pending, Queued, Sent, Delivered, Opened, Clicked, Replied];

/// Transition guard for contact status.
///
/// The whole ordering lives in [`StatusGuard::allowed_predecessors`]. The same
/// table drives the in-process check and the store's conditional update, so a
/// transition the guard rejects can never be written by a racing request either.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusGuard;

impl StatusGuard {
    /// Statuses a contact may be in for `incoming` to be written over them.
    ///
    /// - `queued` only from `pending` (dispatch)
    /// - `sent`/`delivered` from anything earlier in the progression
    /// - `opened` only from `sent`/`delivered`, `clicked` additionally from `opened`
    /// - `replied` once the message went out and before any terminal state
    /// - `bounced`/`converted` override every non-terminal state, once
    pub fn allowed_predecessors(incoming: ContactStatus) -> &'static [ContactStatus] {
        match incoming {
            Pending => &[],
            Queued => &[Pending],
            Sent => &[Pending, Queued],
            Delivered => &[Pending, Queued, Sent],
            Opened => &[Sent, Delivered],
            Clicked => &[Sent, Delivered, Opened],
            Replied => &[Sent, Delivered, Opened, Clicked],
            Bounced | Converted => NON_TERMINAL,
        }
    }

    /// Check if a contact in `current` may move to `incoming`
    pub fn can_transition(current: ContactStatus, incoming: ContactStatus) -> bool {
        Self::allowed_predecessors(incoming).contains(&current)
    }

    /// Like [`StatusGuard::can_transition`] but explains a rejection
    pub fn check(current: ContactStatus, incoming: ContactStatus) -> GuardResult<()> {
        if Self::can_transition(current, incoming) {
            return Ok(());
        }
        if current.is_terminal() {
            return Err(GuardError::TerminalState { current });
        }
        if current == incoming {
            return Err(GuardError::AlreadyInState { current });
        }
        Err(GuardError::NotPermitted {
            from: current,
            to: incoming,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_progression() {
        assert!(StatusGuard::can_transition(Pending, Queued));
        assert!(StatusGuard::can_transition(Queued, Sent));
        assert!(StatusGuard::can_transition(Sent, Delivered));
        assert!(StatusGuard::can_transition(Delivered, Opened));
        assert!(StatusGuard::can_transition(Opened, Clicked));
        assert!(StatusGuard::can_transition(Clicked, Replied));
        assert!(StatusGuard::can_transition(Replied, Converted));
    }

    #[test]
    fn test_no_regression() {
        assert!(!StatusGuard::can_transition(Delivered, Sent));
        assert!(!StatusGuard::can_transition(Opened, Delivered));
        assert!(!StatusGuard::can_transition(Clicked, Opened));
        assert!(!StatusGuard::can_transition(Queued, Pending));
        assert!(!StatusGuard::can_transition(Sent, Queued));
    }

    #[test]
    fn test_engagement_requires_delivery_path() {
        assert!(!StatusGuard::can_transition(Queued, Opened));
        assert!(!StatusGuard::can_transition(Pending, Clicked));
        assert!(StatusGuard::can_transition(Sent, Clicked));
        assert!(!StatusGuard::can_transition(Replied, Opened));
        assert!(!StatusGuard::can_transition(Queued, Replied));
    }

    #[test]
    fn test_duplicates_are_rejected() {
        for status in ContactStatus::ALL {
            assert!(
                !StatusGuard::can_transition(status, status),
                "{status} -> {status} must not be permitted"
            );
        }
    }

    #[test]
    fn test_terminal_overrides_apply_once() {
        assert!(StatusGuard::can_transition(Replied, Bounced));
        assert!(StatusGuard::can_transition(Opened, Converted));
        assert!(StatusGuard::can_transition(Pending, Converted));
        assert!(!StatusGuard::can_transition(Converted, Bounced));
        assert!(!StatusGuard::can_transition(Bounced, Converted));
        assert!(!StatusGuard::can_transition(Bounced, Bounced));
    }

    #[test]
    fn test_every_permitted_transition_moves_forward() {
        for current in ContactStatus::ALL {
            for incoming in ContactStatus::ALL {
                if StatusGuard::can_transition(current, incoming) {
                    assert!(
                        incoming.rank() > current.rank(),
                        "{current} -> {incoming} is permitted but not forward"
                    );
                }
            }
        }
    }

    #[test]
    fn test_check_reasons() {
        assert!(StatusGuard::check(Sent, Delivered).is_ok());
        assert!(matches!(
            StatusGuard::check(Converted, Bounced),
            Err(GuardError::TerminalState { current: Converted })
        ));
        assert!(matches!(
            StatusGuard::check(Opened, Opened),
            Err(GuardError::AlreadyInState { current: Opened })
        ));
        assert!(matches!(
            StatusGuard::check(Delivered, Sent),
            Err(GuardError::NotPermitted { from: Delivered, to: Sent })
        ));
    }
}
