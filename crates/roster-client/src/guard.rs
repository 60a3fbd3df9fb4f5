use std::time::Duration;

use crate::ticket::{Generation, Ticket};

/// How long the denial notice stays up before navigating to the login page.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardNotice {
    LoginRequired,
    LoggedOut,
}

impl GuardNotice {
    pub fn message(self) -> &'static str {
        match self {
            GuardNotice::LoginRequired => "You must be logged in to access this page.",
            GuardNotice::LoggedOut => "Logout successful",
        }
    }

    pub fn is_success(self) -> bool {
        self == GuardNotice::LoggedOut
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardState {
    /// The session has not been read yet (server-side render).
    Checking,
    DeniedPendingRedirect(GuardNotice),
    DeniedRedirecting,
    Allowed,
}

/// Gatekeeper for authenticated-only views.
#[derive(Debug)]
pub struct RouteGuard {
    state: GuardState,
    redirects: Generation,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteGuard {
    pub fn new() -> Self {
        Self {
            state: GuardState::Checking,
            redirects: Generation::default(),
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Re-evaluates against the session. When this denies access it returns a
    /// ticket; the caller waits [`REDIRECT_DELAY`] and hands it to
    /// [`RouteGuard::redirect_elapsed`]. `take_logout_flag` is only consulted
    /// on a fresh denial.
    pub fn evaluate(
        &mut self,
        logged_in: bool,
        take_logout_flag: impl FnOnce() -> bool,
    ) -> Option<Ticket> {
        if logged_in {
            self.state = GuardState::Allowed;
            self.redirects.invalidate();
            return None;
        }

        match self.state {
            GuardState::DeniedPendingRedirect(_) | GuardState::DeniedRedirecting => None,
            GuardState::Checking | GuardState::Allowed => {
                let notice = if take_logout_flag() {
                    GuardNotice::LoggedOut
                } else {
                    GuardNotice::LoginRequired
                };
                self.state = GuardState::DeniedPendingRedirect(notice);
                Some(self.redirects.issue())
            }
        }
    }

    /// Returns `true` when the caller should navigate to the login page now.
    pub fn redirect_elapsed(&mut self, ticket: Ticket) -> bool {
        if !self.redirects.is_current(ticket) {
            return false;
        }
        match self.state {
            GuardState::DeniedPendingRedirect(_) => {
                self.state = GuardState::DeniedRedirecting;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn logged_in_is_allowed_immediately() {
        let mut guard = RouteGuard::new();
        assert_eq!(guard.state(), GuardState::Checking);

        assert_eq!(guard.evaluate(true, || panic!("flag must not be read")), None);
        assert_eq!(guard.state(), GuardState::Allowed);
    }

    #[test]
    fn denial_waits_then_redirects() {
        let mut guard = RouteGuard::new();
        let ticket = guard.evaluate(false, || false).unwrap();
        assert_eq!(guard.state(), GuardState::DeniedPendingRedirect(GuardNotice::LoginRequired));

        // Re-evaluating while denied keeps the running timer.
        assert_eq!(guard.evaluate(false, || true), None);

        assert!(guard.redirect_elapsed(ticket));
        assert_eq!(guard.state(), GuardState::DeniedRedirecting);
        assert!(!guard.redirect_elapsed(ticket));
    }

    #[test]
    fn logout_flag_picks_the_notice() {
        let mut guard = RouteGuard::new();
        guard.evaluate(true, || false);
        guard.evaluate(false, || true);

        let GuardState::DeniedPendingRedirect(notice) = guard.state() else {
            panic!("expected a pending redirect");
        };
        assert_eq!(notice.message(), "Logout successful");
        assert!(notice.is_success());
    }

    #[test]
    fn logging_in_during_the_delay_cancels_the_redirect() {
        let mut guard = RouteGuard::new();
        let ticket = guard.evaluate(false, || false).unwrap();
        guard.evaluate(true, || false);

        assert!(!guard.redirect_elapsed(ticket));
        assert_eq!(guard.state(), GuardState::Allowed);
    }
}
