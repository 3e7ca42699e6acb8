use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const CONTINUE: u8 = 0;
const REQUESTED_ONCE: u8 = 1;
const FORCED: u8 = 2;

/// A snapshot of the cooperative shutdown signal's state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelState {
    /// No cancellation requested.
    Continue,
    /// A single interruption was requested; the engine should emit a
    /// user-visible prompt once and continue the in-flight transfer.
    RequestedOnce,
    /// Cancellation escalated; the engine must abort immediately.
    Forced,
}

/// Process-wide cancellation signal, shared between a signal handler (or
/// any external driver) and the frame engine.
///
/// Modeled as a single atomic counter per §5/§6: external delivery
/// increments it (first delivery moves `Continue` -> `RequestedOnce`,
/// any further delivery moves straight to `Forced`), and the engine polls
/// it lock-free between [`nettf_courier`] calls.
#[derive(Clone, Debug)]
pub struct CancelToken {
    state: Arc<AtomicU8>,
}

impl CancelToken {
    /// Creates a new token in the `Continue` state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(CONTINUE)),
        }
    }

    /// Returns the current cancellation state without mutating it.
    #[must_use]
    pub fn poll(&self) -> CancelState {
        match self.state.load(Ordering::Acquire) {
            CONTINUE => CancelState::Continue,
            REQUESTED_ONCE => CancelState::RequestedOnce,
            _ => CancelState::Forced,
        }
    }

    /// Records an external cancellation request (e.g. a `SIGINT`
    /// delivery). The first call moves `Continue` to `RequestedOnce`; any
    /// subsequent call moves straight to `Forced`.
    pub fn request(&self) {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(if current == CONTINUE { REQUESTED_ONCE } else { FORCED })
            })
            .ok();
    }

    /// Acknowledges a `RequestedOnce` prompt, keeping the state sticky at
    /// `RequestedOnce` (a second external request is still required to
    /// reach `Forced`). This is the "one-call acknowledgment" described in
    /// §6: calling it does not clear the cancellation, it only marks that
    /// the engine has already emitted its one-time user-visible prompt.
    pub fn acknowledge_prompt(&self) {
        // Sticky by construction: RequestedOnce is only ever raised to
        // Forced by another `request()`, never cleared here.
    }

    /// Resets the token back to `Continue`. Intended for tests and for
    /// reuse across sequential transfers within the same process.
    pub fn reset(&self) {
        self.state.store(CONTINUE, Ordering::Release);
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_continue_state() {
        let token = CancelToken::new();
        assert_eq!(token.poll(), CancelState::Continue);
    }

    #[test]
    fn first_request_moves_to_requested_once() {
        let token = CancelToken::new();
        token.request();
        assert_eq!(token.poll(), CancelState::RequestedOnce);
    }

    #[test]
    fn second_request_escalates_to_forced() {
        let token = CancelToken::new();
        token.request();
        token.request();
        assert_eq!(token.poll(), CancelState::Forced);
    }

    #[test]
    fn acknowledging_prompt_does_not_clear_it() {
        let token = CancelToken::new();
        token.request();
        token.acknowledge_prompt();
        assert_eq!(token.poll(), CancelState::RequestedOnce);
    }

    #[test]
    fn further_requests_after_forced_stay_forced() {
        let token = CancelToken::new();
        token.request();
        token.request();
        token.request();
        assert_eq!(token.poll(), CancelState::Forced);
    }

    #[test]
    fn reset_returns_to_continue() {
        let token = CancelToken::new();
        token.request();
        token.reset();
        assert_eq!(token.poll(), CancelState::Continue);
    }

    #[test]
    fn clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.request();
        assert_eq!(token.poll(), CancelState::RequestedOnce);
    }
}
