//! Coupon validation and per-session coupon state.
//!
//! The shop accepts exactly one case-sensitive coupon code. A coupon may be
//! applied at most once per session: once it succeeds, every later attempt
//! fails with [`CouponError::AlreadyApplied`], whatever the code. Coupon
//! state is never persisted, so a new session starts without a discount.

use serde::Serialize;
use thiserror::Error;

/// The only accepted coupon code. Matching is case-sensitive.
pub const COUPON_CODE: &str = "POWERLABSx";

/// Errors returned when applying a coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CouponError {
    /// The code does not match the accepted coupon.
    #[error("Invalid coupon code.")]
    InvalidCoupon,
    /// A coupon was already applied this session.
    #[error("Coupon already applied.")]
    AlreadyApplied,
}

/// Check a coupon code.
///
/// Surrounding whitespace is ignored; everything else must match
/// [`COUPON_CODE`] exactly.
///
/// # Errors
///
/// Returns [`CouponError::AlreadyApplied`] if `already_applied` is set, even
/// for a valid code, and [`CouponError::InvalidCoupon`] for any other code.
///
/// ```rust
/// use powerlabs_core::{CouponError, validate_coupon};
///
/// assert!(validate_coupon("POWERLABSx", false).is_ok());
/// assert_eq!(validate_coupon("powerlabsx", false), Err(CouponError::InvalidCoupon));
/// assert_eq!(validate_coupon("POWERLABSx", true), Err(CouponError::AlreadyApplied));
/// ```
pub fn validate_coupon(code: &str, already_applied: bool) -> Result<(), CouponError> {
    if already_applied {
        return Err(CouponError::AlreadyApplied);
    }
    if code.trim() == COUPON_CODE {
        Ok(())
    } else {
        Err(CouponError::InvalidCoupon)
    }
}

/// Coupon state for one shopping session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CouponState {
    applied: bool,
    last_error: Option<String>,
}

impl CouponState {
    /// Fresh state with no coupon applied.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            applied: false,
            last_error: None,
        }
    }

    /// Whether a coupon has been applied this session.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        self.applied
    }

    /// Message from the last failed attempt, cleared on success.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Try to apply a coupon code, recording the outcome.
    ///
    /// # Errors
    ///
    /// Returns the [`CouponError`] from [`validate_coupon`]; its message is
    /// also kept in [`Self::last_error`].
    pub fn apply(&mut self, code: &str) -> Result<(), CouponError> {
        match validate_coupon(code, self.applied) {
            Ok(()) => {
                self.applied = true;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Forget any applied coupon and error.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_code_applies_once() {
        let mut state = CouponState::new();

        assert_eq!(state.apply("POWERLABSx"), Ok(()));
        assert!(state.is_applied());
        assert_eq!(state.last_error(), None);

        assert_eq!(state.apply("POWERLABSx"), Err(CouponError::AlreadyApplied));
        assert_eq!(state.last_error(), Some("Coupon already applied."));
        assert!(state.is_applied());
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let mut state = CouponState::new();

        assert_eq!(state.apply("powerlabsx"), Err(CouponError::InvalidCoupon));
        assert_eq!(state.apply("POWERLABSX"), Err(CouponError::InvalidCoupon));
        assert!(!state.is_applied());
        assert_eq!(state.last_error(), Some("Invalid coupon code."));
    }

    #[test]
    fn test_invalid_then_valid_clears_error() {
        let mut state = CouponState::new();

        assert!(state.apply("SAVE10").is_err());
        assert!(state.apply("POWERLABSx").is_ok());
        assert_eq!(state.last_error(), None);
    }

    #[test]
    fn test_already_applied_wins_over_invalid_code() {
        assert_eq!(validate_coupon("nope", true), Err(CouponError::AlreadyApplied));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(validate_coupon("  POWERLABSx\n", false), Ok(()));
        assert_eq!(validate_coupon("POWER LABSx", false), Err(CouponError::InvalidCoupon));
    }

    #[test]
    fn test_empty_code_is_invalid() {
        assert_eq!(validate_coupon("", false), Err(CouponError::InvalidCoupon));
    }

    #[test]
    fn test_reset() {
        let mut state = CouponState::new();
        assert!(state.apply("POWERLABSx").is_ok());
        state.reset();

        assert_eq!(state, CouponState::new());
    }
}
