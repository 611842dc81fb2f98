// Login lockout guard

use chrono::{DateTime, Utc};

use crate::auth::error::AuthError;
use crate::config::LockoutPolicy;
use crate::validation::parse_iso8601;

/// Decides whether a login attempt may reach the password check
#[derive(Debug, Clone, Copy)]
pub struct LoginGuard {
    policy: LockoutPolicy,
}

impl LoginGuard {
    pub fn new(policy: LockoutPolicy) -> Self {
        Self { policy }
    }

    /// Check an account's failure bookkeeping at time `now`
    ///
    /// Below the threshold the attempt always proceeds. At or above it, a recorded
    /// failure timestamp must be readable and at least one window old; with no
    /// timestamp recorded there is nothing to measure and the attempt proceeds.
    /// An expired window lifts the lock without resetting the counter.
    pub fn check(
        &self,
        failed_attempts: i32,
        last_failed_attempt: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        if failed_attempts < self.policy.max_attempts {
            return Ok(());
        }

        let Some(last_failed) = last_failed_attempt else {
            return Ok(());
        };
        let last_failed = parse_iso8601(last_failed).ok_or(AuthError::InvalidLastFailedTimestamp)?;

        // a timestamp in the future counts as still inside the window
        let locked = match (now - last_failed).to_std() {
            Ok(elapsed) => elapsed < self.policy.window,
            Err(_) => true,
        };

        if locked {
            tracing::warn!(
                "Login refused: {} failed attempts, last at {}",
                failed_attempts,
                last_failed
            );
            Err(AuthError::TooManyFailedAttempts)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::format_iso8601;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn guard() -> LoginGuard {
        LoginGuard::new(LockoutPolicy::default())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 13, 15, 0, 0).unwrap()
    }

    #[test]
    fn test_below_threshold_proceeds_without_timestamp() {
        assert!(guard().check(0, None, now()).is_ok());
        assert!(guard().check(4, Some("garbage"), now()).is_ok());
    }

    #[test]
    fn test_fifth_failure_locks_within_window() {
        let last = format_iso8601(now() - Duration::hours(1));
        let result = guard().check(5, Some(&last), now());
        assert!(matches!(result, Err(AuthError::TooManyFailedAttempts)));
    }

    #[test]
    fn test_lock_lifts_after_window() {
        let last = format_iso8601(now() - Duration::hours(24));
        assert!(guard().check(5, Some(&last), now()).is_ok());
        assert!(guard().check(12, Some(&last), now()).is_ok());
    }

    #[test]
    fn test_unreadable_timestamp_at_threshold() {
        assert!(matches!(
            guard().check(5, Some("yesterday"), now()),
            Err(AuthError::InvalidLastFailedTimestamp)
        ));
    }

    #[test]
    fn test_threshold_without_timestamp_proceeds() {
        assert!(guard().check(5, None, now()).is_ok());
        assert!(guard().check(40, None, now()).is_ok());
    }

    #[test]
    fn test_future_timestamp_stays_locked() {
        let last = format_iso8601(now() + Duration::minutes(5));
        assert!(matches!(
            guard().check(5, Some(&last), now()),
            Err(AuthError::TooManyFailedAttempts)
        ));
    }

    #[test]
    fn test_custom_policy() {
        let guard = LoginGuard::new(LockoutPolicy {
            max_attempts: 3,
            window: std::time::Duration::from_secs(60),
        });
        let last = format_iso8601(now() - Duration::seconds(30));
        assert!(guard.check(2, Some(&last), now()).is_ok());
        assert!(guard.check(3, Some(&last), now()).is_err());
        let old = format_iso8601(now() - Duration::seconds(61));
        assert!(guard.check(3, Some(&old), now()).is_ok());
    }

    proptest! {
        #[test]
        fn prop_locked_iff_inside_window(attempts in 5i32..50, secs_ago in 0i64..172_800) {
            let last = format_iso8601(now() - Duration::seconds(secs_ago));
            let result = guard().check(attempts, Some(&last), now());
            if secs_ago < 86_400 {
                prop_assert!(matches!(result, Err(AuthError::TooManyFailedAttempts)));
            } else {
                prop_assert!(result.is_ok());
            }
        }

        #[test]
        fn prop_under_threshold_never_locked(attempts in 0i32..5, secs_ago in 0i64..172_800) {
            let last = format_iso8601(now() - Duration::seconds(secs_ago));
            prop_assert!(guard().check(attempts, Some(&last), now()).is_ok());
        }
    }
}
