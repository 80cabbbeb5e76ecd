//! Direct message send gate
//!
//! Sending a direct message goes through the same parental gate as every other
//! action, then through the rate limit. The `dm_*` dev overrides resolve into
//! [`DmBehavior`] and can disable the rate limit, force failures, or delay sends.

use crate::parental::{blocked_reason, BlockedReason, Feature, FeatureLockSet};
use crate::resolver::EffectiveConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Resolved direct message behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmBehavior {
    /// Whether the send rate limit applies
    pub rate_limit_enabled: bool,
    /// Whether every send must fail
    pub force_send_failure: bool,
    /// Delay to apply before sending
    pub send_delay: Duration,
}

impl Default for DmBehavior {
    fn default() -> Self {
        Self {
            rate_limit_enabled: true,
            force_send_failure: false,
            send_delay: Duration::ZERO,
        }
    }
}

/// Direct message rate limit configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmRateLimit {
    /// Messages allowed per window
    #[serde(default = "default_max_messages")]
    pub max_messages: u32,
    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_max_messages() -> u32 {
    10
}

fn default_window_secs() -> u64 {
    60
}

impl Default for DmRateLimit {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
            window_secs: default_window_secs(),
        }
    }
}

impl DmRateLimit {
    /// Create a rate limit
    pub fn new(max_messages: u32, window_secs: u64) -> Self {
        Self { max_messages, window_secs }
    }

    /// Window length
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Outcome of checking a direct message send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DmSendDecision {
    /// Send after `delay`
    Send {
        /// Delay before sending
        delay: Duration,
    },
    /// Messaging is locked by parental controls
    Blocked(BlockedReason),
    /// A dev override forces the send to fail
    ForcedFailure,
    /// Too many messages were sent recently
    RateLimited {
        /// Time until the oldest send leaves the window
        retry_after: Duration,
    },
}

impl DmSendDecision {
    /// Check if the message may be sent
    pub fn is_send(&self) -> bool {
        matches!(self, DmSendDecision::Send { .. })
    }
}

/// Gate for direct message sends
#[derive(Debug, Clone, Default)]
pub struct DmSendGate {
    limit: DmRateLimit,
}

impl DmSendGate {
    /// Create a gate with the given rate limit
    pub fn new(limit: DmRateLimit) -> Self {
        Self { limit }
    }

    /// Get the rate limit
    pub fn limit(&self) -> &DmRateLimit {
        &self.limit
    }

    /// Decide whether a message may be sent now
    ///
    /// `recent_sends` holds the times of the user's previous sends; entries
    /// older than the window are ignored and entries in the future count as
    /// just sent.
    pub fn check(
        &self,
        config: &EffectiveConfig,
        locks: &FeatureLockSet,
        recent_sends: &[DateTime<Utc>],
        now: DateTime<Utc>,
    ) -> DmSendDecision {
        if let Some(reason) = blocked_reason(config, locks, Feature::Messaging) {
            return DmSendDecision::Blocked(reason);
        }

        let behavior = config.messaging();
        if behavior.force_send_failure {
            return DmSendDecision::ForcedFailure;
        }

        if behavior.rate_limit_enabled {
            if let Some(retry_after) = self.retry_after(recent_sends, now) {
                return DmSendDecision::RateLimited { retry_after };
            }
        }

        DmSendDecision::Send { delay: behavior.send_delay }
    }

    fn retry_after(&self, recent_sends: &[DateTime<Utc>], now: DateTime<Utc>) -> Option<Duration> {
        let window = self.limit.window();
        let ages: Vec<Duration> = recent_sends
            .iter()
            .map(|sent| now.signed_duration_since(*sent).to_std().unwrap_or(Duration::ZERO))
            .filter(|age| *age < window)
            .collect();

        if ages.len() < self.limit.max_messages as usize {
            return None;
        }

        let oldest = ages.iter().max().copied().unwrap_or(Duration::ZERO);
        Some(window.saturating_sub(oldest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audience::Audience;
    use crate::overrides::DevOverrideSet;
    use crate::resolver::resolve;
    use crate::state::SafetyState;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn seconds_ago(secs: i64) -> DateTime<Utc> {
        now() - chrono::Duration::seconds(secs)
    }

    fn config(overrides: DevOverrideSet) -> EffectiveConfig {
        resolve(&SafetyState::for_audience(Audience::Teen), &overrides)
    }

    #[test]
    fn test_rate_limit_defaults() {
        let limit = DmRateLimit::default();
        assert_eq!(limit.max_messages, 10);
        assert_eq!(limit.window(), Duration::from_secs(60));

        let limit: DmRateLimit = serde_json::from_str(r#"{"maxMessages":3}"#).unwrap();
        assert_eq!(limit, DmRateLimit::new(3, 60));
    }

    #[test]
    fn test_send_allowed() {
        let gate = DmSendGate::default();
        let decision =
            gate.check(&config(DevOverrideSet::default()), &FeatureLockSet::new(), &[], now());
        assert_eq!(decision, DmSendDecision::Send { delay: Duration::ZERO });
        assert!(decision.is_send());
    }

    #[test]
    fn test_locked_messaging_blocks() {
        let gate = DmSendGate::default();
        let locks = FeatureLockSet::new().with_lock(Feature::Messaging);

        let decision = gate.check(&config(DevOverrideSet::default()), &locks, &[], now());
        assert!(matches!(
            decision,
            DmSendDecision::Blocked(reason) if reason.feature == Feature::Messaging
        ));

        let verified = config(DevOverrideSet::default().with_pin_verified());
        assert!(gate.check(&verified, &locks, &[], now()).is_send());
    }

    #[test]
    fn test_parental_lock_takes_precedence_over_forced_failure() {
        let gate = DmSendGate::default();
        let locks = FeatureLockSet::new().with_lock(Feature::Messaging);
        let overrides = DevOverrideSet { dm_force_send_failure: true, ..Default::default() };

        let decision = gate.check(&config(overrides), &locks, &[], now());
        assert!(matches!(decision, DmSendDecision::Blocked(_)));
    }

    #[test]
    fn test_forced_failure() {
        let gate = DmSendGate::default();
        let overrides = DevOverrideSet { dm_force_send_failure: true, ..Default::default() };
        let decision = gate.check(&config(overrides), &FeatureLockSet::new(), &[], now());
        assert_eq!(decision, DmSendDecision::ForcedFailure);
    }

    #[test]
    fn test_rate_limited() {
        let gate = DmSendGate::new(DmRateLimit::new(2, 60));
        let sends = [seconds_ago(45), seconds_ago(10)];

        let decision =
            gate.check(&config(DevOverrideSet::default()), &FeatureLockSet::new(), &sends, now());
        assert_eq!(decision, DmSendDecision::RateLimited { retry_after: Duration::from_secs(15) });
    }

    #[test]
    fn test_old_sends_leave_the_window() {
        let gate = DmSendGate::new(DmRateLimit::new(2, 60));
        let sends = [seconds_ago(120), seconds_ago(10)];

        let decision =
            gate.check(&config(DevOverrideSet::default()), &FeatureLockSet::new(), &sends, now());
        assert!(decision.is_send());
    }

    #[test]
    fn test_disabled_rate_limit_and_delay() {
        let gate = DmSendGate::new(DmRateLimit::new(1, 60));
        let sends = [seconds_ago(1), seconds_ago(2)];
        let overrides = DevOverrideSet {
            dm_disable_rate_limit: true,
            dm_send_delay: Some(Duration::from_millis(500)),
            ..Default::default()
        };

        let decision = gate.check(&config(overrides), &FeatureLockSet::new(), &sends, now());
        assert_eq!(decision, DmSendDecision::Send { delay: Duration::from_millis(500) });
    }
}
