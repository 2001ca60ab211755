//! Completion cost tracking
//!
//! The monthly accumulator is an injected service, not module-level
//! state, so deployments can swap in an externally backed tracker when
//! running more than one instance. The in-memory tracker is correct for
//! a single process only.

use chrono::{Datelike, Utc};
use parking_lot::Mutex;

/// Tracks completion spend against a monthly cap
pub trait CostTracker: Send + Sync {
    /// Record tokens consumed by one call
    fn record_usage(&self, tokens: u32);

    /// Dollars left this month; never negative
    fn remaining_budget(&self) -> f64;

    /// Whether the monthly cap has been reached
    fn is_exhausted(&self) -> bool {
        self.remaining_budget() <= 0.0
    }
}

struct Ledger {
    /// (year, month) the running total belongs to
    period: (i32, u32),
    spent_usd: f64,
}

/// In-process cost tracker. Resets automatically when the calendar
/// month rolls over.
pub struct InMemoryCostTracker {
    monthly_cap_usd: f64,
    price_per_1k_tokens_usd: f64,
    ledger: Mutex<Ledger>,
}

impl InMemoryCostTracker {
    pub fn new(monthly_cap_usd: f64, price_per_1k_tokens_usd: f64) -> Self {
        let now = Utc::now();
        Self {
            monthly_cap_usd,
            price_per_1k_tokens_usd,
            ledger: Mutex::new(Ledger {
                period: (now.year(), now.month()),
                spent_usd: 0.0,
            }),
        }
    }

    fn roll_period(ledger: &mut Ledger) {
        let now = Utc::now();
        let current = (now.year(), now.month());
        if ledger.period != current {
            ledger.period = current;
            ledger.spent_usd = 0.0;
        }
    }
}

impl CostTracker for InMemoryCostTracker {
    fn record_usage(&self, tokens: u32) {
        let mut ledger = self.ledger.lock();
        Self::roll_period(&mut ledger);
        let cost = tokens as f64 / 1000.0 * self.price_per_1k_tokens_usd;
        ledger.spent_usd += cost;
        tracing::debug!(tokens, spent_usd = ledger.spent_usd, "recorded completion usage");
    }

    fn remaining_budget(&self) -> f64 {
        let mut ledger = self.ledger.lock();
        Self::roll_period(&mut ledger);
        (self.monthly_cap_usd - ledger.spent_usd).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_and_depletes() {
        let tracker = InMemoryCostTracker::new(1.0, 1.0); // $1 cap, $1 per 1k tokens
        assert!(!tracker.is_exhausted());

        tracker.record_usage(500);
        assert!((tracker.remaining_budget() - 0.5).abs() < 1e-9);

        tracker.record_usage(600);
        assert!(tracker.is_exhausted());
        assert_eq!(tracker.remaining_budget(), 0.0);
    }

    #[test]
    fn test_zero_cap_is_always_exhausted() {
        let tracker = InMemoryCostTracker::new(0.0, 0.002);
        assert!(tracker.is_exhausted());
    }
}
