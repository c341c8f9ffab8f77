//! Per-pattern usage counters shared by concurrent extraction runs.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const NEVER_USED: i64 = i64::MIN;

#[derive(Debug)]
struct UsageCounter {
    pattern_id: u64,
    /// Base count from the snapshot plus every win since.
    total: AtomicU64,
    /// Wins not yet handed to the administration store.
    pending: AtomicU64,
    /// Milliseconds since the Unix epoch, `NEVER_USED` if unset.
    last_used_ms: AtomicI64,
}

/// Usage increments for one pattern, as reported back to the pattern store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageDelta {
    pub pattern_id: u64,
    pub uses: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Arena of atomic counters indexed by pattern slot.
///
/// Runs that win the same pattern at the same moment each land their own
/// increment; nothing here takes a lock.
#[derive(Debug, Default)]
pub struct UsageLedger {
    counters: Vec<UsageCounter>,
}

impl UsageLedger {
    /// Register a pattern and return its slot.
    pub(crate) fn register(
        &mut self,
        pattern_id: u64,
        usage_count: u64,
        last_used_at: Option<DateTime<Utc>>,
    ) -> usize {
        self.counters.push(UsageCounter {
            pattern_id,
            total: AtomicU64::new(usage_count),
            pending: AtomicU64::new(0),
            last_used_ms: AtomicI64::new(
                last_used_at.map(|t| t.timestamp_millis()).unwrap_or(NEVER_USED),
            ),
        });
        self.counters.len() - 1
    }

    /// Count one win of the pattern in `slot`.
    pub fn record(&self, slot: usize, at: DateTime<Utc>) {
        if let Some(counter) = self.counters.get(slot) {
            counter.total.fetch_add(1, Ordering::Relaxed);
            counter.pending.fetch_add(1, Ordering::Relaxed);
            counter
                .last_used_ms
                .fetch_max(at.timestamp_millis(), Ordering::Relaxed);
        }
    }

    pub fn usage_count(&self, slot: usize) -> Option<u64> {
        self.counters
            .get(slot)
            .map(|c| c.total.load(Ordering::Relaxed))
    }

    pub fn last_used_at(&self, slot: usize) -> Option<DateTime<Utc>> {
        self.counters
            .get(slot)
            .and_then(|c| millis_to_time(c.last_used_ms.load(Ordering::Relaxed)))
    }

    /// Take the increments recorded since the previous drain.
    ///
    /// Only patterns with at least one new win are returned, in slot order.
    pub fn drain(&self) -> Vec<UsageDelta> {
        self.counters
            .iter()
            .filter_map(|c| {
                let uses = c.pending.swap(0, Ordering::Relaxed);
                (uses > 0).then(|| UsageDelta {
                    pattern_id: c.pattern_id,
                    uses,
                    last_used_at: millis_to_time(c.last_used_ms.load(Ordering::Relaxed)),
                })
            })
            .collect()
    }
}

fn millis_to_time(ms: i64) -> Option<DateTime<Utc>> {
    if ms == NEVER_USED {
        None
    } else {
        DateTime::from_timestamp_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_record_and_drain() {
        let mut ledger = UsageLedger::default();
        let a = ledger.register(10, 5, None);
        let b = ledger.register(11, 0, None);

        let at = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        ledger.record(a, at);
        ledger.record(a, at);

        assert_eq!(ledger.usage_count(a), Some(7));
        assert_eq!(ledger.usage_count(b), Some(0));
        assert_eq!(ledger.last_used_at(a), Some(at));
        assert_eq!(ledger.last_used_at(b), None);

        let deltas = ledger.drain();
        assert_eq!(
            deltas,
            vec![UsageDelta { pattern_id: 10, uses: 2, last_used_at: Some(at) }]
        );
        assert!(ledger.drain().is_empty());
        assert_eq!(ledger.usage_count(a), Some(7));
    }

    #[test]
    fn test_last_used_keeps_latest() {
        let mut ledger = UsageLedger::default();
        let slot = ledger.register(1, 0, None);
        let later = DateTime::from_timestamp_millis(2_000).unwrap();
        let earlier = DateTime::from_timestamp_millis(1_000).unwrap();

        ledger.record(slot, later);
        ledger.record(slot, earlier);
        assert_eq!(ledger.last_used_at(slot), Some(later));
    }

    #[test]
    fn test_concurrent_increments_not_lost() {
        let mut ledger = UsageLedger::default();
        let slot = ledger.register(1, 0, None);
        let ledger = Arc::new(ledger);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        ledger.record(slot, Utc::now());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.usage_count(slot), Some(8000));
        assert_eq!(ledger.drain()[0].uses, 8000);
    }
}
