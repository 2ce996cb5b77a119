//! Wall clock and day boundaries used for the "blocked today" count.

use crate::constants::DAY_MS;
use chrono::{Local, TimeZone};
use std::sync::atomic::{AtomicI64, Ordering};

pub trait Clock: Send + Sync {
    /// Current time in epoch milliseconds.
    fn now_ms(&self) -> i64;

    /// Start of the day containing `now_ms`, in epoch milliseconds.
    fn day_start_ms(&self, now_ms: i64) -> i64;
}

/// Local wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn day_start_ms(&self, now_ms: i64) -> i64 {
        local_midnight_ms(now_ms)
    }
}

/// Local midnight of the day containing `now_ms`.
///
/// Falls back to the UTC day boundary when the local midnight does not exist
/// or `now_ms` is out of range.
pub fn local_midnight_ms(now_ms: i64) -> i64 {
    Local
        .timestamp_millis_opt(now_ms)
        .single()
        .and_then(|now| now.date_naive().and_hms_opt(0, 0, 0))
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        .map(|midnight| midnight.timestamp_millis())
        .unwrap_or_else(|| utc_day_start(now_ms))
}

fn utc_day_start(now_ms: i64) -> i64 {
    now_ms - now_ms.rem_euclid(DAY_MS)
}

/// Manually driven clock with UTC day boundaries, for tests and replays.
#[derive(Debug, Default)]
pub struct FixedClock {
    now_ms: AtomicI64,
}

impl FixedClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn day_start_ms(&self, now_ms: i64) -> i64 {
        utc_day_start(now_ms)
    }
}
