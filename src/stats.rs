//! Request statistics.
//!
//! Every request that passes through a [`DispatchTable`](crate::DispatchTable)
//! is counted here; the stats endpoint serves a [`StatsSnapshot`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;

/// Live counters, shared by every connection task.
#[derive(Debug)]
pub struct Stats {
    started: Instant,
    total_count: AtomicU64,
    total_response_micros: AtomicU64,
    status_codes: DashMap<u16, u64>,
}

/// Point-in-time view of [`Stats`], as served by the stats endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub pid: u32,
    pub uptime_sec: f64,
    pub total_count: u64,
    pub status_code_count: BTreeMap<u16, u64>,
    pub total_response_time_sec: f64,
    pub average_response_time_sec: f64,
}

impl Stats {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            total_count: AtomicU64::new(0),
            total_response_micros: AtomicU64::new(0),
            status_codes: DashMap::new(),
        }
    }

    pub fn record(&self, status: u16, elapsed: Duration) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.total_count.fetch_add(1, Ordering::Relaxed);
        self.total_response_micros.fetch_add(micros, Ordering::Relaxed);
        *self.status_codes.entry(status).or_insert(0) += 1;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let total_count = self.total_count.load(Ordering::Relaxed);
        let total_secs = Duration::from_micros(self.total_response_micros.load(Ordering::Relaxed))
            .as_secs_f64();
        let average = if total_count == 0 { 0.0 } else { total_secs / total_count as f64 };

        StatsSnapshot {
            pid: std::process::id(),
            uptime_sec: self.started.elapsed().as_secs_f64(),
            total_count,
            status_code_count: self.status_codes.iter().map(|e| (*e.key(), *e.value())).collect(),
            total_response_time_sec: total_secs,
            average_response_time_sec: average,
        }
    }
}

impl Default for Stats {
    fn default() -> Self { Self::new() }
}
