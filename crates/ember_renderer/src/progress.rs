//! Per-worker row counters and the percentage monitor that reads them.

use std::sync::atomic::{AtomicU32, Ordering};

/// One completed-row counter per worker.
///
/// Each counter has a single writer (its worker). The monitor reads them
/// with relaxed loads, so a reading may lag behind, which only delays the
/// status text.
#[derive(Debug, Default)]
pub struct ProgressCounters {
    rows: Vec<AtomicU32>,
}

impl ProgressCounters {
    /// Create `workers` zeroed counters.
    pub fn new(workers: usize) -> Self {
        Self {
            rows: (0..workers).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    /// Resize to `workers` counters, all zeroed.
    pub fn prepare(&mut self, workers: usize) {
        if self.rows.len() != workers {
            *self = Self::new(workers);
        } else {
            self.reset();
        }
    }

    /// Number of counters.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Record one finished row for `worker`.
    #[inline]
    pub fn row_done(&self, worker: usize) {
        self.rows[worker].fetch_add(1, Ordering::Relaxed);
    }

    /// Rows finished by `worker` so far.
    pub fn rows_done(&self, worker: usize) -> u32 {
        self.rows[worker].load(Ordering::Relaxed)
    }

    /// Sum over all workers.
    pub fn total(&self) -> u64 {
        self.rows
            .iter()
            .map(|rows| rows.load(Ordering::Relaxed) as u64)
            .sum()
    }

    /// Zero every counter.
    pub fn reset(&self) {
        for rows in &self.rows {
            rows.store(0, Ordering::Relaxed);
        }
    }
}

/// Turns counter readings into whole-percent status updates.
pub struct ProgressMonitor<'a> {
    counters: &'a ProgressCounters,
    total_rows: u32,
    last_percent: Option<u32>,
}

impl<'a> ProgressMonitor<'a> {
    pub fn new(counters: &'a ProgressCounters, total_rows: u32) -> Self {
        Self {
            counters,
            total_rows,
            last_percent: None,
        }
    }

    /// Current completion, `floor(done * 100 / total)`, capped at 100.
    pub fn percent(&self) -> u32 {
        if self.total_rows == 0 {
            return 100;
        }
        let percent = self.counters.total() * 100 / self.total_rows as u64;
        percent.min(100) as u32
    }

    /// Read the counters; returns the percentage if it changed since the last
    /// reported value. Reaching 100 resets the counters for the next render.
    pub fn poll(&mut self) -> Option<u32> {
        if self.is_complete() {
            return None;
        }

        let percent = self.percent();
        if percent == 100 {
            self.counters.reset();
        }
        if self.last_percent == Some(percent) {
            return None;
        }

        self.last_percent = Some(percent);
        Some(percent)
    }

    /// True once 100% has been reported.
    pub fn is_complete(&self) -> bool {
        self.last_percent == Some(100)
    }
}
