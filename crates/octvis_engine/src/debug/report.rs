//! Per-tick reports
//!
//! A [`TickReport`] is a flattened copy of [`TickStats`] plus the context a
//! reader needs (tick number, broad phase). Sinks receive every report and
//! decide what to keep.

use std::collections::VecDeque;
use std::fmt;

use crate::physics::TickStats;

/// Snapshot of one fixed tick for display
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Fixed tick number, starting at 1
    pub fixed_tick: u64,
    /// Name of the broad phase that ran
    pub broad_phase: &'static str,
    /// Bodies taking part in collision detection
    pub body_count: usize,
    /// Narrow-phase tests run
    pub collision_tests: usize,
    /// Collisions resolved
    pub collisions_resolved: usize,
    /// Integration time in milliseconds
    pub integration_ms: f32,
    /// Collision time in milliseconds
    pub collision_ms: f32,
}

impl TickReport {
    /// Build a report from the stats returned by a tick
    pub fn from_stats(fixed_tick: u64, broad_phase: &'static str, stats: &TickStats) -> Self {
        Self {
            fixed_tick,
            broad_phase,
            body_count: stats.body_count,
            collision_tests: stats.collision_tests,
            collisions_resolved: stats.collisions_resolved,
            integration_ms: stats.integration_time.as_secs_f32() * 1000.0,
            collision_ms: stats.collision_time.as_secs_f32() * 1000.0,
        }
    }
}

impl fmt::Display for TickReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick {:>6} [{}] bodies {:>5} tests {:>8} collisions {:>6} physics {:.4} ms collision {:.4} ms",
            self.fixed_tick,
            self.broad_phase,
            self.body_count,
            self.collision_tests,
            self.collisions_resolved,
            self.integration_ms,
            self.collision_ms
        )
    }
}

/// Receiver of tick reports
pub trait ReportSink {
    /// Called once per fixed tick
    fn publish(&mut self, report: &TickReport);
}

/// Writes reports to the log
///
/// Every report goes out at `debug`; every `info_interval`-th one is repeated
/// at `info` so a default log level still shows progress.
#[derive(Debug, Clone)]
pub struct LogReportSink {
    info_interval: u64,
}

impl LogReportSink {
    /// Create a sink that logs at `info` every `info_interval` ticks (0 disables)
    pub const fn new(info_interval: u64) -> Self {
        Self { info_interval }
    }
}

impl Default for LogReportSink {
    fn default() -> Self {
        Self::new(60)
    }
}

impl ReportSink for LogReportSink {
    fn publish(&mut self, report: &TickReport) {
        if self.info_interval > 0 && report.fixed_tick % self.info_interval == 0 {
            log::info!("{report}");
        } else {
            log::debug!("{report}");
        }
    }
}

/// Bounded history of recent reports
#[derive(Debug, Clone)]
pub struct ReportHistory {
    capacity: usize,
    reports: VecDeque<TickReport>,
}

impl ReportHistory {
    /// Keep at most `capacity` reports (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            reports: VecDeque::with_capacity(capacity),
        }
    }

    /// Most recent report
    pub fn latest(&self) -> Option<&TickReport> {
        self.reports.back()
    }

    /// Reports oldest first
    pub fn iter(&self) -> impl Iterator<Item = &TickReport> {
        self.reports.iter()
    }

    /// Number of stored reports
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether no report has been stored yet
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Mean collision time over the stored reports
    pub fn average_collision_ms(&self) -> Option<f32> {
        if self.reports.is_empty() {
            return None;
        }
        let total: f32 = self.reports.iter().map(|report| report.collision_ms).sum();
        Some(total / self.reports.len() as f32)
    }

    /// Total collision tests over the stored reports
    pub fn total_collision_tests(&self) -> usize {
        self.reports.iter().map(|report| report.collision_tests).sum()
    }
}

impl Default for ReportHistory {
    fn default() -> Self {
        Self::new(120)
    }
}

impl ReportSink for ReportHistory {
    fn publish(&mut self, report: &TickReport) {
        if self.reports.len() == self.capacity {
            self.reports.pop_front();
        }
        self.reports.push_back(report.clone());
    }
}
