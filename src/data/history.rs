//! Historical data tracking for sparklines and rate calculations.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use leadsbox_monitor::Flow;

use super::dashboard::DashboardData;

/// Maximum number of historical snapshots to keep.
const MAX_HISTORY_SIZE: usize = 60;

/// Tracks per-flow totals and p95 readings across refreshes.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Request totals per flow, one reading per refresh.
    pub totals: HashMap<Flow, VecDeque<u64>>,
    /// p95 latency per flow (0 when the window is empty).
    pub p95s: HashMap<Flow, VecDeque<u64>>,
    /// Timestamps of snapshots for rate calculations.
    pub timestamps: VecDeque<Instant>,
}

fn push_bounded(values: &mut VecDeque<u64>, value: u64) {
    values.push_back(value);
    if values.len() > MAX_HISTORY_SIZE {
        values.pop_front();
    }
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new data snapshot.
    pub fn record(&mut self, data: &DashboardData) {
        for row in &data.flows {
            push_bounded(self.totals.entry(row.flow).or_default(), row.view.total);
            push_bounded(
                self.p95s.entry(row.flow).or_default(),
                row.view.p95_duration_ms.unwrap_or(0),
            );
        }

        self.timestamps.push_back(data.last_updated);
        if self.timestamps.len() > MAX_HISTORY_SIZE {
            self.timestamps.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.totals.clear();
        self.p95s.clear();
        self.timestamps.clear();
    }

    /// Requests per refresh, normalized to 0-7 for 8 bar levels.
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn requests_sparkline(&self, flow: Flow) -> Vec<u8> {
        let Some(values) = self.totals.get(&flow) else {
            return Vec::new();
        };
        if values.len() < 2 {
            return Vec::new();
        }

        // Totals drop back to zero when the monitor is reset.
        let deltas: Vec<u64> = values
            .iter()
            .zip(values.iter().skip(1))
            .map(|(a, b)| b.saturating_sub(*a))
            .collect();
        normalize(&deltas)
    }

    /// p95 readings normalized to 0-7.
    pub fn p95_sparkline(&self, flow: Flow) -> Vec<u8> {
        match self.p95s.get(&flow) {
            Some(values) if values.len() >= 2 => {
                let values: Vec<u64> = values.iter().copied().collect();
                normalize(&values)
            }
            _ => Vec::new(),
        }
    }

    /// Requests per second over the last refresh.
    ///
    /// Returns None if there's not enough history to calculate a rate.
    pub fn request_rate(&self, flow: Flow) -> Option<f64> {
        let totals = self.totals.get(&flow)?;
        if totals.len() < 2 || self.timestamps.len() < 2 {
            return None;
        }

        let current = *totals.back()?;
        let previous = *totals.get(totals.len() - 2)?;
        let delta = current.saturating_sub(previous);

        let current_time = self.timestamps.back()?;
        let previous_time = self.timestamps.get(self.timestamps.len() - 2)?;
        let elapsed = current_time.duration_since(*previous_time).as_secs_f64();

        if elapsed > 0.0 {
            Some(delta as f64 / elapsed)
        } else {
            None
        }
    }
}

fn normalize(values: &[u64]) -> Vec<u8> {
    let max = values.iter().copied().max().unwrap_or(0);
    let min = values.iter().copied().min().unwrap_or(0);
    let range = (max - min).max(1) as f64;

    values
        .iter()
        .map(|&v| (((v - min) as f64 / range * 7.0) as u8).min(7))
        .collect()
}
