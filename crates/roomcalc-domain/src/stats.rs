//! Aggregate statistics over a room snapshot.

use crate::{Metric, RoomCollection, RoomSnapshot};
use rayon::prelude::*;
use roomcalc_core::{RoomResult, Task};
use serde::Serialize;
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Snapshots at or above this size are reduced in parallel chunks.
const PARALLEL_THRESHOLD: usize = 16_384;
const MAX_PARTITIONS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsSummary {
    pub count: usize,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
}

/// Statistics for one metric. `summary` is `None` when there was no data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub metric: Metric,
    pub summary: Option<StatsSummary>,
}

impl StatsReport {
    pub fn from_snapshot(snapshot: &RoomSnapshot, metric: Metric) -> Self {
        let values = snapshot.values(metric);
        Self {
            metric,
            summary: summarize(&values),
        }
    }

    pub fn has_data(&self) -> bool {
        self.summary.is_some()
    }
}

#[derive(Debug, Clone, Copy)]
struct Partial {
    count: usize,
    min: u64,
    max: u64,
    sum: u128,
}

impl Partial {
    fn of(values: &[u64]) -> Option<Self> {
        let (&first, rest) = values.split_first()?;
        Some(rest.iter().fold(
            Partial {
                count: 1,
                min: first,
                max: first,
                sum: u128::from(first),
            },
            |acc, &v| Partial {
                count: acc.count + 1,
                min: acc.min.min(v),
                max: acc.max.max(v),
                sum: acc.sum + u128::from(v),
            },
        ))
    }

    fn merge(self, other: Partial) -> Partial {
        Partial {
            count: self.count + other.count,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            sum: self.sum + other.sum,
        }
    }
}

/// Min, max and mean of `values`, or `None` when empty.
pub fn summarize(values: &[u64]) -> Option<StatsSummary> {
    let total = if values.len() >= PARALLEL_THRESHOLD {
        parallel_partial(values)
    } else {
        Partial::of(values)
    }?;

    Some(StatsSummary {
        count: total.count,
        min: total.min,
        max: total.max,
        mean: total.sum as f64 / total.count as f64,
    })
}

fn parallel_partial(values: &[u64]) -> Option<Partial> {
    let chunk_size = values.len().div_ceil(MAX_PARTITIONS);
    values
        .par_chunks(chunk_size)
        .filter_map(Partial::of)
        .reduce_with(Partial::merge)
}

/// Read-only task computing statistics for one metric of the collection.
///
/// The snapshot is taken when the task runs, not when it is created. Reports
/// are logged and, if a reporter channel is attached, sent to it.
pub struct StatsTask {
    rooms: Arc<RoomCollection>,
    metric: Metric,
    reporter: Option<Sender<StatsReport>>,
}

impl StatsTask {
    pub fn new(rooms: Arc<RoomCollection>, metric: Metric) -> Self {
        Self {
            rooms,
            metric,
            reporter: None,
        }
    }

    pub fn with_reporter(mut self, reporter: Sender<StatsReport>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn compute(&self) -> StatsReport {
        StatsReport::from_snapshot(&self.rooms.snapshot(), self.metric)
    }
}

impl Task for StatsTask {
    fn name(&self) -> String {
        format!("stats({})", self.metric)
    }

    fn run(&self) -> RoomResult<()> {
        let report = self.compute();

        match &report.summary {
            Some(s) => tracing::info!(
                metric = %self.metric,
                count = s.count,
                min = s.min,
                max = s.max,
                mean = s.mean,
                "Statistics computed"
            ),
            None => tracing::info!(metric = %self.metric, "Statistics: no data"),
        }

        if let Some(reporter) = &self.reporter {
            if reporter.send(report).is_err() {
                tracing::debug!("Stats receiver dropped, report discarded");
            }
        }
        Ok(())
    }
}
