//! Incremental scheduling
//!
//! An extraction run is a small state machine driven one slice at a time:
//!
//! ```text
//! Idle -> Scanning (one or more slices) -> Aggregating -> Done
//! ```
//!
//! Each call to [`ExtractionJob::step`] processes whole scan units until the
//! slice budget is spent (at least one unit per slice, so a run always makes
//! progress) and then hands control back. [`ExtractionJob::run`] drives the
//! steps on the async runtime and yields between slices; the result is the
//! same as an unbounded pass, only spread out.

use crate::config::ScanConfig;
use crate::dom::DomTree;
use crate::extraction::aggregate::{aggregate, ExtractionReport};
use crate::extraction::associator::ProximityAssociator;
use crate::extraction::context::ScanContext;
use crate::extraction::patterns::{match_emails, EmailCandidate};
use crate::extraction::scanner::{ScanPlan, ScanUnit};
use std::time::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Created, nothing scanned
    Idle,
    /// Units remain
    Scanning,
    /// All units scanned, report not built
    Aggregating,
    /// Report built
    Done,
}

/// Outcome of one slice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// More units remain; call `step` again
    Yield,
    /// The run finished
    Done(ExtractionReport),
}

/// One extraction run over a page
pub struct ExtractionJob<'a, T: DomTree> {
    tree: &'a T,
    config: &'a ScanConfig,
    state: JobState,
    plan: Option<ScanPlan<T::Node>>,
    next_unit: usize,
    slices: usize,
    ctx: Option<ScanContext<T::Node>>,
    report: Option<ExtractionReport>,
}

impl<'a, T: DomTree> ExtractionJob<'a, T> {
    /// Prepare a run; nothing is scanned until the first step
    pub fn new(tree: &'a T, config: &'a ScanConfig) -> Self {
        Self {
            tree,
            config,
            state: JobState::Idle,
            plan: None,
            next_unit: 0,
            slices: 0,
            ctx: Some(ScanContext::new()),
            report: None,
        }
    }

    /// Current state
    pub fn state(&self) -> JobState {
        self.state
    }

    /// Run identifier
    pub fn run_id(&self) -> Uuid {
        self.ctx.as_ref().map(|c| c.run_id()).unwrap_or_default()
    }

    /// Units scanned so far
    pub fn units_done(&self) -> usize {
        self.next_unit
    }

    /// Units in the plan, once planned
    pub fn units_total(&self) -> Option<usize> {
        self.plan.as_ref().map(ScanPlan::len)
    }

    /// Slices run so far
    pub fn slices(&self) -> usize {
        self.slices
    }

    /// Run one slice of at most `budget` (but at least one unit)
    pub fn step(&mut self, budget: Duration) -> Step {
        let started = SliceStart::now();

        if self.state == JobState::Idle {
            let plan = ScanPlan::for_tree(self.tree, self.config);
            debug!("Planned {:?} scan with {} units", plan.mode(), plan.len());
            self.state = if plan.is_empty() {
                JobState::Aggregating
            } else {
                JobState::Scanning
            };
            self.plan = Some(plan);
        }

        if self.state == JobState::Scanning {
            self.slices += 1;
            self.scan_slice(started, budget);
        }

        if self.state == JobState::Aggregating {
            let ctx = self.ctx.take().unwrap_or_default();
            let report = aggregate(ctx);
            info!(
                "Extraction finished: {} groups, {} loose phones, {} slices",
                report.groups.len(),
                report.loose_phones.len(),
                self.slices
            );
            self.report = Some(report);
            self.state = JobState::Done;
        }

        match (&self.state, &self.report) {
            (JobState::Done, Some(report)) => Step::Done(report.clone()),
            _ => Step::Yield,
        }
    }

    fn scan_slice(&mut self, started: SliceStart, budget: Duration) {
        let (Some(plan), Some(ctx)) = (self.plan.as_ref(), self.ctx.as_mut()) else {
            self.state = JobState::Aggregating;
            return;
        };
        let associator = ProximityAssociator::new(
            self.tree,
            &self.config.association,
            &self.config.phone,
        );

        loop {
            let Some(unit) = plan.units().get(self.next_unit) else {
                self.state = JobState::Aggregating;
                return;
            };
            process_unit(self.tree, self.config, &associator, unit, ctx);
            self.next_unit += 1;

            if self.next_unit >= plan.len() {
                self.state = JobState::Aggregating;
                return;
            }
            if started.elapsed() >= budget {
                debug!(
                    "Slice {} used its budget after {}/{} units",
                    self.slices,
                    self.next_unit,
                    plan.len()
                );
                return;
            }
        }
    }

    /// Drive the run to completion, yielding to the runtime between slices
    #[instrument(skip(self), fields(run_id = %self.run_id()))]
    pub async fn run(mut self) -> ExtractionReport {
        let budget = self.config.slice_budget();
        loop {
            match self.step(budget) {
                Step::Yield => tokio::task::yield_now().await,
                Step::Done(report) => return report,
            }
        }
    }

    /// Drive the run to completion in a single unbounded pass
    #[instrument(skip(self), fields(run_id = %self.run_id()))]
    pub fn run_to_completion(mut self) -> ExtractionReport {
        loop {
            if let Step::Done(report) = self.step(Duration::MAX) {
                return report;
            }
        }
    }
}

/// Start of a slice; `std::time::Instant` panics on wasm32, so the browser
/// clock is read there instead
#[derive(Debug, Clone, Copy)]
struct SliceStart {
    #[cfg(not(target_arch = "wasm32"))]
    at: std::time::Instant,
    #[cfg(target_arch = "wasm32")]
    at_ms: f64,
}

impl SliceStart {
    #[cfg(not(target_arch = "wasm32"))]
    fn now() -> Self {
        Self {
            at: std::time::Instant::now(),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn now() -> Self {
        Self {
            at_ms: js_sys::Date::now(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn elapsed(&self) -> Duration {
        self.at.elapsed()
    }

    #[cfg(target_arch = "wasm32")]
    fn elapsed(&self) -> Duration {
        let ms = (js_sys::Date::now() - self.at_ms).max(0.0);
        Duration::from_secs_f64(ms / 1000.0)
    }
}

/// Scan one unit: group first-seen emails, then record the unit's phones
fn process_unit<T: DomTree>(
    tree: &T,
    config: &ScanConfig,
    associator: &ProximityAssociator<'_, T>,
    unit: &ScanUnit<T::Node>,
    ctx: &mut ScanContext<T::Node>,
) {
    for span in unit.spans(tree, config.min_span_chars) {
        for raw in match_emails(&span.text) {
            let candidate = EmailCandidate::new(raw, span.anchor);
            if !ctx.first_sighting(&candidate.canonical) {
                continue;
            }
            let group = associator.associate(&candidate, ctx);
            ctx.push_group(group);
        }
        for phone in config.phone.valid_phones(&span.text) {
            ctx.record_page_phone(phone);
        }
    }
}

/// Extract a page's report with cooperative yielding
pub async fn extract_report<T: DomTree>(tree: &T, config: &ScanConfig) -> ExtractionReport {
    ExtractionJob::new(tree, config).run().await
}

/// Extract a page's report synchronously
pub fn extract_report_sync<T: DomTree>(tree: &T, config: &ScanConfig) -> ExtractionReport {
    ExtractionJob::new(tree, config).run_to_completion()
}
