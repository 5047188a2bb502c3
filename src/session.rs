//! One stream's processing session.
//!
//! A `CountingSession` owns all mutable state for one stream: the identity
//! resolver, the dedup ledger, and the bucket aggregator. Parallel streams
//! need independent sessions; nothing here is shared. Finishing the session
//! (including after an abort between frames) flushes the trailing partial
//! bucket, so partial results keep every invariant of a full run.

use crate::category::Category;
use crate::detect::FrameDetections;
use crate::identity::{IdentityResolver, ResolverMode};
use crate::ledger::{CategoryTotals, DedupLedger};
use crate::report::Report;
use crate::timeline::{BucketAggregator, BucketRow};

/// Everything a finished session produces.
#[derive(Clone, Debug)]
pub struct StreamAnalysis {
    /// Per-second rows, contiguous from second 0, never empty.
    pub rows: Vec<BucketRow>,
    pub totals: CategoryTotals,
    pub report: Report,
}

pub struct CountingSession {
    resolver: IdentityResolver,
    ledger: DedupLedger,
    aggregator: BucketAggregator,
    frames: u64,
    skipped_detections: u64,
}

impl CountingSession {
    pub fn new(use_tracking: bool) -> Self {
        Self {
            resolver: IdentityResolver::new(use_tracking),
            ledger: DedupLedger::new(),
            aggregator: BucketAggregator::new(),
            frames: 0,
            skipped_detections: 0,
        }
    }

    pub fn mode(&self) -> ResolverMode {
        self.resolver.mode()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// Malformed detections dropped so far.
    pub fn skipped_detections(&self) -> u64 {
        self.skipped_detections
    }

    pub fn unique_count(&self) -> usize {
        self.ledger.unique_count()
    }

    /// The second of stream time the aggregator is currently filling.
    pub fn current_second(&self) -> u64 {
        self.aggregator.current_second()
    }

    pub fn totals(&self) -> &CategoryTotals {
        self.ledger.totals()
    }

    /// Consume one frame. Returns the number of vehicles first seen in it.
    pub fn process_frame(&mut self, frame: FrameDetections) -> usize {
        self.frames += 1;

        if let Some(detail) = &frame.tracking_fault {
            self.resolver.note_tracking_fault(detail);
        }

        // Advance before crediting: this frame's vehicles belong to the
        // bucket its own timestamp falls in.
        self.aggregator.advance(frame.time_s);

        let mut detections = frame.detections;
        detections.retain(|detection| match detection.check() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("dropping malformed detection: {}", e);
                self.skipped_detections += 1;
                false
            }
        });

        let ids = self.resolver.resolve(&detections);

        let mut newly_seen = 0;
        for (detection, id) in detections.iter().zip(ids) {
            let category = Category::from_label(&detection.label);
            if self.ledger.observe(id, category) {
                self.aggregator.credit(category);
                newly_seen += 1;
            }
        }
        newly_seen
    }

    /// Finish the session: flush the trailing bucket and build the report.
    ///
    /// Also the abort path: callers stopping early still get an analysis
    /// consistent up to the last consumed frame.
    pub fn finish(self) -> StreamAnalysis {
        let rows = self.aggregator.finish();
        let totals = self.ledger.into_totals();
        let report = Report::build(&rows, &totals);
        StreamAnalysis {
            rows,
            totals,
            report,
        }
    }
}
