//! Traffic counting kernel
//!
//! This crate implements the streaming detection-to-count reconciliation
//! engine behind a vehicle counting system: per-frame detections go in, a
//! deduplicated per-category count of unique vehicles and a per-second time
//! series come out. Model inference, video decoding and chart rendering are
//! external collaborators behind the [`DetectionSource`] trait.
//!
//! # Invariants
//!
//! The session upholds these by construction:
//!
//! 1. **Count Once**: a vehicle is credited to exactly one category, on its
//!    first observation, regardless of how many frames re-detect it.
//! 2. **Monotonic Ledger**: the seen set and every category total only grow
//!    while a session runs.
//! 3. **Fresh Ids**: a synthesized id is never reused, and the synthetic
//!    namespace can never collide with the tracker's ids.
//! 4. **One-Way Downgrade**: a tracking fault switches the session to
//!    detection-only mode for good; the session keeps running.
//! 5. **Contiguous Timeline**: bucket rows cover every second from 0 to the
//!    stream's last second exactly once, zero-filled across gaps, and the
//!    trailing partial bucket is always flushed, even on abort.
//! 6. **Isolated Sessions**: all mutable state lives in one
//!    [`CountingSession`]; parallel streams use independent sessions.
//!
//! # Module Structure
//!
//! - `detect`: detection sources (synthetic stub, JSON-lines files)
//! - `category`, `identity`, `ledger`, `timeline`: the counting core
//! - `session`: per-stream context tying the core together
//! - `report`, `export`: derived statistics and output artifacts
//! - `config`: countd configuration (JSON file + env overrides)

pub mod category;
pub mod config;
pub mod detect;
pub mod export;
pub mod identity;
pub mod ledger;
pub mod report;
pub mod session;
pub mod timeline;

pub use category::{Category, CATEGORIES};
pub use detect::{
    open_source, DetectionSource, FrameDetections, JsonlSource, RawDetection, ScriptedSource,
    SyntheticConfig, SyntheticSource,
};
pub use export::{write_artifacts, ArtifactPaths};
pub use identity::{EntityId, IdentityResolver, ResolverMode};
pub use ledger::{CategoryTotals, DedupLedger};
pub use report::{BusiestSecond, CategoryBreakdown, Report};
pub use session::{CountingSession, StreamAnalysis};
pub use timeline::{BucketAggregator, BucketRow};
