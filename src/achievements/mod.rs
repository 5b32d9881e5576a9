//! Achievement tracking.
//!
//! Two entry points keep a user's badge state in sync with their scores:
//!
//! - [`tracker::update_progress`] runs right after every correct answer.
//!   It merges a single event into the stored state and reports any
//!   badges that just crossed their target.
//! - [`tracker::reconcile`] re-derives the whole state from the stored
//!   score totals. The achievements page runs it on load and on refresh,
//!   so any drift from missed incremental updates heals itself.
//!
//! The arithmetic lives in [`progress`] as pure functions of the
//! definitions, the prior state, and the inputs; [`tracker`] only adds
//! the reads and the single document write around them. Both entry
//! points are best-effort: on any storage error they log and report
//! nothing, and the caller's score update stands.

pub mod notify;
pub mod progress;
pub mod tracker;

pub use notify::{toasts_for, AchievementToast};
pub use progress::ProgressOutcome;
pub use tracker::{reconcile, update_progress, ReconcileSummary};
