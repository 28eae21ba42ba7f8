//! Planning and applying changes to the generated definitions.
//!
//! [`plan`] is identical in dry-run and apply mode; only [`apply`] looks at
//! the `dry_run` flag, and only to decide whether to touch the filesystem.

pub mod apply;
pub mod diff;

pub use apply::{ApplyResult, EntryOutcome, EntryStatus, IoFailure, IoOperation, apply};
pub use diff::{ChangeKind, DiffPlan, PlannedChange, plan};
