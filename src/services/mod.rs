pub mod reconcile;

pub use reconcile::{CommitOutcome, ConflictPolicy, bulk_commit, commit_course, unify_colors};
