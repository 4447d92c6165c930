//! CLI subcommand implementations.
//!
//! Every command writes to a caller-supplied writer so output can be
//! snapshot-tested; `main` passes stdout.

pub mod history;
pub mod projects;
pub mod stats;
pub mod status;
pub mod sync;
pub mod task;
pub mod timer;
pub mod util;
pub mod watch;
