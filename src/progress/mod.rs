//! Progress tracking: shared counters, frame rendering and the reporter thread.

pub mod frame;
pub mod reporter;
pub mod state;

pub use reporter::Reporter;
pub use state::{ProgressState, Sample, Snapshot};
