//! Background auto-approval of stale pending listings

pub mod worker;

pub use worker::{SweepHandle, SweepReport, SweepWorker, start_sweep_worker};
