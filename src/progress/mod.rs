/// Pull progress rendering - Gateway
mod display;
mod tracker;

pub use display::{ProgressDisplay, ProgressIndicator, TerminalDisplay};
pub use tracker::PullProgressTracker;

#[cfg(test)]
pub(crate) use display::recording::{DisplayCall, RecordingDisplay};
