use std::collections::HashMap;

use tracing::{debug, warn};

use super::display::{ProgressDisplay, ProgressIndicator};
use crate::ollama::{short_digest, PullEvent};

/// Lifecycle of the indicator for one layer digest
enum IndicatorState {
    Open {
        indicator: Box<dyn ProgressIndicator>,
        shown: u64,
    },
    /// Finished; never reopened
    Closed { shown: u64 },
}

impl IndicatorState {
    fn shown(&self) -> u64 {
        match self {
            IndicatorState::Open { shown, .. } | IndicatorState::Closed { shown } => *shown,
        }
    }
}

/// Folds a pull's event stream into one progress indicator per digest
///
/// When the digest changes, the indicator of the previous digest is
/// closed. Status-only events (no digest) are printed as-is and leave the
/// current digest untouched. The indicator of the last digest is not
/// closed unless a later event moves away from it.
pub struct PullProgressTracker<'a> {
    display: &'a mut dyn ProgressDisplay,
    current_digest: String,
    indicators: HashMap<String, IndicatorState>,
    finalized: usize,
}

impl<'a> PullProgressTracker<'a> {
    pub fn new(display: &'a mut dyn ProgressDisplay) -> Self {
        Self {
            display,
            current_digest: String::new(),
            indicators: HashMap::new(),
            finalized: 0,
        }
    }

    /// Apply one event
    pub fn handle(&mut self, event: &PullEvent) {
        let digest = event.digest.as_deref().unwrap_or("");

        if digest != self.current_digest {
            let previous = self.current_digest.clone();
            self.close(&previous);
        }

        if digest.is_empty() {
            self.display.status(&event.status);
            return;
        }

        if !self.indicators.contains_key(digest) {
            match event.total {
                Some(total) if total > 0 => {
                    let label = format!("pulling {}", short_digest(digest));
                    let indicator = self.display.create_indicator(&label, total);
                    self.indicators.insert(
                        digest.to_string(),
                        IndicatorState::Open {
                            indicator,
                            shown: 0,
                        },
                    );
                }
                _ => {}
            }
        }

        if let Some(completed) = event.completed.filter(|c| *c > 0) {
            match self.indicators.get_mut(digest) {
                Some(IndicatorState::Open { indicator, shown }) => {
                    if completed > *shown {
                        indicator.advance(completed - *shown);
                        *shown = completed;
                    }
                }
                Some(IndicatorState::Closed { .. }) => {
                    debug!("Ignoring progress for finished layer {}", digest);
                }
                None => {
                    warn!("Progress for {} arrived before its size; dropped", digest);
                }
            }
        }

        self.current_digest = digest.to_string();
    }

    /// Number of indicators closed so far
    pub fn finalized(&self) -> usize {
        self.finalized
    }

    /// Number of digests that got an indicator
    pub fn indicator_count(&self) -> usize {
        self.indicators.len()
    }

    /// Bytes shown so far for a digest, if it has an indicator
    pub fn shown(&self, digest: &str) -> Option<u64> {
        self.indicators.get(digest).map(IndicatorState::shown)
    }

    /// Whether the digest's indicator still receives updates
    pub fn is_open(&self, digest: &str) -> bool {
        matches!(
            self.indicators.get(digest),
            Some(IndicatorState::Open { .. })
        )
    }

    fn close(&mut self, digest: &str) {
        if let Some(state) = self.indicators.get_mut(digest) {
            if let IndicatorState::Open { indicator, shown } = state {
                let shown = *shown;
                indicator.finish();
                *state = IndicatorState::Closed { shown };
                self.finalized += 1;
            }
        }
    }
}
