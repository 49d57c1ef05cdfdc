use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::constants::PROGRESS_BAR_TEMPLATE;

/// Where pull status lines and progress indicators are rendered
pub trait ProgressDisplay: Send {
    /// Print a plain status line
    fn status(&mut self, message: &str);

    /// Open a new indicator for `total` bytes
    fn create_indicator(&mut self, label: &str, total: u64) -> Box<dyn ProgressIndicator>;
}

/// A single byte-counting progress indicator
pub trait ProgressIndicator: Send {
    fn advance(&mut self, delta: u64);
    fn finish(&mut self);
}

/// Renders status lines and indicatif bars on stdout
#[derive(Debug, Default)]
pub struct TerminalDisplay;

impl TerminalDisplay {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressDisplay for TerminalDisplay {
    fn status(&mut self, message: &str) {
        println!("{}", message);
    }

    fn create_indicator(&mut self, label: &str, total: u64) -> Box<dyn ProgressIndicator> {
        let bar = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stdout());
        let style = ProgressStyle::default_bar()
            .template(PROGRESS_BAR_TEMPLATE)
            .unwrap_or_else(|e| {
                eprintln!("Failed to create progress bar template: {}", e);
                ProgressStyle::default_bar()
            })
            .progress_chars("=>-");
        bar.set_style(style);
        bar.set_message(label.to_string());
        Box::new(TerminalIndicator { bar })
    }
}

struct TerminalIndicator {
    bar: ProgressBar,
}

impl ProgressIndicator for TerminalIndicator {
    fn advance(&mut self, delta: u64) {
        self.bar.inc(delta);
    }

    fn finish(&mut self) {
        self.bar.finish();
    }
}
