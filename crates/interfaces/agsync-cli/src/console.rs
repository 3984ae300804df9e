use std::time::Duration;

use agsync_pipeline::{EventSink, SyncEvent};
use indicatif::{ProgressBar, ProgressStyle};

/// Prints every decision as an indented line under a spinner.
pub struct ConsoleSink {
    pb: ProgressBar,
}

impl ConsoleSink {
    pub fn new() -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        Self { pb }
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render(event: &SyncEvent) -> String {
    format!("{}{}", "  ".repeat(event.depth), event)
}

impl EventSink for ConsoleSink {
    fn emit(&self, event: &SyncEvent) {
        let line = render(event);
        // a hidden bar (no terminal) swallows println
        if self.pb.is_hidden() {
            println!("{line}");
        } else {
            self.pb.println(&line);
        }
        self.pb.set_message(event.name.clone());
    }
}
