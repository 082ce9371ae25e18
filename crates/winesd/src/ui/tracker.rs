use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use winesd_core::{FetchPhase, Progress};

pub trait TrackerBuilder<T: Tracker> {
    fn build(self) -> T;
}

pub trait Tracker {
    fn update(&self, progress: &Progress);
    fn finish(self);
    fn abandon(self);
}

const PB_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

/// Terminal progress bar driven by download progress reports.
///
/// Clones share one bar, so a clone can live inside the progress callback
/// while the first one is finished by the caller.
#[derive(Clone)]
pub struct ProgressTracker {
    pb: ProgressBar,
    finish: Option<String>,
}

impl ProgressTracker {
    pub fn callback(&self) -> Arc<dyn Fn(&Progress) + Send + Sync> {
        let tracker = self.clone();
        Arc::new(move |progress| tracker.update(progress))
    }
}

impl Tracker for ProgressTracker {
    fn update(&self, progress: &Progress) {
        match progress.phase {
            FetchPhase::Connecting => self.pb.set_message("connecting"),
            FetchPhase::Downloading => {
                if let Some(total) = progress.total_bytes {
                    self.pb.set_length(total);
                }
                self.pb.set_position(progress.bytes_downloaded);
                if progress.bytes_downloaded == 0 {
                    self.pb.set_message("");
                }
            }
            FetchPhase::Verifying => self.pb.set_message("verifying"),
            FetchPhase::Completed => self.pb.set_position(progress.bytes_downloaded),
        }
    }

    fn finish(self) {
        match self.finish {
            Some(msg) => self.pb.finish_with_message(msg),
            None => self.pb.finish(),
        }
    }

    fn abandon(self) {
        self.pb.abandon_with_message("failed");
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgressTrackerBuilder {
    len: Option<u64>,
    prefix: Option<String>,
    finish: Option<String>,
    hidden: bool,
}

impl ProgressTrackerBuilder {
    pub fn with_len(mut self, len: u64) -> Self {
        self.len = Some(len);
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn with_finish(mut self, finish: &str) -> Self {
        self.finish = Some(finish.to_string());
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}

impl TrackerBuilder<ProgressTracker> for ProgressTrackerBuilder {
    fn build(self) -> ProgressTracker {
        let pb = match (self.hidden, self.len) {
            (true, _) => ProgressBar::hidden(),
            (false, Some(len)) => ProgressBar::new(len),
            (false, None) => ProgressBar::new_spinner(),
        };
        let pb = if let Some(style) = PB_TEMPLATE.as_ref() {
            pb.with_style(style.clone())
        } else {
            pb
        };

        if let Some(prefix) = self.prefix {
            pb.set_prefix(prefix);
        }
        ProgressTracker {
            pb,
            finish: self.finish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_drives_shared_bar() {
        let tracker = ProgressTrackerBuilder::default().with_len(100).hidden(true).build();
        let callback = tracker.callback();
        callback(&Progress {
            phase: FetchPhase::Downloading,
            bytes_downloaded: 40,
            total_bytes: Some(200),
        });
        assert_eq!(tracker.pb.position(), 40);
        assert_eq!(tracker.pb.length(), Some(200));
        tracker.finish();
    }

    #[test]
    fn style_template_is_valid() {
        assert!(PB_TEMPLATE.is_some());
    }
}
