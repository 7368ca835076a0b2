//! Progress reporting
//!
//! Progress is an optional capability of the seeder: pass a
//! [`ProgressReporter`] to [`crate::Seeder::with_progress`] and every task
//! registers one [`ProgressUnit`] sized to its file's line count.
//! [`TerminalProgress`] draws one indicatif bar per task.

use async_trait::async_trait;
use indicatif::{HumanDuration, MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

const BAR_TEMPLATE: &str = "{prefix:<28.bold} {percent:>3}% [{wide_bar:.cyan/blue}] {pos}/{len} {msg}";

/// Samples over which the per-line duration is smoothed
const EWMA_AGE: f64 = 30.0;

/// Registers one progress unit per seed task
pub trait ProgressReporter: Send + Sync {
    fn register_unit(&self, label: &str, total: u64) -> Box<dyn ProgressUnit>;
}

/// Tracks completed-vs-total lines for one task
#[async_trait]
pub trait ProgressUnit: Send + Sync {
    /// `completed` more lines were written, taking `elapsed` since the last call
    fn advance(&self, completed: u64, elapsed: Duration);

    /// Mark the unit finished and wait until that is shown
    async fn complete_and_wait(&self);
}

/// Multi-bar terminal progress (drawn on stderr)
#[derive(Debug, Clone)]
pub struct TerminalProgress {
    multi: MultiProgress,
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
        }
    }

    /// Progress that tracks state but never draws
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
        }
    }

    pub fn add_bar(&self, label: &str, total: u64) -> TerminalUnit {
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");

        let bar = self.multi.add(ProgressBar::new(total));
        bar.set_style(style);
        bar.set_prefix(label.to_string());

        TerminalUnit {
            bar,
            per_line: Mutex::new(Ewma::new(EWMA_AGE)),
        }
    }
}

impl ProgressReporter for TerminalProgress {
    fn register_unit(&self, label: &str, total: u64) -> Box<dyn ProgressUnit> {
        Box::new(self.add_bar(label, total))
    }
}

/// One bar; the ETA comes from a moving average of per-line chunk times
/// rather than indicatif's own estimate, so slow first batches (cold pool,
/// cold cache) stop dominating quickly.
#[derive(Debug)]
pub struct TerminalUnit {
    bar: ProgressBar,
    per_line: Mutex<Ewma>,
}

impl TerminalUnit {
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }

    /// Estimated time left, once at least one chunk has been timed
    pub fn eta(&self) -> Option<Duration> {
        let per_line = self.per_line.lock().ok()?.value()?;
        let remaining = self.bar.length()?.saturating_sub(self.bar.position());
        Some(Duration::from_secs_f64(per_line * remaining as f64))
    }
}

#[async_trait]
impl ProgressUnit for TerminalUnit {
    fn advance(&self, completed: u64, elapsed: Duration) {
        if completed > 0 {
            if let Ok(mut ewma) = self.per_line.lock() {
                ewma.add(elapsed.as_secs_f64() / completed as f64);
            }
        }

        self.bar.inc(completed);

        if let Some(eta) = self.eta() {
            self.bar.set_message(format!("ETA {}", HumanDuration(eta)));
        }
    }

    async fn complete_and_wait(&self) {
        self.bar.finish_with_message("done");
    }
}

/// Exponentially weighted moving average with decay `2 / (age + 1)`
#[derive(Debug, Clone)]
struct Ewma {
    alpha: f64,
    value: Option<f64>,
}

impl Ewma {
    fn new(age: f64) -> Self {
        Self {
            alpha: 2.0 / (age + 1.0),
            value: None,
        }
    }

    fn add(&mut self, sample: f64) {
        self.value = Some(match self.value {
            None => sample,
            Some(current) => sample * self.alpha + current * (1.0 - self.alpha),
        });
    }

    fn value(&self) -> Option<f64> {
        self.value
    }
}
