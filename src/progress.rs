use indicatif::{ProgressDrawTarget, ProgressState, ProgressStyle};
use std::fmt::Write;

/// Every crawl phase uses a 30-cell bar.
const TEMPLATE: &str = "{prefix} |{bar:30}| {pct} Complete";

/// Percentage with one decimal, e.g. `33.3%`.
pub fn format_percent(fraction: f32) -> String {
    format!("{:.1}%", fraction * 100.0)
}

fn style() -> ProgressStyle {
    ProgressStyle::with_template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key("pct", |state: &ProgressState, w: &mut dyn Write| {
            write!(w, "{}", format_percent(state.fraction())).unwrap()
        })
        .progress_chars("█-")
}

/// Counting progress bar drawn on stdout; hidden when disabled.
pub struct ProgressBar {
    bar: indicatif::ProgressBar,
}

impl ProgressBar {
    pub fn new(enabled: bool, total: usize, prefix: &str) -> Self {
        let target = if enabled {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        };
        let bar = indicatif::ProgressBar::with_draw_target(Some(total as u64), target)
            .with_style(style())
            .with_prefix(prefix.to_string());
        Self { bar }
    }

    /// Draw the empty bar. An empty job is complete straight away.
    pub fn start(&self) {
        if self.bar.length() == Some(0) {
            self.bar.finish();
        } else {
            self.bar.tick();
        }
    }

    /// Advance by one; the bar is finished once it reaches its total.
    pub fn update(&mut self) {
        self.bar.inc(1);
        if Some(self.bar.position()) >= self.bar.length() {
            self.bar.finish();
        }
    }

    #[cfg(test)]
    fn position(&self) -> u64 {
        self.bar.position()
    }

    #[cfg(test)]
    fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}
