#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal output for the `crash_impact_statistics` CLI.
//!
//! Log lines and the crash join's progress bar share one terminal:
//! [`init_logger`] routes `log` through `indicatif-log-bridge` so records
//! print above the bar instead of through it.

use std::sync::Arc;
use std::time::Duration;

use crash_impact_spatial::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

const JOIN_TEMPLATE: &str =
    "  {msg} {wide_bar:.cyan/dim} {human_pos}/{human_len} crashes {percent}% [{eta}]";

/// Progress of the crash/component join, one unit per crash tested.
pub struct JoinProgress {
    bar: ProgressBar,
    counting: ProgressStyle,
}

impl JoinProgress {
    /// Adds a join bar to `multi`.
    ///
    /// The bar spins while records load and components are buffered, then
    /// counts crashes once the join reports its total.
    #[must_use]
    pub fn new(multi: &MultiProgress) -> Arc<Self> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message("Preparing join");

        let counting = ProgressStyle::with_template(JOIN_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");

        Arc::new(Self { bar, counting })
    }

    /// Crashes tested so far.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Total crashes to test, once known.
    #[must_use]
    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }
}

impl ProgressCallback for JoinProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.counting.clone());
        self.bar.set_message("Joining crashes");
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Installs the CLI logger and returns the [`MultiProgress`] the join bar
/// is drawn on.
///
/// Defaults to `info` so the join summary is shown; `RUST_LOG` overrides.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    // A logger may already be installed when run from tests.
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}

#[cfg(test)]
mod tests {
    use indicatif::ProgressDrawTarget;

    use super::*;

    #[test]
    fn join_bar_counts_crashes_once_total_is_known() {
        let multi = MultiProgress::with_draw_target(ProgressDrawTarget::hidden());
        let progress = JoinProgress::new(&multi);
        assert_eq!(progress.length(), None);

        progress.set_total(40);
        progress.inc(15);
        progress.inc(5);

        assert_eq!(progress.length(), Some(40));
        assert_eq!(progress.position(), 20);
    }
}
