//! Progress bar utilities for headless runs
//!
//! Visual feedback while a run is fast-forwarded or a sweep of seeds is
//! simulated, using the indicatif crate.

use crate::core::types::month_name;
use crate::simulation::FinalReport;
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for ticks of a single run
pub struct RunProgress {
    pub progress: ProgressBar,
}

/// Progress bar for a sweep over many seeds
pub struct SweepProgress {
    pub progress: ProgressBar,
}

impl RunProgress {
    pub fn new(total_ticks: u64) -> Self {
        let progress = ProgressBar::new(total_ticks);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}\n{msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-")
        );

        Self { progress }
    }

    /// Update with the latest tick
    pub fn update(&self, tick: u64, month_index: u32, net_worth: f64) {
        self.progress.set_position(tick);
        self.progress.set_message(format!(
            "📅 {} | 💼 Net worth: ${:.2}",
            month_name(month_index), net_worth
        ));
    }

    pub fn finish(&self, report: &FinalReport) {
        self.progress.finish_with_message(format!(
            "✅ Run complete! Net worth ${:.2} (P/L {:+.2}%)",
            report.final_net_worth, report.profit_loss_pct
        ));
    }
}

impl SweepProgress {
    pub fn new(runs: u64) -> Self {
        let progress = ProgressBar::new(runs);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} runs ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-")
        );

        Self { progress }
    }

    pub fn inc(&self) {
        self.progress.inc(1);
    }

    pub fn finish(&self) {
        self.progress.finish_with_message("✅ Sweep complete");
    }
}
