//! Progress reporting for council execution
//!
//! Maps pipeline lifecycle events onto indicatif spinners, one per
//! stage.

use colored::Colorize;
use council_application::{CouncilEvent, CouncilEventSink};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Reports council progress with per-stage spinners
pub struct ProgressReporter {
    multi: MultiProgress,
    current: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            current: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap()
    }

    fn start_stage(&self, name: &str) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix(name.to_string());
        pb.set_message("running...");
        pb.enable_steady_tick(Duration::from_millis(100));
        *self.current.lock().unwrap() = Some(pb);
    }

    fn finish_stage(&self, message: String) {
        if let Some(pb) = self.current.lock().unwrap().take() {
            pb.finish_with_message(message);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl CouncilEventSink for ProgressReporter {
    fn emit(&self, event: CouncilEvent) {
        match event {
            CouncilEvent::Stage1Start => self.start_stage("Stage 1: Collecting responses"),
            CouncilEvent::Stage1Complete { data, errors } => {
                let failed = errors.map(|e| e.len()).unwrap_or(0);
                let summary = if failed == 0 {
                    format!("{} ({} responses)", "done".green(), data.len())
                } else {
                    format!(
                        "{} ({} responses, {} failed)",
                        "done".green(),
                        data.len(),
                        failed.to_string().red()
                    )
                };
                self.finish_stage(summary);
            }
            CouncilEvent::Stage2Start => self.start_stage("Stage 2: Peer ranking"),
            CouncilEvent::Stage2Complete { data, .. } => {
                let votes = data.iter().filter(|r| r.has_vote()).count();
                self.finish_stage(format!(
                    "{} ({}/{} valid rankings)",
                    "done".green(),
                    votes,
                    data.len()
                ));
            }
            CouncilEvent::Stage3Start => self.start_stage("Stage 3: Chairman synthesis"),
            CouncilEvent::Stage3Complete { data, .. } => {
                let summary = if data.error.is_none() {
                    format!("{} ({})", "done".green(), data.model)
                } else {
                    format!("{} ({})", "failed".red(), data.model)
                };
                self.finish_stage(summary);
            }
            CouncilEvent::Complete => {}
            CouncilEvent::Error { message, .. } => {
                self.finish_stage(format!("{} {}", "error:".red().bold(), message));
            }
        }
    }
}
