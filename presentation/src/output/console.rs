//! Console formatting for council outcomes

use colored::Colorize;
use council_domain::CouncilOutcome;

/// Formats a [`CouncilOutcome`] for terminal display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Full output: responses, ranking tables, synthesis, and errors.
    pub fn format(outcome: &CouncilOutcome) -> String {
        let mut out = String::new();

        out.push_str(&format!("\n{}\n", "=== Stage 1: Responses ===".bold().cyan()));
        if outcome.stage1.is_empty() {
            out.push_str("(no model responded)\n");
        }
        for response in &outcome.stage1 {
            out.push_str(&format!(
                "\n{}\n{}\n",
                format!("--- {} ---", response.model).bold(),
                response.response
            ));
        }

        out.push_str(&format!("\n{}\n", "=== Stage 2: Rankings ===".bold().cyan()));
        let aggregate = &outcome.metadata.aggregate_rankings;
        if aggregate.is_empty() {
            out.push_str("(no valid votes)\n");
        } else {
            out.push_str(&format!("{}\n", "By mean position:".bold()));
            for (i, entry) in aggregate.iter().enumerate() {
                out.push_str(&format!(
                    "  {}. {} (avg rank {:.2}, {} vote(s))\n",
                    i + 1,
                    entry.model,
                    entry.average_rank,
                    entry.rankings_count
                ));
            }
        }
        let tournament = &outcome.metadata.tournament_rankings;
        if !tournament.is_empty() {
            out.push_str(&format!("{}\n", "By pairwise tournament:".bold()));
            for (i, entry) in tournament.iter().enumerate() {
                out.push_str(&format!(
                    "  {}. {} ({:.0}W-{:.0}L-{:.0}T, win rate {:.3})\n",
                    i + 1,
                    entry.model,
                    entry.wins,
                    entry.losses,
                    entry.ties,
                    entry.win_percentage
                ));
            }
        }

        out.push_str(&format!("\n{}\n", "=== Stage 3: Synthesis ===".bold().cyan()));
        out.push_str(&format!(
            "{}\n{}\n",
            format!("--- {} ---", outcome.stage3.model).bold(),
            outcome.stage3.response
        ));

        if let Some(errors) = &outcome.metadata.errors {
            out.push_str(&format!(
                "\n{} {} model call(s) failed during the run\n",
                "!".yellow().bold(),
                errors.len()
            ));
            for error in errors
                .stage1
                .iter()
                .chain(&errors.stage2)
                .chain(&errors.stage3)
            {
                let model = error
                    .model
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "  {} {}: {} - {}\n",
                    "x".red(),
                    model,
                    error.kind,
                    error.message
                ));
            }
        }

        out
    }

    /// Synthesis-only output (concise).
    pub fn format_synthesis_only(outcome: &CouncilOutcome) -> String {
        outcome.stage3.response.clone()
    }

    /// Machine-readable JSON of the complete outcome.
    pub fn format_json(outcome: &CouncilOutcome) -> String {
        serde_json::to_string_pretty(outcome)
            .unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {}\"}}", e))
    }
}
