//! Consensus orderings over stage-2 rankings.
//!
//! Two independent algorithms, both treating an empty parsed ranking as a
//! non-vote:
//!
//! - [`aggregate_rankings`] — mean position across rankers. Simple, but a
//!   single outlier ranker drags averages.
//! - [`tournament_rankings`] — pairwise majority between every pair of
//!   models. Each matchup is decided by how many rankers preferred one
//!   side, so one reversed ranking cannot flip a matchup the majority
//!   agrees on.

use super::label::LabelMap;
use super::results::Stage2Ranking;
use crate::core::model::ModelId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the mean-position table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateEntry {
    pub model: ModelId,
    /// Mean 1-based position across all rankers that placed this model,
    /// rounded to 2 decimal places. Lower is better.
    pub average_rank: f64,
    /// How many rankers placed this model
    pub rankings_count: usize,
}

/// One row of the pairwise-tournament table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentEntry {
    pub model: ModelId,
    pub wins: f64,
    pub losses: f64,
    pub ties: f64,
    /// `(wins + 0.5 * ties) / total_matchups`, rounded to 3 decimal
    /// places; 0 when the model had no matchups at all.
    pub win_percentage: f64,
    pub total_matchups: usize,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Mean-position aggregation.
///
/// Position 1 is best. Models that never received a valid position are
/// omitted — unlike the tournament table, this one only lists models at
/// least one ranker actually placed. Sorted ascending by average rank.
pub fn aggregate_rankings(stage2: &[Stage2Ranking], labels: &LabelMap) -> Vec<AggregateEntry> {
    let mut positions: BTreeMap<ModelId, Vec<usize>> = BTreeMap::new();

    for ranking in stage2 {
        if !ranking.has_vote() {
            continue;
        }
        for (index, label) in ranking.parsed_ranking.iter().enumerate() {
            if let Some(model) = labels.model_for(label) {
                positions.entry(model.clone()).or_default().push(index + 1);
            }
        }
    }

    let mut table: Vec<AggregateEntry> = positions
        .into_iter()
        .map(|(model, positions)| {
            let sum: usize = positions.iter().sum();
            AggregateEntry {
                model,
                average_rank: round2(sum as f64 / positions.len() as f64),
                rankings_count: positions.len(),
            }
        })
        .collect();

    // Ascending by average rank; equal averages keep model-name order
    // (entries start sorted by model, and the sort is stable).
    table.sort_by(|a, b| a.average_rank.total_cmp(&b.average_rank));

    table
}

/// Pairwise tournament aggregation.
///
/// The candidate universe is every model in the label map, including
/// models with zero valid votes. For each unordered pair, rankers that
/// placed both models each credit a sub-win to the model they put
/// earlier; the pair then resolves to one match win/loss (strict sub-win
/// majority) or one tie each (equal sub-wins with at least one preference
/// expressed). Pairs no ranker ever compared contribute nothing.
pub fn tournament_rankings(stage2: &[Stage2Ranking], labels: &LabelMap) -> Vec<TournamentEntry> {
    let universe = labels.model_universe();

    if universe.len() < 2 {
        // Pairwise comparison needs at least two candidates
        return universe
            .into_iter()
            .map(|model| TournamentEntry {
                model,
                wins: 0.0,
                losses: 0.0,
                ties: 0.0,
                win_percentage: 0.0,
                total_matchups: 0,
            })
            .collect();
    }

    // sub_wins[(i, j)] with i < j: (times universe[i] beat universe[j],
    // times universe[j] beat universe[i]) across rankers
    let mut sub_wins: BTreeMap<(usize, usize), (u32, u32)> = BTreeMap::new();

    for ranking in stage2 {
        if !ranking.has_vote() {
            continue;
        }

        // 0-based position of each universe model in this ranker's list
        let mut seat: BTreeMap<&ModelId, usize> = BTreeMap::new();
        for (position, label) in ranking.parsed_ranking.iter().enumerate() {
            if let Some(model) = labels.model_for(label) {
                seat.insert(model, position);
            }
        }

        for i in 0..universe.len() {
            for j in (i + 1)..universe.len() {
                let (Some(&pos_i), Some(&pos_j)) =
                    (seat.get(&universe[i]), seat.get(&universe[j]))
                else {
                    continue;
                };
                let entry = sub_wins.entry((i, j)).or_insert((0, 0));
                if pos_i < pos_j {
                    entry.0 += 1;
                } else if pos_j < pos_i {
                    entry.1 += 1;
                }
            }
        }
    }

    let mut stats: Vec<(f64, f64, f64)> = vec![(0.0, 0.0, 0.0); universe.len()];

    for i in 0..universe.len() {
        for j in (i + 1)..universe.len() {
            let (i_wins, j_wins) = sub_wins.get(&(i, j)).copied().unwrap_or((0, 0));
            if i_wins > j_wins {
                stats[i].0 += 1.0;
                stats[j].1 += 1.0;
            } else if j_wins > i_wins {
                stats[j].0 += 1.0;
                stats[i].1 += 1.0;
            } else if i_wins > 0 {
                // Equal sub-wins with at least one expressed preference
                stats[i].2 += 1.0;
                stats[j].2 += 1.0;
            }
            // Never compared together: the pair contributes nothing
        }
    }

    let mut table: Vec<TournamentEntry> = universe
        .into_iter()
        .zip(stats)
        .map(|(model, (wins, losses, ties))| {
            let total = wins + losses + ties;
            let win_percentage = if total > 0.0 {
                round3((wins + 0.5 * ties) / total)
            } else {
                0.0
            };
            TournamentEntry {
                model,
                wins,
                losses,
                ties,
                win_percentage,
                total_matchups: total as usize,
            }
        })
        .collect();

    // Win percentage descending, then fewer losses first; stable sort
    // keeps model-name order for full ties.
    table.sort_by(|a, b| {
        b.win_percentage
            .total_cmp(&a.win_percentage)
            .then(a.losses.total_cmp(&b.losses))
    });

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking(model: &str, labels: &[&str]) -> Stage2Ranking {
        let parsed: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
        let raw = serde_json::json!({ "final_ranking": parsed }).to_string();
        Stage2Ranking::new(ModelId::new(model), raw, parsed)
    }

    fn empty_vote(model: &str) -> Stage2Ranking {
        Stage2Ranking::new(ModelId::new(model), "I refuse to rank.", vec![])
    }

    fn two_model_labels() -> LabelMap {
        LabelMap::assign(&[ModelId::new("openai/gpt-5.1"), ModelId::new("anthropic/claude-opus-4.5")])
    }

    fn three_model_labels() -> LabelMap {
        LabelMap::assign(&[
            ModelId::new("openai/gpt-5.1"),
            ModelId::new("anthropic/claude-opus-4.5"),
            ModelId::new("google/gemini-3-pro-preview"),
        ])
    }

    #[test]
    fn test_aggregate_split_pair_averages_to_1_5() {
        let labels = two_model_labels();
        let stage2 = vec![
            ranking("r/one", &["Response A", "Response B"]),
            ranking("r/two", &["Response B", "Response A"]),
        ];

        let table = aggregate_rankings(&stage2, &labels);

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].average_rank, 1.5);
        assert_eq!(table[1].average_rank, 1.5);
        assert_eq!(table[0].rankings_count, 2);
    }

    #[test]
    fn test_aggregate_sorts_ascending() {
        let labels = two_model_labels();
        let stage2 = vec![
            ranking("r/one", &["Response B", "Response A"]),
            ranking("r/two", &["Response B", "Response A"]),
        ];

        let table = aggregate_rankings(&stage2, &labels);

        // Response B = claude, always first
        assert_eq!(table[0].model, ModelId::new("anthropic/claude-opus-4.5"));
        assert_eq!(table[0].average_rank, 1.0);
        assert_eq!(table[1].average_rank, 2.0);
    }

    #[test]
    fn test_aggregate_omits_zero_vote_models() {
        let labels = two_model_labels();
        let stage2 = vec![empty_vote("r/one")];
        assert!(aggregate_rankings(&stage2, &labels).is_empty());
    }

    #[test]
    fn test_aggregate_rounds_to_two_decimals() {
        let labels = three_model_labels();
        // gpt placed 1st, 2nd, 2nd => 5/3 = 1.666…
        let stage2 = vec![
            ranking("r/one", &["Response A", "Response B", "Response C"]),
            ranking("r/two", &["Response B", "Response A", "Response C"]),
            ranking("r/three", &["Response C", "Response A", "Response B"]),
        ];

        let table = aggregate_rankings(&stage2, &labels);
        let gpt = table
            .iter()
            .find(|e| e.model == ModelId::new("openai/gpt-5.1"))
            .unwrap();
        assert_eq!(gpt.average_rank, 1.67);
    }

    #[test]
    fn test_tournament_decisive_winner() {
        let labels = three_model_labels();
        // A beats B in 2 of 3, A beats C in 3 of 3
        let stage2 = vec![
            ranking("r/one", &["Response A", "Response B", "Response C"]),
            ranking("r/two", &["Response A", "Response C", "Response B"]),
            ranking("r/three", &["Response B", "Response A", "Response C"]),
        ];

        let table = tournament_rankings(&stage2, &labels);

        assert_eq!(table.len(), 3);
        assert_eq!(table[0].model, ModelId::new("openai/gpt-5.1"));
        assert_eq!(table[0].win_percentage, 1.0);
        assert_eq!(table[0].wins, 2.0);
        assert_eq!(table[0].losses, 0.0);
        assert_eq!(table[0].total_matchups, 2);
    }

    #[test]
    fn test_tournament_split_pair_ties() {
        let labels = two_model_labels();
        let stage2 = vec![
            ranking("r/one", &["Response A", "Response B"]),
            ranking("r/two", &["Response B", "Response A"]),
        ];

        let table = tournament_rankings(&stage2, &labels);

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].win_percentage, 0.5);
        assert_eq!(table[1].win_percentage, 0.5);
        assert_eq!(table[0].ties, 1.0);
        assert_eq!(table[1].ties, 1.0);
    }

    #[test]
    fn test_tournament_includes_models_with_zero_votes() {
        let labels = two_model_labels();
        let stage2 = vec![empty_vote("r/one"), empty_vote("r/two")];

        let table = tournament_rankings(&stage2, &labels);

        assert_eq!(table.len(), 2);
        for entry in &table {
            assert_eq!(entry.win_percentage, 0.0);
            assert_eq!(entry.total_matchups, 0);
        }
    }

    #[test]
    fn test_empty_vote_does_not_disturb_others_matchups() {
        let labels = two_model_labels();
        let stage2 = vec![
            ranking("r/one", &["Response A", "Response B"]),
            empty_vote("r/two"),
        ];

        let table = tournament_rankings(&stage2, &labels);

        // The single valid vote decides the pair; the abstention changes nothing
        assert_eq!(table[0].model, ModelId::new("openai/gpt-5.1"));
        assert_eq!(table[0].wins, 1.0);
        assert_eq!(table[0].total_matchups, 1);
        assert_eq!(table[1].losses, 1.0);
        assert_eq!(table[1].total_matchups, 1);
    }

    #[test]
    fn test_tournament_tiebreak_prefers_fewer_losses() {
        let labels = LabelMap::assign(&[
            ModelId::new("a/alpha"),
            ModelId::new("b/beta"),
            ModelId::new("c/gamma"),
            ModelId::new("d/delta"),
        ]);
        // alpha: beats beta and gamma, loses delta -> 2W 1L, 0.667
        // beta: beats gamma and delta, loses alpha -> 2W 1L, 0.667
        // delta: beats alpha, loses beta+gamma; gamma: beats delta, loses alpha+beta
        let stage2 = vec![
            ranking("r/one", &["Response A", "Response B", "Response C", "Response D"]),
            ranking("r/two", &["Response B", "Response D", "Response A", "Response C"]),
            ranking("r/three", &["Response A", "Response B", "Response D", "Response C"]),
            ranking("r/four", &["Response D", "Response A", "Response B", "Response C"]),
            ranking("r/five", &["Response B", "Response C", "Response A", "Response D"]),
        ];

        let table = tournament_rankings(&stage2, &labels);
        // Sanity: ordering is by win percentage desc, then losses asc
        for pair in table.windows(2) {
            assert!(
                pair[0].win_percentage > pair[1].win_percentage
                    || (pair[0].win_percentage == pair[1].win_percentage
                        && pair[0].losses <= pair[1].losses)
            );
        }
    }

    #[test]
    fn test_tournament_single_model_universe() {
        let labels = LabelMap::assign(&[ModelId::new("a/solo")]);
        let stage2 = vec![ranking("r/one", &["Response A"])];

        let table = tournament_rankings(&stage2, &labels);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].total_matchups, 0);
        assert_eq!(table[0].win_percentage, 0.0);
    }
}
