//! Prompt templates for the three council stages.
//!
//! Stage 1 sends the conversation history as-is; the templates here cover
//! the stage-2 ranking prompt (anonymized responses + scoring rubric +
//! strict output contract), the stage-3 chairman prompt (de-anonymized
//! responses + ranking signals + synthesis policy), and title generation.

use crate::council::aggregate::{AggregateEntry, TournamentEntry};
use crate::council::label::LabelMap;
use crate::council::results::{Stage1Response, Stage2Ranking};

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Ranking prompt shown to every council model in stage 2.
    ///
    /// `labeled_responses` pairs each label ("Response A") with the
    /// response text, in label-assignment order.
    pub fn ranking_prompt(query: &str, labeled_responses: &[(String, String)]) -> String {
        let responses_text = labeled_responses
            .iter()
            .map(|(label, response)| format!("{}:\n{}", label, response))
            .collect::<Vec<_>>()
            .join("\n\n");

        let allowed_labels = labeled_responses
            .iter()
            .map(|(label, _)| format!("\"{}\"", label))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"You are evaluating different responses to the following question:

Question: {query}

Here are the responses from different models (anonymized):

{responses_text}

Evaluate every response against these weighted criteria:
- Correctness (40%): factual accuracy and absence of errors
- Completeness (25%): coverage of the question's important aspects
- Reasoning quality (20%): soundness and clarity of the argument
- Usefulness (10%): practical value to the person asking
- Safety and uncertainty handling (5%): honest hedging where warranted

Then rank all responses from best to worst.

IMPORTANT: Reply with ONLY a single JSON object, no other text, in exactly
this form:

{{"final_ranking": ["Response B", "Response A", "Response C"]}}

The array must contain each of these labels exactly once: [{allowed_labels}].
Do not wrap the JSON in a code fence. Do not add commentary."#
        )
    }

    /// Chairman prompt for stage 3.
    ///
    /// Model identity is revealed here — anonymity only matters during
    /// peer ranking, and the chairman benefits from knowing who said what.
    pub fn chairman_prompt(
        query: &str,
        stage1: &[Stage1Response],
        stage2: &[Stage2Ranking],
        labels: &LabelMap,
        aggregate: &[AggregateEntry],
        tournament: &[TournamentEntry],
    ) -> String {
        let stage1_text = stage1
            .iter()
            .map(|r| format!("Model: {}\nResponse: {}", r.model, r.response))
            .collect::<Vec<_>>()
            .join("\n\n");

        let preferences_text = Self::render_preferences(stage2, labels);
        let aggregate_text = Self::render_aggregate_table(aggregate);
        let tournament_text = Self::render_tournament_table(tournament);

        format!(
            r#"You are the Chairman of an LLM Council. Multiple AI models have provided responses to a user's question, and then ranked each other's responses.

Original Question: {query}

STAGE 1 - Individual Responses:
{stage1_text}

STAGE 2 - Peer Preferences (best to worst, per ranker):
{preferences_text}

Aggregate ranking by mean position (lower is better):
{aggregate_text}

Aggregate ranking by pairwise tournament (higher win rate is better):
{tournament_text}

Your task as Chairman is to synthesize all of this information into a single, comprehensive, accurate answer to the user's original question. Guidelines:
- Treat the rankings as weak evidence of quality, not ground truth
- Prioritize factual correctness over popularity among rankers
- Where responses conflict, resolve the conflict explicitly
- Flag any residual uncertainty rather than papering over it

Provide a clear, well-reasoned final answer that represents the council's collective wisdom:"#
        )
    }

    /// Title-generation prompt for the first message of a conversation.
    pub fn title_prompt(query: &str) -> String {
        format!(
            r#"Generate a very short title (3-5 words maximum) that summarizes the following question.
The title should be concise and descriptive. Do not use quotes or punctuation in the title.

Question: {query}

Title:"#
        )
    }

    fn render_preferences(stage2: &[Stage2Ranking], labels: &LabelMap) -> String {
        let lines: Vec<String> = stage2
            .iter()
            .map(|ranking| {
                if !ranking.has_vote() {
                    return format!("{}: (no valid ranking)", ranking.model);
                }
                let order = ranking
                    .parsed_ranking
                    .iter()
                    .filter_map(|label| labels.model_for(label))
                    .map(|model| model.to_string())
                    .collect::<Vec<_>>()
                    .join(" > ");
                format!("{}: {}", ranking.model, order)
            })
            .collect();

        if lines.is_empty() {
            "(no rankings were collected)".to_string()
        } else {
            lines.join("\n")
        }
    }

    fn render_aggregate_table(aggregate: &[AggregateEntry]) -> String {
        if aggregate.is_empty() {
            return "(no valid votes)".to_string();
        }
        aggregate
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                format!(
                    "{}. {} (average rank {:.2} across {} vote(s))",
                    i + 1,
                    entry.model,
                    entry.average_rank,
                    entry.rankings_count
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_tournament_table(tournament: &[TournamentEntry]) -> String {
        if tournament.is_empty() {
            return "(no candidates)".to_string();
        }
        tournament
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                format!(
                    "{}. {} ({:.0}-{:.0}-{:.0} W-L-T, win rate {:.3})",
                    i + 1,
                    entry.model,
                    entry.wins,
                    entry.losses,
                    entry.ties,
                    entry.win_percentage
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
