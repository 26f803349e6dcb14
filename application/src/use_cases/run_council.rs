//! Run Council use case
//!
//! Orchestrates the full three-stage deliberation:
//!
//! 1. every council model answers the query (parallel fan-out)
//! 2. every council model ranks the anonymized answers (parallel
//!    fan-out, strict-JSON parsing, two aggregation algorithms)
//! 3. the chairman synthesizes the final answer from everything above
//!
//! Partial failure is tolerated at every stage; the only early exit is a
//! stage-1 total failure. The pipeline always returns a displayable
//! [`CouncilOutcome`] — it has no error channel of its own.

use crate::ports::event_sink::{CouncilEvent, CouncilEventSink, NoopSink, Stage2Metadata};
use crate::ports::model_client::{DEFAULT_QUERY_TIMEOUT, ModelClient, query_all};
use council_domain::{
    CouncilMetadata, CouncilOutcome, LabelMap, Message, ModelId, PromptTemplate, QueryError,
    QueryOutcome, Stage1Response, Stage2Ranking, Stage3Synthesis, StageErrors, aggregate_rankings,
    parse_ranking, summarize_errors, tournament_rankings,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Input for one council deliberation.
#[derive(Debug, Clone)]
pub struct CouncilInput {
    /// Full message history; the last message's content is the current
    /// query used for the stage-2 and stage-3 prompts.
    pub messages: Vec<Message>,
    pub council_models: Vec<ModelId>,
    pub chairman_model: ModelId,
    /// When set, every model id (council and chairman) gets the
    /// web-search suffix applied before querying.
    pub web_search: bool,
}

impl CouncilInput {
    pub fn new(messages: Vec<Message>, council_models: Vec<ModelId>, chairman_model: ModelId) -> Self {
        Self {
            messages,
            council_models,
            chairman_model,
            web_search: false,
        }
    }

    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }
}

/// Use case for running a council deliberation
pub struct RunCouncilUseCase<C: ModelClient + 'static> {
    client: Arc<C>,
}

impl<C: ModelClient + 'static> RunCouncilUseCase<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Execute the pipeline without event delivery.
    pub async fn execute(&self, input: CouncilInput) -> CouncilOutcome {
        self.execute_with_events(input, &NoopSink).await
    }

    /// Execute the pipeline, emitting lifecycle events as stages
    /// start and complete.
    pub async fn execute_with_events(
        &self,
        input: CouncilInput,
        sink: &dyn CouncilEventSink,
    ) -> CouncilOutcome {
        let (council, chairman) = resolve_models(&input);

        // Empty history: validation failure, no stages run
        let Some(current_query) = input.messages.last().map(|m| m.content.clone()) else {
            let error = QueryError::validation("Empty messages list");
            let stage3 = Stage3Synthesis::empty_input();
            sink.emit(CouncilEvent::Error {
                message: stage3.response.clone(),
                errors: Some(vec![error.clone()]),
            });
            let metadata = CouncilMetadata {
                council_models: council,
                chairman_model: Some(chairman),
                ..Default::default()
            }
            .with_errors(StageErrors {
                stage1: vec![error],
                ..Default::default()
            });
            return CouncilOutcome::new(vec![], vec![], stage3, metadata);
        };

        info!(
            "Starting council with {} models, chairman {}",
            council.len(),
            chairman
        );

        // Stage 1: collect individual responses with full context
        sink.emit(CouncilEvent::Stage1Start);
        let (stage1, stage1_errors) = self.stage1(&council, &input.messages).await;
        sink.emit(CouncilEvent::Stage1Complete {
            data: stage1.clone(),
            errors: optional(&stage1_errors),
        });

        if stage1.is_empty() {
            let summary = summarize_errors(&stage1_errors);
            warn!("Stage 1 total failure: {}", summary);
            let stage3 = Stage3Synthesis::all_models_failed(&summary);
            sink.emit(CouncilEvent::Error {
                message: stage3.response.clone(),
                errors: optional(&stage1_errors),
            });
            let metadata = CouncilMetadata {
                council_models: council,
                chairman_model: Some(chairman),
                ..Default::default()
            }
            .with_errors(StageErrors {
                stage1: stage1_errors,
                ..Default::default()
            });
            return CouncilOutcome::new(stage1, vec![], stage3, metadata);
        }

        // Stage 2: rank anonymized responses
        sink.emit(CouncilEvent::Stage2Start);
        let labels = LabelMap::assign(
            &stage1.iter().map(|r| r.model.clone()).collect::<Vec<_>>(),
        );
        let (stage2, stage2_errors) = self
            .stage2(&council, &current_query, &stage1, &labels)
            .await;

        let aggregate = aggregate_rankings(&stage2, &labels);
        let tournament = tournament_rankings(&stage2, &labels);
        sink.emit(CouncilEvent::Stage2Complete {
            data: stage2.clone(),
            metadata: Stage2Metadata {
                label_to_model: labels.clone(),
                aggregate_rankings: aggregate.clone(),
                tournament_rankings: tournament.clone(),
            },
            errors: optional(&stage2_errors),
        });

        // Stage 3: chairman synthesis
        sink.emit(CouncilEvent::Stage3Start);
        let (stage3, stage3_errors) = self
            .stage3(
                &chairman,
                &current_query,
                &stage1,
                &stage2,
                &labels,
                &aggregate,
                &tournament,
            )
            .await;
        sink.emit(CouncilEvent::Stage3Complete {
            data: stage3.clone(),
            errors: optional(&stage3_errors),
        });

        sink.emit(CouncilEvent::Complete);

        let metadata = CouncilMetadata {
            label_to_model: labels,
            aggregate_rankings: aggregate,
            tournament_rankings: tournament,
            council_models: council,
            chairman_model: Some(chairman),
            errors: None,
        }
        .with_errors(StageErrors {
            stage1: stage1_errors,
            stage2: stage2_errors,
            stage3: stage3_errors,
        });

        CouncilOutcome::new(stage1, stage2, stage3, metadata)
    }

    /// Stage 1: query all council models in parallel with full context.
    async fn stage1(
        &self,
        council: &[ModelId],
        messages: &[Message],
    ) -> (Vec<Stage1Response>, Vec<QueryError>) {
        info!("Stage 1: querying {} council models", council.len());

        let responses = query_all(&self.client, council, messages, DEFAULT_QUERY_TIMEOUT).await;

        let mut results = Vec::new();
        let mut errors = Vec::new();
        for (model, outcome) in responses {
            match outcome {
                QueryOutcome::Success(reply) => {
                    results.push(Stage1Response::new(model, reply.content));
                }
                QueryOutcome::Failure(error) => {
                    warn!("Stage 1: {} failed: {}", model, error);
                    errors.push(error);
                }
            }
        }

        info!(
            "Stage 1: {} successful, {} failed",
            results.len(),
            errors.len()
        );
        (results, errors)
    }

    /// Stage 2: every council model ranks the anonymized stage-1
    /// responses. A ranker whose output violates the ranking contract
    /// still yields a `Stage2Ranking`, just with no vote.
    async fn stage2(
        &self,
        council: &[ModelId],
        current_query: &str,
        stage1: &[Stage1Response],
        labels: &LabelMap,
    ) -> (Vec<Stage2Ranking>, Vec<QueryError>) {
        info!("Stage 2: querying {} council models for rankings", council.len());

        let labeled: Vec<(String, String)> = labels
            .labels()
            .zip(stage1.iter())
            .map(|(label, result)| (label.to_string(), result.response.clone()))
            .collect();

        let prompt = PromptTemplate::ranking_prompt(current_query, &labeled);
        let messages = vec![Message::user(prompt)];
        let expected = labels.expected_labels();

        let responses = query_all(&self.client, council, &messages, DEFAULT_QUERY_TIMEOUT).await;

        let mut results = Vec::new();
        let mut errors = Vec::new();
        for (model, outcome) in responses {
            match outcome {
                QueryOutcome::Success(reply) => {
                    let parsed = parse_ranking(&reply.content, Some(&expected));
                    if parsed.is_empty() {
                        warn!("Stage 2: {} returned no valid ranking", model);
                    }
                    results.push(Stage2Ranking::new(model, reply.content, parsed));
                }
                QueryOutcome::Failure(error) => {
                    warn!("Stage 2: {} failed: {}", model, error);
                    errors.push(error);
                }
            }
        }

        info!(
            "Stage 2: {} successful, {} failed",
            results.len(),
            errors.len()
        );
        (results, errors)
    }

    /// Stage 3: one chairman call. A failure is folded into a
    /// displayable synthesis rather than aborting the run.
    #[allow(clippy::too_many_arguments)]
    async fn stage3(
        &self,
        chairman: &ModelId,
        current_query: &str,
        stage1: &[Stage1Response],
        stage2: &[Stage2Ranking],
        labels: &LabelMap,
        aggregate: &[council_domain::AggregateEntry],
        tournament: &[council_domain::TournamentEntry],
    ) -> (Stage3Synthesis, Vec<QueryError>) {
        info!("Stage 3: chairman model {}", chairman);

        let prompt = PromptTemplate::chairman_prompt(
            current_query,
            stage1,
            stage2,
            labels,
            aggregate,
            tournament,
        );
        let messages = vec![Message::user(prompt)];

        let outcome = self
            .client
            .query(chairman, &messages, DEFAULT_QUERY_TIMEOUT)
            .await;

        match outcome {
            QueryOutcome::Success(reply) => {
                info!("Stage 3: chairman synthesis complete");
                (Stage3Synthesis::success(chairman.clone(), reply.content), vec![])
            }
            QueryOutcome::Failure(error) => {
                warn!("Stage 3: chairman failed: {}", error);
                (
                    Stage3Synthesis::failure(chairman.clone(), error.clone()),
                    vec![error],
                )
            }
        }
    }
}

/// Apply the web-search suffix (idempotently) when enabled.
fn resolve_models(input: &CouncilInput) -> (Vec<ModelId>, ModelId) {
    if input.web_search {
        (
            input
                .council_models
                .iter()
                .map(|m| m.with_web_search())
                .collect(),
            input.chairman_model.with_web_search(),
        )
    } else {
        (input.council_models.clone(), input.chairman_model.clone())
    }
}

fn optional(errors: &[QueryError]) -> Option<Vec<QueryError>> {
    if errors.is_empty() {
        None
    } else {
        Some(errors.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::event_sink::ChannelSink;
    use async_trait::async_trait;
    use council_domain::QueryErrorKind;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted client: each model answers from a queue, one entry per
    /// expected call (stage 1 first, then stage 2; chairman once).
    struct ScriptedClient {
        scripts: Mutex<HashMap<ModelId, Vec<QueryOutcome>>>,
        prompts: Mutex<Vec<(ModelId, String)>>,
    }

    impl ScriptedClient {
        fn new() -> Self {
            Self {
                scripts: Mutex::new(HashMap::new()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn script(self, model: &str, outcomes: Vec<QueryOutcome>) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert(ModelId::new(model), outcomes);
            self
        }

        fn prompts_for(&self, model: &str) -> Vec<String> {
            self.prompts
                .lock()
                .unwrap()
                .iter()
                .filter(|(m, _)| m == &ModelId::new(model))
                .map(|(_, p)| p.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn query(
            &self,
            model: &ModelId,
            messages: &[Message],
            _timeout: Duration,
        ) -> QueryOutcome {
            self.prompts
                .lock()
                .unwrap()
                .push((model.clone(), messages.last().unwrap().content.clone()));

            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(model) {
                Some(queue) if !queue.is_empty() => queue.remove(0),
                _ => QueryOutcome::failure(QueryError::unknown(model.clone(), "unscripted call")),
            }
        }
    }

    fn ranking_json(labels: &[&str]) -> QueryOutcome {
        QueryOutcome::success(
            serde_json::json!({ "final_ranking": labels }).to_string(),
        )
    }

    fn input_for(client_models: &[&str], chairman: &str) -> CouncilInput {
        CouncilInput::new(
            vec![Message::user("What is Rust?")],
            client_models.iter().map(|m| ModelId::new(*m)).collect(),
            ModelId::new(chairman),
        )
    }

    fn happy_path_client() -> ScriptedClient {
        ScriptedClient::new()
            .script(
                "a/one",
                vec![
                    QueryOutcome::success("Answer from one"),
                    ranking_json(&["Response A", "Response B"]),
                ],
            )
            .script(
                "b/two",
                vec![
                    QueryOutcome::success("Answer from two"),
                    ranking_json(&["Response B", "Response A"]),
                ],
            )
            .script("chair/man", vec![QueryOutcome::success("The synthesis.")])
    }

    #[tokio::test]
    async fn test_full_run_produces_quadruple() {
        let client = Arc::new(happy_path_client());
        let use_case = RunCouncilUseCase::new(Arc::clone(&client));

        let outcome = use_case
            .execute(input_for(&["a/one", "b/two"], "chair/man"))
            .await;

        assert_eq!(outcome.stage1.len(), 2);
        assert_eq!(outcome.stage2.len(), 2);
        assert_eq!(outcome.stage3.response, "The synthesis.");
        assert!(outcome.metadata.errors.is_none());

        // Both rankers voted; split pair averages to 1.5 each
        assert_eq!(outcome.metadata.aggregate_rankings.len(), 2);
        assert_eq!(outcome.metadata.aggregate_rankings[0].average_rank, 1.5);
        assert_eq!(outcome.metadata.tournament_rankings.len(), 2);
        assert_eq!(outcome.metadata.tournament_rankings[0].win_percentage, 0.5);
    }

    #[tokio::test]
    async fn test_chairman_prompt_carries_ranking_signals() {
        let client = Arc::new(happy_path_client());
        let use_case = RunCouncilUseCase::new(Arc::clone(&client));

        use_case
            .execute(input_for(&["a/one", "b/two"], "chair/man"))
            .await;

        let chairman_prompts = client.prompts_for("chair/man");
        assert_eq!(chairman_prompts.len(), 1);
        let prompt = &chairman_prompts[0];
        assert!(prompt.contains("Model: a/one"));
        assert!(prompt.contains("mean position"));
        assert!(prompt.contains("pairwise tournament"));
    }

    #[tokio::test]
    async fn test_fanout_isolation_partial_failure_proceeds() {
        let client = Arc::new(
            ScriptedClient::new()
                .script(
                    "a/one",
                    vec![
                        QueryOutcome::success("Answer one"),
                        ranking_json(&["Response A", "Response B"]),
                    ],
                )
                .script(
                    "b/two",
                    vec![
                        QueryOutcome::success("Answer two"),
                        ranking_json(&["Response B", "Response A"]),
                    ],
                )
                .script(
                    "c/slow",
                    vec![
                        QueryOutcome::failure(QueryError::timeout(ModelId::new("c/slow"), 120.0)),
                        ranking_json(&["Response A", "Response B"]),
                    ],
                )
                .script("chair/man", vec![QueryOutcome::success("Synthesis.")]),
        );
        let use_case = RunCouncilUseCase::new(Arc::clone(&client));

        let outcome = use_case
            .execute(input_for(&["a/one", "b/two", "c/slow"], "chair/man"))
            .await;

        // Two successes survive; the timeout is recorded, not fatal
        assert_eq!(outcome.stage1.len(), 2);
        let errors = outcome.metadata.errors.as_ref().unwrap();
        assert_eq!(errors.stage1.len(), 1);
        assert_eq!(errors.stage1[0].kind, QueryErrorKind::Timeout);

        // Only two labels were assigned, so c/slow still ranks A and B
        assert_eq!(outcome.metadata.label_to_model.len(), 2);
        assert_eq!(outcome.stage2.len(), 3);
    }

    #[tokio::test]
    async fn test_total_failure_short_circuits_before_stage2() {
        let models = ["a/one", "b/two", "c/three"];
        let mut client = ScriptedClient::new();
        for model in models {
            client = client.script(
                model,
                vec![QueryOutcome::failure(QueryError::rate_limit(
                    ModelId::new(model),
                ))],
            );
        }
        let client = Arc::new(client);
        let use_case = RunCouncilUseCase::new(Arc::clone(&client));

        let outcome = use_case.execute(input_for(&models, "chair/man")).await;

        assert!(outcome.stage1.is_empty());
        assert!(outcome.stage2.is_empty());
        assert_eq!(outcome.stage3.model, ModelId::new("error"));
        assert!(outcome.stage3.response.contains("rate limited"));

        let errors = outcome.metadata.errors.as_ref().unwrap();
        assert_eq!(errors.stage1.len(), 3);
        assert!(errors.stage2.is_empty());
        assert!(errors.stage3.is_empty());

        // The chairman was never consulted
        assert!(client.prompts_for("chair/man").is_empty());
    }

    #[tokio::test]
    async fn test_event_order_happy_path() {
        let client = Arc::new(happy_path_client());
        let use_case = RunCouncilUseCase::new(Arc::clone(&client));
        let (sink, mut receiver) = ChannelSink::new();

        use_case
            .execute_with_events(input_for(&["a/one", "b/two"], "chair/man"), &sink)
            .await;
        drop(sink);

        let mut types = Vec::new();
        while let Some(event) = receiver.recv().await {
            types.push(event.event_type());
        }
        assert_eq!(
            types,
            vec![
                "stage1_start",
                "stage1_complete",
                "stage2_start",
                "stage2_complete",
                "stage3_start",
                "stage3_complete",
                "complete",
            ]
        );
    }

    #[tokio::test]
    async fn test_event_order_total_failure() {
        let client = Arc::new(ScriptedClient::new().script(
            "a/one",
            vec![QueryOutcome::failure(QueryError::server(
                ModelId::new("a/one"),
                500,
            ))],
        ));
        let use_case = RunCouncilUseCase::new(Arc::clone(&client));
        let (sink, mut receiver) = ChannelSink::new();

        use_case
            .execute_with_events(input_for(&["a/one"], "chair/man"), &sink)
            .await;
        drop(sink);

        let mut types = Vec::new();
        while let Some(event) = receiver.recv().await {
            types.push(event.event_type());
        }
        assert_eq!(types, vec!["stage1_start", "stage1_complete", "error"]);
    }

    #[tokio::test]
    async fn test_empty_history_is_validation_error() {
        let client = Arc::new(ScriptedClient::new());
        let use_case = RunCouncilUseCase::new(Arc::clone(&client));

        let input = CouncilInput::new(
            vec![],
            vec![ModelId::new("a/one")],
            ModelId::new("chair/man"),
        );
        let outcome = use_case.execute(input).await;

        assert!(outcome.stage1.is_empty());
        assert!(outcome.stage2.is_empty());
        assert_eq!(outcome.stage3.model, ModelId::new("error"));

        let errors = outcome.metadata.errors.as_ref().unwrap();
        assert_eq!(errors.stage1.len(), 1);
        assert_eq!(errors.stage1[0].kind, QueryErrorKind::Validation);
        assert!(errors.stage2.is_empty() && errors.stage3.is_empty());

        // No model was ever queried
        assert!(client.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chairman_failure_still_displayable() {
        let client = Arc::new(
            ScriptedClient::new()
                .script(
                    "a/one",
                    vec![
                        QueryOutcome::success("Only answer"),
                        ranking_json(&["Response A"]),
                    ],
                )
                .script(
                    "chair/man",
                    vec![QueryOutcome::failure(QueryError::server(
                        ModelId::new("chair/man"),
                        502,
                    ))],
                ),
        );
        let use_case = RunCouncilUseCase::new(Arc::clone(&client));

        let outcome = use_case.execute(input_for(&["a/one"], "chair/man")).await;

        assert!(outcome.stage3.response.starts_with("Error: "));
        assert_eq!(
            outcome.stage3.error.as_ref().unwrap().kind,
            QueryErrorKind::Server
        );
        let errors = outcome.metadata.errors.as_ref().unwrap();
        assert_eq!(errors.stage3.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_ranking_counts_as_non_vote() {
        let client = Arc::new(
            ScriptedClient::new()
                .script(
                    "a/one",
                    vec![
                        QueryOutcome::success("Answer one"),
                        ranking_json(&["Response A", "Response B"]),
                    ],
                )
                .script(
                    "b/two",
                    vec![
                        QueryOutcome::success("Answer two"),
                        QueryOutcome::success("I simply cannot rank these."),
                    ],
                )
                .script("chair/man", vec![QueryOutcome::success("Synthesis.")]),
        );
        let use_case = RunCouncilUseCase::new(Arc::clone(&client));

        let outcome = use_case
            .execute(input_for(&["a/one", "b/two"], "chair/man"))
            .await;

        // b/two still succeeded at stage 2 for error accounting
        assert_eq!(outcome.stage2.len(), 2);
        assert!(outcome.metadata.errors.is_none());

        let abstainer = outcome
            .stage2
            .iter()
            .find(|r| r.model == ModelId::new("b/two"))
            .unwrap();
        assert!(!abstainer.has_vote());

        // Only one vote counted: a/one ranked A over B
        let aggregate = &outcome.metadata.aggregate_rankings;
        assert!(aggregate.iter().all(|e| e.rankings_count == 1));
        // Tournament still lists both candidates
        assert_eq!(outcome.metadata.tournament_rankings.len(), 2);
    }

    #[tokio::test]
    async fn test_web_search_suffix_applied_to_all_queries() {
        let client = Arc::new(
            ScriptedClient::new()
                .script(
                    "a/one:online",
                    vec![
                        QueryOutcome::success("Answer"),
                        ranking_json(&["Response A"]),
                    ],
                )
                .script(
                    "chair/man:online",
                    vec![QueryOutcome::success("Synthesis.")],
                ),
        );
        let use_case = RunCouncilUseCase::new(Arc::clone(&client));

        let input = input_for(&["a/one"], "chair/man").with_web_search(true);
        let outcome = use_case.execute(input).await;

        assert!(outcome.metadata.errors.is_none());
        assert_eq!(outcome.stage3.model, ModelId::new("chair/man:online"));
        assert_eq!(
            outcome.metadata.council_models,
            vec![ModelId::new("a/one:online")]
        );
    }
}
