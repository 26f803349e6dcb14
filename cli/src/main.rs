//! CLI entrypoint for llm-council
//!
//! Wires the layers together with dependency injection: config →
//! OpenRouter client → use cases → console output.

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::{
    CouncilInput, DirectResponseUseCase, GenerateTitleUseCase, RunCouncilUseCase, StoreError,
    ValidateModelsUseCase,
};
use council_application::{ConversationStore, CouncilEventSink};
use council_domain::{Conversation, Message, ModelId};
use council_infrastructure::{
    CachingModelCatalog, ConfigLoader, JsonConversationStore, OpenRouterClient,
};
use council_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load configuration
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    for issue in config.validate() {
        warn!("Config issue: {}", issue);
    }

    let api_key = config.openrouter.resolve_api_key().with_context(|| {
        format!(
            "{} is not set. Export your OpenRouter API key first.",
            config.openrouter.api_key_env
        )
    })?;

    // === Dependency injection ===
    let client = Arc::new(
        OpenRouterClient::new(api_key)
            .with_api_url(&config.openrouter.api_url)
            .with_models_url(&config.openrouter.models_url),
    );

    // Resolve council membership: CLI flags override config
    let mut council_models: Vec<ModelId> = if cli.model.is_empty() {
        config.council.parse_models()
    } else {
        cli.model.iter().map(ModelId::new).collect()
    };
    let mut chairman = cli
        .chairman
        .as_ref()
        .map(ModelId::new)
        .unwrap_or_else(|| config.council.parse_chairman());
    let mut web_search = cli.web_search || config.council.web_search;

    if cli.validate_models {
        return validate_models(&client, &council_models, &chairman).await;
    }

    let Some(question) = cli.question.clone() else {
        bail!("Question is required (or use --validate-models).");
    };

    // Optionally continue a stored conversation
    let store = JsonConversationStore::new(&config.storage.data_dir);
    let conversation = match &cli.conversation {
        Some(id) => Some(load_or_create(&store, id).await?),
        None => None,
    };

    // Per-conversation overrides sit between CLI flags and global config
    if let Some(conversation) = &conversation {
        if cli.model.is_empty()
            && let Some(models) = &conversation.council_models
        {
            council_models = models.clone();
        }
        if cli.chairman.is_none()
            && let Some(model) = &conversation.chairman_model
        {
            chairman = model.clone();
        }
        if !cli.web_search
            && let Some(enabled) = conversation.web_search_enabled
        {
            web_search = enabled;
        }
    }

    let mut messages = conversation
        .as_ref()
        .map(|c| c.context_messages())
        .unwrap_or_default();
    messages.push(Message::user(question.clone()));

    // First message of a conversation also names it; run title
    // generation concurrently with the deliberation itself.
    let title_task = conversation
        .as_ref()
        .filter(|c| c.messages.is_empty())
        .map(|_| {
            let client = Arc::clone(&client);
            let chairman = chairman.clone();
            let question = question.clone();
            tokio::spawn(async move {
                GenerateTitleUseCase::new(client)
                    .execute(&chairman, &question)
                    .await
            })
        });

    if cli.direct {
        let synthesis = DirectResponseUseCase::new(Arc::clone(&client))
            .execute(&chairman, &messages, web_search)
            .await;

        if let Some(conversation) = conversation {
            persist_turn(
                &store,
                conversation,
                &question,
                vec![],
                vec![],
                synthesis.clone(),
                title_task,
            )
            .await?;
        }

        println!("{}", synthesis.response);
        return Ok(());
    }

    info!(
        "Council: {} member(s), chairman {}",
        council_models.len(),
        chairman
    );

    let input = CouncilInput::new(messages, council_models, chairman).with_web_search(web_search);
    let use_case = RunCouncilUseCase::new(Arc::clone(&client));

    let outcome = if cli.quiet {
        use_case.execute(input).await
    } else {
        let progress = ProgressReporter::new();
        use_case
            .execute_with_events(input, &progress as &dyn CouncilEventSink)
            .await
    };

    if let Some(conversation) = conversation {
        persist_turn(
            &store,
            conversation,
            &question,
            outcome.stage1.clone(),
            outcome.stage2.clone(),
            outcome.stage3.clone(),
            title_task,
        )
        .await?;
    }

    let output = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format(&outcome),
        OutputFormat::Synthesis => ConsoleFormatter::format_synthesis_only(&outcome),
        OutputFormat::Json => ConsoleFormatter::format_json(&outcome),
    };
    println!("{}", output);

    Ok(())
}

async fn validate_models(
    client: &Arc<OpenRouterClient>,
    council_models: &[ModelId],
    chairman: &ModelId,
) -> Result<()> {
    let catalog = Arc::new(CachingModelCatalog::new(Arc::clone(client)));
    let use_case = ValidateModelsUseCase::new(catalog);

    let mut all_models = council_models.to_vec();
    all_models.push(chairman.clone());
    let unknown = use_case
        .execute(&all_models)
        .await
        .context("Could not fetch the model catalog")?;

    if unknown.is_empty() {
        println!("All {} configured model(s) are known to the gateway.", all_models.len());
    } else {
        for model in &unknown {
            println!("Unknown model: {}", model);
        }
        bail!("{} configured model(s) not found in the catalog", unknown.len());
    }
    Ok(())
}

async fn load_or_create(store: &JsonConversationStore, id: &str) -> Result<Conversation> {
    match store.get(id).await {
        Ok(conversation) => Ok(conversation),
        Err(StoreError::NotFound(_)) => {
            info!("Creating new conversation {}", id);
            Ok(store.create(id).await?)
        }
        Err(e) => Err(e).context("Failed to load conversation"),
    }
}

async fn persist_turn(
    store: &JsonConversationStore,
    mut conversation: Conversation,
    question: &str,
    stage1: Vec<council_domain::Stage1Response>,
    stage2: Vec<council_domain::Stage2Ranking>,
    stage3: council_domain::Stage3Synthesis,
    title_task: Option<tokio::task::JoinHandle<String>>,
) -> Result<()> {
    conversation.add_user_message(question);
    conversation.add_assistant_message(stage1, stage2, stage3);

    if let Some(task) = title_task
        && let Ok(title) = task.await
    {
        conversation.title = title;
    }

    store
        .save(&conversation)
        .await
        .context("Failed to persist conversation")?;
    Ok(())
}
