use std::sync::Arc;
use std::time::Duration;

use analysis::{LanguageToolClient, OllamaEmbeddingClient, ScoringEngine};
use anyhow::Context;
use storage::Database;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod routes;
mod state;

use config::Config;
use features::{competitions, essays, leaderboard, scoring};
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        competitions::handlers::list_competitions,
        competitions::handlers::start_essay,
        competitions::handlers::create_competition,
        essays::handlers::get_essay,
        essays::handlers::add_paragraph,
        essays::handlers::complete_essay,
        essays::handlers::lock_essay,
        essays::handlers::unlock_essay,
        scoring::handlers::score_essay,
        scoring::handlers::get_topic_relevance,
        scoring::handlers::recompute_competition_scores,
        leaderboard::handlers::get_leaderboard,
    ),
    components(
        schemas(
            storage::dto::competition::CompetitionListResponse,
            storage::dto::competition::CompetitionSummary,
            storage::dto::competition::CreateCompetitionRequest,
            storage::dto::competition::StartEssayRequest,
            storage::dto::essay::AddParagraphRequest,
            storage::dto::essay::EssayDetailResponse,
            storage::dto::essay::EssayStateResponse,
            storage::dto::essay::ParagraphInfo,
            storage::dto::leaderboard::LeaderboardEntry,
            storage::dto::leaderboard::LeaderboardResponse,
            storage::dto::scoring::ScoreBreakdownResponse,
            storage::dto::scoring::RecomputeScoresResponse,
            storage::dto::scoring::TopicRelevanceResponse,
            storage::models::Competition,
            storage::models::CompetitionPhase,
            storage::models::Essay,
            storage::models::EssayStatus,
            storage::models::Paragraph,
        )
    ),
    tags(
        (name = "competitions", description = "Competitions and essay start"),
        (name = "essays", description = "Essay writing lifecycle"),
        (name = "scoring", description = "Essay scoring"),
        (name = "leaderboard", description = "Competition rankings"),
        (name = "admin", description = "Moderation and batch scoring"),
    )
)]
struct ApiDoc;

struct ServiceClients {
    grammar: Arc<LanguageToolClient>,
    embeddings: Option<Arc<OllamaEmbeddingClient>>,
}

fn build_clients(config: &Config) -> anyhow::Result<ServiceClients> {
    let grammar_timeout = Duration::from_secs(config.grammar_timeout_secs);

    let grammar = LanguageToolClient::new(
        config.languagetool_url.clone(),
        config.languagetool_language.clone(),
        grammar_timeout,
    )
    .context("Failed to build LanguageTool client")?;
    tracing::info!(
        "Grammar checks via LanguageTool at {} ({}, timeout {:?})",
        config.languagetool_url,
        config.languagetool_language,
        grammar_timeout
    );

    let embeddings = match &config.ollama_url {
        Some(url) => {
            let client = OllamaEmbeddingClient::new(
                url.clone(),
                config.embedding_model.clone(),
                Duration::from_secs(30),
            )
            .context("Failed to build Ollama embedding client")?;
            tracing::info!(
                "Topic relevance via Ollama at {} (model: {})",
                url,
                config.embedding_model
            );
            Some(Arc::new(client))
        }
        None => {
            tracing::info!("OLLAMA_URL not set, topic relevance disabled");
            None
        }
    };

    Ok(ServiceClients {
        grammar: Arc::new(grammar),
        embeddings,
    })
}

async fn report_service_health(clients: &ServiceClients) {
    match clients.grammar.health_check().await {
        Ok(true) => tracing::info!("LanguageTool is reachable"),
        Ok(false) | Err(_) => tracing::warn!(
            "LanguageTool is not reachable, essays will receive neutral grammar results"
        ),
    }

    if let Some(embeddings) = &clients.embeddings {
        match embeddings.verify_model().await {
            Ok(true) => tracing::info!("Embedding model is available"),
            Ok(false) => tracing::warn!("Embedding model is not pulled in Ollama"),
            Err(e) => tracing::warn!("Ollama is not reachable: {}", e),
        }
    }
}

fn build_engine(config: &Config, clients: &ServiceClients) -> ScoringEngine {
    let grammar_timeout = Duration::from_secs(config.grammar_timeout_secs);
    let engine = ScoringEngine::new(clients.grammar.clone(), grammar_timeout);

    match &clients.embeddings {
        Some(embeddings) => engine.with_topic_scorer(embeddings.clone()),
        None => engine,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting essay competition API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let clients = build_clients(&config)?;
    report_service_health(&clients).await;
    let engine = build_engine(&config, &clients);
    let state = AppState {
        db,
        engine: Arc::new(engine),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    let app = routes::api_routes()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    axum::serve(listener, app).await?;

    Ok(())
}
