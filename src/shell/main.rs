use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

use exam_attendance::adapters::in_memory::in_memory_assignment_store::InMemoryAssignmentStore;
use exam_attendance::adapters::in_memory::in_memory_identity::InMemoryIdentityProvider;
use exam_attendance::adapters::in_memory::in_memory_reference_data::InMemoryReferenceData;
use exam_attendance::shell::config::AppConfig;
use exam_attendance::shell::http::{API_PREFIX, router};
use exam_attendance::shell::seed::seed_demo;
use exam_attendance::shell::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = AppConfig::from_env()?;

    // In-memory deps for now
    let store = Arc::new(InMemoryAssignmentStore::new());
    let reference = Arc::new(InMemoryReferenceData::new());
    let identity = Arc::new(InMemoryIdentityProvider::new());
    if config.seed_demo {
        seed_demo(&reference, &identity).await?;
    }

    let state = AppState::in_memory(store, reference, identity, &config);
    let app = router(state);

    tracing::info!("REST endpoint: http://{}{}", config.bind_addr, API_PREFIX);
    tracing::info!("GraphQL endpoint: http://{}/gql", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
