use sales_call_analyzer::{Settings, create_app};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sales_call_analyzer=debug,tower_http=debug"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // LOG_FORMAT=pretty for local development, JSON otherwise.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("pretty") => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
        _ => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_level(true),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let settings = Settings::load();
    info!(
        model = %settings.model,
        salesperson = %settings.salesperson,
        env_file = %settings.env_file.display(),
        "Configuration loaded"
    );

    let app = create_app(&settings);
    let listener = TcpListener::bind(format!("0.0.0.0:{}", settings.port)).await?;
    let addr = listener.local_addr()?;

    info!("Sales Call Transcript Analyzer starting on {}", addr);
    info!("Open http://{}/ in a browser to upload a transcript", addr);
    info!("Health check endpoint: http://{}/health", addr);
    info!("Session state endpoint: GET http://{}/api/session", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
