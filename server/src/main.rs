mod config;
mod routes;
mod state;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = config::ServerConfig::from_env().expect("invalid server config");
    let gate = gate::GateConfig::from_env().expect("invalid gate config");
    tracing::info!(login_path = %gate.login_path, home_path = %gate.home_path, "gate config loaded");

    // Non-fatal: pages still render, but sign-in will not work.
    let backend = match backend::BackendConfig::from_env() {
        Ok(backend) => {
            tracing::info!(base_url = %backend.base_url, "hosted backend configured");
            Some(backend)
        }
        Err(e) => {
            tracing::warn!(error = %e, "hosted backend not configured; auth pages will not work");
            None
        }
    };

    let bind_addr = config.bind_addr();
    let state = state::AppState::new(backend);
    let app = routes::app(state).expect("router setup failed");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await.expect("failed to bind");

    tracing::info!(%bind_addr, "agora listening");
    axum::serve(listener, app).await.expect("server failed");
}
