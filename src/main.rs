use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod app_state;
mod clock;
mod config;
mod db;
mod error;
mod middleware;
mod modules;
mod scheduling;

use app_state::AppState;
use clock::SystemClock;
use db::repositories::{AppointmentRepository, CounselorRepository};
use scheduling::Scheduler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let env = config::init()?.clone();
    let pool = db::init_pool().await.context("Failed to set up database")?;

    let scheduler = Scheduler::new(
        Arc::new(CounselorRepository::new(pool.clone())),
        Arc::new(AppointmentRepository::new(pool.clone())),
        Arc::new(SystemClock),
    );
    let state = AppState::new(pool, env.clone(), scheduler);
    let app = app::create_router(state);

    let addr = env.server_addr();
    info!("{} listening on {}", env.app.name, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Failed to serve application")?;

    Ok(())
}
