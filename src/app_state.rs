use sqlx::PgPool;

use crate::config;
use crate::scheduling::Scheduler;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub env: config::Config,
    pub scheduler: Scheduler,
}

impl AppState {
    pub fn new(db: PgPool, env: config::Config, scheduler: Scheduler) -> Self {
        Self { db, env, scheduler }
    }
}
