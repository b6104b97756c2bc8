use crate::config::AppConfig;

pub async fn handle(config: &AppConfig, seed_users: &[String]) -> anyhow::Result<()> {
    tracing::info!("Starting todo-api in {:?} mode", config.environment);
    crate::app::serve(config, seed_users).await
}
