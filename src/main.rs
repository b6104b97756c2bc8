#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    todo_api::app::init_tracing();

    let config = todo_api::config::config();
    tracing::info!("Starting todo-api in {:?} mode", config.environment);

    todo_api::app::serve(config, &[]).await
}
