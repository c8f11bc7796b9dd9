use anyhow::Context;
use todo_core::{MemoryStore, Todo, TodoHandler};
use todo_server::{app, serve, Config, StoreBackend};
use todo_store_redis::RedisStore;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_server=info,todo_core=info,todo_store_redis=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = Config::from_env()?;
    let addr = config.bind_addr();

    let router = match config.store {
        StoreBackend::Memory => app(TodoHandler::new(MemoryStore::<Todo>::new())),
        StoreBackend::Redis => {
            let store = RedisStore::<Todo>::connect(&config.redis_url)
                .await
                .context("failed to open the Redis store")?;
            app(TodoHandler::new(store))
        }
    };

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, store = %config.store, "listening");

    serve(listener, router).await?;
    Ok(())
}
