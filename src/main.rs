use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use esi_gateway::{
    AppState,
    cache::{BudgetStore, DatabaseBudgetStore, MemoryBudgetStore, RedisBudgetStore},
    config::{Config, StoreKind},
    database::{CharacterRepository, EsiTokenRepository},
    esi::Gateway,
    infrastructure::SsoTokenProvider,
    router::create_router,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'esi_gateway';").await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // 选择共享预算存储
    let store: Arc<dyn BudgetStore> = match config.budget_store {
        StoreKind::Database => Arc::new(DatabaseBudgetStore::new(pool.clone())),
        StoreKind::Redis => {
            let url = config.redis_url.clone().unwrap_or_default();
            let redis_client = redis::Client::open(url).expect("Failed to create Redis client");
            Arc::new(RedisBudgetStore::new(Arc::new(redis_client)))
        }
        StoreKind::Memory => {
            tracing::warn!("Using process-local budget store, state is not shared between nodes");
            Arc::new(MemoryBudgetStore::new())
        }
    };
    tracing::info!("Budget store: {:?}", config.budget_store);

    let sso_http = reqwest::Client::builder()
        .timeout(config.esi_timeout())
        .build()
        .expect("Failed to build SSO client");
    let tokens = Arc::new(SsoTokenProvider::new(
        Arc::new(EsiTokenRepository::new(pool.clone())),
        sso_http,
        config.sso_credentials(),
    ));
    let actors = Arc::new(CharacterRepository::new(pool));

    let settings = config.esi_settings();
    tracing::info!(
        "ESI host {} (datasource {}), error limit threshold {}",
        settings.host,
        settings.datasource,
        settings.error_limit_threshold
    );

    // 设置应用状态
    let gateway = Gateway::new(&settings, store, actors, tokens).expect("Failed to build ESI client");
    let state = AppState {
        gateway: Arc::new(gateway),
    };

    let router = create_router(state, &config.api_base_uri);

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router,
    )
    .await
    .expect("Failed to start server");
}
