use actix_middleware::{CorrelationIdMiddleware, JwtValidator, Logging, MetricsMiddleware};
use actix_web::{web, App, HttpServer};
use collab_chat_service::{
    config::{Config, JwtKey, StoreBackend},
    db,
    error::AppError,
    logging,
    repository::{ConversationStore, InMemoryConversationStore, PgConversationStore},
    routes,
    services::{
        clock::SystemClock,
        content_filter::ContactInfoRedactor,
        conversation_service::ConversationService,
        directory::{InMemoryUserDirectory, PgUserDirectory, UserDirectory},
    },
    state::AppState,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    let cfg = Config::from_env()?;
    logging::init_tracing(cfg.log_format);
    let cfg = Arc::new(cfg);

    tracing::info!(
        service = %cfg.service_name,
        environment = %cfg.environment,
        backend = ?cfg.store_backend,
        "Starting collab-chat-service"
    );

    let validator = Arc::new(match &cfg.jwt_key {
        JwtKey::Secret(secret) => JwtValidator::from_secret(secret.as_bytes()),
        JwtKey::RsaPublicPem(pem) => JwtValidator::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AppError::Config(format!("invalid JWT_PUBLIC_KEY_PEM: {e}")))?,
    });

    let (store, directory, pool) = match (cfg.store_backend, &cfg.database) {
        (StoreBackend::Postgres, Some(db_cfg)) => {
            let pool = db::init_pool(db_cfg)
                .await
                .map_err(|e| AppError::StartServer(format!("db: {e}")))?;
            let store: Arc<dyn ConversationStore> = Arc::new(PgConversationStore::new(pool.clone()));
            let directory: Arc<dyn UserDirectory> = Arc::new(PgUserDirectory::new(pool.clone()));
            (store, directory, Some(pool))
        }
        (StoreBackend::Postgres, None) => {
            return Err(AppError::Config("DATABASE_URL missing".into()));
        }
        (StoreBackend::Memory, _) => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            let store: Arc<dyn ConversationStore> = Arc::new(InMemoryConversationStore::new());
            let directory: Arc<dyn UserDirectory> = Arc::new(InMemoryUserDirectory::new());
            (store, directory, None)
        }
    };

    let service = Arc::new(ConversationService::new(
        store,
        directory,
        Arc::new(ContactInfoRedactor::new()),
        Arc::new(SystemClock),
        cfg.limits,
    ));

    let state = AppState {
        service,
        config: cfg.clone(),
        db: pool,
    };

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "HTTP server listening");

    HttpServer::new(move || {
        let cors = actix_cors::Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        let validator = validator.clone();
        App::new()
            .wrap(MetricsMiddleware)
            .wrap(Logging)
            .wrap(CorrelationIdMiddleware)
            .wrap(cors)
            .app_data(web::Data::new(state.clone()))
            .configure(|c| routes::configure(c, validator))
    })
    .bind(&bind_addr)
    .map_err(|e| AppError::StartServer(format!("bind {bind_addr}: {e}")))?
    .run()
    .await
    .map_err(|e| AppError::StartServer(format!("run: {e}")))?;

    tracing::info!("collab-chat-service stopped");
    Ok(())
}
