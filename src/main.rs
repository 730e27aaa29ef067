use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web};

use formulir::auth::rate_limit::LoginThrottle;
use formulir::auth::token::{self, TokenService};
use formulir::catalog::{FormCatalog, MemoryCatalog, PgCatalog};
use formulir::config::AppConfig;
use formulir::{db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {e}");
        std::io::Error::other(e)
    })?;

    let catalog: Arc<dyn FormCatalog> = match (&config.database_url, config.in_memory) {
        (Some(url), false) => {
            let pool = db::init_pool(url).await.map_err(std::io::Error::other)?;
            db::run_migrations(&pool).await.map_err(std::io::Error::other)?;
            Arc::new(PgCatalog::new(pool))
        }
        _ => {
            log::warn!("FORMULIR_IN_MEMORY set, data will be lost on restart");
            Arc::new(MemoryCatalog::new())
        }
    };

    if let Some(seed) = &config.admin_seed {
        db::seed_admin(catalog.as_ref(), seed).await.map_err(std::io::Error::other)?;
    }

    let secret = match &config.jwt_secret {
        Some(secret) => secret.clone(),
        None => {
            log::warn!("No JWT_SECRET set, generating random secret (tokens lost on restart)");
            token::generate_secret()
        }
    };
    let tokens = TokenService::new(secret.as_bytes(), config.token_ttl_hours);
    let throttle = LoginThrottle::new();

    log::info!("Starting server at http://{}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::from(catalog.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .app_data(web::Data::new(throttle.clone()))
            .app_data(handlers::json_config())
            .configure(handlers::configure)
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
