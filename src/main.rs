use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};

use taskboard::bootstrap::ensure_admin;
use taskboard::config::Config;
use taskboard::routes;
use taskboard::state::AppState;
use taskboard::store::{PgStore, Store};

fn cors(allowed_origin: Option<&str>) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);
    match allowed_origin {
        // Cookies only flow to an explicitly named origin.
        Some(origin) => cors.allowed_origin(origin).supports_credentials(),
        None => cors.allow_any_origin(),
    }
}

async fn open_store(config: &Config) -> std::io::Result<Store> {
    match &config.database_url {
        Some(url) => {
            let pg = PgStore::connect(url, config.storage_timeout)
                .await
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
            pg.migrate()
                .await
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
            log::info!("Connected to Postgres");
            Ok(Store::from_backend(pg))
        }
        None => {
            log::warn!("DATABASE_URL not set; using the in-memory store, data is lost on exit");
            Ok(Store::memory())
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let store = open_store(&config).await?;

    if let Some(seed) = &config.admin {
        if let Err(e) = ensure_admin(&store, seed).await {
            log::error!("Could not create admin user {}: {}", seed.username, e);
        }
    }

    let state = web::Data::new(AppState::from_config(&config, store));
    let allowed_origin = config.cors_allowed_origin.clone();

    log::info!("Starting taskboard server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors(allowed_origin.as_deref()))
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
