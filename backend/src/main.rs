mod config;
mod error;
mod inference;
mod routes;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use config::ServiceConfig;
use inference::model::{Classifier, OnnxClassifier};
use routes::{AppState, configure_routes};
use shared::AnimalClass;
use std::env;
use std::sync::Arc;

fn load_classifier(config: &ServiceConfig) -> Option<Arc<dyn Classifier>> {
    match OnnxClassifier::load(&config.model_path) {
        Ok(model) => {
            log::info!("Model '{}' loaded", config.model_path.display());
            Some(Arc::new(model))
        }
        Err(e) => {
            log::error!("Failed to load model: {}", e);
            log::error!("Serving without a model; /predict will answer 500 until restart.");
            None
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = ServiceConfig::load().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("Class labels: {:?}", AnimalClass::labels());
    let state = web::Data::new(AppState {
        classifier: load_classifier(&config),
        max_upload_bytes: config.max_upload_bytes,
    });

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
