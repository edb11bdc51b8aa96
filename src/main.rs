// src/main.rs
mod config;
mod dtos;
mod handlers;
mod middleware;
mod models;
mod repositories;
mod services;
#[cfg(test)]
mod test_support;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info, warn};
use reqwest::Client;

use crate::config::{mask_key, AppConfig};
use crate::handlers::onboarding_handlers::{
    get_onboarding_status, get_steps, health, skip_onboarding_step, update_onboarding_step,
};
use crate::repositories::profile_supabase_repo::ProfileSupabaseRepo;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub repo: ProfileSupabaseRepo,
}

impl AppState {
    pub fn new(config: AppConfig, http_client: Client) -> Self {
        let repo = ProfileSupabaseRepo::new(http_client, &config);
        Self { config, repo }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    info!("Supabase URL: {}", config.supabase_url);
    info!("Supabase Key: {}", mask_key(&config.supabase_service_role_key));
    if config.supabase_jwt_secret.is_none() {
        warn!("SUPABASE_JWT_SECRET not set, access tokens will not be verified");
    }

    let http_client = match Client::builder().user_agent("haady-be/0.1").build() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to build http client: {}", e);
            std::process::exit(1);
        }
    };

    let bind_address = config.bind_address();
    let allowed_origins = config.allowed_origins.clone();
    let state = web::Data::new(AppState::new(config, http_client));

    info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
            .allowed_headers(vec!["authorization", "content-type", "accept", "x-requested-with"])
            .supports_credentials()
            .max_age(3600);

        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(state.clone())
            .service(get_steps)              // GET  /api/onboarding/steps
            .service(get_onboarding_status)  // GET  /api/onboarding/status
            .service(update_onboarding_step) // PUT  /api/onboarding/step
            .service(skip_onboarding_step)   // POST /api/onboarding/skip
            .service(health)                 // GET  /health
    })
    .bind(&bind_address)?
    .run()
    .await
}
