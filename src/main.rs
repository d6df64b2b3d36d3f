mod analytics;
mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = config::AppConfig::from_env().expect("Invalid configuration");

    log::info!("🚀 Starting Carequest Service...");
    log::info!("📊 Database: {}", config.database_name);
    log::info!("🔒 Stats access policy: {:?}", config.stats_access);

    // Initialize the document store
    let store = database::connect(&config)
        .await
        .expect("Failed to connect to the database");
    let store_data = web::Data::from(store);

    let tokens = web::Data::new(services::TokenService::new(&config.token_secret));
    let payments = web::Data::new(
        services::PaymentProvider::new(config.stripe_secret_key.clone())
            .expect("Failed to initialize payment provider"),
    );

    let bind_address = config.bind_address();
    log::info!("🌐 Server starting on {}", bind_address);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind_address);
    log::info!("📄 OpenAPI spec at: http://{}/api-docs/openapi.json", bind_address);

    let client_origins = config.client_origins.clone();
    let stats_access = config.stats_access;

    // Start HTTP server
    HttpServer::new(move || {
        let cors = client_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(store_data.clone())
            .app_data(tokens.clone())
            .app_data(payments.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi)
            )
            .configure(|cfg| api::configure(cfg, stats_access))
    })
    .bind(bind_address)?
    .run()
    .await
}
