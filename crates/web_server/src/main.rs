//! Main entry point for the Campstead backend server.
//! This crate wires the database pool, the external-service clients, and the
//! REST API routes together.

use actix_web::{App, HttpResponse, HttpServer, Result, middleware::Logger, web};

use account_services::middleware::IdentityMiddleware;
use geocoding::GeocoderClient;
use media_storage::MediaStore;
use notification_services::NotificationService;
use payments::PaymentClient;
use postgres::database::*;
use web_handlers::*;

async fn api_hello() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Hello from the Campstead backend!",
        "status": "running"
    })))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("Starting Campstead server...");

    // Create database connection pool
    let pool = match create_connection_pool().await {
        Ok(pool) => {
            log::info!("Database pool created successfully");

            if let Err(e) = test_connection(&pool).await {
                log::error!("Database connection test failed: {}", e);
            }
            pool
        }
        Err(e) => {
            log::error!("Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    // Create mail sender
    let mailer = match NotificationService::new().await {
        Ok(service) => {
            log::info!("Mail sender initialized successfully");
            service
        }
        Err(e) => {
            log::error!("Failed to initialize mail sender: {}", e);
            std::process::exit(1);
        }
    };

    // Create image store
    let media_store = match MediaStore::new().await {
        Ok(store) => {
            log::info!("Image store initialized successfully");
            store
        }
        Err(e) => {
            log::error!("Failed to initialize image store: {}", e);
            std::process::exit(1);
        }
    };

    // Create geocoder client
    let geocoder = match GeocoderClient::new() {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to initialize geocoder client: {}", e);
            std::process::exit(1);
        }
    };

    // Create payment client
    let payment_client = match PaymentClient::new() {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to initialize payment client: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("Server will be available at: http://0.0.0.0:8080");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(mailer.clone()))
            .app_data(web::Data::new(media_store.clone()))
            .app_data(web::Data::new(geocoder.clone()))
            .app_data(web::Data::new(payment_client.clone()))
            .wrap(IdentityMiddleware::new(pool.clone()))
            .wrap(Logger::default())
            .service(
                web::scope("/api")
                    .route("/hello", web::get().to(api_hello))
                    // Auth routes
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login))
                    .route("/logout", web::get().to(logout))
                    // Password-reset routes
                    .route("/forgot", web::post().to(forgot_password))
                    .route("/reset/{token}", web::get().to(show_reset))
                    .route("/reset/{token}", web::post().to(reset_password))
                    // Checkout and payment routes
                    .route("/checkout", web::get().to(checkout))
                    .route("/pay", web::post().to(pay))
                    // Public user profiles
                    .route("/users/{id}", web::get().to(show_user_profile))
                    // Campground and nested comment routes
                    .service(
                        web::scope("/campgrounds")
                            .route("", web::get().to(list_campgrounds))
                            .route("", web::post().to(create_campground))
                            .route("/{id}", web::get().to(show_campground))
                            .route("/{id}", web::put().to(update_campground))
                            .route("/{id}", web::delete().to(delete_campground))
                            .route("/{id}/edit", web::get().to(edit_campground))
                            .route("/{id}/comments", web::post().to(create_comment))
                            .route("/{id}/comments/{comment_id}", web::put().to(update_comment))
                            .route(
                                "/{id}/comments/{comment_id}",
                                web::delete().to(delete_comment),
                            ),
                    ),
            )
            .route(
                "/health",
                web::get().to(|| async { HttpResponse::Ok().body("OK") }),
            )
    })
    .bind("0.0.0.0:8080")?
    .run()
    .await
}
