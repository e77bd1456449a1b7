use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;

use taskvault::auth::AuthMiddleware;
use taskvault::config::Config;
use taskvault::error::AppError;
use taskvault::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    log::info!("Starting TaskVault server at {}", config.server_url());

    HttpServer::new(move || {
        // Malformed JSON bodies and disallowed update fields surface as
        // 400 with an {error} body instead of the framework default.
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            AppError::Validation(format!("Invalid request body: {}", err)).into()
        });

        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(json_config)
            .wrap(AuthMiddleware)
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
