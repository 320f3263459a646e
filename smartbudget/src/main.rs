use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use smartbudget::api::app::{create_app, Repositories};
use smartbudget::infra::auth::AuthManager;
use smartbudget::infra::config::Config;
use smartbudget::infra::db;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let pool = db::pg(&config).await?;
    db::migrate(&pool).await?;

    let repos = Repositories::postgres(pool.clone());
    let auth_manager = web::Data::new(AuthManager::new(
        &config.jwt_secret,
        config.jwt_ttl_seconds,
    ));
    let cors_origin = config.cors_origin.clone();

    log::info!(host = config.http_host.as_str(), port = config.http_port; "Start server");

    HttpServer::new(move || {
        let cors = match &cors_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
                .allowed_headers(vec![
                    actix_web::http::header::AUTHORIZATION,
                    actix_web::http::header::CONTENT_TYPE,
                    actix_web::http::header::ACCEPT,
                ])
                .supports_credentials()
                .max_age(3600),
            None => Cors::permissive(),
        };

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .configure(create_app(repos.clone(), auth_manager.clone()))
    })
    .bind((config.http_host.as_str(), config.http_port))?
    .run()
    .await?;

    pool.close().await;
    log::info!("Server stopped");
    Ok(())
}
