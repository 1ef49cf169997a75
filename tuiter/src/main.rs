mod api;
mod app;
mod constants;
mod errors;
mod models;
mod store;
mod tasks;
#[cfg(test)]
mod test_support;
mod utils;

use std::process;

use actix_web::middleware::Logger;
use actix_web::{web, App as ActixWebApp, HttpServer};

use crate::app::{App, Config};
use crate::utils::logger::{log_fatal, log_success};

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::load().unwrap_or_else(|e| {
        log_fatal(format!("Invalid configuration: {:#}", e));
        process::exit(1);
    });

    let app = App::new(config).await.unwrap_or_else(|e| {
        log_fatal(format!("Could not start: {:#}", e));
        process::exit(1);
    });

    if let Err(e) = app.init().await {
        log_fatal(format!("Could not prepare the store: {:#}", e));
        process::exit(1);
    }

    tasks::reconcile_counters_task(app.clone()).await;

    let port = app.port();
    let app_web_data = web::Data::new(app);

    log_success(format!("Tuiter listening on port {}", port));

    HttpServer::new(move || {
        ActixWebApp::new()
            .wrap(Logger::new("%a %r %s %b %{Referer}i %{User-Agent}i %T"))
            .wrap(app_web_data.cors())
            .wrap(app_web_data.session_middleware())
            .app_data(app_web_data.clone())
            .configure(api::configure)
    })
    .bind(("0.0.0.0", port))
    .unwrap_or_else(|e| panic!("Could not bind to port {}.\n{}", port, e))
    .run()
    .await
    .unwrap_or_else(|e| panic!("Could not run server to port {}.\n{}", port, e));
}
