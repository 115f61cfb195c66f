mod config;
mod db;
mod errors;
mod handlers;
mod models;

use std::io;
use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use log::info;

use config::Config;
use db::postgres::PgGateway;
use db::Database;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(io::Error::other)?;
    let gateway = PgGateway::new(&config).map_err(io::Error::other)?;
    let database = web::Data::new(Database::new(Arc::new(gateway), config.db_timeout));

    info!("Server is listening at http://{}", config.bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(handlers::cors())
            .wrap(Logger::default())
            .app_data(database.clone())
            .configure(handlers::configure)
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
