use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use services::store_utils::{start_store_actor, AppState, StoreHandle};
use settings::Settings;

mod capacity;
mod models;
mod services;
mod settings;
mod store;
mod types;
#[cfg(test)]
mod test;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        warn!(error = %e, "tracing init failed");
    }
}

fn build_cors(allowed_origin: Option<&str>) -> Cors {
    match allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(3600),
        None => Cors::permissive(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    init_tracing();

    let settings = Settings::load().map_err(std::io::Error::other)?;
    let handle = StoreHandle::from_settings(&settings.storage).map_err(std::io::Error::other)?;
    let store = start_store_actor(handle, settings.booking.atomic_capacity);

    let state = Data::new(AppState { store });
    let admin = Data::new(settings.admin.clone());
    let allowed_origin = settings.server.allowed_origin.clone();

    info!(
        host = %settings.server.host,
        port = settings.server.port,
        backend = ?settings.storage.backend,
        atomic_capacity = settings.booking.atomic_capacity,
        "starting server"
    );

    HttpServer::new(move || {
        App::new()
            .wrap(build_cors(allowed_origin.as_deref()))
            .wrap(Logger::default())
            .app_data(state.clone())
            .app_data(admin.clone())
            .configure(services::configure)
    })
        .bind((settings.server.host.as_str(), settings.server.port))?
        .run()
        .await
}
