pub mod employee;

use actix_web::error::JsonPayloadError;
use actix_web::middleware::DefaultHeaders;
use actix_web::web;

use crate::errors::ApiError;

/// CORS headers set on every response, errors included.
pub fn cors() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "GET,PUT,POST,DELETE"))
}

/// Request bodies must be declared JSON; the media type is compared after
/// parsing, so case and parameters such as `charset` do not matter.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(true)
        .error_handler(|err, _req| {
            let err = match err {
                JsonPayloadError::ContentType => ApiError::UnsupportedMediaType,
                other => ApiError::input(other),
            };
            err.into()
        })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::resource("/employees")
                .route(web::get().to(employee::get_employees))
                .route(web::post().to(employee::create_employee)),
        )
        .service(
            web::resource("/employees/{employee_id}")
                .route(web::get().to(employee::get_employee))
                .route(web::put().to(employee::update_employee))
                .route(web::delete().to(employee::delete_employee)),
        );
}
