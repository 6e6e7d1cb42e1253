use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::web::Data;
use actix_web::{FromRequest, HttpRequest};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::future::{ready, Ready};
use tracing::warn;

use crate::services::api_error::ApiError;
use crate::settings::AdminCredentials;

/// Extractor guarding admin routes with HTTP Basic credentials compared
/// against the configured admin account.
pub struct Admin;

fn basic_credentials(req: &HttpRequest) -> Option<(String, String)> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_owned(), password.to_owned()))
}

fn authorize(req: &HttpRequest) -> Result<Admin, ApiError> {
    let Some(expected) = req.app_data::<Data<AdminCredentials>>() else {
        return Err(ApiError::internal("admin guard", "admin credentials are not registered"));
    };

    match basic_credentials(req) {
        Some((username, password))
            if username == expected.username && password == expected.password =>
        {
            Ok(Admin)
        }
        Some((username, _)) => {
            warn!(%username, path = %req.path(), "rejected admin credentials");
            Err(ApiError::Unauthorized)
        }
        None => Err(ApiError::Unauthorized),
    }
}

impl FromRequest for Admin {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authorize(req))
    }
}
