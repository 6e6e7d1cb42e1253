use actix::dev::ToEnvelope;
use actix::{Actor, Addr, Handler, Message};
use actix_web::{get, web, HttpResponse, Responder};

use crate::services::api_error::ApiError;
use crate::services::messages::StoreResult;
use crate::services::store_utils::StoreActor;
use crate::types::MALFORMED_BODY;

pub mod api_error;
pub mod auth;
pub mod messages;
pub mod store_handling;
pub mod store_utils;

#[get("/")]
pub async fn home_page() -> impl Responder {
    HttpResponse::Ok().body("Lokanta site service")
}

#[get("/health")]
pub async fn healthcheck() -> impl Responder {
    HttpResponse::Ok().body("I'm alive!")
}

/// Registers every route plus the JSON/query rejection handlers.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(format!("{MALFORMED_BODY} {err}")).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .service(home_page)
    .service(healthcheck)
    .service(
        web::scope("/api/reservations")
            .service(reservation_route::check_capacity)
            .service(reservation_route::create_reservation),
    )
    .service(web::scope("/api/menu").service(menu_route::view_menu))
    .service(web::scope("/api/contact").service(contact_route::send_message))
    .service(
        web::scope("/api/admin")
            .service(admin_route::login)
            .service(admin_route::list_reservations)
            .service(admin_route::update_reservation_status)
            .service(admin_route::delete_reservation)
            .service(admin_route::get_capacity)
            .service(admin_route::save_capacity)
            .service(admin_route::list_menu)
            .service(admin_route::save_menu_item)
            .service(admin_route::delete_menu_item)
            .service(admin_route::list_messages)
            .service(admin_route::mark_message_read)
            .service(admin_route::delete_message)
            .service(admin_route::export_backup)
            .service(admin_route::restore_backup),
    );
}

/// Sends `msg` to the store actor, folding both mailbox and store failures
/// into an internal error.
pub async fn ask<M, T>(store: &Addr<StoreActor>, msg: M) -> Result<T, ApiError>
where
    M: Message<Result = StoreResult<T>> + Send + 'static,
    T: Send + 'static,
    StoreActor: Handler<M>,
    <StoreActor as Actor>::Context: ToEnvelope<StoreActor, M>,
{
    match store.send(msg).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(ApiError::internal("store request failed", err)),
        Err(err) => Err(ApiError::internal("store actor unavailable", err)),
    }
}

/// Shared request validation for slot-based endpoints.
pub mod slot_input {
    use serde_json::Value;

    use crate::models::{parse_date, parse_time};
    use crate::types::{INVALID_DATE, INVALID_GUEST_COUNT, INVALID_TIME, MISSING_SLOT_FIELDS};

    #[derive(Debug, PartialEq, Eq)]
    pub struct SlotRequest {
        pub date: String,
        pub time: String,
        pub guests: u32,
    }

    /// Trimmed text, or `None` when absent or blank.
    pub fn filled(value: Option<String>) -> Option<String> {
        value.map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
    }

    fn present(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|value| !value.is_empty())
    }

    /// Guests may arrive as a JSON number or a numeric string. Whole floats
    /// such as `4.0` count as integers.
    pub fn parse_guests(value: &Value) -> Option<u32> {
        let count = match value {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().filter(|float| float.fract() == 0.0).map(|float| float as i64)),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        }?;

        u32::try_from(count).ok().filter(|count| *count > 0)
    }

    pub fn validate(
        date: Option<&str>,
        time: Option<&str>,
        guests: Option<&Value>,
    ) -> Result<SlotRequest, &'static str> {
        let guests = guests.filter(|value| match value {
            Value::Null => false,
            Value::String(text) => !text.trim().is_empty(),
            _ => true,
        });
        let (Some(date), Some(time), Some(guests)) = (present(date), present(time), guests) else {
            return Err(MISSING_SLOT_FIELDS);
        };

        if parse_date(date).is_none() {
            return Err(INVALID_DATE);
        }
        if parse_time(time).is_none() {
            return Err(INVALID_TIME);
        }
        let guests = parse_guests(guests).ok_or(INVALID_GUEST_COUNT)?;

        Ok(SlotRequest { date: date.to_owned(), time: time.to_owned(), guests })
    }

}

// sub-route "/api/reservations"
pub mod reservation_route {
    use actix_web::web::{Data, Json};
    use actix_web::{post, HttpResponse, Responder};
    use serde::{Deserialize, Serialize};
    use serde_json::Value;
    use tracing::error;

    use crate::services::api_error::ApiError;
    use crate::services::ask;
    use crate::services::messages::{BookingOutcome, CheckSlot, CreateReservation, NewReservation, SlotCheck};
    use crate::services::slot_input::{self, filled};
    use crate::services::store_utils::AppState;
    use crate::types::{INTERNAL_ERROR, MISSING_CONSENT, MISSING_CONTACT, UNKNOWN_TIME_SLOT};

    #[derive(Deserialize)]
    pub struct CheckCapacityBody {
        pub date: Option<String>,
        pub time: Option<String>,
        pub guests: Option<Value>,
    }

    #[derive(Serialize)]
    pub struct Rejection {
        pub available: bool,
        pub message: String,
    }

    impl Rejection {
        fn new(message: &str) -> Self {
            Self { available: false, message: message.to_owned() }
        }
    }

    #[post("/check-capacity")]
    pub async fn check_capacity(state: Data<AppState>, body: Json<CheckCapacityBody>) -> impl Responder {
        let slot = match slot_input::validate(body.date.as_deref(), body.time.as_deref(), body.guests.as_ref()) {
            Ok(slot) => slot,
            Err(message) => return HttpResponse::BadRequest().json(Rejection::new(message)),
        };

        match state.store.send(CheckSlot { date: slot.date, time: slot.time, guests: slot.guests }).await {
            Ok(Ok(SlotCheck::Checked(availability))) => HttpResponse::Ok().json(availability),
            Ok(Ok(SlotCheck::UnknownSlot)) => HttpResponse::BadRequest().json(Rejection::new(UNKNOWN_TIME_SLOT)),
            Ok(Err(err)) => {
                error!(error = %err, "capacity settings could not be loaded");
                HttpResponse::InternalServerError().json(Rejection::new(INTERNAL_ERROR))
            }
            Err(err) => {
                error!(error = %err, "store actor unavailable");
                HttpResponse::InternalServerError().json(Rejection::new(INTERNAL_ERROR))
            }
        }
    }

    #[derive(Deserialize)]
    pub struct CreateReservationBody {
        pub name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub date: Option<String>,
        pub time: Option<String>,
        pub guests: Option<Value>,
        pub note: Option<String>,
        pub consent: Option<bool>,
    }

    #[post("")]
    pub async fn create_reservation(
        state: Data<AppState>,
        body: Json<CreateReservationBody>,
    ) -> Result<HttpResponse, ApiError> {
        let body = body.into_inner();
        let slot = slot_input::validate(body.date.as_deref(), body.time.as_deref(), body.guests.as_ref())
            .map_err(|message| ApiError::BadRequest(message.into()))?;
        let (Some(name), Some(phone)) = (filled(body.name), filled(body.phone)) else {
            return Err(ApiError::BadRequest(MISSING_CONTACT.into()));
        };
        if body.consent != Some(true) {
            return Err(ApiError::BadRequest(MISSING_CONSENT.into()));
        }

        let new = NewReservation {
            name,
            email: filled(body.email).unwrap_or_default(),
            phone,
            date: slot.date,
            time: slot.time,
            guests: slot.guests,
            note: filled(body.note),
            consent: true,
        };

        match ask(&state.store, CreateReservation(new)).await? {
            BookingOutcome::Booked(reservation) => Ok(HttpResponse::Created().json(reservation)),
            BookingOutcome::Full(result) => Ok(HttpResponse::Conflict().json(result)),
            BookingOutcome::UnknownSlot => Err(ApiError::BadRequest(UNKNOWN_TIME_SLOT.into())),
        }
    }
}

// sub-route "/api/menu"
pub mod menu_route {
    use actix_web::web::Data;
    use actix_web::{get, HttpResponse};

    use crate::services::api_error::ApiError;
    use crate::services::ask;
    use crate::services::messages::FetchMenu;
    use crate::services::store_utils::AppState;

    #[get("")]
    pub async fn view_menu(state: Data<AppState>) -> Result<HttpResponse, ApiError> {
        let menu = ask(&state.store, FetchMenu { only_available: true }).await?;
        Ok(HttpResponse::Ok().json(menu))
    }
}

// sub-route "/api/contact"
pub mod contact_route {
    use actix_web::web::{Data, Json};
    use actix_web::{post, HttpResponse};
    use serde::Deserialize;

    use crate::services::api_error::ApiError;
    use crate::services::ask;
    use crate::services::messages::{AddContactMessage, NewContactMessage};
    use crate::services::slot_input::filled;
    use crate::services::store_utils::AppState;
    use crate::types::MISSING_MESSAGE_FIELDS;

    #[derive(Deserialize)]
    pub struct ContactBody {
        pub name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
        pub subject: Option<String>,
        pub message: Option<String>,
    }

    #[post("")]
    pub async fn send_message(state: Data<AppState>, body: Json<ContactBody>) -> Result<HttpResponse, ApiError> {
        let body = body.into_inner();
        let (Some(name), Some(email), Some(message)) = (filled(body.name), filled(body.email), filled(body.message)) else {
            return Err(ApiError::BadRequest(MISSING_MESSAGE_FIELDS.into()));
        };
        if !email.contains('@') {
            return Err(ApiError::BadRequest(MISSING_MESSAGE_FIELDS.into()));
        }

        let stored = ask(
            &state.store,
            AddContactMessage(NewContactMessage {
                name,
                email,
                phone: filled(body.phone),
                subject: filled(body.subject),
                message,
            }),
        )
        .await?;

        Ok(HttpResponse::Created().json(stored))
    }
}

// sub-route "/api/admin", every handler takes the `Admin` guard
pub mod admin_route {
    use actix_web::web::{Data, Json, Path, Query};
    use actix_web::{delete, get, post, put, HttpResponse};
    use serde::Deserialize;
    use serde_json::json;

    use crate::models::{parse_date, Backup, CapacitySettings, ReservationStatus};
    use crate::services::api_error::{ApiError, ErrorBody};
    use crate::services::ask;
    use crate::services::auth::Admin;
    use crate::services::messages::{
        BookingOutcome, DeleteContactMessage, DeleteMenuItem, DeleteReservation, ExportBackup,
        FetchCapacitySettings, FetchContactMessages, FetchMenu, FetchReservations, MarkMessageRead,
        MenuItemInput, RestoreBackup, SaveCapacitySettings, SaveMenuItem, UpdateReservationStatus,
    };
    use crate::services::store_utils::AppState;
    use crate::types::{INVALID_DATE, MENU_ITEM_NOT_FOUND, MESSAGE_NOT_FOUND, RESERVATION_NOT_FOUND, UNKNOWN_TIME_SLOT};

    fn deleted() -> HttpResponse {
        HttpResponse::Ok().json(json!({ "success": true }))
    }

    #[post("/login")]
    pub async fn login(_admin: Admin) -> HttpResponse {
        HttpResponse::Ok().json(json!({ "success": true }))
    }

    #[derive(Deserialize)]
    pub struct DateFilter {
        pub date: Option<String>,
    }

    #[get("/reservations")]
    pub async fn list_reservations(
        _admin: Admin,
        state: Data<AppState>,
        filter: Query<DateFilter>,
    ) -> Result<HttpResponse, ApiError> {
        let date = filter.into_inner().date.filter(|date| !date.is_empty());
        if date.as_deref().is_some_and(|date| parse_date(date).is_none()) {
            return Err(ApiError::BadRequest(INVALID_DATE.into()));
        }

        let reservations = ask(&state.store, FetchReservations { date }).await?;
        Ok(HttpResponse::Ok().json(reservations))
    }

    #[derive(Deserialize)]
    pub struct StatusBody {
        pub status: ReservationStatus,
    }

    #[put("/reservations/{id}/status")]
    pub async fn update_reservation_status(
        _admin: Admin,
        state: Data<AppState>,
        path: Path<String>,
        body: Json<StatusBody>,
    ) -> Result<HttpResponse, ApiError> {
        let msg = UpdateReservationStatus { id: path.into_inner(), status: body.status };

        match ask(&state.store, msg).await? {
            Some(BookingOutcome::Booked(reservation)) => Ok(HttpResponse::Ok().json(reservation)),
            Some(BookingOutcome::Full(result)) => Ok(HttpResponse::Conflict().json(result)),
            Some(BookingOutcome::UnknownSlot) => Ok(HttpResponse::BadRequest().json(ErrorBody::new(UNKNOWN_TIME_SLOT))),
            None => Err(ApiError::NotFound(RESERVATION_NOT_FOUND)),
        }
    }

    #[delete("/reservations/{id}")]
    pub async fn delete_reservation(
        _admin: Admin,
        state: Data<AppState>,
        path: Path<String>,
    ) -> Result<HttpResponse, ApiError> {
        if ask(&state.store, DeleteReservation(path.into_inner())).await? {
            Ok(deleted())
        } else {
            Err(ApiError::NotFound(RESERVATION_NOT_FOUND))
        }
    }

    #[get("/capacity")]
    pub async fn get_capacity(_admin: Admin, state: Data<AppState>) -> Result<HttpResponse, ApiError> {
        let settings = ask(&state.store, FetchCapacitySettings).await?;
        Ok(HttpResponse::Ok().json(settings))
    }

    #[put("/capacity")]
    pub async fn save_capacity(
        _admin: Admin,
        state: Data<AppState>,
        body: Json<CapacitySettings>,
    ) -> Result<HttpResponse, ApiError> {
        let settings = body.into_inner();
        settings.validate().map_err(ApiError::BadRequest)?;

        let saved = ask(&state.store, SaveCapacitySettings(settings)).await?;
        Ok(HttpResponse::Ok().json(saved))
    }

    #[get("/menu")]
    pub async fn list_menu(_admin: Admin, state: Data<AppState>) -> Result<HttpResponse, ApiError> {
        let menu = ask(&state.store, FetchMenu { only_available: false }).await?;
        Ok(HttpResponse::Ok().json(menu))
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MenuItemBody {
        pub id: Option<String>,
        pub category: String,
        pub name: String,
        #[serde(default)]
        pub description: String,
        pub price: u32,
        pub image_url: Option<String>,
        pub is_available: Option<bool>,
    }

    #[post("/menu")]
    pub async fn save_menu_item(
        _admin: Admin,
        state: Data<AppState>,
        body: Json<MenuItemBody>,
    ) -> Result<HttpResponse, ApiError> {
        let body = body.into_inner();
        if body.name.trim().is_empty() || body.category.trim().is_empty() {
            return Err(ApiError::BadRequest("Menü öğesi için ad ve kategori zorunludur.".into()));
        }

        let item = ask(
            &state.store,
            SaveMenuItem(MenuItemInput {
                id: body.id.filter(|id| !id.is_empty()),
                category: body.category.trim().to_owned(),
                name: body.name.trim().to_owned(),
                description: body.description,
                price: body.price,
                image_url: body.image_url,
                is_available: body.is_available.unwrap_or(true),
            }),
        )
        .await?;

        Ok(HttpResponse::Ok().json(item))
    }

    #[delete("/menu/{id}")]
    pub async fn delete_menu_item(
        _admin: Admin,
        state: Data<AppState>,
        path: Path<String>,
    ) -> Result<HttpResponse, ApiError> {
        if ask(&state.store, DeleteMenuItem(path.into_inner())).await? {
            Ok(deleted())
        } else {
            Err(ApiError::NotFound(MENU_ITEM_NOT_FOUND))
        }
    }

    #[get("/messages")]
    pub async fn list_messages(_admin: Admin, state: Data<AppState>) -> Result<HttpResponse, ApiError> {
        let messages = ask(&state.store, FetchContactMessages).await?;
        Ok(HttpResponse::Ok().json(messages))
    }

    #[put("/messages/{id}/read")]
    pub async fn mark_message_read(
        _admin: Admin,
        state: Data<AppState>,
        path: Path<String>,
    ) -> Result<HttpResponse, ApiError> {
        match ask(&state.store, MarkMessageRead(path.into_inner())).await? {
            Some(message) => Ok(HttpResponse::Ok().json(message)),
            None => Err(ApiError::NotFound(MESSAGE_NOT_FOUND)),
        }
    }

    #[delete("/messages/{id}")]
    pub async fn delete_message(
        _admin: Admin,
        state: Data<AppState>,
        path: Path<String>,
    ) -> Result<HttpResponse, ApiError> {
        if ask(&state.store, DeleteContactMessage(path.into_inner())).await? {
            Ok(deleted())
        } else {
            Err(ApiError::NotFound(MESSAGE_NOT_FOUND))
        }
    }

    #[get("/backup")]
    pub async fn export_backup(_admin: Admin, state: Data<AppState>) -> Result<HttpResponse, ApiError> {
        let backup = ask(&state.store, ExportBackup).await?;
        Ok(HttpResponse::Ok().json(backup))
    }

    #[post("/restore")]
    pub async fn restore_backup(
        _admin: Admin,
        state: Data<AppState>,
        body: Json<Backup>,
    ) -> Result<HttpResponse, ApiError> {
        let backup = body.into_inner();
        backup.capacity.validate().map_err(ApiError::BadRequest)?;

        ask(&state.store, RestoreBackup(backup)).await?;
        Ok(HttpResponse::Ok().json(json!({ "success": true })))
    }
}
