use std::fs;
use std::path::Path;
use std::time::Duration;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::web::Data;
use actix_web::{test, App};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

use crate::services::configure;
use crate::services::messages::{BookingOutcome, CreateReservation, NewReservation};
use crate::services::store_utils::{start_store_actor, AppState, StoreHandle};
use crate::settings::AdminCredentials;
use crate::store::FileStore;
use crate::types::{
    CAPACITY_CHECK_FAILED, INTERNAL_ERROR, MISSING_CONSENT, MISSING_SLOT_FIELDS, UNKNOWN_TIME_SLOT,
};

const DATE: &str = "2025-06-01";
const TIME: &str = "19:00";

fn state_for(dir: &Path, atomic_capacity: bool) -> Data<AppState> {
    let handle = StoreHandle::File(FileStore::open(dir).unwrap());
    Data::new(AppState { store: start_store_actor(handle, atomic_capacity) })
}

fn unreachable_redis_state() -> Data<AppState> {
    let handle = StoreHandle::Redis {
        client: redis::Client::open("redis://127.0.0.1:1/").unwrap(),
        prefix: "lokanta".into(),
        connect_timeout: Duration::from_millis(300),
    };
    Data::new(AppState { store: start_store_actor(handle, true) })
}

fn seed(dir: &Path, file: &str, contents: &str) {
    fs::write(dir.join(file), contents).unwrap();
}

fn seed_capacity(dir: &Path, max_guests_per_slot: u32) {
    seed(
        dir,
        "capacity-settings.json",
        &json!({ "isEnabled": true, "maxGuestsPerSlot": max_guests_per_slot }).to_string(),
    );
}

fn admin_auth() -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Basic {}", STANDARD.encode("admin:admin")))
}

fn booking(guests: u32) -> Value {
    json!({
        "name": "Ayşe Yılmaz",
        "email": "ayse@example.com",
        "phone": "+90 555 000 00 00",
        "date": DATE,
        "time": TIME,
        "guests": guests,
        "consent": true
    })
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .app_data(Data::new(AdminCredentials::default()))
                .configure(configure),
        )
        .await
    };
}

async fn check<S>(app: &S, body: Value) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/reservations/check-capacity")
        .set_json(body)
        .to_request();
    let res = test::call_service(app, req).await;
    let status = res.status();

    (status, test::read_body_json(res).await)
}

#[actix_web::test]
async fn empty_slot_reports_headroom() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_for(dir.path(), true));

    let (status, body) = check(&app, json!({ "date": DATE, "time": TIME, "guests": 6 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], true);
    assert_eq!(body["capacityEnabled"], true);
    assert_eq!(body["currentGuests"], 0);
    assert_eq!(body["remainingCapacity"], 44);
    assert_eq!(body["requestedGuests"], 6);
    assert!(dir.path().join("capacity-settings.json").exists());
}

#[actix_web::test]
async fn nearly_full_slot_rejects_large_party() {
    let dir = tempfile::tempdir().unwrap();
    seed(
        dir.path(),
        "reservations.json",
        r#"[{"id":"r1","name":"Kemal","date":"2025-06-01","time":"19:00","guests":48,"status":"confirmed","createdAt":"2025-05-01T12:00:00Z"}]"#,
    );
    let app = app!(state_for(dir.path(), true));

    let (status, body) = check(&app, json!({ "date": DATE, "time": TIME, "guests": "5" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["currentGuests"], 48);
    assert_eq!(body["remainingCapacity"], 2);
}

#[actix_web::test]
async fn unreadable_reservations_soft_fail() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path(), "reservations.json", "][");
    let app = app!(state_for(dir.path(), true));

    let (status, body) = check(&app, json!({ "date": DATE, "time": TIME, "guests": 2 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["currentGuests"], 0);
    assert_eq!(body["remainingCapacity"], 0);
    assert_eq!(body["message"], CAPACITY_CHECK_FAILED);
}

#[actix_web::test]
async fn disabled_capacity_admits_regardless_of_load() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path(), "capacity-settings.json", r#"{"isEnabled": false, "maxGuestsPerSlot": 10}"#);
    seed(
        dir.path(),
        "reservations.json",
        r#"[{"id":"r1","name":"Kemal","date":"2025-06-01","time":"19:00","guests":60,"status":"confirmed","createdAt":"2025-05-01T12:00:00Z"}]"#,
    );
    let app = app!(state_for(dir.path(), true));

    let (status, body) = check(&app, json!({ "date": DATE, "time": TIME, "guests": 30 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], true);
    assert_eq!(body["capacityEnabled"], false);
    assert_eq!(body["remainingCapacity"], 999);
}

#[actix_web::test]
async fn missing_fields_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_for(dir.path(), true));

    let (status, body) = check(&app, json!({ "date": DATE, "guests": 2 })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["available"], false);
    assert_eq!(body["message"], MISSING_SLOT_FIELDS);
}

#[actix_web::test]
async fn broken_settings_are_an_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path(), "capacity-settings.json", r#"{"maxGuestsPerSlot": 0}"#);
    let app = app!(state_for(dir.path(), true));

    let (status, body) = check(&app, json!({ "date": DATE, "time": TIME, "guests": 2 })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["available"], false);
}

#[actix_web::test]
async fn unreachable_store_soft_fails_the_capacity_check() {
    let app = app!(unreachable_redis_state());

    let (status, body) = check(&app, json!({ "date": DATE, "time": TIME, "guests": 2 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["capacityEnabled"], true);
    assert_eq!(body["currentGuests"], 0);
    assert_eq!(body["remainingCapacity"], 0);
    assert_eq!(body["requestedGuests"], 2);
    assert_eq!(body["message"], CAPACITY_CHECK_FAILED);
}

#[actix_web::test]
async fn unparseable_settings_soft_fail_the_capacity_check() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path(), "capacity-settings.json", "{\"isEnabled\":");
    let app = app!(state_for(dir.path(), true));

    let (status, body) = check(&app, json!({ "date": DATE, "time": TIME, "guests": 2 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["message"], CAPACITY_CHECK_FAILED);
}

#[actix_web::test]
async fn capacity_check_rejects_times_outside_the_slot_list() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_for(dir.path(), true));

    let (status, body) = check(&app, json!({ "date": DATE, "time": "23:30", "guests": 2 })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["available"], false);
    assert_eq!(body["message"], UNKNOWN_TIME_SLOT);
}

#[actix_web::test]
async fn empty_slot_list_accepts_any_time() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path(), "capacity-settings.json", r#"{"maxGuestsPerSlot": 20, "timeSlots": []}"#);
    let app = app!(state_for(dir.path(), true));

    let (status, body) = check(&app, json!({ "date": DATE, "time": "23:30", "guests": 2 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], true);
    assert_eq!(body["remainingCapacity"], 18);
}

#[actix_web::test]
async fn whole_float_guest_count_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_for(dir.path(), true));

    let (status, body) = check(&app, json!({ "date": DATE, "time": TIME, "guests": 4.0 })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requestedGuests"], 4);
    assert_eq!(body["remainingCapacity"], 46);
}

#[actix_web::test]
async fn malformed_json_is_a_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_for(dir.path(), true));

    let req = test::TestRequest::post()
        .uri("/api/reservations/check-capacity")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"date\":")
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn bookings_stop_at_the_slot_cap() {
    let dir = tempfile::tempdir().unwrap();
    seed_capacity(dir.path(), 10);
    let app = app!(state_for(dir.path(), true));

    let first = test::TestRequest::post().uri("/api/reservations").set_json(booking(6)).to_request();
    let res = test::call_service(&app, first).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(res).await;
    assert_eq!(created["status"], "pending");

    let second = test::TestRequest::post().uri("/api/reservations").set_json(booking(5)).to_request();
    let res = test::call_service(&app, second).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let refused: Value = test::read_body_json(res).await;
    assert_eq!(refused["remainingCapacity"], 4);

    let third = test::TestRequest::post().uri("/api/reservations").set_json(booking(4)).to_request();
    let res = test::call_service(&app, third).await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn concurrent_bookings_never_overfill_a_slot() {
    let dir = tempfile::tempdir().unwrap();
    seed_capacity(dir.path(), 10);
    let state = state_for(dir.path(), true);

    let requests = (0..5).map(|_| {
        state.store.send(CreateReservation(NewReservation {
            name: "Misafir".into(),
            email: String::new(),
            phone: "555".into(),
            date: DATE.into(),
            time: TIME.into(),
            guests: 4,
            note: None,
            consent: true,
        }))
    });
    let outcomes = futures::future::join_all(requests).await;

    let booked = outcomes
        .into_iter()
        .filter(|outcome| matches!(outcome, Ok(Ok(BookingOutcome::Booked(_)))))
        .count();
    assert_eq!(booked, 2);
}

#[actix_web::test]
async fn advisory_mode_commits_without_rechecking() {
    let dir = tempfile::tempdir().unwrap();
    seed_capacity(dir.path(), 10);
    let app = app!(state_for(dir.path(), false));

    for _ in 0..2 {
        let req = test::TestRequest::post().uri("/api/reservations").set_json(booking(8)).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let (_, body) = check(&app, json!({ "date": DATE, "time": TIME, "guests": 1 })).await;
    assert_eq!(body["currentGuests"], 16);
    assert_eq!(body["remainingCapacity"], 0);
}

#[actix_web::test]
async fn bookings_outside_slots_or_without_consent_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_for(dir.path(), true));

    let mut late = booking(2);
    late["time"] = json!("23:30");
    let res = test::call_service(&app, test::TestRequest::post().uri("/api/reservations").set_json(late).to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], UNKNOWN_TIME_SLOT);

    let mut no_consent = booking(2);
    no_consent["consent"] = json!(false);
    let res = test::call_service(&app, test::TestRequest::post().uri("/api/reservations").set_json(no_consent).to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], MISSING_CONSENT);
}

#[actix_web::test]
async fn booking_against_an_unreachable_store_is_an_internal_error() {
    let app = app!(unreachable_redis_state());

    let req = test::TestRequest::post().uri("/api/reservations").set_json(booking(2)).to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], INTERNAL_ERROR);
}

#[actix_web::test]
async fn unreadable_menu_is_an_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path(), "menu.json", "][");
    let app = app!(state_for(dir.path(), true));

    let res = test::call_service(&app, test::TestRequest::get().uri("/api/menu").to_request()).await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], INTERNAL_ERROR);
}

#[actix_web::test]
async fn admin_routes_require_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_for(dir.path(), true));

    let res = test::call_service(&app, test::TestRequest::get().uri("/api/admin/reservations").to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));

    let wrong = format!("Basic {}", STANDARD.encode("admin:yanlis"));
    let req = test::TestRequest::post()
        .uri("/api/admin/login")
        .insert_header((header::AUTHORIZATION, wrong))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post().uri("/api/admin/login").insert_header(admin_auth()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn reinstating_a_cancelled_booking_respects_capacity() {
    let dir = tempfile::tempdir().unwrap();
    seed_capacity(dir.path(), 10);
    let app = app!(state_for(dir.path(), true));

    let res = test::call_service(&app, test::TestRequest::post().uri("/api/reservations").set_json(booking(6)).to_request()).await;
    let first: Value = test::read_body_json(res).await;
    let first_id = first["id"].as_str().unwrap().to_owned();

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/reservations/{first_id}/status"))
        .insert_header(admin_auth())
        .set_json(json!({ "status": "cancelled" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let res = test::call_service(&app, test::TestRequest::post().uri("/api/reservations").set_json(booking(8)).to_request()).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/reservations/{first_id}/status"))
        .insert_header(admin_auth())
        .set_json(json!({ "status": "confirmed" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::put()
        .uri("/api/admin/reservations/unknown/status")
        .insert_header(admin_auth())
        .set_json(json!({ "status": "confirmed" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/api/admin/reservations?date={DATE}"))
        .insert_header(admin_auth())
        .to_request();
    let listed: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(2));

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/reservations/{first_id}"))
        .insert_header(admin_auth())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_web::test]
async fn capacity_settings_are_validated_on_save() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_for(dir.path(), true));

    let req = test::TestRequest::put()
        .uri("/api/admin/capacity")
        .insert_header(admin_auth())
        .set_json(json!({ "maxGuestsPerSlot": 0 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri("/api/admin/capacity")
        .insert_header(admin_auth())
        .set_json(json!({ "maxGuestsPerSlot": 24, "timeSlots": ["18:00", "18:30"] }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/admin/capacity").insert_header(admin_auth()).to_request();
    let settings: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(settings["maxGuestsPerSlot"], 24);
    assert_eq!(settings["isEnabled"], true);
    assert_eq!(settings["timeSlots"], json!(["18:00", "18:30"]));
}

#[actix_web::test]
async fn restore_replaces_collections() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_for(dir.path(), true));

    let backup = json!({
        "exportedAt": "2025-05-01T08:00:00Z",
        "reservations": [],
        "capacity": { "maxGuestsPerSlot": 30 },
        "menu": [
            { "id": "m1", "category": "Tatlı", "name": "Künefe", "price": 180 },
            { "id": "m2", "category": "Tatlı", "name": "Sütlaç", "price": 90, "isAvailable": false }
        ],
        "messages": []
    });
    let req = test::TestRequest::post()
        .uri("/api/admin/restore")
        .insert_header(admin_auth())
        .set_json(backup)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let menu: Value = test::read_body_json(
        test::call_service(&app, test::TestRequest::get().uri("/api/menu").to_request()).await,
    )
    .await;
    assert_eq!(menu.as_array().map(Vec::len), Some(1));
    assert_eq!(menu[0]["name"], "Künefe");

    let req = test::TestRequest::get().uri("/api/admin/backup").insert_header(admin_auth()).to_request();
    let exported: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(exported["capacity"]["maxGuestsPerSlot"], 30);
    assert_eq!(exported["menu"].as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn contact_messages_flow_to_the_admin_inbox() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_for(dir.path(), true));

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(json!({ "name": "Deniz", "email": "deniz@example.com", "message": "Doğum günü menüsü var mı?" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let stored: Value = test::read_body_json(res).await;
    let id = stored["id"].as_str().unwrap().to_owned();
    assert_eq!(stored["isRead"], false);

    let req = test::TestRequest::put()
        .uri(&format!("/api/admin/messages/{id}/read"))
        .insert_header(admin_auth())
        .to_request();
    let read: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(read["isRead"], true);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/admin/messages/{id}"))
        .insert_header(admin_auth())
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/admin/messages").insert_header(admin_auth()).to_request();
    let inbox: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(inbox, json!([]));

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(json!({ "name": "Deniz", "email": "yok", "message": "Merhaba" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}
