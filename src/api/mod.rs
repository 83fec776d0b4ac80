use actix_web::{http::Method, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::metrics;
use crate::models::{AppendRequest, Candle, Flower, GuestbookEntry, Kind, Lantern, RecordId};
use crate::seeds;
use crate::store::{Store, StoreError};
use crate::tribute::{TributeComposer, TributeRequest};

pub struct AppState {
    pub store: Arc<Store>,
    pub composer: Arc<TributeComposer>,
}

// ==================== Health Check ====================

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

// ==================== Collection Endpoints ====================

/// Read a collection, falling back to seed data when the key has never
/// been written or the read fails. Reads never surface an error to the
/// caller; a failed read is logged and answered with the seed.
fn load_or_seed(store: &Store, kind: Kind) -> Vec<Value> {
    match store.get(kind.store_key()) {
        Ok(Some(records)) => records,
        Ok(None) => seeds::for_kind(kind),
        Err(e) => {
            log::warn!(
                "Failed to read collection '{}', serving seed data: {}",
                kind.store_key(),
                e
            );
            seeds::for_kind(kind)
        }
    }
}

pub async fn list_collection(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let kind = match Kind::from_slug(&path) {
        Some(kind) => kind,
        None => return unknown_collection(),
    };

    let records = load_or_seed(&state.store, kind);
    HttpResponse::Ok().json(collection_body(kind, records))
}

pub async fn append_record(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<AppendRequest>,
) -> impl Responder {
    let kind = match Kind::from_slug(&path) {
        Some(kind) => kind,
        None => return unknown_collection(),
    };

    let name = body.name.as_deref().map(str::trim).unwrap_or("");
    let location = body.location.as_deref().map(str::trim).unwrap_or("");
    let message = body.message.as_deref().map(str::trim).unwrap_or("");

    if name.is_empty() {
        return validation_error("Name is required");
    }
    if kind.requires_message() && message.is_empty() {
        return validation_error("Message is required");
    }

    let mut records = load_or_seed(&state.store, kind);
    let entry = match build_record(kind, name, location, message, &records) {
        Ok(entry) => entry,
        Err(e) => return store_failure(StoreError::Json(e)),
    };
    insert_record(kind, entry.clone(), &mut records);

    match state.store.put(kind.store_key(), &records) {
        Ok(()) => HttpResponse::Ok().json(mutation_body(kind, Some(entry), records)),
        Err(e) => store_failure(e),
    }
}

pub async fn replace_collection(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> impl Responder {
    let kind = match Kind::from_slug(&path) {
        Some(kind) => kind,
        None => return unknown_collection(),
    };

    // The front-end sends {"<kind>": [...]}; a bare array is accepted too.
    let records = if let Some(records) = body.as_array() {
        records.clone()
    } else if let Some(records) = body.get(kind.response_key()).and_then(Value::as_array) {
        records.clone()
    } else {
        return validation_error(&format!(
            "Expected '{}' to be an array",
            kind.response_key()
        ));
    };

    match state.store.put(kind.store_key(), &records) {
        Ok(()) => HttpResponse::Ok().json(mutation_body(kind, None, records)),
        Err(e) => store_failure(e),
    }
}

/// Construct the record for an append. Guestbook entries get an epoch-
/// milliseconds string id; the other kinds continue their seed data's
/// small-integer sequence.
fn build_record(
    kind: Kind,
    name: &str,
    location: &str,
    message: &str,
    existing: &[Value],
) -> Result<Value, serde_json::Error> {
    let now = Utc::now();
    match kind {
        Kind::Candles => serde_json::to_value(Candle {
            id: RecordId::Number(next_numeric_id(existing)),
            name: name.to_string(),
            lit_at: now.to_rfc3339(),
        }),
        Kind::Flowers => serde_json::to_value(Flower {
            id: RecordId::Number(next_numeric_id(existing)),
            name: name.to_string(),
            planted_at: now.to_rfc3339(),
        }),
        Kind::Lanterns => serde_json::to_value(Lantern {
            id: RecordId::Number(next_numeric_id(existing)),
            name: name.to_string(),
            released_at: now.to_rfc3339(),
        }),
        Kind::Guestbook => serde_json::to_value(GuestbookEntry {
            id: RecordId::Text(now.timestamp_millis().to_string()),
            name: name.to_string(),
            location: if location.is_empty() {
                "Not specified".to_string()
            } else {
                location.to_string()
            },
            message: message.to_string(),
            date: now.format("%B %-d, %Y").to_string(),
            created_at: now.to_rfc3339(),
        }),
    }
}

fn next_numeric_id(records: &[Value]) -> i64 {
    records
        .iter()
        .filter_map(|r| r.get("id").and_then(Value::as_i64))
        .max()
        .unwrap_or(0)
        + 1
}

/// Guestbook entries are newest-first with the pinned "welcome" record
/// kept at the very top; the other collections keep insertion order.
fn insert_record(kind: Kind, record: Value, records: &mut Vec<Value>) {
    match kind {
        Kind::Guestbook => {
            let pinned = records
                .iter()
                .position(|r| r.get("id").and_then(Value::as_str) == Some("welcome"));
            match pinned {
                Some(0) => records.insert(1, record),
                Some(pos) => {
                    let welcome = records.remove(pos);
                    records.insert(0, record);
                    records.insert(0, welcome);
                }
                None => records.insert(0, record),
            }
        }
        _ => records.push(record),
    }
}

// ==================== Tribute Composition ====================

pub async fn compose_tribute(
    state: web::Data<AppState>,
    body: web::Json<TributeRequest>,
) -> impl Responder {
    let relationship = body.relationship.as_deref().map(str::trim).unwrap_or("");
    let has_memory = body.memories.iter().any(|m| !m.trim().is_empty());

    if relationship.is_empty() || !has_memory {
        return HttpResponse::BadRequest().json(json!({
            "error": "A relationship and at least one memory are required"
        }));
    }

    match state.composer.compose(&body).await {
        Ok(tribute) => HttpResponse::Ok().json(json!({ "tribute": tribute })),
        Err(e) => {
            log::error!("Tribute composition failed: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "error": "AI service unavailable"
            }))
        }
    }
}

// ==================== Transport ====================

pub async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(json!({
        "error": "Method not allowed"
    }))
}

fn unknown_collection() -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "success": false,
        "error": "Unknown collection"
    }))
}

// ==================== Response Shaping ====================

fn collection_body(kind: Kind, records: Vec<Value>) -> Value {
    let mut body = Map::new();
    body.insert(kind.response_key().to_string(), Value::Array(records));
    Value::Object(body)
}

fn mutation_body(kind: Kind, entry: Option<Value>, records: Vec<Value>) -> Value {
    let mut body = Map::new();
    body.insert("success".to_string(), Value::Bool(true));
    if let Some(entry) = entry {
        body.insert("entry".to_string(), entry);
    }
    body.insert(kind.response_key().to_string(), Value::Array(records));
    Value::Object(body)
}

fn validation_error(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "success": false,
        "error": message
    }))
}

fn store_failure(e: StoreError) -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({
        "success": false,
        "error": e.to_string()
    }))
}

// ==================== Route Configuration ====================

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check
        .route("/health", web::get().to(health))
        // Metrics (read-only)
        .route("/api/metrics", web::get().to(metrics::get_metrics_handler))
        // Tribute composition gateway
        .service(
            web::resource("/api/tribute")
                .route(web::post().to(compose_tribute))
                .route(web::method(Method::OPTIONS).to(preflight))
                .default_service(web::route().to(method_not_allowed)),
        )
        // Tribute collections (candles, flowers, lanterns, guestbook)
        .service(
            web::resource("/api/{collection}")
                .route(web::get().to(list_collection))
                .route(web::post().to(append_record))
                .route(web::put().to(replace_collection))
                .route(web::method(Method::OPTIONS).to(preflight))
                .default_service(web::route().to(method_not_allowed)),
        );
}
