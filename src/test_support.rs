//! In-process stand-in for the PostgREST `profiles` endpoint, used by handler
//! and repository tests. Holds at most one row and records every PATCH.

use std::collections::HashMap;
use std::sync::Mutex;

use actix_web::dev::ServerHandle;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::Value;

use crate::config::AppConfig;
use crate::AppState;

pub const USER_ID: &str = "5b0c2f4e-8a51-4c8e-9d1e-2f3a4b5c6d7e";

type Filters = web::Query<HashMap<String, String>>;

#[derive(Debug, Clone)]
pub struct RecordedPatch {
    pub filters: HashMap<String, String>,
    pub prefer: Option<String>,
    pub apikey: Option<String>,
    pub body: Value,
}

#[derive(Default)]
pub struct ProfilesTable {
    pub row: Option<Value>,
    pub patches: Vec<RecordedPatch>,
}

pub struct PostgrestStub {
    pub base_url: String,
    table: web::Data<Mutex<ProfilesTable>>,
    handle: ServerHandle,
}

impl PostgrestStub {
    pub async fn start(row: Option<Value>) -> Self {
        let table = web::Data::new(Mutex::new(ProfilesTable { row, patches: Vec::new() }));
        let data = table.clone();

        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .route("/rest/v1/profiles", web::get().to(select_profiles))
                .route("/rest/v1/profiles", web::patch().to(patch_profiles))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            base_url: format!("http://{}", addr),
            table,
            handle,
        }
    }

    pub fn config(&self) -> AppConfig {
        let base_url = self.base_url.clone();
        AppConfig::from_lookup(move |key| match key {
            "SUPABASE_URL" => Some(base_url.clone()),
            "SUPABASE_SERVICE_ROLE_KEY" => Some("service-key".to_string()),
            "SUPABASE_ANON_KEY" => Some("anon-key".to_string()),
            _ => None,
        })
        .unwrap()
    }

    pub fn state(&self) -> AppState {
        AppState::new(self.config(), reqwest::Client::new())
    }

    pub fn row(&self) -> Option<Value> {
        self.table.lock().unwrap().row.clone()
    }

    pub fn patches(&self) -> Vec<RecordedPatch> {
        self.table.lock().unwrap().patches.clone()
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

fn matches_id(row: &Value, filters: &HashMap<String, String>) -> bool {
    let id = row["id"].as_str().unwrap_or_default();
    filters.get("id").is_some_and(|f| *f == format!("eq.{}", id))
}

fn matches_step(row: &Value, filters: &HashMap<String, String>) -> bool {
    match filters.get("onboarding_step").map(String::as_str) {
        None => true,
        Some("is.null") => row["onboarding_step"].is_null(),
        Some(f) => {
            let wanted = f.strip_prefix("eq.").and_then(|n| n.parse::<i64>().ok());
            wanted.is_some() && wanted == row["onboarding_step"].as_i64()
        }
    }
}

async fn select_profiles(table: web::Data<Mutex<ProfilesTable>>, filters: Filters) -> HttpResponse {
    let t = table.lock().unwrap();
    let rows: Vec<Value> = t
        .row
        .iter()
        .filter(|row| matches_id(row, &filters))
        .cloned()
        .collect();
    HttpResponse::Ok().json(rows)
}

async fn patch_profiles(
    req: HttpRequest,
    table: web::Data<Mutex<ProfilesTable>>,
    filters: Filters,
    body: web::Json<Value>,
) -> HttpResponse {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };

    let mut t = table.lock().unwrap();
    t.patches.push(RecordedPatch {
        filters: filters.0.clone(),
        prefer: header("Prefer"),
        apikey: header("apikey"),
        body: body.0.clone(),
    });

    let mut updated = Vec::new();
    if let Some(row) = t.row.as_mut() {
        if matches_id(row, &filters) && matches_step(row, &filters) {
            if let (Some(obj), Some(changes)) = (row.as_object_mut(), body.as_object()) {
                for (k, v) in changes {
                    obj.insert(k.clone(), v.clone());
                }
            }
            updated.push(row.clone());
        }
    }
    HttpResponse::Ok().json(updated)
}
