#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    Router,
};
use serde_json::{json, Value};

use paynet_admin::api::ApiClient;
use paynet_admin::session::Session;
use paynet_admin::types::{Classify, Rate};

/// One request as the stub backend saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Default)]
struct StubState {
    levels: Vec<Value>,
    commission_rows: Vec<Value>,
    list_total: u64,
    affected_children: Vec<i64>,
    rejection: Option<String>,
    taken_values: Vec<String>,
    password: Option<String>,
    requests: Vec<Recorded>,
}

/// In-process stand-in for the settlement backend, bound to a free port
#[derive(Clone)]
pub struct StubBackend {
    pub base_url: String,
    state: Arc<Mutex<StubState>>,
}

impl StubBackend {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let state = Arc::new(Mutex::new(StubState { list_total: 42, ..StubState::default() }));

        let app = Router::new().fallback(dispatch).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind stub backend on {}", port))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { base_url, state })
    }

    /// Levels `1..=n` named `L1`..`Ln`
    pub fn with_level_count(self, n: u32) -> Self {
        self.state.lock().unwrap().levels = (1..=n)
            .map(|i| json!({ "idx": i, "partner_name": format!("L{}", i), "rate": format!("p{}", i) }))
            .collect();
        self
    }

    pub fn with_levels(self, levels: Vec<Value>) -> Self {
        self.state.lock().unwrap().levels = levels;
        self
    }

    pub fn with_commission_rows(self, rows: Vec<Value>) -> Self {
        self.state.lock().unwrap().commission_rows = rows;
        self
    }

    pub fn with_affected_children(self, children: Vec<i64>) -> Self {
        self.state.lock().unwrap().affected_children = children;
        self
    }

    pub fn reject_writes(self, message: &str) -> Self {
        self.state.lock().unwrap().rejection = Some(message.to_string());
        self
    }

    /// Duplicate and partner-id checks answer `isDuplicated: true` for this value
    pub fn with_taken_value(self, value: &str) -> Self {
        self.state.lock().unwrap().taken_values.push(value.to_string());
        self
    }

    pub fn with_password(self, password: &str) -> Self {
        self.state.lock().unwrap().password = Some(password.to_string());
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn writes(&self) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.method != Method::GET).collect()
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url, Duration::from_secs(5)).expect("stub client")
    }
}

pub fn admin_session() -> Session {
    Session::new(Classify::Admin, Rate::new(0), "admin01", "Console Admin").with_user_code("ADM")
}

pub fn partner_session() -> Session {
    partner_session_at(2)
}

pub fn partner_session_at(tier: u8) -> Session {
    Session::new(Classify::Partner, Rate::new(tier), "agency7", "Agency Seven").with_user_code("AG-7")
}

/// Binds the gateway router to a free port and returns its base URL
pub async fn start_gateway(backend_url: &str) -> Result<String> {
    use paynet_admin::gateway::{app, GatewayState};

    let api = ApiClient::new(backend_url, Duration::from_secs(5))?;
    let state = GatewayState::new(api, Duration::from_secs(5))?;
    let router = app(state, paynet_admin::config::config());

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://127.0.0.1:{}", port))
}

async fn dispatch(
    State(state): State<Arc<Mutex<StubState>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let query: BTreeMap<String, String> = uri
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let path = uri.path().to_string();

    let mut state = state.lock().unwrap();
    state.requests.push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        headers,
        body: body.clone(),
    });

    if method != Method::GET {
        if let Some(message) = &state.rejection {
            return Json(json!({ "success": false, "message": message })).into_response();
        }
    }

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("GET", ["api", "partner", "PartnerSetting"]) => {
            Json(json!({ "success": true, "data": state.levels })).into_response()
        }
        ("POST", ["api", "partner", "PartnerSetting", "write"]) => {
            let idx = body["newNum"].as_u64().unwrap_or(0);
            state.levels.push(json!({ "idx": idx, "partner_name": body["newName"] }));
            Json(json!({ "success": true, "message": "Level created" })).into_response()
        }
        ("POST", ["api", "partner", "PartnerSetting", "test", "edit", id]) => {
            let id = id.to_string();
            for level in state.levels.iter_mut() {
                if level["idx"].to_string() == id {
                    level["partner_name"] = body["partner_name"].clone();
                }
            }
            Json(json!({ "success": true })).into_response()
        }
        ("DELETE", ["api", "partner", "PartnerSetting", "delete", id]) => {
            let id = id.to_string();
            state.levels.retain(|l| l["idx"].to_string() != id);
            Json(json!({ "success": true, "message": "Level deleted" })).into_response()
        }
        ("POST", ["api", "partner", "PartnerSetting", "editInfo"]) => {
            let id = body["EditLevelId"].clone();
            let target = body["upperLevelId"].clone();
            for level in state.levels.iter_mut() {
                if level["idx"] == id {
                    level["view_permission"] = body["permissionData"]["view_permission"].clone();
                    level["edit_permission"] = body["permissionData"]["edit_permission"].clone();
                    level["commission_permission"] = body["permissionData"]["commission_permission"].clone();
                    level["use_special_path"] = json!(!target.is_null());
                    level["upper_rate"] = if target.is_null() { Value::Null } else { json!(format!("p{}", target)) };
                }
            }
            Json(json!({
                "success": true,
                "message": "Permissions updated",
                "affectedChildren": state.affected_children,
            }))
            .into_response()
        }
        ("GET", ["api", "LeftMenu"]) => Json(json!({
            "success": true,
            "C_dupli": 1,
            "terminalCount": "7",
            "commissionBalance": 2,
        }))
        .into_response(),
        ("GET", ["api", "store", "storeCommissionTable"]) => Json(json!({
            "success": true,
            "data": state.commission_rows,
            "pagination": { "totalCount": state.commission_rows.len() },
        }))
        .into_response(),
        ("POST", ["api", "store", "storeCommissionTable", "commissionEdit", _]) => {
            Json(json!({ "success": true, "message": "Commission updated" })).into_response()
        }
        ("GET", ["api", "store", "writeOk", "duplicateCheck", _, value])
        | ("GET", ["api", "partner", "writeOk", "partnerIdCheck", value]) => {
            let taken = state.taken_values.iter().any(|v| v == value);
            Json(json!({ "isDuplicated": taken })).into_response()
        }
        ("POST", ["api", "store", "editOk", "passCheck"]) => {
            let matches = state.password.is_some() && body["password"].as_str() == state.password.as_deref();
            Json(json!({ "data": matches })).into_response()
        }
        ("POST", ["api", "store", "writeOk"])
        | ("POST", ["api", "partner", "writeOk", "sr_23346"])
        | ("POST", ["api", _, "editOk", "sr_23346"]) => {
            Json(json!({ "success": true, "message": "Saved" })).into_response()
        }
        ("POST", ["api", "kwon", "payment", _, "cancel"]) => {
            Json(json!({ "success": true, "message": "Cancellation complete" })).into_response()
        }
        ("GET", ["api", ..]) => Json(json!({
            "success": true,
            "data": [{ "path": path, "search_text": query.get("search_text") }],
            "totalCount": state.list_total,
            "upper_rate": "p1",
            "totalStats": { "amount": 1200 },
        }))
        .into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "success": false, "message": "no such route" }))).into_response(),
    }
}
