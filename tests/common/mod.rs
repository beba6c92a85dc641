#![allow(dead_code)]

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Date the fake backend uses for its monthly report classification
pub const REPORT_TODAY: &str = "2024-06-15";

/// In-memory stand-in for the invoice backend
#[derive(Debug)]
pub struct BackendState {
    pub invoices: Vec<Value>,
    pub next_id: i64,
    pub status_ok: bool,
    /// Overrides the HTTP status of `/status`
    pub status_code: Option<u16>,
    /// Replaces the JSON body of `/status` verbatim
    pub raw_body: Option<String>,
    /// Delay before `/facturas` answers
    pub list_delay: Option<Duration>,
    pub ai_response: Option<Value>,
    pub ai_texts: Vec<String>,
    pub puts: usize,
    pub posts: usize,
    pub uploads: usize,
}

pub type Shared = Arc<Mutex<BackendState>>;

pub struct FakeBackend {
    pub base_url: String,
    pub state: Shared,
}

impl FakeBackend {
    pub fn start(invoices: Vec<Value>) -> Self {
        let next_id = invoices
            .iter()
            .filter_map(|inv| inv["id"].as_i64())
            .max()
            .unwrap_or(0)
            + 1;

        let state = Arc::new(Mutex::new(BackendState {
            invoices,
            next_id,
            status_ok: true,
            status_code: None,
            raw_body: None,
            list_delay: None,
            ai_response: None,
            ai_texts: Vec::new(),
            puts: 0,
            posts: 0,
            uploads: 0,
        }));

        let app = Router::new()
            .route("/status", get(status))
            .route("/facturas", get(list).post(create))
            .route("/facturas/csv", post(upload_csv))
            .route("/facturas/{id}", put(update))
            .route("/ia/resumen-cobro", post(ai))
            .route("/reporte/mensual", get(report))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn invoices(&self) -> Vec<Value> {
        self.state.lock().unwrap().invoices.clone()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut BackendState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

/// A base address nothing listens on
pub fn unused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

fn vence(inv: &Value) -> String {
    inv["vence"].as_str().unwrap_or("").to_string()
}

async fn status(State(state): State<Shared>) -> Response {
    let state = state.lock().unwrap();
    let code = state
        .status_code
        .and_then(|c| StatusCode::from_u16(c).ok())
        .unwrap_or(StatusCode::OK);

    match &state.raw_body {
        Some(raw) => (code, raw.clone()).into_response(),
        None => (
            code,
            Json(json!({"ok": state.status_ok, "service": "Noa Cobros API", "port": 5056})),
        )
            .into_response(),
    }
}

async fn list(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let q = params
        .get("q")
        .map(|q| q.trim().to_lowercase())
        .unwrap_or_default();

    let delay = state.lock().unwrap().list_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let state = state.lock().unwrap();

    let mut rows: Vec<Value> = state
        .invoices
        .iter()
        .filter(|inv| {
            q.is_empty()
                || inv["cliente"]
                    .as_str()
                    .unwrap_or("")
                    .to_lowercase()
                    .contains(&q)
        })
        .cloned()
        .collect();
    rows.sort_by_key(vence);

    Json(Value::Array(rows))
}

async fn create(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.posts += 1;

    if body["cliente"].as_str().is_none() || body["monto"].is_null() || body["vence"].is_null() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "cliente, monto, vence son obligatorios"})),
        );
    }

    let id = state.next_id;
    state.next_id += 1;
    let row = json!({
        "id": id,
        "cliente": body["cliente"],
        "monto": body["monto"],
        "vence": body["vence"],
        "estado": body.get("estado").cloned().unwrap_or(json!("pendiente")),
    });
    state.invoices.push(row.clone());

    (StatusCode::CREATED, Json(row))
}

/// Same contract as the backend: a `file` part whose header row is exactly
/// cliente,monto,vence; dd/mm/aaaa dates are stored as aaaa-mm-dd
async fn upload_csv(
    State(state): State<Shared>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut content = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            content = field.text().await.ok();
        }
    }
    let Some(content) = content else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Suba un archivo CSV en 'file'"})),
        );
    };

    let mut lines = content.trim_start_matches('\u{feff}').lines();
    let headers: Vec<String> = lines
        .next()
        .unwrap_or("")
        .split(',')
        .map(|c| c.trim().to_lowercase())
        .collect();
    let mut sorted = headers.clone();
    sorted.sort();
    if sorted != ["cliente", "monto", "vence"] {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Encabezados requeridos: cliente,monto,vence"})),
        );
    }

    let mut state = state.lock().unwrap();
    state.uploads += 1;

    let mut inserted = 0;
    for line in lines.filter(|l| !l.trim().is_empty()) {
        let cells: Vec<&str> = line.split(',').map(str::trim).collect();
        let cell = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .and_then(|i| cells.get(i).copied())
                .unwrap_or("")
        };

        let Ok(monto) = cell("monto").parse::<f64>() else {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "monto inválido"})),
            );
        };

        let id = state.next_id;
        state.next_id += 1;
        state.invoices.push(json!({
            "id": id,
            "cliente": cell("cliente"),
            "monto": monto,
            "vence": iso_date(cell("vence")),
            "estado": "pendiente",
        }));
        inserted += 1;
    }

    (StatusCode::OK, Json(json!({"ok": true, "insertadas": inserted})))
}

fn iso_date(raw: &str) -> String {
    match raw.split('/').collect::<Vec<_>>()[..] {
        [d, m, y] => format!("{y}-{m:0>2}-{d:0>2}"),
        _ => raw.to_string(),
    }
}

async fn update(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.puts += 1;

    let Some(row) = state
        .invoices
        .iter_mut()
        .find(|inv| inv["id"].to_string() == id || inv["id"].as_str() == Some(id.as_str()))
    else {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "No existe"})));
    };

    if let Some(estado) = body.get("estado") {
        row["estado"] = estado.clone();
    }

    (StatusCode::OK, Json(row.clone()))
}

async fn ai(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut state = state.lock().unwrap();
    let texto = body["texto"].as_str().unwrap_or("").to_string();
    state.ai_texts.push(texto.clone());

    let response = state
        .ai_response
        .clone()
        .unwrap_or_else(|| json!({"ok": true, "respuesta": format!("Resumen de cobro: {texto}")}));
    Json(response)
}

async fn report(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let mes = params
        .get("mes")
        .cloned()
        .unwrap_or_else(|| REPORT_TODAY[..7].to_string());
    let state = state.lock().unwrap();

    let rows: Vec<Value> = state
        .invoices
        .iter()
        .filter(|inv| vence(inv).starts_with(&mes))
        .cloned()
        .collect();

    let pending: Vec<&Value> = rows
        .iter()
        .filter(|inv| inv["estado"].as_str().unwrap_or("pendiente") == "pendiente")
        .collect();
    let overdue = pending
        .iter()
        .filter(|inv| vence(inv).as_str() < REPORT_TODAY)
        .count();
    let total: f64 = rows.iter().filter_map(|inv| inv["monto"].as_f64()).sum();

    Json(json!({
        "resumen": {
            "mes": mes,
            "total_facturas": rows.len(),
            "monto_total": total,
            "pendientes": pending.len(),
            "vencidas": overdue,
            "por_vencer": pending.len() - overdue,
        },
        "facturas": rows,
    }))
}
