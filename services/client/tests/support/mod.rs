//! A fake podscript backend served by axum on an ephemeral port.

use axum::{
    extract::{Multipart, Path},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use client_lib::{adapters::HttpTransport, Config, Gateway};
use podscript_core::SessionStore;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// The only token the fake backend accepts.
pub const GOOD_TOKEN: &str = "good-token";

type Reply = (StatusCode, Json<Value>);

fn authorized(headers: &HeaderMap) -> Result<(), Reply> {
    let expected = format!("Bearer {}", GOOD_TOKEN);
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Invalid token"})),
        )),
    }
}

fn script(id: &str, name: &str, project: &str) -> Value {
    json!({
        "_id": id, "name": name, "transcript": "words", "platform": "YouTube",
        "type": "transcript", "status": "active", "tags": ["podcast"],
        "uploadDate": "2024-05-01", "uploadTime": "10:00", "project": project
    })
}

async fn login(Json(body): Json<Value>) -> Reply {
    if body["password"] == "secret" {
        (
            StatusCode::OK,
            Json(json!({"success": true, "data": {"token": GOOD_TOKEN}})),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Invalid credentials"})),
        )
    }
}

async fn list_scripts(headers: HeaderMap, Path(project_id): Path<String>) -> Result<Reply, Reply> {
    authorized(&headers)?;
    match project_id.as_str() {
        "slow" => tokio::time::sleep(Duration::from_secs(2)).await,
        "garbage" => {
            // A 200 whose body is not an envelope at all.
            return Ok((StatusCode::OK, Json(json!(["not", "an", "envelope"]))));
        }
        _ => {}
    }
    Ok((
        StatusCode::OK,
        Json(json!({"success": true, "data": [
            script("s1", "Ep1", &project_id),
            script("s2", "Ep2", &project_id),
        ]})),
    ))
}

async fn create_script(headers: HeaderMap, Json(body): Json<Value>) -> Result<Reply, Reply> {
    authorized(&headers)?;
    let mut created = body.clone();
    created["_id"] = json!("s-new");
    Ok((StatusCode::CREATED, Json(json!({"success": true, "data": created}))))
}

async fn delete_script(headers: HeaderMap, Path(id): Path<String>) -> Result<Reply, Reply> {
    authorized(&headers)?;
    if id == "missing" {
        return Ok((
            StatusCode::OK,
            Json(json!({"success": false, "message": "not found"})),
        ));
    }
    Ok((StatusCode::OK, Json(json!({"success": true}))))
}

async fn upload_project_file(
    headers: HeaderMap,
    Path(project_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Reply, Reply> {
    authorized(&headers)?;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let mime = field.content_type().unwrap_or_default().to_string();
        let size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        return Ok((
            StatusCode::CREATED,
            Json(json!({"success": true, "data": {
                "id": format!("{}-f1", project_id),
                "name": name,
                "type": mime.split('/').next().unwrap_or_default(),
                "transcript": format!("{} bytes", size),
            }})),
        ));
    }
    Err((
        StatusCode::BAD_REQUEST,
        Json(json!({"success": false, "message": "Multipart form must include a file"})),
    ))
}

/// Starts the fake backend and returns its base address (ending in `/api/`).
pub async fn spawn_backend() -> String {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/scripts", post(create_script))
        .route("/scripts/project/{project_id}", get(list_scripts))
        .route("/scripts/{id}", delete(delete_script))
        .route("/projects/{project_id}", post(upload_project_file));
    let app = Router::new().nest("/api", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api/", addr)
}

/// A base address nothing is listening on.
pub async fn dead_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api/", addr)
}

/// A gateway talking HTTP to `base_url` with a short request budget.
pub fn gateway(base_url: &str, session: Arc<dyn SessionStore>) -> Gateway {
    let mut config = Config::new(base_url);
    config.request_timeout = Duration::from_millis(300);
    config.upload_timeout = Duration::from_millis(1_000);
    let transport = HttpTransport::new(&config).unwrap();
    Gateway::new(Arc::new(transport), session)
}
