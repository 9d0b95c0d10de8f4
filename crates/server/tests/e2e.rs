use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes::{self, AppState};
use service::{paths::StorePaths, store::DocumentStore};

fn cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

struct TestApp {
    base_url: String,
    data_dir: PathBuf,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Spawn the real router on an ephemeral port with an isolated store and
/// config record per test run, mirroring startup (seed before serving).
async fn start_server() -> anyhow::Result<TestApp> {
    let data_dir = std::env::temp_dir().join(format!("workboard_e2e_{}", Uuid::new_v4()));
    tokio::fs::create_dir_all(&data_dir).await?;

    let paths = StorePaths::new(
        data_dir.join("server-config.json"),
        data_dir.join("db.json"),
    );
    let store = DocumentStore::new(paths);
    let store_file = store.current_path().await;
    store.ensure_store(&store_file).await?;

    let state = AppState {
        store,
        assets_dir: data_dir.join("dist"),
    };
    let app: Router = routes::build_router(state, cors());

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });

    Ok(TestApp { base_url, data_dir })
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

#[tokio::test]
async fn e2e_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/health")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}

#[tokio::test]
async fn e2e_fresh_store_serves_seed_document() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/api/data")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let doc = res.json::<serde_json::Value>().await?;
    assert_eq!(doc["users"][0]["uid"], "Admin");
    assert_eq!(doc["users"][0]["role"], "Admin");
    assert!(doc["teams"].as_array().unwrap().is_empty());
    assert!(doc["lastUpdated"].as_u64().unwrap() > 0);
    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}

#[tokio::test]
async fn e2e_save_then_stale_write_conflicts() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let doc = c.get(app.url("/api/data")).send().await?.json::<serde_json::Value>().await?;
    let t0 = doc["lastUpdated"].as_u64().unwrap();

    // Save with the matching base version.
    let mut edited = doc.clone();
    edited["notes"] = json!([{"id": "n1", "text": "first edit"}]);
    let res = c
        .post(app.url("/api/data"))
        .header("X-Base-Version", t0.to_string())
        .json(&edited)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    let t1 = body["timestamp"].as_u64().unwrap();
    assert!(t1 > t0);

    // A second writer still holding t0 gets a 409 with the server document.
    let mut other = doc.clone();
    other["notes"] = json!([{"id": "n2", "text": "second edit"}]);
    let res = c
        .post(app.url("/api/data"))
        .header("X-Base-Version", t0.to_string())
        .json(&other)
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CONFLICT);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["serverData"]["lastUpdated"].as_u64(), Some(t1));
    assert_eq!(body["serverData"]["notes"][0]["text"], "first edit");

    // The rejected write did not alter the store.
    let stored = c.get(app.url("/api/data")).send().await?.json::<serde_json::Value>().await?;
    assert_eq!(stored["notes"][0]["text"], "first edit");
    assert_eq!(stored["lastUpdated"].as_u64(), Some(t1));

    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}

#[tokio::test]
async fn e2e_force_token_overwrites() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c
        .post(app.url("/api/data"))
        .header("X-Base-Version", "force")
        .json(&json!({"notes": ["forced"], "users": []}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let stored = c.get(app.url("/api/data")).send().await?.json::<serde_json::Value>().await?;
    assert_eq!(stored["notes"][0], "forced");
    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}

#[tokio::test]
async fn e2e_write_without_base_version_wins() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c
        .post(app.url("/api/data"))
        .json(&json!({"notes": ["no header"]}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    // The headerless write replaced the seeded document.
    let stored = c.get(app.url("/api/data")).send().await?.json::<serde_json::Value>().await?;
    assert_eq!(stored["notes"][0], "no header");

    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}

#[tokio::test]
async fn e2e_empty_base_version_header_wins() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    let res = c
        .post(app.url("/api/data"))
        .header("X-Base-Version", "")
        .json(&json!({"notes": ["empty header"]}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let stored = c.get(app.url("/api/data")).send().await?.json::<serde_json::Value>().await?;
    assert_eq!(stored["notes"][0], "empty header");

    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}

#[tokio::test]
async fn e2e_config_path_roundtrip_and_reseed() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    // Default path is reported before any reconfiguration.
    let body = c
        .get(app.url("/api/config/db-path"))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert!(body["path"].as_str().unwrap().ends_with("db.json"));

    // Leave a marker in the old store so we can tell the documents apart.
    c.post(app.url("/api/data"))
        .json(&json!({"notes": ["old location"]}))
        .send()
        .await?;

    // Repoint to a fresh location.
    let new_store = app.data_dir.join("moved").join("db.json");
    let res = c
        .post(app.url("/api/config/db-path"))
        .json(&json!({"path": new_store.to_str().unwrap()}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["path"].as_str().unwrap(), new_store.to_str().unwrap());

    let body = c
        .get(app.url("/api/config/db-path"))
        .send()
        .await?
        .json::<serde_json::Value>()
        .await?;
    assert_eq!(body["path"].as_str().unwrap(), new_store.to_str().unwrap());

    // The new location was seeded with the default document, not the old data.
    let doc = c.get(app.url("/api/data")).send().await?.json::<serde_json::Value>().await?;
    assert_eq!(doc["users"][0]["uid"], "Admin");
    assert!(doc["notes"].as_array().unwrap().is_empty());

    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}

#[tokio::test]
async fn e2e_config_path_missing_is_bad_request() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = client();

    for body in [json!({}), json!({"path": ""})] {
        let res = c
            .post(app.url("/api/config/db-path"))
            .json(&body)
            .send()
            .await?;
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["error"], "Path required");
    }
    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}

#[tokio::test]
async fn e2e_root_serves_notice_without_frontend() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = client().get(app.url("/")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let text = res.text().await?;
    assert!(text.contains("Frontend not built"));
    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}

#[tokio::test]
async fn e2e_spa_fallback_serves_index_for_client_routes() -> anyhow::Result<()> {
    let app = start_server().await?;
    let assets = app.data_dir.join("dist");
    tokio::fs::create_dir_all(&assets).await?;
    tokio::fs::write(assets.join("index.html"), b"<html><body>workboard</body></html>").await?;

    // Unknown non-API path falls back to index.html for client-side routing.
    let res = client().get(app.url("/teams/42")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let text = res.text().await?;
    assert!(text.contains("workboard"));

    let _ = tokio::fs::remove_dir_all(&app.data_dir).await;
    Ok(())
}
