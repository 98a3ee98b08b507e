//! HTTP surface: router assembly, shared state, and the serve loop.

pub mod forms;
pub mod routes;

use crate::auth;
use crate::catalog::{AdminAccount, ContentPipeline, ContentRepository, FileStore};
use crate::config::{BootstrapAdmin, Config};
use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use rand::RngCore;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Per-file upload ceiling, enforced at the transport boundary.
const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub repo: ContentRepository,
    pub pipeline: ContentPipeline,
    pub secret: Arc<str>,
    pub public_url: Option<Arc<str>>,
}

pub fn build_state(config: &Config) -> Result<AppState> {
    let repo = ContentRepository::open(&config.database_path())?;
    bootstrap_admin(&repo, &config.bootstrap_admin)?;

    let upload_dir = config.upload_dir();
    std::fs::create_dir_all(&upload_dir)
        .with_context(|| format!("failed to create {}", upload_dir.display()))?;
    let store = FileStore::new(upload_dir.to_str().context("upload dir is not UTF-8")?);

    let secret: Arc<str> = match &config.jwt_secret {
        Some(secret) => Arc::from(secret.as_str()),
        None => {
            tracing::warn!(
                "no jwt_secret configured; using a random secret, tokens will not survive restarts"
            );
            Arc::from(random_hex(32).as_str())
        }
    };

    Ok(AppState {
        pipeline: ContentPipeline::new(repo.clone(), store),
        repo,
        secret,
        public_url: config.public_url.as_deref().map(Arc::from),
    })
}

/// Create the configured admin account when the admin table is empty.
fn bootstrap_admin(repo: &ContentRepository, bootstrap: &BootstrapAdmin) -> Result<()> {
    if repo.admin_count()? > 0 {
        return Ok(());
    }
    let password = match &bootstrap.password {
        Some(password) => password.clone(),
        None => {
            let generated = random_hex(12);
            tracing::warn!(
                username = %bootstrap.username,
                password = %generated,
                "created bootstrap admin with a generated password; change it"
            );
            generated
        }
    };
    repo.insert_admin(&AdminAccount {
        id: Uuid::new_v4().to_string(),
        username: bootstrap.username.clone(),
        password_hash: auth::hash_password(&password),
    })?;
    tracing::info!(username = %bootstrap.username, "bootstrap admin created");
    Ok(())
}

pub fn router(state: AppState) -> Router {
    let uploads_dir = state.pipeline.store().base_dir().to_path_buf();
    Router::new()
        .route("/admin/login", post(routes::login))
        .route("/admin/create", post(routes::create_admin))
        .route(
            "/videos",
            get(routes::list_content).post(routes::upload_content),
        )
        .route(
            "/videos/{id}",
            get(routes::get_content)
                .put(routes::update_content)
                .delete(routes::delete_content),
        )
        .route("/health", get(routes::health))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(config: Config) -> Result<()> {
    let state = build_state(&config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "reelroom listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
}

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    const BOUNDARY: &str = "reelroom-test-boundary";

    fn test_state(dir: &TempDir) -> AppState {
        let config = Config {
            data_dir: dir.path().to_str().unwrap().to_string(),
            jwt_secret: Some("test-secret".to_string()),
            bootstrap_admin: BootstrapAdmin {
                username: "admin".to_string(),
                password: Some("laksh".to_string()),
            },
            ..Config::default()
        };
        build_state(&config).unwrap()
    }

    fn multipart_body(fields: &[(&str, &str)]) -> Body {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        Body::from(body)
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(
                Request::post("/admin/login")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"username":"admin","password":"laksh"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_reports_status_and_timestamp() {
        let dir = TempDir::new().unwrap();
        let app = router(test_state(&dir));

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "Server is running");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn login_with_wrong_password_returns_401_and_no_token() {
        let dir = TempDir::new().unwrap();
        let app = router(test_state(&dir));

        let response = app
            .oneshot(
                Request::post("/admin/login")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"username":"admin","password":"wrong"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert!(body.get("token").is_none());
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn mutations_reject_anonymous_callers() {
        let dir = TempDir::new().unwrap();
        let app = router(test_state(&dir));

        let response = app
            .clone()
            .oneshot(
                Request::post("/videos")
                    .header(
                        CONTENT_TYPE,
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(multipart_body(&[("title", "Sneaky")]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(
                Request::delete("/videos/some-id")
                    .header(AUTHORIZATION, "Bearer not-a-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn blog_upload_lists_fetches_and_deletes() {
        let dir = TempDir::new().unwrap();
        let app = router(test_state(&dir));
        let token = login(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::post("/videos")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .header(
                        CONTENT_TYPE,
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(multipart_body(&[
                        ("title", "Border Patrol Report"),
                        ("type", "BLOG"),
                        ("category", "NEWS"),
                        ("blogContent", "Troops conducted..."),
                    ]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["type"], "BLOG");
        assert_eq!(created["category"], "NEWS");

        let response = app
            .clone()
            .oneshot(Request::get("/videos").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let listed = json_body(response).await;
        let items = listed.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], "Border Patrol Report");
        assert_eq!(items[0]["blogContent"], "Troops conducted...");
        assert!(items[0]["videoPath"].is_null());

        let response = app
            .clone()
            .oneshot(
                Request::delete(format!("/videos/{id}"))
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::get(format!("/videos/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn blog_upload_without_a_source_is_rejected() {
        let dir = TempDir::new().unwrap();
        let app = router(test_state(&dir));
        let token = login(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::post("/videos")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .header(
                        CONTENT_TYPE,
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(multipart_body(&[
                        ("title", "Empty Blog"),
                        ("type", "BLOG"),
                    ]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // Nothing was created.
        let response = app
            .oneshot(Request::get("/videos").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(json_body(response).await.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn asset_paths_are_rewritten_against_the_request_host() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        let app = router(state.clone());

        // Seed an item with a stored relative path, as the pipeline would.
        let item = crate::catalog::ContentItem {
            id: "vid-1".into(),
            title: "Clip".into(),
            description: None,
            blog_content: None,
            video_path: Some("videos/123-456.mp4".into()),
            thumbnail_path: None,
            kind: crate::catalog::ContentKind::Video,
            category: crate::catalog::Category::Technology,
            uploaded_by: None,
            created_at: chrono::Utc::now(),
        };
        state.repo.insert(&item).unwrap();

        let response = app
            .oneshot(
                Request::get("/videos/vid-1")
                    .header("host", "portal.example:5000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(
            body["videoPath"],
            "http://portal.example:5000/uploads/videos/123-456.mp4"
        );
        assert!(body["thumbnailPath"].is_null());
    }
}
