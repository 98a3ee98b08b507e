use super::forms;
use super::AppState;
use crate::auth::{self, AdminIdentity};
use crate::catalog::{AdminAccount, ContentItem, ListFilter, SortOrder};
use crate::error::ApiError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header::HOST;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// POST /admin/login
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<LoginResponse>, ApiError> {
    let admin = state
        .repo
        .find_admin(&credentials.username)?
        .ok_or_else(|| ApiError::unauthorized("Admin not found"))?;
    if !auth::verify_password(&credentials.password, &admin.password_hash) {
        return Err(ApiError::unauthorized("Wrong password"));
    }
    let token = auth::issue_token(&state.secret, &admin.id);
    tracing::info!(username = %admin.username, "admin logged in");
    Ok(Json(LoginResponse {
        token,
        username: admin.username,
    }))
}

/// POST /admin/create — any authenticated admin may add another.
pub async fn create_admin(
    State(state): State<AppState>,
    AdminIdentity(_caller): AdminIdentity,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if credentials.username.trim().is_empty() || credentials.password.is_empty() {
        return Err(ApiError::validation("Username and password are required"));
    }
    let admin = AdminAccount {
        id: Uuid::new_v4().to_string(),
        username: credentials.username,
        password_hash: auth::hash_password(&credentials.password),
    };
    state.repo.insert_admin(&admin)?;
    tracing::info!(username = %admin.username, "admin created");
    Ok((StatusCode::CREATED, Json(json!({ "message": "Admin created" }))))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub sort: Option<String>,
    pub date: Option<String>,
}

/// GET /videos — public catalog listing.
pub async fn list_content(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Json<Vec<ContentItem>>, ApiError> {
    let mut filter = ListFilter {
        category: params
            .category
            .filter(|c| !c.is_empty() && c.as_str() != "All"),
        day: None,
    };
    let mut sort = SortOrder::Latest;
    match params.sort.as_deref() {
        Some("oldest") => sort = SortOrder::Oldest,
        Some("date") => {
            filter.day = params
                .date
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        }
        _ => {}
    }

    let base = asset_base(&state, &headers);
    let items = state
        .repo
        .list(&filter, sort)?
        .into_iter()
        .map(|item| absolutize(item, &base))
        .collect();
    Ok(Json(items))
}

/// GET /videos/:id
pub async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ContentItem>, ApiError> {
    let item = state
        .repo
        .find_by_id(&id)?
        .ok_or_else(|| ApiError::not_found("Content not found"))?;
    let base = asset_base(&state, &headers);
    Ok(Json(absolutize(item, &base)))
}

/// POST /videos — authenticated multipart upload.
pub async fn upload_content(
    State(state): State<AppState>,
    AdminIdentity(admin_id): AdminIdentity,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ContentItem>), ApiError> {
    let form = forms::read_create(multipart).await?;
    let item = state.pipeline.create(&admin_id, form).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /videos/:id — authenticated partial update.
pub async fn update_content(
    State(state): State<AppState>,
    AdminIdentity(_admin_id): AdminIdentity,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ContentItem>, ApiError> {
    let patch = forms::read_patch(multipart).await?;
    let item = state.pipeline.update(&id, patch).await?;
    Ok(Json(item))
}

/// DELETE /videos/:id
pub async fn delete_content(
    State(state): State<AppState>,
    AdminIdentity(_admin_id): AdminIdentity,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.pipeline.delete(&id).await?;
    Ok(Json(json!({ "message": "Deleted successfully" })))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "Server is running", "timestamp": Utc::now() }))
}

/// Base URL for asset links: the configured public URL when set, else the
/// caller's Host header.
fn asset_base(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(url) = &state.public_url {
        return url.trim_end_matches('/').to_string();
    }
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}")
}

/// Rewrite stored relative paths into fully-qualified fetchable URLs.
/// Absent paths stay null.
fn absolutize(mut item: ContentItem, base: &str) -> ContentItem {
    item.video_path = item
        .video_path
        .map(|rel| format!("{base}/uploads/{rel}"));
    item.thumbnail_path = item
        .thumbnail_path
        .map(|rel| format!("{base}/uploads/{rel}"));
    item
}
