use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    extract::{rejection::JsonRejection, Extension, Json},
    response::Json as RespJson,
};
use tracing::{debug, info};

use crate::errors::ApiError;
use crate::model::user::{SubmitFormRequest, UserResponse};
use crate::store::UserStore;

pub type SharedStore = Arc<dyn UserStore>;

// Create users router
pub fn users_router() -> Router {
    Router::new()
        .route("/fetch-users", get(fetch_users))  // GET /fetch-users
        .route("/submit-form", post(submit_form)) // POST /submit-form
}

// List every stored user
async fn fetch_users(
    Extension(store): Extension<SharedStore>,
) -> Result<RespJson<Vec<UserResponse>>, ApiError> {
    let rows = store.list_users().await?;
    debug!("🔧 Fetched {} users", rows.len());

    Ok(RespJson(rows.into_iter().map(UserResponse::from).collect()))
}

// Validate the form payload and insert it
async fn submit_form(
    Extension(store): Extension<SharedStore>,
    payload: Result<Json<SubmitFormRequest>, JsonRejection>,
) -> Result<RespJson<serde_json::Value>, ApiError> {
    let Json(request) = payload?;
    let user = request.validate()?;

    store.insert_user(&user).await?;

    info!("✅ User inserted");
    debug!("🔧 Inserted user with email {}", user.email);
    Ok(RespJson(serde_json::json!({
        "message": "Data inserted successfully"
    })))
}
