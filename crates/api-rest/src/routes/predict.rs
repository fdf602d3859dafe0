use super::Reply;
use crate::body::Incoming;
use crate::error::{ApiError, ApiResult};
use crate::store::check_upload_size;
use crate::AppState;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use clinic_core::constants::{DEFAULT_TOP_K, MAX_TOP_K, PREDICT_PATH};
use std::collections::HashMap;

pub fn router() -> Router<AppState> {
    Router::new().route(PREDICT_PATH, post(predict))
}

/// `POST /retinal/predict?top_k=N` with a multipart `image` part.
#[axum::debug_handler(state = AppState)]
async fn predict(
    Query(params): Query<HashMap<String, String>>,
    body: Incoming,
) -> ApiResult<Reply> {
    let top_k = match params.get("top_k") {
        None => DEFAULT_TOP_K,
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|k| (1..=MAX_TOP_K).contains(k))
            .ok_or_else(|| {
                ApiError::bad_request(format!("`top_k` must be between 1 and {MAX_TOP_K}"))
            })?,
    };

    if let Some(name) = body.fields.keys().next() {
        return Err(ApiError::bad_request(format!("unknown field `{name}`")));
    }
    let mut images = body.uploads_named("image");
    let image = images
        .next()
        .ok_or_else(|| ApiError::bad_request("`image` file is required"))?;
    if images.next().is_some() {
        return Err(ApiError::bad_request("exactly one `image` file is expected"));
    }
    check_upload_size(image)?;
    if !infer::is_image(&image.bytes) {
        return Err(ApiError::bad_request(format!(
            "`{}` is not an image",
            image.file_name
        )));
    }

    let result = crate::predict::score(&image.bytes, top_k as usize);
    tracing::info!(top1 = %result.top1.label, top_k, "retinal prediction");
    let data = serde_json::to_value(&result)
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Reply::ok("Prediction complete", data))
}
