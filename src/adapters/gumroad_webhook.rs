use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::{error::PipelineError, intent::UserResolution},
        services::{normalize, purchase_pipeline::process_notification},
    },
    axum::{
        Json,
        extract::State,
        http::{HeaderMap, header::CONTENT_TYPE},
    },
};

/// Gumroad pings arrive as form-encoded or JSON bodies depending on the
/// resource-subscription configuration. Either way the fields are flat, so
/// both shapes collapse into one JSON object for the normalizer.
fn parse_ping_body(headers: &HeaderMap, body: &str) -> Result<serde_json::Value, PipelineError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.contains("json") {
        serde_json::from_str(body)
            .map_err(|e| PipelineError::Normalization(format!("invalid JSON body: {e}")))
    } else {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(body)
            .map_err(|e| PipelineError::Normalization(format!("invalid form body: {e}")))?;
        let map: serde_json::Map<String, serde_json::Value> = pairs
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();
        Ok(serde_json::Value::Object(map))
    }
}

/// Liveness probe; Gumroad's resource-subscription UI hits this.
pub async fn gumroad_status_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "Webhook endpoint active"}))
}

// Gumroad pings carry no signature — the request is accepted as authentic.
// This is a known trust gap of the provider's ping mechanism; restricting
// the route at the network layer is a deployment concern, not handled here.
#[tracing::instrument(
    name = "gumroad_webhook",
    skip_all,
    fields(sale_id = tracing::field::Empty)
)]
pub async fn gumroad_ping_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<serde_json::Value>, ApiError> {
    let fields = parse_ping_body(&headers, &body)?;
    let intent = normalize::from_gumroad_sale(&fields)?;

    tracing::Span::current().record(
        "sale_id",
        tracing::field::display(intent.external_ref().as_str()),
    );

    let sale_id = intent.external_ref().as_str().to_string();
    let slug = intent.product_refs()[0].as_str().to_string();

    let outcome = process_notification(
        &state.pool,
        state.directory.as_ref(),
        state.catalog.as_ref(),
        state.lookup_timeout,
        intent,
    )
    .await?;

    // Always 200 once the write went through — Gumroad should not retry a
    // sale whose buyer simply has no account yet. The purchase row is kept
    // with a null user_id so the revenue is not lost.
    match &outcome.user {
        UserResolution::Known(user_id) => Ok(Json(serde_json::json!({
            "success": true,
            "userId": user_id,
            "templateSlug": slug,
            "saleId": sale_id,
        }))),
        UserResolution::NotFound { email } => {
            tracing::info!(email = %email, "sale recorded without a matching user");
            Ok(Json(serde_json::json!({
                "success": false,
                "error": "User not found",
                "email": email,
                "saleId": sale_id,
            })))
        }
        UserResolution::Anonymous => Ok(Json(serde_json::json!({
            "success": true,
            "templateSlug": slug,
            "saleId": sale_id,
        }))),
    }
}
