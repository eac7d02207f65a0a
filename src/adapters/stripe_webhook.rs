use {
    crate::{
        AppState,
        adapters::api_errors::ApiError,
        domain::error::PipelineError,
        services::{
            normalize::{self, CheckoutSessionPayload, PaymentIntentPayload},
            purchase_pipeline::process_notification,
        },
    },
    axum::{Json, extract::State, http::HeaderMap},
};

/// Authenticate the raw body against the `Stripe-Signature` header. Takes
/// the body exactly as received — any re-encoding upstream would invalidate
/// the HMAC, which is why the handler extracts `String`, not `Json`.
fn verify(
    body: &str,
    headers: &HeaderMap,
    secret: &str,
) -> Result<stripe::Event, PipelineError> {
    let sig = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| PipelineError::WebhookSignature("missing Stripe-Signature header".into()))?;

    stripe::Webhook::construct_event(body, sig, secret)
        .map_err(|e| PipelineError::WebhookSignature(e.to_string()))
}

#[tracing::instrument(
    name = "stripe_webhook",
    skip_all,
    fields(event_id = tracing::field::Empty, event_type = tracing::field::Empty)
)]
pub async fn stripe_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<serde_json::Value>, ApiError> {
    let event = verify(&body, &headers, &state.stripe_webhook_secret)?;

    let event_id = event.id.to_string();
    let raw_event: serde_json::Value = serde_json::from_str(&body).map_err(PipelineError::from)?;
    let event_type = raw_event
        .get("type")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    // Add event context to the span so all subsequent logs are correlated.
    tracing::Span::current()
        .record("event_id", tracing::field::display(&event_id))
        .record("event_type", tracing::field::display(&event_type));

    let object = raw_event
        .get("data")
        .and_then(|d| d.get("object"))
        .cloned()
        .unwrap_or(serde_json::Value::Null);

    let intent = match event_type.as_str() {
        "checkout.session.completed" => {
            let session: CheckoutSessionPayload =
                serde_json::from_value(object).map_err(PipelineError::from)?;
            normalize::from_checkout_session(&session)?
        }
        "payment_intent.succeeded" => {
            let pi: PaymentIntentPayload =
                serde_json::from_value(object).map_err(PipelineError::from)?;
            normalize::from_payment_intent(&pi)?
        }
        // Event types we don't care about are acknowledged so Stripe stops
        // redelivering them.
        _ => {
            tracing::info!("unhandled event type, acknowledging");
            return Ok(Json(serde_json::json!({"received": true})));
        }
    };

    let outcome = process_notification(
        &state.pool,
        state.directory.as_ref(),
        state.catalog.as_ref(),
        state.lookup_timeout,
        intent,
    )
    .await?;

    tracing::info!(
        created = outcome.created(),
        duplicates = outcome.duplicates(),
        "event processed"
    );

    Ok(Json(serde_json::json!({
        "received": true,
        "processed": true,
        "created": outcome.created(),
        "duplicates": outcome.duplicates(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use axum::response::IntoResponse;

    const SECRET: &str = "whsec_test_secret";

    fn event_body() -> String {
        serde_json::json!({
            "id": "evt_1",
            "object": "event",
            "type": "checkout.session.completed",
            "data": { "object": { "id": "cs_1" } }
        })
        .to_string()
    }

    #[test]
    fn missing_signature_header_is_rejected() {
        let err = verify(&event_body(), &HeaderMap::new(), SECRET).unwrap_err();
        assert!(matches!(err, PipelineError::WebhookSignature(_)), "{err:?}");
    }

    #[test]
    fn garbage_signature_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Stripe-Signature",
            HeaderValue::from_static("t=1700000000,v1=deadbeef"),
        );
        let err = verify(&event_body(), &headers, SECRET).unwrap_err();
        assert!(matches!(err, PipelineError::WebhookSignature(_)), "{err:?}");
    }

    #[test]
    fn malformed_signature_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("Stripe-Signature", HeaderValue::from_static("not-a-sig"));
        let err = verify(&event_body(), &headers, SECRET).unwrap_err();
        assert!(matches!(err, PipelineError::WebhookSignature(_)), "{err:?}");
    }

    #[test]
    fn signature_rejection_maps_to_400() {
        let err = PipelineError::WebhookSignature("bad signature".to_string());
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
