//! Provider payload → `PurchaseIntent`. Pure functions over deserialized
//! payloads so every mapping rule is unit-testable without HTTP or a
//! signature fixture. Signature verification happens before any of this
//! runs, in the webhook adapters.

use {
    crate::domain::{
        error::PipelineError,
        ids::{ExternalRef, ProductRef},
        intent::{Provider, PurchaseIntent, PurchaseIntentParams},
        money::{Currency, Money, MoneyAmount},
    },
    serde::Deserialize,
    std::collections::HashMap,
    uuid::Uuid,
};

/// Gumroad permalink key → canonical product slug. Unmapped keys pass
/// through unchanged.
const PRODUCT_ALIASES: &[(&str, &str)] = &[
    ("tf-test", "saas-landing"),
    ("saas-landing", "saas-landing"),
    ("portfolio", "portfolio"),
    ("restaurant", "restaurant"),
];

pub fn canonical_slug(permalink_key: &str) -> &str {
    PRODUCT_ALIASES
        .iter()
        .find(|(from, _)| *from == permalink_key)
        .map(|(_, to)| *to)
        .unwrap_or(permalink_key)
}

/// Reduce a permalink to its key: final path segment, query string stripped.
/// Handles both full URLs (`https://gumroad.com/l/saas-landing?wanted=true`)
/// and short forms (`tf-test`).
pub fn permalink_key(raw: &str) -> &str {
    let last = raw.rsplit('/').next().unwrap_or(raw);
    last.split('?').next().unwrap_or(last)
}

/// The slice of a `checkout.session.completed` object this pipeline reads.
#[derive(Debug, Deserialize)]
pub struct CheckoutSessionPayload {
    pub id: String,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
}

/// The slice of a `payment_intent.succeeded` object this pipeline reads.
#[derive(Debug, Deserialize)]
pub struct PaymentIntentPayload {
    pub id: String,
    pub amount: i64,
    pub currency: Option<String>,
    pub receipt_email: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

pub fn from_checkout_session(
    session: &CheckoutSessionPayload,
) -> Result<PurchaseIntent, PipelineError> {
    let metadata = session.metadata.clone().unwrap_or_default();
    let buyer_email = session
        .customer_details
        .as_ref()
        .and_then(|d| d.email.clone())
        .or_else(|| session.customer_email.clone());

    Ok(PurchaseIntent::new(PurchaseIntentParams {
        provider: Provider::StripeCheckout,
        external_ref: ExternalRef::new(&session.id)?,
        buyer_email,
        money: Money::new(
            MoneyAmount::new(session.amount_total.unwrap_or(0))?,
            currency_or_usd(session.currency.as_deref())?,
        ),
        product_refs: parse_template_ids(&metadata)?,
        internal_user_id: metadata_user_id(&metadata),
    }))
}

pub fn from_payment_intent(pi: &PaymentIntentPayload) -> Result<PurchaseIntent, PipelineError> {
    let metadata = pi.metadata.clone().unwrap_or_default();
    let buyer_email = pi
        .receipt_email
        .clone()
        .or_else(|| metadata.get("email").cloned());

    Ok(PurchaseIntent::new(PurchaseIntentParams {
        provider: Provider::StripePaymentIntent,
        external_ref: ExternalRef::new(&pi.id)?,
        buyer_email,
        money: Money::new(
            MoneyAmount::new(pi.amount)?,
            currency_or_usd(pi.currency.as_deref())?,
        ),
        product_refs: parse_template_ids(&metadata)?,
        internal_user_id: metadata_user_id(&metadata),
    }))
}

/// Gumroad sale ping. Fields arrive flat, as form or JSON, with numbers
/// sometimes encoded as strings — hence the untyped `Value` input.
pub fn from_gumroad_sale(fields: &serde_json::Value) -> Result<PurchaseIntent, PipelineError> {
    let sale_id = non_empty_str(fields, "sale_id")
        .ok_or_else(|| PipelineError::Normalization("missing sale_id".to_string()))?;

    let email = non_empty_str(fields, "email")
        .ok_or_else(|| PipelineError::Normalization("missing buyer email".to_string()))?;

    // Short id wins over the full permalink when both are present.
    let raw_permalink = non_empty_str(fields, "short_product_id")
        .or_else(|| non_empty_str(fields, "product_permalink"))
        .unwrap_or("");
    let slug = canonical_slug(permalink_key(raw_permalink));
    let product_refs = match ProductRef::new(slug) {
        Ok(r) => vec![r],
        Err(_) => Vec::new(), // no permalink at all — intent falls back to placeholder
    };

    let currency = currency_or_usd(non_empty_str(fields, "currency"))?;
    let amount = MoneyAmount::new(price_minor_units(fields.get("price"))?)?;

    Ok(PurchaseIntent::new(PurchaseIntentParams {
        provider: Provider::Gumroad,
        external_ref: ExternalRef::new(sale_id)?,
        buyer_email: Some(email.to_string()),
        money: Money::new(amount, currency),
        product_refs,
        internal_user_id: None,
    }))
}

fn non_empty_str<'a>(fields: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    fields
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Gumroad sends `price` in minor units, as a number or a numeric string.
/// Absent price means a free/comped sale and records as zero.
fn price_minor_units(price: Option<&serde_json::Value>) -> Result<i64, PipelineError> {
    let Some(price) = price else { return Ok(0) };
    match price {
        serde_json::Value::Null => Ok(0),
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .ok_or_else(|| PipelineError::Normalization(format!("unusable price: {n}"))),
        serde_json::Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(0);
            }
            s.parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|f| f.round() as i64))
                .map_err(|_| PipelineError::Normalization(format!("unparsable price: {s}")))
        }
        other => Err(PipelineError::Normalization(format!(
            "unexpected price shape: {other}"
        ))),
    }
}

fn currency_or_usd(code: Option<&str>) -> Result<Currency, PipelineError> {
    match code {
        Some(c) => Currency::new(c),
        None => Ok(Currency::usd()),
    }
}

/// `metadata.template_ids` is a JSON-encoded array of slugs. Present but
/// unparsable is a normalization failure (the provider will retry); absent
/// is fine and degrades to the placeholder reference downstream.
fn parse_template_ids(
    metadata: &HashMap<String, String>,
) -> Result<Vec<ProductRef>, PipelineError> {
    let Some(raw) = metadata.get("template_ids") else {
        return Ok(Vec::new());
    };
    let ids: Vec<String> = serde_json::from_str(raw).map_err(|e| {
        PipelineError::Normalization(format!("template_ids is not a JSON string array: {e}"))
    })?;
    ids.into_iter().map(ProductRef::new).collect()
}

fn metadata_user_id(metadata: &HashMap<String, String>) -> Option<Uuid> {
    let raw = metadata.get("user_id")?;
    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(_) => {
            tracing::warn!(user_id = %raw, "metadata.user_id is not a UUID, ignoring");
            None
        }
    }
}
