use {
    super::error::PipelineError,
    super::ids::{ExternalRef, ProductRef},
    super::intent::{Provider, ResolvedIntent, ResolvedProduct},
    super::money::Money,
    chrono::{DateTime, Utc},
    serde::Serialize,
    std::fmt,
    uuid::Uuid,
};

/// Purchases are write-once; `Completed` is the only reachable state in
/// current scope (refunds and chargebacks are out of scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    Completed,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for PurchaseStatus {
    type Error = PipelineError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "completed" => Ok(Self::Completed),
            other => Err(PipelineError::Validation(format!(
                "unknown purchase status: {other}"
            ))),
        }
    }
}

/// For INSERT — id generated in Rust via Uuid::now_v7().
#[derive(Debug, Clone)]
pub struct NewPurchase {
    id: Uuid,
    user_id: Option<Uuid>,
    product_id: Option<Uuid>,
    product_ref: ProductRef,
    external_ref: ExternalRef,
    provider: Provider,
    email: Option<String>,
    money: Money,
}

impl NewPurchase {
    pub fn from_resolved(resolved: &ResolvedIntent, product: &ResolvedProduct) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: resolved.user.user_id(),
            product_id: product.product_id,
            product_ref: product.reference.clone(),
            external_ref: resolved.intent.external_ref().clone(),
            provider: resolved.intent.provider(),
            email: resolved.intent.buyer_email().map(str::to_string),
            money: resolved.intent.money().clone(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    pub fn product_id(&self) -> Option<Uuid> {
        self.product_id
    }

    pub fn product_ref(&self) -> &ProductRef {
        &self.product_ref
    }

    pub fn external_ref(&self) -> &ExternalRef {
        &self.external_ref
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn money(&self) -> &Money {
        &self.money
    }
}

/// Full purchase row from DB (for reads).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Purchase {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub product_ref: String,
    pub external_ref: String,
    pub provider: String,
    pub email: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Result of the conditional insert on the natural key
/// (external_ref, product_ref).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordResult {
    /// New purchase row inserted.
    Created(Uuid),
    /// Natural key already present (redelivery or concurrent duplicate) —
    /// the existing row id, treated as success.
    Existing(Uuid),
}

impl RecordResult {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}
