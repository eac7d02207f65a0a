use {
    super::error::PipelineError,
    super::ids::{ExternalRef, ProductRef},
    super::money::Money,
    serde::{Deserialize, Serialize},
    std::fmt,
    uuid::Uuid,
};

/// Which provider flow produced a notification. Adding a provider means
/// adding a variant here plus one normalization function — the rest of the
/// pipeline is provider-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    StripeCheckout,
    StripePaymentIntent,
    Gumroad,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StripeCheckout => "stripe_checkout",
            Self::StripePaymentIntent => "stripe_payment_intent",
            Self::Gumroad => "gumroad",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Provider {
    type Error = PipelineError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "stripe_checkout" => Ok(Self::StripeCheckout),
            "stripe_payment_intent" => Ok(Self::StripePaymentIntent),
            "gumroad" => Ok(Self::Gumroad),
            other => Err(PipelineError::Validation(format!(
                "unknown provider: {other}"
            ))),
        }
    }
}

pub struct PurchaseIntentParams {
    pub provider: Provider,
    pub external_ref: ExternalRef,
    pub buyer_email: Option<String>,
    pub money: Money,
    pub product_refs: Vec<ProductRef>,
    pub internal_user_id: Option<Uuid>,
}

/// Canonical purchase intent, one per notification. Invariants held by
/// construction: `external_ref` is never empty and `product_refs` has at
/// least one entry (a placeholder when the payload carried none).
#[derive(Debug, Clone)]
pub struct PurchaseIntent {
    provider: Provider,
    external_ref: ExternalRef,
    buyer_email: Option<String>,
    money: Money,
    product_refs: Vec<ProductRef>,
    internal_user_id: Option<Uuid>,
}

impl PurchaseIntent {
    pub fn new(params: PurchaseIntentParams) -> Self {
        let mut product_refs = params.product_refs;
        if product_refs.is_empty() {
            product_refs.push(ProductRef::placeholder());
        }
        Self {
            provider: params.provider,
            external_ref: params.external_ref,
            buyer_email: params.buyer_email,
            money: params.money,
            product_refs,
            internal_user_id: params.internal_user_id,
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn external_ref(&self) -> &ExternalRef {
        &self.external_ref
    }

    pub fn buyer_email(&self) -> Option<&str> {
        self.buyer_email.as_deref()
    }

    pub fn money(&self) -> &Money {
        &self.money
    }

    pub fn product_refs(&self) -> &[ProductRef] {
        &self.product_refs
    }

    pub fn internal_user_id(&self) -> Option<Uuid> {
        self.internal_user_id
    }
}

/// Outcome of resolving the buyer against the user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserResolution {
    /// Internal user id known, either carried in provider metadata or
    /// resolved by email lookup.
    Known(Uuid),
    /// Email present but no directory match (or the lookup timed out).
    /// Carries the email for observability.
    NotFound { email: String },
    /// Notification carried neither a user id nor an email.
    Anonymous,
}

impl UserResolution {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::Known(id) => Some(*id),
            Self::NotFound { .. } | Self::Anonymous => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedProduct {
    pub reference: ProductRef,
    /// None when the catalog has no match — the purchase is still recorded
    /// so revenue survives catalog lag.
    pub product_id: Option<Uuid>,
}

/// A `PurchaseIntent` after directory/catalog lookups.
#[derive(Debug, Clone)]
pub struct ResolvedIntent {
    pub intent: PurchaseIntent,
    pub user: UserResolution,
    pub products: Vec<ResolvedProduct>,
}
