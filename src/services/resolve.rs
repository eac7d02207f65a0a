//! Identity resolution: buyer email → internal user id, product reference →
//! internal product id. Read-only, degrades to "unresolved" on misses,
//! lookup errors, and timeouts — a notification is never failed here, so
//! revenue is recorded even when directory or catalog data lags.

use {
    crate::domain::{
        directory::{ProductCatalog, UserDirectory},
        intent::{PurchaseIntent, ResolvedIntent, ResolvedProduct, UserResolution},
    },
    std::time::Duration,
    tokio::time::timeout,
};

pub async fn resolve_intent(
    intent: PurchaseIntent,
    directory: &dyn UserDirectory,
    catalog: &dyn ProductCatalog,
    lookup_timeout: Duration,
) -> ResolvedIntent {
    // User and product lookups have no ordering dependency — run both arms
    // concurrently; the write step waits on the join.
    let (user, products) = tokio::join!(
        resolve_user(&intent, directory, lookup_timeout),
        resolve_products(&intent, catalog, lookup_timeout),
    );

    ResolvedIntent {
        intent,
        user,
        products,
    }
}

async fn resolve_user(
    intent: &PurchaseIntent,
    directory: &dyn UserDirectory,
    lookup_timeout: Duration,
) -> UserResolution {
    if let Some(id) = intent.internal_user_id() {
        return UserResolution::Known(id);
    }
    let Some(email) = intent.buyer_email() else {
        return UserResolution::Anonymous;
    };

    match timeout(lookup_timeout, directory.find_user_by_email(email)).await {
        Ok(Ok(Some(id))) => UserResolution::Known(id),
        Ok(Ok(None)) => {
            tracing::warn!(email = %email, "no directory match for buyer email");
            UserResolution::NotFound {
                email: email.to_string(),
            }
        }
        Ok(Err(e)) => {
            tracing::warn!(email = %email, error = %e, "user lookup failed, recording as unresolved");
            UserResolution::NotFound {
                email: email.to_string(),
            }
        }
        Err(_) => {
            tracing::warn!(email = %email, "user lookup timed out, recording as unresolved");
            UserResolution::NotFound {
                email: email.to_string(),
            }
        }
    }
}

async fn resolve_products(
    intent: &PurchaseIntent,
    catalog: &dyn ProductCatalog,
    lookup_timeout: Duration,
) -> Vec<ResolvedProduct> {
    let mut products = Vec::with_capacity(intent.product_refs().len());
    for reference in intent.product_refs() {
        let product_id = match timeout(
            lookup_timeout,
            catalog.find_product_by_slug(reference.as_str()),
        )
        .await
        {
            Ok(Ok(Some(id))) => Some(id),
            Ok(Ok(None)) => {
                tracing::warn!(slug = %reference, "no catalog match for product reference");
                None
            }
            Ok(Err(e)) => {
                tracing::warn!(slug = %reference, error = %e, "product lookup failed, recording as unresolved");
                None
            }
            Err(_) => {
                tracing::warn!(slug = %reference, "product lookup timed out, recording as unresolved");
                None
            }
        };
        products.push(ResolvedProduct {
            reference: reference.clone(),
            product_id,
        });
    }
    products
}
