//! Resolve → record orchestration, shared by both webhook adapters.

use {
    crate::domain::{
        directory::{ProductCatalog, UserDirectory},
        error::PipelineError,
        intent::{PurchaseIntent, ResolvedIntent, UserResolution},
        purchase::{NewPurchase, RecordResult},
    },
    crate::infra::postgres::purchase_repo,
    crate::services::resolve::resolve_intent,
    sqlx::PgPool,
    std::time::Duration,
};

#[derive(Debug)]
pub struct PipelineOutcome {
    pub user: UserResolution,
    pub results: Vec<RecordResult>,
}

impl PipelineOutcome {
    pub fn created(&self) -> usize {
        self.results.iter().filter(|r| r.is_created()).count()
    }

    pub fn duplicates(&self) -> usize {
        self.results.len() - self.created()
    }
}

/// Full core sequence for one verified, normalized notification.
pub async fn process_notification(
    pool: &PgPool,
    directory: &dyn UserDirectory,
    catalog: &dyn ProductCatalog,
    lookup_timeout: Duration,
    intent: PurchaseIntent,
) -> Result<PipelineOutcome, PipelineError> {
    let resolved = resolve_intent(intent, directory, catalog, lookup_timeout).await;
    let results = record_purchases(pool, &resolved).await?;
    Ok(PipelineOutcome {
        user: resolved.user,
        results,
    })
}

/// One conditional insert per product reference. The unique index on
/// (external_ref, product_ref) is the only dedup mechanism — no in-process
/// state, so concurrent handler instances (and other machines) stay correct.
/// A store error aborts the remaining refs; rows already inserted stay, and
/// the provider's retry will re-confirm them as Existing.
pub async fn record_purchases(
    pool: &PgPool,
    resolved: &ResolvedIntent,
) -> Result<Vec<RecordResult>, PipelineError> {
    let mut results = Vec::with_capacity(resolved.products.len());
    for product in &resolved.products {
        let purchase = NewPurchase::from_resolved(resolved, product);
        let result = purchase_repo::insert_if_absent(pool, &purchase).await?;
        match result {
            RecordResult::Created(id) => {
                tracing::info!(
                    purchase_id = %id,
                    external_ref = %purchase.external_ref(),
                    product_ref = %purchase.product_ref(),
                    amount = %purchase.money().amount().to_decimal_string(),
                    currency = %purchase.money().currency(),
                    "purchase recorded"
                );
            }
            RecordResult::Existing(id) => {
                tracing::info!(
                    purchase_id = %id,
                    external_ref = %purchase.external_ref(),
                    product_ref = %purchase.product_ref(),
                    "duplicate delivery, purchase already recorded"
                );
            }
        }
        results.push(result);
    }
    Ok(results)
}
