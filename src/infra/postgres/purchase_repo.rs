use {
    crate::domain::error::PipelineError,
    crate::domain::purchase::{NewPurchase, Purchase, PurchaseStatus, RecordResult},
    sqlx::PgPool,
    uuid::Uuid,
};

/// Conditional insert keyed by (external_ref, product_ref). The insert is
/// the atomic dedup point: ON CONFLICT on the unique index, never an
/// application-level existence check before the write.
pub async fn insert_if_absent(
    pool: &PgPool,
    purchase: &NewPurchase,
) -> Result<RecordResult, PipelineError> {
    let inserted: Option<Uuid> = sqlx::query_scalar(
        r#"
        INSERT INTO purchases
            (id, user_id, product_id, product_ref, external_ref,
             provider, email, amount, currency, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (external_ref, product_ref) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(purchase.id())
    .bind(purchase.user_id())
    .bind(purchase.product_id())
    .bind(purchase.product_ref().as_str())
    .bind(purchase.external_ref().as_str())
    .bind(purchase.provider().as_str())
    .bind(purchase.email())
    .bind(purchase.money().amount().minor_units())
    .bind(purchase.money().currency().as_str())
    .bind(PurchaseStatus::Completed.as_str())
    .fetch_optional(pool)
    .await?;

    match inserted {
        Some(id) => Ok(RecordResult::Created(id)),
        None => {
            // Redelivery or a lost race — surface the row that won.
            let existing: Uuid = sqlx::query_scalar(
                "SELECT id FROM purchases WHERE external_ref = $1 AND product_ref = $2",
            )
            .bind(purchase.external_ref().as_str())
            .bind(purchase.product_ref().as_str())
            .fetch_one(pool)
            .await?;
            Ok(RecordResult::Existing(existing))
        }
    }
}

/// All rows recorded for one provider transaction.
pub async fn list_for_external_ref(
    pool: &PgPool,
    external_ref: &str,
) -> Result<Vec<Purchase>, PipelineError> {
    let rows = sqlx::query_as::<_, Purchase>(
        r#"
        SELECT id, user_id, product_id, product_ref, external_ref,
               provider, email, amount, currency, status, created_at
        FROM purchases
        WHERE external_ref = $1
        ORDER BY product_ref
        "#,
    )
    .bind(external_ref)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
