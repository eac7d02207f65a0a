mod common;

use common::*;
use purchase_sync::domain::intent::{Provider, UserResolution};
use purchase_sync::domain::purchase::PurchaseStatus;
use purchase_sync::infra::postgres::directory_repo::{PgProductCatalog, PgUserDirectory};
use purchase_sync::services::purchase_pipeline::process_notification;
use std::time::Duration;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

// ── 1. checkout with two templates → two rows, shared external_ref ─────────

#[tokio::test]
async fn checkout_two_templates_records_two_rows() {
    let pool = setup_pool("purchase_sync_test_pipeline").await;
    let user_id = seed_user(&pool, "a@b.com").await;
    let portfolio_id = seed_template(&pool, "portfolio").await;
    let restaurant_id = seed_template(&pool, "restaurant").await;

    let intent = make_intent(
        Provider::StripeCheckout,
        "cs_two_templates",
        Some("a@b.com"),
        &["portfolio", "restaurant"],
    );
    let outcome = process_notification(
        &pool,
        &PgUserDirectory::new(pool.clone()),
        &PgProductCatalog::new(pool.clone()),
        LOOKUP_TIMEOUT,
        intent,
    )
    .await
    .unwrap();

    assert_eq!(outcome.created(), 2);
    assert_eq!(outcome.duplicates(), 0);
    assert_eq!(outcome.user, UserResolution::Known(user_id));

    let row = get_purchase(&pool, "cs_two_templates", "portfolio")
        .await
        .unwrap();
    assert_eq!(row.amount, 4900);
    assert_eq!(row.currency, "usd");
    assert_eq!(row.user_id, Some(user_id));
    assert_eq!(row.product_id, Some(portfolio_id));
    assert_eq!(
        PurchaseStatus::try_from(row.status.as_str()).unwrap(),
        PurchaseStatus::Completed
    );
    assert_eq!(row.provider, "stripe_checkout");

    let row = get_purchase(&pool, "cs_two_templates", "restaurant")
        .await
        .unwrap();
    assert_eq!(row.product_id, Some(restaurant_id));
    assert_eq!(row.external_ref, "cs_two_templates");
}

// ── 2. whole-pipeline idempotence on redelivery ────────────────────────────

#[tokio::test]
async fn redelivery_creates_no_extra_rows() {
    let pool = setup_pool("purchase_sync_test_pipeline").await;
    seed_user(&pool, "b@b.com").await;
    seed_template(&pool, "portfolio").await;

    let directory = PgUserDirectory::new(pool.clone());
    let catalog = PgProductCatalog::new(pool.clone());

    let intent = make_intent(
        Provider::StripeCheckout,
        "cs_redelivery",
        Some("b@b.com"),
        &["portfolio", "restaurant"],
    );
    let first = process_notification(&pool, &directory, &catalog, LOOKUP_TIMEOUT, intent.clone())
        .await
        .unwrap();
    assert_eq!(first.created(), 2);

    let second = process_notification(&pool, &directory, &catalog, LOOKUP_TIMEOUT, intent)
        .await
        .unwrap();
    assert_eq!(second.created(), 0);
    assert_eq!(second.duplicates(), 2);

    assert_eq!(count_purchases(&pool, "cs_redelivery").await, 2);
}

// ── 3. unknown email → null user_id, still acknowledged ────────────────────

#[tokio::test]
async fn unknown_email_records_with_null_user() {
    let pool = setup_pool("purchase_sync_test_pipeline").await;
    seed_template(&pool, "portfolio").await;

    let intent = make_intent(
        Provider::Gumroad,
        "G_no_user",
        Some("ghost@nowhere.com"),
        &["portfolio"],
    );
    let outcome = process_notification(
        &pool,
        &PgUserDirectory::new(pool.clone()),
        &PgProductCatalog::new(pool.clone()),
        LOOKUP_TIMEOUT,
        intent,
    )
    .await
    .unwrap();

    assert_eq!(
        outcome.user,
        UserResolution::NotFound {
            email: "ghost@nowhere.com".to_string()
        }
    );
    assert_eq!(outcome.created(), 1);

    let row = get_purchase(&pool, "G_no_user", "portfolio").await.unwrap();
    assert_eq!(row.user_id, None);
    assert_eq!(row.email.as_deref(), Some("ghost@nowhere.com"));
}

// ── 4. email match is case-insensitive ─────────────────────────────────────

#[tokio::test]
async fn email_match_is_case_insensitive() {
    let pool = setup_pool("purchase_sync_test_pipeline").await;
    let user_id = seed_user(&pool, "Case@B.com").await;
    seed_template(&pool, "portfolio").await;

    let intent = make_intent(
        Provider::Gumroad,
        "G_case",
        Some("case@b.com"),
        &["portfolio"],
    );
    let outcome = process_notification(
        &pool,
        &PgUserDirectory::new(pool.clone()),
        &PgProductCatalog::new(pool.clone()),
        LOOKUP_TIMEOUT,
        intent,
    )
    .await
    .unwrap();

    assert_eq!(outcome.user, UserResolution::Known(user_id));
}

// ── 5. unknown product → row with null product_id ──────────────────────────

#[tokio::test]
async fn unknown_product_records_with_null_product_id() {
    let pool = setup_pool("purchase_sync_test_pipeline").await;
    let user_id = seed_user(&pool, "c@b.com").await;

    let intent = make_intent(
        Provider::Gumroad,
        "G_no_product",
        Some("c@b.com"),
        &["not-in-catalog"],
    );
    let outcome = process_notification(
        &pool,
        &PgUserDirectory::new(pool.clone()),
        &PgProductCatalog::new(pool.clone()),
        LOOKUP_TIMEOUT,
        intent,
    )
    .await
    .unwrap();

    assert_eq!(outcome.created(), 1);
    let row = get_purchase(&pool, "G_no_product", "not-in-catalog")
        .await
        .unwrap();
    assert_eq!(row.user_id, Some(user_id));
    assert_eq!(row.product_id, None);
}

// ── 6. metadata-carried user id skips the directory entirely ───────────────

#[tokio::test]
async fn carried_user_id_is_written_without_lookup() {
    let pool = setup_pool("purchase_sync_test_pipeline").await;
    seed_template(&pool, "portfolio").await;
    let carried = uuid::Uuid::now_v7(); // deliberately not present in app_users

    let intent =
        make_intent_with_user(Provider::StripeCheckout, "cs_carried", &["portfolio"], carried);
    let outcome = process_notification(
        &pool,
        &PgUserDirectory::new(pool.clone()),
        &PgProductCatalog::new(pool.clone()),
        LOOKUP_TIMEOUT,
        intent,
    )
    .await
    .unwrap();

    assert_eq!(outcome.user, UserResolution::Known(carried));
    let row = get_purchase(&pool, "cs_carried", "portfolio").await.unwrap();
    assert_eq!(row.user_id, Some(carried));
}

// ── 7. resolution partial failure never drops sibling products ─────────────

#[tokio::test]
async fn mixed_resolution_records_every_product() {
    let pool = setup_pool("purchase_sync_test_pipeline").await;
    seed_user(&pool, "d@b.com").await;
    let known_id = seed_template(&pool, "portfolio").await;

    let intent = make_intent(
        Provider::StripeCheckout,
        "cs_mixed",
        Some("d@b.com"),
        &["portfolio", "ghost-slug"],
    );
    let outcome = process_notification(
        &pool,
        &PgUserDirectory::new(pool.clone()),
        &PgProductCatalog::new(pool.clone()),
        LOOKUP_TIMEOUT,
        intent,
    )
    .await
    .unwrap();

    assert_eq!(outcome.created(), 2);
    let resolved = get_purchase(&pool, "cs_mixed", "portfolio").await.unwrap();
    assert_eq!(resolved.product_id, Some(known_id));
    let unresolved = get_purchase(&pool, "cs_mixed", "ghost-slug").await.unwrap();
    assert_eq!(unresolved.product_id, None);
}
