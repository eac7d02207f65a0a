//! Postgres-backed implementations of the directory/catalog lookup
//! contracts. The tables belong to the surrounding application; this crate
//! only reads them.

use {
    crate::domain::directory::{LookupFuture, ProductCatalog, UserDirectory},
    sqlx::PgPool,
    uuid::Uuid,
};

pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserDirectory for PgUserDirectory {
    fn find_user_by_email(&self, email: &str) -> LookupFuture<'_, Option<Uuid>> {
        let email = email.to_string();
        Box::pin(async move {
            let id = sqlx::query_scalar::<_, Uuid>(
                "SELECT id FROM app_users WHERE lower(email) = lower($1)",
            )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
            Ok(id)
        })
    }
}

pub struct PgProductCatalog {
    pool: PgPool,
}

impl PgProductCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ProductCatalog for PgProductCatalog {
    fn find_product_by_slug(&self, slug: &str) -> LookupFuture<'_, Option<Uuid>> {
        let slug = slug.to_string();
        Box::pin(async move {
            let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM templates WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;
            Ok(id)
        })
    }
}
