pub mod adapters;
pub mod domain;
pub mod infra;
pub mod services;

use {
    crate::domain::directory::{ProductCatalog, UserDirectory},
    std::{sync::Arc, time::Duration},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub stripe_webhook_secret: Arc<str>,
    pub directory: Arc<dyn UserDirectory>,
    pub catalog: Arc<dyn ProductCatalog>,
    /// Bound on each directory/catalog lookup; a slow store degrades to an
    /// unresolved outcome instead of stalling the acknowledgement.
    pub lookup_timeout: Duration,
}
