use {
    super::error::PipelineError,
    std::{future::Future, pin::Pin},
    uuid::Uuid,
};

pub type LookupFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, PipelineError>> + Send + 'a>>;

/// External user directory, consumed at its lookup contract only.
pub trait UserDirectory: Send + Sync {
    /// Exact, case-insensitive email match.
    fn find_user_by_email(&self, email: &str) -> LookupFuture<'_, Option<Uuid>>;
}

/// External product catalog, consumed at its lookup contract only.
pub trait ProductCatalog: Send + Sync {
    fn find_product_by_slug(&self, slug: &str) -> LookupFuture<'_, Option<Uuid>>;
}
