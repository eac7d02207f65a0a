pub mod api_errors;
pub mod gumroad_webhook;
pub mod stripe_webhook;
