pub mod normalize;
pub mod purchase_pipeline;
pub mod resolve;
