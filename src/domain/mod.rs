pub mod directory;
pub mod error;
pub mod ids;
pub mod intent;
pub mod money;
pub mod purchase;
