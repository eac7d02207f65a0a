pub mod directory_repo;
pub mod purchase_repo;
