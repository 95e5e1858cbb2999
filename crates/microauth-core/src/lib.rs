//! microauth core: domain models, repository traits and the shared
//! error taxonomy.

pub mod error;
pub mod models;
pub mod notify;
pub mod repository;
