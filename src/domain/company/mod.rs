//! Company domain
//!
//! Companies are the top-level tenant; every team belongs to one.

mod entity;
mod repository;

pub use entity::{Company, CompanyId, NewCompany};
pub use repository::CompanyRepository;
