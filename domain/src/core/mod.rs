//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: identifier of the endpoint under test
//! - [`error::DomainError`]: domain-level errors
//! - [`string::condense_detail`]: UTF-8 safe condensing of vendor error text

pub mod error;
pub mod model;
pub mod string;
