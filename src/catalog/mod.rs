//! Admin-side catalog management: validation and CRUD over `products`.

pub mod service;

pub use service::{validate, ProductAdmin};
