//! Catalog storefront API: paginated product feed with infinite-scroll
//! semantics, best-effort click analytics, and an admin surface for
//! catalog management.

pub mod auth;
pub mod catalog;
pub mod clicks;
pub mod config;
pub mod context;
pub mod error;
pub mod feed;
pub mod filter;
pub mod gateway;
pub mod handlers;
pub mod middleware;
