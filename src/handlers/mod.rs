//! HTTP handlers, split by access level: `public` routes are open to the
//! storefront, `admin` routes sit behind the bearer-token guard.

pub mod admin;
pub mod public;
