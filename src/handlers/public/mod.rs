pub mod clicks;
pub mod products;
