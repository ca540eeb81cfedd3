pub mod click_event;
pub mod product;

pub use click_event::{ClickActivity, ClickKind, NewClickEvent};
pub use product::{NewProduct, Product};
