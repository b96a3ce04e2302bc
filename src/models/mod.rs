pub mod item;
pub mod item_id;
pub mod list_order;
pub mod update_field;

pub use item::*;
pub use item_id::*;
pub use list_order::*;
pub use update_field::*;
