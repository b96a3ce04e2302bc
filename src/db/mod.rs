pub mod items;
pub mod pool;

pub use items::{ItemStore, PgItemStore, ITEM_TABLE};
pub use pool::{create_pool, run_migrations};
