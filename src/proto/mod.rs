// Message types are declared by hand with prost derives; the service stubs
// that reference them are generated by build.rs into OUT_DIR.

pub mod common;
pub mod health;
pub mod items;
