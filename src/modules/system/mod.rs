pub mod controller;
pub mod router;

pub use controller::Catalog;
pub use router::init_system_module;
