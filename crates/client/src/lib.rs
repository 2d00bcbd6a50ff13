//! Wiring for the shopkeep client: configuration, the capability bundle
//! handed to every pipeline, list loaders that turn failures into notices,
//! and checkout-to-invoice conversion.

pub mod checkout;
pub mod config;
pub mod context;
pub mod data;
pub mod presets;

pub use checkout::invoice_for_order;
pub use config::{ClientConfig, ConfigError, RemoteSettings};
pub use context::AppContext;
pub use data::{Loaded, Notice, NoticeLevel};
pub use shopkeep_catalog::WALK_IN_CUSTOMER;

/// Install tracing as configured.
pub fn init_logging(config: &ClientConfig) {
    shopkeep_observability::init(config.log_format);
}
