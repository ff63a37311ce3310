//! Process bootstrap: config loading, tracing setup and wiring.

pub mod config;
pub mod tracing;
pub mod wiring;

pub use config::load_config;
pub use tracing::init_tracing_subscriber;
pub use wiring::{default_data_dir, EventDelivery, WiringError, WiringResult, WizardRuntime};
