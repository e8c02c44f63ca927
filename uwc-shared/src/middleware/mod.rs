mod auth_extractor;
mod extractors;
mod tracing_layer;
mod metrics_layer;

pub use auth_extractor::*;
pub use extractors::*;
pub use tracing_layer::*;
pub use metrics_layer::*;
