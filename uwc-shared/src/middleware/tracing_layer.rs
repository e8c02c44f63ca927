use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// `UWC_LOG_FORMAT` wins; otherwise `UWC_ENV=production` selects JSON.
    pub fn from_env() -> Self {
        let explicit = std::env::var("UWC_LOG_FORMAT").ok();
        let env = std::env::var("UWC_ENV").ok();
        Self::resolve(explicit.as_deref(), env.as_deref())
    }

    fn resolve(explicit: Option<&str>, env: Option<&str>) -> Self {
        match explicit.map(str::to_ascii_lowercase).as_deref() {
            Some("json") => LogFormat::Json,
            Some("pretty") | Some("text") => LogFormat::Pretty,
            _ if env == Some("production") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Filter used when `RUST_LOG` is unset: debug for the service's own crate.
fn default_directives(service_name: &str) -> String {
    let crate_target = service_name.replace('-', "_");
    format!("info,{crate_target}=debug,uwc_shared=debug,tower_http=debug")
}

pub fn try_init_tracing(service_name: &str, format: LogFormat) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(service_name)));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init()?,
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()?,
    }

    tracing::info!(service = service_name, ?format, "tracing initialized");
    Ok(())
}

/// Installs the global subscriber. A second call only logs a warning.
pub fn init_tracing(service_name: &str) {
    if let Err(e) = try_init_tracing(service_name, LogFormat::from_env()) {
        tracing::warn!(error = %e, "tracing already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_format_overrides_environment() {
        assert_eq!(LogFormat::resolve(Some("JSON"), None), LogFormat::Json);
        assert_eq!(LogFormat::resolve(Some("pretty"), Some("production")), LogFormat::Pretty);
    }

    #[test]
    fn production_defaults_to_json() {
        assert_eq!(LogFormat::resolve(None, Some("production")), LogFormat::Json);
        assert_eq!(LogFormat::resolve(None, Some("staging")), LogFormat::Pretty);
        assert_eq!(LogFormat::resolve(Some("yaml"), None), LogFormat::Pretty);
    }

    #[test]
    fn directives_use_crate_target() {
        assert_eq!(
            default_directives("uwc-api"),
            "info,uwc_api=debug,uwc_shared=debug,tower_http=debug"
        );
    }
}
