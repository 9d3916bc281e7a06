use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError};

/// Install the global tracing subscriber.
///
/// Prefers `RUST_LOG` when set; otherwise `info`. Ex:
/// RUST_LOG=info,jwt_guard=debug
pub fn init_tracing() -> Result<(), TryInitError> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
