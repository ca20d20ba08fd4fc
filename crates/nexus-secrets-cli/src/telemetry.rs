use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr log subscriber. An explicit `level` wins over `RUST_LOG`;
/// without either only warnings and errors are shown.
pub fn init(level: Option<&str>) -> anyhow::Result<()> {
    let env_filter = match level {
        Some(level) => {
            EnvFilter::try_new(level).with_context(|| format!("invalid log filter `{level}`"))?
        }
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .ok();

    Ok(())
}
