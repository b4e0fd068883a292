//! Process-wide `tracing` subscriber for hosts that embed the library.
//!
//! # Invariants
//! - The subscriber is installed at most once per process.
//! - Repeating the call with the same filter is a no-op success.
//! - A different filter after installation is rejected, never applied.
//! - Initialization never panics.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static ACTIVE_FILTER: OnceLock<String> = OnceLock::new();

/// Install a stderr `fmt` subscriber filtered by `filter` (an `EnvFilter`
/// directive such as `info` or `posts_core=debug`).
pub fn init_logging(filter: &str) -> Result<(), String> {
    let filter = filter.trim();
    let filter = if filter.is_empty() { "info" } else { filter };

    if let Some(active) = ACTIVE_FILTER.get() {
        if active == filter {
            return Ok(());
        }
        return Err(format!(
            "logging already initialized with `{active}`; refusing to switch to `{filter}`"
        ));
    }

    let env_filter =
        EnvFilter::try_new(filter).map_err(|err| format!("invalid log filter `{filter}`: {err}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| format!("failed to install subscriber: {err}"))?;

    let _ = ACTIVE_FILTER.set(filter.to_string());
    tracing::info!(
        filter,
        version = env!("CARGO_PKG_VERSION"),
        "posts-ffi logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::init_logging;

    #[test]
    fn init_is_idempotent_and_rejects_conflicts() {
        init_logging("warn").expect("first init should succeed");
        init_logging(" warn ").expect("same filter should be idempotent");

        let err = init_logging("debug").expect_err("different filter should fail");
        assert!(err.contains("refusing to switch"));
    }
}
