// Copyright (c) OpenGradient Contributors
// SPDX-License-Identifier: Apache-2.0

use std::sync::Once;

use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

static INIT: Once = Once::new();

/// Filter used when neither `RUST_LOG` nor the caller asks for anything else.
pub const DEFAULT_FILTER: &str = "warn,sdk=info";

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(default_filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    })
}

/// Installs a stderr subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter`. Only the first call in a process has any effect.
pub fn init_logging(default_filter: &str) {
    INIT.call_once(|| {
        let subscriber = Registry::default().with(env_filter(default_filter)).with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        );

        // Ignore error if a global default subscriber has already been set
        // (e.g., by a previous test in the same process).
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_logging("debug");
        init_logging("trace");
        tracing::info!("logging initialized twice without panicking");
    }

    #[test]
    fn malformed_filter_falls_back() {
        let filter = env_filter("sdk=[[[");
        assert!(!filter.to_string().is_empty());
    }
}
