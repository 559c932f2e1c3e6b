use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "mortydex_cache_hit_total",
            Unit::Count,
            "Fresh cache hits, labeled by store."
        );
        describe_counter!(
            "mortydex_cache_miss_total",
            Unit::Count,
            "Cache misses (including logically expired entries), labeled by store."
        );
        describe_counter!(
            "mortydex_cache_stale_hit_total",
            Unit::Count,
            "Stale entries served on the degraded fallback path, labeled by store."
        );
        describe_counter!(
            "mortydex_cache_evict_total",
            Unit::Count,
            "Entries displaced by LRU capacity, labeled by store."
        );
        describe_counter!(
            "mortydex_upstream_fetch_total",
            Unit::Count,
            "Upstream API calls, labeled by outcome."
        );
    });
}
