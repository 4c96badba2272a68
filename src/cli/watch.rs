//! `packtag watch`: keep rendered bundles current until Ctrl+C.
//!
//! The engine is built with file watching enabled. When a dependent file
//! changes, the cache evicts the entry and the engine re-renders it; the
//! hook registered here only reports the outcome. With `[cache] ttl_secs`
//! set, both caches are swept once per TTL so idle entries expire without
//! waiting for a lookup.

use std::sync::{Arc, Weak};
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::{self, RecvTimeoutError};

use packtag::cache::{BundleCache, CacheScope, Eviction};
use packtag::config::PacktagConfig;
use packtag::{Engine, debug, log, logger};

use super::BuildArgs;
use super::build::{build_bundles, engine, report};

pub fn run(config: &PacktagConfig, args: &BuildArgs) -> Result<()> {
    let engine = engine(config, args, true)?;
    let rendered = build_bundles(config, &engine)?;
    report(&rendered, args.json)?;

    let named = engine.cache(CacheScope::Named);
    let cache = Arc::downgrade(named);
    named.on_evict(Arc::new(move |eviction: &Eviction| report_eviction(&cache, eviction)));

    let (tx, rx) = channel::bounded(1);
    ctrlc::set_handler(move || {
        let _ = tx.try_send(());
    })
    .context("failed to set Ctrl+C handler")?;

    log!("watch"; "watching {} bundle{} (Ctrl+C to stop)",
        rendered.len(), if rendered.len() == 1 { "" } else { "s" });
    match sweep_interval(config) {
        Some(interval) => loop {
            match rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => sweep(&engine),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        },
        None => {
            rx.recv().ok();
        }
    }
    log!("watch"; "stopped");
    Ok(())
}

/// How often to sweep for expired entries; `None` without a TTL.
fn sweep_interval(config: &PacktagConfig) -> Option<Duration> {
    let ttl = config.cache.ttl();
    (!ttl.is_zero()).then_some(ttl)
}

fn sweep(engine: &Engine) {
    let evicted = engine.cache(CacheScope::Default).sweep() + engine.cache(CacheScope::Named).sweep();
    if evicted > 0 {
        debug!("watch"; "swept {} stale entr{}", evicted, if evicted == 1 { "y" } else { "ies" });
    }
}

/// Runs after the engine's own re-render hook, so a present entry is fresh.
fn report_eviction(cache: &Weak<dyn BundleCache>, eviction: &Eviction) {
    if !eviction.reason.should_rerender() {
        return;
    }
    let Some(cache) = cache.upgrade() else {
        return;
    };
    match cache.get(&eviction.key) {
        Some(entry) => logger::status_success(&format!(
            "re-rendered {}: {}",
            eviction.key,
            entry.result.tag.trim_end()
        )),
        None => logger::status_error(
            &format!("re-render failed: {}", eviction.key),
            "previous output left in place",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_interval_follows_ttl() {
        let mut config = PacktagConfig::from_str("").unwrap();
        assert_eq!(sweep_interval(&config), None);

        config.cache.ttl_secs = 30;
        assert_eq!(sweep_interval(&config), Some(Duration::from_secs(30)));
    }
}
