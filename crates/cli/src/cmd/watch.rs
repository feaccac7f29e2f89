//! Watch command: poll the vault and keep the index current.

use std::path::Path;
use std::thread;
use std::time::Duration;

use backref_core::index::RebuildMode;
use chrono::Local;
use color_eyre::eyre::{Result, WrapErr};

use super::open_session;
use crate::WatchArgs;

pub fn run(config: Option<&Path>, profile: Option<&str>, args: WatchArgs) -> Result<()> {
    let mut session = open_session(config, profile);
    let engine = &mut session.engine;

    let stats = engine.rebuild_index(RebuildMode::Full);
    println!(
        "[{}] indexed {} references to {} targets ({}ms)",
        Local::now().format("%H:%M:%S"),
        stats.records_indexed,
        stats.groups,
        stats.duration_ms
    );

    let interval = Duration::from_millis(args.interval_ms);
    let mut polls = 0u64;
    while args.iterations.is_none_or(|n| polls < n) {
        thread::sleep(interval);
        polls += 1;

        let refresh = engine
            .host_mut()
            .refresh()
            .wrap_err_with(|| format!("failed to rescan {}", session.config.vault_root.display()))?;
        if refresh.is_empty() {
            tracing::trace!(poll = polls, "no changes");
            continue;
        }

        let mode = refresh.rebuild_mode();
        let stats = engine.rebuild_index(mode);
        println!(
            "[{}] {} changed, {} added, {} removed: {mode} rebuild rescanned {} sources, {} references to {} targets ({}ms)",
            Local::now().format("%H:%M:%S"),
            refresh.changed,
            refresh.added,
            refresh.removed,
            stats.sources_rescanned,
            stats.records_indexed,
            stats.groups,
            stats.duration_ms
        );
    }

    Ok(())
}
