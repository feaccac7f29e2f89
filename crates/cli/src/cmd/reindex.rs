//! Reindex command implementation.

use std::path::Path;

use backref_core::index::{IndexStats, RebuildMode};

use super::open_session;

/// Run the reindex command.
pub fn run(config: Option<&Path>, profile: Option<&str>, verbose: bool) {
    let mut session = open_session(config, profile);

    if !session.engine.settings().enabled {
        println!("Indexing is disabled ([references] enabled = false); nothing to do.");
        return;
    }

    println!("Indexing vault: {}", session.config.vault_root.display());
    let stats = session.engine.rebuild_index(RebuildMode::Full);

    println!();
    println!("Indexing complete:");
    print_stats(&stats, verbose);
}

pub fn print_stats(stats: &IndexStats, verbose: bool) {
    println!("  Sources:        {}", stats.sources_seen);
    println!("  References:     {}", stats.records_indexed);
    if stats.records_excluded > 0 {
        println!("  Excluded:       {}", stats.records_excluded);
    }
    println!("  Targets:        {}", stats.groups);
    if verbose {
        println!("  Occurrences:    {}", stats.occurrences);
        println!("  Rescanned:      {}", stats.sources_rescanned);
        println!("  Unchanged:      {}", stats.sources_unchanged);
        println!("  Removed:        {}", stats.sources_removed);
        println!(
            "  Resolutions:    {} hits, {} misses",
            stats.resolution_hits, stats.resolution_misses
        );
        println!("  Dropped (from excluded folders): {}", stats.dropped_from_excluded_source);
        println!("  Dropped (to excluded folders):   {}", stats.dropped_to_excluded_target);
        if stats.lookup_inconsistencies > 0 {
            println!("  Inconsistent:   {}", stats.lookup_inconsistencies);
        }
    }
    println!("  Duration:       {}ms", stats.duration_ms);
}
