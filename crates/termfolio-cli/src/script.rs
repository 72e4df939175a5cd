use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::time::Instant;
use termfolio_core::{ConsoleConfig, MemoryGrid, RecordingHost, parse_key_script};
use termfolio_observe::Observer;

use crate::output::print_json;
use crate::{build_console, record_events};

#[derive(Debug, Serialize)]
struct ScriptReport<'a> {
    rows: Vec<String>,
    history: &'a [String],
    opened: &'a [String],
}

/// Plays a key script against an in-memory grid, fires every scheduled task
/// and prints what ended up on screen.
pub(crate) fn run_script(
    cfg: ConsoleConfig,
    observer: &Observer,
    source: &str,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let script = read_script(source)?;
    let keys = parse_key_script(&script).with_context(|| format!("invalid key script {source}"))?;
    observer.verbose_log(&format!("script {source}: {} keys", keys.len()));

    let grid = MemoryGrid::new(cfg.grid_width);
    let mut console = build_console(cfg, grid, RecordingHost::default(), seed);
    console.start();

    // Every key lands at the same instant; deferred opens fire at the end.
    let now = Instant::now();
    for key in keys {
        console.handle_key(key, now);
    }
    console.run_all_pending();
    record_events(&mut console, observer);

    let rows = console.surface().lines();
    if json {
        return print_json(&ScriptReport {
            rows,
            history: console.history().entries(),
            opened: &console.host().opened,
        });
    }
    for row in rows {
        println!("{row}");
    }
    Ok(())
}

fn read_script(source: &str) -> Result<String> {
    if source == "-" {
        let mut script = String::new();
        std::io::stdin()
            .read_to_string(&mut script)
            .context("failed to read key script from stdin")?;
        return Ok(script);
    }
    fs::read_to_string(source).with_context(|| format!("failed to read key script {source}"))
}
