use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use termfolio_core::{Console, ConsoleConfig, ConsoleEvent, Host, Surface};
use termfolio_observe::Observer;

mod host;
mod output;
mod script;

#[derive(Parser)]
#[command(name = "termfolio")]
#[command(about = "Interactive portfolio console for the terminal", long_about = None)]
struct Cli {
    /// Directory holding `.termfolio/` settings and logs. Defaults to the
    /// current directory.
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Settings file merged over every other layer.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging to stderr.
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Seed for the joke picker, for reproducible sessions.
    #[arg(long)]
    seed: Option<u64>,

    /// Run a key script headlessly instead of opening the terminal UI.
    /// `-` reads the script from stdin.
    #[arg(long, value_name = "FILE|-")]
    script: Option<String>,

    /// Grid width in columns; overrides `grid_width` from settings.
    #[arg(long)]
    width: Option<usize>,

    /// Print the script-mode report as JSON.
    #[arg(long, requires = "script")]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let workspace = match cli.workspace.clone() {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let mut cfg = ConsoleConfig::load_with_override(&workspace, cli.config.as_deref())?;
    if let Some(width) = cli.width {
        cfg.grid_width = width.max(20);
    }

    let mut observer = Observer::new(&workspace)?;
    observer.set_verbose(cli.verbose);
    observer.verbose_log(&format!(
        "workspace={} log={}",
        workspace.display(),
        observer.log_path().display()
    ));

    match cli.script.as_deref() {
        Some(source) => script::run_script(cfg, &observer, source, cli.seed, cli.json),
        None => host::run_interactive(cfg, &mut observer, cli.seed),
    }
}

/// Builds a console, seeded when asked to.
fn build_console<S: Surface, H: Host>(
    cfg: ConsoleConfig,
    surface: S,
    host: H,
    seed: Option<u64>,
) -> Console<S, H> {
    match seed {
        Some(seed) => Console::with_seed(cfg, surface, host, seed),
        None => Console::new(cfg, surface, host),
    }
}

/// Moves the console's pending events into the session log.
fn record_events<S: Surface, H: Host>(console: &mut Console<S, H>, observer: &Observer) {
    for event in console.drain_events() {
        if let ConsoleEvent::ExternalOpenFailed { target, error } = &event {
            observer.warn_log(&format!("could not open {target}: {error}"));
        }
        if let Err(err) = observer.record_event(&event) {
            observer.warn_log(&format!("failed to record event: {err}"));
        }
    }
}
