//! Interactive crossterm host: raw-mode terminal, mouse link activation and
//! the platform URL opener.

use anyhow::{Context, Result};
use crossterm::cursor::{MoveTo, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseButton, MouseEventKind,
};
use crossterm::style::{Color, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, disable_raw_mode, enable_raw_mode};
use crossterm::{execute, queue};
use std::io::{self, Stdout, Write};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use termfolio_core::config::ThemeConfig;
use termfolio_core::{
    ConsoleConfig, GridReader, GridRow, Host, KeyEvent, Link, LogicalKey, MemoryGrid, Modifiers,
    Surface,
};
use termfolio_observe::Observer;

use crate::{build_console, record_events};

/// Upper bound on how long the loop sleeps without a pending task.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// RAII guard that restores the terminal on drop (including panics).
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), DisableMouseCapture, ResetColor, Show);
}

/// Writes to stdout and mirrors everything into a [`MemoryGrid`] so link
/// hit-tests see the same rows the terminal shows.
struct TerminalSurface {
    out: Stdout,
    grid: MemoryGrid,
    error: Option<io::Error>,
}

impl TerminalSurface {
    fn new(width: usize) -> Self {
        Self {
            out: io::stdout(),
            grid: MemoryGrid::new(width),
            error: None,
        }
    }

    fn keep_error(&mut self, result: io::Result<()>) {
        if let Err(err) = result
            && self.error.is_none()
        {
            self.error = Some(err);
        }
    }

    /// Flushes pending output and reports the first write error since the
    /// last flush.
    fn flush(&mut self) -> io::Result<()> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()
    }
}

impl GridReader for TerminalSurface {
    fn row_count(&self) -> usize {
        self.grid.row_count()
    }

    fn read_row(&self, index: usize) -> Option<GridRow> {
        self.grid.read_row(index)
    }
}

impl Surface for TerminalSurface {
    fn columns(&self) -> usize {
        self.grid.width()
    }

    fn write(&mut self, text: &str) {
        let result = self.out.write_all(text.as_bytes());
        self.keep_error(result);
        self.grid.write(text);
    }

    fn clear_screen(&mut self) {
        let result = queue!(self.out, Clear(ClearType::All), MoveTo(0, 0));
        self.keep_error(result);
        self.grid.clear_screen();
    }

    fn reset_screen(&mut self) {
        let result = queue!(
            self.out,
            Clear(ClearType::All),
            Clear(ClearType::Purge),
            MoveTo(0, 0)
        );
        self.keep_error(result);
        self.grid.reset_screen();
    }

    fn register_link_region(&mut self, link: &Link) {
        self.grid.register_link_region(link);
    }
}

/// Opens URLs with the platform's default handler.
pub(crate) struct SystemOpener;

impl Host for SystemOpener {
    fn open_external(&mut self, uri: &str) -> Result<()> {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]);
            cmd
        } else if cfg!(target_os = "macos") {
            Command::new("open")
        } else {
            Command::new("xdg-open")
        };
        cmd.arg(uri)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to launch opener for {uri}"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostInput {
    Key(KeyEvent),
    Quit,
}

/// Maps a terminal key press to console input. Keys the console has no use
/// for map to `None`.
fn map_key(key: event::KeyEvent) -> Option<HostInput> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let modifiers = Modifiers {
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
        meta: key.modifiers.contains(KeyModifiers::SUPER)
            || key.modifiers.contains(KeyModifiers::META),
    };
    let logical = match key.code {
        KeyCode::Enter => LogicalKey::Enter,
        KeyCode::Backspace => LogicalKey::Backspace,
        KeyCode::Up => LogicalKey::ArrowUp,
        KeyCode::Down => LogicalKey::ArrowDown,
        KeyCode::Tab => LogicalKey::Tab,
        KeyCode::Esc => LogicalKey::Escape,
        KeyCode::Char(ch) if modifiers.ctrl => match ch.to_ascii_lowercase() {
            'c' => LogicalKey::CtrlC,
            'l' => LogicalKey::CtrlL,
            'd' => return Some(HostInput::Quit),
            _ => return Some(HostInput::Key(KeyEvent::char(ch).with_modifiers(modifiers))),
        },
        KeyCode::Char(ch) => {
            return Some(HostInput::Key(KeyEvent::char(ch).with_modifiers(modifiers)));
        }
        _ => return None,
    };
    Some(HostInput::Key(KeyEvent::new(logical)))
}

/// Grid coordinates (1-based) of a click at a 0-based screen cell, for a
/// screen `height` rows tall showing the bottom of `grid`.
fn click_target(grid: &MemoryGrid, height: usize, column: u16, row: u16) -> (usize, usize) {
    let x = usize::from(column) + 1;
    let y = grid.visible_top(height) + usize::from(row) + 1;
    (x, y)
}

fn theme_color(name: &str) -> Option<Color> {
    Color::try_from(name.trim()).ok()
}

fn apply_theme(out: &mut Stdout, theme: &ThemeConfig, observer: &Observer) -> io::Result<()> {
    match theme_color(&theme.foreground) {
        Some(color) => queue!(out, SetForegroundColor(color))?,
        None => observer.warn_log(&format!("unknown foreground color {:?}", theme.foreground)),
    }
    match theme_color(&theme.background) {
        Some(color) => queue!(out, SetBackgroundColor(color))?,
        None => observer.warn_log(&format!("unknown background color {:?}", theme.background)),
    }
    Ok(())
}

pub(crate) fn run_interactive(
    cfg: ConsoleConfig,
    observer: &mut Observer,
    seed: Option<u64>,
) -> Result<()> {
    let fallback_width = u16::try_from(cfg.grid_width).unwrap_or(u16::MAX);
    let (cols, rows) = terminal::size().unwrap_or((fallback_width, 24));
    let mut height = usize::from(rows);
    let theme = cfg.theme.clone();
    let surface = TerminalSurface::new(usize::from(cols));
    let mut console = build_console(cfg, surface, SystemOpener, seed);

    // Set a panic hook that restores the terminal before printing the panic.
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        prev_hook(info);
    }));

    enable_raw_mode()?;
    let _guard = TerminalGuard;
    observer.set_quiet(true);
    {
        let mut out = io::stdout();
        apply_theme(&mut out, &theme, observer)?;
        execute!(out, EnableMouseCapture, Clear(ClearType::All), MoveTo(0, 0))?;
    }

    console.start();
    loop {
        let now = Instant::now();
        console.run_due(now);
        record_events(&mut console, observer);
        console.surface_mut().flush()?;

        let timeout = console
            .next_deadline()
            .map(|due| due.saturating_duration_since(now))
            .unwrap_or(IDLE_POLL)
            .min(IDLE_POLL);
        if !event::poll(timeout)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => match map_key(key) {
                Some(HostInput::Quit) => break,
                Some(HostInput::Key(key)) => console.handle_key(key, Instant::now()),
                None => {}
            },
            Event::Mouse(mouse) => {
                if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
                    continue;
                }
                let (x, y) = click_target(&console.surface().grid, height, mouse.column, mouse.row);
                if let Some(link) = console.link_at(x, y) {
                    observer.verbose_log(&format!("link click {} at {x},{y}", link.uri));
                    console.activate_link(&link);
                }
            }
            Event::Resize(cols, rows) => {
                // Rows already written keep their old wrapping.
                height = usize::from(rows);
                console.surface_mut().grid.set_width(usize::from(cols));
                observer.verbose_log(&format!("resized to {cols}x{rows}"));
            }
            _ => {}
        }
    }

    console.surface_mut().write("\r\n");
    console.surface_mut().flush()?;
    record_events(&mut console, observer);
    drop(_guard);
    observer.set_quiet(false);
    let pending = console.pending_tasks();
    if pending > 0 {
        observer.verbose_log(&format!("exiting with {pending} scheduled opens not yet fired"));
    }
    Ok(())
}
