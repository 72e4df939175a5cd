//! Input, edit and dispatch core of the termfolio console.
//!
//! [`Console`] turns a stream of [`KeyEvent`]s into an edited command line,
//! keeps history, completes command names, dispatches finished commands and
//! runs the short-lived key prompts some commands install. Rendering and
//! opening URLs are left to a [`Surface`] and a [`Host`].

pub mod buffer;
pub mod completion;
pub mod config;
pub mod console;
pub mod dispatch;
pub mod events;
pub mod grid;
pub mod history;
pub mod keys;
pub mod links;
pub mod schedule;
pub mod script;
pub mod surface;

pub use config::{ConfigError, ConsoleConfig, RUNTIME_DIR, UnrecognizedKeyPolicy, runtime_dir};
pub use console::Console;
pub use dispatch::{Command, SubMode};
pub use events::ConsoleEvent;
pub use grid::MemoryGrid;
pub use keys::{KeyEvent, LogicalKey, Modifiers};
pub use links::{GridPoint, Link, scan_links};
pub use script::{KeyScriptError, parse_key_script};
pub use surface::{GridReader, GridRow, Host, RecordingHost, Surface};
