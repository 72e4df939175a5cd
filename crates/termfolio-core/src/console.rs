//! Key router: the console's state machine.
//!
//! While a sub-mode is installed it sees every key and nothing else does.
//! Otherwise keys drive the line editor, history browsing and completion.

use std::time::Instant;

use unicode_width::UnicodeWidthChar;

use crate::buffer::LineBuffer;
use crate::completion::{Completion, complete};
use crate::config::{ConsoleConfig, UnrecognizedKeyPolicy};
use crate::dispatch::{COMMAND_NAMES, Dispatcher, Reply, SubMode, normalize};
use crate::events::ConsoleEvent;
use crate::history::HistoryStore;
use crate::keys::{KeyEvent, LogicalKey};
use crate::links::{Link, scan_links};
use crate::schedule::{DeferredAction, ScheduledTask, TaskQueue};
use crate::surface::{CRLF, ERASE_BELOW, Host, RUB_OUT, Surface, cursor_up};

pub struct Console<S: Surface, H: Host> {
    surface: S,
    host: H,
    buffer: LineBuffer,
    history: HistoryStore,
    dispatcher: Dispatcher,
    mode: Option<SubMode>,
    tasks: TaskQueue,
    events: Vec<ConsoleEvent>,
}

impl<S: Surface, H: Host> Console<S, H> {
    pub fn new(config: ConsoleConfig, surface: S, host: H) -> Self {
        Self::with_dispatcher(Dispatcher::new(config), surface, host)
    }

    /// Same as [`Console::new`] with a reproducible joke order.
    pub fn with_seed(config: ConsoleConfig, surface: S, host: H, seed: u64) -> Self {
        Self::with_dispatcher(Dispatcher::with_seed(config, seed), surface, host)
    }

    fn with_dispatcher(dispatcher: Dispatcher, surface: S, host: H) -> Self {
        Self {
            surface,
            host,
            buffer: LineBuffer::new(),
            history: HistoryStore::new(),
            dispatcher,
            mode: None,
            tasks: TaskQueue::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        self.dispatcher.config()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn sub_mode(&self) -> Option<SubMode> {
        self.mode
    }

    pub fn is_awaiting(&self) -> bool {
        self.mode.is_some()
    }

    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn drain_events(&mut self) -> Vec<ConsoleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Writes the banner and the first prompt.
    pub fn start(&mut self) {
        let banner = self.config().banner.clone();
        for line in &banner {
            self.surface.write_line(line);
        }
        if banner.is_empty() {
            self.redraw_input(0);
        } else {
            self.fresh_prompt();
        }
    }

    pub fn handle_key(&mut self, event: KeyEvent, now: Instant) {
        if let Some(mode) = self.mode {
            self.route_to_sub_mode(mode, event, now);
            return;
        }
        match event.key {
            LogicalKey::Enter => self.submit(now),
            LogicalKey::Backspace => {
                if self.buffer.delete_last().is_some() {
                    self.surface.write(RUB_OUT);
                }
            }
            LogicalKey::ArrowUp => {
                if let Some(entry) = self.history.navigate_up().map(str::to_string) {
                    self.replace_line(&entry);
                }
            }
            LogicalKey::ArrowDown => {
                if let Some(entry) = self.history.navigate_down().map(str::to_string) {
                    self.replace_line(&entry);
                }
            }
            LogicalKey::Tab => self.complete(),
            LogicalKey::Escape => {
                let rows_above = self.input_rows_above();
                self.buffer.clear();
                self.history.reset_cursor();
                self.redraw_input(rows_above);
            }
            LogicalKey::CtrlC => {
                self.surface.write("^C");
                self.buffer.clear();
                self.history.reset_cursor();
                self.fresh_prompt();
            }
            LogicalKey::CtrlL => {
                self.surface.clear_screen();
                self.redraw_input(0);
            }
            LogicalKey::Printable => {
                if let Some(ch) = self.buffer.insert(&event) {
                    let mut utf8 = [0u8; 4];
                    self.surface.write(ch.encode_utf8(&mut utf8));
                }
            }
        }
    }

    /// Fires every task due at `now`.
    pub fn run_due(&mut self, now: Instant) {
        for task in self.tasks.take_due(now) {
            self.run_task(task);
        }
    }

    /// Fires every pending task regardless of its deadline.
    pub fn run_all_pending(&mut self) {
        for task in self.tasks.take_all() {
            self.run_task(task);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.next_deadline()
    }

    /// Scans the logical line holding row `y` (1-based) and registers every
    /// link found with the surface.
    pub fn links_at_row(&mut self, y: usize) -> Vec<Link> {
        let links = scan_links(&self.surface, y);
        for link in &links {
            self.surface.register_link_region(link);
        }
        links
    }

    pub fn link_at(&mut self, x: usize, y: usize) -> Option<Link> {
        self.links_at_row(y)
            .into_iter()
            .find(|link| link.contains(x, y))
    }

    pub fn activate_link(&mut self, link: &Link) {
        self.open(&link.uri);
    }

    fn submit(&mut self, now: Instant) {
        let input = normalize(&self.buffer.take());
        self.surface.write(CRLF);
        self.history.append(input.clone());
        let reply = self.dispatcher.dispatch(&input);
        self.events.push(match reply.command {
            Some(command) => ConsoleEvent::CommandSubmitted {
                input,
                command,
            },
            None => ConsoleEvent::CommandUnknown { input },
        });
        let cleared = reply.clear;
        if self.apply(reply, now) {
            return;
        }
        if cleared {
            self.redraw_input(0);
        } else {
            self.fresh_prompt();
        }
    }

    fn route_to_sub_mode(&mut self, mode: SubMode, event: KeyEvent, now: Instant) {
        if event.is_cancel() {
            if event.key == LogicalKey::CtrlC {
                self.surface.write("^C");
            }
            self.leave_sub_mode(mode);
            return;
        }
        match self.dispatcher.answer(mode, &event) {
            Some((key, reply)) => {
                self.mode = None;
                self.events.push(ConsoleEvent::SubModeResolved {
                    mode: mode.name(),
                    key,
                });
                self.apply(reply, now);
                self.fresh_prompt();
            }
            None => match self.config().unrecognized_key_policy {
                UnrecognizedKeyPolicy::Wait => {}
                UnrecognizedKeyPolicy::Dismiss => self.leave_sub_mode(mode),
            },
        }
    }

    fn leave_sub_mode(&mut self, mode: SubMode) {
        self.mode = None;
        self.events.push(ConsoleEvent::SubModeCancelled { mode: mode.name() });
        self.fresh_prompt();
    }

    /// Applies a handler's reply. Returns true when it installed a sub-mode.
    fn apply(&mut self, reply: Reply, now: Instant) -> bool {
        if reply.clear {
            self.surface.reset_screen();
            self.events.push(ConsoleEvent::ScreenCleared);
        }
        for line in &reply.lines {
            self.surface.write_line(line);
        }
        for target in reply.open_now {
            self.open(&target);
        }
        for (delay, target) in reply.open_later {
            let id = self.tasks.schedule(
                now,
                delay,
                DeferredAction::OpenExternal(target.clone()),
            );
            self.events.push(ConsoleEvent::TaskScheduled {
                id,
                target,
                delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            });
        }
        let Some(mode) = reply.sub_mode else {
            return false;
        };
        self.mode = Some(mode);
        self.events
            .push(ConsoleEvent::SubModeInstalled { mode: mode.name() });
        true
    }

    fn complete(&mut self) {
        let prefix = normalize(self.buffer.as_str());
        match complete(&prefix, COMMAND_NAMES) {
            Completion::None => {}
            Completion::Unique(name) => {
                self.history.reset_cursor();
                self.replace_line(name);
            }
            Completion::Multiple(names) => {
                self.surface.write(CRLF);
                self.surface.write(&names.join(CRLF));
                self.fresh_prompt();
            }
        }
    }

    fn run_task(&mut self, task: ScheduledTask) {
        match task.action {
            DeferredAction::OpenExternal(target) => self.open(&target),
        }
    }

    fn open(&mut self, target: &str) {
        self.events.push(ConsoleEvent::ExternalOpenRequested {
            target: target.to_string(),
        });
        if let Err(err) = self.host.open_external(target) {
            self.events.push(ConsoleEvent::ExternalOpenFailed {
                target: target.to_string(),
                error: format!("{err:#}"),
            });
        }
    }

    fn replace_line(&mut self, text: &str) {
        let rows_above = self.input_rows_above();
        self.buffer.replace(text);
        self.redraw_input(rows_above);
    }

    /// Rows between the first row of prompt + buffer and the cursor.
    fn input_rows_above(&self) -> usize {
        let mut shown = self.config().prompt.clone();
        shown.push_str(self.buffer.as_str());
        wrapped_rows(&shown, self.surface.columns())
    }

    /// Erases the input, which starts `rows_above` rows up, and writes
    /// prompt + buffer in its place.
    fn redraw_input(&mut self, rows_above: usize) {
        if rows_above > 0 {
            self.surface.write(&cursor_up(rows_above));
        }
        self.surface.write(ERASE_BELOW);
        let prompt = self.config().prompt.clone();
        self.surface.write(&prompt);
        let text = self.buffer.as_str().to_string();
        self.surface.write(&text);
    }

    /// Starts a new row with prompt + buffer.
    fn fresh_prompt(&mut self) {
        self.surface.write(CRLF);
        self.redraw_input(0);
    }
}

/// How many times `text` soft-wraps when written from column 0 of a grid
/// `width` cells wide.
fn wrapped_rows(text: &str, width: usize) -> usize {
    let width = width.max(1);
    let mut rows = 0;
    let mut col = 0;
    for cells in text.chars().filter_map(|ch| ch.width()).filter(|w| *w > 0) {
        let cells = cells.min(2);
        if col + cells > width {
            rows += 1;
            col = 0;
        }
        col += cells;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::MemoryGrid;
    use crate::surface::{GridReader, GridRow, RecordingHost};
    use anyhow::anyhow;
    use proptest::prelude::*;
    use std::time::Duration;

    type TestConsole = Console<MemoryGrid, RecordingHost>;

    fn console_with(config: ConsoleConfig) -> TestConsole {
        let mut console = Console::with_seed(config, MemoryGrid::new(80), RecordingHost::default(), 9);
        console.start();
        console
    }

    fn console() -> TestConsole {
        console_with(ConsoleConfig::default())
    }

    /// No banner, so the grid holds only what the test types.
    fn narrow_console(width: usize) -> TestConsole {
        let config = ConsoleConfig {
            banner: Vec::new(),
            ..Default::default()
        };
        let mut console =
            Console::with_seed(config, MemoryGrid::new(width), RecordingHost::default(), 9);
        console.start();
        console
    }

    fn type_text<S: Surface, H: Host>(console: &mut Console<S, H>, text: &str, now: Instant) {
        for ch in text.chars() {
            console.handle_key(KeyEvent::char(ch), now);
        }
    }

    fn press<S: Surface, H: Host>(console: &mut Console<S, H>, key: LogicalKey, now: Instant) {
        console.handle_key(KeyEvent::new(key), now);
    }

    fn last_line(console: &TestConsole) -> String {
        console.surface().lines().last().cloned().unwrap_or_default()
    }

    #[test]
    fn start_writes_banner_then_prompt() {
        let c = console();
        let lines = c.surface().lines();
        let banner = ConsoleConfig::default().banner;
        assert_eq!(lines[0], banner[0]);
        assert_eq!(lines[1], banner[1]);
        assert_eq!(last_line(&c), "$");
        assert!(!c.is_awaiting());
        assert_eq!(c.history().cursor(), 0);
    }

    proptest! {
        #[test]
        fn submit_records_normalized_input(s in "[a-zA-Z ]{0,16}") {
            let mut c = console();
            let now = Instant::now();
            type_text(&mut c, &s, now);
            press(&mut c, LogicalKey::Enter, now);
            prop_assert_eq!(c.history().entries().last().cloned(), Some(normalize(&s)));
            prop_assert!(c.buffer().is_empty());
            prop_assert_eq!(c.history().len(), 1);
        }
    }

    #[test]
    fn typing_and_backspace_echo() {
        let mut c = console();
        let now = Instant::now();
        type_text(&mut c, "abc", now);
        press(&mut c, LogicalKey::Backspace, now);
        assert_eq!(c.buffer().as_str(), "ab");
        assert_eq!(last_line(&c), "$ ab");

        press(&mut c, LogicalKey::Backspace, now);
        press(&mut c, LogicalKey::Backspace, now);
        press(&mut c, LogicalKey::Backspace, now);
        assert!(c.buffer().is_empty());
        assert_eq!(last_line(&c), "$");
    }

    #[test]
    fn chords_do_not_insert() {
        let mut c = console();
        let chord = KeyEvent::char('x').with_modifiers(crate::keys::Modifiers {
            ctrl: true,
            ..Default::default()
        });
        c.handle_key(chord, Instant::now());
        assert!(c.buffer().is_empty());
    }

    #[test]
    fn history_browsing_rewrites_the_line() {
        let mut c = console();
        let now = Instant::now();
        for cmd in ["whoami", "About"] {
            type_text(&mut c, cmd, now);
            press(&mut c, LogicalKey::Enter, now);
        }
        press(&mut c, LogicalKey::ArrowUp, now);
        assert_eq!(c.buffer().as_str(), "about");
        assert_eq!(last_line(&c), "$ about");
        press(&mut c, LogicalKey::ArrowUp, now);
        press(&mut c, LogicalKey::ArrowUp, now);
        assert_eq!(c.buffer().as_str(), "whoami");
        press(&mut c, LogicalKey::ArrowDown, now);
        press(&mut c, LogicalKey::ArrowDown, now);
        assert_eq!(c.buffer().as_str(), "");
        assert_eq!(last_line(&c), "$");
        press(&mut c, LogicalKey::ArrowDown, now);
        assert_eq!(c.history().cursor(), 2);
    }

    #[test]
    fn tab_completes_unique_prefix() {
        let mut c = console();
        let now = Instant::now();
        type_text(&mut c, "AB", now);
        press(&mut c, LogicalKey::Tab, now);
        assert_eq!(c.buffer().as_str(), "about");
        assert_eq!(last_line(&c), "$ about");

        let mut c = console();
        type_text(&mut c, "su", now);
        press(&mut c, LogicalKey::Tab, now);
        assert_eq!(c.buffer().as_str(), "sudo hire-me");
    }

    #[test]
    fn tab_lists_every_candidate_and_keeps_buffer() {
        let mut c = console();
        let now = Instant::now();
        type_text(&mut c, "c", now);
        press(&mut c, LogicalKey::Tab, now);
        assert_eq!(c.buffer().as_str(), "c");
        let lines = c.surface().lines();
        let tail = &lines[lines.len() - 4..];
        assert_eq!(tail, ["$ c", "contact", "clear", "$ c"]);
    }

    #[test]
    fn tab_without_match_changes_nothing() {
        let mut c = console();
        let now = Instant::now();
        type_text(&mut c, "zz", now);
        let before = c.surface().lines();
        press(&mut c, LogicalKey::Tab, now);
        assert_eq!(c.surface().lines(), before);
        assert_eq!(c.buffer().as_str(), "zz");
    }

    #[test]
    fn enter_prints_output_and_a_fresh_prompt() {
        let mut c = console();
        let now = Instant::now();
        type_text(&mut c, "  WhoAmI ", now);
        press(&mut c, LogicalKey::Enter, now);
        // The answer is longer than a row; wrapped rows keep their spaces.
        let text = c.surface().lines().concat();
        assert!(text.contains(&ConsoleConfig::default().profile.whoami));
        assert_eq!(last_line(&c), "$");
        assert_eq!(c.history().entries(), ["whoami"]);
        assert!(matches!(
            c.drain_events().as_slice(),
            [ConsoleEvent::CommandSubmitted { input, .. }] if input == "whoami"
        ));
    }

    #[test]
    fn unknown_command_reports_and_is_still_recorded() {
        let mut c = console();
        let now = Instant::now();
        type_text(&mut c, "rm -rf", now);
        press(&mut c, LogicalKey::Enter, now);
        assert!(
            c.surface()
                .lines()
                .iter()
                .any(|line| line.starts_with("Command not found."))
        );
        assert_eq!(c.history().entries(), ["rm -rf"]);
        assert_eq!(
            c.drain_events(),
            vec![ConsoleEvent::CommandUnknown {
                input: "rm -rf".to_string()
            }]
        );
    }

    #[test]
    fn ctrl_c_abandons_the_line() {
        let mut c = console();
        let now = Instant::now();
        type_text(&mut c, "who", now);
        press(&mut c, LogicalKey::CtrlC, now);
        let lines = c.surface().lines();
        assert_eq!(lines[lines.len() - 2], "$ who^C");
        assert_eq!(last_line(&c), "$");
        assert!(c.buffer().is_empty());
        assert!(c.history().is_empty());
    }

    #[test]
    fn escape_clears_in_place() {
        let mut c = console();
        let now = Instant::now();
        type_text(&mut c, "help", now);
        press(&mut c, LogicalKey::Enter, now);
        press(&mut c, LogicalKey::ArrowUp, now);
        let rows = c.surface().row_count();
        press(&mut c, LogicalKey::Escape, now);
        assert_eq!(c.surface().row_count(), rows);
        assert_eq!(last_line(&c), "$");
        assert!(!c.history().is_browsing());
    }

    #[test]
    fn ctrl_l_clears_screen_and_keeps_buffer() {
        let mut c = console();
        let now = Instant::now();
        type_text(&mut c, "ab", now);
        press(&mut c, LogicalKey::CtrlL, now);
        assert_eq!(c.surface().screen_lines(), vec!["$ ab"]);
        assert_eq!(c.buffer().as_str(), "ab");
    }

    #[test]
    fn clear_resets_everything_on_screen() {
        let mut c = console();
        let now = Instant::now();
        type_text(&mut c, "clear", now);
        press(&mut c, LogicalKey::Enter, now);
        assert_eq!(c.surface().lines(), vec!["$"]);
        assert!(c.drain_events().contains(&ConsoleEvent::ScreenCleared));

        let mut c = console_with(ConsoleConfig {
            reprint_banner_on_clear: true,
            ..Default::default()
        });
        type_text(&mut c, "clear", now);
        press(&mut c, LogicalKey::Enter, now);
        let mut expected = ConsoleConfig::default().banner;
        expected.push("$".to_string());
        assert_eq!(c.surface().lines(), expected);
    }

    #[test]
    fn sub_mode_owns_every_key_until_answered() {
        let mut c = console();
        let now = Instant::now();
        type_text(&mut c, "contact", now);
        press(&mut c, LogicalKey::Enter, now);
        assert_eq!(c.sub_mode(), Some(SubMode::Contact));
        let rows = c.surface().lines();

        type_text(&mut c, "xyz", now);
        press(&mut c, LogicalKey::Enter, now);
        press(&mut c, LogicalKey::Tab, now);
        press(&mut c, LogicalKey::ArrowUp, now);
        assert!(c.is_awaiting());
        assert!(c.buffer().is_empty());
        assert_eq!(c.history().len(), 1);
        assert_eq!(c.surface().lines(), rows);
        assert!(c.host().opened.is_empty());

        type_text(&mut c, "G", now);
        assert!(!c.is_awaiting());
        assert_eq!(c.host().opened, vec!["https://github.com/example"]);
        assert_eq!(last_line(&c), "$");

        type_text(&mut c, "g", now);
        assert_eq!(c.buffer().as_str(), "g");
        assert_eq!(c.host().opened.len(), 1);
    }

    #[test]
    fn dismiss_policy_drops_the_sub_mode() {
        let mut c = console_with(ConsoleConfig {
            unrecognized_key_policy: UnrecognizedKeyPolicy::Dismiss,
            ..Default::default()
        });
        let now = Instant::now();
        type_text(&mut c, "contact", now);
        press(&mut c, LogicalKey::Enter, now);
        c.drain_events();
        type_text(&mut c, "x", now);
        assert!(!c.is_awaiting());
        assert!(c.buffer().is_empty());
        assert!(c.host().opened.is_empty());
        assert_eq!(
            c.drain_events(),
            vec![ConsoleEvent::SubModeCancelled { mode: "contact" }]
        );
    }

    #[test]
    fn cancel_keys_leave_any_sub_mode() {
        for cancel in [LogicalKey::Escape, LogicalKey::CtrlC] {
            let mut c = console();
            let now = Instant::now();
            type_text(&mut c, "sudo hire-me", now);
            press(&mut c, LogicalKey::Enter, now);
            assert_eq!(c.sub_mode(), Some(SubMode::HireMeConfirm));
            press(&mut c, cancel, now);
            assert!(!c.is_awaiting());
            assert_eq!(c.pending_tasks(), 0);
            assert_eq!(last_line(&c), "$");
        }
    }

    #[test]
    fn hire_me_yes_opens_portfolio_after_delay() {
        let mut c = console();
        let t0 = Instant::now();
        type_text(&mut c, "sudo hire-me", t0);
        press(&mut c, LogicalKey::Enter, t0);
        type_text(&mut c, "Y", t0);
        assert!(!c.is_awaiting());
        assert_eq!(c.next_deadline(), Some(t0 + Duration::from_millis(2000)));

        c.run_due(t0 + Duration::from_millis(1999));
        assert!(c.host().opened.is_empty());
        c.run_due(t0 + Duration::from_millis(2000));
        assert_eq!(c.host().opened, vec!["https://example.com"]);
        assert_eq!(c.next_deadline(), None);
    }

    #[test]
    fn hire_me_no_prints_contact_details() {
        let mut c = console();
        let now = Instant::now();
        type_text(&mut c, "sudo hire-me", now);
        press(&mut c, LogicalKey::Enter, now);
        type_text(&mut c, "n", now);
        let lines = c.surface().lines();
        assert!(lines.contains(&"Phone: +10000000000".to_string()));
        assert!(lines.contains(&"Email: jane.doe@example.com".to_string()));
        assert_eq!(c.pending_tasks(), 0);
    }

    #[test]
    fn deferred_open_survives_later_input() {
        let mut c = console();
        let t0 = Instant::now();
        type_text(&mut c, "resume", t0);
        press(&mut c, LogicalKey::Enter, t0);
        type_text(&mut c, "clear", t0);
        press(&mut c, LogicalKey::Enter, t0);
        assert_eq!(c.pending_tasks(), 1);
        c.run_all_pending();
        assert_eq!(c.host().opened, vec!["https://example.com/resume.pdf"]);
    }

    #[test]
    fn project_links_are_found_and_activated() {
        let mut c = console();
        let now = Instant::now();
        type_text(&mut c, "projects", now);
        press(&mut c, LogicalKey::Enter, now);
        let lines = c.surface().lines();
        let y = lines
            .iter()
            .position(|line| line.starts_with("1. "))
            .map(|i| i + 1)
            .expect("project row");
        let links = c.links_at_row(y);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].uri, "https://example.com/projects/uplift");
        assert_eq!(c.surface().registered_links(), links.as_slice());

        let link = c.link_at(links[0].start.x, y).expect("hit");
        assert!(c.link_at(1, y).is_none());
        c.activate_link(&link);
        assert_eq!(c.host().opened, vec!["https://example.com/projects/uplift"]);
    }

    struct BrokenHost;

    impl Host for BrokenHost {
        fn open_external(&mut self, _uri: &str) -> anyhow::Result<()> {
            Err(anyhow!("no opener"))
        }
    }

    #[test]
    fn open_failures_become_events() {
        let mut c = Console::with_seed(ConsoleConfig::default(), MemoryGrid::new(80), BrokenHost, 1);
        c.start();
        let now = Instant::now();
        type_text(&mut c, "contact", now);
        press(&mut c, LogicalKey::Enter, now);
        type_text(&mut c, "e", now);
        let events = c.drain_events();
        assert!(events.contains(&ConsoleEvent::ExternalOpenFailed {
            target: "mailto:jane.doe@example.com".to_string(),
            error: "no opener".to_string(),
        }));
        assert!(!c.is_awaiting());
    }

    #[test]
    fn wrapped_rows_follow_grid_wrapping() {
        assert_eq!(wrapped_rows("", 4), 0);
        assert_eq!(wrapped_rows("$ ab", 4), 0);
        assert_eq!(wrapped_rows("$ abc", 4), 1);
        assert_eq!(wrapped_rows("$ abcdefgh", 4), 2);
        assert_eq!(wrapped_rows("a漢字", 4), 1);
        assert_eq!(wrapped_rows("a漢字", 3), 1);
    }

    #[test]
    fn history_recall_replaces_wrapped_input() {
        let mut c = narrow_console(20);
        let now = Instant::now();
        type_text(&mut c, "help", now);
        press(&mut c, LogicalKey::Enter, now);
        type_text(&mut c, "abcdefghijklmnopqrstuvw", now);
        press(&mut c, LogicalKey::ArrowUp, now);

        let grid = c.surface();
        let last = grid.read_row(grid.row_count() - 1).expect("row");
        assert_eq!(
            last,
            GridRow {
                text: "$ help".to_string(),
                is_wrap_continuation: false,
            }
        );
        assert!(
            !grid
                .lines()
                .iter()
                .any(|line| line.contains("abcdefghijklmnopqr"))
        );
    }

    #[test]
    fn tab_completion_replaces_wrapped_input() {
        let mut c = narrow_console(10);
        let now = Instant::now();
        type_text(&mut c, "sudo hire-", now);
        assert_eq!(c.surface().lines(), vec!["$ sudo hir", "e-"]);
        press(&mut c, LogicalKey::Tab, now);
        assert_eq!(c.buffer().as_str(), "sudo hire-me");
        assert_eq!(c.surface().lines(), vec!["$ sudo hir", "e-me"]);
        assert!(
            c.surface()
                .read_row(1)
                .is_some_and(|row| row.is_wrap_continuation)
        );
    }

    #[test]
    fn escape_erases_every_row_of_wrapped_input() {
        let mut c = narrow_console(20);
        let now = Instant::now();
        type_text(&mut c, "abcdefghijklmnopqrstuvw", now);
        assert_eq!(c.surface().row_count(), 2);
        press(&mut c, LogicalKey::Escape, now);
        assert_eq!(c.surface().lines(), vec!["$"]);
        assert!(c.buffer().is_empty());
    }
}
