use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ConsoleConfig;
use crate::keys::KeyEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    Help,
    About,
    Projects,
    Contact,
    Clear,
    Whoami,
    Joke,
    Resume,
    HireMe,
}

/// Completion table, in declaration order.
pub const COMMAND_NAMES: &[&str] = &[
    "help",
    "about",
    "projects",
    "contact",
    "clear",
    "whoami",
    "joke",
    "resume",
    "sudo hire-me",
];

impl Command {
    pub const ALL: [Command; 9] = [
        Command::Help,
        Command::About,
        Command::Projects,
        Command::Contact,
        Command::Clear,
        Command::Whoami,
        Command::Joke,
        Command::Resume,
        Command::HireMe,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::About => "about",
            Self::Projects => "projects",
            Self::Contact => "contact",
            Self::Clear => "clear",
            Self::Whoami => "whoami",
            Self::Joke => "joke",
            Self::Resume => "resume",
            Self::HireMe => "sudo hire-me",
        }
    }

    /// Exact match on an already normalized command line.
    pub fn parse(normalized: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.name() == normalized)
    }
}

/// Canonical form used by history, completion and dispatch.
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// A one-shot key prompt installed by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubMode {
    /// E mail, C call, G GitHub, M portfolio.
    Contact,
    /// Y opens the portfolio, N prints contact details.
    HireMeConfirm,
}

impl SubMode {
    pub fn name(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::HireMeConfirm => "hire-me-confirm",
        }
    }
}

/// Everything a handler wants done; the console applies it in field order:
/// clear, lines, immediate opens, deferred opens, sub-mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub command: Option<Command>,
    pub clear: bool,
    pub lines: Vec<String>,
    pub open_now: Vec<String>,
    pub open_later: Vec<(Duration, String)>,
    pub sub_mode: Option<SubMode>,
}

impl Reply {
    fn for_command(command: Command) -> Self {
        Self {
            command: Some(command),
            ..Default::default()
        }
    }

    fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }
}

pub struct Dispatcher {
    config: ConsoleConfig,
    rng: StdRng,
    last_joke: Option<String>,
}

impl Dispatcher {
    pub fn new(config: ConsoleConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: ConsoleConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ConsoleConfig, rng: StdRng) -> Self {
        Self {
            config,
            rng,
            last_joke: None,
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn dispatch(&mut self, normalized: &str) -> Reply {
        let Some(command) = Command::parse(normalized) else {
            return self.not_found();
        };
        let profile = &self.config.profile;
        let reply = Reply::for_command(command);
        match command {
            Command::Help => reply.line(format!(
                "Available commands: {}",
                COMMAND_NAMES
                    .iter()
                    .filter(|name| **name != "help")
                    .copied()
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            Command::About => reply.line(format!("{} - {}.", profile.name, profile.tagline)),
            Command::Projects => {
                let mut reply = reply;
                for (i, project) in profile.projects.iter().enumerate() {
                    reply = reply.line(format!("{}. {} {}", i + 1, project.title, project.url));
                }
                reply.line(format!("More info: {}", profile.portfolio))
            }
            Command::Contact => {
                let mut reply = reply
                    .line(format!("Email: {} press E to mail", profile.email))
                    .line(format!("Phone: {} press C to call", profile.phone))
                    .line(format!("GitHub: {} press G to open GitHub", profile.github))
                    .line(format!(
                        "Portfolio: {} press M to open main portfolio",
                        profile.portfolio
                    ));
                reply.sub_mode = Some(SubMode::Contact);
                reply
            }
            Command::Whoami => reply.line(profile.whoami.clone()),
            Command::Resume => {
                let mut reply = reply.line("Opening resume...");
                reply
                    .open_later
                    .push((self.config.resume_open_delay(), profile.resume_url.clone()));
                reply
            }
            Command::HireMe => {
                let mut reply = reply
                    .line("Congratulations! You made the best decision.")
                    .line("Do you want to open my main portfolio? (Y/N)");
                reply.sub_mode = Some(SubMode::HireMeConfirm);
                reply
            }
            Command::Clear => {
                let mut reply = reply;
                reply.clear = true;
                if self.config.reprint_banner_on_clear {
                    reply.lines = self.config.banner.clone();
                }
                reply
            }
            Command::Joke => {
                let text = self
                    .next_joke()
                    .unwrap_or_else(|| "No jokes today.".to_string());
                reply.line(text)
            }
        }
    }

    fn not_found(&self) -> Reply {
        Reply::default().line(format!(
            "Command not found. Type 'help' for a list of commands or check this: {}",
            self.config.profile.portfolio
        ))
    }

    /// Random joke that differs from the one shown last time.
    pub fn next_joke(&mut self) -> Option<String> {
        let jokes = &self.config.profile.jokes;
        let fresh: Vec<&String> = jokes
            .iter()
            .filter(|joke| self.last_joke.as_ref() != Some(*joke))
            .collect();
        let pick = if fresh.is_empty() {
            jokes.first()?.clone()
        } else {
            fresh[self.rng.gen_range(0..fresh.len())].clone()
        };
        self.last_joke = Some(pick.clone());
        Some(pick)
    }

    /// Answers an installed sub-mode. `None` means the key is not one of the
    /// mode's choices.
    pub fn answer(&self, mode: SubMode, key: &KeyEvent) -> Option<(char, Reply)> {
        let profile = &self.config.profile;
        let mut reply = Reply::default();
        let answered = match mode {
            SubMode::Contact => {
                let choice = [
                    ('e', format!("mailto:{}", profile.email), "mail client"),
                    ('c', format!("tel:{}", profile.phone), "phone"),
                    ('g', profile.github.clone(), "GitHub"),
                    ('m', profile.portfolio.clone(), "main portfolio"),
                ]
                .into_iter()
                .find(|(letter, _, _)| key.is_letter(*letter))?;
                let (letter, target, label) = choice;
                reply.lines.push(format!("Opening {label}..."));
                reply.open_now.push(target);
                letter
            }
            SubMode::HireMeConfirm => {
                if key.is_letter('y') {
                    reply.lines.push("Opening portfolio...".to_string());
                    reply
                        .open_later
                        .push((self.config.confirm_open_delay(), profile.portfolio.clone()));
                    'y'
                } else if key.is_letter('n') {
                    reply.lines.push(format!("Phone: {}", profile.phone));
                    reply.lines.push(format!("Email: {}", profile.email));
                    'n'
                } else {
                    return None;
                }
            }
        };
        Some((answered, reply))
    }
}
