use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const RUNTIME_DIR: &str = ".termfolio";

pub fn runtime_dir(workspace: &Path) -> PathBuf {
    workspace.join(RUNTIME_DIR)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid merged settings: {0}")]
    Merge(#[from] serde_json::Error),
}

/// What a sub-mode does with a key that answers none of its choices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnrecognizedKeyPolicy {
    /// Swallow the key and keep waiting.
    #[default]
    Wait,
    /// Drop the sub-mode and return to editing.
    Dismiss,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub title: String,
    pub url: String,
}

/// Content shown by the built-in commands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProfileConfig {
    pub name: String,
    pub tagline: String,
    pub whoami: String,
    pub email: String,
    pub phone: String,
    pub github: String,
    pub portfolio: String,
    pub resume_url: String,
    pub projects: Vec<Project>,
    pub jokes: Vec<String>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            name: "Jane Doe".to_string(),
            tagline: "Full-Stack & Game Developer".to_string(),
            whoami: "I'm Jane, a developer who builds websites, tools and small games. \
                     I like Rust, TypeScript, SQL and anything with a fast feedback loop."
                .to_string(),
            email: "jane.doe@example.com".to_string(),
            phone: "+10000000000".to_string(),
            github: "https://github.com/example".to_string(),
            portfolio: "https://example.com".to_string(),
            resume_url: "https://example.com/resume.pdf".to_string(),
            projects: vec![
                Project {
                    title: "Uplift Solution".to_string(),
                    url: "https://example.com/projects/uplift".to_string(),
                },
                Project {
                    title: "Trilium Quest".to_string(),
                    url: "https://example.com/projects/trilium-quest".to_string(),
                },
                Project {
                    title: "Ticket Metric".to_string(),
                    url: "https://example.com/projects/ticket-metric".to_string(),
                },
            ],
            jokes: vec![
                "Why do programmers prefer dark mode? Because light attracts bugs.".to_string(),
                "There are 10 kinds of people: those who read binary and those who don't."
                    .to_string(),
                "A SQL query walks into a bar, walks up to two tables and asks: may I join you?"
                    .to_string(),
                "It works on my machine. Then we'll ship your machine.".to_string(),
                "I would tell you a UDP joke, but you might not get it.".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ThemeConfig {
    pub foreground: String,
    pub background: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            foreground: "green".to_string(),
            background: "black".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Marker rendered before the editable buffer.
    pub prompt: String,
    /// Lines written once at startup.
    pub banner: Vec<String>,
    /// Whether `clear` writes the banner again after wiping the screen.
    pub reprint_banner_on_clear: bool,
    pub unrecognized_key_policy: UnrecognizedKeyPolicy,
    pub resume_open_delay_ms: u64,
    pub confirm_open_delay_ms: u64,
    /// Column count for hosts that have no real terminal width.
    pub grid_width: usize,
    pub theme: ThemeConfig,
    pub profile: ProfileConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: "$ ".to_string(),
            banner: vec![
                "Welcome to the termfolio console! Type 'help' for commands.".to_string(),
                "Clean code always looks like it was written by someone who cares.".to_string(),
            ],
            reprint_banner_on_clear: false,
            unrecognized_key_policy: UnrecognizedKeyPolicy::Wait,
            resume_open_delay_ms: 1000,
            confirm_open_delay_ms: 2000,
            grid_width: 80,
            theme: ThemeConfig::default(),
            profile: ProfileConfig::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn resume_open_delay(&self) -> Duration {
        Duration::from_millis(self.resume_open_delay_ms)
    }

    pub fn confirm_open_delay(&self) -> Duration {
        Duration::from_millis(self.confirm_open_delay_ms)
    }

    pub fn user_settings_path() -> Option<PathBuf> {
        let home = std::env::var("HOME")
            .ok()
            .or_else(|| std::env::var("USERPROFILE").ok())?;
        Some(Path::new(&home).join(RUNTIME_DIR).join("settings.json"))
    }

    pub fn project_settings_path(workspace: &Path) -> PathBuf {
        runtime_dir(workspace).join("settings.json")
    }

    pub fn project_local_settings_path(workspace: &Path) -> PathBuf {
        runtime_dir(workspace).join("settings.local.json")
    }

    /// Loads defaults, then user, project and project-local settings.
    pub fn load(workspace: &Path) -> Result<Self, ConfigError> {
        Self::load_with_override(workspace, None)
    }

    /// Like [`ConsoleConfig::load`], with `explicit` merged last when given.
    pub fn load_with_override(
        workspace: &Path,
        explicit: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut paths = Vec::new();
        if let Some(user) = Self::user_settings_path() {
            paths.push(user);
        }
        paths.push(Self::project_settings_path(workspace));
        paths.push(Self::project_local_settings_path(workspace));
        Self::load_layers(&paths, explicit)
    }

    fn load_layers(paths: &[PathBuf], explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut merged = serde_json::to_value(Self::default())?;
        for path in paths {
            if !path.exists() {
                continue;
            }
            merge_json_value(&mut merged, &read_json(path)?);
        }
        if let Some(path) = explicit {
            merge_json_value(&mut merged, &read_json(path)?);
        }
        let mut cfg: Self = serde_json::from_value(merged)?;
        cfg.grid_width = cfg.grid_width.max(20);
        Ok(cfg)
    }

    pub fn save(&self, workspace: &Path) -> Result<(), ConfigError> {
        let path = Self::project_settings_path(workspace);
        let dir = runtime_dir(workspace);
        fs::create_dir_all(&dir).map_err(|source| ConfigError::Write {
            path: dir.clone(),
            source,
        })?;
        let body = serde_json::to_vec_pretty(self)?;
        fs::write(&path, body).map_err(|source| ConfigError::Write { path, source })
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn merge_json_value(base: &mut serde_json::Value, overlay: &serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base_obj), serde_json::Value::Object(overlay_obj)) => {
            for (key, overlay_value) in overlay_obj {
                if let Some(base_value) = base_obj.get_mut(key) {
                    merge_json_value(base_value, overlay_value);
                } else {
                    base_obj.insert(key.clone(), overlay_value.clone());
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}
