//! Persisted defaults, backed by SQLite.
//!
//! Holds only settings that the command line and environment can also
//! supply; those always win. Credentials are never stored here.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::{Connection, OptionalExtension};

use crate::completer::Provider;

mod resolve;

pub use resolve::{Overrides, RunSettings, resolve};

/// Keys accepted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Provider,
    Model,
    Timeout,
    MaxChars,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 4] = [
        ConfigKey::Provider,
        ConfigKey::Model,
        ConfigKey::Timeout,
        ConfigKey::MaxChars,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Provider => "provider",
            ConfigKey::Model => "model",
            ConfigKey::Timeout => "timeout",
            ConfigKey::MaxChars => "max_chars",
        }
    }

    /// Reject values that would fail later when the setting is used.
    pub fn validate(self, value: &str) -> Result<()> {
        match self {
            ConfigKey::Provider => {
                value.parse::<Provider>().map_err(|e| anyhow!(e))?;
            }
            ConfigKey::Model => {
                if value.trim().is_empty() {
                    bail!("model must not be empty");
                }
            }
            ConfigKey::Timeout | ConfigKey::MaxChars => {
                positive(self, value)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = ConfigKey::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown config key `{s}` (known: {})", known.join(", "))
            })
    }
}

/// Typed view of everything in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSettings {
    pub provider: Option<Provider>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_chars: Option<usize>,
}

/// Persistent key-value configuration store.
pub struct Config {
    conn: Mutex<Connection>,
}

impl Config {
    /// Open or create the store at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path).context("failed to open config database")?;
        Self::init(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open config database")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS config (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .context("failed to create config table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("config connection lock poisoned"))
    }

    pub fn get(&self, key: ConfigKey) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config WHERE key = ?1",
                [key.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Validate and upsert a value.
    pub fn set(&self, key: ConfigKey, value: &str) -> Result<()> {
        let value = value.trim();
        key.validate(value)
            .with_context(|| format!("invalid value for `{key}`"))?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key.as_str(), value],
        )?;
        Ok(())
    }

    pub fn remove(&self, key: ConfigKey) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM config WHERE key = ?1", [key.as_str()])?;
        Ok(())
    }

    /// All stored entries, sorted by key.
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config ORDER BY key")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn settings(&self) -> Result<StoredSettings> {
        let provider = self
            .get(ConfigKey::Provider)?
            .map(|v| v.parse::<Provider>().map_err(|e| anyhow!(e)))
            .transpose()?;
        let timeout_secs = self
            .get(ConfigKey::Timeout)?
            .map(|v| positive(ConfigKey::Timeout, &v))
            .transpose()?;
        let max_chars = self
            .get(ConfigKey::MaxChars)?
            .map(|v| {
                let n = positive(ConfigKey::MaxChars, &v)?;
                usize::try_from(n).context("`max_chars` does not fit in memory size")
            })
            .transpose()?;
        Ok(StoredSettings {
            provider,
            model: self.get(ConfigKey::Model)?,
            timeout_secs,
            max_chars,
        })
    }
}

fn positive(key: ConfigKey, value: &str) -> Result<u64> {
    let n: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("`{key}` must be a whole number, got `{value}`"))?;
    if n == 0 {
        bail!("`{key}` must be greater than zero");
    }
    Ok(n)
}
