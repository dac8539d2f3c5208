//! Harness-facing configuration for backend selection.
//!
//! All values have sensible defaults. Override via environment variables
//! (prefixed `PERFMEM_`) or by constructing a custom `MemoryConfig`.

use std::fmt;
use std::str::FromStr;

/// Which memory backend the harness wants to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Page-aligned host memory (always available).
    #[default]
    Host,
    /// Device memory on a topca accelerator.
    Topca,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Host => write!(f, "host"),
            BackendKind::Topca => write!(f, "topca"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "host" => Ok(BackendKind::Host),
            "topca" => Ok(BackendKind::Topca),
            _ => Err(()),
        }
    }
}

/// Configuration for constructing a memory context.
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// Backend to construct.
    pub backend: BackendKind,

    /// Accelerator device ordinal (ignored by the host backend).
    pub device_id: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Host,
            device_id: 0,
        }
    }
}

impl MemoryConfig {
    /// Load config from environment variables, falling back to defaults.
    ///
    /// Recognized variables:
    /// - `PERFMEM_BACKEND` (`host` or `topca`)
    /// - `PERFMEM_DEVICE_ID`
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("PERFMEM_BACKEND") {
            if let Ok(b) = v.parse::<BackendKind>() {
                cfg.backend = b;
            }
        }
        if let Ok(v) = std::env::var("PERFMEM_DEVICE_ID") {
            if let Ok(id) = v.parse::<u32>() {
                cfg.device_id = id;
            }
        }

        cfg
    }
}
