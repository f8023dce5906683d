// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resizer configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Library used when none is configured.
pub const DEFAULT_LIBRARY: &str = "tensorflow";

/// Settings for an image resizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizerConfig {
    /// Backing library name: `"opencv"` or `"tensorflow"` (case-insensitive).
    ///
    /// Not validated here; an unknown name is only rejected when a resize is
    /// attempted.
    pub library: String,
}

impl ResizerConfig {
    pub fn new(library: impl Into<String>) -> Self {
        Self {
            library: library.into(),
        }
    }

    /// Parse a config from a JSON document. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for ResizerConfig {
    fn default() -> Self {
        Self {
            library: DEFAULT_LIBRARY.to_string(),
        }
    }
}
