// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pixprep — Core types, configuration and error definitions shared across crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::ResizerConfig;
pub use error::{Error, Result};
pub use types::*;
