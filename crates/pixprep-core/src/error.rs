// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for pixprep.

/// Top-level error type for all pixprep operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    // -- Decoding / processing --
    /// Failure from the underlying decoder (missing file, corrupt data,
    /// unsupported format). Passed through untouched.
    #[error(transparent)]
    Decode(#[from] image::ImageError),

    #[error("resize failed: {0}")]
    Resize(String),

    #[error("array shape mismatch: {0}")]
    Shape(#[from] ndarray::ShapeError),

    // -- Serialization --
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, Error>;
