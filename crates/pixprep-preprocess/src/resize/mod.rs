// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Configurable image resizer — picks a decode-and-resize backend from a
// library name and dispatches each request to it.

pub mod backend;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use pixprep_core::error::{Error, Result};
use pixprep_core::{Image, ResizerConfig};
use tracing::{debug, info, instrument, warn};

pub use backend::{OpenCvBackend, ResizeBackend, TensorBackend};

/// Backing library for [`ImageResizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Library {
    /// BGR decode, bilinear resize, converted to RGB.
    OpenCv,
    /// RGB decode with a `(height, width)` target, nearest-neighbour resize.
    Tensorflow,
}

impl Library {
    /// Configuration name of this library.
    pub fn as_str(self) -> &'static str {
        self.backend().name()
    }

    /// The strategy implementing this library.
    pub fn backend(self) -> &'static dyn ResizeBackend {
        match self {
            Library::OpenCv => &OpenCvBackend,
            Library::Tensorflow => &TensorBackend,
        }
    }
}

impl FromStr for Library {
    type Err = Error;

    /// Case-insensitive parse of `"opencv"` or `"tensorflow"`.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "opencv" => Ok(Library::OpenCv),
            "tensorflow" => Ok(Library::Tensorflow),
            other => Err(Error::InvalidConfiguration(format!(
                "invalid library specified: {other:?} (expected \"opencv\" or \"tensorflow\")"
            ))),
        }
    }
}

impl fmt::Display for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loads image files and stretches them to an exact size using the library
/// chosen at construction.
///
/// ```ignore
/// let resizer = ImageResizer::new("OpenCV");
/// let image = resizer.resize("sample.jpg", 100, 50)?;
/// assert_eq!(image.shape(), &[50, 100, 3]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResizer {
    /// Lowercased library name as given.
    library: String,
    /// Parsed backend, `None` if the name was not recognized.
    backend: Option<Library>,
}

impl ImageResizer {
    /// Create a resizer for `library` (`"opencv"` or `"tensorflow"`, any case).
    ///
    /// An unrecognized name is **not** rejected here: construction always
    /// succeeds and every later [`resize`](Self::resize) call fails with
    /// [`Error::InvalidConfiguration`].
    pub fn new(library: &str) -> Self {
        let library = library.to_lowercase();
        let backend = library.parse::<Library>().ok();
        if backend.is_none() {
            warn!(%library, "Unrecognized resize library; resize calls will fail");
        }
        Self { library, backend }
    }

    /// Create a resizer from a [`ResizerConfig`].
    pub fn from_config(config: &ResizerConfig) -> Self {
        Self::new(&config.library)
    }

    /// The normalized (lowercased) library name.
    pub fn library(&self) -> &str {
        &self.library
    }

    /// The selected backend, if the library name was recognized.
    pub fn backend(&self) -> Option<Library> {
        self.backend
    }

    /// Load `path` and resize it to exactly `width` x `height`.
    ///
    /// Returns a `(height, width, 3)` RGB array. Aspect ratio is not kept.
    /// Decoder failures (missing file, corrupt or unsupported data) come back
    /// as [`Error::Decode`] unchanged.
    #[instrument(skip(self, path), fields(library = %self.library, path = %path.as_ref().display()))]
    pub fn resize(&self, path: impl AsRef<Path>, width: u32, height: u32) -> Result<Image> {
        let library = self.backend.ok_or_else(|| {
            Error::InvalidConfiguration(format!("invalid library specified: {:?}", self.library))
        })?;
        backend::check_dimensions(width, height)?;

        info!(%library, width, height, "Resizing image");
        let image = library.backend().load_resized(path.as_ref(), width, height)?;
        debug!(shape = ?image.shape(), "Resize complete");
        Ok(image)
    }
}

impl Default for ImageResizer {
    fn default() -> Self {
        Self::from_config(&ResizerConfig::default())
    }
}
