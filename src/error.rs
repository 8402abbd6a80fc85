//! Error taxonomy for chromstrip.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    /// Argument value rejected after clap accepted it (e.g. blank chromosome label)
    #[error("Invalid argument: {message}")]
    Argument { message: String },

    /// Input missing, unreadable, or not the expected table
    #[error("Cannot use association file {}: {message}", .path.display())]
    FileFormat { path: PathBuf, message: String },

    /// A retained p-value has no real -log10
    #[error("p-value {value} on line {line} is not a positive finite number; -log10(p) is undefined")]
    NumericDomain { line: u64, value: f64 },

    /// Output image could not be produced at the requested path
    #[error("Cannot write image {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

impl PlotError {
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument {
            message: message.into(),
        }
    }

    pub fn file_format(path: &Path, message: impl Display) -> Self {
        Self::FileFormat {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn io(path: &Path, message: impl Display) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}
