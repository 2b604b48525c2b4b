// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Error types for report rendering.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for report rendering.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that abort a render.
///
/// Image failures are not in here: an unresolvable photo is recovered
/// inline as an error line in the document.
#[derive(Error, Debug)]
pub enum RenderError {
    /// PDF assembly error
    #[error("PDF assembly failed: {0}")]
    Pdf(#[from] printpdf::Error),

    /// Failed to write the finished document
    #[error("Failed to write document to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to turn a photo reference into pixel data.
#[derive(Error, Debug)]
pub enum ImageResolveError {
    /// The referenced resource could not be read
    #[error("failed to read '{reference}': {source}")]
    Read {
        reference: String,
        #[source]
        source: std::io::Error,
    },

    /// The resource was read but is not decodable image data
    #[error("failed to decode '{reference}': {source}")]
    Decode {
        reference: String,
        #[source]
        source: printpdf::image_crate::ImageError,
    },
}
