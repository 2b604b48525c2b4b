// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Resolution of photo references into pixel data.

use std::path::{Path, PathBuf};

use printpdf::image_crate::{self, DynamicImage, GenericImageView};
use tracing::debug;

use crate::error::ImageResolveError;

/// Source of step photos.
///
/// Photo references are opaque locators; a source turns one into decoded
/// pixels. The renderer does not care whether the bytes originally came
/// from a camera capture or a picked file.
pub trait ImageSource {
    fn resolve(&self, photo_ref: &str) -> Result<DynamicImage, ImageResolveError>;
}

/// Filesystem-backed image source.
///
/// Relative references are resolved against an optional base directory.
#[derive(Debug, Clone, Default)]
pub struct FsImageSource {
    base_dir: Option<PathBuf>,
}

impl FsImageSource {
    pub fn new() -> Self {
        Self { base_dir: None }
    }

    pub fn with_base_dir<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn locate(&self, photo_ref: &str) -> PathBuf {
        let path = Path::new(photo_ref);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ImageSource for FsImageSource {
    fn resolve(&self, photo_ref: &str) -> Result<DynamicImage, ImageResolveError> {
        let path = self.locate(photo_ref);
        let reader =
            image_crate::io::Reader::open(&path).map_err(|source| ImageResolveError::Read {
                reference: photo_ref.to_owned(),
                source,
            })?;
        let image = reader
            .with_guessed_format()
            .map_err(|source| ImageResolveError::Read {
                reference: photo_ref.to_owned(),
                source,
            })?
            .decode()
            .map_err(|source| ImageResolveError::Decode {
                reference: photo_ref.to_owned(),
                source,
            })?;
        let (width, height) = image.dimensions();
        debug!("Resolved photo '{photo_ref}' ({width}x{height})");
        Ok(image)
    }
}
