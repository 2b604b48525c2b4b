// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Report document assembly.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::image_crate::{DynamicImage, GenericImageView};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use tekhne_store_db::{ReportHeader, StepRow};
use tracing::{debug, warn};

use crate::error::{RenderError, Result};
use crate::image::ImageSource;
use crate::layout::{self, MARGIN_X, PAGE_HEIGHT, PAGE_WIDTH, STEP_RESERVE, TOP_OFFSET};

/// Deterministic artifact name for a report.
pub fn report_file_name(header: &ReportHeader) -> String {
    format!(
        "REPORT_{}_{}.pdf",
        header.inventory_code, header.action_type
    )
}

/// Renders logical reports into fixed-size paginated PDF documents.
pub struct ReportRenderer<'a> {
    images: &'a dyn ImageSource,
}

impl<'a> ReportRenderer<'a> {
    pub fn new(images: &'a dyn ImageSource) -> Self {
        Self { images }
    }

    /// Lay out the header and step sequence across as many pages as needed.
    ///
    /// Rendering runs synchronously to completion; photos are resolved one
    /// by one, and a photo that cannot be resolved becomes an inline error
    /// line while the rest of the document still renders.
    pub fn render(
        &self,
        header: &ReportHeader,
        steps: &[StepRow],
    ) -> Result<PdfDocumentReference> {
        let title = format!("Report {} {}", header.inventory_code, header.action_type);
        let mut writer = DocumentWriter::new(&title)?;

        writer.header_block(header);

        if steps.is_empty() {
            writer.text("No steps recorded for this report.", 12.0, Font::Regular, 15.0);
        } else {
            for step in steps {
                self.step_block(&mut writer, step);
            }
        }

        debug!(
            "Rendered report for '{}' with {} steps",
            header.inventory_code,
            steps.len()
        );
        Ok(writer.finish())
    }

    /// Render the report and write it under `output_dir`, returning the
    /// path of the artifact.
    pub fn render_to_file(
        &self,
        header: &ReportHeader,
        steps: &[StepRow],
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let doc = self.render(header, steps)?;
        let path = output_dir.join(report_file_name(header));
        let file = File::create(&path).map_err(|source| RenderError::Write {
            path: path.clone(),
            source,
        })?;
        let mut buffered = BufWriter::new(file);
        doc.save(&mut buffered)?;
        debug!("Wrote report document to {}", path.display());
        Ok(path)
    }

    fn step_block(&self, writer: &mut DocumentWriter, step: &StepRow) {
        // Coarse pre-check: the step must have room for its title, the
        // description line and a worst-case image.
        if writer.y > PAGE_HEIGHT - STEP_RESERVE {
            writer.break_page();
        }

        writer.text(
            &format!("STEP {}:", step.step_number),
            14.0,
            Font::BoldItalic,
            18.0,
        );
        let description = step
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("No description recorded");
        writer.text(&format!("Description: {description}"), 12.0, Font::Regular, 15.0);

        match step.photo() {
            Some(photo_ref) => match self.images.resolve(photo_ref) {
                Ok(image) => writer.image(&image),
                Err(e) => {
                    warn!("Skipping photo for step {}: {e}", step.step_number);
                    writer.text(&format!("Could not load image: {e}"), 12.0, Font::Regular, 15.0);
                }
            },
            None => writer.text("No photo attached", 12.0, Font::Regular, 15.0),
        }

        writer.advance(20.0);
    }
}

#[derive(Clone, Copy)]
enum Font {
    Regular,
    Bold,
    BoldItalic,
}

/// Running layout state: the open document, the active page layer and a
/// top-down vertical cursor in points.
struct DocumentWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    bold_italic: IndirectFontRef,
    y: f64,
}

impl DocumentWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            layout::mm(PAGE_WIDTH),
            layout::mm(PAGE_HEIGHT),
            "content",
        );
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let bold_italic = doc.add_builtin_font(BuiltinFont::HelveticaBoldOblique)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            bold_italic,
            y: TOP_OFFSET,
        })
    }

    fn font(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
            Font::BoldItalic => &self.bold_italic,
        }
    }

    /// Draw one text line at the cursor and advance it.
    fn text(&mut self, line: &str, size: f64, font: Font, advance: f64) {
        self.layer.use_text(
            line,
            size as f32,
            layout::mm(MARGIN_X),
            layout::baseline(self.y),
            self.font(font),
        );
        self.y += advance;
    }

    fn advance(&mut self, amount: f64) {
        self.y += amount;
    }

    /// Finish the current page and reset the cursor on a fresh one.
    fn break_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(layout::mm(PAGE_WIDTH), layout::mm(PAGE_HEIGHT), "content");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP_OFFSET;
    }

    fn header_block(&mut self, header: &ReportHeader) {
        self.text("PROCEDURE REPORT", 24.0, Font::Bold, 40.0);
        self.text(
            &format!(
                "Component: {} ({})",
                header.component_name, header.inventory_code
            ),
            16.0,
            Font::Regular,
            20.0,
        );
        self.text(&format!("Action: {}", header.action_type), 16.0, Font::Regular, 20.0);
        let technician = match &header.workshop_name {
            Some(workshop) => format!("Technician: {} ({workshop})", header.technician_name),
            None => format!("Technician: {}", header.technician_name),
        };
        self.text(&technician, 16.0, Font::Regular, 20.0);
        self.text(
            &format!("Date: {}", header.logged_date()),
            16.0,
            Font::Regular,
            40.0,
        );
        self.text("STEP SEQUENCE", 20.0, Font::Bold, 30.0);
    }

    /// Scale an image uniformly into the image box and draw it, breaking
    /// the page first when the scaled height no longer fits below the
    /// cursor.
    fn image(&mut self, image: &DynamicImage) {
        let (width, height) = image.dimensions();
        let scale = layout::fit_scale(width, height);
        let scaled_height = f64::from(height) * scale;

        // Second, precise check now that the real image height is known.
        if self.y + scaled_height + 30.0 > PAGE_HEIGHT {
            self.break_page();
        }

        // The embedded object cannot carry an alpha channel.
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        let embedded = Image::from_dynamic_image(&rgb);
        embedded.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(layout::mm(MARGIN_X)),
                translate_y: Some(layout::baseline(self.y + scaled_height)),
                scale_x: Some(scale as f32),
                scale_y: Some(scale as f32),
                dpi: Some(72.0),
                ..Default::default()
            },
        );
        self.y += scaled_height + 10.0;
    }

    fn finish(self) -> PdfDocumentReference {
        self.doc
    }
}
