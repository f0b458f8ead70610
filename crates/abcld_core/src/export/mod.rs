//! Board export: raster image, paginated document and JSON download.
//!
//! # Responsibility
//! - Name export files and size pages from raster dimensions.
//! - Drive external rasterizer/PDF collaborators over a rendered snapshot.
//!
//! # Invariants
//! - Export only reads the board; a failed export changes nothing.
//! - Rasterization itself is delegated through [`Rasterizer`] and
//!   [`PdfWriter`].

pub mod geometry;
pub mod naming;

use crate::codec::{encode, CodecError};
use crate::config::EditorConfig;
use crate::model::board::Board;
use crate::view::BoardView;
use chrono::NaiveDate;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub use geometry::{Orientation, PageGeometry};
pub use naming::{export_filename, sanitize_filename, ExportKind};

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Debug)]
pub enum ExportError {
    /// Snapshot has a zero width or height.
    EmptySnapshot,
    Rasterize(String),
    Pdf(String),
    Codec(CodecError),
    Write(std::io::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptySnapshot => write!(f, "nothing to export: snapshot is empty"),
            Self::Rasterize(message) => write!(f, "rasterization failed: {message}"),
            Self::Pdf(message) => write!(f, "pdf generation failed: {message}"),
            Self::Codec(err) => write!(f, "{err}"),
            Self::Write(err) => write!(f, "failed to write export: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Codec(err) => Some(err),
            Self::Write(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CodecError> for ExportError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Write(value)
    }
}

/// Rendered board plus its on-screen pixel extent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSnapshot {
    pub view: BoardView,
    pub width_px: u32,
    pub height_px: u32,
}

/// Options passed to the rasterizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterOptions {
    pub background: String,
    pub scale: u32,
}

impl RasterOptions {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            background: config.export_background.clone(),
            scale: config.export_scale,
        }
    }
}

/// Encoded raster output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width_px: u32,
    pub height_px: u32,
    pub png: Vec<u8>,
}

/// Turns a rendered snapshot into a PNG.
pub trait Rasterizer {
    fn rasterize(
        &self,
        snapshot: &RenderedSnapshot,
        options: &RasterOptions,
    ) -> Result<RasterImage, String>;
}

/// Lays one raster image onto a single page of the given size.
pub trait PdfWriter {
    fn write_pdf(&self, image: &RasterImage, page: &PageGeometry) -> Result<Vec<u8>, String>;
}

impl<R: Rasterizer + ?Sized> Rasterizer for &R {
    fn rasterize(
        &self,
        snapshot: &RenderedSnapshot,
        options: &RasterOptions,
    ) -> Result<RasterImage, String> {
        (**self).rasterize(snapshot, options)
    }
}

impl<P: PdfWriter + ?Sized> PdfWriter for &P {
    fn write_pdf(&self, image: &RasterImage, page: &PageGeometry) -> Result<Vec<u8>, String> {
        (**self).write_pdf(image, page)
    }
}

/// Produced export ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub kind: ExportKind,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Writes the artifact into `dir` under its file name.
    pub fn write_to(&self, dir: &Path) -> ExportResult<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Serializes the board as a JSON download.
pub fn export_json(board: &Board, date: NaiveDate) -> ExportResult<ExportArtifact> {
    let text = encode(board)?;
    Ok(ExportArtifact {
        file_name: export_filename(&board.title, date, ExportKind::Json),
        kind: ExportKind::Json,
        bytes: text.into_bytes(),
    })
}

/// Image/PDF export over external rasterization collaborators.
pub struct ExportPipeline<R: Rasterizer, P: PdfWriter> {
    rasterizer: R,
    pdf_writer: P,
    options: RasterOptions,
    dpi: f64,
}

impl<R: Rasterizer, P: PdfWriter> ExportPipeline<R, P> {
    pub fn new(rasterizer: R, pdf_writer: P, config: &EditorConfig) -> Self {
        Self {
            rasterizer,
            pdf_writer,
            options: RasterOptions::from_config(config),
            dpi: config.export_dpi,
        }
    }

    pub fn export_image(
        &self,
        board: &Board,
        snapshot: &RenderedSnapshot,
        date: NaiveDate,
    ) -> ExportResult<ExportArtifact> {
        let image = self.rasterize(snapshot)?;
        info!(
            "event=export module=export kind=png status=ok width_px={} height_px={}",
            image.width_px, image.height_px
        );
        Ok(ExportArtifact {
            file_name: export_filename(&board.title, date, ExportKind::Png),
            kind: ExportKind::Png,
            bytes: image.png,
        })
    }

    pub fn export_pdf(
        &self,
        board: &Board,
        snapshot: &RenderedSnapshot,
        date: NaiveDate,
    ) -> ExportResult<ExportArtifact> {
        let image = self.rasterize(snapshot)?;
        let page = self.page_for(&image);
        let bytes = self.pdf_writer.write_pdf(&image, &page).map_err(|message| {
            error!("event=export module=export kind=pdf status=error stage=pdf");
            ExportError::Pdf(message)
        })?;
        info!(
            "event=export module=export kind=pdf status=ok orientation={:?}",
            page.orientation
        );
        Ok(ExportArtifact {
            file_name: export_filename(&board.title, date, ExportKind::Pdf),
            kind: ExportKind::Pdf,
            bytes,
        })
    }

    /// Page sized to the raster pixels at the configured DPI.
    pub fn page_for(&self, image: &RasterImage) -> PageGeometry {
        PageGeometry::from_pixels(image.width_px, image.height_px, self.dpi)
    }

    fn rasterize(&self, snapshot: &RenderedSnapshot) -> ExportResult<RasterImage> {
        if snapshot.width_px == 0 || snapshot.height_px == 0 {
            return Err(ExportError::EmptySnapshot);
        }
        self.rasterizer
            .rasterize(snapshot, &self.options)
            .map_err(|message| {
                error!("event=export module=export status=error stage=rasterize");
                ExportError::Rasterize(message)
            })
    }
}
