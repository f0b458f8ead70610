//! Core domain logic for the ABC learning design board editor.
//! This crate is the single source of truth for board invariants.

pub mod codec;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use codec::{decode, encode, CodecError, CodecResult};
pub use config::{ConfigError, EditorConfig};
pub use export::{
    export_filename, export_json, sanitize_filename, ExportArtifact, ExportError, ExportKind,
    ExportPipeline, PageGeometry, PdfWriter, RasterImage, RasterOptions, Rasterizer,
    RenderedSnapshot,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::board::{
    AssessmentType, Board, Card, CardFields, CardId, DeliveryStyle, LearningType,
    ValidationError, Week, WeekId, DEFAULT_BOARD_TITLE,
};
pub use model::id::IdGenerator;
pub use repo::board_store::{
    BoardStore, MemoryBoardStore, SqliteBoardStore, StoreError, StoreResult,
};
pub use service::autosave::Autosave;
pub use service::board_service::{
    BoardChange, BoardError, BoardObserver, BoardResult, BoardService, EntityRef, MoveDirection,
};
pub use view::{delete_week_prompt, format_date, BoardView};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
