//! Inkgrid draws deterministic procedural decoration for journal-style pages.
//!
//! Two independent generators live here:
//!
//! - A [`GenerativeGrid`] tiles a viewport into cells, places seeded colored structures,
//!   and paints them cell by cell through a frame-paced [`FillScheduler`].
//! - [`BlobParams`] turns a `key:value` string into a [`BlobSpec`], an organic ink blob or
//!   square rendered as SVG path data.
//!
//! Drawing goes through the [`DrawSurface`] trait and frame callbacks through [`FrameHost`],
//! so both run headless and reproducibly.
#![forbid(unsafe_code)]

mod foundation;

pub mod background;
pub mod blob;
pub mod blob_params;
pub mod config;
pub mod fill;
pub mod grid;
pub mod palette;
pub mod preview;
pub mod random;
pub mod scheduler;
pub mod structures;
pub mod surface;

pub use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8, Vec2, Viewport};
pub use crate::foundation::error::{InkgridError, InkgridResult};

pub use crate::background::{
    GenerativeGrid, GridSnapshot, GridState, GridSwitch, MotionPreference,
};
pub use crate::blob::{aspect_ratio, generate_blob_path, generate_square_path};
pub use crate::blob_params::{BlobParams, BlobShape, BlobSpec};
pub use crate::config::GridConfig;
pub use crate::grid::{CellCoord, Grid, GridCell};
pub use crate::palette::Palette;
pub use crate::preview::{rasterize_svg, rasterize_svg_png};
pub use crate::random::{SeededRandom, session_seed};
pub use crate::scheduler::{
    FillScheduler, FrameHost, FrameOutcome, GateRegion, Interaction, ManualHost, SyntheticClock,
};
pub use crate::structures::{Structure, StructureGenerator, StructureKind};
pub use crate::surface::{DrawSurface, LineStyle, PixelSurface, RecordingSurface};
