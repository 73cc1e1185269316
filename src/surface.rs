use std::path::Path;

use anyhow::Context as _;
use resvg::tiny_skia;

use crate::{
    foundation::core::{Point, Rect, Rgba8, Viewport},
    foundation::error::{InkgridError, InkgridResult},
};

/// Stroke parameters for grid separator lines.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LineStyle {
    pub color: Rgba8,
    pub alpha: f64, // multiplies color alpha
    pub width: f64, // px
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Rgba8::rgb(0x2a, 0x2a, 0x2a),
            alpha: 0.25,
            width: 0.5,
        }
    }
}

/// Immediate-mode drawing target. Every call paints over what is already there.
pub trait DrawSurface {
    fn clear(&mut self, color: Rgba8);
    fn fill_rect(&mut self, rect: Rect, color: Rgba8);
    fn stroke_line(&mut self, from: Point, to: Point, style: &LineStyle);
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub enum DrawCmd {
    Clear(Rgba8),
    FillRect {
        rect: Rect,
        color: Rgba8,
    },
    Line {
        from: Point,
        to: Point,
        style: LineStyle,
    },
}

/// Records draw calls instead of rasterizing them.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    pub cmds: Vec<DrawCmd>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill_count(&self) -> usize {
        self.cmds
            .iter()
            .filter(|c| matches!(c, DrawCmd::FillRect { .. }))
            .count()
    }

    pub fn line_count(&self) -> usize {
        self.cmds
            .iter()
            .filter(|c| matches!(c, DrawCmd::Line { .. }))
            .count()
    }

    pub fn fills(&self) -> impl Iterator<Item = (Rect, Rgba8)> + '_ {
        self.cmds.iter().filter_map(|c| match c {
            DrawCmd::FillRect { rect, color } => Some((*rect, *color)),
            _ => None,
        })
    }
}

impl DrawSurface for RecordingSurface {
    fn clear(&mut self, color: Rgba8) {
        self.cmds.push(DrawCmd::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.cmds.push(DrawCmd::FillRect { rect, color });
    }

    fn stroke_line(&mut self, from: Point, to: Point, style: &LineStyle) {
        self.cmds.push(DrawCmd::Line {
            from,
            to,
            style: *style,
        });
    }
}

/// Software RGBA raster backed by a `tiny_skia` pixmap, anti-aliased.
#[derive(Clone)]
pub struct PixelSurface {
    pixmap: tiny_skia::Pixmap,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> InkgridResult<Self> {
        let pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            InkgridError::render(format!("failed to allocate {width}x{height} surface"))
        })?;
        Ok(Self { pixmap })
    }

    /// One pixel per CSS pixel, rounding partial pixels up.
    pub fn for_viewport(viewport: Viewport) -> InkgridResult<Self> {
        Self::new(
            viewport.width.max(0.0).ceil() as u32,
            viewport.height.max(0.0).ceil() as u32,
        )
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight-alpha color at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgba8 {
            r: c.red(),
            g: c.green(),
            b: c.blue(),
            a: c.alpha(),
        })
    }

    /// Copy out as straight-alpha RGBA8.
    pub fn to_rgba_image(&self) -> InkgridResult<image::RgbaImage> {
        let mut data = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        image::RgbaImage::from_raw(self.width(), self.height(), data)
            .ok_or_else(|| InkgridError::render("surface buffer size mismatch"))
    }

    pub fn write_png(&self, path: &Path) -> InkgridResult<()> {
        self.to_rgba_image()?
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

impl std::fmt::Debug for PixelSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelSurface")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

fn solid_paint(color: Rgba8, alpha: f64) -> tiny_skia::Paint<'static> {
    let a = (f64::from(color.a) * alpha.clamp(0.0, 1.0)).round() as u8;
    let mut paint = tiny_skia::Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, a);
    paint.anti_alias = true;
    paint
}

impl DrawSurface for PixelSurface {
    fn clear(&mut self, color: Rgba8) {
        self.pixmap.fill(tiny_skia::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        let r = rect.abs();
        let Some(r) =
            tiny_skia::Rect::from_ltrb(r.x0 as f32, r.y0 as f32, r.x1 as f32, r.y1 as f32)
        else {
            return;
        };
        self.pixmap.fill_rect(
            r,
            &solid_paint(color, 1.0),
            tiny_skia::Transform::identity(),
            None,
        );
    }

    fn stroke_line(&mut self, from: Point, to: Point, style: &LineStyle) {
        if !style.width.is_finite() || style.width <= 0.0 {
            return;
        }
        let mut pb = tiny_skia::PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        let Some(path) = pb.finish() else {
            return;
        };

        let stroke = tiny_skia::Stroke {
            width: style.width as f32,
            ..tiny_skia::Stroke::default()
        };
        self.pixmap.stroke_path(
            &path,
            &solid_paint(style.color, style.alpha),
            &stroke,
            tiny_skia::Transform::identity(),
            None,
        );
    }
}
