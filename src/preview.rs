use std::io::Cursor;

use anyhow::Context as _;

use crate::foundation::error::{InkgridError, InkgridResult};

const MAX_DIM: u32 = 8_192;

/// Rasterize an SVG document to straight-alpha RGBA8, scaled to fill `width` x `height`.
pub fn rasterize_svg(svg: &str, width: u32, height: u32) -> InkgridResult<image::RgbaImage> {
    if width == 0 || height == 0 {
        return Err(InkgridError::validation("preview size must be > 0"));
    }
    if width > MAX_DIM || height > MAX_DIM {
        return Err(InkgridError::validation(format!(
            "preview size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(svg.as_bytes(), &opts).context("parse svg tree")?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| InkgridError::render("failed to allocate preview pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    let mut data = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image::RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| InkgridError::render("preview buffer size mismatch"))
}

/// [`rasterize_svg`] encoded as PNG bytes.
#[tracing::instrument(skip(svg), fields(svg_len = svg.len()))]
pub fn rasterize_svg_png(svg: &str, width: u32, height: u32) -> InkgridResult<Vec<u8>> {
    let img = rasterize_svg(svg, width, height)?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .context("encode preview png")?;
    Ok(out.into_inner())
}
