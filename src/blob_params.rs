//! Declarative blob requests, e.g. `size:1.2, seed:42, rotation:30, bleed:yes, x:420`.
//!
//! Pairs are comma-separated `key:value`. Recognized keys are `size`, `seed`, `rotation`,
//! `bleed`, `shape`, `x` and `y`. Unknown keys and pairs whose value does not parse are
//! dropped without error. A bare `true` or an empty string requests all defaults.

use std::fmt::Write as _;

use crate::{
    blob::{VIEWBOX_CENTER, VIEWBOX_SIZE, generate_blob_path, generate_square_path},
    foundation::core::{Affine, Point, Rgba8, Vec2},
    random::SeededRandom,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobShape {
    #[default]
    Blob,
    Square,
}

impl BlobShape {
    /// `square` selects the rectangle; anything else is an organic blob.
    pub fn from_name(name: &str) -> Self {
        if name == "square" {
            Self::Square
        } else {
            Self::Blob
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BlobParams {
    pub size: Option<f64>,
    pub seed: Option<i64>,
    pub rotation: Option<f64>, // degrees
    pub bleed: Option<bool>,
    pub shape: Option<BlobShape>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl BlobParams {
    pub fn parse(input: &str) -> Self {
        let mut params = Self::default();
        let input = input.trim();
        if input.is_empty() || input == "true" {
            return params;
        }

        for pair in input.split(',') {
            let mut parts = pair.split(':').map(str::trim);
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                continue;
            };
            if key.is_empty() || value.is_empty() {
                continue;
            }

            match key {
                "size" => params.size = parse_float(value).or(params.size),
                "seed" => params.seed = parse_int(value).or(params.seed),
                "rotation" => params.rotation = parse_float(value).or(params.rotation),
                "bleed" => params.bleed = Some(matches!(value, "y" | "yes" | "true")),
                "shape" => params.shape = Some(BlobShape::from_name(value)),
                "x" => params.x = parse_float(value).or(params.x),
                "y" => params.y = parse_float(value).or(params.y),
                _ => {}
            }
        }
        params
    }

    /// Fill every missing parameter from `rng`. Draw order is fixed: seed, rotation, x, y.
    /// A draw happens whether or not the value is overridden, so one parameter never
    /// shifts the defaults of the others.
    pub fn resolve(&self, rng: &mut SeededRandom) -> BlobSpec {
        let seed = rng.next_f64() * 1000.0;
        let rotation = rng.next_f64() * 360.0;
        let x = rng.next_f64() * 400.0 + 300.0;
        let y = rng.next_f64() * 400.0 + 300.0;

        BlobSpec {
            size: self.size.unwrap_or(1.0),
            seed: self.seed.map(|s| s as f64).unwrap_or(seed),
            rotation_deg: self.rotation.unwrap_or(rotation),
            position: Point::new(self.x.unwrap_or(x), self.y.unwrap_or(y)),
            bleed: self.bleed.unwrap_or(false),
            shape: self.shape.unwrap_or_default(),
        }
    }
}

/// Finite float, or `None`.
fn parse_float(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integer; a decimal value truncates toward zero.
fn parse_int(value: &str) -> Option<i64> {
    value
        .parse::<i64>()
        .ok()
        .or_else(|| parse_float(value).map(|v| v.trunc() as i64))
}

/// A fully specified overlay in the 1000x1000 viewBox.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct BlobSpec {
    pub size: f64,
    pub seed: f64,
    pub rotation_deg: f64,
    pub position: Point,
    pub bleed: bool,
    pub shape: BlobShape,
}

impl BlobSpec {
    /// Path data for this overlay. `aspect` is the host image's width / height and only
    /// matters for squares.
    pub fn path_data(&self, aspect: Option<f64>) -> String {
        match self.shape {
            BlobShape::Blob => generate_blob_path(self.size, self.seed),
            BlobShape::Square => generate_square_path(self.size, aspect),
        }
    }

    /// Move the shape center to `position`, then rotate about the viewBox center.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset())
            * Affine::rotate_about(self.rotation_deg.to_radians(), VIEWBOX_CENTER)
    }

    /// Standalone SVG document with the shape filled in `color`.
    pub fn preview_svg(&self, color: Rgba8, aspect: Option<f64>) -> String {
        let d = self.path_data(aspect);
        let t = self.transform().as_coeffs();
        let opacity = f64::from(color.a) / 255.0;
        let fill = Rgba8 { a: 255, ..color };

        let s = VIEWBOX_SIZE;
        let mut svg = String::new();
        let _ = write!(svg, r#"<svg xmlns="http://www.w3.org/2000/svg" "#);
        let _ = write!(svg, r#"viewBox="0 0 {s} {s}" width="{s}" height="{s}">"#);
        let _ = write!(
            svg,
            r#"<g transform="matrix({} {} {} {} {} {})">"#,
            t[0], t[1], t[2], t[3], t[4], t[5]
        );
        let _ = write!(
            svg,
            r#"<path d="{d}" fill="{fill}" fill-opacity="{opacity}"/></g></svg>"#
        );
        svg
    }

    /// Translation component of [`BlobSpec::transform`].
    pub fn offset(&self) -> Vec2 {
        self.position - VIEWBOX_CENTER
    }
}
