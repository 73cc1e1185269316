use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt::Write as _;

use kurbo::PathEl;

use crate::{
    foundation::core::{BezPath, Point, Rect, Vec2},
    random::sine_noise,
};

/// Shapes are drawn in a `0 0 1000 1000` viewBox around this point.
pub const VIEWBOX_CENTER: Point = Point::new(500.0, 500.0);
pub const VIEWBOX_SIZE: f64 = 1000.0;

pub const BLOB_POINTS: usize = 8;
const BLOB_BASE_RADIUS: f64 = 200.0;
const BLOB_ROUGHNESS: f64 = 0.3; // radius varies by +/- roughness / 2
const BLOB_ANGLE_JITTER: f64 = 0.3; // radians, +/- jitter / 2
const BLOB_HANDLE: f64 = 0.2; // control offset as a fraction of the base radius

const SQUARE_SIDE: f64 = 400.0;

/// Closed organic outline: eight jittered anchors joined by cubic segments whose handles
/// run perpendicular to each anchor's angle.
pub fn blob_bez_path(size: f64, seed: f64) -> BezPath {
    let base = finite_or_zero(BLOB_BASE_RADIUS * size);
    let seed = finite_or_zero(seed);

    let anchors: Vec<(Point, f64)> = (0..BLOB_POINTS)
        .map(|i| {
            let i = i as f64;
            let angle = i / BLOB_POINTS as f64 * TAU;
            let radius = base * (1.0 + (sine_noise(seed + i * 7.0) - 0.5) * BLOB_ROUGHNESS);
            let angle = angle + (sine_noise(seed + i * 11.0) - 0.5) * BLOB_ANGLE_JITTER;
            (VIEWBOX_CENTER + Vec2::from_angle(angle) * radius, angle)
        })
        .collect();

    let mut path = BezPath::new();
    path.move_to(anchors[0].0);
    for (i, &(p, a)) in anchors.iter().enumerate() {
        let (q, b) = anchors[(i + 1) % BLOB_POINTS];
        let h1 = p + Vec2::from_angle(a + FRAC_PI_2) * (base * BLOB_HANDLE);
        let h2 = q - Vec2::from_angle(b + FRAC_PI_2) * (base * BLOB_HANDLE);
        path.curve_to(h1, h2, q);
    }
    path.close_path();
    path
}

/// Axis-aligned rectangle matching `aspect` (width / height), or a square when no usable
/// aspect is given. The long side is `400 * size`.
pub fn square_bez_path(size: f64, aspect: Option<f64>) -> BezPath {
    let side = finite_or_zero(SQUARE_SIDE * size);
    let (w, h) = match aspect.filter(|a| a.is_finite() && *a > 0.0) {
        Some(a) if a > 1.0 => (side, side / a),
        Some(a) => (side * a, side),
        None => (side, side),
    };
    let r = Rect::from_center_size(VIEWBOX_CENTER, (w, h));

    let mut path = BezPath::new();
    path.move_to((r.x0, r.y0));
    path.line_to((r.x1, r.y0));
    path.line_to((r.x1, r.y1));
    path.line_to((r.x0, r.y1));
    path.close_path();
    path
}

pub fn generate_blob_path(size: f64, seed: f64) -> String {
    svg_path_data(&blob_bez_path(size, seed))
}

pub fn generate_square_path(size: f64, aspect: Option<f64>) -> String {
    svg_path_data(&square_bez_path(size, aspect))
}

/// Non-finite inputs (and products that overflow) collapse the shape to the center.
fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// `width / height`, when both are usable.
pub fn aspect_ratio(width: f64, height: f64) -> Option<f64> {
    (width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0)
        .then(|| width / height)
}

/// SVG `d` attribute text: `M x y`, ` C x1 y1, x2 y2, x y`, ` L x y`, closed by `z`.
pub fn svg_path_data(path: &BezPath) -> String {
    let mut out = String::new();
    for el in path.elements() {
        // Writing into a String cannot fail.
        let _ = match *el {
            PathEl::MoveTo(p) => write!(out, "M{} {}", p.x, p.y),
            PathEl::LineTo(p) => write!(out, " L{} {}", p.x, p.y),
            PathEl::QuadTo(c, p) => write!(out, " Q{} {}, {} {}", c.x, c.y, p.x, p.y),
            PathEl::CurveTo(c1, c2, p) => write!(
                out,
                " C{} {}, {} {}, {} {}",
                c1.x, c1.y, c2.x, c2.y, p.x, p.y
            ),
            PathEl::ClosePath => write!(out, "z"),
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape;

    #[test]
    fn blob_seed_one_has_eight_curves() {
        let d = generate_blob_path(1.0, 1.0);
        assert!(d.starts_with('M'));
        assert!(d.ends_with('z'));
        assert_eq!(d.matches('C').count(), 8);
        assert_eq!(d, generate_blob_path(1.0, 1.0));
    }

    #[test]
    fn blob_anchors_stay_within_roughness_band() {
        for seed in [0.0, 1.0, 42.0, 917.5] {
            let path = blob_bez_path(1.5, seed);
            let base = BLOB_BASE_RADIUS * 1.5;
            for el in path.elements() {
                if let PathEl::MoveTo(p) | PathEl::CurveTo(_, _, p) = *el {
                    let r = p.distance(VIEWBOX_CENTER);
                    assert!(r >= base * 0.85 - 1e-9 && r <= base * 1.15 + 1e-9);
                }
            }
        }
    }

    #[test]
    fn blob_closes_on_its_first_anchor() {
        let path = blob_bez_path(1.0, 3.0);
        let els = path.elements();
        let PathEl::MoveTo(start) = els[0] else {
            panic!("path must start with MoveTo");
        };
        let PathEl::CurveTo(_, _, end) = els[BLOB_POINTS] else {
            panic!("expected curve");
        };
        assert_eq!(start, end);
        assert_eq!(els[BLOB_POINTS + 1], PathEl::ClosePath);
    }

    #[test]
    fn non_finite_inputs_emit_parseable_path_data() {
        let cases = [
            generate_blob_path(f64::NAN, 1.0),
            generate_blob_path(1.0, f64::INFINITY),
            generate_blob_path(f64::MAX, f64::NEG_INFINITY),
            generate_square_path(f64::NAN, Some(1.5)),
            generate_square_path(f64::INFINITY, None),
        ];
        for d in cases {
            assert!(!d.contains("NaN") && !d.contains("inf"), "{d}");
            let path = BezPath::from_svg(&d).unwrap();
            assert_eq!(path.bounding_box().center(), VIEWBOX_CENTER);
        }
        assert_eq!(generate_blob_path(f64::NAN, 3.0), generate_blob_path(0.0, 3.0));
        assert_eq!(generate_blob_path(1.0, f64::NAN), generate_blob_path(1.0, 0.0));
    }

    #[test]
    fn output_parses_back() {
        let d = generate_blob_path(0.8, 12.0);
        let parsed = BezPath::from_svg(&d).unwrap();
        assert_eq!(parsed.elements().len(), BLOB_POINTS + 2);
    }

    #[test]
    fn square_follows_aspect() {
        assert_eq!(
            generate_square_path(1.0, None),
            "M300 300 L700 300 L700 700 L300 700z"
        );
        assert_eq!(
            generate_square_path(1.0, Some(2.0)),
            "M300 400 L700 400 L700 600 L300 600z"
        );
        assert_eq!(
            generate_square_path(1.0, Some(0.5)),
            "M400 300 L600 300 L600 700 L400 700z"
        );
        assert_eq!(
            generate_square_path(1.0, Some(f64::INFINITY)),
            generate_square_path(1.0, None)
        );
        assert_eq!(generate_square_path(1.0, Some(0.0)), generate_square_path(1.0, None));
    }

    #[test]
    fn aspect_ratio_rejects_degenerate_sizes() {
        assert_eq!(aspect_ratio(800.0, 400.0), Some(2.0));
        assert_eq!(aspect_ratio(800.0, 0.0), None);
        assert_eq!(aspect_ratio(f64::NAN, 1.0), None);
    }
}
