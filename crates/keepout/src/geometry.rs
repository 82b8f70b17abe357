//! Raster primitives on single-channel images.
//!
//! Everything clips silently at the image border; vertices may lie outside
//! the image.

use image::{GrayImage, Luma};

/// Pixel position `(x, y)`, x to the right and y down.
pub type Vertex = (i32, i32);

fn put(img: &mut GrayImage, x: i64, y: i64, value: u8) {
    if x >= 0 && y >= 0 && x < img.width() as i64 && y < img.height() as i64 {
        img.put_pixel(x as u32, y as u32, Luma([value]));
    }
}

/// Sets every pixel within `radius` of `center` (Euclidean, inclusive).
pub fn fill_disc(img: &mut GrayImage, center: Vertex, radius: u32, value: u8) {
    let r = radius as i64;
    let (cx, cy) = (center.0 as i64, center.1 as i64);
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                put(img, cx + dx, cy + dy, value);
            }
        }
    }
}

/// Bresenham segment from `a` to `b`, both ends included.
///
/// Thickness above 1 stamps a disc of radius `thickness / 2` at every step.
/// Segments are clipped to the image (plus the stamp radius) first.
pub fn draw_line(img: &mut GrayImage, a: Vertex, b: Vertex, thickness: u32, value: u8) {
    let radius = thickness / 2;
    let margin = radius as f64 + 1.0;
    let lo = (-margin, -margin);
    let hi = (img.width() as f64 + margin, img.height() as f64 + margin);
    let Some(((mut x, mut y), (x1, y1))) = clip_segment(a, b, lo, hi) else {
        return;
    };

    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if radius == 0 {
            put(img, x, y, value);
        } else {
            fill_disc(img, (x as i32, y as i32), radius, value);
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Liang-Barsky clip of `a -> b` against the rectangle `lo..=hi`.
///
/// Endpoints already inside are returned unchanged.
fn clip_segment(
    a: Vertex,
    b: Vertex,
    lo: (f64, f64),
    hi: (f64, f64),
) -> Option<((i64, i64), (i64, i64))> {
    let (x0, y0) = (a.0 as f64, a.1 as f64);
    let (dx, dy) = (b.0 as f64 - x0, b.1 as f64 - y0);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);

    for (p, q) in [(-dx, x0 - lo.0), (dx, hi.0 - x0), (-dy, y0 - lo.1), (dy, hi.1 - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| ((x0 + t * dx).round() as i64, (y0 + t * dy).round() as i64);
    Some((at(t0), at(t1)))
}

pub fn draw_polyline(
    img: &mut GrayImage,
    vertices: &[Vertex],
    closed: bool,
    thickness: u32,
    value: u8,
) {
    if let [only] = vertices {
        draw_line(img, *only, *only, thickness, value);
        return;
    }
    for pair in vertices.windows(2) {
        draw_line(img, pair[0], pair[1], thickness, value);
    }
    if closed && vertices.len() > 2 {
        draw_line(img, vertices[vertices.len() - 1], vertices[0], thickness, value);
    }
}

/// Fills the polygon's interior and its boundary with `value`.
///
/// Interior uses the even-odd rule sampled at integer pixel positions, so
/// self-intersecting outlines leave their doubly-covered parts unfilled.
pub fn fill_polygon(img: &mut GrayImage, vertices: &[Vertex], value: u8) {
    if vertices.is_empty() {
        return;
    }

    let min_y = vertices.iter().map(|v| v.1 as i64).min().unwrap_or(0).max(0);
    let max_y = vertices
        .iter()
        .map(|v| v.1 as i64)
        .max()
        .unwrap_or(0)
        .min(img.height() as i64 - 1);

    let mut crossings: Vec<f64> = Vec::new();
    for y in min_y..=max_y {
        crossings.clear();
        let yf = y as f64;
        for (i, &(x0, y0)) in vertices.iter().enumerate() {
            let (x1, y1) = vertices[(i + 1) % vertices.len()];
            let (y0, y1) = (y0 as f64, y1 as f64);
            // half-open in y so shared vertices count once
            if (y0 <= yf && yf < y1) || (y1 <= yf && yf < y0) {
                crossings.push(x0 as f64 + (yf - y0) * (x1 as f64 - x0 as f64) / (y1 - y0));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        for span in crossings.chunks_exact(2) {
            let start = span[0].ceil() as i64;
            let end = span[1].floor() as i64;
            for x in start.max(0)..=end.min(img.width() as i64 - 1) {
                put(img, x, y, value);
            }
        }
    }

    draw_polyline(img, vertices, true, 1, value);
}
