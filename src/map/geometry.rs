use glam::DVec2;

use crate::braille::BrailleCanvas;

/// Split every edge of a polygon into pieces no longer than
/// `max_segment_length`, inserting evenly spaced interior points.
///
/// The input ring is expected to be explicitly closed (last vertex repeats
/// the first); the output ring is implicitly closed — the duplicate end
/// vertex is consumed, not emitted. Dense vertices are what keep long edges
/// from visibly bowing when a nonlinear projection is applied to them.
pub fn subdivide_polygon(xs: &[f64], ys: &[f64], max_segment_length: f64) -> (Vec<f64>, Vec<f64>) {
    let mut xso = Vec::with_capacity(xs.len());
    let mut yso = Vec::with_capacity(ys.len());
    for i in 0..xs.len().saturating_sub(1) {
        xso.push(xs[i]);
        yso.push(ys[i]);
        let j = i + 1;
        let d = DVec2::new(xs[i], ys[i]).distance(DVec2::new(xs[j], ys[j]));
        // Zero-length edge: ceil(0) = 0 subdivisions, handled by the loop bound
        let n = (d / max_segment_length).ceil();
        for k in 1..n as usize {
            let t = k as f64 / n;
            xso.push(xs[i] + t * (xs[j] - xs[i]));
            yso.push(ys[i] + t * (ys[j] - ys[i]));
        }
    }
    (xso, yso)
}

/// Ray-casting parity test: casts a ray from (x, y) straight down and
/// counts edge crossings; odd means inside. Vertical edges (xs[i] == xs[j])
/// are skipped. Points exactly on the boundary may land on either side —
/// a known limitation, acceptable for interactive selection.
pub fn point_in_polygon(x: f64, y: f64, xs: &[f64], ys: &[f64]) -> bool {
    let mut intersections = 0;
    for i in 0..xs.len() {
        let j = (i + 1) % xs.len();
        if xs[i] == xs[j] {
            continue;
        }
        if (xs[i] <= x && x < xs[j]) || (xs[j] <= x && x < xs[i]) {
            if (x - xs[i]) / (xs[j] - xs[i]) * (ys[j] - ys[i]) + ys[i] < y {
                intersections += 1;
            }
        }
    }
    intersections % 2 == 1
}

/// Draw a line using Bresenham's algorithm.
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Bresenham line with a 3-on / 3-off dash pattern, used for gesture
/// previews (zoom box, in-progress draw stroke).
pub fn draw_dashed_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;
    let mut step = 0u32;

    loop {
        if step % 6 < 3 {
            canvas.set_pixel_signed(x, y);
        }
        step += 1;

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Even-odd scanline fill of an implicitly closed polygon given in canvas
/// pixel coordinates. For each pixel row, edge crossings are collected,
/// sorted, and filled pairwise.
pub fn fill_polygon(canvas: &mut BrailleCanvas, xs: &[f64], ys: &[f64]) {
    if xs.len() < 3 {
        return;
    }

    let y_min = ys.iter().cloned().fold(f64::INFINITY, f64::min).floor().max(0.0) as i32;
    let y_max = ys
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max)
        .ceil()
        .min((canvas.pixel_height() as i32 - 1) as f64) as i32;

    let mut crossings: Vec<f64> = Vec::new();
    for y in y_min..=y_max {
        let yf = y as f64;
        crossings.clear();
        for i in 0..xs.len() {
            let j = (i + 1) % xs.len();
            if ys[i] == ys[j] {
                continue;
            }
            if (ys[i] <= yf && yf < ys[j]) || (ys[j] <= yf && yf < ys[i]) {
                crossings.push((yf - ys[i]) / (ys[j] - ys[i]) * (xs[j] - xs[i]) + xs[i]);
            }
        }
        crossings.sort_unstable_by(f64::total_cmp);
        for pair in crossings.chunks_exact(2) {
            let x0 = pair[0].ceil() as i32;
            let x1 = pair[1].floor() as i32;
            for x in x0..=x1 {
                canvas.set_pixel_signed(x, y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdivide_splits_long_edges() {
        // Closed unit square, edge length 1, max segment 0.3 → 4 pieces/edge
        let xs = [0.0, 1.0, 1.0, 0.0, 0.0];
        let ys = [0.0, 0.0, 1.0, 1.0, 0.0];
        let (sx, sy) = subdivide_polygon(&xs, &ys, 0.3);
        assert_eq!(sx.len(), sy.len());
        assert!(sx.len() >= xs.len() - 1);

        // No output edge longer than the limit (ring implicitly closed)
        for i in 0..sx.len() {
            let j = (i + 1) % sx.len();
            let d = DVec2::new(sx[i], sy[i]).distance(DVec2::new(sx[j], sy[j]));
            assert!(d <= 0.3 + 1e-12, "edge {} too long: {}", i, d);
        }
    }

    #[test]
    fn test_subdivide_keeps_short_edges() {
        let xs = [0.0, 0.1, 0.1, 0.0];
        let ys = [0.0, 0.0, 0.1, 0.0];
        let (sx, _) = subdivide_polygon(&xs, &ys, 1.0);
        assert_eq!(sx.len(), xs.len() - 1);
    }

    #[test]
    fn test_subdivide_zero_length_edge() {
        let xs = [0.5, 0.5, 0.5];
        let ys = [0.5, 0.5, 0.5];
        let (sx, sy) = subdivide_polygon(&xs, &ys, 0.1);
        assert_eq!(sx, vec![0.5, 0.5]);
        assert_eq!(sy, vec![0.5, 0.5]);
    }

    #[test]
    fn test_point_in_convex_polygon_centroid() {
        let xs = [0.0, 2.0, 2.0, 0.0];
        let ys = [0.0, 0.0, 2.0, 2.0];
        let cx = xs.iter().sum::<f64>() / 4.0;
        let cy = ys.iter().sum::<f64>() / 4.0;
        assert!(point_in_polygon(cx, cy, &xs, &ys));
    }

    #[test]
    fn test_point_far_outside_polygon() {
        let xs = [0.0, 2.0, 1.0];
        let ys = [0.0, 0.0, 2.0];
        assert!(!point_in_polygon(10.0, 10.0, &xs, &ys));
        assert!(!point_in_polygon(-5.0, 1.0, &xs, &ys));
    }

    #[test]
    fn test_point_in_triangle() {
        let xs = [0.0, 4.0, 2.0];
        let ys = [0.0, 0.0, 4.0];
        assert!(point_in_polygon(2.0, 1.0, &xs, &ys));
        assert!(!point_in_polygon(0.2, 3.0, &xs, &ys));
    }

    #[test]
    fn test_fill_polygon_interior() {
        let mut canvas = BrailleCanvas::new(4, 2);
        // 8x8 pixel canvas, fill a centered square
        let xs = [1.0, 6.0, 6.0, 1.0];
        let ys = [1.0, 1.0, 6.0, 6.0];
        fill_polygon(&mut canvas, &xs, &ys);
        let s = canvas.to_string();
        assert!(s.chars().any(|c| c != '\u{2800}'));
    }

    #[test]
    fn test_draw_line_endpoints() {
        let mut canvas = BrailleCanvas::new(5, 1);
        draw_line(&mut canvas, 0, 0, 9, 0);
        let s = canvas.to_string();
        assert!(!s.is_empty());
    }
}
