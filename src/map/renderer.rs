use glam::DVec2;
use ratatui::style::Color;

use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_line, fill_polygon};
use crate::map::projection::{GeoCoord, Projection};
use crate::map::shape::Shape;
use crate::map::view::ViewState;

/// A geographic line (sequence of lon/lat coordinates, degrees)
pub type LineString = Vec<(f64, f64)>;

/// Level of detail for base map data
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Lod {
    Low,    // 110m - world view
    Medium, // 50m - continental
    High,   // 10m - regional
}

impl Lod {
    /// Select LOD based on zoom level
    pub fn from_zoom(zoom: f64) -> Self {
        if zoom < 2.0 {
            Lod::Low
        } else if zoom < 8.0 {
            Lod::Medium
        } else {
            Lod::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Lod::Low => "110m",
            Lod::Medium => "50m",
            Lod::High => "10m",
        }
    }
}

/// Multi-resolution coastline data drawn behind the annotations — the
/// terminal's stand-in for the raster map image.
pub struct BaseMap {
    coastlines_low: Vec<LineString>,
    coastlines_medium: Vec<LineString>,
    coastlines_high: Vec<LineString>,
}

impl BaseMap {
    pub fn new() -> Self {
        Self {
            coastlines_low: Vec::new(),
            coastlines_medium: Vec::new(),
            coastlines_high: Vec::new(),
        }
    }

    pub fn add_coastline(&mut self, line: LineString, lod: Lod) {
        match lod {
            Lod::Low => self.coastlines_low.push(line),
            Lod::Medium => self.coastlines_medium.push(line),
            Lod::High => self.coastlines_high.push(line),
        }
    }

    pub fn has_data(&self) -> bool {
        !self.coastlines_low.is_empty()
            || !self.coastlines_medium.is_empty()
            || !self.coastlines_high.is_empty()
    }

    /// Get coastlines for the given LOD, falling back to coarser data
    fn coastlines(&self, lod: Lod) -> &Vec<LineString> {
        match lod {
            Lod::High => {
                if !self.coastlines_high.is_empty() {
                    &self.coastlines_high
                } else if !self.coastlines_medium.is_empty() {
                    &self.coastlines_medium
                } else {
                    &self.coastlines_low
                }
            }
            Lod::Medium => {
                if !self.coastlines_medium.is_empty() {
                    &self.coastlines_medium
                } else {
                    &self.coastlines_low
                }
            }
            Lod::Low => &self.coastlines_low,
        }
    }

    /// Render the base map through the projection and view pipeline.
    pub fn render(&self, view: &ViewState, projection: &Projection) -> BrailleCanvas {
        let mut canvas = new_canvas(view);
        let lod = Lod::from_zoom(view.zoom);
        for line in self.coastlines(lod) {
            draw_geo_linestring(&mut canvas, line, view, projection);
        }
        canvas
    }
}

impl Default for BaseMap {
    fn default() -> Self {
        Self::new()
    }
}

/// One annotation ready for compositing: fill and outline are separate
/// canvases because they render in different colors.
pub struct ShapeLayer {
    pub fill: BrailleCanvas,
    pub outline: BrailleCanvas,
    pub color: Color,
    pub selected: bool,
}

/// Rasterize a shape's map-space ring into document-space fill and outline
/// layers.
pub fn render_shape(shape: &Shape, view: &ViewState, selected: bool) -> ShapeLayer {
    let mut fill = new_canvas(view);
    let mut outline = new_canvas(view);

    let n = shape.xs.len();
    let mut dxs = Vec::with_capacity(n);
    let mut dys = Vec::with_capacity(n);
    for i in 0..n {
        let p = view.map_to_document(DVec2::new(shape.xs[i], shape.ys[i]));
        dxs.push(p.x);
        dys.push(p.y);
    }

    fill_polygon(&mut fill, &dxs, &dys);
    for i in 0..n {
        let j = (i + 1) % n;
        draw_line(
            &mut outline,
            dxs[i] as i32,
            dys[i] as i32,
            dxs[j] as i32,
            dys[j] as i32,
        );
    }

    ShapeLayer {
        fill,
        outline,
        color: shape.color,
        selected,
    }
}

/// Draw the [-1,1]×[-1,1] map extent as a rectangle in document space.
/// Every pipeline stage is affine per axis, so the frame stays rectangular.
pub fn render_map_frame(view: &ViewState) -> BrailleCanvas {
    let mut canvas = new_canvas(view);
    let tl = view.map_to_document(DVec2::new(-1.0, 1.0));
    let br = view.map_to_document(DVec2::new(1.0, -1.0));
    let (x0, y0) = (tl.x as i32, tl.y as i32);
    let (x1, y1) = (br.x as i32, br.y as i32);
    draw_line(&mut canvas, x0, y0, x1, y0);
    draw_line(&mut canvas, x1, y0, x1, y1);
    draw_line(&mut canvas, x1, y1, x0, y1);
    draw_line(&mut canvas, x0, y1, x0, y0);
    canvas
}

/// Canvas sized to the view's pixel dimensions.
pub fn new_canvas(view: &ViewState) -> BrailleCanvas {
    BrailleCanvas::new(view.width.div_ceil(2), view.height.div_ceil(4))
}

/// Project and draw one geographic linestring with segment culling.
fn draw_geo_linestring(
    canvas: &mut BrailleCanvas,
    line: &LineString,
    view: &ViewState,
    projection: &Projection,
) {
    if line.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;

    for &(lon, lat) in line {
        let g = GeoCoord::from_degrees(lon, lat);
        if !projection.in_domain(g) {
            prev = None;
            continue;
        }
        let doc = view.map_to_document(projection.forward(g));
        let (px, py) = (doc.x as i32, doc.y as i32);

        if let Some((prev_x, prev_y)) = prev {
            // Long jumps are antimeridian wraps, not real segments
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < view.width && segment_might_be_visible(view, (prev_x, prev_y), (px, py)) {
                draw_line(canvas, prev_x, prev_y, px, py);
            }
        }

        prev = Some((px, py));
    }
}

/// Rough bounding box visibility check for a projected segment.
fn segment_might_be_visible(view: &ViewState, p1: (i32, i32), p2: (i32, i32)) -> bool {
    let min_x = p1.0.min(p2.0);
    let max_x = p1.0.max(p2.0);
    let min_y = p1.1.min(p2.1);
    let max_y = p1.1.max(p2.1);

    max_x >= 0 && min_x < view.width as i32 && max_y >= 0 && min_y < view.height as i32
}
