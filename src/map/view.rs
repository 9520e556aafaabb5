use glam::DVec2;

/// Pan/zoom state of the map view plus the canvas dimensions needed by the
/// coordinate pipeline. Three 2D spaces are chained, each stage exactly
/// invertible:
///
/// - document: canvas pixels, origin top-left, y-down
/// - canvas:   normalized [-1,1]×[-1,1], y-up, the visible window
/// - map:      normalized [-1,1]×[-1,1], pan/zoom independent — shapes
///             live here
///
/// Round-tripping document → map → document reproduces the input to
/// floating-point precision, which keeps drag gestures visually stable.
#[derive(Clone, Debug)]
pub struct ViewState {
    /// Map-plane point the viewport is centered on
    pub center: DVec2,
    /// Zoom factor, bounded to [min_zoom, max_zoom]
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Map image width/height ratio (from map metadata)
    pub aspect_ratio: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl ViewState {
    pub fn new(aspect_ratio: f64, width: usize, height: usize) -> Self {
        Self {
            center: DVec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 100.0,
            aspect_ratio,
            width,
            height,
        }
    }

    #[inline(always)]
    fn canvas_aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Document (pixel, y-down) → normalized canvas coordinates (y-up).
    pub fn document_to_canvas(&self, p: DVec2) -> DVec2 {
        DVec2::new(
            2.0 * p.x / self.width as f64 - 1.0,
            1.0 - 2.0 * p.y / self.height as f64,
        )
    }

    /// Normalized canvas coordinates → document pixels.
    pub fn canvas_to_document(&self, p: DVec2) -> DVec2 {
        DVec2::new(
            self.width as f64 * (p.x + 1.0) / 2.0,
            self.height as f64 * (1.0 - p.y) / 2.0,
        )
    }

    /// Canvas → map coordinates. Zoom is isotropic in on-screen distance:
    /// the canvas aspect cancels the image aspect on the x axis.
    pub fn canvas_to_map(&self, p: DVec2) -> DVec2 {
        DVec2::new(
            self.center.x + p.x * self.canvas_aspect() / (self.zoom * self.aspect_ratio),
            self.center.y + p.y / self.zoom,
        )
    }

    /// Map → canvas coordinates.
    pub fn map_to_canvas(&self, p: DVec2) -> DVec2 {
        DVec2::new(
            (p.x - self.center.x) * self.zoom * self.aspect_ratio / self.canvas_aspect(),
            (p.y - self.center.y) * self.zoom,
        )
    }

    /// Document → map coordinates (full pipeline).
    pub fn document_to_map(&self, p: DVec2) -> DVec2 {
        self.canvas_to_map(self.document_to_canvas(p))
    }

    /// Map → document coordinates (full pipeline).
    pub fn map_to_document(&self, p: DVec2) -> DVec2 {
        self.canvas_to_document(self.map_to_canvas(p))
    }

    /// Pan so that the map point under `from` (document coords) lands under
    /// `to`.
    pub fn pan_drag(&mut self, from: DVec2, to: DVec2) {
        self.center += self.document_to_map(from) - self.document_to_map(to);
    }

    /// Zoom by `factor`, keeping the map point at canvas coordinates `at`
    /// fixed on screen.
    pub fn zoom_at(&mut self, at: DVec2, factor: f64) {
        if (factor <= 1.0 && self.zoom <= self.min_zoom)
            || (factor >= 1.0 && self.zoom >= self.max_zoom)
        {
            return;
        }
        let map = self.canvas_to_map(at);
        let invf = 1.0 / factor;
        self.center = self.center * invf + map * (1.0 - invf);
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom) * factor;
    }

    /// Zoom as far as possible while keeping the document-space box
    /// (corners `a`, `b`) inside the viewport, centered on the box center.
    pub fn zoom_to_box(&mut self, a: DVec2, b: DVec2) {
        self.center = self.document_to_map((a + b) / 2.0);

        let ca = self.document_to_canvas(a);
        let cb = self.document_to_canvas(b);
        let w = (ca.x - cb.x).abs();
        let h = (ca.y - cb.y).abs();
        if w / h > 1.0 {
            self.zoom /= w / 2.0;
        } else {
            self.zoom /= h / 2.0;
        }
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Reset pan and zoom to the whole-map view.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.center = DVec2::ZERO;
    }

    /// Update canvas pixel dimensions (terminal resize).
    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width.max(1);
        self.height = height.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ViewState {
        let mut v = ViewState::new(2.0, 200, 100);
        v.center = DVec2::new(0.2, -0.1);
        v.zoom = 3.0;
        v
    }

    #[test]
    fn test_document_canvas_round_trip() {
        let v = view();
        for &(x, y) in &[(0.0, 0.0), (100.0, 50.0), (200.0, 100.0), (37.0, 91.0)] {
            let p = DVec2::new(x, y);
            let back = v.canvas_to_document(v.document_to_canvas(p));
            assert!((back - p).length() < 1e-12);
        }
    }

    #[test]
    fn test_document_map_round_trip() {
        let v = view();
        for &(x, y) in &[(0.0, 0.0), (13.0, 77.0), (199.0, 1.0)] {
            let p = DVec2::new(x, y);
            let back = v.map_to_document(v.document_to_map(p));
            assert!((back - p).length() < 1e-9);
        }
    }

    #[test]
    fn test_canvas_center_maps_to_view_center() {
        let v = view();
        let m = v.canvas_to_map(DVec2::ZERO);
        assert!((m - v.center).length() < 1e-12);
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut v = view();
        let at = DVec2::new(0.4, -0.3);
        let before = v.canvas_to_map(at);
        v.zoom_at(at, 1.3);
        let after = v.canvas_to_map(at);
        assert!((before - after).length() < 1e-12);
        assert!((v.zoom - 3.9).abs() < 1e-12);
    }

    #[test]
    fn test_zoom_clamped_at_limits() {
        let mut v = view();
        v.zoom = v.max_zoom;
        v.zoom_at(DVec2::ZERO, 1.3);
        assert_eq!(v.zoom, v.max_zoom);
        v.zoom = v.min_zoom;
        v.zoom_at(DVec2::ZERO, 1.0 / 1.3);
        assert_eq!(v.zoom, v.min_zoom);
    }

    #[test]
    fn test_pan_drag_carries_map_point() {
        let mut v = view();
        let from = DVec2::new(100.0, 50.0);
        let to = DVec2::new(120.0, 60.0);
        let grabbed = v.document_to_map(from);
        v.pan_drag(from, to);
        let now_under_to = v.document_to_map(to);
        assert!((grabbed - now_under_to).length() < 1e-12);
    }

    #[test]
    fn test_reset() {
        let mut v = view();
        v.reset();
        assert_eq!(v.zoom, 1.0);
        assert_eq!(v.center, DVec2::ZERO);
    }
}
