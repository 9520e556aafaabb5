use glam::DVec2;
use ratatui::style::Color;

use crate::data::MapInfo;
use crate::map::geometry::subdivide_polygon;
use crate::map::{BaseMap, GeoCoord, Projection, Shape, ShapeId, ShapeStore, ViewState};

/// Fill colors cycled with the color key.
pub const PALETTE: [Color; 6] = [
    Color::Green,
    Color::Yellow,
    Color::Cyan,
    Color::Magenta,
    Color::Blue,
    Color::LightRed,
];

/// Subdivision threshold for committed polygons, in map units. Dense rings
/// keep the spherical move transform from visibly bending long edges.
const MAX_SEGMENT_LENGTH: f64 = 0.01;

/// Minimum pixel distance between consecutive freehand vertices.
const MIN_STROKE_PX: f64 = 4.0;

/// Wheel and keyboard zoom step.
pub const ZOOM_STEP: f64 = 1.3;

/// What a mouse press means.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Pan,
    ZoomBox,
    Draw,
    Move,
    Rotate,
    Delete,
}

impl Tool {
    pub fn label(&self) -> &'static str {
        match self {
            Tool::Pan => "pan",
            Tool::ZoomBox => "zoom box",
            Tool::Draw => "draw",
            Tool::Move => "move",
            Tool::Rotate => "rotate",
            Tool::Delete => "delete",
        }
    }
}

/// In-flight mouse gesture. Move and Rotate manipulate a working clone
/// while the original stays hidden; the clone is committed back on release.
pub enum Gesture {
    Idle,
    Pan {
        last: DVec2,
    },
    ZoomBox {
        start: DVec2,
        current: DVec2,
    },
    Draw {
        xs: Vec<f64>,
        ys: Vec<f64>,
    },
    Move {
        id: ShapeId,
        working: Shape,
        anchor: GeoCoord,
    },
    Rotate {
        id: ShapeId,
        working: Shape,
        pivot: GeoCoord,
    },
}

/// Application state
pub struct App {
    pub maps: Vec<MapInfo>,
    pub map_index: usize,
    pub projection: Projection,
    pub view: ViewState,
    pub basemap: BaseMap,
    pub shapes: ShapeStore,
    pub tool: Tool,
    pub gesture: Gesture,
    /// Shape under the cursor on the last press, for selection highlight
    pub selected: Option<ShapeId>,
    pub color_index: usize,
    /// Current mouse position in document pixels, for cursor and readout
    pub mouse_pos: Option<DVec2>,
    pub should_quit: bool,
}

impl App {
    pub fn new(maps: Vec<MapInfo>, basemap: BaseMap, width: usize, height: usize) -> Self {
        let (pixel_width, pixel_height) = terminal_to_pixels(width, height);
        let map = &maps[0];
        let projection = Projection::from_config(&map.projection);
        let view = ViewState::new(map.aspect_ratio, pixel_width, pixel_height);
        Self {
            maps,
            map_index: 0,
            projection,
            view,
            basemap,
            shapes: ShapeStore::new(),
            tool: Tool::Pan,
            gesture: Gesture::Idle,
            selected: None,
            color_index: 0,
            mouse_pos: None,
            should_quit: false,
        }
    }

    pub fn current_map(&self) -> &MapInfo {
        &self.maps[self.map_index]
    }

    pub fn current_color(&self) -> Color {
        PALETTE[self.color_index % PALETTE.len()]
    }

    pub fn cycle_color(&mut self) {
        self.color_index = (self.color_index + 1) % PALETTE.len();
    }

    /// Switch to the next map in the catalog. Annotations live in map
    /// coordinates of the current projection, so they do not carry over.
    pub fn next_map(&mut self) {
        if self.maps.len() < 2 {
            return;
        }
        self.cancel_gesture();
        self.map_index = (self.map_index + 1) % self.maps.len();
        let map = &self.maps[self.map_index];
        self.projection = Projection::from_config(&map.projection);
        self.view.aspect_ratio = map.aspect_ratio;
        self.view.reset();
        self.shapes = ShapeStore::new();
        self.selected = None;
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        let (pw, ph) = terminal_to_pixels(width, height);
        self.view.set_size(pw, ph);
    }

    pub fn reset_view(&mut self) {
        self.view.reset();
    }

    pub fn zoom_in_at_cursor(&mut self) {
        self.zoom_at_cursor(ZOOM_STEP);
    }

    pub fn zoom_out_at_cursor(&mut self) {
        self.zoom_at_cursor(1.0 / ZOOM_STEP);
    }

    fn zoom_at_cursor(&mut self, factor: f64) {
        let at = match self.mouse_pos {
            Some(p) => self.view.document_to_canvas(p),
            None => DVec2::ZERO,
        };
        self.view.zoom_at(at, factor);
    }

    /// Keyboard pan by a document-pixel delta.
    pub fn pan_by_pixels(&mut self, dx: f64, dy: f64) {
        let c = DVec2::new(self.view.width as f64 / 2.0, self.view.height as f64 / 2.0);
        self.view.pan_drag(c + DVec2::new(dx, dy), c);
    }

    /// Map coordinates under the cursor, if the cursor is over the map
    /// proper (strictly inside the unit square).
    pub fn cursor_map_pos(&self) -> Option<DVec2> {
        let doc = self.mouse_pos?;
        let m = self.view.document_to_map(doc);
        if m.x.abs() < 1.0 && m.y.abs() < 1.0 {
            Some(m)
        } else {
            None
        }
    }

    pub fn mouse_moved(&mut self, doc: DVec2) {
        self.mouse_pos = Some(doc);
    }

    /// Left button pressed at document coordinates `doc`.
    pub fn press(&mut self, doc: DVec2) {
        self.mouse_pos = Some(doc);
        let map = self.view.document_to_map(doc);
        match self.tool {
            Tool::Pan => {
                self.gesture = Gesture::Pan { last: doc };
            }
            Tool::ZoomBox => {
                self.gesture = Gesture::ZoomBox {
                    start: doc,
                    current: doc,
                };
            }
            Tool::Draw => {
                self.gesture = Gesture::Draw {
                    xs: vec![doc.x],
                    ys: vec![doc.y],
                };
            }
            Tool::Move => {
                self.selected = self.shapes.shape_at(map.x, map.y);
                if let Some((id, working)) = self.grab_selected() {
                    self.gesture = Gesture::Move {
                        id,
                        working,
                        anchor: self.projection.inverse(map),
                    };
                }
            }
            Tool::Rotate => {
                self.selected = self.shapes.shape_at(map.x, map.y);
                if let Some((id, working)) = self.grab_selected() {
                    self.gesture = Gesture::Rotate {
                        id,
                        working,
                        pivot: self.projection.inverse(map),
                    };
                }
            }
            Tool::Delete => {
                if let Some(id) = self.shapes.shape_at(map.x, map.y) {
                    self.shapes.remove(id);
                    if self.selected == Some(id) {
                        self.selected = None;
                    }
                }
            }
        }
    }

    /// Hide the selected shape and hand out a visible working clone.
    fn grab_selected(&mut self) -> Option<(ShapeId, Shape)> {
        let id = self.selected?;
        let original = self.shapes.get_mut(id)?;
        original.hidden = true;
        let mut working = original.clone();
        working.hidden = false;
        Some((id, working))
    }

    /// Mouse dragged to document coordinates `doc` with the button held.
    pub fn drag(&mut self, doc: DVec2) {
        self.mouse_pos = Some(doc);
        let map = self.view.document_to_map(doc);
        // Spherical transforms only make sense while the cursor is over the
        // map; outside it the inverse projection is extrapolating.
        let on_map = map.x.abs() < 1.0 && map.y.abs() < 1.0;

        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Pan { last } => {
                let from = *last;
                *last = doc;
                self.view.pan_drag(from, doc);
            }
            Gesture::ZoomBox { current, .. } => {
                *current = doc;
            }
            Gesture::Draw { xs, ys } => {
                let last = DVec2::new(xs[xs.len() - 1], ys[ys.len() - 1]);
                if (doc - last).length() >= MIN_STROKE_PX {
                    xs.push(doc.x);
                    ys.push(doc.y);
                }
            }
            Gesture::Move {
                id,
                working,
                anchor,
            } => {
                if on_map {
                    if let Some(original) = self.shapes.get(*id) {
                        original.move_and_assign(
                            working,
                            &self.projection,
                            *anchor,
                            self.projection.inverse(map),
                        );
                    }
                }
            }
            Gesture::Rotate { id, working, pivot } => {
                if on_map {
                    if let Some(original) = self.shapes.get(*id) {
                        original.rotate_and_assign(
                            working,
                            &self.projection,
                            *pivot,
                            self.projection.inverse(map),
                        );
                    }
                }
            }
        }
    }

    /// Left button released: commit the gesture.
    pub fn release(&mut self, doc: DVec2) {
        self.drag(doc);
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle | Gesture::Pan { .. } => {}
            Gesture::ZoomBox { start, current } => {
                // A click without a real box is a no-op
                if (current - start).abs().min_element() > 1.0 {
                    self.view.zoom_to_box(start, current);
                }
            }
            Gesture::Draw { xs, ys } => {
                self.commit_drawn_polygon(&xs, &ys);
            }
            Gesture::Move { id, working, .. } | Gesture::Rotate { id, working, .. } => {
                if let Some(original) = self.shapes.get_mut(id) {
                    working.copy_to(original);
                    original.hidden = false;
                }
            }
        }
    }

    /// Abort the gesture without committing (tool switch, map switch).
    pub fn cancel_gesture(&mut self) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Move { id, .. } | Gesture::Rotate { id, .. } => {
                if let Some(original) = self.shapes.get_mut(id) {
                    original.hidden = false;
                }
            }
            _ => {}
        }
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if tool != self.tool {
            self.cancel_gesture();
            self.tool = tool;
        }
    }

    /// Convert a freehand document-space stroke into a stored polygon:
    /// map coordinates, closed ring, densely subdivided.
    fn commit_drawn_polygon(&mut self, doc_xs: &[f64], doc_ys: &[f64]) {
        if doc_xs.len() < 3 {
            return;
        }
        let mut xs = Vec::with_capacity(doc_xs.len() + 1);
        let mut ys = Vec::with_capacity(doc_ys.len() + 1);
        for i in 0..doc_xs.len() {
            let m = self.view.document_to_map(DVec2::new(doc_xs[i], doc_ys[i]));
            xs.push(m.x);
            ys.push(m.y);
        }
        xs.push(xs[0]);
        ys.push(ys[0]);

        let (xs, ys) = subdivide_polygon(&xs, &ys, MAX_SEGMENT_LENGTH);
        let id = self.shapes.insert(Shape::new(xs, ys, self.current_color()));
        self.selected = Some(id);
    }
}

/// Terminal cells → braille pixel dimensions of the drawable map area.
/// One cell each side for the border, one row for the status bar.
fn terminal_to_pixels(width: usize, height: usize) -> (usize, usize) {
    let inner_width = width.saturating_sub(2).max(1);
    let inner_height = height.saturating_sub(3).max(1);
    (inner_width * 2, inner_height * 4)
}
