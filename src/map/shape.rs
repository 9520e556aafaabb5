use glam::DVec2;
use ratatui::style::Color;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::f64::consts::PI;

use crate::map::geometry::point_in_polygon;
use crate::map::projection::{GeoCoord, Projection};
use crate::map::sphere::{geo_to_xyz, rotate_about_axis, rotation_between, xyz_to_geo};

/// A polygon annotation stored in normalized map coordinates.
/// The vertex ring is implicitly closed: the last vertex connects back to
/// the first. `hidden` suppresses rendering of the original while a drag
/// gesture manipulates a working clone.
#[derive(Clone, Debug)]
pub struct Shape {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub color: Color,
    pub hidden: bool,
}

impl Shape {
    /// The fill color is supplied by the caller — the UI layer owns the
    /// active tool state, shapes just keep what they were given.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>, color: Color) -> Self {
        Self {
            xs,
            ys,
            color,
            hidden: false,
        }
    }

    /// Copy all fields of `self` into `target`. Used to commit a working
    /// clone back onto the original when a gesture ends.
    pub fn copy_to(&self, target: &mut Shape) {
        target.xs.clone_from(&self.xs);
        target.ys.clone_from(&self.ys);
        target.color = self.color;
        target.hidden = self.hidden;
    }

    /// Hit test in map coordinates.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        point_in_polygon(x, y, &self.xs, &self.ys)
    }

    /// Rigidly carry this shape along the great circle from `anchor` to
    /// `current` (both spherical), writing the result into `target`.
    ///
    /// Every vertex is lifted map → spherical → unit sphere, rotated about
    /// the axis normal to the anchor/current plane, and projected back.
    /// The polygon keeps its shape *on the sphere*, so dragging through a
    /// projection's distorted regions does not warp it. A degenerate axis
    /// (anchor ≈ current, or antipodal) is an identity transform.
    pub fn move_and_assign(
        &self,
        target: &mut Shape,
        projection: &Projection,
        anchor: GeoCoord,
        current: GeoCoord,
    ) {
        let u = geo_to_xyz(anchor);
        let v = geo_to_xyz(current);
        match rotation_between(u, v) {
            Some((axis, a)) => self.rotate_vertices(target, projection, axis, a),
            None => {
                target.xs.clone_from(&self.xs);
                target.ys.clone_from(&self.ys);
            }
        }
    }

    /// Rotate this shape about the sphere normal at `pivot`, writing the
    /// result into `target`. The rotation amount is the signed angle of the
    /// planar direction `current − pivot` against the reference direction
    /// (1, 0), rebuilt into [0, 2π) from the unsigned arccos by flipping
    /// when the y component is negative.
    ///
    /// The angle is measured in flat lon/lat space but applied as a
    /// spherical rotation — only approximately geodesic for large drags,
    /// and deliberately left that way to preserve the interactive feel.
    pub fn rotate_and_assign(
        &self,
        target: &mut Shape,
        projection: &Projection,
        pivot: GeoCoord,
        current: GeoCoord,
    ) {
        let d = DVec2::new(current.lon - pivot.lon, current.lat - pivot.lat);
        if d.length_squared() < 1e-24 {
            target.xs.clone_from(&self.xs);
            target.ys.clone_from(&self.ys);
            return;
        }
        let dir = d.normalize();
        let mut a = dir.x.clamp(-1.0, 1.0).acos();
        if d.y < 0.0 {
            a = 2.0 * PI - a;
        }
        self.rotate_vertices(target, projection, geo_to_xyz(pivot), a);
    }

    /// Shared lift/rotate/unlift pipeline for move and rotate. Vertices are
    /// independent, so the per-vertex work parallelizes cleanly.
    fn rotate_vertices(&self, target: &mut Shape, projection: &Projection, axis: glam::DVec3, a: f64) {
        let (xs, ys): (Vec<f64>, Vec<f64>) = self
            .xs
            .par_iter()
            .zip(self.ys.par_iter())
            .map(|(&x, &y)| {
                let g = projection.inverse(DVec2::new(x, y));
                let rotated = rotate_about_axis(geo_to_xyz(g), axis, a);
                let p = projection.forward(xyz_to_geo(rotated));
                (p.x, p.y)
            })
            .unzip();
        target.xs = xs;
        target.ys = ys;
    }
}

pub type ShapeId = u64;

/// Keyed shape collection with stable iteration order and monotonically
/// increasing IDs.
#[derive(Default)]
pub struct ShapeStore {
    shapes: BTreeMap<ShapeId, Shape>,
    next_id: ShapeId,
}

impl ShapeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, shape: Shape) -> ShapeId {
        let id = self.next_id;
        self.next_id += 1;
        self.shapes.insert(id, shape);
        id
    }

    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        self.shapes.remove(&id)
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, &Shape)> {
        self.shapes.iter().map(|(&id, s)| (id, s))
    }

    /// First shape containing the map point (x, y), if any.
    pub fn shape_at(&self, x: f64, y: f64) -> Option<ShapeId> {
        self.shapes
            .iter()
            .find(|(_, s)| s.contains(x, y))
            .map(|(&id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
