//! Marker placement: decorative shapes anchored to locked vertices.
//!
//! Markers are keyed by the engine's vertex index; the engine owns the locked
//! records, this module only mirrors them. A marker exists exactly when its
//! vertex is locked and shape generation is enabled.

use std::collections::BTreeMap;
use std::f32::consts::TAU;

use glam::{Quat, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::engine::{LockedVertexRecord, LockedVertices};
use crate::params::{Features, MarkerParams, Rgb, ShapeKind};

impl ShapeKind {
    /// Triangle-list outline in the marker's local XY plane (+Z faces outward)
    pub fn triangles(self, size: f32, circle_segments: usize) -> Vec<Vec2> {
        match self {
            ShapeKind::Circle => {
                let segments = circle_segments.max(3);
                let mut out = Vec::with_capacity(segments * 3);
                for s in 0..segments {
                    let a0 = s as f32 / segments as f32 * TAU;
                    let a1 = (s + 1) as f32 / segments as f32 * TAU;
                    out.push(Vec2::ZERO);
                    out.push(Vec2::new(a0.cos(), a0.sin()) * size);
                    out.push(Vec2::new(a1.cos(), a1.sin()) * size);
                }
                out
            }
            ShapeKind::Square => {
                let (l, r) = (-size, size);
                vec![
                    Vec2::new(l, l),
                    Vec2::new(r, l),
                    Vec2::new(r, r),
                    Vec2::new(l, l),
                    Vec2::new(r, r),
                    Vec2::new(l, r),
                ]
            }
            ShapeKind::Triangle => vec![
                Vec2::new(-size, -size),
                Vec2::new(size, -size),
                Vec2::new(0.0, size),
            ],
        }
    }
}

/// A placed shape
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub vertex: usize,
    pub kind: ShapeKind,
    /// Half-extent in world units
    pub size: f32,
    pub color: Rgb,
    pub position: Vec3,
    pub orientation: Quat,
    /// Random twist about the outward axis, fixed at creation
    spin: f32,
}

impl Marker {
    fn new(
        vertex: usize,
        kind: ShapeKind,
        size: f32,
        record: &LockedVertexRecord,
        center: Vec3,
        spin: f32,
    ) -> Self {
        Self {
            vertex,
            kind,
            size,
            color: record.color,
            position: record.position,
            orientation: facing_outward(record.position, center, spin),
            spin,
        }
    }

    /// Move to `position`, re-facing away from `center`
    fn reposition(&mut self, position: Vec3, center: Vec3) {
        self.position = position;
        self.orientation = facing_outward(position, center, self.spin);
    }

    /// Unit normal of the marker plane
    pub fn normal(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    /// World-space triangle list for rendering
    pub fn world_triangles(&self, circle_segments: usize) -> Vec<Vec3> {
        self.kind
            .triangles(self.size, circle_segments)
            .into_iter()
            .map(|p| self.position + self.orientation * p.extend(0.0))
            .collect()
    }
}

/// Rotation taking local +Z to the outward direction, twisted by `spin` about it
fn facing_outward(position: Vec3, center: Vec3, spin: f32) -> Quat {
    let outward = (position - center).try_normalize().unwrap_or(Vec3::Z);
    Quat::from_rotation_arc(Vec3::Z, outward) * Quat::from_rotation_z(spin)
}

/// Owns all live markers
pub struct MarkerPlacement {
    markers: BTreeMap<usize, Marker>,
    center: Vec3,
    rng: StdRng,
}

impl MarkerPlacement {
    /// Markers face away from `center`; shape picks are seeded from the OS
    pub fn new(center: Vec3) -> Self {
        Self::with_rng(center, StdRng::from_os_rng())
    }

    /// Deterministic shape and spin picks
    pub fn with_seed(center: Vec3, seed: u64) -> Self {
        Self::with_rng(center, StdRng::seed_from_u64(seed))
    }

    fn with_rng(center: Vec3, rng: StdRng) -> Self {
        Self {
            markers: BTreeMap::new(),
            center,
            rng,
        }
    }

    /// Create markers for newly locked vertices
    ///
    /// Indices without a locked record, or that already carry a marker, are
    /// skipped. Returns the number of markers created.
    pub fn reconcile<L: LockedVertices>(
        &mut self,
        locked_delta: &[usize],
        locked: &L,
        params: &MarkerParams,
        features: &Features,
    ) -> usize {
        if !features.shape_generation {
            return 0;
        }

        let mut created = 0;
        for &index in locked_delta {
            if self.markers.contains_key(&index) {
                continue;
            }
            if let Some(record) = locked.record(index) {
                let marker = self.spawn(index, record, params);
                self.markers.insert(index, marker);
                created += 1;
            }
        }
        created
    }

    /// Per-frame maintenance
    ///
    /// Clears everything while shape generation is off. Otherwise retires
    /// markers whose vertex is no longer locked, creates any missing marker
    /// (e.g. after shape generation is switched back on) and snaps every
    /// marker to its vertex's frozen position.
    pub fn tick<L: LockedVertices>(
        &mut self,
        locked: &L,
        params: &MarkerParams,
        features: &Features,
    ) {
        if !features.shape_generation {
            self.markers.clear();
            return;
        }

        self.markers
            .retain(|&index, _| locked.record(index).is_some());

        locked.for_each_locked(|index, record| match self.markers.get_mut(&index) {
            Some(marker) => marker.reposition(record.position, self.center),
            None => {
                let marker = self.spawn(index, record, params);
                self.markers.insert(index, marker);
            }
        });
    }

    /// Destroy the marker for `vertex`, if any
    pub fn retire(&mut self, vertex: usize) -> Option<Marker> {
        self.markers.remove(&vertex)
    }

    pub fn get(&self, vertex: usize) -> Option<&Marker> {
        self.markers.get(&vertex)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    fn spawn(&mut self, index: usize, record: &LockedVertexRecord, params: &MarkerParams) -> Marker {
        let kinds = params.kinds.enabled();
        let kind = if kinds.is_empty() {
            ShapeKind::Circle
        } else {
            kinds[self.rng.random_range(0..kinds.len())]
        };
        let spin = self.rng.random_range(0.0..TAU);

        Marker::new(index, kind, params.world_size(), record, self.center, spin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ShapeKinds;
    use crate::sphere::engine::LockKind;

    impl LockedVertices for BTreeMap<usize, LockedVertexRecord> {
        fn record(&self, index: usize) -> Option<&LockedVertexRecord> {
            self.get(&index)
        }

        fn for_each_locked<F: FnMut(usize, &LockedVertexRecord)>(&self, mut f: F) {
            for (&index, record) in self {
                f(index, record);
            }
        }
    }

    fn record_at(position: Vec3) -> LockedVertexRecord {
        LockedVertexRecord {
            position,
            color: Rgb::new(1.0, 0.0, 0.0),
            kind: LockKind::Peak,
            amplitude: 0.9,
            locked_at_s: 10.0,
        }
    }

    fn locked_set(entries: &[(usize, Vec3)]) -> BTreeMap<usize, LockedVertexRecord> {
        entries
            .iter()
            .map(|&(i, p)| (i, record_at(p)))
            .collect()
    }

    #[test]
    fn test_reconcile_creates_one_marker_per_locked_vertex() {
        let locked = locked_set(&[(3, Vec3::X * 2.0), (7, Vec3::Y * 2.5)]);
        let mut placement = MarkerPlacement::with_seed(Vec3::ZERO, 1);
        let params = MarkerParams::default();
        let features = Features::default();

        assert_eq!(placement.reconcile(&[3, 7], &locked, &params, &features), 2);
        // Repeating the delta is a no-op
        assert_eq!(placement.reconcile(&[3, 7], &locked, &params, &features), 0);
        assert_eq!(placement.len(), 2);

        let marker = placement.get(7).unwrap();
        assert_eq!(marker.position, Vec3::Y * 2.5);
        assert_eq!(marker.color, Rgb::new(1.0, 0.0, 0.0));
        assert!((marker.size - params.world_size()).abs() < 1e-6);
    }

    #[test]
    fn test_no_marker_without_record() {
        let locked = locked_set(&[(1, Vec3::X)]);
        let mut placement = MarkerPlacement::with_seed(Vec3::ZERO, 2);

        let created = placement.reconcile(
            &[1, 99],
            &locked,
            &MarkerParams::default(),
            &Features::default(),
        );
        assert_eq!(created, 1);
        assert!(placement.get(99).is_none());
    }

    #[test]
    fn test_marker_faces_outward() {
        let locked = locked_set(&[(0, Vec3::new(0.0, 0.0, -3.0)), (1, Vec3::new(1.0, 1.0, 0.0))]);
        let mut placement = MarkerPlacement::with_seed(Vec3::ZERO, 3);
        placement.reconcile(&[0, 1], &locked, &MarkerParams::default(), &Features::default());

        let back = placement.get(0).unwrap();
        assert!((back.normal() - Vec3::NEG_Z).length() < 1e-4);

        let diagonal = placement.get(1).unwrap();
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((diagonal.normal() - expected).length() < 1e-4);

        // All outline points lie in the plane through the vertex
        for p in diagonal.world_triangles(8) {
            assert!((p - diagonal.position).dot(expected).abs() < 1e-4);
        }
    }

    #[test]
    fn test_tick_is_idempotent() {
        let locked = locked_set(&[(5, Vec3::new(0.5, 2.0, -1.0))]);
        let mut placement = MarkerPlacement::with_seed(Vec3::ZERO, 4);
        let params = MarkerParams::default();
        let features = Features::default();

        placement.reconcile(&[5], &locked, &params, &features);
        let first = placement.get(5).unwrap().clone();

        for _ in 0..10 {
            placement.tick(&locked, &params, &features);
        }
        assert_eq!(placement.get(5).unwrap(), &first);
    }

    #[test]
    fn test_tick_retires_markers_of_unlocked_vertices() {
        let mut locked = locked_set(&[(1, Vec3::X), (2, Vec3::Y)]);
        let mut placement = MarkerPlacement::with_seed(Vec3::ZERO, 5);
        let params = MarkerParams::default();
        let features = Features::default();

        placement.reconcile(&[1, 2], &locked, &params, &features);
        assert_eq!(placement.len(), 2);

        locked.remove(&1);
        placement.tick(&locked, &params, &features);
        assert_eq!(placement.len(), 1);
        assert!(placement.get(1).is_none());
        assert!(placement.get(2).is_some());
    }

    #[test]
    fn test_shape_generation_toggle_tracks_locked_count() {
        let locked = locked_set(&[(1, Vec3::X), (2, Vec3::Y), (3, Vec3::Z)]);
        let mut placement = MarkerPlacement::with_seed(Vec3::ZERO, 6);
        let params = MarkerParams::default();
        let mut features = Features::default();

        features.shape_generation = false;
        assert_eq!(placement.reconcile(&[1, 2, 3], &locked, &params, &features), 0);
        placement.tick(&locked, &params, &features);
        assert!(placement.is_empty());

        features.shape_generation = true;
        placement.tick(&locked, &params, &features);
        assert_eq!(placement.len(), 3);

        features.shape_generation = false;
        placement.tick(&locked, &params, &features);
        assert!(placement.is_empty());
    }

    #[test]
    fn test_kind_drawn_from_enabled_set() {
        let entries: Vec<(usize, Vec3)> = (0..40).map(|i| (i, Vec3::X)).collect();
        let locked = locked_set(&entries);
        let indices: Vec<usize> = (0..40).collect();

        let params = MarkerParams {
            kinds: ShapeKinds::from_list(&[ShapeKind::Square]),
            ..MarkerParams::default()
        };
        let mut placement = MarkerPlacement::with_seed(Vec3::ZERO, 7);
        placement.reconcile(&indices, &locked, &params, &Features::default());
        assert!(placement.iter().all(|m| m.kind == ShapeKind::Square));

        let none = MarkerParams {
            kinds: ShapeKinds::none(),
            ..MarkerParams::default()
        };
        let mut placement = MarkerPlacement::with_seed(Vec3::ZERO, 8);
        placement.reconcile(&indices, &locked, &none, &Features::default());
        assert!(placement.iter().all(|m| m.kind == ShapeKind::Circle));
    }

    #[test]
    fn test_all_kinds_eventually_drawn() {
        let entries: Vec<(usize, Vec3)> = (0..60).map(|i| (i, Vec3::Y)).collect();
        let locked = locked_set(&entries);
        let indices: Vec<usize> = (0..60).collect();

        let mut placement = MarkerPlacement::with_seed(Vec3::ZERO, 9);
        placement.reconcile(&indices, &locked, &MarkerParams::default(), &Features::default());

        for kind in ShapeKind::ALL {
            assert!(placement.iter().any(|m| m.kind == kind), "{:?} never drawn", kind);
        }
    }

    #[test]
    fn test_shape_geometry() {
        assert_eq!(ShapeKind::Triangle.triangles(1.0, 32).len(), 3);
        assert_eq!(ShapeKind::Square.triangles(1.0, 32).len(), 6);
        assert_eq!(ShapeKind::Circle.triangles(1.0, 32).len(), 96);

        let circle = ShapeKind::Circle.triangles(0.5, 16);
        assert!(circle.iter().all(|p| p.length() <= 0.5 + 1e-5));

        let square = ShapeKind::Square.triangles(0.5, 16);
        assert!(square
            .iter()
            .all(|p| (p.x.abs() - 0.5).abs() < 1e-6 && (p.y.abs() - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_retire() {
        let locked = locked_set(&[(4, Vec3::X)]);
        let mut placement = MarkerPlacement::with_seed(Vec3::ZERO, 10);
        placement.reconcile(&[4], &locked, &MarkerParams::default(), &Features::default());

        assert!(placement.retire(4).is_some());
        assert!(placement.retire(4).is_none());
        assert!(placement.is_empty());
    }
}
