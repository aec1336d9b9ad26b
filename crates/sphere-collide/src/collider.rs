//! Sphere versus triangle penetration resolution.
//!
//! The collider pushes a sphere out of every triangle it overlaps, one
//! contact at a time. For each selector it queries candidates once, around
//! the sphere's position at that moment, then runs a bounded number of
//! resolution passes against that fixed candidate set:
//!
//! 1. Find the nearest contact among all candidates: a face hit when the
//!    centre projects inside the triangle, otherwise the closest edge or
//!    vertex.
//! 2. Propose moving the centre to exactly one radius away from the contact
//!    point, report the contact, and commit the move if the handler agrees.
//! 3. Stop when a pass finds no contact, or when the pass budget runs out.
//!
//! Candidates are not re-queried between passes. The query box is inflated
//! to `radius * QUERY_INFLATION` to absorb the small moves made in the
//! meantime.

use log::trace;
use nalgebra::{Point3, Vector3};

use crate::{Aabb, Triangle, TriangleSelector};

/// Half-extent of the per-selector query box, in multiples of the radius.
pub const QUERY_INFLATION: f32 = 1.25;

/// Default resolution pass budget per selector.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Which part of the triangle the sphere touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactFeature {
    /// The sphere centre projects inside the triangle.
    Face,
    /// The nearest point lies on edge `0..=2` (edge `i` runs from vertex `i` to `i + 1`),
    /// possibly at one of its end vertices.
    Edge(usize),
}

/// A contact found during resolution, handed to the contact handler.
#[derive(Clone, Copy)]
pub struct Contact<'c> {
    /// The selector that supplied the triangle.
    pub selector: &'c dyn TriangleSelector,
    /// The touched triangle, in world space.
    pub triangle: &'c Triangle,
    /// Nearest point on the triangle to the sphere centre.
    pub point: Point3<f32>,
    /// Sphere centre when the contact was found, before it is resolved.
    pub center: Point3<f32>,
    /// Face or edge contact.
    pub feature: ContactFeature,
}

impl Contact<'_> {
    /// Returns the edge index, or `-1` for a face contact.
    pub fn edge_index(&self) -> i32 {
        match self.feature {
            ContactFeature::Face => -1,
            ContactFeature::Edge(i) => i as i32,
        }
    }

    /// Returns the direction the sphere is pushed along.
    ///
    /// That is the face normal for face contacts and the unit vector from
    /// the contact point to the centre for edge contacts. An edge contact
    /// whose centre sits exactly on the edge falls back to the face normal.
    pub fn normal(&self) -> Vector3<f32> {
        match self.feature {
            ContactFeature::Face => self.triangle.normal(),
            ContactFeature::Edge(_) => edge_normal(self.center, self.point, self.triangle),
        }
    }
}

impl std::fmt::Debug for Contact<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contact")
            .field("selector", &self.selector.tag())
            .field("triangle", self.triangle)
            .field("point", &self.point)
            .field("center", &self.center)
            .field("feature", &self.feature)
            .finish()
    }
}

/// Work done by one [`Collider::collide`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Candidate triangle tests performed, summed over all passes.
    pub triangles_tested: usize,
    /// Resolution passes that found a contact.
    pub iterations: usize,
}

/// The best contact found in one pass.
struct Resolution {
    triangle: usize,
    point: Point3<f32>,
    feature: ContactFeature,
    resolved: Point3<f32>,
}

/// Resolves sphere penetration against the triangles of its selectors.
///
/// Selectors are queried in insertion order. The collider keeps no triangles
/// between calls; its scratch buffer is cleared after each selector.
pub struct Collider<'a> {
    selectors: Vec<Box<dyn TriangleSelector + 'a>>,
    candidates: Vec<Triangle>,
}

impl Default for Collider<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Collider<'a> {
    /// Creates a collider with no selectors.
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Creates a collider whose scratch buffer starts with room for `triangles` candidates.
    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            selectors: Vec::new(),
            candidates: Vec::with_capacity(triangles),
        }
    }

    /// Appends a selector. Selectors are queried in the order they were added.
    pub fn add_selector<S: TriangleSelector + 'a>(&mut self, selector: S) {
        self.selectors.push(Box::new(selector));
    }

    /// Appends an already boxed selector.
    pub fn add_boxed_selector(&mut self, selector: Box<dyn TriangleSelector + 'a>) {
        self.selectors.push(selector);
    }

    /// Returns the selectors in query order.
    pub fn selectors(&self) -> &[Box<dyn TriangleSelector + 'a>] {
        &self.selectors
    }

    /// Returns the number of selectors.
    pub fn selector_count(&self) -> usize {
        self.selectors.len()
    }

    /// Returns the total triangle count over all selectors.
    pub fn triangle_count(&self) -> usize {
        self.selectors.iter().map(|s| s.count()).sum()
    }

    /// Resolves a sphere with the default pass budget.
    ///
    /// See [`Collider::collide_with_iterations`].
    pub fn collide<H>(&mut self, position: &mut Point3<f32>, radius: f32, handler: H) -> CollisionStats
    where
        H: FnMut(&Contact<'_>) -> bool,
    {
        self.collide_with_iterations(position, radius, DEFAULT_MAX_ITERATIONS, handler)
    }

    /// Pushes the sphere at `position` out of every triangle it penetrates.
    ///
    /// `handler` sees each contact before it is resolved; returning `false`
    /// keeps the sphere where it is for that pass. `position` holds the final
    /// resolved centre on return. Passes are capped at `max_iterations` per
    /// selector; if the cap is reached the best position so far is kept.
    pub fn collide_with_iterations<H>(
        &mut self,
        position: &mut Point3<f32>,
        radius: f32,
        max_iterations: usize,
        mut handler: H,
    ) -> CollisionStats
    where
        H: FnMut(&Contact<'_>) -> bool,
    {
        let mut stats = CollisionStats::default();
        let Self {
            selectors,
            candidates,
        } = self;

        for selector in selectors.iter() {
            let query = Aabb::from_center_half_extent(*position, radius * QUERY_INFLATION);
            selector.select(&query, candidates);

            for _ in 0..max_iterations {
                stats.triangles_tested += candidates.len();

                let Some(resolution) = nearest_contact(candidates, *position, radius) else {
                    break;
                };

                let contact = Contact {
                    selector: &**selector,
                    triangle: &candidates[resolution.triangle],
                    point: resolution.point,
                    center: *position,
                    feature: resolution.feature,
                };

                if handler(&contact) {
                    *position = resolution.resolved;
                }
                stats.iterations += 1;
            }

            candidates.clear();
        }

        trace!(
            "collide: {} triangles tested in {} iterations",
            stats.triangles_tested, stats.iterations
        );
        stats
    }
}

/// Scans every candidate and returns the nearest penetrating contact.
///
/// Face hits are preferred per triangle: edges are only tested when the
/// triangle did not improve the nearest distance with a face hit.
fn nearest_contact(candidates: &[Triangle], center: Point3<f32>, radius: f32) -> Option<Resolution> {
    let mut nearest = f32::MAX;
    let mut best = None;

    for (index, triangle) in candidates.iter().enumerate() {
        let normal = triangle.normal();

        if let Some((t, point)) = triangle.intersect(center, -normal) {
            if t > 0.0 && t < nearest && t < radius {
                nearest = t;
                best = Some(Resolution {
                    triangle: index,
                    point,
                    feature: ContactFeature::Face,
                    resolved: point + normal * radius,
                });
                continue;
            }
        }

        for edge in 0..3 {
            let point = triangle.closest_point_on_edge(edge, center);
            let distance = (center - point).norm();

            if distance < radius && distance < nearest {
                nearest = distance;
                best = Some(Resolution {
                    triangle: index,
                    point,
                    feature: ContactFeature::Edge(edge),
                    resolved: point + edge_normal(center, point, triangle) * radius,
                });
            }
        }
    }

    best
}

/// Unit vector from `point` to `center`, or the face normal when they coincide.
fn edge_normal(center: Point3<f32>, point: Point3<f32>, triangle: &Triangle) -> Vector3<f32> {
    (center - point)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(|| triangle.normal())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DynamicTriangleSelector, StaticTriangleSelector};
    use approx::assert_relative_eq;
    use nalgebra::{Matrix4, Translation3};
    use std::cell::{Cell, RefCell};

    fn make_triangle(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Triangle {
        Triangle::new(
            Point3::new(a[0], a[1], a[2]),
            Point3::new(b[0], b[1], b[2]),
            Point3::new(c[0], c[1], c[2]),
        )
    }

    /// Upward-facing right triangle with legs of 20 along +X and +Z.
    fn floor() -> Triangle {
        make_triangle([0.0, 0.0, 0.0], [20.0, 0.0, 0.0], [0.0, 0.0, 20.0])
    }

    /// A wall in the plane x = 0 facing +X.
    fn wall() -> Triangle {
        make_triangle([0.0, 0.0, 0.0], [0.0, 0.0, 20.0], [0.0, 20.0, 0.0])
    }

    /// Returns nothing, but remembers every query box it is handed.
    struct RecordingSelector<'q> {
        queries: &'q RefCell<Vec<Aabb>>,
    }

    impl TriangleSelector for RecordingSelector<'_> {
        fn count(&self) -> usize {
            0
        }

        fn tag(&self) -> Option<crate::SelectorTag> {
            None
        }

        fn select(&self, bounds: &Aabb, _triangles: &mut Vec<Triangle>) {
            self.queries.borrow_mut().push(*bounds);
        }
    }

    fn collider_with(triangles: Vec<Triangle>) -> Collider<'static> {
        let mut collider = Collider::new();
        collider.add_selector(StaticTriangleSelector::from_triangles(triangles, 16));
        collider
    }

    #[test]
    fn wall_faces_positive_x() {
        assert_relative_eq!(wall().normal(), Vector3::x());
    }

    #[test]
    fn no_contact_leaves_position_untouched() {
        let mut collider = collider_with(vec![floor()]);
        let mut position = Point3::new(5.0, 10.0, 5.0);
        let mut calls = 0;

        let stats = collider.collide(&mut position, 2.0, |_| {
            calls += 1;
            true
        });

        assert_eq!(position, Point3::new(5.0, 10.0, 5.0));
        assert_eq!(calls, 0);
        assert_eq!(stats.iterations, 0);
    }

    #[test]
    fn face_contact_rests_one_radius_above_plane() {
        let mut collider = collider_with(vec![floor()]);
        let mut position = Point3::new(5.0, 1.5, 5.0);
        let mut edges = Vec::new();

        let stats = collider.collide(&mut position, 2.0, |contact| {
            edges.push(contact.edge_index());
            assert_eq!(contact.feature, ContactFeature::Face);
            assert_relative_eq!(contact.point, Point3::new(5.0, 0.0, 5.0));
            assert_relative_eq!(contact.normal(), Vector3::y());
            true
        });

        assert_relative_eq!(position, Point3::new(5.0, 2.0, 5.0));
        assert_eq!(edges, vec![-1]);
        assert_eq!(stats.iterations, 1);
        assert_eq!(stats.triangles_tested, 2);
    }

    #[test]
    fn falling_sphere_settles_on_face() {
        let mut collider = collider_with(vec![floor()]);
        let mut position = Point3::new(4.0, 20.0, 6.0);

        for _ in 0..40 {
            position.y -= 0.9;
            collider.collide(&mut position, 2.0, |contact| {
                assert_eq!(contact.edge_index(), -1);
                true
            });
        }

        assert_relative_eq!(position.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(floor().plane().signed_distance(position), 2.0, epsilon = 1e-5);
    }

    #[test]
    fn edge_contact_outside_face() {
        let mut collider = collider_with(vec![floor()]);
        // Just beyond edge 0 (z = 0 side), slightly above the plane.
        let mut position = Point3::new(8.0, 0.5, -1.0);
        let mut seen = None;

        collider.collide(&mut position, 2.0, |contact| {
            seen.get_or_insert((contact.feature, contact.point, contact.normal()));
            true
        });

        let (feature, point, normal) = seen.unwrap();
        assert_eq!(feature, ContactFeature::Edge(0));
        assert_relative_eq!(point, Point3::new(8.0, 0.0, 0.0));
        assert_relative_eq!(normal, Vector3::new(0.0, 0.5, -1.0).normalize(), epsilon = 1e-6);
        assert_relative_eq!((position - point).norm(), 2.0, epsilon = 1e-5);
        assert_relative_eq!(position, Point3::new(8.0, 0.0, 0.0) + normal * 2.0, epsilon = 1e-5);
    }

    #[test]
    fn vertex_contact_reports_nearest_edge() {
        let mut collider = collider_with(vec![floor()]);
        // Past the corner at vertex 1 (20, 0, 0).
        let mut position = Point3::new(21.0, 0.0, -1.0);
        let mut seen = None;

        collider.collide(&mut position, 2.0, |contact| {
            seen.get_or_insert((contact.edge_index(), contact.point));
            true
        });

        let (edge, point) = seen.unwrap();
        assert_eq!(edge, 0);
        assert_eq!(point, Point3::new(20.0, 0.0, 0.0));
        assert_relative_eq!((position - point).norm(), 2.0, epsilon = 1e-5);
    }

    #[test]
    fn below_the_plane_is_not_a_face_hit() {
        let mut collider = collider_with(vec![floor()]);
        let mut position = Point3::new(5.0, -1.0, 5.0);
        let mut calls = 0;

        collider.collide(&mut position, 0.5, |_| {
            calls += 1;
            true
        });

        assert_eq!(calls, 0);
        assert_eq!(position, Point3::new(5.0, -1.0, 5.0));
    }

    #[test]
    fn rejected_contact_is_not_committed() {
        let mut collider = collider_with(vec![floor()]);
        let mut position = Point3::new(5.0, 1.0, 5.0);
        let mut calls = 0;

        let stats = collider.collide_with_iterations(&mut position, 2.0, 3, |_| {
            calls += 1;
            false
        });

        assert_eq!(position, Point3::new(5.0, 1.0, 5.0));
        assert_eq!(calls, 3);
        assert_eq!(stats.iterations, 3);
        assert_eq!(stats.triangles_tested, 3);
    }

    #[test]
    fn corner_wedge_resolves_against_both_surfaces() {
        let mut collider = collider_with(vec![floor(), wall()]);
        let mut position = Point3::new(1.0, 1.0, 5.0);

        let stats = collider.collide(&mut position, 2.0, |_| true);

        assert!(stats.iterations >= 2);
        assert_relative_eq!(position, Point3::new(2.0, 2.0, 5.0), epsilon = 1e-5);
    }

    #[test]
    fn iteration_cap_keeps_best_position_so_far() {
        let mut collider = collider_with(vec![floor(), wall()]);
        let mut position = Point3::new(1.0, 1.0, 5.0);

        let stats = collider.collide_with_iterations(&mut position, 2.0, 1, |_| true);

        assert_eq!(stats.iterations, 1);
        // Only the nearer surface has been resolved.
        assert!(position.x < 2.0 || position.y < 2.0);
        assert!(position.x >= 1.0 && position.y >= 1.0);
    }

    #[test]
    fn candidates_are_queried_once_per_selector() {
        let transform = Cell::new(Matrix4::<f32>::identity());
        let mut collider = Collider::new();
        collider.add_selector(DynamicTriangleSelector::from_triangles(&transform, vec![floor()]));

        let mut position = Point3::new(5.0, 1.0, 5.0);
        let mut calls = 0;
        let stats = collider.collide(&mut position, 2.0, |_| {
            // Moving the mesh mid-call does not change the candidates already selected.
            transform.set(Translation3::new(0.0, 1000.0, 0.0).to_homogeneous());
            calls += 1;
            false
        });

        assert_eq!(calls, DEFAULT_MAX_ITERATIONS);
        assert_eq!(stats.iterations, DEFAULT_MAX_ITERATIONS);

        // The next call queries the moved mesh and finds nothing.
        let stats = collider.collide(&mut position, 2.0, |_| true);
        assert_eq!(stats.iterations, 0);
        assert_eq!(stats.triangles_tested, 0);
    }

    #[test]
    fn selectors_are_visited_in_insertion_order() {
        let mut collider = Collider::new();
        collider.add_selector(StaticTriangleSelector::from_triangles(vec![floor()], 16).with_tag(1));
        collider.add_selector(StaticTriangleSelector::from_triangles(vec![wall()], 16).with_tag(2));
        assert_eq!(collider.selector_count(), 2);
        assert_eq!(collider.triangle_count(), 2);

        let mut position = Point3::new(1.0, 1.0, 5.0);
        let mut tags = Vec::new();
        collider.collide(&mut position, 2.0, |contact| {
            tags.push(contact.selector.tag());
            true
        });

        assert_eq!(tags, vec![Some(1), Some(2)]);
        assert_relative_eq!(position, Point3::new(2.0, 2.0, 5.0), epsilon = 1e-5);
    }

    #[test]
    fn query_box_is_inflated_around_the_current_position() {
        let queries = RefCell::new(Vec::new());
        let mut collider = Collider::new();
        collider.add_selector(StaticTriangleSelector::from_triangles(vec![floor()], 16));
        collider.add_selector(RecordingSelector { queries: &queries });

        let mut position = Point3::new(5.0, 1.0, 5.0);
        collider.collide(&mut position, 2.0, |_| true);

        // The floor lifted the sphere to y = 2 before the second selector was queried.
        let queries = queries.borrow();
        assert_eq!(queries.len(), 1);
        assert_relative_eq!(queries[0].min(), Point3::new(2.5, -0.5, 2.5));
        assert_relative_eq!(queries[0].max(), Point3::new(7.5, 4.5, 7.5));
    }

    #[test]
    fn later_selectors_see_the_corrected_position() {
        // Faces down, 3.5 above the floor: out of reach of the starting query box.
        let ceiling = make_triangle([0.0, 3.5, 0.0], [0.0, 3.5, 20.0], [20.0, 3.5, 0.0]);
        let world = Matrix4::<f32>::identity();

        let mut collider = Collider::new();
        collider.add_selector(StaticTriangleSelector::from_triangles(vec![floor()], 16).with_tag(1));
        collider.add_selector(DynamicTriangleSelector::from_triangles(&world, vec![ceiling]).with_tag(2));

        let mut position = Point3::new(5.0, 0.5, 5.0);
        let mut tags = Vec::new();
        collider.collide(&mut position, 2.0, |contact| {
            tags.push(contact.selector.tag());
            true
        });

        assert_eq!(tags, vec![Some(1), Some(2)]);
        assert_relative_eq!(position, Point3::new(5.0, 1.5, 5.0), epsilon = 1e-5);
    }
}
