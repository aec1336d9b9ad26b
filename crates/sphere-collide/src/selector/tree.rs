//! Static triangle selector backed by an octree.

use log::debug;
use nalgebra::{Matrix4, Point3};

use crate::{Aabb, MeshData, MeshError, Triangle, triangles_from_positions};

use super::node::OctreeNode;
use super::{SelectorTag, TriangleSelector};

/// Padding added around the scene bounds before the tree is built.
const ROOT_PADDING: f32 = 1.0;

/// A selector over fixed world-space geometry.
///
/// The triangles are partitioned once into an octree at construction and are
/// immutable afterwards. Queries walk only the nodes whose boxes overlap the
/// query box.
///
/// # Construction
///
/// ```ignore
/// use sphere_collide::StaticTriangleSelector;
/// use nalgebra::Matrix4;
///
/// let selector = StaticTriangleSelector::new(&Matrix4::identity(), &positions, 16)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticTriangleSelector {
    root: Option<OctreeNode>,
    count: usize,
    tag: Option<SelectorTag>,
}

impl StaticTriangleSelector {
    /// Builds a selector from unindexed positions, three per triangle.
    ///
    /// Positions are transformed by `world` first. The root box is the tight
    /// bounds of the transformed positions padded by one unit on every side.
    pub fn new(
        world: &Matrix4<f32>,
        positions: &[Point3<f32>],
        min_triangles_per_node: usize,
    ) -> Result<Self, MeshError> {
        let world_positions: Vec<Point3<f32>> =
            positions.iter().map(|p| world.transform_point(p)).collect();
        let triangles = triangles_from_positions(&world_positions)?;

        Ok(Self::from_triangles(triangles, min_triangles_per_node))
    }

    /// Builds a selector from mesh data placed in the world by `world`.
    pub fn from_mesh(
        world: &Matrix4<f32>,
        mesh: &MeshData,
        min_triangles_per_node: usize,
    ) -> Result<Self, MeshError> {
        let triangles = mesh.transformed(world).triangles()?;
        Ok(Self::from_triangles(triangles, min_triangles_per_node))
    }

    /// Builds a selector from triangles that are already in world space.
    ///
    /// An empty list gives a selector that never returns anything.
    pub fn from_triangles(triangles: Vec<Triangle>, min_triangles_per_node: usize) -> Self {
        let count = triangles.len();
        let bounds = Aabb::from_points(triangles.iter().flat_map(|t| t.vertices().iter()));

        let root = bounds.map(|b| {
            OctreeNode::build(b.inflated(ROOT_PADDING), triangles, min_triangles_per_node)
        });

        if let Some(ref node) = root {
            debug!(
                "static selector built: {} triangles, {} nodes, depth {}",
                count,
                node.node_count(),
                node.depth()
            );
        }

        Self {
            root,
            count,
            tag: None,
        }
    }

    /// Attaches an owner tag.
    pub fn with_tag(mut self, tag: SelectorTag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Returns `true` if the selector holds no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns a reference to the root node, if any.
    #[inline]
    pub fn root(&self) -> Option<&OctreeNode> {
        self.root.as_ref()
    }

    /// Returns the root box, if the selector holds any triangles.
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.as_ref().map(|n| *n.bounds())
    }

    /// Returns the maximum depth of the tree (0 for an empty selector).
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.depth())
    }

    /// Returns the number of octree nodes (0 for an empty selector).
    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.node_count())
    }
}

impl TriangleSelector for StaticTriangleSelector {
    fn count(&self) -> usize {
        self.count
    }

    fn tag(&self) -> Option<SelectorTag> {
        self.tag
    }

    fn select(&self, bounds: &Aabb, triangles: &mut Vec<Triangle>) {
        if let Some(ref root) = self.root {
            root.select(bounds, triangles);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Translation3, Vector3};

    fn make_triangle(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Triangle {
        Triangle::new(
            Point3::new(a[0], a[1], a[2]),
            Point3::new(b[0], b[1], b[2]),
            Point3::new(c[0], c[1], c[2]),
        )
    }

    /// Scatters small triangles over a 4x4x4 grid of cells, plus a few large
    /// ones that straddle split planes.
    fn scene() -> Vec<Triangle> {
        let mut tris = Vec::new();
        for i in 0..4 {
            for j in 0..4 {
                for k in 0..4 {
                    let (x, y, z) = (i as f32 * 10.0, j as f32 * 10.0, k as f32 * 10.0);
                    tris.push(make_triangle(
                        [x + 1.0, y + 1.0, z + 1.0],
                        [x + 3.0, y + 1.0, z + 1.0],
                        [x + 1.0, y + 1.0, z + 3.0],
                    ));
                }
            }
        }
        tris.push(make_triangle([0.0, 0.0, 0.0], [40.0, 0.0, 0.0], [0.0, 0.0, 40.0]));
        tris.push(make_triangle([5.0, 20.0, 5.0], [35.0, 20.0, 5.0], [5.0, 20.0, 35.0]));
        tris
    }

    fn sort_key(t: &Triangle) -> Vec<u32> {
        t.vertices()
            .iter()
            .flat_map(|v| [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()])
            .collect()
    }

    fn sorted(mut tris: Vec<Triangle>) -> Vec<Triangle> {
        tris.sort_by_key(sort_key);
        tris
    }

    #[test]
    fn empty_selector() {
        let selector = StaticTriangleSelector::from_triangles(vec![], 4);
        assert!(selector.is_empty());
        assert_eq!(selector.count(), 0);
        assert_eq!(selector.depth(), 0);
        assert!(selector.bounds().is_none());

        let mut out = Vec::new();
        let everything = Aabb::from_center_half_extent(Point3::origin(), 1e6);
        selector.select(&everything, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn new_rejects_partial_triangle() {
        let positions = vec![Point3::origin(); 4];
        let result = StaticTriangleSelector::new(&Matrix4::identity(), &positions, 4);
        assert_eq!(result.unwrap_err(), MeshError::PositionCount(4));
    }

    #[test]
    fn new_rejects_nan_vertex() {
        let mut positions = vec![Point3::origin(); 3];
        positions[2].z = f32::NAN;
        let result = StaticTriangleSelector::new(&Matrix4::identity(), &positions, 4);
        assert_eq!(result.unwrap_err(), MeshError::NonFinite { index: 2 });
    }

    #[test]
    fn new_applies_world_transform_and_padding() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 2.0),
        ];
        let world = Translation3::new(10.0, 0.0, 0.0).to_homogeneous();
        let selector = StaticTriangleSelector::new(&world, &positions, 4).unwrap();

        let bounds = selector.bounds().unwrap();
        assert_eq!(bounds.min(), Point3::new(9.0, -1.0, -1.0));
        assert_eq!(bounds.max(), Point3::new(13.0, 1.0, 3.0));
        assert_eq!(selector.count(), 1);
    }

    #[test]
    fn full_query_returns_input_multiset_in_any_order() {
        let forward = scene();
        let mut reversed = scene();
        reversed.reverse();
        let mut rotated = scene();
        rotated.rotate_left(17);

        for input in [forward.clone(), reversed, rotated] {
            let selector = StaticTriangleSelector::from_triangles(input, 4);
            assert_eq!(selector.count(), forward.len());
            assert!(selector.depth() > 1);

            let mut out = Vec::new();
            selector.select(&selector.bounds().unwrap(), &mut out);
            assert_eq!(sorted(out), sorted(forward.clone()));
        }
    }

    #[test]
    fn query_outside_root_is_empty() {
        let selector = StaticTriangleSelector::from_triangles(scene(), 4);
        let far = Aabb::new(Point3::new(100.0, 100.0, 100.0), Point3::new(110.0, 110.0, 110.0));

        let mut out = Vec::new();
        selector.select(&far, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn local_query_prunes_distant_cells() {
        let all = scene();
        let selector = StaticTriangleSelector::from_triangles(all.clone(), 4);
        let query = Aabb::from_center_half_extent(Point3::new(2.0, 1.0, 2.0), 1.5);

        let mut out = Vec::new();
        selector.select(&query, &mut out);

        assert!(out.len() < all.len());
        assert!(out.contains(&all[0]));
        // The floor-sized triangle straddles every split and is always a candidate.
        assert!(out.contains(&all[all.len() - 2]));
    }

    #[test]
    fn tag_round_trip() {
        let selector = StaticTriangleSelector::from_triangles(scene(), 4).with_tag(42);
        assert_eq!(selector.tag(), Some(42));
        assert_eq!(StaticTriangleSelector::default().tag(), None);
    }

    #[test]
    fn count_survives_translation() {
        let positions: Vec<Point3<f32>> = scene()
            .iter()
            .flat_map(|t| t.vertices().iter().copied())
            .collect();
        let world = Matrix4::new_translation(&Vector3::new(-50.0, 3.0, 7.0));
        let selector = StaticTriangleSelector::new(&world, &positions, 8).unwrap();

        assert_eq!(selector.count(), scene().len());
        assert_eq!(selector.root().unwrap().triangle_count(), scene().len());
    }
}
