//! Octree node implementation.

use crate::{Aabb, Containment, Triangle};

/// A node in the static selector's octree.
///
/// Each node owns a box and the triangles that could not be pushed down into
/// one of its octants. A triangle moves into a child only when all three of
/// its vertices lie strictly inside that octant, so triangles that straddle a
/// split plane stay with the parent.
#[derive(Debug, Clone)]
pub struct OctreeNode {
    /// Region covered by this node.
    bounds: Aabb,

    /// Triangles stored at this node.
    triangles: Vec<Triangle>,

    /// Non-empty octants, in octant order.
    children: Vec<OctreeNode>,
}

impl OctreeNode {
    /// Builds a subtree over `triangles` within `bounds`.
    ///
    /// Nodes holding more than `min_triangles_per_node` triangles are split
    /// into eight octants; octants that receive no triangles are omitted.
    pub fn build(bounds: Aabb, mut triangles: Vec<Triangle>, min_triangles_per_node: usize) -> Self {
        let mut children = Vec::new();

        if triangles.len() > min_triangles_per_node {
            for octant in bounds.octants() {
                let (inside, rest): (Vec<Triangle>, Vec<Triangle>) = triangles
                    .into_iter()
                    .partition(|t| fully_contains(&octant, t));

                if !inside.is_empty() {
                    children.push(OctreeNode::build(octant, inside, min_triangles_per_node));
                }
                triangles = rest;
            }
        }

        Self {
            bounds,
            triangles,
            children,
        }
    }

    /// Returns the region covered by this node.
    #[inline]
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Returns the triangles stored directly at this node.
    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Returns the child nodes.
    #[inline]
    pub fn children(&self) -> &[OctreeNode] {
        &self.children
    }

    /// Checks if this node has any children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the total number of triangles in this subtree.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() + self.children.iter().map(|c| c.triangle_count()).sum::<usize>()
    }

    /// Returns the number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Returns the depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// Appends this subtree's triangles if its box overlaps `query`.
    ///
    /// Every child repeats the overlap test against its own box.
    pub fn select(&self, query: &Aabb, out: &mut Vec<Triangle>) {
        if self.bounds.is_disjoint(query) {
            return;
        }

        out.extend_from_slice(&self.triangles);
        for child in &self.children {
            child.select(query, out);
        }
    }
}

/// Returns `true` if every vertex of `triangle` lies strictly inside `bounds`.
fn fully_contains(bounds: &Aabb, triangle: &Triangle) -> bool {
    triangle
        .vertices()
        .iter()
        .all(|v| bounds.contains_point(v) == Containment::Contains)
}
