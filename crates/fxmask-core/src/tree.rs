use crate::geometry::Polygon;
use serde::{Deserialize, Serialize};

/// Hierarchical decomposition of a region into outer boundaries and the holes nested in them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolygonTree {
    pub roots: Vec<PolygonNode>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolygonNode {
    pub polygon: Polygon,
    pub is_hole: bool,
    #[serde(default)]
    pub children: Vec<PolygonNode>,
}

impl PolygonNode {
    pub fn boundary(polygon: Polygon) -> Self {
        Self {
            polygon,
            is_hole: false,
            children: Vec::new(),
        }
    }

    pub fn hole(polygon: Polygon) -> Self {
        Self {
            polygon,
            is_hole: true,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<PolygonNode>) -> Self {
        self.children = children;
        self
    }
}

impl PolygonTree {
    pub fn new(roots: Vec<PolygonNode>) -> Self {
        Self { roots }
    }

    /// Nests a flat set of closed outlines by containment.
    ///
    /// Larger outlines are placed first; each outline becomes a child of the deepest node
    /// containing its first vertex. Even depths are boundaries, odd depths are holes.
    /// Outlines with fewer than three vertices are dropped.
    pub fn from_polygons(polygons: impl IntoIterator<Item = Polygon>) -> Self {
        let mut sorted: Vec<Polygon> = polygons
            .into_iter()
            .filter(|p| p.vertex_count() >= 3)
            .collect();
        sorted.sort_by(|a, b| b.area().total_cmp(&a.area()));

        let mut tree = PolygonTree::default();
        for polygon in sorted {
            insert_nested(&mut tree.roots, polygon, 0);
        }
        tree
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Depth-first, pre-order walk over every node.
    pub fn iter(&self) -> Nodes<'_> {
        Nodes {
            stack: self.roots.iter().rev().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }
}

fn insert_nested(nodes: &mut Vec<PolygonNode>, polygon: Polygon, depth: usize) {
    let parent = match polygon.vertices().next() {
        Some(probe) => nodes.iter_mut().find(|n| n.polygon.contains(probe)),
        None => None,
    };
    match parent {
        Some(parent) => insert_nested(&mut parent.children, polygon, depth + 1),
        None => nodes.push(PolygonNode {
            polygon,
            is_hole: depth % 2 == 1,
            children: Vec::new(),
        }),
    }
}

pub struct Nodes<'a> {
    stack: Vec<&'a PolygonNode>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a PolygonNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

impl<'a> IntoIterator for &'a PolygonTree {
    type Item = &'a PolygonNode;
    type IntoIter = Nodes<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
