use kurbo::{BezPath, Point, Rect, Shape as _, Vec2};
use serde::{Deserialize, Serialize};

const PATH_TOLERANCE: f64 = 0.1;

/// A closed polygon stored as a flat `[x0, y0, x1, y1, ...]` coordinate list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<f64>,
}

impl Polygon {
    pub fn new(points: Vec<f64>) -> Self {
        Self { points }
    }

    pub fn from_vertices(vertices: impl IntoIterator<Item = Point>) -> Self {
        let points = vertices.into_iter().flat_map(|p| [p.x, p.y]).collect();
        Self { points }
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len() / 2
    }

    pub fn vertices(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.chunks_exact(2).map(|c| Point::new(c[0], c[1]))
    }

    /// Signed shoelace area. Positive for clockwise winding in y-down screen space.
    pub fn signed_area(&self) -> f64 {
        let vertices: Vec<Point> = self.vertices().collect();
        if vertices.len() < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for (i, a) in vertices.iter().enumerate() {
            let b = vertices[(i + 1) % vertices.len()];
            sum += a.x * b.y - b.x * a.y;
        }
        sum * 0.5
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn contains(&self, point: Point) -> bool {
        self.vertex_count() >= 3 && self.to_path().contains(point)
    }

    pub fn translate(&self, offset: Vec2) -> Self {
        Self::from_vertices(self.vertices().map(|p| p + offset))
    }

    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut vertices = self.vertices();
        if let Some(first) = vertices.next() {
            path.move_to(first);
            for p in vertices {
                path.line_to(p);
            }
            path.close_path();
        }
        path
    }
}

/// Geometry drawn into a mask.
///
/// Positioning follows the host's shape conventions: a rectangle is placed by its top-left
/// corner, an ellipse by its center, and a polygon by the origin of its local coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaskShape {
    Rect { rect: Rect },
    Ellipse { center: Point, radii: Vec2 },
    Polygon(Polygon),
}

impl MaskShape {
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        MaskShape::Rect {
            rect: Rect::from_origin_size((x, y), (width, height)),
        }
    }

    pub fn ellipse(center: impl Into<Point>, radii: impl Into<Vec2>) -> Self {
        MaskShape::Ellipse {
            center: center.into(),
            radii: radii.into(),
        }
    }

    /// Returns this shape moved so that its position equals `(x, y)`.
    pub fn positioned(&self, x: f64, y: f64) -> Self {
        match self {
            MaskShape::Rect { rect } => MaskShape::Rect {
                rect: Rect::from_origin_size((x, y), rect.size()),
            },
            MaskShape::Ellipse { radii, .. } => MaskShape::Ellipse {
                center: Point::new(x, y),
                radii: *radii,
            },
            MaskShape::Polygon(polygon) => MaskShape::Polygon(polygon.translate(Vec2::new(x, y))),
        }
    }

    pub fn bounding_box(&self) -> Rect {
        match self {
            MaskShape::Rect { rect } => *rect,
            MaskShape::Ellipse { center, radii } => {
                Rect::from_center_size(*center, (radii.x * 2.0, radii.y * 2.0))
            }
            MaskShape::Polygon(polygon) => polygon.to_path().bounding_box(),
        }
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            MaskShape::Rect { rect } => rect.to_path(PATH_TOLERANCE),
            MaskShape::Ellipse { center, radii } => {
                kurbo::Ellipse::new(*center, *radii, 0.0).to_path(PATH_TOLERANCE)
            }
            MaskShape::Polygon(polygon) => polygon.to_path(),
        }
    }
}
