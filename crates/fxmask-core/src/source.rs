use crate::config::MaskConfig;
use crate::errors::MaskError;
use crate::geometry::{MaskShape, Polygon};
use crate::tree::PolygonTree;
use fxmask_data::model::{DrawingData, RegionData};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Text,
    Polygon,
    Freehand,
    Other(String),
}

impl ShapeKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            "r" => ShapeKind::Rectangle,
            "e" => ShapeKind::Ellipse,
            "t" => ShapeKind::Text,
            "p" => ShapeKind::Polygon,
            "f" => ShapeKind::Freehand,
            other => ShapeKind::Other(other.to_string()),
        }
    }
}

/// Snapshot of a user-drawn shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeSource {
    pub id: String,
    pub kind: ShapeKind,
    /// Shape geometry in the drawing's local frame.
    pub local: MaskShape,
    pub width: f64,
    pub height: f64,
    pub bounds: Rect,
    pub center: Point,
    /// Raw polygon coordinates relative to `bounds` origin.
    pub points: Vec<f64>,
    pub is_mask: bool,
}

impl ShapeSource {
    /// Builds a source from a drawing document, reading the mask marker from its flags.
    pub fn from_drawing(drawing: &DrawingData, config: &MaskConfig) -> Result<Self, MaskError> {
        let shape = &drawing.shape;
        if shape.points.len() % 2 != 0 {
            return Err(MaskError::OddCoordinateCount {
                source_id: drawing.id.clone(),
                count: shape.points.len(),
            });
        }

        let kind = ShapeKind::from_code(&shape.kind);
        let (width, height) = (shape.width, shape.height);
        let local = match kind {
            ShapeKind::Ellipse => {
                MaskShape::ellipse((width / 2.0, height / 2.0), (width / 2.0, height / 2.0))
            }
            ShapeKind::Polygon | ShapeKind::Freehand => {
                MaskShape::Polygon(Polygon::new(shape.points.clone()))
            }
            _ => MaskShape::rect(0.0, 0.0, width, height),
        };
        let bounds = Rect::from_origin_size((drawing.x, drawing.y), (width, height));

        Ok(Self {
            id: drawing.id.clone(),
            kind,
            local,
            width,
            height,
            bounds,
            center: bounds.center(),
            points: shape.points.clone(),
            is_mask: drawing.flags.is_set(&config.namespace, &config.mask_flag),
        })
    }

    /// Places the local shape on the scene.
    ///
    /// Ellipses are centered on `center`. Polygons offset even coordinates by the bounds'
    /// x-origin and odd coordinates by its y-origin. Everything else, including kinds the
    /// host may add later, is positioned at `center` minus half the declared size.
    pub fn derive_shape(&self) -> MaskShape {
        match self.kind {
            ShapeKind::Ellipse => self.local.positioned(self.center.x, self.center.y),
            ShapeKind::Polygon => {
                let points = self
                    .points
                    .iter()
                    .enumerate()
                    .map(|(i, p)| if i % 2 == 0 { p + self.bounds.x0 } else { p + self.bounds.y0 })
                    .collect();
                MaskShape::Polygon(Polygon::new(points))
            }
            _ => self.local.positioned(
                self.center.x - self.width / 2.0,
                self.center.y - self.height / 2.0,
            ),
        }
    }
}

/// Snapshot of a map region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionSource {
    pub id: String,
    pub tree: PolygonTree,
    pub is_mask: bool,
}

impl RegionSource {
    /// Builds a source from a region document. The region masks when any of its behaviors
    /// is the configured suppression behavior.
    pub fn from_region(region: &RegionData, config: &MaskConfig) -> Result<Self, MaskError> {
        let mut polygons = Vec::with_capacity(region.polygons.len());
        for points in &region.polygons {
            if points.len() % 2 != 0 {
                return Err(MaskError::OddCoordinateCount {
                    source_id: region.id.clone(),
                    count: points.len(),
                });
            }
            polygons.push(Polygon::new(points.clone()));
        }

        Ok(Self {
            id: region.id.clone(),
            tree: PolygonTree::from_polygons(polygons),
            is_mask: region
                .behaviors
                .iter()
                .any(|b| b.kind == config.suppress_behavior),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn drawing(value: serde_json::Value) -> DrawingData {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn rectangle_is_centered_on_center() {
        let d = drawing(json!({
            "_id": "r1", "x": 400, "y": 450,
            "shape": { "type": "r", "width": 200, "height": 100 },
            "flags": { "fxmaster": { "masking": true } }
        }));
        let source = ShapeSource::from_drawing(&d, &MaskConfig::default()).unwrap();
        assert!(source.is_mask);
        assert_eq!(source.center, Point::new(500.0, 500.0));
        assert_eq!(source.derive_shape(), MaskShape::rect(400.0, 450.0, 200.0, 100.0));
    }

    #[test]
    fn polygon_offsets_by_axis() {
        let d = drawing(json!({
            "_id": "p1", "x": 7, "y": 1000,
            "shape": { "type": "p", "width": 10, "height": 10, "points": [1, 2, 3, 4, 5, 6] }
        }));
        let source = ShapeSource::from_drawing(&d, &MaskConfig::default()).unwrap();
        assert!(!source.is_mask);
        assert_eq!(
            source.derive_shape(),
            MaskShape::Polygon(Polygon::new(vec![8.0, 1002.0, 10.0, 1004.0, 12.0, 1006.0]))
        );
    }

    #[test]
    fn freehand_is_placed_at_its_origin() {
        let d = drawing(json!({
            "_id": "f1", "x": 100, "y": 50,
            "shape": { "type": "f", "width": 20, "height": 10, "points": [0, 0, 20, 0, 20, 10] }
        }));
        let source = ShapeSource::from_drawing(&d, &MaskConfig::default()).unwrap();
        assert_eq!(
            source.derive_shape(),
            MaskShape::Polygon(Polygon::new(vec![100.0, 50.0, 120.0, 50.0, 120.0, 60.0]))
        );
    }

    #[test]
    fn unknown_kind_falls_back_to_rectangle() {
        let d = drawing(json!({
            "_id": "x1", "x": 10, "y": 20,
            "shape": { "type": "hexagon", "width": 30, "height": 40 }
        }));
        let source = ShapeSource::from_drawing(&d, &MaskConfig::default()).unwrap();
        assert_eq!(source.kind, ShapeKind::Other("hexagon".to_string()));
        assert_eq!(source.derive_shape(), MaskShape::rect(10.0, 20.0, 30.0, 40.0));
    }

    #[test]
    fn odd_coordinates_are_rejected() {
        let d = drawing(json!({
            "_id": "bad", "shape": { "type": "p", "points": [1, 2, 3] }
        }));
        let err = ShapeSource::from_drawing(&d, &MaskConfig::default()).unwrap_err();
        assert!(matches!(err, MaskError::OddCoordinateCount { count: 3, .. }));
    }

    #[test]
    fn region_mask_marker_comes_from_behaviors() {
        let region: RegionData = serde_json::from_value(json!({
            "_id": "g1",
            "behaviors": [{ "type": "teleportToken" }, { "type": "suppressWeather" }],
            "polygons": [[0, 0, 10, 0, 10, 10, 0, 10]]
        }))
        .unwrap();
        let source = RegionSource::from_region(&region, &MaskConfig::default()).unwrap();
        assert!(source.is_mask);
        assert_eq!(source.tree.len(), 1);

        let mut config = MaskConfig::default();
        config.suppress_behavior = "suppressRain".to_string();
        assert!(!RegionSource::from_region(&region, &config).unwrap().is_mask);
    }
}
