use crate::geometry::MaskShape;
use crate::source::{RegionSource, ShapeSource};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Empty background; mask sources are filled in.
    #[default]
    Normal,
    /// The whole canvas is filled; mask sources are cut out.
    Inverted,
}

impl Polarity {
    pub fn from_invert_flag(invert: bool) -> Self {
        if invert {
            Polarity::Inverted
        } else {
            Polarity::Normal
        }
    }
}

/// One solid shape of a fill group, with the holes cut out of it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FillPart {
    pub shape: MaskShape,
    #[serde(default)]
    pub holes: Vec<MaskShape>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FillGroup {
    pub parts: Vec<FillPart>,
}

impl FillGroup {
    pub fn solid(shape: MaskShape) -> Self {
        Self {
            parts: vec![FillPart {
                shape,
                holes: Vec::new(),
            }],
        }
    }
}

/// Shapes subtracted from everything filled before the group.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HoleGroup {
    pub shapes: Vec<MaskShape>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum MaskCommand {
    Fill(FillGroup),
    Hole(HoleGroup),
}

/// Ordered fill/hole commands making up a stencil.
///
/// Stacked fill groups union under nonzero winding, so consumers must rasterize
/// each group with that rule.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeMask {
    pub commands: Vec<MaskCommand>,
}

impl CompositeMask {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MaskCommand> {
        self.commands.iter()
    }

    pub fn fills(&self) -> impl Iterator<Item = &FillGroup> {
        self.commands.iter().filter_map(|c| match c {
            MaskCommand::Fill(group) => Some(group),
            MaskCommand::Hole(_) => None,
        })
    }

    pub fn holes(&self) -> impl Iterator<Item = &HoleGroup> {
        self.commands.iter().filter_map(|c| match c {
            MaskCommand::Hole(group) => Some(group),
            MaskCommand::Fill(_) => None,
        })
    }

    fn fill(&mut self, group: FillGroup) {
        if !group.parts.is_empty() {
            self.commands.push(MaskCommand::Fill(group));
        }
    }

    fn hole(&mut self, shape: MaskShape) {
        self.commands.push(MaskCommand::Hole(HoleGroup {
            shapes: vec![shape],
        }));
    }
}

impl<'a> IntoIterator for &'a CompositeMask {
    type Item = &'a MaskCommand;
    type IntoIter = std::slice::Iter<'a, MaskCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

/// Builds the stencil for the given mask sources.
///
/// Sources whose `is_mask` marker is unset are skipped. `bounds` is only read for
/// [`Polarity::Inverted`].
pub fn build(
    polarity: Polarity,
    shapes: &[ShapeSource],
    regions: &[RegionSource],
    bounds: Rect,
) -> CompositeMask {
    let shapes = shapes.iter().filter(|s| s.is_mask);
    let regions = regions.iter().filter(|r| r.is_mask);
    let mut mask = CompositeMask::default();

    match polarity {
        Polarity::Normal => {
            for source in shapes {
                mask.fill(FillGroup::solid(source.derive_shape()));
            }
            for region in regions {
                let parts = region
                    .tree
                    .iter()
                    .filter(|node| !node.is_hole)
                    .map(|node| FillPart {
                        shape: MaskShape::Polygon(node.polygon.clone()),
                        holes: node
                            .children
                            .iter()
                            .map(|hole| MaskShape::Polygon(hole.polygon.clone()))
                            .collect(),
                    })
                    .collect();
                mask.fill(FillGroup { parts });
            }
        }
        Polarity::Inverted => {
            mask.fill(FillGroup::solid(MaskShape::Rect { rect: bounds }));
            for source in shapes {
                mask.hole(source.derive_shape());
            }
            for region in regions {
                for node in region.tree.iter().filter(|node| !node.is_hole) {
                    mask.hole(MaskShape::Polygon(node.polygon.clone()));
                }
                // Holes of an inverted region expose the effect again.
                for node in region.tree.iter().filter(|node| node.is_hole) {
                    mask.fill(FillGroup::solid(MaskShape::Polygon(node.polygon.clone())));
                }
            }
        }
    }

    debug!(?polarity, commands = mask.len(), "Built composite mask");
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;
    use crate::source::ShapeKind;
    use crate::tree::{PolygonNode, PolygonTree};
    use kurbo::Point;

    fn canvas() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 1000.0)
    }

    fn square(x: f64, y: f64, size: f64) -> Polygon {
        Polygon::new(vec![x, y, x + size, y, x + size, y + size, x, y + size])
    }

    fn ellipse_source(center: (f64, f64), radii: (f64, f64), is_mask: bool) -> ShapeSource {
        let (w, h) = (radii.0 * 2.0, radii.1 * 2.0);
        ShapeSource {
            id: "e".into(),
            kind: ShapeKind::Ellipse,
            local: MaskShape::ellipse((radii.0, radii.1), radii),
            width: w,
            height: h,
            bounds: Rect::from_center_size(center, (w, h)),
            center: Point::new(center.0, center.1),
            points: Vec::new(),
            is_mask,
        }
    }

    fn holed_region() -> RegionSource {
        RegionSource {
            id: "r".into(),
            tree: PolygonTree::new(vec![PolygonNode::boundary(square(0.0, 0.0, 100.0))
                .with_children(vec![
                    PolygonNode::hole(square(10.0, 10.0, 10.0)),
                    PolygonNode::hole(square(50.0, 50.0, 10.0)),
                ])]),
            is_mask: true,
        }
    }

    #[test]
    fn empty_inputs() {
        assert!(build(Polarity::Normal, &[], &[], canvas()).is_empty());

        let inverted = build(Polarity::Inverted, &[], &[], canvas());
        assert_eq!(
            inverted.commands,
            vec![MaskCommand::Fill(FillGroup::solid(MaskShape::Rect { rect: canvas() }))]
        );
        assert_eq!(inverted.holes().count(), 0);
    }

    #[test]
    fn single_ellipse() {
        let sources = [ellipse_source((300.0, 200.0), (40.0, 25.0), true)];
        let expected = MaskShape::ellipse((300.0, 200.0), (40.0, 25.0));

        let normal = build(Polarity::Normal, &sources, &[], canvas());
        assert_eq!(normal.commands, vec![MaskCommand::Fill(FillGroup::solid(expected.clone()))]);

        let inverted = build(Polarity::Inverted, &sources, &[], canvas());
        assert_eq!(inverted.len(), 2);
        assert_eq!(
            inverted.commands[1],
            MaskCommand::Hole(HoleGroup {
                shapes: vec![expected]
            })
        );
    }

    #[test]
    fn region_holes_normal() {
        let mask = build(Polarity::Normal, &[], &[holed_region()], canvas());
        assert_eq!(mask.len(), 1);
        let group = mask.fills().next().unwrap();
        assert_eq!(group.parts.len(), 1);
        assert_eq!(group.parts[0].shape, MaskShape::Polygon(square(0.0, 0.0, 100.0)));
        assert_eq!(
            group.parts[0].holes,
            vec![
                MaskShape::Polygon(square(10.0, 10.0, 10.0)),
                MaskShape::Polygon(square(50.0, 50.0, 10.0)),
            ]
        );
    }

    #[test]
    fn region_holes_inverted() {
        let mask = build(Polarity::Inverted, &[], &[holed_region()], canvas());
        assert_eq!(
            mask.commands,
            vec![
                MaskCommand::Fill(FillGroup::solid(MaskShape::Rect { rect: canvas() })),
                MaskCommand::Hole(HoleGroup {
                    shapes: vec![MaskShape::Polygon(square(0.0, 0.0, 100.0))]
                }),
                MaskCommand::Fill(FillGroup::solid(MaskShape::Polygon(square(10.0, 10.0, 10.0)))),
                MaskCommand::Fill(FillGroup::solid(MaskShape::Polygon(square(50.0, 50.0, 10.0)))),
            ]
        );
    }

    #[test]
    fn non_mask_sources_are_skipped() {
        let shapes = [ellipse_source((1.0, 1.0), (1.0, 1.0), false)];
        let mut region = holed_region();
        region.is_mask = false;
        let regions = [region];

        assert!(build(Polarity::Normal, &shapes, &regions, canvas()).is_empty());
        assert_eq!(build(Polarity::Inverted, &shapes, &regions, canvas()).len(), 1);
    }

    #[test]
    fn empty_region_contributes_nothing() {
        let region = RegionSource {
            id: "empty".into(),
            tree: PolygonTree::default(),
            is_mask: true,
        };
        assert!(build(Polarity::Normal, &[], &[region.clone()], canvas()).is_empty());
        assert_eq!(build(Polarity::Inverted, &[], &[region], canvas()).len(), 1);
    }
}
