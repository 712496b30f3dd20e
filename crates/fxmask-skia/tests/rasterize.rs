use fxmask_core::{
    MaskConfig, MaskController, MaskLayer, MaskShape, Polarity, Polygon, PolygonNode, PolygonTree,
    RegionSource, SceneHost, ShapeKind, ShapeSource, SnapshotHost,
};
use fxmask_data::model::SceneSnapshot;
use fxmask_skia::{DepthBuffer, DepthMaskContainer, SkiaMaskRenderer};
use kurbo::{Point, Rect};
use serde_json::json;

const SIZE: u32 = 100;

fn canvas() -> Rect {
    Rect::new(0.0, 0.0, SIZE as f64, SIZE as f64)
}

fn rect_source() -> ShapeSource {
    ShapeSource {
        id: "r".into(),
        kind: ShapeKind::Rectangle,
        local: MaskShape::rect(0.0, 0.0, 40.0, 20.0),
        width: 40.0,
        height: 20.0,
        bounds: Rect::new(30.0, 40.0, 70.0, 60.0),
        center: Point::new(50.0, 50.0),
        points: Vec::new(),
        is_mask: true,
    }
}

fn at(coverage: &[u8], x: u32, y: u32) -> u8 {
    coverage[(y * SIZE + x) as usize]
}

#[test]
fn normal_rectangle_coverage() {
    let mask = fxmask_core::build(Polarity::Normal, &[rect_source()], &[], canvas());
    let coverage = SkiaMaskRenderer::coverage(&mask, SIZE, SIZE).unwrap();
    assert_eq!(at(&coverage, 50, 50), 255);
    assert_eq!(at(&coverage, 35, 45), 255);
    assert_eq!(at(&coverage, 10, 10), 0);
    assert_eq!(at(&coverage, 50, 80), 0);
}

#[test]
fn inverted_rectangle_coverage() {
    let mask = fxmask_core::build(Polarity::Inverted, &[rect_source()], &[], canvas());
    let coverage = SkiaMaskRenderer::coverage(&mask, SIZE, SIZE).unwrap();
    assert_eq!(at(&coverage, 50, 50), 0);
    assert_eq!(at(&coverage, 10, 10), 255);
    assert_eq!(at(&coverage, 90, 90), 255);
}

#[test]
fn region_holes_are_cut_and_restored() {
    let square = |x: f64, y: f64, s: f64| Polygon::new(vec![x, y, x + s, y, x + s, y + s, x, y + s]);
    let region = RegionSource {
        id: "g".into(),
        tree: PolygonTree::new(vec![PolygonNode::boundary(square(10.0, 10.0, 80.0))
            .with_children(vec![PolygonNode::hole(square(40.0, 40.0, 20.0))])]),
        is_mask: true,
    };
    let regions = [region];

    let normal = fxmask_core::build(Polarity::Normal, &[], &regions, canvas());
    let coverage = SkiaMaskRenderer::coverage(&normal, SIZE, SIZE).unwrap();
    assert_eq!(at(&coverage, 20, 20), 255);
    assert_eq!(at(&coverage, 50, 50), 0, "hole stays open");
    assert_eq!(at(&coverage, 5, 5), 0);

    let inverted = fxmask_core::build(Polarity::Inverted, &[], &regions, canvas());
    let coverage = SkiaMaskRenderer::coverage(&inverted, SIZE, SIZE).unwrap();
    assert_eq!(at(&coverage, 20, 20), 0);
    assert_eq!(at(&coverage, 50, 50), 255, "hole is masked again");
    assert_eq!(at(&coverage, 5, 5), 255);
}

#[test]
fn controller_renders_into_blue_channel_only() {
    let scene: SceneSnapshot = serde_json::from_value(json!({
        "_id": "s",
        "dimensions": { "width": SIZE, "height": SIZE },
        "drawings": [{
            "_id": "d", "x": 30, "y": 40,
            "shape": { "type": "r", "width": 40, "height": 20 },
            "flags": { "fxmaster": { "masking": true } }
        }]
    }))
    .unwrap();
    let host = SnapshotHost::new(scene);
    assert!(host.canvas_rect().is_some());

    let mut ctrl = MaskController::new(host, DepthMaskContainer::new(), MaskConfig::default());
    ctrl.rebuild().unwrap();
    assert!(ctrl.layer().installed().is_some());

    let mut buffer = DepthBuffer::from_pixels(SIZE, SIZE, vec![9; (SIZE * SIZE * 4) as usize]).unwrap();
    assert!(ctrl.layer().render(&mut buffer).unwrap());

    assert_eq!(buffer.pixel(50, 50), [9, 9, 255, 9]);
    assert_eq!(buffer.pixel(5, 5), [9, 9, 0, 9]);
}

#[test]
fn empty_container_renders_nothing() {
    let container = DepthMaskContainer::new();
    let mut buffer = DepthBuffer::new(4, 4).unwrap();
    assert!(!container.render(&mut buffer).unwrap());
    assert!(buffer.pixels().iter().all(|&b| b == 0));
}
