use crate::config::MaskConfig;
use crate::controller::{
    CanvasReadyCallback, HostHooks, SceneHost, SceneId, SceneUpdatedCallback, SourceChange,
    SourceChangedCallback,
};
use crate::errors::MaskError;
use crate::source::{RegionSource, ShapeSource};
use fxmask_data::model::SceneSnapshot;
use kurbo::Rect;
use serde_json::Value;
use std::path::Path;

/// Scene host backed by an in-memory snapshot. The loaded scene is the active one.
#[derive(Debug, Default, Clone)]
pub struct SnapshotHost {
    scene: Option<SceneSnapshot>,
}

impl SnapshotHost {
    pub fn new(scene: SceneSnapshot) -> Self {
        Self { scene: Some(scene) }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, MaskError> {
        let file = std::fs::File::open(path)?;
        let scene = SceneSnapshot::from_reader(std::io::BufReader::new(file))?;
        Ok(Self::new(scene))
    }

    pub fn scene(&self) -> Option<&SceneSnapshot> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut SceneSnapshot> {
        self.scene.as_mut()
    }

    pub fn set_scene(&mut self, scene: Option<SceneSnapshot>) {
        self.scene = scene;
    }
}

impl SceneHost for SnapshotHost {
    fn active_scene(&self) -> Option<SceneId> {
        self.scene.as_ref().map(|s| s.id.clone())
    }

    fn scene_flag(&self, namespace: &str, key: &str) -> bool {
        self.scene
            .as_ref()
            .is_some_and(|s| s.flags.is_set(namespace, key))
    }

    fn shape_sources(&self, config: &MaskConfig) -> Result<Vec<ShapeSource>, MaskError> {
        let Some(scene) = &self.scene else {
            return Ok(Vec::new());
        };
        scene
            .drawings
            .iter()
            .map(|d| ShapeSource::from_drawing(d, config))
            .collect()
    }

    fn region_sources(&self, config: &MaskConfig) -> Result<Vec<RegionSource>, MaskError> {
        let Some(scene) = &self.scene else {
            return Ok(Vec::new());
        };
        scene
            .regions
            .iter()
            .map(|r| RegionSource::from_region(r, config))
            .collect()
    }

    fn canvas_rect(&self) -> Option<Rect> {
        let rect = self.scene.as_ref()?.dimensions?.canvas_rect();
        Some(Rect::from_origin_size((rect.x, rect.y), (rect.width, rect.height)))
    }
}

/// Minimal hook table: stores callbacks and invokes them on `emit_*`.
#[derive(Default)]
pub struct HookRegistry {
    canvas_ready: Vec<CanvasReadyCallback>,
    source_changed: Vec<SourceChangedCallback>,
    scene_updated: Vec<SceneUpdatedCallback>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit_canvas_ready(&mut self) {
        for callback in &mut self.canvas_ready {
            callback();
        }
    }

    pub fn emit_source_changed(&mut self, change: SourceChange, scene: &str) {
        for callback in &mut self.source_changed {
            callback(change, scene);
        }
    }

    pub fn emit_scene_updated(&mut self, scene: &str, changes: &Value) {
        for callback in &mut self.scene_updated {
            callback(scene, changes);
        }
    }
}

impl HostHooks for HookRegistry {
    fn on_canvas_ready(&mut self, callback: CanvasReadyCallback) {
        self.canvas_ready.push(callback);
    }

    fn on_source_changed(&mut self, callback: SourceChangedCallback) {
        self.source_changed.push(callback);
    }

    fn on_scene_flag_changed(&mut self, callback: SceneUpdatedCallback) {
        self.scene_updated.push(callback);
    }
}
