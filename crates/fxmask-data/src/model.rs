use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SceneSnapshot {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    #[serde(default)]
    pub flags: Flags,
    #[serde(default)]
    pub drawings: Vec<DrawingData>,
    #[serde(default)]
    pub regions: Vec<RegionData>,
}

impl SceneSnapshot {
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    /// Full canvas rectangle, padding included. Falls back to `width` x `height` at the origin.
    #[serde(default)]
    pub rect: Option<RectData>,
}

impl Dimensions {
    pub fn canvas_rect(&self) -> RectData {
        self.rect.unwrap_or(RectData {
            x: 0.0,
            y: 0.0,
            width: self.width,
            height: self.height,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct RectData {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Document flags keyed by namespace, then by flag name.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Flags(pub HashMap<String, HashMap<String, Value>>);

impl Flags {
    pub fn get(&self, namespace: &str, key: &str) -> Option<&Value> {
        self.0.get(namespace).and_then(|scope| scope.get(key))
    }

    /// Host truthiness: `null`, `false`, `0`, `""` and missing flags are all unset.
    pub fn is_set(&self, namespace: &str, key: &str) -> bool {
        match self.get(namespace, key) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        }
    }

    pub fn set(&mut self, namespace: &str, key: &str, value: Value) {
        self.0
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    pub fn unset(&mut self, namespace: &str, key: &str) -> Option<Value> {
        self.0.get_mut(namespace).and_then(|scope| scope.remove(key))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DrawingData {
    #[serde(rename = "_id")]
    pub id: String,
    /// Top-left of the drawing's bounding box.
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub shape: ShapeData,
    #[serde(default)]
    pub flags: Flags,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShapeData {
    /// `r` rectangle, `e` ellipse, `t` text, `p` polygon, `f` freehand.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    /// Flat `[x0, y0, x1, y1, ...]` relative to the drawing origin.
    #[serde(default)]
    pub points: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegionData {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub behaviors: Vec<BehaviorData>,
    /// Closed outlines making up the region, flat `[x0, y0, ...]` in scene coordinates.
    /// Nesting (and therefore holes) is recovered from containment.
    #[serde(default)]
    pub polygons: Vec<Vec<f64>>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BehaviorData {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
}
