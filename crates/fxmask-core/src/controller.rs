//! Event-driven upkeep of the installed mask.
//!
//! Host callbacks only push [`HostEvent`]s into a channel. [`MaskController::pump`] drains
//! the channel, decides whether anything relevant to the active scene changed, and if so
//! rebuilds the mask once and installs it into the [`MaskLayer`].

use crate::builder::{build, CompositeMask, Polarity};
use crate::config::{ColorChannel, MaskConfig};
use crate::errors::MaskError;
use crate::source::{RegionSource, ShapeSource};
use crossbeam_channel::{unbounded, Receiver, Sender};
use kurbo::Rect;
use serde_json::Value;
use tracing::{debug, info, instrument, trace};

pub type SceneId = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceChange {
    Created,
    Updated,
    Deleted,
}

#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    CanvasReady,
    SourceChanged { change: SourceChange, scene: SceneId },
    /// `changes` is the update diff as sent by the host, e.g. `{"flags": {"fxmaster": {"invert": true}}}`.
    SceneUpdated { scene: SceneId, changes: Value },
}

pub type CanvasReadyCallback = Box<dyn FnMut() + Send>;
pub type SourceChangedCallback = Box<dyn FnMut(SourceChange, &str) + Send>;
pub type SceneUpdatedCallback = Box<dyn FnMut(&str, &Value) + Send>;

/// Subscription surface of the host application.
pub trait HostHooks {
    fn on_canvas_ready(&mut self, callback: CanvasReadyCallback);
    fn on_source_changed(&mut self, callback: SourceChangedCallback);
    fn on_scene_flag_changed(&mut self, callback: SceneUpdatedCallback);
}

/// Read access to the live scene.
pub trait SceneHost {
    fn active_scene(&self) -> Option<SceneId>;
    fn scene_flag(&self, namespace: &str, key: &str) -> bool;
    fn shape_sources(&self, config: &MaskConfig) -> Result<Vec<ShapeSource>, MaskError>;
    fn region_sources(&self, config: &MaskConfig) -> Result<Vec<RegionSource>, MaskError>;
    fn canvas_rect(&self) -> Option<Rect>;
}

/// A built mask, ready to be attached to a rendering layer.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskNode {
    pub mask: CompositeMask,
    pub polarity: Polarity,
    pub channel: ColorChannel,
}

/// Rendering layer holding this subsystem's mask node.
pub trait MaskLayer {
    /// Installs `node`, returning the node it replaced.
    fn install(&mut self, node: MaskNode) -> Option<MaskNode>;
    fn installed(&self) -> Option<&MaskNode>;
}

/// Owns at most one mask node.
#[derive(Debug, Default)]
pub struct MaskSlot {
    node: Option<MaskNode>,
}

impl MaskSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Option<MaskNode> {
        self.node.take()
    }
}

impl MaskLayer for MaskSlot {
    fn install(&mut self, node: MaskNode) -> Option<MaskNode> {
        self.node.replace(node)
    }

    fn installed(&self) -> Option<&MaskNode> {
        self.node.as_ref()
    }
}

pub struct MaskController<H, L> {
    host: H,
    layer: L,
    config: MaskConfig,
    sender: Sender<HostEvent>,
    receiver: Receiver<HostEvent>,
}

impl<H: SceneHost, L: MaskLayer> MaskController<H, L> {
    pub fn new(host: H, layer: L, config: MaskConfig) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            host,
            layer,
            config,
            sender,
            receiver,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn layer(&self) -> &L {
        &self.layer
    }

    pub fn config(&self) -> &MaskConfig {
        &self.config
    }

    /// Queue for events produced outside of [`HostHooks`].
    pub fn sender(&self) -> Sender<HostEvent> {
        self.sender.clone()
    }

    /// Registers callbacks that forward host notifications into the event queue.
    pub fn subscribe(&self, hooks: &mut impl HostHooks) {
        let tx = self.sender.clone();
        hooks.on_canvas_ready(Box::new(move || forward(&tx, HostEvent::CanvasReady)));

        let tx = self.sender.clone();
        hooks.on_source_changed(Box::new(move |change, scene| {
            forward(
                &tx,
                HostEvent::SourceChanged {
                    change,
                    scene: scene.to_string(),
                },
            )
        }));

        let tx = self.sender.clone();
        hooks.on_scene_flag_changed(Box::new(move |scene, changes| {
            forward(
                &tx,
                HostEvent::SceneUpdated {
                    scene: scene.to_string(),
                    changes: changes.clone(),
                },
            )
        }));
    }

    /// Whether `event` requires the active scene's mask to be rebuilt.
    pub fn is_relevant(&self, event: &HostEvent) -> bool {
        let active = self.host.active_scene();
        match event {
            HostEvent::CanvasReady => active.is_some(),
            HostEvent::SourceChanged { scene, .. } => active.as_deref() == Some(scene.as_str()),
            HostEvent::SceneUpdated { scene, changes } => {
                if active.as_deref() != Some(scene.as_str()) {
                    return false;
                }
                let ns = &self.config.namespace;
                let key = &self.config.invert_flag;
                has_property(changes, &format!("flags.{ns}.{key}"))
                    || has_property(changes, &format!("flags.{ns}.-={key}"))
            }
        }
    }

    /// Drains pending events and rebuilds at most once. Returns whether a rebuild happened.
    pub fn pump(&mut self) -> Result<bool, MaskError> {
        let mut dirty = false;
        for event in self.receiver.try_iter() {
            if self.is_relevant(&event) {
                dirty = true;
            } else {
                trace!(?event, "Ignoring host event");
            }
        }
        if dirty {
            self.rebuild()?;
        }
        Ok(dirty)
    }

    /// Builds the mask for the active scene and installs it, replacing the previous node.
    #[instrument(skip(self))]
    pub fn rebuild(&mut self) -> Result<(), MaskError> {
        let scene = self.host.active_scene().ok_or(MaskError::NoActiveScene)?;
        let invert = self
            .host
            .scene_flag(&self.config.namespace, &self.config.invert_flag);
        let polarity = Polarity::from_invert_flag(invert);

        let bounds = match (polarity, self.host.canvas_rect()) {
            (_, Some(rect)) => rect,
            (Polarity::Normal, None) => Rect::ZERO,
            (Polarity::Inverted, None) => return Err(MaskError::MissingDimensions(scene)),
        };

        let shapes = self.host.shape_sources(&self.config)?;
        let regions = self.host.region_sources(&self.config)?;
        let mask = build(polarity, &shapes, &regions, bounds);

        let node = MaskNode {
            mask,
            polarity,
            channel: self.config.channel,
        };
        if self.layer.install(node).is_some() {
            debug!("Replaced previous mask node");
        }
        info!(%scene, ?polarity, "Installed effect mask");
        Ok(())
    }
}

fn forward(tx: &Sender<HostEvent>, event: HostEvent) {
    if tx.send(event).is_err() {
        trace!("Mask controller dropped, discarding host event");
    }
}

/// Dotted-path lookup into a JSON object, e.g. `flags.fxmaster.invert`.
pub fn has_property(value: &Value, path: &str) -> bool {
    if value.get(path).is_some() {
        return true;
    }
    let mut current = value;
    for key in path.split('.') {
        match current.get(key) {
            Some(next) => current = next,
            None => return false,
        }
    }
    true
}
