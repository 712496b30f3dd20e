//! # fxmask-core
//!
//! Builds the stencil that hides weather and particle effects beneath shapes and regions
//! marked as masks.
//!
//! [`build`] is a pure function from a snapshot of sources to a [`CompositeMask`] of
//! fill/hole commands. [`MaskController`] wires it to host events and keeps exactly one
//! installed mask per layer.

pub mod builder;
pub mod config;
pub mod controller;
pub mod errors;
pub mod geometry;
pub mod host;
pub mod source;
pub mod tree;

pub use builder::{build, CompositeMask, FillGroup, FillPart, HoleGroup, MaskCommand, Polarity};
pub use config::{ColorChannel, MaskConfig};
pub use controller::{
    HostEvent, HostHooks, MaskController, MaskLayer, MaskNode, MaskSlot, SceneHost, SourceChange,
};
pub use errors::MaskError;
pub use geometry::{MaskShape, Polygon};
pub use host::{HookRegistry, SnapshotHost};
pub use source::{RegionSource, ShapeKind, ShapeSource};
pub use tree::{PolygonNode, PolygonTree};
