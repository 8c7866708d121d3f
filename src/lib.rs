//! Afterglow is a backend-agnostic render post-processing compositor and
//! orbit camera controller.
//!
//! A [`PassChain`] runs an ordered list of [`Pass`]es over two alternating
//! ping-pong targets, with stencil-mask scoping and atomic resize; an
//! [`OrbitController`] turns pointer/wheel/key events into damped
//! spherical-coordinate camera motion. Everything GPU-shaped is consumed
//! through the [`Rasterizer`] capability trait the host implements; this crate
//! never talks to a graphics API directly.
#![forbid(unsafe_code)]

pub mod bloom;
pub mod chain;
pub mod error;
pub mod kernel;
pub mod orbit;
pub mod pass;
pub mod preset;
pub mod raster;
pub mod shaders;
pub mod stage;

pub use bloom::{BloomPass, BloomSettings};
pub use chain::PassChain;
pub use error::{AfterglowError, AfterglowResult};
pub use orbit::{
    CameraPose, ControlKey, DragState, InputEvent, OrbitConfig, OrbitController, PointerButton,
};
pub use pass::{ClearMaskPass, MaskPass, Pass, RenderPass, SavePass, ShaderPass};
pub use preset::{CinematicChain, cinematic_chain};
pub use raster::{
    Blending, FilterMode, Output, PixelFormat, ProgramId, QuadDraw, Rasterizer, SceneDraw,
    SceneId, StencilFunc, StencilOp, TargetDesc, TargetId, UniformMap, UniformValue, ViewId,
};
pub use shaders::ShaderDescriptor;
pub use stage::{SceneState, Stage};
