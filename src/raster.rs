use std::collections::BTreeMap;

use crate::{error::AfterglowResult, shaders::ShaderDescriptor};

/// Handle to an off-screen render target owned by the host rasterizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct TargetId(pub u32);

/// Handle to a host-owned scene graph. Opaque to this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SceneId(pub u32);

/// Handle to a host-owned camera/view. Opaque to this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ViewId(pub u32);

/// Handle to a compiled shader program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct ProgramId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FilterMode {
    Nearest,
    Linear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
}

/// Allocation parameters for a [`TargetId`].
///
/// Dimensions must match the viewport at use time; the compositor reallocates
/// its targets through [`crate::PassChain::set_size`] when the viewport moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TargetDesc {
    pub width: u32,
    pub height: u32,
    pub filter: FilterMode,
    pub format: PixelFormat,
    pub stencil: bool,
}

impl TargetDesc {
    /// A linear-filtered RGB target without a stencil buffer, the parameters
    /// every viewport-sized buffer in a chain uses.
    pub fn viewport(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            filter: FilterMode::Linear,
            format: PixelFormat::Rgb8,
            stencil: false,
        }
    }

    pub fn with_stencil(mut self, stencil: bool) -> Self {
        self.stencil = stencil;
        self
    }
}

/// Where a draw lands: an off-screen target or the visible framebuffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Output {
    Target(TargetId),
    Screen,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StencilFunc {
    Always,
    Equal,
    NotEqual,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StencilOp {
    Keep,
    Replace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blending {
    Normal,
    Additive,
}

/// A uniform value as handed to the host when a program runs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum UniformValue {
    Float(f64),
    Vec2([f64; 2]),
    Vec3([f64; 3]),
    FloatArray(Vec<f64>),
    Texture(Option<TargetId>),
}

/// Named uniform values, ordered for deterministic iteration.
pub type UniformMap = BTreeMap<String, UniformValue>;

/// A scene-graph draw request (used by render and mask passes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneDraw {
    pub scene: SceneId,
    pub view: ViewId,
    pub output: Output,
    pub clear: bool,
    pub override_program: Option<ProgramId>,
}

/// A full-viewport quad draw request (used by shader, save, and bloom passes).
#[derive(Debug)]
pub struct QuadDraw<'a> {
    pub program: ProgramId,
    pub uniforms: &'a UniformMap,
    pub output: Output,
    pub clear: bool,
    pub blending: Blending,
}

/// The capability set this crate consumes from the GPU/windowing layer.
///
/// Hosts implement this once over their renderer; every compositor and pass
/// operation takes `&mut dyn Rasterizer`. Resource handles returned here stay
/// valid until the matching destroy call. State toggles (`set_*`) mirror the
/// raw mask/stencil switches a GL-class rasterizer exposes and are infallible.
pub trait Rasterizer {
    fn create_target(&mut self, desc: &TargetDesc) -> AfterglowResult<TargetId>;

    fn destroy_target(&mut self, target: TargetId) -> AfterglowResult<()>;

    /// Compile vertex+fragment source with the descriptor's defines and
    /// uniform schema. Failure here is a configuration error surfaced at pass
    /// construction time, never during the per-frame loop.
    fn compile_program(&mut self, shader: &ShaderDescriptor) -> AfterglowResult<ProgramId>;

    fn render_scene(&mut self, draw: &SceneDraw) -> AfterglowResult<()>;

    fn draw_quad(&mut self, draw: &QuadDraw<'_>) -> AfterglowResult<()>;

    fn set_color_write(&mut self, enabled: bool);

    fn set_depth_write(&mut self, enabled: bool);

    fn set_stencil_test(&mut self, enabled: bool);

    fn set_stencil_func(&mut self, func: StencilFunc, reference: u32, mask: u32);

    fn set_stencil_op(&mut self, fail: StencilOp, depth_fail: StencilOp, pass: StencilOp);

    fn set_clear_stencil(&mut self, value: u32);

    fn clear_color(&self) -> [f64; 4];

    fn set_clear_color(&mut self, rgba: [f64; 4]);
}
