//! The closed set of pass variants a [`crate::PassChain`] can run.
//!
//! Every variant carries its own `enabled`/`clear`/`needs_swap` flags and is
//! dispatched through one exhaustive [`Pass::execute`] match, so the chain
//! runner never sees an unknown pass shape.

use crate::{
    bloom::BloomPass,
    error::{AfterglowError, AfterglowResult},
    raster::{
        Blending, Output, ProgramId, QuadDraw, Rasterizer, SceneDraw, SceneId, StencilFunc,
        StencilOp, TargetDesc, TargetId, UniformMap, UniformValue, ViewId,
    },
    shaders::{self, INPUT_TEXTURE, ShaderDescriptor},
};

pub enum Pass {
    Render(RenderPass),
    Shader(ShaderPass),
    Mask(MaskPass),
    ClearMask(ClearMaskPass),
    Save(SavePass),
    Bloom(BloomPass),
}

impl Pass {
    pub fn enabled(&self) -> bool {
        match self {
            Pass::Render(p) => p.enabled,
            Pass::Shader(p) => p.enabled,
            Pass::Mask(p) => p.enabled,
            Pass::ClearMask(p) => p.enabled,
            Pass::Save(p) => p.enabled,
            Pass::Bloom(p) => p.enabled,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        match self {
            Pass::Render(p) => p.enabled = enabled,
            Pass::Shader(p) => p.enabled = enabled,
            Pass::Mask(p) => p.enabled = enabled,
            Pass::ClearMask(p) => p.enabled = enabled,
            Pass::Save(p) => p.enabled = enabled,
            Pass::Bloom(p) => p.enabled = enabled,
        }
    }

    /// Whether the chain swaps its ping-pong buffers after this pass. Only
    /// full-screen shader passes advance the pair.
    pub fn needs_swap(&self) -> bool {
        match self {
            Pass::Shader(p) => p.needs_swap,
            Pass::Render(_) | Pass::Mask(_) | Pass::ClearMask(_) | Pass::Save(_)
            | Pass::Bloom(_) => false,
        }
    }

    /// Whether this pass presents to the visible framebuffer.
    pub fn renders_to_screen(&self) -> bool {
        match self {
            Pass::Shader(p) => p.render_to_screen,
            _ => false,
        }
    }

    pub(crate) fn execute(
        &mut self,
        raster: &mut dyn Rasterizer,
        write: TargetId,
        read: TargetId,
        _delta: f64,
        mask_active: bool,
    ) -> AfterglowResult<()> {
        match self {
            Pass::Render(p) => p.render(raster, read),
            Pass::Shader(p) => p.render(raster, write, read),
            Pass::Mask(p) => p.render(raster, write, read),
            Pass::ClearMask(p) => p.render(raster),
            Pass::Save(p) => p.render(raster, read),
            Pass::Bloom(p) => p.render(raster, read, mask_active),
        }
    }

    /// Release any targets this pass allocated for itself.
    pub(crate) fn dispose(self, raster: &mut dyn Rasterizer) -> AfterglowResult<()> {
        match self {
            Pass::Save(p) => p.dispose(raster),
            Pass::Bloom(p) => p.dispose(raster),
            Pass::Render(_) | Pass::Shader(_) | Pass::Mask(_) | Pass::ClearMask(_) => Ok(()),
        }
    }
}

impl From<RenderPass> for Pass {
    fn from(pass: RenderPass) -> Self {
        Pass::Render(pass)
    }
}

impl From<ShaderPass> for Pass {
    fn from(pass: ShaderPass) -> Self {
        Pass::Shader(pass)
    }
}

impl From<MaskPass> for Pass {
    fn from(pass: MaskPass) -> Self {
        Pass::Mask(pass)
    }
}

impl From<ClearMaskPass> for Pass {
    fn from(pass: ClearMaskPass) -> Self {
        Pass::ClearMask(pass)
    }
}

impl From<SavePass> for Pass {
    fn from(pass: SavePass) -> Self {
        Pass::Save(pass)
    }
}

impl From<BloomPass> for Pass {
    fn from(pass: BloomPass) -> Self {
        Pass::Bloom(pass)
    }
}

/// Draws a host scene from a host view into the chain's read buffer.
///
/// Does not advance the ping-pong pair; the rendered image becomes the input
/// of the next pass. An optional clear color is swapped in around the draw and
/// restored afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderPass {
    pub scene: SceneId,
    pub view: ViewId,
    pub override_program: Option<ProgramId>,
    pub clear_color: Option<[f64; 4]>,
    pub enabled: bool,
    pub clear: bool,
}

impl RenderPass {
    pub fn new(scene: SceneId, view: ViewId) -> Self {
        Self {
            scene,
            view,
            override_program: None,
            clear_color: None,
            enabled: true,
            clear: true,
        }
    }

    fn render(&self, raster: &mut dyn Rasterizer, read: TargetId) -> AfterglowResult<()> {
        let draw = SceneDraw {
            scene: self.scene,
            view: self.view,
            output: Output::Target(read),
            clear: self.clear,
            override_program: self.override_program,
        };

        match self.clear_color {
            Some(color) => {
                let previous = raster.clear_color();
                raster.set_clear_color(color);
                let result = raster.render_scene(&draw);
                raster.set_clear_color(previous);
                result
            }
            None => raster.render_scene(&draw),
        }
    }
}

/// Runs a fragment program over a full-viewport quad, sampling the chain's
/// read buffer through a configurable input uniform.
pub struct ShaderPass {
    program: ProgramId,
    uniforms: UniformMap,
    input_uniform: String,
    pub enabled: bool,
    pub needs_swap: bool,
    pub clear: bool,
    pub render_to_screen: bool,
}

impl ShaderPass {
    pub fn new(
        raster: &mut dyn Rasterizer,
        shader: &ShaderDescriptor,
    ) -> AfterglowResult<Self> {
        Self::with_input(raster, shader, INPUT_TEXTURE)
    }

    /// Like [`ShaderPass::new`] but binding the chain image to a different
    /// sampler, e.g. `tDiffuse1` for the two-input blend shader.
    pub fn with_input(
        raster: &mut dyn Rasterizer,
        shader: &ShaderDescriptor,
        input_uniform: &str,
    ) -> AfterglowResult<Self> {
        let program = raster.compile_program(shader)?;
        Ok(Self {
            program,
            uniforms: shader.uniforms.clone(),
            input_uniform: input_uniform.to_string(),
            enabled: true,
            needs_swap: true,
            clear: false,
            render_to_screen: false,
        })
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    /// Override a uniform declared by the pass's shader. Unknown names are a
    /// configuration error, not a silent no-op.
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) -> AfterglowResult<()> {
        match self.uniforms.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(AfterglowError::config(format!(
                "shader pass has no uniform '{name}'"
            ))),
        }
    }

    fn render(
        &mut self,
        raster: &mut dyn Rasterizer,
        write: TargetId,
        read: TargetId,
    ) -> AfterglowResult<()> {
        if let Some(slot) = self.uniforms.get_mut(&self.input_uniform) {
            *slot = UniformValue::Texture(Some(read));
        }

        let output = if self.render_to_screen {
            Output::Screen
        } else {
            Output::Target(write)
        };

        raster.draw_quad(&QuadDraw {
            program: self.program,
            uniforms: &self.uniforms,
            output,
            clear: self.clear,
            blending: Blending::Normal,
        })
    }
}

/// Writes a stencil mask covering its scene's footprint into both ping-pong
/// buffers, then leaves an `Equal 1` stencil test active so later passes only
/// touch the masked region. Must be paired with a [`ClearMaskPass`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaskPass {
    pub scene: SceneId,
    pub view: ViewId,
    pub inverse: bool,
    pub enabled: bool,
    pub clear: bool,
}

impl MaskPass {
    pub fn new(scene: SceneId, view: ViewId) -> Self {
        Self {
            scene,
            view,
            inverse: false,
            enabled: true,
            clear: true,
        }
    }

    fn render(
        &self,
        raster: &mut dyn Rasterizer,
        write: TargetId,
        read: TargetId,
    ) -> AfterglowResult<()> {
        // stencil only: color and depth stay untouched
        raster.set_color_write(false);
        raster.set_depth_write(false);

        let (write_value, clear_value) = if self.inverse { (0, 1) } else { (1, 0) };

        raster.set_stencil_test(true);
        raster.set_stencil_op(StencilOp::Replace, StencilOp::Replace, StencilOp::Replace);
        raster.set_stencil_func(StencilFunc::Always, write_value, 0xffff_ffff);
        raster.set_clear_stencil(clear_value);

        for output in [Output::Target(read), Output::Target(write)] {
            raster.render_scene(&SceneDraw {
                scene: self.scene,
                view: self.view,
                output,
                clear: self.clear,
                override_program: None,
            })?;
        }

        raster.set_color_write(true);
        raster.set_depth_write(true);

        raster.set_stencil_func(StencilFunc::Equal, 1, 0xffff_ffff);
        raster.set_stencil_op(StencilOp::Keep, StencilOp::Keep, StencilOp::Keep);
        Ok(())
    }
}

/// Ends a stencil mask scope opened by a [`MaskPass`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClearMaskPass {
    pub enabled: bool,
}

impl ClearMaskPass {
    pub fn new() -> Self {
        Self { enabled: true }
    }

    fn render(&self, raster: &mut dyn Rasterizer) -> AfterglowResult<()> {
        raster.set_stencil_test(false);
        Ok(())
    }
}

impl Default for ClearMaskPass {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies the current chain image into a held-aside target without advancing
/// the ping-pong pair, so a later pass can re-blend the snapshot.
pub struct SavePass {
    program: ProgramId,
    uniforms: UniformMap,
    target: TargetId,
    owns_target: bool,
    pub enabled: bool,
    pub clear: bool,
}

impl SavePass {
    /// Allocate a fresh snapshot target with the given parameters.
    pub fn new(raster: &mut dyn Rasterizer, desc: &TargetDesc) -> AfterglowResult<Self> {
        let shader = shaders::copy();
        let program = raster.compile_program(&shader)?;
        let target = raster.create_target(desc)?;
        Ok(Self {
            program,
            uniforms: shader.uniforms,
            target,
            owns_target: true,
            enabled: true,
            clear: false,
        })
    }

    /// Snapshot into a caller-owned target. The caller keeps responsibility
    /// for destroying it.
    pub fn with_target(raster: &mut dyn Rasterizer, target: TargetId) -> AfterglowResult<Self> {
        let shader = shaders::copy();
        let program = raster.compile_program(&shader)?;
        Ok(Self {
            program,
            uniforms: shader.uniforms,
            target,
            owns_target: false,
            enabled: true,
            clear: false,
        })
    }

    fn dispose(self, raster: &mut dyn Rasterizer) -> AfterglowResult<()> {
        if self.owns_target {
            raster.destroy_target(self.target)?;
        }
        Ok(())
    }

    /// The held-aside target the snapshot lands in.
    pub fn target(&self) -> TargetId {
        self.target
    }

    fn render(&mut self, raster: &mut dyn Rasterizer, read: TargetId) -> AfterglowResult<()> {
        self.uniforms
            .insert(INPUT_TEXTURE.to_string(), UniformValue::Texture(Some(read)));
        raster.draw_quad(&QuadDraw {
            program: self.program,
            uniforms: &self.uniforms,
            output: Output::Target(self.target),
            clear: self.clear,
            blending: Blending::Normal,
        })
    }
}
