//! Ready-made pass chains.

use crate::{
    bloom::{BloomPass, BloomSettings},
    chain::PassChain,
    error::AfterglowResult,
    pass::{Pass, RenderPass, SavePass, ShaderPass},
    raster::{Rasterizer, SceneId, TargetDesc, UniformValue, ViewId},
    shaders,
};

/// The cinematic grade chain plus the pass indices a host needs to keep the
/// resolution-dependent uniforms in sync after a resize.
pub struct CinematicChain {
    pub chain: PassChain,
    pub fxaa: usize,
    pub blend: usize,
    pub save: usize,
}

/// Assemble the full cinematic grade: scene render, FXAA, frame-trail blend
/// against a saved snapshot, bloom, bleach bypass, and a screen-presenting
/// vignette. The chain is validated before it is returned.
pub fn cinematic_chain(
    raster: &mut dyn Rasterizer,
    width: u32,
    height: u32,
    scene: SceneId,
    view: ViewId,
) -> AfterglowResult<CinematicChain> {
    let desc = TargetDesc::viewport(width, height);
    let mut chain = PassChain::new(raster, desc)?;

    let render = RenderPass::new(scene, view);

    let mut fxaa = ShaderPass::new(raster, &shaders::fxaa())?;
    fxaa.set_uniform("resolution", resolution_uniform(width, height))?;

    let save = SavePass::new(raster, &desc)?;
    let mut blend = ShaderPass::with_input(raster, &shaders::blend(), "tDiffuse1")?;
    blend.set_uniform("tDiffuse2", UniformValue::Texture(Some(save.target())))?;

    let bloom = BloomPass::new(
        raster,
        &BloomSettings {
            strength: 0.75,
            ..BloomSettings::default()
        },
    )?;

    let bleach = ShaderPass::new(raster, &shaders::bleach_bypass())?;

    let mut vignette = ShaderPass::new(raster, &shaders::vignette())?;
    vignette.render_to_screen = true;

    chain.add_pass(render);
    chain.add_pass(fxaa);
    chain.add_pass(blend);
    chain.add_pass(save);
    chain.add_pass(bloom);
    chain.add_pass(bleach);
    chain.add_pass(vignette);
    chain.validate()?;

    Ok(CinematicChain {
        chain,
        fxaa: 1,
        blend: 2,
        save: 3,
    })
}

impl CinematicChain {
    /// Resize the chain and re-point the FXAA resolution uniform at the new
    /// buffer dimensions.
    pub fn set_viewport(
        &mut self,
        raster: &mut dyn Rasterizer,
        width: u32,
        height: u32,
    ) -> AfterglowResult<()> {
        self.chain.set_size(raster, width, height)?;
        if let Some(Pass::Shader(fxaa)) = self.chain.pass_mut(self.fxaa) {
            fxaa.set_uniform("resolution", resolution_uniform(width, height))?;
        }
        Ok(())
    }
}

fn resolution_uniform(width: u32, height: u32) -> UniformValue {
    UniformValue::Vec2([1.0 / f64::from(width), 1.0 / f64::from(height)])
}
