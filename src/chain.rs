use crate::{
    error::{AfterglowError, AfterglowResult},
    pass::Pass,
    raster::{
        Blending, Output, ProgramId, QuadDraw, Rasterizer, StencilFunc, TargetDesc, TargetId,
        UniformMap, UniformValue,
    },
    shaders::{self, INPUT_TEXTURE},
};

/// An ordered list of passes sharing two alternating ping-pong targets.
///
/// The chain owns both targets and a copy program used to carry masked-out
/// regions across a buffer swap. Invariant: between passes, exactly one of
/// the two targets holds the current chain image and is sampled by the next
/// pass; after `render`, the read buffer (or whichever pass presented to
/// screen) holds the final image.
pub struct PassChain {
    desc: TargetDesc,
    target1: TargetId,
    target2: TargetId,
    write: TargetId,
    read: TargetId,
    passes: Vec<Pass>,
    copy_program: ProgramId,
    copy_uniforms: UniformMap,
}

impl PassChain {
    pub fn new(raster: &mut dyn Rasterizer, desc: TargetDesc) -> AfterglowResult<Self> {
        let copy_shader = shaders::copy();
        let copy_program = raster.compile_program(&copy_shader)?;
        let (target1, target2) = allocate_pair(raster, &desc)?;
        Ok(Self {
            desc,
            target1,
            target2,
            write: target1,
            read: target2,
            passes: Vec::new(),
            copy_program,
            copy_uniforms: copy_shader.uniforms,
        })
    }

    pub fn add_pass(&mut self, pass: impl Into<Pass>) {
        self.passes.push(pass.into());
    }

    pub fn insert_pass(&mut self, pass: impl Into<Pass>, index: usize) {
        self.passes.insert(index, pass.into());
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    /// Mutable access to one pass, for callers that must re-configure
    /// resolution-caching uniforms after a resize. The chain itself never
    /// introspects pass internals.
    pub fn pass_mut(&mut self, index: usize) -> Option<&mut Pass> {
        self.passes.get_mut(index)
    }

    pub fn target_desc(&self) -> &TargetDesc {
        &self.desc
    }

    /// The target holding the current chain image after the last swap.
    pub fn read_buffer(&self) -> TargetId {
        self.read
    }

    pub fn write_buffer(&self) -> TargetId {
        self.write
    }

    /// Assembly-time check that exactly one pass presents to screen and comes
    /// last among the enabled passes, and that every mask scope is closed
    /// again (an unmatched mask would leave the stencil test enabled after
    /// `render`). `render` itself does not call this: a chain with zero
    /// enabled passes stays a legal no-op.
    pub fn validate(&self) -> AfterglowResult<()> {
        let mut mask_open = false;
        for pass in &self.passes {
            match pass {
                Pass::Mask(p) if p.enabled => mask_open = true,
                Pass::ClearMask(p) if p.enabled => mask_open = false,
                _ => {}
            }
        }
        if mask_open {
            return Err(AfterglowError::config(
                "mask pass is never closed by a clear-mask pass",
            ));
        }

        let screen_passes: Vec<usize> = self
            .passes
            .iter()
            .enumerate()
            .filter(|(_, pass)| pass.renders_to_screen())
            .map(|(index, _)| index)
            .collect();

        match screen_passes.as_slice() {
            [] => Err(AfterglowError::config(
                "chain has no screen-presenting pass",
            )),
            [index] => {
                let last_enabled = self.passes.iter().rposition(Pass::enabled);
                if last_enabled == Some(*index) {
                    Ok(())
                } else {
                    Err(AfterglowError::config(
                        "screen-presenting pass must be the last enabled pass",
                    ))
                }
            }
            many => Err(AfterglowError::config(format!(
                "chain has {} screen-presenting passes, expected exactly one",
                many.len()
            ))),
        }
    }

    /// Run every enabled pass in order against the current scene state.
    ///
    /// Swap-eligible passes flip the ping-pong pair; while a mask scope is
    /// active the swap first copies the pre-pass image into the regions the
    /// stencil excluded, so masked-out pixels survive the swap.
    #[tracing::instrument(skip(self, raster))]
    pub fn render(&mut self, raster: &mut dyn Rasterizer, delta: f64) -> AfterglowResult<()> {
        self.write = self.target1;
        self.read = self.target2;

        let mut mask_active = false;

        for pass in &mut self.passes {
            if !pass.enabled() {
                continue;
            }

            pass.execute(raster, self.write, self.read, delta, mask_active)?;

            if pass.needs_swap() {
                if mask_active {
                    raster.set_stencil_func(StencilFunc::NotEqual, 1, 0xffff_ffff);
                    self.copy_uniforms.insert(
                        INPUT_TEXTURE.to_string(),
                        UniformValue::Texture(Some(self.read)),
                    );
                    raster.draw_quad(&QuadDraw {
                        program: self.copy_program,
                        uniforms: &self.copy_uniforms,
                        output: Output::Target(self.write),
                        clear: false,
                        blending: Blending::Normal,
                    })?;
                    raster.set_stencil_func(StencilFunc::Equal, 1, 0xffff_ffff);
                }

                std::mem::swap(&mut self.write, &mut self.read);
            }

            match pass {
                Pass::Mask(_) => mask_active = true,
                Pass::ClearMask(_) => mask_active = false,
                _ => {}
            }
        }

        Ok(())
    }

    /// Reallocate both ping-pong targets, keeping the pass list. The swap of
    /// old for new is atomic: both replacements exist before either original
    /// is destroyed, and a failed second allocation releases the first.
    pub fn reset(
        &mut self,
        raster: &mut dyn Rasterizer,
        desc: Option<TargetDesc>,
    ) -> AfterglowResult<()> {
        let desc = desc.unwrap_or(self.desc);
        let (target1, target2) = allocate_pair(raster, &desc)?;

        let old = (self.target1, self.target2);
        self.desc = desc;
        self.target1 = target1;
        self.target2 = target2;
        self.write = target1;
        self.read = target2;

        raster.destroy_target(old.0)?;
        raster.destroy_target(old.1)?;

        tracing::debug!(
            width = desc.width,
            height = desc.height,
            "reallocated ping-pong targets"
        );
        Ok(())
    }

    /// Resize both ping-pong targets. Passes that cache absolute-resolution
    /// uniforms (e.g. FXAA) must be reconfigured by the caller afterwards.
    pub fn set_size(
        &mut self,
        raster: &mut dyn Rasterizer,
        width: u32,
        height: u32,
    ) -> AfterglowResult<()> {
        let desc = TargetDesc {
            width,
            height,
            ..self.desc
        };
        self.reset(raster, Some(desc))
    }

    /// Tear the chain down, releasing the ping-pong pair and every target a
    /// pass allocated for itself.
    pub fn dispose(self, raster: &mut dyn Rasterizer) -> AfterglowResult<()> {
        raster.destroy_target(self.target1)?;
        raster.destroy_target(self.target2)?;
        for pass in self.passes {
            pass.dispose(raster)?;
        }
        Ok(())
    }
}

fn allocate_pair(
    raster: &mut dyn Rasterizer,
    desc: &TargetDesc,
) -> AfterglowResult<(TargetId, TargetId)> {
    let first = raster.create_target(desc)?;
    let second = match raster.create_target(desc) {
        Ok(target) => target,
        Err(err) => {
            raster.destroy_target(first)?;
            return Err(err);
        }
    };
    Ok((first, second))
}
