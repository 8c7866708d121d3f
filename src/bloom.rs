use crate::{
    error::AfterglowResult,
    kernel,
    raster::{
        Blending, FilterMode, Output, PixelFormat, ProgramId, QuadDraw, Rasterizer, TargetDesc,
        TargetId, UniformMap, UniformValue,
    },
    shaders::{self, INPUT_TEXTURE},
};

/// Horizontal and vertical texel steps for the separable blur. Fixed values
/// (1/512) independent of the intermediate target size, kept for
/// output-compatibility with the reference effect.
pub const BLUR_X: [f64; 2] = [0.001953125, 0.0];
pub const BLUR_Y: [f64; 2] = [0.0, 0.001953125];

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BloomSettings {
    /// Blend strength of the blurred image over the source.
    pub strength: f64,
    /// Tap count compiled into the convolution program.
    pub kernel_size: usize,
    /// Gaussian sigma for the blur kernel.
    pub sigma: f64,
    /// Edge length of the square intermediate targets. The fixed low default
    /// is an intentional performance approximation, not a bug.
    pub resolution: u32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            strength: 1.0,
            kernel_size: 25,
            sigma: 4.0,
            resolution: 256,
        }
    }
}

/// Two-stage separable Gaussian blur at a fixed low resolution, additively
/// composited back over the chain's read buffer.
///
/// Self-contained: owns its two intermediate targets and both programs, does
/// not advance the ping-pong pair.
pub struct BloomPass {
    target_x: TargetId,
    target_y: TargetId,
    copy_program: ProgramId,
    copy_uniforms: UniformMap,
    convolution_program: ProgramId,
    convolution_uniforms: UniformMap,
    pub enabled: bool,
    pub clear: bool,
}

impl BloomPass {
    pub fn new(raster: &mut dyn Rasterizer, settings: &BloomSettings) -> AfterglowResult<Self> {
        let copy_shader = shaders::copy();
        let copy_program = raster.compile_program(&copy_shader)?;
        let mut copy_uniforms = copy_shader.uniforms;
        copy_uniforms.insert(
            "opacity".to_string(),
            UniformValue::Float(settings.strength),
        );

        let convolution_shader = shaders::convolution(settings.kernel_size);
        let convolution_program = raster.compile_program(&convolution_shader)?;
        let mut convolution_uniforms = convolution_shader.uniforms;
        convolution_uniforms.insert(
            "cKernel".to_string(),
            UniformValue::FloatArray(kernel::build_kernel(settings.sigma)?),
        );

        let desc = TargetDesc {
            width: settings.resolution,
            height: settings.resolution,
            filter: FilterMode::Linear,
            format: PixelFormat::Rgb8,
            stencil: false,
        };
        let target_x = raster.create_target(&desc)?;
        let target_y = match raster.create_target(&desc) {
            Ok(target) => target,
            Err(err) => {
                raster.destroy_target(target_x)?;
                return Err(err);
            }
        };

        Ok(Self {
            target_x,
            target_y,
            copy_program,
            copy_uniforms,
            convolution_program,
            convolution_uniforms,
            enabled: true,
            clear: false,
        })
    }

    pub fn targets(&self) -> (TargetId, TargetId) {
        (self.target_x, self.target_y)
    }

    pub(crate) fn dispose(self, raster: &mut dyn Rasterizer) -> AfterglowResult<()> {
        raster.destroy_target(self.target_x)?;
        raster.destroy_target(self.target_y)
    }

    pub(crate) fn render(
        &mut self,
        raster: &mut dyn Rasterizer,
        read: TargetId,
        mask_active: bool,
    ) -> AfterglowResult<()> {
        // The off-screen blur must not be clipped by an active mask scope.
        if mask_active {
            raster.set_stencil_test(false);
        }

        self.convolution_uniforms
            .insert(INPUT_TEXTURE.to_string(), UniformValue::Texture(Some(read)));
        self.convolution_uniforms
            .insert("uImageIncrement".to_string(), UniformValue::Vec2(BLUR_X));
        raster.draw_quad(&QuadDraw {
            program: self.convolution_program,
            uniforms: &self.convolution_uniforms,
            output: Output::Target(self.target_x),
            clear: true,
            blending: Blending::Normal,
        })?;

        self.convolution_uniforms.insert(
            INPUT_TEXTURE.to_string(),
            UniformValue::Texture(Some(self.target_x)),
        );
        self.convolution_uniforms
            .insert("uImageIncrement".to_string(), UniformValue::Vec2(BLUR_Y));
        raster.draw_quad(&QuadDraw {
            program: self.convolution_program,
            uniforms: &self.convolution_uniforms,
            output: Output::Target(self.target_y),
            clear: true,
            blending: Blending::Normal,
        })?;

        self.copy_uniforms.insert(
            INPUT_TEXTURE.to_string(),
            UniformValue::Texture(Some(self.target_y)),
        );

        if mask_active {
            raster.set_stencil_test(true);
        }

        raster.draw_quad(&QuadDraw {
            program: self.copy_program,
            uniforms: &self.copy_uniforms,
            output: Output::Target(read),
            clear: self.clear,
            blending: Blending::Additive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_reference_effect() {
        let settings = BloomSettings::default();
        assert_eq!(settings.strength, 1.0);
        assert_eq!(settings.kernel_size, 25);
        assert_eq!(settings.sigma, 4.0);
        assert_eq!(settings.resolution, 256);
    }

    #[test]
    fn blur_increments_are_axis_aligned() {
        assert_eq!(BLUR_X[1], 0.0);
        assert_eq!(BLUR_Y[0], 0.0);
        assert_eq!(BLUR_X[0], BLUR_Y[1]);
    }
}
