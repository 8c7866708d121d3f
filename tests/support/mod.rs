//! Shared test double for the rasterizer capability.

use std::collections::BTreeMap;

use afterglow::{
    AfterglowError, AfterglowResult, Blending, Output, ProgramId, QuadDraw, Rasterizer,
    SceneDraw, SceneId, ShaderDescriptor, StencilFunc, StencilOp, TargetDesc, TargetId,
    UniformMap, ViewId,
};

/// Route tracing output through the test harness when diagnosing a failure.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// One recorded capability call, in invocation order.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    CreateTarget(TargetId),
    DestroyTarget(TargetId),
    CompileProgram(ProgramId, String),
    RenderScene {
        scene: SceneId,
        view: ViewId,
        output: Output,
        clear: bool,
    },
    DrawQuad {
        program: ProgramId,
        output: Output,
        clear: bool,
        blending: Blending,
        uniforms: UniformMap,
    },
    ColorWrite(bool),
    DepthWrite(bool),
    StencilTest(bool),
    StencilFunc {
        func: StencilFunc,
        reference: u32,
    },
    StencilOps {
        fail: StencilOp,
        depth_fail: StencilOp,
        pass: StencilOp,
    },
    ClearStencil(u32),
    ClearColor([f64; 4]),
}

/// Records every capability call and tracks live targets plus the raw state
/// toggles, so tests can assert ordering, buffer identity, and leaks.
#[derive(Default)]
pub struct MockRasterizer {
    next_target: u32,
    next_program: u32,
    pub targets: BTreeMap<TargetId, TargetDesc>,
    pub programs: BTreeMap<ProgramId, String>,
    pub stencil_enabled: bool,
    pub clear_color_value: [f64; 4],
    pub ops: Vec<Op>,
}

impl MockRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn quad_draws(&self) -> Vec<&Op> {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::DrawQuad { .. }))
            .collect()
    }

    pub fn scene_draws(&self) -> Vec<&Op> {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::RenderScene { .. }))
            .collect()
    }
}

impl Rasterizer for MockRasterizer {
    fn create_target(&mut self, desc: &TargetDesc) -> AfterglowResult<TargetId> {
        self.next_target += 1;
        let id = TargetId(self.next_target);
        self.targets.insert(id, *desc);
        self.ops.push(Op::CreateTarget(id));
        Ok(id)
    }

    fn destroy_target(&mut self, target: TargetId) -> AfterglowResult<()> {
        if self.targets.remove(&target).is_none() {
            return Err(AfterglowError::raster(format!(
                "destroying unknown target {target:?}"
            )));
        }
        self.ops.push(Op::DestroyTarget(target));
        Ok(())
    }

    fn compile_program(&mut self, shader: &ShaderDescriptor) -> AfterglowResult<ProgramId> {
        self.next_program += 1;
        let id = ProgramId(self.next_program);
        self.programs.insert(id, shader.name.to_string());
        self.ops.push(Op::CompileProgram(id, shader.name.to_string()));
        Ok(id)
    }

    fn render_scene(&mut self, draw: &SceneDraw) -> AfterglowResult<()> {
        self.ops.push(Op::RenderScene {
            scene: draw.scene,
            view: draw.view,
            output: draw.output,
            clear: draw.clear,
        });
        Ok(())
    }

    fn draw_quad(&mut self, draw: &QuadDraw<'_>) -> AfterglowResult<()> {
        self.ops.push(Op::DrawQuad {
            program: draw.program,
            output: draw.output,
            clear: draw.clear,
            blending: draw.blending,
            uniforms: draw.uniforms.clone(),
        });
        Ok(())
    }

    fn set_color_write(&mut self, enabled: bool) {
        self.ops.push(Op::ColorWrite(enabled));
    }

    fn set_depth_write(&mut self, enabled: bool) {
        self.ops.push(Op::DepthWrite(enabled));
    }

    fn set_stencil_test(&mut self, enabled: bool) {
        self.stencil_enabled = enabled;
        self.ops.push(Op::StencilTest(enabled));
    }

    fn set_stencil_func(&mut self, func: StencilFunc, reference: u32, _mask: u32) {
        self.ops.push(Op::StencilFunc { func, reference });
    }

    fn set_stencil_op(&mut self, fail: StencilOp, depth_fail: StencilOp, pass: StencilOp) {
        self.ops.push(Op::StencilOps {
            fail,
            depth_fail,
            pass,
        });
    }

    fn set_clear_stencil(&mut self, value: u32) {
        self.ops.push(Op::ClearStencil(value));
    }

    fn clear_color(&self) -> [f64; 4] {
        self.clear_color_value
    }

    fn set_clear_color(&mut self, rgba: [f64; 4]) {
        self.clear_color_value = rgba;
        self.ops.push(Op::ClearColor(rgba));
    }
}
