use crate::{
    chain::PassChain,
    error::AfterglowResult,
    orbit::{InputEvent, OrbitController},
    raster::{Rasterizer, SceneId, ViewId},
};

/// Explicit scene state threaded into per-frame updates. Replaces any ambient
/// globals: whoever owns the `Stage` owns everything frame logic touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SceneState {
    pub scene: SceneId,
    pub view: ViewId,
    pub viewport: (u32, u32),
}

/// One scene's controller + compositor, driven by an explicit `tick` the host
/// calls at its own cadence. No wall-clock assumptions beyond `delta`.
pub struct Stage {
    pub state: SceneState,
    pub controller: OrbitController,
    pub chain: PassChain,
}

impl Stage {
    pub fn new(state: SceneState, controller: OrbitController, chain: PassChain) -> Self {
        Self {
            state,
            controller,
            chain,
        }
    }

    pub fn handle_event(&mut self, event: &InputEvent) {
        self.controller.handle_event(event);
    }

    /// Advance one frame: apply camera impulses, then run the pass chain.
    pub fn tick(&mut self, raster: &mut dyn Rasterizer, delta: f64) -> AfterglowResult<()> {
        self.controller.update();
        self.chain.render(raster, delta)
    }

    /// Resize the chain to a new viewport. Passes caching absolute-resolution
    /// uniforms still need reconfiguring by the caller (see
    /// [`crate::preset::CinematicChain::set_viewport`] for the pattern).
    pub fn set_viewport(
        &mut self,
        raster: &mut dyn Rasterizer,
        width: u32,
        height: u32,
    ) -> AfterglowResult<()> {
        self.state.viewport = (width, height);
        self.chain.set_size(raster, width, height)
    }
}
