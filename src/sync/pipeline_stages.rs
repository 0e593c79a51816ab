// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Pipeline stage masks and their mapping from resource states.

use crate::resources::ResourceState;

bitflags::bitflags! {
    /// Stages of the GPU pipeline a transition synchronizes against.
    ///
    /// A barrier set maintains the union of these across all its barriers;
    /// backends that take whole-barrier stage masks (Vulkan, Metal) consume
    /// the aggregate, backends that don't ignore it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PipelineStages: u32 {
        const TOP_OF_PIPE     = 1 << 0;
        const VERTEX_SHADER   = 1 << 1;
        const PIXEL_SHADER    = 1 << 2;
        const COMPUTE_SHADER  = 1 << 3;
        const DEPTH_STENCIL   = 1 << 4;
        const COLOR_OUTPUT    = 1 << 5;
        const TRANSFER        = 1 << 6;
        const BOTTOM_OF_PIPE  = 1 << 7;
    }
}

impl PipelineStages {
    /// Stages that can observe a resource in the given state.
    pub fn for_state(state: ResourceState) -> Self {
        match state {
            ResourceState::Undefined => PipelineStages::TOP_OF_PIPE,
            ResourceState::Common => PipelineStages::all(),
            ResourceState::ConstantBufferRead | ResourceState::ShaderResource => {
                PipelineStages::VERTEX_SHADER
                    | PipelineStages::PIXEL_SHADER
                    | PipelineStages::COMPUTE_SHADER
            }
            ResourceState::RenderTarget => PipelineStages::COLOR_OUTPUT,
            ResourceState::DepthWrite | ResourceState::DepthRead => PipelineStages::DEPTH_STENCIL,
            ResourceState::CopySource | ResourceState::CopyDest => PipelineStages::TRANSFER,
            ResourceState::Present => PipelineStages::BOTTOM_OF_PIPE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_states_cover_all_shader_stages() {
        for state in [
            ResourceState::ConstantBufferRead,
            ResourceState::ShaderResource,
        ] {
            let stages = PipelineStages::for_state(state);
            assert!(stages.contains(PipelineStages::VERTEX_SHADER));
            assert!(stages.contains(PipelineStages::PIXEL_SHADER));
            assert!(stages.contains(PipelineStages::COMPUTE_SHADER));
            assert!(!stages.contains(PipelineStages::TRANSFER));
        }
    }
}
