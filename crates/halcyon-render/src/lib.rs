//! wgpu rendering for the Halcyon backdrop engine: GPU context and capability
//! gating, frame encoding, the shader-layer abstraction, the gradient
//! fallback, and the bloom + grade post-processing chain.

pub mod bloom;
pub mod capability;
pub mod gpu;
pub mod gradient;
pub mod grade;
pub mod layer;
pub mod pass;
pub mod postfx;
pub mod sprite;
pub mod viewport;

pub use bloom::BloomPipeline;
pub use capability::{CapabilityGate, RenderPath, select_render_path};
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use gradient::{GradientBackdrop, GradientPalette, palette_for};
pub use grade::GradePass;
pub use layer::{Layer, LayerStack, LayerUniforms, ShaderPlane, ShaderPlaneDesc};
pub use pass::{FrameEncoder, RenderPassBuilder};
pub use postfx::{
    BloomSettings, GradeSettings, PostFxChain, PostFxError, PostFxPreset, PresetDamper,
};
pub use sprite::{SpriteBatch, SpriteInstance};
pub use viewport::{PhysicalSize, Viewport};
