//! GPU rendering subsystem.
//!
//! Renderers consume a [`FramePlan`](crate::frame::FramePlan) and issue GPU
//! commands via wgpu. Each primitive renderer owns its pipeline and buffers;
//! [`Renderer`] ties them together with the bloom post-process.
//!
//! Convention:
//! - CPU geometry is in pixels (top-left origin, +Y down).
//! - Vertex shaders convert to NDC using a viewport uniform.

pub mod bloom;
mod common;
mod ctx;
pub mod dashed;
pub mod quad;
mod renderer;
pub mod text;
pub mod tri;

pub use bloom::BloomPostProcessor;
pub use ctx::{RenderCtx, RenderTarget};
pub use renderer::Renderer;

#[cfg(test)]
mod tests {
    fn validate(name: &str, source: &str) {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|e| panic!("{name}: {}", e.emit_to_string(source)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap_or_else(|e| panic!("{name}: {e:?}"));
    }

    #[test]
    fn shaders_parse_and_validate() {
        validate("quad", include_str!("shaders/quad.wgsl"));
        validate("tri", include_str!("shaders/tri.wgsl"));
        validate("dashed", include_str!("shaders/dashed.wgsl"));
        validate("text", include_str!("shaders/text.wgsl"));
        validate("bloom", include_str!("shaders/bloom.wgsl"));
    }
}
