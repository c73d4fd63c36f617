//! WebGPU rendering module
//!
//! The scene is tessellated on the CPU into a flat triangle list in screen
//! pixels; the pipeline maps it to clip space and draws it in one call.
//! Text labels are returned separately for the 2D overlay canvas.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderError, RenderState};
pub use scene::{Frame, Label, RenderOptions, build_frame, shake_offset};
pub use vertex::Vertex;
