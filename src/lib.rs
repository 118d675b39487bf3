//! Small software rasterizer: depth-tested triangle filling through programmable shaders,
//! Bresenham lines, TGA textures in and out.

pub mod color;
pub mod error;
pub mod scene;
pub mod util;

pub use color::Color;
pub use error::{RenderError, Result};
pub use scene::model::{FaceIndex, Mesh};
pub use scene::pipeline::{draw_mesh, draw_wireframe, RenderSettings, RenderStats};
pub use scene::shader::{PhongShader, PhongUniforms, Shader, UnlitShader, Varyings};
pub use scene::texture::Texture;
pub use scene::{barycentric, DepthSource, Framebuffer};
