use log::debug;
use nalgebra::{Matrix4, Vector3, Vector4};

use super::model::Mesh;
use super::shader::Shader;
use super::Framebuffer;
use crate::color::Color;
use crate::util::{project_to_3d, to_hom_point, viewport};

#[derive(Debug, Default, Clone, Copy)]
pub struct RenderSettings {
    /// Skip faces, which are clockwise on screen.
    pub cull_back_faces: bool,
}

/// Counters of a single `draw_mesh` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    pub faces: usize,
    pub culled: usize,
    pub fragments: usize,
}

/// Simple backface culling on normalized device coordinates, where counter-clockwise is front.
fn should_cull_face(ndc: &[Vector3<f32>; 3]) -> bool {
    let ab = ndc[1] - ndc[0];
    let ac = ndc[2] - ndc[0];
    return ab.x * ac.y - ab.y * ac.x <= 0.0;
}

/// Draws every face of the mesh. For each face the vertex stage runs for slots 0, 1 and 2,
/// positions are divided by w and moved to the frame buffer pixel coordinates, then the triangle
/// gets filled through the fragment stage.
pub fn draw_mesh<S: Shader + ?Sized>(
    frame: &mut Framebuffer,
    mesh: &Mesh,
    shader: &mut S,
    settings: RenderSettings,
) -> RenderStats {
    let viewport_matrix = viewport(frame.width(), frame.height());
    let mut stats = RenderStats::default();

    for face in 0..mesh.faces.len() {
        stats.faces += 1;
        let clip = [shader.vertex(face, 0), shader.vertex(face, 1), shader.vertex(face, 2)];
        let ndc = clip.map(project_to_3d);
        if settings.cull_back_faces && should_cull_face(&ndc) {
            stats.culled += 1;
            continue;
        }

        // Keeping clip w next to the screen position for depth sources, that need it.
        let screen: [Vector4<f32>; 3] = [0usize, 1, 2].map(|i| {
            let p = project_to_3d(viewport_matrix * to_hom_point(ndc[i]));
            Vector4::new(p.x, p.y, p.z, clip[i].w)
        });
        stats.fragments += frame.draw_triangle(&screen, shader);
    }

    debug!(
        "Mesh drawn: faces: {} | culled: {} | fragments: {}",
        stats.faces, stats.culled, stats.fragments
    );
    return stats;
}

/// Draws edges of every face with lines, ignoring depth.
pub fn draw_wireframe(frame: &mut Framebuffer, mesh: &Mesh, mvp_matrix: Matrix4<f32>, color: Color) {
    let viewport_matrix = viewport(frame.width(), frame.height());
    for face in 0..mesh.faces.len() {
        let screen = [0, 1, 2].map(|slot| {
            let ndc = project_to_3d(mvp_matrix * to_hom_point(mesh.position(face, slot)));
            project_to_3d(viewport_matrix * to_hom_point(ndc))
        });
        for i in 0..3 {
            let a = screen[i];
            let b = screen[(i + 1) % 3];
            frame.draw_line(a.x as i32, a.y as i32, b.x as i32, b.y as i32, color);
        }
    }
}
