use nalgebra::{Matrix4, Vector2, Vector3, Vector4};

use super::model::Mesh;
use super::texture::Texture;
use crate::color::Color;
use crate::error::Result;
use crate::util::{project_to_3d, to_hom_point, to_hom_vector};

/// Programmable part of the pipeline.
///
/// For every triangle `vertex` is called for slots 0, 1 and 2, storing whatever the fragment stage
/// needs, then `fragment` is called for every pixel covered by that triangle.
pub trait Shader {
    /// Clip-space position of vertex `slot` of face `face`.
    fn vertex(&mut self, face: usize, slot: usize) -> Vector4<f32>;

    /// Color of a fragment at given barycentric coordinates, None to discard the pixel.
    fn fragment(&self, bar_coord: Vector3<f32>) -> Option<Color>;
}

/// Varyings, interpolated at a single fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Varyings {
    pub uv: Vector2<f32>,
    pub normal: Vector3<f32>,
    pub world_position: Vector3<f32>,
}

/// Frame constants of the Phong shader.
#[derive(Debug, Clone, Copy)]
pub struct PhongUniforms {
    pub model_matrix: Matrix4<f32>, // Model to world, applied to positions and normals.
    pub mvp_matrix: Matrix4<f32>,   // Model to clip space.
    pub light_position: Vector3<f32>,
    pub camera_position: Vector3<f32>,
    /// Fragments with texture alpha below this are discarded. None keeps everything.
    pub alpha_cutoff: Option<u8>,
}

impl Default for PhongUniforms {
    fn default() -> Self {
        return PhongUniforms {
            model_matrix: Matrix4::identity(),
            mvp_matrix: Matrix4::identity(),
            light_position: Vector3::new(0.0, 0.0, 1.0),
            camera_position: Vector3::new(0.0, 0.0, 1.0),
            alpha_cutoff: None,
        };
    }
}

// Blinn-Phong light properties.
const AMBIENT_STRENGTH: f32 = 0.2;
const DIFFUSE_STRENGTH: f32 = 0.8;
const SPECULAR_STRENGTH: f32 = 1.0;
const SPECULAR_WEIGHT: f32 = 0.5;
const SHININESS: f32 = 32.0;

/// Textured Blinn-Phong shading with a single white point light.
pub struct PhongShader<'a> {
    mesh: &'a Mesh,
    texture: &'a Texture,
    pub uniforms: PhongUniforms,
    // Local buffer for passing values between vertex and fragment parts of the pipeline.
    varying_uvs: [Vector2<f32>; 3],
    varying_normals: [Vector3<f32>; 3],         // World space, normalized.
    varying_world_positions: [Vector3<f32>; 3],
}

impl<'a> PhongShader<'a> {
    /// Fails if some face of the mesh lacks uv or normal indices.
    pub fn new(mesh: &'a Mesh, texture: &'a Texture, uniforms: PhongUniforms) -> Result<Self> {
        mesh.check_attributes(true, true)?;
        return Ok(PhongShader {
            mesh,
            texture,
            uniforms,
            varying_uvs: [Vector2::zeros(); 3],
            varying_normals: [Vector3::zeros(); 3],
            varying_world_positions: [Vector3::zeros(); 3],
        });
    }

    /// What the vertex stage stored for `slot` of the current triangle.
    pub fn varyings(&self, slot: usize) -> Varyings {
        return Varyings {
            uv: self.varying_uvs[slot],
            normal: self.varying_normals[slot],
            world_position: self.varying_world_positions[slot],
        };
    }

    /// Weighted sum of the three vertex varyings. The normal isn't renormalized.
    pub fn interpolate(&self, bar_coord: Vector3<f32>) -> Varyings {
        fn mix<T>(values: &[T; 3], bar_coord: Vector3<f32>) -> T
        where
            T: Copy + std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
        {
            return values[0] * bar_coord.x + values[1] * bar_coord.y + values[2] * bar_coord.z;
        }

        return Varyings {
            uv: mix(&self.varying_uvs, bar_coord),
            normal: mix(&self.varying_normals, bar_coord),
            world_position: mix(&self.varying_world_positions, bar_coord),
        };
    }
}

impl Shader for PhongShader<'_> {
    fn vertex(&mut self, face: usize, slot: usize) -> Vector4<f32> {
        let position = self.mesh.position(face, slot);
        let normal = self.mesh.normal(face, slot);

        // World coordinates for lighting.
        let world_position = project_to_3d(self.uniforms.model_matrix * to_hom_point(position));
        let world_normal = project_to_3d(self.uniforms.model_matrix * to_hom_vector(normal));

        self.varying_world_positions[slot] = world_position;
        self.varying_uvs[slot] = self.mesh.uv(face, slot);
        self.varying_normals[slot] = world_normal.normalize();

        return self.uniforms.mvp_matrix * to_hom_point(position);
    }

    fn fragment(&self, bar_coord: Vector3<f32>) -> Option<Color> {
        let varyings = self.interpolate(bar_coord);
        let normal = varyings.normal.normalize();

        let texture_color = self.texture.sample(varyings.uv.x, varyings.uv.y);
        if let Some(cutoff) = self.uniforms.alpha_cutoff {
            if texture_color.a < cutoff {
                return None;
            }
        }

        let light_direction = (self.uniforms.light_position - varyings.world_position).normalize();
        let view_direction = (self.uniforms.camera_position - varyings.world_position).normalize();
        let half_direction = (light_direction + view_direction).normalize();

        let ambient = AMBIENT_STRENGTH;
        let diffuse = DIFFUSE_STRENGTH * normal.dot(&light_direction).max(0.0);
        let specular = SPECULAR_STRENGTH * normal.dot(&half_direction).max(0.0).powf(SHININESS);

        // White light, so every term is the same on all channels.
        let base_color = texture_color.to_unit_rgb();
        let lit = base_color * (ambient + diffuse) + Vector3::repeat(specular * SPECULAR_WEIGHT);
        return Some(Color::from_unit_rgb(lit));
    }
}

/// Constant color, only positions are used.
pub struct UnlitShader<'a> {
    mesh: &'a Mesh,
    pub mvp_matrix: Matrix4<f32>,
    pub color: Color,
}

impl<'a> UnlitShader<'a> {
    pub fn new(mesh: &'a Mesh, mvp_matrix: Matrix4<f32>, color: Color) -> Self {
        return UnlitShader { mesh, mvp_matrix, color };
    }
}

impl Shader for UnlitShader<'_> {
    fn vertex(&mut self, face: usize, slot: usize) -> Vector4<f32> {
        return self.mvp_matrix * to_hom_point(self.mesh.position(face, slot));
    }

    fn fragment(&self, _bar_coord: Vector3<f32>) -> Option<Color> {
        return Some(self.color);
    }
}
