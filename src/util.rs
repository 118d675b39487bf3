use nalgebra as na;
use na::{matrix, vector, Matrix4, Vector3, Vector4};

/// Transformation of a point to homogenous coordinates.
pub fn to_hom_point(v: Vector3<f32>) -> Vector4<f32> {
    return vector![v.x, v.y, v.z, 1.0];
}

/// Transformation of a direction to homogenous coordinates, translation doesn't affect it.
pub fn to_hom_vector(v: Vector3<f32>) -> Vector4<f32> {
    return vector![v.x, v.y, v.z, 0.0];
}

/// Projection from homogenous coordinates back to 3D.
/// Divides by w, unless w is exactly zero, then xyz are returned as is.
pub fn project_to_3d(v: Vector4<f32>) -> Vector3<f32> {
    if v.w == 0.0 {
        return vector![v.x, v.y, v.z];
    }
    return vector![v.x / v.w, v.y / v.w, v.z / v.w];
}

pub fn translation(t: Vector3<f32>) -> Matrix4<f32> {
    return matrix![1.0, 0.0, 0.0, t.x;
                   0.0, 1.0, 0.0, t.y;
                   0.0, 0.0, 1.0, t.z;
                   0.0, 0.0, 0.0, 1.0];
}

/// Axis aligned scaling.
pub fn scaling(s: Vector3<f32>) -> Matrix4<f32> {
    return matrix![s.x, 0.0, 0.0, 0.0;
                   0.0, s.y, 0.0, 0.0;
                   0.0, 0.0, s.z, 0.0;
                   0.0, 0.0, 0.0, 1.0];
}

/// Rotation around the x axis, angle in radians.
pub fn rotation_x(angle: f32) -> Matrix4<f32> {
    let (s, c) = angle.sin_cos();
    return matrix![1.0, 0.0, 0.0, 0.0;
                   0.0, c,   -s,  0.0;
                   0.0, s,   c,   0.0;
                   0.0, 0.0, 0.0, 1.0];
}

/// Rotation around the y axis, angle in radians.
pub fn rotation_y(angle: f32) -> Matrix4<f32> {
    let (s, c) = angle.sin_cos();
    return matrix![c,   0.0, s,   0.0;
                   0.0, 1.0, 0.0, 0.0;
                   -s,  0.0, c,   0.0;
                   0.0, 0.0, 0.0, 1.0];
}

/// Rotation around the z axis, angle in radians.
pub fn rotation_z(angle: f32) -> Matrix4<f32> {
    let (s, c) = angle.sin_cos();
    return matrix![c,   -s,  0.0, 0.0;
                   s,   c,   0.0, 0.0;
                   0.0, 0.0, 1.0, 0.0;
                   0.0, 0.0, 0.0, 1.0];
}

/// View matrix, moving the world into the basis of a camera placed at `eye` and looking at `center`.
/// Right-handed: the local z axis points from `center` to `eye`, so the camera looks down its -z.
///
/// `eye` must differ from `center` and `up` must not be parallel to the view direction,
/// otherwise the basis can't be normalized.
pub fn look_at(eye: Vector3<f32>, center: Vector3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    // New coordinate system x, y, z around camera position.
    let z = (eye - center).normalize();
    let x = up.cross(&z).normalize();
    let y = z.cross(&x).normalize();
    return matrix![x.x, x.y, x.z, -x.dot(&eye);
                   y.x, y.y, y.z, -y.dot(&eye);
                   z.x, z.y, z.z, -z.dot(&eye);
                   0.0, 0.0, 0.0, 1.0];
}

/// Symmetric perspective projection. `fov_y` is the vertical field of view in radians.
/// Points on the near plane land at z = -1 and on the far plane at z = 1 after the divide.
pub fn perspective(fov_y: f32, aspect_ratio: f32, near: f32, far: f32) -> Matrix4<f32> {
    let tan_half_fov = (fov_y / 2.0).tan();
    let depth = far - near;
    return matrix![1.0 / (aspect_ratio * tan_half_fov), 0.0, 0.0, 0.0;
                   0.0, 1.0 / tan_half_fov, 0.0, 0.0;
                   0.0, 0.0, -(far + near) / depth, -(2.0 * far * near) / depth;
                   0.0, 0.0, -1.0, 0.0];
}

/// Transformation of normalized device coordinates to the pixel coordinates of a frame
/// of given size. x, y in [-1.0, 1.0] go to [0, width - 1] x [0, height - 1], with y = 1.0
/// landing on the top row (row 0), z is passed through.
pub fn viewport(width: u32, height: u32) -> Matrix4<f32> {
    // Redef for convenience.
    let w = width.saturating_sub(1) as f32;
    let h = height.saturating_sub(1) as f32;
    return matrix![w / 2.0, 0.0,      0.0, w / 2.0;
                   0.0,     -h / 2.0, 0.0, h / 2.0;
                   0.0,     0.0,      1.0, 0.0;
                   0.0,     0.0,      0.0, 1.0];
}
