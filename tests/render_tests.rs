use std::collections::HashSet;

use nalgebra::{vector, Vector3, Vector4};

use soft_raster::color::{BLACK, BLUE, GREEN, RED, WHITE};
use soft_raster::{
    draw_mesh, Color, Framebuffer, Mesh, PhongShader, PhongUniforms, RenderSettings, RenderStats, Shader, Texture,
};

/// Fills every covered pixel with one color and counts how many fragments were asked for.
struct Flat {
    color: Color,
    calls: std::cell::Cell<usize>,
}

impl Shader for Flat {
    fn vertex(&mut self, _face: usize, _slot: usize) -> Vector4<f32> {
        return Vector4::zeros();
    }

    fn fragment(&self, _bar_coord: Vector3<f32>) -> Option<Color> {
        self.calls.set(self.calls.get() + 1);
        return Some(self.color);
    }
}

fn written_pixels(frame: &Framebuffer) -> HashSet<(i32, i32)> {
    let mut pixels = HashSet::new();
    for y in 0..frame.height() as i32 {
        for x in 0..frame.width() as i32 {
            if frame.color_at(x, y) != Some(BLACK) {
                pixels.insert((x, y));
            }
        }
    }
    return pixels;
}

#[test]
fn right_triangle_covers_its_edges() {
    let mut frame = Framebuffer::new(8, 8);
    let shader = Flat { color: WHITE, calls: Default::default() };
    let screen = [vector![0.0, 0.0, 0.0, 1.0], vector![4.0, 0.0, 0.0, 1.0], vector![0.0, 4.0, 0.0, 1.0]];
    assert_eq!(frame.draw_triangle(&screen, &shader), 15);
    assert_eq!(shader.calls.get(), 15);

    let expected: HashSet<(i32, i32)> = (0..5).flat_map(|y| (0..5 - y).map(move |x| (x, y))).collect();
    assert_eq!(written_pixels(&frame), expected);
}

#[test]
fn lines_do_not_depend_on_endpoint_order() {
    let segments = [(0, 0, 7, 3), (1, 6, 5, 0), (0, 7, 7, 0), (3, 1, 3, 6), (0, 4, 7, 4), (2, 2, 2, 2)];
    for (x_0, y_0, x_1, y_1) in segments {
        let mut forward = Framebuffer::new(8, 8);
        forward.draw_line(x_0, y_0, x_1, y_1, WHITE);
        let mut backward = Framebuffer::new(8, 8);
        backward.draw_line(x_1, y_1, x_0, y_0, WHITE);

        let pixels = written_pixels(&forward);
        assert_eq!(pixels, written_pixels(&backward), "{:?}", (x_0, y_0, x_1, y_1));
        assert!(pixels.contains(&(x_0, y_0)) && pixels.contains(&(x_1, y_1)));
        // One pixel per step along the major axis.
        let steps = (x_1 - x_0).abs().max((y_1 - y_0).abs()) as usize;
        assert_eq!(pixels.len(), steps + 1);
    }
}

fn checker_frame() -> Framebuffer {
    let mut frame = Framebuffer::new(3, 2);
    let colors = [[RED, GREEN, BLUE], [WHITE, Color::new(10, 20, 30), BLACK]];
    for (y, row) in colors.iter().enumerate() {
        for (x, &color) in row.iter().enumerate() {
            assert!(frame.set_pixel(x as i32, y as i32, 0.0, color));
        }
    }
    return frame;
}

/// Texel (x, y) of a texture through nearest sampling.
fn texel(texture: &Texture, x: u32, y: u32) -> Color {
    let u = (x as f32 + 0.5) / (texture.width() - 1) as f32;
    let v = (y as f32 + 0.5) / (texture.height() - 1) as f32;
    return texture.sample(u, v);
}

#[test]
fn written_tga_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.tga");
    let frame = checker_frame();
    frame.write_image(&path, true).unwrap();

    let texture = Texture::load_tga(&path).unwrap();
    assert_eq!((texture.width(), texture.height(), texture.bytes_per_pixel()), (3, 2, 3));
    for y in 0..2 {
        for x in 0..3 {
            assert_eq!(texel(&texture, x, y), frame.color_at(x as i32, y as i32).unwrap(), "({x}, {y})");
        }
    }
}

#[test]
fn tga_without_flip_reads_back_mirrored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.tga");
    let frame = checker_frame();
    frame.write_image(&path, false).unwrap();

    let texture = Texture::load(&path).unwrap();
    for y in 0..2 {
        for x in 0..3 {
            assert_eq!(texel(&texture, x, 1 - y), frame.color_at(x as i32, y as i32).unwrap());
        }
    }
}

#[test]
fn missing_texture_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Texture::load_tga(dir.path().join("nope.tga"));
    assert!(result.unwrap_err().to_string().contains("nope.tga"));
}

#[test]
fn clearing_resets_both_buffers() {
    let mut frame = checker_frame();
    frame.clear_buffers();
    assert!(frame.colors().iter().all(|&c| c == BLACK));
    assert_eq!(frame.depth_at(1, 1), Some(f32::INFINITY));
    // Anything is closer than an empty depth buffer.
    assert!(frame.set_pixel(1, 1, 1e30, RED));
}

const QUAD: &str = "\
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

#[test]
fn textured_quad_fills_the_frame() {
    let dir = tempfile::tempdir().unwrap();
    let mesh_path = dir.path().join("quad.obj");
    std::fs::write(&mesh_path, QUAD).unwrap();
    let mesh = Mesh::load_obj(&mesh_path).unwrap();

    // 2x2 texture, red in the top left corner.
    let mut texture_frame = Framebuffer::new(2, 2);
    for (x, y, color) in [(0, 0, RED), (1, 0, GREEN), (0, 1, BLUE), (1, 1, WHITE)] {
        texture_frame.set_pixel(x, y, 0.0, color);
    }
    let texture_path = dir.path().join("texture.tga");
    texture_frame.write_image(&texture_path, true).unwrap();
    let texture = Texture::load(&texture_path).unwrap();

    let uniforms = PhongUniforms {
        light_position: vector![0.0, 0.0, 5.0],
        camera_position: vector![0.0, 0.0, 5.0],
        ..Default::default()
    };
    let mut shader = PhongShader::new(&mesh, &texture, uniforms).unwrap();
    let mut frame = Framebuffer::new(8, 8);
    let stats = draw_mesh(&mut frame, &mesh, &mut shader, RenderSettings::default());

    // Shared diagonal is written by the first triangle only, equal depth doesn't overwrite.
    assert_eq!(stats, RenderStats { faces: 2, culled: 0, fragments: 64 });
    assert_eq!(written_pixels(&frame).len(), 64);
    let top_left = frame.color_at(0, 0).unwrap();
    assert!(top_left.r > top_left.g && top_left.r > top_left.b, "{:?}", top_left);
}
