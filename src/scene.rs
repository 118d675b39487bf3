pub mod model;
pub mod pipeline;
pub mod shader;
pub mod texture;
mod tga;

use std::cmp::{max, min};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{GrayImage, Luma, Rgb, RgbImage};
use nalgebra::{vector, Vector3, Vector4};

use crate::color::{Color, BLACK};
use crate::error::{RenderError, Result};
use shader::Shader;
use tga::TgaHeader;

/// Triangles with a doubled screen-space area below this are treated as degenerate.
const DEGENERATE_AREA: f32 = 1.0;

/// Which per-vertex value gets interpolated into the depth buffer when filling triangles.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DepthSource {
    /// z of the screen-space vertex, i.e. NDC depth after the perspective divide.
    #[default]
    ScreenZ,
    /// w of the clip-space vertex, the distance in front of the camera.
    ClipW,
}

/// Frame buffer, holding color and depth values for every pixel of a frame.
/// Both buffers are flat, row-major, with (0, 0) being the top left pixel.
pub struct Framebuffer {
    width: u32,
    height: u32,
    depth_source: DepthSource,
    color_buffer: Vec<Color>,
    depth_buffer: Vec<f32>, // Closest depth written so far, +inf when nothing was.
}

/// Barycentric coordinates of point `p` with respect to triangle `a`, `b`, `c`, using only
/// x and y of each point. None if the triangle is degenerate.
pub fn barycentric(
    a: Vector3<f32>,
    b: Vector3<f32>,
    c: Vector3<f32>,
    p: Vector3<f32>,
) -> Option<Vector3<f32>> {
    let raw_cross = Vector3::cross(
        &vector![b.x - a.x, c.x - a.x, a.x - p.x],
        &vector![b.y - a.y, c.y - a.y, a.y - p.y],
    );
    if raw_cross.z.abs() < DEGENERATE_AREA {
        return None;
    }
    return Some(vector![
        1.0 - (raw_cross.x + raw_cross.y) / raw_cross.z,
        raw_cross.x / raw_cross.z,
        raw_cross.y / raw_cross.z
    ]);
}

impl Framebuffer {
    /// Generates a black frame buffer of specified width and height with an empty depth buffer.
    pub fn new(width: u32, height: u32) -> Framebuffer {
        let n_pixels = width as usize * height as usize;
        return Framebuffer {
            width,
            height,
            depth_source: DepthSource::default(),
            color_buffer: vec![BLACK; n_pixels],
            depth_buffer: vec![f32::INFINITY; n_pixels],
        };
    }

    pub fn with_depth_source(mut self, depth_source: DepthSource) -> Framebuffer {
        self.depth_source = depth_source;
        return self;
    }

    pub fn width(&self) -> u32 {
        return self.width;
    }

    pub fn height(&self) -> u32 {
        return self.height;
    }

    pub fn depth_source(&self) -> DepthSource {
        return self.depth_source;
    }

    /// Flat buffer index of a coordinate, None when it's outside of the frame.
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        return Some(y as usize * self.width as usize + x as usize);
    }

    pub fn color_at(&self, x: i32, y: i32) -> Option<Color> {
        return self.index(x, y).map(|index| self.color_buffer[index]);
    }

    pub fn depth_at(&self, x: i32, y: i32) -> Option<f32> {
        return self.index(x, y).map(|index| self.depth_buffer[index]);
    }

    pub fn colors(&self) -> &[Color] {
        return &self.color_buffer[..];
    }

    /// Sets all pixels to black and every depth to +inf.
    pub fn clear_buffers(&mut self) {
        self.color_buffer.fill(BLACK);
        self.depth_buffer.fill(f32::INFINITY);
    }

    /// Depth tested pixel write. The pixel is written only if `depth` is strictly closer
    /// than what is stored. Returns true iff the write happened, coordinates outside of the
    /// frame are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, depth: f32, color: Color) -> bool {
        let Some(index) = self.index(x, y) else {
            return false;
        };
        if !(depth < self.depth_buffer[index]) {
            return false;
        }
        self.depth_buffer[index] = depth;
        self.color_buffer[index] = color;
        return true;
    }

    /// Color write without depth test, used for lines.
    fn plot(&mut self, x: i32, y: i32, color: Color) -> bool {
        let Some(index) = self.index(x, y) else {
            return false;
        };
        self.color_buffer[index] = color;
        return true;
    }

    /// Draws a line between (x_0, y_0) and (x_1, y_1) with Bresenham's algorithm, ignoring
    /// the depth buffer. Exactly one pixel is visited per column, or per row for steep lines.
    /// Only the part of the longer axis, that lies inside the frame, is walked.
    pub fn draw_line(&mut self, x_0: i32, y_0: i32, x_1: i32, y_1: i32, color: Color) {
        // Ceil of a / b for b > 0.
        fn div_ceil(a: i128, b: i128) -> i128 {
            return (a + b - 1).div_euclid(b);
        }

        // Full i32 range differences don't fit into i32.
        let (mut x_0, mut y_0, mut x_1, mut y_1) = (x_0 as i64, y_0 as i64, x_1 as i64, y_1 as i64);
        let steep = (y_1 - y_0).abs() > (x_1 - x_0).abs();
        if steep {
            // Transposing, so we always walk along the longer axis.
            std::mem::swap(&mut x_0, &mut y_0);
            std::mem::swap(&mut x_1, &mut y_1);
        }
        if x_0 > x_1 {
            std::mem::swap(&mut x_0, &mut x_1);
            std::mem::swap(&mut y_0, &mut y_1);
        }
        let dx = x_1 - x_0;
        let d_error_2 = 2 * (y_1 - y_0).abs();
        let y_step = if y_1 > y_0 { 1 } else { -1 };

        let x_limit = (if steep { self.height } else { self.width }) as i64;
        let x_begin = max(x_0, 0);
        let x_end = min(x_1, x_limit - 1);
        if x_begin > x_end {
            return;
        }

        // Error term after k steps is k * d_error_2 - 2 * dx * n, n being the number of
        // y steps so far, and always stays in (-dx, dx]. That fixes n for the first visible x.
        let k = (x_begin - x_0) as i128;
        let n = if dx == 0 { 0 } else { div_ceil(k * d_error_2 as i128 - dx as i128, 2 * dx as i128) };
        let mut error_2 = (k * d_error_2 as i128 - 2 * dx as i128 * n) as i64;
        let mut y = y_0 + y_step * n as i64;

        for x in x_begin..=x_end {
            // y stays between y_0 and y_1, so it fits back into i32.
            if steep {
                self.plot(y as i32, x as i32, color);
            } else {
                self.plot(x as i32, y as i32, color);
            }
            error_2 += d_error_2;
            if error_2 > dx {
                y += y_step;
                error_2 -= 2 * dx;
            }
        }
    }

    /// Fills a triangle given in screen space: x, y are pixel coordinates, z is depth and w is
    /// the clip-space w of the vertex. Every pixel inside (edges included) is passed through
    /// `shader.fragment` and then through the depth test.
    /// Returns number of pixels, that were actually written.
    pub fn draw_triangle<S: Shader + ?Sized>(&mut self, screen: &[Vector4<f32>; 3], shader: &S) -> usize {
        // Simple local bounding box struct for convenience.
        #[derive(Debug)]
        struct BoundingBox {
            x_min: i32,
            y_min: i32,
            x_max: i32,
            y_max: i32,
        }

        // Helper used to find bounding box of a triangle, clamped to the frame.
        fn get_triangle_bounding_box(screen: &[Vector4<f32>; 3], width: u32, height: u32) -> BoundingBox {
            let x_limit = width as i32 - 1;
            let y_limit = height as i32 - 1;
            let x_min = screen.iter().fold(f32::INFINITY, |acc, v| acc.min(v.x)).floor() as i32;
            let y_min = screen.iter().fold(f32::INFINITY, |acc, v| acc.min(v.y)).floor() as i32;
            let x_max = screen.iter().fold(f32::NEG_INFINITY, |acc, v| acc.max(v.x)).ceil() as i32;
            let y_max = screen.iter().fold(f32::NEG_INFINITY, |acc, v| acc.max(v.y)).ceil() as i32;
            return BoundingBox {
                x_min: max(x_min, 0),
                y_min: max(y_min, 0),
                x_max: min(x_max, x_limit),
                y_max: min(y_max, y_limit),
            };
        }

        if self.width == 0 || self.height == 0 {
            return 0;
        }
        let [a, b, c] = [screen[0].xyz(), screen[1].xyz(), screen[2].xyz()];
        if barycentric(a, b, c, a).is_none() {
            // Degenerate triangle, nothing to fill.
            return 0;
        }
        let depths = match self.depth_source {
            DepthSource::ScreenZ => vector![screen[0].z, screen[1].z, screen[2].z],
            DepthSource::ClipW => vector![screen[0].w, screen[1].w, screen[2].w],
        };

        let bbox = get_triangle_bounding_box(screen, self.width, self.height);
        let mut written = 0;
        // @OPTI barycentric coordinates are affine in x and y, could be stepped incrementally.
        for y in bbox.y_min..=bbox.y_max {
            for x in bbox.x_min..=bbox.x_max {
                let Some(bar_coord) = barycentric(a, b, c, vector![x as f32, y as f32, 0.0]) else {
                    continue;
                };
                if bar_coord.x < 0.0 || bar_coord.y < 0.0 || bar_coord.z < 0.0 {
                    // If any of the coordinates are negative, point is not in the triangle, so skipping it.
                    continue;
                }
                let depth = bar_coord.dot(&depths);
                if let Some(color) = shader.fragment(bar_coord) {
                    if self.set_pixel(x, y, depth, color) {
                        written += 1;
                    }
                }
            }
        }
        return written;
    }

    /// Writes the color buffer as an uncompressed 24-bit TGA image.
    /// `v_flip` only sets the top-down bit of the header descriptor, rows are written in
    /// buffer order either way.
    pub fn encode_tga<W: Write>(&self, mut writer: W, v_flip: bool) -> Result<()> {
        let (Ok(width), Ok(height)) = (u16::try_from(self.width), u16::try_from(self.height)) else {
            return Err(RenderError::ImageTooLarge { width: self.width, height: self.height });
        };

        writer.write_all(&TgaHeader::truecolor(width, height, v_flip).to_bytes())?;
        let pixel_data: Vec<u8> = self.color_buffer.iter().flat_map(|color| color.to_bgr()).collect();
        writer.write_all(&pixel_data)?;
        writer.flush()?;
        return Ok(());
    }

    /// Writes the frame to a TGA file, see `encode_tga`.
    pub fn write_image<P: AsRef<Path>>(&self, path: P, v_flip: bool) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| RenderError::file(path, e))?;
        return self.encode_tga(BufWriter::new(file), v_flip).map_err(|e| match e {
            RenderError::Io(source) => RenderError::file(path, source),
            other => other,
        });
    }

    /// Rendered frame as a flat slice of rgb8 values of size 3 * (number of pixels).
    pub fn to_rgb8(&self) -> Vec<u8> {
        return self.color_buffer.iter().flat_map(|c| [c.r, c.g, c.b]).collect();
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        return RgbImage::from_fn(self.width, self.height, |x, y| {
            let c = self.color_buffer[(y * self.width + x) as usize];
            Rgb([c.r, c.g, c.b])
        });
    }

    /// Saves the frame in any format the `image` crate picks from the extension.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_rgb_image().save(path)?;
        return Ok(());
    }

    /// Image, representing depth buffer values. Closest written depth is white, farthest is
    /// black, pixels never written are black too.
    pub fn depth_image(&self) -> GrayImage {
        let written = self.depth_buffer.iter().copied().filter(|d| d.is_finite());
        let (z_min, z_max) = written.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| (lo.min(d), hi.max(d)));
        let scale = z_max - z_min;
        return GrayImage::from_fn(self.width, self.height, |x, y| {
            let z = self.depth_buffer[(y * self.width + x) as usize];
            if !z.is_finite() {
                return Luma([0]);
            }
            if scale <= 0.0 {
                return Luma([255]);
            }
            Luma([(255.0 * (z_max - z) / scale) as u8])
        });
    }

    pub fn save_depth_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.depth_image().save(path)?;
        return Ok(());
    }
}
