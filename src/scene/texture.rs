use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use image::RgbaImage;
use log::{debug, info};

use super::tga::{TgaHeader, UNCOMPRESSED_TRUECOLOR};
use crate::color::{Color, BLACK};
use crate::error::{RenderError, Result};

/// Raw texture, sampled by shaders with nearest-neighbour lookup.
/// Pixel data is kept in TGA byte order (blue, green, red, optionally alpha) and always top-down,
/// so uv (0, 0) is the top left texel and (1, 1) is the bottom right one.
#[derive(Debug, Default, Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
    pixel_data: Vec<u8>,
}

impl Texture {
    /// Decodes an uncompressed 24 or 32 bit TGA image. Anything else is rejected before pixel data
    /// is read.
    pub fn decode_tga<R: Read>(mut reader: R) -> Result<Texture> {
        let header = TgaHeader::read_from(&mut reader)?;
        if header.image_type != UNCOMPRESSED_TRUECOLOR
            || (header.bits_per_pixel != 24 && header.bits_per_pixel != 32)
        {
            return Err(RenderError::UnsupportedTga {
                image_type: header.image_type,
                bits_per_pixel: header.bits_per_pixel,
            });
        }

        // Skipping image id field.
        let mut image_id = vec![0u8; header.id_length as usize];
        reader.read_exact(&mut image_id)?;

        let width = header.width as usize;
        let height = header.height as usize;
        let bytes_per_pixel = header.bits_per_pixel as usize / 8;
        // Buffer grows only with the data actually read, not with what the header claims.
        let n_bytes = width * height * bytes_per_pixel;
        let mut pixel_data = Vec::new();
        reader.by_ref().take(n_bytes as u64).read_to_end(&mut pixel_data)?;
        if pixel_data.len() < n_bytes {
            return Err(RenderError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("TGA pixel data is {} bytes, expected {}", pixel_data.len(), n_bytes),
            )));
        }

        if !header.is_top_down() {
            debug!("TGA image is bottom-up, flipping {} rows", height);
            pixel_data = flip_rows(&pixel_data, width * bytes_per_pixel);
        }

        return Ok(Texture {
            width: header.width as u32,
            height: header.height as u32,
            bytes_per_pixel,
            pixel_data,
        });
    }

    pub fn load_tga<P: AsRef<Path>>(path: P) -> Result<Texture> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| RenderError::file(path, e))?;
        let texture = Texture::decode_tga(BufReader::new(file)).map_err(|e| match e {
            RenderError::Io(source) => RenderError::file(path, source),
            other => other,
        })?;
        info!(
            "Texture loaded: {} | size: {}x{} | bpp: {}",
            path.display(),
            texture.width,
            texture.height,
            texture.bytes_per_pixel * 8
        );
        return Ok(texture);
    }

    /// Loads a texture, TGA files go through the own decoder, other formats through `image`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Texture> {
        let path = path.as_ref();
        let is_tga = path
            .extension()
            .map_or(false, |extension| extension.eq_ignore_ascii_case("tga"));
        if is_tga {
            return Texture::load_tga(path);
        }
        let texture = Texture::from_rgba_image(&image::open(path)?.to_rgba8());
        info!("Texture loaded: {} | size: {}x{}", path.display(), texture.width, texture.height);
        return Ok(texture);
    }

    /// Converts an image with top left origin into a 32 bit texture.
    pub fn from_rgba_image(image: &RgbaImage) -> Texture {
        let pixel_data = image.pixels().flat_map(|p| [p.0[2], p.0[1], p.0[0], p.0[3]]).collect();
        return Texture {
            width: image.width(),
            height: image.height(),
            bytes_per_pixel: 4,
            pixel_data,
        };
    }

    /// Single texel texture of a given color, sampling it anywhere returns that color.
    pub fn from_color(color: Color) -> Texture {
        return Texture {
            width: 1,
            height: 1,
            bytes_per_pixel: 4,
            pixel_data: vec![color.b, color.g, color.r, color.a],
        };
    }

    pub fn width(&self) -> u32 {
        return self.width;
    }

    pub fn height(&self) -> u32 {
        return self.height;
    }

    pub fn bytes_per_pixel(&self) -> usize {
        return self.bytes_per_pixel;
    }

    pub fn is_empty(&self) -> bool {
        return self.pixel_data.is_empty();
    }

    /// Nearest-neighbour lookup. u and v are clamped to [0.0, 1.0]. 24 bit textures give
    /// opaque colors, an empty texture gives black.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        if self.is_empty() {
            return BLACK;
        }
        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);
        let x = (u * (self.width - 1) as f32) as usize;
        let y = (v * (self.height - 1) as f32) as usize;

        let index = (y * self.width as usize + x) * self.bytes_per_pixel;
        let texel = &self.pixel_data[index..index + self.bytes_per_pixel];
        let a = if self.bytes_per_pixel == 4 { texel[3] } else { 255 };
        return Color::with_alpha(texel[2], texel[1], texel[0], a);
    }
}

/// Reverses the order of rows of a flat pixel buffer.
fn flip_rows(pixel_data: &[u8], row_size: usize) -> Vec<u8> {
    if row_size == 0 {
        return pixel_data.to_vec();
    }
    return pixel_data.chunks(row_size).rev().flatten().copied().collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLUE, GREEN, RED, WHITE};
    use image::Rgba;

    /// 2x2 TGA with rows given top to bottom, stored in the requested order.
    fn tga_bytes(bits_per_pixel: u8, top_down: bool, id: &[u8], rows: [[Color; 2]; 2]) -> Vec<u8> {
        let mut header = TgaHeader::truecolor(2, 2, top_down);
        header.bits_per_pixel = bits_per_pixel;
        header.id_length = id.len() as u8;
        let mut bytes = header.to_bytes().to_vec();
        bytes.extend_from_slice(id);
        let stored: Vec<[Color; 2]> = if top_down { rows.to_vec() } else { rows.iter().rev().copied().collect() };
        for row in stored {
            for c in row {
                bytes.extend_from_slice(&c.to_bgr());
                if bits_per_pixel == 32 {
                    bytes.push(c.a);
                }
            }
        }
        return bytes;
    }

    const ROWS: [[Color; 2]; 2] = [[RED, GREEN], [BLUE, WHITE]];

    #[test]
    fn decodes_top_down_24_bit() {
        let texture = Texture::decode_tga(&tga_bytes(24, true, &[], ROWS)[..]).unwrap();
        assert_eq!((texture.width(), texture.height(), texture.bytes_per_pixel()), (2, 2, 3));
        assert_eq!(texture.sample(0.0, 0.0), RED);
        assert_eq!(texture.sample(1.0, 0.0), GREEN);
        assert_eq!(texture.sample(0.0, 1.0), BLUE);
        assert_eq!(texture.sample(1.0, 1.0), WHITE);
    }

    #[test]
    fn bottom_up_images_are_flipped() {
        let texture = Texture::decode_tga(&tga_bytes(24, false, &[], ROWS)[..]).unwrap();
        assert_eq!(texture.sample(0.0, 0.0), RED);
        assert_eq!(texture.sample(1.0, 1.0), WHITE);
    }

    #[test]
    fn image_id_is_skipped_and_alpha_kept() {
        let rows = [[Color::with_alpha(1, 2, 3, 4), GREEN], [BLUE, WHITE]];
        let texture = Texture::decode_tga(&tga_bytes(32, true, b"hello", rows)[..]).unwrap();
        assert_eq!(texture.bytes_per_pixel(), 4);
        assert_eq!(texture.sample(0.0, 0.0), Color::with_alpha(1, 2, 3, 4));
    }

    #[test]
    fn unsupported_images_are_rejected() {
        let mut rle = tga_bytes(24, true, &[], ROWS);
        rle[2] = 10;
        assert!(matches!(
            Texture::decode_tga(&rle[..]),
            Err(RenderError::UnsupportedTga { image_type: 10, bits_per_pixel: 24 })
        ));
        let mut sixteen_bit = tga_bytes(24, true, &[], ROWS);
        sixteen_bit[16] = 16;
        assert!(matches!(Texture::decode_tga(&sixteen_bit[..]), Err(RenderError::UnsupportedTga { .. })));
    }

    #[test]
    fn bottom_up_32_bit_images_are_flipped() {
        let rows = [[Color::with_alpha(1, 2, 3, 4), GREEN], [BLUE, Color::with_alpha(9, 8, 7, 6)]];
        let texture = Texture::decode_tga(&tga_bytes(32, false, &[], rows)[..]).unwrap();
        assert_eq!(texture.bytes_per_pixel(), 4);
        assert_eq!(texture.sample(0.0, 0.0), Color::with_alpha(1, 2, 3, 4));
        assert_eq!(texture.sample(1.0, 0.0), GREEN);
        assert_eq!(texture.sample(0.0, 1.0), BLUE);
        assert_eq!(texture.sample(1.0, 1.0), Color::with_alpha(9, 8, 7, 6));
    }

    #[test]
    fn huge_header_with_no_pixels_is_an_error() {
        let mut header = TgaHeader::truecolor(u16::MAX, u16::MAX, true);
        header.bits_per_pixel = 32;
        let result = Texture::decode_tga(&header.to_bytes()[..]);
        assert!(matches!(result, Err(RenderError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn truncated_pixel_data_is_an_error() {
        let bytes = tga_bytes(24, true, &[], ROWS);
        assert!(matches!(Texture::decode_tga(&bytes[..bytes.len() - 1]), Err(RenderError::Io(_))));
    }

    #[test]
    fn sampling_clamps_and_truncates() {
        let texture = Texture::decode_tga(&tga_bytes(24, true, &[], ROWS)[..]).unwrap();
        assert_eq!(texture.sample(-3.0, -0.5), RED);
        assert_eq!(texture.sample(7.0, 0.2), GREEN);
        // 0.99 * (2 - 1) truncates to texel 0.
        assert_eq!(texture.sample(0.99, 0.99), RED);
    }

    #[test]
    fn empty_texture_samples_black() {
        let texture = Texture::default();
        assert!(texture.is_empty());
        assert_eq!(texture.sample(0.5, 0.5), BLACK);
    }

    #[test]
    fn rgba_images_keep_their_orientation() {
        let image = RgbaImage::from_fn(2, 2, |x, y| Rgba([x as u8 * 100, y as u8 * 100, 7, 200]));
        let texture = Texture::from_rgba_image(&image);
        assert_eq!(texture.sample(1.0, 0.0), Color::with_alpha(100, 0, 7, 200));
        assert_eq!(texture.sample(0.0, 1.0), Color::with_alpha(0, 100, 7, 200));
    }

    #[test]
    fn solid_texture() {
        let texture = Texture::from_color(GREEN);
        assert_eq!(texture.sample(0.3, 0.9), GREEN);
    }
}
