use std::io::{self, Read};

/// Size of the fixed part of a TGA header in bytes.
pub const HEADER_SIZE: usize = 18;
/// Image type of an uncompressed truecolor image.
pub const UNCOMPRESSED_TRUECOLOR: u8 = 2;
/// Descriptor bit, telling that the first stored row is the top one.
pub const TOP_DOWN: u8 = 0x20;

/// TGA file header. Multi-byte fields are little-endian on disk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TgaHeader {
    pub id_length: u8,
    pub color_map_type: u8,
    pub image_type: u8,
    pub color_map_spec: [u8; 5],
    pub x_origin: u16,
    pub y_origin: u16,
    pub width: u16,
    pub height: u16,
    pub bits_per_pixel: u8,
    pub descriptor: u8,
}

impl TgaHeader {
    /// Header of an uncompressed 24-bit image, as written by the frame buffer.
    pub fn truecolor(width: u16, height: u16, top_down: bool) -> Self {
        return TgaHeader {
            image_type: UNCOMPRESSED_TRUECOLOR,
            width,
            height,
            bits_per_pixel: 24,
            descriptor: if top_down { TOP_DOWN } else { 0 },
            ..Default::default()
        };
    }

    pub fn is_top_down(&self) -> bool {
        return self.descriptor & TOP_DOWN != 0;
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0] = self.id_length;
        bytes[1] = self.color_map_type;
        bytes[2] = self.image_type;
        bytes[3..8].copy_from_slice(&self.color_map_spec);
        bytes[8..10].copy_from_slice(&self.x_origin.to_le_bytes());
        bytes[10..12].copy_from_slice(&self.y_origin.to_le_bytes());
        bytes[12..14].copy_from_slice(&self.width.to_le_bytes());
        bytes[14..16].copy_from_slice(&self.height.to_le_bytes());
        bytes[16] = self.bits_per_pixel;
        bytes[17] = self.descriptor;
        return bytes;
    }

    pub fn from_bytes(bytes: &[u8; HEADER_SIZE]) -> Self {
        let le_u16 = |at: usize| u16::from_le_bytes([bytes[at], bytes[at + 1]]);
        let mut color_map_spec = [0u8; 5];
        color_map_spec.copy_from_slice(&bytes[3..8]);
        return TgaHeader {
            id_length: bytes[0],
            color_map_type: bytes[1],
            image_type: bytes[2],
            color_map_spec,
            x_origin: le_u16(8),
            y_origin: le_u16(10),
            width: le_u16(12),
            height: le_u16(14),
            bits_per_pixel: bytes[16],
            descriptor: bytes[17],
        };
    }

    pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut bytes = [0u8; HEADER_SIZE];
        reader.read_exact(&mut bytes)?;
        return Ok(TgaHeader::from_bytes(&bytes));
    }
}
