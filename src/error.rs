//! Error types shared by the rasterizer, the texture codec and the mesh loader.
//!
//! Out of bounds pixel writes and degenerate triangles are not errors, they are
//! silently skipped by the rasterizer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    /// A file couldn't be opened, read or written.
    #[error("IO error on {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Stream level IO error, no file path attached.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Only uncompressed truecolor TGA images at 24 or 32 bits per pixel are supported.
    #[error("Unsupported TGA image: type {image_type}, {bits_per_pixel} bits per pixel")]
    UnsupportedTga { image_type: u8, bits_per_pixel: u8 },

    /// TGA stores width and height as 16-bit fields.
    #[error("Image of {width}x{height} doesn't fit into a TGA header")]
    ImageTooLarge { width: u32, height: u32 },

    #[error("OBJ parse error: {0}")]
    Obj(#[from] obj::ObjError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// A shader needs an attribute the mesh doesn't provide for some face vertex.
    #[error("Face {face} vertex {slot} has no {attribute} index")]
    MissingAttribute {
        face: usize,
        slot: usize,
        attribute: &'static str,
    },

    #[error("Face {face} vertex {slot} references {attribute} {index}, but the mesh has {len}")]
    IndexOutOfBounds {
        face: usize,
        slot: usize,
        attribute: &'static str,
        index: usize,
        len: usize,
    },
}

impl RenderError {
    /// Attaches a path to an IO error.
    pub fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        return RenderError::File { path: path.into(), source };
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
