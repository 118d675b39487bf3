mod app;

use std::path::PathBuf;

use clap::Parser;
use nalgebra::{vector, Vector3};

use app::ShaderKind;
use soft_raster::DepthSource;

/// Parses "x,y,z" into a vector.
fn parse_vector(s: &str) -> Result<Vector3<f32>, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f32>().map_err(|e| format!("'{}': {}", v, e)))
        .collect::<Result<Vec<f32>, String>>()?;
    return match values[..] {
        [x, y, z] => Ok(vector![x, y, z]),
        _ => Err(format!("expected x,y,z, got '{}'", s)),
    };
}

#[derive(Parser, Debug)]
#[command(name = "soft_raster", about = "Renders a wavefront obj mesh into a TGA image")]
struct Cli {
    /// Mesh to render.
    #[arg(short = 'p', long = "mesh", default_value = "assets/model.obj")]
    mesh: PathBuf,
    /// Diffuse texture, TGA or anything the image crate reads.
    #[arg(short, long)]
    texture: Option<PathBuf>,
    #[arg(short, long, default_value = "output.tga")]
    output: PathBuf,
    #[arg(long, default_value_t = 800)]
    width: u32,
    #[arg(long, default_value_t = 800)]
    height: u32,
    /// Store the TGA with the top-down flag set.
    #[arg(long)]
    v_flip: bool,
    /// Also save the frame as PNG.
    #[arg(long)]
    png: Option<PathBuf>,
    /// Save the depth buffer as a grayscale PNG.
    #[arg(long)]
    depth_map: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = ShaderKind::Phong)]
    shader: ShaderKind,
    /// Draw face edges on top.
    #[arg(long)]
    wireframe: bool,
    /// Skip faces turned away from the camera.
    #[arg(long)]
    cull: bool,
    /// Depth test against clip space w instead of screen z.
    #[arg(long)]
    depth_from_w: bool,
    #[arg(long, value_parser = parse_vector, default_value = "1,1,3", allow_hyphen_values = true)]
    eye: Vector3<f32>,
    #[arg(long, value_parser = parse_vector, default_value = "0,0,0", allow_hyphen_values = true)]
    center: Vector3<f32>,
    #[arg(long, value_parser = parse_vector, default_value = "0,1,0", allow_hyphen_values = true)]
    up: Vector3<f32>,
    /// Point light position in world space.
    #[arg(long, value_parser = parse_vector, default_value = "2,2,3", allow_hyphen_values = true)]
    light: Vector3<f32>,
    /// Vertical field of view, degrees.
    #[arg(long, default_value_t = 60.0)]
    fov: f32,
    #[arg(long, default_value_t = 0.1)]
    near: f32,
    #[arg(long, default_value_t = 100.0)]
    far: f32,
    /// Model rotation around the y axis, degrees.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    rotation: f32,
    /// Discard fragments with texture alpha below this value.
    #[arg(long)]
    alpha_cutoff: Option<u8>,
    /// Keep showing the spinning model in a window after saving.
    #[arg(long)]
    preview: bool,
    #[arg(long)]
    print_fps: bool,
}

impl Cli {
    fn into_params(self) -> app::Params {
        return app::Params {
            width: self.width,
            height: self.height,
            mesh_path: self.mesh,
            texture_path: self.texture,
            output_path: self.output,
            v_flip: self.v_flip,
            png_path: self.png,
            depth_path: self.depth_map,
            shader: self.shader,
            wireframe: self.wireframe,
            cull_back_faces: self.cull,
            depth_source: if self.depth_from_w { DepthSource::ClipW } else { DepthSource::ScreenZ },
            camera: app::Camera {
                eye: self.eye,
                center: self.center,
                up: self.up,
                fov_y_degrees: self.fov,
                near: self.near,
                far: self.far,
            },
            light_position: self.light,
            model_rotation_degrees: self.rotation,
            alpha_cutoff: self.alpha_cutoff,
            preview: self.preview,
            print_fps: self.print_fps,
        };
    }
}

#[show_image::main]
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let params = Cli::parse().into_params();
    if let Err(error) = app::run(params) {
        log::error!("{:#}", error);
        return Err(error);
    }

    return Ok(());
}
