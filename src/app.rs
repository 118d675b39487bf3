use std::path::PathBuf;
use std::sync::mpsc::TryRecvError;
use std::time;

use log::info;
use nalgebra::Vector3;
use show_image::{create_window, event, ImageInfo, ImageView, WindowOptions};

use soft_raster::color::{GREEN, WHITE};
use soft_raster::scene::model::Mesh;
use soft_raster::scene::pipeline::{draw_mesh, draw_wireframe, RenderSettings, RenderStats};
use soft_raster::scene::shader::{PhongShader, PhongUniforms, Shader, UnlitShader};
use soft_raster::scene::texture::Texture;
use soft_raster::scene::{DepthSource, Framebuffer};
use soft_raster::util::{look_at, perspective, rotation_y};

/// Shader used for the whole mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ShaderKind {
    /// Textured Blinn-Phong.
    Phong,
    /// Flat white.
    Unlit,
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Vector3<f32>,
    pub center: Vector3<f32>,
    pub up: Vector3<f32>,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

/// Struct, defining execution context.
#[derive(Debug, Clone)]
pub struct Params {
    pub width: u32,
    pub height: u32,
    pub mesh_path: PathBuf,
    pub texture_path: Option<PathBuf>, // Plain white when missing.
    pub output_path: PathBuf,
    pub v_flip: bool,
    pub png_path: Option<PathBuf>,
    pub depth_path: Option<PathBuf>,
    pub shader: ShaderKind,
    pub wireframe: bool,
    pub cull_back_faces: bool,
    pub depth_source: DepthSource,
    pub camera: Camera,
    pub light_position: Vector3<f32>,
    pub model_rotation_degrees: f32,
    pub alpha_cutoff: Option<u8>,
    pub preview: bool,
    pub print_fps: bool,
}

/// Clears the frame and draws the mesh, turned around the y axis by `angle` radians.
pub fn render_frame(
    frame: &mut Framebuffer,
    mesh: &Mesh,
    texture: &Texture,
    params: &Params,
    angle: f32,
) -> soft_raster::Result<RenderStats> {
    let camera = &params.camera;
    let model_matrix = rotation_y(angle);
    let view_matrix = look_at(camera.eye, camera.center, camera.up);
    let aspect_ratio = frame.width() as f32 / frame.height() as f32;
    let projection_matrix = perspective(camera.fov_y_degrees.to_radians(), aspect_ratio, camera.near, camera.far);
    let mvp_matrix = projection_matrix * view_matrix * model_matrix;

    let mut shader: Box<dyn Shader + '_> = match params.shader {
        ShaderKind::Phong => Box::new(PhongShader::new(
            mesh,
            texture,
            PhongUniforms {
                model_matrix,
                mvp_matrix,
                light_position: params.light_position,
                camera_position: camera.eye,
                alpha_cutoff: params.alpha_cutoff,
            },
        )?),
        ShaderKind::Unlit => Box::new(UnlitShader::new(mesh, mvp_matrix, WHITE)),
    };

    frame.clear_buffers();
    let settings = RenderSettings { cull_back_faces: params.cull_back_faces };
    let stats = draw_mesh(frame, mesh, shader.as_mut(), settings);
    if params.wireframe {
        draw_wireframe(frame, mesh, mvp_matrix, GREEN);
    }
    return Ok(stats);
}

/// Helper, defining exit event to be an Escape key press.
fn is_exit_event(window_event: event::WindowEvent) -> bool {
    if let event::WindowEvent::KeyboardInput(event) = window_event {
        if event.input.key_code == Some(event::VirtualKeyCode::Escape) && event.input.state.is_released() {
            return true;
        }
    }
    return false;
}

/// Loads assets, renders a single frame and saves it. With preview on, a window then keeps
/// showing the model spinning until Escape is pressed or the window is closed.
pub fn run(params: Params) -> anyhow::Result<()> {
    let mesh = Mesh::load_obj(&params.mesh_path)?;
    let texture = match &params.texture_path {
        Some(path) => Texture::load(path)?,
        None => Texture::from_color(WHITE),
    };

    let mut frame = Framebuffer::new(params.width, params.height).with_depth_source(params.depth_source);
    let stats = render_frame(&mut frame, &mesh, &texture, &params, params.model_rotation_degrees.to_radians())?;
    info!("Rendered {} faces, {} culled, {} fragments written", stats.faces, stats.culled, stats.fragments);

    frame.write_image(&params.output_path, params.v_flip)?;
    info!("Image saved to {}", params.output_path.display());
    if let Some(path) = &params.png_path {
        frame.save_png(path)?;
        info!("Image saved to {}", path.display());
    }
    if let Some(path) = &params.depth_path {
        frame.save_depth_png(path)?;
        info!("Depth map saved to {}", path.display());
    }

    if params.preview {
        preview(&mut frame, &mesh, &texture, &params)?;
    }
    return Ok(());
}

/// Launches the window, showing rendered frames.
fn preview(frame: &mut Framebuffer, mesh: &Mesh, texture: &Texture, params: &Params) -> anyhow::Result<()> {
    let window_options = WindowOptions {
        size: Some([params.width, params.height]),
        ..Default::default()
    };
    let window = create_window("soft_raster", window_options)?;
    let event_channel = window.event_channel()?;

    let mut exit = false;
    let time_begin = time::Instant::now();
    let mut frame_counter_time_begin = time::Instant::now();
    let mut frame_counter: u32 = 0;
    while !exit {
        let passed_time = time::Instant::now().duration_since(time_begin).as_secs_f32();
        render_frame(frame, mesh, texture, params, params.model_rotation_degrees.to_radians() + passed_time)?;

        let pixel_data = frame.to_rgb8();
        let image_data = ImageView::new(ImageInfo::rgb8(frame.width(), frame.height()), &pixel_data);
        window.set_image("frame", image_data)?;

        // Unloading all the garbage from event channel, that has piled up, looking for exit event.
        loop {
            match event_channel.try_recv() {
                Ok(window_event) => exit |= is_exit_event(window_event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // Window is gone.
                    exit = true;
                    break;
                }
            }
        }

        if params.print_fps {
            // Counting frames to printout stats every second.
            frame_counter += 1;
            if time::Instant::now().duration_since(frame_counter_time_begin).as_secs_f32() > 1.0 {
                info!("FPS --- {}", frame_counter);
                frame_counter_time_begin = time::Instant::now();
                frame_counter = 0;
            }
        }
    }
    return Ok(());
}
