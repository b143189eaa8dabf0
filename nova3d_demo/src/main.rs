//! Nova3D demo: a spinning textured cube
//!
//! Renders a cube with the Vulkan backend. By default the mesh and texture
//! are generated procedurally; pass an OBJ and a BMP path to render your own
//! asset instead:
//!
//! ```text
//! nova3d_demo [model.obj texture.bmp]
//! ```
//!
//! Shaders must be compiled first; see `shaders/compile.sh`.

use glam::{Quat, Vec2, Vec3};
use nova_3d_engine::nova3d::render::{
    MeshHandle, RenderInstance, RenderList, Renderer, RendererConfig,
};
use nova_3d_engine::nova3d::resource::{MeshData, MeshVertex, TextureImage};
use nova_3d_engine_renderer_vulkan::{RendererAssets, VulkanRenderer};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

fn shader_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("shaders")
        .join(name)
}

/// A unit cube with per-face UVs covering the whole texture
fn cube_mesh() -> MeshData {
    // One quad per face, +X -X +Y -Y +Z -Z
    let faces: [[Vec3; 4]; 6] = [
        [
            Vec3::new(0.5, -0.5, -0.5),
            Vec3::new(0.5, -0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(0.5, 0.5, -0.5),
        ],
        [
            Vec3::new(-0.5, -0.5, 0.5),
            Vec3::new(-0.5, -0.5, -0.5),
            Vec3::new(-0.5, 0.5, -0.5),
            Vec3::new(-0.5, 0.5, 0.5),
        ],
        [
            Vec3::new(-0.5, 0.5, -0.5),
            Vec3::new(0.5, 0.5, -0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(-0.5, 0.5, 0.5),
        ],
        [
            Vec3::new(-0.5, -0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
            Vec3::new(0.5, -0.5, -0.5),
            Vec3::new(-0.5, -0.5, -0.5),
        ],
        [
            Vec3::new(-0.5, -0.5, 0.5),
            Vec3::new(-0.5, 0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
        ],
        [
            Vec3::new(0.5, -0.5, -0.5),
            Vec3::new(0.5, 0.5, -0.5),
            Vec3::new(-0.5, 0.5, -0.5),
            Vec3::new(-0.5, -0.5, -0.5),
        ],
    ];
    let uvs = [
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 0.0),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for face in &faces {
        let base = vertices.len() as u32;
        for (corner, &uv) in face.iter().zip(&uvs) {
            vertices.push(MeshVertex {
                position: *corner,
                texture_uv: uv,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    MeshData { vertices, indices }
}

/// An 8x8 two-tone checkerboard
fn checkerboard_texture() -> TextureImage {
    const SIZE: u32 = 8;
    let mut pixels = Vec::with_capacity((SIZE * SIZE * 4) as usize);
    for y in 0..SIZE {
        for x in 0..SIZE {
            if (x + y) % 2 == 0 {
                pixels.extend_from_slice(&[230, 230, 230, 255]);
            } else {
                pixels.extend_from_slice(&[40, 90, 160, 255]);
            }
        }
    }
    TextureImage::from_rgba8(SIZE, SIZE, pixels).expect("checkerboard dimensions are valid")
}

fn load_assets(args: &[String]) -> (MeshData, TextureImage) {
    match args {
        [obj_path, bmp_path] => {
            let mesh = MeshData::load_obj(Path::new(obj_path)).unwrap_or_else(|e| {
                eprintln!("Failed to load {}: {}", obj_path, e);
                std::process::exit(1);
            });
            let texture = TextureImage::load_bmp(Path::new(bmp_path)).unwrap_or_else(|e| {
                eprintln!("Failed to load {}: {}", bmp_path, e);
                std::process::exit(1);
            });
            (mesh, texture)
        }
        [] => (cube_mesh(), checkerboard_texture()),
        _ => {
            eprintln!("Usage: nova3d_demo [model.obj texture.bmp]");
            std::process::exit(1);
        }
    }
}

struct DemoApp {
    mesh: MeshData,
    texture: TextureImage,
    window: Option<Window>,
    renderer: Option<VulkanRenderer>,
    render_list: RenderList,
    start: Instant,
}

impl DemoApp {
    fn new(mesh: MeshData, texture: TextureImage) -> Self {
        let mut render_list = RenderList::new();
        render_list.clear_color = Vec3::new(0.05, 0.05, 0.08);
        render_list.camera_position = Vec3::new(0.0, 1.2, 2.5);
        render_list.camera_target = Vec3::ZERO;
        Self {
            mesh,
            texture,
            window: None,
            renderer: None,
            render_list,
            start: Instant::now(),
        }
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title("Nova3D Demo")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => window,
            Err(e) => {
                eprintln!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let meshes = [self.mesh.clone()];
        let assets = RendererAssets {
            meshes: &meshes,
            texture: &self.texture,
            vertex_shader: &shader_path("world.vert.spv"),
            fragment_shader: &shader_path("world.frag.spv"),
        };
        let size = window.inner_size();
        let renderer = VulkanRenderer::new(
            &RendererConfig {
                app_name: "Nova3D Demo".to_string(),
                ..RendererConfig::default()
            },
            window.display_handle().unwrap().as_raw(),
            window.window_handle().unwrap().as_raw(),
            size.width,
            size.height,
            &assets,
        );
        match renderer {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                self.window = Some(window);
            }
            Err(e) => {
                eprintln!("Failed to create renderer: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.surface_resized(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(renderer) = &mut self.renderer else {
                    return;
                };

                let angle = self.start.elapsed().as_secs_f32() * 0.8;
                self.render_list.clear();
                self.render_list
                    .push(RenderInstance {
                        position: Vec3::ZERO,
                        orientation: Quat::from_rotation_y(angle)
                            * Quat::from_rotation_x(angle * 0.4),
                        mesh: MeshHandle::new(0),
                    })
                    .expect("one instance always fits");

                if let Err(e) = renderer.render(&self.render_list) {
                    eprintln!("Render failed: {}", e);
                    event_loop.exit();
                    return;
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (mesh, texture) = load_assets(&args);

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            eprintln!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DemoApp::new(mesh, texture);
    if let Err(e) = event_loop.run_app(&mut app) {
        eprintln!("Event loop error: {}", e);
        std::process::exit(1);
    }
}
