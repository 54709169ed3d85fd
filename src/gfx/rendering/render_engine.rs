//! WGPU-based renderer for the room, its furniture and the transform gizmo
//!
//! Draws everything with one flat-shaded pipeline, then an overlay pipeline
//! for the gizmo handles so they stay visible through the selected item, and
//! finally hands the frame to the UI callback.

use std::sync::Arc;

use cgmath::Matrix4;
use thiserror::Error;
use wgpu::TextureFormat;

use crate::{
    color::Color,
    config::RenderingConfig,
    gfx::{
        camera::CameraUniform,
        geometry::generate_cube,
        gizmos::{GizmoHandle, TransformGizmo},
        resources::{
            create_global_ubo, update_global_ubo, DepthBuffer, GlobalBindings, GlobalUBO,
            LightConfig,
        },
        scene::{
            item::{ItemGpuResources, ItemUniform},
            DrawModel, Model, Room, Scene, Vertex3D,
        },
    },
};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable graphics adapter: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Floor and walls with their own uniforms, rebuilt when the room changes
struct RoomShell {
    room: Room,
    floor: Model,
    walls: Model,
    floor_gpu: ItemGpuResources,
    walls_gpu: ItemGpuResources,
}

impl RoomShell {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, room: Room) -> Self {
        let mut floor = Model::from_geometry(&room.floor_geometry());
        let mut walls = Model::from_geometry(&room.wall_geometry());
        floor.init_gpu_resources(device);
        walls.init_gpu_resources(device);

        let identity = Matrix4::from_scale(1.0);
        let floor_gpu = ItemGpuResources::new(
            device,
            layout,
            ItemUniform::new(identity, room.floor_color.to_rgba_f32()),
        );
        let walls_gpu = ItemGpuResources::new(
            device,
            layout,
            ItemUniform::new(identity, room.wall_color.to_rgba_f32()),
        );

        Self {
            room,
            floor,
            walls,
            floor_gpu,
            walls_gpu,
        }
    }
}

/// One unit cube drawn four times, scaled onto each handle's box
struct GizmoMeshes {
    cube: Model,
    handles: Vec<(GizmoHandle, ItemGpuResources)>,
}

impl GizmoMeshes {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        let mut cube = Model::from_geometry(&generate_cube());
        cube.init_gpu_resources(device);

        let handles = GizmoHandle::ALL
            .into_iter()
            .map(|handle| {
                let uniform =
                    ItemUniform::new(Matrix4::from_scale(0.0), handle.color().to_rgba_f32());
                (handle, ItemGpuResources::new(device, layout, uniform))
            })
            .collect();

        Self { cube, handles }
    }
}

/// Lighter version of a handle color, used while that handle is dragged
fn highlight(color: Color) -> Color {
    let [r, g, b] = color.to_rgb_f32();
    Color::from_rgb_f32([
        r + (1.0 - r) * 0.5,
        g + (1.0 - g) * 0.5,
        b + (1.0 - b) * 0.5,
    ])
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    format: TextureFormat,
    depth_compare: wgpu::CompareFunction,
    depth_write_enabled: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex3D::desc()],
            compilation_options: Default::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Walls and loaded models are viewed from both sides
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
            unclipped_depth: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DepthBuffer::FORMAT,
            depth_write_enabled,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        multiview: None,
        cache: None,
    })
}

pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_buffer: DepthBuffer,
    format: TextureFormat,

    scene_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,
    item_layout: wgpu::BindGroupLayout,

    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    light: LightConfig,
    clear_color: wgpu::Color,

    room_shell: RoomShell,
    gizmo_meshes: GizmoMeshes,
}

impl RenderEngine {
    /// Creates the device, surface and pipelines for `window`.
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` / `height` - Initial surface size in pixels
    /// * `vsync` - Fifo presentation when true, Immediate otherwise
    /// * `room` - Room whose shell is drawn until the scene says otherwise
    /// * `rendering` - Clear color and lighting
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
        room: Room,
        rendering: &RenderingConfig,
    ) -> Result<RenderEngine, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(RenderError::NoSurfaceFormat)?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: if vsync {
                wgpu::PresentMode::Fifo
            } else {
                wgpu::PresentMode::Immediate
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_buffer = DepthBuffer::new(&device, config.width, config.height);

        let light = LightConfig::from(rendering);
        let global_ubo = create_global_ubo(&device, light);
        let mut global_bindings = GlobalBindings::new(&device);
        global_bindings.create_bind_group(&device, &global_ubo);

        let item_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("BindGroupLayout: Item"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[global_bindings.bind_group_layout(), &item_layout],
            push_constant_ranges: &[],
        });

        let scene_pipeline = create_pipeline(
            &device,
            "Scene Pipeline",
            &shader,
            &pipeline_layout,
            format,
            wgpu::CompareFunction::Less,
            true,
        );
        let overlay_pipeline = create_pipeline(
            &device,
            "Gizmo Overlay Pipeline",
            &shader,
            &pipeline_layout,
            format,
            wgpu::CompareFunction::Always,
            false,
        );

        let room_shell = RoomShell::new(&device, &item_layout, room);
        let gizmo_meshes = GizmoMeshes::new(&device, &item_layout);

        let [r, g, b] = rendering.background_color.to_rgb_f32();

        Ok(RenderEngine {
            surface,
            device: device.into(),
            queue: queue.into(),
            config,
            depth_buffer,
            format,
            scene_pipeline,
            overlay_pipeline,
            item_layout,
            global_ubo,
            global_bindings,
            light,
            clear_color: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            },
            room_shell,
            gizmo_meshes,
        })
    }

    /// Uploads anything the scene gained since the last frame and syncs
    /// every item's transform and color
    pub fn prepare(&mut self, scene: &mut Scene) {
        if scene.room != self.room_shell.room {
            log::debug!(
                "Rebuilding room shell for {} x {} x {}",
                scene.room.width,
                scene.room.depth,
                scene.room.height
            );
            self.room_shell = RoomShell::new(&self.device, &self.item_layout, scene.room);
        }

        scene.init_gpu_resources(&self.device, &self.item_layout);
        scene.update_all_uniforms(&self.queue);
    }

    /// Writes the handle boxes for the gizmo's item; returns false when no
    /// handles should be drawn
    fn update_gizmo(&self, scene: &Scene, gizmo: &TransformGizmo) -> bool {
        let Some(item) = gizmo.attached().and_then(|id| scene.get(id)) else {
            return false;
        };

        let shapes = TransformGizmo::handle_shapes(&item.world_bounds());
        for (handle, resources) in &self.gizmo_meshes.handles {
            let Some(shape) = shapes.iter().find(|shape| shape.handle == *handle) else {
                continue;
            };
            let size = shape.bounds.size();
            let matrix = Matrix4::from_translation(shape.bounds.center())
                * Matrix4::from_nonuniform_scale(size.x, size.y, size.z);
            let color = if gizmo.active_handle() == Some(*handle) {
                highlight(handle.color())
            } else {
                handle.color()
            };
            resources.write(&self.queue, ItemUniform::new(matrix, color.to_rgba_f32()));
        }
        true
    }

    /// Renders the room, the scene's items and the gizmo, then runs
    /// `ui_callback` on the same encoder and presents.
    ///
    /// Call [`Self::prepare`] first so new items have GPU resources.
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render_frame<F>(
        &mut self,
        scene: &Scene,
        gizmo: &TransformGizmo,
        ui_callback: F,
    ) -> Result<(), RenderError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let draw_gizmo = self.update_gizmo(scene, gizmo);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth_buffer.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(globals) = self.global_bindings.bind_group() {
                render_pass.set_bind_group(0, globals, &[]);
            }
            render_pass.set_pipeline(&self.scene_pipeline);

            let shell = &self.room_shell;
            render_pass.set_bind_group(1, &shell.floor_gpu.bind_group, &[]);
            render_pass.draw_model(&shell.floor);
            render_pass.set_bind_group(1, &shell.walls_gpu.bind_group, &[]);
            render_pass.draw_model(&shell.walls);

            for item in scene.items() {
                let Some(bind_group) = item.bind_group() else {
                    continue;
                };
                render_pass.set_bind_group(1, bind_group, &[]);
                render_pass.draw_model(&item.model);
            }

            if draw_gizmo {
                render_pass.set_pipeline(&self.overlay_pipeline);
                for (_, resources) in &self.gizmo_meshes.handles {
                    render_pass.set_bind_group(1, &resources.bind_group, &[]);
                    render_pass.draw_model(&self.gizmo_meshes.cube);
                }
            }
        }

        ui_callback(&self.device, &self.queue, &mut encoder, &surface_texture_view);

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    pub fn update(&mut self, camera_uniform: CameraUniform) {
        update_global_ubo(&mut self.global_ubo, &self.queue, camera_uniform, self.light);
    }

    /// Reconfigures the surface and recreates the depth buffer; zero sizes
    /// (minimized windows) are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_buffer.resize(&self.device, width, height);
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_moves_toward_white() {
        assert_eq!(highlight(Color::rgb(0, 0, 0xFF)), Color::rgb(0x80, 0x80, 0xFF));
        assert_eq!(highlight(Color::WHITE), Color::WHITE);
    }

    #[test]
    fn unit_cube_scales_onto_handle_bounds() {
        use crate::gfx::picking::AABB;
        use cgmath::Vector3;

        let bounds = AABB::new(Vector3::new(1.0, 0.0, -1.0), Vector3::new(3.0, 1.0, 1.0));
        let size = bounds.size();
        let matrix = Matrix4::from_translation(bounds.center())
            * Matrix4::from_nonuniform_scale(size.x, size.y, size.z);
        let corner = matrix * cgmath::Vector4::new(0.5, 0.5, 0.5, 1.0);
        assert_eq!(corner.truncate(), bounds.max);
    }
}
