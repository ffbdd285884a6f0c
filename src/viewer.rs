/*
MIT License

Copyright (c) 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! The scenario itself: builds the roadside scene at startup, then spends
//! every frame moving the car, steering the light rig and running the debug
//! panel. Missing assets degrade to placeholders, never to a crash.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use cgmath::{Deg, Matrix3, Matrix4, Point3, SquareMatrix, Vector3};
use log::{info, warn};
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window};

use crate::assets::{self, ModelData};
use crate::cameras::{Camera, CameraView, FlyCamera, PerspectiveCameraConfig};
use crate::draw_context::{
    BindingSlot, DrawContext, DrawModeParams, DrawableBuilder, IndexData, Uniform,
};
use crate::drive::DrivePath;
use crate::layout::{self, ModelKind};
use crate::lights::{self, LightRig, RawLightRig, SPOT_FLASHLIGHT, SPOT_HEADLIGHTS};
#[cfg(feature = "egui")]
use crate::plugins::egui::EguiPlugin;
use crate::plugins::PluginRegistry;
use crate::plugins::scene_3d::{Scene3D, Scene3DUniforms, SceneElements};
use crate::primitives::shapes;
use crate::primitives::{
    Object3D, Object3DInstanceGroup, Object3DInstanceGroupHandlers, Object3DUniforms, Shareable,
};
use crate::render_loop::{LaunchContext, RenderLoopHandler, TimeInfo};
use crate::state::{STATE_FILE, ViewerState};
use crate::textures::{GpuTexture, TextureSampler};
use crate::vegetation::{self, GRASS_SCALE};

const SCENE_SHADER: &str = include_str!("shaders/scene.wgsl");
const GROUND_SHADER: &str = include_str!("shaders/ground.wgsl");
const UNLIT_SHADER: &str = include_str!("shaders/unlit.wgsl");
const BILLBOARD_SHADER: &str = include_str!("shaders/billboard.wgsl");
const SKYBOX_SHADER: &str = include_str!("shaders/skybox.wgsl");

const GROUND_TEXTURE: &str = "resources/textures/ground.jpg";
const CARDBOARD_TEXTURE: &str = "resources/textures/cardboard.jpg";
const GRASS_TEXTURE: &str = "resources/textures/grass.png";
const SKYBOX_DIR: &str = "resources/textures/skybox";

pub struct ViewerScenario {
    state: ViewerState,
    state_path: PathBuf,
    window: Option<Arc<Window>>,
    rig: LightRig,
    drive: DrivePath,
    lights_uniform: Uniform<RawLightRig>,
    time_uniform: Uniform<f32>,
    driving_car: Vec<Rc<RefCell<Object3D>>>,
    panel_toggle_requested: bool,
}

impl ViewerScenario {
    pub fn new(launch_context: LaunchContext) -> Self {
        let LaunchContext {
            draw_context,
            plugin_registry,
        } = launch_context;
        let state = ViewerState::load(STATE_FILE);

        let scene_shader = draw_context.create_shader_module(SCENE_SHADER);
        let ground_shader = draw_context.create_shader_module(GROUND_SHADER);
        let unlit_shader = draw_context.create_shader_module(UNLIT_SHADER);
        let billboard_shader = draw_context.create_shader_module(BILLBOARD_SHADER);
        let skybox_shader = draw_context.create_shader_module(SKYBOX_SHADER);

        let mut scene = Scene3D::new(draw_context);
        let time_uniform = Uniform::new(draw_context, 0.0_f32);
        let rig = lights::night_rig();
        let lights_uniform = Uniform::new(draw_context, rig.to_raw());
        let repeat_sampler = TextureSampler::repeating(draw_context);
        let clamp_sampler = TextureSampler::clamping(draw_context);

        // Draw order is insertion order: ground, models, box, then the
        // blended grass, and the skybox filling in whatever is left.
        scene.add(
            build_ground(
                draw_context,
                &ground_shader,
                scene.scene_uniforms(),
                &lights_uniform,
                &repeat_sampler,
            )
            .into_shareable(),
        );

        let mut texture_cache = TextureCache::new(draw_context);
        let mut models: HashMap<ModelKind, ModelData> = HashMap::new();
        for kind in ModelKind::ALL {
            match assets::load_model(kind.asset_path()) {
                Ok(model) => {
                    info!("Loaded model {}", kind.asset_path());
                    models.insert(kind, model);
                }
                Err(err) => {
                    warn!("Model failed to load at path {}: {err:#}", kind.asset_path());
                }
            }
        }
        for placement in layout::scene_placements() {
            let Some(model) = models.get(&placement.kind) else {
                continue;
            };
            for part in spawn_model_parts(
                draw_context,
                &scene_shader,
                scene.scene_uniforms(),
                &lights_uniform,
                &repeat_sampler,
                &mut texture_cache,
                model,
                placement.transform,
            ) {
                scene.add(part);
            }
        }

        let drive = DrivePath::default();
        let driving_car = match models.get(&ModelKind::DrivingCar) {
            Some(model) => {
                let parts = spawn_model_parts(
                    draw_context,
                    &scene_shader,
                    scene.scene_uniforms(),
                    &lights_uniform,
                    &repeat_sampler,
                    &mut texture_cache,
                    model,
                    drive.car_transform(drive.car_z(0.0)),
                );
                for part in &parts {
                    scene.add(part.clone());
                }
                parts
            }
            None => Vec::new(),
        };

        scene.add(
            build_cardboard_box(
                draw_context,
                &unlit_shader,
                scene.scene_uniforms(),
                &repeat_sampler,
            )
            .into_shareable(),
        );
        scene.add(
            build_grass(
                draw_context,
                &billboard_shader,
                scene.scene_uniforms(),
                &time_uniform,
                &clamp_sampler,
            )
            .into_shareable(),
        );
        scene.add(Rc::new(RefCell::new(build_skybox(
            draw_context,
            &skybox_shader,
            scene.scene_uniforms(),
            &clamp_sampler,
        ))));

        let mut view = CameraView::default();
        view.set_pose(Point3::from(state.eye), Vector3::from(state.forward));
        let camera = Camera::new(view, Box::new(PerspectiveCameraConfig::default()));
        let mut fly_camera = FlyCamera::new(camera);
        fly_camera.mouse_look_enabled = !state.panel_open;
        plugin_registry.register(SceneElements {
            camera: fly_camera,
            scene,
        });
        #[cfg(feature = "egui")]
        plugin_registry.register(EguiPlugin::new(draw_context));

        let viewer = Self {
            window: draw_context.window.clone(),
            state,
            state_path: PathBuf::from(STATE_FILE),
            rig,
            drive,
            lights_uniform,
            time_uniform,
            driving_car,
            panel_toggle_requested: false,
        };
        viewer.apply_clear_color(draw_context);
        viewer.apply_cursor_mode();
        viewer
    }

    fn apply_clear_color(&self, draw_context: &mut DrawContext) {
        let [r, g, b] = self.state.clear_color;
        draw_context.set_clear_color(Some(wgpu::Color {
            r: f64::from(r),
            g: f64::from(g),
            b: f64::from(b),
            a: 1.0,
        }));
    }

    /// Mouse is captured while flying; opening the panel releases it.
    fn apply_cursor_mode(&self) {
        let Some(window) = &self.window else {
            return;
        };
        if self.state.panel_open {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
        } else {
            if window.set_cursor_grab(CursorGrabMode::Confined).is_err() {
                let _ = window.set_cursor_grab(CursorGrabMode::Locked);
            }
            window.set_cursor_visible(false);
        }
    }

    #[cfg(feature = "egui")]
    fn run_panel(&mut self, plugin_registry: &mut PluginRegistry) {
        // Mirrored through locals: the registry cannot lend the camera and
        // the panel plugin at the same time.
        let panel_open = self.state.panel_open;
        let eye = self.state.eye;
        let forward = self.state.forward;
        let mut mouse_look = plugin_registry
            .get::<SceneElements>()
            .is_some_and(|elements| elements.camera.mouse_look_enabled);
        let mut clear_color = self.state.clear_color;

        let Some(egui_plugin) = plugin_registry.get_mut::<EguiPlugin>() else {
            return;
        };
        egui_plugin.draw(|egui_context| {
            if !panel_open {
                return;
            }
            egui::Window::new("Camera info").show(egui_context, |ui| {
                ui.label(format!(
                    "Position: ({:.2}, {:.2}, {:.2})",
                    eye[0], eye[1], eye[2]
                ));
                ui.label(format!(
                    "Front: ({:.2}, {:.2}, {:.2})",
                    forward[0], forward[1], forward[2]
                ));
                ui.checkbox(&mut mouse_look, "Mouse look");
                ui.horizontal(|ui| {
                    ui.label("Background");
                    ui.color_edit_button_rgb(&mut clear_color);
                });
            });
        });

        self.state.clear_color = clear_color;
        if let Some(elements) = plugin_registry.get_mut::<SceneElements>() {
            elements.camera.mouse_look_enabled = mouse_look;
        }
    }
}

impl RenderLoopHandler for ViewerScenario {
    fn on_keyboard_event(&mut self, event: &KeyEvent) {
        if event.physical_key == PhysicalKey::Code(KeyCode::F1)
            && event.state == ElementState::Pressed
            && !event.repeat
        {
            self.panel_toggle_requested = true;
        }
    }

    fn on_update(
        &mut self,
        plugin_registry: &mut PluginRegistry,
        draw_context: &mut DrawContext,
        time_info: &TimeInfo,
    ) {
        let elapsed = time_info.init_start.elapsed().as_secs_f32();
        self.time_uniform.write_uniform(elapsed);

        let car_z = self.drive.car_z(elapsed);
        let car_transform = self.drive.car_transform(car_z);
        for part in &self.driving_car {
            part.borrow_mut().set_transform(car_transform);
        }

        if self.panel_toggle_requested {
            self.panel_toggle_requested = false;
            self.state.panel_open = !self.state.panel_open;
            self.apply_cursor_mode();
            if let Some(elements) = plugin_registry.get_mut::<SceneElements>() {
                elements.camera.mouse_look_enabled = !self.state.panel_open;
            }
        }

        if let Some(elements) = plugin_registry.get::<SceneElements>() {
            let camera = elements.camera.as_ref();
            let eye = camera.eye_position();
            let forward = camera.forward();
            self.state.eye = eye.into();
            self.state.forward = forward.into();
            self.rig.spots[SPOT_FLASHLIGHT] = lights::flashlight(eye, forward);
        }
        self.rig.spots[SPOT_HEADLIGHTS].copy_from_slice(&self.drive.headlights(car_z));
        self.lights_uniform.write_uniform(self.rig.to_raw());

        #[cfg(feature = "egui")]
        self.run_panel(plugin_registry);

        self.apply_clear_color(draw_context);
    }
}

impl Drop for ViewerScenario {
    fn drop(&mut self) {
        if let Err(err) = self.state.save(&self.state_path) {
            warn!("Viewer state not persisted: {err:#}");
        }
    }
}

/// Loaded textures are shared between every part and placement that
/// references the same image file.
struct TextureCache {
    fallback: Rc<GpuTexture>,
    loaded: HashMap<PathBuf, Rc<GpuTexture>>,
}

impl TextureCache {
    fn new(context: &DrawContext) -> Self {
        Self {
            fallback: Rc::new(GpuTexture::new_2d(
                context,
                &crate::textures::TextureData::checkerboard(64),
            )),
            loaded: HashMap::new(),
        }
    }
    fn get(&mut self, context: &DrawContext, path: Option<&Path>) -> Rc<GpuTexture> {
        match path {
            None => Rc::clone(&self.fallback),
            Some(path) => Rc::clone(
                self.loaded
                    .entry(path.to_owned())
                    .or_insert_with(|| Rc::new(GpuTexture::open_2d(context, path))),
            ),
        }
    }
}

/// One lit, textured drawable per material group of the model. All parts of
/// a placement share the same transform; the caller keeps the handles when
/// the placement moves (the driving car).
#[allow(clippy::too_many_arguments)]
fn spawn_model_parts(
    context: &DrawContext,
    shader: &wgpu::ShaderModule,
    scene_uniforms: &Scene3DUniforms,
    lights_uniform: &Uniform<RawLightRig>,
    sampler: &TextureSampler,
    texture_cache: &mut TextureCache,
    model: &ModelData,
    transform: Matrix4<f32>,
) -> Vec<Rc<RefCell<Object3D>>> {
    model
        .parts
        .iter()
        .map(|part| {
            let model_uniform = Uniform::new(context, Matrix4::identity().into());
            let normal_uniform = Uniform::new(context, Matrix3::identity().into());
            let texture = texture_cache.get(context, part.diffuse_map.as_deref());
            let mut builder = DrawableBuilder::new(
                context,
                shader,
                shader,
                DrawModeParams::Indexed {
                    index_data: IndexData::U32(&part.mesh.indices),
                },
            );
            builder
                .add_attribute(
                    0,
                    wgpu::VertexStepMode::Vertex,
                    &part.mesh.positions,
                    wgpu::VertexFormat::Float32x3,
                )
                .expect("Location should not already be used.")
                .add_attribute(
                    1,
                    wgpu::VertexStepMode::Vertex,
                    &part.mesh.normals,
                    wgpu::VertexFormat::Float32x3,
                )
                .expect("Location should not already be used.")
                .add_attribute(
                    2,
                    wgpu::VertexStepMode::Vertex,
                    &part.mesh.uvs,
                    wgpu::VertexFormat::Float32x2,
                )
                .expect("Location should not already be used.")
                .add_binding_slot(&BindingSlot {
                    bind_group: 0,
                    binding: 0,
                    resource: &scene_uniforms.camera_mat,
                })
                .expect("Binding elements should not already be used.")
                .add_binding_slot(&BindingSlot {
                    bind_group: 0,
                    binding: 1,
                    resource: &scene_uniforms.camera_pos,
                })
                .expect("Binding elements should not already be used.")
                .add_binding_slot(&BindingSlot {
                    bind_group: 0,
                    binding: 2,
                    resource: lights_uniform,
                })
                .expect("Binding elements should not already be used.")
                .add_binding_slot(&BindingSlot {
                    bind_group: 1,
                    binding: 0,
                    resource: &model_uniform,
                })
                .expect("Binding elements should not already be used.")
                .add_binding_slot(&BindingSlot {
                    bind_group: 1,
                    binding: 1,
                    resource: &normal_uniform,
                })
                .expect("Binding elements should not already be used.")
                .add_binding_slot(&BindingSlot {
                    bind_group: 2,
                    binding: 0,
                    resource: texture.as_ref(),
                })
                .expect("Binding elements should not already be used.")
                .add_binding_slot(&BindingSlot {
                    bind_group: 2,
                    binding: 1,
                    resource: sampler,
                })
                .expect("Binding elements should not already be used.");
            let drawable = builder.build();
            let mut object = Object3D::new(
                drawable,
                Object3DUniforms {
                    model: model_uniform,
                    normals: Some(normal_uniform),
                },
            );
            object.set_transform(transform);
            object.into_shareable()
        })
        .collect()
}

fn build_ground(
    context: &DrawContext,
    shader: &wgpu::ShaderModule,
    scene_uniforms: &Scene3DUniforms,
    lights_uniform: &Uniform<RawLightRig>,
    sampler: &TextureSampler,
) -> Object3D {
    let model_uniform = Uniform::new(context, Matrix4::identity().into());
    let texture = GpuTexture::open_2d(context, GROUND_TEXTURE);
    let mut builder = DrawableBuilder::new(
        context,
        shader,
        shader,
        DrawModeParams::Direct {
            vertex_count: shapes::PLANE_VERTEX_COUNT,
        },
    );
    builder
        .add_attribute(
            0,
            wgpu::VertexStepMode::Vertex,
            shapes::PLANE_POSITIONS,
            wgpu::VertexFormat::Float32x3,
        )
        .expect("Location should not already be used.")
        .add_attribute(
            1,
            wgpu::VertexStepMode::Vertex,
            shapes::PLANE_NORMALS,
            wgpu::VertexFormat::Float32x3,
        )
        .expect("Location should not already be used.")
        .add_attribute(
            2,
            wgpu::VertexStepMode::Vertex,
            shapes::PLANE_UVS,
            wgpu::VertexFormat::Float32x2,
        )
        .expect("Location should not already be used.")
        .add_binding_slot(&BindingSlot {
            bind_group: 0,
            binding: 0,
            resource: &scene_uniforms.camera_mat,
        })
        .expect("Binding elements should not already be used.")
        .add_binding_slot(&BindingSlot {
            bind_group: 0,
            binding: 2,
            resource: lights_uniform,
        })
        .expect("Binding elements should not already be used.")
        .add_binding_slot(&BindingSlot {
            bind_group: 1,
            binding: 0,
            resource: &model_uniform,
        })
        .expect("Binding elements should not already be used.")
        .add_binding_slot(&BindingSlot {
            bind_group: 2,
            binding: 0,
            resource: &texture,
        })
        .expect("Binding elements should not already be used.")
        .add_binding_slot(&BindingSlot {
            bind_group: 2,
            binding: 1,
            resource: sampler,
        })
        .expect("Binding elements should not already be used.");
    let drawable = builder.build();
    let mut ground = Object3D::new(
        drawable,
        Object3DUniforms {
            model: model_uniform,
            normals: None,
        },
    );
    ground.set_transform(layout::ground_transform());
    ground
}

fn build_cardboard_box(
    context: &DrawContext,
    shader: &wgpu::ShaderModule,
    scene_uniforms: &Scene3DUniforms,
    sampler: &TextureSampler,
) -> Object3D {
    let model_uniform = Uniform::new(context, Matrix4::identity().into());
    let texture = GpuTexture::open_2d(context, CARDBOARD_TEXTURE);
    let mut builder = DrawableBuilder::new(
        context,
        shader,
        shader,
        DrawModeParams::Direct {
            vertex_count: shapes::CUBE_VERTEX_COUNT,
        },
    );
    builder
        .set_cull_mode(Some(wgpu::Face::Back))
        .add_attribute(
            0,
            wgpu::VertexStepMode::Vertex,
            shapes::CUBE_POSITIONS,
            wgpu::VertexFormat::Float32x3,
        )
        .expect("Location should not already be used.")
        .add_attribute(
            1,
            wgpu::VertexStepMode::Vertex,
            shapes::CUBE_UVS,
            wgpu::VertexFormat::Float32x2,
        )
        .expect("Location should not already be used.")
        .add_binding_slot(&BindingSlot {
            bind_group: 0,
            binding: 0,
            resource: &scene_uniforms.camera_mat,
        })
        .expect("Binding elements should not already be used.")
        .add_binding_slot(&BindingSlot {
            bind_group: 1,
            binding: 0,
            resource: &model_uniform,
        })
        .expect("Binding elements should not already be used.")
        .add_binding_slot(&BindingSlot {
            bind_group: 2,
            binding: 0,
            resource: &texture,
        })
        .expect("Binding elements should not already be used.")
        .add_binding_slot(&BindingSlot {
            bind_group: 2,
            binding: 1,
            resource: sampler,
        })
        .expect("Binding elements should not already be used.");
    let drawable = builder.build();
    let mut cardboard_box = Object3D::new(
        drawable,
        Object3DUniforms {
            model: model_uniform,
            normals: None,
        },
    );
    cardboard_box.set_transform(layout::cardboard_box_transform());
    cardboard_box
}

fn build_grass(
    context: &DrawContext,
    shader: &wgpu::ShaderModule,
    scene_uniforms: &Scene3DUniforms,
    time_uniform: &Uniform<f32>,
    sampler: &TextureSampler,
) -> Object3DInstanceGroup {
    let blade_count =
        u32::try_from(vegetation::GRASS_BLADE_COUNT).expect("Blade count should fit in u32");
    let mut handlers = Object3DInstanceGroupHandlers::new(context, blade_count);
    let blades = vegetation::grass_strip();
    handlers.update_instances(move |idx, instance| {
        let blade = blades[idx];
        instance.set_translation(blade.position);
        instance.set_scale(GRASS_SCALE);
        instance.set_yaw(Deg(blade.yaw_deg));
    });
    let texture = GpuTexture::open_2d(context, GRASS_TEXTURE);
    let mut builder = DrawableBuilder::new(
        context,
        shader,
        shader,
        DrawModeParams::Direct {
            vertex_count: shapes::BILLBOARD_VERTEX_COUNT,
        },
    );
    builder
        .set_instance_count(blade_count)
        .set_blend_option(wgpu::BlendState::ALPHA_BLENDING)
        .add_attribute(
            0,
            wgpu::VertexStepMode::Vertex,
            shapes::BILLBOARD_POSITIONS,
            wgpu::VertexFormat::Float32x3,
        )
        .expect("Location should not already be used.")
        .add_attribute(
            1,
            wgpu::VertexStepMode::Vertex,
            shapes::BILLBOARD_UVS,
            wgpu::VertexFormat::Float32x2,
        )
        .expect("Location should not already be used.")
        .add_binding_slot(&BindingSlot {
            bind_group: 0,
            binding: 0,
            resource: &scene_uniforms.camera_mat,
        })
        .expect("Binding elements should not already be used.")
        .add_binding_slot(&BindingSlot {
            bind_group: 0,
            binding: 1,
            resource: time_uniform,
        })
        .expect("Binding elements should not already be used.")
        .add_binding_slot(&BindingSlot {
            bind_group: 1,
            binding: 0,
            resource: handlers.transforms(),
        })
        .expect("Binding elements should not already be used.")
        .add_binding_slot(&BindingSlot {
            bind_group: 2,
            binding: 0,
            resource: &texture,
        })
        .expect("Binding elements should not already be used.")
        .add_binding_slot(&BindingSlot {
            bind_group: 2,
            binding: 1,
            resource: sampler,
        })
        .expect("Binding elements should not already be used.");
    let drawable = builder.build();
    Object3DInstanceGroup::new(drawable, handlers)
}

fn build_skybox(
    context: &DrawContext,
    shader: &wgpu::ShaderModule,
    scene_uniforms: &Scene3DUniforms,
    sampler: &TextureSampler,
) -> crate::draw_context::Drawable {
    let texture = GpuTexture::open_cubemap(context, SKYBOX_DIR);
    let mut builder = DrawableBuilder::new(
        context,
        shader,
        shader,
        DrawModeParams::Direct {
            vertex_count: shapes::SKYBOX_VERTEX_COUNT,
        },
    );
    builder
        .add_attribute(
            0,
            wgpu::VertexStepMode::Vertex,
            shapes::SKYBOX_POSITIONS,
            wgpu::VertexFormat::Float32x3,
        )
        .expect("Location should not already be used.")
        .add_binding_slot(&BindingSlot {
            bind_group: 0,
            binding: 0,
            resource: &scene_uniforms.sky_mat,
        })
        .expect("Binding elements should not already be used.")
        .add_binding_slot(&BindingSlot {
            bind_group: 1,
            binding: 0,
            resource: &texture,
        })
        .expect("Binding elements should not already be used.")
        .add_binding_slot(&BindingSlot {
            bind_group: 1,
            binding: 1,
            resource: sampler,
        })
        .expect("Binding elements should not already be used.");
    builder.build()
}
