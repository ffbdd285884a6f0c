use std::sync::Arc;

use winit::window::Window;

use crate::draw_context::DrawContext;
use crate::render_loop::EventState;

use super::Plugin;

/// Immediate-mode overlay. Registered last so it draws over the scene and
/// gets first refusal on window events. Degrades to a no-op without a window
/// (headless rendering).
pub enum EguiPlugin {
    NoWindow(egui::Context),
    WithWindow(EguiPluginWithWindow),
}

pub struct EguiPluginWithWindow {
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    pixels_per_point: f32,
    window: Arc<Window>,
}

impl EguiPlugin {
    pub fn new(draw_context: &DrawContext) -> Self {
        let Some(window) = draw_context.window.as_ref() else {
            return Self::NoWindow(egui::Context::default());
        };
        let window = Arc::clone(window);
        let egui_state = egui_winit::State::new(
            egui::Context::default(),
            egui::ViewportId::default(),
            &window,
            None,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &draw_context.device,
            draw_context.surface_config.format,
            Some(draw_context.depth_texture.format()),
            draw_context.multisample_config.get_multisample_count(),
            true,
        );
        Self::WithWindow(EguiPluginWithWindow {
            egui_state,
            egui_renderer,
            #[allow(clippy::cast_possible_truncation)]
            pixels_per_point: window.scale_factor() as f32,
            window,
        })
    }

    pub fn set_pixels_per_point(&mut self, pixels_per_point: f32) {
        if let Self::WithWindow(egui_plugin) = self {
            egui_plugin.pixels_per_point = pixels_per_point;
        }
    }

    #[must_use]
    pub fn get_pixels_per_point(&self) -> f32 {
        match self {
            Self::WithWindow(egui_plugin) => egui_plugin.pixels_per_point,
            Self::NoWindow(_) => 1.0,
        }
    }

    #[must_use]
    pub fn egui_context(&self) -> &egui::Context {
        match self {
            Self::NoWindow(context) => context,
            Self::WithWindow(egui_plugin) => egui_plugin.egui_state.egui_ctx(),
        }
    }

    /// Begins the egui frame and runs the UI closure. Must be called once per
    /// update; the matching end-of-frame happens in [`Plugin::on_render`].
    pub fn draw<F>(&mut self, run_ui: F)
    where
        F: FnOnce(&egui::Context),
    {
        let Self::WithWindow(egui_plugin) = self else {
            return;
        };
        let raw_input = egui_plugin.egui_state.take_egui_input(&egui_plugin.window);
        egui_plugin.egui_state.egui_ctx().begin_pass(raw_input);
        run_ui(egui_plugin.egui_state.egui_ctx());
    }

    fn end_frame_and_draw(
        egui_plugin: &mut EguiPluginWithWindow,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
        encoder: &mut wgpu::CommandEncoder,
        render_pass: &mut wgpu::RenderPass<'static>,
    ) {
        egui_plugin
            .egui_state
            .egui_ctx()
            .set_pixels_per_point(screen_descriptor.pixels_per_point);
        let full_output = egui_plugin.egui_state.egui_ctx().end_pass();

        egui_plugin
            .egui_state
            .handle_platform_output(&egui_plugin.window, full_output.platform_output);

        let tris = egui_plugin.egui_state.egui_ctx().tessellate(
            full_output.shapes,
            egui_plugin.egui_state.egui_ctx().pixels_per_point(),
        );
        for (id, image_delta) in &full_output.textures_delta.set {
            egui_plugin
                .egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }
        egui_plugin
            .egui_renderer
            .update_buffers(device, queue, encoder, &tris, screen_descriptor);

        egui_plugin
            .egui_renderer
            .render(render_pass, &tris, screen_descriptor);
        for id in &full_output.textures_delta.free {
            egui_plugin.egui_renderer.free_texture(id);
        }
    }
}

impl Plugin for EguiPlugin {
    fn on_window_event(&mut self, event: &winit::event::WindowEvent) -> EventState {
        match self {
            Self::WithWindow(egui_plugin) => {
                let event_response = egui_plugin
                    .egui_state
                    .on_window_event(&egui_plugin.window, event);
                EventState {
                    processed: event_response.consumed,
                }
            }
            Self::NoWindow(_) => EventState::default(),
        }
    }
    fn on_render(
        &mut self,
        render_context: &crate::render_loop::RenderContext,
        render_pass: &mut wgpu::RenderPass<'static>,
    ) {
        let Self::WithWindow(egui_plugin) = self else {
            return;
        };
        let draw_context = render_context.draw_context;
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                draw_context.surface_config.width,
                draw_context.surface_config.height,
            ],
            pixels_per_point: egui_plugin.pixels_per_point,
        };
        let mut encoder = draw_context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        Self::end_frame_and_draw(
            egui_plugin,
            &draw_context.device,
            &draw_context.queue,
            &screen_descriptor,
            &mut encoder,
            render_pass,
        );
        // The buffer uploads recorded above must land before this frame's
        // command buffer is submitted by the render loop.
        draw_context.queue.submit(std::iter::once(encoder.finish()));
    }
}
