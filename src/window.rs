/*
MIT License

Copyright (c) 2021, 2022, 2024, 2025 Vincent Hiribarren

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

use std::sync::Arc;
use std::time::Instant;

use log::{error, warn};
use pollster::FutureExt;
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::draw_context::DrawContext;
use crate::plugins::PluginRegistry;
use crate::render_loop::{LaunchContext, RenderContext, RenderLoopBuilder, RenderLoopHandler, TimeInfo};

const WINDOW_TITLE: &str = "nightroad";

pub(crate) fn init_event_loop(builder: Box<RenderLoopBuilder>) {
    let event_loop = EventLoop::new().expect("Event loop should be created only once");
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut window_app = WindowApp {
        builder: Some(builder),
        state: None,
    };
    event_loop
        .run_app(&mut window_app)
        .expect("Event loop should run until exit");
}

struct WindowApp {
    builder: Option<Box<RenderLoopBuilder>>,
    state: Option<AppState>,
}

struct AppState {
    draw_context: DrawContext,
    plugin_registry: PluginRegistry,
    handler: Box<dyn RenderLoopHandler>,
    time_info: TimeInfo,
    last_frame: Instant,
}

impl ApplicationHandler for WindowApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = Arc::new(
            event_loop
                .create_window(Window::default_attributes().with_title(WINDOW_TITLE))
                .expect("Main window should be created"),
        );
        let mut draw_context = match DrawContext::new(Some(Arc::clone(&window)), None).block_on() {
            Ok(draw_context) => draw_context,
            Err(err) => {
                error!("Could not initialize the GPU context: {err}");
                event_loop.exit();
                return;
            }
        };
        let mut plugin_registry = PluginRegistry::default();
        let builder = self
            .builder
            .take()
            .expect("Builder should still be present on first resume");
        let handler = builder(LaunchContext {
            draw_context: &mut draw_context,
            plugin_registry: &mut plugin_registry,
        });
        self.state = Some(AppState {
            draw_context,
            plugin_registry,
            handler,
            time_info: TimeInfo::default(),
            last_frame: Instant::now(),
        });
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let Some(state) = &self.state else {
            return;
        };
        if let Some(window) = &state.draw_context.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        // Latest registered plugin (the UI overlay) gets first refusal.
        let mut processed = false;
        for plugin in state.plugin_registry.iter_mut_rev() {
            if plugin.on_window_event(&event).processed {
                processed = true;
                break;
            }
        }
        if !processed {
            processed = state.handler.on_window_event(&event).processed;
        }
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event: key_event, ..
            } if !processed => {
                if key_event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    event_loop.exit();
                    return;
                }
                for plugin in state.plugin_registry.iter_mut() {
                    plugin.on_keyboard_event(&key_event);
                }
                state.handler.on_keyboard_event(&key_event);
            }
            WindowEvent::Resized(size) if size.width > 0 && size.height > 0 => {
                state.draw_context.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                state.render_frame();
                if state.handler.is_finished() {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        for plugin in state.plugin_registry.iter_mut() {
            if plugin.on_mouse_event(&event).processed {
                return;
            }
        }
        state.handler.on_mouse_event(&event);
    }
}

impl AppState {
    fn render_frame(&mut self) {
        let now = Instant::now();
        self.time_info.processing_delta = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.handler
            .on_update(&mut self.plugin_registry, &mut self.draw_context, &self.time_info);
        let render_result = self.draw_context.render_scene(|render_pass| {
            let render_context = RenderContext {
                time_info: &self.time_info,
                draw_context: &self.draw_context,
            };
            let mut render_pass = render_pass.forget_lifetime();
            for plugin in self.plugin_registry.iter_mut() {
                plugin.on_render(&render_context, &mut render_pass);
            }
        });
        if let Err(err) = render_result {
            warn!("Skipping frame: {err}");
        }
    }
}
