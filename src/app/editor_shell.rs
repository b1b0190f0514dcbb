use egui::Context as EguiCtx;
use egui_wgpu::{Renderer as EguiRenderer, RendererOptions, ScreenDescriptor};
use egui_winit::State as EguiWinit;
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// egui context plus the winit and wgpu glue created once the window exists.
pub(crate) struct EditorShell {
    pub egui_ctx: EguiCtx,
    pub egui_winit: Option<EguiWinit>,
    pub egui_renderer: Option<EguiRenderer>,
    pub egui_screen: Option<ScreenDescriptor>,
}

impl EditorShell {
    pub fn new() -> Self {
        Self { egui_ctx: EguiCtx::default(), egui_winit: None, egui_renderer: None, egui_screen: None }
    }

    pub fn is_ready(&self) -> bool {
        self.egui_winit.is_some() && self.egui_renderer.is_some() && self.egui_screen.is_some()
    }

    pub fn attach(&mut self, window: &Window, device: &wgpu::Device, format: wgpu::TextureFormat) {
        let pixels_per_point = window.scale_factor() as f32;
        if self.egui_winit.is_none() {
            self.egui_winit = Some(EguiWinit::new(
                self.egui_ctx.clone(),
                egui::ViewportId::ROOT,
                window,
                Some(pixels_per_point),
                window.theme(),
                None,
            ));
        }
        if self.egui_renderer.is_none() {
            self.egui_renderer = Some(EguiRenderer::new(device, format, RendererOptions::default()));
        }
        let size = window.inner_size();
        self.egui_screen = Some(ScreenDescriptor { size_in_pixels: [size.width, size.height], pixels_per_point });
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if let Some(screen) = self.egui_screen.as_mut() {
            screen.size_in_pixels = [size.width, size.height];
        }
    }
}
