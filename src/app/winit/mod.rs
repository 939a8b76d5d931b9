//! Winit-based host
//!
//! - [`WinitHost`]: [`Host`] implementation over a winit window
//! - [`App`]: builder that opens a window, mounts a viewport and runs the
//!   event loop until the window closes
//!
//! # Example
//!
//! ```rust,ignore
//! use specter::app::winit::App;
//!
//! fn main() -> specter::errors::Result<()> {
//!     App::new().with_title("Ghost").run()
//! }
//! ```
//!
//! While running, `H`, `J`, `I` and `S` play the hi and jump one-shots,
//! return to idle, and stop animation.

pub mod input_adapter;

use std::sync::Arc;
use std::time::Instant;

use rustc_hash::FxHashSet;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
pub use winit::window::{Window, WindowId};

use crate::config::SceneConfig;
use crate::engine::{FrameRequest, Host, Viewport};
use crate::errors::Result;
use crate::renderer::settings::RendererSettings;
use crate::resources::input::ListenerKind;
use crate::scene::SceneAsset;

/// [`Host`] over a winit window.
///
/// Frame requests map to `request_redraw`; a cancelled request makes the
/// next redraw a no-op. Events are only forwarded for registered listeners.
pub struct WinitHost {
    window: Arc<Window>,
    attached: bool,
    next_request: u64,
    pending: Option<FrameRequest>,
    listeners: FxHashSet<ListenerKind>,
}

impl WinitHost {
    #[must_use]
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            attached: false,
            next_request: 0,
            pending: None,
            listeners: FxHashSet::default(),
        }
    }

    #[must_use]
    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    #[must_use]
    pub fn listens(&self, kind: ListenerKind) -> bool {
        self.listeners.contains(&kind)
    }

    /// Consumes the pending frame request, if any.
    pub fn take_frame_request(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

impl Host for WinitHost {
    fn surface_size(&self) -> Option<(u32, u32)> {
        let size = self.window.inner_size();
        (size.width > 0 && size.height > 0).then_some((size.width, size.height))
    }

    fn attach_surface(&mut self) -> bool {
        self.attached = true;
        true
    }

    fn detach_surface(&mut self) {
        self.attached = false;
    }

    fn request_frame(&mut self) -> FrameRequest {
        self.next_request += 1;
        let request = FrameRequest(self.next_request);
        self.pending = Some(request);
        self.window.request_redraw();
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }

    fn add_listener(&mut self, kind: ListenerKind) {
        self.listeners.insert(kind);
    }

    fn remove_listener(&mut self, kind: ListenerKind) {
        self.listeners.remove(&kind);
    }
}

/// Application builder.
pub struct App {
    title: String,
    config: SceneConfig,
    settings: RendererSettings,
    asset: Option<SceneAsset>,
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Specter".into(),
            config: SceneConfig::default(),
            settings: RendererSettings::default(),
            asset: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: SceneConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RendererSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Model attached right after mounting.
    #[must_use]
    pub fn with_asset(mut self, asset: SceneAsset) -> Self {
        self.asset = Some(asset);
        self
    }

    /// Runs the event loop on the current thread until the window closes.
    pub fn run(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner {
            app: self,
            viewport: None,
            start_time: Instant::now(),
        };
        event_loop.run_app(&mut runner)?;
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

struct AppRunner {
    app: App,
    viewport: Option<Viewport<WinitHost>>,
    start_time: Instant,
}

impl AppRunner {
    fn mount(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title(&self.app.title)
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                return Err(crate::errors::SpecterError::SurfaceUnavailable(e.to_string()));
            }
        };

        let host = WinitHost::new(Arc::clone(&window));
        let mut viewport = Viewport::mount(host, self.app.config.clone(), self.app.settings.clone())?;

        log::info!("Initializing renderer backend...");
        pollster::block_on(viewport.init_gpu(window))?;

        if let Some(asset) = self.app.asset.take()
            && let Err(e) = viewport.attach_model(&asset)
        {
            log::error!("Model rejected: {e}");
        }

        self.start_time = Instant::now();
        self.viewport = Some(viewport);
        Ok(())
    }

    fn handle_key(viewport: &Viewport<WinitHost>, code: KeyCode) {
        let controls = viewport.control_handle();
        match code {
            KeyCode::KeyH => controls.play_hi_animation(),
            KeyCode::KeyJ => controls.play_jump_animation(),
            KeyCode::KeyI => controls.return_to_idle(),
            KeyCode::KeyS => controls.stop_animation(),
            _ => {}
        }
    }
}

impl ApplicationHandler for AppRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewport.is_some() {
            return;
        }
        if let Err(e) = self.mount(event_loop) {
            log::error!("Fatal viewport error: {e}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(viewport) = &mut self.viewport else {
            return;
        };

        if let Some((kind, pointer)) = input_adapter::translate_event(&event) {
            if viewport.host().listens(kind) {
                viewport.input_handle().dispatch(pointer);
            }
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                viewport.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if viewport.host().listens(ListenerKind::Resize) {
                    viewport.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && !event.repeat
                    && let PhysicalKey::Code(code) = event.physical_key
                {
                    Self::handle_key(viewport, code);
                }
            }
            WindowEvent::RedrawRequested => {
                if viewport.host_mut().take_frame_request() {
                    let timestamp = self.start_time.elapsed().as_secs_f64() * 1000.0;
                    viewport.on_frame(timestamp);
                }
            }
            _ => {}
        }
    }
}
