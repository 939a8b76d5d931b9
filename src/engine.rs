//! Scene Lifecycle Manager
//!
//! [`Viewport`] ties a [`Scene`] and a [`Renderer`] to a host surface and
//! drives them from host frame callbacks. It carries no window code itself:
//! everything platform-specific sits behind the [`Host`] trait, so the same
//! viewport runs under winit, inside an embedder, or headless in tests.
//!
//! # Lifecycle
//!
//! ```text
//! mount ──► Mounted ──(on_frame / resize / attach_model)──► Mounted
//!                 └──────────── teardown ───────────► TornDown
//! ```
//!
//! Every operation on a torn-down viewport is a no-op.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut viewport = Viewport::mount(host, SceneConfig::default(), RendererSettings::default())?;
//! pollster::block_on(viewport.init_gpu(window))?;
//! let controls = viewport.control_handle();
//!
//! // host frame callback
//! viewport.on_frame(timestamp_ms);
//!
//! controls.play_hi_animation();
//! viewport.teardown();
//! ```

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::animation::{AnimationCommand, AnimationEvent};
use crate::config::SceneConfig;
use crate::errors::{Result, SpecterError};
use crate::renderer::settings::RendererSettings;
use crate::renderer::{FrameOutcome, Renderer};
use crate::resources::input::{InputHandle, ListenerKind};
use crate::scene::{NodeHandle, Scene, SceneAsset};
use crate::utils::time::{FrameClock, FrameStep};

/// Opaque id of a pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// The environment a viewport is mounted into.
pub trait Host {
    /// Surface size in physical pixels, or `None` when there is no surface.
    fn surface_size(&self) -> Option<(u32, u32)>;

    /// Binds the rendering surface to the viewport. Returns `false` if the
    /// surface cannot be attached.
    fn attach_surface(&mut self) -> bool;

    fn detach_surface(&mut self);

    /// Schedules one call to [`Viewport::on_frame`].
    fn request_frame(&mut self) -> FrameRequest;

    fn cancel_frame(&mut self, request: FrameRequest);

    fn add_listener(&mut self, kind: ListenerKind);

    fn remove_listener(&mut self, kind: ListenerKind);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Mounted,
    TornDown,
}

/// What one [`Viewport::on_frame`] call did.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub step: FrameStep,
    pub outcome: FrameOutcome,
    pub event: Option<AnimationEvent>,
}

/// Cloneable sender for animation commands.
///
/// Commands are queued and applied at the start of the next simulated
/// frame. Once the viewport is torn down they are silently dropped.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    sender: flume::Sender<AnimationCommand>,
}

impl ControlHandle {
    fn send(&self, command: AnimationCommand) {
        if self.sender.send(command).is_err() {
            log::debug!("Animation command dropped: viewport torn down");
        }
    }

    pub fn play_hi_animation(&self) {
        self.send(AnimationCommand::PlayHi);
    }

    pub fn play_jump_animation(&self) {
        self.send(AnimationCommand::PlayJump);
    }

    pub fn return_to_idle(&self) {
        self.send(AnimationCommand::ReturnToIdle);
    }

    pub fn play_animation(&self, name: impl Into<String>) {
        self.send(AnimationCommand::Play(name.into()));
    }

    pub fn stop_animation(&self) {
        self.send(AnimationCommand::Stop);
    }
}

pub struct Viewport<H: Host> {
    host: H,
    state: LifecycleState,
    scene: Scene,
    renderer: Renderer,
    input: InputHandle,
    commands: Option<flume::Receiver<AnimationCommand>>,
    control: ControlHandle,
    clock: FrameClock,
    pending_frame: Option<FrameRequest>,
    listeners: Vec<ListenerKind>,
}

impl<H: Host> Viewport<H> {
    /// Builds the scene on `host` and requests the first frame.
    ///
    /// # Errors
    ///
    /// [`SpecterError::InvalidConfig`] when `config` fails validation,
    /// [`SpecterError::SurfaceUnavailable`] when the host has no surface.
    pub fn mount(mut host: H, config: SceneConfig, settings: RendererSettings) -> Result<Self> {
        config.validate()?;

        let (width, height) = host
            .surface_size()
            .ok_or_else(|| SpecterError::SurfaceUnavailable("host has no rendering surface".to_string()))?;
        if !host.attach_surface() {
            return Err(SpecterError::SurfaceUnavailable("host refused to attach the surface".to_string()));
        }

        let mut listeners = Vec::with_capacity(ListenerKind::ALL.len());
        for kind in ListenerKind::ALL {
            host.add_listener(kind);
            listeners.push(kind);
        }

        let input = InputHandle::new();
        input.resize(width, height);

        let scene = Scene::new(&config, width, height);
        let (sender, receiver) = flume::unbounded();
        let pending_frame = Some(host.request_frame());

        log::info!("Viewport mounted at {width}x{height}");

        Ok(Self {
            host,
            state: LifecycleState::Mounted,
            scene,
            renderer: Renderer::new(settings),
            input,
            commands: Some(receiver),
            control: ControlHandle { sender },
            clock: FrameClock::new(),
            pending_frame,
            listeners,
        })
    }

    /// Acquires the GPU for `window`. Without it the viewport simulates but
    /// draws nothing.
    pub async fn init_gpu<W>(&mut self, window: W) -> Result<()>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        if self.state == LifecycleState::TornDown {
            return Ok(());
        }
        let (width, height) = self.host.surface_size().unwrap_or((1, 1));
        self.renderer.init(window, width, height).await
    }

    /// Host frame callback. `timestamp_ms` is a monotonic clock in
    /// milliseconds.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> Option<FrameReport> {
        if self.state == LifecycleState::TornDown {
            return None;
        }
        self.pending_frame = None;

        let step = self.clock.tick(timestamp_ms);
        self.drain_commands();

        let event = match step {
            FrameStep::Advance(dt) => {
                let input = self.input.take_frame(dt);
                self.scene.update(dt, &input)
            }
            FrameStep::Skip => {
                log::debug!("Frame gap too long, simulation skipped");
                None
            }
        };
        if let Some(AnimationEvent::Finished { clip }) = &event {
            log::info!("Animation '{clip}' finished, back to idle");
        }

        let outcome = self.renderer.render(&self.scene);

        if self.state == LifecycleState::Mounted {
            self.pending_frame = Some(self.host.request_frame());
        }

        Some(FrameReport { step, outcome, event })
    }

    fn drain_commands(&mut self) {
        let Some(receiver) = &self.commands else {
            return;
        };
        for command in receiver.try_iter() {
            self.scene.apply_animation_command(command);
        }
    }

    /// Updates the projection and GPU targets. Agents and particles keep
    /// their world positions. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.state == LifecycleState::TornDown || width == 0 || height == 0 {
            return;
        }
        self.input.resize(width, height);
        self.scene.resize(width, height);
        self.renderer.resize(width, height);
    }

    /// Installs an externally loaded model.
    ///
    /// # Errors
    ///
    /// [`SpecterError::AssetEmpty`] for an asset with nothing to show,
    /// [`SpecterError::AssetFailed`] once the model slot has failed, and
    /// [`SpecterError::Unmounted`] after teardown.
    pub fn attach_model(&mut self, asset: &SceneAsset) -> Result<NodeHandle> {
        if self.state == LifecycleState::TornDown {
            return Err(SpecterError::Unmounted);
        }
        self.scene.attach_model(asset)
    }

    /// Records that the host failed to load the model.
    pub fn report_model_error(&mut self, message: impl Into<String>) {
        if self.state == LifecycleState::TornDown {
            return;
        }
        self.scene.fail_model(message);
    }

    /// Releases everything in reverse order of acquisition. Idempotent.
    pub fn teardown(&mut self) {
        if self.state == LifecycleState::TornDown {
            return;
        }
        if let Some(request) = self.pending_frame.take() {
            self.host.cancel_frame(request);
        }
        for kind in self.listeners.drain(..) {
            self.host.remove_listener(kind);
        }
        self.renderer.dispose();
        self.host.detach_surface();
        self.scene.clear();
        self.commands = None;
        self.state = LifecycleState::TornDown;
        log::info!("Viewport torn down");
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.state == LifecycleState::Mounted
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Handle the host's pointer callbacks write through.
    #[must_use]
    pub fn input_handle(&self) -> InputHandle {
        self.input.clone()
    }

    #[must_use]
    pub fn control_handle(&self) -> ControlHandle {
        self.control.clone()
    }

    #[must_use]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    #[must_use]
    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.pending_frame
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: Host> Drop for Viewport<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
