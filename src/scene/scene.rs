use std::sync::Arc;

use fastrand::Rng;
use glam::{Mat4, Vec2, Vec3};

use crate::agent::{AgentTemplate, PointerSample, PrimaryAgent, SecondaryAgent, layout_secondaries};
use crate::animation::{AnimationCommand, AnimationController, AnimationEvent};
use crate::config::{Color, SceneConfig};
use crate::errors::{Result, SpecterError};
use crate::particles::{ParticlePool, ParticleSettings, ParticleShapes};
use crate::procedural::BackgroundScenario;
use crate::renderer::post::PostProcessPipeline;
use crate::resources::geometry::Geometry;
use crate::resources::input::Input;
use crate::resources::label::LabelTexture;
use crate::resources::material::{BlendMode, MaterialParams};
use crate::scene::NodeHandle;
use crate::scene::camera::Camera;
use crate::scene::graph::NodeGraph;
use crate::scene::light::{Fog, Light};
use crate::scene::model::{ModelPlacement, ModelState, SceneAsset};
use crate::scene::node::Node;
use crate::scene::transform::Transform;
use crate::utils::orbit_control::OrbitControls;

/// Agents run on a slowed clock: 0.01 per 60 Hz frame.
pub const SIM_TIME_SCALE: f32 = 0.6;
pub const CAMERA_FOV: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Topology {
    #[default]
    Triangles,
    Points,
}

/// One draw call, as extracted from the scene for the renderer.
#[derive(Debug, Clone)]
pub struct DrawItem {
    pub geometry: Arc<Geometry>,
    pub material: MaterialParams,
    pub model: Mat4,
    pub topology: Topology,
    /// Texture multiplied into the base color.
    pub label: Option<LabelTexture>,
}

impl DrawItem {
    #[must_use]
    pub fn new(geometry: Arc<Geometry>, material: MaterialParams, model: Mat4) -> Self {
        Self {
            geometry,
            material,
            model,
            topology: Topology::Triangles,
            label: None,
        }
    }
}

/// Everything the viewport shows.
///
/// Built once per mount from a validated [`SceneConfig`]; [`Scene::update`]
/// advances it one frame and [`Scene::extract_draws`] hands it to the
/// renderer.
#[derive(Debug)]
pub struct Scene {
    pub config: SceneConfig,

    pub graph: NodeGraph,
    pub camera: Camera,
    pub camera_transform: Transform,
    pub controls: OrbitControls,
    pub lights: Vec<Light>,
    pub fog: Fog,
    pub clear_color: Color,

    pub template: AgentTemplate,
    pub primary: PrimaryAgent,
    pub secondaries: Vec<SecondaryAgent>,
    pub particles: ParticlePool,
    particle_shapes: ParticleShapes,
    pub background: BackgroundScenario,

    pub animation: AnimationController,
    pub model: ModelState,
    pub placement: ModelPlacement,
    model_wrapper: Option<NodeHandle>,

    pub post: PostProcessPipeline,

    sim_time: f32,
    elapsed: f32,
}

impl Scene {
    /// `config` is expected to be validated already.
    #[must_use]
    pub fn new(config: &SceneConfig, width: u32, height: u32) -> Self {
        let aspect = if height == 0 { 1.0 } else { width as f32 / height as f32 };
        let background = BackgroundScenario::generate(config);

        let mut camera = Camera::new_perspective(CAMERA_FOV, aspect, CAMERA_NEAR, CAMERA_FAR);
        let mut camera_transform = Transform::from_position(background.camera_position());
        camera_transform.look_at(Vec3::ZERO, Vec3::Y);
        camera.update_view_projection(&camera_transform);
        let controls = OrbitControls::looking_from(camera_transform.position, Vec3::ZERO);

        let template = AgentTemplate::from_config(config);
        let primary = PrimaryAgent::new(&template, config, config.seed ^ 0x9e37_79b9);
        let mut rng = Rng::with_seed(config.seed ^ 0x85eb_ca6b);
        let secondaries = layout_secondaries(
            &template,
            &config.secondary_grid,
            &camera,
            camera_transform.position.z,
            primary.start_position(),
            &mut rng,
        );

        let particles = ParticlePool::new(ParticleSettings::from_config(config), config.seed ^ 0xc2b2_ae35);

        let mut lights = Vec::new();
        background.lights(&mut lights);

        log::info!(
            "Scene built: {:?} background, {} secondary agents, {} lights",
            background.kind(),
            secondaries.len(),
            lights.len()
        );

        Self {
            config: config.clone(),
            graph: NodeGraph::new(),
            camera,
            camera_transform,
            controls,
            lights,
            fog: background.fog(),
            clear_color: background.clear_color(),
            template,
            primary,
            secondaries,
            particles,
            particle_shapes: ParticleShapes::new(),
            background,
            animation: AnimationController::new(config.idle_clip),
            model: ModelState::Pending,
            placement: ModelPlacement::default(),
            model_wrapper: None,
            post: PostProcessPipeline::new(&config.analog_decay),
            sim_time: 0.0,
            elapsed: 0.0,
        }
    }

    /// Agent clock (scaled).
    #[must_use]
    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    /// Seconds simulated so far.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advances every component by `dt` seconds.
    pub fn update(&mut self, dt: f32, input: &Input) -> Option<AnimationEvent> {
        self.elapsed += dt;
        self.sim_time += dt * SIM_TIME_SCALE;

        self.controls.update(&mut self.camera_transform, input, self.camera.fov, dt);
        self.camera.update_view_projection(&self.camera_transform);

        let pointer = PointerSample::from_input(input);
        if let Some(request) = self.primary.update(&pointer, self.sim_time, self.elapsed) {
            self.particles.spawn(request.origin, request.scatter_radius, request.count);
        }
        for secondary in &mut self.secondaries {
            secondary.update(self.sim_time, self.config.wobble_amount);
        }
        self.particles.tick(dt);

        self.background.update(self.elapsed, self.sim_time, self.primary.position());
        self.lights.clear();
        self.background.lights(&mut self.lights);

        let event = self.animation.update(dt, &mut self.graph);
        self.graph.update_world_matrices();

        let screen = input.screen_size();
        self.post.update(self.sim_time, Vec2::new(screen.x.max(1.0), screen.y.max(1.0)));
        event
    }

    /// Recomputes the projection. Never touches world-space entities.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    pub fn apply_animation_command(&mut self, command: AnimationCommand) {
        self.animation.handle(command, &mut self.graph);
    }

    /// Installs an externally loaded model, replacing any previous one.
    ///
    /// Empty assets put the model slot into its terminal failed state; so
    /// does any call after a failure.
    pub fn attach_model(&mut self, asset: &SceneAsset) -> Result<NodeHandle> {
        if let ModelState::Failed(message) = &self.model {
            return Err(SpecterError::AssetFailed(message.clone()));
        }
        if asset.is_empty() {
            let err = SpecterError::AssetEmpty;
            self.fail_model(err.to_string());
            return Err(err);
        }

        self.remove_model();

        let frame = self.placement.frame(asset.bounding_box());
        let wrapper = self.graph.add(Node::new("ModelWrapper").with_transform(frame));
        let root = asset.instantiate(&mut self.graph, wrapper);
        self.graph.update_world_matrices();

        self.animation.attach(&mut self.graph, root, asset.clips.clone());
        self.model_wrapper = Some(wrapper);
        self.model = ModelState::Ready { root };
        log::info!("Model attached ({} nodes)", self.graph.len());
        Ok(root)
    }

    /// Records a load failure reported by the host. Terminal.
    pub fn fail_model(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("Model failed: {message}");
        self.remove_model();
        self.model = ModelState::Failed(message);
    }

    fn remove_model(&mut self) {
        self.animation.detach();
        if let Some(wrapper) = self.model_wrapper.take() {
            self.graph.remove_subtree(wrapper);
        }
    }

    /// Collects every draw call for this frame.
    pub fn extract_draws(&self, out: &mut Vec<DrawItem>) {
        self.background.draws(out);

        for secondary in &self.secondaries {
            secondary.instance.draws(&self.template, out);
        }
        self.primary.instance.draws(&self.template, out);

        for particle in self.particles.iter_live() {
            let material = MaterialParams {
                color: particle.color,
                opacity: particle.opacity,
                ..MaterialParams::unlit(Color::WHITE)
            }
            .with_blend(BlendMode::Transparent);
            let rotation = glam::Quat::from_euler(
                glam::EulerRot::XYZ,
                particle.rotation.x,
                particle.rotation.y,
                particle.rotation.z,
            );
            let model = Mat4::from_scale_rotation_translation(Vec3::splat(particle.scale), rotation, particle.position);
            out.push(DrawItem::new(
                Arc::clone(self.particle_shapes.get(particle.shape)),
                material,
                model,
            ));
        }

        for (_, node) in self.graph.iter() {
            if !node.visible {
                continue;
            }
            if let Some(mesh) = &node.mesh {
                out.push(DrawItem::new(
                    Arc::clone(&mesh.geometry),
                    mesh.material,
                    Mat4::from(*node.world_matrix()),
                ));
            }
        }
    }

    /// Drops the model and all transient content. Safe to call repeatedly.
    pub fn clear(&mut self) {
        self.animation.detach();
        self.model_wrapper = None;
        self.graph.clear();
        self.particles.clear();
        self.secondaries.clear();
        self.lights.clear();
    }
}
