//! Tempora - A time-switching puzzle game
//!
//! Runs a headless, scripted session: the player picks up the sandclock,
//! raises matter in different dimensions and watches it obey causality.

mod settings;

use anyhow::{Context, Result};
use glam::Vec3;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use winit::event::{ElementState, MouseButton};
use winit::keyboard::{KeyCode, PhysicalKey};

use tempora_core::Transform;
use tempora_game::{
    HudState, InputAction, InputHandler, MatterSinker, MatterSpawner, Sandclock,
    SpawnVariant, TimeControlInput,
};
use tempora_timeline::{MaterialId, Presentation, TimelineStage};

use crate::settings::GameSettings;

/// Reach of the sink ability
const SINK_RANGE: f32 = 20.0;

/// Simulated frame time
const FRAME_DT: f32 = 1.0 / 60.0;

/// Application state
struct TemporaApp {
    stage: TimelineStage,
    input: InputHandler,
    spawner: MatterSpawner,
    sinker: MatterSinker,
    sandclock: Sandclock,
    hud: HudState,
    player: Vec3,
}

impl TemporaApp {
    fn new(settings: &GameSettings) -> Self {
        let mut stage = TimelineStage::new(&settings.timeline);
        let hud = HudState::new(settings.hud.clone(), stage.controller.current_dimension());
        hud.attach(&mut stage.controller);

        let variants = vec![
            SpawnVariant::new("Regular").with_materials(MaterialId(0), MaterialId(1), MaterialId(2)),
            SpawnVariant::new("Tall").with_materials(MaterialId(3), MaterialId(4), MaterialId(5)),
            SpawnVariant::new("Crystal").with_child_variants(),
        ];

        Self {
            stage,
            input: InputHandler::new(),
            spawner: MatterSpawner::new(settings.spawner.clone(), variants),
            sinker: MatterSinker::new(),
            sandclock: Sandclock::new(Vec3::new(0.0, 0.0, 4.0), 1.5),
            hud,
            player: Vec3::ZERO,
        }
    }

    /// Place the hand-authored part of the level
    fn build_scene(&mut self) {
        let bridge = self.stage.world.spawn();
        let broken = self.stage.world.spawn();
        let overgrown = self.stage.world.spawn();
        self.stage.spawn_authored(
            Transform::from_position(Vec3::new(0.0, 0.0, 10.0)),
            Some(Presentation::children(bridge, broken, overgrown)),
        );
        self.stage.spawn_authored(
            Transform::from_position(Vec3::new(3.0, 0.0, 6.0)),
            Some(Presentation::materials(MaterialId(20), MaterialId(21), MaterialId(22))),
        );
        info!("Scene built with {} time-aware objects", self.stage.controller.registered().len());
    }

    fn press_key(&mut self, key: KeyCode) {
        self.input.handle_keyboard(PhysicalKey::Code(key), ElementState::Pressed);
    }

    fn release_key(&mut self, key: KeyCode) {
        self.input.handle_keyboard(PhysicalKey::Code(key), ElementState::Released);
    }

    fn click(&mut self, button: MouseButton) {
        self.input.handle_mouse_button(button, ElementState::Pressed);
    }

    fn release_button(&mut self, button: MouseButton) {
        self.input.handle_mouse_button(button, ElementState::Released);
    }

    fn update(&mut self) {
        let TimelineStage { world, controller } = &mut self.stage;
        let state = &self.input.state;

        TimeControlInput.poll(state, controller, world);

        if state.is_just_pressed(InputAction::Interact)
            && self.sandclock.collect(controller, world, self.player)
        {
            info!("Time control unlocked: T, R and Y switch dimensions");
        }
        if state.is_just_pressed(InputAction::CycleVariant) {
            self.spawner.cycle_variant();
        }
        if state.is_just_pressed(InputAction::SpawnMatter) {
            let ground = self.player + Vec3::new(0.0, 0.0, 2.0);
            match self.spawner.spawn(world, controller, ground) {
                Ok(matter) => {
                    self.spawner.settle(world, &matter);
                }
                Err(e) => warn!("{e}"),
            }
        }
        if state.is_just_pressed(InputAction::SinkMatter) {
            if let Some(target) = self.sinker.nearest_target(world, self.player, SINK_RANGE) {
                self.sinker.sink(world, controller, target);
            }
        }

        self.hud.refresh(&self.spawner, world);
        self.hud.update(FRAME_DT);
        self.input.end_frame();
    }
}

/// One scripted frame of player input
enum Step {
    Walk(Vec3),
    Key(KeyCode),
    Click(MouseButton),
}

fn script() -> Vec<Step> {
    vec![
        Step::Key(KeyCode::KeyT),
        Step::Walk(Vec3::new(0.0, 0.0, 3.5)),
        Step::Key(KeyCode::KeyE),
        Step::Key(KeyCode::KeyF),
        Step::Key(KeyCode::KeyY),
        Step::Key(KeyCode::KeyQ),
        Step::Key(KeyCode::KeyF),
        Step::Key(KeyCode::KeyR),
        Step::Key(KeyCode::KeyT),
        Step::Key(KeyCode::KeyF),
        Step::Click(MouseButton::Right),
        Step::Key(KeyCode::KeyY),
    ]
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    info!("Starting Tempora...");

    let settings = GameSettings::load();
    let mut app = TemporaApp::new(&settings);
    app.build_scene();

    for step in script() {
        match step {
            Step::Walk(to) => app.player = to,
            Step::Key(key) => app.press_key(key),
            Step::Click(button) => app.click(button),
        }
        app.update();
        match step {
            Step::Key(key) => app.release_key(key),
            Step::Click(button) => app.release_button(button),
            Step::Walk(_) => {}
        }
    }

    info!(
        "Session over in the {} with {} objects raised and {} free slots",
        app.stage.controller.current_dimension(),
        app.spawner.active_count(&app.stage.world),
        app.spawner.available_slots(&app.stage.world),
    );

    if let Err(e) = settings.save() {
        warn!("Failed to save settings: {e}");
    }
    Ok(())
}
