//! Side-scrolling drive: steer up and down while road hazards scroll in from
//! the right. Hits push the vehicle out and knock it back; the scene ends on
//! a timer whether or not anything was hit.

use glam::Vec2;
use serde::Deserialize;

use oa_core::geometry::Rect;
use oa_core::input::InputState;
use oa_core::timer::Countdown;

use crate::assets::Assets;
use crate::collision::{move_towards, resolve_push_out, Bump, BumpConfig};
use crate::render::Renderer;
use crate::scene::{Scene, SceneCommand, SceneId};

const DESPAWN_MARGIN: f32 = 50.0;
const HIT_HINT_SECONDS: f32 = 1.0;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Vehicle {
    #[default]
    Car,
    Uhaul,
}

impl Vehicle {
    fn sprite(self) -> &'static str {
        match self {
            Self::Car => "vehicles/car",
            Self::Uhaul => "vehicles/uhaul",
        }
    }

    fn default_scroll_speed(self) -> f32 {
        match self {
            Self::Car => 220.0,
            Self::Uhaul => 180.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    #[default]
    Day,
    Night,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DriveConfig {
    pub vehicle: Vehicle,
    pub time_of_day: TimeOfDay,
    /// Seconds until the scene ends.
    pub duration: f32,
    /// Hazard scroll speed; the vehicle's default when unset.
    pub scroll_speed: Option<f32>,
    pub steer_speed: f32,
    /// Speed at which the vehicle drifts back to its lane x after a bump.
    pub recover_speed: f32,
    pub road_top: f32,
    pub road_bottom: f32,
    pub screen_width: f32,
    pub screen_height: f32,
    pub spawn_min: f32,
    pub spawn_max: f32,
    pub jaywalker_chance: f32,
    pub seed: u64,
    pub vehicle_rect: Rect,
    pub bump: BumpConfig,
    pub next: Option<SceneId>,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self::date()
    }
}

impl DriveConfig {
    /// Car ride to the first date.
    pub fn date() -> Self {
        Self {
            vehicle: Vehicle::Car,
            time_of_day: TimeOfDay::Day,
            duration: 10.0,
            scroll_speed: None,
            steer_speed: 300.0,
            recover_speed: 80.0,
            road_top: 40.0,
            road_bottom: 760.0,
            screen_width: 1280.0,
            screen_height: 800.0,
            spawn_min: 0.6,
            spawn_max: 1.2,
            jaywalker_chance: 0.25,
            seed: 7,
            vehicle_rect: Rect::new(120.0, 300.0, 56.0, 28.0),
            bump: BumpConfig::default(),
            next: Some(SceneId::Apartment),
        }
    }

    /// Moving truck to the new home.
    pub fn moving() -> Self {
        Self {
            vehicle: Vehicle::Uhaul,
            vehicle_rect: Rect::new(120.0, 300.0, 84.0, 36.0),
            seed: 11,
            next: Some(SceneId::Dinner),
            ..Self::date()
        }
    }

    pub fn scroll_speed(&self) -> f32 {
        self.scroll_speed
            .unwrap_or_else(|| self.vehicle.default_scroll_speed())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.duration <= 0.0 {
            return Err(format!("duration must be > 0 (got {})", self.duration));
        }
        if self.spawn_min <= 0.0 || self.spawn_max < self.spawn_min {
            return Err(format!(
                "spawn interval must satisfy 0 < spawn_min <= spawn_max (got {}..{})",
                self.spawn_min, self.spawn_max
            ));
        }
        if self.road_bottom - self.road_top < self.vehicle_rect.h {
            return Err("road is narrower than the vehicle".to_string());
        }
        if !(0.0..=1.0).contains(&self.jaywalker_chance) {
            return Err(format!(
                "jaywalker_chance must be within 0..=1 (got {})",
                self.jaywalker_chance
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardKind {
    Pothole,
    Cone,
    Jaywalker,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hazard {
    pub kind: HazardKind,
    pub rect: Rect,
    /// Vertical drift, only jaywalkers cross the road.
    pub drift: f32,
}

pub struct DriveScene {
    id: SceneId,
    config: DriveConfig,
    rng: fastrand::Rng,
    vehicle: Rect,
    hazards: Vec<Hazard>,
    bump: Bump,
    timer: Countdown,
    spawn: Countdown,
    hint: Countdown,
    hits: u32,
    done: bool,
}

impl DriveScene {
    pub fn new(id: SceneId, config: DriveConfig) -> Self {
        let rng = fastrand::Rng::with_seed(config.seed);
        let vehicle = config.vehicle_rect;
        Self {
            id,
            config,
            rng,
            vehicle,
            hazards: Vec::new(),
            bump: Bump::default(),
            timer: Countdown::default(),
            spawn: Countdown::default(),
            hint: Countdown::default(),
            hits: 0,
            done: false,
        }
    }

    pub fn vehicle(&self) -> Rect {
        self.vehicle
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn time_left(&self) -> f32 {
        self.timer.remaining()
    }

    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.rng.f32() * (max - min)
    }

    fn spawn_hazard(&mut self) {
        let roll = self.rng.f32();
        let kind = if roll < self.config.jaywalker_chance {
            HazardKind::Jaywalker
        } else if self.rng.f32() < 0.6 {
            HazardKind::Pothole
        } else {
            HazardKind::Cone
        };
        let (w, h) = match kind {
            HazardKind::Pothole => (40.0, 24.0),
            HazardKind::Cone => (24.0, 24.0),
            HazardKind::Jaywalker => (20.0, 36.0),
        };
        let y = self.range(self.config.road_top + 40.0, self.config.road_bottom - 40.0 - h);
        let drift = if kind == HazardKind::Jaywalker {
            let speed = self.range(40.0, 90.0);
            if self.rng.bool() {
                speed
            } else {
                -speed
            }
        } else {
            0.0
        };
        let rect = Rect::new(self.config.screen_width + 10.0, y, w, h);
        log::debug!("Spawned {:?} at y {:.0}", kind, y);
        self.hazards.push(Hazard { kind, rect, drift });
    }

    fn steer(&mut self, dt: f32, input: &InputState) {
        let axis = input.movement_axis();
        self.vehicle.y += axis.y * self.config.steer_speed * dt;

        let knock = self.bump.step(dt, &self.config.bump);
        self.vehicle = self.vehicle.translated(knock);
        if !self.bump.is_active() {
            let home = self.config.vehicle_rect.x;
            self.vehicle.x = move_towards(self.vehicle.x, home, self.config.recover_speed * dt);
        }
        self.clamp_to_road();
    }

    fn clamp_to_road(&mut self) {
        let max_y = (self.config.road_bottom - self.vehicle.h).max(self.config.road_top);
        self.vehicle.y = self.vehicle.y.clamp(self.config.road_top, max_y);
        let max_x = (self.config.screen_width - self.vehicle.w).max(0.0);
        self.vehicle.x = self.vehicle.x.clamp(0.0, max_x);
    }

    fn scroll_hazards(&mut self, dt: f32) {
        let scroll = self.config.scroll_speed();
        let (top, bottom) = (self.config.road_top, self.config.road_bottom);
        for hazard in &mut self.hazards {
            hazard.rect.x -= scroll * dt;
            hazard.rect.y += hazard.drift * dt;
            if hazard.rect.top() < top || hazard.rect.bottom() > bottom {
                hazard.drift = -hazard.drift;
                hazard.rect.y = hazard.rect.y.clamp(top, (bottom - hazard.rect.h).max(top));
            }
        }
        self.hazards.retain(|h| h.rect.right() >= -DESPAWN_MARGIN);
    }

    fn collide(&mut self) {
        let rects: Vec<Rect> = self.hazards.iter().map(|h| h.rect).collect();
        let (resolved, pushes) = resolve_push_out(self.vehicle, &rects);
        self.vehicle = resolved;
        for (index, push) in pushes {
            if self.bump.trigger(push.axis, &self.config.bump) {
                self.hits += 1;
                self.hint.start(HIT_HINT_SECONDS);
                log::info!(
                    "Hit {:?} ({} so far), pushed {:?} by {:.1}",
                    self.hazards[index].kind,
                    self.hits,
                    push.axis,
                    push.depth
                );
            }
        }
        // Push-out never leaves the road.
        self.clamp_to_road();
    }
}

impl Scene for DriveScene {
    fn name(&self) -> &'static str {
        self.id.name()
    }

    fn start(&mut self, _assets: &mut Assets) -> Result<(), String> {
        self.config.validate()?;
        self.rng = fastrand::Rng::with_seed(self.config.seed);
        self.vehicle = self.config.vehicle_rect;
        self.hazards.clear();
        self.bump.clear();
        self.hits = 0;
        self.done = false;
        self.timer.start(self.config.duration);
        let first = self.range(self.config.spawn_min, self.config.spawn_max);
        self.spawn.start(first);
        log::info!(
            "Drive started: {:?} at {:?}, {:.0}s",
            self.config.vehicle,
            self.config.time_of_day,
            self.config.duration
        );
        Ok(())
    }

    fn update(&mut self, dt: f32, input: &InputState) -> SceneCommand {
        if self.done {
            return SceneCommand::Continue;
        }
        if self.timer.tick(dt) {
            self.done = true;
            log::info!("Drive over with {} hits", self.hits);
            return match self.config.next {
                Some(id) => SceneCommand::GoTo(id),
                None => SceneCommand::Finish,
            };
        }

        self.steer(dt, input);
        if self.spawn.tick(dt) {
            self.spawn_hazard();
            let next = self.range(self.config.spawn_min, self.config.spawn_max);
            self.spawn.start(next);
        }
        self.scroll_hazards(dt);
        self.collide();
        self.hint.tick(dt);
        SceneCommand::Continue
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let (sky, road) = match self.config.time_of_day {
            TimeOfDay::Day => ([120, 180, 235, 255], [70, 70, 78, 255]),
            TimeOfDay::Night => ([14, 16, 40, 255], [30, 30, 36, 255]),
        };
        let width = self.config.screen_width;
        renderer.fill_rect(Rect::new(0.0, 0.0, width, self.config.screen_height), sky);
        let road_rect = Rect::new(
            0.0,
            self.config.road_top,
            width,
            self.config.road_bottom - self.config.road_top,
        );
        renderer.fill_rect(road_rect, road);

        for hazard in &self.hazards {
            let color = match hazard.kind {
                HazardKind::Pothole => [25, 25, 25, 255],
                HazardKind::Cone => [240, 120, 20, 255],
                HazardKind::Jaywalker => [200, 60, 160, 255],
            };
            renderer.fill_rect(hazard.rect, color);
        }

        if self.config.time_of_day == TimeOfDay::Night {
            let beam = Rect::new(self.vehicle.right(), self.vehicle.y - 8.0, 160.0, self.vehicle.h + 16.0);
            renderer.fill_rect(beam, [255, 250, 200, 60]);
        }
        let Vec2 { x, y } = self.vehicle.position();
        renderer.fill_rect(self.vehicle, [200, 30, 40, 255]);
        renderer.draw_sprite(self.config.vehicle.sprite(), x, y, 1.0);

        renderer.draw_text(&format!("Time: {:.0}s", self.timer.remaining().ceil()), 20.0, 12.0);
        if self.hint.is_running() {
            renderer.draw_text("Watch the road!", x, y - 24.0);
        }
    }
}
