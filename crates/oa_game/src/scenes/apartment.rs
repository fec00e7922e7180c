//! The first date at the host's apartment.
//!
//! An intro cutscene walks the guest in and plays the welcome. The player
//! then explores freely and inspects things on the table. Once the card game
//! is found, both characters walk to their seats (the host after a short
//! delay), a closing exchange plays and the scene fades into a transition.

use serde::Deserialize;

use oa_core::geometry::Rect;
use oa_core::input::{InputState, Key};
use oa_core::timer::Countdown;

use crate::actor::{Actor, ActorSet, Facing, Hitboxes};
use crate::assets::Assets;
use crate::collision::{CollisionPolicy, CollisionWorld};
use crate::config::{GameConfig, PlayerConfig};
use crate::cutscene::{Cutscene, CutsceneStep, Effect, Move};
use crate::dialogue::{lines, AdvanceGate, Dialogue, DialogueBox};
use crate::map::MapLoadOptions;
use crate::render::Renderer;
use crate::scene::{Scene, SceneCommand, SceneId};
use crate::scenes::{dt_us, point, walk_player, NamedRect};

const GUEST: &str = "maria";
const HOST: &str = "shani";
const SEATED_CLIP: &str = "sit_down";

const WELCOME: [&str; 4] = [
    "Thanks for coming over!",
    "Wow, your pictures did not do you justice!",
    "You are gorgeous!",
    "Feel free to check out my apartment!",
];
const GAME_FOUND: [&str; 2] = ["Oh, a board game!", "I wonder if Shani would like to play..."];
const CLOSING: [&str; 2] = ["Shani: I love this game!", "Maria: Me too. Your turn!"];

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ApartmentConfig {
    /// Tiled map relative to the asset root. The table and interaction
    /// rects below are used for whatever the map does not provide.
    pub map: Option<String>,
    pub map_options: MapLoadOptions,
    pub bounds: Rect,
    pub wall_thickness: f32,
    pub collision: CollisionPolicy,
    pub hitboxes: Hitboxes,
    pub table: Rect,
    pub interactions: Vec<NamedRect>,
    /// How far past the body box the guest can reach, width and height.
    pub reach: [f32; 2],
    pub walk_speed: f32,
    pub guest_start: [f32; 2],
    pub guest_door: [f32; 2],
    pub guest_entry: [f32; 2],
    pub host_start: [f32; 2],
    pub host_greeting_path: Vec<[f32; 2]>,
    pub guest_seat: [f32; 2],
    pub host_seat_path: Vec<[f32; 2]>,
    /// Seconds after the intro before the host is free to sit down.
    pub host_delay: f32,
    pub fade_duration: f32,
    pub closing_message: String,
    pub next: Option<SceneId>,
}

impl Default for ApartmentConfig {
    fn default() -> Self {
        Self {
            map: Some("maps/apartment.tmj".to_string()),
            map_options: MapLoadOptions {
                interaction_layers: vec!["Interactions".to_string()],
                ..MapLoadOptions::default()
            },
            bounds: Rect::new(0.0, 0.0, 1280.0, 800.0),
            wall_thickness: 10.0,
            collision: CollisionPolicy::RejectAndRevert,
            hitboxes: Hitboxes::character(40.0, 48.0, 40.0, 128.0),
            table: Rect::new(500.0, 330.0, 280.0, 90.0),
            interactions: vec![
                NamedRect::new("box", Rect::new(520.0, 345.0, 50.0, 35.0)),
                NamedRect::new("glass1", Rect::new(590.0, 345.0, 20.0, 35.0)),
                NamedRect::new("wine_bottle", Rect::new(640.0, 340.0, 24.0, 40.0)),
                NamedRect::new("glass2", Rect::new(690.0, 345.0, 20.0, 35.0)),
            ],
            reach: [40.0, 120.0],
            walk_speed: 200.0,
            guest_start: [-100.0, 600.0],
            guest_door: [45.0, 600.0],
            guest_entry: [145.0, 600.0],
            host_start: [900.0, 480.0],
            host_greeting_path: vec![[300.0, 480.0], [300.0, 600.0]],
            guest_seat: [420.0, 260.0],
            host_seat_path: vec![[860.0, 600.0], [860.0, 260.0], [730.0, 260.0]],
            host_delay: 3.0,
            fade_duration: 1.7,
            closing_message: "After their first date Shani and Maria went out on many more dates..."
                .to_string(),
            next: Some(SceneId::MovingDrive),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApartmentPhase {
    Intro,
    Explore,
    Seating,
    Closing,
    FadingOut,
    Done,
}

pub struct ApartmentScene {
    config: ApartmentConfig,
    player: PlayerConfig,
    phase: ApartmentPhase,
    actors: ActorSet,
    world: CollisionWorld,
    dialogue: DialogueBox,
    gate: AdvanceGate,
    intro: Cutscene,
    guest_route: Cutscene,
    host_route: Option<Cutscene>,
    host_delay: Countdown,
    fade: Countdown,
    box_visits: u32,
    glass_uses: [u32; 2],
    guest_seated: bool,
    host_seated: bool,
}

impl ApartmentScene {
    pub fn new(config: ApartmentConfig, game: &GameConfig) -> Self {
        Self {
            config,
            player: game.player,
            phase: ApartmentPhase::Intro,
            actors: ActorSet::new(),
            world: CollisionWorld::default(),
            dialogue: DialogueBox::new(),
            gate: AdvanceGate::new(game.dialogue_cooldown),
            intro: Cutscene::default(),
            guest_route: Cutscene::default(),
            host_route: None,
            host_delay: Countdown::default(),
            fade: Countdown::default(),
            box_visits: 0,
            glass_uses: [0; 2],
            guest_seated: false,
            host_seated: false,
        }
    }

    pub fn phase(&self) -> ApartmentPhase {
        self.phase
    }

    pub fn actors(&self) -> &ActorSet {
        &self.actors
    }

    pub fn dialogue(&self) -> &DialogueBox {
        &self.dialogue
    }

    fn intro_cutscene(&self) -> Cutscene {
        let speed = self.config.walk_speed;
        let greeting = self
            .config
            .host_greeting_path
            .iter()
            .map(|p| vec![Move::new(HOST, point(*p))])
            .collect();
        Cutscene::new(vec![
            CutsceneStep::wait(2.0).on_complete(Effect::place(GUEST, point(self.config.guest_door))),
            CutsceneStep::walk(speed, vec![Move::new(GUEST, point(self.config.guest_entry))])
                .on_complete(Effect::face(GUEST, Facing::Right)),
            CutsceneStep::walk_path(speed, greeting)
                .on_complete(Effect::face(HOST, Facing::Left))
                .on_complete(Effect::say(&WELCOME)),
            CutsceneStep::await_dialogue().on_complete(Effect::signal("intro_done")),
        ])
    }

    fn seat_host_cutscene(&self) -> Cutscene {
        let path = self
            .config
            .host_seat_path
            .iter()
            .map(|p| vec![Move::new(HOST, point(*p))])
            .collect();
        Cutscene::new(vec![CutsceneStep::walk_path(self.config.walk_speed, path)
            .on_complete(Effect::face(HOST, Facing::Left))
            .on_complete(Effect::hold(HOST, SEATED_CLIP))
            .on_complete(Effect::signal("host_seated"))])
    }

    fn handle_signals(&mut self, signals: Vec<String>) {
        for signal in signals {
            match signal.as_str() {
                "intro_done" => {
                    self.phase = ApartmentPhase::Explore;
                    self.host_delay.start(self.config.host_delay);
                    log::info!("Apartment intro done, free movement");
                }
                "guest_seated" => self.guest_seated = true,
                "host_seated" => self.host_seated = true,
                other => log::debug!("Unhandled apartment signal '{other}'"),
            }
        }
    }

    fn explore(&mut self, dt: f32, input: &InputState, interact: bool) {
        if self.dialogue.is_showing() {
            if let Some(guest) = self.actors.get_mut(GUEST) {
                guest.set_motion(None, false);
            }
            return;
        }

        let others = self.actors.head_boxes_except(GUEST);
        let Some(guest) = self.actors.get_mut(GUEST) else {
            return;
        };
        walk_player(
            guest,
            input,
            self.player.speed,
            dt,
            self.config.collision,
            &self.world,
            &others,
        );

        if interact {
            self.interact();
        }
    }

    /// Inspect whatever the guest is standing next to.
    fn interact(&mut self) {
        let Some(body) = self.actors.get(GUEST).and_then(Actor::body_box) else {
            return;
        };
        let reach_area = body.inflated(self.config.reach[0], self.config.reach[1]);
        let Some(target) = self.world.interaction_at(&reach_area) else {
            return;
        };
        let name = target.name.clone();
        log::debug!("Interacting with '{name}'");

        match name.as_str() {
            "box" => self.open_box(),
            "wine_bottle" => self.dialogue.show(lines(&["I hope she likes Kosher wine"])),
            "glass1" => self.drink(0),
            "glass2" => self.drink(1),
            other => log::debug!("Nothing to do with '{other}'"),
        }
    }

    fn open_box(&mut self) {
        self.box_visits += 1;
        if self.box_visits == 1 {
            self.dialogue
                .show(lines(&["Card Game: We are not really strangers"]));
        } else if self.glass_uses.iter().all(|&uses| uses == 0) {
            self.dialogue.show(lines(&["Maybe I should try the wine first..."]));
        } else {
            self.dialogue.show(lines(&GAME_FOUND));
            self.begin_seating();
        }
    }

    fn drink(&mut self, glass: usize) {
        self.glass_uses[glass] += 1;
        let line = match self.glass_uses[glass] {
            1 => "This is really good wine!",
            2 => "Wow she is really pretty...",
            _ => "Ok I should check out the game on the table",
        };
        self.dialogue.show(lines(&[line]));
    }

    fn begin_seating(&mut self) {
        log::info!("Card game found, heading to the table");
        self.phase = ApartmentPhase::Seating;
        self.guest_route = Cutscene::new(vec![CutsceneStep::walk(
            self.config.walk_speed,
            vec![Move::new(GUEST, point(self.config.guest_seat))],
        )
        .on_complete(Effect::face(GUEST, Facing::Right))
        .on_complete(Effect::hold(GUEST, SEATED_CLIP))
        .on_complete(Effect::signal("guest_seated"))]);
    }

    fn seat(&mut self, dt: f32) {
        let signals = self
            .guest_route
            .update(dt, &mut self.actors, &mut self.dialogue);
        self.handle_signals(signals);

        if self.host_route.is_none() && self.host_delay.is_ready() {
            self.host_route = Some(self.seat_host_cutscene());
        }
        if let Some(route) = self.host_route.as_mut() {
            let signals = route.update(dt, &mut self.actors, &mut self.dialogue);
            self.handle_signals(signals);
        }

        if self.guest_seated && self.host_seated {
            log::info!("Both seated");
            self.dialogue.show(lines(&CLOSING));
            self.phase = ApartmentPhase::Closing;
        }
    }

    fn fade_alpha(&self) -> f32 {
        match self.phase {
            ApartmentPhase::FadingOut if self.config.fade_duration > 0.0 => {
                1.0 - self.fade.remaining() / self.config.fade_duration
            }
            ApartmentPhase::FadingOut | ApartmentPhase::Done => 1.0,
            _ => 0.0,
        }
    }
}

impl Scene for ApartmentScene {
    fn name(&self) -> &'static str {
        SceneId::Apartment.name()
    }

    fn start(&mut self, assets: &mut Assets) -> Result<(), String> {
        self.world = match &self.config.map {
            Some(relative) => assets.map(relative, &self.config.map_options),
            None => CollisionWorld::default(),
        };
        if self.world.obstacles.is_empty() {
            self.world.add_obstacle(self.config.table);
        }
        if self.world.interactions.is_empty() {
            for item in &self.config.interactions {
                self.world.add_interaction(item.name.clone(), item.rect);
            }
        }
        self.world
            .add_boundary_walls(self.config.bounds, self.config.wall_thickness);

        self.actors.clear();
        for (name, start, facing) in [
            (GUEST, self.config.guest_start, Facing::Right),
            (HOST, self.config.host_start, Facing::Left),
        ] {
            let actor = Actor::new(name, point(start), facing)
                .with_hitboxes(self.config.hitboxes)
                .with_scale(self.player.scale)
                .with_animations(assets.character(name));
            self.actors.insert(actor);
        }

        self.phase = ApartmentPhase::Intro;
        self.intro = self.intro_cutscene();
        self.guest_route = Cutscene::default();
        self.host_route = None;
        self.host_delay.cancel();
        self.fade.cancel();
        self.dialogue.hide();
        self.box_visits = 0;
        self.glass_uses = [0; 2];
        self.guest_seated = false;
        self.host_seated = false;
        Ok(())
    }

    fn update(&mut self, dt: f32, input: &InputState) -> SceneCommand {
        let frame_us = dt_us(dt);
        for actor in self.actors.iter_mut() {
            actor.update_animation(frame_us);
        }
        self.gate.tick(dt);
        self.host_delay.tick(dt);

        let space = input.is_just_pressed(Key::Space);
        let showing = self.dialogue.is_showing();
        if space && showing {
            self.gate.try_advance(&mut self.dialogue);
        }

        match self.phase {
            ApartmentPhase::Intro => {
                let signals = self.intro.update(dt, &mut self.actors, &mut self.dialogue);
                self.handle_signals(signals);
            }
            ApartmentPhase::Explore => self.explore(dt, input, space && !showing),
            ApartmentPhase::Seating => self.seat(dt),
            ApartmentPhase::Closing => {
                if !self.dialogue.is_showing() {
                    self.fade.start(self.config.fade_duration);
                    self.phase = ApartmentPhase::FadingOut;
                }
            }
            ApartmentPhase::FadingOut => {
                if self.fade.tick(dt) {
                    self.phase = ApartmentPhase::Done;
                    return SceneCommand::Transition {
                        message: self.config.closing_message.clone(),
                        next: self.config.next,
                    };
                }
            }
            ApartmentPhase::Done => {}
        }
        SceneCommand::Continue
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        renderer.fill_rect(self.config.bounds, [196, 164, 120, 255]);
        renderer.fill_rect(self.config.table, [110, 70, 40, 255]);
        for item in &self.world.interactions {
            let color = match item.name.as_str() {
                "box" => [200, 40, 60, 255],
                "wine_bottle" => [90, 10, 40, 255],
                _ => [220, 220, 240, 200],
            };
            renderer.fill_rect(item.rect, color);
        }

        self.actors.draw(renderer);

        let b = self.config.bounds;
        self.dialogue
            .draw(renderer, Rect::new(b.x + 40.0, b.bottom() - 160.0, b.w - 80.0, 120.0));

        let alpha = (self.fade_alpha().clamp(0.0, 1.0) * 255.0).round() as u8;
        if alpha > 0 {
            renderer.fill_rect(b, [0, 0, 0, alpha]);
        }
    }
}
