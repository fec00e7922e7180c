//! Family dinner. The guest walks around the room and hears from each
//! relative by bumping into them. P starts the meeting with the host; the
//! relatives react with staggered emotes, the host kneels and a YES/NO box
//! pops up. NO dodges the cursor, YES sets off fireworks, and a short
//! afterglow later the story closes.

use glam::Vec2;
use serde::Deserialize;

use oa_core::geometry::Rect;
use oa_core::input::{InputState, Key};
use oa_core::timer::Countdown;

use crate::actor::{Actor, ActorSet, Facing, Hitboxes};
use crate::assets::Assets;
use crate::collision::{CollisionPolicy, CollisionWorld};
use crate::config::{GameConfig, PlayerConfig};
use crate::cutscene::{Cutscene, CutsceneStep, Effect, Move};
use crate::dialogue::{AdvanceGate, Dialogue, DialogueBox};
use crate::map::MapLoadOptions;
use crate::render::{Color, Renderer};
use crate::scene::{Scene, SceneCommand, SceneId};
use crate::scenes::{dt_us, point, walk_player};

const GUEST: &str = "maria";
const HOST: &str = "shani";
const EMOTE_CLIPS: [&str; 2] = ["emote_down", "emote"];
const KNEEL_CLIP: &str = "kneel";
const MEETING_LINES: [&str; 3] = [
    "Hey I have something for you",
    "Oh shoot, where is it!? ",
    "....Shani do you have it?",
];

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Relative {
    pub name: String,
    pub position: [f32; 2],
    pub line: String,
}

impl Relative {
    fn new(name: &str, x: f32, y: f32, line: &str) -> Self {
        Self {
            name: name.to_string(),
            position: [x, y],
            line: line.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DinnerConfig {
    pub map: Option<String>,
    pub map_options: MapLoadOptions,
    pub bounds: Rect,
    pub wall_thickness: f32,
    pub collision: CollisionPolicy,
    pub hitboxes: Hitboxes,
    /// Used when the map provides no obstacles.
    pub tables: Vec<Rect>,
    pub relatives: Vec<Relative>,
    pub guest_start: [f32; 2],
    pub host_start: [f32; 2],
    pub meeting_point: [f32; 2],
    pub guest_speed: f32,
    pub host_speed: f32,
    /// Extra width and height around the guest's head that still counts as
    /// talking to someone.
    pub contact_margin: f32,
    pub emote_duration: f32,
    pub emote_stagger: f32,
    pub proposal_question: String,
    /// Keyboard cursor speed on the proposal box, pixels per second.
    pub cursor_speed: f32,
    /// The cursor is pushed out of this radius around the NO button.
    pub no_repel_radius: f32,
    pub fireworks_duration: f32,
    pub afterglow_duration: f32,
    pub afterglow_message: String,
    pub closing_message: String,
}

impl Default for DinnerConfig {
    fn default() -> Self {
        Self {
            map: Some("maps/dinner.tmj".to_string()),
            map_options: MapLoadOptions::default(),
            bounds: Rect::new(0.0, 0.0, 1280.0, 800.0),
            wall_thickness: 10.0,
            collision: CollisionPolicy::RejectAndRevert,
            hitboxes: Hitboxes::character(24.0, 48.0, 40.0, 128.0),
            tables: vec![Rect::new(300.0, 380.0, 680.0, 100.0)],
            relatives: vec![
                Relative::new("Mom", 152.0, 516.0, "Wow this is nice! I love you egg"),
                Relative::new("Dad", 232.0, 516.0, "Aye where's Uncle Ralph? I am happy for you sweetie"),
                Relative::new(
                    "Gio",
                    802.0,
                    516.0,
                    "MARIA! MAURICE! WOW! THIS IS AMAZING! This might be almost as good as dancing with the stars",
                ),
                Relative::new(
                    "Loriana",
                    402.0,
                    526.0,
                    "This was nonconsentual. Shani just added me to this game without asking. But since I am here, I am happy for you Maria",
                ),
                Relative::new(
                    "Oresti",
                    502.0,
                    526.0,
                    "Oh so you can play a video game but you can't play DND? Just kidding, you did well kiddo",
                ),
                Relative::new(
                    "Marisa",
                    682.0,
                    576.0,
                    "I can't believe I'm in a video game! Maria, you look amazing like this!",
                ),
            ],
            guest_start: [512.0, 640.0],
            host_start: [1320.0, 420.0],
            meeting_point: [512.0, 620.0],
            guest_speed: 150.0,
            host_speed: 180.0,
            contact_margin: 12.0,
            emote_duration: 3.0,
            emote_stagger: 0.25,
            proposal_question: "Maria, will you marry me?".to_string(),
            cursor_speed: 300.0,
            no_repel_radius: 120.0,
            fireworks_duration: 6.0,
            afterglow_duration: 3.0,
            afterglow_message: "That went well.".to_string(),
            closing_message: "And they lived happily ever after.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DinnerPhase {
    Roam,
    Meeting,
    Proposal,
    Fireworks,
    Afterglow,
    Done,
}

/// YES/NO box shown when the host proposes. The keyboard steers a cursor;
/// the cursor is shoved out of a radius around NO, and confirming only ever
/// accepts YES.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalBox {
    pub frame: Rect,
    pub yes: Rect,
    pub no: Rect,
    pub cursor: Vec2,
}

impl ProposalBox {
    fn centered(bounds: Rect) -> Self {
        let (w, h) = (520.0, 220.0);
        let frame = Rect::new(
            bounds.x + (bounds.w - w) / 2.0,
            bounds.y + (bounds.h - h) / 2.0,
            w,
            h,
        );
        let yes = Rect::new(frame.x + 60.0, frame.y + 140.0, 160.0, 48.0);
        let no = Rect::new(frame.x + 300.0, frame.y + 140.0, 160.0, 48.0);
        Self {
            frame,
            yes,
            no,
            cursor: yes.center(),
        }
    }

    fn steer(&mut self, delta: Vec2, repel_radius: f32, bounds: Rect) {
        self.cursor += delta;
        let away = self.cursor - self.no.center();
        let dist = away.length();
        if dist == 0.0 {
            self.cursor.y -= 40.0;
        } else if dist < repel_radius {
            self.cursor += away / dist * (repel_radius - dist) * 1.6;
        }
        self.cursor = self.cursor.clamp(
            bounds.position(),
            Vec2::new(bounds.right(), bounds.bottom()),
        );
    }

    pub fn accepts(&self) -> bool {
        self.yes.contains_point(self.cursor)
    }

    /// NO lifts away as the cursor gets close.
    fn no_button(&self) -> Rect {
        let dist = self.cursor.distance(self.no.center());
        let lift = if dist < 160.0 { (160.0 - dist) / 24.0 } else { 0.0 };
        self.no.translated(Vec2::new(0.0, -lift.floor()))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Burst {
    origin: Vec2,
    age: f32,
    color: Color,
}

#[derive(Debug, Clone, Default)]
struct Emote {
    delay: Countdown,
    duration: Countdown,
}

pub struct DinnerScene {
    config: DinnerConfig,
    player: PlayerConfig,
    phase: DinnerPhase,
    actors: ActorSet,
    world: CollisionWorld,
    dialogue: DialogueBox,
    gate: AdvanceGate,
    meeting: Cutscene,
    emotes: Vec<Emote>,
    proposal: Option<ProposalBox>,
    bursts: Vec<Burst>,
    /// Fireworks, then afterglow.
    beat: Countdown,
    /// Relative whose line is on screen because the guest is touching them.
    contact: Option<usize>,
}

impl DinnerScene {
    pub fn new(config: DinnerConfig, game: &GameConfig) -> Self {
        Self {
            config,
            player: game.player,
            phase: DinnerPhase::Roam,
            actors: ActorSet::new(),
            world: CollisionWorld::default(),
            dialogue: DialogueBox::new(),
            gate: AdvanceGate::new(game.dialogue_cooldown),
            meeting: Cutscene::default(),
            emotes: Vec::new(),
            proposal: None,
            bursts: Vec::new(),
            beat: Countdown::default(),
            contact: None,
        }
    }

    pub fn phase(&self) -> DinnerPhase {
        self.phase
    }

    pub fn actors(&self) -> &ActorSet {
        &self.actors
    }

    pub fn dialogue(&self) -> &DialogueBox {
        &self.dialogue
    }

    pub fn proposal(&self) -> Option<&ProposalBox> {
        self.proposal.as_ref()
    }

    pub fn is_emoting(&self, relative: &str) -> bool {
        self.config
            .relatives
            .iter()
            .position(|r| r.name == relative)
            .and_then(|i| self.emotes.get(i))
            .is_some_and(|e| e.duration.is_running())
    }

    fn meeting_cutscene(&self) -> Cutscene {
        let meet = point(self.config.meeting_point);
        Cutscene::new(vec![
            CutsceneStep::walk(
                self.config.guest_speed,
                vec![
                    Move::new(GUEST, meet - Vec2::new(30.0, 0.0)),
                    Move::new(HOST, meet + Vec2::new(30.0, 0.0)).at_speed(self.config.host_speed),
                ],
            )
            .on_complete(Effect::face(GUEST, Facing::Right))
            .on_complete(Effect::face(HOST, Facing::Left))
            .on_complete(Effect::signal("emotes")),
            CutsceneStep::await_dialogue().on_start(Effect::say(&MEETING_LINES)),
            CutsceneStep::wait(0.0)
                .on_complete(Effect::hold(HOST, KNEEL_CLIP))
                .on_complete(Effect::signal("propose")),
        ])
    }

    fn begin_meeting(&mut self) {
        log::info!("Dinner meeting started");
        self.dialogue.hide();
        self.contact = None;
        if let Some(guest) = self.actors.get_mut(GUEST) {
            guest.set_motion(None, false);
        }
        self.meeting = self.meeting_cutscene();
        self.phase = DinnerPhase::Meeting;
    }

    fn open_proposal(&mut self) {
        log::info!("Proposal box opened");
        self.dialogue.hide();
        self.proposal = Some(ProposalBox::centered(self.config.bounds));
        self.phase = DinnerPhase::Proposal;
    }

    fn start_fireworks(&mut self) {
        log::info!("YES! Fireworks for {}s", self.config.fireworks_duration);
        self.proposal = None;
        self.bursts = (0..12u32)
            .map(|i| Burst {
                origin: Vec2::new(100.0 + ((i * 80) % 1200) as f32, 120.0 + (i % 4) as f32 * 40.0),
                age: 0.0,
                color: [255, (200 - (i % 3) * 40) as u8, (80 + (i % 4) * 30) as u8, 255],
            })
            .collect();
        self.beat.start(self.config.fireworks_duration);
        self.phase = DinnerPhase::Fireworks;
    }

    fn start_emotes(&mut self) {
        let stagger = self.config.emote_stagger;
        self.emotes = (0..self.config.relatives.len())
            .map(|i| Emote {
                delay: Countdown::started(i as f32 * stagger),
                duration: Countdown::default(),
            })
            .collect();
        log::info!("Relatives start emoting");
    }

    fn update_emotes(&mut self, dt: f32) {
        for (emote, relative) in self.emotes.iter_mut().zip(&self.config.relatives) {
            let Some(actor) = self.actors.get_mut(&relative.name) else {
                continue;
            };
            if emote.delay.tick(dt) {
                actor.anim.play_first(&EMOTE_CLIPS);
                actor.pose_locked = true;
                emote.duration.start(self.config.emote_duration);
            } else if emote.duration.tick(dt) {
                actor.pose_locked = false;
                actor.sync_animation();
            }
        }
    }

    /// Relatives turn toward the guest, never away from the camera.
    fn face_guest(&mut self) {
        let Some(target) = self.actors.get(GUEST).map(|a| a.position) else {
            return;
        };
        for relative in &self.config.relatives {
            let Some(actor) = self.actors.get_mut(&relative.name) else {
                continue;
            };
            if actor.pose_locked {
                continue;
            }
            let delta = target - actor.position;
            let facing = if delta.y > delta.x.abs() {
                Facing::Down
            } else if delta.x < 0.0 {
                Facing::Left
            } else {
                Facing::Right
            };
            if actor.facing != facing {
                actor.set_motion(Some(facing), false);
            }
        }
    }

    /// Show a relative's line while the guest is touching them.
    fn update_contact(&mut self) {
        let Some(head) = self.actors.get(GUEST).and_then(Actor::head_box) else {
            return;
        };
        let reach = head.inflated(self.config.contact_margin, self.config.contact_margin);
        let touching = self.config.relatives.iter().position(|r| {
            self.actors
                .get(&r.name)
                .and_then(Actor::head_box)
                .is_some_and(|h| reach.overlaps(&h))
        });

        match (touching, self.contact) {
            (Some(i), current) if current != Some(i) => {
                let relative = &self.config.relatives[i];
                self.dialogue
                    .show(vec![format!("{}: {}", relative.name, relative.line)]);
                self.contact = Some(i);
            }
            (None, Some(_)) => {
                self.dialogue.hide();
                self.contact = None;
            }
            _ => {}
        }
    }

    fn roam(&mut self, dt: f32, input: &InputState) {
        let others = self.actors.head_boxes_except(GUEST);
        if let Some(guest) = self.actors.get_mut(GUEST) {
            walk_player(
                guest,
                input,
                self.player.speed,
                dt,
                self.config.collision,
                &self.world,
                &others,
            );
        }
        self.update_contact();
    }

    fn draw_proposal(&self, proposal: &ProposalBox, renderer: &mut dyn Renderer) {
        let frame = proposal.frame;
        renderer.fill_rect(frame, [240, 240, 250, 255]);
        renderer.draw_text(&self.config.proposal_question, frame.x + 24.0, frame.y + 24.0);
        renderer.fill_rect(proposal.yes, [60, 180, 120, 255]);
        renderer.draw_text("YES", proposal.yes.x + 60.0, proposal.yes.y + 12.0);
        let no = proposal.no_button();
        renderer.fill_rect(no, [200, 80, 80, 255]);
        renderer.draw_text("NO", no.x + 64.0, no.y + 12.0);
        renderer.fill_rect(
            Rect::new(proposal.cursor.x - 3.0, proposal.cursor.y - 3.0, 6.0, 6.0),
            [10, 10, 10, 255],
        );
    }

    fn draw_bursts(&self, renderer: &mut dyn Renderer) {
        for burst in &self.bursts {
            let radius = (burst.age + 0.1) * 40.0;
            let size = (6.0 - burst.age.floor()).max(2.0);
            for spoke in 0..8 {
                let angle = spoke as f32 * std::f32::consts::TAU / 8.0 + burst.age;
                let at = burst.origin + Vec2::new(angle.cos(), angle.sin()) * radius;
                renderer.fill_rect(
                    Rect::new(at.x - size / 2.0, at.y - size / 2.0, size, size),
                    burst.color,
                );
            }
        }
    }
}

impl Scene for DinnerScene {
    fn name(&self) -> &'static str {
        SceneId::Dinner.name()
    }

    fn start(&mut self, assets: &mut Assets) -> Result<(), String> {
        self.world = match &self.config.map {
            Some(relative) => assets.map(relative, &self.config.map_options),
            None => CollisionWorld::default(),
        };
        if self.world.obstacles.is_empty() {
            for table in &self.config.tables {
                self.world.add_obstacle(*table);
            }
        }
        self.world
            .add_boundary_walls(self.config.bounds, self.config.wall_thickness);

        self.actors.clear();
        let scale = self.player.scale;
        for (name, start) in [(GUEST, self.config.guest_start), (HOST, self.config.host_start)] {
            let actor = Actor::new(name, point(start), Facing::Up)
                .with_hitboxes(self.config.hitboxes)
                .with_scale(scale)
                .with_animations(assets.character(name));
            self.actors.insert(actor);
        }
        let head_only = Hitboxes {
            head: self.config.hitboxes.head,
            body: None,
        };
        for relative in &self.config.relatives {
            let key = relative.name.to_ascii_lowercase();
            let actor = Actor::new(relative.name.clone(), point(relative.position), Facing::Down)
                .with_hitboxes(head_only)
                .with_scale(scale)
                .with_animations(assets.character(&key));
            self.actors.insert(actor);
        }

        self.phase = DinnerPhase::Roam;
        self.meeting = Cutscene::default();
        self.emotes.clear();
        self.proposal = None;
        self.bursts.clear();
        self.beat.cancel();
        self.contact = None;
        self.dialogue.hide();
        Ok(())
    }

    fn update(&mut self, dt: f32, input: &InputState) -> SceneCommand {
        let frame_us = dt_us(dt);
        for actor in self.actors.iter_mut() {
            actor.update_animation(frame_us);
        }
        self.gate.tick(dt);
        if input.is_just_pressed(Key::Space) && self.contact.is_none() {
            self.gate.try_advance(&mut self.dialogue);
        }

        let mut command = SceneCommand::Continue;
        match self.phase {
            DinnerPhase::Roam => {
                if input.is_just_pressed(Key::P) {
                    self.begin_meeting();
                } else {
                    self.roam(dt, input);
                }
            }
            DinnerPhase::Meeting => {
                let signals = self.meeting.update(dt, &mut self.actors, &mut self.dialogue);
                for signal in signals {
                    match signal.as_str() {
                        "emotes" => self.start_emotes(),
                        "propose" => self.open_proposal(),
                        other => log::debug!("Unhandled dinner signal '{other}'"),
                    }
                }
            }
            DinnerPhase::Proposal => {
                let delta = input.movement_direction() * self.config.cursor_speed * dt;
                let confirm = input.is_just_pressed(Key::Enter) || input.is_just_pressed(Key::Space);
                let mut accepted = false;
                if let Some(proposal) = self.proposal.as_mut() {
                    proposal.steer(delta, self.config.no_repel_radius, self.config.bounds);
                    accepted = confirm && proposal.accepts();
                }
                if accepted {
                    self.start_fireworks();
                }
            }
            DinnerPhase::Fireworks => {
                for burst in &mut self.bursts {
                    burst.age += dt;
                }
                if self.beat.tick(dt) {
                    self.bursts.clear();
                    self.beat.start(self.config.afterglow_duration);
                    self.phase = DinnerPhase::Afterglow;
                }
            }
            DinnerPhase::Afterglow => {
                if self.beat.tick(dt) {
                    self.phase = DinnerPhase::Done;
                    command = SceneCommand::Transition {
                        message: self.config.closing_message.clone(),
                        next: None,
                    };
                }
            }
            DinnerPhase::Done => {}
        }

        self.update_emotes(dt);
        self.face_guest();
        command
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let b = self.config.bounds;
        renderer.fill_rect(b, [150, 120, 100, 255]);
        for table in &self.config.tables {
            renderer.fill_rect(*table, [240, 235, 225, 255]);
        }

        self.actors.draw(renderer);
        self.dialogue
            .draw(renderer, Rect::new(b.x + 40.0, b.bottom() - 160.0, b.w - 80.0, 120.0));
        if let Some(proposal) = &self.proposal {
            self.draw_proposal(proposal, renderer);
        }
        self.draw_bursts(renderer);
        if self.phase == DinnerPhase::Afterglow {
            renderer.draw_text(&self.config.afterglow_message, b.center().x - 80.0, b.y + 80.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> DinnerScene {
        let config = DinnerConfig {
            map: None,
            ..DinnerConfig::default()
        };
        let mut scene = DinnerScene::new(config, &GameConfig::default());
        let mut assets = Assets::new(std::env::temp_dir().join("oa_dinner_test_assets_missing"));
        scene.start(&mut assets).expect("start");
        scene
    }

    fn press(scene: &mut DinnerScene, key: Key, dt: f32) -> SceneCommand {
        let mut input = InputState::new();
        input.key_down(key);
        scene.update(dt, &input)
    }

    fn guest(scene: &DinnerScene) -> &Actor {
        scene.actors().get(GUEST).expect("guest")
    }

    fn place_guest(scene: &mut DinnerScene, x: f32, y: f32) {
        scene.actors.get_mut(GUEST).expect("guest").position = Vec2::new(x, y);
    }

    /// Run the meeting through its dialogue.
    fn finish_meeting(scene: &mut DinnerScene) {
        press(scene, Key::P, 0.1);
        for _ in 0..400 {
            if scene.phase() != DinnerPhase::Meeting {
                return;
            }
            if scene.dialogue.is_showing() {
                press(scene, Key::Space, 0.5);
            } else {
                scene.update(0.1, &InputState::new());
            }
        }
        panic!("meeting never finished");
    }

    #[test]
    fn everyone_is_seated_at_start() {
        let scene = started();
        assert_eq!(scene.actors().len(), 8);
        assert_eq!(guest(&scene).position, Vec2::new(512.0, 640.0));
        assert_eq!(scene.actors().get("Gio").expect("gio").position, Vec2::new(802.0, 516.0));
        assert!(scene.actors().get("Mom").expect("mom").body_box().is_none());
    }

    #[test]
    fn bumping_a_relative_shows_their_line() {
        let mut scene = started();
        // Oresti's head spans x 526..574, y 526..566.
        place_guest(&mut scene, 502.0, 568.0);
        press(&mut scene, Key::W, 0.1);

        assert_eq!(guest(&scene).position, Vec2::new(502.0, 568.0));
        assert_eq!(
            scene.dialogue().current_line(),
            Some("Oresti: Oh so you can play a video game but you can't play DND? Just kidding, you did well kiddo")
        );

        // Walking away closes it.
        for _ in 0..5 {
            press(&mut scene, Key::S, 0.1);
        }
        assert!(!scene.dialogue().is_showing());
    }

    #[test]
    fn relatives_face_the_guest_but_never_up() {
        let mut scene = started();
        place_guest(&mut scene, 100.0, 700.0);
        scene.update(0.1, &InputState::new());
        assert_eq!(scene.actors().get("Mom").expect("mom").facing, Facing::Down);
        assert_eq!(scene.actors().get("Gio").expect("gio").facing, Facing::Left);

        place_guest(&mut scene, 900.0, 100.0);
        scene.update(0.1, &InputState::new());
        assert_eq!(scene.actors().get("Gio").expect("gio").facing, Facing::Right);
        assert_eq!(scene.actors().get("Mom").expect("mom").facing, Facing::Right);
    }

    #[test]
    fn meeting_brings_host_and_starts_emotes() {
        let mut scene = started();
        press(&mut scene, Key::P, 0.1);
        assert_eq!(scene.phase(), DinnerPhase::Meeting);

        let mut guard = 0;
        while !scene.dialogue.is_showing() {
            scene.update(0.1, &InputState::new());
            guard += 1;
            assert!(guard < 200, "host never arrived");
        }
        assert_eq!(guest(&scene).position, Vec2::new(482.0, 620.0));
        let host = scene.actors().get(HOST).expect("host");
        assert_eq!(host.position, Vec2::new(542.0, 620.0));
        assert_eq!(host.facing, Facing::Left);
        assert_eq!(scene.dialogue().current_line(), Some(MEETING_LINES[0]));

        // First relative emotes at once, later ones are staggered.
        assert!(scene.is_emoting("Mom"));
        assert!(!scene.is_emoting("Marisa"));
        for _ in 0..32 {
            scene.update(0.1, &InputState::new());
        }
        assert!(scene.is_emoting("Marisa"));
        assert!(!scene.is_emoting("Mom"));
        assert!(!scene.actors().get("Mom").expect("mom").pose_locked);
    }

    #[test]
    fn meeting_ends_in_proposal_where_no_cannot_be_chosen() {
        let mut scene = started();
        finish_meeting(&mut scene);
        assert_eq!(scene.phase(), DinnerPhase::Proposal);
        assert!(scene.actors().get(HOST).expect("host").pose_locked);
        assert!(!scene.dialogue().is_showing());

        let proposal = scene.proposal().expect("proposal box").clone();
        assert!(proposal.accepts());

        // Push toward NO: the cursor is shoved back every step.
        for _ in 0..40 {
            press(&mut scene, Key::Right, 0.1);
            let cursor = scene.proposal().expect("proposal box").cursor;
            assert!(!proposal.no.contains_point(cursor));
        }
        let cursor = scene.proposal().expect("proposal box").cursor;
        assert!(cursor.x > proposal.yes.right() && cursor.x < proposal.no.left());
        press(&mut scene, Key::Enter, 0.1);
        assert_eq!(scene.phase(), DinnerPhase::Proposal);

        for _ in 0..3 {
            press(&mut scene, Key::Left, 0.1);
        }
        assert!(scene.proposal().expect("proposal box").accepts());
        press(&mut scene, Key::Enter, 0.1);
        assert_eq!(scene.phase(), DinnerPhase::Fireworks);
        assert!(scene.proposal().is_none());
    }

    #[test]
    fn fireworks_then_afterglow_then_closing() {
        let mut scene = started();
        finish_meeting(&mut scene);
        press(&mut scene, Key::Space, 0.1);
        assert_eq!(scene.phase(), DinnerPhase::Fireworks);

        let idle = InputState::new();
        for _ in 0..59 {
            assert_eq!(scene.update(0.1, &idle), SceneCommand::Continue);
        }
        let mut list = crate::render::DrawList::new();
        scene.draw(&mut list);
        assert!(list.commands.len() > 12 * 8);
        assert_eq!(scene.phase(), DinnerPhase::Fireworks);

        scene.update(0.1, &idle);
        assert_eq!(scene.phase(), DinnerPhase::Afterglow);
        let mut list = crate::render::DrawList::new();
        scene.draw(&mut list);
        assert!(list.texts().any(|t| t == "That went well."));

        for _ in 0..29 {
            assert_eq!(scene.update(0.1, &idle), SceneCommand::Continue);
        }
        assert_eq!(
            scene.update(0.1, &idle),
            SceneCommand::Transition {
                message: DinnerConfig::default().closing_message,
                next: None,
            }
        );
        assert_eq!(scene.phase(), DinnerPhase::Done);
        assert_eq!(scene.update(0.1, &idle), SceneCommand::Continue);
    }

    #[test]
    fn enter_does_not_start_the_meeting() {
        let mut scene = started();
        press(&mut scene, Key::Enter, 0.1);
        assert_eq!(scene.phase(), DinnerPhase::Roam);
    }
}
