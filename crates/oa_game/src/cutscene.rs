//! Scripted actor movement without player input.
//!
//! A cutscene is an ordered list of steps. Each step waits a fixed time,
//! walks one or more actors through waypoint groups ("substeps"), or waits for
//! the dialogue box to close. Effects attached to a step fire once when the
//! step activates and once when it completes. The next step activates on the
//! following update, so a step never starts in the frame its predecessor
//! finished.

use glam::Vec2;

use oa_core::time::seconds_to_us;

use crate::actor::{Actor, ActorSet, Facing};
use crate::dialogue::Dialogue;

/// Distance under which a walking actor counts as arrived.
pub const ARRIVAL_EPSILON: f32 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Face { actor: String, facing: Facing },
    Play { actor: String, clip: String },
    Hold { actor: String, clip: String },
    Place { actor: String, position: Vec2 },
    Say(Vec<String>),
    /// Named event handed back to the scene (e.g. start bystander emotes).
    Signal(String),
}

impl Effect {
    pub fn face(actor: &str, facing: Facing) -> Self {
        Self::Face {
            actor: actor.to_string(),
            facing,
        }
    }

    pub fn play(actor: &str, clip: &str) -> Self {
        Self::Play {
            actor: actor.to_string(),
            clip: clip.to_string(),
        }
    }

    pub fn hold(actor: &str, clip: &str) -> Self {
        Self::Hold {
            actor: actor.to_string(),
            clip: clip.to_string(),
        }
    }

    pub fn place(actor: &str, position: Vec2) -> Self {
        Self::Place {
            actor: actor.to_string(),
            position,
        }
    }

    pub fn say(lines: &[&str]) -> Self {
        Self::Say(lines.iter().map(|l| l.to_string()).collect())
    }

    pub fn signal(name: &str) -> Self {
        Self::Signal(name.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    pub actor: String,
    pub target: Vec2,
    /// Overrides the step speed for this actor.
    pub speed: Option<f32>,
}

impl Move {
    pub fn new(actor: &str, target: Vec2) -> Self {
        Self {
            actor: actor.to_string(),
            target,
            speed: None,
        }
    }

    pub fn at_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    Wait { seconds: f32 },
    Walk { speed: f32, substeps: Vec<Vec<Move>> },
    AwaitDialogue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CutsceneStep {
    pub kind: StepKind,
    pub on_start: Vec<Effect>,
    pub on_complete: Vec<Effect>,
}

impl CutsceneStep {
    fn with_kind(kind: StepKind) -> Self {
        Self {
            kind,
            on_start: Vec::new(),
            on_complete: Vec::new(),
        }
    }

    pub fn wait(seconds: f32) -> Self {
        Self::with_kind(StepKind::Wait { seconds })
    }

    /// All moves happen at once.
    pub fn walk(speed: f32, moves: Vec<Move>) -> Self {
        Self::walk_path(speed, vec![moves])
    }

    /// Waypoint groups walked in order.
    pub fn walk_path(speed: f32, substeps: Vec<Vec<Move>>) -> Self {
        Self::with_kind(StepKind::Walk { speed, substeps })
    }

    pub fn await_dialogue() -> Self {
        Self::with_kind(StepKind::AwaitDialogue)
    }

    pub fn on_start(mut self, effect: Effect) -> Self {
        self.on_start.push(effect);
        self
    }

    pub fn on_complete(mut self, effect: Effect) -> Self {
        self.on_complete.push(effect);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Cutscene {
    steps: Vec<CutsceneStep>,
    step: usize,
    substep: usize,
    /// Time spent in a wait step, in whole microseconds.
    elapsed_us: u64,
    started: bool,
}

impl Cutscene {
    pub fn new(steps: Vec<CutsceneStep>) -> Self {
        Self {
            steps,
            step: 0,
            substep: 0,
            elapsed_us: 0,
            started: false,
        }
    }

    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn substep_index(&self) -> usize {
        self.substep
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Exhausted: every step has completed.
    pub fn is_finished(&self) -> bool {
        self.step >= self.steps.len()
    }

    /// Advance the current step. Returns the signals raised this update.
    pub fn update(
        &mut self,
        dt: f32,
        actors: &mut ActorSet,
        dialogue: &mut dyn Dialogue,
    ) -> Vec<String> {
        let mut signals = Vec::new();
        let Some(step) = self.steps.get(self.step) else {
            return signals;
        };

        if !self.started {
            self.started = true;
            log::debug!("Cutscene step {} started", self.step);
            apply_effects(&step.on_start, actors, dialogue, &mut signals);
        }

        let complete = match &step.kind {
            StepKind::Wait { seconds } => {
                self.elapsed_us = self
                    .elapsed_us
                    .saturating_add(seconds_to_us(f64::from(dt)));
                self.elapsed_us >= seconds_to_us(f64::from(*seconds))
            }
            StepKind::Walk { speed, substeps } => match substeps.get(self.substep) {
                Some(moves) => {
                    if advance_moves(moves, *speed, dt, actors) {
                        self.substep += 1;
                    }
                    self.substep >= substeps.len()
                }
                None => true,
            },
            StepKind::AwaitDialogue => !dialogue.is_showing(),
        };

        if complete {
            apply_effects(&step.on_complete, actors, dialogue, &mut signals);
            log::debug!("Cutscene step {} complete", self.step);
            self.step += 1;
            self.substep = 0;
            self.elapsed_us = 0;
            self.started = false;
            if self.is_finished() {
                log::info!("Cutscene finished after {} steps", self.steps.len());
            }
        }

        signals
    }
}

/// Move every actor in the group toward its target. True once all arrived.
fn advance_moves(moves: &[Move], step_speed: f32, dt: f32, actors: &mut ActorSet) -> bool {
    let mut all_arrived = true;
    for mv in moves {
        let Some(actor) = actors.get_mut(&mv.actor) else {
            log::warn!("Cutscene move for missing actor '{}' skipped", mv.actor);
            continue;
        };

        let to_target = mv.target - actor.position;
        let distance = to_target.length();
        let travel = mv.speed.unwrap_or(step_speed) * dt;

        if distance < ARRIVAL_EPSILON || travel >= distance {
            actor.position = mv.target;
            if actor.moving {
                actor.set_motion(None, false);
            }
            continue;
        }

        let dir = to_target / distance;
        actor.position += dir * travel;
        actor.set_motion(Facing::from_direction(dir), true);
        all_arrived = false;
    }
    all_arrived
}

fn apply_effects(
    effects: &[Effect],
    actors: &mut ActorSet,
    dialogue: &mut dyn Dialogue,
    signals: &mut Vec<String>,
) {
    for effect in effects {
        match effect {
            Effect::Face { actor, facing } => {
                if let Some(a) = actor_or_warn(actors, actor) {
                    a.set_motion(Some(*facing), false);
                }
            }
            Effect::Play { actor, clip } => {
                if let Some(a) = actor_or_warn(actors, actor) {
                    a.anim.play(clip);
                }
            }
            Effect::Hold { actor, clip } => {
                if let Some(a) = actor_or_warn(actors, actor) {
                    a.anim.hold_last(clip);
                    a.pose_locked = true;
                }
            }
            Effect::Place { actor, position } => {
                if let Some(a) = actor_or_warn(actors, actor) {
                    a.position = *position;
                }
            }
            Effect::Say(lines) => dialogue.show(lines.clone()),
            Effect::Signal(name) => signals.push(name.clone()),
        }
    }
}

fn actor_or_warn<'a>(actors: &'a mut ActorSet, name: &str) -> Option<&'a mut Actor> {
    let actor = actors.get_mut(name);
    if actor.is_none() {
        log::warn!("Cutscene effect for missing actor '{}' skipped", name);
    }
    actor
}
