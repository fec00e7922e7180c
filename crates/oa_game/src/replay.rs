use oa_core::input::{InputEvent, Key};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Scripted keyboard input for headless runs.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f64,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    /// Keys held for every repeat of this frame.
    #[serde(default)]
    pub held: Vec<String>,
    /// Keys tapped once, on the first repeat only.
    #[serde(default)]
    pub pressed: Vec<String>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

/// Keys down during one fixed step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayStep {
    pub held: Vec<Key>,
    /// Keys that must register as a fresh press this step even if they were
    /// already down.
    pub tapped: Vec<Key>,
}

impl ReplayStep {
    fn is_down(&self, key: Key) -> bool {
        self.held.contains(&key) || self.tapped.contains(&key)
    }

    fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.held
            .iter()
            .chain(self.tapped.iter().filter(|k| !self.held.contains(k)))
            .copied()
    }
}

impl ReplaySequence {
    pub fn expanded_steps(&self) -> Vec<ReplayStep> {
        let mut out = Vec::new();
        for frame in &self.frames {
            let held = parse_keys(&frame.held);
            let pressed = parse_keys(&frame.pressed);
            for i in 0..frame.repeat.max(1) {
                out.push(ReplayStep {
                    held: held.clone(),
                    tapped: if i == 0 { pressed.clone() } else { Vec::new() },
                });
            }
        }
        out
    }
}

fn parse_keys(names: &[String]) -> Vec<Key> {
    let mut keys = Vec::new();
    for key in names.iter().filter_map(|name| Key::from_name(name)) {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

/// Feeds a replay one step at a time as key transitions.
pub struct ReplayPlayer {
    steps: Vec<ReplayStep>,
    index: usize,
    down: Vec<Key>,
}

impl ReplayPlayer {
    pub fn new(replay: &ReplaySequence) -> Self {
        Self {
            steps: replay.expanded_steps(),
            index: 0,
            down: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.steps.len()
    }

    /// Events turning the previous step's keys into the next step's, or
    /// `None` once the script is exhausted.
    pub fn next_events(&mut self) -> Option<Vec<InputEvent>> {
        let step = self.steps.get(self.index)?;
        self.index += 1;

        let mut events = Vec::new();
        for &key in &self.down {
            if !step.is_down(key) || step.tapped.contains(&key) {
                events.push(InputEvent::KeyUp(key));
            }
        }
        let next: Vec<Key> = step.keys().collect();
        for &key in &next {
            if !self.down.contains(&key) || step.tapped.contains(&key) {
                events.push(InputEvent::KeyDown(key));
            }
        }
        self.down = next;
        Some(events)
    }

    /// Release whatever the last step left held.
    pub fn release_all(&mut self) -> Vec<InputEvent> {
        self.down.drain(..).map(InputEvent::KeyUp).collect()
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if !replay.fixed_dt.is_finite() || replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    for (index, frame) in replay.frames.iter().enumerate() {
        if let Some(name) = frame
            .held
            .iter()
            .chain(&frame.pressed)
            .find(|name| Key::from_name(name).is_none())
        {
            return Err(format!(
                "Replay validation failed: frame {index} uses unknown key '{name}'"
            ));
        }
    }
    Ok(())
}

const fn default_dt() -> f64 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}
