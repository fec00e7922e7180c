//! Frame-based sprite animation clips with blank-frame tolerant playback.
//!
//! Many character sheets pad trailing frames with fully transparent pixels so
//! every facing direction has the same frame count. A clip therefore carries a
//! precomputed `visible` flag per frame (filled in by the asset loader) and
//! never renders a blank frame while a visible one is available.
//!
//! All timing uses integer microseconds (`u64`) so playback advances the same
//! way on every platform under the fixed-timestep loop.

/// A single frame: an opaque sprite handle plus its precomputed visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationFrame {
    pub sprite_id: String,
    /// True when the frame has at least one non-transparent pixel.
    pub visible: bool,
}

impl AnimationFrame {
    pub fn new(sprite_id: impl Into<String>, visible: bool) -> Self {
        Self {
            sprite_id: sprite_id.into(),
            visible,
        }
    }
}

/// An ordered, timed sequence of frames with loop/hold semantics.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    frames: Vec<AnimationFrame>,
    pub frame_us: u64,
    pub looping: bool,
    authored_looping: bool,
    last_visible_index: Option<usize>,
    index: usize,
    elapsed_us: u64,
    last_seen_visible: Option<usize>,
    finished: bool,
}

impl AnimationClip {
    pub fn new(frames: Vec<AnimationFrame>, frame_us: u64, looping: bool) -> Self {
        let last_visible_index = frames.iter().rposition(|f| f.visible);
        let mut clip = Self {
            frames,
            frame_us,
            looping,
            authored_looping: looping,
            last_visible_index,
            index: 0,
            elapsed_us: 0,
            last_seen_visible: None,
            finished: false,
        };
        clip.reset();
        clip
    }

    /// Convenience constructor taking the per-frame duration in milliseconds.
    pub fn from_ms(frames: Vec<AnimationFrame>, frame_ms: u64, looping: bool) -> Self {
        Self::new(frames, frame_ms.saturating_mul(1000), looping)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    /// Last frame (scanning from the end) that has any visible pixel.
    pub fn last_visible_index(&self) -> Option<usize> {
        self.last_visible_index
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn has_visible_frame(&self) -> bool {
        self.last_visible_index.is_some()
    }

    /// Rewind to the first frame and restore the loop flag the clip was
    /// built with (`hold_last` clears it).
    pub fn reset(&mut self) {
        self.looping = self.authored_looping;
        self.index = 0;
        self.elapsed_us = 0;
        self.finished = false;
        self.last_seen_visible = match self.frames.first() {
            Some(frame) if frame.visible => Some(0),
            _ => None,
        };
    }

    /// Advance playback by `dt_us` microseconds.
    pub fn update(&mut self, dt_us: u64) {
        if self.finished || self.frames.len() <= 1 || self.frame_us == 0 {
            return;
        }

        self.elapsed_us = self.elapsed_us.saturating_add(dt_us);
        let last = self.frames.len() - 1;

        while self.elapsed_us >= self.frame_us {
            self.elapsed_us -= self.frame_us;

            if self.index >= last {
                if self.looping {
                    self.index = 0;
                } else {
                    self.index = last;
                    self.elapsed_us = 0;
                    self.finished = true;
                    break;
                }
            } else {
                self.index += 1;
            }

            if self.frames[self.index].visible {
                self.last_seen_visible = Some(self.index);
            }
        }
    }

    /// The frame to render for the current index.
    ///
    /// A fully transparent current frame is replaced by, in order: the last
    /// visible frame seen during playback, the nearest visible frame before
    /// the current index, the clip-wide last visible frame, and finally the
    /// raw current frame. Returns `None` only for an empty clip.
    pub fn current_frame(&self) -> Option<&AnimationFrame> {
        let frame = self.frames.get(self.index)?;
        if frame.visible {
            return Some(frame);
        }

        if let Some(seen) = self.last_seen_visible.and_then(|i| self.frames.get(i)) {
            return Some(seen);
        }

        if let Some(prev) = self.frames[..self.index].iter().rev().find(|f| f.visible) {
            return Some(prev);
        }

        if let Some(last) = self.last_visible_index.and_then(|i| self.frames.get(i)) {
            return Some(last);
        }

        Some(frame)
    }

    /// Freeze on the last visually non-empty frame and stop looping.
    pub fn hold_last(&mut self) {
        self.looping = false;
        self.elapsed_us = 0;
        self.finished = true;

        if self.frames.is_empty() {
            self.index = 0;
            return;
        }

        let start = self.last_visible_index.unwrap_or(self.frames.len() - 1);
        let chosen = (0..=start)
            .rev()
            .find(|&i| self.frames[i].visible)
            .unwrap_or(self.frames.len() - 1);

        self.index = chosen;
        if self.frames[chosen].visible {
            self.last_seen_visible = Some(chosen);
        }
    }
}
