//! Gem entity: discrete kind plus continuous animation state.
//!
//! A gem is advanced once per tick by [`Gem::update`]. Instead of invoking callbacks it pushes
//! [`GemEvent`]s into a sink owned by the board, which keeps the animation queue's in-flight
//! counter and the grid in sync.

use crate::config::Tuning;
use crate::grid::{CellPos, Vec2};

/// Stable identity of a gem entity; survives moves between cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GemId(pub u32);

/// Match class of a gem, `0..K`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GemKind(pub u8);

/// Notifications produced while advancing a gem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GemEvent {
    /// The animation item currently driving this gem finished. Fired exactly once per item.
    AnimationCompleted(GemId),
    /// The destroy animation finished; the gem must be evicted from the grid.
    Removed(GemId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GemState {
    Idle,
    Selected,
    Translating,
    Matching,
    Destroyed,
}

/// How the renderer should colour a gem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    Normal,
    Selected,
}

/// Per-gem drawing data handed to the renderer each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GemView {
    pub id: GemId,
    pub cell: CellPos,
    pub kind: GemKind,
    pub position: Vec2,
    /// Tilt in radians.
    pub rotation: f32,
    pub size_factor: f32,
    pub tint: Tint,
}

#[derive(Debug, Clone)]
pub struct Gem {
    id: GemId,
    /// `None` once destroyed.
    kind: Option<GemKind>,
    position: Vec2,
    target: Option<Vec2>,
    selected: bool,
    animating: bool,
    matching: bool,
    queued_for_match: bool,
    size_factor: f32,
    tilt_deg: f32,
    tilt_dir: f32,
}

impl Gem {
    pub fn new(id: GemId, kind: GemKind, position: Vec2) -> Self {
        Self {
            id,
            kind: Some(kind),
            position,
            target: None,
            selected: false,
            animating: false,
            matching: false,
            queued_for_match: false,
            size_factor: 1.0,
            tilt_deg: 0.0,
            tilt_dir: 1.0,
        }
    }

    #[inline]
    pub fn id(&self) -> GemId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> Option<GemKind> {
        self.kind
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Place the gem without animating.
    pub fn snap_to(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Where the gem is heading, or where it is when idle.
    pub fn destination(&self) -> Vec2 {
        self.target.unwrap_or(self.position)
    }

    #[inline]
    pub fn size_factor(&self) -> f32 {
        self.size_factor
    }

    /// Current tilt in degrees.
    #[inline]
    pub fn tilt_deg(&self) -> f32 {
        self.tilt_deg
    }

    #[inline]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    #[inline]
    pub fn is_matching(&self) -> bool {
        self.matching
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.kind.is_none()
    }

    #[inline]
    pub fn is_queued_for_match(&self) -> bool {
        self.queued_for_match
    }

    pub fn queue_for_match(&mut self) {
        self.queued_for_match = true;
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn state(&self) -> GemState {
        if self.kind.is_none() {
            GemState::Destroyed
        } else if self.matching {
            GemState::Matching
        } else if self.target.is_some() {
            GemState::Translating
        } else if self.selected {
            GemState::Selected
        } else {
            GemState::Idle
        }
    }

    /// Start a translation toward `destination`.
    pub fn move_to(&mut self, destination: Vec2) {
        self.animating = true;
        self.target = Some(destination);
    }

    /// Start the shrink-and-destroy animation.
    pub fn start_match(&mut self) {
        self.animating = true;
        self.matching = true;
    }

    /// Advance by `dt` seconds, pushing any notifications into `events`.
    pub fn update(&mut self, dt: f32, tuning: &Tuning, events: &mut Vec<GemEvent>) {
        if self.is_destroyed() {
            return;
        }
        self.update_tilt(dt, tuning);
        self.update_translation(dt, tuning, events);
        self.update_matching(dt, tuning, events);
    }

    fn update_tilt(&mut self, dt: f32, tuning: &Tuning) {
        if !self.selected {
            self.tilt_deg = 0.0;
            self.tilt_dir = 1.0;
            return;
        }
        let max = tuning.max_tilt_deg;
        self.tilt_deg += self.tilt_dir * tuning.tilt_speed_deg * dt;
        if self.tilt_deg > max {
            self.tilt_deg = max;
            self.tilt_dir = -1.0;
        } else if self.tilt_deg < -max {
            self.tilt_deg = -max;
            self.tilt_dir = 1.0;
        }
    }

    fn update_translation(&mut self, dt: f32, tuning: &Tuning, events: &mut Vec<GemEvent>) {
        let Some(target) = self.target else {
            return;
        };
        let step = tuning.translate_speed * dt;
        self.position.x = approach(self.position.x, target.x, step);
        self.position.y = approach(self.position.y, target.y, step);

        let snap = tuning.snap_threshold;
        if (target.x - self.position.x).abs() <= snap && (target.y - self.position.y).abs() <= snap
        {
            self.position = target;
            self.target = None;
            if self.animating && !self.matching {
                self.animating = false;
                self.selected = false;
                events.push(GemEvent::AnimationCompleted(self.id));
            }
        }
    }

    fn update_matching(&mut self, dt: f32, tuning: &Tuning, events: &mut Vec<GemEvent>) {
        if !self.matching {
            return;
        }
        self.size_factor = (self.size_factor - tuning.destroy_speed * dt).max(0.0);
        if self.size_factor < tuning.destroy_threshold {
            if self.animating {
                events.push(GemEvent::AnimationCompleted(self.id));
            }
            self.animating = false;
            self.matching = false;
            self.selected = false;
            self.kind = None;
            events.push(GemEvent::Removed(self.id));
        }
    }

    /// Drawing data; `None` once destroyed.
    pub fn view(&self, cell: CellPos) -> Option<GemView> {
        let kind = self.kind?;
        Some(GemView {
            id: self.id,
            cell,
            kind,
            position: self.position,
            rotation: self.tilt_deg.to_radians(),
            size_factor: self.size_factor,
            tint: if self.selected {
                Tint::Selected
            } else {
                Tint::Normal
            },
        })
    }
}

/// Move `from` toward `to` by at most `step`, never overshooting.
fn approach(from: f32, to: f32, step: f32) -> f32 {
    let diff = to - from;
    if diff.abs() <= step {
        to
    } else {
        from + step.copysign(diff)
    }
}
