//! Per-companion kinematics: wandering targets, curved pursuit, repulsion,
//! soft containment, facing and animation.
//!
//! Positions are continuous tile coordinates. A companion never reads the
//! registry itself; the caller hands it the start-of-tick positions of every
//! other companion, so update order between companions does not matter.

use std::f32::consts::{PI, TAU};

use fr_core::{CompanionId, LightId, Tile};
use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bob phase speed in radians per second.
const BOB_RATE: f32 = 2.2;
/// Flutter phase speed in radians per second.
const FLUTTER_RATE: f32 = 3.5;
/// Seconds per animation frame.
pub const FRAME_INTERVAL: f32 = 0.12;
/// Frames per style on the sprite sheet.
pub const FRAME_COUNT: u8 = 4;
/// Candidate targets tried before accepting a close one.
const TARGET_ATTEMPTS: u32 = 10;
/// Candidate directions with a sine below this are mirrored upward.
const DOWNWARD_LIMIT: f32 = -0.2;
/// Minimum vector length treated as a usable direction.
const MIN_DIRECTION: f32 = 0.1;

/// Motion tuning shared by every companion.
///
/// Lengths are in tiles, times in seconds, rates per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringParams {
    /// Slowest cruising speed.
    pub speed_min: f32,
    /// Fastest cruising speed.
    pub speed_max: f32,
    /// Remaining distance above which the companion steers toward its target.
    pub steer_epsilon: f32,
    /// Remaining distance below which the target counts as reached.
    pub arrival_distance: f32,
    /// How fast the heading blends toward the target direction.
    pub turn_rate: f32,
    /// Peak sideways rotation of the approach arc, in radians.
    pub arc_strength: f32,
    /// Peak flutter rotation, in radians.
    pub flutter_jitter: f32,
    /// Other companions closer than this push back.
    pub repel_radius: f32,
    /// Push strength per tile of overlap.
    pub repel_strength: f32,
    /// Distance from home beyond which containment pulls inward.
    pub roam_radius: f32,
    /// Fraction of the way home moved per tick while outside `roam_radius`.
    pub containment_pull: f32,
    /// Inner radius of the target annulus around home.
    pub target_min_radius: f32,
    /// Outer radius of the target annulus around home.
    pub target_max_radius: f32,
    /// Weight of the current heading when picking a new target angle.
    pub heading_bias: f32,
    /// Shortest time before a forced retarget.
    pub retarget_min_secs: f32,
    /// Longest time before a forced retarget.
    pub retarget_max_secs: f32,
    /// Pause after reaching a target; 0 keeps companions moving.
    pub arrival_pause_secs: f32,
    /// Exponential smoothing factor for horizontal motion.
    pub facing_smoothing: f32,
    /// Smoothed horizontal motion needed to prefer a side.
    pub facing_threshold: f32,
    /// How long a preferred side must persist before the sprite flips.
    pub facing_debounce_secs: f32,
}

impl Default for SteeringParams {
    fn default() -> Self {
        Self {
            speed_min: 0.25,
            speed_max: 0.5,
            steer_epsilon: 0.1,
            arrival_distance: 0.2,
            turn_rate: 0.35,
            arc_strength: 0.4,
            flutter_jitter: 0.03,
            repel_radius: 2.0,
            repel_strength: 0.14,
            roam_radius: 10.0,
            containment_pull: 0.02,
            target_min_radius: 8.0,
            target_max_radius: 10.0,
            heading_bias: 0.7,
            retarget_min_secs: 8.0,
            retarget_max_secs: 10.0,
            arrival_pause_secs: 0.0,
            facing_smoothing: 0.85,
            facing_threshold: 0.1,
            facing_debounce_secs: 0.18,
        }
    }
}

impl SteeringParams {
    fn retarget_delay(&self, rng: &mut impl Rng) -> f32 {
        uniform(rng, self.retarget_min_secs, self.retarget_max_secs)
    }
}

/// Render-facing view of a companion after its latest update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompanionSnapshot {
    /// Identity shared with the spawning resource unit.
    pub id: CompanionId,
    /// Ground position in tiles.
    pub position: Vec2,
    /// Whether the sprite is mirrored to face left.
    pub facing_left: bool,
    /// Current animation frame, 0-3.
    pub frame: u8,
    /// Visual style, 1-8.
    pub style: u8,
    /// Sprite position in world pixels, including hover, bob and flutter.
    pub visual_position: Vec2,
}

/// One roaming companion bound to a structure.
#[derive(Debug, Clone)]
pub struct Companion {
    id: CompanionId,
    home: Tile,
    position: Vec2,
    style: u8,
    speed: f32,

    target: Vec2,
    target_direction: Vec2,
    direction_progress: f32,
    velocity: Vec2,
    retarget_timer: f32,
    idle_timer: f32,

    smoothed_move_x: f32,
    facing_left: bool,
    facing_debounce: f32,

    pub(crate) bob_phase: f32,
    pub(crate) bob_amplitude: f32,
    pub(crate) flutter_phase: f32,
    pub(crate) flutter_amplitude: f32,
    frame: u8,
    frame_timer: f32,

    pub(crate) light: Option<LightId>,
}

impl Companion {
    /// Create a companion at `position`, roaming around `home`.
    ///
    /// Speed, bob/flutter amplitudes, phases and the first target are drawn
    /// from `rng`; they stay fixed for the companion's lifetime except the
    /// target.
    pub fn new(
        id: CompanionId,
        home: Tile,
        position: Vec2,
        style: u8,
        params: &SteeringParams,
        rng: &mut impl Rng,
    ) -> Self {
        let mut companion = Self {
            id,
            home,
            position,
            style,
            speed: 0.0,
            target: position,
            target_direction: Vec2::ZERO,
            direction_progress: 1.0,
            velocity: Vec2::ZERO,
            retarget_timer: 0.0,
            idle_timer: 0.0,
            smoothed_move_x: 0.0,
            facing_left: false,
            facing_debounce: 0.0,
            bob_phase: 0.0,
            bob_amplitude: 0.0,
            flutter_phase: 0.0,
            flutter_amplitude: 0.0,
            frame: 0,
            frame_timer: 0.0,
            light: None,
        };
        companion.pick_new_target(params, rng);
        companion.speed = uniform(rng, params.speed_min, params.speed_max);
        companion.bob_phase = rng.random::<f32>() * TAU;
        companion.bob_amplitude = uniform(rng, 8.0, 12.0);
        companion.flutter_phase = rng.random::<f32>() * TAU;
        companion.flutter_amplitude = uniform(rng, 2.0, 4.0);
        companion.retarget_timer = params.retarget_delay(rng);
        companion
    }

    /// Create a companion at its home tile.
    pub fn spawn_at_home(
        id: CompanionId,
        home: Tile,
        style: u8,
        params: &SteeringParams,
        rng: &mut impl Rng,
    ) -> Self {
        Self::new(id, home, home.as_vec2(), style, params, rng)
    }

    /// Identity shared with the spawning resource unit.
    pub fn id(&self) -> CompanionId {
        self.id
    }

    /// Tile of the owning structure.
    pub fn home(&self) -> Tile {
        self.home
    }

    /// Ground position in tiles.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Visual style, 1-8.
    pub fn style(&self) -> u8 {
        self.style
    }

    /// Cruising speed in tiles per second.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Current wander target.
    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Current animation frame.
    pub fn frame(&self) -> u8 {
        self.frame
    }

    /// Whether the sprite faces left.
    pub fn facing_left(&self) -> bool {
        self.facing_left
    }

    /// Whether the companion is paused in place.
    pub fn is_idle(&self) -> bool {
        self.idle_timer > 0.0
    }

    /// Distance from the home tile, in tiles.
    pub fn distance_from_home(&self) -> f32 {
        self.position.distance(self.home.as_vec2())
    }

    /// Hover in place for `seconds`, still bobbing and fluttering.
    pub fn pause(&mut self, seconds: f32) {
        self.idle_timer = self.idle_timer.max(seconds);
    }

    /// Render-facing view of the current state.
    pub fn snapshot(&self) -> CompanionSnapshot {
        CompanionSnapshot {
            id: self.id,
            position: self.position,
            facing_left: self.facing_left,
            frame: self.frame,
            style: self.style,
            visual_position: self.visual_position(),
        }
    }

    /// Advance one tick of `dt` seconds.
    ///
    /// `neighbours` are the start-of-tick positions of every other companion.
    pub fn update(
        &mut self,
        dt: f32,
        neighbours: impl IntoIterator<Item = Vec2>,
        params: &SteeringParams,
        rng: &mut impl Rng,
    ) {
        self.advance_frame(dt);

        if self.idle_timer > 0.0 {
            self.idle_timer -= dt;
            self.advance_phases(dt);
            return;
        }

        let to_target = self.target - self.position;
        let dist = to_target.length();
        let mut motion = Vec2::ZERO;

        if dist > params.steer_epsilon {
            if self.target_direction != Vec2::ZERO {
                self.direction_progress = (self.direction_progress + dt * params.turn_rate).min(1.0);
                let arc = (self.direction_progress * PI).sin() * params.arc_strength;
                let from = if self.velocity.length() > 0.0 {
                    self.velocity.normalize()
                } else {
                    self.target_direction
                };
                let base = from.lerp(self.target_direction, self.direction_progress);
                self.velocity = Vec2::from_angle(arc).rotate(base) * self.speed;
            } else if self.velocity == Vec2::ZERO {
                self.velocity = to_target / dist * self.speed;
            }

            let jitter = self.flutter_phase.sin() * params.flutter_jitter;
            self.velocity = Vec2::from_angle(jitter).rotate(self.velocity);
            motion = self.velocity;
            self.update_facing(motion.x, dt, params);
        }

        motion += repulsion(self.position, neighbours, params);

        if motion != Vec2::ZERO {
            let step = (self.speed * dt).min(dist);
            self.position += motion.normalize_or_zero() * step;
        }

        self.retarget_timer -= dt;
        if dist < params.arrival_distance || self.retarget_timer <= 0.0 {
            self.pick_new_target(params, rng);
            self.retarget_timer = params.retarget_delay(rng);
            if dist < params.arrival_distance && params.arrival_pause_secs > 0.0 {
                self.pause(params.arrival_pause_secs);
            }
        }

        self.advance_phases(dt);

        let home = self.home.as_vec2();
        if self.position.distance(home) > params.roam_radius {
            self.position += (home - self.position) * params.containment_pull;
        }
    }

    /// Choose a fresh wander target in the annulus around home.
    fn pick_new_target(&mut self, params: &SteeringParams, rng: &mut impl Rng) {
        let home = self.home.as_vec2();
        let forward = if self.velocity.length() > MIN_DIRECTION {
            self.velocity
        } else {
            self.position - home
        };

        let mut candidate;
        let mut attempts = 0;
        loop {
            let mut angle = rng.random::<f32>() * TAU;
            let radius = uniform(rng, params.target_min_radius, params.target_max_radius);
            if angle.sin() < DOWNWARD_LIMIT {
                angle = -angle;
            }
            if forward.length() > MIN_DIRECTION {
                let heading = forward.y.atan2(forward.x);
                angle = heading + wrap_angle(angle - heading) * (1.0 - params.heading_bias);
            }
            candidate = home + Vec2::from_angle(angle) * radius;
            attempts += 1;
            if candidate.distance(self.position) >= params.target_min_radius
                || attempts >= TARGET_ATTEMPTS
            {
                break;
            }
        }

        self.target = candidate;
        let to_target = self.target - self.position;
        if to_target.length() > MIN_DIRECTION {
            self.target_direction = to_target.normalize();
            self.direction_progress = 0.0;
        }
    }

    /// Debounced facing from smoothed horizontal motion.
    fn update_facing(&mut self, move_x: f32, dt: f32, params: &SteeringParams) {
        let k = params.facing_smoothing;
        self.smoothed_move_x = self.smoothed_move_x * k + move_x * (1.0 - k);
        let wants_left = self.smoothed_move_x > params.facing_threshold;
        let wants_right = self.smoothed_move_x < -params.facing_threshold;

        if (wants_left && !self.facing_left) || (wants_right && self.facing_left) {
            self.facing_debounce += dt;
            if self.facing_debounce > params.facing_debounce_secs {
                self.facing_left = wants_left;
                self.facing_debounce = 0.0;
            }
        } else {
            self.facing_debounce = 0.0;
        }
    }

    fn advance_phases(&mut self, dt: f32) {
        self.bob_phase = wrap_phase(self.bob_phase + dt * BOB_RATE);
        self.flutter_phase = wrap_phase(self.flutter_phase + dt * FLUTTER_RATE);
    }

    fn advance_frame(&mut self, dt: f32) {
        self.frame_timer += dt;
        while self.frame_timer >= FRAME_INTERVAL {
            self.frame = (self.frame + 1) % FRAME_COUNT;
            self.frame_timer -= FRAME_INTERVAL;
        }
    }
}

/// Sum of push-away vectors from neighbours inside the repel radius.
fn repulsion(
    position: Vec2,
    neighbours: impl IntoIterator<Item = Vec2>,
    params: &SteeringParams,
) -> Vec2 {
    neighbours
        .into_iter()
        .filter_map(|other| {
            let d = position.distance(other);
            (d < params.repel_radius && d > 0.01)
                .then(|| (position - other) / d * (params.repel_radius - d) * params.repel_strength)
        })
        .sum()
}

fn uniform(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    min + rng.random::<f32>() * (max - min)
}

fn wrap_phase(phase: f32) -> f32 {
    phase.rem_euclid(TAU)
}

/// Map an angle difference into `(-PI, PI]`.
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}
