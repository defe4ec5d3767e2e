//! Pixel-space presentation of companions: draw intents and glow lights.

use fr_core::host::{DrawIntent, DrawLayer, LightSink, RenderSink, Rgba, SpriteRect};
use fr_core::LightId;
use glam::Vec2;
use rand::Rng;

use crate::steering::Companion;

/// World pixels per tile.
pub const TILE_SIZE: f32 = 64.0;
/// Height the sprite hovers above its shadow, in pixels.
const HOVER_HEIGHT: f32 = 200.0;
/// Side of one sprite-sheet cell, in pixels.
const CELL: u32 = 16;
/// Sheet row of styles 5-8.
const SECOND_ROW_Y: u32 = 176;
const SHADOW_SCALE: f32 = 3.0;
const SPRITE_SCALE: f32 = 4.0;

/// Radius of each companion's glow.
pub const LIGHT_RADIUS: f32 = 3.0;
/// Soft blue glow shared by all companions.
pub const LIGHT_COLOR: Rgba = Rgba::new(0, 30, 150, 255);

/// Source rectangle for `style` (1-8) at animation `frame` (0-3).
pub fn sprite_rect(style: u8, frame: u8) -> SpriteRect {
    let style = u32::from(style.clamp(1, 8) - 1);
    let column = (style % 4) * 4 + u32::from(frame % 4);
    SpriteRect {
        x: column * CELL,
        y: if style < 4 { 0 } else { SECOND_ROW_Y },
        width: CELL,
        height: CELL,
    }
}

impl Companion {
    /// Bottom-centre of the companion's tile in world pixels.
    pub fn ground_position(&self) -> Vec2 {
        self.position() * TILE_SIZE + Vec2::new(TILE_SIZE / 2.0, TILE_SIZE)
    }

    /// Where the sprite and its glow are drawn: hovering above the ground,
    /// offset by bob and flutter.
    pub fn visual_position(&self) -> Vec2 {
        self.ground_position()
            + Vec2::new(
                self.flutter_phase.sin() * self.flutter_amplitude,
                -HOVER_HEIGHT + self.bob_phase.sin() * self.bob_amplitude,
            )
    }

    /// Shadow then sprite, sharing a depth so both are occluded together.
    pub fn draw_intents(&self) -> [DrawIntent; 2] {
        let ground = self.ground_position();
        let depth = (ground.y - 8.0) / 10_000.0 - 2e-6;
        [
            DrawIntent {
                layer: DrawLayer::Shadow,
                position: ground,
                source: None,
                scale: SHADOW_SCALE,
                flip_horizontal: false,
                depth,
            },
            DrawIntent {
                layer: DrawLayer::Companion,
                position: self.visual_position(),
                source: Some(sprite_rect(self.style(), self.frame())),
                scale: SPRITE_SCALE,
                flip_horizontal: self.facing_left(),
                depth: depth + 1e-6,
            },
        ]
    }

    /// Send both intents to `sink`.
    pub fn draw(&self, sink: &mut dyn RenderSink) {
        for intent in self.draw_intents() {
            sink.draw(intent);
        }
    }

    /// Glow key, if a light is attached.
    pub fn light_id(&self) -> Option<&LightId> {
        self.light.as_ref()
    }

    /// Create the glow light if there is none yet.
    pub fn attach_light(&mut self, lights: &mut dyn LightSink, rng: &mut impl Rng) {
        if self.light.is_some() {
            return;
        }
        let id = LightId::for_companion(self.id(), self.style(), rng.random_range(1000..10_000));
        lights.upsert(&id, self.visual_position(), LIGHT_RADIUS, LIGHT_COLOR);
        self.light = Some(id);
    }

    /// Move the glow to the current visual position.
    pub fn sync_light(&self, lights: &mut dyn LightSink) {
        if let Some(id) = &self.light {
            lights.upsert(id, self.visual_position(), LIGHT_RADIUS, LIGHT_COLOR);
        }
    }

    /// Remove the glow light.
    pub fn detach_light(&mut self, lights: &mut dyn LightSink) {
        if let Some(id) = self.light.take() {
            lights.remove(&id);
        }
    }
}
