//! Falling-ember overlay shown while a match is in play.
//!
//! Purely decorative: the simulation lives here, the page's canvas loop
//! draws it. Each animation frame JS calls `tick()` then reads `frame()`,
//! a flat `[x, y, size, opacity, hue]` list per ember.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wasm_bindgen::prelude::*;

/// Floats per ember in [`EmberOverlay::frame`].
pub const EMBER_STRIDE: usize = 5;

const OPACITY_LOW: f32 = 0.1;
const OPACITY_HIGH: f32 = 0.9;
/// How far below the bottom edge an ember falls before respawning.
const RESPAWN_MARGIN: f32 = 20.0;

#[derive(Debug, Clone, PartialEq)]
struct Ember {
    x: f32,
    y: f32,
    size: f32,
    speed_x: f32,
    speed_y: f32,
    opacity: f32,
    flicker: f32,
    hue: f32,
}

impl Ember {
    /// Spawn somewhere above the viewport so embers trickle in.
    fn spawn(rng: &mut ChaCha8Rng, width: f32, height: f32) -> Self {
        Self {
            x: rng.gen_range(0.0..=width),
            y: -rng.gen_range(0.0..=height),
            size: rng.gen_range(0.5..3.0),
            speed_y: rng.gen_range(0.3..1.5),
            speed_x: rng.gen_range(-0.4..0.4),
            opacity: rng.gen_range(0.4..1.0),
            hue: rng.gen_range(10.0..35.0),
            flicker: rng.gen_range(0.005..0.025),
        }
    }

    fn step(&mut self) {
        self.y += self.speed_y;
        self.x += self.speed_x;
        self.opacity -= self.flicker;
        if self.opacity <= OPACITY_LOW || self.opacity >= OPACITY_HIGH {
            self.flicker = -self.flicker;
        }
    }
}

#[wasm_bindgen]
pub struct EmberOverlay {
    rng: ChaCha8Rng,
    width: f32,
    height: f32,
    count: usize,
    embers: Vec<Ember>,
}

#[wasm_bindgen]
impl EmberOverlay {
    /// `seed` makes the animation reproducible; pass `Date.now()` for variety.
    /// It is a JS Number, truncated to a whole non-negative value.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, count: usize, seed: f64) -> EmberOverlay {
        let mut overlay = EmberOverlay {
            rng: ChaCha8Rng::seed_from_u64(seed as u64),
            width: width.max(1.0),
            height: height.max(1.0),
            count,
            embers: Vec::with_capacity(count),
        };
        overlay.respawn_all();
        overlay
    }

    /// Viewport changed: start a fresh field at the new size.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
        self.respawn_all();
    }

    /// Advance every ember by one frame.
    pub fn tick(&mut self) {
        let (width, height) = (self.width, self.height);
        let limit = height + RESPAWN_MARGIN;
        let rng = &mut self.rng;
        for ember in &mut self.embers {
            ember.step();
            if ember.y > limit {
                *ember = Ember::spawn(rng, width, height);
            }
        }
    }

    pub fn frame(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.embers.len() * EMBER_STRIDE);
        for e in &self.embers {
            out.extend_from_slice(&[e.x, e.y, e.size, e.opacity, e.hue]);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.embers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embers.is_empty()
    }
}

impl EmberOverlay {
    fn respawn_all(&mut self) {
        self.embers.clear();
        for _ in 0..self.count {
            let ember = Ember::spawn(&mut self.rng, self.width, self.height);
            self.embers.push(ember);
        }
    }
}
