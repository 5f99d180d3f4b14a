//! Ash dissolve effect shown when a card is confirmed.
//!
//! A burst is a cloud of points that drifts as one body: every point keeps
//! its offset from the burst origin, the origin moves by a shared velocity,
//! and the velocity picks up horizontal turbulence each frame.

use glam::Vec3;
use rand::Rng;

/// Points per burst.
pub const ASH_COUNT: usize = 300;
/// Spread of the initial cloud around the origin.
pub const ASH_EXTENT: Vec3 = Vec3::new(2.0, 3.0, 1.0);
/// Life lost per frame.  A burst lasts 100 frames.
pub const ASH_DECAY: f32 = 0.01;
/// Peak-to-peak horizontal turbulence added to the velocity per frame.
pub const ASH_TURBULENCE: f32 = 0.005;

#[derive(Clone, Debug)]
pub struct AshBurst {
    pub origin:   Vec3,
    pub offsets:  Vec<Vec3>,
    /// Per-point size hint for the renderer, `0.0..0.1`.
    pub sizes:    Vec<f32>,
    pub velocity: Vec3,
    pub life:     f32,
}

impl AshBurst {
    pub fn new<R: Rng>(origin: Vec3, count: usize, rng: &mut R) -> Self {
        let mut centered = || rng.gen::<f32>() - 0.5;
        let offsets = (0..count)
            .map(|_| Vec3::new(centered(), centered(), centered()) * ASH_EXTENT)
            .collect();
        let sizes = (0..count).map(|_| rng.gen::<f32>() * 0.1).collect();
        let velocity = Vec3::new(
            (rng.gen::<f32>() - 0.5) * 0.02,
            rng.gen::<f32>() * 0.05 + 0.02,
            (rng.gen::<f32>() - 0.5) * 0.02,
        );

        AshBurst { origin, offsets, sizes, velocity, life: 1.0 }
    }

    /// Opacity follows remaining life.
    pub fn opacity(&self) -> f32 { self.life.clamp(0.0, 1.0) }

    pub fn is_dead(&self) -> bool { self.life <= 0.0 }

    /// World-space point positions.
    pub fn points(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.offsets.iter().map(move |o| self.origin + *o)
    }

    fn tick<R: Rng>(&mut self, rng: &mut R) {
        self.life -= ASH_DECAY;
        self.origin += self.velocity;
        self.velocity.x += (rng.gen::<f32>() - 0.5) * ASH_TURBULENCE;
        self.velocity.z += (rng.gen::<f32>() - 0.5) * ASH_TURBULENCE;
    }
}

/// All live bursts.
#[derive(Clone, Debug, Default)]
pub struct ParticleSystem {
    bursts: Vec<AshBurst>,
}

impl ParticleSystem {
    pub fn new() -> Self { ParticleSystem::default() }

    pub fn spawn_ash<R: Rng>(&mut self, at: Vec3, rng: &mut R) {
        self.bursts.push(AshBurst::new(at, ASH_COUNT, rng));
    }

    /// Advance one frame, dropping expired bursts.
    pub fn update<R: Rng>(&mut self, rng: &mut R) {
        for burst in &mut self.bursts {
            burst.tick(rng);
        }
        self.bursts.retain(|b| !b.is_dead());
    }

    pub fn bursts(&self) -> &[AshBurst] { &self.bursts }

    pub fn is_empty(&self) -> bool { self.bursts.is_empty() }

}
