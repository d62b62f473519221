use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::{
    canvas::{Canvas, SurfaceSize},
    config::FieldConfig,
    error::Result,
    particle::{self, Particle},
};

/// A fixed pool of falling particles and the random source that reseeds them.
#[derive(Debug, Clone)]
pub struct ParticleField<R = ChaCha8Rng> {
    config: FieldConfig,
    rng: R,
    size: SurfaceSize,
    particles: Vec<Particle>,
    frames: u64,
    resets: u64,
}

impl ParticleField<ChaCha8Rng> {
    /// Reproducible field: the same seed gives the same animation.
    pub fn seeded(config: FieldConfig, seed: u64) -> Result<Self> {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy(config: FieldConfig) -> Result<Self> {
        Self::new(config, ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> ParticleField<R> {
    pub fn new(config: FieldConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            size: SurfaceSize::new(0.0, 0.0),
            particles: Vec::new(),
            frames: 0,
            resets: 0,
        })
    }

    /// Allocates the pool for `size`, replacing any previous one.
    pub fn initialize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.frames = 0;
        self.resets = 0;
        let Self { config, rng, particles, .. } = self;
        particles.clear();
        particles.reserve_exact(config.count);
        for _ in 0..config.count {
            particles.push(particle::spawn(config, size, rng));
        }
    }

    /// Moves every particle one frame, recycling the ones that fell out.
    pub fn step(&mut self) {
        let Self { config, rng, size, particles, .. } = self;
        let mut recycled = 0u64;
        for p in particles.iter_mut() {
            if particle::advance(p, config, *size, rng) {
                recycled += 1;
            }
        }
        self.resets += recycled;
        self.frames += 1;
        trace!(frame = self.frames, recycled, "advanced particle field");
    }

    /// Clears the canvas and paints every particle.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.clear();
        for p in &self.particles {
            particle::draw(p, &self.config, canvas);
        }
    }

    pub fn advance_frame<C: Canvas + ?Sized>(&mut self, canvas: &mut C) {
        self.step();
        self.draw(canvas);
    }

    /// New surface dimensions. Particles keep their positions; the ones now
    /// outside the surface come back on their next respawn.
    pub fn apply_resize(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Particles recycled since `initialize`.
    pub fn resets(&self) -> u64 {
        self.resets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DisplayList;

    #[test]
    fn initialize_seeds_pool_mid_fall() {
        let mut config = FieldConfig::alert();
        config.size_range = crate::config::Span::new(0.5, 3.0);
        let mut field = ParticleField::seeded(config, 99).unwrap();
        field.initialize(SurfaceSize::new(1024.0, 768.0));

        assert_eq!(field.particles().len(), 80);
        for p in field.particles() {
            assert!((0.0..768.0).contains(&p.position.y), "y = {}", p.position.y);
            assert!((0.0..1024.0).contains(&p.position.x), "x = {}", p.position.x);
            assert!((0.5..3.0).contains(&p.radius));
        }
    }

    #[test]
    fn advance_frame_repaints_whole_pool() {
        let mut field = ParticleField::seeded(FieldConfig::starry(), 5).unwrap();
        field.initialize(SurfaceSize::new(640.0, 480.0));
        let mut canvas = DisplayList::new();

        field.advance_frame(&mut canvas);
        field.advance_frame(&mut canvas);

        assert_eq!(canvas.clears(), 2);
        assert_eq!(canvas.circle_count(), 150);
        let sparkling = field.particles().iter().filter(|p| p.radius > 2.0).count();
        assert_eq!(canvas.line_count(), sparkling * 2);
        assert_eq!(field.frames(), 2);
    }

    #[test]
    fn same_seed_same_animation() {
        let run = |seed| {
            let mut field = ParticleField::seeded(FieldConfig::alert(), seed).unwrap();
            field.initialize(SurfaceSize::new(300.0, 200.0));
            for _ in 0..400 {
                field.step();
            }
            field.particles().to_vec()
        };
        assert_eq!(run(11), run(11));
        assert_ne!(run(11), run(12));
    }

    #[test]
    fn resize_leaves_particles_alone() {
        let mut field = ParticleField::seeded(FieldConfig::starry(), 3).unwrap();
        field.initialize(SurfaceSize::new(1920.0, 1080.0));
        let before = field.particles().to_vec();

        field.apply_resize(SurfaceSize::new(320.0, 240.0));
        assert_eq!(field.particles(), before.as_slice());
        assert_eq!(field.size(), SurfaceSize::new(320.0, 240.0));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = FieldConfig::starry();
        config.count = 0;
        assert!(ParticleField::seeded(config, 0).is_err());
    }
}
