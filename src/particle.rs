use rand::Rng;

use crate::{
    canvas::{Canvas, Paint, Point, SurfaceSize},
    config::FieldConfig,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Point,
    pub radius: f32,
    pub fall_speed: f32,
    pub base_opacity: f32,
    /// Unbounded; only ever fed through `sin`.
    pub twinkle_phase: f32,
    pub twinkle_rate: f32,
}

/// Creates a particle already in mid-fall, somewhere in `[0, height)`.
pub fn spawn<R: Rng + ?Sized>(config: &FieldConfig, size: SurfaceSize, rng: &mut R) -> Particle {
    let mut particle = Particle {
        position: Point::default(),
        radius: 0.0,
        fall_speed: 0.0,
        base_opacity: 0.0,
        twinkle_phase: 0.0,
        twinkle_rate: 0.0,
    };
    reset(&mut particle, config, size, rng);
    particle.position.y = sample_below(size.height, rng);
    particle
}

/// Respawns the particle just above the top edge with fresh attributes.
pub fn reset<R: Rng + ?Sized>(particle: &mut Particle, config: &FieldConfig, size: SurfaceSize, rng: &mut R) {
    particle.position = Point::new(sample_below(size.width, rng), -config.margin);
    particle.radius = config.size_range.sample(rng);
    particle.fall_speed = config.speed_range.sample(rng);
    particle.base_opacity = config.opacity_range.sample(rng);
    particle.twinkle_rate = config.twinkle_rate_range.sample(rng);
    particle.twinkle_phase = 0.0;
}

/// Moves the particle one frame down. Returns `true` when it fell past the
/// bottom margin and was recycled.
pub fn advance<R: Rng + ?Sized>(particle: &mut Particle, config: &FieldConfig, size: SurfaceSize, rng: &mut R) -> bool {
    particle.position.y += particle.fall_speed;
    particle.twinkle_phase += particle.twinkle_rate;
    if particle.position.y > size.height + config.margin {
        reset(particle, config, size, rng);
        true
    } else {
        false
    }
}

pub fn rendered_opacity(particle: &Particle, config: &FieldConfig) -> f32 {
    let twinkled = particle.base_opacity + particle.twinkle_phase.sin() * config.twinkle_amplitude;
    // NaN (phase overflowed to infinity) maps to the floor too.
    if twinkled.is_nan() {
        return config.opacity_floor;
    }
    twinkled.clamp(config.opacity_floor, 1.0)
}

pub fn has_sparkle(particle: &Particle, config: &FieldConfig) -> bool {
    particle.radius > config.sparkle_threshold
}

/// Glow scales with the radius so the largest particle gets the full blur.
pub fn glow(particle: &Particle, config: &FieldConfig) -> f32 {
    let largest = config.size_range.max;
    if largest > 0.0 {
        config.glow_blur * (particle.radius / largest).min(1.0)
    } else {
        config.glow_blur
    }
}

pub fn draw<C: Canvas + ?Sized>(particle: &Particle, config: &FieldConfig, canvas: &mut C) {
    let paint = Paint {
        color: config.color,
        alpha: rendered_opacity(particle, config),
        glow: glow(particle, config),
        line_width: config.sparkle_line_width,
    };
    let Point { x, y } = particle.position;
    canvas.fill_circle(particle.position, particle.radius, &paint);

    if has_sparkle(particle, config) {
        let arm = particle.radius * config.sparkle_reach;
        let stroke = Paint { glow: 0.0, ..paint };
        canvas.stroke_line(Point::new(x - arm, y), Point::new(x + arm, y), &stroke);
        canvas.stroke_line(Point::new(x, y - arm), Point::new(x, y + arm), &stroke);
    }
}

fn sample_below<R: Rng + ?Sized>(limit: f32, rng: &mut R) -> f32 {
    if limit > 0.0 && limit.is_finite() {
        rng.gen_range(0.0..limit)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DisplayList, DrawCommand};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn particle_with_radius(radius: f32) -> Particle {
        Particle {
            position: Point::new(100.0, 50.0),
            radius,
            fall_speed: 1.0,
            base_opacity: 0.5,
            twinkle_phase: 0.0,
            twinkle_rate: 0.01,
        }
    }

    #[test]
    fn reset_places_particle_above_top_edge() {
        let config = FieldConfig::alert();
        let size = SurfaceSize::new(1024.0, 768.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut particle = particle_with_radius(9.0);
        particle.twinkle_phase = 42.0;
        for _ in 0..500 {
            reset(&mut particle, &config, size, &mut rng);
            assert_eq!(particle.position.y, -config.margin);
            assert!((0.0..1024.0).contains(&particle.position.x));
            assert!(config.size_range.contains(particle.radius));
            assert!(config.speed_range.contains(particle.fall_speed));
            assert!(config.opacity_range.contains(particle.base_opacity));
            assert!(config.twinkle_rate_range.contains(particle.twinkle_rate));
            assert_eq!(particle.twinkle_phase, 0.0);
        }
    }

    #[test]
    fn advance_falls_then_recycles() {
        let config = FieldConfig::starry();
        let size = SurfaceSize::new(200.0, 100.0);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut particle = particle_with_radius(1.0);
        particle.position.y = 108.5;

        assert!(!advance(&mut particle, &config, size, &mut rng));
        assert_eq!(particle.position.y, 109.5);
        assert!((particle.twinkle_phase - 0.01).abs() < 1e-6);
        assert_eq!(particle.radius, 1.0);

        // 110.5 > 100 + margin
        assert!(advance(&mut particle, &config, size, &mut rng));
        assert_eq!(particle.position.y, -config.margin);
        assert_eq!(particle.twinkle_phase, 0.0);
        assert!(config.size_range.contains(particle.radius));
    }

    #[test]
    fn opacity_is_floored_and_capped() {
        let config = FieldConfig::starry();
        let mut particle = particle_with_radius(1.0);

        particle.base_opacity = 0.2;
        particle.twinkle_phase = -std::f32::consts::FRAC_PI_2;
        assert_eq!(rendered_opacity(&particle, &config), 0.1);

        particle.base_opacity = 1.0;
        particle.twinkle_phase = std::f32::consts::FRAC_PI_2;
        assert_eq!(rendered_opacity(&particle, &config), 1.0);

        particle.twinkle_phase = f32::INFINITY;
        assert_eq!(rendered_opacity(&particle, &config), 0.1);
    }

    #[test]
    fn large_particles_sparkle() {
        let mut config = FieldConfig::alert();
        config.sparkle_threshold = 1.5;

        let mut canvas = DisplayList::new();
        draw(&particle_with_radius(2.6), &config, &mut canvas);
        assert_eq!((canvas.circle_count(), canvas.line_count()), (1, 2));

        let reach = 2.6 * config.sparkle_reach;
        match &canvas.commands()[1] {
            DrawCommand::Line { from, to, paint } => {
                assert_eq!(*from, Point::new(100.0 - reach, 50.0));
                assert_eq!(*to, Point::new(100.0 + reach, 50.0));
                assert_eq!(paint.line_width, config.sparkle_line_width);
            },
            other => panic!("expected horizontal arm, got {other:?}"),
        }

        let mut canvas = DisplayList::new();
        draw(&particle_with_radius(1.0), &config, &mut canvas);
        assert_eq!((canvas.circle_count(), canvas.line_count()), (1, 0));
    }

    #[test]
    fn infinite_surface_does_not_panic() {
        let config = FieldConfig::starry();
        let size = SurfaceSize { width: f32::INFINITY, height: 768.0, pixel_ratio: 1.0 };
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let p = spawn(&config, size, &mut rng);
        assert_eq!(p.position.x, 0.0);
        assert!((0.0..768.0).contains(&p.position.y));
    }

    #[test]
    fn glow_is_proportional_to_radius() {
        let config = FieldConfig::starry();
        assert_eq!(glow(&particle_with_radius(4.0), &config), config.glow_blur);
        assert_eq!(glow(&particle_with_radius(2.0), &config), config.glow_blur / 2.0);
    }
}
