use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use starfall::{particle, FieldConfig, ParticleField, Particle, Point, SurfaceSize};

fn preset() -> impl Strategy<Value = FieldConfig> {
    prop_oneof![Just(FieldConfig::starry()), Just(FieldConfig::alert())]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn positions_stay_within_margins(
        config in preset(),
        seed in any::<u64>(),
        width in 1.0f32..2560.0,
        height in 1.0f32..1440.0,
        frames in 0usize..1500,
    ) {
        let margin = config.margin;
        let mut field = ParticleField::seeded(config, seed).unwrap();
        field.initialize(SurfaceSize::new(width, height));
        for _ in 0..frames {
            field.step();
            for p in field.particles() {
                prop_assert!(p.position.y >= -margin);
                prop_assert!(p.position.y <= height + margin);
            }
        }
    }

    #[test]
    fn rendered_opacity_is_clamped(
        config in preset(),
        base in 0.0f32..=1.0,
        phase in -1.0e7f32..1.0e7,
    ) {
        let p = Particle {
            position: Point::new(0.0, 0.0),
            radius: 1.0,
            fall_speed: 1.0,
            base_opacity: base,
            twinkle_phase: phase,
            twinkle_rate: 0.01,
        };
        let opacity = particle::rendered_opacity(&p, &config);
        prop_assert!((0.1..=1.0).contains(&opacity), "opacity {}", opacity);
    }

    #[test]
    fn reset_samples_from_configured_ranges(
        config in preset(),
        seed in any::<u64>(),
        width in 1.0f32..4000.0,
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let size = SurfaceSize::new(width, 600.0);
        let mut p = particle::spawn(&config, size, &mut rng);
        particle::reset(&mut p, &config, size, &mut rng);
        prop_assert_eq!(p.position.y, -config.margin);
        prop_assert!(p.position.x >= 0.0 && p.position.x < width);
        prop_assert!(config.size_range.contains(p.radius));
        prop_assert!(config.speed_range.contains(p.fall_speed));
    }
}

#[test]
fn long_runs_keep_opacity_clamped() {
    let mut field = ParticleField::seeded(FieldConfig::starry(), 77).unwrap();
    field.initialize(SurfaceSize::new(320.0, 10_000.0));
    for _ in 0..20_000 {
        field.step();
    }
    for p in field.particles() {
        let opacity = particle::rendered_opacity(p, field.config());
        assert!((0.1..=1.0).contains(&opacity));
    }
}
