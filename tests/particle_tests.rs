//! Particle Pool Tests
//!
//! Tests for:
//! - Warm-up allocation and the live/arena limits
//! - High-water mark stability across spawn/retire cycles
//! - Monotonic life decay and single retirement per activation
//! - Fixed-decay burst scenario (5 particles, decay 0.1, 10 ticks)
//! - Opacity tracking remaining life

use glam::Vec3;

use specter::particles::{ParticlePool, ParticleSettings};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn fixed_decay(max_particles: usize, decay: f32) -> ParticleSettings {
    ParticleSettings {
        max_particles,
        warm_up: 0,
        base_decay: decay,
        decay_jitter: 0.0,
        ..ParticleSettings::default()
    }
}

// ============================================================================
// Warm-up and limits
// ============================================================================

#[test]
fn warm_up_fills_reserve() {
    let pool = ParticlePool::new(ParticleSettings::default(), 1);
    assert_eq!(pool.live_count(), 0);
    assert_eq!(pool.reserve_count(), 100);
    assert_eq!(pool.allocated(), 100);
    assert_eq!(pool.high_water_mark(), 100);
}

#[test]
fn spawn_reuses_reserve_before_allocating() {
    let settings = ParticleSettings {
        max_particles: 20,
        warm_up: 8,
        ..ParticleSettings::default()
    };
    let mut pool = ParticlePool::new(settings, 2);

    pool.spawn(Vec3::ZERO, 1.0, 5);
    assert_eq!(pool.live_count(), 5);
    assert_eq!(pool.reserve_count(), 3);
    assert_eq!(pool.allocated(), 8, "reserve should be drained before new allocations");

    pool.spawn(Vec3::ZERO, 1.0, 5);
    assert_eq!(pool.live_count(), 10);
    assert_eq!(pool.reserve_count(), 0);
    assert_eq!(pool.allocated(), 10);
}

#[test]
fn live_count_never_exceeds_limit() {
    let settings = ParticleSettings {
        max_particles: 10,
        warm_up: 4,
        ..ParticleSettings::default()
    };
    let mut pool = ParticlePool::new(settings, 3);

    pool.spawn(Vec3::ZERO, 1.75, 25);
    assert_eq!(pool.live_count(), 10);
    assert_eq!(pool.allocated(), 10);

    pool.spawn(Vec3::ONE, 1.75, 3);
    assert_eq!(pool.live_count(), 10, "requests beyond the limit are dropped");
    assert_eq!(pool.allocated(), 10);
}

#[test]
fn high_water_mark_is_stable_across_cycles() {
    let mut pool = ParticlePool::new(fixed_decay(12, 0.25), 4);

    for cycle in 0..5 {
        pool.spawn(Vec3::new(cycle as f32, 0.0, 0.0), 1.0, 12);
        assert!(pool.live_count() <= 12);
        for _ in 0..4 {
            pool.tick(0.016);
            assert!(pool.allocated() <= pool.high_water_mark());
        }
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.reserve_count(), 12);
    }

    assert_eq!(pool.high_water_mark(), 12);
    assert_eq!(pool.allocated(), 12);
}

// ============================================================================
// Decay and retirement
// ============================================================================

#[test]
fn five_particle_burst_retires_after_ten_ticks() {
    let mut pool = ParticlePool::new(fixed_decay(250, 0.1), 5);
    pool.spawn(Vec3::ZERO, 0.0, 5);
    assert_eq!(pool.live_count(), 5);

    for p in pool.iter_live() {
        assert_eq!(p.position, Vec3::ZERO, "zero scatter spawns at the origin");
        assert!(approx(p.decay, 0.1));
        assert!(approx(p.life, 1.0));
    }

    let mut retired = 0;
    for _ in 0..9 {
        retired += pool.tick(0.016);
    }
    assert_eq!(retired, 0);
    assert_eq!(pool.live_count(), 5);
    for p in pool.iter_live() {
        assert!((p.life - 0.1).abs() < 1e-4, "life after 9 ticks: {}", p.life);
    }

    retired += pool.tick(0.016);
    assert_eq!(retired, 5);
    assert_eq!(pool.live_count(), 0);
    assert_eq!(pool.reserve_count(), 5);
}

#[test]
fn life_is_monotonic_until_retirement() {
    let mut pool = ParticlePool::new(fixed_decay(1, 0.07), 6);
    pool.spawn(Vec3::ZERO, 1.0, 1);

    let mut previous = 1.0_f32;
    let mut ticks = 0;
    while pool.live_count() == 1 {
        pool.tick(0.016);
        ticks += 1;
        if let Some(p) = pool.iter_live().next() {
            assert!(p.life < previous, "life went from {previous} to {}", p.life);
            assert!(p.life > 0.0);
            assert!(p.active);
            previous = p.life;
        }
        assert!(ticks <= 15, "particle never retired");
    }
    assert_eq!(ticks, 15);
}

#[test]
fn every_activation_retires_exactly_once() {
    let settings = ParticleSettings {
        max_particles: 40,
        warm_up: 10,
        base_decay: 0.05,
        decay_jitter: 0.03,
        ..ParticleSettings::default()
    };
    let mut pool = ParticlePool::new(settings, 7);

    let mut spawned = 0;
    let mut retired = 0;
    for frame in 0..120 {
        if frame % 5 == 0 && frame < 60 {
            let before = pool.live_count();
            pool.spawn(Vec3::ZERO, 1.75, 6);
            spawned += pool.live_count() - before;
        }
        retired += pool.tick(0.016);
        assert_eq!(pool.live_count() + pool.reserve_count(), pool.allocated());
    }

    assert_eq!(pool.live_count(), 0);
    assert_eq!(retired, spawned);
}

#[test]
fn opacity_follows_remaining_life() {
    let mut pool = ParticlePool::new(fixed_decay(5, 0.1), 8);
    pool.spawn(Vec3::ZERO, 0.5, 5);
    pool.tick(0.016);
    pool.tick(0.016);

    for p in pool.iter_live() {
        assert!(approx(p.opacity, p.life * 0.85), "opacity {} for life {}", p.opacity, p.life);
    }
}

#[test]
fn clear_returns_everything_to_reserve() {
    let mut pool = ParticlePool::new(fixed_decay(30, 0.01), 9);
    pool.spawn(Vec3::ZERO, 1.0, 30);
    pool.clear();

    assert_eq!(pool.live_count(), 0);
    assert_eq!(pool.reserve_count(), 30);
    assert_eq!(pool.iter_live().count(), 0);
    assert_eq!(pool.tick(0.016), 0);
}
