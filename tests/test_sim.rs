use xenoscope::engine::{new_session, spawn_powerup, trigger_explosion};
use xenoscope::entities::*;
use xenoscope::sim::{frame, ALIEN_TTL, CONTACT_DAMAGE};

use rand::rngs::StdRng;
use rand::SeedableRng;

const ORIGIN: Vec3 = [0.0, 0.0, 0.0];

fn make_state() -> GameState {
    GameState {
        phase: Phase::Playing,
        ..new_session(0)
    }
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn alien_at(id: u64, position: Vec3, speed: f32) -> Alien {
    Alien {
        id: EntityId(id),
        kind: AlienKind::Zyrephon,
        position,
        speed,
        health: 100,
        tier: AlienTier::Normal,
        age: 0.0,
    }
}

// ── Clock ─────────────────────────────────────────────────────────────────────

#[test]
fn frame_advances_clock() {
    let s = make_state();
    let s2 = frame(&s, ORIGIN, 0.5);
    assert!((s2.clock - 0.5).abs() < 1e-9);
}

#[test]
fn clock_advances_while_paused_but_aliens_freeze() {
    let mut s = make_state();
    s.phase = Phase::Paused;
    s.aliens.push(alien_at(1, [0.0, 0.0, 8.0], 2.0));

    let s2 = frame(&s, ORIGIN, 0.5);
    assert!((s2.clock - 0.5).abs() < 1e-9);
    assert_eq!(s2.aliens[0].position, [0.0, 0.0, 8.0]);
    assert_eq!(s2.aliens[0].age, 0.0);
}

// ── Chase motion ──────────────────────────────────────────────────────────────

#[test]
fn alien_chases_the_player() {
    let mut s = make_state();
    s.aliens.push(alien_at(1, [0.0, 0.0, 8.0], 2.0));

    let s2 = frame(&s, ORIGIN, 0.1);
    let [x, _, z] = s2.aliens[0].position;
    // Step is speed × 0.5 × dt = 0.1 along −z.
    assert!((z - 7.9).abs() < 1e-3, "z was {}", z);
    assert!(x.abs() < 1e-3);
}

#[test]
fn wobble_is_deterministic() {
    let mut s = make_state();
    s.aliens.push(alien_at(1, [3.0, 0.0, 4.0], 1.5));
    s.aliens.push(alien_at(2, [-2.0, 0.1, 6.0], 0.9));

    let a = frame(&s, ORIGIN, 0.033);
    let b = frame(&s, ORIGIN, 0.033);
    for (left, right) in a.aliens.iter().zip(b.aliens.iter()) {
        assert_eq!(left.position, right.position);
    }
}

#[test]
fn aliens_age_each_frame() {
    let mut s = make_state();
    s.aliens.push(alien_at(1, [0.0, 0.0, 8.0], 1.0));
    let s2 = frame(&s, ORIGIN, 0.25);
    assert!((s2.aliens[0].age - 0.25).abs() < 1e-6);
}

// ── Lifetime expiry ───────────────────────────────────────────────────────────

#[test]
fn expired_alien_is_missed_once() {
    let mut s = make_state();
    s.level = 2;
    s.score = 100;
    let mut alien = alien_at(1, [0.0, 0.0, 6.0], 1.0);
    alien.age = ALIEN_TTL - 0.05;
    s.aliens.push(alien);

    let s2 = frame(&s, ORIGIN, 0.1);
    assert!(s2.aliens.is_empty());
    assert_eq!(s2.score, 50);

    // A later frame has nothing left to penalize.
    let s3 = frame(&s2, ORIGIN, 0.1);
    assert_eq!(s3.score, 50);
}

#[test]
fn expiry_is_free_in_level_one() {
    let mut s = make_state();
    s.score = 100;
    let mut alien = alien_at(1, [0.0, 0.0, 6.0], 1.0);
    alien.age = ALIEN_TTL - 0.05;
    s.aliens.push(alien);

    let s2 = frame(&s, ORIGIN, 0.1);
    assert!(s2.aliens.is_empty());
    assert_eq!(s2.score, 100);
}

// ── Proximity damage ──────────────────────────────────────────────────────────

#[test]
fn contact_applies_damage() {
    let mut s = make_state();
    s.level = 2;
    s.score = 100;
    s.aliens.push(alien_at(1, [0.0, 0.0, 0.5], 0.0));

    let s2 = frame(&s, ORIGIN, 0.033);
    assert_eq!(s2.score, 100 - CONTACT_DAMAGE);
    assert!(s2.last_damage_time.is_some());
}

#[test]
fn contact_is_throttled_by_the_invulnerability_window() {
    let mut s = make_state();
    s.level = 2;
    s.score = 100;
    s.aliens.push(alien_at(1, [0.0, 0.0, 0.5], 0.0));

    let s2 = frame(&s, ORIGIN, 0.033);
    let s3 = frame(&s2, ORIGIN, 0.033);
    assert_eq!(s3.score, 100 - CONTACT_DAMAGE); // second frame swallowed
}

#[test]
fn no_contact_beyond_range() {
    let mut s = make_state();
    s.level = 2;
    s.score = 100;
    s.aliens.push(alien_at(1, [0.0, 0.0, 5.0], 0.0));

    let s2 = frame(&s, ORIGIN, 0.033);
    assert_eq!(s2.score, 100);
}

// ── Expiry sweeps ─────────────────────────────────────────────────────────────

#[test]
fn explosion_removed_after_its_ttl() {
    let mut rng = seeded_rng();
    let mut s = make_state();
    s = trigger_explosion(&s, [1.0, 0.0, 1.0], BlastColor::Amber, &mut rng);
    s.clock = 0.95;

    let kept = frame(&s, ORIGIN, 0.01);
    assert_eq!(kept.explosions.len(), 1);

    let swept = frame(&s, ORIGIN, 0.1);
    assert!(swept.explosions.is_empty());
}

#[test]
fn powerup_removed_after_despawn_window() {
    let mut rng = seeded_rng();
    let mut s = make_state();
    s = spawn_powerup(&s, [1.0, 0.0, 1.0], &mut rng);
    s.clock = 14.95;

    let kept = frame(&s, ORIGIN, 0.01);
    assert_eq!(kept.powerups.len(), 1);

    let swept = frame(&s, ORIGIN, 0.1);
    assert!(swept.powerups.is_empty());
}

#[test]
fn sweeps_run_while_paused() {
    let mut rng = seeded_rng();
    let mut s = make_state();
    s = trigger_explosion(&s, [1.0, 0.0, 1.0], BlastColor::Cyan, &mut rng);
    s.clock = 1.5;
    s.phase = Phase::Paused;

    let s2 = frame(&s, ORIGIN, 0.033);
    assert!(s2.explosions.is_empty());
}

// ── Particle physics ──────────────────────────────────────────────────────────

#[test]
fn particles_drift_and_fall() {
    let mut s = make_state();
    s.explosions.push(Explosion {
        id: EntityId(1),
        position: [0.0, 0.0, 3.0],
        color: BlastColor::Amber,
        created_at: 0.0,
        particles: vec![Particle {
            offset: [0.0; 3],
            velocity: [1.0, 0.0, 0.0],
            scale: 0.5,
        }],
    });

    let s2 = frame(&s, ORIGIN, 0.5);
    let particle = &s2.explosions[0].particles[0];
    assert!((particle.offset[0] - 0.5).abs() < 1e-6);
    assert!((particle.velocity[1] + 1.0).abs() < 1e-6); // gravity pulled it down
}
