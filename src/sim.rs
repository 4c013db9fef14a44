/// Per-frame simulation.
///
/// `frame` is the one entry point the render loop calls every frame.  Like
/// the engine operations it is pure: current state in, next state out.  It
/// advances the session clock, sweeps expired explosions and powerups, and
/// — only while the game is actually playing — runs the per-alien rules:
/// straight-line chase toward the player viewpoint, a deterministic wobble,
/// lifetime expiry, and proximity damage.  Scoring consequences are
/// delegated to the engine's own operations so the rules live in one place.

use crate::engine;
use crate::entities::{EntityId, GameState, Phase, Vec3};

/// Seconds an alien gets to reach the player before it counts as missed.
pub const ALIEN_TTL: f32 = 12.0;
/// Distance at which an alien starts dealing contact damage.
pub const CONTACT_RANGE: f32 = 1.2;
/// Damage per qualifying contact frame (the engine's invulnerability
/// window throttles how often it lands).
pub const CONTACT_DAMAGE: i32 = 10;
/// Chase speed is the alien's rolled speed scaled down by this factor.
const CHASE_FACTOR: f32 = 0.5;
const WOBBLE_AMPLITUDE: f32 = 0.002;
/// Constant downward acceleration on explosion debris.
const PARTICLE_GRAVITY: f32 = 2.0;
/// Seconds over which the renderer shrinks debris to nothing; finishes
/// inside the engine's 1-second removal window.
pub const PARTICLE_DECAY: f64 = 0.8;

/// Advance the simulation by one rendered frame.
pub fn frame(state: &GameState, player_pos: Vec3, dt: f32) -> GameState {
    let clock = state.clock + dt as f64;
    let mut next = GameState {
        clock,
        ..state.clone()
    };

    // Expiry sweeps model the wall-clock despawn timers, so they run even
    // while paused; the removal operations are phase-independent.
    let expired_explosions: Vec<EntityId> = next
        .explosions
        .iter()
        .filter(|e| clock - e.created_at >= engine::EXPLOSION_TTL)
        .map(|e| e.id)
        .collect();
    for id in expired_explosions {
        next = engine::remove_explosion(&next, id);
    }

    let expired_powerups: Vec<EntityId> = next
        .powerups
        .iter()
        .filter(|p| clock - p.created_at >= engine::POWERUP_DESPAWN)
        .map(|p| p.id)
        .collect();
    for id in expired_powerups {
        next = engine::remove_powerup(&next, id);
    }

    // Debris keeps falling regardless of phase; it is cosmetic decay, not
    // gameplay.
    for explosion in &mut next.explosions {
        for particle in &mut explosion.particles {
            particle.offset = add(particle.offset, scale(particle.velocity, dt));
            particle.velocity[1] -= PARTICLE_GRAVITY * dt;
        }
    }

    if next.phase != Phase::Playing {
        return next;
    }

    let mut expired = Vec::new();
    let mut contacts = 0u32;
    for alien in &mut next.aliens {
        // Straight-line pursuit of the viewpoint; no pathfinding.
        let to_player = sub(player_pos, alien.position);
        let dist = length(to_player);
        if dist > f32::EPSILON {
            let step = alien.speed * CHASE_FACTOR * dt;
            alien.position = add(alien.position, scale(to_player, step / dist));
        }

        // Wobble phase comes from the id, so motion is reproducible per
        // entity without extra state.
        alien.position[1] +=
            ((clock * 3.0) as f32 + wobble_phase(alien.id)).sin() * WOBBLE_AMPLITUDE;

        alien.age += dt;
        if alien.age > ALIEN_TTL {
            expired.push(alien.id);
        }
        if distance(alien.position, player_pos) < CONTACT_RANGE {
            contacts += 1;
        }
    }

    // Expired aliens are removed by the miss operation itself, so a second
    // firing for the same alien is impossible.
    for id in expired {
        next = engine::miss_alien(&next, id);
    }
    for _ in 0..contacts {
        next = engine::take_damage(&next, CONTACT_DAMAGE);
    }

    next
}

/// Per-alien wobble phase in [0, 2π), hashed from the id.
fn wobble_phase(id: EntityId) -> f32 {
    (id.0.wrapping_mul(0x9E37_79B9) % 628) as f32 * 0.01
}

// ── Small vector helpers ──────────────────────────────────────────────────────

pub fn distance(a: Vec3, b: Vec3) -> f32 {
    length(sub(a, b))
}

fn length(v: Vec3) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn scale(v: Vec3, s: f32) -> Vec3 {
    [v[0] * s, v[1] * s, v[2] * s]
}
