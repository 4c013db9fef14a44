/// Pure game-state operations.
///
/// Every public function takes an immutable reference to the current
/// `GameState` (and, where the spawn/economy policy rolls dice, an RNG
/// handle) and returns a brand-new `GameState`.  Side effects are limited
/// to the injected RNG.  Invalid input — an unknown id, an operation fired
/// in the wrong phase — yields the input state unchanged, never an error.

use rand::Rng;

use crate::entities::{
    Alien, AlienTier, BlastColor, EntityId, Explosion, GameState, Particle, Phase, Powerup,
    PowerupKind, Vec3, ALIEN_KINDS,
};

// ── Spawn / economy policy ────────────────────────────────────────────────────

/// Seconds on the countdown at the start of every level.
pub const LEVEL_SECONDS: i32 = 60;
/// Damage dealt to an alien per capture hit.
pub const CAPTURE_DAMAGE: i32 = 100;
/// Score penalty when an alien survives its full lifetime.
pub const MISS_PENALTY: i32 = 50;
/// Seconds of invulnerability after a damage instance applies.
pub const INVULN_WINDOW: f64 = 1.0;
/// Concurrent explosion cap; the oldest is dropped on overflow.
pub const EXPLOSION_CAP: usize = 20;
/// Seconds an explosion stays in the state before the frame sweep removes it.
pub const EXPLOSION_TTL: f64 = 1.0;
/// Seconds an uncollected powerup stays in the world.
pub const POWERUP_DESPAWN: f64 = 15.0;
/// Seconds a collected powerup effect lasts.
pub const POWERUP_DURATION: f64 = 10.0;

/// Every n-th spawn (by running count) is a boss.
const BOSS_CADENCE: u32 = 10;
const TANK_CHANCE: f64 = 0.15;
const INVISIBLE_CHANCE: f64 = 0.15;
/// Chance for a non-boss spawn to divert into a powerup drop instead.
const POWERUP_CHANCE: f64 = 0.20;
/// Spawn annulus around the player, in metres.
const SPAWN_RADIUS_MIN: f32 = 5.0;
const SPAWN_RADIUS_MAX: f32 = 10.0;
/// Spawn height band, roughly eye level.
const SPAWN_HEIGHT_MIN: f32 = -0.2;
const SPAWN_HEIGHT_MAX: f32 = 0.3;
/// Speed multiplier while slow-motion is active.
const SLOW_MOTION_FACTOR: f32 = 0.5;
/// Debris particles rolled per explosion.
const PARTICLES_PER_EXPLOSION: usize = 20;
/// Points per alien destroyed by the ultimate sweep.
const ULTIMATE_POINTS: i32 = 50;

fn health_for(tier: AlienTier) -> i32 {
    match tier {
        AlienTier::Boss => 500,
        AlienTier::Tank => 300,
        _ => 100,
    }
}

/// Score awarded per alien captured.
fn score_for(tier: AlienTier) -> i32 {
    match tier {
        AlienTier::Boss => 1000,
        AlienTier::Tank => 300,
        _ => 100,
    }
}

/// Bosses get a flat level-scaled speed; everyone else adds random jitter.
fn roll_speed(tier: AlienTier, level: u32, rng: &mut impl Rng) -> f32 {
    let level = level as f32;
    match tier {
        AlienTier::Boss => 0.7 + level * 0.1,
        AlienTier::Tank => 0.4 + rng.gen_range(0.0..1.5) + level * 0.25,
        _ => 0.6 + rng.gen_range(0.0..1.5) + level * 0.25,
    }
}

// ── Session lifecycle ─────────────────────────────────────────────────────────

/// Build the idle state the composition root starts from.
pub fn new_session(high_score: i32) -> GameState {
    GameState {
        phase: Phase::Idle,
        score: 0,
        level: 1,
        time_remaining: LEVEL_SECONDS,
        captured_count: 0,
        spawn_count: 0,
        high_score,
        aliens: Vec::new(),
        explosions: Vec::new(),
        powerups: Vec::new(),
        active_powerup: None,
        ultimate_charge: 0,
        last_damage_time: None,
        clock: 0.0,
        next_id: 0,
    }
}

/// Reset every session scalar and collection and enter play.  Only the
/// high score, the session clock and the id mint survive.
pub fn start_game(state: &GameState) -> GameState {
    GameState {
        phase: Phase::Playing,
        clock: state.clock,
        next_id: state.next_id,
        ..new_session(state.high_score)
    }
}

/// Flip between playing and paused; inert in any other phase.  Entities
/// and timer progress are untouched — the tick logic elsewhere is what
/// honors the pause.
pub fn toggle_pause(state: &GameState) -> GameState {
    let phase = match state.phase {
        Phase::Playing => Phase::Paused,
        Phase::Paused => Phase::Playing,
        other => other,
    };
    GameState {
        phase,
        ..state.clone()
    }
}

/// Zero the best score.  The frontend persists the reset.
pub fn reset_high_score(state: &GameState) -> GameState {
    GameState {
        high_score: 0,
        ..state.clone()
    }
}

/// Advance to the next level: fresh timer, cleared world, same score.
/// Meaningful only from `LevelComplete`; no guard is enforced.
pub fn next_level(state: &GameState) -> GameState {
    GameState {
        phase: Phase::Playing,
        level: state.level + 1,
        time_remaining: LEVEL_SECONDS,
        aliens: Vec::new(),
        explosions: Vec::new(),
        powerups: Vec::new(),
        ..state.clone()
    }
}

/// Count the level timer down.  Hitting zero completes the level — the
/// world is cleared and any active powerup ends with it.  Also the point
/// where an outlived powerup effect is switched off.
pub fn update_time(state: &GameState, delta: i32) -> GameState {
    if state.phase != Phase::Playing {
        return state.clone();
    }

    let remaining = state.time_remaining - delta;
    if remaining <= 0 {
        // Time's up ends the level, not the run.
        return GameState {
            phase: Phase::LevelComplete,
            time_remaining: 0,
            aliens: Vec::new(),
            explosions: Vec::new(),
            powerups: Vec::new(),
            active_powerup: None,
            ..state.clone()
        };
    }

    let active_powerup = match state.active_powerup {
        Some((_, expiry)) if state.clock > expiry => None,
        other => other,
    };

    GameState {
        time_remaining: remaining,
        active_powerup,
        ..state.clone()
    }
}

// ── Combat / economy ──────────────────────────────────────────────────────────

fn award(state: &GameState, points: i32) -> (i32, i32) {
    let score = state.score + points;
    (score, state.high_score.max(score))
}

/// Apply contact damage to the score.  Level 1 is a no-penalty tutorial
/// zone, and a 1-second invulnerability window swallows repeat hits.
pub fn take_damage(state: &GameState, amount: i32) -> GameState {
    if state.phase != Phase::Playing || state.level <= 1 {
        return state.clone();
    }
    if let Some(last) = state.last_damage_time {
        if state.clock - last < INVULN_WINDOW {
            return state.clone();
        }
    }

    let score = state.score - amount;
    GameState {
        score,
        phase: if score < 0 { Phase::GameOver } else { state.phase },
        last_damage_time: Some(state.clock),
        ..state.clone()
    }
}

/// Remove an alien whose lifetime expired.  Removal is id-guarded so a
/// repeated or racing call cannot double-penalize; the penalty itself is
/// waived outside play and in the level-1 safe zone.
pub fn miss_alien(state: &GameState, id: EntityId) -> GameState {
    if !state.aliens.iter().any(|a| a.id == id) {
        return state.clone();
    }
    let aliens: Vec<Alien> = state.aliens.iter().filter(|a| a.id != id).cloned().collect();

    if state.phase != Phase::Playing || state.level <= 1 {
        return GameState {
            aliens,
            ..state.clone()
        };
    }

    let score = state.score - MISS_PENALTY;
    GameState {
        aliens,
        score,
        phase: if score < 0 { Phase::GameOver } else { state.phase },
        ..state.clone()
    }
}

/// Land a capture hit on an alien.  A kill explodes it, scores it by tier
/// and bumps the capture tally; a survivor just keeps its reduced health.
pub fn capture_alien(state: &GameState, id: EntityId, rng: &mut impl Rng) -> GameState {
    let Some(index) = state.aliens.iter().position(|a| a.id == id) else {
        return state.clone();
    };

    let alien = &state.aliens[index];
    let health = alien.health - CAPTURE_DAMAGE;

    if health > 0 {
        let mut aliens = state.aliens.clone();
        aliens[index].health = health;
        return GameState {
            aliens,
            ..state.clone()
        };
    }

    let color = if alien.tier == AlienTier::Boss {
        BlastColor::Crimson
    } else {
        BlastColor::Amber
    };
    let points = score_for(alien.tier);
    let position = alien.position;

    let state = trigger_explosion(state, position, color, rng);
    let (score, high_score) = award(&state, points);
    let aliens: Vec<Alien> = state.aliens.iter().filter(|a| a.id != id).cloned().collect();
    GameState {
        aliens,
        score,
        high_score,
        captured_count: state.captured_count + 1,
        ..state
    }
}

// ── Spawning ──────────────────────────────────────────────────────────────────

/// Spawn one alien — or, 20% of the time for non-boss rolls, a powerup in
/// its place.  Inert outside play, so the cadence timer firing while
/// paused or between levels has no effect.
pub fn spawn_alien(state: &GameState, rng: &mut impl Rng) -> GameState {
    if state.phase != Phase::Playing {
        return state.clone();
    }

    let spawn_count = state.spawn_count + 1;
    let is_boss = spawn_count % BOSS_CADENCE == 0;

    let kind = ALIEN_KINDS[rng.gen_range(0..ALIEN_KINDS.len())];

    // Random position in an annulus around the player, near eye level.
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let radius = rng.gen_range(SPAWN_RADIUS_MIN..SPAWN_RADIUS_MAX);
    let position = [
        angle.cos() * radius,
        rng.gen_range(SPAWN_HEIGHT_MIN..SPAWN_HEIGHT_MAX),
        angle.sin() * radius,
    ];

    let tier = if is_boss {
        AlienTier::Boss
    } else if rng.gen_bool(TANK_CHANCE) {
        AlienTier::Tank
    } else if rng.gen_bool(INVISIBLE_CHANCE) {
        AlienTier::Invisible
    } else {
        AlienTier::Normal
    };

    // Powerup diversion: the spawn slot is spent either way, so the
    // running count (and with it the boss cadence) still advances.
    if !is_boss && rng.gen_bool(POWERUP_CHANCE) {
        let diverted = GameState {
            spawn_count,
            ..state.clone()
        };
        return spawn_powerup(&diverted, position, rng);
    }

    let slowed = matches!(state.active_powerup, Some((PowerupKind::SlowMotion, _)));
    let speed = roll_speed(tier, state.level, rng)
        * if slowed { SLOW_MOTION_FACTOR } else { 1.0 };

    let alien = Alien {
        id: EntityId(state.next_id),
        kind,
        position,
        speed,
        health: health_for(tier),
        tier,
        age: 0.0,
    };

    let mut aliens = state.aliens.clone();
    aliens.push(alien);
    GameState {
        spawn_count,
        aliens,
        next_id: state.next_id + 1,
        ..state.clone()
    }
}

// ── Explosions ────────────────────────────────────────────────────────────────

/// Enqueue a cosmetic explosion with freshly rolled debris, dropping the
/// oldest one past the concurrency cap.
pub fn trigger_explosion(
    state: &GameState,
    position: Vec3,
    color: BlastColor,
    rng: &mut impl Rng,
) -> GameState {
    let particles = (0..PARTICLES_PER_EXPLOSION)
        .map(|_| Particle {
            offset: [0.0; 3],
            velocity: [
                rng.gen_range(-2.5..2.5),
                rng.gen_range(-2.5..2.5),
                rng.gen_range(-2.5..2.5),
            ],
            scale: rng.gen_range(0.2..0.7),
        })
        .collect();

    let mut explosions = state.explosions.clone();
    explosions.push(Explosion {
        id: EntityId(state.next_id),
        position,
        color,
        created_at: state.clock,
        particles,
    });
    if explosions.len() > EXPLOSION_CAP {
        explosions.remove(0);
    }

    GameState {
        explosions,
        next_id: state.next_id + 1,
        ..state.clone()
    }
}

pub fn remove_explosion(state: &GameState, id: EntityId) -> GameState {
    GameState {
        explosions: state
            .explosions
            .iter()
            .filter(|e| e.id != id)
            .cloned()
            .collect(),
        ..state.clone()
    }
}

// ── Powerups ──────────────────────────────────────────────────────────────────

pub fn spawn_powerup(state: &GameState, position: Vec3, rng: &mut impl Rng) -> GameState {
    let kind = if rng.gen_bool(0.5) {
        PowerupKind::RapidFire
    } else {
        PowerupKind::SlowMotion
    };

    let mut powerups = state.powerups.clone();
    powerups.push(Powerup {
        id: EntityId(state.next_id),
        kind,
        position,
        created_at: state.clock,
    });

    GameState {
        powerups,
        next_id: state.next_id + 1,
        ..state.clone()
    }
}

/// Turn a world powerup into the active session effect for 10 seconds.
pub fn collect_powerup(state: &GameState, id: EntityId) -> GameState {
    let Some(powerup) = state.powerups.iter().find(|p| p.id == id) else {
        return state.clone();
    };
    let kind = powerup.kind;

    GameState {
        powerups: state
            .powerups
            .iter()
            .filter(|p| p.id != id)
            .cloned()
            .collect(),
        active_powerup: Some((kind, state.clock + POWERUP_DURATION)),
        ..state.clone()
    }
}

pub fn remove_powerup(state: &GameState, id: EntityId) -> GameState {
    GameState {
        powerups: state
            .powerups
            .iter()
            .filter(|p| p.id != id)
            .cloned()
            .collect(),
        ..state.clone()
    }
}

// ── Ultimate ──────────────────────────────────────────────────────────────────

/// Destroy every live alien at once: one cyan blast each, 50 points each,
/// all credited as captures.  No charge precondition.
pub fn trigger_ultimate(state: &GameState, rng: &mut impl Rng) -> GameState {
    // Count and positions are taken before anything clears the list.
    let destroyed = state.aliens.len();
    let positions: Vec<Vec3> = state.aliens.iter().map(|a| a.position).collect();

    let mut next = state.clone();
    for position in positions {
        next = trigger_explosion(&next, position, BlastColor::Cyan, rng);
    }

    let (score, high_score) = award(&next, destroyed as i32 * ULTIMATE_POINTS);
    GameState {
        aliens: Vec::new(),
        score,
        high_score,
        captured_count: next.captured_count + destroyed as u32,
        ultimate_charge: 0,
        ..next
    }
}
