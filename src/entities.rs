/// All game entity types — pure data, no logic.

/// A point in scene space, in metres.  The player viewpoint is the origin.
pub type Vec3 = [f32; 3];

/// Opaque entity identifier, minted from `GameState::next_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlienKind {
    Kralithor,
    Xylophont,
    Zyrephon,
    Myrmelux,
    Vorvakul,
    Verwak,
    Dyrekx,
}

/// The closed species set; spawn rolls pick uniformly from this table.
pub const ALIEN_KINDS: [AlienKind; 7] = [
    AlienKind::Kralithor,
    AlienKind::Xylophont,
    AlienKind::Zyrephon,
    AlienKind::Myrmelux,
    AlienKind::Vorvakul,
    AlienKind::Verwak,
    AlienKind::Dyrekx,
];

/// Alien strength tier.  One closed enum instead of a boss flag plus an
/// optional variant tag, so combinations like boss+tank cannot exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlienTier {
    Normal,
    Tank,
    Invisible,
    Boss,
}

#[derive(Clone, Debug)]
pub struct Alien {
    pub id: EntityId,
    pub kind: AlienKind,
    pub position: Vec3,
    /// Chase speed in units/sec (before the per-frame chase factor).
    pub speed: f32,
    /// Strictly positive while the alien is in the state; the operation
    /// that drops it to zero or below also removes the alien.
    pub health: i32,
    pub tier: AlienTier,
    /// Seconds alive; drives the time-to-live expiry.
    pub age: f32,
}

/// Explosion palette, keyed by what caused the blast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlastColor {
    /// Ordinary alien destroyed.
    Amber,
    /// Boss destroyed.
    Crimson,
    /// Ultimate sweep.
    Cyan,
}

/// One cosmetic debris particle.  Offset is relative to the explosion
/// centre; velocity is rolled once at creation.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub offset: Vec3,
    pub velocity: Vec3,
    /// Base visual scale; the renderer shrinks it linearly to zero.
    pub scale: f32,
}

#[derive(Clone, Debug)]
pub struct Explosion {
    pub id: EntityId,
    pub position: Vec3,
    pub color: BlastColor,
    /// Engine-clock seconds at creation; the removal deadline derives from it.
    pub created_at: f64,
    pub particles: Vec<Particle>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerupKind {
    /// Held capture input re-fires automatically.
    RapidFire,
    /// Alien spawn speeds are halved.
    SlowMotion,
}

#[derive(Clone, Debug)]
pub struct Powerup {
    pub id: EntityId,
    pub kind: PowerupKind,
    pub position: Vec3,
    /// Engine-clock seconds at creation; the despawn sweep keys off it.
    pub created_at: f64,
}

/// Session phase.  One closed state machine instead of four mutually
/// constraining booleans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Before the first mission starts.
    Idle,
    Playing,
    Paused,
    /// The countdown hit zero; waiting for the next level.
    LevelComplete,
    /// Score went negative; waiting for a restart.
    GameOver,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire game state.  Cloneable so pure update functions can return a
/// new copy without mutating the original.  Owned by the composition root;
/// every other component sees read-only snapshots.
#[derive(Clone, Debug)]
pub struct GameState {
    pub phase: Phase,
    /// May go negative transiently; a negative score ends the run.
    pub score: i32,
    pub level: u32,
    /// Seconds left on the level countdown.
    pub time_remaining: i32,
    pub captured_count: u32,
    /// Running spawn counter; every 10th spawn is a boss.
    pub spawn_count: u32,
    /// The best score seen so far (updated live, persisted by the frontend).
    pub high_score: i32,
    pub aliens: Vec<Alien>,
    pub explosions: Vec<Explosion>,
    pub powerups: Vec<Powerup>,
    /// Active powerup effect and the engine-clock second it expires, if any.
    pub active_powerup: Option<(PowerupKind, f64)>,
    /// 0 to 100.
    pub ultimate_charge: u8,
    /// Engine-clock second of the last damage that actually applied; drives
    /// the invulnerability window and the damage feedback in the frontend.
    pub last_damage_time: Option<f64>,
    /// Monotonic session clock in seconds, advanced by the frame driver.
    /// Never reset, so stored deadlines stay valid across restarts.
    pub clock: f64,
    /// Id mint for every entity kind.
    pub next_id: u64,
}
