mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::{thread_rng, Rng};

use xenoscope::audio::{AudioManager, Cue};
use xenoscope::engine;
use xenoscope::entities::{EntityId, GameState, Phase, PowerupKind};
use xenoscope::sim;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// The viewpoint the aliens chase.  The scene is anchored on the player,
/// so it never moves.
const PLAYER_POS: [f32; 3] = [0.0, 0.0, 0.0];

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// Min frames between auto-repeated captures while Space is held under
/// rapid-fire.  3 frames @ 30 FPS ≈ the 100 ms repeat the powerup grants.
const RAPID_FIRE_COOLDOWN: u32 = 3;

/// Frames the ultimate key must stay held before it fires (≈500 ms).
const ULTIMATE_HOLD_FRAMES: u64 = 15;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

// ── High-score persistence ────────────────────────────────────────────────────

fn high_score_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".xenoscope_score")
}

fn load_high_score() -> i32 {
    std::fs::read_to_string(high_score_path())
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

fn save_high_score(score: i32) {
    let _ = std::fs::write(high_score_path(), score.to_string());
}

// ── Targeting ─────────────────────────────────────────────────────────────────

/// The capture action targets whichever alien is closest to the player —
/// the same one that is about to deal contact damage.
fn nearest_alien(state: &GameState) -> Option<EntityId> {
    state
        .aliens
        .iter()
        .min_by(|a, b| {
            let da = sim::distance(a.position, PLAYER_POS);
            let db = sim::distance(b.position, PLAYER_POS);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|a| a.id)
}

fn nearest_powerup(state: &GameState) -> Option<EntityId> {
    state
        .powerups
        .iter()
        .min_by(|a, b| {
            let da = sim::distance(a.position, PLAYER_POS);
            let db = sim::distance(b.position, PLAYER_POS);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|p| p.id)
}

fn capture_nearest(
    state: &GameState,
    rng: &mut impl Rng,
    audio: Option<&AudioManager>,
) -> GameState {
    let Some(id) = nearest_alien(state) else {
        return state.clone();
    };
    if let Some(audio) = audio {
        let rapid = matches!(state.active_powerup, Some((PowerupKind::RapidFire, _)));
        audio.play(if rapid { Cue::RapidCapture } else { Cue::Capture });
    }
    engine::capture_alien(state, id, rng)
}

// ── Fixed-period drivers ──────────────────────────────────────────────────────

/// Spawn cadence: starts at 1.2 s, tightens 100 ms per level, floors at
/// 300 ms.
fn spawn_period(level: u32) -> Duration {
    Duration::from_millis(1200u64.saturating_sub(level as u64 * 100).max(300))
}

/// Whether the ambient loop should be running: any live session, paused or
/// not, keeps it going.
fn session_active(phase: Phase) -> bool {
    !matches!(phase, Phase::Idle | Phase::GameOver)
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Input model: instead of acting on each key event individually, we
/// maintain a `key_frame` map that records the frame number of the last
/// press/repeat event for every key.  One-shot actions fire on a *fresh*
/// press only (so OS key-repeat doesn't machine-gun captures), while the
/// rapid-fire auto-repeat and the long-press ultimate read the held state
/// each frame.
fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<()> {
    let mut rng = thread_rng();
    // No output device just means a silent mission.
    let audio = AudioManager::new().ok();

    let mut persisted = load_high_score();
    let mut state = engine::new_session(persisted);

    // Maps each held key → the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut fire_cooldown: u32 = 0;
    let mut ult_hold_since: Option<u64> = None;
    let mut ult_fired = false;

    let mut countdown_acc = Duration::ZERO;
    let mut spawn_acc = Duration::ZERO;
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        let dt = frame_start - last_tick;
        last_tick = frame_start;
        frame += 1;

        let prev_damage = state.last_damage_time;
        let was_active = session_active(state.phase);

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent {
            code,
            kind,
            modifiers,
            ..
        })) = rx.try_recv()
        {
            match kind {
                KeyEventKind::Press => {
                    let fresh = !is_held(&key_frame, &code, frame);
                    key_frame.insert(code.clone(), frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(());
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        KeyCode::Enter
                            if matches!(state.phase, Phase::Idle | Phase::GameOver) =>
                        {
                            state = engine::start_game(&state);
                            if let Some(audio) = &audio {
                                audio.play(Cue::Start);
                            }
                        }
                        KeyCode::Char('p') | KeyCode::Char('P') => {
                            state = engine::toggle_pause(&state);
                        }
                        KeyCode::Char('n') | KeyCode::Char('N')
                            if state.phase == Phase::LevelComplete =>
                        {
                            state = engine::next_level(&state);
                        }
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if state.phase == Phase::Paused =>
                        {
                            state = engine::reset_high_score(&state);
                            persisted = 0;
                            save_high_score(0);
                        }
                        KeyCode::Char(' ') if fresh && state.phase == Phase::Playing => {
                            state = capture_nearest(&state, &mut rng, audio.as_ref());
                        }
                        KeyCode::Char('e') | KeyCode::Char('E')
                            if state.phase == Phase::Playing =>
                        {
                            if let Some(id) = nearest_powerup(&state) {
                                state = engine::collect_powerup(&state, id);
                            }
                        }
                        _ => {}
                    }
                }
                // Repeat: refresh timestamp so key stays "held"
                KeyEventKind::Repeat => {
                    key_frame.insert(code.clone(), frame);
                }
                // Release: remove key immediately (keyboard-enhancement path)
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Held-key actions ──────────────────────────────────────────────────
        if state.phase == Phase::Playing {
            // Rapid-fire: holding Space keeps capturing on a short cooldown.
            let rapid = matches!(state.active_powerup, Some((PowerupKind::RapidFire, _)));
            if rapid && fire_cooldown == 0 && is_held(&key_frame, &KeyCode::Char(' '), frame) {
                state = capture_nearest(&state, &mut rng, audio.as_ref());
                fire_cooldown = RAPID_FIRE_COOLDOWN;
            }

            // Ultimate: the long-press gesture, mapped to holding U.
            if is_held(&key_frame, &KeyCode::Char('u'), frame)
                || is_held(&key_frame, &KeyCode::Char('U'), frame)
            {
                let since = *ult_hold_since.get_or_insert(frame);
                if !ult_fired && frame.saturating_sub(since) >= ULTIMATE_HOLD_FRAMES {
                    state = engine::trigger_ultimate(&state, &mut rng);
                    ult_fired = true;
                }
            } else {
                ult_hold_since = None;
                ult_fired = false;
            }
        }
        fire_cooldown = fire_cooldown.saturating_sub(1);

        // ── Fixed-period drivers ──────────────────────────────────────────────
        // Both tick unconditionally; the operations' own phase gates make
        // firings inert while paused, complete or over.
        countdown_acc += dt;
        while countdown_acc >= Duration::from_secs(1) {
            countdown_acc -= Duration::from_secs(1);
            state = engine::update_time(&state, 1);
        }

        spawn_acc += dt;
        while spawn_acc >= spawn_period(state.level) {
            spawn_acc -= spawn_period(state.level);
            state = engine::spawn_alien(&state, &mut rng);
            // Higher levels roll extra spawn attempts on the same beat.
            for _ in 0..state.level / 3 {
                if rng.gen_bool(0.7) {
                    state = engine::spawn_alien(&state, &mut rng);
                }
            }
        }

        // ── Per-frame simulation ──────────────────────────────────────────────
        state = sim::frame(&state, PLAYER_POS, dt.as_secs_f32());

        // ── Side effects observed from state changes ──────────────────────────
        if let Some(audio) = &audio {
            if state.last_damage_time != prev_damage {
                audio.play(Cue::Hit);
            }
            let now_active = session_active(state.phase);
            if now_active != was_active {
                audio.set_ambient(now_active);
            }
        }

        if state.high_score > persisted {
            persisted = state.high_score;
            save_high_score(persisted);
        }

        display::render(out, &state)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Ghostty / kitty-protocol terminals support this; others fall back
    // to the held-key expiry window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
