/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state.  No game logic is performed; this module only translates
/// state into terminal commands.  The 3D scene is projected top-down onto
/// the play area: world x maps to columns, world z to rows, and the player
/// viewpoint sits under the reticle at the centre.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};

use xenoscope::entities::{
    Alien, AlienKind, AlienTier, BlastColor, GameState, Phase, Powerup, PowerupKind, Vec3,
};
use xenoscope::sim;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_BEST: Color = Color::Yellow;
const C_HUD_STATS: Color = Color::White;
const C_TIMER: Color = Color::Cyan;
const C_TIMER_LOW: Color = Color::Red;
const C_RETICLE: Color = Color::White;
const C_ALIEN: Color = Color::Green;
const C_BOSS: Color = Color::Red;
const C_TANK: Color = Color::DarkGrey;
const C_INVISIBLE: Color = Color::DarkBlue; // barely there, on purpose
const C_RAPID_FIRE: Color = Color::Blue;
const C_SLOW_MOTION: Color = Color::Green;
const C_HINT: Color = Color::DarkGrey;

/// World metres from the reticle to the edge of the play area.
const VIEW_RANGE: f32 = 11.0;

/// Seconds of screen shake after a damage instance.
const SHAKE_WINDOW: f64 = 0.35;

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, state: &GameState) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, width, height)?;
    draw_hud(out, state, width)?;

    // Horizontal jolt applied to everything in the scene while the damage
    // feedback window is open.
    let shake = shake_offset(state);

    draw_reticle(out, width, height, shake)?;
    for powerup in &state.powerups {
        draw_powerup(out, powerup, state.clock, width, height, shake)?;
    }
    for alien in &state.aliens {
        draw_alien(out, alien, width, height, shake)?;
    }
    draw_explosions(out, state, width, height, shake)?;
    draw_powerup_banner(out, state, width)?;
    draw_proximity_warning(out, state, width, height)?;
    draw_controls_hint(out, height)?;

    match state.phase {
        Phase::Idle => draw_title(out, state, width, height)?,
        Phase::Paused => draw_paused(out, width, height)?,
        Phase::LevelComplete => draw_level_clear(out, state, width, height)?,
        Phase::GameOver => draw_game_over(out, state, width, height)?,
        Phase::Playing => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

fn shake_offset(state: &GameState) -> i32 {
    match state.last_damage_time {
        Some(t) if state.clock - t < SHAKE_WINDOW => {
            if (state.clock * 30.0) as i64 % 2 == 0 {
                1
            } else {
                -1
            }
        }
        _ => 0,
    }
}

// ── Projection ────────────────────────────────────────────────────────────────

/// Map a scene position into the play area; `None` when it falls outside.
fn project(pos: Vec3, width: u16, height: u16, shake: i32) -> Option<(u16, u16)> {
    let half_cols = (width as i32 / 2 - 2).max(1) as f32;
    let half_rows = (height as i32 / 2 - 3).max(1) as f32;

    let col = width as i32 / 2 + (pos[0] / VIEW_RANGE * half_cols).round() as i32 + shake;
    let row = height as i32 / 2 + (pos[2] / VIEW_RANGE * half_rows).round() as i32;

    if col < 1 || col >= width as i32 - 1 || row < 2 || row >= height as i32 - 2 {
        return None;
    }
    Some((col as u16, row as u16))
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let w = width as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Row 1 — top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Row h-2 — bottom bar
    out.queue(cursor::MoveTo(0, height.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    // Side walls
    for row in 2..height.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &GameState, width: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_BEST))?;
    out.queue(Print(format!("HI-SCORE {:06}", state.high_score.max(0))))?;

    out.queue(style::SetForegroundColor(C_HUD_STATS))?;
    out.queue(Print(format!(
        "   SCORE {:06}   LVL {}   CAPTURED {}",
        state.score, state.level, state.captured_count
    )))?;

    // Countdown — right, red when nearly out
    let timer_text = format!("{:>2}s", state.time_remaining);
    let rx = width.saturating_sub(timer_text.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(if state.time_remaining < 10 {
        C_TIMER_LOW
    } else {
        C_TIMER
    }))?;
    out.queue(Print(&timer_text))?;

    Ok(())
}

fn draw_powerup_banner<W: Write>(
    out: &mut W,
    state: &GameState,
    width: u16,
) -> std::io::Result<()> {
    let Some((kind, expiry)) = state.active_powerup else {
        return Ok(());
    };

    let remaining = (expiry - state.clock).max(0.0).ceil() as i32;
    let (text, color) = match kind {
        PowerupKind::RapidFire => (format!("≫ RAPID FIRE {}s ≪", remaining), C_RAPID_FIRE),
        PowerupKind::SlowMotion => (format!("≫ SLOW MOTION {}s ≪", remaining), C_SLOW_MOTION),
    };

    let cx = (width / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(cx, 2))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(&text))?;
    Ok(())
}

// ── Scene ─────────────────────────────────────────────────────────────────────

fn draw_reticle<W: Write>(
    out: &mut W,
    width: u16,
    height: u16,
    shake: i32,
) -> std::io::Result<()> {
    if let Some((col, row)) = project([0.0; 3], width, height, shake) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_RETICLE))?;
        out.queue(Print("┼"))?;
    }
    Ok(())
}

fn kind_glyph(kind: AlienKind) -> char {
    match kind {
        AlienKind::Kralithor => 'K',
        AlienKind::Xylophont => 'X',
        AlienKind::Zyrephon => 'Z',
        AlienKind::Myrmelux => 'M',
        AlienKind::Vorvakul => 'V',
        AlienKind::Verwak => 'W',
        AlienKind::Dyrekx => 'D',
    }
}

fn draw_alien<W: Write>(
    out: &mut W,
    alien: &Alien,
    width: u16,
    height: u16,
    shake: i32,
) -> std::io::Result<()> {
    let Some((col, row)) = project(alien.position, width, height, shake) else {
        return Ok(());
    };
    let glyph = kind_glyph(alien.kind);

    match alien.tier {
        AlienTier::Boss => {
            // Bosses get a 3-wide bracket so they read as the big threat.
            let lx = col.saturating_sub(1).max(1);
            out.queue(cursor::MoveTo(lx, row))?;
            out.queue(style::SetForegroundColor(C_BOSS))?;
            out.queue(Print(format!("[{}]", glyph)))?;
        }
        AlienTier::Tank => {
            let lx = col.saturating_sub(1).max(1);
            out.queue(cursor::MoveTo(lx, row))?;
            out.queue(style::SetForegroundColor(C_TANK))?;
            out.queue(Print(format!("{{{}}}", glyph)))?;
        }
        AlienTier::Invisible => {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(C_INVISIBLE))?;
            out.queue(Print(glyph))?;
        }
        AlienTier::Normal => {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(C_ALIEN))?;
            out.queue(Print(glyph))?;
        }
    }
    Ok(())
}

fn draw_powerup<W: Write>(
    out: &mut W,
    powerup: &Powerup,
    clock: f64,
    width: u16,
    height: u16,
    shake: i32,
) -> std::io::Result<()> {
    let Some((col, row)) = project(powerup.position, width, height, shake) else {
        return Ok(());
    };

    // The idle bob is vertical, which a top-down view cannot show; pulse
    // the glyph on the same clock curve instead.
    let pulse = (clock * 2.0).sin() > 0.0;
    let (glyph, color) = match powerup.kind {
        PowerupKind::RapidFire => (if pulse { '◆' } else { '◇' }, C_RAPID_FIRE),
        PowerupKind::SlowMotion => (if pulse { '●' } else { '○' }, C_SLOW_MOTION),
    };

    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(glyph))?;
    Ok(())
}

fn blast_color(color: BlastColor) -> Color {
    match color {
        BlastColor::Amber => Color::Yellow,
        BlastColor::Crimson => Color::Red,
        BlastColor::Cyan => Color::Cyan,
    }
}

fn draw_explosions<W: Write>(
    out: &mut W,
    state: &GameState,
    width: u16,
    height: u16,
    shake: i32,
) -> std::io::Result<()> {
    for explosion in &state.explosions {
        let life = 1.0 - (state.clock - explosion.created_at) / sim::PARTICLE_DECAY;
        if life <= 0.0 {
            continue;
        }

        out.queue(style::SetForegroundColor(blast_color(explosion.color)))?;
        for particle in &explosion.particles {
            let pos = [
                explosion.position[0] + particle.offset[0],
                explosion.position[1] + particle.offset[1],
                explosion.position[2] + particle.offset[2],
            ];
            if let Some((col, row)) = project(pos, width, height, shake) {
                let size = particle.scale * life as f32;
                out.queue(cursor::MoveTo(col, row))?;
                out.queue(Print(if size > 0.25 { '*' } else { '·' }))?;
            }
        }
    }
    Ok(())
}

fn draw_proximity_warning<W: Write>(
    out: &mut W,
    state: &GameState,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let nearest = state
        .aliens
        .iter()
        .map(|a| sim::distance(a.position, [0.0; 3]))
        .fold(f32::INFINITY, f32::min);

    if nearest < 2.5 {
        let text = format!("!! CONTACT {:.1}m !!", nearest);
        let cx = (width / 2).saturating_sub(text.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(cx, height.saturating_sub(3)))?;
        out.queue(style::SetForegroundColor(Color::Red))?;
        out.queue(Print(&text))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "SPACE : Capture   E : Grab   U (hold) : Ultimate   P : Pause   Q : Quit",
    ))?;
    Ok(())
}

// ── Full-screen overlays ──────────────────────────────────────────────────────

fn draw_lines<W: Write>(
    out: &mut W,
    width: u16,
    height: u16,
    lines: &[(&str, Color)],
) -> std::io::Result<()> {
    let cx = width / 2;
    let start_row = (height / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

fn draw_title<W: Write>(
    out: &mut W,
    state: &GameState,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let best_line = format!("Best Score: {}", state.high_score);
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════════╗", Color::Cyan),
        ("║      XENOSCOPE       ║", Color::Cyan),
        ("╚══════════════════════╝", Color::Cyan),
        ("Alien Hunter", Color::White),
        ("", Color::White),
        (&best_line, Color::Yellow),
        ("", Color::White),
        ("◆ Rapid Fire — hold to keep shooting", Color::Blue),
        ("● Slow Motion — aliens at half speed", Color::Green),
        ("", Color::White),
        ("ENTER - Start Mission   Q - Quit", Color::White),
    ];
    draw_lines(out, width, height, lines)
}

fn draw_paused<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════╗", Color::Yellow),
        ("║      PAUSED      ║", Color::Yellow),
        ("╚══════════════════╝", Color::Yellow),
        ("P - Resume   R - Reset High Score", Color::White),
    ];
    draw_lines(out, width, height, lines)
}

fn draw_level_clear<W: Write>(
    out: &mut W,
    state: &GameState,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let level_line = format!("Level {} survived — score {}", state.level, state.score);
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════╗", Color::Green),
        ("║   LEVEL CLEAR    ║", Color::Green),
        ("╚══════════════════╝", Color::Green),
        (&level_line, Color::Yellow),
        ("N - Next Level   Q - Quit", Color::White),
    ];
    draw_lines(out, width, height, lines)
}

fn draw_game_over<W: Write>(
    out: &mut W,
    state: &GameState,
    width: u16,
    height: u16,
) -> std::io::Result<()> {
    let score_line = format!("Final Score: {}", state.score);
    let captured_line = format!("Aliens Captured: {}", state.captured_count);
    let lines: &[(&str, Color)] = &[
        ("╔══════════════════╗", Color::Red),
        ("║  MISSION FAILED  ║", Color::Red),
        ("╚══════════════════╝", Color::Red),
        (&score_line, Color::Yellow),
        (&captured_line, Color::White),
        ("ENTER - Retry   Q - Quit", Color::White),
    ];
    draw_lines(out, width, height, lines)
}
