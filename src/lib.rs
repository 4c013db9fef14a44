//! XENOSCOPE — core state and simulation for a real-time alien-hunting game.
//!
//! The library holds the authoritative game rules: `entities` are the plain
//! data records, `engine` is the single-writer operation set over the whole
//! state (spawning, combat, economy, session lifecycle), and `sim` advances
//! the per-frame simulation (chase motion, lifetime expiry, proximity damage,
//! particle decay).  `audio` carries the sound-cue contract.  The binary
//! target owns the terminal, the fixed-period timers and the input surface,
//! and reads all of this once per frame.

pub mod audio;
pub mod engine;
pub mod entities;
pub mod sim;
