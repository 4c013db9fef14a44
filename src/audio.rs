/// Audio cues — fire-and-forget tones for game events.
///
/// Everything is synthesized from sine sources; there are no sound assets.
/// The contract is one-way: the game fires a cue and never hears back, and
/// a missing output device just means a silent game.

use std::time::Duration;

use rodio::source::{SineWave, Source};
use rodio::{OutputStream, OutputStreamBuilder, Sink};

/// Game events that map to a sound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// Capture shot fired.
    Capture,
    /// Capture shot while rapid-fire is active.
    RapidCapture,
    /// Player took contact damage.
    Hit,
    /// Mission started.
    Start,
}

pub struct AudioManager {
    stream: OutputStream,
    /// Low hum that runs while a mission is live; paused otherwise.
    ambient: Sink,
}

impl AudioManager {
    pub fn new() -> Result<Self, rodio::StreamError> {
        let stream = OutputStreamBuilder::open_default_stream()?;

        let ambient = Sink::connect_new(stream.mixer());
        ambient.append(SineWave::new(55.0).amplify(0.02).repeat_infinite());
        ambient.pause();

        Ok(AudioManager { stream, ambient })
    }

    /// Start or stop the ambient loop; keyed to whether a session is live.
    pub fn set_ambient(&self, on: bool) {
        if on {
            self.ambient.play();
        } else {
            self.ambient.pause();
        }
    }

    /// Play one cue on a detached sink and forget about it.
    pub fn play(&self, cue: Cue) {
        let (freq, millis, gain) = match cue {
            Cue::Capture => (800.0, 200, 0.10),
            Cue::RapidCapture => (1200.0, 100, 0.05),
            Cue::Hit => (60.0, 200, 0.10),
            Cue::Start => (400.0, 500, 0.10),
        };

        let tone = SineWave::new(freq)
            .take_duration(Duration::from_millis(millis))
            .amplify(gain);

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(tone);
        sink.detach();
    }
}
