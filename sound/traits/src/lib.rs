//! The sound trigger protocol between the game logic and whatever plays the
//! sounds. Gameplay only ever sends; it never waits for or hears back about
//! a sound.

use glam::Vec2;
use std::{
    fmt::Debug,
    sync::mpsc::{Receiver, Sender},
    time::Duration,
};

/// Sound numbers come straight from definitions. Zero is "no sound".
pub type SfxId = i32;

/// Which part of a sector a sector sound is emitted from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorPart {
    Center,
    Floor,
    Ceiling,
}

/// Where a sound starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SoundOrigin {
    /// A sector's sound origin. `xy` is the sector center, `z` the height of
    /// the part at the time the sound was started.
    Sector {
        sector: usize,
        part: SectorPart,
        xy: Vec2,
        z: f32,
    },
    /// A map object, identified by its unique ID
    Object { uid: usize, xy: Vec2, z: f32 },
}

pub enum SoundAction {
    StartSfx {
        /// The Sound effect number
        sfx: SfxId,
        origin: SoundOrigin,
    },
    /// Stop everything started from this sector
    StopSectorSfx {
        sector: usize,
    },
    StopSfxAll,
    SfxVolume(i32),
    Shutdown,
}

pub type SndServerTx = Sender<SoundAction>;
pub type SndServerRx = Receiver<SoundAction>;

/// A sound server implementing `SoundServer` must also implement
/// `SoundServerTic` typically by a one-liner: `impl SoundServerTic for Snd {}`
pub trait SoundServer {
    type Error: std::error::Error;

    /// Start up all sound stuff and grab the `Sender` channel for cloning
    fn init(&mut self) -> Result<SndServerTx, Self::Error>;

    /// Playback a sound
    fn start_sound(&mut self, sfx: SfxId, origin: SoundOrigin);

    fn stop_sector_sounds(&mut self, sector: usize);

    fn stop_sound_all(&mut self);

    fn set_sfx_volume(&mut self, volume: i32);

    fn get_sfx_volume(&mut self) -> i32;

    /// Helper function used by the `SoundServerTic` trait
    fn get_rx(&mut self) -> &mut SndServerRx;

    /// Stop all sound and release the sound device
    fn shutdown_sound(&mut self);
}

/// Run the `SoundServer`
pub trait SoundServerTic
where
    Self: SoundServer,
{
    /// Will be called every period, returns `true` if the server should
    /// continue running, else `false` if it should exit.
    fn tic(&mut self) -> bool {
        if let Ok(sound) = self.get_rx().recv_timeout(Duration::from_micros(500)) {
            match sound {
                SoundAction::StartSfx { sfx, origin } => self.start_sound(sfx, origin),
                SoundAction::StopSectorSfx { sector } => self.stop_sector_sounds(sector),
                SoundAction::StopSfxAll => self.stop_sound_all(),
                SoundAction::SfxVolume(v) => self.set_sfx_volume(v),
                SoundAction::Shutdown => {
                    self.shutdown_sound();
                    return false;
                }
            }
        }
        true
    }

    /// Drain everything queued without blocking
    fn drain(&mut self) -> bool {
        loop {
            let sound = match self.get_rx().try_recv() {
                Ok(s) => s,
                Err(_) => return true,
            };
            match sound {
                SoundAction::StartSfx { sfx, origin } => self.start_sound(sfx, origin),
                SoundAction::StopSectorSfx { sector } => self.stop_sector_sounds(sector),
                SoundAction::StopSfxAll => self.stop_sound_all(),
                SoundAction::SfxVolume(v) => self.set_sfx_volume(v),
                SoundAction::Shutdown => {
                    self.shutdown_sound();
                    return false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        error::Error,
        fmt::Display,
        sync::mpsc::{Sender, channel},
    };

    use glam::Vec2;

    use crate::{
        SectorPart, SfxId, SndServerRx, SoundAction, SoundOrigin, SoundServer, SoundServerTic,
    };

    #[derive(Debug)]
    enum FxError {}

    impl Error for FxError {}

    impl Display for FxError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&format!("{:?}", self))
        }
    }

    struct Snd {
        rx: SndServerRx,
        tx: Sender<SoundAction>,
        started: Vec<SfxId>,
        volume: i32,
    }

    impl Snd {
        fn new() -> Self {
            let (tx, rx) = channel();
            Self {
                rx,
                tx,
                started: Vec::new(),
                volume: 0,
            }
        }
    }

    impl SoundServer for Snd {
        type Error = FxError;

        fn init(&mut self) -> Result<Sender<SoundAction>, FxError> {
            Ok(self.tx.clone())
        }

        fn start_sound(&mut self, sfx: SfxId, _origin: SoundOrigin) {
            self.started.push(sfx);
        }

        fn stop_sector_sounds(&mut self, _sector: usize) {}

        fn stop_sound_all(&mut self) {
            self.started.clear();
        }

        fn set_sfx_volume(&mut self, volume: i32) {
            self.volume = volume;
        }

        fn get_sfx_volume(&mut self) -> i32 {
            self.volume
        }

        fn get_rx(&mut self) -> &mut SndServerRx {
            &mut self.rx
        }

        fn shutdown_sound(&mut self) {}
    }

    impl SoundServerTic for Snd {}

    fn origin() -> SoundOrigin {
        SoundOrigin::Sector {
            sector: 3,
            part: SectorPart::Floor,
            xy: Vec2::ZERO,
            z: 0.0,
        }
    }

    #[test]
    fn run_tic() {
        let mut snd = Snd::new();
        let tx = snd.init().unwrap();

        tx.send(SoundAction::StartSfx {
            sfx: 12,
            origin: origin(),
        })
        .unwrap();
        tx.send(SoundAction::SfxVolume(9)).unwrap();
        for _ in 0..2 {
            assert!(snd.tic());
        }
        assert_eq!(snd.started, vec![12]);
        assert_eq!(snd.get_sfx_volume(), 9);
    }

    #[test]
    fn drain_stops_on_shutdown() {
        let mut snd = Snd::new();
        let tx = snd.init().unwrap();
        tx.send(SoundAction::StartSfx {
            sfx: 1,
            origin: origin(),
        })
        .unwrap();
        tx.send(SoundAction::Shutdown).unwrap();
        assert!(!snd.drain());
        assert_eq!(snd.started.len(), 1);
    }
}
