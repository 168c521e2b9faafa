//! A sound server with no device. It logs every sound it is asked for.

use std::{
    error::Error,
    fmt,
    sync::mpsc::{channel, Sender},
};

use gameplay::log::{debug, info};
use sound_traits::{
    SfxId, SndServerRx, SoundAction, SoundOrigin, SoundServer, SoundServerTic,
};

#[derive(Debug)]
pub enum LogSoundError {}

impl Error for LogSoundError {}

impl fmt::Display for LogSoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub struct LogSound {
    rx: SndServerRx,
    tx: Sender<SoundAction>,
    volume: i32,
    /// Level time stamped on each log line
    pub tic: u32,
    pub started: usize,
    pub stopped: usize,
}

impl LogSound {
    pub fn new(volume: i32) -> Self {
        let (tx, rx) = channel();
        Self {
            rx,
            tx,
            volume,
            tic: 0,
            started: 0,
            stopped: 0,
        }
    }
}

impl SoundServer for LogSound {
    type Error = LogSoundError;

    fn init(&mut self) -> Result<Sender<SoundAction>, Self::Error> {
        info!("Logging sound server at volume {}", self.volume);
        Ok(self.tx.clone())
    }

    fn start_sound(&mut self, sfx: SfxId, origin: SoundOrigin) {
        self.started += 1;
        match origin {
            SoundOrigin::Sector {
                sector, part, z, ..
            } => info!(
                "[{}] sound {} from sector {} {:?} at z {}",
                self.tic, sfx, sector, part, z
            ),
            SoundOrigin::Object { uid, xy, .. } => {
                info!("[{}] sound {} from object {} at {}", self.tic, sfx, uid, xy)
            }
        }
    }

    fn stop_sector_sounds(&mut self, sector: usize) {
        self.stopped += 1;
        debug!("[{}] stop sounds in sector {}", self.tic, sector);
    }

    fn stop_sound_all(&mut self) {
        debug!("[{}] stop all sounds", self.tic);
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

    fn shutdown_sound(&mut self) {
        info!("Sound server shut down after {} sounds", self.started);
    }
}

impl SoundServerTic for LogSound {}
