use std::fmt;
use std::str::FromStr;

use crate::DoomArgError;

/// Game tics per second
pub const TICRATE: i32 = 35;

/// The maximum number of players, multiplayer/networking.
pub const MAXPLAYERS: usize = 4;

/// Which game's rules the engine is running with. Chosen at runtime.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum GameVariant {
    #[default]
    Doom,
    Heretic,
    Hexen,
}

impl FromStr for GameVariant {
    type Err = DoomArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "doom" => Ok(GameVariant::Doom),
            "heretic" => Ok(GameVariant::Heretic),
            "hexen" => Ok(GameVariant::Hexen),
            _ => Err(DoomArgError::InvalidVariant(s.to_owned())),
        }
    }
}

impl fmt::Display for GameVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameVariant::Doom => write!(f, "doom"),
            GameVariant::Heretic => write!(f, "heretic"),
            GameVariant::Hexen => write!(f, "hexen"),
        }
    }
}

/// Seconds from a definition to whole tics
pub fn seconds_to_tics(seconds: f32) -> i32 {
    (seconds * TICRATE as f32).round() as i32
}

#[cfg(test)]
mod tests {
    use super::{seconds_to_tics, GameVariant};

    #[test]
    fn variant_names() {
        assert_eq!("Hexen".parse::<GameVariant>().unwrap(), GameVariant::Hexen);
        assert!("quake".parse::<GameVariant>().is_err());
        assert_eq!(GameVariant::Heretic.to_string(), "heretic");
    }

    #[test]
    fn tics() {
        assert_eq!(seconds_to_tics(1.0), 35);
        assert_eq!(seconds_to_tics(0.5), 18);
        assert_eq!(seconds_to_tics(0.0), 0);
    }
}
