//! Level state and the extended (XG) sector and line engine: scripted
//! lights, colours and planes, chained line events, plane movers, and stair
//! builders, all driven one tic at a time.

#![allow(clippy::new_without_default)]

use std::{error::Error, fmt, str::FromStr};

mod doom_def;
pub(crate) mod env;
mod level;
mod thing;
mod thinker;
pub mod xg;

pub use doom_def::{seconds_to_tics, GameVariant, MAXPLAYERS, TICRATE};
pub use env::specials::{move_plane, Plane, PlaneResult};
pub use glam;
pub use level::{
    flags::LineDefFlags,
    map_data::{
        LineDesc, MapData, MapDescription, MapError, MapExtents, SectorDesc, SideDesc, ThingDesc,
        VertexDesc,
    },
    map_defs::{BBox, LineDef, Sector, SideDef},
    Level, PlayerSlot,
};
pub use log;
pub use thing::{MapObjFlag, MapObject};
pub use thinker::{Think, ThinkerAlloc, ThinkerData, ThinkerId};

#[derive(Debug)]
pub enum DoomArgError {
    InvalidSkill(String),
    InvalidVariant(String),
}

impl Error for DoomArgError {}

impl fmt::Display for DoomArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoomArgError::InvalidSkill(m) => write!(f, "invalid skill: {}", m),
            DoomArgError::InvalidVariant(m) => write!(f, "invalid game variant: {}", m),
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd)]
pub enum Skill {
    NoItems = -1, // the "-skill 0" hack
    Baby = 0,
    Easy = 1,
    #[default]
    Medium = 2,
    Hard = 3,
    Nightmare = 4,
}

impl FromStr for Skill {
    type Err = DoomArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Skill::Baby),
            "1" => Ok(Skill::Easy),
            "2" => Ok(Skill::Medium),
            "3" => Ok(Skill::Hard),
            "4" => Ok(Skill::Nightmare),
            _ => Err(DoomArgError::InvalidSkill(s.to_owned())),
        }
    }
}
