//! Extended sector and line type templates.
//!
//! Templates are written as RON text. A binary lump of the same records,
//! `bincode` encoded behind a magic and a checksum, can be layered on top and
//! replaces any text template with the same id.

use std::collections::HashMap;
use std::{error::Error, fmt};

use log::{debug, info};
use math::Angle;
use nanoserde::{DeRon, SerRon};
use serde::{Deserialize, Serialize};
use sound_traits::SfxId;

use crate::doom_def::seconds_to_tics;
use crate::env::specials::Plane;
use crate::xg::chain::{ChainClass, ChainFlag, NUM_CHAINS};
use crate::xg::function::{FunctionDef, NUM_CHANNELS};
use crate::xg::mover::MoverFlag;
use crate::xg::resolver::{PlaneRef, SectorTarget};

const LUMP_MAGIC: &[u8; 4] = b"XGD1";
const LUMP_HEADER: usize = 8;

#[derive(Debug)]
pub enum XgError {
    Ron(String),
    Lump(String),
    BadMagic,
    BadChecksum { expected: u32, found: u32 },
    UnknownName { kind: &'static str, name: String },
}

impl Error for XgError {}

impl fmt::Display for XgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XgError::Ron(m) => write!(f, "could not parse definitions: {}", m),
            XgError::Lump(m) => write!(f, "could not decode definition lump: {}", m),
            XgError::BadMagic => write!(f, "definition lump has the wrong magic"),
            XgError::BadChecksum { expected, found } => write!(
                f,
                "definition lump checksum {:08x} does not match {:08x}",
                found, expected
            ),
            XgError::UnknownName { kind, name } => write!(f, "unknown {}: {}", kind, name),
        }
    }
}

// Raw records as written in definition files. Times are in seconds.

#[derive(Debug, Clone, Default, PartialEq, DeRon, SerRon, Serialize, Deserialize)]
pub struct ChannelDef {
    pub func: String,
    #[nserde(default)]
    pub interval_min: f32,
    #[nserde(default)]
    pub interval_max: f32,
    #[nserde(default)]
    pub scale: Option<f32>,
    #[nserde(default)]
    pub offset: f32,
}

#[derive(Debug, Clone, Default, PartialEq, DeRon, SerRon, Serialize, Deserialize)]
pub struct ChainDef {
    /// "floor", "ceiling", "inside", "ticker" or "function"
    pub class: String,
    #[nserde(default)]
    pub line_type: i32,
    /// Actor categories with a direction, e.g. "player-a", "monster-d"
    #[nserde(default)]
    pub flags: Vec<String>,
    #[nserde(default)]
    pub start: f32,
    #[nserde(default)]
    pub end: f32,
    #[nserde(default)]
    pub interval_min: f32,
    #[nserde(default)]
    pub interval_max: f32,
    /// Missing means unlimited
    #[nserde(default)]
    pub count: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, DeRon, SerRon, Serialize, Deserialize)]
pub struct SectorTypeDef {
    pub id: i32,
    #[nserde(default)]
    pub flags: Vec<String>,
    #[nserde(default)]
    pub act_tag: i32,
    #[nserde(default)]
    pub chains: Vec<ChainDef>,
    #[nserde(default)]
    pub ambient_sound: i32,
    #[nserde(default)]
    pub sound_interval_min: f32,
    #[nserde(default)]
    pub sound_interval_max: f32,
    /// Degrees
    #[nserde(default)]
    pub floor_scroll_angle: f32,
    #[nserde(default)]
    pub floor_scroll_speed: f32,
    #[nserde(default)]
    pub ceiling_scroll_angle: f32,
    #[nserde(default)]
    pub ceiling_scroll_speed: f32,
    #[nserde(default)]
    pub wind_angle: f32,
    #[nserde(default)]
    pub wind_speed: f32,
    #[nserde(default)]
    pub vertical_wind: f32,
    #[nserde(default)]
    pub gravity: Option<f32>,
    #[nserde(default)]
    pub friction: Option<f32>,
    #[nserde(default)]
    pub floor: Option<ChannelDef>,
    #[nserde(default)]
    pub ceiling: Option<ChannelDef>,
    #[nserde(default)]
    pub light: Option<ChannelDef>,
    #[nserde(default)]
    pub red: Option<ChannelDef>,
    #[nserde(default)]
    pub green: Option<ChannelDef>,
    #[nserde(default)]
    pub blue: Option<ChannelDef>,
}

#[derive(Debug, Clone, Default, PartialEq, DeRon, SerRon, Serialize, Deserialize)]
pub struct LineTypeDef {
    pub id: i32,
    /// "move-plane", "build-stairs", "set-sector-type", "set-light",
    /// "enable-sector", "disable-sector", "activate-lines", "deactivate-lines"
    pub class: String,
    /// Missing means unlimited
    #[nserde(default)]
    pub count: Option<i32>,
    #[nserde(default)]
    pub act_tag: i32,
    /// Any of "cross", "use", "shoot". Empty allows all.
    #[nserde(default)]
    pub events: Vec<String>,
    /// Any of "player", "monster", "missile", "other", "any". Empty is "player".
    #[nserde(default)]
    pub activators: Vec<String>,
    #[nserde(default)]
    pub target: String,
    #[nserde(default)]
    pub plane: String,
    #[nserde(default)]
    pub destination: String,
    #[nserde(default)]
    pub destination_aux: i32,
    #[nserde(default)]
    pub destination_offset: f32,
    #[nserde(default)]
    pub speed: f32,
    #[nserde(default)]
    pub crush_speed: f32,
    #[nserde(default)]
    pub flags: Vec<String>,
    #[nserde(default)]
    pub material: String,
    #[nserde(default)]
    pub material_aux: i32,
    #[nserde(default)]
    pub sector_type: Option<i32>,
    #[nserde(default)]
    pub wait: f32,
    #[nserde(default)]
    pub start_sound: i32,
    #[nserde(default)]
    pub move_sound: i32,
    #[nserde(default)]
    pub end_sound: i32,
    #[nserde(default)]
    pub sound_interval_min: f32,
    #[nserde(default)]
    pub sound_interval_max: f32,
    #[nserde(default)]
    pub step_height: f32,
    #[nserde(default)]
    pub wait_increment: f32,
    #[nserde(default)]
    pub speed_increment: f32,
    /// Light level for "set-light", 0 to 1
    #[nserde(default)]
    pub light: f32,
    /// Tag of the lines for "activate-lines" and "deactivate-lines"
    #[nserde(default)]
    pub line_tag: i32,
}

/// A whole definition file
#[derive(Debug, Clone, Default, PartialEq, DeRon, SerRon, Serialize, Deserialize)]
pub struct DefinitionsDef {
    #[nserde(default)]
    pub sector_types: Vec<SectorTypeDef>,
    #[nserde(default)]
    pub line_types: Vec<LineTypeDef>,
}

impl DefinitionsDef {
    /// Encode as a binary definition lump
    pub fn to_lump(&self) -> Result<Vec<u8>, XgError> {
        let payload = bincode::serialize(self).map_err(|e| XgError::Lump(e.to_string()))?;
        let mut lump = Vec::with_capacity(LUMP_HEADER + payload.len());
        lump.extend_from_slice(LUMP_MAGIC);
        lump.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
        lump.extend_from_slice(&payload);
        Ok(lump)
    }

    pub fn from_lump(lump: &[u8]) -> Result<Self, XgError> {
        if lump.len() < LUMP_HEADER || &lump[..4] != LUMP_MAGIC {
            return Err(XgError::BadMagic);
        }
        let expected = u32::from_le_bytes([lump[4], lump[5], lump[6], lump[7]]);
        let payload = &lump[LUMP_HEADER..];
        let found = crc32fast::hash(payload);
        if found != expected {
            return Err(XgError::BadChecksum { expected, found });
        }
        bincode::deserialize(payload).map_err(|e| XgError::Lump(e.to_string()))
    }
}

// Typed templates used at runtime. Times are in tics.

/// Sector type flag bits
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SectorFlag {
    /// Function driven planes crush what is in the way
    Crush = 1,
    WindPlayers = 1 << 1,
    WindOthers = 1 << 2,
    WindMonsters = 1 << 3,
    WindMissiles = 1 << 4,
    /// Wind only pushes objects standing on the floor
    WindFloor = 1 << 5,
    /// Wind only pushes objects touching the ceiling
    WindCeiling = 1 << 6,
}

impl SectorFlag {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "crush" => SectorFlag::Crush,
            "wind-players" => SectorFlag::WindPlayers,
            "wind-others" => SectorFlag::WindOthers,
            "wind-monsters" => SectorFlag::WindMonsters,
            "wind-missiles" => SectorFlag::WindMissiles,
            "wind-floor" => SectorFlag::WindFloor,
            "wind-ceiling" => SectorFlag::WindCeiling,
            _ => return None,
        })
    }
}

/// Categories of map object, for gating chains and line activation
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActorCategory {
    Player,
    Monster,
    Missile,
    Other,
}

impl ActorCategory {
    pub const fn bit(self) -> u32 {
        1 << self as u32
    }

    pub const ALL: u32 = 0b1111;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chain {
    pub line_type: i32,
    pub flags: u32,
    /// Seconds of level time
    pub start: f32,
    /// Seconds of level time, zero or less for no end
    pub end: f32,
    pub interval: [i32; 2],
    /// 0 is disabled, negative is unlimited
    pub count: i32,
}

impl Chain {
    pub const DISABLED: Chain = Chain {
        line_type: 0,
        flags: 0,
        start: 0.0,
        end: 0.0,
        interval: [0, 0],
        count: 0,
    };

    pub const UNLIMITED: Chain = Chain {
        count: -1,
        ..Chain::DISABLED
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectorType {
    pub id: i32,
    pub flags: u32,
    pub act_tag: i32,
    pub chains: [Chain; NUM_CHAINS],
    pub ambient_sound: SfxId,
    pub sound_interval: [i32; 2],
    /// Floor then ceiling
    pub scroll_angle: [Angle; 2],
    pub scroll_speed: [f32; 2],
    pub wind_angle: Angle,
    pub wind_speed: f32,
    pub vertical_wind: f32,
    pub gravity: Option<f32>,
    pub friction: Option<f32>,
    /// Indexed by `Channel`
    pub functions: [FunctionDef; NUM_CHANNELS],
}

impl SectorType {
    pub fn new(id: i32) -> Self {
        let mut chains = [Chain::DISABLED; NUM_CHAINS];
        chains[ChainClass::Function as usize] = Chain::UNLIMITED;
        Self {
            id,
            flags: 0,
            act_tag: 0,
            chains,
            ambient_sound: 0,
            sound_interval: [0, 0],
            scroll_angle: [Angle::default(); 2],
            scroll_speed: [0.0; 2],
            wind_angle: Angle::default(),
            wind_speed: 0.0,
            vertical_wind: 0.0,
            gravity: None,
            friction: None,
            functions: Default::default(),
        }
    }

    pub fn has_flag(&self, flag: SectorFlag) -> bool {
        self.flags & flag as u32 != 0
    }

    fn from_def(def: &SectorTypeDef) -> Result<Self, XgError> {
        let mut out = Self::new(def.id);
        for name in &def.flags {
            out.flags |= SectorFlag::from_name(name).ok_or_else(|| XgError::UnknownName {
                kind: "sector flag",
                name: name.clone(),
            })? as u32;
        }
        out.act_tag = def.act_tag;

        for chain in &def.chains {
            let class = ChainClass::from_name(&chain.class).ok_or_else(|| XgError::UnknownName {
                kind: "chain class",
                name: chain.class.clone(),
            })?;
            let mut flags = 0;
            for name in &chain.flags {
                flags |= ChainFlag::from_name(name).ok_or_else(|| XgError::UnknownName {
                    kind: "chain flag",
                    name: name.clone(),
                })? as u32;
            }
            out.chains[class as usize] = Chain {
                line_type: chain.line_type,
                flags,
                start: chain.start,
                end: chain.end,
                interval: interval(chain.interval_min, chain.interval_max),
                count: chain.count.unwrap_or(-1),
            };
        }

        out.ambient_sound = def.ambient_sound;
        out.sound_interval = interval(def.sound_interval_min, def.sound_interval_max);
        out.scroll_angle = [
            Angle::from_degrees(def.floor_scroll_angle),
            Angle::from_degrees(def.ceiling_scroll_angle),
        ];
        out.scroll_speed = [def.floor_scroll_speed, def.ceiling_scroll_speed];
        out.wind_angle = Angle::from_degrees(def.wind_angle);
        out.wind_speed = def.wind_speed;
        out.vertical_wind = def.vertical_wind;
        out.gravity = def.gravity;
        out.friction = def.friction;

        let channels = [
            &def.floor,
            &def.ceiling,
            &def.light,
            &def.red,
            &def.green,
            &def.blue,
        ];
        for (slot, channel) in out.functions.iter_mut().zip(channels) {
            if let Some(channel) = channel {
                let [min_interval, max_interval] = interval(channel.interval_min, channel.interval_max);
                *slot = FunctionDef {
                    source: channel.func.clone(),
                    min_interval,
                    max_interval,
                    scale: channel.scale.unwrap_or(1.0),
                    offset: channel.offset,
                };
            }
        }
        Ok(out)
    }
}

/// Seconds to a tic range, the maximum never under the minimum
fn interval(min: f32, max: f32) -> [i32; 2] {
    let min = seconds_to_tics(min).max(0);
    [min, seconds_to_tics(max).max(min)]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoverSounds {
    pub start: SfxId,
    pub moving: SfxId,
    pub end: SfxId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovePlaneDef {
    pub plane: Plane,
    pub destination: PlaneRef,
    pub destination_aux: i32,
    pub destination_offset: f32,
    pub speed: f32,
    pub crush_speed: f32,
    pub flags: u32,
    /// Material to set when done
    pub material: PlaneRef,
    pub material_aux: i32,
    /// Sector type to set when done
    pub sector_type: Option<i32>,
    pub wait: i32,
    pub sounds: MoverSounds,
    pub sound_interval: [i32; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct StairsDef {
    pub plane: Plane,
    pub speed: f32,
    pub speed_increment: f32,
    pub step_height: f32,
    pub wait: i32,
    pub wait_increment: i32,
    /// Only spread in to sectors with the origin's material
    pub picstop: bool,
    /// Build every neighbour each round rather than one
    pub spread: bool,
    pub crush: bool,
    pub sounds: MoverSounds,
    pub sound_interval: [i32; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineClass {
    None,
    MovePlane(MovePlaneDef),
    BuildStairs(StairsDef),
    SetSectorType(i32),
    SetLight(f32),
    EnableSector,
    DisableSector,
    ActivateLines(i32),
    DeactivateLines(i32),
}

/// Line event bits for `LineType::events`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LineEventKind {
    Cross = 1,
    Use = 1 << 1,
    Shoot = 1 << 2,
    /// From a sector chain
    Chain = 1 << 3,
    /// From a `!n` in a function
    Function = 1 << 4,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineType {
    pub id: i32,
    pub class: LineClass,
    /// 0 is used up, negative is unlimited
    pub count: i32,
    pub act_tag: i32,
    /// Which real line events are accepted. Chain and function events always are.
    pub events: u32,
    /// Which actor categories may activate from a real line
    pub activators: u32,
    pub target: SectorTarget,
}

impl LineType {
    pub fn new(id: i32, class: LineClass) -> Self {
        Self {
            id,
            class,
            count: -1,
            act_tag: 0,
            events: LineEventKind::Cross as u32 | LineEventKind::Use as u32 | LineEventKind::Shoot as u32,
            activators: ActorCategory::Player.bit(),
            target: SectorTarget::Mine,
        }
    }

    fn from_def(def: &LineTypeDef) -> Result<Self, XgError> {
        let unknown = |kind: &'static str, name: &str| XgError::UnknownName {
            kind,
            name: name.to_owned(),
        };
        let plane = || match def.plane.as_str() {
            "" | "floor" => Ok(Plane::Floor),
            "ceiling" => Ok(Plane::Ceiling),
            other => Err(unknown("plane", other)),
        };
        let sounds = MoverSounds {
            start: def.start_sound,
            moving: def.move_sound,
            end: def.end_sound,
        };

        let mut mover_flags = 0;
        let mut picstop = false;
        let mut spread = false;
        for name in &def.flags {
            match name.as_str() {
                "picstop" => picstop = true,
                "spread" => spread = true,
                other => {
                    mover_flags |= MoverFlag::from_name(other).ok_or_else(|| unknown("mover flag", other))? as u32
                }
            }
        }

        let class = match def.class.as_str() {
            "" | "none" => LineClass::None,
            "move-plane" => LineClass::MovePlane(MovePlaneDef {
                plane: plane()?,
                destination: def.destination.parse()?,
                destination_aux: def.destination_aux,
                destination_offset: def.destination_offset,
                speed: def.speed,
                crush_speed: if def.crush_speed > 0.0 { def.crush_speed } else { def.speed },
                flags: mover_flags,
                material: def.material.parse()?,
                material_aux: def.material_aux,
                sector_type: def.sector_type,
                wait: seconds_to_tics(def.wait).max(0),
                sounds,
                sound_interval: interval(def.sound_interval_min, def.sound_interval_max),
            }),
            "build-stairs" => LineClass::BuildStairs(StairsDef {
                plane: plane()?,
                speed: def.speed,
                speed_increment: def.speed_increment,
                step_height: def.step_height,
                wait: seconds_to_tics(def.wait).max(0),
                wait_increment: seconds_to_tics(def.wait_increment),
                picstop,
                spread,
                crush: mover_flags & MoverFlag::Crush as u32 != 0,
                sounds,
                sound_interval: interval(def.sound_interval_min, def.sound_interval_max),
            }),
            "set-sector-type" => LineClass::SetSectorType(def.sector_type.unwrap_or(0)),
            "set-light" => LineClass::SetLight(def.light.clamp(0.0, 1.0)),
            "enable-sector" => LineClass::EnableSector,
            "disable-sector" => LineClass::DisableSector,
            "activate-lines" => LineClass::ActivateLines(def.line_tag),
            "deactivate-lines" => LineClass::DeactivateLines(def.line_tag),
            other => return Err(unknown("line class", other)),
        };

        let mut out = Self::new(def.id, class);
        out.count = def.count.unwrap_or(-1);
        out.act_tag = def.act_tag;
        if !def.events.is_empty() {
            out.events = 0;
            for name in &def.events {
                out.events |= match name.as_str() {
                    "cross" => LineEventKind::Cross,
                    "use" => LineEventKind::Use,
                    "shoot" => LineEventKind::Shoot,
                    other => return Err(unknown("line event", other)),
                } as u32;
            }
        }
        if !def.activators.is_empty() {
            out.activators = 0;
            for name in &def.activators {
                out.activators |= match name.as_str() {
                    "player" => ActorCategory::Player.bit(),
                    "monster" => ActorCategory::Monster.bit(),
                    "missile" => ActorCategory::Missile.bit(),
                    "other" => ActorCategory::Other.bit(),
                    "any" => ActorCategory::ALL,
                    other => return Err(unknown("activator", other)),
                };
            }
        }
        if !def.target.is_empty() {
            out.target = def.target.parse()?;
        }
        Ok(out)
    }
}

/// Every known template, looked up by special id
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    sector_types: HashMap<i32, SectorType>,
    line_types: HashMap<i32, LineType>,
}

impl Definitions {
    pub fn from_ron(text: &str) -> Result<Self, XgError> {
        let raw = DefinitionsDef::deserialize_ron(text).map_err(|e| XgError::Ron(e.to_string()))?;
        let mut defs = Self::default();
        defs.merge(&raw)?;
        info!(
            "Loaded {} sector types and {} line types",
            defs.sector_types.len(),
            defs.line_types.len()
        );
        Ok(defs)
    }

    /// Add the records in `raw`, replacing any with the same id
    pub fn merge(&mut self, raw: &DefinitionsDef) -> Result<(), XgError> {
        for def in &raw.sector_types {
            self.insert_sector_type(SectorType::from_def(def)?);
        }
        for def in &raw.line_types {
            self.insert_line_type(LineType::from_def(def)?);
        }
        Ok(())
    }

    /// Layer a binary definition lump over what is loaded
    pub fn apply_lump(&mut self, lump: &[u8]) -> Result<(), XgError> {
        let raw = DefinitionsDef::from_lump(lump)?;
        debug!(
            target: "xg",
            "Definition lump has {} sector types and {} line types",
            raw.sector_types.len(),
            raw.line_types.len()
        );
        self.merge(&raw)
    }

    pub fn insert_sector_type(&mut self, sector_type: SectorType) {
        if self.sector_types.insert(sector_type.id, sector_type).is_some() {
            debug!(target: "xg", "Sector type replaced");
        }
    }

    pub fn insert_line_type(&mut self, line_type: LineType) {
        if self.line_types.insert(line_type.id, line_type).is_some() {
            debug!(target: "xg", "Line type replaced");
        }
    }

    pub fn sector_type(&self, id: i32) -> Option<&SectorType> {
        self.sector_types.get(&id)
    }

    pub fn line_type(&self, id: i32) -> Option<&LineType> {
        self.line_types.get(&id)
    }

    pub fn sector_type_count(&self) -> usize {
        self.sector_types.len()
    }

    pub fn line_type_count(&self) -> usize {
        self.line_types.len()
    }
}
