//! Sector chains: a sector firing a line type as if a line had been
//! triggered, when something touches it, sits in it, on a timer, or when one
//! of its functions says so.

use log::debug;

use crate::doom_def::TICRATE;
use crate::thing::MapObject;
use crate::thinker::ThinkerId;
use crate::xg::defs::ActorCategory;
use crate::xg::line::{line_event, LineSource, SyntheticLine};
use crate::xg::LineEventKind;
use crate::Level;

pub const NUM_CHAINS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainClass {
    /// Something standing on the floor
    Floor,
    /// Something touching the ceiling
    Ceiling,
    /// Anything linked in to the sector
    Inside,
    /// Fires on its timer alone
    Ticker,
    /// Fired by `!n` in one of the sector's functions
    Function,
}

impl ChainClass {
    pub const ALL: [ChainClass; NUM_CHAINS] = [
        ChainClass::Floor,
        ChainClass::Ceiling,
        ChainClass::Inside,
        ChainClass::Ticker,
        ChainClass::Function,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "floor" => ChainClass::Floor,
            "ceiling" => ChainClass::Ceiling,
            "inside" => ChainClass::Inside,
            "ticker" => ChainClass::Ticker,
            "function" => ChainClass::Function,
            _ => return None,
        })
    }
}

/// Which actors set a chain off, and whether they activate or deactivate it
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChainFlag {
    AnyA = 1,
    AnyD = 1 << 1,
    PlayerA = 1 << 2,
    PlayerD = 1 << 3,
    OtherA = 1 << 4,
    OtherD = 1 << 5,
    MonsterA = 1 << 6,
    MonsterD = 1 << 7,
    MissileA = 1 << 8,
    MissileD = 1 << 9,
}

impl ChainFlag {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "any-a" => ChainFlag::AnyA,
            "any-d" => ChainFlag::AnyD,
            "player-a" => ChainFlag::PlayerA,
            "player-d" => ChainFlag::PlayerD,
            "other-a" => ChainFlag::OtherA,
            "other-d" => ChainFlag::OtherD,
            "monster-a" => ChainFlag::MonsterA,
            "monster-d" => ChainFlag::MonsterD,
            "missile-a" => ChainFlag::MissileA,
            "missile-d" => ChainFlag::MissileD,
            _ => return None,
        })
    }

    /// The activate and deactivate bits for a category
    const fn pair(category: ActorCategory) -> (u32, u32) {
        match category {
            ActorCategory::Player => (ChainFlag::PlayerA as u32, ChainFlag::PlayerD as u32),
            ActorCategory::Monster => (ChainFlag::MonsterA as u32, ChainFlag::MonsterD as u32),
            ActorCategory::Missile => (ChainFlag::MissileA as u32, ChainFlag::MissileD as u32),
            ActorCategory::Other => (ChainFlag::OtherA as u32, ChainFlag::OtherD as u32),
        }
    }
}

pub fn actor_category(mobj: &MapObject) -> ActorCategory {
    if mobj.is_player() {
        ActorCategory::Player
    } else if mobj.is_missile() {
        ActorCategory::Missile
    } else if mobj.is_monster() {
        ActorCategory::Monster
    } else {
        ActorCategory::Other
    }
}

/// `Some(true)` if the flags let this category activate the chain,
/// `Some(false)` if they only let it deactivate.
pub fn chain_direction(flags: u32, category: ActorCategory) -> Option<bool> {
    let (a, d) = ChainFlag::pair(category);
    if flags & (a | ChainFlag::AnyA as u32) != 0 {
        Some(true)
    } else if flags & (d | ChainFlag::AnyD as u32) != 0 {
        Some(false)
    } else {
        None
    }
}

/// Try to fire chain `class` of `sector`. `line_type` is only used by the
/// function class; every other class fires its configured type. Returns
/// true if a line event went through.
pub fn do_chain(
    level: &mut Level,
    sector: usize,
    class: ChainClass,
    line_type: Option<i32>,
    activating: bool,
    activator: Option<ThinkerId>,
) -> bool {
    let c = class as usize;
    let Some(xg) = level.xg.sectors[sector].as_ref() else {
        return false;
    };
    let chain = xg.info.chains[c];
    if xg.chain_counts[c] == 0 || xg.chain_timers[c] > 0 {
        return false;
    }
    let secs = level.level_time as f32 / TICRATE as f32;
    if secs < chain.start || (chain.end > 0.0 && secs > chain.end) {
        return false;
    }

    let special = match class {
        ChainClass::Function => line_type.unwrap_or(chain.line_type),
        _ => chain.line_type,
    };
    let event = SyntheticLine {
        sector,
        special,
        tag: level.map_data.sectors[sector].tag,
        active: class != ChainClass::Function && !activating,
    };
    let kind = match class {
        ChainClass::Function => LineEventKind::Function,
        _ => LineEventKind::Chain,
    };
    debug!(
        target: "xg",
        "Sector {} fires {:?} chain with line type {}",
        sector, class, special
    );
    if !line_event(level, kind, LineSource::Synthetic(event), activator) {
        return false;
    }

    let timer = level.random.range(chain.interval[0], chain.interval[1]);
    if let Some(xg) = level.xg.sectors[sector].as_mut() {
        // The event may have replaced the sector type
        if xg.info.chains[c] == chain {
            xg.chain_timers[c] = timer;
            if xg.chain_counts[c] > 0 {
                xg.chain_counts[c] -= 1;
            }
        }
    }
    true
}

/// Run the floor, ceiling or inside chain against everything linked in to
/// the sector.
pub(crate) fn check_occupants(level: &mut Level, sector: usize, class: ChainClass) {
    let Some(flags) = level.xg.sectors[sector]
        .as_ref()
        .map(|xg| xg.info.chains[class as usize].flags)
    else {
        return;
    };
    let (floor, ceiling) = {
        let sec = &level.map_data.sectors[sector];
        (sec.floorheight, sec.ceilingheight)
    };

    for id in level.map_data.sectors[sector].thinglist.clone() {
        let Some(mobj) = level.thinkers.mobj(id) else {
            continue;
        };
        let touching = match class {
            ChainClass::Floor => mobj.z == floor,
            ChainClass::Ceiling => mobj.z + mobj.height == ceiling,
            ChainClass::Inside => true,
            ChainClass::Ticker | ChainClass::Function => false,
        };
        if !touching {
            continue;
        }
        if let Some(activating) = chain_direction(flags, actor_category(mobj)) {
            do_chain(level, sector, class, None, activating, Some(id));
        }
    }
}
