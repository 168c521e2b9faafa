//! Extended generalised sectors and lines.
//!
//! Sectors whose special names an extended sector type run scripted
//! functions on their planes, light and colour every tic, push what is in
//! them with wind, scroll their flats, and fire chained line events. Lines
//! whose special names an extended line type move planes, build stairs,
//! change sector types and so on when crossed, used or shot.

mod chain;
mod defs;
mod function;
mod line;
mod mover;
mod resolver;
mod sector;
mod stairs;
#[cfg(test)]
mod tests;

use std::rc::Rc;

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use log::info;

use crate::level::Level;

pub use chain::{do_chain, ChainClass, ChainFlag, NUM_CHAINS};
pub use defs::{
    ActorCategory, Chain, ChainDef, ChannelDef, Definitions, DefinitionsDef, LineClass,
    LineEventKind, LineType, LineTypeDef, MovePlaneDef, MoverSounds, SectorFlag, SectorType,
    SectorTypeDef, StairsDef, XgError,
};
pub use function::{Channel, Function, FunctionDef, NUM_CHANNELS};
pub use line::{
    activate_line, cross_line, line_event, set_line_type, shoot_line, use_line, LineSource,
    SyntheticLine, XgLine,
};
pub use mover::{movers_on, start_plane_mover, stop_mover, MoverFlag, MoverState, PlaneMover};
pub use resolver::{
    resolve_plane, target_sectors, ActContext, PlaneRef, PlaneSpot, SectorTarget, WallSection,
};
pub use sector::{set_sector_type, XgSector};
pub use stairs::build_stairs;

/// Extended state for one level
pub struct XgState {
    pub(crate) sectors: Vec<Option<XgSector>>,
    /// Stair builder bookkeeping: the step each sector was built at
    pub(crate) built: Vec<Option<u32>>,
    defs: Rc<Definitions>,
}

impl XgState {
    pub fn new(defs: Rc<Definitions>, sector_count: usize) -> Self {
        Self {
            sectors: vec![None; sector_count],
            built: vec![None; sector_count],
            defs,
        }
    }

    pub fn definitions(&self) -> &Definitions {
        &self.defs
    }

    pub fn sector(&self, sector: usize) -> Option<&XgSector> {
        self.sectors.get(sector).and_then(|s| s.as_ref())
    }

    /// Sectors that currently have extended state
    pub fn active_sectors(&self) -> impl Iterator<Item = (usize, &XgSector)> + '_ {
        self.sectors
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (i, s)))
    }
}

/// Give every sector and line with an extended special its runtime state
pub fn spawn_specials(level: &mut Level) {
    for sector in 0..level.map_data.sectors.len() {
        let special = level.map_data.sectors[sector].special;
        if special != 0 {
            set_sector_type(level, sector, special);
        }
    }
    for line in 0..level.map_data.linedefs.len() {
        let special = level.map_data.linedefs[line].special;
        if special != 0 {
            set_line_type(level, line, special);
        }
    }

    let lines = level
        .map_data
        .linedefs
        .iter()
        .filter(|l| l.xg.is_some())
        .count();
    info!(
        "Spawned {} extended sectors and {} extended lines",
        level.xg.active_sectors().count(),
        lines
    );
}

/// Run every extended sector for one tic, in index order
pub fn ticker(level: &mut Level) {
    #[cfg(feature = "hprof")]
    profile!("xg_ticker");
    for sector in 0..level.xg.sectors.len() {
        sector::think(level, sector);
    }
}
