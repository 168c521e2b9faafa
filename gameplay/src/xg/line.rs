//! Extended line types and the line event entry point shared by real lines
//! and sector chains.

use log::debug;

use crate::level::Level;
use crate::thinker::ThinkerId;
use crate::xg::chain::actor_category;
use crate::xg::defs::{LineClass, LineEventKind, LineType};
use crate::xg::mover::{start_plane_mover, PlaneMover};
use crate::xg::resolver::{line_context, resolve_plane, target_sectors, ActContext, SectorTarget};
use crate::xg::sector::set_sector_type;
use crate::xg::stairs::build_stairs;

/// Runtime state of a real line with an extended type
#[derive(Debug, Clone)]
pub struct XgLine {
    pub info: LineType,
    pub active: bool,
    /// Activations left, negative for unlimited
    pub count: i32,
    /// Who last changed the state
    pub activator: Option<ThinkerId>,
}

impl XgLine {
    pub fn new(info: LineType) -> Self {
        let count = info.count;
        Self {
            info,
            active: false,
            count,
            activator: None,
        }
    }
}

/// A line event with no line behind it, from a sector chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticLine {
    pub sector: usize,
    pub special: i32,
    pub tag: i32,
    /// State before the event. The event flips it.
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSource {
    Real(usize),
    Synthetic(SyntheticLine),
}

/// Give a real line an extended type, or clear it if `special` has none
pub fn set_line_type(level: &mut Level, line: usize, special: i32) {
    let info = level.definitions().line_type(special).cloned();
    let l = &mut level.map_data.linedefs[line];
    l.special = special;
    l.xg = info.map(XgLine::new);
}

/// Send an event to a line. The line's state flips; on activation its class
/// action runs. Returns false if the event was refused or the line type is
/// unknown.
pub fn line_event(
    level: &mut Level,
    kind: LineEventKind,
    source: LineSource,
    activator: Option<ThinkerId>,
) -> bool {
    let (info, active, act) = match source {
        LineSource::Real(line) => {
            let Some(xg) = level.map_data.linedefs[line].xg.as_ref() else {
                return false;
            };
            if xg.count == 0 {
                return false;
            }
            let gated = matches!(kind, LineEventKind::Cross | LineEventKind::Use | LineEventKind::Shoot);
            if gated && xg.info.events & kind as u32 == 0 {
                return false;
            }
            if gated {
                let category = activator.and_then(|id| level.thinkers.mobj(id)).map(actor_category);
                if category.is_none_or(|c| xg.info.activators & c.bit() == 0) {
                    return false;
                }
            }
            (xg.info.clone(), xg.active, line_context(level, line))
        }
        LineSource::Synthetic(event) => {
            let Some(info) = level.definitions().line_type(event.special).cloned() else {
                debug!(
                    target: "xg",
                    "Sector {} chains to unknown line type {}",
                    event.sector, event.special
                );
                return false;
            };
            let act = ActContext {
                line: None,
                front: Some(event.sector),
                back: None,
                tag: event.tag,
            };
            (info, event.active, act)
        }
    };

    let activating = !active;
    if let LineSource::Real(line) = source {
        if let Some(xg) = level.map_data.linedefs[line].xg.as_mut() {
            xg.active = activating;
            xg.activator = activator;
            if activating && xg.count > 0 {
                xg.count -= 1;
            }
        }
    }
    debug!(
        target: "xg",
        "Line type {} {} by {:?}",
        info.id,
        if activating { "activated" } else { "deactivated" },
        kind
    );
    if activating {
        run_class(level, &info, &act, activator);
    }
    true
}

fn run_class(level: &mut Level, info: &LineType, act: &ActContext, activator: Option<ThinkerId>) {
    let target = match info.target {
        SectorTarget::ActTagged(0) => SectorTarget::ActTagged(info.act_tag),
        other => other,
    };
    let targets = target_sectors(level, act, target);

    match &info.class {
        LineClass::None => {}
        LineClass::MovePlane(def) => {
            for sector in targets {
                let Some(dest) =
                    resolve_plane(level, act, sector, def.destination, def.destination_aux)
                else {
                    continue;
                };
                let mut mover = PlaneMover::new(
                    sector,
                    def.plane,
                    dest.height + def.destination_offset,
                    def.speed,
                )
                .with_wait(def.wait);
                mover.origin = act.line;
                mover.flags = def.flags;
                mover.crush_speed = def.crush_speed;
                mover.set_material = resolve_plane(level, act, sector, def.material, def.material_aux)
                    .map(|spot| spot.material);
                mover.set_sector_type = def.sector_type;
                mover.sounds = def.sounds;
                mover.sound_interval = def.sound_interval;
                start_plane_mover(level, mover);
            }
        }
        LineClass::BuildStairs(def) => {
            for sector in targets {
                build_stairs(level, sector, def, act.line);
            }
        }
        LineClass::SetSectorType(special) => {
            for sector in targets {
                set_sector_type(level, sector, *special);
            }
        }
        LineClass::SetLight(light) => {
            for sector in targets {
                level.map_data.sectors[sector].lightlevel = *light;
            }
        }
        LineClass::EnableSector | LineClass::DisableSector => {
            let disabled = matches!(info.class, LineClass::DisableSector);
            for sector in targets {
                if let Some(xg) = level.xg.sectors[sector].as_mut() {
                    xg.disabled = disabled;
                }
            }
        }
        LineClass::ActivateLines(tag) | LineClass::DeactivateLines(tag) => {
            let activate = matches!(info.class, LineClass::ActivateLines(_));
            let lines: Vec<usize> = level
                .map_data
                .linedefs
                .iter()
                .filter(|l| l.tag == *tag && l.xg.is_some())
                .map(|l| l.num)
                .collect();
            for line in lines {
                activate_line(level, line, activate, activator);
            }
        }
    }
}

/// Put a real extended line in to the given state, running its action if
/// that activates it. Nothing happens if it is already in that state.
pub fn activate_line(level: &mut Level, line: usize, activate: bool, activator: Option<ThinkerId>) {
    let Some(xg) = level.map_data.linedefs[line].xg.as_ref() else {
        return;
    };
    if xg.active == activate {
        return;
    }
    line_event(level, LineEventKind::Chain, LineSource::Real(line), activator);
}

/// An object walked over the line
pub fn cross_line(level: &mut Level, line: usize, activator: ThinkerId) -> bool {
    line_event(level, LineEventKind::Cross, LineSource::Real(line), Some(activator))
}

/// An object pressed use on the line
pub fn use_line(level: &mut Level, line: usize, activator: ThinkerId) -> bool {
    line_event(level, LineEventKind::Use, LineSource::Real(line), Some(activator))
}

/// An object shot the line
pub fn shoot_line(level: &mut Level, line: usize, activator: ThinkerId) -> bool {
    line_event(level, LineEventKind::Shoot, LineSource::Real(line), Some(activator))
}
