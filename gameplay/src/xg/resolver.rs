//! Symbolic plane and sector references, resolved against the live map.

use std::str::FromStr;

use log::debug;

use crate::env::specials::{plane_height, surrounding_sectors, Plane};
use crate::level::Level;
use crate::xg::XgError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallSection {
    Top,
    Middle,
    Bottom,
}

/// Where a height (and material) is taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaneRef {
    #[default]
    None,
    /// Front sector of the acting line
    My(Plane),
    /// Back sector of the acting line
    Back(Plane),
    /// Height of the origin sector as the map was loaded
    Original(Plane),
    Current(Plane),
    Highest(Plane),
    Lowest(Plane),
    NextHighest(Plane),
    NextLowest(Plane),
    /// Lowest edge implied by a wall texture on the origin's lines
    MinTexture(WallSection),
    MaxTexture(WallSection),
    /// First sector with the aux tag
    Tagged(Plane),
    /// First sector with the acting line's tag
    LineTagged(Plane),
    /// First sector whose extended type has the aux act tag
    ActTagged(Plane),
    /// Sector number aux
    Index(Plane),
}

fn split_plane(name: &str) -> Option<(&str, Plane)> {
    if let Some(kind) = name.strip_suffix("-floor") {
        return Some((kind, Plane::Floor));
    }
    name.strip_suffix("-ceiling")
        .map(|kind| (kind, Plane::Ceiling))
}

impl FromStr for PlaneRef {
    type Err = XgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if name.is_empty() || name == "none" {
            return Ok(PlaneRef::None);
        }
        let texture = |kind: &str| match kind {
            "top" => Some(WallSection::Top),
            "middle" => Some(WallSection::Middle),
            "bottom" => Some(WallSection::Bottom),
            _ => None,
        };
        if let Some(section) = name
            .strip_prefix("min-")
            .and_then(|r| r.strip_suffix("-texture"))
            .and_then(texture)
        {
            return Ok(PlaneRef::MinTexture(section));
        }
        if let Some(section) = name
            .strip_prefix("max-")
            .and_then(|r| r.strip_suffix("-texture"))
            .and_then(texture)
        {
            return Ok(PlaneRef::MaxTexture(section));
        }

        let unknown = || XgError::UnknownName {
            kind: "plane reference",
            name: s.to_owned(),
        };
        let (kind, plane) = split_plane(&name).ok_or_else(unknown)?;
        Ok(match kind {
            "my" => PlaneRef::My(plane),
            "back" => PlaneRef::Back(plane),
            "original" => PlaneRef::Original(plane),
            "current" => PlaneRef::Current(plane),
            "highest" => PlaneRef::Highest(plane),
            "lowest" => PlaneRef::Lowest(plane),
            "next-highest" => PlaneRef::NextHighest(plane),
            "next-lowest" => PlaneRef::NextLowest(plane),
            "tagged" => PlaneRef::Tagged(plane),
            "line-tagged" => PlaneRef::LineTagged(plane),
            "act-tagged" => PlaneRef::ActTagged(plane),
            "index" => PlaneRef::Index(plane),
            _ => return Err(unknown()),
        })
    }
}

/// Which sectors a line class acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectorTarget {
    #[default]
    None,
    /// Front sector of the acting line, or the sector of a chain event
    Mine,
    Back,
    /// Every sector with this tag
    Tagged(i32),
    /// Every sector with the acting line's tag
    LineTagged,
    /// Every sector whose extended type has this act tag
    ActTagged(i32),
    Index(usize),
}

impl FromStr for SectorTarget {
    type Err = XgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let (kind, aux) = match name.split_once(':') {
            Some((kind, aux)) => (kind, Some(aux.trim())),
            None => (name.as_str(), None),
        };
        let bad = || XgError::UnknownName {
            kind: "sector target",
            name: s.to_owned(),
        };
        let number = |aux: Option<&str>| -> Result<i32, XgError> {
            aux.and_then(|a| a.parse().ok()).ok_or_else(bad)
        };
        Ok(match kind {
            "" | "none" => SectorTarget::None,
            "mine" => SectorTarget::Mine,
            "back" => SectorTarget::Back,
            "tagged" => SectorTarget::Tagged(number(aux)?),
            "line-tagged" => SectorTarget::LineTagged,
            "act-tagged" => SectorTarget::ActTagged(number(aux)?),
            "index" => SectorTarget::Index(number(aux)?.max(0) as usize),
            _ => return Err(bad()),
        })
    }
}

/// The line (real or synthetic) an effect is acting through
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActContext {
    pub line: Option<usize>,
    pub front: Option<usize>,
    pub back: Option<usize>,
    pub tag: i32,
}

/// A resolved plane: its height, its material, and the sector it belongs to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSpot {
    pub height: f32,
    pub material: usize,
    pub sector: usize,
}

fn spot(level: &Level, sector: usize, plane: Plane) -> PlaneSpot {
    let sec = &level.map_data.sectors[sector];
    let (height, material) = match plane {
        Plane::Floor => (sec.floorheight, sec.floorpic),
        Plane::Ceiling => (sec.ceilingheight, sec.ceilingpic),
    };
    PlaneSpot {
        height,
        material,
        sector,
    }
}

fn first_sector(level: &Level, what: &str, matches: impl Fn(usize) -> bool) -> Option<usize> {
    let mut found = (0..level.map_data.sectors.len()).filter(|&i| matches(i));
    let first = found.next();
    if first.is_some() && found.next().is_some() {
        debug!(target: "xg", "More than one sector matches {}, using {:?}", what, first);
    }
    first
}

fn act_tag_of(level: &Level, sector: usize) -> Option<i32> {
    level
        .xg
        .sectors
        .get(sector)
        .and_then(|x| x.as_ref())
        .map(|x| x.info.act_tag)
}

/// Resolve `reference` for a move started in `origin`. `None` means
/// nothing matched; the caller leaves that setting alone.
pub fn resolve_plane(
    level: &Level,
    act: &ActContext,
    origin: usize,
    reference: PlaneRef,
    aux: i32,
) -> Option<PlaneSpot> {
    let sectors = &level.map_data.sectors;
    let result = match reference {
        PlaneRef::None => None,
        PlaneRef::My(plane) => act.front.map(|s| spot(level, s, plane)),
        PlaneRef::Back(plane) => act.back.map(|s| spot(level, s, plane)),
        PlaneRef::Original(plane) => {
            let mut out = spot(level, origin, plane);
            out.height = match plane {
                Plane::Floor => sectors[origin].original_floor,
                Plane::Ceiling => sectors[origin].original_ceiling,
            };
            Some(out)
        }
        PlaneRef::Current(plane) => Some(spot(level, origin, plane)),
        PlaneRef::Highest(plane) => Some(extreme(level, origin, plane, |a, b| a > b, None)),
        PlaneRef::Lowest(plane) => Some(extreme(level, origin, plane, |a, b| a < b, None)),
        PlaneRef::NextHighest(plane) => {
            let current = plane_height(level, origin, plane);
            Some(extreme(level, origin, plane, |a, b| a < b, Some(&|h: f32| h > current)))
        }
        PlaneRef::NextLowest(plane) => {
            let current = plane_height(level, origin, plane);
            Some(extreme(level, origin, plane, |a, b| a > b, Some(&|h: f32| h < current)))
        }
        PlaneRef::MinTexture(section) => texture_extreme(level, origin, section, |a, b| a < b),
        PlaneRef::MaxTexture(section) => texture_extreme(level, origin, section, |a, b| a > b),
        PlaneRef::Tagged(plane) => first_sector(level, "tag", |i| sectors[i].tag == aux)
            .map(|s| spot(level, s, plane)),
        PlaneRef::LineTagged(plane) => first_sector(level, "line tag", |i| sectors[i].tag == act.tag)
            .map(|s| spot(level, s, plane)),
        PlaneRef::ActTagged(plane) => {
            first_sector(level, "act tag", |i| act_tag_of(level, i) == Some(aux))
                .map(|s| spot(level, s, plane))
        }
        PlaneRef::Index(plane) => usize::try_from(aux)
            .ok()
            .filter(|&i| i < sectors.len())
            .map(|s| spot(level, s, plane)),
    };

    if result.is_none() && reference != PlaneRef::None {
        debug!(target: "xg", "Could not resolve {:?} ({}) from sector {}", reference, aux, origin);
    }
    result
}

/// The neighbouring plane that `better` prefers over every other, the first
/// one found winning ties. With no neighbour that qualifies, the origin
/// itself.
fn extreme(
    level: &Level,
    origin: usize,
    plane: Plane,
    better: impl Fn(f32, f32) -> bool,
    qualifies: Option<&dyn Fn(f32) -> bool>,
) -> PlaneSpot {
    let mut best: Option<PlaneSpot> = None;
    for other in surrounding_sectors(level, origin) {
        let candidate = spot(level, other, plane);
        if qualifies.is_some_and(|q| !q(candidate.height)) {
            continue;
        }
        if best.is_none_or(|b| better(candidate.height, b.height)) {
            best = Some(candidate);
        }
    }
    best.unwrap_or_else(|| spot(level, origin, plane))
}

fn texture_extreme(
    level: &Level,
    origin: usize,
    section: WallSection,
    better: impl Fn(f32, f32) -> bool,
) -> Option<PlaneSpot> {
    let map = &level.map_data;
    let sec = &map.sectors[origin];
    let mut best: Option<f32> = None;

    for &l in &sec.lines {
        let line = &map.linedefs[l];
        let sides = [Some(line.front_sidedef), line.back_sidedef];
        for side in sides.into_iter().flatten() {
            let side = &map.sidedefs()[side];
            let texture = match section {
                WallSection::Top => side.toptexture,
                WallSection::Middle => side.midtexture,
                WallSection::Bottom => side.bottomtexture,
            };
            let Some(height) = texture.and_then(|t| map.texture_height(t)) else {
                continue;
            };
            // The edge the texture would reach when pegged to the origin's planes
            let edge = match section {
                WallSection::Top => sec.ceilingheight - height,
                WallSection::Middle | WallSection::Bottom => sec.floorheight + height,
            };
            if best.is_none_or(|b| better(edge, b)) {
                best = Some(edge);
            }
        }
    }

    best.map(|height| PlaneSpot {
        height,
        material: match section {
            WallSection::Top => sec.ceilingpic,
            WallSection::Middle | WallSection::Bottom => sec.floorpic,
        },
        sector: origin,
    })
}

/// Every sector `target` names, in ascending index order
pub fn target_sectors(level: &Level, act: &ActContext, target: SectorTarget) -> Vec<usize> {
    let sectors = &level.map_data.sectors;
    match target {
        SectorTarget::None => Vec::new(),
        SectorTarget::Mine => act.front.into_iter().collect(),
        SectorTarget::Back => act.back.into_iter().collect(),
        SectorTarget::Tagged(tag) => (0..sectors.len()).filter(|&i| sectors[i].tag == tag).collect(),
        SectorTarget::LineTagged => (0..sectors.len())
            .filter(|&i| sectors[i].tag == act.tag)
            .collect(),
        SectorTarget::ActTagged(tag) => (0..sectors.len())
            .filter(|&i| act_tag_of(level, i) == Some(tag))
            .collect(),
        SectorTarget::Index(i) => (i < sectors.len()).then_some(i).into_iter().collect(),
    }
}

/// The acting context of a real line
pub fn line_context(level: &Level, line: usize) -> ActContext {
    let l = &level.map_data.linedefs[line];
    ActContext {
        line: Some(line),
        front: Some(l.frontsector),
        back: l.backsector,
        tag: l.tag,
    }
}
