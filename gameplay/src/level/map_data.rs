//! Map geometry at runtime, built from a RON map description.

use std::{error::Error, fmt};

use glam::Vec2;
use log::{debug, info};
use nanoserde::{DeRon, SerRon};

use crate::level::map_defs::{BBox, LineDef, Sector, SideDef};
use crate::LineDefFlags;

#[derive(Debug, Clone, Default, DeRon, SerRon)]
pub struct VertexDesc {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default, DeRon, SerRon)]
pub struct SectorDesc {
    pub floor: f32,
    pub ceiling: f32,
    #[nserde(default)]
    pub floor_pic: usize,
    #[nserde(default)]
    pub ceiling_pic: usize,
    /// Doom style light, 0 to 255
    pub light: f32,
    #[nserde(default)]
    pub special: i32,
    #[nserde(default)]
    pub tag: i32,
}

#[derive(Debug, Clone, Default, DeRon, SerRon)]
pub struct SideDesc {
    pub sector: usize,
    #[nserde(default)]
    pub top: Option<usize>,
    #[nserde(default)]
    pub middle: Option<usize>,
    #[nserde(default)]
    pub bottom: Option<usize>,
    #[nserde(default)]
    pub x_offset: f32,
    #[nserde(default)]
    pub y_offset: f32,
}

#[derive(Debug, Clone, Default, DeRon, SerRon)]
pub struct LineDesc {
    pub v1: usize,
    pub v2: usize,
    /// Index of the front side
    pub front: usize,
    #[nserde(default)]
    pub back: Option<usize>,
    #[nserde(default)]
    pub flags: u32,
    #[nserde(default)]
    pub special: i32,
    #[nserde(default)]
    pub tag: i32,
}

#[derive(Debug, Clone, Default, DeRon, SerRon)]
pub struct ThingDesc {
    pub x: f32,
    pub y: f32,
    /// Degrees
    #[nserde(default)]
    pub angle: f32,
    /// Editor number. 1-4 are the player starts.
    pub kind: u16,
    /// Any of "solid", "shootable", "count-kill", "count-item", "missile"
    #[nserde(default)]
    pub flags: Vec<String>,
    #[nserde(default)]
    pub radius: Option<f32>,
    #[nserde(default)]
    pub height: Option<f32>,
}

/// The on-disk form of a map
#[derive(Debug, Clone, Default, DeRon, SerRon)]
pub struct MapDescription {
    pub name: String,
    pub vertexes: Vec<VertexDesc>,
    pub sectors: Vec<SectorDesc>,
    pub sides: Vec<SideDesc>,
    pub lines: Vec<LineDesc>,
    #[nserde(default)]
    pub things: Vec<ThingDesc>,
    /// Height of each wall texture, indexed by texture number
    #[nserde(default)]
    pub texture_heights: Vec<f32>,
}

#[derive(Debug)]
pub enum MapError {
    Ron(String),
    BadIndex { kind: &'static str, index: usize },
    NoSectors,
}

impl Error for MapError {}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Ron(m) => write!(f, "could not parse map: {}", m),
            MapError::BadIndex { kind, index } => {
                write!(f, "map references missing {} {}", kind, index)
            }
            MapError::NoSectors => write!(f, "map has no sectors"),
        }
    }
}

/// The smallest vector and the largest vertex, combined make up a
/// rectangle enclosing the level area
#[derive(Debug, Default, Clone)]
pub struct MapExtents {
    pub min_vertex: Vec2,
    pub max_vertex: Vec2,
    pub width: f32,
    pub height: f32,
    pub min_floor: f32,
    pub max_ceiling: f32,
}

/// Access to the `Vec` arrays is by index everywhere else in the crate, so
/// the arrays are never resized after loading.
#[derive(Default)]
pub struct MapData {
    name: String,
    things: Vec<ThingDesc>,
    pub vertexes: Vec<Vec2>,
    pub linedefs: Vec<LineDef>,
    pub sectors: Vec<Sector>,
    sidedefs: Vec<SideDef>,
    texture_heights: Vec<f32>,
    extents: MapExtents,
}

impl MapData {
    pub fn from_ron(text: &str) -> Result<Self, MapError> {
        let desc = MapDescription::deserialize_ron(text).map_err(|e| MapError::Ron(e.to_string()))?;
        Self::from_description(&desc)
    }

    pub fn from_description(desc: &MapDescription) -> Result<Self, MapError> {
        if desc.sectors.is_empty() {
            return Err(MapError::NoSectors);
        }

        let vertexes: Vec<Vec2> = desc.vertexes.iter().map(|v| Vec2::new(v.x, v.y)).collect();

        let sectors: Vec<Sector> = desc
            .sectors
            .iter()
            .enumerate()
            .map(|(num, s)| {
                Sector::new(
                    num,
                    s.floor,
                    s.ceiling,
                    s.floor_pic,
                    s.ceiling_pic,
                    (s.light / 255.0).clamp(0.0, 1.0),
                    s.special,
                    s.tag,
                )
            })
            .collect();

        let mut sidedefs = Vec::with_capacity(desc.sides.len());
        for side in &desc.sides {
            if side.sector >= sectors.len() {
                return Err(MapError::BadIndex {
                    kind: "sector",
                    index: side.sector,
                });
            }
            sidedefs.push(SideDef {
                textureoffset: side.x_offset,
                rowoffset: side.y_offset,
                toptexture: side.top,
                bottomtexture: side.bottom,
                midtexture: side.middle,
                sector: side.sector,
            });
        }

        let vertex = |index: usize| -> Result<Vec2, MapError> {
            vertexes.get(index).copied().ok_or(MapError::BadIndex {
                kind: "vertex",
                index,
            })
        };
        let side_sector = |index: usize| -> Result<usize, MapError> {
            sidedefs
                .get(index)
                .map(|s: &SideDef| s.sector)
                .ok_or(MapError::BadIndex { kind: "side", index })
        };

        let mut linedefs = Vec::with_capacity(desc.lines.len());
        for (num, line) in desc.lines.iter().enumerate() {
            let v1 = vertex(line.v1)?;
            let v2 = vertex(line.v2)?;
            let frontsector = side_sector(line.front)?;
            let backsector = match line.back {
                Some(back) => Some(side_sector(back)?),
                None => None,
            };
            let mut flags = line.flags;
            if backsector.is_some() {
                flags |= LineDefFlags::TwoSided as u32;
            }
            linedefs.push(LineDef {
                num,
                v1,
                v2,
                delta: v2 - v1,
                flags,
                special: line.special,
                tag: line.tag,
                bbox: BBox::new(v1, v2),
                front_sidedef: line.front,
                back_sidedef: line.back,
                frontsector,
                backsector,
                xg: None,
            });
        }

        let mut map = Self {
            name: desc.name.clone(),
            things: desc.things.clone(),
            vertexes,
            linedefs,
            sectors,
            sidedefs,
            texture_heights: desc.texture_heights.clone(),
            extents: MapExtents::default(),
        };
        map.group_lines();
        map.set_extents();
        info!(
            "Loaded map {}: {} sectors, {} lines",
            map.name,
            map.sectors.len(),
            map.linedefs.len()
        );
        Ok(map)
    }

    /// Record each line against the sectors on either side of it, then set
    /// the bounds and sound origin of each sector.
    fn group_lines(&mut self) {
        for line in &self.linedefs {
            self.sectors[line.frontsector].lines.push(line.num);
            if let Some(back) = line.backsector {
                if back != line.frontsector {
                    self.sectors[back].lines.push(line.num);
                }
            }
        }

        for sector in self.sectors.iter_mut() {
            let mut bbox = BBox::default();
            for &line in &sector.lines {
                bbox.add_point(self.linedefs[line].v1);
                bbox.add_point(self.linedefs[line].v2);
            }
            if bbox.is_empty() {
                debug!("Sector {} has no lines", sector.num);
                continue;
            }
            sector.sound_origin = bbox.center();
            sector.bbox = bbox;
        }
    }

    pub fn set_extents(&mut self) {
        let mut bbox = BBox::default();
        for line in &self.linedefs {
            bbox.add_point(line.v1);
            bbox.add_point(line.v2);
        }
        if bbox.is_empty() {
            bbox = BBox::new(Vec2::ZERO, Vec2::ZERO);
        }
        self.extents.min_vertex = bbox.min();
        self.extents.max_vertex = bbox.max();
        self.extents.width = bbox.width();
        self.extents.height = bbox.height();

        let mut min = self.sectors[0].floorheight;
        let mut max = self.sectors[0].ceilingheight;
        for sector in self.sectors() {
            if sector.floorheight < min {
                min = sector.floorheight;
            }
            if sector.ceilingheight > max {
                max = sector.ceilingheight;
            }
        }
        self.extents.min_floor = min;
        self.extents.max_ceiling = max;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn things(&self) -> &[ThingDesc] {
        &self.things
    }

    pub fn linedefs(&self) -> &[LineDef] {
        &self.linedefs
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn sectors_mut(&mut self) -> &mut [Sector] {
        &mut self.sectors
    }

    pub fn sidedefs(&self) -> &[SideDef] {
        &self.sidedefs
    }

    pub fn get_map_extents(&self) -> &MapExtents {
        &self.extents
    }

    /// The height of a wall texture, `None` if the texture is unknown
    pub fn texture_height(&self, texture: usize) -> Option<f32> {
        self.texture_heights.get(texture).copied()
    }

    /// Find the sector containing `point`. Where sectors nest, the smallest
    /// enclosing sector wins.
    pub fn sector_at_point(&self, point: Vec2) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for sector in &self.sectors {
            if sector.bbox.is_empty()
                || point.x < sector.bbox.left
                || point.x > sector.bbox.right
                || point.y < sector.bbox.bottom
                || point.y > sector.bbox.top
            {
                continue;
            }

            let mut inside = false;
            for &l in &sector.lines {
                let line = &self.linedefs[l];
                if line.backsector == Some(line.frontsector) {
                    continue;
                }
                let (a, b) = (line.v1, line.v2);
                if (a.y > point.y) != (b.y > point.y) {
                    let cross = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
                    if point.x < cross {
                        inside = !inside;
                    }
                }
            }

            if inside {
                let area = sector.bbox.width() * sector.bbox.height();
                if best.map_or(true, |(_, a)| area < a) {
                    best = Some((sector.num, area));
                }
            }
        }
        best.map(|(num, _)| num)
    }
}
