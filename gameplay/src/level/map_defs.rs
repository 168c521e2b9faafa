use glam::Vec2;

use crate::thinker::ThinkerId;
use crate::xg::XgLine;

/// The SECTORS record, at runtime.
/// Stores things/mobjs.
#[derive(Default, Clone)]
pub struct Sector {
    /// An incremented "ID" of sorts.
    pub num: usize,
    pub floorheight: f32,
    pub ceilingheight: f32,
    /// Heights as loaded, or as last written by a mover flagged to record them
    pub original_floor: f32,
    pub original_ceiling: f32,
    /// Is a tag or index to patch
    pub floorpic: usize,
    /// Is a tag or index to patch
    pub ceilingpic: usize,
    /// Normalised light, 0.0 to 1.0
    pub lightlevel: f32,
    /// Normalised colour tint, each channel 0.0 to 1.0
    pub rgb: [f32; 3],
    pub special: i32,
    pub tag: i32,

    /// Flat scroll offsets
    pub floor_offset: Vec2,
    pub ceiling_offset: Vec2,

    /// origin for any sounds played by the sector
    pub sound_origin: Vec2,
    pub bbox: BBox,

    pub lines: Vec<usize>,

    // list of mobjs in sector
    pub(crate) thinglist: Vec<ThinkerId>,
}

impl std::fmt::Debug for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sector")
            .field("num", &self.num)
            .field("floorheight", &self.floorheight)
            .field("ceilingheight", &self.ceilingheight)
            .field("floorpic", &self.floorpic)
            .field("ceilingpic", &self.ceilingpic)
            .field("special", &self.special)
            .finish_non_exhaustive()
    }
}

impl Sector {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        num: usize,
        floorheight: f32,
        ceilingheight: f32,
        floorpic: usize,
        ceilingpic: usize,
        lightlevel: f32,
        special: i32,
        tag: i32,
    ) -> Self {
        Self {
            num,
            floorheight,
            ceilingheight,
            original_floor: floorheight,
            original_ceiling: ceilingheight,
            floorpic,
            ceilingpic,
            lightlevel,
            rgb: [1.0; 3],
            special,
            tag,
            ..Self::default()
        }
    }

    /// The mobjs currently linked in to this sector, in link order
    pub fn thinglist(&self) -> &[ThinkerId] {
        &self.thinglist
    }
}

#[derive(Debug, Clone)]
pub struct SideDef {
    // add this to the calculated texture column
    pub textureoffset: f32,

    // add this to the calculated texture top
    pub rowoffset: f32,

    pub toptexture: Option<usize>,
    pub bottomtexture: Option<usize>,
    pub midtexture: Option<usize>,

    // Sector the SideDef is facing.
    pub sector: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for BBox {
    /// An inverted box that any added point will overwrite
    fn default() -> Self {
        Self {
            top: f32::MIN,
            bottom: f32::MAX,
            left: f32::MAX,
            right: f32::MIN,
        }
    }
}

impl BBox {
    pub fn new(v1: Vec2, v2: Vec2) -> Self {
        let mut bbox = BBox::default();
        bbox.add_point(v1);
        bbox.add_point(v2);
        bbox
    }

    /// Grow the box to contain `point`. Each axis is compared on its own so
    /// a point can extend both a minimum and a maximum.
    pub fn add_point(&mut self, point: Vec2) {
        if point.x < self.left {
            self.left = point.x;
        }
        if point.x > self.right {
            self.right = point.x;
        }
        if point.y < self.bottom {
            self.bottom = point.y;
        }
        if point.y > self.top {
            self.top = point.y;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.bottom > self.top
    }

    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.top - self.bottom).max(0.0)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.left + (self.right - self.left) * 0.5,
            self.bottom + (self.top - self.bottom) * 0.5,
        )
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.left, self.bottom)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.right, self.top)
    }
}

pub struct LineDef {
    pub num: usize,
    // Vertices, from v1 to v2.
    pub v1: Vec2,
    pub v2: Vec2,
    // Precalculated v2 - v1 for side checking.
    pub delta: Vec2,
    pub flags: u32,
    pub special: i32,
    pub tag: i32,

    pub bbox: BBox,

    pub front_sidedef: usize,
    pub back_sidedef: Option<usize>,

    // Front and back sector.
    pub frontsector: usize,
    pub backsector: Option<usize>,

    /// Runtime state when the special is an extended line type
    pub xg: Option<XgLine>,
}

impl std::fmt::Debug for LineDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linedef")
            .field("num", &self.num)
            .field("v1", &self.v1)
            .field("v2", &self.v2)
            .field("flags", &self.flags)
            .field("special", &self.special)
            .field("tag", &self.tag)
            .field("frontsector", &self.frontsector)
            .field("backsector", &self.backsector)
            .finish_non_exhaustive()
    }
}

impl LineDef {
    /// True if the right side of the segment faces the point
    pub fn is_facing_point(&self, point: &Vec2) -> bool {
        let start = &self.v1;
        let end = &self.v2;

        let d = (end.y - start.y) * (start.x - point.x) - (end.x - start.x) * (start.y - point.y);
        d < 0.0
    }

    pub fn point_on_side(&self, v: Vec2) -> usize {
        let dx = v.x - self.v1.x;
        let dy = v.y - self.v1.y;

        if (dy * self.delta.x) <= (self.delta.y * dx) {
            // Front side
            return 0;
        }
        // Backside
        1
    }

    pub fn is_two_sided(&self) -> bool {
        self.backsector.is_some()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::BBox;

    #[test]
    fn bbox_single_point_sets_both_extremes() {
        let mut bbox = BBox::default();
        assert!(bbox.is_empty());
        bbox.add_point(Vec2::new(10.0, -5.0));
        assert_eq!(bbox.left, 10.0);
        assert_eq!(bbox.right, 10.0);
        assert_eq!(bbox.bottom, -5.0);
        assert_eq!(bbox.top, -5.0);
    }

    #[test]
    fn bbox_descending_points() {
        // Points that only ever decrease must still settle the maximums
        let mut bbox = BBox::default();
        for p in [
            Vec2::new(100.0, 100.0),
            Vec2::new(50.0, 50.0),
            Vec2::new(-20.0, 0.0),
        ] {
            bbox.add_point(p);
        }
        assert_eq!(bbox.min(), Vec2::new(-20.0, 0.0));
        assert_eq!(bbox.max(), Vec2::new(100.0, 100.0));
        assert_eq!(bbox.width(), 120.0);
        assert_eq!(bbox.center(), Vec2::new(40.0, 50.0));
    }
}
