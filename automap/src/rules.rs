//! Per game tables: which line specials are coloured as doors, the player
//! arrow shapes, key things, and the reveal cheat.

use gameplay::GameVariant;
use gamestate_traits::Colour;

/// Where the decorative glow of a door line sits
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Glow {
    /// Centred on the line, both sides
    TwoSided,
    /// On the front side only
    Front,
    /// On the back side only
    Back,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DoorLine {
    pub special: i32,
    pub colour: Colour,
    pub glow: Glow,
}

/// A key thing shown as a coloured marker
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct KeyMarker {
    pub kind: u16,
    pub colour: Colour,
}

/// Line segments in units of the arrow radius, pointing along +x
pub type Segment = [f32; 4];

pub struct MapRules {
    pub variant: GameVariant,
    pub doors: &'static [DoorLine],
    pub arrow: &'static [Segment],
    pub cheat_arrow: &'static [Segment],
    pub keys: &'static [KeyMarker],
    /// Typed with the map open to cycle the reveal level
    pub cheat: &'static str,
    /// Kill, item and secret counters can be shown
    pub counters: bool,
    /// Netgame player colours, by player number
    pub player_colours: [Colour; 4],
}

impl MapRules {
    pub fn for_variant(variant: GameVariant) -> &'static MapRules {
        match variant {
            GameVariant::Doom => &DOOM,
            GameVariant::Heretic => &HERETIC,
            GameVariant::Hexen => &HEXEN,
        }
    }

    pub fn door(&self, special: i32) -> Option<&DoorLine> {
        if special == 0 {
            return None;
        }
        self.doors.iter().find(|d| d.special == special)
    }

    pub fn key(&self, kind: u16) -> Option<&KeyMarker> {
        self.keys.iter().find(|k| k.kind == kind)
    }
}

const BLUE: Colour = Colour::rgb(0.0, 0.0, 0.78);
const RED: Colour = Colour::rgb(0.78, 0.0, 0.0);
const YELLOW: Colour = Colour::rgb(0.94, 0.94, 0.0);
const GREEN: Colour = Colour::rgb(0.0, 0.72, 0.0);
const TELEPORT: Colour = Colour::rgb(0.0, 0.78, 0.0);
const GREY: Colour = Colour::rgb(0.55, 0.55, 0.55);
const BROWN: Colour = Colour::rgb(0.6, 0.4, 0.2);

const fn door(special: i32, colour: Colour, glow: Glow) -> DoorLine {
    DoorLine {
        special,
        colour,
        glow,
    }
}

const fn key(kind: u16, colour: Colour) -> KeyMarker {
    KeyMarker { kind, colour }
}

const R: f32 = 1.0;

const DOOM_ARROW: [Segment; 7] = [
    [-R + R / 8.0, 0.0, R, 0.0],
    [R, 0.0, R - R / 2.0, R / 4.0],
    [R, 0.0, R - R / 2.0, -R / 4.0],
    [-R + R / 8.0, 0.0, -R - R / 8.0, R / 4.0],
    [-R + R / 8.0, 0.0, -R - R / 8.0, -R / 4.0],
    [-R + 3.0 * R / 8.0, 0.0, -R + R / 8.0, R / 4.0],
    [-R + 3.0 * R / 8.0, 0.0, -R + R / 8.0, -R / 4.0],
];

/// The arrow with `ddt` written along it
const DOOM_CHEAT_ARROW: [Segment; 16] = [
    [-R + R / 8.0, 0.0, R, 0.0],
    [R, 0.0, R - R / 2.0, R / 6.0],
    [R, 0.0, R - R / 2.0, -R / 6.0],
    [-R + R / 8.0, 0.0, -R - R / 8.0, R / 6.0],
    [-R + R / 8.0, 0.0, -R - R / 8.0, -R / 6.0],
    [-R + 3.0 * R / 8.0, 0.0, -R + R / 8.0, R / 6.0],
    [-R + 3.0 * R / 8.0, 0.0, -R + R / 8.0, -R / 6.0],
    [-R / 2.0, 0.0, -R / 2.0, -R / 6.0],
    [-R / 2.0, -R / 6.0, -R / 2.0 + R / 6.0, -R / 6.0],
    [-R / 2.0 + R / 6.0, -R / 6.0, -R / 2.0 + R / 6.0, R / 4.0],
    [-R / 6.0, 0.0, -R / 6.0, -R / 6.0],
    [-R / 6.0, -R / 6.0, 0.0, -R / 6.0],
    [0.0, -R / 6.0, 0.0, R / 4.0],
    [R / 6.0, R / 4.0, R / 6.0, -R / 7.0],
    [R / 6.0, -R / 7.0, R / 6.0 + R / 32.0, -R / 7.0 - R / 32.0],
    [R / 6.0 + R / 32.0, -R / 7.0 - R / 32.0, R / 6.0 + R / 10.0, -R / 7.0],
];

/// A sword
const RAVEN_ARROW: [Segment; 10] = [
    [-R + R / 4.0, 0.0, 0.0, 0.0],
    [-R + R / 4.0, R / 8.0, R, 0.0],
    [-R + R / 4.0, -R / 8.0, R, 0.0],
    [-R + R / 4.0, -R / 4.0, -R + R / 4.0, R / 4.0],
    [-R + R / 8.0, -R / 4.0, -R + R / 8.0, R / 4.0],
    [-R + R / 8.0, -R / 4.0, -R + R / 4.0, -R / 4.0],
    [-R + R / 8.0, R / 4.0, -R + R / 4.0, R / 4.0],
    [-R - R / 4.0, R / 8.0, -R - R / 4.0, -R / 8.0],
    [-R - R / 4.0, R / 8.0, -R + R / 8.0, R / 8.0],
    [-R - R / 4.0, -R / 8.0, -R + R / 8.0, -R / 8.0],
];

static DOOM: MapRules = MapRules {
    variant: GameVariant::Doom,
    doors: &[
        door(26, BLUE, Glow::TwoSided),
        door(32, BLUE, Glow::TwoSided),
        door(99, BLUE, Glow::TwoSided),
        door(133, BLUE, Glow::TwoSided),
        door(27, YELLOW, Glow::TwoSided),
        door(34, YELLOW, Glow::TwoSided),
        door(136, YELLOW, Glow::TwoSided),
        door(137, YELLOW, Glow::TwoSided),
        door(28, RED, Glow::TwoSided),
        door(33, RED, Glow::TwoSided),
        door(134, RED, Glow::TwoSided),
        door(135, RED, Glow::TwoSided),
        door(39, TELEPORT, Glow::Front),
        door(97, TELEPORT, Glow::Front),
        door(125, TELEPORT, Glow::Front),
        door(126, TELEPORT, Glow::Front),
    ],
    arrow: &DOOM_ARROW,
    cheat_arrow: &DOOM_CHEAT_ARROW,
    keys: &[
        key(5, BLUE),
        key(40, BLUE),
        key(6, YELLOW),
        key(39, YELLOW),
        key(13, RED),
        key(38, RED),
    ],
    cheat: "iddt",
    counters: true,
    player_colours: [GREEN, GREY, BROWN, RED],
};

static HERETIC: MapRules = MapRules {
    variant: GameVariant::Heretic,
    doors: &[
        door(26, BLUE, Glow::TwoSided),
        door(32, BLUE, Glow::TwoSided),
        door(27, YELLOW, Glow::TwoSided),
        door(34, YELLOW, Glow::TwoSided),
        door(28, GREEN, Glow::TwoSided),
        door(33, GREEN, Glow::TwoSided),
        door(39, TELEPORT, Glow::Front),
        door(97, TELEPORT, Glow::Front),
    ],
    arrow: &RAVEN_ARROW,
    cheat_arrow: &RAVEN_ARROW,
    keys: &[key(73, GREEN), key(79, BLUE), key(80, YELLOW)],
    cheat: "ravmap",
    counters: true,
    player_colours: [GREEN, YELLOW, RED, BLUE],
};

static HEXEN: MapRules = MapRules {
    variant: GameVariant::Hexen,
    doors: &[
        door(13, YELLOW, Glow::TwoSided),
        door(70, TELEPORT, Glow::Front),
        door(71, TELEPORT, Glow::Front),
        door(74, RED, Glow::Back),
        door(75, RED, Glow::Back),
    ],
    arrow: &RAVEN_ARROW,
    cheat_arrow: &RAVEN_ARROW,
    keys: &[],
    cheat: "mapsco",
    counters: false,
    player_colours: [BLUE, RED, YELLOW, GREEN],
};
