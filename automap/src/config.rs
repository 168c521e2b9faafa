use gamestate_traits::Colour;
use log::debug;
use nanoserde::{DeRon, SerRon};

#[derive(Debug, Default, Copy, Clone, PartialEq, DeRon, SerRon)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn colour(self, a: f32) -> Colour {
        Colour::new(self.r, self.g, self.b, a)
    }
}

/// Counter bits for `AutomapConfig::counters`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Counter {
    Kills = 1,
    KillsPercent = 1 << 1,
    Items = 1 << 2,
    ItemsPercent = 1 << 3,
    Secrets = 1 << 4,
    SecretsPercent = 1 << 5,
}

/// The automap's persisted variables
#[derive(Debug, Clone, PartialEq, DeRon, SerRon)]
pub struct AutomapConfig {
    /// Window placement on a 3x3 grid, 0 is top left, 4 is centred
    pub position: u8,
    /// Window width as a fraction of the screen
    pub width: f32,
    pub height: f32,
    pub color_unseen: Rgb,
    pub color_wall: Rgb,
    pub color_floor_change: Rgb,
    pub color_ceiling_change: Rgb,
    pub background: Rgb,
    pub background_alpha: f32,
    pub line_alpha: f32,
    /// Turn the map with the player while following
    pub rotate: bool,
    /// 0 hides the HUD while mapped, 1 hides it only when the map covers the
    /// whole screen, 2 always shows it
    pub hud_display: u8,
    pub door_colors: bool,
    /// Door glow thickness in map units
    pub door_glow: f32,
    /// `Counter` bits
    pub counters: u8,
    pub counter_scale: f32,
    /// Show keys in baby mode
    pub baby_keys: bool,
}

impl Default for AutomapConfig {
    fn default() -> Self {
        Self {
            position: 4,
            width: 1.0,
            height: 1.0,
            color_unseen: Rgb::new(0.45, 0.45, 0.45),
            color_wall: Rgb::new(0.7, 0.0, 0.0),
            color_floor_change: Rgb::new(0.4, 0.25, 0.1),
            color_ceiling_change: Rgb::new(0.85, 0.85, 0.0),
            background: Rgb::new(0.0, 0.0, 0.0),
            background_alpha: 0.7,
            line_alpha: 1.0,
            rotate: false,
            hud_display: 1,
            door_colors: true,
            door_glow: 8.0,
            counters: 0,
            counter_scale: 1.0,
            baby_keys: false,
        }
    }
}

enum Slot<'a> {
    Float(&'a mut f32, f32, f32),
    Int(&'a mut u8, u8, u8),
    Bool(&'a mut bool),
}

impl Slot<'_> {
    fn get(&self) -> f32 {
        match self {
            Slot::Float(v, ..) => **v,
            Slot::Int(v, ..) => **v as f32,
            Slot::Bool(v) => u8::from(**v) as f32,
        }
    }

    fn set(&mut self, value: f32) {
        match self {
            Slot::Float(v, min, max) => **v = value.clamp(*min, *max),
            Slot::Int(v, min, max) => {
                **v = (value.round().clamp(*min as f32, *max as f32)) as u8;
            }
            Slot::Bool(v) => **v = value != 0.0,
        }
    }
}

/// Names of the variables every game has
pub const CVARS: &[&str] = &[
    "map-position",
    "map-width",
    "map-height",
    "map-color-unseen-r",
    "map-color-unseen-g",
    "map-color-unseen-b",
    "map-color-wall-r",
    "map-color-wall-g",
    "map-color-wall-b",
    "map-color-floor-r",
    "map-color-floor-g",
    "map-color-floor-b",
    "map-color-ceiling-r",
    "map-color-ceiling-g",
    "map-color-ceiling-b",
    "map-background-r",
    "map-background-g",
    "map-background-b",
    "map-background-a",
    "map-alpha-lines",
    "map-rotate",
    "map-huddisplay",
    "map-door-colors",
    "map-door-glow",
];

/// Names only games with level counters have
pub const COUNTER_CVARS: &[&str] = &["map-cheat-counter", "map-cheat-counter-scale", "map-babykeys"];

fn rgb_slot<'a>(rgb: &'a mut Rgb, part: &str) -> Option<Slot<'a>> {
    let v = match part {
        "r" => &mut rgb.r,
        "g" => &mut rgb.g,
        "b" => &mut rgb.b,
        _ => return None,
    };
    Some(Slot::Float(v, 0.0, 1.0))
}

impl AutomapConfig {
    fn slot(&mut self, name: &str) -> Option<Slot<'_>> {
        if let Some(rest) = name.strip_prefix("map-color-") {
            let (layer, part) = rest.rsplit_once('-')?;
            let rgb = match layer {
                "unseen" => &mut self.color_unseen,
                "wall" => &mut self.color_wall,
                "floor" => &mut self.color_floor_change,
                "ceiling" => &mut self.color_ceiling_change,
                _ => return None,
            };
            return rgb_slot(rgb, part);
        }
        if let Some(part) = name.strip_prefix("map-background-") {
            if part == "a" {
                return Some(Slot::Float(&mut self.background_alpha, 0.0, 1.0));
            }
            return rgb_slot(&mut self.background, part);
        }
        Some(match name {
            "map-position" => Slot::Int(&mut self.position, 0, 8),
            "map-width" => Slot::Float(&mut self.width, 0.0, 1.0),
            "map-height" => Slot::Float(&mut self.height, 0.0, 1.0),
            "map-alpha-lines" => Slot::Float(&mut self.line_alpha, 0.0, 1.0),
            "map-rotate" => Slot::Bool(&mut self.rotate),
            "map-huddisplay" => Slot::Int(&mut self.hud_display, 0, 2),
            "map-door-colors" => Slot::Bool(&mut self.door_colors),
            "map-door-glow" => Slot::Float(&mut self.door_glow, 0.0, 200.0),
            "map-cheat-counter" => Slot::Int(&mut self.counters, 0, 63),
            "map-cheat-counter-scale" => Slot::Float(&mut self.counter_scale, 0.1, 1.0),
            "map-babykeys" => Slot::Bool(&mut self.baby_keys),
            _ => return None,
        })
    }

    /// Read a variable by name. Flags read as 0 or 1.
    pub fn get(&self, name: &str) -> Option<f32> {
        let mut scratch = self.clone();
        scratch.slot(name).map(|s| s.get())
    }

    /// Set a variable by name, clamped to its range. Returns false for an
    /// unknown name.
    pub fn set(&mut self, name: &str, value: f32) -> bool {
        match self.slot(name) {
            Some(mut slot) => {
                slot.set(value);
                debug!("{} = {}", name, slot.get());
                true
            }
            None => false,
        }
    }

    pub fn has_counter(&self, counter: Counter) -> bool {
        self.counters & counter as u8 != 0
    }
}

#[cfg(test)]
mod tests {
    use nanoserde::{DeRon, SerRon};

    use super::{AutomapConfig, Counter, COUNTER_CVARS, CVARS};

    #[test]
    fn every_name_resolves() {
        let cfg = AutomapConfig::default();
        for name in CVARS.iter().chain(COUNTER_CVARS) {
            assert!(cfg.get(name).is_some(), "{name}");
        }
        assert!(cfg.get("map-color-sky-r").is_none());
        assert!(cfg.get("map-color-wall-x").is_none());
    }

    #[test]
    fn set_clamps() {
        let mut cfg = AutomapConfig::default();
        assert!(cfg.set("map-position", 12.0));
        assert_eq!(cfg.position, 8);
        assert!(cfg.set("map-width", -1.0));
        assert_eq!(cfg.width, 0.0);
        assert!(cfg.set("map-door-glow", 500.0));
        assert_eq!(cfg.get("map-door-glow"), Some(200.0));
        assert!(cfg.set("map-color-floor-g", 0.5));
        assert_eq!(cfg.color_floor_change.g, 0.5);
        assert!(cfg.set("map-rotate", 1.0));
        assert!(cfg.rotate);
        assert!(cfg.set("map-cheat-counter", 5.0));
        assert!(cfg.has_counter(Counter::Kills));
        assert!(cfg.has_counter(Counter::Items));
        assert!(!cfg.has_counter(Counter::KillsPercent));
        assert!(!cfg.set("map-nothing", 1.0));
    }

    #[test]
    fn ron_text() {
        let mut cfg = AutomapConfig::default();
        cfg.set("map-position", 2.0);
        cfg.set("map-rotate", 1.0);
        let text = cfg.serialize_ron();
        let back = AutomapConfig::deserialize_ron(&text).unwrap();
        assert_eq!(back.position, 2);
        assert!(back.rotate);
        assert_eq!(back.door_glow, cfg.door_glow);
        assert!(AutomapConfig::deserialize_ron("(position: 2)").is_err());
    }
}
