//! Exposes an API of sorts that allows subsystems like the automap to get
//! the information they require from the running game, and to hand back
//! what they want drawn.

mod draw;

pub use draw::{Colour, DrawCmd, DrawList};
pub use gameplay::{GameVariant, Level, MapObject, Skill, TICRATE};
pub use glam::Vec2;
pub use math::Angle;

/// The current state of the game: whether we are playing, gazing at the
/// intermission screen, the final animation, or a demo.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameState {
    /// The state the game will spend most of its time in is `GameState::Level`
    /// as this is where all of the actual gameplay happens.
    Level,
    Intermission,
    Finale,
    DemoScreen,
}

/// Kill, item and secret tallies for the console player
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct LevelStats {
    pub kills: i32,
    pub items: i32,
    pub secrets: i32,
    pub total_kills: i32,
    pub total_items: i32,
    pub total_secrets: i32,
}

/// Keys a subsystem may respond to. Letters and digits arrive as `Char`,
/// always lowercase.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyCode {
    Char(char),
    Tab,
    Up,
    Down,
    Left,
    Right,
    Equals,
    Minus,
    Escape,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    Down(KeyCode),
    Up(KeyCode),
}

impl KeyEvent {
    pub fn key(&self) -> KeyCode {
        match self {
            KeyEvent::Down(k) | KeyEvent::Up(k) => *k,
        }
    }

    pub fn is_down(&self) -> bool {
        matches!(self, KeyEvent::Down(_))
    }
}

/// Universal game traits. To be implemented by the Game
pub trait GameTraits {
    fn game_state(&self) -> GameState;

    /// Which of Doom, Heretic or Hexen rules are in play
    fn variant(&self) -> GameVariant;

    fn skill(&self) -> Skill;

    /// The level being played, if any
    fn level(&self) -> Option<&Level>;

    /// Frame buffer width and height
    fn screen_size(&self) -> Vec2;

    /// The console player's body, if they have one in the level
    fn player_mobj(&self) -> Option<&MapObject> {
        let level = self.level()?;
        let id = level.players[level.console_player].mobj?;
        level.thinkers.mobj(id)
    }

    /// The console player owns the computer area map power-up
    fn player_has_allmap(&self) -> bool {
        self.level()
            .is_some_and(|l| l.players[l.console_player].allmap)
    }

    fn level_stats(&self) -> LevelStats;

    /// Show a short message to the player
    fn player_msg(&mut self, msg: String);
}

/// To be implemented by subsystem type things (automap, HUD)
pub trait SubsystemTrait {
    /// Possibly initialise the subsystem, called once per level
    fn init(&mut self, game: &impl GameTraits);

    /// Return true if the responder took the event
    fn responder(&mut self, event: KeyEvent, game: &mut impl GameTraits) -> bool;

    /// Responds to changes in the game or affects game.
    fn ticker(&mut self, game: &mut impl GameTraits) -> bool;

    /// Add this subsystem's drawing to the list
    fn draw(&mut self, game: &impl GameTraits, list: &mut DrawList);
}

#[cfg(test)]
mod tests {
    use super::{KeyCode, KeyEvent};

    #[test]
    fn key_event_parts() {
        let down = KeyEvent::Down(KeyCode::Char('f'));
        assert!(down.is_down());
        assert_eq!(down.key(), KeyCode::Char('f'));
        assert!(!KeyEvent::Up(KeyCode::Tab).is_down());
    }
}
