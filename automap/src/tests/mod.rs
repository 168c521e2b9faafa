//! The automap driven through its subsystem interface against a real level.

use std::rc::Rc;
use std::sync::mpsc::channel;

use gameplay::xg::Definitions;
use gameplay::{GameVariant, Level, LineDefFlags, MapData, Skill, ThingDesc};
use gamestate_traits::{
    Colour, DrawList, GameState, GameTraits, KeyCode, KeyEvent, LevelStats, SubsystemTrait, Vec2,
};

use crate::{Automap, AutomapConfig, OpenState};

/// One 1024 by 512 room. The player starts in the middle.
const MAP: &str = r#"(
    name: "HALL",
    vertexes: [(x: 0.0, y: 0.0), (x: 1024.0, y: 0.0), (x: 1024.0, y: 512.0), (x: 0.0, y: 512.0)],
    sectors: [(floor: 0.0, ceiling: 128.0, light: 200.0)],
    sides: [(sector: 0)],
    lines: [
        (v1: 0, v2: 1, front: 0, special: 50),
        (v1: 1, v2: 2, front: 0),
        (v1: 2, v2: 3, front: 0),
        (v1: 3, v2: 0, front: 0),
    ],
    things: [(x: 512.0, y: 256.0, kind: 1)],
)"#;

struct TestGame {
    level: Level,
    state: GameState,
    variant: GameVariant,
    msgs: Vec<String>,
}

impl TestGame {
    fn new(variant: GameVariant) -> Self {
        let defs = Definitions::from_ron(r#"(line_types: [(id: 50, class: "set-light", light: 0.5)])"#)
            .unwrap();
        let (tx, _rx) = channel();
        let mut level = Level::new(MapData::from_ron(MAP).unwrap(), Rc::new(defs), Skill::Medium, tx);
        level.spawn_specials();
        Self {
            level,
            state: GameState::Level,
            variant,
            msgs: Vec::new(),
        }
    }

    fn move_player(&mut self, xy: Vec2) {
        let id = self.level.players[0].mobj.unwrap();
        assert!(self.level.move_mobj(id, xy, 0.0));
    }
}

impl GameTraits for TestGame {
    fn game_state(&self) -> GameState {
        self.state
    }

    fn variant(&self) -> GameVariant {
        self.variant
    }

    fn skill(&self) -> Skill {
        self.level.game_skill
    }

    fn level(&self) -> Option<&Level> {
        Some(&self.level)
    }

    fn screen_size(&self) -> Vec2 {
        Vec2::new(320.0, 200.0)
    }

    fn level_stats(&self) -> LevelStats {
        LevelStats::default()
    }

    fn player_msg(&mut self, msg: String) {
        self.msgs.push(msg);
    }
}

fn opened(variant: GameVariant) -> (Automap, TestGame) {
    let mut game = TestGame::new(variant);
    let mut map = Automap::new(AutomapConfig::default());
    map.init(&game);
    assert!(map.command("automap", &mut game));
    for _ in 0..20 {
        map.ticker(&mut game);
    }
    assert_eq!(map.view().state(), OpenState::Open);
    (map, game)
}

fn press(map: &mut Automap, game: &mut TestGame, key: KeyCode) -> bool {
    let taken = map.responder(KeyEvent::Down(key), game);
    map.responder(KeyEvent::Up(key), game);
    taken
}

fn type_chars(map: &mut Automap, game: &mut TestGame, text: &str) {
    for c in text.chars() {
        press(map, game, KeyCode::Char(c));
    }
}

#[test]
fn follow_toggle_recentres_in_one_tic() {
    let (mut map, mut game) = opened(GameVariant::Doom);
    assert_eq!(map.view().center(), Vec2::new(512.0, 256.0));

    assert!(map.command("follow", &mut game));
    assert!(!map.view().follow());
    game.move_player(Vec2::new(612.0, 256.0));
    for _ in 0..10 {
        map.ticker(&mut game);
        assert_eq!(map.view().center(), Vec2::new(512.0, 256.0));
    }

    assert!(map.command("follow", &mut game));
    map.ticker(&mut game);
    assert_eq!(map.view().center(), Vec2::new(612.0, 256.0));
    assert_eq!(game.msgs, vec!["Follow mode OFF", "Follow mode ON"]);
}

#[test]
fn held_keys_zoom_and_pan_within_limits() {
    let (mut map, mut game) = opened(GameVariant::Doom);
    map.responder(KeyEvent::Down(KeyCode::Minus), &mut game);
    for _ in 0..300 {
        map.ticker(&mut game);
        assert!(map.view().scale_mtof() >= map.view().min_scale_mtof());
    }
    assert_eq!(map.view().scale_mtof(), map.view().min_scale_mtof());
    map.responder(KeyEvent::Up(KeyCode::Minus), &mut game);

    // Pan keys do nothing while following
    assert!(!map.responder(KeyEvent::Down(KeyCode::Left), &mut game));
    press(&mut map, &mut game, KeyCode::Char('f'));
    assert!(map.responder(KeyEvent::Down(KeyCode::Left), &mut game));
    for _ in 0..500 {
        map.ticker(&mut game);
        assert!(map.view().center().x >= 0.0);
    }
    assert_eq!(map.view().center().x, 0.0);
    map.responder(KeyEvent::Up(KeyCode::Left), &mut game);
    let center = map.view().center();
    map.ticker(&mut game);
    assert_eq!(map.view().center(), center);
}

#[test]
fn commands_need_a_level() {
    let mut game = TestGame::new(GameVariant::Doom);
    let mut map = Automap::new(AutomapConfig::default());
    map.init(&game);

    game.state = GameState::Intermission;
    assert!(!map.command("automap", &mut game));
    assert!(!map.responder(KeyEvent::Down(KeyCode::Tab), &mut game));
    assert_eq!(map.view().state(), OpenState::Closed);

    game.state = GameState::Level;
    // Map commands other than opening it need it open
    assert!(!map.command("grid", &mut game));
    assert!(!map.command("noclip", &mut game));
    assert!(map.responder(KeyEvent::Down(KeyCode::Tab), &mut game));
    assert!(map.is_active());
    assert!(map.command("grid", &mut game));
    assert!(map.grid());
}

#[test]
fn marks_wrap_and_clear() {
    let (mut map, mut game) = opened(GameVariant::Doom);
    for _ in 0..12 {
        assert!(map.command("addmark", &mut game));
    }
    assert!(map.marks().iter().all(|m| m.is_some()));
    assert_eq!(game.msgs.last().unwrap(), "Marked spot 1");

    let mut list = DrawList::new();
    map.draw(&game, &mut list);
    assert!(!list.is_empty());

    assert!(map.command("clearmarks", &mut game));
    assert!(map.marks().iter().all(|m| m.is_none()));
}

#[test]
fn cheat_cycles_reveal() {
    let (mut map, mut game) = opened(GameVariant::Doom);
    let wall = map.config().color_wall.colour(1.0);
    let xg = Colour::rgb(0.0, 1.0, 1.0);
    game.level.map_data.linedefs[0].xg.as_mut().unwrap().active = true;
    // Zoomed out so the horizontal walls are in the window
    assert!(map.command("zoommax", &mut game));

    let mut list = DrawList::new();
    map.draw(&game, &mut list);
    assert_eq!(list.lines_coloured(wall), 0);

    type_chars(&mut map, &mut game, "iddt");
    assert_eq!(map.cheating(), 1);
    list.clear();
    map.draw(&game, &mut list);
    assert!(list.lines_coloured(wall) > 0);
    assert_eq!(list.lines_coloured(xg), 0);

    type_chars(&mut map, &mut game, "iddt");
    assert_eq!(map.cheating(), 2);
    list.clear();
    map.draw(&game, &mut list);
    assert_eq!(list.lines_coloured(xg), 1);

    type_chars(&mut map, &mut game, "iddt");
    assert_eq!(map.cheating(), 0);

    // Other games have their own sequence
    let (mut map, mut game) = opened(GameVariant::Heretic);
    type_chars(&mut map, &mut game, "iddt");
    assert_eq!(map.cheating(), 0);
    type_chars(&mut map, &mut game, "ravmap");
    assert_eq!(map.cheating(), 1);
}

#[test]
fn seen_walls_drawn_zoomed_out() {
    let (mut map, mut game) = opened(GameVariant::Doom);
    let wall = map.config().color_wall.colour(1.0);
    // The horizontal walls, well inside the window once zoomed out
    game.level.map_data.linedefs[0].flags |= LineDefFlags::Mapped as u32;
    game.level.map_data.linedefs[2].flags |= LineDefFlags::Mapped as u32;
    assert!(press(&mut map, &mut game, KeyCode::Char('0')));
    assert!(map.view().is_big());

    let mut list = DrawList::new();
    map.draw(&game, &mut list);
    assert_eq!(list.lines_coloured(wall), 2);
    // Player arrow
    assert_eq!(list.lines_coloured(Colour::rgb(1.0, 1.0, 1.0)), 7);
}

#[test]
fn closing_stops_drawing() {
    let (mut map, mut game) = opened(GameVariant::Doom);
    // Full screen map hides the HUD
    assert!(!map.hud_visible());
    assert!(press(&mut map, &mut game, KeyCode::Tab));
    assert_eq!(map.view().state(), OpenState::Closing);
    for _ in 0..20 {
        map.ticker(&mut game);
    }
    assert_eq!(map.view().state(), OpenState::Closed);
    assert!(map.hud_visible());

    let mut list = DrawList::new();
    map.draw(&game, &mut list);
    assert!(list.is_empty());
}

#[test]
fn cvars_by_name() {
    let mut game = TestGame::new(GameVariant::Hexen);
    let mut map = Automap::new(AutomapConfig::default());
    map.init(&game);
    assert!(map.cvar("map-cheat-counter").is_none());
    assert!(!map.set_cvar("map-babykeys", 1.0));
    assert!(map.set_cvar("map-rotate", 1.0));
    assert!(map.view().rotate());
    assert_eq!(map.cvar("map-huddisplay"), Some(1.0));

    map.set_cvar("map-position", 0.0);
    map.set_cvar("map-width", 0.5);
    map.set_cvar("map-height", 0.5);
    assert!(map.command("automap", &mut game));
    map.ticker(&mut game);
    assert_eq!(map.view().window().size, Vec2::new(240.0, 150.0));
}

#[test]
fn baby_keys_are_collected_at_init() {
    let mut game = TestGame::new(GameVariant::Doom);
    game.level.game_skill = Skill::Baby;
    let blue_key = ThingDesc {
        x: 256.0,
        y: 256.0,
        kind: 5,
        ..ThingDesc::default()
    };
    let key = game.level.spawn_thing(&blue_key).unwrap();

    let mut map = Automap::new(AutomapConfig {
        baby_keys: true,
        ..AutomapConfig::default()
    });
    map.init(&game);
    assert_eq!(map.keys, vec![(Vec2::new(256.0, 256.0), Colour::rgb(0.0, 0.0, 0.78))]);

    // Still marked after pickup until the next level init
    game.level.remove_mobj(key);
    assert!(map.command("automap", &mut game));
    for _ in 0..20 {
        map.ticker(&mut game);
    }
    assert!(map.command("zoommax", &mut game));
    let mut list = DrawList::new();
    map.draw(&game, &mut list);
    let with_keys = list.len();
    assert!(map.set_cvar("map-babykeys", 0.0));
    list.clear();
    map.draw(&game, &mut list);
    assert_eq!(list.len(), with_keys - 1);

    map.init(&game);
    assert!(map.keys.is_empty());
}
