//! Scripted input: console commands and key presses to run at given tics.

use std::{error::Error, fmt};

use automap::COMMANDS;
use gamestate_traits::{KeyCode, Vec2};
use nanoserde::DeRon;

#[derive(Debug)]
pub enum ScriptError {
    Ron(String),
    BadStep { tic: u32, text: String },
}

impl Error for ScriptError {}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Ron(m) => write!(f, "could not parse script: {}", m),
            ScriptError::BadStep { tic, text } => {
                write!(f, "could not understand \"{}\" at tic {}", text, tic)
            }
        }
    }
}

/// One step as written in a script file
#[derive(Debug, Clone, DeRon)]
struct StepDef {
    tic: u32,
    run: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAct {
    Cross,
    Use,
    Shoot,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Trigger a line as the console player
    Line { act: LineAct, line: usize },
    /// Force a line active or inactive
    Activate { line: usize, on: bool },
    SectorType { sector: usize, special: i32 },
    LineType { line: usize, special: i32 },
    /// Teleport the console player
    MovePlayer(Vec2),
    /// Give or take the computer map power-up
    AllMap(bool),
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    /// Down then up in the same tic
    Press(KeyCode),
    Cvar { name: String, value: f32 },
    /// Log the state of every extended sector
    Report,
    /// An automap console command
    Command(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub tic: u32,
    pub action: Action,
}

fn parse_key(name: &str) -> Option<KeyCode> {
    Some(match name.to_ascii_lowercase().as_str() {
        "tab" => KeyCode::Tab,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "equals" | "=" => KeyCode::Equals,
        "minus" | "-" => KeyCode::Minus,
        "escape" | "esc" => KeyCode::Escape,
        s => {
            let mut chars = s.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::Char(c)
        }
    })
}

/// Parse one script line such as `use 3`, `key tab` or `follow`
pub fn parse_action(text: &str) -> Option<Action> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let num = |i: usize| words.get(i).and_then(|w| w.parse::<usize>().ok());
    let float = |i: usize| words.get(i).and_then(|w| w.parse::<f32>().ok());

    let action = match words.as_slice() {
        [] => return None,
        ["cross", _] => Action::Line {
            act: LineAct::Cross,
            line: num(1)?,
        },
        ["use", _] => Action::Line {
            act: LineAct::Use,
            line: num(1)?,
        },
        ["shoot", _] => Action::Line {
            act: LineAct::Shoot,
            line: num(1)?,
        },
        ["activate", _] => Action::Activate {
            line: num(1)?,
            on: true,
        },
        ["deactivate", _] => Action::Activate {
            line: num(1)?,
            on: false,
        },
        ["sectortype", _, special] => Action::SectorType {
            sector: num(1)?,
            special: special.parse().ok()?,
        },
        ["linetype", _, special] => Action::LineType {
            line: num(1)?,
            special: special.parse().ok()?,
        },
        ["move", _, _] => Action::MovePlayer(Vec2::new(float(1)?, float(2)?)),
        ["allmap", on] => Action::AllMap(*on != "0"),
        ["key", key] => Action::Press(parse_key(key)?),
        ["hold", key] => Action::KeyDown(parse_key(key)?),
        ["release", key] => Action::KeyUp(parse_key(key)?),
        ["cvar", name, _] => Action::Cvar {
            name: (*name).to_string(),
            value: float(2)?,
        },
        ["report"] => Action::Report,
        [name] if COMMANDS.contains(name) => Action::Command((*name).to_string()),
        _ => return None,
    };
    Some(action)
}

/// Read a script, a RON list of `(tic: 10, run: "use 3")`. Steps come back
/// sorted by tic, keeping file order within a tic.
pub fn parse_script(text: &str) -> Result<Vec<Step>, ScriptError> {
    let defs =
        Vec::<StepDef>::deserialize_ron(text).map_err(|e| ScriptError::Ron(e.to_string()))?;
    let mut steps = defs
        .into_iter()
        .map(|d| match parse_action(&d.run) {
            Some(action) => Ok(Step { tic: d.tic, action }),
            None => Err(ScriptError::BadStep {
                tic: d.tic,
                text: d.run,
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    steps.sort_by_key(|s| s.tic);
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use gamestate_traits::{KeyCode, Vec2};

    use super::{parse_action, parse_script, Action, LineAct, ScriptError};

    #[test]
    fn actions() {
        assert_eq!(
            parse_action("use 3"),
            Some(Action::Line {
                act: LineAct::Use,
                line: 3
            })
        );
        assert_eq!(parse_action("key tab"), Some(Action::Press(KeyCode::Tab)));
        assert_eq!(parse_action("hold ="), Some(Action::KeyDown(KeyCode::Equals)));
        assert_eq!(parse_action("key F"), Some(Action::Press(KeyCode::Char('f'))));
        assert_eq!(
            parse_action("move 64 -32.5"),
            Some(Action::MovePlayer(Vec2::new(64.0, -32.5)))
        );
        assert_eq!(
            parse_action("sectortype 2 -1"),
            Some(Action::SectorType {
                sector: 2,
                special: -1
            })
        );
        assert_eq!(parse_action("follow"), Some(Action::Command("follow".into())));
        assert_eq!(parse_action("use three"), None);
        assert_eq!(parse_action("key space"), None);
        assert_eq!(parse_action("noclip"), None);
        assert_eq!(parse_action("  "), None);
    }

    #[test]
    fn sorted_by_tic() {
        let steps = parse_script(
            r#"[
                (tic: 20, run: "automap"),
                (tic: 5, run: "cross 1"),
                (tic: 20, run: "key f"),
            ]"#,
        )
        .unwrap();
        let tics: Vec<u32> = steps.iter().map(|s| s.tic).collect();
        assert_eq!(tics, vec![5, 20, 20]);
        assert_eq!(steps[1].action, Action::Command("automap".into()));
    }

    #[test]
    fn bad_step_names_the_tic() {
        let err = parse_script(r#"[(tic: 7, run: "use")]"#).unwrap_err();
        assert!(matches!(err, ScriptError::BadStep { tic: 7, .. }));
        assert!(err.to_string().contains("tic 7"));
    }
}
