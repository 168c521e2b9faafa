use argh::FromArgs;
use gameplay::{log, GameVariant, Skill};

/// Run a level with extended sectors and lines without a screen, logging
/// what happens
#[derive(Debug, Clone, FromArgs)]
pub struct CLIOptions {
    /// verbose level: off, error, warn, info, debug
    #[argh(option)]
    pub verbose: Option<log::LevelFilter>,
    /// path to the RON map description
    #[argh(option)]
    pub map: String,
    /// path to RON sector and line type definitions
    #[argh(option, default = "Default::default()")]
    pub defs: String,
    /// path to a binary definition lump, overrides definitions with the same
    /// id
    #[argh(option)]
    pub lump: Option<String>,
    /// number of tics to run, 0 uses the user config
    #[argh(option, default = "0")]
    pub tics: u32,
    /// game rules <doom, heretic, hexen>
    #[argh(option)]
    pub variant: Option<GameVariant>,
    /// set the game skill, 0-4 (0: easiest, 4: hardest)
    #[argh(option)]
    pub skill: Option<Skill>,
    /// path to a RON script of commands and key presses at given tics
    #[argh(option)]
    pub script: Option<String>,
    /// log the state of every extended sector every this many tics, 0 never
    #[argh(option, default = "0")]
    pub report_every: u32,
    /// do not write the user config back
    #[argh(switch)]
    pub no_save: bool,
}
