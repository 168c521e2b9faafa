//! `xgsim` loads a map and a set of extended sector and line definitions,
//! runs the level for a number of tics with the automap over it, and logs
//! what the sectors do, what sounds they start, and what the map draws.

mod cli;
mod config;
mod script;
mod session;
mod sound;

use std::{error::Error, fs, rc::Rc};

use automap::Automap;
use cli::*;
use gameplay::{
    log::{self, info, warn},
    xg::Definitions,
    Level, MapData,
};
use gamestate_traits::Vec2;
use mimalloc::MiMalloc;
use simplelog::TermLogger;
use sound_traits::{SoundAction, SoundServer, SoundServerTic};

use crate::config::UserConfig;
use crate::script::parse_script;
use crate::session::Session;
use crate::sound::LogSound;

const BASE_DIR: &str = "xgsim/";

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn load_definitions(options: &CLIOptions) -> Result<Definitions, Box<dyn Error>> {
    let mut defs = if options.defs.is_empty() {
        warn!("No definitions given, only plain sectors and lines will work");
        Definitions::default()
    } else {
        Definitions::from_ron(&fs::read_to_string(&options.defs)?)?
    };
    if let Some(lump) = &options.lump {
        defs.apply_lump(&fs::read(lump)?)?;
        info!("Applied definition lump {}", lump);
    }
    info!(
        "{} sector types and {} line types",
        defs.sector_type_count(),
        defs.line_type_count()
    );
    Ok(defs)
}

/// The main `game-exe` crate should take care of initialising a few things
fn main() -> Result<(), Box<dyn Error>> {
    let mut options: CLIOptions = argh::from_env();

    TermLogger::init(
        options.verbose.unwrap_or(log::LevelFilter::Warn),
        simplelog::ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let mut user_config = UserConfig::load();
    user_config.sync_cli(&mut options);

    let defs = load_definitions(&options)?;
    let map_data = MapData::from_ron(&fs::read_to_string(&options.map)?)?;
    let steps = match &options.script {
        Some(path) => parse_script(&fs::read_to_string(path)?)?,
        None => Vec::new(),
    };

    let mut snd = LogSound::new(user_config.sfx_vol);
    let snd_tx = snd.init()?;

    let variant = options.variant.unwrap_or_default();
    let level = Level::new(
        map_data,
        Rc::new(defs),
        options.skill.unwrap_or_default(),
        snd_tx.clone(),
    );
    let mut session = Session::new(
        level,
        Automap::new(user_config.automap.clone()),
        variant,
        Vec2::new(user_config.screen_width, user_config.screen_height),
    );
    info!("Running {} tics of {} rules", options.tics, variant);

    let mut steps = steps.into_iter().peekable();
    for tic in 0..options.tics {
        while let Some(step) = steps.next_if(|s| s.tic <= tic) {
            if !session.apply(&step.action) {
                info!("[{}] {:?} did nothing", tic, step.action);
            }
        }
        session.tick();

        snd.tic = session.game.level.level_time;
        snd.drain();
        if options.report_every != 0 && tic % options.report_every == 0 {
            session.report();
        }
    }
    for step in steps {
        warn!("Step at tic {} never ran", step.tic);
    }

    session.report();
    let stats = session.draw_stats;
    info!(
        "Automap drew {} frames: {} lines, {} quads, {} texts",
        stats.frames, stats.lines, stats.quads, stats.texts
    );

    #[cfg(feature = "hprof")]
    coarse_prof::write(&mut std::io::stdout())?;

    if snd_tx.send(SoundAction::Shutdown).is_ok() {
        snd.drain();
    }

    if !options.no_save {
        user_config.automap = session.automap.config().clone();
        user_config.write();
    }
    Ok(())
}
