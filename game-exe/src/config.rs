//! User configuration options.

use std::{
    fs::{create_dir_all, File, OpenOptions},
    io::{self, Read, Write},
    path::PathBuf,
};

use automap::AutomapConfig;
use dirs::config_dir;
use gameplay::{
    log::{error, info, warn},
    GameVariant, Skill,
};
use nanoserde::{DeRon, SerRon};

use crate::{CLIOptions, BASE_DIR};

const LOG_TAG: &str = "UserConfig";

fn get_cfg_file() -> io::Result<PathBuf> {
    let mut dir = config_dir().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "no user config dir on this platform")
    })?;
    dir.push(BASE_DIR);
    if !dir.exists() {
        create_dir_all(&dir)?;
    }
    dir.push("user.ron");
    Ok(dir)
}

#[derive(Debug, Clone, PartialEq, DeRon, SerRon)]
pub struct UserConfig {
    /// Definitions used when none are given on the command line
    pub defs: String,
    pub variant: String,
    /// 0-4
    pub skill: i32,
    pub tics: u32,
    pub screen_width: f32,
    pub screen_height: f32,
    pub sfx_vol: i32,
    pub automap: AutomapConfig,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            defs: String::new(),
            variant: GameVariant::default().to_string(),
            skill: Skill::default() as i32,
            tics: 350,
            screen_width: 320.0,
            screen_height: 200.0,
            sfx_vol: 80,
            automap: AutomapConfig::default(),
        }
    }
}

impl UserConfig {
    /// `load` will attempt to read the config. A missing or unreadable
    /// config is replaced with the defaults.
    pub fn load() -> Self {
        let path = match get_cfg_file() {
            Ok(path) => path,
            Err(e) => {
                warn!(target: LOG_TAG, "Couldn't find the config file: {}", e);
                return UserConfig::default();
            }
        };

        let mut file = match OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) => {
                warn!(target: LOG_TAG, "Couldn't open {:?}, {}", path, e);
                return UserConfig::default();
            }
        };
        let mut buf = String::new();
        if let Ok(read_len) = file.read_to_string(&mut buf) {
            if read_len == 0 {
                return UserConfig::create_default(&mut file);
            }
            if let Ok(data) = UserConfig::deserialize_ron(&buf) {
                info!(target: LOG_TAG, "Loaded user config file");
                return data;
            }
            warn!(target: LOG_TAG, "Could not deserialise {:?} recreating config", path);
        }
        UserConfig::create_default(&mut file)
    }

    fn create_default(file: &mut File) -> Self {
        let config = UserConfig::default();
        info!(target: LOG_TAG, "Created default user config file");
        let data = config.serialize_ron();
        if let Err(e) = file.set_len(0).and_then(|_| file.write_all(data.as_bytes())) {
            error!(target: LOG_TAG, "Could not write default config: {}", e);
        }
        config
    }

    pub fn write(&self) {
        let path = match get_cfg_file() {
            Ok(path) => path,
            Err(e) => {
                error!(target: LOG_TAG, "Could not write config: {}", e);
                return;
            }
        };
        let data = self.serialize_ron();
        match File::create(&path).and_then(|mut f| f.write_all(data.as_bytes())) {
            Ok(_) => info!(target: LOG_TAG, "Saved user config to {:?}", path),
            Err(e) => error!(target: LOG_TAG, "Could not write config: {}", e),
        }
    }

    pub fn game_variant(&self) -> GameVariant {
        self.variant.parse().unwrap_or_else(|e| {
            warn!(target: LOG_TAG, "{}, using doom", e);
            GameVariant::Doom
        })
    }

    pub fn game_skill(&self) -> Skill {
        self.skill.to_string().parse().unwrap_or_default()
    }

    /// Sync the CLI options and UserOptions with each other
    pub fn sync_cli(&mut self, cli: &mut CLIOptions) {
        info!(target: LOG_TAG, "Checking CLI options");

        if !cli.defs.is_empty() && cli.defs != self.defs {
            cli.defs.clone_into(&mut self.defs);
            info!(target: LOG_TAG, "Definitions changed to: {}", &cli.defs);
        } else {
            self.defs.clone_into(&mut cli.defs);
        }

        if cli.tics != 0 && cli.tics != self.tics {
            self.tics = cli.tics;
        } else {
            cli.tics = self.tics;
        }

        if let Some(variant) = cli.variant {
            self.variant = variant.to_string();
        } else {
            cli.variant = Some(self.game_variant());
        }

        if let Some(skill) = cli.skill {
            self.skill = skill as i32;
        } else {
            cli.skill = Some(self.game_skill());
        }
    }
}
