//! User configuration options.

use std::fs::{File, create_dir_all};
use std::io::{self, Read, Write};
use std::path::PathBuf;

use dirs::config_dir;
use gameplay::log::{info, warn};
use nanoserde::{DeRon, SerRon};

use crate::cli::CLIOptions;

const LOG_TAG: &str = "UserConfig";
const BASE_DIR: &str = "room4doom/";
const CONFIG_FILE: &str = "view.ron";

fn get_cfg_file() -> io::Result<PathBuf> {
    let mut dir = config_dir().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{LOG_TAG}: Couldn't open user config dir"),
        )
    })?;
    dir.push(BASE_DIR);
    if !dir.exists() {
        create_dir_all(&dir)?;
    }
    dir.push(CONFIG_FILE);
    Ok(dir)
}

#[derive(Debug, Clone, PartialEq, DeRon, SerRon)]
pub struct UserConfig {
    pub width: u32,
    pub height: u32,
    pub low_detail: bool,
    pub fake_contrast: bool,
    pub invul_sky: bool,
    pub vanilla_light: bool,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 400,
            low_detail: false,
            fake_contrast: true,
            invul_sky: false,
            vanilla_light: false,
        }
    }
}

impl UserConfig {
    /// Read the config file. A missing or unreadable file gives the defaults.
    pub fn load() -> Self {
        let path = match get_cfg_file() {
            Ok(path) => path,
            Err(e) => {
                warn!(target: LOG_TAG, "{e}, using defaults");
                return Self::default();
            }
        };
        let mut buf = String::new();
        match File::open(&path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(len) if len > 0 => match UserConfig::deserialize_ron(&buf) {
                Ok(config) => {
                    info!(target: LOG_TAG, "Loaded user config file");
                    return config;
                }
                Err(e) => warn!(target: LOG_TAG, "Could not deserialise {path:?}: {e}"),
            },
            Ok(_) => {}
            Err(e) => info!(target: LOG_TAG, "No config at {path:?}: {e}"),
        }
        Self::default()
    }

    pub fn write(&self) -> io::Result<()> {
        let path = get_cfg_file()?;
        let mut file = File::create(&path)?;
        file.write_all(self.serialize_ron().as_bytes())?;
        info!(target: LOG_TAG, "Saved user config to {path:?}");
        Ok(())
    }

    /// Sync the CLI options and UserOptions with each other
    pub fn sync_cli(&mut self, cli: &mut CLIOptions) {
        info!(target: LOG_TAG, "Checking CLI options");

        if cli.width != 0 && cli.width != self.width {
            self.width = cli.width;
        } else {
            cli.width = self.width;
        }
        if cli.height != 0 && cli.height != self.height {
            self.height = cli.height;
        } else {
            cli.height = self.height;
        }

        sync_flag(&mut self.low_detail, &mut cli.low_detail);
        sync_flag(&mut self.fake_contrast, &mut cli.fake_contrast);
        sync_flag(&mut self.invul_sky, &mut cli.invul_sky);
        sync_flag(&mut self.vanilla_light, &mut cli.vanilla_light);
    }
}

/// A flag given on the command line is saved, otherwise the saved one is used
fn sync_flag(saved: &mut bool, cli: &mut Option<bool>) {
    match cli {
        Some(f) => *saved = *f,
        None => *cli = Some(*saved),
    }
}
