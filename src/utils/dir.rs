use std::{env, io, path::PathBuf};

use anyhow::{anyhow, Result};
use cfg_if::cfg_if;

pub const APPLICATION_DIR: &str = "activity-sampling";

cfg_if! {
    if #[cfg(windows)] {
        fn state_home() -> Result<PathBuf> {
            env::var("APPDATA")
                .map(PathBuf::from)
                .map_err(|_| anyhow!("APPDATA should be present on Windows"))
        }
    } else {
        fn state_home() -> Result<PathBuf> {
            env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .map_err(|_| anyhow!("Couldn't find neither XDG_STATE_HOME nor HOME"))
        }
    }
}

/// `$XDG_STATE_HOME/activity-sampling`, falling back to `$HOME/.local/state`, or `%APPDATA%` on
/// Windows. The directory is created if missing.
pub fn create_application_default_path() -> Result<PathBuf> {
    let mut path = state_home()?;
    path.push(APPLICATION_DIR);
    create_dir(path)
}

pub fn create_dir(path: PathBuf) -> Result<PathBuf> {
    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v.into()),
    }
}
