use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{FileOperation, IoError};
use crate::gamelist::{self, GamelistError};
use crate::recipe;

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ResepError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Gamelist(#[from] GamelistError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Recipe(#[from] recipe::RecipeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Io(#[from] IoError),
}

// Directory arguments must point at existing directories. The core path
// itself is deliberately not checked here.
fn validate_dirs(bios_dir: Option<&Path>, output_dir: &Path) -> bool {
    for dir_path in [bios_dir, Some(output_dir)].into_iter().flatten() {
        if !dir_path.is_dir() {
            log::error!("{} is not a valid directory", dir_path.display());
            return false;
        }
    }
    true
}

/// Builds one recipe directory per `<game>` entry in the gamelist.
///
/// Usage errors and a malformed gamelist are logged and end the run cleanly
/// with no recipes built. Unexpected I/O failures (missing ROM or core,
/// permission errors) propagate as a [`ResepError`], leaving whatever output
/// was already written in place.
///
/// When `output_dir` is `None`, a `recipes` directory next to the gamelist
/// file is used and created if necessary.
pub fn build_recipes(
    gamelist_path: Option<&Path>,
    core_path: Option<&Path>,
    bios_dir: Option<&Path>,
    output_dir: Option<&Path>,
) -> Result<(), ResepError> {
    let gamelist_path = gamelist_path.filter(|path| !path.as_os_str().is_empty());
    let core_path = core_path.filter(|path| !path.as_os_str().is_empty());
    let (Some(gamelist_path), Some(core_path)) = (gamelist_path, core_path) else {
        log::error!("you must specify at least a path to a gamelist.xml and a path to a core");
        return Ok(());
    };

    let output_dir: PathBuf = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => gamelist_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("recipes"),
    };

    // Symlink targets resolve relative to the link's directory, so the
    // recipes (and the boxart paths linked from them) must be anchored to
    // an absolute output directory.
    let output_dir = std::path::absolute(&output_dir)
        .map_err(|error| IoError::new(FileOperation::Mkdir, output_dir.clone(), error))?;

    if output_dir.exists() && !output_dir.is_dir() {
        log::error!("{} is not a valid directory", output_dir.display());
        return Ok(());
    }

    fs::create_dir_all(&output_dir)
        .map_err(|error| IoError::new(FileOperation::Mkdir, output_dir.clone(), error))?;

    if !validate_dirs(bios_dir, &output_dir) {
        return Ok(());
    }

    log::info!("starting new recipes build run");

    let entries = match gamelist::read_gamelist(gamelist_path) {
        Ok(entries) => entries,
        Err(GamelistError::Parse { .. }) => {
            log::error!(
                "{} does not appear to be a valid XML file",
                gamelist_path.display()
            );
            return Ok(());
        }
        Err(other) => return Err(other.into()),
    };

    for entry in &entries {
        recipe::build_recipe(entry, core_path, bios_dir, &output_dir)?;
    }

    Ok(())
}
