use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;
use miette::Diagnostic;
use tera::{Context, Tera};
use thiserror::Error;

use crate::config::{CARTRIDGE_XML, DEFAULT_BOXART, EXEC_SH};
use crate::errors::{FileOperation, IoError};
use crate::gamelist::GameEntry;

const RECIPE_SUB_DIRS: [&str; 4] = ["emu", "roms", "boxart", "save"];

#[derive(Debug, Error, Diagnostic)]
pub enum RecipeError {
    #[error("I/O error within recipe domain")]
    #[diagnostic(code(resep::recipe::io))]
    Io(#[from] IoError),

    #[error("game entry is missing its <{field}> element")]
    #[diagnostic(
        code(resep::recipe::missing_field),
        help("Every <game> needs at least a <name> and a <path>")
    )]
    MissingField { field: &'static str },

    #[error("unable to derive a file name from '{path}'")]
    #[diagnostic(code(resep::recipe::file_name))]
    FileName { path: PathBuf },

    #[error("failed to render the {name} template")]
    #[diagnostic(code(resep::recipe::render))]
    Render {
        name: &'static str,
        #[source]
        source: tera::Error,
    },
}

fn file_name(path: &Path) -> Result<String, RecipeError> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| RecipeError::FileName {
            path: path.to_path_buf(),
        })
}

fn file_stem(path: &Path) -> Result<String, RecipeError> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| RecipeError::FileName {
            path: path.to_path_buf(),
        })
}

fn create_directory(path: &Path) -> Result<(), RecipeError> {
    fs::create_dir_all(path)
        .map_err(|error| IoError::new(FileOperation::Mkdir, path.to_path_buf(), error))?;

    Ok(())
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), RecipeError> {
    fs::write(path, contents)
        .map_err(|error| IoError::new(FileOperation::Write, path.to_path_buf(), error))?;

    let msg = format!("{} {}", "create".green(), path.display());

    println!("{}", &msg);

    Ok(())
}

fn copy_file(source: &Path, destination: &Path) -> Result<(), RecipeError> {
    fs::copy(source, destination)
        .map_err(|error| IoError::new(FileOperation::Copy, source.to_path_buf(), error))?;

    Ok(())
}

/// Copies every plain file directly inside `source_dir` into `dest_dir`.
/// Subdirectories are skipped, nothing is recursed into.
fn copy_dir_files(source_dir: &Path, dest_dir: &Path) -> Result<(), RecipeError> {
    let listing = fs::read_dir(source_dir)
        .map_err(|error| IoError::new(FileOperation::ReadDir, source_dir.to_path_buf(), error))?;

    for dir_entry in listing {
        let dir_entry = dir_entry.map_err(|error| {
            IoError::new(FileOperation::ReadDir, source_dir.to_path_buf(), error)
        })?;
        let source_path = dir_entry.path();
        if source_path.is_file() {
            copy_file(&source_path, &dest_dir.join(dir_entry.file_name()))?;
        }
    }

    Ok(())
}

fn render(name: &'static str, template: &str, ctx: &Context) -> Result<String, RecipeError> {
    Tera::one_off(template, ctx, false).map_err(|source| RecipeError::Render { name, source })
}

/// Renders and writes `cartridge.xml` for one game. An absent description
/// becomes an empty substitution, never a leftover token.
fn write_cartridge_xml(
    game_dir: &Path,
    game_name: &str,
    game_desc: Option<&str>,
) -> Result<(), RecipeError> {
    log::info!("creating cartridge.xml file for {}", game_name);

    let mut ctx = Context::new();
    ctx.insert("game_title", game_name);
    ctx.insert("game_description", game_desc.unwrap_or(""));

    let cart_xml = render("cartridge.xml", CARTRIDGE_XML, &ctx)?;

    write_file(&game_dir.join("cartridge.xml"), cart_xml.as_bytes())
}

/// Renders and writes `exec.sh`, the launch script the downstream packager
/// bundles alongside the core and ROM.
fn write_exec_sh(
    game_dir: &Path,
    core_file_name: &str,
    game_file_name: &str,
) -> Result<(), RecipeError> {
    log::info!("creating exec.sh for {}", game_file_name);

    let mut ctx = Context::new();
    ctx.insert("core_file_name", core_file_name);
    ctx.insert("game_file_name", game_file_name);

    let exec_sh = render("exec.sh", EXEC_SH, &ctx)?;

    write_file(&game_dir.join("exec.sh"), exec_sh.as_bytes())
}

/// Places the box art, falling back to the bundled default image when the
/// entry carries no `<thumbnail>`.
fn place_boxart(
    entry: &GameEntry,
    game_name: &str,
    boxart_target: &Path,
) -> Result<(), RecipeError> {
    match &entry.boxart_path {
        Some(boxart_path) => copy_file(boxart_path, boxart_target),
        None => {
            log::info!("no boxart listed for {}, using default", game_name);
            write_file(boxart_target, DEFAULT_BOXART)
        }
    }
}

/// Links `title.png` in the recipe root to the placed box art. An existing
/// link is replaced so a rebuild of the same recipe stays last-write-wins.
fn link_title(game_dir: &Path, boxart_target: &Path) -> Result<(), RecipeError> {
    let link_path = game_dir.join("title.png");

    match fs::remove_file(&link_path) {
        Ok(()) => {}
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
        Err(error) => Err(IoError::new(FileOperation::Remove, link_path.clone(), error))?,
    }

    #[cfg(unix)]
    std::os::unix::fs::symlink(boxart_target, &link_path)
        .map_err(|error| IoError::new(FileOperation::Symlink, link_path.clone(), error))?;

    #[cfg(windows)]
    std::os::windows::fs::symlink_file(boxart_target, &link_path)
        .map_err(|error| IoError::new(FileOperation::Symlink, link_path.clone(), error))?;

    Ok(())
}

/// Builds one recipe directory for `entry` under `output_dir` and returns
/// its path.
///
/// The directory is named after the ROM's file stem; a pre-existing directory
/// with the same name is merged into and overwritten, never cleaned first.
pub fn build_recipe(
    entry: &GameEntry,
    core_path: &Path,
    bios_dir: Option<&Path>,
    output_dir: &Path,
) -> Result<PathBuf, RecipeError> {
    let game_name = entry
        .name
        .as_deref()
        .ok_or(RecipeError::MissingField { field: "name" })?;
    let rom_path = entry
        .rom_path
        .as_deref()
        .ok_or(RecipeError::MissingField { field: "path" })?;

    let rom_file_name = file_name(rom_path)?;
    let core_file_name = file_name(core_path)?;
    let game_dir = output_dir.join(file_stem(rom_path)?);

    create_directory(&game_dir)?;
    for sub_dir in RECIPE_SUB_DIRS {
        create_directory(&game_dir.join(sub_dir))?;
    }

    write_cartridge_xml(&game_dir, game_name, entry.description.as_deref())?;
    write_exec_sh(&game_dir, &core_file_name, &rom_file_name)?;

    copy_file(core_path, &game_dir.join("emu").join(&core_file_name))?;
    copy_file(rom_path, &game_dir.join("roms").join(&rom_file_name))?;

    let boxart_target = game_dir.join("boxart").join("boxart.png");
    place_boxart(entry, game_name, &boxart_target)?;

    if let Some(bios_dir) = bios_dir {
        copy_dir_files(bios_dir, &game_dir.join("roms"))?;
    }

    link_title(&game_dir, &boxart_target)?;

    Ok(game_dir)
}
