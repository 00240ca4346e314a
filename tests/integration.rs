// End-to-end runs of the binary against a throwaway library tree.
use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

struct Library {
    root: TempDir,
    gamelist_path: PathBuf,
    core_path: PathBuf,
}

impl Library {
    fn path(&self) -> &Path {
        self.root.path()
    }
}

fn library(games: &[(&str, &str)]) -> Library {
    let root = TempDir::new().unwrap();

    let core_path = root.path().join("stella_libretro.so");
    fs::write(&core_path, b"core bytes").unwrap();

    let mut xml = String::from("<?xml version=\"1.0\"?>\n<gameList>\n");
    for (name, rom_file) in games {
        let rom_path = root.path().join(rom_file);
        fs::write(&rom_path, b"rom bytes").unwrap();
        xml.push_str(&format!(
            "  <game>\n    <name>{}</name>\n    <path>{}</path>\n  </game>\n",
            name,
            rom_path.display()
        ));
    }
    xml.push_str("</gameList>\n");

    let gamelist_path = root.path().join("gamelist.xml");
    fs::write(&gamelist_path, xml).unwrap();

    Library {
        root,
        gamelist_path,
        core_path,
    }
}

fn resep() -> Command {
    Command::cargo_bin("resep").unwrap()
}

fn recipe_dirs(output_dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(output_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.is_dir())
        .collect()
}

#[test]
fn builds_one_recipe_per_game() {
    let lib = library(&[
        ("Burger Time", "Burger Time (USA).zip"),
        ("Pitfall II", "Pitfall II (USA).zip"),
        ("Solaris", "Solaris (USA).zip"),
    ]);
    let output_dir = lib.path().join("out");
    fs::create_dir(&output_dir).unwrap();

    resep()
        .arg("-g")
        .arg(&lib.gamelist_path)
        .arg("-c")
        .arg(&lib.core_path)
        .arg("-o")
        .arg(&output_dir)
        .assert()
        .success();

    assert_eq!(recipe_dirs(&output_dir).len(), 3);

    let burger = output_dir.join("Burger Time (USA)");
    assert!(burger.join("emu/stella_libretro.so").is_file());
    assert!(burger.join("roms/Burger Time (USA).zip").is_file());
    assert!(burger.join("boxart/boxart.png").is_file());
    assert!(burger.join("save").is_dir());
    assert!(burger.join("cartridge.xml").is_file());
    assert!(burger.join("exec.sh").is_file());
}

#[test]
fn output_defaults_to_recipes_next_to_the_gamelist() {
    let lib = library(&[("Burger Time", "Burger Time (USA).zip")]);

    resep()
        .arg("-g")
        .arg(&lib.gamelist_path)
        .arg("-c")
        .arg(&lib.core_path)
        .assert()
        .success();

    let default_output = lib.path().join("recipes");
    assert_eq!(recipe_dirs(&default_output).len(), 1);
}

#[test]
fn relative_output_dir_yields_resolvable_title_links() {
    let lib = library(&[("Burger Time", "Burger Time (USA).zip")]);

    resep()
        .current_dir(lib.path())
        .arg("-g")
        .arg(&lib.gamelist_path)
        .arg("-c")
        .arg(&lib.core_path)
        .arg("-o")
        .arg("out")
        .assert()
        .success();

    // metadata() follows the symlink; it must land on an existing file.
    let title = lib.path().join("out/Burger Time (USA)/title.png");
    assert!(fs::metadata(&title).is_ok());
}

#[test]
fn output_path_that_is_a_file_is_a_usage_error() {
    let lib = library(&[("Burger Time", "Burger Time (USA).zip")]);
    let output_file = lib.path().join("out");
    fs::write(&output_file, b"not a directory").unwrap();

    resep()
        .arg("-g")
        .arg(&lib.gamelist_path)
        .arg("-c")
        .arg(&lib.core_path)
        .arg("-o")
        .arg(&output_file)
        .assert()
        .success()
        .stderr(predicates::str::contains("is not a valid directory"));

    assert!(output_file.is_file());
}

#[test]
fn invalid_xml_is_logged_and_produces_no_recipes() {
    let lib = library(&[]);
    fs::write(&lib.gamelist_path, "<gameList><game><name>Broken</game>").unwrap();
    let output_dir = lib.path().join("out");
    fs::create_dir(&output_dir).unwrap();

    resep()
        .arg("-g")
        .arg(&lib.gamelist_path)
        .arg("-c")
        .arg(&lib.core_path)
        .arg("-o")
        .arg(&output_dir)
        .assert()
        .success()
        .stderr(predicates::str::contains(
            "does not appear to be a valid XML file",
        ));

    assert!(recipe_dirs(&output_dir).is_empty());
}

#[test]
fn missing_required_paths_is_a_usage_error() {
    let lib = library(&[]);

    resep()
        .arg("-g")
        .arg(&lib.gamelist_path)
        .assert()
        .success()
        .stderr(predicates::str::contains(
            "you must specify at least a path to a gamelist.xml and a path to a core",
        ));
}

#[test]
fn nonexistent_bios_dir_is_a_usage_error() {
    let lib = library(&[("Burger Time", "Burger Time (USA).zip")]);
    let output_dir = lib.path().join("out");
    fs::create_dir(&output_dir).unwrap();

    resep()
        .arg("-g")
        .arg(&lib.gamelist_path)
        .arg("-c")
        .arg(&lib.core_path)
        .arg("-b")
        .arg(lib.path().join("no-such-bios"))
        .arg("-o")
        .arg(&output_dir)
        .assert()
        .success()
        .stderr(predicates::str::contains("is not a valid directory"));

    assert!(recipe_dirs(&output_dir).is_empty());
}

#[test]
fn bios_files_land_in_every_recipe() {
    let lib = library(&[
        ("Burger Time", "Burger Time (USA).zip"),
        ("Pitfall II", "Pitfall II (USA).zip"),
    ]);
    let bios_dir = lib.path().join("bios");
    fs::create_dir(&bios_dir).unwrap();
    fs::write(bios_dir.join("firmware.bin"), b"fw").unwrap();
    let output_dir = lib.path().join("out");
    fs::create_dir(&output_dir).unwrap();

    resep()
        .arg("-g")
        .arg(&lib.gamelist_path)
        .arg("-c")
        .arg(&lib.core_path)
        .arg("-b")
        .arg(&bios_dir)
        .arg("-o")
        .arg(&output_dir)
        .assert()
        .success();

    for dir in recipe_dirs(&output_dir) {
        assert!(dir.join("roms/firmware.bin").is_file());
    }
}

#[test]
fn missing_rom_file_aborts_the_run() {
    let lib = library(&[("Burger Time", "Burger Time (USA).zip")]);
    let mut xml = fs::read_to_string(&lib.gamelist_path).unwrap();
    xml = xml.replace(
        "</gameList>",
        &format!(
            "  <game>\n    <name>Ghost</name>\n    <path>{}</path>\n  </game>\n</gameList>",
            lib.path().join("missing.zip").display()
        ),
    );
    fs::write(&lib.gamelist_path, xml).unwrap();
    let output_dir = lib.path().join("out");
    fs::create_dir(&output_dir).unwrap();

    resep()
        .arg("-g")
        .arg(&lib.gamelist_path)
        .arg("-c")
        .arg(&lib.core_path)
        .arg("-o")
        .arg(&output_dir)
        .assert()
        .failure();

    // The first entry was fully packaged; the failing one left partial
    // output behind (scaffolding and generated files, no ROM).
    assert_eq!(recipe_dirs(&output_dir).len(), 2);
    let burger = output_dir.join("Burger Time (USA)");
    assert!(burger.join("roms/Burger Time (USA).zip").is_file());
    let ghost = output_dir.join("missing");
    assert!(ghost.join("cartridge.xml").is_file());
    assert!(!ghost.join("roms/missing.zip").exists());
}
