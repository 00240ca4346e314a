//! Template and image resources baked into the binary.
//!
//! The two text templates are rendered once per game with tera; the
//! placeholders are filled with literal text, no escaping.

pub const CARTRIDGE_XML: &str = r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<byog_cartridge version="1.0">
    <title>{{ game_title }}</title>
    <desc>{{ game_description }}</desc>
    <boxart file="boxart/boxart.png" ext="png"/>
</byog_cartridge>
"#;

pub const EXEC_SH: &str = r#"#!/bin/sh
set -x
/emulator/retroplayer ./emu/{{ core_file_name }} "./roms/{{ game_file_name }}"
"#;

/// Fallback box art used when a game entry has no `<thumbnail>`.
pub const DEFAULT_BOXART: &[u8] = include_bytes!("../resources/title.png");
