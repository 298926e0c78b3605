use anyhow::{Context, Result};
use directories::BaseDirs;
use std::path::PathBuf;

pub const APP_NAME: &str = "modrank";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed module directory, resolved against the working directory.
pub const MODULE_DIR: &str = "modules.d";

/// Comment marker that introduces a module's title line.
pub const TITLE_MARKER: &str = "# TITLE: ";

/// Rows inside the module box.
pub const VISIBLE_ROWS: usize = 15;

/// Max rendered width of a module line.
pub const MAX_LABEL_WIDTH: usize = 60;

/// Left padding before each module entry.
pub const LEFT_PAD: usize = 5;

/// Width of the module box, label width plus the border columns.
pub const MENU_WIDTH: u16 = MAX_LABEL_WIDTH as u16 + 2;

pub const INSTRUCTIONS: [&str; 2] = [
    "Up/Dn = Move, Right = Select for reordering",
    "Left/Enter = Commit new position, Space = Toggle enabled/disabled",
];

pub const FOOTER: &str = "Press 'q' to quit";

pub const QUIT_PROMPT: &str = "Save changes? (Y)es/(N)o/(C)ancel";

pub fn data_dir() -> Result<PathBuf> {
    let base = BaseDirs::new().context("resolve home dir")?;
    Ok(base.data_local_dir().join(APP_NAME))
}
