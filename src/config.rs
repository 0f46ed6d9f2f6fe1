//! Command line configuration.

use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;
pub const DEFAULT_SCREENSHOT: &str = "screenshot";
pub const DEFAULT_RESOURCES: &str = "resources";

/// Host for OpenGL teaching plugins.
#[derive(Clone, Debug, Parser, PartialEq)]
#[command(name = "ogl4core", version, about)]
pub struct Config {
    /// Plugin to activate at startup (defaults to the first listed).
    #[arg(short, long, value_name = "NAME")]
    pub plugin: Option<String>,

    /// Frame indices to capture, separated by commas or spaces.
    #[arg(short, long, value_name = "FRAME", num_args = 1.., value_delimiter = ',')]
    pub screenshot: Vec<u64>,

    /// Screenshot base name; frame `n` is written to `<name>_<n:05>.png`.
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_SCREENSHOT)]
    pub filename: PathBuf,

    /// Exit once the last scheduled screenshot has been taken.
    #[arg(short, long)]
    pub quit: bool,

    /// Directory holding the per-plugin resource folders.
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_RESOURCES)]
    pub resources: PathBuf,

    /// Initial window width.
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: u32,

    /// Initial window height.
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: u32,

    /// Print the registered plugins and exit.
    #[arg(short, long)]
    pub list: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            plugin: None,
            screenshot: Vec::new(),
            filename: PathBuf::from(DEFAULT_SCREENSHOT),
            quit: false,
            resources: PathBuf::from(DEFAULT_RESOURCES),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            list: false,
        }
    }
}
