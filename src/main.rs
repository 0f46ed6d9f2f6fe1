use clap::Parser;
use env_logger::Env;
use ogl4core::{plugins, Config, Core, EguiOverlay, GlWindow, PluginRegistry};
use std::error::Error as _;
use std::process;

fn run(config: &Config) -> ogl4core::Result<()> {
    let mut registry = PluginRegistry::new();
    plugins::register_all(&mut registry)?;

    if config.list {
        for descriptor in registry.all() {
            println!("{:>4}  {:<16} {}", descriptor.idx(), descriptor.name(), descriptor.path());
        }
        return Ok(());
    }

    let window = GlWindow::open("OGL4Core2", config.width, config.height)?;
    let core = Core::new(window, registry, config);
    let overlay = EguiOverlay::new(core.surface())?;
    core.with_overlay(overlay).run()
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let config = Config::parse();

    if let Err(err) = run(&config) {
        eprintln!("ogl4core: {}", err);
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        process::exit(1);
    }
}
