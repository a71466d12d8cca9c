use iced_overlay_player::{app, config};
use log::warn;
use std::path::PathBuf;

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = pico_args::Arguments::from_env();
    let config_path: Option<PathBuf> = args.opt_value_from_str("--config").unwrap_or_else(|err| {
        warn!("ignoring --config: {err}");
        None
    });
    let startup = args.finish().into_iter().next().map(PathBuf::from);

    let loaded = match &config_path {
        Some(path) => config::load_from_path(path),
        None => config::load(),
    };
    let settings = loaded.unwrap_or_else(|err| {
        warn!("using default settings: {err}");
        config::PlayerConfig::default()
    });

    app::run(settings, startup)
}
