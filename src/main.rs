use clap::Parser;
use raylib::prelude::*;

mod app;
mod assets;
mod audio;
mod demo;
mod input_map;
mod save;
mod watchers;

#[derive(Parser, Debug)]
#[command(name = "tarn", about = "A 2.5D voxel action-adventure engine")]
struct Args {
    /// Assets root; searched near the executable when omitted
    #[arg(long)]
    assets: Option<String>,
    /// Save file path, loaded at startup when present
    #[arg(long, default_value = "tarn_save.json")]
    save: String,
    /// Start fresh even when a save file exists
    #[arg(long)]
    new_game: bool,
    /// Debug mode: health floors just above zero instead of dying
    #[arg(long)]
    debug: bool,
    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<String>,
    /// Display frame cap (the simulation stays at 20 Hz regardless)
    #[arg(long, default_value_t = 60)]
    fps: u32,
}

fn main() {
    let args = Args::parse();
    init_logging(args.log_file.as_deref());

    let assets_root = assets::resolve_assets_root(args.assets.clone());
    log::info!("assets root: {}", assets_root.display());

    let (mut rl, thread) = raylib::init()
        .size(1200, 720)
        .title("tarn")
        .resizable()
        .build();
    rl.set_target_fps(args.fps);

    let mut app = match app::App::new(&mut rl, &thread, &assets_root, &args) {
        Ok(app) => app,
        Err(e) => {
            // Shader or GPU resource failures have no fallback path.
            log::error!("initialization failed: {e}");
            std::process::exit(1);
        }
    };

    match raylib::core::audio::RaylibAudio::init_audio_device() {
        Ok(device) => {
            let mut sink = audio::RlAudio::new(&device, &assets_root);
            app.run(&mut rl, &thread, &mut sink);
        }
        Err(e) => {
            log::warn!("audio device unavailable, continuing silent: {e}");
            let mut sink = audio::SilentAudio;
            app.run(&mut rl, &thread, &mut sink);
        }
    }
}

fn init_logging(log_file: Option<&str>) {
    if let Some(path) = log_file {
        match std::fs::File::create(path) {
            Ok(file) => {
                let _ = simplelog::WriteLogger::init(
                    simplelog::LevelFilter::Info,
                    simplelog::Config::default(),
                    file,
                );
                return;
            }
            Err(e) => eprintln!("could not open log file {path}: {e}"),
        }
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
