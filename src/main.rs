use log::{error, info};
use sdl2::keyboard::Keycode;
use snowfall::config::{CliArgs, HostConfig, DEFAULT_CONFIG_PATH};
use snowfall::display::{Display, InputEvent, RenderTarget};
use snowfall::util::FrameClock;
use snowfall::{Bitmap, ReclaimPolicy, SnowState};

/// Seconds between FPS log lines
const FPS_REPORT_INTERVAL: f32 = 2.0;

fn load_config(cli: &CliArgs) -> snowfall::Result<HostConfig> {
    let mut config = match &cli.config {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::load_or_default(DEFAULT_CONFIG_PATH)?,
    };
    config.apply(cli);
    Ok(config)
}

fn run(config: &HostConfig) -> snowfall::Result<()> {
    let (width, height) = (config.width, config.height);
    let (mut display, texture_creator) =
        Display::with_options("snowfall", width, height, config.vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, width, height)?;
    let mut bitmap = Bitmap::new(width, height, config.pitch_padding)?;
    let mut state = SnowState::new(config.reclaim);

    let mut clock = FrameClock::new(60);
    let mut show_fps = false;
    let mut since_report = 0.0;
    let mut gradient = false;
    let mut gradient_offset: u32 = 0;

    info!("=== snowfall ===");
    info!(
        "Resolution: {}x{} (pitch {} bytes)",
        display.width(),
        display.height(),
        bitmap.pitch()
    );
    info!("VSync: {}", if config.vsync { "ON" } else { "OFF" });
    info!("Reclaim expired particles: {:?}", config.reclaim);
    info!("Controls: R reset, G gradient test, P toggle reclaim, F fps, Escape quit");

    'main: loop {
        let dt = clock.tick();

        for event in display.poll_events() {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape) => break 'main,
                InputEvent::KeyDown(Keycode::R) => {
                    state.reset();
                    info!("State reset");
                },
                InputEvent::KeyDown(Keycode::G) => gradient = !gradient,
                InputEvent::KeyDown(Keycode::F) => show_fps = !show_fps,
                InputEvent::KeyDown(Keycode::P) => {
                    let reclaim = match state.reclaim() {
                        ReclaimPolicy::Never => ReclaimPolicy::OnExpiry,
                        ReclaimPolicy::OnExpiry => ReclaimPolicy::Never,
                    };
                    state.set_reclaim(reclaim);
                    info!("Reclaim expired particles: {:?}", reclaim);
                },
                InputEvent::KeyDown(_) => {},
            }
        }

        let mut buffer = bitmap.as_pixel_buffer();
        if gradient {
            buffer.render_gradient(gradient_offset);
            gradient_offset = gradient_offset.wrapping_add(1);
        } else {
            state.update_and_render(&mut buffer, dt);
        }

        if show_fps {
            since_report += dt;
            if since_report >= FPS_REPORT_INTERVAL {
                since_report = 0.0;
                info!(
                    "FPS {:.0} avg, {:.2}ms, {} free slots",
                    clock.avg_fps(),
                    clock.avg_frame_time_ms(),
                    state.pool().free_count()
                );
            }
        }

        display.present(&mut target, &bitmap)?;
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = CliArgs::parse(&args);
    if cli.help {
        println!("{}", CliArgs::usage());
        return;
    }

    let result = load_config(&cli).and_then(|config| run(&config));
    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
