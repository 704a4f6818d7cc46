#![doc = include_str!("../../README.md")]

mod cli;
mod config;
mod demo;
mod ppm;

use std::error::Error;
use std::fs::File;
use std::io::BufWriter;

use gameplay::log::{self, debug, info, warn};
use gameplay::{Level, LightZ, PicData};
use math::{Angle, FRACUNIT};
use mimalloc::MiMalloc;
use render_soft::{RenderOptions, RenderStats, SoftwareRenderer};
use render_trait::{FrameBuffer, PlayViewRenderer};
use simplelog::TermLogger;

use crate::cli::CLIOptions;
use crate::config::UserConfig;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Walk the demo level for a number of tics, rendering every one, then write
/// the last frame out as an image
fn main() -> Result<(), Box<dyn Error>> {
    let mut options: CLIOptions = argh::from_env();

    TermLogger::init(
        options.verbose.unwrap_or(log::LevelFilter::Info),
        simplelog::ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let mut user_config = UserConfig::load();
    user_config.sync_cli(&mut options);
    if let Err(e) = user_config.write() {
        warn!("Could not write config: {e}");
    }

    math::init_tables();
    let light_z = if options.vanilla_light.unwrap_or_default() {
        LightZ::Vanilla
    } else {
        LightZ::Smooth
    };
    let mut pic_data = PicData::generated(light_z);
    let mut level = Level::new(demo::corridor()?);
    let mut player = demo::player(&level.map_data);
    player.fixedcolormap = options.colourmap;
    let watchers = demo::watchers(&level.map_data);
    let mut seen = vec![0u32; watchers.len()];

    let (width, height) = (options.width as usize, options.height as usize);
    let mut renderer = SoftwareRenderer::new(
        width,
        height,
        RenderOptions {
            low_detail: options.low_detail.unwrap_or_default(),
            fake_contrast: options.fake_contrast.unwrap_or(true),
            invul_sky: options.invul_sky.unwrap_or_default(),
        },
    );
    let mut buffer = FrameBuffer::new(width, height);
    let mut peak = RenderStats::default();

    // whole degrees to BAM, a full turn is 2^32
    let turn = Angle::new((options.turn as i64 * (1i64 << 32) / 360) as u32);
    let frames = options.frames.max(1);
    for tic in 0..frames {
        renderer.render_player_view(&player, &level, &mut pic_data, &mut buffer);
        let stats = renderer.stats();
        debug!(
            "Tic {tic}: {} segs, {} visplanes drawn",
            stats.rendered_segs, stats.rendered_visplanes
        );
        peak.rendered_segs = peak.rendered_segs.max(stats.rendered_segs);
        peak.rendered_visplanes = peak.rendered_visplanes.max(stats.rendered_visplanes);
        peak.visplanes = peak.visplanes.max(stats.visplanes);
        peak.drawsegs = peak.drawsegs.max(stats.drawsegs);
        peak.openings = peak.openings.max(stats.openings);

        for ((_, watcher), count) in watchers.iter().zip(seen.iter_mut()) {
            if level.check_sight(watcher, &player.mobj) {
                *count += 1;
            }
        }

        level.tic();
        player.turn(turn);
        player.walk(&level.map_data, options.speed * FRACUNIT);
    }

    info!(
        "Peak per frame: {} segs, {} visplanes drawn of {}, {} drawsegs, {} openings",
        peak.rendered_segs, peak.rendered_visplanes, peak.visplanes, peak.drawsegs, peak.openings
    );
    for ((name, _), count) in watchers.iter().zip(&seen) {
        info!("Watcher in the {name} saw the player on {count} of {frames} tics");
    }
    let [rejected, traced] = level.sight_counts();
    info!(
        "Sight checks: {rejected} rejected early, {traced} traced through {} nodes",
        level.sight_traversals()
    );

    let mut out = BufWriter::new(File::create(&options.output)?);
    ppm::write_ppm(&mut out, &buffer, pic_data.palette())?;
    info!("Wrote last frame to {}", options.output);

    #[cfg(feature = "hprof")]
    coarse_prof::write(&mut std::io::stdout())?;
    Ok(())
}
