use argh::FromArgs;
use gameplay::log;

/// CLI options for the headless viewer
#[derive(Debug, Clone, FromArgs)]
pub struct CLIOptions {
    /// verbose level: off, error, warn, info, debug, trace
    #[argh(option)]
    pub verbose: Option<log::LevelFilter>,
    /// resolution width in pixels
    #[argh(option, default = "0")]
    pub width: u32,
    /// resolution height in pixels
    #[argh(option, default = "0")]
    pub height: u32,
    /// low detail, every view pixel drawn as a 2x2 block
    #[argh(option)]
    pub low_detail: Option<bool>,
    /// shade walls along the map axes one light step apart
    #[argh(option)]
    pub fake_contrast: Option<bool>,
    /// let the invulnerability colourmap tint the sky
    #[argh(option)]
    pub invul_sky: Option<bool>,
    /// vanilla (banded) flat lighting instead of the smooth gradient
    #[argh(option)]
    pub vanilla_light: Option<bool>,
    /// force a colourmap on everything, 32 is the invulnerability map
    #[argh(option)]
    pub colourmap: Option<usize>,
    /// number of tics to walk through the demo level
    #[argh(option, default = "70")]
    pub frames: u32,
    /// map units walked per tic
    #[argh(option, default = "4")]
    pub speed: i32,
    /// degrees turned per tic, positive turns left
    #[argh(option, default = "0")]
    pub turn: i32,
    /// where to write the last frame as a PPM image
    #[argh(option, default = "String::from(\"view.ppm\")")]
    pub output: String,
}
