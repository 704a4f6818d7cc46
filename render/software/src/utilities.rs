//! Lookup tables that depend on the view size, and the small projection
//! helpers built on them.

use gameplay::LIGHTSCALESHIFT;
use gameplay::log::debug;
use math::{
    ANG90, ANGLETOFINESHIFT, Angle, FINEANGLES, FINEMASK, FRACBITS, FRACUNIT, Fixed, finecosine,
    finesine, finetangent, fixed_div, fixed_mul,
};

/// Horizontal field of view in fine angles, 90 degrees
const FIELDOFVIEW: usize = 2048;
/// A 256 wide sky texture repeats four times per turn
pub const ANGLETOSKYSHIFT: u32 = 22;
/// Width the sky scale was tuned for
const ORIGINAL_WIDTH: i32 = 320;
/// Sky texture row drawn at the horizon
pub const SKY_TEXTUREMID: Fixed = 100 * FRACUNIT;

/// Everything that changes only when the view size or detail level changes.
/// Doom functions `R_InitTextureMapping` and `R_ExecuteSetViewSize`.
pub(crate) struct ViewTables {
    /// 1 in low detail, every view pixel then covers a 2x2 screen block
    pub detail_shift: u32,
    pub screen_width: usize,
    pub view_width: i32,
    pub view_height: i32,
    pub centerx: i32,
    pub centery: i32,
    pub centerxfrac: Fixed,
    pub centeryfrac: Fixed,
    pub projection: Fixed,
    /// Fine angle (view relative, plus 90 degrees) to the first screen column
    /// it covers. `FINEANGLES / 2` entries.
    pub viewangletox: Vec<i32>,
    /// Screen column to the view relative angle of its left edge.
    /// `view_width + 1` entries.
    pub xtoviewangle: Vec<Angle>,
    /// Half the field of view, anything beyond is off screen
    pub clipangle: Angle,
    /// Distance factor per screen row for flats
    pub yslope: Vec<Fixed>,
    /// Wall scale to light table index
    pub light_scale_shift: u32,
    pub sky_iscale: Fixed,
}

impl ViewTables {
    pub fn new(screen_width: usize, screen_height: usize, low_detail: bool) -> Self {
        let detail_shift = low_detail as u32;
        let view_width = (screen_width >> detail_shift) as i32;
        let view_height = (screen_height >> detail_shift) as i32;
        let centerx = view_width / 2;
        let centery = view_height / 2;
        let centerxfrac = centerx << FRACBITS;
        let centeryfrac = centery << FRACBITS;
        let projection = centerxfrac;

        // Use tangent table to generate viewangletox:
        //  viewangletox will give the next greatest x
        //  after the view angle.
        let focal_length = fixed_div(centerxfrac, finetangent(FINEANGLES / 4 + FIELDOFVIEW / 2));
        let mut viewangletox = vec![0i32; FINEANGLES / 2];
        for (i, x) in viewangletox.iter_mut().enumerate() {
            let tan = finetangent(i);
            *x = if tan > FRACUNIT * 2 {
                -1
            } else if tan < -FRACUNIT * 2 {
                view_width + 1
            } else {
                let t = fixed_mul(tan, focal_length);
                let t = (centerxfrac - t + FRACUNIT - 1) >> FRACBITS;
                t.clamp(-1, view_width + 1)
            };
        }

        // Scan viewangletox[] to generate xtoviewangle[]:
        //  xtoviewangle will give the smallest view angle
        //  that maps to x.
        let mut xtoviewangle = Vec::with_capacity(view_width as usize + 1);
        for x in 0..=view_width {
            let i = viewangletox.iter().position(|&t| t <= x).unwrap_or(FINEANGLES / 2);
            xtoviewangle.push(Angle::new(((i as u32) << ANGLETOFINESHIFT).wrapping_sub(ANG90)));
        }

        // Take out the fencepost cases from viewangletox.
        for x in viewangletox.iter_mut() {
            if *x == -1 {
                *x = 0;
            } else if *x == view_width + 1 {
                *x = view_width;
            }
        }
        let clipangle = xtoviewangle[0];

        let yslope = (0..view_height)
            .map(|i| {
                let dy = (((i - view_height / 2) << FRACBITS) + FRACUNIT / 2).abs();
                fixed_div((view_width / 2) << FRACBITS, dy)
            })
            .collect();

        // full screen widths past the vanilla 320 get one more light step
        let hi_res = (screen_width > ORIGINAL_WIDTH as usize) as u32;
        let light_scale_shift = LIGHTSCALESHIFT + hi_res - detail_shift;
        let sky_iscale = ((FRACUNIT as i64 * ORIGINAL_WIDTH as i64) / view_width as i64) as Fixed;

        debug!(
            "View tables for {view_width}x{view_height}, detail shift {detail_shift}, clip angle \
             {:#x}",
            clipangle.bam()
        );
        ViewTables {
            detail_shift,
            screen_width,
            view_width,
            view_height,
            centerx,
            centery,
            centerxfrac,
            centeryfrac,
            projection,
            viewangletox,
            xtoviewangle,
            clipangle,
            yslope,
            light_scale_shift,
            sky_iscale,
        }
    }

    /// Screen column for an angle already clipped to the field of view
    #[inline]
    pub fn angle_to_x(&self, view_relative: Angle) -> i32 {
        self.viewangletox[(view_relative + ANG90).fine() & (FINEANGLES / 2 - 1)]
    }
}

/// The view for one frame. Doom function name `R_SetupFrame`.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ViewPoint {
    pub x: Fixed,
    pub y: Fixed,
    pub z: Fixed,
    pub angle: Angle,
    pub sin: Fixed,
    pub cos: Fixed,
    pub extralight: i32,
    pub level_time: u32,
    /// Axis aligned walls are shaded one step apart
    pub fake_contrast: bool,
    /// The sky takes the fixed colourmap like everything else
    pub invul_sky: bool,
}

/// Per sector limits that keep wall edges steady on tall sectors. Doom
/// function name `R_FixWiggle`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WallScale {
    pub max_rwscale: Fixed,
    pub heightbits: i32,
    pub heightunit: i64,
    pub invhgtbits: i32,
}

/// `(max_rwscale, heightbits)` by sector height
const SCALE_VALUES: [(Fixed, i32); 9] = [
    (2048 * FRACUNIT, 12),
    (1024 * FRACUNIT, 12),
    (1024 * FRACUNIT, 11),
    (512 * FRACUNIT, 11),
    (512 * FRACUNIT, 10),
    (256 * FRACUNIT, 10),
    (256 * FRACUNIT, 9),
    (128 * FRACUNIT, 9),
    (64 * FRACUNIT, 9),
];

pub(crate) fn wiggle_fix(floorheight: Fixed, ceilingheight: Fixed) -> WallScale {
    let mut height = ((ceilingheight as i64 - floorheight as i64) >> FRACBITS).max(1);
    let mut index = 0;
    height >>= 7;
    loop {
        height >>= 1;
        if height == 0 {
            break;
        }
        index += 1;
    }
    let (max_rwscale, heightbits) = SCALE_VALUES[index.min(SCALE_VALUES.len() - 1)];
    WallScale {
        max_rwscale,
        heightbits,
        heightunit: 1 << heightbits,
        invhgtbits: FRACBITS - heightbits,
    }
}

/// Scale for a screen column at `visangle` on a wall with the given normal.
/// Doom function name `R_ScaleFromGlobalAngle`.
pub(crate) fn scale_from_global_angle(
    visangle: Angle,
    view: &ViewPoint,
    rw_normalangle: Angle,
    rw_distance: Fixed,
    projection: Fixed,
    max_rwscale: Fixed,
) -> Fixed {
    let anglea = Angle::new(ANG90) + (visangle - view.angle);
    let angleb = Angle::new(ANG90) + (visangle - rw_normalangle);
    let num = fixed_mul(projection, angleb.sin());
    let den = fixed_mul(rw_distance, anglea.sin());

    if den > num >> FRACBITS {
        fixed_div(num, den).clamp(256, max_rwscale)
    } else {
        max_rwscale
    }
}

/// Drift applied to the scrolling flows, `FRACUNIT / 8` per tic wrapped at
/// 128 map units.
pub(crate) fn flow_factor(level_time: u32) -> Fixed {
    ((level_time as i32) << 13) & ((128 << FRACBITS) - 1)
}

/// Texture offset for a flat with flow `flow` at `level_time`.
///
/// - `100..=102` bob back and forth at growing amplitude
/// - `200..=239` scroll in one of eight directions (north first, clockwise in
///   steps of five), the remainder picking the speed
pub(crate) fn flow_offsets(flow: i16, level_time: u32) -> (Fixed, Fixed) {
    let amplitude = (FINEANGLES / 160).wrapping_mul(level_time as usize) & FINEMASK;
    match flow {
        100 => (finesine(amplitude) * 2, finecosine(amplitude) * 2),
        101 => (finesine(amplitude) * 2, finecosine(amplitude) * 4),
        102 => (finesine(amplitude) * 4, finecosine(amplitude) * 8),
        200..=239 => {
            const SPEEDS: [Fixed; 5] = [1, 2, 4, 8, 12];
            let f = flow_factor(level_time);
            let (dx, dy) = match (flow - 200) / 5 {
                0 => (0, f),
                1 => (-f, f),
                2 => (-f, 0),
                3 => (-f, -f),
                4 => (0, -f),
                5 => (f, -f),
                6 => (f, 0),
                _ => (f, f),
            };
            let speed = SPEEDS[((flow - 200) % 5) as usize];
            (dx * speed, dy * speed)
        }
        _ => (0, 0),
    }
}
