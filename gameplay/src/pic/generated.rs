//! A built in palette and picture set so the renderer can run with no game
//! data. The palette is 8 colour ramps of 32 shades each, brightest first,
//! which keeps colourmap generation trivial: darkening a colour moves it down
//! its ramp.

use log::debug;

use super::{
    Brightmap, COLOURMAP_LEN, Colourmap, FLAT_SIZE, FlatPic, LightZ, NUMCOLORMAPS, PicData,
    TINTMAP_LEN, WallPic,
};

const SHADES: usize = 32;

const RAMPS: [[u8; 3]; 8] = [
    [255, 255, 255], // gray
    [191, 123, 75],  // brown
    [255, 32, 32],   // red
    [64, 255, 64],   // green
    [80, 80, 255],   // blue
    [255, 255, 64],  // yellow
    [255, 140, 0],   // orange
    [255, 255, 210], // lamp
];

pub(super) const GRAY: u8 = 0;
pub(super) const BROWN: u8 = 32;
pub(super) const RED: u8 = 64;
pub(super) const GREEN: u8 = 96;
pub(super) const BLUE: u8 = 128;
pub(super) const YELLOW: u8 = 160;
pub(super) const ORANGE: u8 = 192;
pub(super) const LAMP: u8 = 224;

fn palette() -> Vec<[u8; 3]> {
    RAMPS
        .iter()
        .flat_map(|rgb| {
            (0..SHADES).map(move |s| {
                let f = |c: u8| (c as usize * (SHADES - s) / SHADES) as u8;
                [f(rgb[0]), f(rgb[1]), f(rgb[2])]
            })
        })
        .collect()
}

fn colourmaps() -> Vec<Colourmap> {
    let mut maps = Vec::with_capacity(COLOURMAP_LEN);
    for light in 0..NUMCOLORMAPS {
        let mut map = [0u8; 256];
        for (i, c) in map.iter_mut().enumerate() {
            let ramp = i / SHADES * SHADES;
            *c = (ramp + (i % SHADES + light).min(SHADES - 1)) as u8;
        }
        maps.push(map);
    }
    // inverse, a gray ramp flipped end to end
    let mut inverse = [0u8; 256];
    for (i, c) in inverse.iter_mut().enumerate() {
        *c = GRAY + (SHADES - 1 - i % SHADES) as u8;
    }
    maps.push(inverse);
    maps.push([GRAY + SHADES as u8 - 1; 256]);
    maps
}

/// Half and half blend. Same ramp colours average their shades, otherwise the
/// source ramp is kept at the averaged brightness.
fn tint_50() -> Vec<u8> {
    let mut table = vec![0u8; TINTMAP_LEN];
    for dest in 0..256usize {
        for src in 0..256usize {
            let shade = (dest % SHADES + src % SHADES) / 2;
            table[(dest << 8) + src] = (src / SHADES * SHADES + shade) as u8;
        }
    }
    table
}

fn wall(name: &str, width: usize, height: usize, pixel: impl Fn(usize, usize) -> u8) -> WallPic {
    let columns = (0..width)
        .map(|x| (0..height).map(|y| pixel(x, y)).collect())
        .collect();
    WallPic::new(name, columns)
}

fn flat(name: &str, pixel: impl Fn(usize, usize) -> u8) -> FlatPic {
    let mut data = Vec::with_capacity(FLAT_SIZE * FLAT_SIZE);
    for y in 0..FLAT_SIZE {
        for x in 0..FLAT_SIZE {
            data.push(pixel(x, y));
        }
    }
    FlatPic::new(name, data)
}

/// Keeps the lamp ramp bright
fn lamp_brightmap() -> Brightmap {
    let mut map = [0u8; 256];
    map[LAMP as usize..].fill(1);
    map
}

pub(super) fn build(light_z: LightZ) -> PicData {
    let mut pics = PicData::new(palette(), colourmaps(), light_z);

    // bricks, 64x128
    pics.add_wall(wall("BRICK", 64, 128, |x, y| {
        let offset = if (y / 16) % 2 == 0 { 0 } else { 16 };
        if y % 16 == 15 || (x + offset) % 32 == 0 {
            GRAY + 20
        } else {
            BROWN + ((x * 7 + y * 3) % 6) as u8
        }
    }));
    // a non power of two height, tiles every 72 rows
    pics.add_wall(wall("CHECK72", 64, 72, |x, y| {
        if (x / 8 + y / 9) % 2 == 0 {
            BLUE + 2
        } else {
            GRAY + 4
        }
    }));
    // panel with lamps in it
    let lamps = pics.add_brightmap(lamp_brightmap());
    let mut lit = wall("LITPANEL", 64, 128, |x, y| {
        if (24..40).contains(&x) && (y % 32) < 8 {
            LAMP + 2
        } else {
            GRAY + 12
        }
    });
    lit.brightmap = Some(lamps);
    pics.add_wall(lit);
    let sky = pics.add_wall(wall("SKY1", 256, 128, |x, y| {
        if y > 96 + (x * 13 % 17) {
            GRAY + 24
        } else {
            BLUE + (y / 8) as u8
        }
    }));

    pics.add_flat(flat("FLOOR4_8", |x, y| {
        if (x / 16 + y / 16) % 2 == 0 {
            GRAY + 6
        } else {
            GRAY + 14
        }
    }));
    pics.add_flat(flat("CEIL3_5", |x, y| {
        if x % 32 == 0 || y % 32 == 0 {
            GRAY + 18
        } else {
            YELLOW + 20
        }
    }));
    let mut nukage = flat("NUKAGE1", |x, y| GREEN + ((x * 3 + y * 5) % 12) as u8);
    nukage.swirl = true;
    pics.add_flat(nukage);
    let mut light = flat("TLITE6_5", |x, y| {
        let (dx, dy) = (x as i32 - 32, y as i32 - 32);
        if dx * dx + dy * dy < 144 {
            LAMP
        } else {
            RED + 8
        }
    });
    light.brightmap = Some(lamps);
    pics.add_flat(light);
    let sky_num = pics.add_flat(flat("F_SKY1", |_, _| ORANGE));

    pics.set_sky(sky_num, sky);
    pics.add_tint_map(tint_50());

    debug!(
        "Generated {} walls, {} flats",
        pics.num_walls(),
        pics.num_flats()
    );
    pics
}

#[cfg(test)]
mod tests {
    use super::{GRAY, LAMP, RED, SHADES, build};
    use crate::pic::{COLOURMAP_LEN, INVERSECOLORMAP, LightZ};

    #[test]
    fn colourmaps_darken_along_ramp() {
        let pics = build(LightZ::Vanilla);
        assert_eq!(pics.colourmap(0)[RED as usize + 3], RED + 3);
        assert_eq!(pics.colourmap(10)[RED as usize + 3], RED + 13);
        assert_eq!(pics.colourmap(31)[RED as usize], RED + SHADES as u8 - 1);
        assert_eq!(pics.colourmap(INVERSECOLORMAP)[GRAY as usize], GRAY + 31);
        assert_eq!(pics.colourmap(COLOURMAP_LEN - 1)[LAMP as usize], GRAY + 31);
    }

    #[test]
    fn generated_set_is_complete() {
        let pics = build(LightZ::Smooth);
        assert_eq!(pics.palette().len(), 256);
        let sky = pics.wall_pic(pics.sky_pic());
        assert_eq!(sky.name, "SKY1");
        assert_eq!(pics.flat_pic(pics.sky_num()).name, "F_SKY1");
        let check = pics.wallpic_num_for_name("CHECK72").unwrap();
        assert_eq!(pics.wall_pic(check).height, 72);
        let nukage = pics.flat_num_for_name("NUKAGE1").unwrap();
        assert!(pics.flat_pic(nukage).swirl);
        let lit = pics.wallpic_num_for_name("LITPANEL").unwrap();
        let bright = pics.brightmap(pics.wall_pic(lit).brightmap.unwrap());
        assert_eq!(bright[LAMP as usize], 1);
        assert_eq!(bright[GRAY as usize], 0);
    }

    #[test]
    fn tint_blends_shades() {
        let pics = build(LightZ::Vanilla);
        let tint = pics.tint_map(0);
        assert_eq!(tint[((GRAY as usize) << 8) + GRAY as usize + 10], GRAY + 5);
        assert_eq!(tint[((GRAY as usize + 20) << 8) + RED as usize], RED + 10);
    }
}
