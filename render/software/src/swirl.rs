//! Rippling liquid flats. A 64x64 offset table is rebuilt once per tic and
//! used to shuffle the texels of any flat marked as swirling.

use gameplay::FLAT_SIZE;
use math::{FINEMASK, finesine};

const SWIRLFACTOR: usize = 8192 / 64;
const SWIRLFACTOR2: usize = 8192 / 32;
const AMP: i32 = 2;
const AMP2: i32 = 2;
const SPEED: usize = 40;
/// Tics before the pattern repeats
const SEQUENCE: u32 = 1024;

#[derive(Default)]
pub(crate) struct SwirlCache {
    tic: Option<u32>,
    offsets: Vec<usize>,
    /// Distorted copies for the current tic, by flat number
    flats: Vec<(usize, Vec<u8>)>,
}

impl SwirlCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn build_offsets(&mut self, tic: u32) {
        let i = (tic % SEQUENCE) as usize;
        let size = FLAT_SIZE as i32;
        self.offsets.resize(FLAT_SIZE * FLAT_SIZE, 0);

        for y in 0..FLAT_SIZE {
            for x in 0..FLAT_SIZE {
                let mut x1 = x as i32 + size * 2;
                let mut y1 = y as i32 + size * 2;

                x1 += (finesine((y * SWIRLFACTOR + i * SPEED * 5 + 900) & FINEMASK) * AMP) >> 16;
                x1 += (finesine((x * SWIRLFACTOR2 + i * SPEED * 4 + 300) & FINEMASK) * AMP2) >> 16;
                y1 += (finesine((x * SWIRLFACTOR + i * SPEED * 3 + 700) & FINEMASK) * AMP) >> 16;
                y1 += (finesine((y * SWIRLFACTOR2 + i * SPEED * 4 + 1200) & FINEMASK) * AMP2) >> 16;

                let x1 = (x1 & (size - 1)) as usize;
                let y1 = (y1 & (size - 1)) as usize;
                self.offsets[y * FLAT_SIZE + x] = y1 * FLAT_SIZE + x1;
            }
        }
        self.tic = Some(tic);
        self.flats.clear();
    }

    /// The flat `flatnum` as it looks at `level_time`. Doom function name
    /// `R_DistortedFlat`.
    pub fn distorted(&mut self, flatnum: usize, flat: &[u8], level_time: u32) -> &[u8] {
        if self.tic != Some(level_time) {
            self.build_offsets(level_time);
        }
        let index = match self.flats.iter().position(|(num, _)| *num == flatnum) {
            Some(index) => index,
            None => {
                let data = self.offsets.iter().map(|&o| flat[o]).collect();
                self.flats.push((flatnum, data));
                self.flats.len() - 1
            }
        };
        &self.flats[index].1
    }
}

#[cfg(test)]
mod tests {
    use gameplay::FLAT_SIZE;

    use super::SwirlCache;

    #[test]
    fn distortion_is_a_permutation_of_texels() {
        let flat: Vec<u8> = (0..FLAT_SIZE * FLAT_SIZE).map(|i| (i % 7) as u8).collect();
        let mut cache = SwirlCache::new();
        let out = cache.distorted(2, &flat, 35).to_vec();
        assert_eq!(out.len(), flat.len());
        // every texel comes from the source flat
        assert!(out.iter().all(|t| *t < 7));
        assert!(cache.offsets.iter().all(|o| *o < FLAT_SIZE * FLAT_SIZE));
    }

    #[test]
    fn cached_per_tic() {
        let flat: Vec<u8> = (0..FLAT_SIZE * FLAT_SIZE).map(|i| (i & 255) as u8).collect();
        let mut cache = SwirlCache::new();
        let a = cache.distorted(2, &flat, 10).to_vec();
        assert_eq!(cache.distorted(2, &flat, 10), &a[..]);
        assert_eq!(cache.flats.len(), 1);
        cache.distorted(3, &flat, 10);
        assert_eq!(cache.flats.len(), 2);

        let b = cache.distorted(2, &flat, 11).to_vec();
        assert_eq!(cache.flats.len(), 1);
        assert_ne!(a, b);
        // the sequence loops
        assert_eq!(cache.distorted(2, &flat, 10 + 1024), &a[..]);
    }
}
