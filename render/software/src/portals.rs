/// Per column clip state for one frame. Walls narrow the open window between
/// `ceilingclip` and `floorclip` as they are drawn front to back, and a column
/// becomes solid once that window closes.
#[derive(Default)]
pub(crate) struct PortalClip {
    /// Clip values are the solid pixel bounding the range.
    ///  floorclip starts out SCREENHEIGHT
    pub floorclip: Vec<i32>,
    ///  ceilingclip starts out -1
    pub ceilingclip: Vec<i32>,
    /// Columns fully covered by solid walls. Doom function name `solidcol`
    pub solidcol: Vec<bool>,
    view_height: i32,
}

impl PortalClip {
    pub fn new(view_width: usize, view_height: usize) -> Self {
        PortalClip {
            floorclip: vec![view_height as i32; view_width],
            ceilingclip: vec![-1; view_width],
            solidcol: vec![false; view_width],
            view_height: view_height as i32,
        }
    }

    pub fn view_height(&self) -> i32 {
        self.view_height
    }

    /// Reset the clip arrays and solid columns for a new frame
    pub(super) fn clear(&mut self) {
        self.floorclip.fill(self.view_height);
        self.ceilingclip.fill(-1);
        self.solidcol.fill(false);
    }

    /// True while any column in `first..last` is still open
    pub fn any_open(&self, first: usize, last: usize) -> bool {
        self.solidcol[first..last].iter().any(|solid| !solid)
    }
}

#[cfg(test)]
mod tests {
    use super::PortalClip;

    #[test]
    fn clear_resets_everything() {
        let mut clip = PortalClip::new(320, 200);
        clip.floorclip[10] = 50;
        clip.ceilingclip[10] = 40;
        clip.solidcol[10] = true;
        clip.clear();
        assert_eq!(clip.floorclip[10], 200);
        assert_eq!(clip.ceilingclip[10], -1);
        assert!(!clip.solidcol[10]);
    }

    #[test]
    fn open_columns() {
        let mut clip = PortalClip::new(8, 8);
        clip.solidcol[2..6].fill(true);
        assert!(!clip.any_open(2, 6));
        assert!(clip.any_open(1, 6));
        assert!(clip.any_open(2, 7));
    }
}
