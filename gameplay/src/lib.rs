//! Level data, pictures and light tables, and the things that look at the
//! level. Everything the software renderer reads lives here.
#![allow(clippy::new_without_default)]

mod level;
mod pic;
mod player;
pub mod thing;

pub use level::builder::{Boundary, CorridorBuilder, Room};
pub use level::flags::{LineDefFlags, render_flags};
pub use level::map_data::{IS_SSECTOR_MASK, MapData, RejectMatrix, subsector_index};
pub use level::map_defs::{
    BBox, LineDef, Node, Sector, Segment, SideDef, SlopeType, SubSector, Vertex,
    line_render_flags,
};
pub use level::{Level, MapError};
pub use log;
pub use pic::{
    Brightmap, COLOURMAP_LEN, Colourmap, FLAT_SIZE, FlatPic, INVERSECOLORMAP, LIGHTLEVELS,
    LIGHTSCALESHIFT, LIGHTSEGSHIFT, LightZ, MAXLIGHTSCALE, NUMCOLORMAPS, PicData, TINTMAP_LEN,
    WallPic,
};
pub use player::{Player, VIEWHEIGHT};
pub use thing::{MapObject, PLAYER_HEIGHT};
