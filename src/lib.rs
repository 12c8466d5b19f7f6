// textured ascii glyph rendering:
// - an atlas rasterizes the ascii set once with fontdue
// - a layout pass turns strings into screen-space quads (bearing and
//   baseline corrections included)
// - a wgpu renderer draws one textured quad per glyph under a fixed
//   orthographic projection

pub mod camera;
pub mod render;
pub mod text;
pub mod window;
