// text drawing, kept simple:
// - fontdue turns font glyphs (beziers) into coverage bitmaps
// - each non-empty glyph gets its own small texture
// - strings become rows of textured quads, one draw call per glyph

pub mod atlas;
pub mod layout;
pub mod pipeline;
pub mod renderer;
