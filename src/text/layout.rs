use std::rc::Rc;

use bytemuck::{Pod, Zeroable};

use super::atlas::{FontResult, GlyphAtlas};

/// One corner of a glyph rectangle: screen-space position + texture
/// coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

/// Corner order is bottom-left, bottom-right, top-left, top-right.
/// Rasterized bitmaps are top-down, so the quad's top edge samples texture
/// row 0; this mapping is fixed.
pub const QUAD_INDICES: [u16; 6] = [0, 2, 1, 1, 2, 3];

/// Screen-space rectangle for one character of a laid-out string.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphQuad {
    pub ch: char,
    pub vertices: [QuadVertex; 4],
}

impl GlyphQuad {
    /// The quad expanded to two triangles, in [`QUAD_INDICES`] order.
    pub fn triangles(&self) -> [QuadVertex; 6] {
        QUAD_INDICES.map(|i| self.vertices[i as usize])
    }

    pub fn left(&self) -> f32 {
        self.vertices[0].position[0]
    }

    pub fn bottom(&self) -> f32 {
        self.vertices[0].position[1]
    }
}

/// Turns strings into positioned glyph quads against an immutable atlas.
pub struct TextLayout {
    atlas: Rc<GlyphAtlas>,
}

impl TextLayout {
    pub fn new(atlas: Rc<GlyphAtlas>) -> Self {
        Self { atlas }
    }

    pub fn atlas(&self) -> &GlyphAtlas {
        &self.atlas
    }

    /// Lay out `text` left to right with the baseline at `origin_y` and the
    /// string's visible left edge at `origin_x`. One quad per character, in
    /// input order; characters the atlas never loaded are an error.
    pub fn layout(
        &self,
        text: &str,
        origin_x: f32,
        origin_y: f32,
        scale: f32,
    ) -> FontResult<Vec<GlyphQuad>> {
        let mut quads = Vec::with_capacity(text.len());
        let mut pen_x = origin_x;
        let mut first = true;

        for ch in text.chars() {
            let m = *self.atlas.metrics(ch)?;

            // the first glyph's left bearing is absorbed so the string's
            // visible left edge lands exactly on origin_x
            let bearing_x = if first { 0 } else { m.bearing_x };
            first = false;

            let xpos = pen_x + bearing_x as f32 * scale;
            // glyphs whose bitmap hangs below the baseline (descenders like
            // 'p') get pushed under origin_y
            let ypos = origin_y - (m.height as i32 - m.bearing_y) as f32 * scale;
            let width = m.width as f32 * scale;
            let height = m.height as f32 * scale;

            quads.push(GlyphQuad {
                ch,
                vertices: [
                    QuadVertex {
                        position: [xpos, ypos],
                        uv: [0.0, 1.0],
                    },
                    QuadVertex {
                        position: [xpos + width, ypos],
                        uv: [1.0, 1.0],
                    },
                    QuadVertex {
                        position: [xpos, ypos + height],
                        uv: [0.0, 0.0],
                    },
                    QuadVertex {
                        position: [xpos + width, ypos + height],
                        uv: [1.0, 0.0],
                    },
                ],
            });

            // whole-pixel pen movement: the rasterizer's 1/64 px advance is
            // divided down, fractional remainder discarded
            pen_x += (m.advance >> 6) as f32;
        }

        Ok(quads)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::text::atlas::{FontError, Glyph, GlyphMetrics};

    fn glyph(width: u32, height: u32, bearing_x: i32, bearing_y: i32, advance_px: u32) -> Glyph {
        Glyph {
            metrics: GlyphMetrics {
                width,
                height,
                bearing_x,
                bearing_y,
                advance: advance_px << 6,
            },
            bitmap: vec![0xff; (width * height) as usize],
        }
    }

    // monospace-like fake font at 13px: every advance is 8px
    fn test_layout() -> TextLayout {
        let mut glyphs = HashMap::new();
        glyphs.insert('A', glyph(7, 9, 1, 9, 8));
        // descender: bitmap extends 3px below the baseline
        glyphs.insert('p', glyph(7, 9, 1, 6, 8));
        glyphs.insert('.', glyph(2, 2, 1, 2, 8));
        glyphs.insert(' ', glyph(0, 0, 0, 0, 8));
        TextLayout::new(Rc::new(GlyphAtlas::from_parts(glyphs, 13)))
    }

    #[test]
    fn one_quad_per_char_in_input_order() {
        let quads = test_layout().layout("Ap.", 0.0, 0.0, 1.0).unwrap();
        assert_eq!(quads.len(), 3);
        assert_eq!(
            quads.iter().map(|q| q.ch).collect::<Vec<_>>(),
            vec!['A', 'p', '.']
        );
    }

    #[test]
    fn layout_exposes_its_atlas() {
        let layout = test_layout();
        assert_eq!(layout.atlas().glyph_count(), 4);
        assert_eq!(layout.atlas().pixel_height(), 13);
    }

    #[test]
    fn empty_string_yields_no_quads() {
        let quads = test_layout().layout("", 10.0, 20.0, 1.0).unwrap();
        assert!(quads.is_empty());
    }

    #[test]
    fn layout_is_idempotent() {
        let layout = test_layout();
        let a = layout.layout("Ap. p", 10.0, 20.0, 1.5).unwrap();
        let b = layout.layout("Ap. p", 10.0, 20.0, 1.5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn first_glyph_left_bearing_is_absorbed() {
        // 'A' has bearing_x = 1, but the string's left edge must be exactly
        // the given origin
        let quads = test_layout().layout("A", 10.0, 20.0, 1.0).unwrap();
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].left(), 10.0);

        let min_x = test_layout()
            .layout("Ap.", 10.0, 20.0, 1.0)
            .unwrap()
            .iter()
            .map(GlyphQuad::left)
            .fold(f32::INFINITY, f32::min);
        assert_eq!(min_x, 10.0);
    }

    #[test]
    fn later_glyphs_keep_their_bearing() {
        let quads = test_layout().layout("AA", 10.0, 20.0, 1.0).unwrap();
        // second glyph: pen moved 8px, plus its own bearing_x of 1
        assert_eq!(quads[1].left(), 19.0);
    }

    #[test]
    fn descenders_dip_below_the_baseline() {
        let quads = test_layout().layout("Ap", 0.0, 20.0, 1.0).unwrap();
        // 'A' sits on the baseline: bearing_y == height
        assert_eq!(quads[0].bottom(), 20.0);
        // 'p' extends height - bearing_y = 3px below it
        assert_eq!(quads[1].bottom(), 17.0);
    }

    #[test]
    fn pen_position_is_monotonic() {
        let quads = test_layout().layout("A.p A", 0.0, 0.0, 1.0).unwrap();
        for pair in quads.windows(2) {
            assert!(pair[1].left() >= pair[0].left());
        }
    }

    #[test]
    fn zero_scale_gives_degenerate_quads() {
        let quads = test_layout().layout("Ap", 10.0, 20.0, 0.0).unwrap();
        for quad in &quads {
            let [bl, br, _, tr] = quad.vertices;
            assert_eq!(bl.position[0], br.position[0]);
            assert_eq!(bl.position[1], tr.position[1]);
        }
    }

    #[test]
    fn space_still_emits_a_quad() {
        let quads = test_layout().layout(" ", 5.0, 5.0, 1.0).unwrap();
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].left(), 5.0);
    }

    #[test]
    fn unknown_char_is_loud() {
        let result = test_layout().layout("A?", 0.0, 0.0, 1.0);
        assert!(matches!(result, Err(FontError::GlyphNotFound('?'))));
    }

    #[test]
    fn triangles_follow_the_index_pattern() {
        let quads = test_layout().layout("A", 0.0, 0.0, 1.0).unwrap();
        let tris = quads[0].triangles();
        for (slot, &idx) in QUAD_INDICES.iter().enumerate() {
            assert_eq!(tris[slot], quads[0].vertices[idx as usize]);
        }
    }
}
