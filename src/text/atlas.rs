use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};

pub type FontResult<T> = Result<T, FontError>;

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("failed to read font file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse font: {0}")]
    Parse(&'static str),

    /// The font has no glyph for a requested character code. Only raised
    /// during load, and only under [`MissingGlyphPolicy::Fail`].
    #[error("font has no glyph for {0:?}")]
    MissingGlyph(char),

    /// Lookup of a character the atlas never loaded.
    #[error("no glyph loaded for {0:?}")]
    GlyphNotFound(char),
}

/// What to do when the font cannot supply a glyph for one of the requested
/// character codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingGlyphPolicy {
    /// Log a warning and leave that code out of the atlas. Looking the
    /// character up later is a [`FontError::GlyphNotFound`] error.
    #[default]
    Skip,
    /// Abort the whole load with [`FontError::MissingGlyph`].
    Fail,
}

/// Metrics for one rasterized glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphMetrics {
    /// Bitmap width in pixels.
    pub width: u32,
    /// Bitmap height in pixels.
    pub height: u32,
    /// Horizontal offset from the pen origin to the bitmap's left edge.
    pub bearing_x: i32,
    /// Distance from the baseline up to the bitmap's top edge.
    pub bearing_y: i32,
    /// Horizontal pen displacement in 1/64 pixel units; layout shifts this
    /// right by 6 to move the pen in whole pixels.
    pub advance: u32,
}

#[derive(Debug, Clone)]
pub struct Glyph {
    pub metrics: GlyphMetrics,
    /// Single-channel coverage, `width * height` bytes, row 0 at the top.
    pub bitmap: Vec<u8>,
}

/// The ascii glyph set of one font at one pixel height, rasterized up front.
/// Immutable after load; no glyph is added, replaced, or evicted later, so
/// shared reads need no synchronization.
///
/// The atlas is CPU-side only. GPU textures for the bitmaps are created by
/// the renderer, which keeps layout testable without a device.
pub struct GlyphAtlas {
    glyphs: HashMap<char, Glyph>,
    pixel_height: u32,
}

impl GlyphAtlas {
    /// Load a font file and rasterize character codes 0 through 127.
    pub fn load(
        path: impl AsRef<Path>,
        pixel_height: u32,
        on_missing: MissingGlyphPolicy,
    ) -> FontResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes, pixel_height, on_missing)
    }

    pub fn from_bytes(
        bytes: &[u8],
        pixel_height: u32,
        on_missing: MissingGlyphPolicy,
    ) -> FontResult<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(FontError::Parse)?;

        let px = pixel_height as f32;
        let mut glyphs = HashMap::new();
        for code in 0u8..=127 {
            let ch = char::from(code);
            // glyph index 0 is the font's .notdef slot
            if font.lookup_glyph_index(ch) == 0 {
                match on_missing {
                    MissingGlyphPolicy::Skip => {
                        log::warn!("font has no glyph for {ch:?}, skipping");
                        continue;
                    }
                    MissingGlyphPolicy::Fail => return Err(FontError::MissingGlyph(ch)),
                }
            }

            let (metrics, bitmap) = font.rasterize(ch, px);
            glyphs.insert(
                ch,
                Glyph {
                    metrics: GlyphMetrics {
                        width: metrics.width as u32,
                        height: metrics.height as u32,
                        bearing_x: metrics.xmin,
                        // fontdue's ymin is the bitmap's bottom edge relative
                        // to the baseline; bearing_y is the top edge above it
                        bearing_y: metrics.height as i32 + metrics.ymin,
                        advance: (metrics.advance_width * 64.0) as u32,
                    },
                    bitmap,
                },
            );
        }

        log::info!("loaded {} glyphs at {pixel_height}px", glyphs.len());
        Ok(Self {
            glyphs,
            pixel_height,
        })
    }

    pub fn metrics(&self, ch: char) -> FontResult<&GlyphMetrics> {
        self.glyph(ch).map(|glyph| &glyph.metrics)
    }

    pub fn glyph(&self, ch: char) -> FontResult<&Glyph> {
        self.glyphs.get(&ch).ok_or(FontError::GlyphNotFound(ch))
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &Glyph)> {
        self.glyphs.iter().map(|(ch, glyph)| (*ch, glyph))
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    #[cfg(test)]
    pub(crate) fn from_parts(glyphs: HashMap<char, Glyph>, pixel_height: u32) -> Self {
        Self {
            glyphs,
            pixel_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_glyph(width: u32, height: u32, advance_px: u32) -> Glyph {
        Glyph {
            metrics: GlyphMetrics {
                width,
                height,
                bearing_x: 1,
                bearing_y: height as i32,
                advance: advance_px << 6,
            },
            bitmap: vec![0xff; (width * height) as usize],
        }
    }

    #[test]
    fn nonexistent_path_is_an_io_error() {
        let result = GlyphAtlas::load(
            "/definitely/not/a/font.ttf",
            13,
            MissingGlyphPolicy::Skip,
        );
        assert!(matches!(result, Err(FontError::Io { .. })));
    }

    #[test]
    fn garbage_bytes_are_a_parse_error() {
        let result = GlyphAtlas::from_bytes(&[0u8; 32], 13, MissingGlyphPolicy::Skip);
        assert!(matches!(result, Err(FontError::Parse(_))));
    }

    #[test]
    fn unknown_char_lookup_fails() {
        let atlas = GlyphAtlas::from_parts(HashMap::new(), 13);
        assert!(matches!(atlas.metrics('A'), Err(FontError::GlyphNotFound('A'))));
    }

    #[test]
    fn loaded_metrics_are_sane() {
        let mut glyphs = HashMap::new();
        glyphs.insert('A', solid_glyph(7, 9, 8));
        glyphs.insert(' ', solid_glyph(0, 0, 8));
        let atlas = GlyphAtlas::from_parts(glyphs, 13);

        for (_, glyph) in atlas.iter() {
            let m = glyph.metrics;
            assert_eq!(glyph.bitmap.len(), (m.width * m.height) as usize);
            assert!(m.advance >> 6 <= 64, "advance should be a few pixels");
        }
        assert_eq!(atlas.glyph_count(), 2);
        assert_eq!(atlas.pixel_height(), 13);
    }
}
