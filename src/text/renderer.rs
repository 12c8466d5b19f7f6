use std::collections::HashMap;
use std::rc::Rc;

use wgpu::util::DeviceExt;

use crate::camera::ScreenProjection;
use crate::render::Render;

use super::atlas::{FontResult, GlyphAtlas};
use super::layout::{GlyphQuad, QuadVertex, TextLayout};
use super::pipeline::{TextPipeline, TextUniforms};

struct GlyphTexture {
    bind_group: wgpu::BindGroup,
    // kept alive for the bind group's sake
    _texture: wgpu::Texture,
}

/// CPU-side staging for one frame's quads: interleaved vertices plus a draw
/// list of (glyph char, offset of its first vertex). Each quad is 6 vertices.
/// Cleared at the end of every frame, presented or not.
#[derive(Default)]
pub(crate) struct QuadBatch {
    vertices: Vec<QuadVertex>,
    draws: Vec<(char, u32)>,
}

impl QuadBatch {
    pub(crate) fn stage(&mut self, quads: &[GlyphQuad]) {
        for quad in quads {
            let first = self.vertices.len() as u32;
            self.vertices.extend_from_slice(&quad.triangles());
            self.draws.push((quad.ch, first));
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    pub(crate) fn byte_len(&self) -> u64 {
        std::mem::size_of_val(self.vertices.as_slice()) as u64
    }

    pub(crate) fn vertices(&self) -> &[QuadVertex] {
        &self.vertices
    }

    pub(crate) fn draws(&self) -> &[(char, u32)] {
        &self.draws
    }

    pub(crate) fn clear(&mut self) {
        self.vertices.clear();
        self.draws.clear();
    }
}

/// Draws laid-out text onto the surface: one small R8 texture per non-empty
/// glyph, a fixed projection + color uniform, and a single growable vertex
/// buffer shared by every quad of a frame (uploaded once, instead of a fresh
/// buffer per glyph per frame).
///
/// Frame flow mirrors the renderer's queue-then-draw shape: call
/// [`TextRenderer::queue`] any number of times, then hand the whole thing to
/// [`Render::draw`].
///
/// The projection is built from the configured surface's dimensions at
/// construction and stays fixed for the renderer's lifetime.
pub struct TextRenderer {
    pipeline: TextPipeline,
    layout: TextLayout,
    glyph_textures: HashMap<char, GlyphTexture>,
    uniform_bind_group: wgpu::BindGroup,
    _uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: u64,
    batch: QuadBatch,
}

impl TextRenderer {
    pub fn new(render: &Render, atlas: Rc<GlyphAtlas>, text_color: [f32; 4]) -> Self {
        let device = render.device();
        let pipeline = TextPipeline::new(device, render.surface_format());

        // the configured surface size, not the window's logical size: the two
        // disagree whenever the display scale factor is not 1
        let (surface_width, surface_height) = render.surface_size();
        let uniforms = TextUniforms {
            projection: ScreenProjection::new(surface_width, surface_height).uniform(),
            text_color,
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("text_uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("text_uniform_bind_group"),
            layout: &pipeline.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let glyph_textures = upload_glyph_textures(render, &pipeline, &atlas);

        let vertex_capacity = 4096;
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("text_vertices"),
            size: vertex_capacity,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            layout: TextLayout::new(atlas),
            glyph_textures,
            uniform_bind_group,
            _uniform_buffer: uniform_buffer,
            vertex_buffer,
            vertex_capacity,
            batch: QuadBatch::default(),
        }
    }

    /// Lay out a string and stage its glyph quads for the next frame.
    /// `x` is the string's visible left edge, `y` its baseline.
    pub fn queue(&mut self, text: &str, x: f32, y: f32, scale: f32) -> FontResult<()> {
        self.batch.stage(&self.layout.layout(text, x, y, scale)?);
        Ok(())
    }

    /// Upload all queued quads in one buffer write, growing the vertex
    /// buffer if this frame needs more room.
    pub(crate) fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if self.batch.is_empty() {
            return;
        }
        let needed = self.batch.byte_len();
        if needed > self.vertex_capacity {
            self.vertex_capacity = needed.next_power_of_two();
            self.vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("text_vertices"),
                size: self.vertex_capacity,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
        }
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(self.batch.vertices()));
    }

    /// Record one draw call per queued glyph, binding that glyph's texture.
    pub(crate) fn record(&self, rpass: &mut wgpu::RenderPass<'_>) {
        if self.batch.is_empty() {
            return;
        }
        rpass.set_pipeline(&self.pipeline.pipeline);
        rpass.set_bind_group(0, &self.uniform_bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        for &(ch, first) in self.batch.draws() {
            // zero-area glyphs (space) have no texture; the pen already moved
            let Some(glyph) = self.glyph_textures.get(&ch) else {
                continue;
            };
            rpass.set_bind_group(1, &glyph.bind_group, &[]);
            rpass.draw(first..first + 6, 0..1);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.batch.clear();
    }
}

/// One texture + bind group per glyph with a non-empty bitmap. Released when
/// the renderer is dropped.
fn upload_glyph_textures(
    render: &Render,
    pipeline: &TextPipeline,
    atlas: &GlyphAtlas,
) -> HashMap<char, GlyphTexture> {
    let device = render.device();
    let mut textures = HashMap::new();

    for (ch, glyph) in atlas.iter() {
        let m = &glyph.metrics;
        if m.width == 0 || m.height == 0 {
            continue;
        }

        let size = wgpu::Extent3d {
            width: m.width,
            height: m.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glyph"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        render.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &glyph.bitmap,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(m.width),
                rows_per_image: Some(m.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glyph_bind_group"),
            layout: &pipeline.glyph_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&pipeline.sampler),
                },
            ],
        });

        textures.insert(
            ch,
            GlyphTexture {
                bind_group,
                _texture: texture,
            },
        );
    }

    log::debug!("uploaded {} glyph textures", textures.len());
    textures
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::*;
    use crate::text::atlas::{Glyph, GlyphMetrics};

    fn test_layout() -> TextLayout {
        let mut glyphs = HashMap::new();
        glyphs.insert(
            'A',
            Glyph {
                metrics: GlyphMetrics {
                    width: 7,
                    height: 9,
                    bearing_x: 1,
                    bearing_y: 9,
                    advance: 8 << 6,
                },
                bitmap: vec![0xff; 63],
            },
        );
        TextLayout::new(Rc::new(GlyphAtlas::from_parts(glyphs, 13)))
    }

    #[test]
    fn staged_quads_become_six_vertices_each() {
        let quads = test_layout().layout("AA", 0.0, 0.0, 1.0).unwrap();

        let mut batch = QuadBatch::default();
        batch.stage(&quads);
        assert_eq!(batch.vertices().len(), 12);
        assert_eq!(batch.draws(), &[('A', 0), ('A', 6)]);
    }

    #[test]
    fn cleared_batch_does_not_grow_across_frames() {
        // a frame that fails to acquire its surface texture still clears the
        // batch, so re-queueing the same text next frame must not accumulate
        let layout = test_layout();
        let quads = layout.layout("AA", 0.0, 0.0, 1.0).unwrap();

        let mut batch = QuadBatch::default();
        batch.stage(&quads);
        let bytes_per_frame = batch.byte_len();

        for _ in 0..3 {
            batch.clear();
            assert!(batch.is_empty());
            batch.stage(&quads);
            assert_eq!(batch.byte_len(), bytes_per_frame);
        }
    }
}
