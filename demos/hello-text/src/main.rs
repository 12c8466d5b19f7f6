use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use textquad::render::Render;
use textquad::text::atlas::{GlyphAtlas, MissingGlyphPolicy};
use textquad::text::renderer::TextRenderer;
use textquad::window::{make_window, AppLoop, Window};

const SCREEN_WIDTH: u32 = 500;
const SCREEN_HEIGHT: u32 = 500;
const PIXEL_HEIGHT: u32 = 13;
const TEXT_COLOR: [f32; 4] = [200.0 / 255.0, 60.0 / 255.0, 30.0 / 255.0, 1.0];

struct Demo {
    render: Render,
    text: TextRenderer,
}

impl AppLoop for Demo {
    fn init(window: Arc<Window>) -> Result<Self> {
        let font_path = std::env::args()
            .nth(1)
            .unwrap_or_else(|| "assets/Ubuntu-R.ttf".into());

        let render = Render::new(window)?;
        let atlas = GlyphAtlas::load(&font_path, PIXEL_HEIGHT, MissingGlyphPolicy::Skip)
            .with_context(|| format!("loading font {font_path}"))?;
        let text = TextRenderer::new(&render, Rc::new(atlas), TEXT_COLOR);

        Ok(Self { render, text })
    }

    fn draw(&mut self) {
        // baselines are in surface pixels, the space the projection covers
        let (_, surface_height) = self.render.surface_size();
        let h = surface_height as f32;
        let lines: [(&str, f32); 7] = [
            ("main( ) {", 10.0),
            ("extern a, b, c;", 20.0),
            (
                "putchar(a); putchar(b); putchar(c); putchar('!*n');",
                20.0,
            ),
            ("}", 10.0),
            ("a 'hell';", 10.0),
            ("b 'o, w';", 10.0),
            ("c 'orld';", 10.0),
        ];

        for (i, (line, x)) in lines.iter().enumerate() {
            let baseline = h - 20.0 * (i + 1) as f32;
            if let Err(err) = self.text.queue(line, *x, baseline, 1.0) {
                log::error!("layout failed: {err}");
            }
        }

        if let Err(err) = self.render.draw(&mut self.text) {
            log::error!("frame failed: {err}");
        }
    }
}

fn main() -> Result<()> {
    make_window()
        .with_title("hello-text")
        .with_size(SCREEN_WIDTH, SCREEN_HEIGHT)
        .run::<Demo>()
}
