use std::sync::Arc;

use anyhow::Result;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::WindowId;

pub use winit::dpi::PhysicalSize;
pub use winit::window::Window;

pub trait AppLoop: Sized {
    fn init(window: Arc<Window>) -> Result<Self>;

    fn draw(&mut self);

    fn resized(&mut self, _new_size: PhysicalSize<u32>) {}
}

pub struct App {
    title: String,
    size: (u32, u32),
    resizable: bool,
}

pub fn make_window() -> App {
    env_logger::init();

    App {
        title: "textquad".into(),
        size: (500, 500),
        resizable: false,
    }
}

impl App {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn run<T: AppLoop>(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        let mut runner: Runner<T> = Runner {
            settings: self,
            window: None,
            app: None,
            error: None,
        };
        event_loop.run_app(&mut runner)?;
        match runner.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct Runner<T: AppLoop> {
    settings: App,
    window: Option<Arc<Window>>,
    app: Option<T>,
    error: Option<anyhow::Error>,
}

impl<T: AppLoop> ApplicationHandler for Runner<T> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(&self.settings.title)
            .with_inner_size(LogicalSize::new(self.settings.size.0, self.settings.size.1))
            .with_resizable(self.settings.resizable);

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.error = Some(err.into());
                event_loop.exit();
                return;
            }
        };

        match T::init(window.clone()) {
            Ok(app) => {
                self.app = Some(app);
                self.window = Some(window);
            }
            Err(err) => {
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(new_size) => {
                log::debug!("resized {new_size:?}");
                if let Some(app) = self.app.as_mut() {
                    app.resized(new_size);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(app) = self.app.as_mut() {
                    app.draw();
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
