mod pixel_buffer;

pub use pixel_buffer::{Bitmap, PixelBuffer, PIXEL_BYTES};

use crate::error::{Error, Result};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::EventPump;

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

fn sdl_err(e: impl ToString) -> Error {
    Error::Display(e.to_string())
}

pub struct Display {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    width: u32,
    height: u32,
}

/// Streaming texture the bitmap is uploaded into each frame
pub struct RenderTarget<'a> {
    texture: Texture<'a>,
    width: u32,
    height: u32,
}

#[derive(Debug, Clone)]
pub enum InputEvent {
    Quit,
    KeyDown(Keycode),
}

impl Display {
    /// Create display with custom resolution and VSync settings
    /// vsync=true: locked to monitor refresh (typically 60fps)
    /// vsync=false: uncapped framerate for performance testing
    pub fn with_options(
        title: &str,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<(Self, TextureCreator<WindowContext>)> {
        let sdl_context = sdl2::init().map_err(sdl_err)?;
        let video_subsystem = sdl_context.video().map_err(sdl_err)?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(sdl_err)?;

        let mut canvas_builder = window.into_canvas().accelerated();
        if vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder.build().map_err(sdl_err)?;

        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump().map_err(sdl_err)?;

        Ok((
            Self {
                canvas,
                event_pump,
                width,
                height,
            },
            texture_creator,
        ))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Upload the bitmap (honoring its pitch) and flip
    pub fn present(&mut self, target: &mut RenderTarget, bitmap: &Bitmap) -> Result<()> {
        debug_assert_eq!((target.width, target.height), (bitmap.width(), bitmap.height()));
        target
            .texture
            .update(None, bitmap.as_bytes(), bitmap.pitch())
            .map_err(sdl_err)?;

        self.canvas.copy(&target.texture, None, None).map_err(sdl_err)?;
        self.canvas.present();
        Ok(())
    }

    pub fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => events.push(InputEvent::Quit),
                Event::KeyDown {
                    keycode: Some(k), ..
                } => events.push(InputEvent::KeyDown(k)),
                _ => {},
            }
        }

        events
    }
}

impl<'a> RenderTarget<'a> {
    /// Create an ARGB8888 streaming texture; matches `PackedColor` in native byte order
    pub fn with_size(
        texture_creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let texture = texture_creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(sdl_err)?;
        Ok(Self {
            texture,
            width,
            height,
        })
    }
}
