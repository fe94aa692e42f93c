use crate::color::{composite, PackedColor};
use crate::error::{Error, Result};

/// Bytes per pixel; every buffer is 32-bit ARGB
pub const PIXEL_BYTES: usize = 4;

// ============================================================================
// Utility Functions
// ============================================================================

#[inline]
fn read_pixel(src: &[u8]) -> PackedColor {
    PackedColor(u32::from_ne_bytes([src[0], src[1], src[2], src[3]]))
}

#[inline]
fn write_pixel(dest: &mut [u8], color: PackedColor) {
    dest.copy_from_slice(&color.argb().to_ne_bytes());
}

/// Round a real-valued edge to the nearest pixel boundary
#[inline]
fn round_edge(v: f32) -> i32 {
    v.round() as i32
}

/// Minimum slice length for a `width` x `height` image with the given pitch
fn required_len(width: u32, height: u32, pitch: usize) -> usize {
    if width == 0 || height == 0 {
        return 0;
    }
    pitch
        .saturating_mul(height as usize - 1)
        .saturating_add(width as usize * PIXEL_BYTES)
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// Borrowed view over host-owned, row-major ARGB pixels.
///
/// Rows start `pitch` bytes apart; any padding past `width * 4` is never
/// touched.
pub struct PixelBuffer<'a> {
    pixels: &'a mut [u8],
    width: u32,
    height: u32,
    pitch: usize,
}

impl<'a> PixelBuffer<'a> {
    /// Wrap host storage, validating that every row fits inside `pixels`
    pub fn new(pixels: &'a mut [u8], width: u32, height: u32, pitch: usize) -> Result<Self> {
        let invalid = |len, reason| Error::InvalidBuffer {
            width,
            height,
            pitch,
            len,
            reason,
        };
        if pitch < width as usize * PIXEL_BYTES {
            return Err(invalid(pixels.len(), "pitch shorter than one row"));
        }
        if pixels.len() < required_len(width, height, pitch) {
            return Err(invalid(pixels.len(), "storage shorter than pitch * height"));
        }
        Ok(Self::from_parts(pixels, width, height, pitch))
    }

    fn from_parts(pixels: &'a mut [u8], width: u32, height: u32, pitch: usize) -> Self {
        Self {
            pixels,
            width,
            height,
            pitch,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Byte offset of pixel (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.pitch + x as usize * PIXEL_BYTES
    }

    /// Read a pixel (bounds checked)
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<PackedColor> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some(read_pixel(&self.pixels[idx..idx + PIXEL_BYTES]))
        } else {
            None
        }
    }

    /// Overwrite a pixel (bounds checked)
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: PackedColor) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            write_pixel(&mut self.pixels[idx..idx + PIXEL_BYTES], color);
        }
    }

    /// Fill the whole buffer with one color
    pub fn clear(&mut self, color: PackedColor) {
        self.fill_rect(0.0, 0.0, self.width as f32, self.height as f32, color);
    }

    /// Fill the half-open rectangle `[min_x, max_x) x [min_y, max_y)`.
    ///
    /// Edges are rounded to whole pixels and clipped to the buffer. Opaque
    /// colors overwrite; anything else is composited over the existing pixel.
    /// A rectangle that ends up empty after clipping draws nothing.
    pub fn fill_rect(&mut self, min_x: f32, min_y: f32, max_x: f32, max_y: f32, color: PackedColor) {
        let min_x = round_edge(min_x).max(0);
        let min_y = round_edge(min_y).max(0);
        let max_x = round_edge(max_x).min(self.width as i32);
        let max_y = round_edge(max_y).min(self.height as i32);
        if min_x >= max_x || min_y >= max_y {
            return;
        }

        let opaque = color.is_opaque();
        for y in min_y as u32..max_y as u32 {
            let start = self.pixel_index(min_x as u32, y);
            let end = self.pixel_index(max_x as u32, y);
            for pixel in self.pixels[start..end].chunks_exact_mut(PIXEL_BYTES) {
                if opaque {
                    write_pixel(pixel, color);
                } else {
                    let blended = composite(color, read_pixel(pixel));
                    write_pixel(pixel, blended);
                }
            }
        }
    }

    /// Tiled debug gradient: red tracks `offset`, green the row, blue the column.
    ///
    /// Animating `offset` makes dropped frames and channel-order mistakes
    /// easy to spot on screen.
    pub fn render_gradient(&mut self, offset: u32) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let red = offset as u8;
        for y in 0..self.height {
            let green = y.wrapping_add(offset) as u8;
            let start = self.pixel_index(0, y);
            let end = self.pixel_index(self.width, y);
            for (x, pixel) in self.pixels[start..end]
                .chunks_exact_mut(PIXEL_BYTES)
                .enumerate()
            {
                let blue = (x as u32).wrapping_add(offset) as u8;
                write_pixel(pixel, PackedColor::from_argb(0, red, green, blue));
            }
        }
    }
}

// ============================================================================
// Bitmap
// ============================================================================

/// Host-owned pixel storage that hands out `PixelBuffer` views each frame
pub struct Bitmap {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    pitch: usize,
}

impl Bitmap {
    /// Allocate a zeroed bitmap; `pitch_padding` extra bytes are added to each row.
    /// Fails if the row or image size does not fit in memory addressing.
    pub fn new(width: u32, height: u32, pitch_padding: usize) -> Result<Self> {
        let pitch = (width as usize)
            .checked_mul(PIXEL_BYTES)
            .and_then(|row| row.checked_add(pitch_padding));
        let len = pitch.and_then(|pitch| pitch.checked_mul(height as usize));
        let (Some(pitch), Some(len)) = (pitch, len) else {
            return Err(Error::InvalidBuffer {
                width,
                height,
                pitch: pitch.unwrap_or(usize::MAX),
                len: 0,
                reason: "bitmap size overflows",
            });
        };
        Ok(Self {
            pixels: vec![0; len],
            width,
            height,
            pitch,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Borrow the storage as a drawable buffer
    pub fn as_pixel_buffer(&mut self) -> PixelBuffer<'_> {
        PixelBuffer::from_parts(&mut self.pixels, self.width, self.height, self.pitch)
    }

    /// Raw bytes, `pitch` bytes per row
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTINEL: PackedColor = PackedColor(0xDEADBEEF);
    const RED: PackedColor = PackedColor::from_argb(255, 255, 0, 0);

    fn filled(width: u32, height: u32, padding: usize) -> Bitmap {
        let mut bitmap = Bitmap::new(width, height, padding).unwrap();
        for chunk in bitmap.pixels.chunks_exact_mut(PIXEL_BYTES) {
            write_pixel(chunk, SENTINEL);
        }
        bitmap
    }

    fn count_color(buffer: &PixelBuffer, color: PackedColor) -> usize {
        let mut n = 0;
        for y in 0..buffer.height() as i32 {
            for x in 0..buffer.width() as i32 {
                if buffer.get_pixel(x, y) == Some(color) {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn test_new_rejects_short_pitch() {
        let mut storage = vec![0u8; 64];
        assert!(matches!(
            PixelBuffer::new(&mut storage, 4, 4, 12),
            Err(Error::InvalidBuffer { .. })
        ));
    }

    #[test]
    fn test_new_rejects_short_storage() {
        let mut storage = vec![0u8; 63];
        assert!(PixelBuffer::new(&mut storage, 4, 4, 16).is_err());
        // Last row needs no trailing padding
        let mut storage = vec![0u8; 20 * 3 + 16];
        assert!(PixelBuffer::new(&mut storage, 4, 4, 20).is_ok());
    }

    #[test]
    fn test_empty_buffer_is_valid() {
        let mut storage = Vec::new();
        let mut buffer = PixelBuffer::new(&mut storage, 0, 0, 0).unwrap();
        buffer.clear(RED);
        buffer.fill_rect(-10.0, -10.0, 10.0, 10.0, RED);
    }

    #[test]
    fn test_zero_width_buffer_with_pitch_draws_nothing() {
        let mut storage = Vec::new();
        let mut buffer = PixelBuffer::new(&mut storage, 0, 3, 16).unwrap();
        buffer.clear(RED);
        buffer.fill_rect(-10.0, -10.0, 10.0, 10.0, RED);
        buffer.render_gradient(0);
        assert_eq!(buffer.get_pixel(0, 0), None);

        let mut storage = vec![0u8; 32];
        let mut buffer = PixelBuffer::new(&mut storage, 2, 0, 16).unwrap();
        buffer.render_gradient(7);
        assert!(storage.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_bitmap_rejects_overflowing_size() {
        assert!(matches!(
            Bitmap::new(u32::MAX, u32::MAX, usize::MAX),
            Err(Error::InvalidBuffer { .. })
        ));
        assert!(Bitmap::new(u32::MAX, u32::MAX, 0).is_err());
        let bitmap = Bitmap::new(3, 2, 4).unwrap();
        assert_eq!(bitmap.pitch(), 16);
        assert_eq!(bitmap.as_bytes().len(), 32);
    }

    #[test]
    fn test_fill_rect_rounds_edges() {
        let mut bitmap = filled(8, 8, 0);
        let mut buffer = bitmap.as_pixel_buffer();
        buffer.fill_rect(0.4, 1.5, 2.6, 3.4, RED);
        // x: 0..3, y: 2..3
        assert_eq!(count_color(&buffer, RED), 3);
        assert_eq!(buffer.get_pixel(0, 2), Some(RED));
        assert_eq!(buffer.get_pixel(2, 2), Some(RED));
        assert_eq!(buffer.get_pixel(3, 2), Some(SENTINEL));
        assert_eq!(buffer.get_pixel(0, 1), Some(SENTINEL));
    }

    #[test]
    fn test_fill_rect_clips_to_buffer() {
        let mut bitmap = filled(10, 6, 0);
        let mut buffer = bitmap.as_pixel_buffer();
        buffer.fill_rect(-5.0, -5.0, 3.0, 2.0, RED);
        assert_eq!(count_color(&buffer, RED), 3 * 2);
        buffer.fill_rect(8.0, 4.0, 50.0, 50.0, RED);
        assert_eq!(count_color(&buffer, RED), 6 + 2 * 2);
    }

    #[test]
    fn test_fill_rect_outside_writes_nothing() {
        let rects = [
            (-20.0, -20.0, -2.5, -2.5),
            (10.0, 0.0, 20.0, 6.0),
            (0.0, 6.0, 10.0, 12.0),
            (0.0, -7.5, 10.0, -2.5),
            (5.0, 5.0, 2.0, 2.0),
            (3.0, 3.0, 3.2, 5.0),
        ];
        for (min_x, min_y, max_x, max_y) in rects {
            let mut bitmap = filled(10, 6, 0);
            let before = bitmap.pixels.clone();
            bitmap
                .as_pixel_buffer()
                .fill_rect(min_x, min_y, max_x, max_y, RED);
            assert_eq!(bitmap.pixels, before, "rect {:?}", (min_x, min_y, max_x, max_y));
        }
    }

    #[test]
    fn test_fill_rect_never_touches_pitch_padding() {
        let mut bitmap = filled(5, 4, 12);
        bitmap
            .as_pixel_buffer()
            .fill_rect(-100.0, -100.0, 100.0, 100.0, RED);
        let pitch = bitmap.pitch();
        for row in bitmap.pixels.chunks_exact(pitch) {
            for pixel in row[..5 * PIXEL_BYTES].chunks_exact(PIXEL_BYTES) {
                assert_eq!(read_pixel(pixel), RED);
            }
            for pixel in row[5 * PIXEL_BYTES..].chunks_exact(PIXEL_BYTES) {
                assert_eq!(read_pixel(pixel), SENTINEL);
            }
        }
    }

    #[test]
    fn test_fill_rect_blends_translucent_color() {
        let mut bitmap = Bitmap::new(4, 4, 0).unwrap();
        let mut buffer = bitmap.as_pixel_buffer();
        let background = PackedColor::from_argb(255, 0, 0, 0);
        buffer.clear(background);
        let src = PackedColor::from_argb(51, 255, 255, 255);
        buffer.fill_rect(1.0, 1.0, 2.0, 2.0, src);
        assert_eq!(buffer.get_pixel(1, 1), Some(composite(src, background)));
        assert_eq!(buffer.get_pixel(1, 1), Some(PackedColor::from_argb(51, 51, 51, 51)));
        assert_eq!(buffer.get_pixel(0, 0), Some(background));
    }

    #[test]
    fn test_set_pixel_out_of_bounds_is_ignored() {
        let mut bitmap = filled(3, 3, 0);
        let before = bitmap.pixels.clone();
        let mut buffer = bitmap.as_pixel_buffer();
        buffer.set_pixel(-1, 0, RED);
        buffer.set_pixel(3, 0, RED);
        buffer.set_pixel(0, 3, RED);
        assert_eq!(buffer.get_pixel(3, 3), None);
        assert_eq!(bitmap.pixels, before);
    }

    #[test]
    fn test_render_gradient_values() {
        let mut bitmap = Bitmap::new(300, 2, 8).unwrap();
        let mut buffer = bitmap.as_pixel_buffer();
        buffer.render_gradient(10);
        assert_eq!(buffer.get_pixel(0, 0), Some(PackedColor::from_argb(0, 10, 10, 10)));
        assert_eq!(buffer.get_pixel(5, 1), Some(PackedColor::from_argb(0, 10, 11, 15)));
        // Blue wraps past 255
        assert_eq!(buffer.get_pixel(250, 0), Some(PackedColor::from_argb(0, 10, 10, 4)));
    }
}
