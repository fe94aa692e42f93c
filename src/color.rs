//! Color model and compositing
//!
//! Pixels are 32-bit ARGB values (`a << 24 | r << 16 | g << 8 | b`), stored in
//! native byte order so a buffer can be handed straight to an `ARGB8888` texture.

// ============================================================================
// Packed Color
// ============================================================================

/// Four 8-bit channels packed into one `u32`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PackedColor(pub u32);

impl PackedColor {
    #[inline]
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    #[inline]
    pub const fn argb(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// True when the fast overwrite path applies
    #[inline]
    pub const fn is_opaque(self) -> bool {
        self.a() == 255
    }

    /// Expand each channel to the 0.0-1.0 range
    pub fn to_normalized(self) -> NormalizedColor {
        NormalizedColor {
            a: f32::from(self.a()) / 255.0,
            r: f32::from(self.r()) / 255.0,
            g: f32::from(self.g()) / 255.0,
            b: f32::from(self.b()) / 255.0,
        }
    }
}

// ============================================================================
// Normalized Color
// ============================================================================

/// Floating-point color, each channel nominally in [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalizedColor {
    pub a: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl NormalizedColor {
    pub const fn new(a: f32, r: f32, g: f32, b: f32) -> Self {
        Self { a, r, g, b }
    }

    /// Quantize to 8 bits per channel, rounding half away from zero.
    ///
    /// Inputs are not clamped: a channel outside [0.0, 1.0] wraps within its
    /// byte instead of spilling into its neighbours.
    pub fn to_packed(self) -> PackedColor {
        PackedColor::from_argb(
            quantize(self.a),
            quantize(self.r),
            quantize(self.g),
            quantize(self.b),
        )
    }
}

impl From<NormalizedColor> for PackedColor {
    fn from(c: NormalizedColor) -> Self {
        c.to_packed()
    }
}

impl From<PackedColor> for NormalizedColor {
    fn from(c: PackedColor) -> Self {
        c.to_normalized()
    }
}

#[inline]
fn quantize(v: f32) -> u8 {
    (v * 255.0).round() as i64 as u8
}

// ============================================================================
// Compositing
// ============================================================================

/// Source-over blend of `src` onto an opaque `dst`.
///
/// Each color channel moves from `dst` toward `src` by `src.a / 255`; the
/// result keeps the source alpha. Destination alpha is not composited.
pub fn composite(src: PackedColor, dst: PackedColor) -> PackedColor {
    let percent = f32::from(src.a()) / 255.0;
    PackedColor::from_argb(
        src.a(),
        lerp_channel(dst.r(), src.r(), percent),
        lerp_channel(dst.g(), src.g(), percent),
        lerp_channel(dst.b(), src.b(), percent),
    )
}

#[inline]
fn lerp_channel(dst: u8, src: u8, t: f32) -> u8 {
    let d = f32::from(dst);
    (d + t * (f32::from(src) - d)).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_accessors() {
        let c = PackedColor::from_argb(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.argb(), 0x12345678);
        assert_eq!((c.a(), c.r(), c.g(), c.b()), (0x12, 0x34, 0x56, 0x78));
    }

    #[test]
    fn test_to_packed_rounds_to_nearest() {
        let c = NormalizedColor::new(1.0, 0.01, 0.02, 0.05).to_packed();
        assert_eq!(c, PackedColor::from_argb(255, 3, 5, 13));
    }

    #[test]
    fn test_packed_round_trip_all_channel_values() {
        for v in 0..=255u32 {
            let c = PackedColor(v << 24 | (255 - v) << 16 | (v / 2) << 8 | v);
            assert_eq!(c.to_normalized().to_packed(), c, "channel value {}", v);
        }
    }

    #[test]
    fn test_to_normalized_range() {
        let n = PackedColor::from_argb(255, 0, 51, 255).to_normalized();
        assert_eq!(n.a, 1.0);
        assert_eq!(n.r, 0.0);
        assert!((n.g - 0.2).abs() < 1e-6);
        assert_eq!(n.b, 1.0);
    }

    #[test]
    fn test_composite_opaque_equals_overwrite() {
        let dsts = [0x00000000, 0xFF102030, 0xFFFFFFFF, 0x80FF00FF];
        let srcs = [0xFF000000, 0xFF8CE6FF, 0xFFFFFFFF, 0xFF030507];
        for &s in &srcs {
            for &d in &dsts {
                assert_eq!(composite(PackedColor(s), PackedColor(d)), PackedColor(s));
            }
        }
    }

    #[test]
    fn test_composite_transparent_keeps_destination_rgb() {
        let dst = PackedColor::from_argb(255, 10, 20, 30);
        let src = PackedColor::from_argb(0, 200, 200, 200);
        let out = composite(src, dst);
        assert_eq!(out, PackedColor::from_argb(0, 10, 20, 30));
    }

    #[test]
    fn test_composite_half_alpha_interpolates() {
        let dst = PackedColor::from_argb(255, 0, 100, 200);
        let src = PackedColor::from_argb(128, 255, 100, 0);
        let out = composite(src, dst);
        // 128/255 = 0.50196
        assert_eq!(out.a(), 128);
        assert_eq!(out.r(), 128);
        assert_eq!(out.g(), 100);
        assert_eq!(out.b(), 100);
    }
}
