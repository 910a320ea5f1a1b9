//! Fixed color palettes

use crate::math::Vec3;

pub const EMERALD: u32 = 0x002419;
pub const DEEP_GREEN: u32 = 0x004b34;
pub const SILVER: u32 = 0xe5e7eb;
pub const GOLD: u32 = 0xffd700;
pub const PALE_PINK: u32 = 0xfce7f3;

/// Gemstone colors, pale to deep pink with a silver highlight
pub const PINK_PALETTE: [u32; 7] = [
    0xfce7f3, 0xfbcfe8, 0xf9a8d4, 0xf472b6, 0xec4899, 0xdb2777, 0xe5e7eb,
];

/// Decode an sRGB 0xRRGGBB value into linear RGB in [0, 1]
pub fn hex_color(hex: u32) -> Vec3 {
    Vec3::new(
        srgb_to_linear((hex >> 16) & 0xff),
        srgb_to_linear((hex >> 8) & 0xff),
        srgb_to_linear(hex & 0xff),
    )
}

fn srgb_to_linear(channel: u32) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
