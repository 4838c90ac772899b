/// Converts a single sRGB-encoded channel in [0, 1] to linear
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Converts a `0xRRGGBB` color to linear RGB, the space lights and clear colors are specified in
pub fn hex_to_linear_rgb(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_white() {
        let rgb = hex_to_linear_rgb(0xffffff);
        assert!((rgb[0] - 1.0).abs() < 0.001);
        assert!((rgb[1] - 1.0).abs() < 0.001);
        assert!((rgb[2] - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_hex_black() {
        let rgb = hex_to_linear_rgb(0x000000);
        assert_eq!(rgb, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_hex_channel_order() {
        let rgb = hex_to_linear_rgb(0xff0000);
        assert!((rgb[0] - 1.0).abs() < 0.001);
        assert!(rgb[1].abs() < 0.001);
        assert!(rgb[2].abs() < 0.001);
    }

    #[test]
    fn test_background_is_dark() {
        // 0x1a1a2e is a deep navy; linear values are well under 0.05
        let rgb = hex_to_linear_rgb(0x1a1a2e);
        assert!(rgb.iter().all(|c| *c < 0.05));
        assert!(rgb[2] > rgb[0]);
    }

    #[test]
    fn test_srgb_midpoint() {
        assert!((srgb_to_linear(0.5) - 0.214).abs() < 0.001);
    }
}
