use field_sources::image::ImageF32;

/// Generates a simple high-contrast checkerboard image.
pub fn checkerboard_u8(width: usize, height: usize, cell: usize) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    assert!(cell > 0, "cell size must be positive");

    let mut img = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let sum = x / cell + y / cell;
            img[y * width + x] = if sum & 1 == 0 { 32u8 } else { 220u8 };
        }
    }
    img
}

/// Dark image with a one-pixel bright vertical line at column `x0`.
pub fn vertical_line_f32(width: usize, height: usize, x0: usize) -> ImageF32 {
    ImageF32::from_fn(width, height, |x, _| if x == x0 { 1.0 } else { 0.0 })
}

/// Slanted sinusoid plus a soft ridge, values in `[0.1, 1.0]`.
pub fn textured_f32(width: usize, height: usize) -> ImageF32 {
    let tau = std::f32::consts::TAU;
    let ridge_x = width as f32 * 0.4;
    ImageF32::from_fn(width, height, |x, y| {
        let wave = 0.4 * (tau * (0.07 * x as f32 + 0.03 * y as f32)).sin();
        let d = x as f32 - ridge_x;
        let ridge = 0.1 * (-d * d / 4.0).exp();
        0.5 + wave + ridge
    })
}
