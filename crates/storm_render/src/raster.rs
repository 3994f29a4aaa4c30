//! CPU pixel operations shared by the software back end and the rotation
//! cache builders

use glam::Vec2;
use image::{Rgba, RgbaImage};

// Keeps exact quarter turns from growing a pixel through sin/cos rounding.
const EXTENT_EPSILON: f64 = 1e-6;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Size of the axis-aligned box that holds a `width × height` image turned by
/// `degrees`.
pub fn rotated_extent(width: u32, height: u32, degrees: f32) -> (u32, u32) {
    let (s, c) = f64::from(degrees).to_radians().sin_cos();
    let (w, h) = (f64::from(width), f64::from(height));
    let rw = (w * c.abs() + h * s.abs() - EXTENT_EPSILON).ceil().max(0.0);
    let rh = (w * s.abs() + h * c.abs() - EXTENT_EPSILON).ceil().max(0.0);
    (rw as u32, rh as u32)
}

/// Rotate clockwise (on the y-down grid) by `degrees`, nearest neighbour,
/// into a canvas grown to fit. Uncovered pixels are transparent.
pub fn rotate_rgba(src: &RgbaImage, degrees: f32) -> RgbaImage {
    let (sw, sh) = src.dimensions();
    let (dw, dh) = rotated_extent(sw, sh, degrees);
    let (s, c) = f64::from(degrees).to_radians().sin_cos();
    let (src_cx, src_cy) = (f64::from(sw) / 2.0, f64::from(sh) / 2.0);
    let (dst_cx, dst_cy) = (f64::from(dw) / 2.0, f64::from(dh) / 2.0);

    RgbaImage::from_fn(dw, dh, |x, y| {
        let dx = f64::from(x) + 0.5 - dst_cx;
        let dy = f64::from(y) + 0.5 - dst_cy;
        // Inverse turn: sample the source pixel that lands here.
        let sx = (c * dx + s * dy + src_cx).floor();
        let sy = (-s * dx + c * dy + src_cy).floor();
        if sx >= 0.0 && sy >= 0.0 && sx < f64::from(sw) && sy < f64::from(sh) {
            *src.get_pixel(sx as u32, sy as u32)
        } else {
            TRANSPARENT
        }
    })
}

/// Alpha-blend `src` onto `dst` with its center at `center`, clipped to
/// `dst`.
pub fn blit_centered(dst: &mut RgbaImage, src: &RgbaImage, center: Vec2) {
    let (sw, sh) = src.dimensions();
    let (dw, dh) = dst.dimensions();
    let left = (center.x - sw as f32 / 2.0).floor() as i64;
    let top = (center.y - sh as f32 / 2.0).floor() as i64;

    let x0 = left.max(0);
    let y0 = top.max(0);
    let x1 = (left + i64::from(sw)).min(i64::from(dw));
    let y1 = (top + i64::from(sh)).min(i64::from(dh));

    for y in y0..y1 {
        for x in x0..x1 {
            let pixel = *src.get_pixel((x - left) as u32, (y - top) as u32);
            blend(dst.get_pixel_mut(x as u32, y as u32), pixel);
        }
    }
}

/// Source-over compositing on straight (non-premultiplied) RGBA8.
#[inline]
pub(crate) fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let alpha = u32::from(src[3]);
    match alpha {
        0 => {}
        255 => *dst = src,
        _ => {
            let inv = 255 - alpha;
            for i in 0..3 {
                dst[i] = ((u32::from(src[i]) * alpha + u32::from(dst[i]) * inv + 127) / 255) as u8;
            }
            dst[3] = (alpha + (u32::from(dst[3]) * inv + 127) / 255) as u8;
        }
    }
}
