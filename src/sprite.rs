//! Slot artwork: decode fetched images and wrap them in kitty graphics escapes.

use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::error::SpriteError;

/// Longest edge kept after decoding. Official artwork ships at 475px.
pub const SPRITE_MAX_PX: u32 = 96;
/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 2.0;
const CHUNK_SIZE: usize = 4096;

/// Base64 PNG, ready for kitty format `f=100`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteImage {
    pub payload: String,
    pub width: u32,
    pub height: u32,
}

pub fn decode_sprite(bytes: &[u8]) -> Result<SpriteImage, SpriteError> {
    let mut image = image::load_from_memory(bytes)?;
    if image.width() > SPRITE_MAX_PX || image.height() > SPRITE_MAX_PX {
        image = image.thumbnail(SPRITE_MAX_PX, SPRITE_MAX_PX);
    }
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(SpriteImage {
        payload: general_purpose::STANDARD.encode(&png),
        width: image.width(),
        height: image.height(),
    })
}

/// Transmit-and-place escapes for image `id`, scaled to `cols` x `rows` cells.
pub fn kitty_sequence(sprite: &SpriteImage, cols: u16, rows: u16, id: u32) -> String {
    let payload = sprite.payload.as_bytes();
    let total = payload.len().div_ceil(CHUNK_SIZE);
    let mut sequence = String::with_capacity(payload.len() + total * 48);

    for (index, chunk) in payload.chunks(CHUNK_SIZE).enumerate() {
        let more = u8::from(index + 1 < total);
        // base64 is ASCII, so chunk edges never split a char
        let chunk = String::from_utf8_lossy(chunk);
        if index == 0 {
            sequence.push_str(&format!(
                "\x1b_Gf=100,s={},v={},a=T,t=d,i={id},c={cols},r={rows},m={more};{chunk}\x1b\\",
                sprite.width, sprite.height
            ));
        } else {
            sequence.push_str(&format!("\x1b_Gm={more};{chunk}\x1b\\"));
        }
    }
    sequence
}

/// Largest cell box inside `max_cols` x `max_rows` that keeps the aspect ratio.
pub fn fit_cells(sprite: &SpriteImage, max_cols: u16, max_rows: u16) -> (u16, u16) {
    if max_cols == 0 || max_rows == 0 || sprite.height == 0 {
        return (max_cols, max_rows);
    }
    let ratio = sprite.width as f32 / sprite.height as f32;
    let cols_for_rows = ratio * max_rows as f32 * CELL_ASPECT;
    if cols_for_rows <= max_cols as f32 {
        let cols = cols_for_rows.max(1.0).round() as u16;
        return (cols.max(1), max_rows);
    }
    let rows = (max_cols as f32 / (ratio * CELL_ASPECT)).max(1.0).round() as u16;
    (max_cols, rows.clamp(1, max_rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([240, 80, 48, 255]),
        ));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    fn sprite(width: u32, height: u32) -> SpriteImage {
        SpriteImage {
            payload: String::new(),
            width,
            height,
        }
    }

    #[test]
    fn small_images_keep_their_size() {
        let decoded = decode_sprite(&png(40, 30)).expect("decodes");
        assert_eq!((decoded.width, decoded.height), (40, 30));
        let raw = general_purpose::STANDARD
            .decode(&decoded.payload)
            .expect("base64 payload");
        assert!(raw.starts_with(b"\x89PNG"));
    }

    #[test]
    fn large_artwork_is_shrunk() {
        let decoded = decode_sprite(&png(475, 237)).expect("decodes");
        assert_eq!(decoded.width, SPRITE_MAX_PX);
        assert!(decoded.height <= SPRITE_MAX_PX / 2 + 1);
    }

    #[test]
    fn garbage_bytes_are_an_image_error() {
        assert!(matches!(
            decode_sprite(b"<html>not found</html>"),
            Err(SpriteError::Image(_))
        ));
    }

    #[test]
    fn long_payloads_are_chunked() {
        let sprite = SpriteImage {
            payload: "A".repeat(CHUNK_SIZE + 10),
            width: 96,
            height: 96,
        };
        let sequence = kitty_sequence(&sprite, 16, 8, 2);
        assert!(sequence.starts_with("\x1b_Gf=100,s=96,v=96,a=T,t=d,i=2,c=16,r=8,m=1;"));
        assert_eq!(sequence.matches("\x1b_G").count(), 2);
        assert!(sequence.contains("\x1b_Gm=0;AAAAAAAAAA\x1b\\"));
    }

    #[test]
    fn fit_respects_cell_aspect() {
        assert_eq!(fit_cells(&sprite(96, 96), 20, 8), (16, 8));
        assert_eq!(fit_cells(&sprite(96, 48), 10, 8), (10, 3));
        assert_eq!(fit_cells(&sprite(96, 96), 0, 8), (0, 8));
    }
}
