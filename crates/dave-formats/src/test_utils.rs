//! Builders for synthetic blobs shared by the format tests

use crate::palette::{PALETTE_SIZE, Palette};

/// Lay out a decompressed tile buffer: count, offset table, payloads
pub fn tile_buffer(payloads: &[Vec<u8>]) -> Vec<u8> {
    let table_len = 4 + 4 * payloads.len();
    let mut offsets = Vec::with_capacity(payloads.len());
    let mut next = table_len;
    for payload in payloads {
        offsets.push(next as u32);
        next += payload.len();
    }

    let mut buffer = Vec::with_capacity(next);
    buffer.extend_from_slice(&(payloads.len() as u32).to_le_bytes());
    for offset in offsets {
        buffer.extend_from_slice(&offset.to_le_bytes());
    }
    for payload in payloads {
        buffer.extend_from_slice(payload);
    }
    buffer
}

/// Raw palette where entry `i` is gray level `i % 64`
pub fn gray_vga_palette() -> Vec<u8> {
    (0..PALETTE_SIZE).map(|i| ((i / 3) % 64) as u8).collect()
}

/// Widened form of [`gray_vga_palette`]
pub fn gray_palette() -> Palette {
    Palette::from_vga(&gray_vga_palette()).expect("palette has the right size")
}
