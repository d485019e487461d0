//! Integration tests exercising the public API the way the extractor does:
//! compressed blob in, bitmaps out.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use dave_formats::palette::PALETTE_SIZE;
use dave_formats::source::{ByteSource, FileSource, MemorySource};
use dave_formats::{BitmapFile, ChannelOrder, Palette, TileImage, TileTable, bitmap, rle};
use pretty_assertions::assert_eq;
use std::io::Write;

#[test]
fn empty_first_tile_and_sentinel_range() {
    // tileCount=2, offsets=[8, 8], total length 12
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&2u32.to_le_bytes());
    buffer.extend_from_slice(&8u32.to_le_bytes());
    buffer.extend_from_slice(&8u32.to_le_bytes());
    assert_eq!(buffer.len(), 12);

    let table = TileTable::parse(&buffer).unwrap();
    assert_eq!(table.offsets(), &[8, 8, 12]);
    assert_eq!(table.entry(0, &buffer).unwrap().range, 8..8);
    assert_eq!(table.entry(1, &buffer).unwrap().range, 8..12);
}

#[test]
fn header_sets_dimensions() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&1u32.to_le_bytes());
    buffer.extend_from_slice(&8u32.to_le_bytes());
    buffer.extend_from_slice(&[0x05, 0x00, 0x03, 0x00]);
    buffer.extend_from_slice(&[9; 15]);

    let table = TileTable::parse(&buffer).unwrap();
    let entry = table.entry(0, &buffer).unwrap();
    assert_eq!((entry.width, entry.height), (5, 3));
    assert!(entry.has_header);
    assert_eq!(entry.range, 12..buffer.len());
}

#[test]
fn nonzero_second_byte_means_no_header() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&1u32.to_le_bytes());
    buffer.extend_from_slice(&8u32.to_le_bytes());
    buffer.extend_from_slice(&[0xFF, 0x01, 0x00, 0x00]);

    let table = TileTable::parse(&buffer).unwrap();
    let entry = table.entry(0, &buffer).unwrap();
    assert_eq!((entry.width, entry.height), (16, 16));
    assert!(!entry.has_header);
    assert_eq!(entry.range, 8..12);
}

#[test]
fn two_pixel_bitmap_layout() {
    let pixels = [0xff, 0, 0, 0xff, 0xff, 0, 0, 0xff];
    let order: ChannelOrder = "bgra".parse().unwrap();
    let bmp = bitmap::encode(&pixels, 2, 1, &order).unwrap();

    assert_eq!(&bmp[0..2], b"BM");
    assert_eq!(u32::from_le_bytes(bmp[14..18].try_into().unwrap()), 40);
    assert_eq!(i32::from_le_bytes(bmp[18..22].try_into().unwrap()), 2);
    assert_eq!(i32::from_le_bytes(bmp[22..26].try_into().unwrap()), -1);
    assert_eq!(&bmp[54..60], &[0xff, 0x00, 0x00, 0xff, 0x00, 0x00]);
    // Row of 6 bytes padded by width % 4
    assert_eq!(bmp.len(), 54 + 6 + 2);
}

#[test]
fn blob_in_file_to_bitmap() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&1u32.to_le_bytes());
    buffer.extend_from_slice(&8u32.to_le_bytes());
    buffer.extend_from_slice(&[0x03, 0x00, 0x01, 0x00, 0, 1, 2]);

    let mut palette = vec![0u8; PALETTE_SIZE];
    palette[3..6].copy_from_slice(&[0x3F, 0x00, 0x10]);
    palette[6..9].copy_from_slice(&[0x01, 0x02, 0x03]);

    let blob = rle::compress(&buffer).unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0xAA; 7]).unwrap();
    file.write_all(&blob).unwrap();
    let palette_offset = 7 + blob.len() as u64;
    file.write_all(&palette).unwrap();
    file.flush().unwrap();

    let mut source = FileSource::new(file.path());
    source.seek(7).unwrap();
    let decompressed = rle::decompress(&mut source).unwrap();
    assert_eq!(decompressed, buffer);

    let total = decompressed.len() as u32;
    let table = TileTable::read(MemorySource::new(&decompressed), total).unwrap();

    source.seek(palette_offset).unwrap();
    let palette = Palette::read(&mut source).unwrap();

    let entry = table.entry(0, &decompressed).unwrap();
    let image = TileImage::decode(&entry, &decompressed, &palette).unwrap();
    let bmp = BitmapFile::parse(&image.to_bitmap().unwrap()).unwrap();

    assert_eq!((bmp.width(), bmp.height()), (3, 1));
    assert_eq!(bmp.pixel(0, 0), Some([0, 0, 0]));
    // Stored as B, G, R
    assert_eq!(bmp.pixel(1, 0), Some([0x40, 0x00, 0xFC]));
    assert_eq!(bmp.pixel(2, 0), Some([12, 8, 4]));
}
