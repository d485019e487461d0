//! 24-bit uncompressed bitmap container
//!
//! Only the subset the extractor writes is supported: a 14-byte file header,
//! a 40-byte `BITMAPINFOHEADER`, and 24-bit pixel rows stored top-down
//! (negative height). Rows are padded with `width % 4` zero bytes, which
//! brings `3 * width` up to a multiple of four.
//!
//! # Example
//!
//! ```
//! use dave_formats::bitmap::{BitmapFile, ChannelOrder, encode};
//!
//! let pixels = [0xFF, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0xFF];
//! let bmp = encode(&pixels, 2, 1, &ChannelOrder::bgra()).unwrap();
//!
//! let parsed = BitmapFile::parse(&bmp).unwrap();
//! assert_eq!(parsed.dib_header.width, 2);
//! assert_eq!(parsed.dib_header.height, -1);
//! assert_eq!(parsed.pixel(1, 0), Some([0xFF, 0x00, 0x00]));
//! ```

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use binrw::{BinRead, BinWrite};
use tracing::{trace, warn};

use crate::error::{FormatError, FormatResult};

/// Size of the file header, magic included
pub const FILE_HEADER_SIZE: u32 = 14;

/// Size of the `BITMAPINFOHEADER`
pub const DIB_HEADER_SIZE: u32 = 40;

/// Offset of the pixel rows from the start of the file
pub const PIXEL_DATA_OFFSET: u32 = FILE_HEADER_SIZE + DIB_HEADER_SIZE;

/// Bits per output pixel
pub const BITS_PER_PIXEL: u16 = 24;

/// Bitmap file header
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq, Eq)]
#[brw(little, magic = b"BM")]
pub struct BitmapFileHeader {
    /// Total file size in bytes
    pub file_size: u32,
    /// Reserved, always zero
    pub reserved: u32,
    /// Offset of the pixel rows
    pub pixel_data_offset: u32,
}

/// `BITMAPINFOHEADER`
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct DibHeader {
    /// Size of this header (40)
    pub header_size: u32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels, negative for top-down rows
    pub height: i32,
    /// Color planes, always 1
    pub planes: u16,
    /// Bits per pixel
    pub bits_per_pixel: u16,
    /// Compression method, 0 for none
    pub compression: u32,
    /// Size of the pixel rows including padding
    pub image_size: u32,
    /// Horizontal resolution
    pub x_pixels_per_meter: i32,
    /// Vertical resolution
    pub y_pixels_per_meter: i32,
    /// Palette size, unused for 24-bit
    pub colors_used: u32,
    /// Important colors, unused
    pub colors_important: u32,
}

/// One channel of a source pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Red, written to byte 2 of the output triplet
    Red,
    /// Green, written to byte 1
    Green,
    /// Blue, written to byte 0
    Blue,
    /// Alpha, consumed but not written
    Alpha,
}

impl Channel {
    /// Position inside the stored B, G, R triplet
    const fn triplet_offset(self) -> Option<usize> {
        match self {
            Self::Blue => Some(0),
            Self::Green => Some(1),
            Self::Red => Some(2),
            Self::Alpha => None,
        }
    }

    const fn as_char(self) -> char {
        match self {
            Self::Red => 'r',
            Self::Green => 'g',
            Self::Blue => 'b',
            Self::Alpha => 'a',
        }
    }
}

/// Layout of one source pixel, e.g. `"bgra"`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelOrder(Vec<Channel>);

impl ChannelOrder {
    /// B, G, R, A: the layout produced by the palette mapper
    pub fn bgra() -> Self {
        Self(vec![
            Channel::Blue,
            Channel::Green,
            Channel::Red,
            Channel::Alpha,
        ])
    }

    /// Channels in source order
    pub fn channels(&self) -> &[Channel] {
        &self.0
    }

    /// Bytes per source pixel
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the order has no channels
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for ChannelOrder {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let channels = s
            .chars()
            .map(|c| match c.to_ascii_lowercase() {
                'r' => Ok(Channel::Red),
                'g' => Ok(Channel::Green),
                'b' => Ok(Channel::Blue),
                'a' => Ok(Channel::Alpha),
                _ => Err(FormatError::InvalidChannelOrder(s.to_string())),
            })
            .collect::<FormatResult<Vec<_>>>()?;

        if channels.is_empty() {
            return Err(FormatError::InvalidChannelOrder(s.to_string()));
        }
        Ok(Self(channels))
    }
}

impl fmt::Display for ChannelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for channel in &self.0 {
            write!(f, "{}", channel.as_char())?;
        }
        write!(f, "{}", self.0.len() * 8)
    }
}

/// Encode `pixels` as a 24-bit top-down bitmap.
///
/// `pixels` holds `order.len()` bytes per pixel, row-major. A buffer shorter
/// than `width * height` pixels is accepted: positions it does not cover stay
/// zero.
pub fn encode(pixels: &[u8], width: u32, height: u32, order: &ChannelOrder) -> FormatResult<Vec<u8>> {
    BitmapFile::from_pixels(pixels, width, height, order)?.build()
}

/// A parsed or freshly encoded bitmap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapFile {
    /// File header
    pub file_header: BitmapFileHeader,
    /// Info header
    pub dib_header: DibHeader,
    /// Padded pixel rows
    pub pixel_data: Vec<u8>,
}

impl BitmapFile {
    /// Lay out `pixels` into padded B, G, R rows
    pub fn from_pixels(
        pixels: &[u8],
        width: u32,
        height: u32,
        order: &ChannelOrder,
    ) -> FormatResult<Self> {
        let invalid = || FormatError::InvalidDimensions { width, height };

        let w = width as usize;
        let h = height as usize;
        let row_pad = w % 4;
        let row_bytes = w.checked_mul(3).and_then(|n| n.checked_add(row_pad)).ok_or_else(invalid)?;
        let image_size = row_bytes.checked_mul(h).ok_or_else(invalid)?;

        let image_size_u32 = u32::try_from(image_size).map_err(|_| invalid())?;
        let file_size = image_size_u32.checked_add(PIXEL_DATA_OFFSET).ok_or_else(invalid)?;
        let width_i32 = i32::try_from(width).map_err(|_| invalid())?;
        let height_i32 = i32::try_from(height).map_err(|_| invalid())?;

        let expected = w * h * order.len();
        if pixels.len() < expected {
            warn!(
                "Pixel buffer holds {} of {expected} bytes for {width}x{height}, leaving the rest zero",
                pixels.len()
            );
        }

        let mut pixel_data = vec![0u8; image_size];
        let mut src = 0usize;
        for y in 0..h {
            for x in 0..w {
                let p = y * row_bytes + x * 3;
                for channel in order.channels() {
                    if let (Some(offset), Some(&value)) = (channel.triplet_offset(), pixels.get(src)) {
                        pixel_data[p + offset] = value;
                    }
                    src += 1;
                }
            }
        }

        trace!("Laid out {width}x{height} bitmap, {image_size} bytes of rows");

        Ok(Self {
            file_header: BitmapFileHeader {
                file_size,
                reserved: 0,
                pixel_data_offset: PIXEL_DATA_OFFSET,
            },
            dib_header: DibHeader {
                header_size: DIB_HEADER_SIZE,
                width: width_i32,
                height: -height_i32,
                planes: 1,
                bits_per_pixel: BITS_PER_PIXEL,
                compression: 0,
                image_size: image_size_u32,
                x_pixels_per_meter: 0,
                y_pixels_per_meter: 0,
                colors_used: 0,
                colors_important: 0,
            },
            pixel_data,
        })
    }

    /// Parse a 24-bit uncompressed bitmap
    pub fn parse(data: &[u8]) -> FormatResult<Self> {
        let mut cursor = Cursor::new(data);
        let file_header = BitmapFileHeader::read(&mut cursor)?;
        let dib_header = DibHeader::read(&mut cursor)?;

        if dib_header.header_size != DIB_HEADER_SIZE {
            return Err(FormatError::UnsupportedBitmap(format!(
                "info header size {}",
                dib_header.header_size
            )));
        }
        if dib_header.bits_per_pixel != BITS_PER_PIXEL {
            return Err(FormatError::UnsupportedBitmap(format!(
                "{} bits per pixel",
                dib_header.bits_per_pixel
            )));
        }
        if dib_header.compression != 0 {
            return Err(FormatError::UnsupportedBitmap(format!(
                "compression method {}",
                dib_header.compression
            )));
        }

        let start = file_header.pixel_data_offset as usize;
        let end = start + dib_header.image_size as usize;
        let pixel_data = data
            .get(start..end)
            .ok_or_else(|| {
                FormatError::UnsupportedBitmap(format!(
                    "pixel rows {start}..{end} exceed file length {}",
                    data.len()
                ))
            })?
            .to_vec();

        Ok(Self {
            file_header,
            dib_header,
            pixel_data,
        })
    }

    /// Serialize headers and rows
    pub fn build(&self) -> FormatResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(
            PIXEL_DATA_OFFSET as usize + self.pixel_data.len(),
        ));
        self.file_header.write(&mut cursor)?;
        self.dib_header.write(&mut cursor)?;

        let mut data = cursor.into_inner();
        data.extend_from_slice(&self.pixel_data);
        Ok(data)
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.dib_header.width.unsigned_abs()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.dib_header.height.unsigned_abs()
    }

    /// Whether rows run from the top of the image down
    pub const fn is_top_down(&self) -> bool {
        self.dib_header.height < 0
    }

    /// Stored B, G, R triplet at `(x, y)`, `y` counted from the top
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }

        let w = self.width() as usize;
        let row_bytes = w * 3 + w % 4;
        let row = if self.is_top_down() {
            y as usize
        } else {
            (self.height() - 1 - y) as usize
        };

        let p = row * row_bytes + x as usize * 3;
        self.pixel_data
            .get(p..p + 3)
            .map(|bgr| [bgr[0], bgr[1], bgr[2]])
    }
}
