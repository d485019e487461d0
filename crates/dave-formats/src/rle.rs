//! Run-length codec for the packed VGA resource blob
//!
//! The blob is a 4-byte little-endian output length followed by a stream of
//! opcodes. Each opcode starts with a control byte:
//!
//! - High bit set: literal run of `(c & 0x7F) + 1` bytes copied verbatim
//! - High bit clear: repeat run, the next byte is written `c + 3` times
//!
//! There are no back-references, so decoding is a single forward pass.

use tracing::{debug, trace};

use crate::error::{FormatError, FormatResult};
use crate::source::ByteSource;

/// Control bit selecting a literal run
pub const LITERAL_FLAG: u8 = 0x80;

/// Shortest literal run
pub const MIN_LITERAL_RUN: usize = 1;

/// Longest literal run (`0x7F + 1`)
pub const MAX_LITERAL_RUN: usize = 128;

/// Shortest repeat run
pub const MIN_REPEAT_RUN: usize = 3;

/// Longest repeat run (`0x7F + 3`)
pub const MAX_REPEAT_RUN: usize = 130;

/// Largest up-front reservation made for a decoded buffer
const MAX_RESERVE: usize = 1 << 20;

/// Decode an RLE blob starting at the source's current position.
///
/// The returned buffer is exactly as long as the declared length. A stream
/// that ends early or whose last run overshoots the declared length is
/// reported as [`FormatError::DecodeCorruption`].
pub fn decompress<S: ByteSource>(mut source: S) -> FormatResult<Vec<u8>> {
    let start = source.position();
    let declared = source.read_u32_le()?;
    let expected = declared as usize;

    debug!("Decompressing RLE blob at {start:#x}: {declared} bytes declared");

    // The length prefix is untrusted, so only reserve up front what a
    // healthy blob needs and let runs grow the buffer past that
    let mut output = Vec::with_capacity(expected.min(MAX_RESERVE));
    let corrupt = |produced: usize| FormatError::DecodeCorruption { declared, produced };

    while output.len() < expected {
        let control = source.read_u8().map_err(|_| corrupt(output.len()))?;

        if control & LITERAL_FLAG != 0 {
            let run = usize::from(control & !LITERAL_FLAG) + 1;
            if output.len() + run > expected {
                return Err(corrupt(output.len() + run));
            }
            let offset = output.len();
            output.resize(offset + run, 0);
            source
                .read_exact(&mut output[offset..])
                .map_err(|_| corrupt(offset))?;
            trace!("Literal run of {run} bytes at output {offset:#x}");
        } else {
            let run = usize::from(control) + MIN_REPEAT_RUN;
            if output.len() + run > expected {
                return Err(corrupt(output.len() + run));
            }
            let value = source.read_u8().map_err(|_| corrupt(output.len()))?;
            trace!(
                "Repeat run of {run} x {value:#04x} at output {:#x}",
                output.len()
            );
            output.resize(output.len() + run, value);
        }
    }

    debug!(
        "Decompressed {} bytes from {} input bytes",
        output.len(),
        source.position() - start
    );
    Ok(output)
}

/// Encode `data` into an RLE blob that [`decompress`] reproduces exactly.
///
/// Runs of three or more equal bytes become repeat opcodes, everything else
/// is grouped into literal opcodes.
pub fn compress(data: &[u8]) -> FormatResult<Vec<u8>> {
    let declared = u32::try_from(data.len()).map_err(|_| FormatError::InputTooLarge(data.len()))?;

    let mut output = Vec::with_capacity(4 + data.len() + data.len() / MAX_LITERAL_RUN + 1);
    output.extend_from_slice(&declared.to_le_bytes());

    let mut literal_start = 0;
    let mut pos = 0;
    while pos < data.len() {
        let run = repeat_len(&data[pos..]);
        if run >= MIN_REPEAT_RUN {
            flush_literals(&mut output, &data[literal_start..pos]);
            output.push((run - MIN_REPEAT_RUN) as u8);
            output.push(data[pos]);
            pos += run;
            literal_start = pos;
        } else {
            pos += run;
        }
    }
    flush_literals(&mut output, &data[literal_start..]);

    trace!(
        "Compressed {} bytes into {} bytes",
        data.len(),
        output.len()
    );
    Ok(output)
}

/// Length of the run of equal bytes at the start of `data`, capped at the
/// longest repeat opcode
fn repeat_len(data: &[u8]) -> usize {
    let Some(&first) = data.first() else {
        return 0;
    };
    data.iter()
        .take(MAX_REPEAT_RUN)
        .take_while(|&&b| b == first)
        .count()
}

fn flush_literals(output: &mut Vec<u8>, literals: &[u8]) {
    for chunk in literals.chunks(MAX_LITERAL_RUN) {
        output.push(LITERAL_FLAG | (chunk.len() - 1) as u8);
        output.extend_from_slice(chunk);
    }
}
