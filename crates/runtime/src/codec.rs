//! At-rest content codec: hex text over a zlib (DEFLATE) stream.

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use std::io::Write;

use crate::error::{RuntimeError, RuntimeResult};

const INFLATE_CHUNK: usize = 16 * 1024;

/// Decode the hex text of a stored record into compressed bytes.
pub fn decode_content(content: &str) -> RuntimeResult<Vec<u8>> {
    hex::decode(content.trim()).map_err(|e| RuntimeError::MalformedContent(e.to_string()))
}

/// Inflate a zlib stream into the program image, refusing to produce more
/// than `max_bytes`.
///
/// A corrupt, truncated or oversized stream is an error; nothing partial is
/// returned.
pub fn decompress(compressed: &[u8], max_bytes: usize) -> RuntimeResult<Vec<u8>> {
    let mut inflater = Decompress::new(true);
    let initial = compressed
        .len()
        .saturating_mul(2)
        .max(INFLATE_CHUNK)
        .min(max_bytes.saturating_add(1));
    let mut image = Vec::with_capacity(initial);

    loop {
        if image.len() == image.capacity() {
            // one byte of headroom past the cap so an oversized image is seen
            let room = max_bytes.saturating_add(1).saturating_sub(image.len());
            image.reserve(INFLATE_CHUNK.min(room.max(1)));
        }
        let before_in = inflater.total_in();
        let before_out = inflater.total_out();
        // total_in never exceeds the input handed in
        let input = &compressed[before_in as usize..];

        let status = inflater
            .decompress_vec(input, &mut image, FlushDecompress::None)
            .map_err(|e| RuntimeError::Decompression(e.to_string()))?;
        if image.len() > max_bytes {
            return Err(RuntimeError::Decompression(format!(
                "program image exceeds {} bytes",
                max_bytes
            )));
        }
        if status == Status::StreamEnd {
            return Ok(image);
        }

        let progressed = inflater.total_in() != before_in || inflater.total_out() != before_out;
        if !progressed && image.len() < image.capacity() {
            return Err(RuntimeError::Decompression(format!(
                "stream ended after {} of {} bytes without a terminating block",
                inflater.total_in(),
                compressed.len()
            )));
        }
    }
}

/// Hex-decode then inflate stored content.
pub fn unpack_content(content: &str, max_bytes: usize) -> RuntimeResult<Vec<u8>> {
    let compressed = decode_content(content)?;
    decompress(&compressed, max_bytes)
}

/// Compress and hex-encode a program image for registration.
pub fn pack_image(image: &[u8]) -> std::io::Result<String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(image)?;
    Ok(hex::encode(encoder.finish()?))
}
