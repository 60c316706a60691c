//! Stream filter encode/decode utilities.
//!
//! Annotation edits re-emit stream payloads, so the encode direction matters
//! as much as decode. Only FlateDecode is implemented; other filters are
//! carried through round-trips untouched and reported as unsupported when a
//! caller asks for their decoded bytes.

use super::error::{PDFError, PDFResult};
use flate2::read::ZlibDecoder;
use std::io::Read;

/// Decodes FlateDecode (zlib/deflate) compressed data.
pub fn decode_flate(compressed_data: &[u8]) -> PDFResult<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(compressed_data);
    let mut decompressed = Vec::new();

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| PDFError::parse_failure(format!("FlateDecode error: {}", e)))?;

    Ok(decompressed)
}

/// Encodes data with FlateDecode for re-emission.
pub fn encode_flate(data: &[u8]) -> PDFResult<Vec<u8>> {
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| PDFError::serialization_failure(format!("FlateDecode error: {}", e)))
}

/// Applies a single named filter to stream data.
///
/// `filter_name` carries its leading slash, as stored in the object model.
pub fn decode_stream(data: &[u8], filter_name: Option<&str>) -> PDFResult<Vec<u8>> {
    match filter_name {
        Some("/FlateDecode" | "/Fl") => decode_flate(data),
        Some(filter) => Err(PDFError::unsupported(filter)),
        None => Ok(data.to_vec()),
    }
}
