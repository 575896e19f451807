//! Test fixtures: image blobs of a given size.

use roomify_core::SelectedFile;

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SOI: [u8; 3] = [0xFF, 0xD8, 0xFF];

fn padded(header: &[u8], size: usize) -> Vec<u8> {
    let mut data = header.to_vec();
    data.extend((0..size.saturating_sub(header.len())).map(|i| (i % 251) as u8));
    data.truncate(size.max(header.len()));
    data
}

/// PNG-signed blob of `size` bytes.
pub fn png_file(name: &str, size: usize) -> SelectedFile {
    SelectedFile::new(name, "image/png", padded(&PNG_SIGNATURE, size))
}

/// JPEG-signed blob of `size` bytes.
pub fn jpeg_file(name: &str, size: usize) -> SelectedFile {
    SelectedFile::new(name, "image/jpeg", padded(&JPEG_SOI, size))
}
