//! Binary distance-matrix file.
//!
//! Layout (little-endian):
//!
//! ```text
//! [0..4]   magic "ECBM"
//! [4..8]   format version (u32)
//! [8..12]  distance kind tag (u32: 0 = straight, 1 = street)
//! [12..16] station-table fingerprint (u32)
//! [16..20] xxHash32 of the payload
//! [20..]   bitcode payload: station count and row-major cells
//! ```
//!
//! Nothing in the file depends on when it was written, so saving the same
//! matrix twice produces the same bytes.

use std::path::Path;

use bitcode::{Decode, Encode};
use xxhash_rust::xxh32::xxh32;

use eb_core::DistanceKind;
use eb_matrix::DistanceMatrix;
use eb_stations::StationTable;

use crate::atomic::atomic_write;
use crate::{OutputError, OutputResult};

pub const MAGIC: [u8; 4] = *b"ECBM";
pub const FORMAT_VERSION: u32 = 1;
pub const HEADER_SIZE: usize = 20;

const XXHASH_SEED: u32 = 0;

/// Identity fields of a matrix file.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MatrixFileHeader {
    pub format_version: u32,
    pub kind:           DistanceKind,
    pub fingerprint:    u32,
    pub checksum:       u32,
}

#[derive(Encode, Decode)]
pub(crate) struct MatrixPayload {
    pub(crate) n:      u32,
    pub(crate) values: Vec<f64>,
}

/// Default file name for a matrix of `kind` inside an output directory.
pub fn matrix_file_name(kind: DistanceKind) -> String {
    format!("{}_distances.bin", kind.as_str())
}

/// Hash of every station's id and coordinates, in id order.
///
/// Adding, removing or moving a station changes the fingerprint; renaming
/// one does not, since names do not affect distances.
pub fn station_fingerprint(stations: &StationTable) -> u32 {
    let mut bytes = Vec::with_capacity(stations.len() * 20);
    for s in stations.iter() {
        bytes.extend_from_slice(&s.id.0.to_le_bytes());
        bytes.extend_from_slice(&s.pos.lat.to_le_bytes());
        bytes.extend_from_slice(&s.pos.lon.to_le_bytes());
    }
    xxh32(&bytes, XXHASH_SEED)
}

/// Serialise `matrix` with its header.
pub fn encode_matrix(matrix: &DistanceMatrix, fingerprint: u32) -> Vec<u8> {
    let payload = bitcode::encode(&MatrixPayload {
        n:      matrix.len() as u32,
        values: matrix.values().to_vec(),
    });

    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&u32::from(matrix.kind().tag()).to_le_bytes());
    out.extend_from_slice(&fingerprint.to_le_bytes());
    out.extend_from_slice(&xxh32(&payload, XXHASH_SEED).to_le_bytes());
    out.extend_from_slice(&payload);
    out
}

/// Parse and validate a matrix file's bytes.
///
/// # Errors
///
/// [`OutputError::Corrupt`] for a wrong magic, a newer format version, an
/// unknown kind tag or a checksum mismatch; [`OutputError::Bitcode`] when
/// the payload does not decode.
pub fn decode_matrix(bytes: &[u8]) -> OutputResult<(MatrixFileHeader, DistanceMatrix)> {
    if bytes.len() < HEADER_SIZE {
        return Err(OutputError::Corrupt(format!(
            "matrix file is {} bytes, shorter than its {HEADER_SIZE}-byte header",
            bytes.len()
        )));
    }
    if bytes[..4] != MAGIC {
        return Err(OutputError::Corrupt("not a matrix file (bad magic)".into()));
    }

    let word = |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
    let format_version = word(4);
    let kind_tag = word(8);
    let fingerprint = word(12);
    let checksum = word(16);

    if format_version > FORMAT_VERSION {
        return Err(OutputError::Corrupt(format!(
            "matrix file format {format_version} is newer than supported version {FORMAT_VERSION}"
        )));
    }
    let kind = u8::try_from(kind_tag)
        .ok()
        .and_then(DistanceKind::from_tag)
        .ok_or_else(|| OutputError::Corrupt(format!("unknown distance kind tag {kind_tag}")))?;

    let payload = &bytes[HEADER_SIZE..];
    let computed = xxh32(payload, XXHASH_SEED);
    if computed != checksum {
        return Err(OutputError::Corrupt(format!(
            "checksum mismatch (expected {checksum:#010X}, got {computed:#010X})"
        )));
    }

    let decoded: MatrixPayload = bitcode::decode(payload)?;
    let matrix = DistanceMatrix::from_values(kind, decoded.n as usize, decoded.values)
        .map_err(|e| OutputError::Corrupt(e.to_string()))?;

    Ok((MatrixFileHeader { format_version, kind, fingerprint, checksum }, matrix))
}

/// Atomically write `matrix` to `path`.
pub fn save_matrix(path: &Path, matrix: &DistanceMatrix, fingerprint: u32) -> OutputResult<()> {
    atomic_write(path, &encode_matrix(matrix, fingerprint))?;
    Ok(())
}

pub fn load_matrix(path: &Path) -> OutputResult<(MatrixFileHeader, DistanceMatrix)> {
    decode_matrix(&std::fs::read(path)?)
}
