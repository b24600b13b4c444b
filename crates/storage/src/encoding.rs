//! Log frame encoding and decoding
//!
//! This module provides encoding/decoding for log operations with CRC32
//! checksums for corruption detection.
//!
//! ## Frame Format
//!
//! ```text
//! [length: u32][type: u8][payload: bytes][crc32: u32]
//! ```
//!
//! - **length**: Total size of type + payload + crc (NOT including length itself)
//! - **type**: Operation tag (1=Put, 2=Delete)
//! - **payload**: bincode-serialized LogOp
//! - **crc32**: CRC32 checksum over \[type\]\[payload\]
//!
//! All integers are little-endian.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use crc32fast::Hasher;
use recordkv_core::{Error, Result};
use serde::{Deserialize, Serialize};

const TYPE_PUT: u8 = 1;
const TYPE_DELETE: u8 = 2;

/// Smallest valid frame body: type(1) + crc(4)
const MIN_FRAME_LEN: usize = 5;

/// One persisted mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogOp {
    /// Key written with value
    Put {
        /// Key written
        key: String,
        /// New value
        value: Vec<u8>,
    },
    /// Key removed
    Delete {
        /// Key removed
        key: String,
    },
}

impl LogOp {
    fn type_tag(&self) -> u8 {
        match self {
            LogOp::Put { .. } => TYPE_PUT,
            LogOp::Delete { .. } => TYPE_DELETE,
        }
    }
}

/// Outcome of decoding at one offset
#[derive(Debug, PartialEq, Eq)]
pub enum Decoded {
    /// A complete, verified frame and the bytes it occupied
    Frame(LogOp, usize),
    /// The buffer ends partway through a frame (torn write)
    Incomplete,
}

/// Encode an operation as a frame
pub fn encode_op(op: &LogOp) -> Result<Vec<u8>> {
    let type_tag = op.type_tag();
    let payload = bincode::serialize(op)?;

    let total_len = 1 + payload.len() + 4;
    let mut buf = Vec::with_capacity(4 + total_len);

    buf.write_u32::<LittleEndian>(total_len as u32)?;
    buf.write_u8(type_tag)?;
    buf.extend_from_slice(&payload);

    let mut hasher = Hasher::new();
    hasher.update(&[type_tag]);
    hasher.update(&payload);
    buf.write_u32::<LittleEndian>(hasher.finalize())?;

    Ok(buf)
}

/// Decode one frame from the start of `buf`
///
/// `offset` is the file position of `buf[0]`, used in error messages.
///
/// # Errors
///
/// Returns `Error::Corruption` when the declared length is impossible, the
/// CRC does not match, the tag is unknown, or the payload does not
/// deserialize into an operation of the tagged type.
pub fn decode_op(buf: &[u8], offset: u64) -> Result<Decoded> {
    if buf.len() < 4 {
        return Ok(Decoded::Incomplete);
    }
    let total_len = LittleEndian::read_u32(&buf[..4]) as usize;

    if total_len < MIN_FRAME_LEN {
        return Err(Error::Corruption(format!(
            "offset {offset}: invalid frame length {total_len}"
        )));
    }
    if buf.len() < 4 + total_len {
        return Ok(Decoded::Incomplete);
    }

    let body = &buf[4..4 + total_len];
    let type_tag = body[0];
    let payload = &body[1..total_len - 4];
    let stored_crc = LittleEndian::read_u32(&body[total_len - 4..]);

    let mut hasher = Hasher::new();
    hasher.update(&[type_tag]);
    hasher.update(payload);
    let computed_crc = hasher.finalize();
    if computed_crc != stored_crc {
        return Err(Error::Corruption(format!(
            "offset {offset}: CRC mismatch (stored {stored_crc:#010x}, computed {computed_crc:#010x})"
        )));
    }

    if type_tag != TYPE_PUT && type_tag != TYPE_DELETE {
        return Err(Error::Corruption(format!(
            "offset {offset}: unknown frame type {type_tag}"
        )));
    }

    let op: LogOp = bincode::deserialize(payload)
        .map_err(|e| Error::Corruption(format!("offset {offset}: {e}")))?;
    if op.type_tag() != type_tag {
        return Err(Error::Corruption(format!(
            "offset {offset}: frame type {type_tag} does not match payload"
        )));
    }

    Ok(Decoded::Frame(op, 4 + total_len))
}
