//! LogStore: durable backend over an append-only log
//!
//! Every put and delete is appended to `records.log` as a CRC-framed
//! operation (see [`crate::encoding`]) before it is applied to the in-memory
//! ordered map that serves reads. Opening a store replays the log.
//!
//! ## Recovery
//!
//! - A frame cut short at the end of the file (crash mid-append) is dropped
//!   and the file is truncated back to the last complete frame.
//! - A checksum failure anywhere is reported as `Error::Corruption`; the
//!   store refuses to open rather than serve partial data.
//!
//! ## Durability Modes
//!
//! - `Standard` - hand each frame to the OS as it is appended
//! - `Always` - fsync after every append
//!
//! A failed append truncates the file back to the last complete frame, so a
//! write reported as failed never reappears on replay.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{info, warn};

use recordkv_core::{KvBackend, Result};

use crate::encoding::{decode_op, encode_op, Decoded, LogOp};
use crate::memory::scan_prefix;

/// File name of the log inside the data directory
pub const LOG_FILE_NAME: &str = "records.log";

/// When appended frames reach stable storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Durability {
    /// Write each frame to the OS as it is appended
    #[default]
    Standard,
    /// fsync after every append
    Always,
}

/// Append target of the log
trait LogFile: Write + Send + Sync {
    fn sync_data(&self) -> io::Result<()>;
    fn truncate(&self, len: u64) -> io::Result<()>;
}

impl LogFile for File {
    fn sync_data(&self) -> io::Result<()> {
        File::sync_data(self)
    }

    fn truncate(&self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

struct LogState {
    data: BTreeMap<String, Vec<u8>>,
    file: Box<dyn LogFile>,
    frames: u64,
    /// Byte length of the complete frames in the file
    len: u64,
}

/// Durable ordered backend
pub struct LogStore {
    path: PathBuf,
    durability: Durability,
    state: RwLock<LogState>,
}

impl std::fmt::Debug for LogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStore")
            .field("path", &self.path)
            .field("durability", &self.durability)
            .finish_non_exhaustive()
    }
}

impl LogStore {
    /// Open (or create) a store in `dir` with standard durability
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(dir, Durability::Standard)
    }

    /// Open (or create) a store in `dir`
    pub fn open_with(dir: impl AsRef<Path>, durability: Durability) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(LOG_FILE_NAME);

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)?;

        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;

        let (data, frames, valid_len) = replay(&buf)?;
        if valid_len < buf.len() {
            warn!(
                target: "recordkv::storage",
                path = ?path,
                dropped_bytes = buf.len() - valid_len,
                "Truncating torn frame at end of log"
            );
            file.set_len(valid_len as u64)?;
        }

        info!(
            target: "recordkv::storage",
            path = ?path,
            keys = data.len(),
            frames,
            "Log store opened"
        );

        Ok(Self {
            path,
            durability,
            state: RwLock::new(LogState {
                data,
                file: Box::new(file),
                frames,
                len: valid_len as u64,
            }),
        })
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of frames currently in the log
    pub fn frame_count(&self) -> u64 {
        self.state.read().frames
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.state.read().data.len()
    }

    /// True if no keys are live
    pub fn is_empty(&self) -> bool {
        self.state.read().data.is_empty()
    }

    /// Rewrite the log so it holds one put per live key
    ///
    /// Writes a sibling temp file, syncs it, then renames it over the log.
    pub fn compact(&self) -> Result<()> {
        let mut state = self.state.write();

        let tmp_path = self.path.with_extension("log.tmp");
        let mut len = 0u64;
        {
            let mut tmp = BufWriter::new(File::create(&tmp_path)?);
            for (key, value) in &state.data {
                let frame = encode_op(&LogOp::Put {
                    key: key.clone(),
                    value: value.clone(),
                })?;
                tmp.write_all(&frame)?;
                len += frame.len() as u64;
            }
            tmp.flush()?;
            tmp.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let before = state.frames;
        state.file = Box::new(file);
        state.frames = state.data.len() as u64;
        state.len = len;

        info!(
            target: "recordkv::storage",
            before,
            after = state.frames,
            "Log compacted"
        );
        Ok(())
    }

    fn append(&self, state: &mut LogState, op: &LogOp) -> Result<()> {
        let frame = encode_op(op)?;
        if let Err(e) = self.write_frame(state.file.as_mut(), &frame) {
            warn!(
                target: "recordkv::storage",
                path = ?self.path,
                error = %e,
                "Append failed, truncating log to last complete frame"
            );
            state.file.truncate(state.len)?;
            return Err(e.into());
        }
        state.len += frame.len() as u64;
        state.frames += 1;
        Ok(())
    }

    fn write_frame(&self, file: &mut dyn LogFile, frame: &[u8]) -> io::Result<()> {
        file.write_all(frame)?;
        file.flush()?;
        if self.durability == Durability::Always {
            file.sync_data()?;
        }
        Ok(())
    }
}

/// Replay frames into a map
///
/// Returns the map, the number of frames applied, and the byte length of the
/// valid prefix of `buf`.
fn replay(buf: &[u8]) -> Result<(BTreeMap<String, Vec<u8>>, u64, usize)> {
    let mut data = BTreeMap::new();
    let mut offset = 0usize;
    let mut frames = 0u64;

    while offset < buf.len() {
        match decode_op(&buf[offset..], offset as u64)? {
            Decoded::Frame(op, used) => {
                match op {
                    LogOp::Put { key, value } => {
                        data.insert(key, value);
                    }
                    LogOp::Delete { key } => {
                        data.remove(&key);
                    }
                }
                offset += used;
                frames += 1;
            }
            Decoded::Incomplete => break,
        }
    }

    Ok((data, frames, offset))
}

impl KvBackend for LogStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.state.read().data.get(key).cloned())
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut state = self.state.write();
        let op = LogOp::Put {
            key: key.to_string(),
            value,
        };
        self.append(&mut state, &op)?;
        if let LogOp::Put { key, value } = op {
            state.data.insert(key, value);
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let mut state = self.state.write();
        if !state.data.contains_key(key) {
            return Ok(false);
        }
        self.append(
            &mut state,
            &LogOp::Delete {
                key: key.to_string(),
            },
        )?;
        state.data.remove(key);
        Ok(true)
    }

    fn list_by_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        Ok(scan_prefix(&self.state.read().data, prefix))
    }
}
