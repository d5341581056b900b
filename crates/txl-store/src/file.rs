use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, info, warn};
use txl_types::TransactionRecord;

use crate::config::{LogConfig, SyncMode};
use crate::error::{StoreError, StoreResult};
use crate::traits::RecordLog;
use crate::TRANSACTIONS_COLLECTION;

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// Largest payload a single entry may carry (16 MiB).
pub const MAX_ENTRY_SIZE: usize = 16 * 1024 * 1024;

struct LogState {
    file: File,
    /// Byte offset where the next entry will be written.
    offset: u64,
    /// Decoded records, indexed by position.
    records: Vec<TransactionRecord>,
    /// Set when a failed append could not be rolled back. The file then
    /// holds a partial entry at this offset and no further appends are
    /// accepted.
    broken_at: Option<u64>,
}

/// File-backed, crash-recoverable record log.
///
/// Records are serialized with bincode, framed with a length prefix and a
/// CRC32 checksum, and appended to a single segment file:
///
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized TransactionRecord)]
/// ```
///
/// On open the file is read front-to-back and every record is cached in
/// memory, so reads never touch the disk. An incomplete final entry (a torn
/// write from a crash) is truncated away. Damage anywhere else is reported as
/// [`StoreError::Corruption`]; entries are never skipped, since that would
/// shift every later position.
pub struct FileRecordLog {
    path: PathBuf,
    state: RwLock<LogState>,
    config: LogConfig,
}

impl FileRecordLog {
    /// Open (or create) a log segment file at the given path.
    pub fn open(path: &Path, config: LogConfig) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;

        let file_len = file.metadata()?.len();
        let recovered = recover(&file, file_len)?;

        if recovered.valid_len < file_len {
            warn!(
                path = %path.display(),
                valid_len = recovered.valid_len,
                file_len,
                "truncating torn tail of record log"
            );
            file.set_len(recovered.valid_len)?;
            file.sync_all()?;
        }

        info!(
            path = %path.display(),
            records = recovered.records.len(),
            "record log opened"
        );

        Ok(Self {
            path: path.to_path_buf(),
            state: RwLock::new(LogState {
                file,
                offset: recovered.valid_len,
                records: recovered.records,
                broken_at: None,
            }),
            config,
        })
    }

    /// Open the `TRANSACTIONS` collection inside `data_dir`.
    pub fn open_in(data_dir: &Path, config: LogConfig) -> StoreResult<Self> {
        Self::open(&Self::collection_path(data_dir), config)
    }

    /// Path of the `TRANSACTIONS` collection file inside `data_dir`.
    pub fn collection_path(data_dir: &Path) -> PathBuf {
        data_dir.join(format!("{TRANSACTIONS_COLLECTION}.log"))
    }

    /// Path to the log segment file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current write offset in bytes.
    pub fn offset(&self) -> StoreResult<u64> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.offset)
    }
}

impl RecordLog for FileRecordLog {
    fn append(&self, record: &TransactionRecord) -> StoreResult<u64> {
        let frame = encode_frame(record)?;

        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned)?;
        if let Some(offset) = state.broken_at {
            return Err(StoreError::Unwritable { offset });
        }
        let entry_offset = state.offset;

        if let Err(e) = append_frame(&mut state.file, entry_offset, &frame, self.config.sync_mode) {
            if matches!(e, StoreError::Unwritable { .. }) {
                state.broken_at = Some(entry_offset);
            }
            return Err(e);
        }

        state.offset += frame.len() as u64;
        state.records.push(record.clone());
        let position = (state.records.len() - 1) as u64;

        debug!(position, offset = entry_offset, len = frame.len(), "record appended");
        Ok(position)
    }

    fn get(&self, position: u64) -> StoreResult<Option<TransactionRecord>> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(usize::try_from(position)
            .ok()
            .and_then(|index| state.records.get(index))
            .cloned())
    }

    fn len(&self) -> StoreResult<u64> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.records.len() as u64)
    }

    fn scan(&self) -> StoreResult<Vec<TransactionRecord>> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(state.records.clone())
    }

    fn get_batch(&self, positions: &[u64]) -> StoreResult<Vec<Option<TransactionRecord>>> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(positions
            .iter()
            .map(|p| {
                usize::try_from(*p)
                    .ok()
                    .and_then(|index| state.records.get(index))
                    .cloned()
            })
            .collect())
    }
}

impl std::fmt::Debug for FileRecordLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRecordLog")
            .field("path", &self.path)
            .field("sync_mode", &self.config.sync_mode)
            .finish()
    }
}

/// Serialize a record into a complete `[len][crc][payload]` frame.
fn encode_frame(record: &TransactionRecord) -> StoreResult<Vec<u8>> {
    let payload =
        bincode::serialize(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
    if payload.len() > MAX_ENTRY_SIZE {
        return Err(StoreError::RecordTooLarge {
            size: payload.len(),
            max: MAX_ENTRY_SIZE,
        });
    }

    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Destination of framed entries.
trait LogSink: Write {
    /// Force written bytes to stable storage.
    fn sync(&mut self) -> io::Result<()>;

    /// Cut the sink back to `len` bytes.
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl LogSink for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Write one frame at `entry_offset`, the current end of the sink.
///
/// On a write failure the sink is cut back to `entry_offset` so the next
/// entry starts on a boundary. If that cut fails too, the sink holds a
/// partial entry and [`StoreError::Unwritable`] is returned.
fn append_frame<S: LogSink>(
    sink: &mut S,
    entry_offset: u64,
    frame: &[u8],
    sync_mode: SyncMode,
) -> StoreResult<()> {
    let Err(e) = write_frame(sink, frame, sync_mode) else {
        return Ok(());
    };
    if let Err(rollback) = sink.truncate_to(entry_offset) {
        warn!(
            offset = entry_offset,
            error = %e,
            rollback_error = %rollback,
            "failed to roll back partial append; log is now read-only"
        );
        return Err(StoreError::Unwritable {
            offset: entry_offset,
        });
    }
    Err(e.into())
}

fn write_frame<S: LogSink>(sink: &mut S, frame: &[u8], sync_mode: SyncMode) -> io::Result<()> {
    sink.write_all(frame)?;
    sink.flush()?;
    if sync_mode == SyncMode::EveryWrite {
        sink.sync()?;
    }
    Ok(())
}

struct Recovered {
    records: Vec<TransactionRecord>,
    /// Length of the prefix made of complete, valid entries.
    valid_len: u64,
}

/// Read every entry front-to-back.
///
/// Stops cleanly at a torn tail. A torn tail is a partial header, a payload
/// running past end of file, a zero-filled remainder, or a final entry whose
/// CRC does not match.
fn recover(file: &File, file_len: u64) -> StoreResult<Recovered> {
    let mut reader = BufReader::new(file);
    let mut records = Vec::new();
    let mut offset: u64 = 0;

    while offset < file_len {
        let remaining = file_len - offset;
        if remaining < HEADER_SIZE as u64 {
            warn!(offset, remaining, "partial entry header at end of log");
            break;
        }

        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header)?;
        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        if length == 0 {
            let mut rest = Vec::new();
            reader.read_to_end(&mut rest)?;
            if header.iter().chain(rest.iter()).all(|b| *b == 0) {
                warn!(offset, remaining, "zero-filled tail at end of log");
                break;
            }
            return Err(StoreError::Corruption {
                offset,
                reason: "zero entry length".into(),
            });
        }

        if length as usize > MAX_ENTRY_SIZE {
            return Err(StoreError::Corruption {
                offset,
                reason: format!("entry length {length} exceeds maximum {MAX_ENTRY_SIZE}"),
            });
        }

        let entry_end = offset + HEADER_SIZE as u64 + u64::from(length);
        if entry_end > file_len {
            warn!(offset, length, file_len, "truncated entry payload at end of log");
            break;
        }

        let mut payload = vec![0u8; length as usize];
        reader.read_exact(&mut payload)?;

        let actual_crc = crc32fast::hash(&payload);
        if actual_crc != expected_crc {
            if entry_end == file_len {
                warn!(offset, "CRC mismatch on final entry; treating as torn write");
                break;
            }
            return Err(StoreError::Corruption {
                offset,
                reason: format!(
                    "CRC mismatch: expected {expected_crc:#010x}, got {actual_crc:#010x}"
                ),
            });
        }

        let record = bincode::deserialize::<TransactionRecord>(&payload).map_err(|e| {
            StoreError::Corruption {
                offset,
                reason: format!("undecodable record: {e}"),
            }
        })?;
        records.push(record);
        offset = entry_end;
    }

    debug!(recovered = records.len(), valid_len = offset, "record log recovery complete");
    Ok(Recovered {
        records,
        valid_len: offset,
    })
}
