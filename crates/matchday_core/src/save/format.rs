//! Checkpoint byte layout: `lz4(size-prepended msgpack(Checkpoint)) ‖ sha256`.

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use super::error::SaveError;
use super::CHECKPOINT_VERSION;
use crate::models::{MatchId, MatchRecord};

const CHECKSUM_LEN: usize = 32;
/// LZ4 size prefix.
const SIZE_PREFIX_LEN: usize = 4;

/// Envelope written around a match record.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Checkpoint {
    pub version: u32,
    /// Duplicated from the record so a reader can tell which match a file
    /// belongs to before trusting the record body.
    pub match_id: MatchId,
    pub record: MatchRecord,
}

impl Checkpoint {
    pub fn new(record: MatchRecord) -> Self {
        Self { version: CHECKPOINT_VERSION, match_id: record.id(), record }
    }

    /// Cheap structural checks. Draw accounting and lineup replay are left to
    /// the engine, which verifies every record it resumes.
    pub fn validate(&self) -> Result<(), SaveError> {
        let record = &self.record;
        if self.match_id != record.id() {
            return Err(SaveError::InconsistentRecord(format!(
                "envelope names match {} but the record is match {}",
                self.match_id,
                record.id()
            )));
        }
        if record.events.len() != record.current_turn as usize {
            return Err(SaveError::InconsistentRecord(format!(
                "{} events for {} turns",
                record.events.len(),
                record.current_turn
            )));
        }
        if record.shootout.is_none() && !record.penalties.is_empty() {
            return Err(SaveError::InconsistentRecord("penalties logged without a shootout".into()));
        }
        Ok(())
    }
}

pub fn encode_checkpoint(record: &MatchRecord) -> Result<Vec<u8>, SaveError> {
    let checkpoint = Checkpoint::new(record.clone());
    checkpoint.validate()?;

    let mut bytes = compress_prepend_size(&to_vec_named(&checkpoint)?);
    let checksum = Sha256::digest(&bytes);
    bytes.extend_from_slice(&checksum);
    Ok(bytes)
}

pub fn decode_checkpoint(bytes: &[u8]) -> Result<MatchRecord, SaveError> {
    if bytes.len() < SIZE_PREFIX_LEN + CHECKSUM_LEN {
        return Err(SaveError::Truncated { len: bytes.len() });
    }
    let (payload, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    if Sha256::digest(payload).as_slice() != checksum {
        return Err(SaveError::ChecksumMismatch);
    }

    let msgpack =
        decompress_size_prepended(payload).map_err(|e| SaveError::Decompression(e.to_string()))?;
    let checkpoint: Checkpoint = from_slice(&msgpack)?;
    if checkpoint.version > CHECKPOINT_VERSION {
        return Err(SaveError::UnsupportedVersion {
            found: checkpoint.version,
            supported: CHECKPOINT_VERSION,
        });
    }
    checkpoint.validate()?;
    Ok(checkpoint.record)
}

/// Writes through a sibling temp file and renames, so a crash mid-write
/// leaves the previous checkpoint intact.
pub fn write_checkpoint_file(path: &Path, record: &MatchRecord) -> Result<(), SaveError> {
    let bytes = encode_checkpoint(record)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn read_checkpoint_file(path: &Path) -> Result<MatchRecord, SaveError> {
    decode_checkpoint(&fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::match_sim::test_fixtures::{create_test_record, create_test_sheets, play_out};

    fn seal(checkpoint: &Checkpoint) -> Vec<u8> {
        let mut bytes = compress_prepend_size(&to_vec_named(checkpoint).unwrap());
        let checksum = Sha256::digest(&bytes);
        bytes.extend_from_slice(&checksum);
        bytes
    }

    #[test]
    fn test_finished_match_survives_codec() {
        let sheets = create_test_sheets();
        let mut record = create_test_record(21);
        play_out(&mut record, &sheets);

        let bytes = encode_checkpoint(&record).unwrap();
        assert_eq!(decode_checkpoint(&bytes).unwrap(), record);
    }

    #[test]
    fn test_damaged_bytes_are_detected() {
        let record = create_test_record(3);
        let mut bytes = encode_checkpoint(&record).unwrap();
        bytes[6] ^= 0xFF;
        assert!(matches!(decode_checkpoint(&bytes), Err(SaveError::ChecksumMismatch)));
        assert!(matches!(decode_checkpoint(&bytes[..10]), Err(SaveError::Truncated { len: 10 })));
    }

    #[test]
    fn test_inconsistent_record_is_refused() {
        let mut record = create_test_record(3);
        record.current_turn = 4;
        assert!(matches!(encode_checkpoint(&record), Err(SaveError::InconsistentRecord(_))));

        let mut checkpoint = Checkpoint::new(create_test_record(3));
        checkpoint.match_id = MatchId(999);
        assert!(matches!(
            decode_checkpoint(&seal(&checkpoint)),
            Err(SaveError::InconsistentRecord(_))
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.ckpt");
        let record = create_test_record(8);
        write_checkpoint_file(&path, &record).unwrap();
        assert_eq!(read_checkpoint_file(&path).unwrap(), record);
        assert!(!path.with_extension("tmp").exists());
        assert!(matches!(
            read_checkpoint_file(&dir.path().join("missing.ckpt")),
            Err(SaveError::Io(_))
        ));
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let mut checkpoint = Checkpoint::new(create_test_record(3));
        checkpoint.version = CHECKPOINT_VERSION + 1;
        assert!(matches!(
            decode_checkpoint(&seal(&checkpoint)),
            Err(SaveError::UnsupportedVersion { found: 2, supported: 1 })
        ));
    }
}
