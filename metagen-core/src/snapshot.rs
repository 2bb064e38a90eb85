//! Versioned on-disk envelope for built structures.
//!
//! Layout: `MGSN` magic, `u16` schema version (little endian), `u8` payload
//! kind, then the bincode encoded payload. The envelope is decoupled from the
//! in-memory shape of the payload: bumping [`SNAPSHOT_VERSION`] is the only
//! way a payload layout may change.
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::SnapshotError;

pub const SNAPSHOT_MAGIC: &[u8; 4] = b"MGSN";
pub const SNAPSHOT_VERSION: u16 = 1;

/// Payload kinds that can be stored in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SnapshotKind {
    ShiftRegistry = 0x01,
    IntervalList = 0x02,
    RepeatFamilyList = 0x03,
    SnpList = 0x04,
    GeneList = 0x05,
}

/// A type that can be written in a snapshot envelope.
pub trait Snapshot: Serialize + DeserializeOwned {
    const KIND: SnapshotKind;
}

pub fn write_snapshot<T: Snapshot, W: Write>(value: &T, mut writer: W) -> Result<(), SnapshotError> {
    writer.write_all(SNAPSHOT_MAGIC)?;
    writer.write_u16::<LittleEndian>(SNAPSHOT_VERSION)?;
    writer.write_u8(T::KIND as u8)?;
    bincode::serialize_into(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

pub fn read_snapshot<T: Snapshot, R: Read>(mut reader: R) -> Result<T, SnapshotError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != SNAPSHOT_MAGIC {
        return Err(SnapshotError::InvalidMagic);
    }

    let version = reader.read_u16::<LittleEndian>()?;
    if version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(version));
    }

    let kind = reader.read_u8()?;
    if kind != T::KIND as u8 {
        return Err(SnapshotError::KindMismatch {
            expected: T::KIND as u8,
            found: kind,
        });
    }

    Ok(bincode::deserialize_from(reader)?)
}

///
/// Write a snapshot to disk, creating parent folders as needed.
///
pub fn save_snapshot<T: Snapshot, P: AsRef<Path>>(value: &T, path: P) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_snapshot(value, BufWriter::new(file))
}

pub fn load_snapshot<T: Snapshot, P: AsRef<Path>>(path: P) -> Result<T, SnapshotError> {
    let file = File::open(path.as_ref())?;
    read_snapshot(BufReader::new(file))
}
