// Checkpoint persistence for in-progress matches
// MessagePack + LZ4 compression with versioning and integrity checks

pub mod error;
pub mod format;

pub use error::SaveError;
pub use format::{
    decode_checkpoint, encode_checkpoint, read_checkpoint_file, write_checkpoint_file, Checkpoint,
};

pub const CHECKPOINT_VERSION: u32 = 1;
