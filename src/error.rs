use pie::PieError;
use wzmodel_common::RecordError;

/// Errors raised while loading, converting or saving models.
///
/// Nothing in this crate aborts the process; every failure surfaces as one of these.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Malformed or truncated WZM data.
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Pie(#[from] PieError),
    #[error(transparent)]
    Obj(#[from] tobj::LoadError),
    #[error("{what} index {index} out of range (0..{len})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    #[error("{array} array has {len} entries; expected 0 or {expected}")]
    MismatchedArray {
        array: &'static str,
        len: usize,
        expected: usize,
    },
    #[error("unsupported WZM version: {0}")]
    UnsupportedVersion(u32),
    #[error("unrecognised model format")]
    UnknownFormat,
    #[error("mesh index {index} out of range (0..{count})")]
    NoSuchMesh { index: usize, count: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
