use wzmodel_common::RecordError;

use crate::PieVersion;

/// Errors related to reading and writing PIE data.
#[derive(Debug, thiserror::Error)]
pub enum PieError {
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("stream does not start with a PIE signature")]
    NotPie,
    #[error("unknown PIE version: {0}")]
    UnknownVersion(u32),
    #[error("expected a PIE {expected} stream, found PIE {found}")]
    VersionMismatch { expected: PieVersion, found: u32 },
    #[error("{feature} cannot be stored in PIE {version}")]
    Unsupported {
        version: PieVersion,
        feature: &'static str,
    },
    #[error("level {level}, polygon {polygon}: point index {index} out of range (0..{points})")]
    PointOutOfRange {
        level: usize,
        polygon: usize,
        index: u32,
        points: usize,
    },
}
