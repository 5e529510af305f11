use thiserror::Error;

use crate::domain::{MemberId, SectorId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("name must not be blank")]
    BlankName,
    #[error("unknown member {0}")]
    UnknownMember(MemberId),
    #[error("unknown sector {0}")]
    UnknownSector(SectorId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundLimitParseError {
    #[error("round limit must be positive, got {0}")]
    NotPositive(i64),
    #[error("invalid round limit '{0}'")]
    Invalid(String),
}
