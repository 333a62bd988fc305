//! MIC enumeration types.
//!
//! The dataset carries these values as literal strings. The enums here give
//! the known literals a typed form; unknown literals map to `None` and the
//! raw string stays available on the record.

/// Status of a MIC entry.
///
/// The extended revision uses ACTIVE / EXPIRED / UPDATED, the legacy
/// revision ACTIVE / MODIFIED / DELETED.
///
/// # Examples
///
/// ```
/// use mic_types::MicStatus;
///
/// assert_eq!(MicStatus::from_literal("EXPIRED"), Some(MicStatus::Expired));
/// assert_eq!(MicStatus::from_literal("RETIRED"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MicStatus {
    /// The MIC is in use.
    Active,
    /// The MIC has been retired.
    Expired,
    /// The entry changed in the latest publication.
    Updated,
    /// Legacy revision: the entry changed.
    Modified,
    /// Legacy revision: the MIC has been removed.
    Deleted,
}

impl MicStatus {
    /// Literal for [`MicStatus::Active`].
    pub const ACTIVE: &'static str = "ACTIVE";
    /// Literal for [`MicStatus::Expired`].
    pub const EXPIRED: &'static str = "EXPIRED";
    /// Literal for [`MicStatus::Updated`].
    pub const UPDATED: &'static str = "UPDATED";
    /// Literal for [`MicStatus::Modified`].
    pub const MODIFIED: &'static str = "MODIFIED";
    /// Literal for [`MicStatus::Deleted`].
    pub const DELETED: &'static str = "DELETED";

    /// Creates a status from its dataset literal.
    ///
    /// Matching is exact; returns `None` for anything else.
    pub fn from_literal(literal: &str) -> Option<Self> {
        match literal {
            Self::ACTIVE => Some(Self::Active),
            Self::EXPIRED => Some(Self::Expired),
            Self::UPDATED => Some(Self::Updated),
            Self::MODIFIED => Some(Self::Modified),
            Self::DELETED => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Returns the dataset literal for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => Self::ACTIVE,
            Self::Expired => Self::EXPIRED,
            Self::Updated => Self::UPDATED,
            Self::Modified => Self::MODIFIED,
            Self::Deleted => Self::DELETED,
        }
    }
}

/// Granularity of a MIC: an operating market or a segment of one.
///
/// # Examples
///
/// ```
/// use mic_types::MarketType;
///
/// assert_eq!(MarketType::from_code("OPRT"), Some(MarketType::Operating));
/// assert_eq!(MarketType::from_code("S"), Some(MarketType::Segment));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarketType {
    /// Operating level market.
    Operating,
    /// Market segment belonging to an operating MIC.
    Segment,
}

impl MarketType {
    /// Extended revision code for an operating MIC.
    pub const OPERATING_CODE: &'static str = "OPRT";
    /// Extended revision code for a segment MIC.
    pub const SEGMENT_CODE: &'static str = "SGMT";
    /// Legacy revision code for an operating MIC.
    pub const LEGACY_OPERATING_CODE: &'static str = "O";
    /// Legacy revision code for a segment MIC.
    pub const LEGACY_SEGMENT_CODE: &'static str = "S";

    /// Creates a market type from either revision's code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            Self::OPERATING_CODE | Self::LEGACY_OPERATING_CODE => Some(Self::Operating),
            Self::SEGMENT_CODE | Self::LEGACY_SEGMENT_CODE => Some(Self::Segment),
            _ => None,
        }
    }
}
