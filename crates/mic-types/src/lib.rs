//! # mic-types
//!
//! Type definitions for the ISO 10383 Market Identifier Code (MIC) dataset.
//!
//! One [`Mic`] type covers every published column layout; the
//! [`SchemaRevision`] a record was read under decides how its raw date
//! strings are interpreted.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!
//! ## Usage
//!
//! ```rust
//! use mic_types::{MicBuilder, MicStatus, SchemaRevision};
//!
//! let mic = MicBuilder::new(SchemaRevision::Extended, "SEBX")
//!     .operating_mic("XSTO")
//!     .market_type("SGMT")
//!     .country_code("SE")
//!     .status("ACTIVE")
//!     .creation_date("20100726")
//!     .build()
//!     .unwrap();
//!
//! assert!(mic.is_segment());
//! assert_eq!(mic.status_kind(), Some(MicStatus::Active));
//! assert_eq!(mic.creation_local_date().unwrap().to_string(), "2010-07-26");
//! ```

#![warn(missing_docs)]

mod date;
mod enums;
mod mic;
mod revision;

// Re-export all public types at crate root
pub use date::{parse_date, DateParseError, BEFORE_PREFIX};
pub use enums::{MarketType, MicStatus};
pub use mic::{Mic, MicBuildError, MicBuilder};
pub use revision::SchemaRevision;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types_are_exported() {
        let _revision = SchemaRevision::Legacy;
        let _status = MicStatus::Deleted;
        let _market_type = MarketType::Segment;
        let _builder = MicBuilder::new(SchemaRevision::Extended, "XSTO");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let mic = MicBuilder::new(SchemaRevision::Extended, "XSTO")
            .operating_mic("XSTO")
            .market_type("OPRT")
            .country_code("SE")
            .website("WWW.NASDAQOMXNORDIC.COM")
            .status("ACTIVE")
            .build()
            .unwrap();

        let json = serde_json::to_string(&mic).unwrap();
        let parsed: Mic = serde_json::from_str(&json).unwrap();
        assert_eq!(mic, parsed);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_normalizes_and_validates() {
        let parsed: Mic =
            serde_json::from_str(r#"{"revision":"legacy","mic":"XSTO","acronym":""}"#).unwrap();
        assert_eq!(parsed.acronym(), None);
        assert_eq!(parsed.revision(), SchemaRevision::Legacy);

        assert!(serde_json::from_str::<Mic>(r#"{"mic":""}"#).is_err());
    }
}
