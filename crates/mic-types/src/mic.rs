//! ISO 10383 MIC record type.
//!
//! This module provides the [`Mic`] struct representing one row of the MIC
//! dataset, and [`MicBuilder`], the only way to construct one.

use std::fmt;

use chrono::NaiveDate;

use crate::{parse_date, DateParseError, MarketType, MicStatus, SchemaRevision};

/// Error returned by [`MicBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MicBuildError {
    /// The MIC code was empty or blank.
    EmptyMic,
}

impl fmt::Display for MicBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMic => write!(f, "MIC code must not be empty"),
        }
    }
}

impl std::error::Error for MicBuildError {}

/// One entry of the ISO 10383 Market Identifier Code dataset.
///
/// A single type covers every schema revision: attributes that only exist in
/// some revisions are optional. Optional attributes are never `Some("")`;
/// blank source text is stored as `None`.
///
/// Equality and hashing cover every attribute, including the revision the
/// record was read under.
///
/// # Examples
///
/// ```
/// use mic_types::{MicBuilder, SchemaRevision};
///
/// let mic = MicBuilder::new(SchemaRevision::Extended, "XSTO")
///     .operating_mic("XSTO")
///     .market_type("OPRT")
///     .country_code("SE")
///     .status("ACTIVE")
///     .creation_date("20100726")
///     .acronym("")
///     .build()
///     .unwrap();
///
/// assert!(mic.is_active());
/// assert!(mic.is_operating());
/// assert_eq!(mic.acronym(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "MicBuilder"))]
pub struct Mic {
    revision: SchemaRevision,
    mic: String,
    operating_mic: String,
    market_type: String,
    name_institution_description: String,
    legal_entity_name: Option<String>,
    lei_code: Option<String>,
    market_category_code: Option<String>,
    acronym: Option<String>,
    country: Option<String>,
    country_code: String,
    city: String,
    website: Option<String>,
    status: String,
    creation_date: String,
    last_update_date: String,
    last_validation_date: Option<String>,
    expiry_date: Option<String>,
    comments: Option<String>,
}

impl Mic {
    /// Schema revision this record was read under.
    pub fn revision(&self) -> SchemaRevision {
        self.revision
    }

    /// Market Identifier Code allocated to the market.
    pub fn mic(&self) -> &str {
        &self.mic
    }

    /// MIC representing the market at operating level.
    ///
    /// Equal to [`Mic::mic`] for operating-level entries.
    pub fn operating_mic(&self) -> &str {
        &self.operating_mic
    }

    /// Raw market type code (`OPRT`/`SGMT`, or `O`/`S` in the legacy revision).
    pub fn market_type(&self) -> &str {
        &self.market_type
    }

    /// Typed market type, `None` for an unrecognized code.
    pub fn market_type_kind(&self) -> Option<MarketType> {
        MarketType::from_code(&self.market_type)
    }

    /// Returns true if this is an operating-level MIC.
    pub fn is_operating(&self) -> bool {
        self.market_type_kind() == Some(MarketType::Operating)
    }

    /// Returns true if this is a market segment MIC.
    pub fn is_segment(&self) -> bool {
        self.market_type_kind() == Some(MarketType::Segment)
    }

    /// Institution description of the market.
    pub fn name_institution_description(&self) -> &str {
        &self.name_institution_description
    }

    /// Legal entity name (extended revision).
    pub fn legal_entity_name(&self) -> Option<&str> {
        self.legal_entity_name.as_deref()
    }

    /// Legal Entity Identifier (extended revision).
    pub fn lei_code(&self) -> Option<&str> {
        self.lei_code.as_deref()
    }

    /// Market category code (extended revision).
    pub fn market_category_code(&self) -> Option<&str> {
        self.market_category_code.as_deref()
    }

    /// Known acronym of the market.
    pub fn acronym(&self) -> Option<&str> {
        self.acronym.as_deref()
    }

    /// Country name (legacy revision).
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// ISO 3166-1 alpha-2 code of the country where the market is registered.
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// City where the market is located.
    pub fn city(&self) -> &str {
        &self.city
    }

    /// Website of the market.
    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    /// Raw status literal.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Typed status, `None` for an unrecognized literal.
    pub fn status_kind(&self) -> Option<MicStatus> {
        MicStatus::from_literal(&self.status)
    }

    /// Returns true if the status is `ACTIVE`.
    pub fn is_active(&self) -> bool {
        self.status == MicStatus::ACTIVE
    }

    /// Returns true if the status is `EXPIRED`.
    pub fn is_expired(&self) -> bool {
        self.status == MicStatus::EXPIRED
    }

    /// Returns true if the status is `UPDATED`.
    pub fn is_updated(&self) -> bool {
        self.status == MicStatus::UPDATED
    }

    /// Returns true if the status is `MODIFIED` (legacy revision).
    pub fn is_modified(&self) -> bool {
        self.status == MicStatus::MODIFIED
    }

    /// Returns true if the status is `DELETED` (legacy revision).
    pub fn is_deleted(&self) -> bool {
        self.status == MicStatus::DELETED
    }

    /// Raw creation date.
    pub fn creation_date(&self) -> &str {
        &self.creation_date
    }

    /// Creation date as a calendar date.
    pub fn creation_local_date(&self) -> Result<NaiveDate, DateParseError> {
        parse_date(&self.creation_date, self.revision)
    }

    /// Raw last update date (the STATUS DATE column in the legacy revision).
    pub fn last_update_date(&self) -> &str {
        &self.last_update_date
    }

    /// Last update date as a calendar date.
    pub fn last_update_local_date(&self) -> Result<NaiveDate, DateParseError> {
        parse_date(&self.last_update_date, self.revision)
    }

    /// Raw last validation date (extended revision).
    pub fn last_validation_date(&self) -> Option<&str> {
        self.last_validation_date.as_deref()
    }

    /// Last validation date as a calendar date, `Ok(None)` when absent.
    pub fn last_validation_local_date(&self) -> Result<Option<NaiveDate>, DateParseError> {
        self.parse_optional(self.last_validation_date.as_deref())
    }

    /// Raw expiry date (extended revision).
    pub fn expiry_date(&self) -> Option<&str> {
        self.expiry_date.as_deref()
    }

    /// Expiry date as a calendar date, `Ok(None)` when absent.
    pub fn expiry_local_date(&self) -> Result<Option<NaiveDate>, DateParseError> {
        self.parse_optional(self.expiry_date.as_deref())
    }

    /// Comments attached to the entry during its lifetime.
    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }

    fn parse_optional(&self, raw: Option<&str>) -> Result<Option<NaiveDate>, DateParseError> {
        raw.map(|value| parse_date(value, self.revision)).transpose()
    }
}

/// Builder for [`Mic`].
///
/// Setters take the raw column text. Attributes that are never set default
/// to an empty string (required attributes) or `None` (optional ones).
/// [`MicBuilder::build`] turns blank optional text into `None`.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MicBuilder {
    revision: SchemaRevision,
    mic: String,
    operating_mic: String,
    market_type: String,
    name_institution_description: String,
    legal_entity_name: Option<String>,
    lei_code: Option<String>,
    market_category_code: Option<String>,
    acronym: Option<String>,
    country: Option<String>,
    country_code: String,
    city: String,
    website: Option<String>,
    status: String,
    creation_date: String,
    last_update_date: String,
    last_validation_date: Option<String>,
    expiry_date: Option<String>,
    comments: Option<String>,
}

impl MicBuilder {
    /// Starts a record for the given revision and MIC code.
    pub fn new(revision: SchemaRevision, mic: impl Into<String>) -> Self {
        Self {
            revision,
            mic: mic.into(),
            ..Self::default()
        }
    }

    /// Sets the operating MIC.
    pub fn operating_mic(mut self, value: impl Into<String>) -> Self {
        self.operating_mic = value.into();
        self
    }

    /// Sets the raw market type code.
    pub fn market_type(mut self, value: impl Into<String>) -> Self {
        self.market_type = value.into();
        self
    }

    /// Sets the institution description.
    pub fn name_institution_description(mut self, value: impl Into<String>) -> Self {
        self.name_institution_description = value.into();
        self
    }

    /// Sets the legal entity name.
    pub fn legal_entity_name(mut self, value: impl Into<String>) -> Self {
        self.legal_entity_name = Some(value.into());
        self
    }

    /// Sets the LEI code.
    pub fn lei_code(mut self, value: impl Into<String>) -> Self {
        self.lei_code = Some(value.into());
        self
    }

    /// Sets the market category code.
    pub fn market_category_code(mut self, value: impl Into<String>) -> Self {
        self.market_category_code = Some(value.into());
        self
    }

    /// Sets the acronym.
    pub fn acronym(mut self, value: impl Into<String>) -> Self {
        self.acronym = Some(value.into());
        self
    }

    /// Sets the country name.
    pub fn country(mut self, value: impl Into<String>) -> Self {
        self.country = Some(value.into());
        self
    }

    /// Sets the ISO country code.
    pub fn country_code(mut self, value: impl Into<String>) -> Self {
        self.country_code = value.into();
        self
    }

    /// Sets the city.
    pub fn city(mut self, value: impl Into<String>) -> Self {
        self.city = value.into();
        self
    }

    /// Sets the website.
    pub fn website(mut self, value: impl Into<String>) -> Self {
        self.website = Some(value.into());
        self
    }

    /// Sets the raw status literal.
    pub fn status(mut self, value: impl Into<String>) -> Self {
        self.status = value.into();
        self
    }

    /// Sets the raw creation date.
    pub fn creation_date(mut self, value: impl Into<String>) -> Self {
        self.creation_date = value.into();
        self
    }

    /// Sets the raw last update (legacy: status) date.
    pub fn last_update_date(mut self, value: impl Into<String>) -> Self {
        self.last_update_date = value.into();
        self
    }

    /// Sets the raw last validation date.
    pub fn last_validation_date(mut self, value: impl Into<String>) -> Self {
        self.last_validation_date = Some(value.into());
        self
    }

    /// Sets the raw expiry date.
    pub fn expiry_date(mut self, value: impl Into<String>) -> Self {
        self.expiry_date = Some(value.into());
        self
    }

    /// Sets the comments.
    pub fn comments(mut self, value: impl Into<String>) -> Self {
        self.comments = Some(value.into());
        self
    }

    /// Builds the record.
    ///
    /// # Errors
    /// Returns [`MicBuildError::EmptyMic`] if the MIC code is blank.
    pub fn build(self) -> Result<Mic, MicBuildError> {
        if self.mic.trim().is_empty() {
            return Err(MicBuildError::EmptyMic);
        }

        Ok(Mic {
            revision: self.revision,
            mic: self.mic,
            operating_mic: self.operating_mic,
            market_type: self.market_type,
            name_institution_description: self.name_institution_description,
            legal_entity_name: non_blank(self.legal_entity_name),
            lei_code: non_blank(self.lei_code),
            market_category_code: non_blank(self.market_category_code),
            acronym: non_blank(self.acronym),
            country: non_blank(self.country),
            country_code: self.country_code,
            city: self.city,
            website: non_blank(self.website),
            status: self.status,
            creation_date: self.creation_date,
            last_update_date: self.last_update_date,
            last_validation_date: non_blank(self.last_validation_date),
            expiry_date: non_blank(self.expiry_date),
            comments: non_blank(self.comments),
        })
    }
}

impl TryFrom<MicBuilder> for Mic {
    type Error = MicBuildError;

    fn try_from(builder: MicBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn make_xsto() -> MicBuilder {
        MicBuilder::new(SchemaRevision::Extended, "XSTO")
            .operating_mic("XSTO")
            .market_type("OPRT")
            .name_institution_description("NASDAQ STOCKHOLM AB")
            .legal_entity_name("NASDAQ STOCKHOLM AB")
            .lei_code("549300HMAJW3BRXQJ243")
            .market_category_code("RMKT")
            .country_code("SE")
            .city("STOCKHOLM")
            .website("WWW.NASDAQOMXNORDIC.COM")
            .status("ACTIVE")
            .creation_date("20100726")
            .last_update_date("20211001")
            .last_validation_date("20211001")
    }

    fn hash_of(mic: &Mic) -> u64 {
        let mut hasher = DefaultHasher::new();
        mic.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_accessors() {
        let mic = make_xsto().build().unwrap();
        assert_eq!(mic.mic(), "XSTO");
        assert_eq!(mic.operating_mic(), "XSTO");
        assert_eq!(mic.country_code(), "SE");
        assert_eq!(mic.city(), "STOCKHOLM");
        assert_eq!(mic.website(), Some("WWW.NASDAQOMXNORDIC.COM"));
        assert_eq!(mic.acronym(), None);
        assert_eq!(mic.comments(), None);
        assert_eq!(mic.country(), None);
        assert_eq!(mic.market_type_kind(), Some(MarketType::Operating));
        assert!(mic.is_operating());
        assert!(!mic.is_segment());
    }

    #[test]
    fn test_status_predicates() {
        let mic = make_xsto().build().unwrap();
        assert!(mic.is_active());
        assert!(!mic.is_expired());
        assert!(!mic.is_updated());
        assert_eq!(mic.status_kind(), Some(MicStatus::Active));

        let unknown = make_xsto().status("SUSPENDED").build().unwrap();
        assert!(!unknown.is_active());
        assert_eq!(unknown.status_kind(), None);
        assert_eq!(unknown.status(), "SUSPENDED");
    }

    #[test]
    fn test_blank_optional_is_none() {
        let empty = make_xsto().acronym("").comments("   ").build().unwrap();
        let absent = make_xsto().build().unwrap();

        assert_eq!(empty.acronym(), None);
        assert_eq!(empty.comments(), None);
        assert_eq!(empty, absent);
        assert_eq!(hash_of(&empty), hash_of(&absent));
    }

    #[test]
    fn test_equality_covers_every_attribute() {
        let a = make_xsto().build().unwrap();
        let b = make_xsto().build().unwrap();
        let c = make_xsto().acronym("S3").build().unwrap();
        let d = make_xsto().market_type("SGMT").build().unwrap();
        let legacy = MicBuilder {
            revision: SchemaRevision::Legacy,
            ..make_xsto()
        }
        .build()
        .unwrap();

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_ne!(a, legacy);
    }

    #[test]
    fn test_empty_mic_rejected() {
        assert_eq!(
            MicBuilder::new(SchemaRevision::Extended, "").build(),
            Err(MicBuildError::EmptyMic)
        );
        assert_eq!(
            MicBuilder::new(SchemaRevision::Legacy, "  ").build(),
            Err(MicBuildError::EmptyMic)
        );
    }

    #[test]
    fn test_derived_dates() {
        let mic = make_xsto().build().unwrap();
        assert_eq!(
            mic.creation_local_date().unwrap(),
            NaiveDate::from_ymd_opt(2010, 7, 26).unwrap()
        );
        assert_eq!(
            mic.last_validation_local_date().unwrap(),
            NaiveDate::from_ymd_opt(2021, 10, 1)
        );
        assert_eq!(mic.expiry_local_date().unwrap(), None);

        let bad = make_xsto().expiry_date("SOON").build().unwrap();
        assert!(bad.expiry_local_date().is_err());
    }

    #[test]
    fn test_legacy_record_dates() {
        let mic = MicBuilder::new(SchemaRevision::Legacy, "XSTO")
            .country("SWEDEN")
            .market_type("O")
            .status("MODIFIED")
            .creation_date("BEFORE JUNE 2005")
            .last_update_date("DECEMBER 2015")
            .build()
            .unwrap();

        assert!(mic.is_modified());
        assert!(mic.is_operating());
        assert_eq!(mic.country(), Some("SWEDEN"));
        assert_eq!(
            mic.creation_local_date().unwrap(),
            NaiveDate::from_ymd_opt(2005, 6, 1).unwrap()
        );
        assert_eq!(
            mic.last_update_local_date().unwrap(),
            NaiveDate::from_ymd_opt(2015, 12, 1).unwrap()
        );
    }
}
