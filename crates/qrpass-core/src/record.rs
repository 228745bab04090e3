//! # Trip Records and Scan History
//!
//! [`TripRecord`] is what a provider registers when it generates a pass.
//! Once stored it is immutable, and its canonical serialization is the
//! digest input. [`HistoryEntry`] is written once per successful scan.
//!
//! ## Canonical Form
//!
//! The digest covers all nine record fields with camelCase keys. Absent
//! location attributes serialize as `null`, so the key set never varies.
//! Location strings are trimmed and empty strings become `null` before the
//! record is built, so two requests carrying the same information always
//! yield the same digest.
//!
//! ## Trust Boundary at Scan Time
//!
//! [`ScanContext`] carries only location attributes. Identifier fields sent
//! by a scanning client are not part of the type and are dropped during
//! deserialization; identifiers always come from the resolved record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalBytes;
use crate::digest::{sha256_digest, ContentDigest};
use crate::error::{CanonicalizationError, ValidationError};
use crate::identity::{ClientId, DriverId, HistoryId, ProviderName, TripId};

/// A registered transport trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    pub client_id: ClientId,
    pub driver_id: DriverId,
    pub trip_id: TripId,
    pub place: Option<String>,
    pub date: Option<String>,
    pub hour: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    /// The provider that generated the pass.
    pub provider: ProviderName,
}

impl TripRecord {
    /// Canonical bytes of this record, the input to [`TripRecord::digest`].
    pub fn canonical_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }

    /// SHA-256 digest of the canonical form.
    ///
    /// The error arm is unreachable for records built through
    /// [`TripRequest::into_record`]; callers treat it as fatal.
    pub fn digest(&self) -> Result<ContentDigest, CanonicalizationError> {
        Ok(sha256_digest(&self.canonical_bytes()?))
    }
}

/// The body of a generation request.
///
/// Every field is optional on the wire so that a missing identifier surfaces
/// as [`ValidationError::MissingField`] instead of a JSON parse failure.
/// Accepts the legacy field names (`chauffeurId`, `courseId`, `lieu`,
/// `heure`, `ville`, `pays`) as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub client_id: Option<i64>,
    #[serde(alias = "chauffeurId")]
    pub driver_id: Option<i64>,
    #[serde(alias = "courseId")]
    pub trip_id: Option<i64>,
    #[serde(alias = "lieu")]
    pub place: Option<String>,
    pub date: Option<String>,
    #[serde(alias = "heure")]
    pub hour: Option<String>,
    #[serde(alias = "ville")]
    pub city: Option<String>,
    #[serde(alias = "pays")]
    pub country: Option<String>,
}

impl TripRequest {
    /// Validate the request and bind it to the authenticated provider.
    ///
    /// Any provider named in the request body is ignored.
    pub fn into_record(self, provider: ProviderName) -> Result<TripRecord, ValidationError> {
        Ok(TripRecord {
            client_id: ClientId::new(self.client_id.ok_or(ValidationError::MissingField("clientId"))?),
            driver_id: DriverId::new(self.driver_id.ok_or(ValidationError::MissingField("driverId"))?),
            trip_id: TripId::new(self.trip_id.ok_or(ValidationError::MissingField("tripId"))?),
            place: normalize(self.place),
            date: normalize(self.date),
            hour: normalize(self.hour),
            city: normalize(self.city),
            country: normalize(self.country),
            provider,
        })
    }
}

/// Caller-supplied partial history for a scan: where and when it happened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanContext {
    #[serde(alias = "lieu")]
    pub place: Option<String>,
    pub date: Option<String>,
    #[serde(alias = "heure")]
    pub hour: Option<String>,
    #[serde(alias = "ville")]
    pub city: Option<String>,
    #[serde(alias = "pays")]
    pub country: Option<String>,
}

/// An append-only record of a successful scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: HistoryId,
    pub client_id: ClientId,
    pub driver_id: DriverId,
    pub trip_id: TripId,
    /// The provider that owns the scanned record.
    pub provider: ProviderName,
    pub place: Option<String>,
    pub hour: Option<String>,
    pub date: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    /// The provider whose device performed the scan.
    pub scanned_by: ProviderName,
    pub scanned_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Build a history entry from a resolved record.
    ///
    /// Identifiers and provider come from `record` only. Location attributes
    /// come from `record` where present and fall back to `context`.
    pub fn from_scan(
        record: &TripRecord,
        context: ScanContext,
        scanned_by: ProviderName,
        scanned_at: DateTime<Utc>,
    ) -> Self {
        let pick = |stored: &Option<String>, supplied: Option<String>| {
            stored.clone().or_else(|| normalize(supplied))
        };
        Self {
            id: HistoryId::new(),
            client_id: record.client_id,
            driver_id: record.driver_id,
            trip_id: record.trip_id,
            provider: record.provider.clone(),
            place: pick(&record.place, context.place),
            hour: pick(&record.hour, context.hour),
            date: pick(&record.date, context.date),
            city: pick(&record.city, context.city),
            country: pick(&record.country, context.country),
            scanned_by,
            scanned_at,
        }
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
