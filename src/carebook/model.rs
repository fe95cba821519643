//! # Record Model
//!
//! Records arrive from the backend as loosely-typed documents. They are decoded
//! once, at the store boundary, into a closed set of types so that the query
//! engine never handles untyped data:
//!
//! - [`Report`]: a home-care visit or event report (`Reports` collection)
//! - [`Patient`]: a registered patient (`patients` collection)
//! - [`Record`]: the tagged union the engine operates on
//!
//! Field names in the serde attributes are contract points with the backend
//! schema and must not change.
//!
//! ## Lenient Decoding
//!
//! Documents are written by several client versions, so a field can hold a
//! number where a string is expected, or a nested object where a scalar is
//! expected. Scalars are coerced to text where that is lossless; anything else
//! decodes as absent instead of failing the whole document.

use crate::error::{CareError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    Reports,
    Patients,
}

impl Collection {
    /// Collection name as known to the backend.
    pub fn store_name(&self) -> &'static str {
        match self {
            Collection::Reports => "Reports",
            Collection::Patients => "patients",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Reports => write!(f, "reports"),
            Collection::Patients => write!(f, "patients"),
        }
    }
}

impl FromStr for Collection {
    type Err = CareError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "reports" | "report" => Ok(Collection::Reports),
            "patients" | "patient" => Ok(Collection::Patients),
            other => Err(CareError::InvalidInput(format!(
                "Unknown collection '{}' (expected reports or patients)",
                other
            ))),
        }
    }
}

/// The kinds of report a visit can produce. Each has its own detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormType {
    Nhc,
    NhcE,
    Dhc,
    ProgressionReport,
    SocialReport,
    Vhc,
    Gvhc,
    Investigation,
    Death,
}

impl FormType {
    pub const ALL: [FormType; 9] = [
        FormType::Nhc,
        FormType::NhcE,
        FormType::Dhc,
        FormType::ProgressionReport,
        FormType::SocialReport,
        FormType::Vhc,
        FormType::Gvhc,
        FormType::Investigation,
        FormType::Death,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::Nhc => "NHC",
            FormType::NhcE => "NHC(E)",
            FormType::Dhc => "DHC",
            FormType::ProgressionReport => "PROGRESSION REPORT",
            FormType::SocialReport => "SOCIAL REPORT",
            FormType::Vhc => "VHC",
            FormType::Gvhc => "GVHC",
            FormType::Investigation => "INVESTIGATION",
            FormType::Death => "DEATH",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormType {
    type Err = CareError;

    /// Exact, case-sensitive match against the wire values.
    fn from_str(s: &str) -> Result<Self> {
        FormType::ALL
            .iter()
            .copied()
            .find(|ft| ft.as_str() == s)
            .ok_or_else(|| CareError::InvalidInput(format!("Unknown form type '{}'", s)))
    }
}

/// A timestamp as stored by the backend.
///
/// Kept in its original shape; [`DocTime::resolve`] interprets it. A value
/// that resolves to `None` is an invalid date, not a missing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocTime {
    Millis(f64),
    Stamp {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    Text(String),
    Other(Value),
}

impl DocTime {
    pub fn resolve(&self) -> Option<DateTime<Utc>> {
        match self {
            DocTime::Millis(ms) if ms.is_finite() => {
                Utc.timestamp_millis_opt(ms.trunc() as i64).single()
            }
            DocTime::Millis(_) => None,
            DocTime::Stamp {
                seconds,
                nanoseconds,
            } => Utc.timestamp_opt(*seconds, *nanoseconds).single(),
            DocTime::Text(text) => parse_timestamp(text),
            DocTime::Other(_) => None,
        }
    }
}

/// Parses the textual timestamp shapes written by the clients. Naive values are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar_text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(Option::<Value>::deserialize(d)?.and_then(scalar_text))
    }

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(text(d)?.unwrap_or_default())
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Bool(b)) => Some(b),
            Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            Some(Value::Number(n)) => n.as_i64().map(|n| n != 0),
            _ => None,
        })
    }

    pub fn nested<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(Option::<Value>::deserialize(d)?.and_then(|v| serde_json::from_value(v).ok()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicDetails {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub panchayath: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub ward: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(
        rename = "registernumber",
        alias = "registrationNumber",
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub registernumber: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub main_diagnosis: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub main_caretaker_phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag", skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<DocTime>,
    #[serde(
        rename = "basicDetailsModel",
        default,
        deserialize_with = "lenient::nested",
        skip_serializing_if = "Option::is_none"
    )]
    pub basic_details: Option<BasicDetails>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Patient {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.basic_details.as_ref()?.name.as_deref())
    }

    pub fn address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .or_else(|| self.basic_details.as_ref()?.address.as_deref())
    }

    pub fn phone(&self) -> Option<&str> {
        self.main_caretaker_phone
            .as_deref()
            .or_else(|| self.basic_details.as_ref()?.phone_number.as_deref())
    }

    pub fn is_active(&self) -> bool {
        !self.deactivated.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub bp: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub pulse: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub rr: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub spo: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub grbs: Option<String>,
}

impl Vitals {
    pub fn is_empty(&self) -> bool {
        self == &Vitals::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelfareSchemes {
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub government: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub non_government: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub other_agencies: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub financial_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub ration_card_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub ration_card_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Raw wire value; unknown types are kept so they can fall back to the default route.
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub form_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DocTime>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub registernumber: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub main_diagnosis: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(flatten)]
    pub vitals: Vitals,
    #[serde(
        default,
        deserialize_with = "lenient::nested",
        skip_serializing_if = "Option::is_none"
    )]
    pub welfare_schemes: Option<WelfareSchemes>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Report {
    pub fn new(id: impl Into<String>, name: impl Into<String>, form_type: FormType) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            form_type: Some(form_type.as_str().to_string()),
            ..Default::default()
        }
    }

    pub fn kind(&self) -> Option<FormType> {
        self.form_type.as_deref()?.parse().ok()
    }
}

/// A decoded document from either collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Report(Report),
    Patient(Patient),
}

impl Record {
    /// Decodes a raw backend document. The document id is authoritative over
    /// any `id` key inside the body.
    pub fn decode(collection: Collection, id: &str, mut doc: Value) -> Result<Self> {
        let Value::Object(ref mut fields) = doc else {
            return Err(CareError::Store(format!(
                "Document {} in {} is not an object",
                id, collection
            )));
        };
        fields.insert("id".to_string(), Value::String(id.to_string()));

        Ok(match collection {
            Collection::Reports => Record::Report(serde_json::from_value(doc)?),
            Collection::Patients => Record::Patient(serde_json::from_value(doc)?),
        })
    }

    pub fn collection(&self) -> Collection {
        match self {
            Record::Report(_) => Collection::Reports,
            Record::Patient(_) => Collection::Patients,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::Report(r) => &r.id,
            Record::Patient(p) => &p.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Record::Report(r) => r.name.as_deref(),
            Record::Patient(p) => p.name(),
        }
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            Record::Report(r) => r.address.as_deref(),
            Record::Patient(p) => p.address(),
        }
    }

    pub fn phone(&self) -> Option<&str> {
        match self {
            Record::Report(_) => None,
            Record::Patient(p) => p.phone(),
        }
    }

    pub fn diagnosis(&self) -> Option<&str> {
        match self {
            Record::Report(r) => r.main_diagnosis.as_deref(),
            Record::Patient(p) => p.main_diagnosis.as_deref(),
        }
    }

    pub fn registernumber(&self) -> Option<&str> {
        match self {
            Record::Report(r) => r.registernumber.as_deref(),
            Record::Patient(p) => p.registernumber.as_deref(),
        }
    }

    pub fn form_type(&self) -> Option<&str> {
        match self {
            Record::Report(r) => r.form_type.as_deref(),
            Record::Patient(_) => None,
        }
    }

    /// Reports carry no status flag and always count as active.
    pub fn is_active(&self) -> bool {
        match self {
            Record::Report(_) => true,
            Record::Patient(p) => p.is_active(),
        }
    }

    /// The date the record is filed under: submission for reports,
    /// registration for patients.
    pub fn timestamp(&self) -> Option<&DocTime> {
        match self {
            Record::Report(r) => r.submitted_at.as_ref(),
            Record::Patient(p) => p.registration_date.as_ref(),
        }
    }

    pub fn resolved_time(&self) -> Option<DateTime<Utc>> {
        self.timestamp()?.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_patient_with_legacy_keys() {
        let doc = json!({
            "registrationNumber": "12/24",
            "mainDiagnosis": "COPD, CKD",
            "deactivated": "true",
            "basicDetailsModel": { "name": "Ammini", "phone_number": 9847012345u64 },
        });
        let Record::Patient(p) = Record::decode(Collection::Patients, "p1", doc).unwrap() else {
            panic!("expected patient");
        };
        assert_eq!(p.id, "p1");
        assert_eq!(p.registernumber.as_deref(), Some("12/24"));
        assert_eq!(p.name(), Some("Ammini"));
        assert_eq!(p.phone(), Some("9847012345"));
        assert!(!p.is_active());
    }

    #[test]
    fn wrong_typed_fields_decode_as_absent() {
        let doc = json!({
            "name": { "first": "x" },
            "address": ["a", "b"],
            "deactivated": "maybe",
            "basicDetailsModel": "not an object",
        });
        let record = Record::decode(Collection::Patients, "p2", doc).unwrap();
        assert_eq!(record.name(), None);
        assert_eq!(record.address(), None);
        assert!(record.is_active());
    }

    #[test]
    fn report_keeps_unknown_fields_and_vitals() {
        let doc = json!({
            "name": "Kunjan",
            "formType": "NHC(E)",
            "bp": "130/80",
            "pulse": 78,
            "welfareSchemes": { "government": "Pension" },
            "homeCarePlan": "Weekly visit",
        });
        let Record::Report(r) = Record::decode(Collection::Reports, "r1", doc).unwrap() else {
            panic!("expected report");
        };
        assert_eq!(r.kind(), Some(FormType::NhcE));
        assert_eq!(r.vitals.bp.as_deref(), Some("130/80"));
        assert_eq!(r.vitals.pulse.as_deref(), Some("78"));
        assert_eq!(
            r.welfare_schemes.unwrap().government.as_deref(),
            Some("Pension")
        );
        assert_eq!(r.extra.get("homeCarePlan"), Some(&json!("Weekly visit")));
        assert!(!r.extra.contains_key("bp"));
    }

    #[test]
    fn welfare_schemes_keep_ration_card_and_unknown_keys() {
        let doc = json!({
            "formType": "VHC",
            "welfareSchemes": {
                "rationCardNumber": 1234567890,
                "rationCardType": "AAY",
                "kudumbashree": "Member",
            },
        });
        let Record::Report(r) = Record::decode(Collection::Reports, "r1", doc).unwrap() else {
            panic!("expected report");
        };
        let welfare = r.welfare_schemes.unwrap();
        assert_eq!(welfare.ration_card_number.as_deref(), Some("1234567890"));
        assert_eq!(welfare.ration_card_type.as_deref(), Some("AAY"));
        assert_eq!(welfare.extra.get("kudumbashree"), Some(&json!("Member")));
        assert!(!welfare.extra.contains_key("rationCardType"));
    }

    #[test]
    fn non_object_document_is_rejected() {
        assert!(Record::decode(Collection::Reports, "x", json!("text")).is_err());
    }

    #[test]
    fn form_type_parse_is_exact() {
        assert_eq!("DEATH".parse::<FormType>().unwrap(), FormType::Death);
        assert!("death".parse::<FormType>().is_err());
        assert!("NHC (E)".parse::<FormType>().is_err());
    }

    #[test]
    fn doc_time_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap();
        let shapes = [
            json!("2024-03-05T10:30:00Z"),
            json!("2024-03-05T16:00:00+05:30"),
            json!("2024-03-05T10:30:00"),
            json!(expected.timestamp_millis()),
            json!({ "seconds": expected.timestamp(), "nanoseconds": 0 }),
            json!({ "_seconds": expected.timestamp(), "_nanoseconds": 0 }),
        ];
        for shape in shapes {
            let t: DocTime = serde_json::from_value(shape.clone()).unwrap();
            assert_eq!(t.resolve(), Some(expected), "shape {}", shape);
        }

        let day: DocTime = serde_json::from_value(json!("2024-03-05")).unwrap();
        assert_eq!(
            day.resolve(),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap())
        );

        let junk: DocTime = serde_json::from_value(json!("yesterday")).unwrap();
        assert_eq!(junk.resolve(), None);
        let odd: DocTime = serde_json::from_value(json!([1, 2])).unwrap();
        assert_eq!(odd.resolve(), None);
    }

    #[test]
    fn collection_names() {
        assert_eq!(Collection::Reports.store_name(), "Reports");
        assert_eq!(Collection::Patients.store_name(), "patients");
        assert_eq!("Patient".parse::<Collection>().unwrap(), Collection::Patients);
        assert!("visits".parse::<Collection>().is_err());
    }
}
