//! Detail-view paths for the navigation layer.
//!
//! Each report form type has its own detail page; patients share one. Anything
//! unrecognised lands on the default report page rather than failing.

use crate::model::Record;

const PATIENT_CATEGORY: &str = "patient";

/// Maps a record category (a report `formType` or `"patient"`) and id to the
/// path of its detail view.
pub fn resolve_detail_route(category: &str, id: &str) -> String {
    let prefix = match category {
        "NHC" => "/reportsdetailnhc",
        "NHC(E)" => "/reportsdetailnhce",
        "DHC" => "/report-details-dhc",
        "PROGRESSION REPORT" => "/report-details-progression",
        "SOCIAL REPORT" => "/report-details-social",
        "VHC" | "GVHC" => "/report-details-vhc",
        "INVESTIGATION" => "/report-details-investigation",
        "DEATH" => "/report-details-death",
        PATIENT_CATEGORY => "/patient-details",
        _ => "/report-details-default",
    };
    format!("{}/{}", prefix, id)
}

pub fn detail_route(record: &Record) -> String {
    match record {
        Record::Patient(p) => resolve_detail_route(PATIENT_CATEGORY, &p.id),
        Record::Report(r) => resolve_detail_route(r.form_type.as_deref().unwrap_or(""), &r.id),
    }
}
