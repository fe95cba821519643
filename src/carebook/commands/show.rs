use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::{Collection, DocTime, FormType, Patient, Record, Report};
use crate::routes::detail_route;
use crate::store::RecordStore;
use serde_json::{Map, Value};

pub const PLACEHOLDER: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSection {
    pub title: &'static str,
    pub fields: Vec<(String, String)>,
}

impl DetailSection {
    fn new(title: &'static str) -> Self {
        Self {
            title,
            fields: Vec::new(),
        }
    }

    fn field(mut self, label: &str, value: Option<&str>) -> Self {
        let value = match value.map(str::trim) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => PLACEHOLDER.to_string(),
        };
        self.fields.push((label.to_string(), value));
        self
    }

    fn lifted(mut self, extra: &Map<String, Value>, fields: Fields) -> Self {
        for (label, key) in fields {
            let text = extra.get(*key).and_then(value_text);
            self = self.field(label, text.as_deref());
        }
        self
    }
}

pub fn run<S: RecordStore>(store: &S, collection: Collection, id: &str) -> Result<CmdResult> {
    let record = store.fetch_one(collection, id)?;
    let route = detail_route(&record);
    Ok(CmdResult::default()
        .with_records(vec![record])
        .with_route(route))
}

/// Lays a record out for display. Every absent field reads `N/A`.
pub fn detail_sections(record: &Record) -> Vec<DetailSection> {
    match record {
        Record::Patient(p) => patient_sections(p),
        Record::Report(r) => report_sections(r),
    }
}

fn patient_sections(p: &Patient) -> Vec<DetailSection> {
    let basic = p.basic_details.clone().unwrap_or_default();
    let registered = format_time(p.registration_date.as_ref());
    let status = if p.is_active() { "Active" } else { "Inactive" };

    let mut sections = vec![
        DetailSection::new("Patient")
            .field("Name", p.name())
            .field("Register number", p.registernumber.as_deref())
            .field("Status", Some(status))
            .field("Registered", registered.as_deref())
            .field("Main diagnosis", p.main_diagnosis.as_deref()),
        DetailSection::new("Contact")
            .field("Address", p.address())
            .field("Phone", p.phone())
            .field("Email", basic.email.as_deref())
            .field("Panchayath", basic.panchayath.as_deref())
            .field("Ward", basic.ward.as_deref()),
        DetailSection::new("Personal")
            .field("Date of birth", basic.dob.as_deref())
            .field("Gender", basic.gender.as_deref()),
    ];
    sections.extend(extra_section(&p.extra, &[]));
    sections
}

// (label, document key) pairs lifted out of a report's extra fields.
type Fields = &'static [(&'static str, &'static str)];

const DEATH_FIELDS: Fields = &[
    ("Date of death", "date"),
    ("Time of death", "timeOfDeath"),
    ("Reason", "deathReason"),
    ("Visited hospital", "visitedHospital"),
    ("Place of death", "deathPlace"),
];

const CONDITION_FIELDS: Fields = &[
    ("Disease information", "diseaseInformation"),
    ("Patient condition", "patientCondition"),
    ("Financial situation", "financialSituation"),
];

const VISIT_FIELDS: Fields = &[
    ("Home care type", "homeCareType"),
    ("Team", "team"),
    ("Medical history", "medicalHistory"),
    ("Current difficulties", "currentDifficulties"),
    ("Home care plan", "homeCarePlan"),
    ("Summary discussion", "summaryDiscussion"),
];

/// Each form type has its own layout. Progression and social reports are
/// free-form, so most of their content lands in "Other"; unknown form types
/// get every typed section.
fn report_sections(r: &Report) -> Vec<DetailSection> {
    let mut sections = vec![report_header(r)];
    let lifted: Fields = match r.kind() {
        Some(FormType::Death) => {
            sections.push(DetailSection::new("Death").lifted(&r.extra, DEATH_FIELDS));
            DEATH_FIELDS
        }
        Some(FormType::Vhc | FormType::Gvhc) => {
            sections.push(DetailSection::new("Condition").lifted(&r.extra, CONDITION_FIELDS));
            sections.push(welfare_section(r));
            CONDITION_FIELDS
        }
        Some(FormType::Nhc | FormType::NhcE | FormType::Dhc | FormType::Investigation) => {
            sections.push(vitals_section(r));
            sections.push(DetailSection::new("Visit").lifted(&r.extra, VISIT_FIELDS));
            if r.welfare_schemes.is_some() {
                sections.push(welfare_section(r));
            }
            VISIT_FIELDS
        }
        Some(FormType::ProgressionReport | FormType::SocialReport) => {
            if !r.vitals.is_empty() {
                sections.push(vitals_section(r));
            }
            if r.welfare_schemes.is_some() {
                sections.push(welfare_section(r));
            }
            &[]
        }
        None => {
            sections.push(vitals_section(r));
            sections.push(welfare_section(r));
            &[]
        }
    };
    sections.extend(extra_section(&r.extra, lifted));
    sections
}

fn report_header(r: &Report) -> DetailSection {
    let submitted = format_time(r.submitted_at.as_ref());
    DetailSection::new("Report")
        .field("Name", r.name.as_deref())
        .field("Form type", r.form_type.as_deref())
        .field("Submitted", submitted.as_deref())
        .field("Register number", r.registernumber.as_deref())
        .field("Patient id", r.patient_id.as_deref())
        .field("Address", r.address.as_deref())
        .field("Age", r.age.as_deref())
        .field("Gender", r.gender.as_deref())
        .field("Main diagnosis", r.main_diagnosis.as_deref())
}

fn vitals_section(r: &Report) -> DetailSection {
    DetailSection::new("Vitals")
        .field("BP", r.vitals.bp.as_deref())
        .field("Pulse", r.vitals.pulse.as_deref())
        .field("RR", r.vitals.rr.as_deref())
        .field("Temperature", r.vitals.temperature.as_deref())
        .field("SpO2", r.vitals.spo.as_deref())
        .field("GRBS", r.vitals.grbs.as_deref())
}

fn welfare_section(r: &Report) -> DetailSection {
    let welfare = r.welfare_schemes.clone().unwrap_or_default();
    let mut section = DetailSection::new("Welfare schemes")
        .field("Ration card number", welfare.ration_card_number.as_deref())
        .field("Ration card type", welfare.ration_card_type.as_deref())
        .field("Financial status", welfare.financial_status.as_deref())
        .field("Government", welfare.government.as_deref())
        .field("Non-government", welfare.non_government.as_deref())
        .field("Other agencies", welfare.other_agencies.as_deref());
    for (key, value) in &welfare.extra {
        section = section.field(key, value_text(value).as_deref());
    }
    section
}

fn extra_section(extra: &Map<String, Value>, lifted: Fields) -> Option<DetailSection> {
    let mut rest = extra
        .iter()
        .filter(|(key, _)| !lifted.iter().any(|(_, k)| *k == key.as_str()))
        .peekable();
    rest.peek()?;
    let mut section = DetailSection::new("Other");
    for (key, value) in rest {
        section = section.field(key, value_text(value).as_deref());
    }
    Some(section)
}

// Objects flatten to "key: value" pairs and arrays to a comma list.
fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(fields) => fields
            .iter()
            .filter_map(|(k, v)| Some(format!("{}: {}", k, value_text(v)?)))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    };
    Some(text)
}

fn format_time(time: Option<&DocTime>) -> Option<String> {
    time?
        .resolve()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CareError;
    use crate::store::memory::fixtures::StoreFixture;
    use serde_json::json;

    fn value<'a>(sections: &'a [DetailSection], title: &str, label: &str) -> &'a str {
        sections
            .iter()
            .find(|s| s.title == title)
            .and_then(|s| s.fields.iter().find(|(l, _)| l == label))
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn show_fetches_record_and_route() {
        let fixture = StoreFixture::new().with_reports(2);
        let result = run(&fixture.store, Collection::Reports, "report-2").unwrap();
        assert_eq!(result.records[0].id(), "report-2");
        assert_eq!(result.route.as_deref(), Some("/reportsdetailnhc/report-2"));
    }

    #[test]
    fn show_unknown_id_is_not_found() {
        let fixture = StoreFixture::new().with_patients(1);
        assert!(matches!(
            run(&fixture.store, Collection::Patients, "nobody"),
            Err(CareError::RecordNotFound(_))
        ));
    }

    #[test]
    fn missing_fields_render_placeholder() {
        let report = Record::Report(Report::new("r1", "Anu", FormType::Dhc));
        let sections = detail_sections(&report);
        assert_eq!(value(&sections, "Report", "Name"), "Anu");
        assert_eq!(value(&sections, "Report", "Submitted"), PLACEHOLDER);
        assert_eq!(value(&sections, "Vitals", "BP"), PLACEHOLDER);
        assert_eq!(value(&sections, "Visit", "Team"), PLACEHOLDER);
        assert!(sections.iter().all(|s| s.title != "Other"));
    }

    fn titles(sections: &[DetailSection]) -> Vec<&str> {
        sections.iter().map(|s| s.title).collect()
    }

    #[test]
    fn death_report_gets_its_own_section() {
        let doc = json!({
            "name": "Chinnamma",
            "formType": "DEATH",
            "date": "2024-03-05",
            "deathPlace": "Home",
            "timeOfDeath": "04:10",
            "deathReason": "Cardiac arrest",
            "informedBy": "Daughter",
        });
        let record = Record::decode(Collection::Reports, "r3", doc).unwrap();
        let sections = detail_sections(&record);

        assert_eq!(titles(&sections), vec!["Report", "Death", "Other"]);
        assert_eq!(value(&sections, "Death", "Place of death"), "Home");
        assert_eq!(value(&sections, "Death", "Time of death"), "04:10");
        assert_eq!(value(&sections, "Death", "Reason"), "Cardiac arrest");
        assert_eq!(value(&sections, "Death", "Visited hospital"), PLACEHOLDER);
        let other = &sections[2].fields;
        assert_eq!(other, &vec![("informedBy".to_string(), "Daughter".to_string())]);
    }

    #[test]
    fn vhc_report_shows_condition_and_ration_card() {
        let doc = json!({
            "name": "Anu",
            "formType": "VHC",
            "patientCondition": "Bedridden",
            "diseaseInformation": "CKD stage 4",
            "financialSituation": { "income": "Low", "debts": null },
            "welfareSchemes": {
                "rationCardNumber": "KL-0042",
                "rationCardType": "BPL",
                "pensionScheme": "Old age",
            },
        });
        let record = Record::decode(Collection::Reports, "r1", doc).unwrap();
        let sections = detail_sections(&record);

        assert_eq!(titles(&sections), vec!["Report", "Condition", "Welfare schemes"]);
        assert_eq!(value(&sections, "Condition", "Patient condition"), "Bedridden");
        assert_eq!(value(&sections, "Condition", "Financial situation"), "income: Low");
        assert_eq!(value(&sections, "Welfare schemes", "Ration card number"), "KL-0042");
        assert_eq!(value(&sections, "Welfare schemes", "Ration card type"), "BPL");
        assert_eq!(value(&sections, "Welfare schemes", "pensionScheme"), "Old age");
        assert_eq!(value(&sections, "Welfare schemes", "Government"), PLACEHOLDER);
    }

    #[test]
    fn unknown_form_type_uses_every_section() {
        let doc = json!({ "name": "Anu", "formType": "PALLIATIVE", "bp": "110/70" });
        let record = Record::decode(Collection::Reports, "r9", doc).unwrap();
        let sections = detail_sections(&record);
        assert_eq!(titles(&sections), vec!["Report", "Vitals", "Welfare schemes"]);
        assert_eq!(value(&sections, "Vitals", "BP"), "110/70");

        let social = Record::Report(Report::new("r10", "Anu", FormType::SocialReport));
        assert_eq!(titles(&detail_sections(&social)), vec!["Report"]);
    }

    #[test]
    fn decoded_report_shows_vitals_and_extras() {
        let doc = json!({
            "name": "Anu",
            "formType": "NHC",
            "submittedAt": { "seconds": 1704103200, "nanoseconds": 0 },
            "bp": "120/80",
            "pulse": 72,
            "welfareSchemes": { "financialStatus": "BPL" },
            "visitNotes": "Comfortable",
            "followUp": null,
        });
        let record = Record::decode(Collection::Reports, "r1", doc).unwrap();
        let sections = detail_sections(&record);

        assert_eq!(value(&sections, "Report", "Submitted"), "2024-01-01 10:00");
        assert_eq!(value(&sections, "Vitals", "BP"), "120/80");
        assert_eq!(value(&sections, "Vitals", "Pulse"), "72");
        assert_eq!(value(&sections, "Welfare schemes", "Financial status"), "BPL");
        assert_eq!(value(&sections, "Other", "visitNotes"), "Comfortable");
        assert_eq!(value(&sections, "Other", "followUp"), PLACEHOLDER);
    }

    #[test]
    fn patient_falls_back_to_basic_details() {
        let doc = json!({
            "registernumber": "3/24",
            "deactivated": true,
            "basicDetailsModel": { "name": "Leela", "address": "Ward 4", "ward": 4 },
        });
        let record = Record::decode(Collection::Patients, "p1", doc).unwrap();
        let sections = detail_sections(&record);
        assert_eq!(value(&sections, "Patient", "Name"), "Leela");
        assert_eq!(value(&sections, "Patient", "Status"), "Inactive");
        assert_eq!(value(&sections, "Contact", "Address"), "Ward 4");
        assert_eq!(value(&sections, "Contact", "Ward"), "4");
        assert_eq!(value(&sections, "Contact", "Phone"), PLACEHOLDER);
    }
}
