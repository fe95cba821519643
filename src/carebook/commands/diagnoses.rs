use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Collection;
use crate::query::filter::diagnosis_options;
use crate::store::RecordStore;

/// Distinct diagnosis tokens across all patients, for the diagnosis selector.
pub fn run<S: RecordStore>(store: &S) -> Result<CmdResult> {
    let patients = store.fetch_all(Collection::Patients)?;
    let options = diagnosis_options(&patients);
    let mut result = CmdResult::default();
    if options.is_empty() {
        result.add_message(CmdMessage::info("No diagnoses recorded."));
    }
    Ok(result.with_options(options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Patient;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn collects_distinct_sorted_tokens() {
        let mut a = Patient::new("a", "A");
        a.main_diagnosis = Some("COPD, CKD".into());
        let mut b = Patient::new("b", "B");
        b.main_diagnosis = Some(" CKD ,Stroke,".into());
        let fixture = StoreFixture::new().with_patient(a).with_patient(b);

        let result = run(&fixture.store).unwrap();
        assert_eq!(result.options, vec!["CKD", "COPD", "Stroke"]);
        assert!(result.messages.is_empty());
    }

    #[test]
    fn empty_register_says_so() {
        let result = run(&StoreFixture::new().store).unwrap();
        assert!(result.options.is_empty());
        assert_eq!(result.messages.len(), 1);
    }
}
