use crate::commands::{CmdMessage, CmdResult};
use crate::config::CarebookConfig;
use crate::error::{CareError, Result};
use crate::model::Collection;
use crate::store::RecordStore;
use crate::view::{ListView, LoadState};

fn noun(collection: Collection) -> &'static str {
    match collection {
        Collection::Reports => "Report",
        Collection::Patients => "Patient",
    }
}

/// Loads the collection, arms the deletion gate for `id` and confirms it with
/// `code`. Rejections and backend failures come back as messages; only an
/// unknown id is an error.
pub fn run<S: RecordStore>(
    store: &mut S,
    config: &CarebookConfig,
    collection: Collection,
    id: &str,
    code: &str,
) -> Result<CmdResult> {
    let mut view = ListView::new(collection, config);
    let mut result = CmdResult::default();

    if let Err(e) = view.load(store) {
        if let LoadState::Failed(banner) = view.load_state() {
            result.add_message(CmdMessage::error(banner.clone()));
            return Ok(result);
        }
        return Err(e);
    }

    view.request_delete(id)?;
    match view.confirm_delete(code, store) {
        Ok(_) => {
            result.add_message(CmdMessage::success(format!(
                "{} deleted successfully!",
                noun(collection)
            )));
        }
        Err(CareError::ConfirmationMismatch) => {
            result.add_message(CmdMessage::error("Incorrect confirmation code."));
        }
        Err(CareError::Delete { .. }) => {
            result.add_message(CmdMessage::error(format!(
                "Failed to delete {}.",
                noun(collection).to_lowercase()
            )));
        }
        Err(e) => return Err(e),
    }
    Ok(result)
}
