use super::RecordStore;
use crate::error::{CareError, Result};
use crate::model::{Collection, Record};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::warn;
use uuid::Uuid;

/// Record store over a directory of exported collections.
///
/// Each collection is one JSON file named after the backend collection. The
/// file holds either an array of documents carrying an `id` key, or an object
/// keyed by document id. Deletes keep whichever shape the file already has.
pub struct FileStore {
    root: PathBuf,
}

/// The two export shapes, kept so a rewrite preserves the original layout.
enum Documents {
    List(Vec<Value>),
    Keyed(serde_json::Map<String, Value>),
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.root.join(format!("{}.json", collection.store_name()))
    }

    fn load(&self, collection: Collection) -> Result<Option<Documents>> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(CareError::Io)?;
        match serde_json::from_str(&content).map_err(CareError::Serialization)? {
            Value::Array(docs) => Ok(Some(Documents::List(docs))),
            Value::Object(docs) => Ok(Some(Documents::Keyed(docs))),
            _ => Err(CareError::Store(format!(
                "{} must hold an array or an object of documents",
                path.display()
            ))),
        }
    }

    fn save(&self, collection: Collection, docs: &Documents) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(CareError::Io)?;
        }
        let content = match docs {
            Documents::List(list) => serde_json::to_string_pretty(list),
            Documents::Keyed(map) => serde_json::to_string_pretty(map),
        }
        .map_err(CareError::Serialization)?;

        // Atomic write: a crash mid-save must not truncate the collection
        let tmp_file = self
            .root
            .join(format!(".{}-{}.tmp", collection.store_name(), Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(CareError::Io)?;
        fs::rename(&tmp_file, self.collection_path(collection)).map_err(CareError::Io)?;
        Ok(())
    }
}

fn document_id(doc: &Value) -> Option<String> {
    match doc.get("id")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn decode_or_skip(collection: Collection, id: &str, doc: Value) -> Option<Record> {
    match Record::decode(collection, id, doc) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(%collection, id, error = %e, "skipping undecodable document");
            None
        }
    }
}

impl RecordStore for FileStore {
    fn fetch_all(&self, collection: Collection) -> Result<Vec<Record>> {
        let records = match self.load(collection)? {
            None => Vec::new(),
            Some(Documents::List(docs)) => docs
                .into_iter()
                .filter_map(|doc| {
                    let Some(id) = document_id(&doc) else {
                        warn!(%collection, "skipping document without an id");
                        return None;
                    };
                    decode_or_skip(collection, &id, doc)
                })
                .collect(),
            Some(Documents::Keyed(docs)) => docs
                .into_iter()
                .filter_map(|(id, doc)| decode_or_skip(collection, &id, doc))
                .collect(),
        };
        Ok(records)
    }

    fn delete_by_id(&mut self, collection: Collection, id: &str) -> Result<()> {
        let not_found = || CareError::RecordNotFound(id.to_string());
        let mut docs = self.load(collection)?.ok_or_else(not_found)?;

        let removed = match &mut docs {
            Documents::List(list) => {
                let before = list.len();
                list.retain(|doc| document_id(doc).as_deref() != Some(id));
                list.len() != before
            }
            Documents::Keyed(map) => map.remove(id).is_some(),
        };
        if !removed {
            return Err(not_found());
        }

        self.save(collection, &docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_with(collection: Collection, content: Value) -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        fs::write(store.collection_path(collection), content.to_string()).unwrap();
        (dir, store)
    }

    #[test]
    fn missing_file_is_an_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        assert!(store.fetch_all(Collection::Reports).unwrap().is_empty());
    }

    #[test]
    fn reads_array_exports_and_skips_bad_documents() {
        let (_dir, store) = store_with(
            Collection::Reports,
            json!([
                { "id": "r1", "name": "Anu", "formType": "DHC" },
                { "name": "no id" },
                "not a document",
                { "id": 7, "name": "Numeric id" },
            ]),
        );
        let records = store.fetch_all(Collection::Reports).unwrap();
        let ids: Vec<&str> = records.iter().map(Record::id).collect();
        assert_eq!(ids, vec!["r1", "7"]);
        assert_eq!(records[0].form_type(), Some("DHC"));
    }

    #[test]
    fn reads_keyed_exports() {
        let (_dir, store) = store_with(
            Collection::Patients,
            json!({
                "abc": { "name": "Ravi", "registernumber": "4/23" },
                "def": { "name": "Leela" },
            }),
        );
        let record = store.fetch_one(Collection::Patients, "abc").unwrap();
        assert_eq!(record.registernumber(), Some("4/23"));
        assert!(matches!(
            store.fetch_one(Collection::Patients, "zzz"),
            Err(CareError::RecordNotFound(_))
        ));
    }

    #[test]
    fn delete_rewrites_array_export() {
        let (_dir, mut store) = store_with(
            Collection::Reports,
            json!([{ "id": "r1" }, { "id": "r2" }]),
        );
        store.delete_by_id(Collection::Reports, "r1").unwrap();

        let raw: Value =
            serde_json::from_str(&fs::read_to_string(store.collection_path(Collection::Reports)).unwrap())
                .unwrap();
        assert_eq!(raw, json!([{ "id": "r2" }]));
    }

    #[test]
    fn delete_rewrites_keyed_export() {
        let (_dir, mut store) = store_with(
            Collection::Patients,
            json!({ "a": { "name": "A" }, "b": { "name": "B" } }),
        );
        store.delete_by_id(Collection::Patients, "b").unwrap();
        let ids: Vec<String> = store
            .fetch_all(Collection::Patients)
            .unwrap()
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn delete_unknown_id_leaves_file_alone() {
        let (_dir, mut store) = store_with(Collection::Reports, json!([{ "id": "r1" }]));
        assert!(matches!(
            store.delete_by_id(Collection::Reports, "nope"),
            Err(CareError::RecordNotFound(_))
        ));
        assert_eq!(store.fetch_all(Collection::Reports).unwrap().len(), 1);
    }

    #[test]
    fn scalar_file_is_a_store_error() {
        let (_dir, store) = store_with(Collection::Reports, json!(42));
        assert!(matches!(
            store.fetch_all(Collection::Reports),
            Err(CareError::Store(_))
        ));
    }
}
