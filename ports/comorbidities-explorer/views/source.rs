/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Where raw collections come from.

use crate::error::LoadError;
use futures::future::BoxFuture;
use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Raw reference collections, one JSON array each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    DiseaseGroups,
    Diseases,
    DiseaseComorbidities,
    PatientSubgroups,
    PatientSubgroupComorbidities,
    Patients,
    Studies,
    Genes,
    Drugs,
    SubgroupGenes,
    SubgroupDrugs,
}

impl Collection {
    pub const ALL: [Collection; 11] = [
        Collection::DiseaseGroups,
        Collection::Diseases,
        Collection::DiseaseComorbidities,
        Collection::PatientSubgroups,
        Collection::PatientSubgroupComorbidities,
        Collection::Patients,
        Collection::Studies,
        Collection::Genes,
        Collection::Drugs,
        Collection::SubgroupGenes,
        Collection::SubgroupDrugs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::DiseaseGroups => "disease_groups",
            Collection::Diseases => "diseases",
            Collection::DiseaseComorbidities => "disease_comorbidities",
            Collection::PatientSubgroups => "patient_subgroups",
            Collection::PatientSubgroupComorbidities => "patient_subgroup_comorbidities",
            Collection::Patients => "patients",
            Collection::Studies => "studies",
            Collection::Genes => "genes",
            Collection::Drugs => "drugs",
            Collection::SubgroupGenes => "subgroup_genes",
            Collection::SubgroupDrugs => "subgroup_drugs",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.json", self.name())
    }
}

/// Asynchronous provider of raw collection bytes
pub trait DataSource: Send + Sync {
    fn fetch(&self, collection: Collection) -> BoxFuture<'static, Result<Vec<u8>, LoadError>>;
}

/// One `<collection>.json` file per collection in a directory
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DataSource for JsonDirSource {
    fn fetch(&self, collection: Collection) -> BoxFuture<'static, Result<Vec<u8>, LoadError>> {
        let path = self.dir.join(collection.file_name());
        Box::pin(async move {
            debug!("Reading {}", path.display());
            match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(LoadError::MissingCollection(collection.name().to_string()))
                },
                Err(e) => Err(LoadError::io(collection.name(), e)),
            }
        })
    }
}

/// In-memory collections, counting fetches per collection
#[derive(Debug)]
pub struct MemorySource {
    collections: Mutex<HashMap<Collection, Vec<u8>>>,
    fetches: HashMap<Collection, AtomicUsize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            fetches: Collection::ALL
                .iter()
                .map(|&c| (c, AtomicUsize::new(0)))
                .collect(),
        }
    }

    /// Store `value` as the serialized content of `collection`
    pub fn with(self, collection: Collection, value: serde_json::Value) -> Self {
        self.insert(collection, value.to_string().into_bytes());
        self
    }

    pub fn insert(&self, collection: Collection, bytes: Vec<u8>) {
        match self.collections.lock() {
            Ok(mut collections) => {
                collections.insert(collection, bytes);
            },
            Err(_) => warn!("Dropping insert of {collection:?}: collection lock poisoned"),
        }
    }

    /// How often `collection` has been fetched
    pub fn fetch_count(&self, collection: Collection) -> usize {
        self.fetches
            .get(&collection)
            .map_or(0, |count| count.load(Ordering::SeqCst))
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for MemorySource {
    fn fetch(&self, collection: Collection) -> BoxFuture<'static, Result<Vec<u8>, LoadError>> {
        if let Some(count) = self.fetches.get(&collection) {
            count.fetch_add(1, Ordering::SeqCst);
        }
        let bytes = self
            .collections
            .lock()
            .ok()
            .and_then(|collections| collections.get(&collection).cloned());
        Box::pin(async move {
            bytes.ok_or_else(|| LoadError::MissingCollection(collection.name().to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_source_counts_fetches() {
        let source = MemorySource::new().with(Collection::Genes, json!([{ "symbol": "TP53" }]));
        let bytes = source.fetch(Collection::Genes).await.unwrap();
        assert!(String::from_utf8(bytes).unwrap().contains("TP53"));
        assert_eq!(source.fetch_count(Collection::Genes), 1);

        let missing = source.fetch(Collection::Drugs).await;
        assert!(matches!(missing, Err(LoadError::MissingCollection(name)) if name == "drugs"));
    }

    #[tokio::test]
    async fn test_insert_into_poisoned_source_is_dropped() {
        let source = MemorySource::new();
        let poisoned = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = source.collections.lock().unwrap();
                    panic!("poison the collections lock");
                })
                .join()
        });
        assert!(poisoned.is_err());

        source.insert(Collection::Genes, b"[]".to_vec());
        assert!(matches!(
            source.fetch(Collection::Genes).await,
            Err(LoadError::MissingCollection(_))
        ));
    }

    #[tokio::test]
    async fn test_json_dir_source_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("studies.json"), r#"[{"id":"GSE1","source":"GEO"}]"#)
            .unwrap();
        let source = JsonDirSource::new(dir.path());

        let bytes = source.fetch(Collection::Studies).await.unwrap();
        assert!(bytes.starts_with(b"["));
        assert!(matches!(
            source.fetch(Collection::Patients).await,
            Err(LoadError::MissingCollection(_))
        ));
    }

    #[test]
    fn test_collection_file_names() {
        assert_eq!(
            Collection::PatientSubgroupComorbidities.file_name(),
            "patient_subgroup_comorbidities.json"
        );
        assert_eq!(Collection::ALL.len(), 11);
    }
}
