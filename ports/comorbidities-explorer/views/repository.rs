/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Load-once cache of the raw reference collections.
//!
//! One `DataRepository` is shared by `Arc` between all views. Each collection
//! is fetched and decoded at most once; concurrent requests for the same
//! collection wait on the same load.

use super::source::{Collection, DataSource};
use crate::error::LoadError;
use log::{debug, info};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiseaseGroupRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DiseaseRecord {
    pub id: u64,
    pub name: String,
    pub disease_group_id: u64,
    #[serde(default)]
    pub icd9: Option<String>,
    #[serde(default)]
    pub icd10: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Relative risk between two diseases or two patient subgroups
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComorbidityRecord {
    pub from_id: u64,
    pub to_id: u64,
    pub rel_risk: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PatientSubgroupRecord {
    pub id: u64,
    pub disease_id: u64,
    pub size: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PatientRecord {
    pub id: u64,
    pub patient_subgroup_id: u64,
    pub study_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StudyRecord {
    pub id: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneRecord {
    pub symbol: String,
    #[serde(default)]
    pub ensembl_id: Option<String>,
    #[serde(default)]
    pub uniprot_acc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DrugRecord {
    pub id: u64,
    pub name: String,
}

/// Up (+1) or down (-1) regulation of a gene in a patient subgroup
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubgroupGeneRecord {
    pub patient_subgroup_id: u64,
    pub gene_symbol: String,
    pub regulation_sign: i64,
}

/// Up (+1) or down (-1) regulation of a drug in a patient subgroup
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubgroupDrugRecord {
    pub patient_subgroup_id: u64,
    pub drug_id: u64,
    pub regulation_sign: i64,
}

type Cached<T> = OnceCell<Arc<Vec<T>>>;

/// Shared cache of raw collections
pub struct DataRepository {
    source: Arc<dyn DataSource>,
    disease_groups: Cached<DiseaseGroupRecord>,
    diseases: Cached<DiseaseRecord>,
    disease_comorbidities: Cached<ComorbidityRecord>,
    patient_subgroups: Cached<PatientSubgroupRecord>,
    patient_subgroup_comorbidities: Cached<ComorbidityRecord>,
    patients: Cached<PatientRecord>,
    studies: Cached<StudyRecord>,
    genes: Cached<GeneRecord>,
    drugs: Cached<DrugRecord>,
    subgroup_genes: Cached<SubgroupGeneRecord>,
    subgroup_drugs: Cached<SubgroupDrugRecord>,
}

impl DataRepository {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            disease_groups: OnceCell::new(),
            diseases: OnceCell::new(),
            disease_comorbidities: OnceCell::new(),
            patient_subgroups: OnceCell::new(),
            patient_subgroup_comorbidities: OnceCell::new(),
            patients: OnceCell::new(),
            studies: OnceCell::new(),
            genes: OnceCell::new(),
            drugs: OnceCell::new(),
            subgroup_genes: OnceCell::new(),
            subgroup_drugs: OnceCell::new(),
        }
    }

    pub async fn disease_groups(&self) -> Result<Arc<Vec<DiseaseGroupRecord>>, LoadError> {
        self.cached(&self.disease_groups, Collection::DiseaseGroups, false).await
    }

    pub async fn diseases(&self) -> Result<Arc<Vec<DiseaseRecord>>, LoadError> {
        self.cached(&self.diseases, Collection::Diseases, false).await
    }

    pub async fn disease_comorbidities(&self) -> Result<Arc<Vec<ComorbidityRecord>>, LoadError> {
        self.cached(&self.disease_comorbidities, Collection::DiseaseComorbidities, false)
            .await
    }

    pub async fn patient_subgroups(&self) -> Result<Arc<Vec<PatientSubgroupRecord>>, LoadError> {
        self.cached(&self.patient_subgroups, Collection::PatientSubgroups, false)
            .await
    }

    pub async fn patient_subgroup_comorbidities(
        &self,
    ) -> Result<Arc<Vec<ComorbidityRecord>>, LoadError> {
        self.cached(
            &self.patient_subgroup_comorbidities,
            Collection::PatientSubgroupComorbidities,
            false,
        )
        .await
    }

    pub async fn patients(&self) -> Result<Arc<Vec<PatientRecord>>, LoadError> {
        self.cached(&self.patients, Collection::Patients, false).await
    }

    pub async fn studies(&self) -> Result<Arc<Vec<StudyRecord>>, LoadError> {
        self.cached(&self.studies, Collection::Studies, false).await
    }

    pub async fn genes(&self) -> Result<Arc<Vec<GeneRecord>>, LoadError> {
        self.cached(&self.genes, Collection::Genes, false).await
    }

    pub async fn drugs(&self) -> Result<Arc<Vec<DrugRecord>>, LoadError> {
        self.cached(&self.drugs, Collection::Drugs, false).await
    }

    /// Gene regulation records; an absent collection reads as empty
    pub async fn subgroup_genes(&self) -> Result<Arc<Vec<SubgroupGeneRecord>>, LoadError> {
        self.cached(&self.subgroup_genes, Collection::SubgroupGenes, true)
            .await
    }

    /// Drug regulation records; an absent collection reads as empty
    pub async fn subgroup_drugs(&self) -> Result<Arc<Vec<SubgroupDrugRecord>>, LoadError> {
        self.cached(&self.subgroup_drugs, Collection::SubgroupDrugs, true)
            .await
    }

    async fn cached<T: DeserializeOwned>(
        &self,
        cell: &Cached<T>,
        collection: Collection,
        optional: bool,
    ) -> Result<Arc<Vec<T>>, LoadError> {
        let source = &self.source;
        cell.get_or_try_init(move || async move {
            let records: Vec<T> = match source.fetch(collection).await {
                Ok(bytes) => serde_json::from_slice(&bytes)
                    .map_err(|e| LoadError::parse(collection.name(), e))?,
                Err(LoadError::MissingCollection(_)) if optional => {
                    debug!("Optional collection {} not available", collection.name());
                    Vec::new()
                },
                Err(e) => return Err(e),
            };
            info!("Loaded {} {} records", records.len(), collection.name());
            Ok(Arc::new(records))
        })
        .await
        .cloned()
    }
}
