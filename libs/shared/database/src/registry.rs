use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use shared_models::PatientRecord;

use crate::error::RegistryError;
use crate::sheets::SheetsClient;

pub const HEADER: [&str; 3] = ["displayName", "realName", "userId"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Key-value patient store keyed by messaging recipient id.
#[async_trait]
pub trait PatientRegistry: Send + Sync {
    async fn list_patients(&self) -> Result<Vec<PatientRecord>, RegistryError>;

    /// Inserts a row with an empty real name, or refreshes the display name
    /// of the existing row while keeping its real name.
    async fn upsert_patient(
        &self,
        display_name: &str,
        external_id: &str,
    ) -> Result<UpsertOutcome, RegistryError>;
}

/// Registry stored in a three-column sheet:
/// `displayName | realName | userId`, data from row 2.
pub struct SheetsPatientRegistry {
    sheets: SheetsClient,
    sheet_name: String,
}

impl SheetsPatientRegistry {
    pub fn new(sheets: SheetsClient, sheet_name: &str) -> Self {
        Self {
            sheets,
            sheet_name: sheet_name.to_string(),
        }
    }

    async fn ensure_header(&self) -> Result<(), RegistryError> {
        let range = format!("{}!A1:C1", self.sheet_name);
        let current = self.sheets.get_values(&range).await.map_err(RegistryError::Read)?;
        let rows = current.rows();

        let matches = rows
            .first()
            .map(|row| row.iter().map(String::as_str).eq(HEADER.iter().copied()))
            .unwrap_or(false);

        if !matches {
            info!("Writing registry header to sheet {}", self.sheet_name);
            self.sheets
                .update_values(&range, vec![HEADER.iter().map(|h| h.to_string()).collect()])
                .await
                .map_err(RegistryError::Write)?;
        }
        Ok(())
    }

    /// Rows that carry a user id, paired with their 1-based sheet row.
    async fn read_rows(&self) -> Result<Vec<(usize, PatientRecord)>, RegistryError> {
        self.ensure_header().await?;

        let range = format!("{}!A2:C", self.sheet_name);
        let values = self.sheets.get_values(&range).await.map_err(RegistryError::Read)?;

        let records = values
            .rows()
            .into_iter()
            .enumerate()
            .filter_map(|(i, row)| {
                let cell = |n: usize| row.get(n).map(|s| s.trim().to_string()).unwrap_or_default();
                let record = PatientRecord::new(cell(0), cell(1), cell(2));
                (!record.external_id.is_empty()).then_some((i + 2, record))
            })
            .collect::<Vec<_>>();

        debug!("Read {} registry rows", records.len());
        Ok(records)
    }
}

#[async_trait]
impl PatientRegistry for SheetsPatientRegistry {
    async fn list_patients(&self) -> Result<Vec<PatientRecord>, RegistryError> {
        Ok(self.read_rows().await?.into_iter().map(|(_, r)| r).collect())
    }

    async fn upsert_patient(
        &self,
        display_name: &str,
        external_id: &str,
    ) -> Result<UpsertOutcome, RegistryError> {
        if external_id.trim().is_empty() {
            return Err(RegistryError::Invalid("external id is empty".to_string()));
        }

        let rows = self.read_rows().await?;
        let existing = rows.iter().find(|(_, r)| r.external_id == external_id);

        match existing {
            Some((row, record)) => {
                let range = format!("{}!A{}:C{}", self.sheet_name, row, row);
                self.sheets
                    .update_values(
                        &range,
                        vec![vec![
                            display_name.to_string(),
                            record.real_name.clone(),
                            external_id.to_string(),
                        ]],
                    )
                    .await
                    .map_err(RegistryError::Write)?;
                debug!("Updated registry row {} for {}", row, external_id);
                Ok(UpsertOutcome::Updated)
            }
            None => {
                let range = format!("{}!A:C", self.sheet_name);
                self.sheets
                    .append_values(
                        &range,
                        vec![vec![display_name.to_string(), String::new(), external_id.to_string()]],
                    )
                    .await
                    .map_err(RegistryError::Write)?;
                info!("Registered new contact {}", external_id);
                Ok(UpsertOutcome::Inserted)
            }
        }
    }
}

/// Process-local registry used for tests and dry runs.
#[derive(Default)]
pub struct InMemoryPatientRegistry {
    records: Mutex<Vec<PatientRecord>>,
}

impl InMemoryPatientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patients(records: Vec<PatientRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

#[async_trait]
impl PatientRegistry for InMemoryPatientRegistry {
    async fn list_patients(&self) -> Result<Vec<PatientRecord>, RegistryError> {
        Ok(self.records.lock().await.clone())
    }

    async fn upsert_patient(
        &self,
        display_name: &str,
        external_id: &str,
    ) -> Result<UpsertOutcome, RegistryError> {
        if external_id.trim().is_empty() {
            return Err(RegistryError::Invalid("external id is empty".to_string()));
        }

        let mut records = self.records.lock().await;
        match records.iter_mut().find(|r| r.external_id == external_id) {
            Some(record) => {
                record.display_name = display_name.to_string();
                Ok(UpsertOutcome::Updated)
            }
            None => {
                records.push(PatientRecord::new(display_name, "", external_id));
                Ok(UpsertOutcome::Inserted)
            }
        }
    }
}
