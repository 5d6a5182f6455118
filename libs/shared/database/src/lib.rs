pub mod error;
pub mod google_auth;
pub mod registry;
pub mod sheets;

pub use error::{GoogleApiError, RegistryError};
pub use google_auth::{ServiceAccountTokenProvider, StaticTokenProvider, TokenProvider};
pub use registry::{InMemoryPatientRegistry, PatientRegistry, SheetsPatientRegistry, UpsertOutcome};
pub use sheets::SheetsClient;
