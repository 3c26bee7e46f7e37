//! # Kedai Core
//!
//! Core business logic for the Kedai CMS: class registration records, their
//! sharded JSON storage, and the render-row assembly that applies the
//! normalisation rules from `kedai-rules`.
//!
//! Records persist the *canonical* forms — the `62…` contact number and the
//! write-time-classified [`AssetRef`] — so display renditions are always
//! derived, never stored.
//!
//! **No API concerns**: HTTP serving belongs in the `kedai-run` binary, the
//! operator surface in `kedai-cli`.

pub mod constants;
pub mod ids;

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use kedai_rules::asset::AssetRef;
use kedai_rules::description::{split_structured_description, StructuredDescription};
use kedai_types::{NonEmptyText, WhatsappNumber};

use crate::constants::{
    DATA_DIR_ENV, DEFAULT_DATA_DIR, REGISTRATIONS_DIR_NAME, REGISTRATION_JSON_FILENAME,
};
use crate::ids::RegistrationId;

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("registration not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Id(#[from] ids::IdError),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write registration file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read registration file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize registration: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize registration: {0}")]
    Deserialization(serde_json::Error),
}

pub type RegistrationResult<T> = std::result::Result<T, RegistrationError>;

/// A persisted class registration record.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub participant_name: NonEmptyText,
    /// Canonical `62…` contact number.
    pub contact_whatsapp: WhatsappNumber,
    pub class_name: NonEmptyText,
    /// Free-text class description; may carry a `Materi:`-style bullet list.
    #[serde(default)]
    pub description: String,
    /// Payment proof, classified at write time.
    #[serde(default)]
    pub payment_proof: Option<AssetRef>,
    /// Issued certificate, classified at write time.
    #[serde(default)]
    pub certificate: Option<AssetRef>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a registration; raw strings exactly as submitted.
#[derive(Debug, Clone, Default)]
pub struct NewRegistration {
    pub participant_name: String,
    pub contact_whatsapp: String,
    pub class_name: String,
    pub description: String,
    /// Raw stored reference in any of the legacy shapes, or absent.
    pub payment_proof: Option<String>,
    pub certificate: Option<String>,
}

/// Admin-table view of a registration with every display form pre-computed.
#[derive(Debug, Clone, PartialEq, serde::Serialize, utoipa::ToSchema)]
pub struct RegistrationRow {
    pub id: String,
    pub participant_name: String,
    /// e.g. `+62 8123-4567-890`
    pub whatsapp_display: String,
    /// e.g. `https://wa.me/6281234567890`
    pub wa_link: String,
    pub class_name: String,
    pub materials: StructuredDescription,
    pub payment_proof_url: Option<String>,
    pub payment_proof_is_pdf: bool,
    pub certificate_url: Option<String>,
    pub certificate_is_pdf: bool,
    pub created_at: String,
}

/// Pure registration data operations - no API concerns
#[derive(Debug, Clone)]
pub struct RegistrationService {
    data_dir: PathBuf,
}

impl RegistrationService {
    /// Creates a service rooted at the configured data directory.
    ///
    /// The directory comes from `KEDAI_DATA_DIR`, defaulting to `cms_data`.
    /// Nothing is created until the first write.
    pub fn new() -> Self {
        let base = std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
        Self {
            data_dir: PathBuf::from(base),
        }
    }

    /// Creates a service rooted at an explicit directory.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Creates and persists a registration record.
    ///
    /// Validates the participant name, class name and contact number, and
    /// classifies any supplied proof/certificate reference once, so the
    /// stored record never needs the read-time heuristics.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::InvalidInput` for blank names or a
    /// digitless contact number, and the storage error variants for I/O or
    /// serialization failures.
    pub fn create(&self, input: NewRegistration) -> RegistrationResult<Registration> {
        let participant_name = NonEmptyText::new(&input.participant_name)
            .map_err(|_| RegistrationError::InvalidInput("participant name is required".into()))?;
        let class_name = NonEmptyText::new(&input.class_name)
            .map_err(|_| RegistrationError::InvalidInput("class name is required".into()))?;
        let contact_whatsapp = WhatsappNumber::parse(&input.contact_whatsapp).map_err(|_| {
            RegistrationError::InvalidInput("contact WhatsApp number is required".into())
        })?;

        let payment_proof = input
            .payment_proof
            .as_deref()
            .and_then(AssetRef::from_raw);
        let certificate = input
            .certificate
            .as_deref()
            .and_then(AssetRef::from_certificate);

        let registration = Registration {
            id: RegistrationId::new(),
            participant_name,
            contact_whatsapp,
            class_name,
            description: input.description,
            payment_proof,
            certificate,
            created_at: Utc::now(),
        };

        let record_dir = registration.id.sharded_dir(&self.registrations_dir());
        fs::create_dir_all(&record_dir).map_err(RegistrationError::StorageDirCreation)?;

        let json = serde_json::to_string_pretty(&registration)
            .map_err(RegistrationError::Serialization)?;
        fs::write(record_dir.join(REGISTRATION_JSON_FILENAME), json)
            .map_err(RegistrationError::FileWrite)?;

        tracing::info!(id = %registration.id, "registration created");
        Ok(registration)
    }

    /// Loads a single registration by its canonical id.
    ///
    /// # Errors
    ///
    /// Returns `RegistrationError::Id` for a non-canonical id,
    /// `RegistrationError::NotFound` when no record exists, and the read /
    /// deserialization variants for storage failures.
    pub fn get(&self, id: &str) -> RegistrationResult<Registration> {
        let id = RegistrationId::parse(id)?;
        let record_path = id
            .sharded_dir(&self.registrations_dir())
            .join(REGISTRATION_JSON_FILENAME);

        if !record_path.is_file() {
            return Err(RegistrationError::NotFound(id.to_string()));
        }

        let contents = fs::read_to_string(&record_path).map_err(RegistrationError::FileRead)?;
        serde_json::from_str(&contents).map_err(RegistrationError::Deserialization)
    }

    /// Lists all registration records, newest first.
    ///
    /// Traverses the sharded directory structure under the data directory and
    /// reads every `registration.json`. Records that fail to parse are logged
    /// as a warning and skipped, so one corrupt file never hides the rest.
    pub fn list(&self) -> Vec<Registration> {
        let mut registrations = Vec::new();

        let s1_iter = match fs::read_dir(self.registrations_dir()) {
            Ok(it) => it,
            Err(_) => return registrations,
        };
        for s1 in s1_iter.flatten() {
            let s1_path = s1.path();
            if !s1_path.is_dir() {
                continue;
            }

            let s2_iter = match fs::read_dir(&s1_path) {
                Ok(it) => it,
                Err(_) => continue,
            };
            for s2 in s2_iter.flatten() {
                let s2_path = s2.path();
                if !s2_path.is_dir() {
                    continue;
                }

                let id_iter = match fs::read_dir(&s2_path) {
                    Ok(it) => it,
                    Err(_) => continue,
                };
                for id_ent in id_iter.flatten() {
                    let record_path = id_ent.path().join(REGISTRATION_JSON_FILENAME);
                    if !record_path.is_file() {
                        continue;
                    }

                    match fs::read_to_string(&record_path)
                        .map_err(RegistrationError::FileRead)
                        .and_then(|contents| {
                            serde_json::from_str::<Registration>(&contents)
                                .map_err(RegistrationError::Deserialization)
                        }) {
                        Ok(registration) => registrations.push(registration),
                        Err(e) => {
                            tracing::warn!(
                                "skipping unreadable registration {}: {}",
                                record_path.display(),
                                e
                            );
                        }
                    }
                }
            }
        }

        registrations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        registrations
    }

    /// Assembles the admin-table row for a registration.
    pub fn row(registration: &Registration) -> RegistrationRow {
        RegistrationRow {
            id: registration.id.to_string(),
            participant_name: registration.participant_name.to_string(),
            whatsapp_display: registration.contact_whatsapp.display_form(),
            wa_link: registration.contact_whatsapp.wa_link(),
            class_name: registration.class_name.to_string(),
            materials: split_structured_description(&registration.description),
            payment_proof_url: registration
                .payment_proof
                .as_ref()
                .map(|r| r.as_url().to_string()),
            payment_proof_is_pdf: registration
                .payment_proof
                .as_ref()
                .is_some_and(AssetRef::is_pdf),
            certificate_url: registration
                .certificate
                .as_ref()
                .map(|r| r.as_url().to_string()),
            certificate_is_pdf: registration
                .certificate
                .as_ref()
                .is_some_and(AssetRef::is_pdf),
            created_at: registration.created_at.to_rfc3339(),
        }
    }

    /// Lists all registrations as admin-table rows, newest first.
    pub fn list_rows(&self) -> Vec<RegistrationRow> {
        self.list().iter().map(Self::row).collect()
    }

    fn registrations_dir(&self) -> PathBuf {
        self.data_dir.join(REGISTRATIONS_DIR_NAME)
    }
}

impl Default for RegistrationService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_input() -> NewRegistration {
        NewRegistration {
            participant_name: "Budi Santoso".into(),
            contact_whatsapp: "0812-3456-7890".into(),
            class_name: "Latte Art Basic".into(),
            description: "Kelas pengenalan. Materi: Steaming • Pouring dasar".into(),
            payment_proof: Some("a.jpg".into()),
            certificate: Some("cert.pdf".into()),
        }
    }

    #[test]
    fn create_persists_canonical_forms() {
        let temp = TempDir::new().unwrap();
        let service = RegistrationService::with_data_dir(temp.path());

        let registration = service.create(sample_input()).unwrap();
        assert_eq!(registration.contact_whatsapp.as_str(), "6281234567890");
        assert_eq!(
            registration.payment_proof,
            Some(AssetRef::Filename {
                name: "a.jpg".into(),
                path: "/payment-proofs/a.jpg".into()
            })
        );

        // The stored JSON carries the canonical number and the tagged union.
        let record_path = registration
            .id
            .sharded_dir(&temp.path().join(REGISTRATIONS_DIR_NAME))
            .join(REGISTRATION_JSON_FILENAME);
        let stored: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(record_path).unwrap()).unwrap();
        assert_eq!(stored["contact_whatsapp"], "6281234567890");
        assert_eq!(stored["payment_proof"]["kind"], "filename");
    }

    #[test]
    fn create_rejects_blank_fields() {
        let temp = TempDir::new().unwrap();
        let service = RegistrationService::with_data_dir(temp.path());

        let mut input = sample_input();
        input.participant_name = "  ".into();
        assert!(matches!(
            service.create(input),
            Err(RegistrationError::InvalidInput(_))
        ));

        let mut input = sample_input();
        input.contact_whatsapp = "no digits".into();
        assert!(matches!(
            service.create(input),
            Err(RegistrationError::InvalidInput(_))
        ));
    }

    #[test]
    fn blank_proof_is_stored_as_absent() {
        let temp = TempDir::new().unwrap();
        let service = RegistrationService::with_data_dir(temp.path());

        let mut input = sample_input();
        input.payment_proof = Some("   ".into());
        input.certificate = None;
        let registration = service.create(input).unwrap();
        assert_eq!(registration.payment_proof, None);
        assert_eq!(registration.certificate, None);
    }

    #[test]
    fn get_roundtrip_and_not_found() {
        let temp = TempDir::new().unwrap();
        let service = RegistrationService::with_data_dir(temp.path());

        let created = service.create(sample_input()).unwrap();
        let loaded = service.get(created.id.as_str()).unwrap();
        assert_eq!(loaded.participant_name, created.participant_name);
        assert_eq!(loaded.contact_whatsapp, created.contact_whatsapp);

        let missing = service.get("550e8400e29b41d4a716446655440000");
        assert!(matches!(missing, Err(RegistrationError::NotFound(_))));

        let invalid = service.get("not-an-id");
        assert!(matches!(invalid, Err(RegistrationError::Id(_))));
    }

    #[test]
    fn list_returns_newest_first_and_skips_corrupt_records() {
        let temp = TempDir::new().unwrap();
        let service = RegistrationService::with_data_dir(temp.path());

        let first = service.create(sample_input()).unwrap();
        let mut second_input = sample_input();
        second_input.participant_name = "Siti Rahma".into();
        let second = service.create(second_input).unwrap();

        // Drop a corrupt record into a valid sharded location.
        let corrupt_dir = temp
            .path()
            .join(REGISTRATIONS_DIR_NAME)
            .join("aa")
            .join("bb")
            .join("aabbccddeeff00112233445566778899");
        std::fs::create_dir_all(&corrupt_dir).unwrap();
        std::fs::write(corrupt_dir.join(REGISTRATION_JSON_FILENAME), "not json").unwrap();

        let listed = service.list();
        assert_eq!(listed.len(), 2);
        let ids: Vec<&str> = listed.iter().map(|r| r.id.as_str()).collect();
        assert!(ids.contains(&first.id.as_str()));
        assert!(ids.contains(&second.id.as_str()));
        assert!(listed[0].created_at >= listed[1].created_at);
    }

    #[test]
    fn list_on_missing_data_dir_is_empty() {
        let service = RegistrationService::with_data_dir("/nonexistent/kedai-test");
        assert!(service.list().is_empty());
    }

    #[test]
    fn row_carries_all_display_forms() {
        let temp = TempDir::new().unwrap();
        let service = RegistrationService::with_data_dir(temp.path());

        let registration = service.create(sample_input()).unwrap();
        let row = RegistrationService::row(&registration);

        assert_eq!(row.whatsapp_display, "+62 8123-4567-890");
        assert_eq!(row.wa_link, "https://wa.me/6281234567890");
        assert_eq!(row.payment_proof_url.as_deref(), Some("/payment-proofs/a.jpg"));
        assert!(!row.payment_proof_is_pdf);
        assert_eq!(row.certificate_url.as_deref(), Some("/certificates/cert.pdf"));
        assert!(row.certificate_is_pdf);
        assert_eq!(row.materials.intro, "Kelas pengenalan.");
        assert_eq!(row.materials.heading.as_deref(), Some("Materi:"));
        assert_eq!(row.materials.items, vec!["Steaming", "Pouring dasar"]);
    }
}
