use hps_uuid::PatientId;

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid {field}: {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: hps_types::TextError,
    },
    #[error("invalid patient id: {0}")]
    Uuid(#[from] hps_uuid::UuidError),
    #[error("patient not found: {0}")]
    NotFound(PatientId),
    #[error("patient already exists: {0}")]
    AlreadyExists(PatientId),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to create patient directory: {0}")]
    PatientDirCreation(std::io::Error),
    #[error("failed to write patient file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read patient file: {0}")]
    FileRead(std::io::Error),
    #[error("patient file is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("FHIR error: {0}")]
    Fhir(#[from] fhir::FhirError),
    #[error("stored patient {id} is incomplete: {reason}")]
    IncompleteRecord { id: PatientId, reason: String },
    #[error("patient store lock poisoned")]
    StorePoisoned,
}

impl PatientError {
    /// Whether the error was caused by the caller's input rather than the store.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::InvalidField { .. } | Self::Uuid(_)
        )
    }
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;
