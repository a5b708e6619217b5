use thiserror::Error;

use crate::model::ids::InstitutionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InstitutionError {
    #[error("institution name cannot be empty")]
    EmptyName,

    #[error("invalid contact email: {0}")]
    InvalidEmail(String),
}

/// A local organisation offering support services, listed in the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Institution {
    id: InstitutionId,
    name: String,
    location: Option<String>,
    services: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    paid: bool,
}

/// Editable form of an [`Institution`]; blank optional fields are dropped.
#[derive(Clone, Debug, Default)]
pub struct InstitutionDraft {
    pub name: String,
    pub location: Option<String>,
    pub services: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub paid: bool,
}

impl InstitutionDraft {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Validate and normalize the draft.
    ///
    /// # Errors
    ///
    /// Returns `InstitutionError::EmptyName` for a blank name and
    /// `InstitutionError::InvalidEmail` when an email has no `@`.
    pub fn validate(self, id: InstitutionId) -> Result<Institution, InstitutionError> {
        if self.name.trim().is_empty() {
            return Err(InstitutionError::EmptyName);
        }
        if let Some(email) = normalize_optional(self.email.clone()) {
            if !email.contains('@') {
                return Err(InstitutionError::InvalidEmail(email));
            }
        }

        Ok(Institution::from_persisted(id, self))
    }
}

impl Institution {
    /// Rehydrate from storage. Optional fields are normalized, nothing is rejected.
    #[must_use]
    pub fn from_persisted(id: InstitutionId, draft: InstitutionDraft) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            location: normalize_optional(draft.location),
            services: normalize_optional(draft.services),
            phone: normalize_optional(draft.phone),
            email: normalize_optional(draft.email),
            paid: draft.paid,
        }
    }

    #[must_use]
    pub fn id(&self) -> InstitutionId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Free-text description of what the institution offers.
    #[must_use]
    pub fn services(&self) -> Option<&str> {
        self.services.as_deref()
    }

    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Whether the services are paid; `false` means free of charge.
    #[must_use]
    pub fn paid(&self) -> bool {
        self.paid
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
