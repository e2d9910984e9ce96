//! Account settings validation.

use super::model::AccountSettings;

/// Validation error for account settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Account name is present but blank.
    EmptyName,
    /// Inbox folder name is empty.
    EmptyInbox,
    /// An identity is not an email address.
    InvalidIdentity(String),
    /// A special folder is configured as the inbox.
    SpecialFolderIsInbox(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => f.write_str("Account name must not be blank"),
            Self::EmptyInbox => f.write_str("Inbox folder name is required"),
            Self::InvalidIdentity(address) => write!(f, "Invalid identity address: {address}"),
            Self::SpecialFolderIsInbox(name) => {
                write!(f, "Special folder {name} cannot be the inbox")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating settings.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validates account settings.
///
/// # Errors
///
/// Returns every problem found.
pub fn validate_settings(settings: &AccountSettings) -> ValidationResult {
    let mut errors = Vec::new();

    if settings.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        errors.push(ValidationError::EmptyName);
    }

    let folders = &settings.folders;
    if folders.inbox.trim().is_empty() {
        errors.push(ValidationError::EmptyInbox);
    } else if folders.is_special(&folders.inbox) {
        errors.push(ValidationError::SpecialFolderIsInbox(folders.inbox.clone()));
    }

    errors.extend(
        settings
            .identities
            .iter()
            .filter(|address| !is_valid_email(address))
            .map(|address| ValidationError::InvalidIdentity(address.clone())),
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Basic email validation.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.trim().split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|part| !part.is_empty())
}
