//! Contact model.

use serde::{Deserialize, Serialize};

/// A known correspondent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Email address (unique identifier).
    pub email: String,
    /// Display name (may be empty).
    #[serde(default)]
    pub name: String,
}

impl Contact {
    /// Creates a new contact.
    #[must_use]
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }

    /// Returns "Name <email>", or just the address when there is no name.
    #[must_use]
    pub fn display(&self) -> String {
        if self.name.is_empty() {
            self.email.clone()
        } else {
            format!("{} <{}>", self.name, self.email)
        }
    }

    /// True when `address` is this contact's address, ignoring case and any
    /// display-name wrapper.
    #[must_use]
    pub fn has_address(&self, address: &str) -> bool {
        bare_address(address).eq_ignore_ascii_case(self.email.trim())
    }
}

/// Strips a `Name <addr>` wrapper.
fn bare_address(address: &str) -> &str {
    let address = address.trim();
    match (address.rfind('<'), address.rfind('>')) {
        (Some(open), Some(close)) if open < close => &address[open + 1..close],
        _ => address,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_and_without_name() {
        assert_eq!(
            Contact::new("test@example.com", "John Doe").display(),
            "John Doe <test@example.com>"
        );
        assert_eq!(Contact::new("test@example.com", "").display(), "test@example.com");
    }

    #[test]
    fn address_match() {
        let contact = Contact::new("john@example.com", "John Doe");
        assert!(contact.has_address("JOHN@example.com"));
        assert!(contact.has_address("John <john@example.com>"));
        assert!(!contact.has_address("jane@example.com"));
    }
}
