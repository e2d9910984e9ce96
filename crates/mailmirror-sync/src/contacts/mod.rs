//! Known contacts, consulted by the notification gate.

mod model;

pub use model::Contact;

/// Lookup of known correspondents.
pub trait ContactDirectory {
    /// True when any of `addresses` belongs to a known contact.
    fn is_any_in_contacts(&self, addresses: &[String]) -> bool;
}

/// In-memory [`ContactDirectory`].
#[derive(Debug, Clone, Default)]
pub struct ContactBook {
    contacts: Vec<Contact>,
}

impl ContactBook {
    /// Creates an empty book.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            contacts: Vec::new(),
        }
    }

    /// Adds a contact unless its address is already known.
    pub fn add(&mut self, contact: Contact) {
        if !self.contacts.iter().any(|c| c.has_address(&contact.email)) {
            self.contacts.push(contact);
        }
    }

    /// Number of contacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// True when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

impl FromIterator<Contact> for ContactBook {
    fn from_iter<I: IntoIterator<Item = Contact>>(iter: I) -> Self {
        let mut book = Self::new();
        for contact in iter {
            book.add(contact);
        }
        book
    }
}

impl ContactDirectory for ContactBook {
    fn is_any_in_contacts(&self, addresses: &[String]) -> bool {
        addresses
            .iter()
            .any(|address| self.contacts.iter().any(|c| c.has_address(address)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_dedup() {
        let book: ContactBook = [
            Contact::new("a@example.com", "A"),
            Contact::new("A@EXAMPLE.COM", "dup"),
            Contact::new("b@example.com", ""),
        ]
        .into_iter()
        .collect();

        assert_eq!(book.len(), 2);
        assert!(book.is_any_in_contacts(&["x@example.com".into(), "B <b@example.com>".into()]));
        assert!(!book.is_any_in_contacts(&["x@example.com".into()]));
        assert!(!ContactBook::new().is_any_in_contacts(&["a@example.com".into()]));
    }
}
