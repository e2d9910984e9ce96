//! Account settings model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which folder classes an account policy admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderMode {
    /// No folder.
    None,
    /// First-class folders only.
    FirstClassOnly,
    /// First- and second-class folders.
    FirstAndSecondClass,
    /// Everything except second-class folders.
    #[default]
    NotSecondClass,
}

impl FolderMode {
    /// All modes, for exhaustive checks.
    pub const ALL: [Self; 4] = [
        Self::None,
        Self::FirstClassOnly,
        Self::FirstAndSecondClass,
        Self::NotSecondClass,
    ];

    /// True when a folder of `class` falls under this policy.
    #[must_use]
    pub const fn admits(self, class: FolderClass) -> bool {
        match self {
            Self::None => false,
            Self::FirstClassOnly => matches!(class, FolderClass::FirstClass),
            Self::FirstAndSecondClass => {
                matches!(class, FolderClass::FirstClass | FolderClass::SecondClass)
            }
            Self::NotSecondClass => !matches!(class, FolderClass::SecondClass),
        }
    }
}

/// Class the user assigned to a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderClass {
    /// Unclassified.
    #[default]
    NoClass,
    /// First class.
    FirstClass,
    /// Second class.
    SecondClass,
}

impl FolderClass {
    /// All classes, for exhaustive checks.
    pub const ALL: [Self; 3] = [Self::NoClass, Self::FirstClass, Self::SecondClass];
}

/// How the account's remote store tracks messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// UID-addressed IMAP folders.
    #[default]
    Imap,
    /// Store that only remembers how far it has read; old messages may
    /// reappear and are filtered by date.
    WatermarkOnly,
}

/// Names of the account's special folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialFolders {
    /// Inbox.
    pub inbox: String,
    /// Trash.
    pub trash: Option<String>,
    /// Drafts.
    pub drafts: Option<String>,
    /// Spam.
    pub spam: Option<String>,
    /// Sent.
    pub sent: Option<String>,
}

impl Default for SpecialFolders {
    fn default() -> Self {
        Self {
            inbox: "INBOX".to_string(),
            trash: None,
            drafts: None,
            spam: None,
            sent: None,
        }
    }
}

impl SpecialFolders {
    /// True for the inbox.
    #[must_use]
    pub fn is_inbox(&self, folder: &str) -> bool {
        self.inbox == folder
    }

    /// True for trash, drafts, spam or sent.
    #[must_use]
    pub fn is_special(&self, folder: &str) -> bool {
        [&self.trash, &self.drafts, &self.spam, &self.sent]
            .into_iter()
            .flatten()
            .any(|name| name == folder)
    }

    /// True for folders that must exist remotely: trash, sent and drafts.
    #[must_use]
    pub fn is_required(&self, folder: &str) -> bool {
        [&self.trash, &self.sent, &self.drafts]
            .into_iter()
            .flatten()
            .any(|name| name == folder)
    }
}

/// Per-account synchronization and notification settings.
///
/// # Example
///
/// ```
/// use mailmirror_sync::account::{AccountSettings, FolderMode};
///
/// let settings = AccountSettings::from_json(r#"{
///     "name": "Work",
///     "notify_mode": "first_class_only",
///     "identities": ["me@example.com"]
/// }"#).unwrap();
/// assert_eq!(settings.notify_mode, FolderMode::FirstClassOnly);
/// assert!(settings.notify_new_mail);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    /// Display name; `None` while the account is still being set up.
    pub name: Option<String>,
    /// Notify about new mail.
    pub notify_new_mail: bool,
    /// Notify about mail sent from one of the account's identities.
    pub notify_self: bool,
    /// Notify only about mail from known contacts.
    pub notify_contacts_only: bool,
    /// Which folders are shown.
    pub display_mode: FolderMode,
    /// Which folders notify.
    pub notify_mode: FolderMode,
    /// Special folder names.
    pub folders: SpecialFolders,
    /// The account's own addresses.
    pub identities: Vec<String>,
    /// Remote store kind.
    pub store_kind: StoreKind,
    /// Date of the newest message already seen as "old".
    pub latest_old_message_seen: Option<DateTime<Utc>>,
    /// Remove local copies of messages expunged remotely.
    pub sync_remote_deletions: bool,
    /// Ignore messages older than this day when backfilling.
    pub earliest_poll_date: Option<NaiveDate>,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            name: None,
            notify_new_mail: true,
            notify_self: true,
            notify_contacts_only: false,
            display_mode: FolderMode::NotSecondClass,
            notify_mode: FolderMode::FirstClassOnly,
            folders: SpecialFolders::default(),
            identities: Vec::new(),
            store_kind: StoreKind::Imap,
            latest_old_message_seen: None,
            sync_remote_deletions: true,
            earliest_poll_date: None,
        }
    }
}

impl AccountSettings {
    /// Creates settings for a named account.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Parses settings from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// [`Error::Serde`] on malformed JSON, [`Error::Config`] when the
    /// settings fail validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        super::validate_settings(&settings).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            Error::Config(messages.join("; "))
        })?;
        Ok(settings)
    }

    /// Serializes to pretty JSON.
    ///
    /// # Errors
    ///
    /// [`Error::Serde`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// True once the account has a name.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.name.is_some()
    }

    /// True when any of `addresses` is one of the account's identities.
    #[must_use]
    pub fn is_an_identity(&self, addresses: &[String]) -> bool {
        addresses.iter().any(|address| {
            self.identities
                .iter()
                .any(|identity| identity.eq_ignore_ascii_case(address))
        })
    }
}
