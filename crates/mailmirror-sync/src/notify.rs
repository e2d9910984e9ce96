//! New-mail notification gate.

use thiserror::Error;

use crate::account::{AccountSettings, FolderClass, StoreKind};
use crate::contacts::ContactDirectory;
use crate::model::RemoteMessage;
use crate::store::LocalMailStore;

/// The first condition that blocked a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum NotifyBlock {
    /// The account has no name yet.
    #[error("account is not configured")]
    AccountNotConfigured,
    /// New-mail notifications are off.
    #[error("notifications are disabled")]
    NotificationsDisabled,
    /// The message is already read.
    #[error("message is already seen")]
    AlreadySeen,
    /// The folder is not displayed.
    #[error("folder is hidden")]
    FolderHidden,
    /// The folder does not notify.
    #[error("folder does not notify")]
    FolderNotNotified,
    /// Older than the newest message already seen as old.
    #[error("message is older than the last seen old message")]
    OlderThanLastSeen,
    /// Trash, drafts, spam or sent.
    #[error("folder is a special folder")]
    SpecialFolder,
    /// UID at or below the folder's last notified UID.
    #[error("message was already notified")]
    AlreadyNotified,
    /// Sent from one of the account's identities.
    #[error("message is from the account itself")]
    FromSelf,
    /// Sender is not a known contact.
    #[error("sender is not a contact")]
    NotAContact,
}

/// Folder facts the gate needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyFolder {
    /// Folder name.
    pub name: String,
    /// Display class.
    pub display_class: FolderClass,
    /// Notify class.
    pub notify_class: FolderClass,
    /// Highest UID already notified about.
    pub last_uid: Option<u32>,
}

impl NotifyFolder {
    /// Reads the folder facts from a store.
    pub fn from_store<S: LocalMailStore + ?Sized>(store: &S) -> Self {
        Self {
            name: store.folder_name().to_string(),
            display_class: store.display_class(),
            notify_class: store.notify_class(),
            last_uid: store.last_uid(),
        }
    }
}

/// Checks every notification condition in order and reports the first
/// one that fails.
///
/// # Errors
///
/// The blocking condition.
pub fn check_notification<C>(
    account: &AccountSettings,
    folder: &NotifyFolder,
    message: &RemoteMessage,
    contacts: &C,
) -> Result<(), NotifyBlock>
where
    C: ContactDirectory + ?Sized,
{
    if !account.is_configured() {
        return Err(NotifyBlock::AccountNotConfigured);
    }
    if !account.notify_new_mail {
        return Err(NotifyBlock::NotificationsDisabled);
    }
    if message.flags.is_seen() {
        return Err(NotifyBlock::AlreadySeen);
    }
    if !account.display_mode.admits(folder.display_class) {
        return Err(NotifyBlock::FolderHidden);
    }
    if !account.notify_mode.admits(folder.notify_class) {
        return Err(NotifyBlock::FolderNotNotified);
    }
    if account.store_kind == StoreKind::WatermarkOnly {
        let older = match (message.internal_date, account.latest_old_message_seen) {
            (Some(date), Some(latest)) => date < latest,
            _ => false,
        };
        if older {
            return Err(NotifyBlock::OlderThanLastSeen);
        }
    }
    if !account.folders.is_inbox(&folder.name) && account.folders.is_special(&folder.name) {
        return Err(NotifyBlock::SpecialFolder);
    }
    let already = match (message.uid.parse::<u32>(), folder.last_uid) {
        (Ok(uid), Some(last)) => uid <= last,
        _ => false,
    };
    if already {
        return Err(NotifyBlock::AlreadyNotified);
    }
    if !account.notify_self && account.is_an_identity(&message.from) {
        return Err(NotifyBlock::FromSelf);
    }
    if account.notify_contacts_only && !contacts.is_any_in_contacts(&message.from) {
        return Err(NotifyBlock::NotAContact);
    }
    Ok(())
}

/// True when the user should be told about `message`.
#[must_use]
pub fn should_notify<C>(
    account: &AccountSettings,
    folder: &NotifyFolder,
    message: &RemoteMessage,
    contacts: &C,
) -> bool
where
    C: ContactDirectory + ?Sized,
{
    check_notification(account, folder, message, contacts).is_ok()
}
