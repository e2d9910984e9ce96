//! End-to-end resync against a scripted server.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use tokio_test::io::{Builder, Mock};

use mailmirror_imap::{
    Capability, Connection, FetchPart, FetchProfile, FolderSession, ModSeq, OpenMode, QueuePool,
    ResyncCheckpoint, SessionConfig, Uid, UidValidity,
};
use mailmirror_sync::{
    AccountSettings, CollectingListener, ContactBook, DownloadState, FolderClass, LocalMailStore,
    LocalMessage, MemoryStore, RemoteMessage, ResyncCoordinator, SyncEvent,
};

type Pool = QueuePool<Mock>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn session(mock: Mock, name: &str) -> (Arc<Pool>, FolderSession<Pool>) {
    let pool = Arc::new(QueuePool::new([Connection::new(
        mock,
        vec![Capability::QResync],
    )]));
    let session = FolderSession::new(Arc::clone(&pool), name, SessionConfig::new());
    (pool, session)
}

fn stored(uid: u32) -> LocalMessage {
    LocalMessage::from_remote(&RemoteMessage::new(uid.to_string()).with_download(DownloadState::Full))
}

fn select_response() -> Vec<u8> {
    let mut response = b"* 60 EXISTS\r\n\
* OK [UIDVALIDITY 7] UIDs valid\r\n\
* OK [HIGHESTMODSEQ 120] Highest\r\n\
* VANISHED (EARLIER) 100\r\n"
        .to_vec();
    for (seq, uid) in (56..=60).zip(141..=145) {
        response.extend(format!("* {seq} FETCH (UID {uid} FLAGS () MODSEQ (118))\r\n").bytes());
    }
    response.extend(b"A0001 OK [READ-WRITE] mailbox selected\r\n");
    response
}

fn download_response() -> Vec<u8> {
    let mut response = Vec::new();
    for (seq, uid) in (11..=15).zip(80..=84) {
        response.extend(format!("* {seq} FETCH (UID {uid} FLAGS (\\Seen))\r\n").bytes());
    }
    for (seq, uid) in (56..=60).zip(141..=145) {
        response.extend(format!("* {seq} FETCH (UID {uid} FLAGS ())\r\n").bytes());
    }
    response.extend(b"A0003 OK FETCH completed\r\n");
    response
}

#[tokio::test]
async fn resumed_select_downloads_new_mail_and_backfills() {
    init_tracing();
    let mock = Builder::new()
        .write(b"A0000 ENABLE QRESYNC\r\n")
        .read(b"* ENABLED QRESYNC\r\nA0000 OK Enabled\r\n")
        .write(b"A0001 SELECT INBOX (QRESYNC (7 100))\r\n")
        .read(&select_response())
        .write(b"A0002 UID SEARCH 11:15 NOT DELETED\r\n")
        .read(b"* SEARCH 80 81 82 83 84\r\nA0002 OK SEARCH completed\r\n")
        .write(b"A0003 UID FETCH 80:84,141:145 (UID FLAGS)\r\n")
        .read(&download_response())
        .build();
    let (pool, mut inbox) = session(mock, "INBOX");

    let account = AccountSettings::new("Work");
    let listener = CollectingListener::new();
    let coordinator = ResyncCoordinator::new(&account, &listener);
    let mut store = (100..=140)
        .fold(MemoryStore::new("INBOX"), |store, uid| store.with_message(stored(uid)))
        .with_visible_limit(50)
        .with_classes(FolderClass::FirstClass, FolderClass::FirstClass)
        .with_last_uid(140);
    let checkpoint =
        ResyncCheckpoint::new(UidValidity::new(7).unwrap(), ModSeq::from_u64(100).unwrap());

    let bootstrap = inbox
        .select(OpenMode::ReadWrite, Some(checkpoint))
        .await
        .unwrap()
        .unwrap();
    let outcome = coordinator
        .continue_sync(&mut inbox, &mut store, &bootstrap, &[])
        .await
        .unwrap();

    assert_eq!(outcome.deleted, 1);
    assert_eq!(outcome.local_count, 45);
    assert_eq!(outcome.backfill, 5);
    let expected: Vec<Uid> = (141..=145)
        .chain((80..=84).rev())
        .map(|n| Uid::new(n).unwrap())
        .collect();
    assert_eq!(outcome.to_download, expected);

    let profile = FetchProfile::new().with(FetchPart::Flags);
    let notified = coordinator
        .download_queued(&mut inbox, &mut store, &outcome, &profile, &ContactBook::new())
        .await
        .unwrap();

    assert_eq!(notified, vec!["141", "142", "143", "144", "145"]);
    assert_eq!(store.message_count(), 50);
    assert_eq!(store.last_uid(), Some(145));
    assert_eq!(store.push_state().as_deref(), Some("uidNext=146"));
    assert!(store.message("82").unwrap().unwrap().is_seen());
    assert_eq!(
        listener.events().last(),
        Some(&SyncEvent::Finished {
            folder: "INBOX".into(),
            total: 50,
            new: 5
        })
    );

    inbox.close().await;
    assert_eq!(pool.idle_count(), 1);
}

#[tokio::test]
async fn uncreatable_trash_reports_empty_sync() {
    init_tracing();
    let mock = Builder::new()
        .write(b"A0000 STATUS Trash (UIDVALIDITY)\r\n")
        .read(b"A0000 NO No such mailbox\r\n")
        .write(b"A0001 CREATE Trash\r\n")
        .read(b"A0001 NO Permission denied\r\n")
        .build();
    let (pool, mut trash) = session(mock, "Trash");
    let mut account = AccountSettings::new("Work");
    account.folders.trash = Some("Trash".into());
    let listener = CollectingListener::new();

    let ok = ResyncCoordinator::new(&account, &listener)
        .verify_special_folder(&mut trash)
        .await
        .unwrap();

    assert!(!ok);
    assert_eq!(
        listener.events(),
        vec![SyncEvent::Finished {
            folder: "Trash".into(),
            total: 0,
            new: 0
        }]
    );
    assert_eq!(pool.idle_count(), 1);
}
