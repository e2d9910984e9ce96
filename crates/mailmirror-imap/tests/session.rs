//! Folder session tests against scripted servers.
//!
//! Every exchange is scripted with `tokio_test::io::Builder`; a command the
//! session sends out of order fails the mock.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio_test::io::{Builder, Mock};
use tokio_test::{assert_pending, task};

use mailmirror_imap::connection::normalize_crlf;
use mailmirror_imap::{
    AppendMessage, Capability, Connection, ErrorKind, FetchPart, FetchProfile, Flag, FolderSession,
    ModSeq, OpenMode, QueuePool, ResyncCheckpoint, SessionConfig, Uid, UidValidity,
};

type Pool = QueuePool<Mock>;

const EXAMINE_INBOX: &[u8] = b"* 3 EXISTS\r\n\
* OK [UIDVALIDITY 7] UIDs valid\r\n\
* OK [UIDNEXT 4] Predicted next UID\r\n\
A0000 OK [READ-ONLY] EXAMINE completed\r\n";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn uid(n: u32) -> Uid {
    Uid::new(n).unwrap()
}

fn session_with(
    mock: Mock,
    capabilities: Vec<Capability>,
    name: &str,
    config: SessionConfig,
) -> (Arc<Pool>, FolderSession<Pool>) {
    init_tracing();
    let pool = Arc::new(QueuePool::new([Connection::new(mock, capabilities)]));
    let session = FolderSession::new(Arc::clone(&pool), name, config);
    (pool, session)
}

fn session(mock: Mock) -> (Arc<Pool>, FolderSession<Pool>) {
    session_with(mock, vec![], "INBOX", SessionConfig::new())
}

mod select_tests {
    use super::*;

    #[tokio::test]
    async fn reselect_in_same_mode_only_sends_noop() {
        let mock = Builder::new()
            .write(b"A0000 EXAMINE INBOX\r\n")
            .read(EXAMINE_INBOX)
            .write(b"A0001 NOOP\r\n")
            .read(b"A0001 OK NOOP completed\r\n")
            .build();
        let (pool, mut inbox) = session(mock);

        assert!(inbox.select(OpenMode::ReadOnly, None).await.unwrap().is_none());
        assert_eq!(inbox.mode(), Some(OpenMode::ReadOnly));
        assert_eq!(inbox.message_count(), Some(3));
        assert_eq!(inbox.uid_next(), Some(uid(4)));

        assert!(inbox.select(OpenMode::ReadOnly, None).await.unwrap().is_none());
        assert_eq!(inbox.uid_validity(), UidValidity::new(7));
        assert_eq!(inbox.highest_mod_seq(), None);

        inbox.close().await;
        assert!(!inbox.is_open());
        assert_eq!(inbox.message_count(), None);
        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn qresync_select_returns_bootstrap() {
        let mock = Builder::new()
            .write(b"A0000 ENABLE QRESYNC\r\n")
            .read(b"* ENABLED QRESYNC\r\nA0000 OK Enabled\r\n")
            .write(b"A0001 SELECT INBOX (QRESYNC (67890007 20050715194045000))\r\n")
            .read(
                b"* 314 EXISTS\r\n\
* OK [UIDVALIDITY 67890007] UIDs valid\r\n\
* OK [UIDNEXT 567] Predicted next UID\r\n\
* OK [HIGHESTMODSEQ 20050715194045319] Highest\r\n\
* VANISHED (EARLIER) 41,43:45\r\n\
* 49 FETCH (UID 117 FLAGS (\\Seen \\Answered) MODSEQ (20050715194045300))\r\n\
A0001 OK [READ-WRITE] mailbox selected\r\n",
            )
            .build();
        let (_pool, mut inbox) = session_with(
            mock,
            vec![Capability::QResync],
            "INBOX",
            SessionConfig::new(),
        );
        let checkpoint = ResyncCheckpoint::new(
            UidValidity::new(67_890_007).unwrap(),
            ModSeq::from_u64(20_050_715_194_045_000).unwrap(),
        );

        let bootstrap = inbox
            .select(OpenMode::ReadWrite, Some(checkpoint))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(bootstrap.vanished, vec![uid(41), uid(43), uid(44), uid(45)]);
        assert_eq!(bootstrap.changed.len(), 1);
        assert_eq!(bootstrap.changed[0].uid, Some(uid(117)));
        assert!(bootstrap.changed[0].flags.is_seen());
        assert_eq!(inbox.message_count(), Some(314));
        assert_eq!(inbox.mode(), Some(OpenMode::ReadWrite));
        assert_eq!(
            inbox.highest_mod_seq().map(ModSeq::get),
            Some(20_050_715_194_045_319)
        );
    }

    #[tokio::test]
    async fn changed_uid_validity_discards_checkpoint() {
        let mock = Builder::new()
            .write(b"A0000 ENABLE QRESYNC\r\n")
            .read(b"A0000 OK Enabled\r\n")
            .write(b"A0001 SELECT INBOX (QRESYNC (5 10))\r\n")
            .read(b"* 2 EXISTS\r\n* OK [UIDVALIDITY 6] new\r\nA0001 OK [READ-WRITE] ok\r\n")
            .build();
        let (_pool, mut inbox) =
            session_with(mock, vec![Capability::QResync], "INBOX", SessionConfig::new());
        let checkpoint =
            ResyncCheckpoint::new(UidValidity::new(5).unwrap(), ModSeq::from_u64(10).unwrap());

        let bootstrap = inbox
            .select(OpenMode::ReadWrite, Some(checkpoint))
            .await
            .unwrap();

        assert!(bootstrap.is_none());
        assert_eq!(inbox.uid_validity(), UidValidity::new(6));
    }

    #[tokio::test]
    async fn condstore_without_checkpoint() {
        let mock = Builder::new()
            .write(b"A0000 EXAMINE Archive (CONDSTORE)\r\n")
            .read(b"* 0 EXISTS\r\n* OK [HIGHESTMODSEQ 715] ok\r\nA0000 OK [READ-ONLY] ok\r\n")
            .build();
        let (_pool, mut archive) =
            session_with(mock, vec![Capability::CondStore], "Archive", SessionConfig::new());

        assert!(archive.select(OpenMode::ReadOnly, None).await.unwrap().is_none());
        assert_eq!(archive.highest_mod_seq().map(ModSeq::get), Some(715));
    }

    #[tokio::test]
    async fn server_may_downgrade_to_read_only() {
        let mock = Builder::new()
            .write(b"A0000 SELECT INBOX\r\n")
            .read(b"* 1 EXISTS\r\nA0000 OK [READ-ONLY] no write access\r\n")
            .build();
        let (_pool, mut inbox) = session(mock);

        inbox.select(OpenMode::ReadWrite, None).await.unwrap();
        assert_eq!(inbox.mode(), Some(OpenMode::ReadOnly));
    }

    #[tokio::test]
    async fn missing_message_count_is_state_error() {
        let mock = Builder::new()
            .write(b"A0000 EXAMINE INBOX\r\n")
            .read(b"A0000 OK [READ-ONLY] done\r\n")
            .build();
        let (_pool, mut inbox) = session(mock);

        let err = inbox.select(OpenMode::ReadOnly, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
        assert!(!inbox.is_open());
    }

    #[tokio::test]
    async fn exists_on_closed_session_borrows_a_connection() {
        let mock = Builder::new()
            .write(b"A0000 STATUS Sent (UIDVALIDITY)\r\n")
            .read(b"* STATUS Sent (UIDVALIDITY 3)\r\nA0000 OK\r\n")
            .write(b"A0001 CREATE Sent\r\n")
            .read(b"A0001 NO [ALREADYEXISTS] exists\r\n")
            .build();
        let (pool, mut inbox) = session(mock);

        assert!(inbox.exists("Sent").await.unwrap());
        assert!(!inbox.create("Sent").await.unwrap());
        assert!(!inbox.is_open());
        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn failed_liveness_check_reselects_on_a_fresh_connection() {
        init_tracing();
        let first = Builder::new()
            .write(b"A0000 EXAMINE INBOX\r\n")
            .read(EXAMINE_INBOX)
            .write(b"A0001 NOOP\r\n")
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let second = Builder::new()
            .write(b"A0000 EXAMINE INBOX\r\n")
            .read(
                b"* 5 EXISTS\r\n\
* OK [UIDVALIDITY 9] UIDs valid\r\n\
* OK [UIDNEXT 12] Predicted next UID\r\n\
A0000 OK [READ-ONLY] EXAMINE completed\r\n",
            )
            .build();
        let pool = Arc::new(QueuePool::new([
            Connection::new(first, vec![]),
            Connection::new(second, vec![]),
        ]));
        let mut inbox = FolderSession::new(Arc::clone(&pool), "INBOX", SessionConfig::new());

        inbox.select(OpenMode::ReadOnly, None).await.unwrap();
        assert_eq!(pool.idle_count(), 1);

        assert!(inbox.select(OpenMode::ReadOnly, None).await.unwrap().is_none());
        assert!(inbox.is_open());
        assert_eq!(inbox.message_count(), Some(5));
        assert_eq!(inbox.uid_validity(), UidValidity::new(9));
        assert_eq!(inbox.uid_next(), Some(uid(12)));
        assert_eq!(pool.idle_count(), 0);

        inbox.close().await;
        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn malformed_reply_keeps_the_connection() {
        let mock = Builder::new()
            .write(b"A0000 EXAMINE INBOX\r\n")
            .read(EXAMINE_INBOX)
            .write(b"A0001 NOOP\r\n")
            .read(b"A0001 WHATEVER [garbage\r\n")
            .write(b"A0002 NOOP\r\n")
            .read(b"A0002 OK NOOP completed\r\n")
            .build();
        let (pool, mut inbox) = session(mock);
        inbox.select(OpenMode::ReadOnly, None).await.unwrap();

        let err = inbox.select(OpenMode::ReadOnly, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(inbox.is_open());
        assert_eq!(inbox.message_count(), Some(3));

        assert!(inbox.select(OpenMode::ReadOnly, None).await.unwrap().is_none());
        inbox.close().await;
        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn bye_on_a_borrowed_connection_is_not_pooled() {
        let mock = Builder::new()
            .write(b"A0000 STATUS Sent (UIDVALIDITY)\r\n")
            .read(b"A0000 BYE Server shutting down\r\n")
            .build();
        let (pool, mut inbox) = session(mock);

        let err = inbox.exists("Sent").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(err.closes_connection());
        assert_eq!(pool.idle_count(), 0);
    }
}

mod fetch_tests {
    use super::*;

    #[tokio::test]
    async fn fetch_is_windowed_and_caches_unsolicited_rows() {
        let mock = Builder::new()
            .write(b"A0000 EXAMINE INBOX\r\n")
            .read(EXAMINE_INBOX)
            .write(b"A0001 UID FETCH 1:100 (UID FLAGS)\r\n")
            .read(b"* 1 FETCH (UID 1 FLAGS (\\Seen))\r\n* 7 FETCH (UID 9999 FLAGS ())\r\nA0001 OK\r\n")
            .write(b"A0002 UID FETCH 101:200 (UID FLAGS)\r\n")
            .read(b"A0002 OK\r\n")
            .write(b"A0003 UID FETCH 201:250 (UID FLAGS)\r\n")
            .read(b"* 250 FETCH (UID 250 FLAGS ())\r\nA0003 OK\r\n")
            .build();
        let (_pool, mut inbox) = session(mock);
        inbox.select(OpenMode::ReadOnly, None).await.unwrap();

        let uids: Vec<Uid> = (1..=250).map(uid).collect();
        let profile = FetchProfile::new().with(FetchPart::Flags);
        let messages = inbox.fetch(&uids, &profile).await.unwrap();

        let fetched: Vec<Uid> = messages.iter().filter_map(|m| m.uid).collect();
        assert_eq!(fetched, vec![uid(1), uid(250)]);
        assert_eq!(inbox.uid_for_sequence(7), Some(uid(9999)));
    }

    #[tokio::test]
    async fn fetch_on_closed_folder_is_state_error() {
        let (_pool, mut inbox) = session(Builder::new().build());
        let err = inbox
            .fetch(&[uid(1)], &FetchProfile::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
    }

    #[tokio::test]
    async fn io_failure_closes_the_connection() {
        let mock = Builder::new()
            .write(b"A0000 EXAMINE INBOX\r\n")
            .read(EXAMINE_INBOX)
            .write(b"A0001 UID FETCH 1 (UID FLAGS)\r\n")
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let (pool, mut inbox) = session(mock);
        inbox.select(OpenMode::ReadOnly, None).await.unwrap();

        let err = inbox
            .fetch(&[uid(1)], &FetchProfile::new().with(FetchPart::Flags))
            .await
            .unwrap_err();

        assert!(err.is_transport());
        assert!(!inbox.is_open());
        assert_eq!(inbox.message_count(), None);
        assert_eq!(pool.idle_count(), 0);
    }

    #[tokio::test]
    async fn oversized_literal_discards_the_connection() {
        let mock = Builder::new()
            .write(b"A0000 EXAMINE INBOX\r\n")
            .read(EXAMINE_INBOX)
            .write(b"A0001 UID FETCH 1 (UID FLAGS)\r\n")
            .read(b"* 1 FETCH (UID 1 BODY[] {200000000}\r\n")
            .build();
        let (pool, mut inbox) = session(mock);
        inbox.select(OpenMode::ReadOnly, None).await.unwrap();

        let err = inbox
            .fetch(&[uid(1)], &FetchProfile::new().with(FetchPart::Flags))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("literal too large"));
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(!inbox.is_open());
        inbox.close().await;
        assert_eq!(pool.idle_count(), 0);
    }
}

mod mutation_tests {
    use super::*;

    const SELECT_DRAFTS: &[u8] = b"* 0 EXISTS\r\n\
* OK [PERMANENTFLAGS (\\Seen \\Deleted \\*)] Limited\r\n\
A0000 OK [READ-WRITE] SELECT completed\r\n";

    #[tokio::test]
    async fn append_resolves_uids() {
        let with_uidplus = normalize_crlf(b"Subject: a\nMessage-ID: <m1@x>\n\nhello\n");
        let searched = normalize_crlf(b"Message-ID: <m2@x>\n\nbody");
        let anonymous = normalize_crlf(b"Subject: c\n\nbody");

        let mock = Builder::new()
            .write(b"A0000 SELECT Drafts\r\n")
            .read(SELECT_DRAFTS)
            .write(format!("A0001 APPEND Drafts (\\Seen) {{{}}}\r\n", with_uidplus.len()).as_bytes())
            .read(b"+ Ready for literal data\r\n")
            .write(&with_uidplus)
            .write(b"\r\n")
            .read(b"A0001 OK [APPENDUID 38505 3955] APPEND completed\r\n")
            .write(format!("A0002 APPEND Drafts () {{{}}}\r\n", searched.len()).as_bytes())
            .read(b"+ go\r\n")
            .write(&searched)
            .write(b"\r\n")
            .read(b"A0002 OK APPEND completed\r\n")
            .write(b"A0003 UID SEARCH HEADER MESSAGE-ID <m2@x>\r\n")
            .read(b"* SEARCH 3956\r\nA0003 OK\r\n")
            .write(format!("A0004 APPEND Drafts () {{{}}}\r\n", anonymous.len()).as_bytes())
            .read(b"+ go\r\n")
            .write(&anonymous)
            .write(b"\r\n")
            .read(b"A0004 OK APPEND completed\r\n")
            .build();
        let (_pool, mut drafts) = session_with(mock, vec![], "Drafts", SessionConfig::new());
        drafts.select(OpenMode::ReadWrite, None).await.unwrap();
        assert!(drafts.can_create_keywords());

        let uids = drafts
            .append(&[
                AppendMessage::new(b"Subject: a\nMessage-ID: <m1@x>\n\nhello\n".to_vec())
                    .with_flags([Flag::Seen, Flag::Draft]),
                AppendMessage::new(b"Message-ID: <m2@x>\n\nbody".to_vec()),
                AppendMessage::new(b"Subject: c\n\nbody".to_vec()),
            ])
            .await
            .unwrap();

        assert_eq!(uids, vec![Some(uid(3955)), Some(uid(3956)), None]);
    }

    #[tokio::test]
    async fn copy_creates_missing_destination() {
        let mock = Builder::new()
            .write(b"A0000 EXAMINE INBOX\r\n")
            .read(EXAMINE_INBOX)
            .write(b"A0001 STATUS Archive (UIDVALIDITY)\r\n")
            .read(b"A0001 NO [TRYCREATE] No such mailbox\r\n")
            .write(b"A0002 CREATE Archive\r\n")
            .read(b"A0002 OK CREATE completed\r\n")
            .write(b"A0003 UID COPY 1:2 Archive\r\n")
            .read(b"A0003 OK [COPYUID 8 1:2 30:31] Done\r\n")
            .build();
        let (_pool, mut inbox) = session(mock);
        inbox.select(OpenMode::ReadOnly, None).await.unwrap();

        let mapping = inbox.copy(&[uid(2), uid(1)], "Archive").await.unwrap();

        let expected: HashMap<Uid, Uid> = [(uid(1), uid(30)), (uid(2), uid(31))].into();
        assert_eq!(mapping, expected);
    }

    #[tokio::test]
    async fn delete_inside_trash_only_flags() {
        let mock = Builder::new()
            .write(b"A0000 SELECT Trash\r\n")
            .read(b"* 9 EXISTS\r\nA0000 OK [READ-WRITE] ok\r\n")
            .write(b"A0001 UID STORE 5 +FLAGS.SILENT (\\Deleted)\r\n")
            .read(b"A0001 OK STORE completed\r\n")
            .build();
        let (_pool, mut trash) = session_with(mock, vec![], "Trash", SessionConfig::new());
        trash.select(OpenMode::ReadWrite, None).await.unwrap();

        trash.delete(&[uid(5)], Some("Trash")).await.unwrap();
    }

    #[tokio::test]
    async fn delete_fails_when_trash_cannot_be_created() {
        let mock = Builder::new()
            .write(b"A0000 SELECT INBOX\r\n")
            .read(b"* 9 EXISTS\r\nA0000 OK [READ-WRITE] ok\r\n")
            .write(b"A0001 STATUS Trash (UIDVALIDITY)\r\n")
            .read(b"A0001 NO missing\r\n")
            .write(b"A0002 CREATE Trash\r\n")
            .read(b"A0002 NO denied\r\n")
            .write(b"A0003 STATUS Trash (UIDVALIDITY)\r\n")
            .read(b"A0003 NO missing\r\n")
            .build();
        let (pool, mut inbox) = session(mock);
        inbox.select(OpenMode::ReadWrite, None).await.unwrap();

        let err = inbox.delete(&[uid(5)], Some("Trash")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(inbox.is_open());
        inbox.close().await;
        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn expunge_updates_message_count() {
        let mock = Builder::new()
            .write(b"A0000 SELECT INBOX\r\n")
            .read(b"* 42 EXISTS\r\nA0000 OK [READ-WRITE] ok\r\n")
            .write(b"A0001 EXPUNGE\r\n")
            .read(b"* 3 EXPUNGE\r\nA0001 OK EXPUNGE completed\r\n")
            .build();
        let (_pool, mut inbox) = session(mock);
        inbox.select(OpenMode::ReadWrite, None).await.unwrap();

        inbox.expunge().await.unwrap();
        assert_eq!(inbox.message_count(), Some(41));
    }

    #[tokio::test]
    async fn qresync_expunge_reports_vanished() {
        let mock = Builder::new()
            .write(b"A0000 SELECT INBOX\r\n")
            .read(b"* 10 EXISTS\r\n* OK [HIGHESTMODSEQ 100] ok\r\nA0000 OK [READ-WRITE] ok\r\n")
            .write(b"A0001 EXPUNGE\r\n")
            .read(b"* VANISHED 4:5\r\nA0001 OK [HIGHESTMODSEQ 120] Expunged\r\n")
            .build();
        let (_pool, mut inbox) = session(mock);
        inbox.select(OpenMode::ReadWrite, None).await.unwrap();

        let vanished = inbox.expunge_using_qresync().await.unwrap();
        assert_eq!(vanished, vec![uid(4), uid(5)]);
        assert_eq!(inbox.message_count(), Some(8));
        assert_eq!(inbox.highest_mod_seq().map(ModSeq::get), Some(120));
    }
}

mod search_tests {
    use super::*;

    #[tokio::test]
    async fn search_requires_permission() {
        let (_pool, mut inbox) = session(Builder::new().build());
        let err = inbox.search(Some("x"), &[], &[]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
    }

    #[tokio::test]
    async fn dropped_search_discards_connection_on_close() {
        let mock = Builder::new()
            .write(b"A0000 EXAMINE INBOX\r\n")
            .read(EXAMINE_INBOX)
            .write(b"A0001 UID SEARCH OR SUBJECT invoice FROM invoice\r\n")
            .wait(Duration::from_secs(3600))
            .build();
        let (pool, mut inbox) = session_with(
            mock,
            vec![],
            "INBOX",
            SessionConfig::new().allow_remote_search(true),
        );
        inbox.select(OpenMode::ReadOnly, None).await.unwrap();

        {
            let mut search = task::spawn(inbox.search(Some("invoice"), &[], &[]));
            assert_pending!(search.poll());
        }
        assert!(inbox.in_search());

        inbox.close().await;
        assert!(!inbox.in_search());
        assert_eq!(pool.idle_count(), 0);
    }

    #[tokio::test]
    async fn range_search_sorts_newest_first() {
        let mock = Builder::new()
            .write(b"A0000 EXAMINE INBOX\r\n")
            .read(EXAMINE_INBOX)
            .write(b"A0001 UID SEARCH 1:10 NOT DELETED\r\n")
            .read(b"* SEARCH 3 9 5\r\nA0001 OK\r\n")
            .build();
        let (_pool, mut inbox) = session(mock);
        inbox.select(OpenMode::ReadOnly, None).await.unwrap();

        assert_eq!(
            inbox.messages_in_range(1, 10, None, false).await.unwrap(),
            vec![uid(9), uid(5), uid(3)]
        );
        assert_eq!(
            inbox
                .messages_in_range(5, 4, None, false)
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::State
        );
        assert_eq!(
            inbox
                .messages_in_range(0, 4, None, false)
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::State
        );
    }

    #[tokio::test]
    async fn more_messages_scans_older_windows() {
        let mock = Builder::new()
            .write(b"A0000 EXAMINE INBOX\r\n")
            .read(EXAMINE_INBOX)
            .write(b"A0001 UID SEARCH 3:4 NOT DELETED\r\n")
            .read(b"A0001 OK\r\n")
            .write(b"A0002 UID SEARCH 1:2 NOT DELETED\r\n")
            .read(b"* SEARCH 7\r\nA0002 OK\r\n")
            .build();
        let (_pool, mut inbox) = session_with(
            mock,
            vec![],
            "INBOX",
            SessionConfig::new().more_messages_window(2),
        );
        inbox.select(OpenMode::ReadOnly, None).await.unwrap();

        assert!(!inbox.are_more_messages_available(1, None).await.unwrap());
        assert!(inbox.are_more_messages_available(5, None).await.unwrap());
    }

    #[tokio::test]
    async fn highest_uid_and_counts() {
        let mock = Builder::new()
            .write(b"A0000 EXAMINE INBOX\r\n")
            .read(EXAMINE_INBOX)
            .write(b"A0001 UID SEARCH *:*\r\n")
            .read(b"* SEARCH 3\r\nA0001 OK\r\n")
            .write(b"A0002 UID SEARCH UNSEEN NOT DELETED\r\n")
            .read(b"* SEARCH 1 2\r\nA0002 OK\r\n")
            .write(b"A0003 UID SEARCH FLAGGED NOT DELETED\r\n")
            .read(b"A0003 OK\r\n")
            .write(b"A0004 UID SEARCH *:*\r\n")
            .read(b"A0004 NO empty mailbox\r\n")
            .build();
        let (_pool, mut inbox) = session(mock);
        inbox.select(OpenMode::ReadOnly, None).await.unwrap();

        assert_eq!(inbox.highest_uid().await.unwrap(), Some(uid(3)));
        assert_eq!(inbox.unread_count().await.unwrap(), 2);
        assert_eq!(inbox.flagged_count().await.unwrap(), 0);
        assert_eq!(inbox.highest_uid().await.unwrap(), None);
    }
}
