//! Document store behavior observed through the public API
use std::sync::Arc;
use std::time::Duration;

use pgn_language_server::core::{Change, DocumentError, EditError, PositionError};
use pgn_language_server::{DocumentManager, TokenKind, tokenize};
use tokio::time::timeout;
use tower_lsp::lsp_types::{Position, Range, Url};

fn uri() -> Url {
    Url::parse("file:///games/sync.pgn").expect("valid url")
}

fn named(name: &str) -> Url {
    Url::parse(&format!("file:///games/{name}.pgn")).expect("valid url")
}

fn insert(line: u32, character: u32, text: &str) -> Change {
    replace((line, character), (line, character), text)
}

fn replace(start: (u32, u32), end: (u32, u32), text: &str) -> Change {
    Change::Incremental {
        range: Range::new(Position::new(start.0, start.1), Position::new(end.0, end.1)),
        text: text.to_string(),
    }
}

#[tokio::test]
async fn zero_length_empty_edit_changes_nothing() {
    let docs = DocumentManager::new();
    let doc = docs.open(uri(), "1. e4 e5 *".to_string(), Some(1)).await;
    let version = doc.lock().await.version();

    let outcome = docs
        .change(&uri(), &[insert(0, 3, "")], Some(2))
        .await
        .expect("change");

    let doc = doc.lock().await;
    assert!(!outcome.changed);
    assert_eq!(doc.text(), "1. e4 e5 *");
    assert_eq!(doc.version(), version);
    assert_eq!(doc.client_version(), Some(2));
}

#[tokio::test]
async fn full_replace_after_cached_lookup_uses_new_lines() {
    let docs = DocumentManager::new();
    let doc = docs.open(uri(), "1. e4\n1... e5\n".to_string(), Some(1)).await;
    assert_eq!(doc.lock().await.offset_of(Position::new(1, 0)), Ok(6));

    let replacement = Change::Full("[Event \"x\"]\n\n\n1. d4 *".to_string());
    docs.change(&uri(), &[replacement], Some(2))
        .await
        .expect("change");

    let doc = doc.lock().await;
    assert_eq!(doc.line_count(), 4);
    assert_eq!(doc.offset_of(Position::new(3, 3)), Ok(17));
    assert_eq!(doc.position_of(17), Ok(Position::new(3, 3)));
}

#[tokio::test]
async fn batch_edits_resolve_against_updated_buffer() {
    let docs = DocumentManager::new();
    let doc = docs.open(uri(), "1. e4 e5\n".to_string(), None).await;

    // The second insertion lands on the line created by the first
    let batch = [insert(0, 8, "\n2. Nf3"), insert(1, 6, " Nc6")];
    docs.change(&uri(), &batch, None).await.expect("change");

    assert_eq!(doc.lock().await.text(), "1. e4 e5\n2. Nf3 Nc6\n");
}

#[tokio::test]
async fn rejected_batch_leaves_document_untouched() {
    let docs = DocumentManager::new();
    let doc = docs.open(uri(), "1. e4 *".to_string(), Some(1)).await;
    let before = doc.lock().await.version();

    let batch = [insert(0, 0, "[Event \"x\"]\n"), insert(0, 40, "!")];
    let err = docs.change(&uri(), &batch, Some(2)).await.unwrap_err();

    match err {
        DocumentError::Edit {
            source: EditError::Unresolvable { index, source },
            ..
        } => {
            assert_eq!(index, 1);
            assert!(matches!(source, PositionError::OutOfRangeColumn { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let doc = doc.lock().await;
    assert_eq!(doc.text(), "1. e4 *");
    assert_eq!(doc.version(), before);
    assert_eq!(doc.client_version(), Some(1));
}

#[tokio::test]
async fn change_to_closed_document_is_reported() {
    let docs = DocumentManager::new();
    let err = docs
        .change(&uri(), &[Change::Full(String::new())], None)
        .await
        .unwrap_err();
    assert_eq!(err, DocumentError::NotOpen(uri()));
}

#[tokio::test]
async fn positions_round_trip_with_astral_characters() {
    let text = "[White \"Ånd 😀\"]\r\n1. e4 {😀😀} *\n";
    let docs = DocumentManager::new();
    let doc = docs.open(uri(), text.to_string(), None).await;
    let doc = doc.lock().await;

    for (offset, _) in text.char_indices() {
        let position = doc.position_of(offset).expect("position");
        assert_eq!(doc.offset_of(position).expect("offset"), offset);
    }
    assert_eq!(doc.offset_of(doc.end_position()), Ok(text.len()));
}

#[tokio::test]
async fn token_spans_follow_edits() {
    let docs = DocumentManager::new();
    let doc = docs.open(uri(), "1. e4 *".to_string(), None).await;
    docs.change(&uri(), &[insert(0, 0, "[Event \"Åre\"]\n")], None)
        .await
        .expect("change");

    let doc = doc.lock().await;
    let tokens = tokenize(doc.text()).expect("tokens");
    let star = tokens
        .iter()
        .find(|t| t.kind == TokenKind::Asterisk)
        .expect("asterisk");

    let range = doc.range_of(star.start..star.end).expect("range");
    assert_eq!(range, Range::new(Position::new(1, 6), Position::new(1, 7)));
}

#[tokio::test]
async fn locked_document_does_not_block_others() {
    let docs = DocumentManager::new();
    let busy = docs.open(named("busy"), "1. e4 *".to_string(), Some(1)).await;
    let idle = docs.open(named("idle"), "1. d4 *".to_string(), Some(1)).await;

    // Hold the first document for the rest of the test
    let _guard = busy.lock().await;

    let idle_uri = named("idle");
    let reply = [insert(0, 5, " d5")];
    let edit = docs.change(&idle_uri, &reply, Some(2));
    let outcome = timeout(Duration::from_secs(1), edit)
        .await
        .expect("idle document waited on the busy one")
        .expect("change");
    assert!(outcome.changed);
    assert_eq!(idle.lock().await.text(), "1. d4 d5 *");

    // Membership operations never wait on a document lock
    let membership = async {
        docs.open(named("third"), "*".to_string(), None).await;
        assert!(docs.get(&named("busy")).await.is_some());
        docs.close(&named("third")).await
    };
    let closed = timeout(Duration::from_secs(1), membership)
        .await
        .expect("store membership waited on a document lock");
    assert!(closed);

    // The busy document itself still waits for its holder
    let busy_uri = named("busy");
    let reply = [insert(0, 5, " e5")];
    let blocked = docs.change(&busy_uri, &reply, Some(2));
    assert!(timeout(Duration::from_millis(50), blocked).await.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_edits_to_different_documents() {
    let docs = Arc::new(DocumentManager::new());
    docs.open(named("white"), String::new(), None).await;
    docs.open(named("black"), String::new(), None).await;

    let typist = |name: &'static str, moves: &'static str| {
        let docs = Arc::clone(&docs);
        tokio::spawn(async move {
            for (i, ch) in moves.chars().enumerate() {
                let edit = insert(0, i as u32, &ch.to_string());
                docs.change(&named(name), &[edit], Some(i as i32))
                    .await
                    .expect("change");
            }
        })
    };

    let white = typist("white", "1. e4 e5 2. Nf3 *");
    let black = typist("black", "1. d4 d5 2. c4 *");
    white.await.expect("white task");
    black.await.expect("black task");

    let white = docs.get(&named("white")).await.expect("open");
    let black = docs.get(&named("black")).await.expect("open");
    assert_eq!(white.lock().await.text(), "1. e4 e5 2. Nf3 *");
    assert_eq!(black.lock().await.text(), "1. d4 d5 2. c4 *");
    assert_eq!(docs.len().await, 2);
}
