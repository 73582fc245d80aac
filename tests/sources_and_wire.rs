mod common;

use std::io::Write;

use commentree::{
    comment::{BulkDeleteReceipt, Comment, CommentList, NewComment, RecordId, RestoreRequest},
    config::ClientConfig,
    core::tree,
    remote::{
        CommentApi, RemoteError, http::HttpCommentApi, offline::OfflineApi,
        snapshot::StaticSnapshot,
    },
};
use tempfile::NamedTempFile;

#[test]
fn integer_and_string_ids_decode_alike() {
    let a: Comment = serde_json::from_str(
        r#"{"id": 7, "author": "Admin", "text": "hi", "date": "2024-01-01T00:00:00Z", "likes": 3, "parent": 2}"#,
    )
    .unwrap();
    let b: Comment = serde_json::from_str(
        r#"{"id": "7", "author": "Admin", "text": "hi", "date": "2024-01-01T00:00:00Z", "likes": 3, "parent_id": "2"}"#,
    )
    .unwrap();

    assert_eq!(a, b);
    assert_eq!(a.parent.as_deref(), Some("2"));
    assert!(a.replies.is_empty());
    assert_eq!(a.image_url(), None);
}

#[test]
fn bare_and_wrapped_lists_both_decode() {
    let entry = r#"{"id": "1", "author": "A", "text": "t", "date": "2024-01-01T00:00:00Z", "likes": 1, "image": "", "parent": null, "replies": []}"#;
    let bare: CommentList = serde_json::from_str(&format!("[{entry}]")).unwrap();
    let wrapped: CommentList = serde_json::from_str(&format!(r#"{{"comments": [{entry}]}}"#)).unwrap();

    let bare = bare.into_comments();
    assert_eq!(bare, wrapped.into_comments());
    assert!(bare[0].is_top_level());
}

#[test]
fn create_payload_omits_missing_parent() {
    let top = serde_json::to_value(NewComment {
        text: "hello".to_string(),
        parent: None,
    })
    .unwrap();
    assert_eq!(top, serde_json::json!({"text": "hello"}));

    let child = serde_json::to_value(NewComment {
        text: "hello".to_string(),
        parent: Some("4".to_string()),
    })
    .unwrap();
    assert_eq!(child, serde_json::json!({"text": "hello", "parent": "4"}));
}

#[test]
fn bulk_backup_posts_back_with_parent_id() {
    let body = r#"{"deleted": 2, "comments": [
        {"id": 1, "author": "A", "text": "root", "date": "2024-01-01T00:00:00Z", "likes": 3, "image": "", "parent_id": null},
        {"id": 2, "author": "A", "text": "child", "date": "2024-01-01T00:01:00.250000Z", "likes": 0, "image": "", "parent_id": 1}
    ]}"#;
    let receipt: BulkDeleteReceipt = serde_json::from_str(body).unwrap();
    assert_eq!(receipt.deleted, 2);
    assert_eq!(receipt.comments[1].parent_id, Some(RecordId::Int(1)));

    let child = Comment::from(receipt.comments[1].clone());
    assert_eq!(child.id, "2");
    assert_eq!(child.parent.as_deref(), Some("1"));

    let sent = serde_json::to_value(RestoreRequest {
        comments: receipt.comments,
    })
    .unwrap();
    let rows = sent["comments"].as_array().unwrap();
    assert_eq!(rows[0]["parent_id"], serde_json::Value::Null);
    assert_eq!(rows[1]["id"], 2);
    assert_eq!(rows[1]["parent_id"], 1);
    let keys: Vec<&str> = rows[1].as_object().unwrap().keys().map(String::as_str).collect();
    assert!(!keys.contains(&"parent"));
    assert!(!keys.contains(&"replies"));
}

#[test]
fn record_ids_keep_their_wire_type() {
    assert_eq!(RecordId::from_id("42"), RecordId::Int(42));
    assert_eq!(RecordId::from_id("007"), RecordId::Text("007".to_string()));
    assert_eq!(RecordId::from_id("1700000000123"), RecordId::Int(1_700_000_000_123));
    assert_eq!(RecordId::from_id("abc"), RecordId::Text("abc".to_string()));
}

#[test]
fn api_base_resolves_against_origin() {
    let config = ClientConfig::default();
    assert_eq!(config.resolved_api_base().unwrap(), "http://127.0.0.1:8000/api");
    assert_eq!(config.undo_window().as_secs(), 10);

    let absolute = ClientConfig {
        api_base: "https://comments.example.com/v1/".to_string(),
        ..ClientConfig::default()
    };
    let api = HttpCommentApi::from_config(&absolute).unwrap();
    assert_eq!(api.base(), "https://comments.example.com/v1");

    let broken = ClientConfig {
        origin: "not a url".to_string(),
        ..ClientConfig::default()
    };
    assert!(matches!(
        broken.resolved_api_base(),
        Err(RemoteError::InvalidUrl(_))
    ));
}

#[tokio::test]
async fn bundled_snapshot_assembles_into_threads() {
    let comments = tree::assemble(StaticSnapshot::bundled().list().await.unwrap());
    assert_eq!(tree::count_all(&comments), 5);
    assert_eq!(tree::locate(&comments, "4"), Some(vec![1, 0, 0]));
}

#[tokio::test]
async fn snapshot_file_is_read_on_each_list() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"comments": [{{"id": "9", "author": "Admin", "text": "from disk", "date": "2024-05-01T12:00:00Z", "likes": 4}}]}}"#
    )
    .unwrap();

    let config = ClientConfig {
        fallback_path: Some(file.path().to_path_buf()),
        ..ClientConfig::default()
    };
    let snapshot = StaticSnapshot::from_config(&config);
    let comments = snapshot.list().await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].text, "from disk");

    assert!(matches!(
        snapshot.delete("9").await,
        Err(RemoteError::Unavailable(_))
    ));
}

#[tokio::test]
async fn snapshot_with_bad_json_fails() {
    let snapshot = StaticSnapshot::from_json("{not json");
    assert!(matches!(snapshot.list().await, Err(RemoteError::Json(_))));
}

#[tokio::test]
async fn offline_api_refuses_everything() {
    assert!(OfflineApi.list().await.is_err());
    let new = NewComment {
        text: "x".to_string(),
        parent: None,
    };
    assert!(matches!(
        OfflineApi.create(&new).await,
        Err(RemoteError::Unavailable(_))
    ));
}
