mod common;

use chrono::Duration;

use commentree::{
    core::store::CommentStore,
    engine::view::{rows, time_ago},
    types::{SortMode, VoteDirection},
};

use common::{at, sample_forest};

#[test]
fn rows_flatten_threads_with_depth_and_overlay() {
    let mut store = CommentStore::with_comments(sample_forest());
    store.set_sort_mode(SortMode::Old);
    store.vote("4", VoteDirection::Down);
    store.begin_edit("2");
    store.begin_reply("3");
    store.toggle_saved("5");

    let rows = rows(&store, at(3_600));
    let shape: Vec<(&str, usize)> = rows.iter().map(|r| (r.id.as_str(), r.depth)).collect();
    assert_eq!(shape, [("1", 0), ("2", 1), ("3", 1), ("4", 2), ("5", 0)]);

    assert_eq!(rows[3].score, -1);
    assert_eq!(rows[3].vote, -1);
    assert!(rows[1].editing);
    assert!(rows[2].replying);
    assert!(rows[4].saved);
    assert_eq!(rows[0].age, "59m ago");
}

#[test]
fn collapsed_rows_hide_descendants() {
    let mut store = CommentStore::with_comments(sample_forest());
    store.set_sort_mode(SortMode::Old);
    store.toggle_collapse("3");

    let rows = rows(&store, at(0));
    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["1", "2", "3", "5"]);
    assert!(rows[2].collapsed);
    assert_eq!(rows[2].hidden, 1);
    assert_eq!(rows[0].hidden, 0);
}

#[test]
fn relative_ages() {
    let now = at(0);
    let ago = |d: Duration| time_ago(now - d, now);

    assert_eq!(ago(Duration::seconds(5)), "just now");
    assert_eq!(ago(Duration::seconds(-30)), "just now");
    assert_eq!(ago(Duration::minutes(12)), "12m ago");
    assert_eq!(ago(Duration::hours(3)), "3h ago");
    assert_eq!(ago(Duration::days(4)), "4d ago");
    assert_eq!(ago(Duration::days(65)), "2mo ago");
    assert_eq!(ago(Duration::days(800)), "2y ago");
}
