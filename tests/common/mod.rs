#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use commentree::{
    comment::{
        BackupRecord, BulkDeleteReceipt, Comment, CommentPatch, NewComment, RestoreReceipt,
        RestoreRequest,
    },
    core::tree,
    remote::{CommentApi, RemoteError, RemoteResult},
};

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

pub fn comment(id: &str, likes: i64, secs: i64) -> Comment {
    Comment {
        id: id.to_string(),
        author: "Admin".to_string(),
        text: format!("comment {id}"),
        date: at(secs),
        likes,
        image: String::new(),
        parent: None,
        replies: Vec::new(),
    }
}

pub fn reply(id: &str, parent: &str, secs: i64) -> Comment {
    Comment {
        parent: Some(parent.to_string()),
        ..comment(id, 0, secs)
    }
}

/// Root "1" with replies "2" and "3"; "3" has reply "4". Plus root "5".
pub fn sample_forest() -> Vec<Comment> {
    let mut c3 = reply("3", "1", 30);
    c3.replies.push(reply("4", "3", 40));
    let mut c1 = comment("1", 10, 10);
    c1.replies = vec![reply("2", "1", 20), c3];
    vec![c1, comment("5", 95, 50)]
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub comments: Vec<Comment>,
    pub next_id: u64,
    pub online: bool,
    pub restore_fails: bool,
    pub calls: Vec<String>,
    pub restore_bodies: Vec<serde_json::Value>,
}

/// In-memory backend whose availability can be switched per test.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    pub state: Arc<Mutex<FakeState>>,
}

impl FakeBackend {
    pub fn online(comments: Vec<Comment>) -> Self {
        let backend = Self::default();
        {
            let mut st = backend.state.lock().unwrap();
            st.comments = comments;
            st.next_id = 1000;
            st.online = true;
        }
        backend
    }

    pub fn offline() -> Self {
        Self::default()
    }

    pub fn set_online(&self, online: bool) {
        self.state.lock().unwrap().online = online;
    }

    pub fn set_restore_fails(&self, fails: bool) {
        self.state.lock().unwrap().restore_fails = fails;
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.state.lock().unwrap().comments.clone()
    }

    /// Seeds comments the backend knows but a client has not loaded.
    pub fn seed(&self, comments: Vec<Comment>) {
        self.state.lock().unwrap().comments.extend(comments);
    }

    pub fn restore_bodies(&self) -> Vec<serde_json::Value> {
        self.state.lock().unwrap().restore_bodies.clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn enter(&self, call: &str) -> RemoteResult<std::sync::MutexGuard<'_, FakeState>> {
        let mut st = self.state.lock().unwrap();
        st.calls.push(call.to_string());
        if !st.online {
            return Err(RemoteError::Unavailable("fake backend offline".to_string()));
        }
        Ok(st)
    }
}

fn not_found(url: &str) -> RemoteError {
    RemoteError::Status {
        method: "PATCH",
        url: url.to_string(),
        status: 404,
    }
}

#[async_trait]
impl CommentApi for FakeBackend {
    async fn list(&self) -> RemoteResult<Vec<Comment>> {
        let st = self.enter("list")?;
        Ok(st.comments.clone())
    }

    async fn create(&self, new: &NewComment) -> RemoteResult<Comment> {
        let mut st = self.enter("create")?;
        st.next_id += 1;
        let created = Comment {
            id: st.next_id.to_string(),
            author: "Admin".to_string(),
            text: new.text.clone(),
            date: at(10_000 + st.next_id as i64),
            likes: 0,
            image: String::new(),
            parent: new.parent.clone(),
            replies: Vec::new(),
        };
        match &new.parent {
            None => st.comments.insert(0, created.clone()),
            Some(parent) => {
                if tree::attach_reply(&mut st.comments, parent, created.clone()).is_err() {
                    return Err(not_found(parent));
                }
            }
        }
        Ok(created)
    }

    async fn update(&self, id: &str, patch: &CommentPatch) -> RemoteResult<Comment> {
        let mut st = self.enter("update")?;
        let target = tree::find_mut(&mut st.comments, id).ok_or_else(|| not_found(id))?;
        target.text = patch.text.clone();
        let mut out = target.clone();
        out.replies.clear();
        Ok(out)
    }

    async fn delete(&self, id: &str) -> RemoteResult<()> {
        let mut st = self.enter("delete")?;
        tree::remove(&mut st.comments, id).ok_or_else(|| not_found(id))?;
        Ok(())
    }

    async fn delete_all(&self) -> RemoteResult<BulkDeleteReceipt> {
        let mut st = self.enter("delete_all")?;
        let backup: Vec<BackupRecord> = tree::flatten(&st.comments)
            .into_iter()
            .map(BackupRecord::from)
            .collect();
        st.comments.clear();
        Ok(BulkDeleteReceipt {
            deleted: backup.len(),
            comments: backup,
        })
    }

    async fn restore(&self, backup: &RestoreRequest) -> RemoteResult<RestoreReceipt> {
        let mut st = self.enter("restore")?;
        if st.restore_fails {
            return Err(RemoteError::Status {
                method: "POST",
                url: "/api/comments/restore/".to_string(),
                status: 500,
            });
        }
        // Rebuild from the JSON body, linking parents through `parent_id` only.
        let body = serde_json::to_value(backup)?;
        let rows = body["comments"].as_array().cloned().unwrap_or_default();
        let mut restored = Vec::with_capacity(rows.len());
        for mut row in rows {
            let fields = row.as_object_mut().unwrap();
            fields.remove("parent");
            let parent = fields.remove("parent_id").filter(|v| !v.is_null());
            let mut comment: Comment = serde_json::from_value(row)?;
            comment.parent = parent.map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            });
            restored.push(comment);
        }
        st.restore_bodies.push(body);
        st.comments = tree::assemble(restored);
        Ok(RestoreReceipt {
            restored: backup.comments.len(),
        })
    }
}
