use chrono::Utc;
use tokio::{
    sync::{broadcast, mpsc, oneshot},
    time::Instant,
};

use crate::{
    comment::Comment,
    core::{
        controller::{Added, CommentController, Mutation},
        store::StoreError,
    },
    engine::view::{self, CommentRow},
    types::{CommentId, LoadSource, SortMode, SyncSource, VoteDirection, VoteValue},
};

use super::events::CommentEvent;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("comment runtime has shut down")]
    ChannelClosed,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub command_queue_bound: usize,
    pub event_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_capacity: 1024,
        }
    }
}

/// Snapshot of the scalar view state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    pub loading: bool,
    pub error: Option<String>,
    pub sort_mode: SortMode,
    pub comment_count: usize,
    pub total_count: usize,
    pub undo_available: bool,
    pub editing: Option<CommentId>,
    pub replying_to: Option<CommentId>,
}

#[derive(Clone)]
pub struct CommentsHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<CommentEvent>,
}

enum Command {
    Load {
        resp: oneshot::Sender<Result<LoadSource, StoreError>>,
    },
    Add {
        text: String,
        parent: Option<CommentId>,
        resp: oneshot::Sender<Result<Added, StoreError>>,
    },
    Reply {
        text: String,
        resp: oneshot::Sender<Result<Added, StoreError>>,
    },
    Update {
        id: CommentId,
        text: String,
        resp: oneshot::Sender<Result<Mutation, StoreError>>,
    },
    Remove {
        id: CommentId,
        resp: oneshot::Sender<Mutation>,
    },
    DeleteAll {
        confirmed: bool,
        resp: oneshot::Sender<Result<usize, StoreError>>,
    },
    Undo {
        resp: oneshot::Sender<Result<SyncSource, StoreError>>,
    },
    Vote {
        id: CommentId,
        direction: VoteDirection,
        resp: oneshot::Sender<VoteValue>,
    },
    ToggleCollapse {
        id: CommentId,
        resp: oneshot::Sender<bool>,
    },
    ToggleSaved {
        id: CommentId,
        resp: oneshot::Sender<bool>,
    },
    SetSort {
        mode: SortMode,
        resp: oneshot::Sender<()>,
    },
    BeginEdit {
        id: CommentId,
        resp: oneshot::Sender<()>,
    },
    CancelEdit {
        resp: oneshot::Sender<()>,
    },
    BeginReply {
        id: CommentId,
        resp: oneshot::Sender<()>,
    },
    CancelReply {
        resp: oneshot::Sender<()>,
    },
    Get {
        id: CommentId,
        resp: oneshot::Sender<Option<Comment>>,
    },
    Sorted {
        resp: oneshot::Sender<Vec<Comment>>,
    },
    Rows {
        resp: oneshot::Sender<Vec<CommentRow>>,
    },
    Status {
        resp: oneshot::Sender<StoreStatus>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

pub fn spawn_comments(controller: CommentController, config: RuntimeConfig) -> CommentsHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound);
    let (events_tx, _) = broadcast::channel::<CommentEvent>(config.event_capacity);

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut controller = controller;

        loop {
            let deadline = controller.store().undo_deadline();
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else { break; };
                    if handle_command(cmd, &mut controller, &events_tx_loop).await {
                        break;
                    }
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if controller.expire_undo() {
                        tracing::debug!("undo window expired");
                        let _ = events_tx_loop.send(CommentEvent::UndoExpired);
                    }
                }
            }
        }
    });

    CommentsHandle { cmd_tx, events_tx }
}

impl CommentsHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<CommentEvent> {
        self.events_tx.subscribe()
    }

    pub async fn load(&self) -> Result<LoadSource, RuntimeError> {
        Ok(self.request(|resp| Command::Load { resp }).await??)
    }

    pub async fn add(
        &self,
        text: impl Into<String>,
        parent: Option<CommentId>,
    ) -> Result<Added, RuntimeError> {
        let text = text.into();
        Ok(self
            .request(|resp| Command::Add { text, parent, resp })
            .await??)
    }

    pub async fn reply(&self, text: impl Into<String>) -> Result<Added, RuntimeError> {
        let text = text.into();
        Ok(self.request(|resp| Command::Reply { text, resp }).await??)
    }

    pub async fn update(
        &self,
        id: impl Into<CommentId>,
        text: impl Into<String>,
    ) -> Result<Mutation, RuntimeError> {
        let (id, text) = (id.into(), text.into());
        Ok(self
            .request(|resp| Command::Update { id, text, resp })
            .await??)
    }

    pub async fn remove(&self, id: impl Into<CommentId>) -> Result<Mutation, RuntimeError> {
        let id = id.into();
        self.request(|resp| Command::Remove { id, resp }).await
    }

    /// `confirmed` stands in for the interactive prompt.
    pub async fn delete_all(&self, confirmed: bool) -> Result<usize, RuntimeError> {
        Ok(self
            .request(|resp| Command::DeleteAll { confirmed, resp })
            .await??)
    }

    pub async fn undo(&self) -> Result<SyncSource, RuntimeError> {
        Ok(self.request(|resp| Command::Undo { resp }).await??)
    }

    pub async fn vote(
        &self,
        id: impl Into<CommentId>,
        direction: VoteDirection,
    ) -> Result<VoteValue, RuntimeError> {
        let id = id.into();
        self.request(|resp| Command::Vote { id, direction, resp })
            .await
    }

    pub async fn toggle_collapse(&self, id: impl Into<CommentId>) -> Result<bool, RuntimeError> {
        let id = id.into();
        self.request(|resp| Command::ToggleCollapse { id, resp }).await
    }

    pub async fn toggle_saved(&self, id: impl Into<CommentId>) -> Result<bool, RuntimeError> {
        let id = id.into();
        self.request(|resp| Command::ToggleSaved { id, resp }).await
    }

    pub async fn set_sort_mode(&self, mode: SortMode) -> Result<(), RuntimeError> {
        self.request(|resp| Command::SetSort { mode, resp }).await
    }

    pub async fn begin_edit(&self, id: impl Into<CommentId>) -> Result<(), RuntimeError> {
        let id = id.into();
        self.request(|resp| Command::BeginEdit { id, resp }).await
    }

    pub async fn cancel_edit(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::CancelEdit { resp }).await
    }

    pub async fn begin_reply(&self, id: impl Into<CommentId>) -> Result<(), RuntimeError> {
        let id = id.into();
        self.request(|resp| Command::BeginReply { id, resp }).await
    }

    pub async fn cancel_reply(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::CancelReply { resp }).await
    }

    pub async fn get(&self, id: impl Into<CommentId>) -> Result<Option<Comment>, RuntimeError> {
        let id = id.into();
        self.request(|resp| Command::Get { id, resp }).await
    }

    /// Top-level comments in the current sort order.
    pub async fn sorted(&self) -> Result<Vec<Comment>, RuntimeError> {
        self.request(|resp| Command::Sorted { resp }).await
    }

    /// Display rows at the current wall-clock time.
    pub async fn rows(&self) -> Result<Vec<CommentRow>, RuntimeError> {
        self.request(|resp| Command::Rows { resp }).await
    }

    pub async fn status(&self) -> Result<StoreStatus, RuntimeError> {
        self.request(|resp| Command::Status { resp }).await
    }

    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.request(|resp| Command::Shutdown { resp }).await
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

async fn handle_command(
    cmd: Command,
    controller: &mut CommentController,
    events_tx: &broadcast::Sender<CommentEvent>,
) -> bool {
    match cmd {
        Command::Load { resp } => {
            let res = controller.load().await;
            let evt = match &res {
                Ok(source) => CommentEvent::Loaded {
                    source: *source,
                    count: controller.store().comment_count(),
                },
                Err(_) => CommentEvent::LoadFailed,
            };
            let _ = events_tx.send(evt);
            let _ = resp.send(res);
        }
        Command::Add { text, parent, resp } => {
            let res = controller.add(&text, parent.as_deref()).await;
            emit_added(events_tx, &res);
            let _ = resp.send(res);
        }
        Command::Reply { text, resp } => {
            let res = controller.reply(&text).await;
            emit_added(events_tx, &res);
            let _ = resp.send(res);
        }
        Command::Update { id, text, resp } => {
            let res = controller.update(&id, &text).await;
            if let Ok(m) = &res {
                if m.changed {
                    let _ = events_tx.send(CommentEvent::Updated {
                        id,
                        source: m.source,
                    });
                }
            }
            let _ = resp.send(res);
        }
        Command::Remove { id, resp } => {
            let m = controller.remove(&id).await;
            if m.changed {
                let _ = events_tx.send(CommentEvent::Removed {
                    id,
                    source: m.source,
                });
            }
            let _ = resp.send(m);
        }
        Command::DeleteAll { confirmed, resp } => {
            let res = controller.delete_all(move |_| confirmed).await;
            if let Ok(deleted) = res {
                let _ = events_tx.send(CommentEvent::Cleared { deleted });
            }
            let _ = resp.send(res);
        }
        Command::Undo { resp } => {
            let res = controller.undo().await;
            if let Ok(source) = res {
                let _ = events_tx.send(CommentEvent::Restored { source });
            }
            let _ = resp.send(res);
        }
        Command::Vote { id, direction, resp } => {
            let value = controller.store_mut().vote(&id, direction);
            let _ = events_tx.send(CommentEvent::Voted { id, value });
            let _ = resp.send(value);
        }
        Command::ToggleCollapse { id, resp } => {
            let collapsed = controller.store_mut().toggle_collapse(&id);
            let _ = events_tx.send(CommentEvent::CollapseToggled { id, collapsed });
            let _ = resp.send(collapsed);
        }
        Command::ToggleSaved { id, resp } => {
            let _ = resp.send(controller.store_mut().toggle_saved(&id));
        }
        Command::SetSort { mode, resp } => {
            controller.store_mut().set_sort_mode(mode);
            let _ = events_tx.send(CommentEvent::SortChanged { mode });
            let _ = resp.send(());
        }
        Command::BeginEdit { id, resp } => {
            controller.store_mut().begin_edit(&id);
            let _ = resp.send(());
        }
        Command::CancelEdit { resp } => {
            controller.store_mut().cancel_edit();
            let _ = resp.send(());
        }
        Command::BeginReply { id, resp } => {
            controller.store_mut().begin_reply(&id);
            let _ = resp.send(());
        }
        Command::CancelReply { resp } => {
            controller.store_mut().cancel_reply();
            let _ = resp.send(());
        }
        Command::Get { id, resp } => {
            let _ = resp.send(controller.store().get_cloned(&id));
        }
        Command::Sorted { resp } => {
            let sorted = controller.store().sorted().into_iter().cloned().collect();
            let _ = resp.send(sorted);
        }
        Command::Rows { resp } => {
            let _ = resp.send(view::rows(controller.store(), Utc::now()));
        }
        Command::Status { resp } => {
            let store = controller.store();
            let _ = resp.send(StoreStatus {
                loading: store.is_loading(),
                error: store.error().map(str::to_string),
                sort_mode: store.sort_mode(),
                comment_count: store.comment_count(),
                total_count: store.total_count(),
                undo_available: store.undo_window().is_some(),
                editing: store.editing().map(str::to_string),
                replying_to: store.replying_to().map(str::to_string),
            });
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(());
            return true;
        }
    }

    false
}

fn emit_added(events_tx: &broadcast::Sender<CommentEvent>, res: &Result<Added, StoreError>) {
    if let Ok(added) = res {
        if added.placed {
            let _ = events_tx.send(CommentEvent::Added {
                id: added.id.clone(),
                source: added.source,
            });
        }
    }
}
