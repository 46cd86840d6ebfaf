//! Story player
//!
//! Runs a [`PlaybackSession`] on its own task: one tick interval, commands
//! from the view over a channel, and events back to it. The task is the only
//! owner of the session, so no locking is involved. Repost and reply writes
//! run on separate tasks and report back through the command channel; results
//! arriving after the session closed are dropped.

use crate::db::ContentStore;
use crate::metrics::stories as metrics;
use crate::services::stories::{write_reply, write_repost, StoriesService};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use story_engine::{
    Direction, GestureTracker, MediaKind, PlaybackError, PlaybackResult, PlaybackSession,
    PlaybackSettings, Step, StoryId, UserId, Viewer,
};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

const COMMAND_BUFFER: usize = 32;

/// Sent from the player to the view
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// A new item became current (including the first one)
    ItemChanged {
        index: usize,
        story_id: StoryId,
        media_kind: MediaKind,
    },
    /// Pause the media element
    PlaybackPaused,
    /// Resume the media element
    PlaybackResumed,
    Notification(Notification),
    /// Last event of a session
    Closed(CloseReason),
}

/// Transient message for the viewer
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    RepostSucceeded(StoryId),
    RepostFailed(String),
    ReplySent,
    ReplyFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Played past the last item
    Completed,
    ClosedByViewer,
}

enum Command {
    Advance(Direction),
    Press {
        x: f64,
        width: f64,
    },
    Release,
    SetPaused(bool),
    SetInputFocus(bool),
    MediaDuration {
        story_id: StoryId,
        duration: Duration,
    },
    MediaEnded(StoryId),
    Repost {
        viewer: Option<Viewer>,
        respond_to: oneshot::Sender<PlaybackResult<StoryId>>,
    },
    RepostFinished {
        result: PlaybackResult<StoryId>,
        respond_to: oneshot::Sender<PlaybackResult<StoryId>>,
    },
    Reply {
        viewer: Option<Viewer>,
        body: String,
        respond_to: oneshot::Sender<PlaybackResult<()>>,
    },
    ReplyFinished {
        result: PlaybackResult<()>,
        respond_to: oneshot::Sender<PlaybackResult<()>>,
    },
    Snapshot(oneshot::Sender<PlaybackSession>),
    Close,
}

enum Flow {
    Continue,
    Finished,
    Close,
}

/// Open an author's stories and start playing them.
///
/// Fails with `ProfileNotFound`, `NoActiveStories` or `FetchFailed`; in
/// every case no player is started.
pub async fn open_stories(
    store: Arc<dyn ContentStore>,
    author_id: UserId,
    viewer: Option<Viewer>,
    settings: PlaybackSettings,
) -> PlaybackResult<(StoryPlayerHandle, mpsc::UnboundedReceiver<PlayerEvent>)> {
    let service = StoriesService::new(store, settings);
    let session = service.open_session(author_id).await?;
    tracing::info!(
        author_id = %author_id,
        stories = session.len(),
        "story session opened"
    );
    Ok(StoryPlayer::spawn(session, service.store().clone(), viewer))
}

/// Control side of a running player. Cheap to clone.
#[derive(Clone)]
pub struct StoryPlayerHandle {
    commands: mpsc::Sender<Command>,
}

impl StoryPlayerHandle {
    pub async fn advance(&self, direction: Direction) -> PlaybackResult<()> {
        self.send(Command::Advance(direction)).await
    }

    /// Finger down at `x` on a surface `width` wide.
    pub async fn press(&self, x: f64, width: f64) -> PlaybackResult<()> {
        self.send(Command::Press { x, width }).await
    }

    /// Finger up; navigates on a tap, resumes after a hold.
    pub async fn release(&self) -> PlaybackResult<()> {
        self.send(Command::Release).await
    }

    pub async fn set_paused(&self, paused: bool) -> PlaybackResult<()> {
        self.send(Command::SetPaused(paused)).await
    }

    pub async fn set_input_focus(&self, focused: bool) -> PlaybackResult<()> {
        self.send(Command::SetInputFocus(focused)).await
    }

    pub async fn report_media_duration(
        &self,
        story_id: StoryId,
        duration: Duration,
    ) -> PlaybackResult<()> {
        self.send(Command::MediaDuration { story_id, duration }).await
    }

    pub async fn media_ended(&self, story_id: StoryId) -> PlaybackResult<()> {
        self.send(Command::MediaEnded(story_id)).await
    }

    /// Repost the current item as `viewer`. Resolves when the write finishes.
    pub async fn repost(&self, viewer: Option<&Viewer>) -> PlaybackResult<StoryId> {
        let viewer = viewer.cloned();
        self.request(|respond_to| Command::Repost { viewer, respond_to })
            .await?
    }

    /// Reply to the current item's author.
    pub async fn reply(&self, viewer: Option<&Viewer>, body: &str) -> PlaybackResult<()> {
        let viewer = viewer.cloned();
        let body = body.to_string();
        self.request(|respond_to| Command::Reply {
            viewer,
            body,
            respond_to,
        })
        .await?
    }

    pub async fn snapshot(&self) -> PlaybackResult<PlaybackSession> {
        self.request(Command::Snapshot).await
    }

    pub async fn close(&self) -> PlaybackResult<()> {
        self.send(Command::Close).await
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn send(&self, command: Command) -> PlaybackResult<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PlaybackError::SessionClosed)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> PlaybackResult<T> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await?;
        rx.await.map_err(|_| PlaybackError::SessionClosed)
    }
}

struct StoryPlayer {
    session: PlaybackSession,
    store: Arc<dyn ContentStore>,
    viewer: Option<Viewer>,
    gestures: GestureTracker,
    viewed: HashSet<StoryId>,
    commands: mpsc::Receiver<Command>,
    loopback: mpsc::WeakSender<Command>,
    events: mpsc::UnboundedSender<PlayerEvent>,
}

impl StoryPlayer {
    fn spawn(
        session: PlaybackSession,
        store: Arc<dyn ContentStore>,
        viewer: Option<Viewer>,
    ) -> (StoryPlayerHandle, mpsc::UnboundedReceiver<PlayerEvent>) {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let player = StoryPlayer {
            gestures: GestureTracker::new(session.settings().hold_threshold),
            session,
            store,
            viewer,
            viewed: HashSet::new(),
            commands: commands_rx,
            loopback: commands_tx.downgrade(),
            events: events_tx,
        };
        tokio::spawn(player.run());

        (
            StoryPlayerHandle {
                commands: commands_tx,
            },
            events_rx,
        )
    }

    async fn run(mut self) {
        let period = self.session.settings().tick_interval;
        let mut ticker = new_ticker(period);
        self.item_started();

        let reason = loop {
            let epoch = self.session.epoch();
            let paused = self.session.is_paused();

            let flow = tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => Flow::Close,
                },
                _ = ticker.tick() => self.apply(|s| s.tick(period)),
            };

            match flow {
                Flow::Continue => {}
                Flow::Finished => break CloseReason::Completed,
                Flow::Close => break CloseReason::ClosedByViewer,
            }

            if self.session.epoch() != epoch {
                ticker.reset();
                self.item_started();
            }
            if self.session.is_paused() != paused {
                self.emit(if self.session.is_paused() {
                    PlayerEvent::PlaybackPaused
                } else {
                    PlayerEvent::PlaybackResumed
                });
            }
        };

        tracing::info!(
            author_id = %self.session.author().id,
            reason = ?reason,
            "story session closed"
        );
        self.emit(PlayerEvent::Closed(reason));
    }

    fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Advance(direction) => self.apply(|s| s.advance(direction)),
            Command::Press { x, width } => {
                self.gestures.press(Instant::now().into_std(), x, width);
                self.update(PlaybackSession::press);
                Flow::Continue
            }
            Command::Release => match self.gestures.release(Instant::now().into_std()) {
                Some(gesture) => self.apply(|s| s.apply_gesture(gesture)),
                None => Flow::Continue,
            },
            Command::SetPaused(paused) => {
                self.update(|s| s.set_paused(paused));
                Flow::Continue
            }
            Command::SetInputFocus(focused) => {
                self.update(|s| s.set_input_focus(focused));
                Flow::Continue
            }
            Command::MediaDuration { story_id, duration } => {
                self.update(|s| s.report_media_duration(&story_id, duration));
                Flow::Continue
            }
            Command::MediaEnded(story_id) => self.apply(|s| s.media_ended(&story_id)),
            Command::Repost { viewer, respond_to } => {
                self.start_repost(viewer.as_ref(), respond_to);
                Flow::Continue
            }
            Command::RepostFinished { result, respond_to } => {
                self.update(PlaybackSession::finish_repost);
                self.emit(PlayerEvent::Notification(match &result {
                    Ok(id) => Notification::RepostSucceeded(*id),
                    Err(e) => Notification::RepostFailed(e.to_string()),
                }));
                let _ = respond_to.send(result);
                Flow::Continue
            }
            Command::Reply {
                viewer,
                body,
                respond_to,
            } => {
                self.start_reply(viewer.as_ref(), &body, respond_to);
                Flow::Continue
            }
            Command::ReplyFinished { result, respond_to } => {
                self.emit(PlayerEvent::Notification(match &result {
                    Ok(()) => Notification::ReplySent,
                    Err(e) => Notification::ReplyFailed(e.to_string()),
                }));
                let _ = respond_to.send(result);
                Flow::Continue
            }
            Command::Snapshot(respond_to) => {
                let _ = respond_to.send(self.session.clone());
                Flow::Continue
            }
            Command::Close => Flow::Close,
        }
    }

    fn apply(&mut self, transition: impl FnOnce(PlaybackSession) -> Step) -> Flow {
        match transition(self.session.clone()) {
            Step::Active(next) => {
                self.session = next;
                Flow::Continue
            }
            Step::Finished => Flow::Finished,
        }
    }

    fn update(&mut self, transition: impl FnOnce(PlaybackSession) -> PlaybackSession) {
        self.session = transition(self.session.clone());
    }

    fn start_repost(
        &mut self,
        viewer: Option<&Viewer>,
        respond_to: oneshot::Sender<PlaybackResult<StoryId>>,
    ) {
        let draft = match self.session.prepare_repost(viewer) {
            Ok(draft) => draft,
            Err(e) => {
                metrics::record_action("repost", "rejected");
                let _ = respond_to.send(Err(e));
                return;
            }
        };

        self.update(PlaybackSession::begin_repost);
        let store = self.store.clone();
        let loopback = self.loopback.clone();
        tokio::spawn(async move {
            let result = write_repost(store.as_ref(), draft).await;
            if let Some(commands) = loopback.upgrade() {
                let _ = commands
                    .send(Command::RepostFinished { result, respond_to })
                    .await;
            }
        });
    }

    fn start_reply(
        &mut self,
        viewer: Option<&Viewer>,
        body: &str,
        respond_to: oneshot::Sender<PlaybackResult<()>>,
    ) {
        let reply = match self.session.prepare_reply(viewer, body) {
            Ok(reply) => reply,
            Err(e) => {
                let _ = respond_to.send(Err(e));
                return;
            }
        };

        let store = self.store.clone();
        let loopback = self.loopback.clone();
        tokio::spawn(async move {
            let result = write_reply(store.as_ref(), reply).await.map(|_| ());
            if let Some(commands) = loopback.upgrade() {
                let _ = commands
                    .send(Command::ReplyFinished { result, respond_to })
                    .await;
            }
        });
    }

    fn item_started(&mut self) {
        let item = self.session.current_item();
        let (story_id, author_id, media_kind) = (item.id, item.author_id, item.media_kind);
        let index = self.session.current_index();

        tracing::debug!(story_id = %story_id, index, "story item started");
        self.emit(PlayerEvent::ItemChanged {
            index,
            story_id,
            media_kind,
        });
        self.record_view(story_id, author_id);
    }

    /// Fire-and-forget, once per item per session.
    fn record_view(&mut self, story_id: StoryId, author_id: UserId) {
        let Some(viewer) = &self.viewer else {
            return;
        };
        if viewer.id == author_id || !self.viewed.insert(story_id) {
            return;
        }

        let store = self.store.clone();
        let viewer_id = viewer.id;
        tokio::spawn(async move {
            if let Err(e) = store.track_view(story_id, viewer_id).await {
                tracing::warn!(story_id = %story_id, error = %e, "failed to record story view");
            }
        });
    }

    fn emit(&self, event: PlayerEvent) {
        // The view may have gone away; the session keeps its own lifecycle.
        let _ = self.events.send(event);
    }
}

fn new_ticker(period: Duration) -> Interval {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
