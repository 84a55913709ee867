use std::sync::mpsc::{RecvError, SyncSender, sync_channel};

use serde::{Deserialize, Serialize};

use crate::actor::reactor::{Event, Reactor, Sender, Status};
use crate::model::geometry::{Point, Rect};
use crate::model::session::DragSession;
use crate::sys::host::Host;
use crate::sys::scheduler::FrameScheduler;

/// What a renderer needs to draw the drag in progress.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualState {
    pub target_rect: Option<Rect>,
    pub items_offset: Vec<f64>,
    pub placeholder_offset: f64,
    pub justified_rect: Option<Rect>,
    pub placeholder_size: Option<Point>,
}

#[derive(Clone)]
pub struct ReactorQueryHandle {
    tx: Sender,
}

impl ReactorQueryHandle {
    pub(super) fn new(tx: Sender) -> Self { Self { tx } }

    fn send_query<T>(
        &self,
        build: impl FnOnce(SyncSender<T>) -> QueryRequest,
    ) -> Result<T, RecvError> {
        let (tx, rx) = sync_channel(1);
        if self.tx.try_send(Event::Query(build(tx))).is_err() {
            return Err(RecvError);
        }
        rx.recv().map_err(|_| RecvError)
    }

    pub fn query_status(&self) -> Option<Status> { self.send_query(QueryRequest::Status).ok() }

    pub fn query_session(&self) -> Option<DragSession> {
        self.send_query(QueryRequest::Session).ok().flatten()
    }

    pub fn query_visual(&self) -> VisualState {
        self.send_query(QueryRequest::Visual).unwrap_or_default()
    }
}

#[derive(Debug)]
pub enum QueryRequest {
    Status(SyncSender<Status>),
    Session(SyncSender<Option<DragSession>>),
    Visual(SyncSender<VisualState>),
}

impl<H: Host, S: FrameScheduler> Reactor<H, S> {
    pub(super) fn handle_query_request(&mut self, req: QueryRequest) {
        match req {
            QueryRequest::Status(resp) => {
                let _ = resp.send(self.status());
            }
            QueryRequest::Session(resp) => {
                let _ = resp.send(self.session().cloned());
            }
            QueryRequest::Visual(resp) => {
                let _ = resp.send(self.visual_state());
            }
        }
    }

    pub fn visual_state(&self) -> VisualState {
        VisualState {
            target_rect: self.target_rect(),
            items_offset: self.items_offset(),
            placeholder_offset: self.placeholder_offset(),
            justified_rect: self.justified_rect(),
            placeholder_size: self.placeholder_size(),
        }
    }
}
