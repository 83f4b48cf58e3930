use crate::{data::student::Student, state::AppState};
use axum::{
    extract::State,
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
};
use futures::{Stream, StreamExt};
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StudentChange {
    Created(Student),
    Updated(Student),
    Deleted(Student),
}

impl StudentChange {
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Deleted(_) => "deleted",
        }
    }

    pub const fn student(&self) -> &Student {
        match self {
            Self::Created(student) | Self::Updated(student) | Self::Deleted(student) => student,
        }
    }

    fn into_event(self) -> Result<Event, axum::Error> {
        Event::default()
            .event(self.event_name())
            .json_data(self.student())
    }
}

pub async fn sse_feed(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = BroadcastStream::new(state.subscribe_to_changes()).filter_map(
        |change| async move {
            match change {
                Ok(change) => Some(change.into_event()),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(skipped, "SSE subscriber lagged behind student changes");
                    None
                }
            }
        },
    );

    Sse::new(stream).keep_alive(KeepAlive::default())
}
