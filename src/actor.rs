//! Message plumbing between the input layer, the reactor and whoever
//! listens to drag events.

pub mod broadcast;
pub mod reactor;
pub mod scroller;

use tokio::sync::mpsc;

/// Carries the sender's span along with each event so handling shows up
/// under the caller in traces.
#[derive(Debug)]
pub struct Sender<Event>(mpsc::UnboundedSender<(tracing::Span, Event)>);

pub type Receiver<Event> = mpsc::UnboundedReceiver<(tracing::Span, Event)>;

impl<Event> Clone for Sender<Event> {
    fn clone(&self) -> Self { Sender(self.0.clone()) }
}

impl<Event> Sender<Event> {
    pub fn send(&self, event: Event) { _ = self.0.send((tracing::Span::current(), event)); }

    pub fn try_send(
        &self,
        event: Event,
    ) -> Result<(), mpsc::error::SendError<(tracing::Span, Event)>> {
        self.0.send((tracing::Span::current(), event))
    }
}

pub fn channel<Event>() -> (Sender<Event>, Receiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Sender(tx), rx)
}
