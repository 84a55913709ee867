//! Recording of reactor input as RON lines, and playback of such a file
//! against a fresh reactor over a simulated host.
//!
//! Besides input events a recording carries the layout changes the host made
//! on its own, so playback sees the same geometry as the live run.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Event, Reactor};
use crate::sys::scheduler::FrameScheduler;
use crate::sys::sim::{LayoutChange, SimHost};

/// One line of a recording.
#[derive(Debug, Serialize, Deserialize)]
pub enum Entry<E = Event, L = LayoutChange> {
    Event(E),
    Layout(L),
}

#[derive(Debug, Default)]
pub struct Record {
    file: Option<BufWriter<File>>,
}

impl Record {
    pub fn new(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Record::default());
        };
        let file = File::create(path)
            .with_context(|| format!("creating recording at {}", path.display()))?;
        Ok(Record { file: Some(BufWriter::new(file)) })
    }

    pub fn on_event(&mut self, event: &Event) {
        if matches!(event, Event::Query(_)) {
            return;
        }
        self.write(&Entry::<_, &LayoutChange>::Event(event));
    }

    pub fn on_layout(&mut self, change: &LayoutChange) {
        self.write(&Entry::<&Event, _>::Layout(change));
    }

    fn write(&mut self, entry: &Entry<&Event, &LayoutChange>) {
        let Some(file) = &mut self.file else {
            return;
        };
        let line = match ron::to_string(entry) {
            Ok(line) => line,
            Err(err) => {
                warn!(%err, "could not serialize entry for recording");
                return;
            }
        };
        if let Err(err) = writeln!(file, "{line}") {
            warn!(%err, "writing recording failed; recording stopped");
            self.file = None;
        }
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.file {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<S: FrameScheduler> Reactor<SimHost, S> {
    /// Changes the simulated layout and records the change.
    pub fn apply_layout(&mut self, change: &LayoutChange) {
        self.recording_manager.record.on_layout(change);
        self.host.apply(change);
    }
}

/// Plays every recorded entry into `reactor` in order. Errors returned by the
/// reactor are logged and playback continues, as it would live.
pub fn replay<S: FrameScheduler>(
    path: &Path,
    reactor: &mut Reactor<SimHost, S>,
) -> anyhow::Result<usize> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut count = 0;
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: Entry = ron::from_str(&line)
            .with_context(|| format!("{}:{}: invalid entry", path.display(), lineno + 1))?;
        match entry {
            Entry::Event(event) => {
                if let Err(err) = reactor.handle_event(event) {
                    debug!(%err, line = lineno + 1, "replayed event failed");
                }
            }
            Entry::Layout(change) => reactor.apply_layout(&change),
        }
        count += 1;
    }
    Ok(count)
}
