//! Lock-free handoff of timestamped note events to the audio thread.
//!
//! The control side owns a [`MidiSender`] and pushes events stamped with an
//! absolute sample frame (frames since stream start). The audio side owns the
//! [`MidiCollector`], which once per block moves everything that has arrived
//! into a pre-allocated pending list, sorted by timestamp with arrival order
//! kept for ties, and hands out the events that fall inside the block as
//! block-relative offsets.
//!
//! ```text
//! control thread                         audio thread
//! MidiSender::push(ev, ts) ──rtrb──→ MidiCollector::drain_for(len)
//!        ↑                                   │
//!        └──── clock (next block start) ─────┘
//! ```

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    error::{Result, SynthError},
    synth::message::{BlockEvent, NoteEvent},
};

/// Default queue depth used by the engine and the standalone binary.
pub const DEFAULT_MIDI_CAPACITY: usize = 512;

#[derive(Debug, Clone, Copy)]
struct TimedEvent {
    timestamp: u64,
    event: NoteEvent,
}

/// Create a connected sender/collector pair holding up to `capacity` events.
pub fn midi_channel(capacity: usize) -> (MidiSender, MidiCollector) {
    let capacity = capacity.max(1);
    let (tx, rx) = RingBuffer::new(capacity);
    let clock = Arc::new(AtomicU64::new(0));

    let sender = MidiSender {
        tx,
        clock: Arc::clone(&clock),
    };
    let collector = MidiCollector {
        rx,
        pending: Vec::with_capacity(capacity),
        block_events: Vec::with_capacity(capacity),
        capacity,
        block_start: 0,
        clock,
    };

    (sender, collector)
}

/// Control-thread end of the MIDI queue.
pub struct MidiSender {
    tx: Producer<TimedEvent>,
    clock: Arc<AtomicU64>,
}

impl MidiSender {
    /// Enqueue an event at an absolute sample frame. Never blocks.
    pub fn push(&mut self, event: NoteEvent, timestamp: u64) -> Result<()> {
        self.tx
            .push(TimedEvent { timestamp, event })
            .map_err(|_| {
                tracing::warn!(?event, timestamp, "midi queue full");
                SynthError::QueueFull
            })
    }

    /// Enqueue an event for the start of the next block.
    pub fn push_now(&mut self, event: NoteEvent) -> Result<()> {
        let now = self.now();
        self.push(event, now)
    }

    /// Enqueue an event `frames` samples after the start of the next block.
    pub fn push_after(&mut self, event: NoteEvent, frames: u64) -> Result<()> {
        let at = self.now().saturating_add(frames);
        self.push(event, at)
    }

    /// Frame position at which the next audio block will start.
    pub fn now(&self) -> u64 {
        self.clock.load(Ordering::Acquire)
    }
}

/// Audio-thread end of the MIDI queue.
pub struct MidiCollector {
    rx: Consumer<TimedEvent>,
    /// Sorted by timestamp; equal timestamps keep arrival order.
    pending: Vec<TimedEvent>,
    block_events: Vec<BlockEvent>,
    capacity: usize,
    block_start: u64,
    clock: Arc<AtomicU64>,
}

impl MidiCollector {
    /// Events due in `[block_start, block_start + block_len)`, as offsets into
    /// the block, in timestamp order. Advances the clock by `block_len`.
    ///
    /// Later events stay queued. Events stamped before the block start are
    /// delivered at offset 0.
    pub fn drain_for(&mut self, block_len: usize) -> &[BlockEvent] {
        while self.pending.len() < self.capacity {
            match self.rx.pop() {
                Ok(timed) => self.insert_sorted(timed),
                Err(_) => break,
            }
        }

        let block_start = self.block_start;
        let block_end = block_start + block_len as u64;
        let due = self.pending.partition_point(|t| t.timestamp < block_end);

        self.block_events.clear();
        for timed in self.pending.drain(..due) {
            self.block_events.push(BlockEvent {
                offset: timed.timestamp.saturating_sub(block_start) as usize,
                event: timed.event,
            });
        }

        self.block_start = block_end;
        self.clock.store(block_end, Ordering::Release);

        &self.block_events
    }

    /// Drop everything queued and rewind the clock to zero.
    pub fn reset(&mut self) {
        while self.rx.pop().is_ok() {}
        self.pending.clear();
        self.block_events.clear();
        self.block_start = 0;
        self.clock.store(0, Ordering::Release);
    }

    /// Absolute frame at which the next block starts.
    pub fn block_start(&self) -> u64 {
        self.block_start
    }

    /// Events received but not yet due.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn insert_sorted(&mut self, timed: TimedEvent) {
        let index = self
            .pending
            .partition_point(|t| t.timestamp <= timed.timestamp);
        self.pending.insert(index, timed);
    }
}
