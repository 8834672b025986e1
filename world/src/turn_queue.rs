//! Bounded FIFO that buffers turn commands between simulation ticks.

use std::collections::VecDeque;

use cubesnake_core::TurnCommand;

/// Maximum number of turn commands an actor may buffer.
pub const TURN_QUEUE_CAPACITY: usize = 3;

/// Pending turn commands awaiting the actor's next tick.
#[derive(Clone, Debug, Default)]
pub struct TurnQueue {
    pending: VecDeque<TurnCommand>,
}

impl TurnQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(TURN_QUEUE_CAPACITY),
        }
    }

    /// Appends a command, returning `false` when the queue is full and the
    /// command was dropped.
    pub fn enqueue(&mut self, command: TurnCommand) -> bool {
        if self.pending.len() >= TURN_QUEUE_CAPACITY {
            return false;
        }
        self.pending.push_back(command);
        true
    }

    /// Pops the oldest command. The world calls this once per tick.
    pub fn dequeue(&mut self) -> Option<TurnCommand> {
        self.pending.pop_front()
    }

    /// Discards every pending command.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Number of pending commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Reports whether no command is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
