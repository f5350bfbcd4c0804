//! Command implementations and dispatch.

pub mod config;
pub mod embed;
pub mod highlight;
pub mod index;
pub mod refs;
pub mod replace;
pub mod search;

use std::{process::ExitCode, sync::mpsc};

use quarry_search::{ChannelTaskQueue, Task};
use tracing::debug;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &CommandContext) -> ExitCode {
    match command {
        Commands::Search(cmd) => search::run(ctx, &cmd),
        Commands::Embed(cmd) => embed::run(ctx, &cmd),
        Commands::Refs(cmd) => refs::run(ctx, &cmd),
        Commands::Replace(cmd) => replace::run(ctx, &cmd),
        Commands::Highlight(cmd) => highlight::run(ctx, &cmd),
        Commands::Index => index::run(ctx),
        Commands::Config => config::run(ctx),
    }
}

/// Task queue for one invocation. Queued tasks are logged once the command finishes.
struct TaskLog {
    /// Queue handed to the engine.
    queue: ChannelTaskQueue,
    /// Receiving end of the queue.
    receiver: mpsc::Receiver<Task>,
}

impl TaskLog {
    /// Creates an empty task log.
    fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            queue: ChannelTaskQueue::new(sender),
            receiver,
        }
    }

    /// Drains and logs the queued tasks.
    fn flush(&self) {
        for task in self.receiver.try_iter() {
            debug!(?task, "queued task");
        }
    }
}
