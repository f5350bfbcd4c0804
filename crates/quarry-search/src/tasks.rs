//! Seams to the host: write coordination, background tasks and notebook names.

use std::{
    collections::{BTreeMap, HashMap},
    sync::mpsc::Sender,
    time::Duration,
};

use tracing::warn;

/// Blocks until pending file writes have settled.
pub trait WriteBarrier {
    /// Waits for in-flight writes to finish.
    fn wait_for_writes(&self);
}

/// Barrier for hosts without asynchronous writers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPendingWrites;

impl WriteBarrier for NoPendingWrites {
    fn wait_for_writes(&self) {}
}

/// Work handed to the host's background queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Reindex the blocks an embed block currently resolves to.
    IndexEmbedBlock {
        /// The embedding block.
        embed_block_id: String,
        /// Blocks the embed resolved to.
        block_ids: Vec<String>,
    },
    /// Ask the UI to reload after `delay`.
    ReloadUi {
        /// Delay before the reload.
        delay: Duration,
    },
}

/// One-way sink for background tasks.
pub trait TaskQueue {
    /// Queues a task. Never blocks and never fails.
    fn enqueue(&self, task: Task);
}

/// Task queue backed by an mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelTaskQueue {
    /// Sending half of the channel.
    sender: Sender<Task>,
}

impl ChannelTaskQueue {
    /// Wraps the sending half of a channel.
    pub fn new(sender: Sender<Task>) -> Self {
        Self { sender }
    }
}

impl TaskQueue for ChannelTaskQueue {
    fn enqueue(&self, task: Task) {
        if let Err(e) = self.sender.send(task) {
            warn!(task = ?e.0, "task queue closed, dropping task");
        }
    }
}

/// Task queue that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardTasks;

impl TaskQueue for DiscardTasks {
    fn enqueue(&self, _task: Task) {}
}

/// Resolves box IDs to display names.
pub trait NotebookNames {
    /// Returns display names for the given box IDs. Unknown boxes are omitted.
    fn box_names(&self, ids: &[String]) -> HashMap<String, String>;
}

impl NotebookNames for HashMap<String, String> {
    fn box_names(&self, ids: &[String]) -> HashMap<String, String> {
        ids.iter()
            .filter_map(|id| self.get(id).map(|name| (id.clone(), name.clone())))
            .collect()
    }
}

impl NotebookNames for BTreeMap<String, String> {
    fn box_names(&self, ids: &[String]) -> HashMap<String, String> {
        ids.iter()
            .filter_map(|id| self.get(id).map(|name| (id.clone(), name.clone())))
            .collect()
    }
}

/// Notebook directory with no names.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNotebookNames;

impl NotebookNames for NoNotebookNames {
    fn box_names(&self, _ids: &[String]) -> HashMap<String, String> {
        HashMap::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;

    #[test]
    fn test_channel_queue_delivers() {
        let (tx, rx) = mpsc::channel();
        let queue = ChannelTaskQueue::new(tx);
        queue.enqueue(Task::ReloadUi {
            delay: Duration::from_secs(1),
        });
        assert_eq!(
            rx.try_recv().unwrap(),
            Task::ReloadUi {
                delay: Duration::from_secs(1)
            }
        );
    }

    #[test]
    fn test_channel_queue_closed_does_not_panic() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        ChannelTaskQueue::new(tx).enqueue(Task::ReloadUi {
            delay: Duration::ZERO,
        });
    }

    #[test]
    fn test_notebook_names() {
        let mut names = BTreeMap::new();
        names.insert("box1".to_string(), "Work".to_string());
        let resolved = names.box_names(&["box1".to_string(), "box2".to_string()]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved["box1"], "Work");
        assert!(NoNotebookNames.box_names(&["box1".to_string()]).is_empty());
    }
}
