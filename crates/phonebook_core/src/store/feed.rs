//! Change feed backing `RecordStore::get_all`.

use tokio::sync::watch;

/// Latest full row set of one table, observable through watch receivers.
///
/// Starts empty; the owner publishes after seeding and after each write.
pub struct StoreFeed<R> {
    sender: watch::Sender<Vec<R>>,
}

impl<R> StoreFeed<R> {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Vec::new());
        Self { sender }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<R>> {
        self.sender.subscribe()
    }

    /// Replaces the current rows, notifying every receiver.
    pub fn publish(&self, rows: Vec<R>) {
        // send_replace stores the value even with zero receivers.
        self.sender.send_replace(rows);
    }
}

impl<R> Default for StoreFeed<R> {
    fn default() -> Self {
        Self::new()
    }
}
