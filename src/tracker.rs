//! Tracker: the context object handed to request handlers.

use crate::auth::AuthGate;
use crate::broker::{Broker, BrokerConfig};
use crate::config::TrackerConfig;
use crate::error::Result;
use crate::reconciler;
use crate::scheduler::{SchedulerHandle, SnapshotConfig, SnapshotScheduler};
use crate::store::{ItemStore, StoreTxn};
use crate::stream::EventStream;
use crate::types::{ClaimUpdate, Collection, GatherUpdate};
use std::fs;
use std::sync::Arc;

/// Everything a transport needs to serve the tracker.
///
/// Lives from process start to shutdown. Handlers share it behind an `Arc`;
/// all methods take `&self`.
pub struct Tracker {
    config: TrackerConfig,
    store: Arc<ItemStore>,
    broker: Arc<Broker>,
    auth: AuthGate,
}

impl Tracker {
    /// Open the tracker's store and secret set under `config.data_dir`.
    pub fn open(config: TrackerConfig) -> Result<Self> {
        if config.create_if_missing {
            fs::create_dir_all(&config.data_dir)?;
            fs::create_dir_all(config.backups_path())?;
        }

        let store = Arc::new(ItemStore::open(config.items_path())?);
        let auth = AuthGate::open(config.config_path())?;
        let broker = Arc::new(Broker::new(BrokerConfig {
            buffer_size: config.subscriber_buffer,
        }));

        tracing::info!(data_dir = %config.data_dir.display(), "tracker opened");
        Ok(Self {
            config,
            store,
            broker,
            auth,
        })
    }

    /// Start the snapshot scheduler on its own thread.
    pub fn start_scheduler(&self) -> Result<SchedulerHandle> {
        let config = SnapshotConfig {
            dir: self.config.backups_path(),
            interval: self.config.snapshot_interval,
            retention: self.config.snapshot_retention,
        };
        Ok(SnapshotScheduler::new(Arc::clone(&self.store), config).spawn()?)
    }

    /// Current collection.
    pub fn items(&self) -> Result<Collection> {
        self.store.load()
    }

    /// Set an item's gathered amount, persist, and broadcast.
    pub fn update_gathered(&self, update: &GatherUpdate) -> Result<Collection> {
        let mut txn = self.store.begin()?;
        let gathered = reconciler::reconcile_gather(txn.items_mut(), update)?;
        let items = self.commit_and_publish(txn)?;

        tracing::info!(item = %update.name, gathered, "gather updated");
        Ok(items)
    }

    /// Set a claimer's reservation on an item, persist, and broadcast.
    pub fn claim(&self, update: &ClaimUpdate) -> Result<Collection> {
        let mut txn = self.store.begin()?;
        reconciler::reconcile_claim(txn.items_mut(), update)?;
        let items = self.commit_and_publish(txn)?;

        tracing::info!(
            item = %update.name,
            claimer = %update.claimer.trim(),
            claimed = update.claimed,
            "claim updated"
        );
        Ok(items)
    }

    /// Open a live event stream for one connection.
    pub fn open_stream(&self) -> EventStream {
        EventStream::open(Arc::clone(&self.broker), self.config.keep_alive)
    }

    pub fn auth(&self) -> &AuthGate {
        &self.auth
    }

    pub fn store(&self) -> &Arc<ItemStore> {
        &self.store
    }

    pub fn broker(&self) -> &Arc<Broker> {
        &self.broker
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Publish while the store lock is still held, so subscribers see
    /// snapshots in mutation order.
    fn commit_and_publish(&self, txn: StoreTxn<'_>) -> Result<Collection> {
        txn.commit()?;
        if let Err(e) = self.broker.publish_items(txn.items()) {
            tracing::warn!(error = %e, "failed to encode update event");
        }
        Ok(txn.items().to_vec())
    }
}
