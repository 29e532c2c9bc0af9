//! Live merged view of the transaction ledger.
//!
//! The displayed transaction set comes from two live queries when the user
//! views their own ledger (records they created under their user ID, plus
//! records other users addressed to their email) and from a single query
//! when viewing a ledger shared with them. Each query runs as an owned
//! subscription task that re-reads the store and emits a full snapshot on
//! every change event; a reducer folds the latest snapshot from each source
//! into one deduplicated set. Dropping the feed tears the tasks down.

use anyhow::Result;
use log::{debug, warn};
use shared::{ProfileRef, Transaction};
use std::collections::HashMap;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use crate::storage::{Connection, TransactionStore};

/// Which query produced a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Primary,
    Secondary,
}

/// Equality filter a subscription queries the store with
#[derive(Debug, Clone)]
enum Query {
    ByUserId(String),
    ByUserEmail(String),
}

/// Merge two source snapshots into one set deduplicated by record ID.
///
/// A record present in both keeps its first-seen position but takes the
/// secondary snapshot's version of the data.
pub fn merge_snapshots(primary: &[Transaction], secondary: &[Transaction]) -> Vec<Transaction> {
    let mut merged: Vec<Transaction> = Vec::with_capacity(primary.len() + secondary.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for transaction in primary.iter().chain(secondary.iter()) {
        match positions.get(&transaction.id) {
            Some(&index) => merged[index] = transaction.clone(),
            None => {
                positions.insert(transaction.id.clone(), merged.len());
                merged.push(transaction.clone());
            }
        }
    }

    merged
}

/// Handle on the live merged view of one profile's ledger
pub struct LedgerFeed {
    merged_rx: watch::Receiver<Vec<Transaction>>,
    tasks: Vec<JoinHandle<()>>,
}

impl LedgerFeed {
    /// Spawn the subscription tasks for the given profile.
    ///
    /// The own profile runs both queries; a shared profile runs a single
    /// query against the owner's email.
    pub fn spawn<C>(connection: C, profile: &ProfileRef) -> Self
    where
        C: Connection + 'static,
        C::TransactionRepository: 'static,
    {
        let (snapshot_tx, snapshot_rx) = mpsc::channel::<(Source, Vec<Transaction>)>(16);
        let (merged_tx, merged_rx) = watch::channel(Vec::new());

        let mut tasks = Vec::new();

        match profile {
            ProfileRef::Own { user_id, email } => {
                tasks.push(spawn_subscription(
                    connection.create_transaction_repository(),
                    Query::ByUserId(user_id.clone()),
                    Source::Primary,
                    snapshot_tx.clone(),
                ));
                tasks.push(spawn_subscription(
                    connection.create_transaction_repository(),
                    Query::ByUserEmail(email.clone()),
                    Source::Secondary,
                    snapshot_tx,
                ));
            }
            ProfileRef::Shared { owner_email, .. } => {
                tasks.push(spawn_subscription(
                    connection.create_transaction_repository(),
                    Query::ByUserEmail(owner_email.clone()),
                    Source::Primary,
                    snapshot_tx,
                ));
            }
        }

        tasks.push(tokio::spawn(reduce_loop(snapshot_rx, merged_tx)));

        Self { merged_rx, tasks }
    }

    /// Receiver of the merged set; the value updates on every source snapshot
    pub fn subscribe(&self) -> watch::Receiver<Vec<Transaction>> {
        self.merged_rx.clone()
    }

    /// Latest merged set
    pub fn current(&self) -> Vec<Transaction> {
        self.merged_rx.borrow().clone()
    }

    /// Wait until the merged set updates again
    pub async fn changed(&mut self) -> Result<()> {
        self.merged_rx
            .changed()
            .await
            .map_err(|e| anyhow::anyhow!("Ledger feed closed: {}", e))
    }
}

impl Drop for LedgerFeed {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// One live query: emit a full snapshot now and after every store change
fn spawn_subscription<R>(
    repository: R,
    query: Query,
    source: Source,
    snapshots: mpsc::Sender<(Source, Vec<Transaction>)>,
) -> JoinHandle<()>
where
    R: TransactionStore + 'static,
{
    tokio::spawn(async move {
        // Subscribe before the first read so no change slips between them
        let mut changes = repository.change_events();

        loop {
            match run_query(&repository, &query).await {
                Ok(snapshot) => {
                    debug!("📸 {:?} snapshot with {} record(s)", source, snapshot.len());
                    if snapshots.send((source, snapshot)).await.is_err() {
                        break;
                    }
                }
                Err(e) => warn!("❌ Snapshot query failed: {}", e),
            }

            match changes.recv().await {
                Ok(()) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Snapshots are full re-reads, so missed events collapse
                    // into the next one
                    debug!("Subscription lagged past {} change event(s)", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn run_query<R: TransactionStore>(repository: &R, query: &Query) -> Result<Vec<Transaction>> {
    match query {
        Query::ByUserId(user_id) => repository.list_by_user_id(user_id).await,
        Query::ByUserEmail(email) => repository.list_by_user_email(email).await,
    }
}

/// Fold source snapshots into the merged set, recomputing in full per event
async fn reduce_loop(
    mut snapshots: mpsc::Receiver<(Source, Vec<Transaction>)>,
    merged_tx: watch::Sender<Vec<Transaction>>,
) {
    let mut primary: Vec<Transaction> = Vec::new();
    let mut secondary: Vec<Transaction> = Vec::new();

    while let Some((source, snapshot)) = snapshots.recv().await {
        match source {
            Source::Primary => primary = snapshot,
            Source::Secondary => secondary = snapshot,
        }

        let merged = merge_snapshots(&primary, &secondary);
        debug!("🔄 Merged view now has {} record(s)", merged.len());
        if merged_tx.send(merged).is_err() {
            break;
        }
    }
}
