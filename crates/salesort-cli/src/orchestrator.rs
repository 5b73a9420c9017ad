//! Move orchestration: resolves the target collection, then issues one
//! move-to-front per ranked product, lowest ranked first.
//!
//! Front insertion reverses order, so walking the ranking backwards leaves
//! the best seller at position 0 once the last move lands. Calls are strictly
//! sequential with a fixed pause between them. A failed move is logged and
//! the batch carries on; only failing to resolve the collection stops a run.

use std::fmt;
use std::time::Duration;

use salesort_core::{Event, EventLog, ProductId, RankedMove};
use salesort_shopify::gid::{numeric_tail, product_gid};
use salesort_shopify::{AdminClient, Collection, MoveOutcome, ShopifyError};

/// The remote operations a reorder run depends on.
pub(crate) trait RemoteDirectory {
    async fn resolve_collection(&self, handle: &str) -> Result<Collection, ShopifyError>;

    async fn move_to_front(
        &self,
        collection_id: &str,
        product_id: &ProductId,
    ) -> Result<MoveOutcome, ShopifyError>;

    async fn set_manual_sort_order(&self, collection_id: &str)
        -> Result<Collection, ShopifyError>;
}

impl RemoteDirectory for AdminClient {
    async fn resolve_collection(&self, handle: &str) -> Result<Collection, ShopifyError> {
        AdminClient::resolve_collection(self, handle).await
    }

    async fn move_to_front(
        &self,
        collection_id: &str,
        product_id: &ProductId,
    ) -> Result<MoveOutcome, ShopifyError> {
        AdminClient::move_to_front(self, collection_id, product_id).await
    }

    async fn set_manual_sort_order(
        &self,
        collection_id: &str,
    ) -> Result<Collection, ShopifyError> {
        AdminClient::set_manual_sort_order(self, collection_id).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunState {
    Idle,
    Resolving,
    /// `index` counts moves issued so far, in reverse-ranked order.
    Moving { index: usize, total: usize },
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => f.write_str("idle"),
            RunState::Resolving => f.write_str("resolving"),
            RunState::Moving { index, total } => write!(f, "moving {index}/{total}"),
            RunState::Done => f.write_str("done"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct OrchestratorOptions {
    /// Pause after every remote move call.
    pub delay: Duration,
    /// Log planned moves without calling the remote.
    pub dry_run: bool,
    /// Switch a non-manual collection to manual sorting before moving.
    pub set_manual: bool,
}

/// Per-run tally. Failures are reported here and in the log only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MoveReport {
    pub applied: usize,
    pub queued: usize,
    pub rejected: usize,
    pub failed: usize,
    pub skipped: usize,
    pub planned: usize,
    /// Products passed to `move_to_front`, in call order.
    pub calls: Vec<ProductId>,
}

impl fmt::Display for MoveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "applied={} queued={} rejected={} failed={} skipped={} planned={}",
            self.applied, self.queued, self.rejected, self.failed, self.skipped, self.planned
        )
    }
}

pub(crate) struct Orchestrator<'a, D> {
    directory: &'a D,
    log: &'a EventLog,
    options: OrchestratorOptions,
    state: RunState,
}

impl<'a, D: RemoteDirectory> Orchestrator<'a, D> {
    pub(crate) fn new(directory: &'a D, log: &'a EventLog, options: OrchestratorOptions) -> Self {
        Self {
            directory,
            log,
            options,
            state: RunState::Idle,
        }
    }

    pub(crate) fn state(&self) -> RunState {
        self.state
    }

    /// Resolves `handle` and moves every ranked product to the front, in
    /// reverse order.
    ///
    /// # Errors
    ///
    /// Returns the resolve error (typically [`ShopifyError::CollectionNotFound`]).
    /// Errors on individual moves never surface here.
    pub(crate) async fn run(
        &mut self,
        handle: &str,
        ranking: &[RankedMove],
    ) -> Result<MoveReport, ShopifyError> {
        self.transition(RunState::Resolving);
        let collection = match self.directory.resolve_collection(handle).await {
            Ok(collection) => collection,
            Err(err) => {
                self.log.record(
                    &Event::error("collection_resolve_failed").detail(format!("{handle}: {err}")),
                );
                return Err(err);
            }
        };
        self.log.record(&Event::info("collection_resolved").detail(format!(
            "{handle} -> {} \"{}\" (sort order {})",
            collection.id, collection.title, collection.sort_order
        )));
        self.ensure_manual(&collection).await;

        let report = self.move_all(&collection.id, ranking).await;

        self.transition(RunState::Done);
        Ok(report)
    }

    async fn ensure_manual(&self, collection: &Collection) {
        if collection.is_manual() {
            return;
        }
        if !self.options.set_manual || self.options.dry_run {
            self.log.record(&Event::warn("collection_not_manual").detail(format!(
                "sort order is {}; Shopify ignores reorders until it is MANUAL (use --set-manual)",
                collection.sort_order
            )));
            return;
        }
        match self.directory.set_manual_sort_order(&collection.id).await {
            Ok(updated) => self.log.record(
                &Event::info("sort_order_set_manual")
                    .detail(format!("{} now sorted {}", updated.id, updated.sort_order)),
            ),
            Err(err) => self.log.record(
                &Event::warn("sort_order_update_failed").detail(err.to_string()),
            ),
        }
    }

    async fn move_all(&mut self, collection_id: &str, ranking: &[RankedMove]) -> MoveReport {
        let mut report = MoveReport::default();
        let total = ranking.len();

        for (step, (rank_idx, item)) in ranking.iter().enumerate().rev().enumerate() {
            self.transition(RunState::Moving { index: step, total });
            let rank = rank_idx + 1;

            if product_gid(&item.product_id).is_none() {
                report.skipped += 1;
                self.log.record(
                    &Event::error("move_skipped_invalid_id")
                        .title(item.title.clone())
                        .product_id(&item.product_id)
                        .detail(format!("rank {rank}: not a valid product id")),
                );
                continue;
            }

            if self.options.dry_run {
                report.planned += 1;
                self.log.record(
                    &Event::info("move_planned")
                        .title(item.title.clone())
                        .product_id(&item.product_id)
                        .detail(format!("rank {rank}, total_sales {}", item.total_sales)),
                );
                continue;
            }

            report.calls.push(item.product_id.clone());
            let result = self
                .directory
                .move_to_front(collection_id, &item.product_id)
                .await;
            self.record_outcome(&mut report, item, rank, result);

            if step + 1 < total && !self.options.delay.is_zero() {
                tokio::time::sleep(self.options.delay).await;
            }
        }

        report
    }

    fn record_outcome(
        &self,
        report: &mut MoveReport,
        item: &RankedMove,
        rank: usize,
        result: Result<MoveOutcome, ShopifyError>,
    ) {
        let event = match result {
            Ok(MoveOutcome::Applied) => {
                report.applied += 1;
                Event::info("move_applied")
                    .detail(format!("rank {rank}, total_sales {}", item.total_sales))
            }
            Ok(MoveOutcome::Queued { job_id }) => {
                report.queued += 1;
                Event::info("move_queued").detail(format!(
                    "rank {rank}, total_sales {}, job {}",
                    item.total_sales,
                    numeric_tail(&job_id)
                ))
            }
            Ok(MoveOutcome::Rejected { user_errors }) => {
                report.rejected += 1;
                let messages = user_errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                Event::warn("move_rejected").detail(format!("rank {rank}: {messages}"))
            }
            Err(err) => {
                report.failed += 1;
                let action = if err.is_rate_limited() {
                    "move_rate_limited"
                } else {
                    "move_failed"
                };
                Event::error(action).detail(format!("rank {rank}: {err}"))
            }
        };
        self.log.record(
            &event
                .title(item.title.clone())
                .product_id(&item.product_id),
        );
    }

    fn transition(&mut self, next: RunState) {
        self.log.record(
            &Event::debug("run_state").detail(format!("{} -> {next}", self.state)),
        );
        self.state = next;
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
