//! The index synchronizer: one total mapping from mutation to index work.
//!
//! Every accepted tree mutation is described by a
//! [`taxa_types::MutationEvent`]; [`IndexSynchronizer::plan`] maps each
//! variant to the exact set of documents to upsert and ids to delete, so
//! the cascade rules live in one exhaustive `match` instead of per-handler
//! branching. Synchronization is fire-and-forget: failures are logged and
//! the index drifts until the next [`IndexSynchronizer::rebuild`], they
//! never unwind the already-committed mutation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use taxa_links::LinkService;
use taxa_store::CategoryStore;
use taxa_types::{CategoryId, MutationEvent};

use crate::document::{CategoryDocument, IndexDocument, LinkDocument};
use crate::error::IndexResult;
use crate::traits::{Filter, SearchBackend};

/// The work one mutation induces on the index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncPlan {
    /// Documents to insert or replace.
    pub upserts: Vec<IndexDocument>,
    /// Document ids to delete. Deletes run before upserts.
    pub deletes: Vec<String>,
}

impl SyncPlan {
    /// Returns `true` when the plan carries no work.
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletes.is_empty()
    }
}

/// Mirrors accepted mutations into the secondary index.
pub struct IndexSynchronizer {
    store: Arc<dyn CategoryStore>,
    links: Arc<dyn LinkService>,
    backend: Arc<dyn SearchBackend>,
}

impl IndexSynchronizer {
    /// Create a synchronizer over the given collaborators.
    pub fn new(
        store: Arc<dyn CategoryStore>,
        links: Arc<dyn LinkService>,
        backend: Arc<dyn SearchBackend>,
    ) -> Self {
        Self {
            store,
            links,
            backend,
        }
    }

    /// Synchronize the index with one accepted mutation, fire-and-forget.
    ///
    /// Failures are logged and swallowed: the index is a derived view and
    /// must never fail the mutation that already committed.
    pub fn apply(&self, event: &MutationEvent) {
        let outcome = self.plan(event).and_then(|plan| {
            let counts = (plan.upserts.len(), plan.deletes.len());
            self.execute(plan)?;
            Ok(counts)
        });
        match outcome {
            Ok((upserts, deletes)) => {
                debug!(event = %event, upserts, deletes, "index synchronized");
            }
            Err(error) => {
                warn!(
                    event = %event,
                    %error,
                    "index synchronization failed; run a rebuild to repair"
                );
            }
        }
    }

    /// Compute the index work for one mutation.
    ///
    /// Reads the post-mutation tree from the store; delete cascades are
    /// resolved against the index itself (the tree no longer knows the
    /// removed subtree).
    pub fn plan(&self, event: &MutationEvent) -> IndexResult<SyncPlan> {
        let mut plan = SyncPlan::default();
        match event {
            // The touched categories' cached fields changed; nothing else.
            MutationEvent::LabelsReplaced { id }
            | MutationEvent::UriChanged { id }
            | MutationEvent::MovedUp { id, .. }
            | MutationEvent::MovedDown { id, .. } => {
                let tree = self.store.retrieve(id.root_id())?;
                for touched in event.touched_categories() {
                    plan.upserts
                        .push(IndexDocument::Category(CategoryDocument::project(
                            &tree, touched,
                        )?));
                }
            }
            // An insert may carry a whole subtree; a promoted or demoted
            // category changed ancestors. Either way every descendant's
            // cached ancestor list must be (re)written too.
            MutationEvent::Inserted { id, .. }
            | MutationEvent::Promoted { id, .. }
            | MutationEvent::Demoted { id, .. } => {
                let tree = self.store.retrieve(id.root_id())?;
                for touched in event.touched_categories() {
                    plan.upserts
                        .push(IndexDocument::Category(CategoryDocument::project(
                            &tree, touched,
                        )?));
                }
                for descendant in tree.descendants(id) {
                    plan.upserts
                        .push(IndexDocument::Category(CategoryDocument::project(
                            &tree,
                            &descendant,
                        )?));
                }
            }
            // The subtree is gone from the store; find its documents by
            // asking the index who listed the deleted id as an ancestor.
            MutationEvent::Deleted { id, parent } => {
                let doc_id = id.to_string();
                plan.deletes = self.backend.query_ids(&Filter::AncestorIs(doc_id.clone()))?;
                plan.deletes.push(doc_id);

                let tree = self.store.retrieve(parent.root_id())?;
                plan.upserts
                    .push(IndexDocument::Category(CategoryDocument::project(
                        &tree, parent,
                    )?));
            }
            MutationEvent::ClassificationReplaced { root_id, removed } => {
                plan.deletes = removed.iter().map(CategoryId::to_string).collect();
                let tree = self.store.retrieve(root_id)?;
                for id in tree.ids() {
                    plan.upserts
                        .push(IndexDocument::Category(CategoryDocument::project(
                            &tree, &id,
                        )?));
                }
            }
            MutationEvent::ClassificationDeleted { root_id } => {
                plan.deletes = self.backend.query_ids(&Filter::RootIs(root_id.clone()))?;
            }
            MutationEvent::LinksSet {
                object_id,
                categories,
                kind,
            } => {
                plan.deletes = self.backend.query_ids(&Filter::ObjectIs(object_id.clone()))?;
                for category in categories {
                    plan.upserts.push(IndexDocument::Link(LinkDocument::new(
                        object_id.clone(),
                        category,
                        kind.clone(),
                    )));
                }
            }
            MutationEvent::LinksDeleted { object_ids } => {
                for object_id in object_ids {
                    plan.deletes
                        .extend(self.backend.query_ids(&Filter::ObjectIs(object_id.clone()))?);
                }
            }
        }
        Ok(plan)
    }

    /// Regenerate the whole index from the category store and link census.
    ///
    /// Returns the number of documents written. This is the recovery path
    /// for any drift a failed incremental synchronization left behind.
    pub fn rebuild(&self) -> IndexResult<usize> {
        let stale = self.backend.query_ids(&Filter::All)?;
        self.backend.delete_by_ids(&stale)?;

        let mut documents = Vec::new();
        for root in self.store.root_ids()? {
            let tree = self.store.retrieve(root.root_id())?;
            for id in tree.ids() {
                documents.push(IndexDocument::Category(CategoryDocument::project(
                    &tree, &id,
                )?));
            }
        }
        for link in self.links.links()? {
            documents.push(IndexDocument::Link(LinkDocument::new(
                link.object.object_id,
                &link.category,
                link.kind,
            )));
        }

        let count = documents.len();
        self.backend.bulk_upsert(documents)?;
        self.backend.commit()?;
        info!(documents = count, "index rebuilt from category store");
        Ok(count)
    }

    fn execute(&self, plan: SyncPlan) -> IndexResult<()> {
        if plan.is_empty() {
            return Ok(());
        }
        if !plan.deletes.is_empty() {
            self.backend.delete_by_ids(&plan.deletes)?;
        }
        if !plan.upserts.is_empty() {
            self.backend.bulk_upsert(plan.upserts)?;
        }
        self.backend.commit()
    }
}
