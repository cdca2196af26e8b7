use std::sync::Arc;

use catsync_gate::{ConfirmationGate, EntrySummary, PendingConfirmation, Verdict};
use catsync_merge::{plan_write, CodeChange, ResolvedRefs, WriteKind};
use catsync_store::{Document, Filter, PartitionDirectory, RecordStore, RecordStoreExt, Scope};
use catsync_types::{
    CatalogEntry, Category, OwnerId, Partition, PartitionId, RecordId, RootId, Supplier, UserId,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{SyncError, SyncResult};
use crate::outcome::{RunStatus, SyncAction, SyncOutcome, SyncReport};
use crate::provisioner::Provisioner;
use crate::resolver::{IdentityResolver, TargetMatch};
use crate::transcript::Transcript;

/// One request to propagate a catalog entry from its partition to every
/// sibling partition of the same owner.
#[derive(Clone, Debug)]
pub struct SyncRequest {
    pub source_partition: PartitionId,
    /// The entry as saved, including its record id.
    pub entry: CatalogEntry,
    /// The entry's legacy code before the edit that triggered this pass.
    pub original_code: Option<String>,
    pub owner: OwnerId,
    pub acting_user: UserId,
}

impl SyncRequest {
    /// A request for an entry whose code was not edited.
    pub fn new(source_partition: PartitionId, entry: CatalogEntry, owner: OwnerId, acting_user: UserId) -> Self {
        let original_code = entry.code().map(str::to_string);
        Self {
            source_partition,
            entry,
            original_code,
            owner,
            acting_user,
        }
    }

    pub fn with_original_code(mut self, code: Option<&str>) -> Self {
        self.original_code = code.map(str::to_string);
        self
    }

    fn code_change(&self) -> CodeChange {
        CodeChange::new(self.original_code.as_deref(), self.entry.code())
    }
}

/// A dependent record of the source entry, as loaded from the source partition.
enum Dependency<T> {
    Absent,
    Found(T),
    Unavailable(String),
}

struct SourceDeps {
    category: Dependency<Category>,
    supplier: Dependency<Supplier>,
}

/// Per-pass state shared by every partition.
struct PassContext<'a> {
    source: &'a CatalogEntry,
    codes: CodeChange,
    deps: SourceDeps,
    acting_user: &'a UserId,
}

/// Drives a sync pass across all sibling partitions, one at a time.
///
/// Failures are contained per partition: an error while processing one
/// partition is recorded as a `failed` outcome and the pass moves on.
/// Nothing is retried and writes already made to other partitions stay.
pub struct SyncEngine {
    store: Arc<dyn RecordStore>,
    directory: Arc<dyn PartitionDirectory>,
    gate: Arc<dyn ConfirmationGate>,
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn RecordStore>,
        directory: Arc<dyn PartitionDirectory>,
        gate: Arc<dyn ConfirmationGate>,
    ) -> Self {
        Self {
            store,
            directory,
            gate,
        }
    }

    /// Build an engine over a backend that is both store and directory.
    pub fn with_backend<B>(backend: Arc<B>, gate: Arc<dyn ConfirmationGate>) -> Self
    where
        B: RecordStore + PartitionDirectory + 'static,
    {
        Self::new(backend.clone(), backend, gate)
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Run one sync pass.
    ///
    /// Returns `Err` only when the pass cannot start (unknown source,
    /// partition lookup failure, root id not persisted). Per-partition
    /// failures are reported in the returned [`SyncReport`].
    pub async fn synchronize(&self, request: SyncRequest) -> SyncResult<SyncReport> {
        let source_id = request.entry.id.clone().ok_or(SyncError::SourceWithoutId)?;
        let mut transcript = Transcript::new();

        let partitions = self.directory.partitions_of(&request.owner).await?;
        if !partitions.iter().any(|p| p.id == request.source_partition) {
            return Err(SyncError::PartitionNotOwned {
                partition: request.source_partition.clone(),
                owner: request.owner.clone(),
            });
        }
        let siblings: Vec<Partition> = partitions
            .into_iter()
            .filter(|p| p.id != request.source_partition)
            .collect();
        if siblings.is_empty() {
            transcript.info(None, format!("owner {} has no other partitions; nothing to synchronize", request.owner));
            return Ok(SyncReport::empty(
                RunStatus::NoSiblingPartitions,
                request.entry.root_id,
                transcript,
            ));
        }

        transcript.info(
            None,
            format!(
                "synchronizing \"{}\" to {} partition{}",
                request.entry.name,
                siblings.len(),
                if siblings.len() == 1 { "" } else { "s" }
            ),
        );

        let mut source = request.entry.clone();
        if source.root_id.is_none() {
            source.root_id = self
                .stored_root_id(&request.source_partition, &source_id)
                .await?;
            if let Some(root) = &source.root_id {
                transcript.info(None, format!("reusing stored root id {root}"));
            }
        }
        let root_id = match source.root_id.clone() {
            Some(root) => root,
            None => {
                let root = self
                    .assign_root_id(&request.source_partition, &source_id)
                    .await?;
                transcript.info(None, format!("assigned root id {root}"));
                source.root_id = Some(root.clone());
                root
            }
        };

        let deps = self
            .load_dependencies(&request.source_partition, &source)
            .await;
        let ctx = PassContext {
            source: &source,
            codes: request.code_change(),
            deps,
            acting_user: &request.acting_user,
        };

        let mut outcomes = Vec::with_capacity(siblings.len());
        for partition in &siblings {
            let outcome = match self.sync_partition(&ctx, partition, &mut transcript).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(partition = %partition.id, error = %e, "partition sync failed");
                    transcript.error(Some(&partition.display_name), e.to_string());
                    SyncOutcome::failed(partition, e.to_string())
                }
            };
            info!(partition = %partition.id, action = %outcome.action, "partition done");
            outcomes.push(outcome);
        }

        Ok(SyncReport {
            root_id: Some(root_id),
            status: RunStatus::Completed,
            outcomes,
            transcript,
        })
    }

    /// The root id already stored on the source record, if any. The caller's
    /// copy of the entry may predate the last pass.
    async fn stored_root_id(&self, partition: &PartitionId, id: &RecordId) -> SyncResult<Option<RootId>> {
        let stored = self.store.get(&Scope::catalog(partition), id).await?;
        Ok(stored
            .as_ref()
            .and_then(|r| r.str_field("rootId"))
            .and_then(|s| RootId::parse(s).ok()))
    }

    /// Generate a root id and write it back to the source entry.
    async fn assign_root_id(&self, partition: &PartitionId, id: &RecordId) -> SyncResult<RootId> {
        let root = RootId::new();
        let mut partial = Document::new();
        partial.insert("rootId".into(), Value::String(root.to_string()));
        self.store
            .update(&Scope::catalog(partition), id, partial)
            .await?;
        info!(%partition, %id, root = %root, "root id assigned");
        Ok(root)
    }

    async fn load_dependencies(&self, partition: &PartitionId, source: &CatalogEntry) -> SourceDeps {
        let category = match &source.category_ref {
            None => Dependency::Absent,
            Some(id) => match self
                .store()
                .get_as::<Category>(&Scope::categories(partition), id)
                .await
            {
                Ok(Some(c)) => Dependency::Found(c),
                Ok(None) => Dependency::Unavailable(format!("category {id} not found in source partition")),
                Err(e) => Dependency::Unavailable(e.to_string()),
            },
        };

        let supplier = match source.supplier_name.as_deref().map(str::trim) {
            None | Some("") => Dependency::Absent,
            Some(name) => match self
                .store()
                .query_as::<Supplier>(&Scope::suppliers(partition), &[Filter::eq("name", name)])
                .await
            {
                Ok(found) => Dependency::Found(
                    found
                        .into_iter()
                        .next()
                        .unwrap_or_else(|| Supplier::new(name)),
                ),
                Err(e) => Dependency::Unavailable(e.to_string()),
            },
        };

        SourceDeps { category, supplier }
    }

    async fn confirm(
        &self,
        ctx: &PassContext<'_>,
        partition: &Partition,
        matched: &TargetMatch,
        transcript: &mut Transcript,
    ) -> SyncResult<Verdict> {
        let target_category = match &matched.entry.category_ref {
            None => None,
            Some(id) => match self
                .store()
                .get_as::<Category>(&Scope::categories(&partition.id), id)
                .await
            {
                Ok(found) => found.map(|c| c.name),
                Err(e) => {
                    warn!(partition = %partition.id, category = %id, error = %e, "target category lookup failed");
                    transcript.warn(
                        Some(&partition.display_name),
                        format!("category of the existing entry could not be read: {e}"),
                    );
                    None
                }
            },
        };
        let pending = PendingConfirmation {
            partition_id: partition.id.clone(),
            partition_name: partition.display_name.clone(),
            strategy: matched.strategy,
            source: EntrySummary::from(ctx.source),
            target: EntrySummary::from(&matched.entry),
            target_category,
        };
        Ok(self.gate.confirm(&pending).await?)
    }

    async fn sync_partition(
        &self,
        ctx: &PassContext<'_>,
        partition: &Partition,
        transcript: &mut Transcript,
    ) -> SyncResult<SyncOutcome> {
        let label = Some(partition.display_name.as_str());

        let target = IdentityResolver::new(self.store())
            .resolve(ctx.source, &ctx.codes, &partition.id)
            .await?;
        match &target {
            Some(m) => transcript.info(
                label,
                format!("found \"{}\" by {}", m.entry.name, m.strategy),
            ),
            None => transcript.info(label, "no existing copy; creating one"),
        }

        if let Some(m) = target.as_ref().filter(|m| m.strategy.requires_confirmation()) {
            let verdict = self.confirm(ctx, partition, m, transcript).await?;
            transcript.info(label, format!("match {}", verdict.label()));
            if !verdict.is_accepted() {
                let mut outcome = SyncOutcome::new(
                    partition,
                    SyncAction::Skipped,
                    format!("match by {} {}", m.strategy, verdict.label()),
                );
                outcome.strategy = Some(m.strategy);
                return Ok(outcome);
            }
        }

        let provisioner = Provisioner::new(self.store());
        let mut warnings = Vec::new();

        let category = match &ctx.deps.category {
            Dependency::Absent => None,
            Dependency::Found(source_category) => {
                match provisioner.ensure_category(source_category, &partition.id).await {
                    Ok(p) => {
                        let verb = if p.created { "created" } else { "found" };
                        transcript.info(label, format!("category \"{}\" {verb}", p.name));
                        Some(p.id)
                    }
                    Err(e) => {
                        transcript.warn(label, e.to_string());
                        warnings.push(e.to_string());
                        None
                    }
                }
            }
            Dependency::Unavailable(reason) => {
                let message = format!("category left unset: {reason}");
                transcript.warn(label, &message);
                warnings.push(message);
                None
            }
        };

        let supplier = match &ctx.deps.supplier {
            Dependency::Absent => None,
            Dependency::Found(source_supplier) => {
                match provisioner.ensure_supplier(source_supplier, &partition.id).await {
                    Ok(p) => {
                        let verb = if p.created { "created" } else { "found" };
                        transcript.info(label, format!("supplier \"{}\" {verb}", p.name));
                        Some(p.name)
                    }
                    Err(e) => {
                        transcript.warn(label, e.to_string());
                        warnings.push(e.to_string());
                        None
                    }
                }
            }
            Dependency::Unavailable(reason) => {
                let message = format!("supplier left unset: {reason}");
                transcript.warn(label, &message);
                warnings.push(message);
                None
            }
        };

        let plan = plan_write(
            ctx.source,
            target.as_ref().map(|m| &m.entry),
            &ResolvedRefs { category, supplier },
            &ctx.codes,
            ctx.acting_user,
        )?;

        let scope = Scope::catalog(&partition.id);
        let write_failed = |e: catsync_store::StoreError| SyncError::PartitionWriteFailed {
            partition: partition.id.clone(),
            reason: e.to_string(),
        };
        let (action, record_id) = match &plan.kind {
            WriteKind::Create => {
                let id = self
                    .store()
                    .create_from(&scope, &plan.entry)
                    .await
                    .map_err(write_failed)?;
                (SyncAction::Created, id)
            }
            WriteKind::Update { target_id } => {
                self.store()
                    .update_from(&scope, target_id, &plan.entry)
                    .await
                    .map_err(write_failed)?;
                (SyncAction::Updated, target_id.clone())
            }
        };

        for v in plan.variants.iter().filter(|v| !v.carried && !plan.is_create()) {
            transcript.info(
                label,
                format!("variant \"{}\" ({}) is new here; stock starts at 0", v.name, v.kind.label()),
            );
        }

        let mut message = format!("{action} \"{}\"", plan.entry.name);
        if !warnings.is_empty() {
            message.push_str(&format!(" with {} partial failure(s)", warnings.len()));
        }
        transcript.info(label, &message);

        Ok(SyncOutcome {
            partition_id: partition.id.clone(),
            partition_name: partition.display_name.clone(),
            action,
            message,
            strategy: target.map(|m| m.strategy),
            record_id: Some(record_id),
            warnings,
        })
    }
}
