//! Cross-partition catalog synchronization.
//!
//! A merchant (owner) runs several partitions, each with its own catalog.
//! When an entry is saved in one partition, [`SyncEngine`] propagates its
//! catalog attributes to every sibling partition of the same owner, while
//! each partition keeps its own stock.
//!
//! # Key Types
//!
//! - [`SyncEngine`] -- sequential, best-effort fan-out over sibling partitions
//! - [`SyncTrigger`] -- on-save and on-demand entry points with an in-flight guard
//! - [`IdentityResolver`] -- finds the target copy: root id, code, name, trimmed name, new code
//! - [`Provisioner`] -- find-or-create of categories and suppliers in the target
//! - [`SyncReport`] -- per-partition [`SyncOutcome`]s plus a [`Transcript`]
//! - [`SyncConfig`] -- TOML configuration (confirmation timeout, owner preferences)
//!
//! # Design Rules
//!
//! 1. Partitions are processed one at a time and a failure in one never stops the rest.
//! 2. Stock is never copied between partitions; fresh copies start at zero.
//! 3. The root id is generated at most once per product and written back to the source.
//! 4. Any match that is not by root id needs an explicit confirmation before it is written.
//! 5. Nothing is retried or rolled back.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod provisioner;
pub mod resolver;
pub mod transcript;
pub mod trigger;

pub use config::{OwnerPreferences, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use orchestrator::{SyncEngine, SyncRequest};
pub use outcome::{RunStatus, SyncAction, SyncOutcome, SyncReport};
pub use provisioner::{Provisioned, Provisioner};
pub use catsync_merge::CodeChange;
pub use resolver::{IdentityResolver, TargetMatch};
pub use transcript::{LineLevel, Transcript, TranscriptLine};
pub use trigger::SyncTrigger;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use catsync_gate::{ChannelGate, ConfirmationGate, GateConfig, StaticGate};
    use catsync_store::{
        to_document, Document, Filter, InMemoryRecordStore, Record, RecordStore, StoreError, StoreResult, Scope,
    };
    use catsync_types::{
        CatalogEntry, Category, MatchStrategy, OwnerId, Partition, PartitionId, RecordId, RootId, Supplier, UserId,
        Variant,
    };

    const OWNER: &str = "acme";

    fn pid(n: usize) -> PartitionId {
        PartitionId::new(format!("p{n}"))
    }

    fn backend(partitions: usize) -> Arc<InMemoryRecordStore> {
        let store = InMemoryRecordStore::new();
        for n in 1..=partitions {
            store.add_partition(Partition::new(pid(n), OWNER, format!("Store {n}")));
        }
        Arc::new(store)
    }

    fn engine(store: &Arc<InMemoryRecordStore>, gate: Arc<dyn ConfirmationGate>) -> SyncEngine {
        SyncEngine::with_backend(store.clone(), gate)
    }

    /// Seed `entry` into partition `n` and return it with its record id.
    fn put(store: &InMemoryRecordStore, n: usize, entry: &CatalogEntry) -> CatalogEntry {
        let id = store
            .insert(&Scope::catalog(&pid(n)), to_document(entry).unwrap())
            .unwrap();
        let mut saved = entry.clone();
        saved.id = Some(id);
        saved
    }

    fn copies(store: &InMemoryRecordStore, n: usize) -> Vec<CatalogEntry> {
        store
            .records(&Scope::catalog(&pid(n)))
            .iter()
            .map(|r| r.decode().unwrap())
            .collect()
    }

    fn only_copy(store: &InMemoryRecordStore, n: usize) -> CatalogEntry {
        let mut all = copies(store, n);
        assert_eq!(all.len(), 1, "expected exactly one entry in p{n}");
        all.remove(0)
    }

    fn request(entry: &CatalogEntry) -> SyncRequest {
        SyncRequest::new(pid(1), entry.clone(), OwnerId::new(OWNER), UserId::new("clerk"))
    }

    fn shirt() -> CatalogEntry {
        let mut e = CatalogEntry::new("Linen Shirt");
        e.legacy_code = Some("SH-01".into());
        e.cost_price = 4_000;
        e.sale_price = 9_900;
        e.variants = vec![
            Variant::new("Cash").with_prices(4_000, 9_900).with_stock(5, 5),
            Variant::new("Installments").with_prices(4_000, 10_900).with_stock(3, 3),
        ];
        e.stock_quantity = 8;
        e.stock_initial = 8;
        e
    }

    fn stocks(entry: &CatalogEntry) -> Vec<(String, i64)> {
        entry
            .variants
            .iter()
            .map(|v| (v.name.clone(), v.stock_quantity))
            .collect()
    }

    /// Wraps the in-memory store and fails reads or writes on chosen scopes.
    #[derive(Default)]
    struct Faults {
        reads: Vec<Scope>,
        writes: Vec<Scope>,
    }

    struct FaultyStore {
        inner: Arc<InMemoryRecordStore>,
        faults: Faults,
    }

    fn check(failing: &[Scope], scope: &Scope) -> StoreResult<()> {
        if failing.contains(scope) {
            return Err(StoreError::Backend(format!("{scope}: disk full")));
        }
        Ok(())
    }

    #[async_trait]
    impl RecordStore for FaultyStore {
        async fn query(&self, scope: &Scope, filters: &[Filter]) -> StoreResult<Vec<Record>> {
            check(&self.faults.reads, scope)?;
            self.inner.query(scope, filters).await
        }

        async fn create(&self, scope: &Scope, data: Document) -> StoreResult<RecordId> {
            check(&self.faults.writes, scope)?;
            self.inner.create(scope, data).await
        }

        async fn update(&self, scope: &Scope, id: &RecordId, partial: Document) -> StoreResult<()> {
            check(&self.faults.writes, scope)?;
            self.inner.update(scope, id, partial).await
        }
    }

    fn faulty_engine(store: &Arc<InMemoryRecordStore>, faults: Faults, gate: Arc<dyn ConfirmationGate>) -> SyncEngine {
        let faulty = FaultyStore {
            inner: store.clone(),
            faults,
        };
        SyncEngine::new(Arc::new(faulty), store.clone(), gate)
    }

    fn failing_engine(store: &Arc<InMemoryRecordStore>, writes: Vec<Scope>) -> SyncEngine {
        let faults = Faults {
            writes,
            ..Faults::default()
        };
        faulty_engine(store, faults, Arc::new(StaticGate::accept_all()))
    }

    // ----------------------------------------------------------------
    // Idempotency
    // ----------------------------------------------------------------

    #[tokio::test]
    async fn rerun_updates_the_same_copy() {
        let store = backend(2);
        let mut source = shirt();
        source.root_id = Some(RootId::new());
        let source = put(&store, 1, &source);
        let gate = Arc::new(StaticGate::accept_all());
        let engine = engine(&store, gate.clone());

        let first = engine.synchronize(request(&source)).await.unwrap();
        assert_eq!(first.outcome(&pid(2)).unwrap().action, SyncAction::Created);
        let created = only_copy(&store, 2);

        let second = engine.synchronize(request(&source)).await.unwrap();
        let outcome = second.outcome(&pid(2)).unwrap();
        assert_eq!(outcome.action, SyncAction::Updated);
        assert_eq!(outcome.strategy, Some(MatchStrategy::RootId));
        assert_eq!(outcome.record_id, created.id);

        let updated = only_copy(&store, 2);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.sale_price, created.sale_price);
        assert_eq!(stocks(&updated), stocks(&created));
        assert!(gate.asked().is_empty());
    }

    // ----------------------------------------------------------------
    // Stock
    // ----------------------------------------------------------------

    #[tokio::test]
    async fn stock_is_never_donated() {
        let store = backend(2);
        let root = RootId::new();
        let mut existing = shirt();
        existing.root_id = Some(root.clone());
        existing.variants[0].stock_quantity = 40;
        existing.variants[1].stock_quantity = 2;
        existing.stock_quantity = 42;
        put(&store, 2, &existing);

        let mut source = shirt();
        source.root_id = Some(root.clone());
        source.sale_price = 12_900;
        let source = put(&store, 1, &source);

        let report = engine(&store, Arc::new(StaticGate::accept_all()))
            .synchronize(request(&source))
            .await
            .unwrap();
        assert_eq!(report.count(SyncAction::Updated), 1);

        let copy = only_copy(&store, 2);
        assert_eq!(copy.sale_price, 12_900);
        assert_eq!(
            stocks(&copy),
            vec![("Cash".to_string(), 40), ("Installments".to_string(), 2)]
        );
        assert_eq!(copy.stock_quantity, 42);
    }

    #[tokio::test]
    async fn fresh_partition_starts_with_zero_stock() {
        let store = backend(2);
        let source = put(&store, 1, &shirt());

        engine(&store, Arc::new(StaticGate::accept_all()))
            .synchronize(request(&source))
            .await
            .unwrap();

        let copy = only_copy(&store, 2);
        assert_eq!(copy.stock_quantity, 0);
        assert_eq!(copy.stock_initial, 0);
        assert!(copy.variants.iter().all(|v| v.stock_quantity == 0 && v.stock_initial == 0));
        assert_eq!(copy.variants.len(), 2);
        assert_eq!(copy.variants[1].sale_price, 10_900);
        assert_eq!(copy.created_by, Some(UserId::new("clerk")));
        assert_eq!(copy.legacy_code.as_deref(), Some("SH-01"));
    }

    #[tokio::test]
    async fn variants_match_by_name_not_position() {
        let store = backend(2);
        let root = RootId::new();
        let mut existing = shirt();
        existing.root_id = Some(root.clone());
        existing.variants = vec![
            Variant::new("Installments").with_stock(7, 7),
            Variant::new("Cash").with_stock(9, 9),
        ];
        put(&store, 2, &existing);

        let mut source = shirt();
        source.root_id = Some(root.clone());
        let source = put(&store, 1, &source);

        engine(&store, Arc::new(StaticGate::accept_all()))
            .synchronize(request(&source))
            .await
            .unwrap();

        let copy = only_copy(&store, 2);
        assert_eq!(
            stocks(&copy),
            vec![("Cash".to_string(), 9), ("Installments".to_string(), 7)]
        );
        assert_eq!(copy.variants[0].stock_initial, 9);
        assert_eq!(copy.stock_quantity, 16);
    }

    #[tokio::test]
    async fn new_variant_starts_at_zero() {
        let store = backend(2);
        let root = RootId::new();
        let mut existing = shirt();
        existing.root_id = Some(root.clone());
        put(&store, 2, &existing);

        let mut source = shirt();
        source.root_id = Some(root.clone());
        source
            .variants
            .push(Variant::new("Gift Card").with_prices(0, 5_000).with_stock(50, 50));
        let source = put(&store, 1, &source);

        let report = engine(&store, Arc::new(StaticGate::accept_all()))
            .synchronize(request(&source))
            .await
            .unwrap();

        let copy = only_copy(&store, 2);
        let gift = copy.variant("Gift Card").unwrap();
        assert_eq!(gift.stock_quantity, 0);
        assert_eq!(gift.sale_price, 5_000);
        assert_eq!(copy.variant("Cash").unwrap().stock_quantity, 5);
        assert!(report.transcript.mentions("Gift Card"));
    }

    // ----------------------------------------------------------------
    // Root id
    // ----------------------------------------------------------------

    #[tokio::test]
    async fn root_id_is_assigned_once_and_reused() {
        let store = backend(2);
        let source = put(&store, 1, &shirt());
        let source_id = source.id.clone().unwrap();
        let trigger = SyncTrigger::new(engine(&store, Arc::new(StaticGate::accept_all())));

        let first = trigger
            .on_entry_saved(request(&source), &OwnerPreferences::default())
            .await
            .unwrap();
        let root = first.root_id.unwrap();
        assert_eq!(only_copy(&store, 1).root_id, Some(root.clone()));
        assert_eq!(only_copy(&store, 2).root_id, Some(root.clone()));

        store.add_partition(Partition::new("p3", OWNER, "Store 3"));
        let second = trigger
            .sync_now(&pid(1), &source_id, &OwnerId::new(OWNER), &UserId::new("clerk"))
            .await
            .unwrap();

        assert_eq!(second.root_id, Some(root.clone()));
        assert!(!second.transcript.mentions("assigned root id"));
        assert_eq!(only_copy(&store, 3).root_id, Some(root.clone()));
        assert_eq!(only_copy(&store, 1).root_id, Some(root.clone()));
        assert_eq!(second.outcome(&pid(2)).unwrap().strategy, Some(MatchStrategy::RootId));
    }

    #[tokio::test]
    async fn stale_copy_without_root_id_reuses_the_stored_one() {
        let store = backend(2);
        let stale = put(&store, 1, &shirt());
        let trigger = SyncTrigger::new(engine(&store, Arc::new(StaticGate::accept_all())));
        let prefs = OwnerPreferences::default();

        let first = trigger.on_entry_saved(request(&stale), &prefs).await.unwrap();
        let root = first.root_id.unwrap();

        // saved again from the copy loaded before the first pass
        let second = trigger.on_entry_saved(request(&stale), &prefs).await.unwrap();
        assert_eq!(second.root_id, Some(root.clone()));
        assert!(second.transcript.mentions("reusing stored root id"));
        assert!(!second.transcript.mentions("assigned root id"));
        assert_eq!(only_copy(&store, 1).root_id, Some(root.clone()));
        assert_eq!(only_copy(&store, 2).root_id, Some(root));
        assert_eq!(second.outcome(&pid(2)).unwrap().strategy, Some(MatchStrategy::RootId));
    }

    #[tokio::test]
    async fn root_id_write_failure_aborts_the_run() {
        let store = backend(2);
        let source = put(&store, 1, &shirt());
        let engine = failing_engine(&store, vec![Scope::catalog(&pid(1))]);

        let err = engine.synchronize(request(&source)).await.unwrap_err();
        assert!(matches!(err, SyncError::Store(StoreError::Backend(_))));
        assert!(copies(&store, 2).is_empty());
    }

    // ----------------------------------------------------------------
    // Confirmation
    // ----------------------------------------------------------------

    #[tokio::test]
    async fn only_root_id_matches_skip_confirmation() {
        let store = backend(3);
        let root = RootId::new();
        // p2: same code, never linked
        put(&store, 2, &shirt());
        // p3: linked copy under a different name
        let mut linked = CatalogEntry::new("Shirt (old name)");
        linked.root_id = Some(root.clone());
        put(&store, 3, &linked);

        let mut source = shirt();
        source.root_id = Some(root.clone());
        let source = put(&store, 1, &source);
        let gate = Arc::new(StaticGate::accept_all());

        let report = engine(&store, gate.clone())
            .synchronize(request(&source))
            .await
            .unwrap();

        let asked = gate.asked();
        assert_eq!(asked.len(), 1);
        assert_eq!(asked[0].partition_id, pid(2));
        assert_eq!(asked[0].strategy, MatchStrategy::LegacyCode);
        assert_eq!(asked[0].target.code.as_deref(), Some("SH-01"));

        assert_eq!(report.outcome(&pid(2)).unwrap().strategy, Some(MatchStrategy::LegacyCode));
        assert_eq!(report.outcome(&pid(3)).unwrap().strategy, Some(MatchStrategy::RootId));
        assert_eq!(only_copy(&store, 2).root_id, Some(root.clone()));
        assert_eq!(only_copy(&store, 3).name, "Linen Shirt");
    }

    #[tokio::test]
    async fn declined_match_is_skipped() {
        let store = backend(2);
        let mut other = shirt();
        other.name = "Different Shirt".into();
        put(&store, 2, &other);
        let source = put(&store, 1, &shirt());

        let report = engine(&store, Arc::new(StaticGate::decline_all()))
            .synchronize(request(&source))
            .await
            .unwrap();

        let outcome = report.outcome(&pid(2)).unwrap();
        assert_eq!(outcome.action, SyncAction::Skipped);
        assert_eq!(outcome.strategy, Some(MatchStrategy::LegacyCode));
        let copy = only_copy(&store, 2);
        assert_eq!(copy.name, "Different Shirt");
        assert!(copy.root_id.is_none());
    }

    #[tokio::test]
    async fn dismissed_prompt_is_skipped() {
        let store = backend(2);
        put(&store, 2, &shirt());
        let source = put(&store, 1, &shirt());
        let (gate, mut requests) = ChannelGate::new(GateConfig::default());
        let engine = engine(&store, Arc::new(gate));

        let (report, _) = tokio::join!(engine.synchronize(request(&source)), async {
            let pending = requests.recv().await.unwrap();
            assert!(pending.pending.question().contains("Store 2"));
            drop(pending);
        });

        let report = report.unwrap();
        assert_eq!(report.outcome(&pid(2)).unwrap().action, SyncAction::Skipped);
        assert!(report.transcript.mentions("dismissed"));
    }

    #[tokio::test]
    async fn unavailable_gate_fails_only_that_partition() {
        let store = backend(3);
        put(&store, 2, &shirt());
        let source = put(&store, 1, &shirt());
        let (gate, requests) = ChannelGate::new(GateConfig::default());
        drop(requests);

        let report = engine(&store, Arc::new(gate))
            .synchronize(request(&source))
            .await
            .unwrap();

        assert_eq!(report.outcome(&pid(2)).unwrap().action, SyncAction::Failed);
        assert_eq!(report.outcome(&pid(3)).unwrap().action, SyncAction::Created);
    }

    #[tokio::test]
    async fn edited_code_still_finds_copy_by_original_code() {
        let store = backend(2);
        put(&store, 2, &shirt());
        let mut source = shirt();
        source.legacy_code = Some("SH-02".into());
        let source = put(&store, 1, &source);
        let gate = Arc::new(StaticGate::accept_all());

        let report = engine(&store, gate.clone())
            .synchronize(request(&source).with_original_code(Some("SH-01")))
            .await
            .unwrap();

        assert_eq!(report.outcome(&pid(2)).unwrap().action, SyncAction::Updated);
        assert_eq!(gate.asked()[0].strategy, MatchStrategy::LegacyCode);
        // the target keeps its own code
        assert_eq!(only_copy(&store, 2).legacy_code.as_deref(), Some("SH-01"));
    }

    #[tokio::test]
    async fn name_match_needs_confirmation() {
        let store = backend(2);
        let mut local = CatalogEntry::new("Linen Shirt");
        local.legacy_code = Some("LOCAL-9".into());
        put(&store, 2, &local);
        let source = put(&store, 1, &shirt());
        let gate = Arc::new(StaticGate::decline_all());

        let report = engine(&store, gate.clone())
            .synchronize(request(&source))
            .await
            .unwrap();

        let asked = gate.asked();
        assert_eq!(asked.len(), 1);
        assert_eq!(asked[0].strategy, MatchStrategy::Name);
        let outcome = report.outcome(&pid(2)).unwrap();
        assert_eq!(outcome.action, SyncAction::Skipped);
        assert_eq!(outcome.strategy, Some(MatchStrategy::Name));
        assert!(only_copy(&store, 2).root_id.is_none());
    }

    #[tokio::test]
    async fn trimmed_name_match_needs_confirmation() {
        let store = backend(2);
        put(&store, 2, &CatalogEntry::new("Linen Shirt"));
        let mut source = shirt();
        source.name = "  Linen Shirt ".into();
        source.legacy_code = None;
        let source = put(&store, 1, &source);
        let gate = Arc::new(StaticGate::accept_all());

        let report = engine(&store, gate.clone())
            .synchronize(request(&source))
            .await
            .unwrap();

        assert_eq!(gate.asked()[0].strategy, MatchStrategy::TrimmedName);
        let outcome = report.outcome(&pid(2)).unwrap();
        assert_eq!(outcome.action, SyncAction::Updated);
        assert_eq!(outcome.strategy, Some(MatchStrategy::TrimmedName));
        assert_eq!(copies(&store, 2).len(), 1);
    }

    #[tokio::test]
    async fn new_code_match_needs_confirmation() {
        let store = backend(2);
        let mut local = CatalogEntry::new("Summer shirt");
        local.legacy_code = Some("SH-02".into());
        put(&store, 2, &local);
        let mut source = shirt();
        source.legacy_code = Some("SH-02".into());
        let source = put(&store, 1, &source);
        let gate = Arc::new(StaticGate::decline_all());

        let report = engine(&store, gate.clone())
            .synchronize(request(&source).with_original_code(Some("SH-01")))
            .await
            .unwrap();

        assert_eq!(gate.asked()[0].strategy, MatchStrategy::NewCode);
        assert_eq!(report.outcome(&pid(2)).unwrap().action, SyncAction::Skipped);
        assert_eq!(only_copy(&store, 2).name, "Summer shirt");
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_prompts_time_out_one_after_another() {
        let store = backend(4);
        put(&store, 2, &shirt());
        put(&store, 3, &shirt());
        let source = put(&store, 1, &shirt());
        // the receiver stays open but nobody reads it
        let (gate, _requests) = ChannelGate::new(GateConfig::with_timeout(Duration::from_secs(30)));

        let report = engine(&store, Arc::new(gate))
            .synchronize(request(&source))
            .await
            .unwrap();

        for n in [2, 3] {
            let outcome = report.outcome(&pid(n)).unwrap();
            assert_eq!(outcome.action, SyncAction::Skipped);
            assert!(outcome.message.contains("timed out"), "{}", outcome.message);
        }
        assert_eq!(report.outcome(&pid(4)).unwrap().action, SyncAction::Created);
    }

    #[tokio::test]
    async fn unreadable_target_category_is_reported() {
        let store = backend(2);
        let mut local = shirt();
        local.category_ref = Some(RecordId::new("cat-9"));
        put(&store, 2, &local);
        let source = put(&store, 1, &shirt());
        let gate = Arc::new(StaticGate::accept_all());
        let faults = Faults {
            reads: vec![Scope::categories(&pid(2))],
            ..Faults::default()
        };

        let report = faulty_engine(&store, faults, gate.clone())
            .synchronize(request(&source))
            .await
            .unwrap();

        assert_eq!(gate.asked()[0].target_category, None);
        assert!(report
            .transcript
            .lines()
            .iter()
            .any(|l| l.level == LineLevel::Warn && l.message.contains("could not be read")));
        assert_eq!(report.outcome(&pid(2)).unwrap().action, SyncAction::Updated);
    }

    // ----------------------------------------------------------------
    // Legacy codes
    // ----------------------------------------------------------------

    #[tokio::test]
    async fn codeless_source_keeps_local_codes() {
        let store = backend(2);
        let root = RootId::new();
        let mut local = shirt();
        local.root_id = Some(root.clone());
        local.legacy_code = Some("LOCAL-9".into());
        put(&store, 2, &local);
        let mut source = shirt();
        source.root_id = Some(root);
        source.legacy_code = None;
        let source = put(&store, 1, &source);

        engine(&store, Arc::new(StaticGate::accept_all()))
            .synchronize(request(&source))
            .await
            .unwrap();

        assert_eq!(only_copy(&store, 2).legacy_code.as_deref(), Some("LOCAL-9"));
    }

    #[tokio::test]
    async fn emptied_source_code_clears_local_codes() {
        let store = backend(2);
        let root = RootId::new();
        let mut local = shirt();
        local.root_id = Some(root.clone());
        local.legacy_code = Some("LOCAL-9".into());
        put(&store, 2, &local);
        let mut source = shirt();
        source.root_id = Some(root);
        source.legacy_code = Some(" ".into());
        let source = put(&store, 1, &source);

        engine(&store, Arc::new(StaticGate::accept_all()))
            .synchronize(request(&source).with_original_code(Some("SH-01")))
            .await
            .unwrap();

        assert_eq!(only_copy(&store, 2).legacy_code, None);
    }

    #[tokio::test]
    async fn foreign_root_id_on_target_does_not_fail_the_partition() {
        let store = backend(2);
        let mut doc = to_document(&CatalogEntry::new("Linen Shirt")).unwrap();
        doc.insert("rootId".into(), "legacy-root-42".into());
        store.insert(&Scope::catalog(&pid(2)), doc).unwrap();
        let mut source = shirt();
        source.legacy_code = None;
        let source = put(&store, 1, &source);

        let report = engine(&store, Arc::new(StaticGate::accept_all()))
            .synchronize(request(&source))
            .await
            .unwrap();

        let outcome = report.outcome(&pid(2)).unwrap();
        assert_eq!(outcome.action, SyncAction::Updated);
        assert_eq!(outcome.strategy, Some(MatchStrategy::Name));
        assert_eq!(only_copy(&store, 2).root_id, report.root_id);
    }

    // ----------------------------------------------------------------
    // Isolation and partial failures
    // ----------------------------------------------------------------

    #[tokio::test]
    async fn one_failing_partition_does_not_stop_the_rest() {
        let store = backend(4);
        store.set_read_only(&pid(3), true);
        let source = put(&store, 1, &shirt());

        let report = engine(&store, Arc::new(StaticGate::accept_all()))
            .synchronize(request(&source))
            .await
            .unwrap();

        assert_eq!(report.status, RunStatus::Completed);
        assert_eq!(report.touched(), 3);
        assert_eq!(report.outcome(&pid(2)).unwrap().action, SyncAction::Created);
        assert_eq!(report.outcome(&pid(4)).unwrap().action, SyncAction::Created);
        let failed = report.outcome(&pid(3)).unwrap();
        assert_eq!(failed.action, SyncAction::Failed);
        assert!(failed.message.contains("read-only"), "{}", failed.message);
        assert!(report
            .transcript
            .lines()
            .iter()
            .any(|l| l.level == LineLevel::Error && l.partition.as_deref() == Some("Store 3")));
        assert_eq!(only_copy(&store, 4).name, "Linen Shirt");
        assert!(report.to_string().contains("1 failed"));
    }

    #[tokio::test]
    async fn write_failure_reports_partition() {
        let store = backend(3);
        let source = put(&store, 1, &shirt());
        let engine = failing_engine(&store, vec![Scope::catalog(&pid(2))]);

        let report = engine.synchronize(request(&source)).await.unwrap();
        let failed = report.outcome(&pid(2)).unwrap();
        assert_eq!(failed.action, SyncAction::Failed);
        assert!(failed.message.contains("write to partition p2 failed"));
        assert_eq!(report.outcome(&pid(3)).unwrap().action, SyncAction::Created);
    }

    #[tokio::test]
    async fn dependencies_are_provisioned_in_target() {
        let store = backend(2);
        let category_id = store
            .insert(&Scope::categories(&pid(1)), to_document(&Category::new("Apparel")).unwrap())
            .unwrap();
        let mut supplier = Supplier::new("Acme Textiles");
        supplier.phone = Some("555-0100".into());
        store
            .insert(&Scope::suppliers(&pid(1)), to_document(&supplier).unwrap())
            .unwrap();
        store
            .insert(&Scope::suppliers(&pid(2)), to_document(&Supplier::new("ACME TEXTILES")).unwrap())
            .unwrap();

        let mut source = shirt();
        source.category_ref = Some(category_id);
        source.supplier_name = Some("Acme Textiles".into());
        let source = put(&store, 1, &source);

        let report = engine(&store, Arc::new(StaticGate::accept_all()))
            .synchronize(request(&source))
            .await
            .unwrap();
        assert!(!report.outcome(&pid(2)).unwrap().is_partial());

        let categories = store.records(&Scope::categories(&pid(2)));
        assert_eq!(categories.len(), 1);
        let copy = only_copy(&store, 2);
        assert_eq!(copy.category_ref, Some(categories[0].id.clone()));
        assert_eq!(copy.supplier_name.as_deref(), Some("ACME TEXTILES"));
        assert_eq!(store.count(&Scope::suppliers(&pid(2))), 1);
    }

    #[tokio::test]
    async fn dependency_failure_is_partial() {
        let store = backend(2);
        let category_id = store
            .insert(&Scope::categories(&pid(1)), to_document(&Category::new("Apparel")).unwrap())
            .unwrap();
        let mut source = shirt();
        source.category_ref = Some(category_id);
        let source = put(&store, 1, &source);
        let engine = failing_engine(&store, vec![Scope::categories(&pid(2))]);

        let report = engine.synchronize(request(&source)).await.unwrap();

        let outcome = report.outcome(&pid(2)).unwrap();
        assert_eq!(outcome.action, SyncAction::Created);
        assert!(outcome.is_partial());
        assert!(outcome.warnings[0].contains("Apparel"));
        assert!(only_copy(&store, 2).category_ref.is_none());
        assert!(report
            .transcript
            .lines()
            .iter()
            .any(|l| l.level == LineLevel::Warn));
    }

    #[tokio::test]
    async fn missing_source_category_is_a_warning() {
        let store = backend(2);
        let mut source = shirt();
        source.category_ref = Some(RecordId::new("gone"));
        let source = put(&store, 1, &source);

        let report = engine(&store, Arc::new(StaticGate::accept_all()))
            .synchronize(request(&source))
            .await
            .unwrap();

        let outcome = report.outcome(&pid(2)).unwrap();
        assert_eq!(outcome.action, SyncAction::Created);
        assert!(outcome.warnings[0].contains("category left unset"));
    }

    // ----------------------------------------------------------------
    // Run preconditions
    // ----------------------------------------------------------------

    #[tokio::test]
    async fn single_partition_owner_is_a_no_op() {
        let store = backend(1);
        let source = put(&store, 1, &shirt());

        let report = engine(&store, Arc::new(StaticGate::accept_all()))
            .synchronize(request(&source))
            .await
            .unwrap();

        assert_eq!(report.status, RunStatus::NoSiblingPartitions);
        assert_eq!(report.touched(), 0);
        assert!(report.root_id.is_none());
        assert!(only_copy(&store, 1).root_id.is_none());
    }

    #[tokio::test]
    async fn foreign_source_partition_is_rejected() {
        let store = backend(2);
        store.add_partition(Partition::new("x1", "someone-else", "Elsewhere"));
        let mut source = shirt();
        source.id = Some(RecordId::new("e1"));
        let mut req = request(&source);
        req.source_partition = PartitionId::new("x1");

        let err = engine(&store, Arc::new(StaticGate::accept_all()))
            .synchronize(req)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::PartitionNotOwned { .. }));
    }

    #[tokio::test]
    async fn unsaved_source_is_rejected() {
        let store = backend(2);
        let err = engine(&store, Arc::new(StaticGate::accept_all()))
            .synchronize(request(&shirt()))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::SourceWithoutId));
    }

    // ----------------------------------------------------------------
    // Trigger
    // ----------------------------------------------------------------

    #[tokio::test]
    async fn save_with_propagation_off_is_disabled() {
        let store = backend(2);
        let source = put(&store, 1, &shirt());
        let trigger = SyncTrigger::new(engine(&store, Arc::new(StaticGate::accept_all())));
        let prefs = OwnerPreferences {
            propagate_on_save: false,
        };

        let report = trigger.on_entry_saved(request(&source), &prefs).await.unwrap();
        assert_eq!(report.status, RunStatus::Disabled);
        assert!(copies(&store, 2).is_empty());
    }

    #[tokio::test]
    async fn sync_now_requires_a_stored_entry() {
        let store = backend(2);
        let trigger = SyncTrigger::new(engine(&store, Arc::new(StaticGate::accept_all())));
        let err = trigger
            .sync_now(&pid(1), &RecordId::new("missing"), &OwnerId::new(OWNER), &UserId::new("clerk"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::EntryNotFound { .. }));
    }

    #[tokio::test]
    async fn second_pass_for_same_entry_is_refused() {
        let store = backend(2);
        put(&store, 2, &shirt());
        let source = put(&store, 1, &shirt());
        let id = source.id.clone().unwrap();
        let (gate, mut requests) = ChannelGate::new(GateConfig::default());
        let trigger = SyncTrigger::new(engine(&store, Arc::new(gate)));
        let p1 = pid(1);
        let owner = OwnerId::new(OWNER);
        let user = UserId::new("clerk");

        let (first, refused) = tokio::join!(trigger.sync_now(&p1, &id, &owner, &user), async {
            let pending = requests.recv().await.unwrap();
            let refused = trigger.sync_now(&p1, &id, &owner, &user).await;
            pending.accept();
            refused
        });

        assert!(matches!(refused, Err(SyncError::AlreadyRunning { .. })));
        assert_eq!(first.unwrap().outcome(&pid(2)).unwrap().action, SyncAction::Updated);

        // guard released; the copy is now linked so no prompt is needed
        let again = trigger.sync_now(&p1, &id, &owner, &user).await.unwrap();
        assert_eq!(again.outcome(&pid(2)).unwrap().strategy, Some(MatchStrategy::RootId));
    }
}
