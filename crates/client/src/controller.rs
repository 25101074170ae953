//! Inventory view controller.
//!
//! One `InventoryController` owns all view state for a dashboard session:
//! the loaded collection, the search term, the staged edit and the last
//! error. Derived views (table, chart, report, summary) are recomputed from
//! that state on every call.
//!
//! The controller is the only writer of the item store. Remote writes go
//! through the [`MutationCoordinator`] so that writes to one item never
//! overlap; a failed remote call leaves the store exactly as it was.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDateTime;
use stockview_core::{DomainError, ItemId};
use stockview_inventory::{
    ChartSeries, InventoryItem, InventoryReport, InventorySummary, ItemPatch, ReportFormat,
    SearchTerm, to_series,
};

use crate::api::InventoryApi;
use crate::coordinator::{MutationCoordinator, MutationState};
use crate::error::ControllerError;
use crate::store::ItemStore;

/// Yes/no gate shown before a destructive action.
pub trait ConfirmPrompt {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Result of a delete request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The service deleted the item and it was removed locally.
    Deleted,
    /// The user declined the confirmation; nothing was sent.
    Cancelled,
}

#[derive(Debug, Default)]
struct ViewState {
    store: ItemStore,
    search: SearchTerm,
    staged: Option<InventoryItem>,
    last_error: Option<ControllerError>,
}

pub struct InventoryController {
    api: Arc<dyn InventoryApi>,
    report_format: ReportFormat,
    coordinator: MutationCoordinator,
    state: Mutex<ViewState>,
}

impl InventoryController {
    /// A controller with an empty collection. Call [`load`](Self::load) to
    /// populate it.
    pub fn new(api: Arc<dyn InventoryApi>, report_format: ReportFormat) -> Self {
        Self {
            api,
            report_format,
            coordinator: MutationCoordinator::new(),
            state: Mutex::new(ViewState::default()),
        }
    }

    fn view(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_error(&self, err: &ControllerError) {
        self.view().last_error = Some(err.clone());
    }

    // ---------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------

    /// Fetch the collection and replace local state wholesale.
    ///
    /// On failure the previous collection (possibly empty) is kept. Waits
    /// for writes in flight and holds off new ones until the snapshot is
    /// applied, so a reload never reverts a committed write.
    pub async fn load(&self) -> Result<Vec<InventoryItem>, ControllerError> {
        let _reload = self.coordinator.begin_reload().await;
        match self.api.list_items().await {
            Ok(items) => {
                let received = items.len();
                let loaded = {
                    let mut view = self.view();
                    let dropped = view.store.replace_all(items);
                    if dropped > 0 {
                        tracing::warn!(dropped, "service returned duplicate item ids");
                    }
                    view.store.items().to_vec()
                };
                self.coordinator
                    .retain_states(|id| loaded.iter().any(|item| &item.id == id));

                tracing::info!(received, loaded = loaded.len(), "inventory loaded");
                Ok(loaded)
            }
            Err(source) => {
                let err = ControllerError::fetch(source);
                tracing::error!(error = %err, source = ?err.api_error(), "inventory load failed");
                self.record_error(&err);
                Err(err)
            }
        }
    }

    // ---------------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------------

    /// Full collection, in service order. Chart and summary source.
    pub fn items(&self) -> Vec<InventoryItem> {
        self.view().store.items().to_vec()
    }

    /// Items matching the current search term. Table and report source.
    pub fn filtered_items(&self) -> Vec<InventoryItem> {
        let view = self.view();
        view.store.filtered(&view.search).into_iter().cloned().collect()
    }

    pub fn get(&self, id: &ItemId) -> Option<InventoryItem> {
        self.view().store.get(id).cloned()
    }

    pub fn set_search(&self, term: impl Into<String>) {
        self.view().search = SearchTerm::new(term);
    }

    pub fn search_term(&self) -> String {
        self.view().search.as_str().to_string()
    }

    /// Quantity series over the unfiltered collection.
    pub fn chart_series(&self) -> ChartSeries {
        to_series(self.view().store.items())
    }

    pub fn summary(&self) -> InventorySummary {
        InventorySummary::from_items(self.view().store.items())
    }

    /// Report over the current search view, stamped with `generated_at`.
    pub fn build_report(&self, generated_at: NaiveDateTime) -> InventoryReport {
        let view = self.view();
        let rows = view.store.filtered(&view.search);
        InventoryReport::build(&rows, generated_at, &self.report_format)
    }

    pub fn report_format(&self) -> &ReportFormat {
        &self.report_format
    }

    // ---------------------------------------------------------------------
    // Error slot
    // ---------------------------------------------------------------------

    /// The most recent failure. Successful operations do not clear it.
    pub fn last_error(&self) -> Option<ControllerError> {
        self.view().last_error.clone()
    }

    pub fn clear_error(&self) {
        self.view().last_error = None;
    }

    pub fn mutation_state(&self, id: &ItemId) -> MutationState {
        self.coordinator.state(id)
    }

    // ---------------------------------------------------------------------
    // Edit workflow
    // ---------------------------------------------------------------------

    /// Stage a copy of a loaded item for editing, replacing any earlier stage.
    pub fn begin_edit(&self, id: &ItemId) -> Result<InventoryItem, DomainError> {
        let mut view = self.view();
        let item = view
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("item {id}")))?;
        view.staged = Some(item.clone());
        Ok(item)
    }

    pub fn staged(&self) -> Option<InventoryItem> {
        self.view().staged.clone()
    }

    /// Apply a patch to the staged copy. The store is not touched.
    pub fn apply_patch(&self, patch: &ItemPatch) -> Result<InventoryItem, DomainError> {
        let mut view = self.view();
        let staged = view
            .staged
            .as_mut()
            .ok_or_else(|| DomainError::validation("no item is staged for editing"))?;
        patch.apply(staged)?;
        Ok(staged.clone())
    }

    pub fn cancel_edit(&self) {
        self.view().staged = None;
    }

    /// Submit the staged copy. The stage is cleared on success and kept on
    /// failure so the edit can be retried.
    pub async fn submit_edit(&self) -> Result<InventoryItem, ControllerError> {
        let staged = self.staged().ok_or_else(|| {
            let err = ControllerError::update("No item is staged for editing", None);
            self.record_error(&err);
            err
        })?;
        self.update(staged).await
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Replace one record on the service, then locally.
    ///
    /// Waits for any earlier write to the same id to resolve first.
    pub async fn update(&self, item: InventoryItem) -> Result<InventoryItem, ControllerError> {
        let permit = self.coordinator.begin(&item.id).await;

        if self.get(&item.id).is_none() {
            let err = ControllerError::update(format!("Item {} is not loaded", item.id), None);
            tracing::warn!(item_id = %item.id, "update rejected: item not loaded");
            self.record_error(&err);
            permit.fail();
            return Err(err);
        }

        tracing::info!(item_id = %item.id, "dispatching update");
        match self.api.update_item(&item).await {
            Ok(returned) => {
                let record = match returned {
                    Some(returned) if returned.id == item.id => returned,
                    Some(returned) => {
                        tracing::warn!(
                            item_id = %item.id,
                            returned_id = %returned.id,
                            "service echoed a different id; keeping submitted record"
                        );
                        item
                    }
                    None => item,
                };

                {
                    let mut view = self.view();
                    if let Err(err) = view.store.replace(record.clone()) {
                        tracing::warn!(item_id = %record.id, error = %err, "updated item vanished locally");
                    }
                    if view.staged.as_ref().is_some_and(|s| s.id == record.id) {
                        view.staged = None;
                    }
                }

                permit.commit();
                tracing::info!(item_id = %record.id, "update committed");
                Ok(record)
            }
            Err(source) => {
                let err = ControllerError::update(
                    format!("Failed to update item {}", item.id),
                    Some(source),
                );
                tracing::error!(item_id = %item.id, error = %err, source = ?err.api_error(), "update failed");
                self.record_error(&err);
                permit.fail();
                Err(err)
            }
        }
    }

    /// Delete one record after the user confirms.
    ///
    /// A declined prompt sends nothing and returns [`DeleteOutcome::Cancelled`].
    pub async fn remove(
        &self,
        id: &ItemId,
        prompt: &dyn ConfirmPrompt,
    ) -> Result<DeleteOutcome, ControllerError> {
        let Some(item) = self.get(id) else {
            let err = ControllerError::delete(format!("Item {id} is not loaded"), None);
            self.record_error(&err);
            return Err(err);
        };

        let question = format!(
            "Are you sure you want to delete \"{}\"?",
            item.display_name()
        );
        if !prompt.confirm(&question) {
            tracing::info!(item_id = %id, "delete cancelled by user");
            return Ok(DeleteOutcome::Cancelled);
        }

        let permit = self.coordinator.begin(id).await;

        if self.get(id).is_none() {
            let err = ControllerError::delete(format!("Item {id} is not loaded"), None);
            tracing::warn!(item_id = %id, "delete rejected: item already removed");
            self.record_error(&err);
            permit.fail();
            return Err(err);
        }

        tracing::info!(item_id = %id, "dispatching delete");
        match self.api.delete_item(id).await {
            Ok(()) => {
                {
                    let mut view = self.view();
                    if let Err(err) = view.store.remove(id) {
                        tracing::warn!(item_id = %id, error = %err, "deleted item vanished locally");
                    }
                    if view.staged.as_ref().is_some_and(|s| &s.id == id) {
                        view.staged = None;
                    }
                }

                permit.commit();
                tracing::info!(item_id = %id, "delete committed");
                Ok(DeleteOutcome::Deleted)
            }
            Err(source) => {
                let err = ControllerError::delete(format!("Failed to delete item {id}"), Some(source));
                tracing::error!(item_id = %id, error = %err, source = ?err.api_error(), "delete failed");
                self.record_error(&err);
                permit.fail();
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::error::ErrorKind;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeApi {
        items: Mutex<Vec<InventoryItem>>,
        fail_list: AtomicBool,
        fail_update: AtomicBool,
        fail_delete: AtomicBool,
        echo_updates: AtomicBool,
        calls: Mutex<Vec<String>>,
        hold_next_list: Mutex<Option<Arc<Notify>>>,
        hold_next_update: Mutex<Option<Arc<Notify>>>,
        hold_next_delete: Mutex<Option<Arc<Notify>>>,
    }

    impl FakeApi {
        fn with_items(items: Vec<InventoryItem>) -> Arc<Self> {
            let api = Self::default();
            *api.items.lock().unwrap() = items;
            api.echo_updates.store(true, Ordering::SeqCst);
            Arc::new(api)
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        async fn wait_if_held(slot: &Mutex<Option<Arc<Notify>>>) {
            let hold = slot.lock().unwrap().take();
            if let Some(gate) = hold {
                gate.notified().await;
            }
        }
    }

    #[async_trait]
    impl InventoryApi for FakeApi {
        async fn list_items(&self) -> Result<Vec<InventoryItem>, ApiError> {
            self.record("list".to_string());
            let snapshot = self.items.lock().unwrap().clone();
            Self::wait_if_held(&self.hold_next_list).await;
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(ApiError::Network("connection refused".to_string()));
            }
            Ok(snapshot)
        }

        async fn update_item(&self, item: &InventoryItem) -> Result<Option<InventoryItem>, ApiError> {
            let qty = item.quantity.map(|q| q.to_string()).unwrap_or_default();
            self.record(format!("update:start:{}:{}", item.id, qty));

            Self::wait_if_held(&self.hold_next_update).await;

            self.record(format!("update:end:{}:{}", item.id, qty));
            if self.fail_update.load(Ordering::SeqCst) {
                return Err(ApiError::Api(500, "write failed".to_string()));
            }
            if let Some(stored) = self.items.lock().unwrap().iter_mut().find(|i| i.id == item.id) {
                *stored = item.clone();
            }
            if self.echo_updates.load(Ordering::SeqCst) {
                Ok(Some(item.clone()))
            } else {
                Ok(None)
            }
        }

        async fn delete_item(&self, id: &ItemId) -> Result<(), ApiError> {
            self.record(format!("delete:{id}"));
            Self::wait_if_held(&self.hold_next_delete).await;
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(ApiError::Api(404, "not found".to_string()));
            }
            self.items.lock().unwrap().retain(|i| &i.id != id);
            Ok(())
        }
    }

    fn item(id: &str, name: &str, qty: Option<u64>) -> InventoryItem {
        InventoryItem {
            item_name: Some(name.to_string()),
            quantity: qty,
            ..InventoryItem::new(id)
        }
    }

    fn bolt_and_nut() -> Vec<InventoryItem> {
        vec![item("1", "Bolt", Some(2)), item("2", "Nut", Some(10))]
    }

    async fn loaded(items: Vec<InventoryItem>) -> (Arc<FakeApi>, InventoryController) {
        let api = FakeApi::with_items(items);
        let controller = InventoryController::new(api.clone(), ReportFormat::default());
        controller.load().await.unwrap();
        (api, controller)
    }

    fn yes(_: &str) -> bool {
        true
    }

    fn no(_: &str) -> bool {
        false
    }

    #[tokio::test]
    async fn starts_empty_and_loads_in_service_order() {
        let api = FakeApi::with_items(bolt_and_nut());
        let controller = InventoryController::new(api.clone(), ReportFormat::default());
        assert!(controller.items().is_empty());

        let loaded = controller.load().await.unwrap();
        assert_eq!(loaded, bolt_and_nut());
        assert_eq!(controller.items(), bolt_and_nut());
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_collection() {
        let (api, controller) = loaded(bolt_and_nut()).await;
        api.fail_list.store(true, Ordering::SeqCst);

        let err = controller.load().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Fetch);
        assert_eq!(err.message(), "Failed to fetch inventory items");
        assert_eq!(controller.items(), bolt_and_nut());
        assert_eq!(controller.last_error().map(|e| e.kind()), Some(ErrorKind::Fetch));
    }

    #[tokio::test]
    async fn search_filters_table_but_not_chart() {
        let (_api, controller) = loaded(bolt_and_nut()).await;
        controller.set_search("BOLT");

        let filtered = controller.filtered_items();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id.as_str(), "1");
        assert!(filtered[0].is_low_stock());

        let series = controller.chart_series();
        assert_eq!(series.labels, vec!["Bolt".to_string(), "Nut".to_string()]);
        assert_eq!(series.values, vec![2, 10]);
        assert_eq!(controller.summary().item_count, 2);
    }

    #[tokio::test]
    async fn report_uses_the_search_view() {
        let (_api, controller) = loaded(bolt_and_nut()).await;
        controller.set_search("nut");

        let at = NaiveDate::from_ymd_opt(2024, 6, 7)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let report = controller.build_report(at);

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0][0], "Nut");
        assert_eq!(report.file_name(), "Inventory_Report_2024-06-07.pdf");
    }

    #[tokio::test]
    async fn update_replaces_in_place() {
        let (_api, controller) = loaded(bolt_and_nut()).await;

        let updated = controller.update(item("1", "Bolt", Some(40))).await.unwrap();
        assert_eq!(updated.quantity, Some(40));

        let items = controller.items();
        assert_eq!(items[0].quantity, Some(40));
        assert_eq!(items[1], bolt_and_nut()[1]);
        assert!(!items[0].is_low_stock());
        assert_eq!(controller.mutation_state(&ItemId::from("1")), MutationState::Committed);
    }

    #[tokio::test]
    async fn update_without_echo_keeps_submitted_record() {
        let (api, controller) = loaded(bolt_and_nut()).await;
        api.echo_updates.store(false, Ordering::SeqCst);

        let updated = controller.update(item("2", "Hex Nut", Some(9))).await.unwrap();
        assert_eq!(updated.item_name.as_deref(), Some("Hex Nut"));
        assert_eq!(controller.items()[1].item_name.as_deref(), Some("Hex Nut"));
    }

    #[tokio::test]
    async fn failed_update_leaves_store_untouched() {
        let (api, controller) = loaded(bolt_and_nut()).await;
        api.fail_update.store(true, Ordering::SeqCst);
        let snapshot = controller.items();

        let err = controller.update(item("1", "Bolt", Some(99))).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Update);
        assert_eq!(err.api_error(), Some(&ApiError::Api(500, "write failed".to_string())));
        assert_eq!(controller.items(), snapshot);
        assert_eq!(controller.last_error().map(|e| e.kind()), Some(ErrorKind::Update));
        assert_eq!(controller.mutation_state(&ItemId::from("1")), MutationState::Failed);
    }

    #[tokio::test]
    async fn update_of_unloaded_item_is_not_sent() {
        let (api, controller) = loaded(bolt_and_nut()).await;

        let err = controller.update(item("9", "Ghost", None)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Update);
        assert!(err.api_error().is_none());
        assert_eq!(api.calls(), vec!["list"]);
    }

    #[tokio::test]
    async fn second_update_waits_for_first_to_resolve() {
        let (api, controller) = loaded(vec![item("1", "Bolt", Some(2))]).await;
        let gate = Arc::new(Notify::new());
        *api.hold_next_update.lock().unwrap() = Some(gate.clone());

        let release = async {
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            assert_eq!(api.calls(), vec!["list", "update:start:1:5"]);
            assert_eq!(controller.mutation_state(&ItemId::from("1")), MutationState::InFlight);
            gate.notify_one();
        };

        let (first, second, ()) = tokio::join!(
            controller.update(item("1", "Bolt", Some(5))),
            controller.update(item("1", "Bolt", Some(6))),
            release,
        );

        first.unwrap();
        second.unwrap();
        assert_eq!(
            api.calls(),
            vec![
                "list",
                "update:start:1:5",
                "update:end:1:5",
                "update:start:1:6",
                "update:end:1:6",
            ]
        );
        assert_eq!(controller.items()[0].quantity, Some(6));
    }

    #[tokio::test]
    async fn reload_in_flight_is_not_overtaken_by_a_write() {
        let (api, controller) = loaded(vec![item("1", "Bolt", Some(2))]).await;
        let gate = Arc::new(Notify::new());
        *api.hold_next_list.lock().unwrap() = Some(gate.clone());

        let release = async {
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            assert_eq!(api.calls(), vec!["list", "list"]);
            gate.notify_one();
        };

        let (reloaded, updated, ()) = tokio::join!(
            controller.load(),
            controller.update(item("1", "Bolt", Some(40))),
            release,
        );

        assert_eq!(reloaded.unwrap()[0].quantity, Some(2));
        updated.unwrap();
        assert_eq!(controller.items()[0].quantity, Some(40));
        assert_eq!(controller.mutation_state(&ItemId::from("1")), MutationState::Committed);
        assert_eq!(
            api.calls(),
            vec!["list", "list", "update:start:1:40", "update:end:1:40"]
        );
    }

    #[tokio::test]
    async fn reload_waits_for_a_write_in_flight() {
        let (api, controller) = loaded(vec![item("1", "Bolt", Some(2))]).await;
        let gate = Arc::new(Notify::new());
        *api.hold_next_update.lock().unwrap() = Some(gate.clone());

        let release = async {
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            assert_eq!(api.calls(), vec!["list", "update:start:1:40"]);
            gate.notify_one();
        };

        let (updated, reloaded, ()) = tokio::join!(
            controller.update(item("1", "Bolt", Some(40))),
            controller.load(),
            release,
        );

        updated.unwrap();
        assert_eq!(reloaded.unwrap()[0].quantity, Some(40));
        assert_eq!(controller.items()[0].quantity, Some(40));
        assert_eq!(
            api.calls(),
            vec!["list", "update:start:1:40", "update:end:1:40", "list"]
        );
    }

    #[tokio::test]
    async fn delete_queued_behind_update_runs_after_it() {
        let (api, controller) = loaded(bolt_and_nut()).await;
        let gate = Arc::new(Notify::new());
        *api.hold_next_update.lock().unwrap() = Some(gate.clone());
        let id = ItemId::from("1");

        let release = async {
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            assert_eq!(api.calls(), vec!["list", "update:start:1:5"]);
            gate.notify_one();
        };

        let (updated, removed, ()) = tokio::join!(
            controller.update(item("1", "Bolt", Some(5))),
            controller.remove(&id, &yes),
            release,
        );

        updated.unwrap();
        assert_eq!(removed.unwrap(), DeleteOutcome::Deleted);
        assert_eq!(
            api.calls(),
            vec!["list", "update:start:1:5", "update:end:1:5", "delete:1"]
        );
        let ids: Vec<String> = controller.items().iter().map(|i| i.id.to_string()).collect();
        assert_eq!(ids, vec!["2"]);
        assert_eq!(controller.mutation_state(&id), MutationState::Committed);
    }

    #[tokio::test]
    async fn update_queued_behind_delete_is_not_sent() {
        let (api, controller) = loaded(bolt_and_nut()).await;
        let gate = Arc::new(Notify::new());
        *api.hold_next_delete.lock().unwrap() = Some(gate.clone());
        let id = ItemId::from("1");

        let release = async {
            for _ in 0..10 {
                tokio::task::yield_now().await;
            }
            assert_eq!(api.calls(), vec!["list", "delete:1"]);
            assert_eq!(controller.mutation_state(&ItemId::from("1")), MutationState::InFlight);
            gate.notify_one();
        };

        let (removed, updated, ()) = tokio::join!(
            controller.remove(&id, &yes),
            controller.update(item("1", "Bolt", Some(9))),
            release,
        );

        assert_eq!(removed.unwrap(), DeleteOutcome::Deleted);
        let err = updated.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Update);
        assert!(err.api_error().is_none());
        assert_eq!(api.calls(), vec!["list", "delete:1"]);
        assert_eq!(controller.items(), vec![item("2", "Nut", Some(10))]);
        assert_eq!(controller.mutation_state(&id), MutationState::Failed);
    }

    #[tokio::test]
    async fn confirmed_delete_removes_exactly_one() {
        let (api, controller) = loaded(vec![
            item("1", "Bolt", Some(2)),
            item("2", "Nut", Some(10)),
            item("3", "Washer", None),
        ])
        .await;

        let outcome = controller.remove(&ItemId::from("2"), &yes).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);

        let ids: Vec<String> = controller.items().iter().map(|i| i.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(api.calls(), vec!["list", "delete:2"]);
    }

    #[tokio::test]
    async fn declined_delete_sends_nothing() {
        let (api, controller) = loaded(bolt_and_nut()).await;

        let asked = Mutex::new(String::new());
        let prompt = |message: &str| {
            *asked.lock().unwrap() = message.to_string();
            false
        };

        let outcome = controller.remove(&ItemId::from("1"), &prompt).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(*asked.lock().unwrap(), "Are you sure you want to delete \"Bolt\"?");
        assert_eq!(controller.items(), bolt_and_nut());
        assert_eq!(api.calls(), vec!["list"]);

        assert_eq!(
            controller.remove(&ItemId::from("2"), &no).await.unwrap(),
            DeleteOutcome::Cancelled
        );
    }

    #[tokio::test]
    async fn failed_delete_keeps_item_and_records_error() {
        let (api, controller) = loaded(bolt_and_nut()).await;
        api.fail_delete.store(true, Ordering::SeqCst);

        let err = controller.remove(&ItemId::from("1"), &yes).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Delete);
        assert_eq!(controller.items(), bolt_and_nut());
        assert_eq!(controller.last_error().map(|e| e.kind()), Some(ErrorKind::Delete));
    }

    #[tokio::test]
    async fn staged_edit_survives_failure_and_clears_on_success() {
        let (api, controller) = loaded(bolt_and_nut()).await;

        controller.begin_edit(&ItemId::from("1")).unwrap();
        controller
            .apply_patch(&ItemPatch {
                quantity: Some(12),
                ..ItemPatch::default()
            })
            .unwrap();
        assert_eq!(controller.items()[0].quantity, Some(2));

        api.fail_update.store(true, Ordering::SeqCst);
        controller.submit_edit().await.unwrap_err();
        assert_eq!(controller.staged().and_then(|s| s.quantity), Some(12));
        assert_eq!(controller.items()[0].quantity, Some(2));

        api.fail_update.store(false, Ordering::SeqCst);
        controller.submit_edit().await.unwrap();
        assert!(controller.staged().is_none());
        assert_eq!(controller.items()[0].quantity, Some(12));
    }

    #[tokio::test]
    async fn cancel_and_delete_clear_the_stage() {
        let (_api, controller) = loaded(bolt_and_nut()).await;

        controller.begin_edit(&ItemId::from("1")).unwrap();
        controller.cancel_edit();
        assert!(controller.staged().is_none());

        controller.begin_edit(&ItemId::from("2")).unwrap();
        controller.remove(&ItemId::from("2"), &yes).await.unwrap();
        assert!(controller.staged().is_none());
    }

    #[tokio::test]
    async fn error_slot_is_last_write_wins_and_never_auto_cleared() {
        let (api, controller) = loaded(bolt_and_nut()).await;

        api.fail_delete.store(true, Ordering::SeqCst);
        controller.remove(&ItemId::from("1"), &yes).await.unwrap_err();
        api.fail_update.store(true, Ordering::SeqCst);
        controller.update(item("2", "Nut", Some(1))).await.unwrap_err();
        assert_eq!(controller.last_error().map(|e| e.kind()), Some(ErrorKind::Update));

        api.fail_list.store(false, Ordering::SeqCst);
        controller.load().await.unwrap();
        assert_eq!(controller.last_error().map(|e| e.kind()), Some(ErrorKind::Update));

        controller.clear_error();
        assert!(controller.last_error().is_none());
    }

    #[tokio::test]
    async fn begin_edit_requires_a_loaded_item() {
        let (_api, controller) = loaded(bolt_and_nut()).await;
        assert!(matches!(
            controller.begin_edit(&ItemId::from("nope")),
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            controller.apply_patch(&ItemPatch::default()),
            Err(DomainError::Validation(_))
        ));
    }
}
