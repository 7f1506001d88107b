//! In-memory record collection with synchronous local persistence.

use crate::category::Category;
use crate::error::{CoreError, CoreResult};
use crate::expense::{Expense, ExpenseId, ExpensePatch};
use crate::filter::{ExpenseAnalysis, ExpenseFilter};
use expensedb_storage::StorageAdapter;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// The fixed key the collection is persisted under.
pub const STORAGE_KEY: &str = "myexpenses_data";

/// The record collection and its persistence.
///
/// The store owns the in-memory `Vec<Expense>` and rewrites the whole
/// collection as one JSON array under a single storage key on every
/// mutation - a deliberate write-amplification trade-off that keeps the
/// persisted layout a single blob.
///
/// # Invariants
///
/// - Exactly one record per id ([`add`](Self::add) rejects duplicates)
/// - Local persistence completes before any mutation method returns
///
/// The store is not internally locked; callers that share one store across
/// threads must serialize access (the sync layer's manager wraps it in a
/// lock for exactly this reason).
pub struct ExpenseStore {
    storage: Arc<dyn StorageAdapter>,
    key: String,
    expenses: Vec<Expense>,
}

impl ExpenseStore {
    /// Creates an empty store persisting under [`STORAGE_KEY`].
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    /// Creates an empty store persisting under a custom key.
    pub fn with_key(storage: Arc<dyn StorageAdapter>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            expenses: Vec::new(),
        }
    }

    /// Loads the collection from storage.
    ///
    /// An unreadable or corrupt blob degrades to an empty collection with a
    /// warning rather than failing - availability over strictness. The
    /// degraded start is observable only through the log.
    pub fn load(&mut self) {
        self.expenses = match self.storage.load(&self.key) {
            Ok(Some(blob)) => match serde_json::from_str(&blob) {
                Ok(expenses) => expenses,
                Err(e) => {
                    warn!(key = %self.key, error = %e, "corrupt collection blob, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "collection unreadable, starting empty");
                Vec::new()
            }
        };
        debug!(key = %self.key, records = self.expenses.len(), "collection loaded");
    }

    /// Serializes and saves the whole collection.
    fn persist(&self) -> CoreResult<()> {
        let blob = serde_json::to_string(&self.expenses)?;
        self.storage.save(&self.key, &blob)?;
        debug!(key = %self.key, records = self.expenses.len(), "collection persisted");
        Ok(())
    }

    /// Appends a record and persists the collection.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateId`] if a record with the same id is
    /// already present, or a storage/serialization error if persistence
    /// fails (the in-memory append is rolled back in that case).
    pub fn add(&mut self, expense: Expense) -> CoreResult<Expense> {
        if self.expenses.iter().any(|e| e.id == expense.id) {
            return Err(CoreError::duplicate_id(expense.id.as_str()));
        }
        self.expenses.push(expense.clone());
        if let Err(e) = self.persist() {
            self.expenses.pop();
            return Err(e);
        }
        Ok(expense)
    }

    /// Patches the record with the given id and persists the collection.
    ///
    /// Returns `Ok(None)` if no record has the id - an absent record is a
    /// result, not an error.
    ///
    /// # Errors
    ///
    /// Returns a validation error from the patch, or a storage error if
    /// persistence fails.
    pub fn update(&mut self, id: &ExpenseId, patch: ExpensePatch) -> CoreResult<Option<Expense>> {
        let Some(index) = self.expenses.iter().position(|e| &e.id == id) else {
            return Ok(None);
        };
        let mut updated = self.expenses[index].clone();
        updated.apply(patch)?;
        let previous = std::mem::replace(&mut self.expenses[index], updated.clone());
        if let Err(e) = self.persist() {
            self.expenses[index] = previous;
            return Err(e);
        }
        Ok(Some(updated))
    }

    /// Removes every record with the given id and persists the collection.
    ///
    /// Returns whether anything was removed (expected cardinality 0 or 1).
    ///
    /// # Errors
    ///
    /// Returns a storage error if persistence fails; the collection is left
    /// unchanged in that case.
    pub fn remove(&mut self, id: &ExpenseId) -> CoreResult<bool> {
        let retained: Vec<Expense> = self
            .expenses
            .iter()
            .filter(|e| &e.id != id)
            .cloned()
            .collect();
        let removed = retained.len() != self.expenses.len();
        let previous = std::mem::replace(&mut self.expenses, retained);
        if let Err(e) = self.persist() {
            self.expenses = previous;
            return Err(e);
        }
        Ok(removed)
    }

    /// Replaces the whole collection and persists it.
    ///
    /// Used by full synchronization to install a merged snapshot.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persistence fails; the previous
    /// collection is restored in that case.
    pub fn replace_all(&mut self, expenses: Vec<Expense>) -> CoreResult<()> {
        let previous = std::mem::replace(&mut self.expenses, expenses);
        if let Err(e) = self.persist() {
            self.expenses = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Returns a filtered snapshot, sorted by event date descending.
    ///
    /// The sort is stable, so records with equal dates keep their insertion
    /// order. Dates are already typed, so no per-comparison parsing occurs.
    #[must_use]
    pub fn list(&self, filter: &ExpenseFilter) -> Vec<Expense> {
        let mut selected: Vec<Expense> = self
            .expenses
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.date.cmp(&a.date));
        selected
    }

    /// Sums the amounts of the matching records.
    #[must_use]
    pub fn total(&self, filter: &ExpenseFilter) -> Decimal {
        self.list(filter).iter().map(|e| e.amount).sum()
    }

    /// Sums the matching records per category.
    #[must_use]
    pub fn by_category(&self, filter: &ExpenseFilter) -> BTreeMap<Category, Decimal> {
        let mut totals = BTreeMap::new();
        for expense in self.list(filter) {
            *totals.entry(expense.category).or_insert(Decimal::ZERO) += expense.amount;
        }
        totals
    }

    /// Computes total, per-category sums and the record list in one pass.
    ///
    /// Observationally identical to calling [`total`](Self::total),
    /// [`by_category`](Self::by_category) and [`list`](Self::list)
    /// independently - that equivalence is the contract, not an
    /// optimization hint.
    #[must_use]
    pub fn analysis(&self, filter: &ExpenseFilter) -> ExpenseAnalysis {
        let expenses = self.list(filter);
        let mut total = Decimal::ZERO;
        let mut by_category = BTreeMap::new();
        for expense in &expenses {
            total += expense.amount;
            *by_category.entry(expense.category).or_insert(Decimal::ZERO) += expense.amount;
        }
        ExpenseAnalysis {
            total,
            by_category,
            expenses,
        }
    }

    /// Returns a clone of the whole collection in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Expense> {
        self.expenses.clone()
    }

    /// Returns the collection as a slice in insertion order.
    #[must_use]
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    /// Returns true if the collection holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Returns the storage key the collection persists under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use expensedb_storage::{MemoryStorage, StorageError, StorageResult};

    struct FailingStorage;

    impl StorageAdapter for FailingStorage {
        fn save(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::backend("save refused"))
        }
        fn load(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::backend("load refused"))
        }
        fn delete(&self, _key: &str) -> StorageResult<()> {
            Err(StorageError::backend("delete refused"))
        }
        fn clear(&self) -> StorageResult<()> {
            Err(StorageError::backend("clear refused"))
        }
    }

    fn amount(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn expense(id: &str, cents: i64, category: Category, day: u32) -> Expense {
        Expense::new(amount(cents), category)
            .unwrap()
            .with_id(id)
            .with_date(Utc.with_ymd_and_hms(2026, 4, day, 12, 0, 0).unwrap())
    }

    fn store_with(records: &[Expense]) -> ExpenseStore {
        let mut store = ExpenseStore::new(Arc::new(MemoryStorage::new()));
        for record in records {
            store.add(record.clone()).unwrap();
        }
        store
    }

    #[test]
    fn add_persists_whole_collection() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = ExpenseStore::new(Arc::clone(&storage) as Arc<dyn StorageAdapter>);

        store
            .add(expense("exp_1", 2550, Category::FoodAndDining, 1))
            .unwrap();

        let blob = storage.load(STORAGE_KEY).unwrap().unwrap();
        assert!(blob.starts_with('['));
        assert!(blob.contains("exp_1"));
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let mut store = store_with(&[expense("exp_1", 100, Category::Other, 1)]);
        let err = store
            .add(expense("exp_1", 200, Category::Other, 2))
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateId { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn add_rolls_back_on_save_failure() {
        let mut store = ExpenseStore::new(Arc::new(FailingStorage));
        let err = store
            .add(expense("exp_1", 100, Category::Other, 1))
            .unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn load_reads_persisted_collection() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let mut store = ExpenseStore::new(Arc::clone(&storage) as Arc<dyn StorageAdapter>);
            store
                .add(expense("exp_1", 2550, Category::FoodAndDining, 1))
                .unwrap();
        }

        let mut reloaded = ExpenseStore::new(storage);
        reloaded.load();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.expenses()[0].id.as_str(), "exp_1");
    }

    #[test]
    fn load_degrades_to_empty_on_corrupt_blob() {
        let storage = Arc::new(MemoryStorage::with_entries([(STORAGE_KEY, "not json")]));
        let mut store = ExpenseStore::new(storage);
        store.load();
        assert!(store.is_empty());
    }

    #[test]
    fn load_degrades_to_empty_on_unreadable_storage() {
        let mut store = ExpenseStore::new(Arc::new(FailingStorage));
        store.load();
        assert!(store.is_empty());
    }

    #[test]
    fn update_patches_and_persists() {
        let mut store = store_with(&[expense("exp_1", 1000, Category::Shopping, 1)]);
        let before = store.expenses()[0].updated_at;

        let updated = store
            .update(
                &ExpenseId::new("exp_1"),
                ExpensePatch::new().with_amount(amount(1850)),
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.amount, amount(1850));
        assert!(updated.updated_at >= before);
        assert_eq!(store.expenses()[0].amount, amount(1850));
    }

    #[test]
    fn update_of_unknown_id_is_none() {
        let mut store = store_with(&[]);
        let result = store
            .update(&ExpenseId::new("ghost"), ExpensePatch::new())
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn update_rejects_invalid_patch_without_mutating() {
        let mut store = store_with(&[expense("exp_1", 1000, Category::Shopping, 1)]);
        let err = store
            .update(
                &ExpenseId::new("exp_1"),
                ExpensePatch::new().with_amount(Decimal::ZERO),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidAmount { .. }));
        assert_eq!(store.expenses()[0].amount, amount(1000));
    }

    #[test]
    fn remove_deletes_matching_record() {
        let mut store = store_with(&[
            expense("exp_1", 100, Category::Other, 1),
            expense("exp_2", 200, Category::Other, 2),
        ]);

        assert!(store.remove(&ExpenseId::new("exp_1")).unwrap());
        assert_eq!(store.len(), 1);
        assert!(store.list(&ExpenseFilter::new()).iter().all(|e| e.id.as_str() != "exp_1"));
    }

    #[test]
    fn remove_of_absent_id_is_false() {
        let mut store = store_with(&[expense("exp_1", 100, Category::Other, 1)]);
        assert!(!store.remove(&ExpenseId::new("ghost")).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn list_sorts_by_event_date_descending() {
        let store = store_with(&[
            expense("exp_a", 100, Category::Other, 5),
            expense("exp_b", 100, Category::Other, 20),
            expense("exp_c", 100, Category::Other, 12),
        ]);

        let listed = store.list(&ExpenseFilter::new());
        let ids: Vec<&str> = listed.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["exp_b", "exp_c", "exp_a"]);
        for pair in listed.windows(2) {
            assert!(pair[0].date >= pair[1].date);
        }
    }

    #[test]
    fn list_keeps_insertion_order_for_equal_dates() {
        let store = store_with(&[
            expense("exp_first", 100, Category::Other, 10),
            expense("exp_second", 100, Category::Other, 10),
            expense("exp_third", 100, Category::Other, 10),
        ]);

        let ids: Vec<String> = store
            .list(&ExpenseFilter::new())
            .iter()
            .map(|e| e.id.to_string())
            .collect();
        assert_eq!(ids, ["exp_first", "exp_second", "exp_third"]);
    }

    #[test]
    fn list_applies_category_and_date_filters() {
        let store = store_with(&[
            expense("exp_a", 100, Category::Travel, 5),
            expense("exp_b", 100, Category::Shopping, 10),
            expense("exp_c", 100, Category::Travel, 15),
        ]);

        let filter = ExpenseFilter::new()
            .with_category(Category::Travel)
            .with_start_date(Utc.with_ymd_and_hms(2026, 4, 6, 0, 0, 0).unwrap());
        let listed = store.list(&filter);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id.as_str(), "exp_c");
    }

    #[test]
    fn totals_match_scenario() {
        let mut store = store_with(&[]);
        store
            .add(expense("exp_1", 2550, Category::FoodAndDining, 1))
            .unwrap();
        store
            .add(expense("exp_2", 5000, Category::Transportation, 2))
            .unwrap();
        store
            .add(expense("exp_3", 1575, Category::FoodAndDining, 3))
            .unwrap();

        let all = ExpenseFilter::new();
        assert_eq!(store.total(&all), amount(9125));
        assert_eq!(
            store.by_category(&all)[&Category::FoodAndDining],
            amount(4125)
        );

        store.remove(&ExpenseId::new("exp_1")).unwrap();
        assert_eq!(store.total(&all), amount(6575));
        assert_eq!(
            store.by_category(&all)[&Category::FoodAndDining],
            amount(1575)
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn analysis_matches_independent_queries() {
        let store = store_with(&[
            expense("exp_a", 2550, Category::FoodAndDining, 1),
            expense("exp_b", 5000, Category::Transportation, 2),
            expense("exp_c", 1575, Category::FoodAndDining, 3),
            expense("exp_d", 990, Category::Entertainment, 4),
        ]);

        let filters = [
            ExpenseFilter::new(),
            ExpenseFilter::new().with_category(Category::FoodAndDining),
            ExpenseFilter::new()
                .with_start_date(Utc.with_ymd_and_hms(2026, 4, 2, 0, 0, 0).unwrap()),
            ExpenseFilter::new()
                .with_category(Category::FoodAndDining)
                .with_start_date(Utc.with_ymd_and_hms(2026, 4, 2, 0, 0, 0).unwrap())
                .with_end_date(Utc.with_ymd_and_hms(2026, 4, 3, 23, 0, 0).unwrap()),
        ];

        for filter in &filters {
            let analysis = store.analysis(filter);
            assert_eq!(analysis.total, store.total(filter));
            assert_eq!(analysis.by_category, store.by_category(filter));
            assert_eq!(analysis.expenses, store.list(filter));
        }
    }
}
