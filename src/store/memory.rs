use crate::query::{self, QueryPlan};
use crate::store::{DocumentStore, QueryOutput, StoreError};
use bson::Document;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Reference `DocumentStore` over in-memory collections of canonical
/// documents. Collections are guarded by one `RwLock`; query execution
/// takes a read lock only, so concurrent requests never contend unless a
/// writer is loading documents.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, collection: &str, doc: Document) {
        self.collections.write().entry(collection.to_string()).or_default().push(doc);
    }

    pub fn insert_many<I: IntoIterator<Item = Document>>(&self, collection: &str, docs: I) {
        self.collections.write().entry(collection.to_string()).or_default().extend(docs);
    }

    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections.read().get(collection).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

impl DocumentStore for MemoryStore {
    fn execute(&self, collection: &str, plan: &QueryPlan) -> Result<QueryOutput, StoreError> {
        let start = std::time::Instant::now();
        let guard = self.collections.read();
        let docs = guard
            .get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

        let mut matched: Vec<&Document> =
            docs.iter().filter(|d| query::eval_filter(d, &plan.filter)).collect();
        let total = matched.len() as u64;

        if !plan.sort.is_empty() {
            matched.sort_by(|a, b| query::compare_docs(a, b, &plan.sort));
        }

        let skip = usize::try_from(plan.page.skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(plan.page.limit).unwrap_or(usize::MAX);
        let page: Vec<Document> = matched
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|d| {
                if plan.projection.is_empty() {
                    d.clone()
                } else {
                    query::project_fields(d, &plan.projection)
                }
            })
            .collect();

        log::debug!(
            "memory find collection={collection} duration_ms={} total={total} returned={}",
            start.elapsed().as_millis(),
            page.len()
        );
        Ok(QueryOutput { docs: page, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{CmpOp, Filter, Order, PageRequest, SortSpec};
    use bson::{Bson, doc};

    fn plan(filter: Filter, sort: Vec<SortSpec>, page: PageRequest) -> QueryPlan {
        QueryPlan { filter, sort, projection: vec!["k".to_string()], page }
    }

    #[test]
    fn unknown_collection_is_a_store_error() {
        let store = MemoryStore::new();
        let p = plan(Filter::True, vec![], PageRequest { page: 1, limit: 10, skip: 0 });
        assert!(matches!(
            store.execute("nope", &p),
            Err(StoreError::UnknownCollection(name)) if name == "nope"
        ));
    }

    #[test]
    fn total_counts_matches_before_pagination() {
        let store = MemoryStore::new();
        store.insert_many("t", (0..25i64).map(|i| doc! {"k": i, "even": i % 2 == 0}));
        let filter = Filter::Cmp { path: "even".into(), op: CmpOp::Eq, value: Bson::Boolean(true) };
        let p = plan(
            filter,
            vec![SortSpec { field: "k".into(), order: Order::Desc }],
            PageRequest { page: 2, limit: 5, skip: 5 },
        );
        let out = store.execute("t", &p).unwrap();
        assert_eq!(out.total, 13);
        assert_eq!(out.docs.len(), 5);
        // 13 even keys sorted descending, second page of 5: 14, 12, 10, 8, 6.
        assert_eq!(out.docs[0].get_i64("k").unwrap(), 14);
        assert_eq!(out.docs[4].get_i64("k").unwrap(), 6);
    }

    #[test]
    fn skip_past_the_end_returns_empty_page() {
        let store = MemoryStore::new();
        store.insert_many("t", (0..3i64).map(|i| doc! {"k": i}));
        let p = plan(Filter::True, vec![], PageRequest { page: 9, limit: 10, skip: 80 });
        let out = store.execute("t", &p).unwrap();
        assert_eq!(out.total, 3);
        assert!(out.docs.is_empty());
    }
}
