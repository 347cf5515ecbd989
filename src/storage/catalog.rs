//! Typed record-store adapter for projects, products and inquiries.
//!
//! Translates domain entities into rows of the `projects`, `products` and `inquiries` tables and
//! back. Products are linked to their project through the project's internal reference.

use crate::domain::ids;
use crate::domain::model::{
    sort_by_ordinal, NewInquiry, NewProduct, NewProject, NewRow, Product, Project, StoredRecord,
    TableModel,
};
use crate::storage::tables::{Filter, RecordStore, StoreError, MAX_BATCH};
use std::sync::Arc;

/// Products created before a later batch failed.
#[derive(Debug)]
pub struct PartialInsert {
    pub inserted_refs: Vec<String>,
    pub source: StoreError,
}

#[derive(Clone)]
pub struct CatalogStore {
    store: Arc<dyn RecordStore>,
}

impl CatalogStore {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    /// True if any project already uses `project_id`.
    pub async fn project_id_taken(&self, project_id: &str) -> Result<bool, StoreError> {
        let rows = self
            .store
            .select(Project::TABLE, &Filter::equals("id", project_id))
            .await?;
        Ok(!rows.is_empty())
    }

    pub async fn insert_project(&self, project: &NewProject) -> Result<Project, StoreError> {
        let created = self
            .store
            .create(NewProject::TABLE, vec![project.to_fields()])
            .await?;
        let record = created
            .first()
            .ok_or_else(|| StoreError::Decode("project create returned no rows".to_string()))?;
        match decode::<Project>(record) {
            Ok(project) => Ok(project),
            Err(e) => {
                // Written but unreadable: nothing can link to it.
                if let Err(cleanup) = self
                    .store
                    .delete(Project::TABLE, std::slice::from_ref(&record.id))
                    .await
                {
                    tracing::error!(
                        record = %record.id,
                        error = %cleanup,
                        "Failed to remove unreadable project row"
                    );
                }
                Err(e)
            }
        }
    }

    /// Exact-match lookup by the public project id. The first match wins.
    pub async fn find_project(&self, project_id: &str) -> Result<Option<Project>, StoreError> {
        let rows = self
            .store
            .select(Project::TABLE, &Filter::equals("id", project_id))
            .await?;
        if rows.len() > 1 {
            tracing::warn!(project_id, matches = rows.len(), "Duplicate project id in store");
        }
        rows.first().map(decode::<Project>).transpose()
    }

    pub async fn delete_project(&self, project: &Project) -> Result<(), StoreError> {
        self.store
            .delete(Project::TABLE, std::slice::from_ref(&project.internal_ref))
            .await
    }

    /// Writes products in sequential batches of at most [`MAX_BATCH`].
    ///
    /// On failure, reports the references of rows already written so the caller can compensate.
    pub async fn insert_products(&self, products: &[NewProduct]) -> Result<Vec<Product>, PartialInsert> {
        let mut inserted: Vec<Product> = Vec::with_capacity(products.len());
        let mut inserted_refs: Vec<String> = Vec::with_capacity(products.len());
        for (batch_no, chunk) in products.chunks(MAX_BATCH).enumerate() {
            let rows = chunk.iter().map(NewRow::to_fields).collect();
            let records = match self.store.create(NewProduct::TABLE, rows).await {
                Ok(records) => records,
                Err(source) => return Err(PartialInsert { inserted_refs, source }),
            };
            inserted_refs.extend(records.iter().map(|r| r.id.clone()));
            for record in &records {
                match decode::<Product>(record) {
                    Ok(product) => inserted.push(product),
                    Err(source) => return Err(PartialInsert { inserted_refs, source }),
                }
            }
            tracing::debug!(batch = batch_no + 1, rows = records.len(), "Product batch created");
        }
        Ok(inserted)
    }

    pub async fn delete_products(&self, refs: &[String]) -> Result<(), StoreError> {
        if refs.is_empty() {
            return Ok(());
        }
        self.store.delete(Product::TABLE, refs).await
    }

    /// Products owned by `project`, ordered by their `_item<N>` ordinal.
    ///
    /// Narrows server-side by id prefix, then keeps only rows whose link list contains the
    /// project's internal reference.
    pub async fn products_for_project(&self, project: &Project) -> Result<Vec<Product>, StoreError> {
        let rows = self
            .store
            .select(
                Product::TABLE,
                &Filter::starts_with("id", ids::product_prefix(&project.id)),
            )
            .await?;

        let mut products: Vec<Product> = rows
            .iter()
            .filter_map(|record| match Product::from_record(record) {
                Ok(p) => Some(p),
                Err(e) => {
                    tracing::warn!(record = %record.id, error = %e, "Skipping malformed product row");
                    None
                }
            })
            .filter(|p| p.belongs_to(&project.internal_ref))
            .collect();
        sort_by_ordinal(&mut products);
        Ok(products)
    }

    pub async fn find_product(&self, product_id: &str) -> Result<Option<Product>, StoreError> {
        let rows = self
            .store
            .select(Product::TABLE, &Filter::equals("id", product_id))
            .await?;
        rows.first().map(decode::<Product>).transpose()
    }

    /// Appends an inquiry and returns its internal reference.
    pub async fn insert_inquiry(&self, inquiry: &NewInquiry) -> Result<String, StoreError> {
        let created = self
            .store
            .create(NewInquiry::TABLE, vec![inquiry.to_fields()])
            .await?;
        created
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| StoreError::Decode("inquiry create returned no rows".to_string()))
    }
}

fn decode<T: TableModel>(record: &StoredRecord) -> Result<T, StoreError> {
    T::from_record(record)
        .map_err(|e| StoreError::Decode(format!("{} row {}: {}", T::TABLE, record.id, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Price;
    use crate::storage::tables::InMemoryStore;
    use chrono::Utc;
    use serde_json::json;

    fn catalog() -> (Arc<InMemoryStore>, CatalogStore) {
        let store = Arc::new(InMemoryStore::new());
        (store.clone(), CatalogStore::new(store))
    }

    fn urls(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("https://host/{i}.png")).collect()
    }

    #[tokio::test]
    async fn projects_round_trip_through_the_store() {
        let (_, catalog) = catalog();
        let created = catalog
            .insert_project(&NewProject::new("proj_123456".into(), Some("Batch 1"), Utc::now()))
            .await
            .unwrap();
        assert!(created.internal_ref.starts_with("rec"));

        assert!(catalog.project_id_taken("proj_123456").await.unwrap());
        assert!(!catalog.project_id_taken("proj_654321").await.unwrap());

        let found = catalog.find_project("proj_123456").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(catalog.find_project("proj_000000").await.unwrap().is_none());
    }

    /// Stores rows faithfully but hands back records the catalog cannot decode.
    struct GarblingStore {
        inner: InMemoryStore,
    }

    #[async_trait::async_trait]
    impl RecordStore for GarblingStore {
        fn backend(&self) -> &'static str {
            "garbling"
        }

        async fn create(
            &self,
            table: &str,
            rows: Vec<crate::domain::model::Fields>,
        ) -> Result<Vec<StoredRecord>, StoreError> {
            let mut created = self.inner.create(table, rows).await?;
            for record in &mut created {
                record.fields.insert("createdAt".into(), json!("sometime last week"));
                record.created_time = None;
            }
            Ok(created)
        }

        async fn select(&self, table: &str, filter: &Filter) -> Result<Vec<StoredRecord>, StoreError> {
            self.inner.select(table, filter).await
        }

        async fn delete(&self, table: &str, refs: &[String]) -> Result<(), StoreError> {
            self.inner.delete(table, refs).await
        }
    }

    #[tokio::test]
    async fn unreadable_project_rows_are_removed() {
        let store = Arc::new(GarblingStore { inner: InMemoryStore::new() });
        let catalog = CatalogStore::new(store.clone());
        let err = catalog
            .insert_project(&NewProject::new("proj_123456".into(), None, Utc::now()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
        assert!(store.inner.rows("projects").is_empty());
    }

    #[tokio::test]
    async fn products_are_written_in_batches_and_read_back_in_order() {
        let (store, catalog) = catalog();
        let project = catalog
            .insert_project(&NewProject::new("proj_123456".into(), None, Utc::now()))
            .await
            .unwrap();
        let products = NewProduct::batch(&project.id, &project.internal_ref, urls(23));
        let inserted = catalog.insert_products(&products).await.unwrap();
        assert_eq!(inserted.len(), 23);
        assert_eq!(store.rows("products").len(), 23);

        let listed = catalog.products_for_project(&project).await.unwrap();
        let ids: Vec<u64> = listed.iter().map(Product::ordinal).collect();
        assert_eq!(ids, (1..=23).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn listing_ignores_rows_linked_elsewhere_and_sorts_by_ordinal() {
        let (store, catalog) = catalog();
        let project = catalog
            .insert_project(&NewProject::new("proj_123456".into(), None, Utc::now()))
            .await
            .unwrap();
        let seed = |id: &str, link: &str| {
            store.seed(
                "products",
                json!({"id": id, "imageUrl": format!("https://host/{id}.png"), "project": [link]})
                    .as_object()
                    .cloned()
                    .unwrap(),
            );
        };
        seed("proj_123456_item3", project.internal_ref.as_str());
        seed("proj_123456_item10", project.internal_ref.as_str());
        seed("proj_123456_item1", project.internal_ref.as_str());
        seed("proj_123456_item2", "recSOMEONEELSE");
        seed("proj_999999_item1", project.internal_ref.as_str());

        let listed = catalog.products_for_project(&project).await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["proj_123456_item1", "proj_123456_item3", "proj_123456_item10"]);
    }

    #[tokio::test]
    async fn inquiries_are_appended() {
        let (store, catalog) = catalog();
        let inquiry = NewInquiry {
            product_id: "proj_123456_item1".into(),
            price: Price::new(150000.0).unwrap(),
            colors: "red, blue".into(),
            notes: "urgent".into(),
            submitted_at: Utc::now(),
            image_url: None,
            project_refs: Vec::new(),
        };
        let first = catalog.insert_inquiry(&inquiry).await.unwrap();
        let second = catalog.insert_inquiry(&inquiry).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(store.rows("inquiries").len(), 2);
    }
}
