use super::{link_refs, required_str, Fields, NewRow, StoredRecord, TableModel};
use crate::domain::ids;
use serde_json::Value as JsonValue;

pub const PRODUCTS_TABLE: &str = "products";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub id: String,
    pub image_url: String,
    /// Internal reference of the owning project.
    pub project_ref: String,
}

impl NewProduct {
    /// One product per image URL, numbered from 1 in input order.
    pub fn batch(project_id: &str, project_ref: &str, image_urls: Vec<String>) -> Vec<Self> {
        image_urls
            .into_iter()
            .enumerate()
            .map(|(i, image_url)| Self {
                id: ids::product_id(project_id, i + 1),
                image_url,
                project_ref: project_ref.to_string(),
            })
            .collect()
    }
}

impl NewRow for NewProduct {
    const TABLE: &'static str = PRODUCTS_TABLE;

    fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("id".into(), JsonValue::from(self.id.clone()));
        fields.insert("imageUrl".into(), JsonValue::from(self.image_url.clone()));
        fields.insert(
            "project".into(),
            JsonValue::Array(vec![JsonValue::from(self.project_ref.clone())]),
        );
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub internal_ref: String,
    pub image_url: String,
    /// Link list as stored; well-formed rows hold exactly one project.
    pub project_refs: Vec<String>,
}

impl Product {
    pub fn belongs_to(&self, project_ref: &str) -> bool {
        self.project_refs.iter().any(|r| r == project_ref)
    }

    pub fn ordinal(&self) -> u64 {
        ids::product_ordinal(&self.id)
    }
}

impl TableModel for Product {
    const TABLE: &'static str = PRODUCTS_TABLE;

    fn from_record(record: &StoredRecord) -> Result<Self, String> {
        let fields = &record.fields;
        Ok(Self {
            id: required_str(fields, "id")?.to_string(),
            internal_ref: record.id.clone(),
            image_url: required_str(fields, "imageUrl")?.to_string(),
            project_refs: link_refs(fields, "project"),
        })
    }
}

/// Orders products by their `_item<N>` ordinal, ascending. Ties keep store order.
pub fn sort_by_ordinal(products: &mut [Product]) {
    products.sort_by_key(Product::ordinal);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str) -> Product {
        Product {
            id: id.into(),
            internal_ref: format!("rec_{id}"),
            image_url: format!("https://host/{id}.png"),
            project_refs: vec!["recP".into()],
        }
    }

    #[test]
    fn batch_numbers_from_one() {
        let batch = NewProduct::batch(
            "proj_111111",
            "recP",
            vec!["https://host/a.png".into(), "https://host/b.png".into()],
        );
        assert_eq!(batch[0].id, "proj_111111_item1");
        assert_eq!(batch[1].id, "proj_111111_item2");
        assert_eq!(batch[1].image_url, "https://host/b.png");
        assert_eq!(batch[0].to_fields()["project"], serde_json::json!(["recP"]));
    }

    #[test]
    fn sorts_numerically_not_lexically() {
        let mut products = vec![
            product("proj_1_item10"),
            product("proj_1_item2"),
            product("proj_1_itemX"),
            product("proj_1_item1"),
        ];
        sort_by_ordinal(&mut products);
        let ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["proj_1_itemX", "proj_1_item1", "proj_1_item2", "proj_1_item10"]);
    }

    #[test]
    fn link_membership() {
        let p = product("proj_1_item1");
        assert!(p.belongs_to("recP"));
        assert!(!p.belongs_to("recQ"));
    }
}
