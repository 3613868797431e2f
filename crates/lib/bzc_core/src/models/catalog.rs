//! Catalog wire models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::tree::TreeRecord;

use super::nullable::nullable_string;

/// A category as returned by `/api/categories` and the admin endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: Option<String>,
    /// Absent for root categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TreeRecord for Category {
    type Id = Uuid;

    fn id(&self) -> Uuid {
        self.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }
}

/// A product listing entry (`GET /api/products`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub image_path: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

/// A purchasable product variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    pub price: f64,
    pub stock_quantity: i32,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub variant_name: String,
}

/// A breadcrumb segment on a product page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub name: String,
    pub slug: String,
}

/// Response for `GET /api/products/{slug}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductResponse {
    pub product: Product,
    #[serde(default)]
    pub breadcrumbs: Vec<Breadcrumb>,
}

/// Standard paginated envelope used by the admin list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{build_tree, flatten_tree};

    fn category_json(id: &str, parent: Option<&str>) -> String {
        let parent_field = parent
            .map(|p| format!(r#""parent_id": "{p}","#))
            .unwrap_or_default();
        format!(
            r#"{{
                "id": "{id}",
                "name": "Category {id}",
                "slug": "category-{id}",
                "description": null,
                {parent_field}
                "created_at": "2025-03-01T12:00:00Z",
                "updated_at": "2025-03-01T12:00:00Z"
            }}"#
        )
    }

    #[test]
    fn category_decodes_with_and_without_parent() {
        let root: Category = serde_json::from_str(&category_json(
            "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            None,
        ))
        .unwrap();
        assert!(root.parent_id.is_none());

        let child: Category = serde_json::from_str(&category_json(
            "9b2b9c11-1111-4ccc-8a42-6f2ba7f9e001",
            Some("7c9e6679-7425-40de-944b-e07fc1f90ae7"),
        ))
        .unwrap();
        assert!(child.parent_id.is_some());
    }

    #[test]
    fn categories_feed_the_tree_builder() {
        let root: Category = serde_json::from_str(&category_json(
            "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            None,
        ))
        .unwrap();
        let child: Category = serde_json::from_str(&category_json(
            "9b2b9c11-1111-4ccc-8a42-6f2ba7f9e001",
            Some("7c9e6679-7425-40de-944b-e07fc1f90ae7"),
        ))
        .unwrap();

        let flat = flatten_tree(build_tree(vec![root, child]));
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].depth, 0);
        assert_eq!(flat[1].depth, 1);
    }

    #[test]
    fn product_decodes_camel_case() {
        let json = r#"{
            "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "name": "Trail Runner",
            "slug": "trail-runner",
            "imagePath": "/img/trail.jpg",
            "description": "Grippy soles",
            "categoryId": "9b2b9c11-1111-4ccc-8a42-6f2ba7f9e001",
            "variants": [{
                "id": "00000000-0000-4000-8000-000000000001",
                "name": "Trail Runner",
                "price": 89.99,
                "stockQuantity": 4,
                "imageUrl": "",
                "variantName": "EU 42"
            }]
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.image_path, "/img/trail.jpg");
        assert_eq!(product.variants[0].stock_quantity, 4);
    }
}
