//! Admin category endpoints (bearer + admin claim required).

use reqwest::Method;
use serde::Serialize;
use uuid::Uuid;

use bzc_core::catalog::{FlatEntry, build_tree, flatten_tree};
use bzc_core::models::Category;

use crate::error::ClientResult;
use crate::session::SessionManager;

/// Create/update payload for a category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryInput {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

/// `GET /api/admin/categories`: all categories, flat.
pub async fn list_categories(session: &SessionManager) -> ClientResult<Vec<Category>> {
    session
        .request(Method::GET, "/api/admin/categories")
        .send_json()
        .await
}

/// Depth-annotated category list for indented admin tables and
/// parent-select inputs.
pub async fn category_options(
    session: &SessionManager,
) -> ClientResult<Vec<FlatEntry<Category>>> {
    Ok(flatten_tree(build_tree(list_categories(session).await?)))
}

/// `GET /api/admin/categories/{id}`: a single category.
pub async fn get_category(session: &SessionManager, id: Uuid) -> ClientResult<Category> {
    session
        .request(Method::GET, &format!("/api/admin/categories/{id}"))
        .send_json()
        .await
}

/// `POST /api/admin/categories`: create a category.
pub async fn create_category(
    session: &SessionManager,
    input: &CategoryInput,
) -> ClientResult<()> {
    session
        .request(Method::POST, "/api/admin/categories")
        .json(input)?
        .send_expect_success()
        .await
}

/// `PUT /api/admin/categories/{id}`: update a category.
pub async fn update_category(
    session: &SessionManager,
    id: Uuid,
    input: &CategoryInput,
) -> ClientResult<()> {
    session
        .request(Method::PUT, &format!("/api/admin/categories/{id}"))
        .json(input)?
        .send_expect_success()
        .await
}

/// `DELETE /api/admin/categories/{id}`: delete a category.
pub async fn delete_category(session: &SessionManager, id: Uuid) -> ClientResult<()> {
    session
        .request(Method::DELETE, &format!("/api/admin/categories/{id}"))
        .send_expect_success()
        .await
}
