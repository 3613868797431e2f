//! Public storefront catalog endpoints.

use reqwest::Method;

use bzc_core::catalog::{TreeNode, build_tree};
use bzc_core::models::{Category, Product, ProductResponse};

use crate::error::ClientResult;
use crate::session::SessionManager;

/// `GET /api/categories`: flat category list.
pub async fn list_categories(session: &SessionManager) -> ClientResult<Vec<Category>> {
    session
        .request(Method::GET, "/api/categories")
        .allow_anonymous()
        .send_json()
        .await
}

/// Fetch the category list and nest it for navigation menus.
pub async fn category_tree(session: &SessionManager) -> ClientResult<Vec<TreeNode<Category>>> {
    Ok(build_tree(list_categories(session).await?))
}

/// `GET /api/products`: product listing.
pub async fn list_products(session: &SessionManager) -> ClientResult<Vec<Product>> {
    session
        .request(Method::GET, "/api/products")
        .allow_anonymous()
        .send_json()
        .await
}

/// `GET /api/products/{slug}`: one product with its variants and
/// breadcrumb trail.
pub async fn get_product(session: &SessionManager, slug: &str) -> ClientResult<ProductResponse> {
    session
        .request(Method::GET, &format!("/api/products/{slug}"))
        .allow_anonymous()
        .send_json()
        .await
}
