//! Catalog workflows: creating and querying product listings.

use tracing::info;

use tradepost_catalog::{Category, NewListing, Product};
use tradepost_core::{ProductId, UserId};

use crate::store::ProductStore;

use super::{ServiceError, ServiceResult};

/// Listing creation and the read side of the catalog.
#[derive(Debug)]
pub struct CatalogService<P> {
    products: P,
}

impl<P> CatalogService<P> {
    pub fn new(products: P) -> Self {
        Self { products }
    }
}

impl<P> CatalogService<P>
where
    P: ProductStore,
{
    /// Validate a submission and publish it as a listing.
    pub async fn create_listing(&self, submission: NewListing) -> ServiceResult<Product> {
        let product = submission.into_product()?;
        self.products.put(product.clone()).await?;
        info!(
            product_id = %product.id,
            seller_id = %product.seller_id,
            category = %product.category,
            "listing created"
        );
        Ok(product)
    }

    pub async fn get(&self, id: ProductId) -> ServiceResult<Product> {
        self.products
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("product".to_string()))
    }

    /// All live listings, optionally restricted to one category.
    pub async fn list(&self, category: Option<&Category>) -> ServiceResult<Vec<Product>> {
        Ok(self.products.list(category).await?)
    }

    pub async fn list_by_seller(&self, seller_id: &UserId) -> ServiceResult<Vec<Product>> {
        Ok(self.products.list_by_seller(seller_id).await?)
    }
}
