//! Product catalog: validated CRUD over the product store.

use common::ProductId;
use rust_decimal::Decimal;
use store::{ListQuery, NewProduct, Product, ProductStore, StoreError};

use crate::error::DomainError;

/// Service for managing product records.
pub struct ProductCatalog<S: ProductStore> {
    store: S,
}

impl<S: ProductStore> ProductCatalog<S> {
    /// Creates a new catalog over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: NewProduct) -> Result<Product, DomainError> {
        validate_product(&product)?;
        let product = self.store.create_product(product).await?;
        tracing::debug!(product_id = %product.id, "product created");
        Ok(product)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, product_id: ProductId) -> Result<Product, DomainError> {
        self.store
            .get_product(product_id)
            .await?
            .ok_or(DomainError::ProductNotFound { product_id })
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self, query: ListQuery) -> Result<Vec<Product>, DomainError> {
        Ok(self.store.list_products(query).await?)
    }

    /// Replaces every field of an existing product.
    #[tracing::instrument(skip(self, product))]
    pub async fn update_product(
        &self,
        product_id: ProductId,
        product: NewProduct,
    ) -> Result<Product, DomainError> {
        validate_product(&product)?;
        self.store
            .update_product(product_id, product)
            .await?
            .ok_or(DomainError::ProductNotFound { product_id })
    }

    /// Deletes a product and returns the removed record.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, product_id: ProductId) -> Result<Product, DomainError> {
        match self.store.delete_product(product_id).await {
            Ok(Some(product)) => Ok(product),
            Ok(None) => Err(DomainError::ProductNotFound { product_id }),
            Err(StoreError::ProductReferenced(product_id)) => {
                Err(DomainError::ProductInUse { product_id })
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn validate_product(product: &NewProduct) -> Result<(), DomainError> {
    if product.name.trim().is_empty() {
        return Err(DomainError::invalid("product name must not be empty"));
    }
    if product.price < Decimal::ZERO {
        return Err(DomainError::invalid(format!(
            "price must not be negative, got {}",
            product.price
        )));
    }
    if product.quantity < 0 {
        return Err(DomainError::invalid(format!(
            "quantity must not be negative, got {}",
            product.quantity
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use store::InMemoryStore;

    use super::*;

    fn catalog() -> ProductCatalog<InMemoryStore> {
        ProductCatalog::new(InMemoryStore::new())
    }

    #[tokio::test]
    async fn rejects_negative_price_and_quantity() {
        let catalog = catalog();

        let err = catalog
            .create_product(NewProduct::new("Widget", Decimal::new(-1, 0), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { .. }));

        let err = catalog
            .create_product(NewProduct::new("Widget", Decimal::ONE, -5))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { .. }));

        let err = catalog
            .create_product(NewProduct::new("  ", Decimal::ONE, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn zero_price_and_stock_are_allowed() {
        let catalog = catalog();
        let product = catalog
            .create_product(NewProduct::new("Freebie", Decimal::ZERO, 0))
            .await
            .unwrap();
        assert_eq!(product.quantity, 0);
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let catalog = catalog();
        let missing = ProductId::new(9999);

        assert!(matches!(
            catalog.get_product(missing).await,
            Err(DomainError::ProductNotFound { product_id }) if product_id == missing
        ));
        assert!(matches!(
            catalog
                .update_product(missing, NewProduct::new("X", Decimal::ONE, 1))
                .await,
            Err(DomainError::ProductNotFound { .. })
        ));
        assert!(matches!(
            catalog.delete_product(missing).await,
            Err(DomainError::ProductNotFound { .. })
        ));
    }
}
