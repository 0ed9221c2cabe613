//! # Product Catalog
//!
//! The catalog owns listed products and their available quantity. Order
//! placement reserves stock; rejection and cancellation release it.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use agrimart_core::{ProductId, Seller};

/// A listed product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub seller: Seller,
    /// Price in minor currency units.
    pub unit_price: u64,
    pub available: u32,
    /// Typical days from shipment to delivery, if the seller states one.
    #[serde(default)]
    pub delivery_days: Option<u32>,
}

/// Catalog failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No product with this id.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// Not enough stock for the requested quantity.
    #[error("product {product_id}: requested {requested}, only {available} available")]
    InsufficientStock {
        /// The product.
        product_id: ProductId,
        /// Quantity asked for.
        requested: u32,
        /// Quantity on hand.
        available: u32,
    },
}

/// Stock-keeping contract used by order placement.
pub trait ProductCatalog: Send + Sync {
    /// Look up a product.
    fn product(&self, id: ProductId) -> Result<Product, CatalogError>;

    /// Take `quantity` units out of available stock.
    fn reserve(&self, id: ProductId, quantity: u32) -> Result<(), CatalogError>;

    /// Return `quantity` units to available stock.
    fn release(&self, id: ProductId, quantity: u32) -> Result<(), CatalogError>;
}

/// Catalog held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a product list.
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let catalog = Self::new();
        for product in products {
            catalog.add(product);
        }
        catalog
    }

    /// List a product, replacing any listing with the same id.
    pub fn add(&self, product: Product) {
        self.products.write().insert(product.id, product);
    }

    /// Current available quantity.
    pub fn available(&self, id: ProductId) -> Option<u32> {
        self.products.read().get(&id).map(|p| p.available)
    }

    /// Every listed product.
    pub fn products(&self) -> Vec<Product> {
        let mut out: Vec<Product> = self.products.read().values().cloned().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        out
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products.read().get(&id).cloned().ok_or(CatalogError::NotFound(id))
    }

    fn reserve(&self, id: ProductId, quantity: u32) -> Result<(), CatalogError> {
        let mut products = self.products.write();
        let product = products.get_mut(&id).ok_or(CatalogError::NotFound(id))?;
        if product.available < quantity {
            return Err(CatalogError::InsufficientStock {
                product_id: id,
                requested: quantity,
                available: product.available,
            });
        }
        product.available -= quantity;
        Ok(())
    }

    fn release(&self, id: ProductId, quantity: u32) -> Result<(), CatalogError> {
        let mut products = self.products.write();
        let product = products.get_mut(&id).ok_or(CatalogError::NotFound(id))?;
        product.available = product.available.saturating_add(quantity);
        Ok(())
    }
}
