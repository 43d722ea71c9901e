use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::CatalogError;

/// Stock availability as reported by the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityStatus {
  #[default]
  #[serde(rename = "In Stock")]
  InStock,
  #[serde(rename = "Low Stock")]
  LowStock,
  #[serde(rename = "Out of Stock")]
  OutOfStock,
}

impl AvailabilityStatus {
  pub const ALL: [AvailabilityStatus; 3] = [Self::InStock, Self::LowStock, Self::OutOfStock];

  pub fn label(&self) -> &'static str {
    match self {
      Self::InStock => "In Stock",
      Self::LowStock => "Low Stock",
      Self::OutOfStock => "Out of Stock",
    }
  }
}

impl fmt::Display for AvailabilityStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Review {
  pub reviewer_name: String,
  pub reviewer_email: String,
  pub rating: f64,
  pub comment: String,
  pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
  pub width: f64,
  pub height: f64,
  pub depth: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductMeta {
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
  pub barcode: Option<String>,
  pub qr_code: Option<String>,
}

/// A catalog product.
///
/// Every field defaults when missing on the wire: the demo server echoes
/// back only the posted fields (plus `id`) when a product is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
  pub id: u64,
  pub title: String,
  pub description: String,
  pub category: String,
  pub brand: String,
  pub sku: String,
  pub price: f64,
  pub discount_percentage: f64,
  pub rating: f64,
  pub stock: u32,
  pub weight: f64,
  pub minimum_order_quantity: u32,
  pub availability_status: AvailabilityStatus,
  pub warranty_information: String,
  pub shipping_information: String,
  pub return_policy: String,
  pub thumbnail: Option<String>,
  pub images: Vec<String>,
  pub tags: Vec<String>,
  pub reviews: Vec<Review>,
  pub dimensions: Option<Dimensions>,
  pub meta: Option<ProductMeta>,
}

impl Product {
  /// Price after applying the discount percentage. Never stored.
  pub fn discounted_price(&self) -> f64 {
    self.price * (1.0 - self.discount_percentage / 100.0)
  }

  /// Editable fields of this product, as a create payload
  pub fn to_draft(&self) -> ProductDraft {
    ProductDraft {
      title: self.title.clone(),
      description: self.description.clone(),
      category: self.category.clone(),
      brand: self.brand.clone(),
      sku: self.sku.clone(),
      price: self.price,
      discount_percentage: self.discount_percentage,
      rating: self.rating,
      stock: self.stock,
      weight: self.weight,
      minimum_order_quantity: self.minimum_order_quantity.max(1),
      availability_status: self.availability_status,
      warranty_information: self.warranty_information.clone(),
      shipping_information: self.shipping_information.clone(),
      return_policy: self.return_policy.clone(),
    }
  }
}

/// A page of products plus the parameters that produced it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductList {
  pub products: Vec<Product>,
  pub total: u64,
  pub skip: u64,
  pub limit: u64,
}

impl ProductList {
  pub fn position(&self, id: u64) -> Option<usize> {
    self.products.iter().position(|p| p.id == id)
  }

  pub fn contains(&self, id: u64) -> bool {
    self.position(id).is_some()
  }

  /// Stock counts over the products on this list
  pub fn stock_summary(&self) -> StockSummary {
    let mut summary = StockSummary {
      total: self.total,
      ..Default::default()
    };
    for product in &self.products {
      match product.stock {
        0 => summary.out_of_stock += 1,
        1..=LOW_STOCK_LIMIT => summary.low_stock += 1,
        _ => summary.well_stocked += 1,
      }
    }
    summary
  }
}

/// Highest stock that still counts as low
pub const LOW_STOCK_LIMIT: u32 = 10;

/// Stock buckets of one list. `total` is the server-side count, the
/// buckets cover only the products that were returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StockSummary {
  pub total: u64,
  pub well_stocked: usize,
  pub low_stock: usize,
  pub out_of_stock: usize,
}

impl StockSummary {
  pub fn in_stock(&self) -> usize {
    self.well_stocked + self.low_stock
  }
}

/// Result of a delete call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
  pub id: u64,
  pub was_deleted: bool,
}

/// Payload for creating a product. The server assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
  pub title: String,
  pub description: String,
  pub category: String,
  pub brand: String,
  pub sku: String,
  pub price: f64,
  pub discount_percentage: f64,
  pub rating: f64,
  pub stock: u32,
  pub weight: f64,
  pub minimum_order_quantity: u32,
  pub availability_status: AvailabilityStatus,
  pub warranty_information: String,
  pub shipping_information: String,
  pub return_policy: String,
}

impl Default for ProductDraft {
  fn default() -> Self {
    Self {
      title: String::new(),
      description: String::new(),
      category: String::new(),
      brand: String::new(),
      sku: String::new(),
      price: 0.0,
      discount_percentage: 0.0,
      rating: 0.0,
      stock: 0,
      weight: 0.0,
      minimum_order_quantity: 1,
      availability_status: AvailabilityStatus::InStock,
      warranty_information: String::new(),
      shipping_information: String::new(),
      return_policy: String::new(),
    }
  }
}

impl ProductDraft {
  /// Check field bounds before anything is sent.
  pub fn validate(&self) -> Result<(), CatalogError> {
    let problem = if self.title.trim().is_empty() {
      Some("Title is required")
    } else if self.category.trim().is_empty() {
      Some("Category is required")
    } else if self.sku.trim().is_empty() {
      Some("SKU is required")
    } else if !self.price.is_finite() || self.price < 0.0 {
      Some("Price must be positive")
    } else if !(0.0..=100.0).contains(&self.discount_percentage) {
      Some("Discount must be between 0 and 100")
    } else if !(0.0..=5.0).contains(&self.rating) {
      Some("Rating must be between 0 and 5")
    } else if !self.weight.is_finite() || self.weight < 0.0 {
      Some("Weight must be positive")
    } else if self.minimum_order_quantity < 1 {
      Some("Minimum order quantity must be at least 1")
    } else {
      None
    };

    match problem {
      Some(message) => Err(CatalogError::validation(message)),
      None => Ok(()),
    }
  }

  /// Fields of `self` that differ from `original`, as a partial update
  pub fn diff(&self, original: &ProductDraft) -> ProductPatch {
    fn changed<T: PartialEq + Clone>(new: &T, old: &T) -> Option<T> {
      (new != old).then(|| new.clone())
    }

    ProductPatch {
      title: changed(&self.title, &original.title),
      description: changed(&self.description, &original.description),
      category: changed(&self.category, &original.category),
      brand: changed(&self.brand, &original.brand),
      sku: changed(&self.sku, &original.sku),
      price: changed(&self.price, &original.price),
      discount_percentage: changed(&self.discount_percentage, &original.discount_percentage),
      rating: changed(&self.rating, &original.rating),
      stock: changed(&self.stock, &original.stock),
      weight: changed(&self.weight, &original.weight),
      minimum_order_quantity: changed(
        &self.minimum_order_quantity,
        &original.minimum_order_quantity,
      ),
      availability_status: changed(&self.availability_status, &original.availability_status),
      warranty_information: changed(&self.warranty_information, &original.warranty_information),
      shipping_information: changed(&self.shipping_information, &original.shipping_information),
      return_policy: changed(&self.return_policy, &original.return_policy),
    }
  }
}

/// Partial update payload: only `Some` fields are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub category: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub brand: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sku: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub price: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub discount_percentage: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub rating: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub stock: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub weight: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub minimum_order_quantity: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub availability_status: Option<AvailabilityStatus>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub warranty_information: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub shipping_information: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub return_policy: Option<String>,
}

impl ProductPatch {
  pub fn is_empty(&self) -> bool {
    *self == Self::default()
  }
}
