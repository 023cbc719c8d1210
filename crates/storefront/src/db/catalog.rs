//! Demonstration catalog loaded by the seed job.
//!
//! Products name their category instead of pointing at a row id; the seed job
//! resolves names to ids after the categories are inserted.
//!
//! ## YAML Format
//!
//! ```yaml
//! categories:
//!   - Escola
//!   - Escrita
//! products:
//!   - name: Kit Lápis
//!     category: Escrita
//!     description: 12 unidades com borracha
//!     price: "12.90"
//!     stock: 100
//!     image_url: /placeholder.svg?height=400&width=400
//! ```

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use papelaria_core::{Price, Stock};

/// Longest name accepted by `categories.name`.
pub const MAX_CATEGORY_NAME: usize = 100;
/// Longest name accepted by `products.name`.
pub const MAX_PRODUCT_NAME: usize = 200;

const PHOTO: &str = "/images/whatsapp-20image-202025-11-19-20at-2022.jpeg";
const PLACEHOLDER: &str = "/placeholder.svg?height=400&width=400";

const BUILTIN_CATEGORIES: [&str; 6] = [
    "Escola",
    "Escritório",
    "Arte",
    "Informática",
    "Papel",
    "Escrita",
];

// (name, category, description, price in centavos, stock, image)
const BUILTIN_PRODUCTS: [(&str, &str, &str, i64, i32, &str); 18] = [
    ("Caderno Universitário", "Escola", "Capa dura, 200 folhas", 2490, 50, PHOTO),
    ("Kit Lápis", "Escrita", "12 unidades com borracha", 1290, 100, PHOTO),
    ("Mochila Escolar", "Escola", "Resistente, vários compartimentos", 8990, 20, PLACEHOLDER),
    ("Grampeador de Mesa", "Escritório", "Metálico, até 30 folhas", 3490, 40, PHOTO),
    ("Organizador de Mesa", "Escritório", "Organiza com estilo", 4590, 60, PHOTO),
    ("Estojo", "Escola", "Grande capacidade", 1590, 80, PLACEHOLDER),
    ("Canetas Esferográficas", "Escrita", "Pacote com 10 unidades", 890, 200, PLACEHOLDER),
    ("Papel Sulfite A4", "Papel", "500 folhas, 75g/m²", 3490, 80, PLACEHOLDER),
    ("Tinta para Impressora", "Informática", "Cartucho preto", 4990, 30, PLACEHOLDER),
    ("Bloco de Notas", "Papel", "80 folhas adesivas", 690, 120, PLACEHOLDER),
    ("Kit Canetinhas", "Arte", "24 cores vibrantes", 2990, 70, PLACEHOLDER),
    ("Pasta Sanfonada", "Escritório", "12 divisórias A4", 1990, 90, PLACEHOLDER),
    ("Adesivos Decorativos", "Arte", "Variados designs", 450, 200, PLACEHOLDER),
    ("Cola Branca", "Arte", "250g tubo", 590, 150, PLACEHOLDER),
    ("Régua 30cm", "Escrita", "Plástica transparente", 350, 300, PLACEHOLDER),
    ("Envelopes A4", "Papel", "Pacote com 25", 1200, 500, PLACEHOLDER),
    ("Caderno de Desenho", "Arte", "50 folhas especiais", 1890, 100, PLACEHOLDER),
    ("Agenda 2025", "Escritório", "Semanal capa couro", 4990, 45, PHOTO),
];

/// Errors loading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// A problem found by [`Catalog::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogIssue {
    #[error("category name is empty")]
    EmptyCategoryName,
    #[error("category '{0}' is listed more than once")]
    DuplicateCategory(String),
    #[error("category '{0}' is longer than {max} characters", max = MAX_CATEGORY_NAME)]
    CategoryNameTooLong(String),
    #[error("product name is empty")]
    EmptyProductName,
    #[error("product '{0}' is listed more than once")]
    DuplicateProduct(String),
    #[error("product '{0}' is longer than {max} characters", max = MAX_PRODUCT_NAME)]
    ProductNameTooLong(String),
    #[error("product '{product}' references unknown category '{category}'")]
    UnknownCategory { product: String, category: String },
    #[error("product '{product}' has an invalid price: {reason}")]
    InvalidPrice { product: String, reason: String },
    #[error("product '{product}' has an invalid stock: {reason}")]
    InvalidStock { product: String, reason: String },
}

/// A product as written in a catalog, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogProduct {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CatalogProduct {
    /// The price as a validated [`Price`].
    ///
    /// # Errors
    ///
    /// Returns a `CatalogIssue::InvalidPrice` if the amount does not fit `NUMERIC(10,2)`.
    pub fn checked_price(&self) -> Result<Price, CatalogIssue> {
        Price::new(self.price).map_err(|e| CatalogIssue::InvalidPrice {
            product: self.name.clone(),
            reason: e.to_string(),
        })
    }

    /// The stock as a validated [`Stock`].
    ///
    /// # Errors
    ///
    /// Returns a `CatalogIssue::InvalidStock` for negative stock.
    pub fn checked_stock(&self) -> Result<Stock, CatalogIssue> {
        Stock::new(self.stock).map_err(|e| CatalogIssue::InvalidStock {
            product: self.name.clone(),
            reason: e.to_string(),
        })
    }
}

/// Categories plus the products that reference them by name.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub categories: Vec<String>,
    #[serde(default)]
    pub products: Vec<CatalogProduct>,
}

impl Catalog {
    /// The stationery shop's six categories and eighteen demo products.
    #[must_use]
    pub fn builtin() -> Self {
        let categories = BUILTIN_CATEGORIES.iter().map(|&c| c.to_owned()).collect();
        let products = BUILTIN_PRODUCTS
            .iter()
            .map(
                |&(name, category, description, cents, stock, image)| CatalogProduct {
                    name: name.to_owned(),
                    category: category.to_owned(),
                    description: Some(description.to_owned()),
                    price: Decimal::new(cents, 2),
                    stock,
                    image_url: Some(image.to_owned()),
                },
            )
            .collect();

        Self {
            categories,
            products,
        }
    }

    /// Read a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_yaml_str(&content)
    }

    /// Parse a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed YAML.
    pub fn from_yaml_str(content: &str) -> Result<Self, CatalogError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Check the catalog against the column limits and its own references.
    ///
    /// Returns every problem found; an empty list means the catalog can be seeded.
    #[must_use]
    pub fn validate(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();

        let mut categories = HashSet::new();
        for name in &self.categories {
            if name.trim().is_empty() {
                issues.push(CatalogIssue::EmptyCategoryName);
            } else if name.chars().count() > MAX_CATEGORY_NAME {
                issues.push(CatalogIssue::CategoryNameTooLong(name.clone()));
            }
            if !categories.insert(name.as_str()) {
                issues.push(CatalogIssue::DuplicateCategory(name.clone()));
            }
        }

        let mut products = HashSet::new();
        for product in &self.products {
            if product.name.trim().is_empty() {
                issues.push(CatalogIssue::EmptyProductName);
            } else if product.name.chars().count() > MAX_PRODUCT_NAME {
                issues.push(CatalogIssue::ProductNameTooLong(product.name.clone()));
            }
            if !products.insert(product.name.as_str()) {
                issues.push(CatalogIssue::DuplicateProduct(product.name.clone()));
            }
            if !categories.contains(product.category.as_str()) {
                issues.push(CatalogIssue::UnknownCategory {
                    product: product.name.clone(),
                    category: product.category.clone(),
                });
            }
            if let Err(issue) = product.checked_price() {
                issues.push(issue);
            }
            if let Err(issue) = product.checked_stock() {
                issues.push(issue);
            }
        }

        issues
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.categories.len(), 6);
        assert_eq!(catalog.products.len(), 18);
        assert!(catalog.validate().is_empty());
    }

    #[test]
    fn test_builtin_category_assignments() {
        let catalog = Catalog::builtin();
        let mut per_category: HashMap<&str, usize> = HashMap::new();
        for product in &catalog.products {
            *per_category.entry(product.category.as_str()).or_default() += 1;
        }

        assert_eq!(per_category["Escola"], 3);
        assert_eq!(per_category["Escritório"], 4);
        assert_eq!(per_category["Arte"], 4);
        assert_eq!(per_category["Informática"], 1);
        assert_eq!(per_category["Papel"], 3);
        assert_eq!(per_category["Escrita"], 3);
    }

    #[test]
    fn test_builtin_prices_are_exact() {
        let catalog = Catalog::builtin();
        let agenda = catalog
            .products
            .iter()
            .find(|p| p.name == "Agenda 2025")
            .unwrap();
        assert_eq!(agenda.checked_price().unwrap().amount().to_string(), "49.90");
        assert_eq!(agenda.checked_stock().unwrap().get(), 45);
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let catalog = Catalog::from_yaml_str(
            r#"
categories: [Arte, Arte, ""]
products:
  - name: Cola
    category: Cola Quente
    price: "-1.00"
  - name: Cola
    category: Arte
    price: "2.999"
    stock: -4
"#,
        )
        .unwrap();

        let issues = catalog.validate();
        assert!(issues.contains(&CatalogIssue::DuplicateCategory("Arte".to_owned())));
        assert!(issues.contains(&CatalogIssue::EmptyCategoryName));
        assert!(issues.contains(&CatalogIssue::DuplicateProduct("Cola".to_owned())));
        assert!(issues.contains(&CatalogIssue::UnknownCategory {
            product: "Cola".to_owned(),
            category: "Cola Quente".to_owned(),
        }));
        assert_eq!(
            issues
                .iter()
                .filter(|i| matches!(i, CatalogIssue::InvalidPrice { .. }))
                .count(),
            2
        );
        assert!(issues.iter().any(|i| matches!(i, CatalogIssue::InvalidStock { .. })));
    }

    #[test]
    fn test_yaml_defaults() {
        let catalog = Catalog::from_yaml_str(
            "categories: [Papel]\nproducts:\n  - name: Resma\n    category: Papel\n    price: 30\n",
        )
        .unwrap();
        let product = &catalog.products[0];
        assert_eq!(product.stock, 0);
        assert!(product.description.is_none());
        assert!(catalog.validate().is_empty());
    }

    #[test]
    fn test_name_length_limits() {
        let catalog = Catalog {
            categories: vec!["c".repeat(MAX_CATEGORY_NAME + 1)],
            products: vec![CatalogProduct {
                name: "p".repeat(MAX_PRODUCT_NAME + 1),
                category: "c".repeat(MAX_CATEGORY_NAME + 1),
                description: None,
                price: Decimal::ONE,
                stock: 1,
                image_url: None,
            }],
        };
        let issues = catalog.validate();
        assert!(issues.iter().any(|i| matches!(i, CatalogIssue::CategoryNameTooLong(_))));
        assert!(issues.iter().any(|i| matches!(i, CatalogIssue::ProductNameTooLong(_))));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = Catalog::from_yaml_file("/nonexistent/catalog.yaml").await;
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }
}
