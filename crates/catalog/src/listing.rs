use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradepost_core::{DomainError, DomainResult, ProductId, UserId};

/// Maximum number of hosted photo URLs a single listing may carry.
pub const MAX_LISTING_PHOTOS: usize = 5;

/// Product category, normalised to a trimmed lowercase token.
///
/// Category filtering is exact-match, so normalising at construction keeps
/// "Books" and "books" from splitting into two categories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let normalised = value.into().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(DomainError::validation("category cannot be empty"));
        }
        Ok(Self(normalised))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A product listing document.
///
/// Listings are price snapshots of what the seller advertised; editing an
/// existing listing is not supported, only creation and (at order time)
/// retirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    /// Price in smallest currency unit (e.g., cents).
    pub price: u64,
    pub category: Category,
    pub seller_id: UserId,
    /// Already-hosted image URLs, at most [`MAX_LISTING_PHOTOS`].
    pub photo_urls: Vec<String>,
    pub listed_at: DateTime<Utc>,
}

/// Unvalidated listing input as submitted by a seller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price: u64,
    pub category: String,
    pub seller_id: UserId,
    pub photo_urls: Vec<String>,
}

impl NewListing {
    /// Validate the submission and mint the listing document.
    ///
    /// Assigns a fresh [`ProductId`] and stamps the listing time.
    pub fn into_product(self) -> DomainResult<Product> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title cannot be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }
        let category = Category::new(self.category)?;
        if self.photo_urls.len() > MAX_LISTING_PHOTOS {
            return Err(DomainError::validation(format!(
                "maximum {MAX_LISTING_PHOTOS} photos are allowed"
            )));
        }
        if self.photo_urls.iter().any(|url| url.trim().is_empty()) {
            return Err(DomainError::validation("photo url cannot be empty"));
        }

        Ok(Product {
            id: ProductId::new(),
            title: self.title,
            description: self.description,
            price: self.price,
            category,
            seller_id: self.seller_id,
            photo_urls: self.photo_urls,
            listed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_seller() -> UserId {
        UserId::new("seller-1").unwrap()
    }

    fn listing(title: &str, description: &str, category: &str, photos: usize) -> NewListing {
        NewListing {
            title: title.to_string(),
            description: description.to_string(),
            price: 2500,
            category: category.to_string(),
            seller_id: test_seller(),
            photo_urls: (0..photos).map(|i| format!("https://img.example/{i}.jpg")).collect(),
        }
    }

    #[test]
    fn valid_listing_becomes_a_product() {
        let product = listing("Mountain bike", "Good condition", "Sports", 3)
            .into_product()
            .unwrap();
        assert_eq!(product.title, "Mountain bike");
        assert_eq!(product.category.as_str(), "sports");
        assert_eq!(product.seller_id, test_seller());
        assert_eq!(product.photo_urls.len(), 3);
    }

    #[test]
    fn listing_rejects_empty_title() {
        let err = listing("   ", "desc", "books", 0).into_product().unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn listing_rejects_empty_description() {
        let err = listing("Title", "  ", "books", 0).into_product().unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn listing_rejects_empty_category() {
        let err = listing("Title", "desc", "  ", 0).into_product().unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn listing_enforces_photo_cap() {
        assert!(listing("Title", "desc", "books", MAX_LISTING_PHOTOS)
            .into_product()
            .is_ok());

        let err = listing("Title", "desc", "books", MAX_LISTING_PHOTOS + 1)
            .into_product()
            .unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("5 photos")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn category_is_normalised_for_exact_match() {
        let a = Category::new(" Books ").unwrap();
        let b = Category::new("books").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "books");
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: well-formed submissions always produce a product with
            /// a normalised category and fresh identifier.
            #[test]
            fn well_formed_listings_always_construct(
                title in "[A-Za-z][A-Za-z0-9 ]{0,60}",
                description in "[A-Za-z][A-Za-z0-9 ]{0,120}",
                category in "[A-Za-z]{1,20}",
                price in 0u64..10_000_000,
                photos in 0usize..=MAX_LISTING_PHOTOS,
            ) {
                let submission = NewListing {
                    title: title.clone(),
                    description,
                    price,
                    category: category.clone(),
                    seller_id: UserId::new("seller-p").unwrap(),
                    photo_urls: (0..photos).map(|i| format!("https://img.example/{i}.jpg")).collect(),
                };
                let product = submission.into_product().unwrap();
                let expected_category = category.to_lowercase();
                prop_assert_eq!(product.category.as_str(), expected_category.as_str());
                prop_assert_eq!(product.price, price);
                prop_assert_eq!(product.photo_urls.len(), photos);
            }

            /// Property: category normalisation is idempotent.
            #[test]
            fn category_normalisation_is_idempotent(raw in "[A-Za-z ]{1,24}") {
                prop_assume!(!raw.trim().is_empty());
                let once = Category::new(&raw).unwrap();
                let twice = Category::new(once.as_str()).unwrap();
                prop_assert_eq!(once, twice);
            }

            /// Property: submissions over the photo cap are always rejected.
            #[test]
            fn over_cap_photo_lists_are_rejected(
                extra in 1usize..8,
            ) {
                let submission = NewListing {
                    title: "Title".to_string(),
                    description: "Description".to_string(),
                    price: 100,
                    category: "misc".to_string(),
                    seller_id: UserId::new("seller-p").unwrap(),
                    photo_urls: (0..MAX_LISTING_PHOTOS + extra)
                        .map(|i| format!("https://img.example/{i}.jpg"))
                        .collect(),
                };
                prop_assert!(submission.into_product().is_err());
            }
        }
    }
}
