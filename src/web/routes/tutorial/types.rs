//! Request and response shapes of the tutorial API.

use std::collections::{BTreeSet, HashMap};

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::model::{check_patch_max_chars, check_patch_not_null, Patch};

// ###################################
// ->   ITEMS
// ###################################
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Image {
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Item {
    #[serde(default)]
    pub item_id: Option<Uuid>,
    #[serde(default = "now")]
    pub start_datetime: NaiveDateTime,
    #[serde(default)]
    pub end_datetime: Option<NaiveDateTime>,
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 300, code = "max_length"))]
    pub description: Option<String>,
    /// The price must be greater than zero.
    #[validate(range(exclusive_min = 0.0, code = "greater_than"))]
    pub price: f64,
    #[serde(default)]
    pub tax: Option<f64>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    #[validate(nested)]
    pub images: Option<Vec<Image>>,
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

impl Item {
    fn seed(name: &str, description: Option<&str>, price: f64, tax: Option<f64>) -> Self {
        Item {
            item_id: None,
            start_datetime: now(),
            end_datetime: None,
            name: name.to_string(),
            description: description.map(str::to_string),
            price,
            tax,
            tags: BTreeSet::new(),
            images: None,
        }
    }
}

/// Partial update of a stored item. Only the keys present in the body are written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPatch {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub price: Patch<f64>,
    #[serde(default)]
    pub tax: Patch<f64>,
    #[serde(default)]
    pub tags: Patch<BTreeSet<String>>,
}

impl ItemPatch {
    pub fn apply(self, current: Item) -> Item {
        Item {
            name: self.name.apply_to(current.name),
            description: self.description.apply_to_nullable(current.description),
            price: self.price.apply_to(current.price),
            tax: self.tax.apply_to_nullable(current.tax),
            tags: self.tags.apply_to(current.tags),
            ..current
        }
    }
}

impl Validate for ItemPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        check_patch_not_null(&mut errors, "name", &self.name);
        check_patch_not_null(&mut errors, "price", &self.price);
        check_patch_not_null(&mut errors, "tags", &self.tags);
        check_patch_max_chars(&mut errors, "description", &self.description, 300);

        if let Some(price) = self.price.as_value() {
            if *price <= 0.0 {
                let mut err = ValidationError::new("greater_than");
                err.add_param("exclusive_min".into(), &0.0);
                err.add_param("value".into(), price);
                errors.add("price", err);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// The in-memory items of the tutorial, keyed by a short name.
#[derive(Debug)]
pub struct ItemStore(RwLock<HashMap<String, Item>>);

impl ItemStore {
    pub fn seeded() -> Self {
        let items = HashMap::from([
            ("foo".to_string(), Item::seed("Foo", None, 50.2, None)),
            (
                "bar".to_string(),
                Item::seed("Bar", Some("The bartenders"), 62.0, Some(20.2)),
            ),
            ("baz".to_string(), Item::seed("Baz", None, 50.2, Some(10.5))),
        ]);
        ItemStore(RwLock::new(items))
    }

    /// Applies the patch to the stored item, `None` if there is no item under `key`.
    pub async fn patch(&self, key: &str, patch: ItemPatch) -> Option<Item> {
        let mut items = self.0.write().await;
        let current = items.get(key)?.clone();
        let updated = patch.apply(current);
        items.insert(key.to_string(), updated.clone());
        Some(updated)
    }

    #[cfg(test)]
    pub async fn get(&self, key: &str) -> Option<Item> {
        self.0.read().await.get(key).cloned()
    }
}

/// The items listed by `GET /items/`.
#[derive(Debug, Clone, Serialize)]
pub struct FakeItem {
    pub item_name: &'static str,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
}

pub const FAKE_ITEMS_DB: [FakeItem; 3] = [
    FakeItem {
        item_name: "Foo",
        price: 42.0,
        tax: None,
    },
    FakeItem {
        item_name: "Bar",
        price: 50.0,
        tax: None,
    },
    FakeItem {
        item_name: "Baz",
        price: 100.0,
        tax: Some(10.5),
    },
];

// ###################################
// ->   QUERIES
// ###################################
#[derive(Debug, Deserialize, Validate)]
pub struct ItemsQuery {
    #[validate(length(min = 3, max = 50))]
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UserItemQuery {
    #[serde(rename = "item-query")]
    pub q: Option<String>,
    /// Whether to show the short or the long description.
    #[serde(default)]
    pub short: bool,
}

// ###################################
// ->   USERS
// ###################################
#[derive(Debug, Deserialize, Validate)]
pub struct UserIn {
    pub username: String,
    pub password: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// What gets returned after creating a user, the password never leaves the server.
#[derive(Debug, Serialize, PartialEq)]
pub struct UserOut {
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
}

impl From<UserIn> for UserOut {
    fn from(user: UserIn) -> Self {
        UserOut {
            username: user.username,
            email: user.email,
            full_name: user.full_name,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    pub username: String,
    // Required by the form, never checked.
    #[allow(dead_code)]
    pub password: String,
}
