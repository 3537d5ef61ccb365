use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use airhouse_core::validation::{INVALID_CHOICE, REQUIRED};
use airhouse_core::{CategoryId, DomainError, DomainResult, Entity, FieldErrors, ItemId, Owned, Owner, UserId};

pub const MAX_ITEM_NAME_LEN: usize = 200;

/// An inventory item held by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub owner_id: UserId,
    pub name: String,
    /// Never negative; every mutation path enforces it.
    pub quantity: i64,
    pub category: Option<CategoryId>,
    pub date_created: DateTime<Utc>,
}

impl Entity for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Owned for InventoryItem {
    fn owner_id(&self) -> UserId {
        self.owner_id
    }
}

/// Editable fields of an item, as submitted by the item form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFields {
    pub name: String,
    pub quantity: Option<i64>,
    pub category: Option<CategoryId>,
}

impl ItemFields {
    /// Validate the submitted fields.
    ///
    /// `category_known` tells whether the referenced category (if any)
    /// exists; the lookup belongs to the caller.
    pub fn validate(&self, category_known: bool) -> DomainResult<ValidItemFields> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push_field("name", REQUIRED);
        } else if name.chars().count() > MAX_ITEM_NAME_LEN {
            errors.push_field(
                "name",
                format!("Ensure this value has at most {MAX_ITEM_NAME_LEN} characters."),
            );
        }

        match self.quantity {
            None => errors.push_field("quantity", REQUIRED),
            Some(q) if q < 0 => {
                errors.push_field("quantity", "Ensure this value is greater than or equal to 0.")
            }
            Some(_) => {}
        }

        if self.category.is_some() && !category_known {
            errors.push_field("category", INVALID_CHOICE);
        }

        errors.into_result(ValidItemFields {
            name: name.to_string(),
            quantity: self.quantity.unwrap_or_default(),
            category: self.category,
        })
    }
}

/// Item fields that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidItemFields {
    name: String,
    quantity: i64,
    category: Option<CategoryId>,
}

/// Command: CreateItem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateItem {
    pub item_id: ItemId,
    pub fields: ValidItemFields,
    pub occurred_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Build a new item owned by `owner`.
    pub fn create(owner: &Owner, cmd: CreateItem) -> Self {
        Self {
            id: cmd.item_id,
            owner_id: owner.user_id(),
            name: cmd.fields.name,
            quantity: cmd.fields.quantity,
            category: cmd.fields.category,
            date_created: cmd.occurred_at,
        }
    }

    /// Apply edited fields; identity, owner and creation date are kept.
    pub fn apply_fields(&mut self, fields: ValidItemFields) {
        self.name = fields.name;
        self.quantity = fields.quantity;
        self.category = fields.category;
    }

    /// Apply a stock adjustment (see [`StockAdjustment::apply`]).
    pub fn adjust(&mut self, adjustment: StockAdjustment) {
        self.quantity = adjustment.apply(self.quantity);
    }
}

/// Restock direction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustDirection {
    Increase,
    Decrease,
}

impl core::str::FromStr for AdjustDirection {
    type Err = DomainError;

    /// Accepts the restock form's `add`/`subtract` as well as the long names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" | "increase" => Ok(Self::Increase),
            "subtract" | "decrease" => Ok(Self::Decrease),
            _ => Err(DomainError::field("action", INVALID_CHOICE)),
        }
    }
}

/// Command: AdjustStock.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    direction: AdjustDirection,
    amount: i64,
}

impl StockAdjustment {
    pub fn new(direction: AdjustDirection, amount: i64) -> DomainResult<Self> {
        if amount < 0 {
            return Err(DomainError::field(
                "adjust_amount",
                "Ensure this value is greater than or equal to 0.",
            ));
        }
        Ok(Self { direction, amount })
    }

    pub fn direction(&self) -> AdjustDirection {
        self.direction
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// New quantity after the adjustment.
    ///
    /// Decreases clamp at zero without signalling an error.
    pub fn apply(&self, quantity: i64) -> i64 {
        match self.direction {
            AdjustDirection::Increase => quantity.saturating_add(self.amount),
            AdjustDirection::Decrease => quantity.saturating_sub(self.amount).max(0),
        }
    }
}
