//! Joint validation of an order header and its line-item formset.
//!
//! The header and every submitted line are validated together. The result is
//! either an [`OrderPlan`] holding the complete, final order (ready to be
//! committed as one unit) or the full list of field errors; nothing partial.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use airhouse_core::validation::{INVALID_CHOICE, REQUIRED};
use airhouse_core::{DomainResult, FieldErrors, ItemId, OrderId, OrderItemId};

use crate::order::{Order, OrderItem};

pub const MAX_REFERENCE_LEN: usize = 100;

pub const DUPLICATE_ITEM: &str = "Please correct the duplicate data for item, which must be unique.";
pub const NO_LINES: &str = "At least one line item is required.";

/// Order header fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHeader {
    pub reference: Option<String>,
}

impl OrderHeader {
    fn validate(&self) -> Result<Option<String>, FieldErrors> {
        let reference = self
            .reference
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());

        match reference {
            Some(r) if r.chars().count() > MAX_REFERENCE_LEN => {
                let mut errors = FieldErrors::new();
                errors.push_field(
                    "reference",
                    format!("Ensure this value has at most {MAX_REFERENCE_LEN} characters."),
                );
                Err(errors)
            }
            other => Ok(other.map(str::to_string)),
        }
    }
}

/// One submitted line form.
///
/// `id` selects an existing line of the order being edited; `delete` marks
/// that line (or an extra form) for removal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineForm {
    pub id: Option<OrderItemId>,
    pub item: Option<ItemId>,
    pub quantity: Option<i64>,
    #[serde(default)]
    pub delete: bool,
}

impl LineForm {
    /// An untouched extra form: ignored rather than validated.
    fn is_blank(&self) -> bool {
        self.id.is_none() && self.item.is_none() && self.quantity.is_none()
    }

    fn validate(&self, owns_item: &impl Fn(ItemId) -> bool) -> Result<(ItemId, i64), FieldErrors> {
        let mut errors = FieldErrors::new();

        let item = match self.item {
            None => {
                errors.push_field("item", REQUIRED);
                None
            }
            Some(id) if !owns_item(id) => {
                errors.push_field("item", INVALID_CHOICE);
                None
            }
            Some(id) => Some(id),
        };

        let quantity = match self.quantity {
            None => {
                errors.push_field("quantity", REQUIRED);
                None
            }
            Some(q) if q < 1 => {
                errors.push_field("quantity", "Ensure this value is greater than or equal to 1.");
                None
            }
            Some(q) => Some(q),
        };

        match (item, quantity) {
            (Some(item), Some(quantity)) => Ok((item, quantity)),
            _ => Err(errors),
        }
    }
}

/// Header plus an ordered list of line forms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderForm {
    #[serde(flatten)]
    pub header: OrderHeader,
    #[serde(default)]
    pub lines: Vec<LineForm>,
    /// Problems found while decoding the submission (e.g. an unparseable
    /// item id, left as `None` on its line). Reported together with the
    /// form's own errors; a field listed here gets no second message.
    #[serde(skip)]
    pub decode_errors: FieldErrors,
}

/// What the form is being validated against.
#[derive(Debug, Clone, Copy)]
pub enum PlanTarget<'a> {
    New {
        order_id: OrderId,
        occurred_at: DateTime<Utc>,
    },
    Existing(&'a Order),
}

/// A validated order, ready to be committed atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlan {
    /// The order as it must look after the commit (header and full line set).
    pub order: Order,
    /// Existing lines dropped by this submission.
    pub removed: Vec<OrderItemId>,
}

impl OrderForm {
    /// Validate header and lines together.
    ///
    /// `owns_item` answers whether the caller owns an inventory item; lines
    /// pointing at anything else are rejected as an invalid choice. Existing
    /// lines that the submission does not mention are kept unchanged.
    pub fn plan(
        &self,
        target: PlanTarget<'_>,
        owns_item: impl Fn(ItemId) -> bool,
    ) -> DomainResult<OrderPlan> {
        let (order_id, date_created, existing) = match target {
            PlanTarget::New {
                order_id,
                occurred_at,
            } => (order_id, occurred_at, None),
            PlanTarget::Existing(order) => (order.id, order.date_created, Some(order)),
        };

        let mut errors = self.decode_errors.clone();

        let reference = self.header.validate().unwrap_or_else(|e| {
            errors.extend(e);
            None
        });

        let mut touched: HashSet<OrderItemId> = HashSet::new();
        let mut updated: HashMap<OrderItemId, OrderItem> = HashMap::new();
        let mut removed: Vec<OrderItemId> = Vec::new();
        let mut added: Vec<OrderItem> = Vec::new();

        for (idx, line) in self.lines.iter().enumerate() {
            let prefix = format!("lines[{idx}]");

            if let Some(id) = line.id {
                let known = existing.and_then(|o| o.line(id)).is_some();
                if !known || !touched.insert(id) {
                    errors.push_field(format!("{prefix}.id"), INVALID_CHOICE);
                    continue;
                }
            }

            if line.delete {
                if let Some(id) = line.id {
                    removed.push(id);
                }
                continue;
            }

            if line.is_blank() {
                continue;
            }

            match line.validate(&owns_item) {
                Ok((item_id, quantity)) => {
                    let row = OrderItem {
                        id: line.id.unwrap_or_default(),
                        order_id,
                        item_id,
                        quantity,
                    };
                    match line.id {
                        Some(id) => {
                            updated.insert(id, row);
                        }
                        None => added.push(row),
                    }
                }
                Err(e) => {
                    let mut nested = FieldErrors::new();
                    nested.extend_prefixed(&prefix, e);
                    nested.retain(|err| !self.decode_errors.has(err.field.as_deref()));
                    errors.extend(nested);
                }
            }
        }

        // Final line set: existing lines in their original order (edited or
        // untouched, minus removals), then new lines in submission order.
        let mut lines: Vec<OrderItem> = Vec::new();
        if let Some(order) = existing {
            for line in &order.lines {
                if removed.contains(&line.id) {
                    continue;
                }
                match updated.remove(&line.id) {
                    Some(edited) => lines.push(edited),
                    None if !touched.contains(&line.id) => lines.push(line.clone()),
                    None => {}
                }
            }
        }
        lines.extend(added);

        if errors.is_empty() {
            let mut seen = HashSet::new();
            if lines.iter().any(|l| !seen.insert(l.item_id)) {
                errors.push_non_field(DUPLICATE_ITEM);
            }
            if lines.is_empty() {
                errors.push_non_field(NO_LINES);
            }
        }

        errors.into_result(OrderPlan {
            order: Order {
                id: order_id,
                reference,
                date_created,
                lines,
            },
            removed,
        })
    }
}
