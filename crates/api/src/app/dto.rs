//! Request DTOs and JSON mapping helpers.

use serde::Deserialize;
use serde_json::{Value, json};

use airhouse_auth::{Credentials, SignUp, UserAccount};
use airhouse_core::validation::{INVALID_CHOICE, REQUIRED};
use airhouse_core::{CategoryId, DomainError, FieldErrors, ItemId, OrderItemId};
use airhouse_infra::{DashboardView, RestockView};
use airhouse_inventory::{AdjustDirection, Category, InventoryFilter, InventoryItem, ItemFields, LowStockReport};
use airhouse_orders::{LineForm, Order, OrderFilter, OrderForm, OrderHeader};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl From<LoginRequest> for Credentials {
    fn from(req: LoginRequest) -> Self {
        Credentials {
            email: req.email,
            password: req.password,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl From<SignupRequest> for SignUp {
    fn from(req: SignupRequest) -> Self {
        SignUp {
            email: req.email,
            password1: req.password1,
            password2: req.password2,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    #[serde(default)]
    pub name: String,
    pub quantity: Option<i64>,
    pub category: Option<String>,
}

impl ItemRequest {
    pub fn into_fields(self) -> Result<ItemFields, DomainError> {
        let category = parse_optional::<CategoryId>(self.category.as_deref())
            .map_err(|_| DomainError::field("category", INVALID_CHOICE))?;
        Ok(ItemFields {
            name: self.name,
            quantity: self.quantity,
            category,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub category: Option<String>,
    pub name: Option<String>,
}

impl DashboardQuery {
    pub fn into_filter(self) -> Result<InventoryFilter, DomainError> {
        let category = parse_optional::<CategoryId>(self.category.as_deref())
            .map_err(|_| DomainError::field("category", INVALID_CHOICE))?;
        Ok(InventoryFilter {
            category,
            name: self.name,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub item_id: Option<String>,
    pub adjust_amount: Option<i64>,
    pub action: Option<String>,
}

impl RestockRequest {
    /// Every missing or malformed field is reported at once.
    pub fn into_parts(self) -> Result<(ItemId, AdjustDirection, i64), DomainError> {
        let mut errors = FieldErrors::new();

        let item = match parse_optional::<ItemId>(self.item_id.as_deref()) {
            Ok(Some(id)) => Some(id),
            Ok(None) => {
                errors.push_field("item_id", REQUIRED);
                None
            }
            Err(_) => {
                errors.push_field("item_id", INVALID_CHOICE);
                None
            }
        };

        if self.adjust_amount.is_none() {
            errors.push_field("adjust_amount", REQUIRED);
        }

        let direction = match self.action.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            None => {
                errors.push_field("action", REQUIRED);
                None
            }
            Some(raw) => match raw.parse::<AdjustDirection>() {
                Ok(d) => Some(d),
                Err(DomainError::Validation(e)) => {
                    errors.extend(e);
                    None
                }
                Err(_) => {
                    errors.push_field("action", INVALID_CHOICE);
                    None
                }
            },
        };

        match (item, direction, self.adjust_amount) {
            (Some(item), Some(direction), Some(amount)) if errors.is_empty() => Ok((item, direction, amount)),
            _ => Err(DomainError::Validation(errors)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub item: Option<String>,
    pub reference: Option<String>,
}

impl OrderListQuery {
    pub fn into_filter(self) -> Result<OrderFilter, DomainError> {
        let item = parse_optional::<ItemId>(self.item.as_deref())
            .map_err(|_| DomainError::field("item", INVALID_CHOICE))?;
        Ok(OrderFilter {
            item,
            reference: self.reference,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub id: Option<String>,
    pub item: Option<String>,
    pub quantity: Option<i64>,
    #[serde(default)]
    pub delete: bool,
}

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub reference: Option<String>,
    #[serde(default)]
    pub lines: Vec<OrderLineRequest>,
}

impl OrderRequest {
    /// Unparseable ids are left empty on their line and recorded as
    /// `lines[i].id` / `lines[i].item` errors on the form.
    pub fn into_form(self) -> OrderForm {
        let mut decode_errors = FieldErrors::new();
        let mut lines = Vec::with_capacity(self.lines.len());

        for (idx, line) in self.lines.into_iter().enumerate() {
            let id = parse_optional::<OrderItemId>(line.id.as_deref()).unwrap_or_else(|_| {
                decode_errors.push_field(format!("lines[{idx}].id"), INVALID_CHOICE);
                None
            });
            let item = parse_optional::<ItemId>(line.item.as_deref()).unwrap_or_else(|_| {
                decode_errors.push_field(format!("lines[{idx}].item"), INVALID_CHOICE);
                None
            });
            lines.push(LineForm {
                id,
                item,
                quantity: line.quantity,
                delete: line.delete,
            });
        }

        OrderForm {
            header: OrderHeader {
                reference: self.reference,
            },
            lines,
            decode_errors,
        }
    }
}

/// Blank strings count as absent.
fn parse_optional<T>(raw: Option<&str>) -> Result<Option<T>, DomainError>
where
    T: core::str::FromStr<Err = DomainError>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

// -------------------------
// Response mapping
// -------------------------

pub fn account_to_json(account: &UserAccount) -> Value {
    json!({
        "id": account.id.to_string(),
        "email": account.email,
        "created_at": account.created_at.to_rfc3339(),
    })
}

pub fn category_to_json(category: &Category) -> Value {
    json!({
        "id": category.id.to_string(),
        "name": category.name,
    })
}

pub fn item_to_json(item: &InventoryItem, low_quantity: i64) -> Value {
    json!({
        "id": item.id.to_string(),
        "name": item.name,
        "quantity": item.quantity,
        "category": item.category.map(|c| c.to_string()),
        "date_created": item.date_created.to_rfc3339(),
        "low_stock": airhouse_inventory::is_low_stock(item.quantity, low_quantity),
    })
}

fn low_stock_to_json(report: &LowStockReport) -> Value {
    json!({
        "threshold": report.threshold,
        "count": report.count(),
        "item_ids": report.item_ids.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
    })
}

pub fn dashboard_to_json(view: &DashboardView) -> Value {
    json!({
        "items": view.items.iter().map(|i| item_to_json(i, view.low_stock.threshold)).collect::<Vec<_>>(),
        "low_stock": low_stock_to_json(&view.low_stock),
        "messages": view.messages,
    })
}

pub fn restock_to_json(view: &RestockView) -> Value {
    json!({
        "items": view.items.iter().map(|i| item_to_json(i, view.low_stock.threshold)).collect::<Vec<_>>(),
        "low_stock": low_stock_to_json(&view.low_stock),
    })
}

pub fn order_to_json(order: &Order) -> Value {
    json!({
        "id": order.id.to_string(),
        "reference": order.reference,
        "date_created": order.date_created.to_rfc3339(),
        "total_quantity": order.total_quantity(),
        "lines": order.lines.iter().map(|l| json!({
            "id": l.id.to_string(),
            "item": l.item_id.to_string(),
            "quantity": l.quantity,
        })).collect::<Vec<_>>(),
    })
}
