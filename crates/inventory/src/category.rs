use serde::{Deserialize, Serialize};

use airhouse_core::validation::REQUIRED;
use airhouse_core::{CategoryId, DomainResult, Entity, FieldErrors};

pub const MAX_CATEGORY_NAME_LEN: usize = 100;

/// A named grouping for inventory items.
///
/// Categories are global: they carry no owner and no uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: CreateCategory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCategory {
    pub category_id: CategoryId,
    pub name: String,
}

impl Category {
    pub fn create(cmd: CreateCategory) -> DomainResult<Self> {
        let mut errors = FieldErrors::new();
        let name = cmd.name.trim();
        if name.is_empty() {
            errors.push_field("name", REQUIRED);
        } else if name.chars().count() > MAX_CATEGORY_NAME_LEN {
            errors.push_field(
                "name",
                format!("Ensure this value has at most {MAX_CATEGORY_NAME_LEN} characters."),
            );
        }

        errors.into_result(Self {
            id: cmd.category_id,
            name: name.to_string(),
        })
    }
}
