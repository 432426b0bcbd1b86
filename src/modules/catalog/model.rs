use serde::{Deserialize, Serialize};
use validator::Validate;

/// A catalog entry. Every resource family (`product`, `category`, `brand`,
/// ...) holds items of this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ItemDto {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemFilterParams {
    /// Case-insensitive substring match on the item name.
    pub name: Option<String>,
    /// Maximum number of items returned.
    pub limit: Option<usize>,
}
