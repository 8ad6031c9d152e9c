//! Tradable pair listing entry.

use serde::Deserialize;

/// One entry of the `/products` listing. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Product {
    pub id: String,
    pub base_currency: String,
    pub quote_currency: String,
    #[serde(default)]
    pub display_name: Option<String>,
}
