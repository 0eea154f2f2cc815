//! Vendor Model

use serde::{Deserialize, Serialize};

/// Vendor entity (a stall inside a food court)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: String,
    pub court_id: String,
    pub name: String,
    pub is_active: bool,
    /// Default preparation time in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_preparation_time: Option<u32>,
}
