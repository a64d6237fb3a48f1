//! Layout boxes: table columns and reading-order regions.

use super::BBox;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Layout boxes keyed by id, in assignment order.
pub type LayoutBoxes = IndexMap<String, LayoutBox>;

/// Kind of layout region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutBoxType {
    /// Generic reading-order region
    #[default]
    Order,
    /// One column of a data table
    DataColumn,
}

/// How a word or line is assigned to a box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InclusionRule {
    /// Most of the element lies inside the box
    #[default]
    Majority,
    /// The element's left edge lies inside the box
    Left,
}

/// Granularity at which elements are assigned to a box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InclusionLevel {
    #[default]
    Word,
    Line,
}

/// A detected table column or ordering region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutBox {
    /// Assignment order, lower is read first
    pub priority: usize,

    /// Region in page pixels
    pub coords: BBox,

    /// Region kind
    #[serde(rename = "type")]
    pub kind: LayoutBoxType,

    /// Index of the owning table on the page
    pub table: Option<usize>,

    pub inclusion_rule: InclusionRule,

    pub inclusion_level: InclusionLevel,
}

impl LayoutBox {
    /// Create a generic ordering box.
    pub fn new(priority: usize, coords: BBox) -> Self {
        Self {
            priority,
            coords,
            kind: LayoutBoxType::Order,
            table: None,
            inclusion_rule: InclusionRule::Majority,
            inclusion_level: InclusionLevel::Word,
        }
    }

    /// Create a data column box belonging to `table`.
    pub fn data_column(priority: usize, coords: BBox, table: usize) -> Self {
        Self {
            kind: LayoutBoxType::DataColumn,
            table: Some(table),
            ..Self::new(priority, coords)
        }
    }
}
