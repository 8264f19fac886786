use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tabled::Tabled;

/// The expected columns of the inventory sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Column {
    State,
    Division,
    LocationName,
    LocationType,
    HardwareItem,
    Status,
    RequiredQty,
    DistributedQty,
    BalanceQty,
    CourtsRegular,
    CourtsFamily,
    CourtsTjo,
    CourtsTotal,
}

impl Column {
    pub const ALL: [Column; 13] = [
        Column::State,
        Column::Division,
        Column::LocationName,
        Column::LocationType,
        Column::HardwareItem,
        Column::Status,
        Column::RequiredQty,
        Column::DistributedQty,
        Column::BalanceQty,
        Column::CourtsRegular,
        Column::CourtsFamily,
        Column::CourtsTjo,
        Column::CourtsTotal,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::State => "State",
            Column::Division => "Session_Division",
            Column::LocationName => "Location_Name",
            Column::LocationType => "Location_Type",
            Column::HardwareItem => "Hardware_Item",
            Column::Status => "Status",
            Column::RequiredQty => "Required_Qty",
            Column::DistributedQty => "Distributed_Qty",
            Column::BalanceQty => "Balance_Qty",
            Column::CourtsRegular => "Courts_Count",
            Column::CourtsFamily => "Family_Courts",
            Column::CourtsTjo => "TJOs",
            Column::CourtsTotal => "Total_Courts",
        }
    }

    pub fn from_header(header: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.header() == header.trim())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryRecord {
    pub state: String,
    pub division: String,
    pub location_name: String,
    pub location_type: String,
    pub courts_regular: f64,
    pub courts_family: f64,
    pub courts_tjo: f64,
    pub courts_total: f64,
    pub hardware_item: String,
    pub required_qty: f64,
    pub distributed_qty: f64,
    pub balance_qty: f64,
    pub status: String,
}

/// Cleaned rows in source order, plus the columns the source provided.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    records: Vec<InventoryRecord>,
    columns: BTreeSet<Column>,
}

impl Table {
    pub fn new(records: Vec<InventoryRecord>, columns: BTreeSet<Column>) -> Self {
        Self { records, columns }
    }

    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    pub fn has(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn retain<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&InventoryRecord) -> bool,
    {
        Table {
            records: self.records.iter().filter(|r| keep(*r)).cloned().collect(),
            columns: self.columns.clone(),
        }
    }
}

/// Court counts summed over distinct locations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LocationAggregate {
    pub courts_regular: f64,
    pub courts_family: f64,
    pub courts_tjo: f64,
    pub courts_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HardwareAggregate {
    pub hardware_item: String,
    pub required_qty: f64,
    pub distributed_qty: f64,
    pub balance_qty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationMeta {
    pub location_type: String,
    pub courts_regular: i64,
    pub courts_family: i64,
    pub courts_tjo: i64,
    pub courts_total: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BadgeKind {
    Surplus,
    Shortfall,
    Balanced,
}

impl BadgeKind {
    pub fn label(self) -> &'static str {
        match self {
            BadgeKind::Surplus => "Surplus",
            BadgeKind::Shortfall => "Shortfall",
            BadgeKind::Balanced => "Balanced",
        }
    }
}

impl fmt::Display for BadgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardDescriptor {
    pub title: String,
    pub top_value: i64,
    pub bottom_value: i64,
    pub badge_kind: BadgeKind,
    pub badge_text: String,
}

/// Highlight hint for the detail table, keyed off the raw source status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusHighlight {
    Shortfall,
    Surplus,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    pub hardware_item: String,
    pub required_qty: f64,
    pub distributed_qty: f64,
    pub balance_qty: f64,
    pub status: Option<String>,
    pub highlight: StatusHighlight,
}

#[derive(Debug, Tabled, Clone)]
pub struct MetricsRow {
    #[tabled(rename = "Total Courts")]
    pub total: String,
    #[tabled(rename = "Regular Courts")]
    pub regular: String,
    #[tabled(rename = "Family Courts")]
    pub family: String,
    #[tabled(rename = "TJOs")]
    pub tjo: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct CardRow {
    #[tabled(rename = "Hardware")]
    pub title: String,
    #[tabled(rename = "Distributed / Required")]
    pub values: String,
    #[tabled(rename = "Badge")]
    pub badge: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct DetailTableRow {
    #[tabled(rename = "Hardware_Item")]
    pub hardware_item: String,
    #[tabled(rename = "Required_Qty")]
    pub required_qty: String,
    #[tabled(rename = "Distributed_Qty")]
    pub distributed_qty: String,
    #[tabled(rename = "Balance_Qty")]
    pub balance_qty: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct DetailTableRowNoStatus {
    #[tabled(rename = "Hardware_Item")]
    pub hardware_item: String,
    #[tabled(rename = "Required_Qty")]
    pub required_qty: String,
    #[tabled(rename = "Distributed_Qty")]
    pub distributed_qty: String,
    #[tabled(rename = "Balance_Qty")]
    pub balance_qty: String,
}
