use crate::types::{
    BadgeKind, Column, HardwareAggregate, InventoryRecord, LocationAggregate, LocationMeta, Table,
};
use crate::util::truncate;
use std::collections::{BTreeMap, BTreeSet, HashSet};

pub const ALL_STATES: &str = "All States";

/// State filter selection. `All` bypasses filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateFilter {
    All,
    Only(String),
}

impl StateFilter {
    pub fn label(&self) -> &str {
        match self {
            StateFilter::All => ALL_STATES,
            StateFilter::Only(state) => state,
        }
    }
}

/// Which rows feed the hardware cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareScope<'a> {
    /// All rows, grouped and summed per hardware item.
    Summary,
    /// One location's rows, one entry per row in source order.
    Location(&'a str),
}

pub fn filter_by_state(table: &Table, filter: &StateFilter) -> Table {
    match filter {
        StateFilter::All => table.clone(),
        StateFilter::Only(state) => table.retain(|r| &r.state == state),
    }
}

/// First row of every distinct location, in source order.
fn distinct_locations(records: &[InventoryRecord]) -> Vec<&InventoryRecord> {
    let mut seen: HashSet<&str> = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.location_name.as_str()))
        .collect()
}

/// Sum court counts over distinct locations.
///
/// Counts repeat on every hardware row of a location, so only the first row
/// per location contributes. The total prefers the source `Total_Courts`
/// when that column exists and sums to something positive.
pub fn aggregate_locations(table: &Table) -> LocationAggregate {
    let locations = distinct_locations(table.records());
    let courts_regular: f64 = locations.iter().map(|r| r.courts_regular).sum();
    let courts_family: f64 = locations.iter().map(|r| r.courts_family).sum();
    let courts_tjo: f64 = locations.iter().map(|r| r.courts_tjo).sum();
    let source_total: f64 = locations.iter().map(|r| r.courts_total).sum();

    let courts_total = if table.has(Column::CourtsTotal) && source_total > 0.0 {
        source_total
    } else {
        courts_regular + courts_family + courts_tjo
    };
    LocationAggregate {
        courts_regular,
        courts_family,
        courts_tjo,
        courts_total,
    }
}

fn hardware_of(r: &InventoryRecord) -> HardwareAggregate {
    HardwareAggregate {
        hardware_item: r.hardware_item.clone(),
        required_qty: r.required_qty,
        distributed_qty: r.distributed_qty,
        balance_qty: r.balance_qty,
    }
}

pub fn aggregate_hardware(table: &Table, scope: HardwareScope<'_>) -> Vec<HardwareAggregate> {
    match scope {
        HardwareScope::Summary => {
            let mut groups: BTreeMap<&str, HardwareAggregate> = BTreeMap::new();
            for r in table.records() {
                let e = groups
                    .entry(r.hardware_item.as_str())
                    .or_insert_with(|| HardwareAggregate {
                        hardware_item: r.hardware_item.clone(),
                        required_qty: 0.0,
                        distributed_qty: 0.0,
                        balance_qty: 0.0,
                    });
                e.required_qty += r.required_qty;
                e.distributed_qty += r.distributed_qty;
                e.balance_qty += r.balance_qty;
            }
            groups.into_values().collect()
        }
        HardwareScope::Location(location) => table
            .records()
            .iter()
            .filter(|r| r.location_name == location)
            .map(hardware_of)
            .collect(),
    }
}

/// Badge classification from the balance alone; the source `Status` text
/// plays no part.
pub fn classify_balance(balance: f64) -> BadgeKind {
    if balance > 0.0 {
        BadgeKind::Surplus
    } else if balance < 0.0 {
        BadgeKind::Shortfall
    } else {
        BadgeKind::Balanced
    }
}

/// Sorted distinct states.
pub fn state_options(table: &Table) -> Vec<String> {
    let states: BTreeSet<&str> = table.records().iter().map(|r| r.state.as_str()).collect();
    states.into_iter().map(str::to_string).collect()
}

/// Sorted distinct location names.
pub fn location_options(table: &Table) -> Vec<String> {
    let names: BTreeSet<&str> = table
        .records()
        .iter()
        .map(|r| r.location_name.as_str())
        .collect();
    names.into_iter().map(str::to_string).collect()
}

/// Header metadata for `location`, taken from its first row.
pub fn location_meta(table: &Table, location: &str) -> Option<LocationMeta> {
    let first = table
        .records()
        .iter()
        .find(|r| r.location_name == location)?;
    let courts_regular = truncate(first.courts_regular);
    let courts_family = truncate(first.courts_family);
    let courts_tjo = truncate(first.courts_tjo);
    let courts_total = if table.has(Column::CourtsTotal) {
        truncate(first.courts_total)
    } else {
        courts_regular + courts_family + courts_tjo
    };
    Some(LocationMeta {
        location_type: first.location_type.clone(),
        courts_regular,
        courts_family,
        courts_tjo,
        courts_total,
    })
}
