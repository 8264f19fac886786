// Resolve filter selections into the exact slice of data to show.
//
// Every call recomputes from the cached base table; nothing is carried over
// between requests.
use crate::card::{cards_for, highlight_status};
use crate::error::ViewError;
use crate::reports::{
    aggregate_hardware, aggregate_locations, filter_by_state, location_meta, location_options,
    state_options, HardwareScope, StateFilter, ALL_STATES,
};
use crate::types::{CardDescriptor, Column, DetailRow, LocationAggregate, LocationMeta, Table};
use serde::Serialize;
use tracing::{debug, warn};

pub const OVERALL_SUMMARY: &str = "Overall Summary";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationSelection {
    Summary,
    Location(String),
}

impl LocationSelection {
    pub fn label(&self) -> &str {
        match self {
            LocationSelection::Summary => OVERALL_SUMMARY,
            LocationSelection::Location(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub states: Option<Vec<String>>,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateView {
    pub scope: String,
    pub courts: LocationAggregate,
    pub cards: Vec<CardDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationDetailView {
    pub location: String,
    pub meta: LocationMeta,
    pub cards: Vec<CardDescriptor>,
    pub rows: Vec<DetailRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ViewState {
    Aggregate(AggregateView),
    LocationDetail(LocationDetailView),
    NoData { reason: ViewError },
}

fn scoped(table: &Table, state: &StateFilter) -> Table {
    if table.has(Column::State) {
        filter_by_state(table, state)
    } else {
        table.clone()
    }
}

/// `None` without a State column; the state filter is then bypassed.
pub fn state_filter_options(table: &Table) -> Option<Vec<String>> {
    table.has(Column::State).then(|| {
        std::iter::once(ALL_STATES.to_string())
            .chain(state_options(table))
            .collect()
    })
}

/// Location options come from the state-filtered rows, so switching state
/// prunes them.
pub fn filter_options(table: &Table, state: &StateFilter) -> Result<FilterOptions, ViewError> {
    if !table.has(Column::LocationName) {
        return Err(ViewError::MissingColumn(Column::LocationName));
    }
    let states = state_filter_options(table);
    let locations = std::iter::once(OVERALL_SUMMARY.to_string())
        .chain(location_options(&scoped(table, state)))
        .collect();
    Ok(FilterOptions { states, locations })
}

fn detail_rows(table: &Table, location: &str) -> Vec<DetailRow> {
    let has_status = table.has(Column::Status);
    table
        .records()
        .iter()
        .filter(|r| r.location_name == location)
        .map(|r| DetailRow {
            hardware_item: r.hardware_item.clone(),
            required_qty: r.required_qty,
            distributed_qty: r.distributed_qty,
            balance_qty: r.balance_qty,
            status: has_status.then(|| r.status.clone()),
            highlight: highlight_status(&r.status),
        })
        .collect()
}

pub fn resolve_view(table: &Table, state: &StateFilter, location: &LocationSelection) -> ViewState {
    debug!(
        rows = table.len(),
        state = state.label(),
        location = location.label(),
        "resolving view"
    );
    if table.is_empty() {
        return ViewState::NoData {
            reason: ViewError::EmptyTable,
        };
    }
    if !table.has(Column::LocationName) {
        return ViewState::NoData {
            reason: ViewError::MissingColumn(Column::LocationName),
        };
    }

    let state_table = scoped(table, state);
    if state_table.is_empty() {
        warn!(state = state.label(), "state filter matched no rows");
        return ViewState::NoData {
            reason: ViewError::NoRows {
                state: state.label().to_string(),
            },
        };
    }

    match location {
        LocationSelection::Summary => ViewState::Aggregate(AggregateView {
            scope: state.label().to_string(),
            courts: aggregate_locations(&state_table),
            cards: cards_for(&aggregate_hardware(&state_table, HardwareScope::Summary)),
        }),
        LocationSelection::Location(name) => {
            let Some(meta) = location_meta(&state_table, name) else {
                warn!(
                    state = state.label(),
                    location = %name,
                    "selected location is not in the filtered rows"
                );
                return ViewState::NoData {
                    reason: ViewError::EmptySelection {
                        location: name.clone(),
                    },
                };
            };
            ViewState::LocationDetail(LocationDetailView {
                location: name.clone(),
                meta,
                cards: cards_for(&aggregate_hardware(
                    &state_table,
                    HardwareScope::Location(name),
                )),
                rows: detail_rows(&state_table, name),
            })
        }
    }
}
