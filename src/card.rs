// Formatting of derived quantities into card descriptors and table hints.
use crate::reports::classify_balance;
use crate::types::{CardDescriptor, HardwareAggregate, StatusHighlight};
use crate::util::truncate;

pub fn to_card(
    title: &str,
    distributed_value: f64,
    required_value: f64,
    balance: f64,
) -> CardDescriptor {
    let badge_kind = classify_balance(balance);
    CardDescriptor {
        title: title.to_string(),
        top_value: truncate(distributed_value),
        bottom_value: truncate(required_value),
        badge_kind,
        badge_text: format!("{}: {}", badge_kind, truncate(balance.abs())),
    }
}

/// Cards in the same order as the aggregates they come from.
pub fn cards_for(aggregates: &[HardwareAggregate]) -> Vec<CardDescriptor> {
    aggregates
        .iter()
        .map(|a| to_card(&a.hardware_item, a.distributed_qty, a.required_qty, a.balance_qty))
        .collect()
}

pub fn highlight_status(status: &str) -> StatusHighlight {
    match status {
        "Shortfall" => StatusHighlight::Shortfall,
        "Surplus" => StatusHighlight::Surplus,
        _ => StatusHighlight::None,
    }
}
