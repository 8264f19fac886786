// Console display sink: prints selector options, metrics, cards and the
// detail table as Markdown tables, or the whole view as JSON.
use crate::types::{
    BadgeKind, CardDescriptor, CardRow, DetailRow, DetailTableRow, DetailTableRowNoStatus,
    LocationAggregate, MetricsRow, StatusHighlight,
};
use crate::util::{format_int, format_qty, truncate};
use crate::view::{AggregateView, LocationDetailView, ViewState};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

pub fn print_table<T>(rows: &[T])
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(rows.to_vec()).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{}", s);
    Ok(())
}

/// Print a numbered option list; index 1 is the first option.
pub fn print_options(title: &str, options: &[String], current: &str) {
    println!("{}", title);
    for (idx, option) in options.iter().enumerate() {
        let marker = if option == current { " *" } else { "" };
        println!("[{}] {}{}", idx + 1, option, marker);
    }
    println!();
}

fn badge_marker(kind: BadgeKind) -> &'static str {
    match kind {
        BadgeKind::Surplus => "+",
        BadgeKind::Shortfall => "!",
        BadgeKind::Balanced => "=",
    }
}

pub fn card_rows(cards: &[CardDescriptor]) -> Vec<CardRow> {
    cards
        .iter()
        .map(|c| CardRow {
            title: c.title.clone(),
            values: format!("{} / {}", format_int(c.top_value), format_int(c.bottom_value)),
            badge: format!("[{}] {}", badge_marker(c.badge_kind), c.badge_text),
        })
        .collect()
}

fn metrics_row(courts: &LocationAggregate) -> MetricsRow {
    MetricsRow {
        total: format_int(truncate(courts.courts_total)),
        regular: format_int(truncate(courts.courts_regular)),
        family: format_int(truncate(courts.courts_family)),
        tjo: format_int(truncate(courts.courts_tjo)),
    }
}

/// Status text with its highlight hint, e.g. `>> Shortfall <<`.
pub fn highlighted(status: &str, highlight: StatusHighlight) -> String {
    match highlight {
        StatusHighlight::Shortfall => format!(">> {} <<", status),
        StatusHighlight::Surplus => format!("++ {} ++", status),
        StatusHighlight::None => status.to_string(),
    }
}

fn print_detail_table(rows: &[DetailRow]) {
    if rows.iter().all(|r| r.status.is_some()) {
        let rows: Vec<DetailTableRow> = rows
            .iter()
            .map(|r| DetailTableRow {
                hardware_item: r.hardware_item.clone(),
                required_qty: format_qty(r.required_qty),
                distributed_qty: format_qty(r.distributed_qty),
                balance_qty: format_qty(r.balance_qty),
                status: highlighted(r.status.as_deref().unwrap_or_default(), r.highlight),
            })
            .collect();
        print_table(&rows);
    } else {
        let rows: Vec<DetailTableRowNoStatus> = rows
            .iter()
            .map(|r| DetailTableRowNoStatus {
                hardware_item: r.hardware_item.clone(),
                required_qty: format_qty(r.required_qty),
                distributed_qty: format_qty(r.distributed_qty),
                balance_qty: format_qty(r.balance_qty),
            })
            .collect();
        print_table(&rows);
    }
}

fn render_aggregate(view: &AggregateView) {
    println!("Aggregated Status: {}\n", view.scope);
    print_table(&[metrics_row(&view.courts)]);
    println!("Hardware Breakdown\n");
    print_table(&card_rows(&view.cards));
}

fn render_location(view: &LocationDetailView) {
    let meta = &view.meta;
    let location_type = if meta.location_type.is_empty() {
        "N/A"
    } else {
        meta.location_type.as_str()
    };
    println!(
        "Type: {} | Total Cts: {} | Reg. Courts: {} | Family Cts: {} | TJOs: {}\n",
        location_type,
        format_int(meta.courts_total),
        format_int(meta.courts_regular),
        format_int(meta.courts_family),
        format_int(meta.courts_tjo)
    );
    println!("Hardware Status: {}\n", view.location);
    print_table(&card_rows(&view.cards));
    println!("Detailed Data\n");
    print_detail_table(&view.rows);
}

pub fn render_view(view: &ViewState) {
    match view {
        ViewState::Aggregate(v) => render_aggregate(v),
        ViewState::LocationDetail(v) => render_location(v),
        ViewState::NoData { reason } => println!("Error: {}\n", reason),
    }
}
