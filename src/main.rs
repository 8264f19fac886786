// Entry point and interactive menu flow.
//
// - The password gate runs first; nothing else is shown until it opens.
// - The inventory is loaded once per session and cached.
// - Every "Show Dashboard" recomputes the view from the cached table using
//   the current state and location selections.
mod auth;
mod card;
mod config;
mod error;
mod loader;
mod output;
mod reports;
mod telemetry;
mod types;
mod util;
mod view;

use auth::SessionGate;
use config::AppConfig;
use loader::TableCache;
use once_cell::sync::Lazy;
use reports::StateFilter;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};
use types::Table;
use view::{LocationSelection, ViewState};

// Process-wide session. One process serves exactly one session, so the
// mutex only guards against accidental reentry, never contention.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { session: None }));

struct AppState {
    session: Option<Session>,
}

struct Session {
    gate: SessionGate,
    cache: TableCache,
    state: StateFilter,
    location: LocationSelection,
}

fn with_session<R>(f: impl FnOnce(&mut Session) -> R) -> Option<R> {
    let mut app = APP_STATE.lock().unwrap_or_else(PoisonError::into_inner);
    app.session.as_mut().map(f)
}

/// Print `prompt` and read one trimmed line. `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn read_choice() -> Option<String> {
    read_line("Enter choice: ")
}

/// Ask for the password until it matches. Returns `false` if input ends.
fn run_gate() -> bool {
    loop {
        let Some(value) = read_line("Please enter the dashboard password: ") else {
            return false;
        };
        let (authorized, notice) = with_session(|s| {
            s.gate.submit_credential(&value);
            (s.gate.is_authorized(), s.gate.notice())
        })
        .unwrap_or((false, None));
        if authorized {
            println!();
            return true;
        }
        if let Some(notice) = notice {
            println!("{}\n", notice);
        }
    }
}

/// Load the inventory on first use and print what the cleaning pass did.
///
/// A failed load is reported and the session carries on with an empty
/// table; the next request tries the source again.
fn current_table() -> Arc<Table> {
    let loaded = with_session(|s| {
        let fresh = !s.cache.is_loaded();
        let result = s.cache.get_or_load();
        if fresh {
            if let (Ok(_), Some(report)) = (&result, s.cache.report()) {
                println!(
                    "Processing dataset... ({} rows loaded at {})",
                    util::format_int(report.rows),
                    report.loaded_at.format("%Y-%m-%d %H:%M:%S")
                );
                if !report.missing_columns.is_empty() {
                    let names: Vec<&str> = report.missing_columns.iter().map(|c| c.header()).collect();
                    println!("Note: missing columns: {}", names.join(", "));
                }
                if report.coerced_cells > 0 {
                    println!(
                        "Note: {} non-numeric cells counted as 0.",
                        util::format_int(report.coerced_cells)
                    );
                }
                println!(
                    "Info: filled {} state and {} division cells from the rows above.\n",
                    util::format_int(report.filled_states),
                    util::format_int(report.filled_divisions)
                );
            }
        }
        result.map_err(|e| (e, s.cache.path().to_path_buf()))
    });

    match loaded {
        Some(Ok(table)) => table,
        Some(Err((e, path))) => {
            eprintln!("Error loading data: {}", e);
            println!(
                "Could not load data. Please ensure '{}' is in the folder.\n",
                path.display()
            );
            Arc::new(Table::default())
        }
        None => Arc::new(Table::default()),
    }
}

fn selections() -> (StateFilter, LocationSelection) {
    with_session(|s| (s.state.clone(), s.location.clone()))
        .unwrap_or((StateFilter::All, LocationSelection::Summary))
}

/// Read a 1-based option number.
fn choose_option(options: &[String]) -> Option<usize> {
    let choice = read_choice()?;
    match choice.parse::<usize>() {
        Ok(n) if (1..=options.len()).contains(&n) => Some(n - 1),
        _ => {
            println!("Invalid choice. Please enter a number from 1 to {}.\n", options.len());
            None
        }
    }
}

fn handle_select_state() {
    let table = current_table();
    let (state, _) = selections();
    let Some(states) = view::state_filter_options(&table) else {
        println!("This source has no State column; showing all rows.\n");
        return;
    };
    output::print_options("Select State", &states, state.label());
    let Some(idx) = choose_option(&states) else {
        return;
    };
    let selected = if idx == 0 {
        StateFilter::All
    } else {
        StateFilter::Only(states[idx].clone())
    };
    // The location selection is kept; a location missing from the new
    // state is reported when the dashboard is shown.
    with_session(|s| s.state = selected);
}

fn handle_select_location() {
    let table = current_table();
    let (state, location) = selections();
    let options = match view::filter_options(&table, &state) {
        Ok(options) => options,
        Err(e) => {
            println!("Error: {}\n", e);
            return;
        }
    };
    output::print_options("Select Location", &options.locations, location.label());
    let Some(idx) = choose_option(&options.locations) else {
        return;
    };
    let selected = if idx == 0 {
        LocationSelection::Summary
    } else {
        LocationSelection::Location(options.locations[idx].clone())
    };
    with_session(|s| s.location = selected);
}

fn handle_show(as_json: bool) {
    let table = current_table();
    let (state, location) = selections();
    let view: ViewState = view::resolve_view(&table, &state, &location);
    if as_json {
        if let Err(e) = output::print_json(&view) {
            eprintln!("Write error: {}", e);
        }
        println!();
    } else {
        output::render_view(&view);
    }
}

fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    telemetry::init_tracing(&config.telemetry.log_level, config.telemetry.json);

    {
        let mut app = APP_STATE.lock().unwrap_or_else(PoisonError::into_inner);
        app.session = Some(Session {
            gate: SessionGate::new(config.auth.password),
            cache: TableCache::new(config.data.path, config.data.sheet),
            state: StateFilter::All,
            location: LocationSelection::Summary,
        });
    }

    println!("Court Hardware Inventory Dashboard\n");
    if !run_gate() {
        println!("Exiting the program.");
        return;
    }
    current_table();

    loop {
        let (state, location) = selections();
        println!("[1] Select State (current: {})", state.label());
        println!("[2] Select Location (current: {})", location.label());
        println!("[3] Show Dashboard");
        println!("[4] Show Dashboard as JSON");
        println!("[5] Exit\n");
        let Some(choice) = read_choice() else {
            println!("Exiting the program.");
            break;
        };
        match choice.as_str() {
            "1" => handle_select_state(),
            "2" => handle_select_location(),
            "3" => {
                println!();
                handle_show(false);
            }
            "4" => handle_show(true),
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1 to 5.\n"),
        }
    }
}
