//! ## Printing Module
//!
//! Coloured terminal logging for the dispatch core. Every level has its own prefix and
//! colour and can be switched off through the matching `config::PRINT_*_ON` toggle.
//! It also renders a table of all cars for the console front-end.
use std::sync::Mutex;

use ansi_term::Colour::{self, Cyan, Green, Purple, Red, Yellow};
use prettytable::{format, Cell, Row, Table};
use unicode_width::UnicodeWidthStr;

use crate::config;
use crate::snapshot::{Dirn, ElevatorBehaviour, ElevatorSnapshot};

/// Reads a print toggle. A poisoned toggle counts as enabled.
fn enabled(toggle: &Mutex<bool>) -> bool {
    toggle.lock().map(|on| *on).unwrap_or(true)
}

/// Prints a message in a specified color to the terminal.
///
/// If `PRINT_ELSE_ON` is `false`, the message will not be printed.
///
/// ## Parameters
/// - `msg`: The message to print.
/// - `color`: The color to use for the text output.
///
/// ## Example
/// ```
/// use ansi_term::Colour;
/// use elevatordispatch::print;
///
/// print::color("Hello, World!".to_string(), Colour::Green);
/// ```
pub fn color(msg: String, color: Colour) {
    if enabled(&config::PRINT_ELSE_ON) {
        println!("{}{}\n", color.paint("[CUSTOM]:  "), color.paint(msg));
    }
}

/// Prints an error message in red to the terminal.
///
/// If `PRINT_ERR_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[ERROR\]:   {}", msg
///
/// ## Example
/// ```
/// use elevatordispatch::print;
///
/// print::err("Something went wrong!".to_string());
/// ```
pub fn err(msg: String) {
    if enabled(&config::PRINT_ERR_ON) {
        println!("{}{}\n", Red.paint("[ERROR]:   "), Red.paint(msg));
    }
}

/// Prints a warning message in yellow to the terminal.
///
/// If `PRINT_WARN_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[WARNING\]: {}", msg
pub fn warn(msg: String) {
    if enabled(&config::PRINT_WARN_ON) {
        println!("{}{}\n", Yellow.paint("[WARNING]: "), Yellow.paint(msg));
    }
}

/// Prints a success message in green to the terminal.
///
/// If `PRINT_OK_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[OK\]:      {}", msg
pub fn ok(msg: String) {
    if enabled(&config::PRINT_OK_ON) {
        println!("{}{}\n", Green.paint("[OK]:      "), Green.paint(msg));
    }
}

/// Prints an informational message in light blue to the terminal.
///
/// If `PRINT_INFO_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[INFO\]:    {}", msg
pub fn info(msg: String) {
    let light_blue = Colour::RGB(102, 178, 255);
    if enabled(&config::PRINT_INFO_ON) {
        println!("{}{}\n", light_blue.paint("[INFO]:    "), light_blue.paint(msg));
    }
}

/// Pads the input text to a fixed display width using spaces.
///
/// Accounts for characters that take more than one column (e.g. arrows and other Unicode
/// symbols), so table cells stay aligned.
pub fn pad_text(text: &str, width: usize) -> String {
    let visible_width = UnicodeWidthStr::width(text);
    let padding = width.saturating_sub(visible_width);
    format!("{}{}", text, " ".repeat(padding))
}

/// Short label for a car's direction and phase.
pub fn status_label(dirn: Dirn, behaviour: ElevatorBehaviour) -> String {
    match (dirn, behaviour) {
        (_, ElevatorBehaviour::DoorOpen) => "Door open".to_string(),
        (Dirn::Up, ElevatorBehaviour::Moving) => "↑ Moving".to_string(),
        (Dirn::Down, ElevatorBehaviour::Moving) => "↓ Moving".to_string(),
        (Dirn::Idle, _) => "Idle".to_string(),
        (_, _) => "Stopped".to_string(),
    }
}

fn floor_list(floors: &[crate::elevator_logic::Floor]) -> String {
    if floors.is_empty() {
        return "-".to_string();
    }
    floors.iter().map(|f| f.to_string()).collect::<Vec<_>>().join(" ")
}

/// Renders all car snapshots as a box table.
///
/// Columns: id, floor, status, target, pending up-stops, pending down-stops, deferred calls.
pub fn car_table(snapshots: &[ElevatorSnapshot]) -> String {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(Row::new(
        ["Car", "Floor", "Status", "Target", "Up", "Down", "Waiting"]
            .iter()
            .map(|title| Cell::new(title).style_spec("b"))
            .collect(),
    ));

    for snap in snapshots {
        let target = snap.target.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string());
        table.add_row(Row::new(vec![
            Cell::new(&snap.car_id.to_string()),
            Cell::new(&snap.current_floor.to_string()),
            Cell::new(&pad_text(&status_label(snap.dirn, snap.behaviour), 10)),
            Cell::new(&target),
            Cell::new(&floor_list(&snap.up_requests)),
            Cell::new(&floor_list(&snap.down_requests)),
            Cell::new(&floor_list(&snap.deferred_calls)),
        ]));
    }
    table.to_string()
}

/// Prints the car table under a heading. Gated by `PRINT_ELSE_ON`.
pub fn cars(snapshots: &[ElevatorSnapshot]) {
    if !enabled(&config::PRINT_ELSE_ON) {
        return;
    }
    println!("{}", Purple.bold().paint("┌────────────────────────────────┐"));
    println!("{}", Purple.bold().paint("│          CAR STATUS            │"));
    println!("{}", Purple.bold().paint("└────────────────────────────────┘"));
    println!("{}", car_table(snapshots));
}

/// Start-up banner with the served floor range and number of cars.
pub fn banner(min_floor: crate::elevator_logic::Floor, max_floor: crate::elevator_logic::Floor, num_cars: u8) {
    println!("{}", Cyan.bold().paint("┌────────────────────────────────┐"));
    println!("{}", Cyan.bold().paint("│       ELEVATOR DISPATCH        │"));
    println!("{}", Cyan.bold().paint("└────────────────────────────────┘"));
    println!("  floors {}..={}, {} car(s)\n", min_floor, max_floor, num_cars);
}
