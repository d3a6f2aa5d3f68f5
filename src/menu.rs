//! Interactive terminal menu over the booking engine. Blocking stdin loop;
//! engine calls are bridged onto the runtime with `block_on`.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::engine::Engine;
use crate::export;
use crate::model::{self, Slot};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";

const HELP: &str = "\
 1) List rooms
 2) Add room
 3) Update room
 4) Create reservation
 5) Modify reservation
 6) Cancel reservation
 7) View all reservations
 8) View reservations by room
 9) View reservations by date
10) Check room availability
11) List rooms free in a window
12) Export reservations to CSV file
13) Export reservations to JSON file
 h) Help
 q) Quit";

pub fn run(rt: &tokio::runtime::Runtime, engine: Arc<Engine>) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("{BOLD}Reservo{RESET} room-booking manager");
    println!("{HELP}");

    loop {
        print!("{CYAN}> {RESET}");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let choice = line?;

        let result = match choice.trim() {
            "" => continue,
            "1" => list_rooms(rt, &engine),
            "2" => add_room(rt, &engine, &mut lines),
            "3" => update_room(rt, &engine, &mut lines),
            "4" => create_reservation(rt, &engine, &mut lines),
            "5" => modify_reservation(rt, &engine, &mut lines),
            "6" => cancel_reservation(rt, &engine, &mut lines),
            "7" => view_all(rt, &engine),
            "8" => view_by_room(rt, &engine, &mut lines),
            "9" => view_by_date(rt, &engine, &mut lines),
            "10" => check_availability(rt, &engine, &mut lines),
            "11" => free_rooms(rt, &engine, &mut lines),
            "12" => export_csv(rt, &engine, &mut lines),
            "13" => export_json(rt, &engine, &mut lines),
            "h" | "?" => {
                println!("{HELP}");
                Ok(())
            }
            "q" => break,
            other => {
                println!("{RED}unknown option {other:?} (h for help){RESET}");
                Ok(())
            }
        };

        match result {
            Ok(()) => {}
            Err(MenuError::Io(e)) => return Err(e),
            Err(MenuError::Aborted(msg)) => println!("{RED}{msg}{RESET}"),
        }
    }

    println!("bye");
    Ok(())
}

enum MenuError {
    Io(io::Error),
    /// Bad input or an engine rejection. The loop continues.
    Aborted(String),
}

impl From<io::Error> for MenuError {
    fn from(e: io::Error) -> Self {
        MenuError::Io(e)
    }
}

impl From<crate::engine::EngineError> for MenuError {
    fn from(e: crate::engine::EngineError) -> Self {
        MenuError::Aborted(e.to_string())
    }
}

type Lines<'a> = io::Lines<io::StdinLock<'a>>;

fn prompt(lines: &mut Lines, label: &str) -> Result<String, MenuError> {
    print!("{label}: ");
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(line?.trim().to_string()),
        None => Err(MenuError::Aborted("input closed".to_string())),
    }
}

fn prompt_u64(lines: &mut Lines, label: &str) -> Result<u64, MenuError> {
    let raw = prompt(lines, label)?;
    raw.parse()
        .map_err(|_| MenuError::Aborted(format!("not a number: {raw:?}")))
}

fn prompt_u32(lines: &mut Lines, label: &str) -> Result<u32, MenuError> {
    let raw = prompt(lines, label)?;
    raw.parse()
        .map_err(|_| MenuError::Aborted(format!("not a number: {raw:?}")))
}

fn prompt_date(lines: &mut Lines, label: &str) -> Result<chrono::NaiveDate, MenuError> {
    let raw = prompt(lines, label)?;
    model::parse_date(&raw)
        .ok_or_else(|| MenuError::Aborted(format!("invalid date {raw:?}, expected YYYY-MM-DD")))
}

fn prompt_slot(lines: &mut Lines) -> Result<Slot, MenuError> {
    let start = prompt_time(lines, "start time (HH:MM)")?;
    let end = prompt_time(lines, "end time (HH:MM)")?;
    if start >= end {
        return Err(MenuError::Aborted(format!(
            "start time {start} must precede end time {end}"
        )));
    }
    Ok(Slot::new(start, end))
}

fn prompt_time(lines: &mut Lines, label: &str) -> Result<chrono::NaiveTime, MenuError> {
    let raw = prompt(lines, label)?;
    model::parse_time_of_day(&raw)
        .ok_or_else(|| MenuError::Aborted(format!("invalid time {raw:?}, expected HH:MM[:SS]")))
}

fn print_reservations(reservations: &[model::Reservation]) {
    if reservations.is_empty() {
        println!("(none)");
        return;
    }
    println!("{BOLD}{:>5}  {:>5}  {:10}  {:5}  {:5}{RESET}", "id", "room", "date", "start", "end");
    for r in reservations {
        println!(
            "{:>5}  {:>5}  {}  {}  {}",
            r.id,
            r.room_id,
            r.date,
            r.start.format("%H:%M"),
            r.end.format("%H:%M")
        );
    }
}

fn print_rooms(rooms: &[model::Room]) {
    if rooms.is_empty() {
        println!("(none)");
        return;
    }
    println!("{BOLD}{:>5}  {:24}  {:>8}{RESET}", "id", "name", "capacity");
    for room in rooms {
        println!("{:>5}  {:24}  {:>8}", room.id, room.name, room.capacity);
    }
}

// ── Actions ──────────────────────────────────────────────

fn list_rooms(rt: &tokio::runtime::Runtime, engine: &Engine) -> Result<(), MenuError> {
    print_rooms(&rt.block_on(engine.list_rooms()));
    Ok(())
}

fn add_room(rt: &tokio::runtime::Runtime, engine: &Engine, lines: &mut Lines) -> Result<(), MenuError> {
    let name = prompt(lines, "room name")?;
    let capacity = prompt_u32(lines, "capacity")?;
    let id = rt.block_on(engine.add_room(name, capacity))?;
    println!("{GREEN}room {id} added{RESET}");
    Ok(())
}

fn update_room(rt: &tokio::runtime::Runtime, engine: &Engine, lines: &mut Lines) -> Result<(), MenuError> {
    let id = prompt_u64(lines, "room id")?;
    let name = prompt(lines, "new name (blank keeps current)")?;
    let capacity_raw = prompt(lines, "new capacity (blank or 0 keeps current)")?;

    let name = (!name.is_empty()).then_some(name);
    let capacity = if capacity_raw.is_empty() {
        None
    } else {
        Some(
            capacity_raw
                .parse()
                .map_err(|_| MenuError::Aborted(format!("not a number: {capacity_raw:?}")))?,
        )
    };

    rt.block_on(engine.update_room(id, name, capacity))?;
    println!("{GREEN}room {id} updated{RESET}");
    Ok(())
}

fn create_reservation(
    rt: &tokio::runtime::Runtime,
    engine: &Engine,
    lines: &mut Lines,
) -> Result<(), MenuError> {
    let room_id = prompt_u64(lines, "room id")?;
    let date = prompt_date(lines, "date (YYYY-MM-DD)")?;
    let slot = prompt_slot(lines)?;
    let id = rt.block_on(engine.create_reservation(room_id, date, slot))?;
    println!("{GREEN}reservation {id} created{RESET}");
    Ok(())
}

fn modify_reservation(
    rt: &tokio::runtime::Runtime,
    engine: &Engine,
    lines: &mut Lines,
) -> Result<(), MenuError> {
    let id = prompt_u64(lines, "reservation id")?;
    let room_id = prompt_u64(lines, "room id")?;
    let date = prompt_date(lines, "date (YYYY-MM-DD)")?;
    let slot = prompt_slot(lines)?;
    rt.block_on(engine.modify_reservation(id, room_id, date, slot))?;
    println!("{GREEN}reservation {id} updated{RESET}");
    Ok(())
}

fn cancel_reservation(
    rt: &tokio::runtime::Runtime,
    engine: &Engine,
    lines: &mut Lines,
) -> Result<(), MenuError> {
    let id = prompt_u64(lines, "reservation id")?;
    rt.block_on(engine.cancel_reservation(id))?;
    println!("{GREEN}reservation {id} cancelled{RESET}");
    Ok(())
}

fn view_all(rt: &tokio::runtime::Runtime, engine: &Engine) -> Result<(), MenuError> {
    print_reservations(&rt.block_on(engine.list_reservations()));
    Ok(())
}

fn view_by_room(
    rt: &tokio::runtime::Runtime,
    engine: &Engine,
    lines: &mut Lines,
) -> Result<(), MenuError> {
    let room_id = prompt_u64(lines, "room id")?;
    let reservations = rt.block_on(engine.reservations_by_room(room_id))?;
    print_reservations(&reservations);
    Ok(())
}

fn view_by_date(
    rt: &tokio::runtime::Runtime,
    engine: &Engine,
    lines: &mut Lines,
) -> Result<(), MenuError> {
    let date = prompt_date(lines, "date (YYYY-MM-DD)")?;
    print_reservations(&rt.block_on(engine.reservations_by_date(date)));
    Ok(())
}

fn check_availability(
    rt: &tokio::runtime::Runtime,
    engine: &Engine,
    lines: &mut Lines,
) -> Result<(), MenuError> {
    let room_id = prompt_u64(lines, "room id")?;
    let date = prompt_date(lines, "date (YYYY-MM-DD)")?;
    let slot = prompt_slot(lines)?;
    if rt.block_on(engine.check_availability(room_id, date, slot, None))? {
        println!("{GREEN}available{RESET}");
    } else {
        println!("{RED}not available{RESET}");
    }
    Ok(())
}

fn free_rooms(
    rt: &tokio::runtime::Runtime,
    engine: &Engine,
    lines: &mut Lines,
) -> Result<(), MenuError> {
    let date = prompt_date(lines, "date (YYYY-MM-DD)")?;
    let slot = prompt_slot(lines)?;
    let rooms = rt.block_on(engine.available_rooms(date, slot))?;
    print_rooms(&rooms);
    Ok(())
}

fn export_csv(
    rt: &tokio::runtime::Runtime,
    engine: &Engine,
    lines: &mut Lines,
) -> Result<(), MenuError> {
    let path = prompt(lines, "output file (default reservations.csv)")?;
    let path = if path.is_empty() { "reservations.csv".to_string() } else { path };
    let reservations = rt.block_on(engine.list_reservations());
    let bytes =
        export::to_csv(&reservations).map_err(|e| MenuError::Aborted(e.to_string()))?;
    std::fs::write(&path, bytes)?;
    println!("{GREEN}wrote {} reservations to {path}{RESET}", reservations.len());
    Ok(())
}

fn export_json(
    rt: &tokio::runtime::Runtime,
    engine: &Engine,
    lines: &mut Lines,
) -> Result<(), MenuError> {
    let path = prompt(lines, "output file (default reservations.json)")?;
    let path = if path.is_empty() { "reservations.json".to_string() } else { path };
    let reservations = rt.block_on(engine.list_reservations());
    let json =
        export::to_json(&reservations).map_err(|e| MenuError::Aborted(e.to_string()))?;
    std::fs::write(&path, json)?;
    println!("{GREEN}wrote {} reservations to {path}{RESET}", reservations.len());
    Ok(())
}
