//! Server-rendered HTML overview page. Deliberately framework-free: the page
//! is two tables and a stylesheet, built with escaped string pushes.

use crate::model::{Reservation, Room};

/// Escape text for interpolation into HTML element content.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "\
body{font-family:sans-serif;margin:2rem;color:#222}\
h1{margin-bottom:0}\
h2{margin-top:2rem}\
table{border-collapse:collapse;min-width:30rem}\
th,td{border:1px solid #bbb;padding:.35rem .7rem;text-align:left}\
th{background:#eee}\
p.empty{color:#777;font-style:italic}";

pub fn home_page(rooms: &[Room], reservations: &[Reservation]) -> String {
    let mut page = String::with_capacity(2048);
    page.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
    page.push_str("<title>Reservo</title><style>");
    page.push_str(STYLE);
    page.push_str("</style></head><body><h1>Reservo</h1>");

    page.push_str("<h2>Rooms</h2>");
    if rooms.is_empty() {
        page.push_str("<p class=\"empty\">No rooms registered.</p>");
    } else {
        page.push_str("<table><tr><th>ID</th><th>Name</th><th>Capacity</th></tr>");
        for room in rooms {
            page.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                room.id,
                escape(&room.name),
                room.capacity
            ));
        }
        page.push_str("</table>");
    }

    page.push_str("<h2>Reservations</h2>");
    if reservations.is_empty() {
        page.push_str("<p class=\"empty\">No reservations.</p>");
    } else {
        page.push_str(
            "<table><tr><th>ID</th><th>Room</th><th>Date</th><th>Start</th><th>End</th></tr>",
        );
        for r in reservations {
            page.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                r.id,
                r.room_id,
                r.date,
                r.start.format("%H:%M"),
                r.end.format("%H:%M")
            ));
        }
        page.push_str("</table>");
    }

    page.push_str("</body></html>");
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn escapes_markup_in_room_names() {
        let rooms = vec![Room {
            id: 1,
            name: "<script>alert(1)</script>".to_string(),
            capacity: 5,
        }];
        let page = home_page(&rooms, &[]);
        assert!(!page.contains("<script>alert"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn renders_reservation_rows() {
        let reservations = vec![Reservation {
            id: 7,
            room_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        }];
        let page = home_page(&[], &reservations);
        assert!(page.contains("<td>7</td>"));
        assert!(page.contains("<td>2024-05-01</td>"));
        assert!(page.contains("<td>09:00</td>"));
    }

    #[test]
    fn empty_state_placeholders() {
        let page = home_page(&[], &[]);
        assert!(page.contains("No rooms registered."));
        assert!(page.contains("No reservations."));
    }
}
