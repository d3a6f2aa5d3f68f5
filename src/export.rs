//! CSV and JSON rendering of reservation listings, shared by the CLI menu
//! (file export) and the HTTP adapter (download endpoints).

use std::io::Write;

use crate::model::Reservation;

/// Serialize reservations as CSV with an
/// `id,room_id,date,start_time,end_time` header row. The header is written
/// explicitly so an empty listing still yields a well-formed file.
pub fn write_csv<W: Write>(out: W, reservations: &[Reservation]) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(["id", "room_id", "date", "start_time", "end_time"])?;
    for r in reservations {
        writer.serialize(r)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_csv(reservations: &[Reservation]) -> Result<Vec<u8>, csv::Error> {
    let mut buf = Vec::new();
    write_csv(&mut buf, reservations)?;
    Ok(buf)
}

/// Serialize reservations as pretty-printed JSON.
pub fn to_json(reservations: &[Reservation]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reservations)
}
