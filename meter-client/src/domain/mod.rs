mod bill;
mod log_entry;
mod meter_reading;

pub use bill::{Bill, PaymentStatus};
pub use log_entry::LogEntry;
pub use meter_reading::MeterReading;

use time::{OffsetDateTime, UtcOffset};

/// Formats an instant as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
///
/// Fixed width and always UTC, so stored timestamps sort lexicographically.
pub fn iso_timestamp(at: OffsetDateTime) -> String {
    let at = at.to_offset(UtcOffset::UTC);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second(),
        at.millisecond()
    )
}

/// Calendar date part (`YYYY-MM-DD`) of an instant, in UTC.
pub fn iso_date(at: OffsetDateTime) -> String {
    let at = at.to_offset(UtcOffset::UTC);
    format!("{:04}-{:02}-{:02}", at.year(), u8::from(at.month()), at.day())
}
