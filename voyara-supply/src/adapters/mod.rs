mod mock;
mod skyhop;
mod tripgate;

pub use mock::MockAdapter;
pub use skyhop::SkyhopAdapter;
pub use tripgate::TripgateAdapter;

pub const MOCK: &str = "mock";
pub const SKYHOP: &str = "skyhop";
pub const TRIPGATE: &str = "tripgate";

/// Parse an ISO-8601 duration of the `PT5H30M` family into minutes.
/// Day components (`P1DT2H`) are folded in; seconds are ignored.
pub(crate) fn parse_iso8601_duration(value: &str) -> Option<u32> {
    let rest = value.strip_prefix('P')?;
    let (days_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, t),
        None => (rest, ""),
    };

    let mut minutes: u32 = 0;
    if !days_part.is_empty() {
        let days: u32 = days_part.strip_suffix('D')?.parse().ok()?;
        minutes += days * 24 * 60;
    }

    let mut number = String::new();
    for ch in time_part.chars() {
        if ch.is_ascii_digit() {
            number.push(ch);
        } else {
            let n: u32 = number.parse().ok()?;
            number.clear();
            match ch {
                'H' => minutes += n * 60,
                'M' => minutes += n,
                'S' => {}
                _ => return None,
            }
        }
    }
    if !number.is_empty() {
        // Trailing digits without a unit designator
        return None;
    }
    Some(minutes)
}

pub(crate) fn format_duration_minutes(minutes: u32) -> String {
    format!("PT{}H{}M", minutes / 60, minutes % 60)
}

/// Accept both canonical (`skyhop-ord_1`) and native (`ord_1`) ids at the
/// adapter boundary, so callers holding either form can book or cancel.
pub(crate) fn strip_supplier_prefix<'a>(id: &'a str, supplier: &str) -> &'a str {
    id.strip_prefix(supplier)
        .and_then(|rest| rest.strip_prefix('-'))
        .unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso8601_duration() {
        assert_eq!(parse_iso8601_duration("PT2H30M"), Some(150));
        assert_eq!(parse_iso8601_duration("PT45M"), Some(45));
        assert_eq!(parse_iso8601_duration("PT11H"), Some(660));
        assert_eq!(parse_iso8601_duration("P1DT2H5M"), Some(1565));
        assert_eq!(parse_iso8601_duration("PT1H30M10S"), Some(90));
        assert_eq!(parse_iso8601_duration("2h30m"), None);
        assert_eq!(parse_iso8601_duration("PT90"), None);
    }

    #[test]
    fn test_format_duration_minutes() {
        assert_eq!(format_duration_minutes(150), "PT2H30M");
        assert_eq!(format_duration_minutes(45), "PT0H45M");
    }

    #[test]
    fn test_strip_supplier_prefix() {
        assert_eq!(strip_supplier_prefix("skyhop-off_1", "skyhop"), "off_1");
        assert_eq!(strip_supplier_prefix("off_1", "skyhop"), "off_1");
        // Different supplier's prefix is left alone
        assert_eq!(strip_supplier_prefix("tripgate-ABC123", "skyhop"), "tripgate-ABC123");
    }
}
