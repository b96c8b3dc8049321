//! Trip duration rendering.
//!
//! Providers report departure and arrival timestamps in their own formats;
//! the canonical result carries the wall-clock difference rendered as
//! "HhMMm" (e.g. "2h05m"). Overnight trips simply produce larger hour
//! counts.

use chrono::NaiveDateTime;

/// Render a minute count as "HhMMm". Negative inputs clamp to zero:
/// a provider reporting an arrival before its departure is data noise,
/// not something to render as a negative duration.
pub fn format_minutes(total_minutes: i64) -> String {
    let total = total_minutes.max(0);
    format!("{}h{:02}m", total / 60, total % 60)
}

/// Wall-clock difference between two timestamps, rendered as "HhMMm".
pub fn duration_between(departure: NaiveDateTime, arrival: NaiveDateTime) -> String {
    format_minutes((arrival - departure).num_minutes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn formats_hours_and_padded_minutes() {
        assert_eq!(format_minutes(125), "2h05m");
        assert_eq!(format_minutes(59), "0h59m");
        assert_eq!(format_minutes(600), "10h00m");
        assert_eq!(format_minutes(0), "0h00m");
    }

    #[test]
    fn negative_clamps_to_zero() {
        assert_eq!(format_minutes(-10), "0h00m");
    }

    #[test]
    fn wall_clock_difference() {
        assert_eq!(duration_between(at(10, 0), at(12, 5)), "2h05m");
        assert_eq!(duration_between(at(8, 30), at(8, 30)), "0h00m");
    }

    #[test]
    fn overnight_difference() {
        let dep = at(23, 30);
        let arr = NaiveDate::from_ymd_opt(2024, 3, 16)
            .unwrap()
            .and_hms_opt(6, 15, 0)
            .unwrap();
        assert_eq!(duration_between(dep, arr), "6h45m");
    }
}
