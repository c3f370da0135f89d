use chrono::prelude::*;

/// The timestamp shown on run cards and used as the label on chart points.
pub fn format_readable(date: DateTime<Utc>) -> String {
	date.format("%d %b %Y, %H:%M").to_string()
}

pub fn format_readable_or_unknown(date: Option<DateTime<Utc>>) -> String {
	date.map(format_readable)
		.unwrap_or_else(|| "Unknown time".to_owned())
}

#[test]
fn test_format_readable() {
	let date = Utc.ymd(2024, 3, 1).and_hms(9, 5, 0);
	assert_eq!(format_readable(date), "01 Mar 2024, 09:05");
	assert_eq!(format_readable_or_unknown(None), "Unknown time");
}
