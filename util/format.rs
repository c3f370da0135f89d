/// Format a fraction as a percentage, so `0.0992` becomes `"9.92%"`.
pub fn format_percent(value: f64) -> String {
	format_percent_with_precision(value, 2)
}

pub fn format_percent_with_precision(value: f64, precision: usize) -> String {
	format!("{:.1$}%", value * 100.0, precision)
}

/// Format a value with two decimal places.
pub fn format_number(value: f64) -> String {
	format!("{:.2}", value)
}

/// Format an amount of money in pounds with two decimal places and no grouping, e.g. `"£95.50"`.
pub fn format_pounds(value: f64) -> String {
	if value < 0.0 {
		format!("-£{:.2}", -value)
	} else {
		format!("£{:.2}", value)
	}
}

/// Format an amount of money in whole pounds with thousands separators, e.g. `"£1,250,000"`.
pub fn format_whole_pounds(value: f64) -> String {
	let rounded = value.abs().round();
	let digits = format!("{:.0}", rounded);
	let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
	for (i, c) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			grouped.push(',');
		}
		grouped.push(c);
	}
	if value < 0.0 && rounded != 0.0 {
		format!("-£{}", grouped)
	} else {
		format!("£{}", grouped)
	}
}

#[test]
fn test_format_percent() {
	assert_eq!(format_percent(0.0), "0.00%");
	assert_eq!(format_percent(0.424292), "42.43%");
	assert_eq!(format_percent_with_precision(0.424292, 3), "42.429%");
	assert_eq!(format_percent(1.0), "100.00%");
}

#[test]
fn test_format_pounds() {
	assert_eq!(format_pounds(95.5), "£95.50");
	assert_eq!(format_pounds(120.004), "£120.00");
	assert_eq!(format_pounds(-3.0), "-£3.00");
}

#[test]
fn test_format_whole_pounds() {
	assert_eq!(format_whole_pounds(0.0), "£0");
	assert_eq!(format_whole_pounds(999.4), "£999");
	assert_eq!(format_whole_pounds(1000.0), "£1,000");
	assert_eq!(format_whole_pounds(452_310.62), "£452,311");
	assert_eq!(format_whole_pounds(1_250_000.0), "£1,250,000");
	assert_eq!(format_whole_pounds(-12_345.0), "-£12,345");
}
