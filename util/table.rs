/// A plain text table for terminal output. Column widths are measured in visible chars so that values like `"£95.50"` and colored labels line up.
pub struct Table {
	pub padding: usize,
	pub header: Vec<String>,
	pub rows: Vec<Vec<String>>,
}

impl Table {
	pub fn new(header: Vec<String>) -> Table {
		Table {
			padding: 1,
			header,
			rows: Vec::new(),
		}
	}

	pub fn push_row(&mut self, row: Vec<String>) {
		self.rows.push(row);
	}
}

impl std::fmt::Display for Table {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let n_columns = self.header.len();
		// Size each column to the widest of its header and values.
		let mut column_widths: Vec<usize> = self.header.iter().map(|h| display_width(h)).collect();
		for row in self.rows.iter() {
			for (column_width, value) in column_widths.iter_mut().zip(row.iter()) {
				*column_width = usize::max(*column_width, display_width(value));
			}
		}
		let line = Line {
			column_widths: &column_widths,
			padding: self.padding,
		};
		let row = Row {
			column_widths: &column_widths,
			padding: self.padding,
			values: &self.header,
		};
		writeln!(f, "{}", row)?;
		writeln!(f, "{}", line)?;
		for values in self.rows.iter() {
			let row = Row {
				column_widths: &column_widths[..n_columns.min(values.len())],
				padding: self.padding,
				values,
			};
			writeln!(f, "{}", row)?;
		}
		Ok(())
	}
}

struct Line<'a> {
	column_widths: &'a [usize],
	padding: usize,
}

impl<'a> std::fmt::Display for Line<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "|")?;
		for column_width in self.column_widths.iter() {
			write!(f, "{}|", "-".repeat(column_width + 2 * self.padding))?;
		}
		Ok(())
	}
}

struct Row<'a> {
	column_widths: &'a [usize],
	padding: usize,
	values: &'a [String],
}

impl<'a> std::fmt::Display for Row<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "|")?;
		for (column_width, value) in self.column_widths.iter().zip(self.values) {
			let fill = column_width + self.padding - display_width(value);
			write!(f, "{}{}{}|", " ".repeat(self.padding), value, " ".repeat(fill))?;
		}
		Ok(())
	}
}

/// Count chars, skipping ANSI escape sequences such as the ones terminal colors add.
fn display_width(value: &str) -> usize {
	let mut width = 0;
	let mut chars = value.chars();
	while let Some(c) = chars.next() {
		if c == '\x1b' {
			// Skip to the end of the sequence, which is its first alphabetic char.
			for c in chars.by_ref() {
				if c.is_ascii_alphabetic() {
					break;
				}
			}
		} else {
			width += 1;
		}
	}
	width
}

#[test]
fn test_table() {
	let mut table = Table::new(vec!["MODEL".to_owned(), "RMSE".to_owned()]);
	table.push_row(vec!["CatBoostRegressor".to_owned(), "£95.50".to_owned()]);
	table.push_row(vec!["Ridge".to_owned(), "£120.00".to_owned()]);
	let expected = "\
| MODEL             | RMSE    |
|-------------------|---------|
| CatBoostRegressor | £95.50  |
| Ridge             | £120.00 |
";
	assert_eq!(table.to_string(), expected);
}

#[test]
fn test_table_colored_values() {
	let mut table = Table::new(vec!["RANK".to_owned()]);
	table.push_row(vec!["\x1b[1;32mChampion\x1b[0m".to_owned()]);
	table.push_row(vec!["Archive".to_owned()]);
	let expected = "\
| RANK     |
|----------|
| \x1b[1;32mChampion\x1b[0m |
| Archive  |
";
	assert_eq!(table.to_string(), expected);
}
