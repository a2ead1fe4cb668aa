//! Shared helpers for the whitespace-separated text formats.

use super::error::FormatError;

/// Print a coordinate or value.
///
/// `None` prints the shortest decimal that parses back to the same `f64`,
/// `Some(p)` prints exactly `p` fractional digits.
pub(crate) fn format_decimal(value: f64, precision: Option<usize>) -> String {
    match precision {
        Some(p) => format!("{:.*}", p, value),
        None => value.to_string(),
    }
}

/// Parse one line holding exactly `N` numbers.
///
/// `line_number` is one-based and only used for error reporting.
pub(crate) fn parse_fields<const N: usize>(
    line: &str,
    line_number: usize,
) -> Result<[f64; N], FormatError> {
    let mut fields = [0.0; N];
    let mut tokens = line.split_whitespace();

    for (i, field) in fields.iter_mut().enumerate() {
        let token = tokens.next().ok_or_else(|| {
            FormatError::invalid_line(line_number, format!("expected {} values, found {}", N, i))
        })?;
        *field = token.parse().map_err(|_| {
            FormatError::invalid_line(line_number, format!("'{}' is not a number", token))
        })?;
    }

    if tokens.next().is_some() {
        return Err(FormatError::invalid_line(
            line_number,
            format!("expected {} values, found more", N),
        ));
    }

    Ok(fields)
}

/// Iterate over the non-blank lines of `text` with their one-based numbers.
pub(crate) fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(0.1, None), "0.1");
        assert_eq!(format_decimal(-3.1, Some(3)), "-3.100");
        assert_eq!(format_decimal(48.0, None), "48");
    }

    #[test]
    fn test_parse_fields() {
        let fields: [f64; 3] = parse_fields("1 -2.5\t3e2", 1).unwrap();
        assert_eq!(fields, [1.0, -2.5, 300.0]);

        let short = parse_fields::<3>("1 2", 4);
        assert!(matches!(short, Err(FormatError::InvalidLine { line: 4, .. })));

        let long = parse_fields::<2>("1 2 3", 1);
        assert!(long.is_err());

        let bad = parse_fields::<2>("1 east", 2);
        assert!(matches!(bad, Err(FormatError::InvalidLine { line: 2, .. })));
    }

    #[test]
    fn test_numbered_lines_skip_blanks() {
        let lines: Vec<_> = numbered_lines("a\n\n  b  \n").collect();
        assert_eq!(lines, vec![(1, "a"), (3, "b")]);
    }
}
