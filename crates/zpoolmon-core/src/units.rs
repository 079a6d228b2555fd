use crate::error::FormatError;

const UNITS: [char; 6] = ['B', 'K', 'M', 'G', 'T', 'P'];

/// Render a byte count with a binary unit suffix and two decimals ("2.00G").
///
/// Zero is the literal `"0B"`. Values past the petabyte range stay in "P".
pub fn to_human(bytes: f64) -> String {
    if !bytes.is_finite() || bytes <= 0.0 {
        return "0B".to_string();
    }

    let index = bytes.log(1024.0).floor().clamp(0.0, (UNITS.len() - 1) as f64) as usize;
    let scaled = bytes / 1024_f64.powi(index as i32);

    format!("{scaled:.2}{}", UNITS[index])
}

pub fn human_bytes(bytes: u64) -> String {
    to_human(bytes as f64)
}

/// Parse `<number><unit>` back into bytes. Lossy inverse of [`to_human`].
pub fn from_human(input: &str) -> Result<f64, FormatError> {
    let split = input
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .ok_or_else(|| FormatError::Size(input.to_string()))?;
    let (number, suffix) = input.split_at(split);

    if !is_plain_decimal(number) || suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(FormatError::Size(input.to_string()));
    }

    let mut letters = suffix.chars();
    let unit = match (letters.next(), letters.next()) {
        (Some(letter), None) => UNITS.iter().position(|u| *u == letter),
        _ => None,
    };
    let Some(index) = unit else {
        return Err(FormatError::UnitSuffix {
            input: input.to_string(),
            suffix: suffix.to_string(),
        });
    };

    let value: f64 = number
        .parse()
        .map_err(|_| FormatError::Size(input.to_string()))?;

    Ok(value * 1024_f64.powi(index as i32))
}

// Digits, then optionally a single '.' followed by more digits ("10", "10.", "2.50").
fn is_plain_decimal(s: &str) -> bool {
    let mut parts = s.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();

    !whole.is_empty()
        && whole.chars().all(|c| c.is_ascii_digit())
        && fraction.chars().all(|c| c.is_ascii_digit())
}

/// Format seconds as `H:MM:SS`, prefixed with a day count once it exceeds 24h.
pub fn format_duration(seconds: u64) -> String {
    let days = seconds / 86_400;
    let rest = seconds % 86_400;
    let clock = format!("{}:{:02}:{:02}", rest / 3600, (rest % 3600) / 60, rest % 60);

    match days {
        0 => clock,
        1 => format!("1 day, {clock}"),
        n => format!("{n} days, {clock}"),
    }
}
