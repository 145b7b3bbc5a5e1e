/// Parse and validate a debounce delay in milliseconds.
///
/// Accepts `0..=10000`; larger delays make watch mode feel unresponsive.
///
/// # Errors
///
/// Returns an error message for non-numeric or out-of-range values.
pub fn parse_debounce(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Debounce must be a number of milliseconds: '{}'", s))?;

    if value > 10_000 {
        return Err(format!("Debounce must be at most 10000ms, got {}", value));
    }

    Ok(value)
}
