use std::convert::Infallible;

/// Entry that ends city input, matched case-insensitively.
pub const DONE_SENTINEL: &str = "done";

/// Collects city names from raw input lines.
///
/// Lines are trimmed, blanks are skipped, and collection stops at the
/// sentinel or when the source runs dry.
pub fn collect_cities<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut lines = lines.into_iter();
    let collected = try_collect_cities(|| {
        Ok::<_, Infallible>(lines.next().map(|line| line.as_ref().to_string()))
    });
    match collected {
        Ok(cities) => cities,
        Err(never) => match never {},
    }
}

/// Like [`collect_cities`], for sources that can fail.
///
/// `next_line` yields `Ok(None)` at end of input. The first error stops
/// collection and is returned as-is, dropping anything collected so far.
pub fn try_collect_cities<F, E>(mut next_line: F) -> Result<Vec<String>, E>
where
    F: FnMut() -> Result<Option<String>, E>,
{
    let mut cities = Vec::new();
    while let Some(line) = next_line()? {
        let city = line.trim();
        if city.eq_ignore_ascii_case(DONE_SENTINEL) {
            break;
        }
        if !city.is_empty() {
            cities.push(city.to_string());
        }
    }
    Ok(cities)
}
