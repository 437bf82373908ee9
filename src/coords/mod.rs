use std::sync::OnceLock;

use regex::Regex;

pub const MAPS_BASE_URL: &str = "https://www.google.com/maps";

fn decimal_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([+-]?\d+\.?\d*)").expect("static regex"))
}

fn dms_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(\d+)°(\d+)'(\d+)"([NSEW])"#).expect("static regex"))
}

/// Leading decimal number and whether a degree sign follows it directly.
fn parse_decimal_prefix(value: &str) -> Option<(f64, bool)> {
    let m = decimal_prefix_re().captures(value)?.get(1)?;
    let degree_mark = value[m.end()..].starts_with('°');
    m.as_str().parse::<f64>().ok().map(|v| (v, degree_mark))
}

fn parse_dms(value: &str) -> Option<f64> {
    let caps = dms_re().captures(value)?;
    let degrees: f64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: f64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: f64 = caps.get(3)?.as_str().parse().ok()?;
    let decimal = degrees + minutes / 60.0 + seconds / 3600.0;
    match caps.get(4)?.as_str() {
        "S" | "W" => Some(-decimal),
        _ => Some(decimal),
    }
}

/// Reads a coordinate written either as a leading decimal number (`1.234`,
/// `-0.5 LS`, `1.6775°N`) or as degrees-minutes-seconds (`1°40'39"N`). The
/// decimal form is tried first. When its number runs straight into `°`, a full
/// DMS reading takes precedence, and the plain number is kept if there is none.
pub fn parse_coordinate(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    match parse_decimal_prefix(trimmed) {
        Some((decimal, true)) => parse_dms(trimmed).or(Some(decimal)),
        Some((decimal, false)) => Some(decimal),
        None => parse_dms(trimmed),
    }
}

/// Google Maps link for a latitude/longitude pair, or `None` when either side
/// can't be read.
pub fn to_map_link(lat: &str, lon: &str) -> Option<String> {
    let lat = parse_coordinate(lat)?;
    let lon = parse_coordinate(lon)?;
    Some(format!("{MAPS_BASE_URL}?q={lat},{lon}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_pair_links_verbatim() {
        let link = to_map_link("1.234", "98.765").unwrap();
        assert!(link.contains("1.234,98.765"));
        assert!(link.starts_with("https://www.google.com/maps?q="));
    }

    #[test]
    fn dms_converts_to_decimal() {
        let lat = parse_coordinate("1°40'39\"N").unwrap();
        assert!((lat - 1.6775).abs() < 1e-9);
        let link = to_map_link("1°40'39\"N", "98°0'0\"E").unwrap();
        assert!(link.contains("?q=1.677"));
        assert!(link.ends_with(",98"));
    }

    #[test]
    fn south_and_west_are_negative() {
        assert!(parse_coordinate("0°30'0\"S").unwrap() < 0.0);
        assert!((parse_coordinate("98°30'0\"W").unwrap() + 98.5).abs() < 1e-9);
    }

    #[test]
    fn decimal_prefix_wins_over_trailing_text() {
        assert_eq!(parse_coordinate("-1.5 LS"), Some(-1.5));
        assert_eq!(parse_coordinate("+2.5"), Some(2.5));
    }

    #[test]
    fn unreadable_pairs_yield_no_link() {
        assert_eq!(to_map_link("", ""), None);
        assert_eq!(to_map_link("1.2", "belum ada"), None);
        assert_eq!(to_map_link("N 1°40'", "98.1"), None);
    }

    #[test]
    fn decimal_with_degree_sign_keeps_its_value() {
        assert_eq!(parse_coordinate("1.6775°N"), Some(1.6775));
        assert_eq!(parse_coordinate("98.8234°"), Some(98.8234));
        assert_eq!(
            to_map_link("1.6775°", "98.8234°").as_deref(),
            Some("https://www.google.com/maps?q=1.6775,98.8234")
        );
        // spaced DMS does not match the DMS grammar, so only the degrees count
        assert_eq!(parse_coordinate("1° 40' 39\" N"), Some(1.0));
    }
}
