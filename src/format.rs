use serde::{Deserialize, Serialize};

use crate::error::{CubikError, Result};
use crate::solve::{Solve, SolveStatus, PLUS2_PENALTY_MS};

/// Placeholder for an unavailable statistic
pub const UNAVAILABLE: &str = "—";

/// Display precision of the timer readout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Precision {
    #[serde(rename = "3dp")]
    ThreeDp,
    #[default]
    #[serde(rename = "2dp")]
    TwoDp,
    #[serde(rename = "1dp")]
    OneDp,
    #[serde(rename = "seconds")]
    Seconds,
    /// No live readout while running; final times at 3dp
    #[serde(rename = "no-live")]
    NoLive,
}

impl Precision {
    pub const ALL: [Precision; 5] = [
        Precision::ThreeDp,
        Precision::TwoDp,
        Precision::OneDp,
        Precision::Seconds,
        Precision::NoLive,
    ];

    pub fn dp(&self) -> u8 {
        match self {
            Precision::TwoDp => 2,
            Precision::OneDp => 1,
            Precision::Seconds => 0,
            Precision::ThreeDp | Precision::NoLive => 3,
        }
    }

    /// Stopped times and statistics never show fewer than two decimals
    pub fn at_least_2dp(&self) -> u8 {
        self.dp().max(2)
    }

    pub fn shows_live(&self) -> bool {
        *self != Precision::NoLive
    }

    pub fn label(&self) -> &'static str {
        match self {
            Precision::ThreeDp => "3dp",
            Precision::TwoDp => "2dp",
            Precision::OneDp => "1dp",
            Precision::Seconds => "seconds",
            Precision::NoLive => "no-live",
        }
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|p| p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Formats milliseconds as `s.xx` or `m:ss.xx`, truncating to `dp` decimals.
pub fn format_ms(ms: u64, dp: u8) -> String {
    let dp = dp.min(3);
    let whole_secs = ms / 1000;
    let minutes = whole_secs / 60;
    let secs = whole_secs % 60;

    let frac = if dp > 0 {
        let unit = 10u64.pow(3 - dp as u32);
        format!(".{:0width$}", (ms % 1000) / unit, width = dp as usize)
    } else {
        String::new()
    };

    if minutes > 0 {
        format!("{minutes}:{secs:02}{frac}")
    } else {
        format!("{whole_secs}{frac}")
    }
}

/// Formats a statistic in seconds with 2 or 3 decimals, truncated.
///
/// At 3 decimals a trailing zero is dropped, so 12.340 reads 12.34.
pub fn format_stat(ms: Option<f64>, dp: u8) -> String {
    let Some(ms) = ms.filter(|v| v.is_finite()) else {
        return UNAVAILABLE.to_string();
    };
    let dp = dp.clamp(2, 3);
    let step = 10u64.pow(3 - dp as u32);
    let truncated = (ms.max(0.0) as u64 / step) * step;

    let whole = truncated / 1000;
    let frac = (truncated % 1000) / step;
    let mut out = format!("{whole}.{frac:0width$}", width = dp as usize);
    if dp == 3 && out.ends_with('0') {
        out.pop();
    }
    out
}

/// Effective time of a solve for lists: `DNF`, `12.34+` or `12.34`
pub fn format_solve(solve: &Solve, dp: u8) -> String {
    match solve.effective_ms() {
        None => "DNF".to_string(),
        Some(ms) if solve.status == SolveStatus::Plus2 => format!("{}+", format_ms(ms, dp)),
        Some(ms) => format_ms(ms, dp),
    }
}

/// Longest time a solve may hold; keeps values representable in the store.
pub const MAX_TIME_MS: u64 = i64::MAX as u64 - PLUS2_PENALTY_MS;

/// Parses a typed time: `12.34`, `1:02.5`, `45`, `12.34+` or `DNF`.
pub fn parse_time_input(input: &str) -> Result<(u64, SolveStatus)> {
    let trimmed = input.trim();
    let invalid = || CubikError::InvalidTime(input.to_string());

    if trimmed.eq_ignore_ascii_case("dnf") {
        return Ok((0, SolveStatus::Dnf));
    }

    let (body, status) = match trimmed.strip_suffix('+') {
        Some(body) => (body.trim_end(), SolveStatus::Plus2),
        None => (trimmed, SolveStatus::Ok),
    };

    let (minutes, seconds) = match body.split_once(':') {
        Some((m, s)) => (parse_digits(m).ok_or_else(invalid)?, s),
        None => (0, body),
    };

    let (whole, frac) = seconds.split_once('.').unwrap_or((seconds, ""));
    let whole = parse_digits(whole).ok_or_else(invalid)?;
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let frac_ms = frac
        .chars()
        .chain(std::iter::repeat('0'))
        .take(3)
        .collect::<String>()
        .parse::<u64>()
        .map_err(|_| invalid())?;

    let ms = minutes
        .checked_mul(60)
        .and_then(|s| s.checked_add(whole))
        .and_then(|s| s.checked_mul(1000))
        .and_then(|ms| ms.checked_add(frac_ms))
        .filter(|&ms| ms <= MAX_TIME_MS)
        .ok_or_else(invalid)?;
    Ok((ms, status))
}

fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_truncates_not_rounds() {
        assert_eq!(format_ms(12_349, 2), "12.34");
        assert_eq!(format_ms(12_349, 3), "12.349");
        assert_eq!(format_ms(12_349, 1), "12.3");
        assert_eq!(format_ms(12_999, 0), "12");
    }

    #[test]
    fn format_minutes() {
        assert_eq!(format_ms(62_050, 2), "1:02.05");
        assert_eq!(format_ms(600_000, 0), "10:00");
        assert_eq!(format_ms(0, 2), "0.00");
    }

    #[test]
    fn format_stat_placeholder_and_truncation() {
        assert_eq!(format_stat(None, 2), UNAVAILABLE);
        assert_eq!(format_stat(Some(11_433.33), 2), "11.43");
        assert_eq!(format_stat(Some(11_433.33), 3), "11.433");
        assert_eq!(format_stat(Some(12_340.0), 3), "12.34");
        assert_eq!(format_stat(Some(12_340.0), 0), "12.34");
        assert_eq!(format_stat(Some(f64::NAN), 2), UNAVAILABLE);
    }

    #[test]
    fn format_solve_statuses() {
        let solve = Solve::new(10_500, "", vec![]);
        assert_eq!(format_solve(&solve, 2), "10.50");
        let plus2 = solve.clone().with_status(SolveStatus::Plus2);
        assert_eq!(format_solve(&plus2, 2), "12.50+");
        let dnf = solve.with_status(SolveStatus::Dnf);
        assert_eq!(format_solve(&dnf, 2), "DNF");
    }

    #[test]
    fn precision_modes() {
        assert_eq!(Precision::NoLive.dp(), 3);
        assert!(!Precision::NoLive.shows_live());
        assert_eq!(Precision::OneDp.at_least_2dp(), 2);
        assert_eq!(Precision::NoLive.next(), Precision::ThreeDp);
        let json = serde_json::to_string(&Precision::NoLive).unwrap();
        assert_eq!(json, "\"no-live\"");
    }

    #[test]
    fn parse_plain_and_minutes() {
        assert_eq!(parse_time_input("12.34").unwrap(), (12_340, SolveStatus::Ok));
        assert_eq!(parse_time_input("1:02.5").unwrap(), (62_500, SolveStatus::Ok));
        assert_eq!(parse_time_input(" 45 ").unwrap(), (45_000, SolveStatus::Ok));
        assert_eq!(parse_time_input("9.8765").unwrap(), (9_876, SolveStatus::Ok));
    }

    #[test]
    fn parse_penalties() {
        assert_eq!(parse_time_input("12.34+").unwrap(), (12_340, SolveStatus::Plus2));
        assert_eq!(parse_time_input("dnf").unwrap(), (0, SolveStatus::Dnf));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_time_input("").is_err());
        assert!(parse_time_input("-3.2").is_err());
        assert!(parse_time_input("abc").is_err());
        assert!(parse_time_input("1:x").is_err());
        assert!(parse_time_input("12.3a").is_err());
    }

    #[test]
    fn parse_rejects_out_of_range_times() {
        assert!(matches!(
            parse_time_input("999999999999999999:00"),
            Err(CubikError::InvalidTime(_))
        ));
        assert!(matches!(
            parse_time_input("18446744073709551"),
            Err(CubikError::InvalidTime(_))
        ));
        assert!(parse_time_input("99999999999999999999").is_err());

        let (ms, _) = parse_time_input("86400").unwrap();
        assert_eq!(ms, 86_400_000);
        assert!(ms <= MAX_TIME_MS);
    }
}
