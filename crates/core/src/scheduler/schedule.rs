use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::errors::{Error, Result};

/// When the fetch job fires.
///
/// Either a fixed interval (`30s`, `5m`, `1h`, `1500ms`) or a cron expression
/// evaluated in UTC. Five-field cron expressions get a leading seconds field
/// of `0`.
#[derive(Clone)]
pub enum Schedule {
    Every(Duration),
    Cron(Box<cron::Schedule>),
}

impl Schedule {
    pub fn parse(expr: &str) -> Result<Self> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(Error::InvalidConfigValue(
                "fetch schedule cannot be empty".to_string(),
            ));
        }

        if let Some(interval) = parse_interval(expr)? {
            return Ok(Schedule::Every(interval));
        }

        let normalized = match expr.split_whitespace().count() {
            5 => format!("0 {}", expr),
            _ => expr.to_string(),
        };
        cron::Schedule::from_str(&normalized)
            .map(|s| Schedule::Cron(Box::new(s)))
            .map_err(|e| {
                Error::InvalidConfigValue(format!("invalid fetch schedule '{}': {}", expr, e))
            })
    }

    /// Next cron firing strictly after `instant`. Intervals have no fixed
    /// firing instants and return `None`.
    pub fn next_fire_after(&self, instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Schedule::Every(_) => None,
            Schedule::Cron(schedule) => schedule.after(&instant).next(),
        }
    }

    /// Time to wait from `now` until the next firing, if there is one.
    pub fn next_delay(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self {
            Schedule::Every(interval) => Some(*interval),
            Schedule::Cron(schedule) => schedule
                .after(&now)
                .next()
                .map(|next| (next - now).to_std().unwrap_or(Duration::ZERO)),
        }
    }
}

/// Parses `<digits><unit>` with unit one of `ms`, `s`, `m`, `h`.
///
/// Returns `Ok(None)` when `expr` does not look like an interval at all.
fn parse_interval(expr: &str) -> Result<Option<Duration>> {
    let split = expr
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(expr.len());
    let (digits, unit) = expr.split_at(split);
    if digits.is_empty() {
        return Ok(None);
    }

    let to_duration: fn(u64) -> Option<Duration> = match unit {
        "ms" => |n| Some(Duration::from_millis(n)),
        "s" => |n| Some(Duration::from_secs(n)),
        "m" => |n| n.checked_mul(60).map(Duration::from_secs),
        "h" => |n| n.checked_mul(3600).map(Duration::from_secs),
        _ => return Ok(None),
    };

    let value: u64 = digits
        .parse()
        .map_err(|_| Error::InvalidConfigValue(format!("interval out of range: {}", expr)))?;
    if value == 0 {
        return Err(Error::InvalidConfigValue(format!(
            "fetch interval must be positive: {}",
            expr
        )));
    }
    to_duration(value)
        .map(Some)
        .ok_or_else(|| Error::InvalidConfigValue(format!("interval out of range: {}", expr)))
}

impl fmt::Debug for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Every(interval) => write!(f, "Every({:?})", interval),
            Schedule::Cron(schedule) => write!(f, "Cron({})", schedule),
        }
    }
}

impl FromStr for Schedule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Schedule::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_intervals() {
        let cases = [
            ("30s", Duration::from_secs(30)),
            ("5m", Duration::from_secs(300)),
            ("1h", Duration::from_secs(3600)),
            ("1500ms", Duration::from_millis(1500)),
        ];
        for (expr, expected) in cases {
            match Schedule::parse(expr).unwrap() {
                Schedule::Every(d) => assert_eq!(d, expected, "{expr}"),
                other => panic!("{expr} parsed as {:?}", other),
            }
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(Schedule::parse("0s").is_err());
        assert!(Schedule::parse("").is_err());
    }

    #[test]
    fn test_cron_six_fields() {
        let schedule = Schedule::parse("0 * * * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 30).unwrap();
        assert_eq!(schedule.next_delay(now), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_cron_five_fields_gets_seconds() {
        let schedule = Schedule::parse("*/5 * * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 3, 0).unwrap();
        assert_eq!(schedule.next_delay(now), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_cron_is_evaluated_in_utc() {
        // Daily at 09:30 UTC.
        let schedule = Schedule::parse("0 30 9 * * *").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        assert_eq!(schedule.next_delay(now), Some(Duration::from_secs(1800)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(Schedule::parse("every minute").is_err());
        assert!(Schedule::parse("10x").is_err());

        for expr in ["99999999999999999h", "999999999999999999m"] {
            let err = Schedule::parse(expr).unwrap_err();
            assert!(
                matches!(err, Error::InvalidConfigValue(ref msg) if msg.contains("out of range")),
                "{expr} gave {:?}",
                err
            );
        }
    }

    #[test]
    fn test_next_fire_after_a_fired_instant_moves_forward() {
        let schedule = Schedule::parse("0 * * * * *").unwrap();
        let fired = Utc.with_ymd_and_hms(2024, 1, 1, 12, 1, 0).unwrap();

        assert_eq!(
            schedule.next_fire_after(fired),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 12, 2, 0).unwrap())
        );
        // A clock reading just behind the fired instant would pick it again.
        let behind = fired - chrono::Duration::milliseconds(3);
        assert_eq!(schedule.next_fire_after(behind), Some(fired));

        assert_eq!(
            Schedule::Every(Duration::from_secs(5)).next_fire_after(fired),
            None
        );
    }
}
