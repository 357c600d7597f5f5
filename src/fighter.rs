// Fighter profile model and the conversions from raw database rows.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::connect::FighterId;

/// Placeholder for missing text attributes.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record {
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
}

/// Full profile as served to the games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterProfile {
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub female: bool,
    pub record: Record,
    pub weight: String,
    pub stance: String,
    pub birth_day: Option<NaiveDate>,
    pub reach: i64,
    pub height: String,
}

impl FighterProfile {
    /// A profile carrying only a name, every other attribute unknown.
    pub fn named(id: &FighterId) -> Self {
        Self {
            first_name: id.first_name.clone(),
            last_name: id.last_name.clone(),
            nickname: String::new(),
            female: false,
            record: Record::default(),
            weight: UNKNOWN.to_string(),
            stance: UNKNOWN.to_string(),
            birth_day: None,
            reach: 0,
            height: UNKNOWN.to_string(),
        }
    }

    pub fn id(&self) -> FighterId {
        FighterId::new(&self.first_name, Some(&self.last_name))
    }
}

/// Raw row of the `fighters` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FighterRow {
    pub first_name: String,
    pub last_name: String,
    pub nickname: Option<String>,
    pub female: bool,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub reach: Option<String>,
    pub stance: Option<String>,
    pub birth_date: Option<String>,
}

impl From<FighterRow> for FighterProfile {
    fn from(row: FighterRow) -> Self {
        Self {
            first_name: row.first_name,
            last_name: row.last_name,
            nickname: row.nickname.unwrap_or_default(),
            female: row.female,
            record: Record {
                wins: row.wins,
                losses: row.losses,
                draws: row.draws,
            },
            weight: known_or_unknown(row.weight),
            stance: known_or_unknown(row.stance),
            birth_day: row.birth_date.as_deref().and_then(parse_birth_date),
            reach: row.reach.as_deref().map(leading_integer).unwrap_or(0),
            height: known_or_unknown(row.height),
        }
    }
}

/// Scraped pages show `--` for a missing attribute.
pub(crate) fn known_or_unknown(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() && v.trim() != "--" => v,
        _ => UNKNOWN.to_string(),
    }
}

/// Leading integer of a scraped value such as `76"` or `27.0`. Anything
/// else is 0.
pub fn leading_integer(raw: &str) -> i64 {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Birth dates are scraped as e.g. `Jul 19, 1987`.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%b %d, %Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

/// Row offset of the fighter of the day: the date read as `YYYYMMDD`
/// modulo the number of fighters. `None` when there are no fighters.
pub fn daily_offset(date: NaiveDate, fighter_count: i64) -> Option<i64> {
    if fighter_count <= 0 {
        return None;
    }
    let seed = date.year() as i64 * 10_000 + date.month() as i64 * 100 + date.day() as i64;
    Some(seed % fighter_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> FighterRow {
        FighterRow {
            first_name: "Jon".into(),
            last_name: "Jones".into(),
            nickname: Some("Bones".into()),
            female: false,
            wins: 27,
            losses: 1,
            draws: 0,
            height: Some("6' 4\"".into()),
            weight: Some("Heavyweight".into()),
            reach: Some("84\"".into()),
            stance: Some("Orthodox".into()),
            birth_date: Some("Jul 19, 1987".into()),
        }
    }

    #[test]
    fn test_row_conversion() {
        let profile = FighterProfile::from(row());
        assert_eq!(profile.nickname, "Bones");
        assert_eq!(profile.record.wins, 27);
        assert_eq!(profile.reach, 84);
        assert_eq!(profile.birth_day, NaiveDate::from_ymd_opt(1987, 7, 19));
        assert!(!profile.female);
        assert_eq!(profile.id(), FighterId::new("Jon", Some("Jones")));
    }

    #[test]
    fn test_row_conversion_missing_fields() {
        let mut r = row();
        r.nickname = None;
        r.weight = None;
        r.stance = Some("--".into());
        r.reach = Some("--".into());
        r.birth_date = Some("--".into());
        r.height = None;
        let profile = FighterProfile::from(r);
        assert_eq!(profile.nickname, "");
        assert_eq!(profile.weight, UNKNOWN);
        assert_eq!(profile.stance, UNKNOWN);
        assert_eq!(profile.height, UNKNOWN);
        assert_eq!(profile.reach, 0);
        assert_eq!(profile.birth_day, None);
    }

    #[test]
    fn test_row_conversion_female() {
        let mut r = row();
        r.female = true;
        assert!(FighterProfile::from(r).female);
    }

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer("76\""), 76);
        assert_eq!(leading_integer(" 70.5\" "), 70);
        assert_eq!(leading_integer("27.0"), 27);
        assert_eq!(leading_integer(""), 0);
        assert_eq!(leading_integer("--"), 0);
    }

    #[test]
    fn test_parse_birth_date() {
        assert_eq!(
            parse_birth_date("Feb 02, 1990"),
            NaiveDate::from_ymd_opt(1990, 2, 2)
        );
        assert_eq!(
            parse_birth_date("1990-02-02"),
            NaiveDate::from_ymd_opt(1990, 2, 2)
        );
        assert_eq!(parse_birth_date("unknown"), None);
    }

    #[test]
    fn test_daily_offset() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert_eq!(daily_offset(date, 1000), Some(20250314 % 1000));
        assert_eq!(daily_offset(date, 1), Some(0));
        assert_eq!(daily_offset(date, 0), None);
    }

    #[test]
    fn test_named_profile() {
        let id = FighterId::new("Royce", None);
        let profile = FighterProfile::named(&id);
        assert_eq!(profile.id(), id);
        assert_eq!(profile.weight, UNKNOWN);
    }
}
