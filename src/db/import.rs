// Bulk import of the scraper's `ufc.csv`: one row per bout, carrying both
// fighters' names and profile stats.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use super::{Database, NewBout};
use crate::connect::FighterId;
use crate::fighter::{known_or_unknown, leading_integer, parse_birth_date, FighterProfile, Record};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("failed to read import file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// What an import wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub bouts: usize,
    pub fighters: usize,
    /// Rows missing a fighter name.
    pub skipped: usize,
}

type ScrapedRow = HashMap<String, String>;

fn column<'a>(row: &'a ScrapedRow, name: &str) -> &'a str {
    row.get(name).map(|v| v.trim()).unwrap_or("")
}

/// Profile of one side (`0` or `1`) of a scraped bout row.
fn scraped_fighter(row: &ScrapedRow, side: u8) -> Option<FighterProfile> {
    let field = |name: &str| column(row, &format!("fighter{side}_{name}"));

    let first_name = field("first_name");
    if first_name.is_empty() {
        return None;
    }
    let mut profile = FighterProfile::named(&FighterId::new(first_name, Some(field("last_name"))));
    profile.nickname = field("nickname").to_string();
    profile.female = column(row, "gender").eq_ignore_ascii_case("female");
    profile.record = Record {
        wins: leading_integer(field("wins")),
        losses: leading_integer(field("losses")),
        draws: leading_integer(field("draws")),
    };
    profile.height = known_or_unknown(Some(field("height").to_string()));
    profile.weight = known_or_unknown(Some(field("weight").to_string()));
    profile.stance = known_or_unknown(Some(field("stance").to_string()));
    profile.reach = leading_integer(field("reach"));
    profile.birth_day = parse_birth_date(field("birth_date"));
    Some(profile)
}

/// Import scraped bouts from any CSV reader.
///
/// Both fighters of every row are upserted, so a fighter's stats end up as
/// those of the last row they appear in. Rows without two fighter names are
/// skipped.
pub async fn import_csv<R: Read>(db: &Database, reader: R) -> Result<ImportSummary, ImportError> {
    let rows: Vec<ScrapedRow> = csv::Reader::from_reader(reader)
        .deserialize()
        .collect::<Result<_, _>>()?;

    let mut summary = ImportSummary::default();
    let mut seen = HashSet::new();
    for (line, row) in rows.iter().enumerate() {
        let (Some(fighter0), Some(fighter1)) = (scraped_fighter(row, 0), scraped_fighter(row, 1))
        else {
            tracing::warn!(row = line + 1, "Skipping bout without two fighter names");
            summary.skipped += 1;
            continue;
        };

        for fighter in [&fighter0, &fighter1] {
            db.upsert_fighter(fighter).await?;
            seen.insert(fighter.id());
        }
        db.add_bout(&NewBout {
            fighter0: fighter0.id().full_name(),
            fighter1: fighter1.id().full_name(),
            event: column(row, "event").to_string(),
            date: column(row, "date").to_string(),
            weight_class: column(row, "weight").to_string(),
            method: column(row, "method").to_string(),
        })
        .await?;
        summary.bouts += 1;
    }
    summary.fighters = seen.len();

    tracing::info!(
        bouts = summary.bouts,
        fighters = summary.fighters,
        skipped = summary.skipped,
        "Imported scraped bouts"
    );
    Ok(summary)
}

/// Import the scraper's CSV file at `path`.
pub async fn import_csv_file(db: &Database, path: &Path) -> Result<ImportSummary, ImportError> {
    let data = tokio::fs::read(path).await?;
    import_csv(db, data.as_slice()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect::BoutSource;

    const HEADER: &str = "fighter0_first_name,fighter0_last_name,fighter1_first_name,fighter1_last_name,\
event,date,location,gender,weight,title,wasDraw,method,rounds,fight_time,\
fighter0_nickname,fighter0_wins,fighter0_losses,fighter0_draws,fighter0_height,fighter0_weight,\
fighter0_reach,fighter0_stance,fighter0_birth_date,\
fighter1_nickname,fighter1_wins,fighter1_losses,fighter1_draws,fighter1_height,fighter1_weight,\
fighter1_reach,fighter1_stance,fighter1_birth_date";

    fn scraped_csv(rows: &[&str]) -> String {
        let mut csv = String::from(HEADER);
        for row in rows {
            csv.push('\n');
            csv.push_str(row);
        }
        csv.push('\n');
        csv
    }

    const JONES_CORMIER: &str = "Jon,Jones,Daniel,Cormier,UFC 214: Cormier vs. Jones 2,\"July 29, 2017\",\
\"Anaheim, California, USA\",Male,Light Heavyweight,True,False,KO/TKO,5,3:01,\
Bones,27,1,0,\"6' 4\"\"\",205 lbs.,\"84\"\"\",Orthodox,\"Jul 19, 1987\",\
Dc,22,3,0,\"5' 11\"\"\",235 lbs.,\"72\"\"\",Orthodox,\"Mar 20, 1979\"";

    const SHEVCHENKO_ANDRADE: &str = "Valentina,Shevchenko,Jessica,Andrade,UFC Fight Night: Shevchenko vs. Andrade,\
\"October 16, 2021\",\"Las Vegas, Nevada, USA\",Female,Flyweight,True,False,KO/TKO,5,3:19,\
Bullet,23,4,0,\"5' 5\"\"\",125 lbs.,\"66\"\"\",Southpaw,\"Mar 07, 1988\",\
Bate Estaca,25.0,12.0,0.0,\"5' 1\"\"\",125 lbs.,\"62\"\"\",Orthodox,\"Sep 25, 1991\"";

    async fn test_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_import_fills_fighters_and_bouts() {
        let db = test_db().await;
        let csv = scraped_csv(&[JONES_CORMIER, SHEVCHENKO_ANDRADE]);

        let summary = import_csv(&db, csv.as_bytes()).await.unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                bouts: 2,
                fighters: 4,
                skipped: 0
            }
        );

        let jones = db
            .get_fighter(&FighterId::new("Jon", Some("Jones")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(jones.nickname, "Bones");
        assert_eq!(jones.record.wins, 27);
        assert_eq!(jones.reach, 84);
        assert_eq!(jones.height, "6' 4\"");
        assert!(!jones.female);

        let andrade = db
            .get_fighter(&FighterId::new("Jessica", Some("Andrade")))
            .await
            .unwrap()
            .unwrap();
        assert!(andrade.female);
        assert_eq!(andrade.record.wins, 25);
        assert_eq!(andrade.record.losses, 12);

        let rows = db.list_bout_rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].weight_class, "Light Heavyweight");
        assert_eq!(rows[1].event, "UFC Fight Night: Shevchenko vs. Andrade");

        let records = db.list_bouts().await.unwrap();
        assert_eq!(records[0].fighter_b, FighterId::new("Daniel", Some("Cormier")));
    }

    #[tokio::test]
    async fn test_import_keeps_multi_word_and_single_names() {
        let db = test_db().await;
        let row = "Junior,dos Santos,Royce,,UFC 1,\"November 12, 1993\",\"Denver, Colorado, USA\",Male,Open Weight,\
False,False,Submission,1,2:18,Cigano,21,9,0,--,--,--,--,--,,11,2,1,--,--,--,--,--";

        let summary = import_csv(&db, scraped_csv(&[row]).as_bytes()).await.unwrap();
        assert_eq!(summary.bouts, 1);

        let jds = db
            .get_fighter(&FighterId::new("Junior", Some("dos Santos")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(jds.nickname, "Cigano");
        assert_eq!(jds.height, crate::fighter::UNKNOWN);
        assert_eq!(jds.reach, 0);
        assert_eq!(jds.birth_day, None);

        let royce = db.get_fighter(&FighterId::new("Royce", None)).await.unwrap();
        assert!(royce.is_some());
    }

    #[tokio::test]
    async fn test_import_skips_rows_without_names() {
        let db = test_db().await;
        let nameless = ",,Daniel,Cormier,UFC 1,,,Male,Heavyweight,False,False,Decision,3,5:00,\
,,,,,,,,,,,,,,,,,";
        let csv = scraped_csv(&[nameless, JONES_CORMIER]);

        let summary = import_csv(&db, csv.as_bytes()).await.unwrap();
        assert_eq!(summary.bouts, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(db.count_fighters().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_import_rejects_ragged_rows() {
        let db = test_db().await;
        let csv = scraped_csv(&["Jon,Jones,Daniel"]);
        assert!(matches!(
            import_csv(&db, csv.as_bytes()).await,
            Err(ImportError::Csv(_))
        ));
    }

    #[tokio::test]
    async fn test_import_missing_file() {
        let db = test_db().await;
        let err = import_csv_file(&db, Path::new("/nonexistent/ufc.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Io(_)));
    }
}
