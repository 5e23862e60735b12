//! Users dimension: one row per user, latest known profile state.
//!
//! A user's `level` can flip between free and paid within a batch; the row
//! kept is the one from the maximum-timestamp play event. Stable ascending
//! sort plus keep-last makes ties resolve to the later input row, so reruns
//! are deterministic.

use crate::error::Result;
use polars::prelude::*;

/// Users dimension from valid play events
pub fn users_table(plays: &DataFrame) -> Result<DataFrame> {
    let df = plays
        .clone()
        .lazy()
        .sort(
            ["ts"],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .group_by_stable([col("user_id")])
        .agg([
            col("firstName").last().alias("first_name"),
            col("lastName").last().alias("last_name"),
            col("gender").last(),
            col("level").last(),
        ])
        .collect()?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::plays::{filter_plays, tests::raw_events};

    #[test]
    fn one_row_per_user() {
        let plays = filter_plays(&raw_events()).unwrap();
        let users = users_table(&plays.frame).unwrap();

        // Two distinct users among the three valid plays
        assert_eq!(users.height(), 2);
        assert_eq!(
            users.get_column_names_str(),
            &["user_id", "first_name", "last_name", "gender", "level"]
        );
    }

    #[test]
    fn level_change_keeps_later_event() {
        // User 7 plays as "free" at t0 and "paid" at t0+60s
        let plays = filter_plays(&raw_events()).unwrap();
        let users = users_table(&plays.frame).unwrap();

        let user_ids = users.column("user_id").unwrap().i64().unwrap();
        let levels = users.column("level").unwrap().str().unwrap();

        let mut found = false;
        for i in 0..users.height() {
            if user_ids.get(i) == Some(7) {
                assert_eq!(levels.get(i), Some("paid"));
                found = true;
            }
        }
        assert!(found, "user 7 missing from users table");
    }

    #[test]
    fn level_policy_ignores_input_order() {
        // Same two events for user 7, later timestamp listed first
        let raw = df!(
            "artist" => ["Beatles", "Beatles"],
            "auth" => ["Logged In", "Logged In"],
            "firstName" => ["Lily", "Lily"],
            "gender" => ["F", "F"],
            "itemInSession" => [1i64, 0],
            "lastName" => ["Koch", "Koch"],
            "length" => [240.0f64, 240.0],
            "level" => ["paid", "free"],
            "location" => ["Chicago", "Chicago"],
            "method" => ["PUT", "PUT"],
            "page" => ["NextSong", "NextSong"],
            "registration" => [1.5e12f64, 1.5e12],
            "sessionId" => [100i64, 100],
            "song" => ["Let It Be", "Let It Be"],
            "status" => [200i64, 200],
            "ts" => [1541440060000i64, 1541440000000],
            "userAgent" => ["Mozilla", "Mozilla"],
            "userId" => ["7", "7"],
        )
        .unwrap();

        let plays = filter_plays(&raw).unwrap();
        let users = users_table(&plays.frame).unwrap();

        assert_eq!(users.height(), 1);
        let level = users.column("level").unwrap().str().unwrap().get(0);
        assert_eq!(level, Some("paid"));
    }
}
