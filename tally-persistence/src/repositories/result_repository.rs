use anyhow::{anyhow, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::entities::{games, players, prelude::*, results};
use tally_types::{MemberName, ResultRow};

pub struct ResultRepository {
    db: DatabaseConnection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
    pub results: u64,
    pub games: u64,
    pub players: u64,
    pub aliases: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClearOptions {
    pub keep_players: bool,
    pub drop_aliases: bool,
}

impl ResultRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_row(result: results::Model, game: Option<games::Model>) -> ResultRow {
        let (date_iso, puzzle_number) = match game {
            Some(game) => (
                game.date_iso,
                game.puzzle_number.and_then(|n| u32::try_from(n).ok()),
            ),
            None => (String::new(), None),
        };

        ResultRow {
            user_id: result.discord_user_id,
            puzzle_number,
            date_iso,
            guesses: result.guesses.and_then(|g| u8::try_from(g).ok()),
            failed: result.failed,
            raw: result.raw,
        }
    }

    /// Store a result, replacing any earlier result for the same player and day
    pub async fn upsert_result(&self, row: &ResultRow) -> Result<()> {
        self.upsert_results(std::slice::from_ref(row)).await
    }

    /// Store all rows of one summary in a single transaction
    pub async fn upsert_results(&self, rows: &[ResultRow]) -> Result<()> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
        let txn = self.db.begin().await?;

        for row in rows {
            Self::write_row(&txn, row, now).await?;
        }

        txn.commit().await?;
        Ok(())
    }

    async fn write_row<C: ConnectionTrait>(
        txn: &C,
        row: &ResultRow,
        now: sea_orm::prelude::DateTimeWithTimeZone,
    ) -> Result<()> {
        let player = players::ActiveModel {
            discord_user_id: ActiveValue::Set(row.user_id.clone()),
            display_name: ActiveValue::NotSet,
            first_seen_at: ActiveValue::Set(now),
        };
        Players::insert(player)
            .on_conflict(
                OnConflict::column(players::Column::DiscordUserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;

        let puzzle_number = row.puzzle_number.and_then(|n| i32::try_from(n).ok());
        let game = games::ActiveModel {
            id: ActiveValue::NotSet,
            puzzle_number: ActiveValue::Set(puzzle_number),
            date_iso: ActiveValue::Set(row.date_iso.clone()),
        };
        Games::insert(game)
            .on_conflict(
                OnConflict::column(games::Column::DateIso)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;

        let game = Games::find()
            .filter(games::Column::DateIso.eq(row.date_iso.as_str()))
            .one(txn)
            .await?
            .ok_or_else(|| anyhow!("Failed to retrieve game for {}", row.date_iso))?;

        // A later summary may carry the puzzle number an earlier one lacked
        if game.puzzle_number.is_none() && puzzle_number.is_some() {
            let update = games::ActiveModel {
                id: ActiveValue::Unchanged(game.id),
                puzzle_number: ActiveValue::Set(puzzle_number),
                date_iso: ActiveValue::Unchanged(game.date_iso.clone()),
            };
            Games::update(update).exec(txn).await?;
        }

        let result = results::ActiveModel {
            id: ActiveValue::NotSet,
            discord_user_id: ActiveValue::Set(row.user_id.clone()),
            game_id: ActiveValue::Set(game.id),
            guesses: ActiveValue::Set(if row.failed {
                None
            } else {
                row.guesses.map(i32::from)
            }),
            failed: ActiveValue::Set(row.failed),
            raw: ActiveValue::Set(row.raw.clone()),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };
        Results::insert(result)
            .on_conflict(
                OnConflict::columns([results::Column::DiscordUserId, results::Column::GameId])
                    .update_columns([
                        results::Column::Guesses,
                        results::Column::Failed,
                        results::Column::Raw,
                        results::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;

        Ok(())
    }

    /// Every stored result, read in one query
    pub async fn all_results(&self) -> Result<Vec<ResultRow>> {
        let rows = Results::find()
            .find_also_related(Games)
            .order_by_asc(results::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(result, game)| Self::model_to_row(result, game))
            .collect())
    }

    pub async fn results_for_user(&self, user_id: &str) -> Result<Vec<ResultRow>> {
        let rows = Results::find()
            .filter(results::Column::DiscordUserId.eq(user_id))
            .find_also_related(Games)
            .order_by_asc(results::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(result, game)| Self::model_to_row(result, game))
            .collect())
    }

    /// Record the name a player is known by, creating the player if needed
    pub async fn set_display_name(&self, user_id: &str, display_name: &str) -> Result<()> {
        let player = players::ActiveModel {
            discord_user_id: ActiveValue::Set(user_id.to_string()),
            display_name: ActiveValue::Set(Some(display_name.trim().to_string())),
            first_seen_at: ActiveValue::Set(chrono::Utc::now().into()),
        };

        Players::insert(player)
            .on_conflict(
                OnConflict::column(players::Column::DiscordUserId)
                    .update_column(players::Column::DisplayName)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    /// Players with a known display name, for alias fallback
    pub async fn member_names(&self) -> Result<Vec<MemberName>> {
        let players = Players::find()
            .filter(players::Column::DisplayName.is_not_null())
            .order_by_asc(players::Column::DiscordUserId)
            .all(&self.db)
            .await?;

        Ok(players
            .into_iter()
            .filter_map(|player| {
                Some(MemberName {
                    display_name: player.display_name?,
                    user_id: player.discord_user_id,
                })
            })
            .collect())
    }

    pub async fn counts(&self) -> Result<TableCounts> {
        Ok(TableCounts {
            results: Results::find().count(&self.db).await?,
            games: Games::find().count(&self.db).await?,
            players: Players::find().count(&self.db).await?,
            aliases: Aliases::find().count(&self.db).await?,
        })
    }

    /// Delete stored results and games. Returns counts before and after.
    pub async fn clear(&self, options: ClearOptions) -> Result<(TableCounts, TableCounts)> {
        let before = self.counts().await?;

        // results -> games -> players keeps foreign keys satisfied
        let txn = self.db.begin().await?;
        Results::delete_many().exec(&txn).await?;
        Games::delete_many().exec(&txn).await?;
        if !options.keep_players {
            Players::delete_many().exec(&txn).await?;
        }
        if options.drop_aliases {
            Aliases::delete_many().exec(&txn).await?;
        }
        txn.commit().await?;

        let after = self.counts().await?;
        tracing::info!(?before, ?after, "cleared stored results");
        Ok((before, after))
    }

    /// Reclaim space after large deletions
    pub async fn vacuum(&self) -> Result<()> {
        self.db.execute_unprepared("VACUUM").await?;
        Ok(())
    }
}
