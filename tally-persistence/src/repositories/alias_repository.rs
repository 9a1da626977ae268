use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, DatabaseConnection, EntityTrait, QueryOrder};

use crate::entities::{aliases, prelude::*};
use tally_core::normalize_handle;
use tally_types::Alias;

pub struct AliasRepository {
    db: DatabaseConnection,
}

impl AliasRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_alias(model: aliases::Model) -> Alias {
        Alias {
            handle: model.handle,
            user_id: model.discord_user_id,
        }
    }

    fn handle_key(handle: &str) -> Result<String> {
        normalize_handle(handle).ok_or_else(|| anyhow!("Invalid handle '{}'", handle))
    }

    /// Map a handle to a user id, replacing any previous mapping
    pub async fn set_alias(&self, handle: &str, user_id: &str) -> Result<Alias> {
        let key = Self::handle_key(handle)?;

        let model = aliases::ActiveModel {
            handle: ActiveValue::Set(key.clone()),
            discord_user_id: ActiveValue::Set(user_id.to_string()),
            created_at: ActiveValue::Set(chrono::Utc::now().into()),
        };

        Aliases::insert(model)
            .on_conflict(
                OnConflict::column(aliases::Column::Handle)
                    .update_column(aliases::Column::DiscordUserId)
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(Alias {
            handle: key,
            user_id: user_id.to_string(),
        })
    }

    pub async fn get_alias(&self, handle: &str) -> Result<Option<String>> {
        let Some(key) = normalize_handle(handle) else {
            return Ok(None);
        };

        let model = Aliases::find_by_id(key).one(&self.db).await?;
        Ok(model.map(|m| m.discord_user_id))
    }

    pub async fn list_aliases(&self) -> Result<Vec<Alias>> {
        let models = Aliases::find()
            .order_by_asc(aliases::Column::Handle)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Self::model_to_alias).collect())
    }

    /// Returns whether a mapping existed
    pub async fn remove_alias(&self, handle: &str) -> Result<bool> {
        let Some(key) = normalize_handle(handle) else {
            return Ok(false);
        };

        let result = Aliases::delete_by_id(key).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    /// Delete every alias, returning how many were removed
    pub async fn clear(&self) -> Result<u64> {
        let result = Aliases::delete_many().exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    /// Insert aliases from a `{ "@handle": "user id" }` JSON object. Existing
    /// mappings are left alone. Returns how many were added.
    pub async fn seed_from_json(&self, json: &str) -> Result<u64> {
        let entries: BTreeMap<String, String> =
            serde_json::from_str(json).context("Alias seed must be a JSON object of strings")?;

        let mut added = 0;
        for (handle, user_id) in entries {
            let Some(key) = normalize_handle(&handle) else {
                tracing::warn!("skipping empty alias handle in seed file");
                continue;
            };

            let model = aliases::ActiveModel {
                handle: ActiveValue::Set(key),
                discord_user_id: ActiveValue::Set(user_id),
                created_at: ActiveValue::Set(chrono::Utc::now().into()),
            };

            added += Aliases::insert(model)
                .on_conflict(
                    OnConflict::column(aliases::Column::Handle)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await?;
        }

        tracing::info!("seeded {} alias(es)", added);
        Ok(added)
    }
}
