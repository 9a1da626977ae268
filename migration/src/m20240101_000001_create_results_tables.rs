use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Players::DiscordUserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Players::DisplayName).string().null())
                    .col(
                        ColumnDef::new(Players::FirstSeenAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Games::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Games::PuzzleNumber).integer().null())
                    .col(
                        ColumnDef::new(Games::DateIso)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Results::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Results::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Results::DiscordUserId).string().not_null())
                    .col(ColumnDef::new(Results::GameId).integer().not_null())
                    .col(ColumnDef::new(Results::Guesses).integer().null())
                    .col(
                        ColumnDef::new(Results::Failed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Results::Raw).text().not_null())
                    .col(
                        ColumnDef::new(Results::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Results::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_results_player")
                            .from(Results::Table, Results::DiscordUserId)
                            .to(Players::Table, Players::DiscordUserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_results_game")
                            .from(Results::Table, Results::GameId)
                            .to(Games::Table, Games::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // One result per player per day; upserts conflict on this index
        manager
            .create_index(
                Index::create()
                    .name("idx_results_player_game")
                    .table(Results::Table)
                    .col(Results::DiscordUserId)
                    .col(Results::GameId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Results::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Games::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Players::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Players {
    Table,
    DiscordUserId,
    DisplayName,
    FirstSeenAt,
}

#[derive(DeriveIden)]
enum Games {
    Table,
    Id,
    PuzzleNumber,
    DateIso,
}

#[derive(DeriveIden)]
enum Results {
    Table,
    Id,
    DiscordUserId,
    GameId,
    Guesses,
    Failed,
    Raw,
    CreatedAt,
    UpdatedAt,
}
