use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Aliases::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Aliases::Handle).string().not_null().primary_key())
                    .col(ColumnDef::new(Aliases::DiscordUserId).string().not_null())
                    .col(
                        ColumnDef::new(Aliases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_aliases_discord_user_id")
                    .table(Aliases::Table)
                    .col(Aliases::DiscordUserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Aliases::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Aliases {
    Table,
    Handle,
    DiscordUserId,
    CreatedAt,
}
