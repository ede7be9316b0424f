use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlayerSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlayerSessions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlayerSessions::RoomCode).string().not_null())
                    .col(ColumnDef::new(PlayerSessions::PlayerId).string().not_null())
                    .col(
                        ColumnDef::new(PlayerSessions::PlayerName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PlayerSessions::Role).string().not_null())
                    .col(
                        ColumnDef::new(PlayerSessions::IsPlayerJoined)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PlayerSessions::IsReady)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(PlayerSessions::SecretCode).string().null())
                    .col(
                        ColumnDef::new(PlayerSessions::HasTurn)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(PlayerSessions::CurrentGuess).string().null())
                    .col(
                        ColumnDef::new(PlayerSessions::LastSeen)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PlayerSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PlayerSessions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one session per player per room. This must hold at the
        // storage layer, not just in application checks, so concurrent join
        // attempts cannot slip a duplicate through.
        manager
            .create_index(
                Index::create()
                    .name("idx_player_sessions_room_player")
                    .table(PlayerSessions::Table)
                    .col(PlayerSessions::RoomCode)
                    .col(PlayerSessions::PlayerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Staleness sweeps filter on last_seen across all rooms.
        manager
            .create_index(
                Index::create()
                    .name("idx_player_sessions_last_seen")
                    .table(PlayerSessions::Table)
                    .col(PlayerSessions::LastSeen)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlayerSessions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PlayerSessions {
    Table,
    Id,
    RoomCode,
    PlayerId,
    PlayerName,
    Role,
    IsPlayerJoined,
    IsReady,
    SecretCode,
    HasTurn,
    CurrentGuess,
    LastSeen,
    CreatedAt,
    UpdatedAt,
}
