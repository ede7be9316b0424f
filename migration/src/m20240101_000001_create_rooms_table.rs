use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rooms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rooms::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Rooms::RoomCode)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    // Ordered JSON array of player ids, length <= 2.
                    .col(ColumnDef::new(Rooms::Players).string().not_null())
                    .col(ColumnDef::new(Rooms::RoomCreator).string().not_null())
                    .col(
                        ColumnDef::new(Rooms::IsActiveRoom)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Rooms::IsGameStarted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Rooms::WinnerPlayerId).string().null())
                    .col(
                        ColumnDef::new(Rooms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Rooms::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rooms::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Rooms {
    Table,
    Id,
    RoomCode,
    Players,
    RoomCreator,
    IsActiveRoom,
    IsGameStarted,
    WinnerPlayerId,
    CreatedAt,
    UpdatedAt,
}
