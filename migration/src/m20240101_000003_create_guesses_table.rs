use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Guesses::Table)
                    .if_not_exists()
                    // Auto-increment primary key doubles as insertion order,
                    // which keeps the guess log auditable.
                    .col(
                        ColumnDef::new(Guesses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Guesses::RoomCode).string().not_null())
                    .col(ColumnDef::new(Guesses::PlayerId).string().not_null())
                    .col(ColumnDef::new(Guesses::Guess).string().not_null())
                    .col(
                        ColumnDef::new(Guesses::CorrectPositions)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Guesses::Misplaced).integer().not_null())
                    .col(ColumnDef::new(Guesses::Message).string().not_null())
                    .col(
                        ColumnDef::new(Guesses::CreatedAt)
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
                    .name("idx_guesses_room_code")
                    .table(Guesses::Table)
                    .col(Guesses::RoomCode)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Guesses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Guesses {
    Table,
    Id,
    RoomCode,
    PlayerId,
    Guess,
    CorrectPositions,
    Misplaced,
    Message,
    CreatedAt,
}
