use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MpesaPayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MpesaPayments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MpesaPayments::OrderId).uuid().not_null())
                    .col(ColumnDef::new(MpesaPayments::UserId).uuid())
                    .col(
                        ColumnDef::new(MpesaPayments::PhoneNumber)
                            .string_len(15)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MpesaPayments::Amount)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MpesaPayments::MerchantRequestId)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(MpesaPayments::CheckoutRequestId)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(MpesaPayments::MpesaReceiptNumber).string_len(50))
                    .col(ColumnDef::new(MpesaPayments::TransactionDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(MpesaPayments::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(MpesaPayments::ResultCode).integer())
                    .col(ColumnDef::new(MpesaPayments::ResultDescription).text())
                    .col(
                        ColumnDef::new(MpesaPayments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MpesaPayments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(MpesaPayments::Table, MpesaPayments::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing a single order's attempts, newest first.
        manager
            .create_index(
                Index::create()
                    .table(MpesaPayments::Table)
                    .col(MpesaPayments::OrderId)
                    .col(MpesaPayments::CreatedAt)
                    .name("idx_mpesa_payments_order_id_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MpesaPayments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MpesaPayments {
    Table,
    Id,
    OrderId,
    UserId,
    PhoneNumber,
    Amount,
    MerchantRequestId,
    CheckoutRequestId,
    MpesaReceiptNumber,
    TransactionDate,
    Status,
    ResultCode,
    ResultDescription,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Orders {
    Table,
    Id,
}
