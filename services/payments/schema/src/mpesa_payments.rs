use sea_orm::entity::prelude::*;

/// One STK-push attempt for an order.
///
/// Created only after the provider accepted the push; settled once by the
/// callback (`pending` → `successful` | `failed` | `cancelled`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "mpesa_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Option<Uuid>,
    pub phone_number: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub amount: Decimal,
    #[sea_orm(unique)]
    pub merchant_request_id: String,
    #[sea_orm(unique)]
    pub checkout_request_id: String,
    pub mpesa_receipt_number: Option<String>,
    pub transaction_date: Option<chrono::DateTime<chrono::Utc>>,
    pub status: String,
    pub result_code: Option<i32>,
    pub result_description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id"
    )]
    Order,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
