use sea_orm::entity::prelude::*;

/// Storefront order, reduced to the columns the payment flow reads or writes.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_amount: Decimal,
    pub status: String,
    /// Receipt number of the payment that settled the order, if any.
    pub mpesa_transaction_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::mpesa_payments::Entity")]
    MpesaPayments,
}

impl Related<super::mpesa_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MpesaPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
