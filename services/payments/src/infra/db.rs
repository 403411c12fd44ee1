use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use soko_domain::pagination::{PageRequest, Sort};
use soko_payments_schema::{mpesa_payments, orders};

use crate::domain::repository::{OrderPort, PaymentRepository};
use crate::domain::types::{
    MpesaPayment, Order, OrderStatus, PaymentStatus, SettleOutcome, Settlement,
};
use crate::error::PaymentsServiceError;

// ── Payment repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPaymentRepository {
    pub db: DatabaseConnection,
}

impl PaymentRepository for DbPaymentRepository {
    async fn create(&self, payment: &MpesaPayment) -> Result<(), PaymentsServiceError> {
        mpesa_payments::ActiveModel {
            id: Set(payment.id),
            order_id: Set(payment.order_id),
            user_id: Set(payment.user_id),
            phone_number: Set(payment.phone_number.clone()),
            amount: Set(payment.amount),
            merchant_request_id: Set(payment.merchant_request_id.clone()),
            checkout_request_id: Set(payment.checkout_request_id.clone()),
            mpesa_receipt_number: Set(payment.receipt_number.clone()),
            transaction_date: Set(payment.transaction_date),
            status: Set(payment.status.as_str().to_owned()),
            result_code: Set(payment.result_code),
            result_description: Set(payment.result_description.clone()),
            created_at: Set(payment.created_at),
            updated_at: Set(payment.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create mpesa payment")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MpesaPayment>, PaymentsServiceError> {
        let model = mpesa_payments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find mpesa payment by id")?;
        Ok(model.map(payment_from_model).transpose()?)
    }

    async fn find_by_correlation(
        &self,
        merchant_request_id: &str,
        checkout_request_id: &str,
    ) -> Result<Option<MpesaPayment>, PaymentsServiceError> {
        let model = mpesa_payments::Entity::find()
            .filter(mpesa_payments::Column::MerchantRequestId.eq(merchant_request_id))
            .filter(mpesa_payments::Column::CheckoutRequestId.eq(checkout_request_id))
            .one(&self.db)
            .await
            .context("find mpesa payment by correlation ids")?;
        Ok(model.map(payment_from_model).transpose()?)
    }

    async fn list_by_order(
        &self,
        order_id: Uuid,
        sort: Sort,
        page: PageRequest,
    ) -> Result<Vec<MpesaPayment>, PaymentsServiceError> {
        let query = mpesa_payments::Entity::find()
            .filter(mpesa_payments::Column::OrderId.eq(order_id));
        let query = match sort {
            Sort::Desc => query
                .order_by_desc(mpesa_payments::Column::CreatedAt)
                .order_by_desc(mpesa_payments::Column::Id),
            Sort::Asc => query
                .order_by_asc(mpesa_payments::Column::CreatedAt)
                .order_by_asc(mpesa_payments::Column::Id),
        };
        let models = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .context("list mpesa payments by order")?;
        let payments = models
            .into_iter()
            .map(payment_from_model)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(payments)
    }

    async fn settle(
        &self,
        payment: &MpesaPayment,
        settlement: &Settlement,
    ) -> Result<SettleOutcome, PaymentsServiceError> {
        let payment_id = payment.id;
        let order_id = payment.order_id;

        // `None` when this call won the transition, else the status it found.
        let lost_to = self
            .db
            .transaction::<_, Option<String>, sea_orm::DbErr>(|txn| {
                let settlement = settlement.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let mut update = mpesa_payments::Entity::update_many()
                        .col_expr(
                            mpesa_payments::Column::Status,
                            Expr::value(settlement.status.as_str()),
                        )
                        .col_expr(
                            mpesa_payments::Column::ResultCode,
                            Expr::value(settlement.result_code),
                        )
                        .col_expr(
                            mpesa_payments::Column::ResultDescription,
                            Expr::value(settlement.result_description.clone()),
                        )
                        .col_expr(
                            mpesa_payments::Column::MpesaReceiptNumber,
                            Expr::value(settlement.receipt_number.clone()),
                        )
                        .col_expr(
                            mpesa_payments::Column::TransactionDate,
                            Expr::value(settlement.transaction_date),
                        )
                        .col_expr(mpesa_payments::Column::UpdatedAt, Expr::value(now));
                    if let Some(phone_number) = &settlement.phone_number {
                        update = update.col_expr(
                            mpesa_payments::Column::PhoneNumber,
                            Expr::value(phone_number.clone()),
                        );
                    }
                    let result = update
                        .filter(mpesa_payments::Column::Id.eq(payment_id))
                        .filter(mpesa_payments::Column::Status.eq(PaymentStatus::Pending.as_str()))
                        .exec(txn)
                        .await?;

                    if result.rows_affected == 0 {
                        let current = mpesa_payments::Entity::find_by_id(payment_id)
                            .one(txn)
                            .await?
                            .ok_or_else(|| {
                                sea_orm::DbErr::RecordNotFound(format!(
                                    "mpesa payment {payment_id}"
                                ))
                            })?;
                        return Ok(Some(current.status));
                    }

                    if settlement.status == PaymentStatus::Successful {
                        // A paid, shipped or delivered order keeps its first receipt.
                        let cascaded = orders::Entity::update_many()
                            .col_expr(orders::Column::Status, Expr::value(OrderStatus::Paid.as_str()))
                            .col_expr(
                                orders::Column::MpesaTransactionId,
                                Expr::value(settlement.receipt_number.clone()),
                            )
                            .col_expr(orders::Column::UpdatedAt, Expr::value(now))
                            .filter(orders::Column::Id.eq(order_id))
                            .filter(
                                orders::Column::Status
                                    .is_not_in(OrderStatus::PAID_OR_LATER.map(OrderStatus::as_str)),
                            )
                            .exec(txn)
                            .await?;
                        if cascaded.rows_affected == 0 {
                            tracing::warn!(
                                %payment_id,
                                %order_id,
                                receipt = ?settlement.receipt_number,
                                "order already paid, second successful payment kept on its own row"
                            );
                        }
                    }
                    Ok(None)
                })
            })
            .await
            .context("settle mpesa payment")?;

        match lost_to {
            None => Ok(SettleOutcome::Applied),
            Some(status) => {
                let status = status
                    .parse()
                    .with_context(|| format!("status of mpesa payment {payment_id}"))?;
                Ok(SettleOutcome::AlreadySettled(status))
            }
        }
    }
}

fn payment_from_model(model: mpesa_payments::Model) -> anyhow::Result<MpesaPayment> {
    let status = model
        .status
        .parse()
        .with_context(|| format!("status of mpesa payment {}", model.id))?;
    Ok(MpesaPayment {
        id: model.id,
        order_id: model.order_id,
        user_id: model.user_id,
        phone_number: model.phone_number,
        amount: model.amount,
        merchant_request_id: model.merchant_request_id,
        checkout_request_id: model.checkout_request_id,
        receipt_number: model.mpesa_receipt_number,
        transaction_date: model.transaction_date,
        status,
        result_code: model.result_code,
        result_description: model.result_description,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Order port ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrderPort {
    pub db: DatabaseConnection,
}

impl OrderPort for DbOrderPort {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, PaymentsServiceError> {
        let model = orders::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find order by id")?;
        Ok(model.map(order_from_model).transpose()?)
    }
}

fn order_from_model(model: orders::Model) -> anyhow::Result<Order> {
    let status = model
        .status
        .parse()
        .with_context(|| format!("status of order {}", model.id))?;
    Ok(Order {
        id: model.id,
        tenant_id: model.tenant_id,
        total_amount: model.total_amount,
        status,
    })
}
