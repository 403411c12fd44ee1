use rust_decimal_macros::dec;

use soko_domain::pagination::PageRequest;
use soko_payments::error::PaymentsServiceError;
use soko_payments::usecase::payment::ListOrderPaymentsUseCase;

use crate::helpers::{MockOrderPort, MockPaymentRepo, payment_history, test_order};

#[tokio::test]
async fn should_list_newest_attempt_first() {
    let order = test_order(dec!(300));
    let other = test_order(dec!(50));
    let mut history = payment_history(&order, 3);
    history.extend(payment_history(&other, 2));

    let uc = ListOrderPaymentsUseCase {
        repo: MockPaymentRepo::new(history),
        orders: MockOrderPort::new(vec![order.clone(), other]),
    };
    let snapshots = uc.execute(order.id, PageRequest::default()).await.unwrap();

    let checkout_ids: Vec<_> = snapshots
        .iter()
        .map(|s| s.payment.checkout_request_id.as_str())
        .collect();
    assert_eq!(checkout_ids, ["ws_CO_2", "ws_CO_1", "ws_CO_0"]);
    assert!(snapshots.iter().all(|s| s.order_total == Some(dec!(300))));
}

#[tokio::test]
async fn should_page_through_attempts() {
    let order = test_order(dec!(300));
    let uc = ListOrderPaymentsUseCase {
        repo: MockPaymentRepo::new(payment_history(&order, 5)),
        orders: MockOrderPort::new(vec![order.clone()]),
    };

    let page = uc
        .execute(order.id, PageRequest { per_page: 2, page: 3 })
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].payment.checkout_request_id, "ws_CO_0");

    // Out-of-range paging is clamped rather than rejected.
    let clamped = uc
        .execute(order.id, PageRequest { per_page: 0, page: 0 })
        .await
        .unwrap();
    assert_eq!(clamped.len(), 1);
    assert_eq!(clamped[0].payment.checkout_request_id, "ws_CO_4");
}

#[tokio::test]
async fn should_return_order_not_found_for_unknown_order() {
    let order = test_order(dec!(300));
    let uc = ListOrderPaymentsUseCase {
        repo: MockPaymentRepo::empty(),
        orders: MockOrderPort::empty(),
    };
    let result = uc.execute(order.id, PageRequest::default()).await;
    assert!(
        matches!(result, Err(PaymentsServiceError::OrderNotFound)),
        "expected OrderNotFound, got {result:?}"
    );
}
