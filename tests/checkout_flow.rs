//! Integration tests for placing and tracking orders

use meg_store::prelude::*;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::NGN};
use testresult::TestResult;

fn fixture() -> Result<Fixture<'static>, FixtureError> {
    Fixture::from_set_in(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures"), "meg-store")
}

fn delivery() -> DeliveryRate<'static> {
    DeliveryRate::per_item(Money::from_minor(200_00, NGN))
}

fn customer(user_id: Option<&str>) -> Customer {
    Customer {
        user_id: user_id.map(str::to_string),
        name: "Ada Obi".to_string(),
        email: "ada@example.com".to_string(),
    }
}

#[test]
fn successful_checkout_records_order_and_empties_cart() -> TestResult {
    let fixture = fixture()?;
    let catalog = fixture.catalog();
    let coupons = fixture.coupon_table();
    let dir = tempfile::tempdir()?;
    let mut orders = JsonOrderStore::new(dir.path());
    let mut service = CartService::new(
        fixture.currency()?,
        &catalog,
        &coupons,
        delivery(),
        MemoryCartStore::new(),
    );

    let blender = catalog.product(&ProductId::from("5")).ok_or("no blender")?;
    service.add(blender, 2)?;
    service.apply_coupon("SAVE10")?;

    let shown = service.totals()?;
    let gateway = SimulatedGateway::new(SimulatedOutcome::Succeed);
    let order = place_order(&mut service, &gateway, &mut orders, &customer(None))?;

    assert_eq!(order.grand_total, Decimal::from(2020));
    assert_eq!(order.grand_total, meg_store::money::to_decimal(&shown.grand_total()));
    assert_eq!(order.coupon.as_deref(), Some("SAVE10"));
    assert_eq!(order.currency, "NGN");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.item_count(), 2);
    assert_eq!(order.tracking, Some(format!("SIM-{}", order.id)));
    assert!(order.is_balanced(), "stored amounts add up");
    assert!(order.id.as_str().starts_with("ORD-"));

    assert!(service.ledger().is_empty());
    assert!(service.coupon().is_none());

    let saved = orders.orders_for(&OrderOwner::Guest)?;

    assert_eq!(saved, vec![order]);
    assert!(dir.path().join("orders_guest.json").exists());

    Ok(())
}

#[test]
fn declined_payment_keeps_cart_and_records_nothing() -> TestResult {
    let fixture = fixture()?;
    let catalog = fixture.catalog();
    let coupons = fixture.coupon_table();
    let dir = tempfile::tempdir()?;
    let mut orders = JsonOrderStore::new(dir.path());
    let mut service = CartService::new(
        fixture.currency()?,
        &catalog,
        &coupons,
        delivery(),
        MemoryCartStore::new(),
    );

    let shoes = catalog.product(&ProductId::from("2")).ok_or("no shoes")?;
    service.add(shoes, 1)?;

    let gateway = SimulatedGateway::new(SimulatedOutcome::Decline);
    let result = place_order(&mut service, &gateway, &mut orders, &customer(None));

    assert!(matches!(result, Err(CheckoutError::PaymentFailed { .. })));
    assert_eq!(service.count(), 1);
    assert!(orders.all_orders()?.is_empty());

    let gateway = SimulatedGateway::new(SimulatedOutcome::Cancel);
    let result = place_order(&mut service, &gateway, &mut orders, &customer(None));

    assert!(matches!(result, Err(CheckoutError::PaymentCancelled(_))));
    assert_eq!(service.count(), 1);

    Ok(())
}

#[test]
fn empty_cart_cannot_check_out() -> TestResult {
    let fixture = fixture()?;
    let catalog = fixture.catalog();
    let coupons = fixture.coupon_table();
    let mut orders = MemoryOrderStore::new();
    let mut service = CartService::new(
        fixture.currency()?,
        &catalog,
        &coupons,
        delivery(),
        MemoryCartStore::new(),
    );

    let gateway = SimulatedGateway::new(SimulatedOutcome::Succeed);
    let result = place_order(&mut service, &gateway, &mut orders, &customer(None));

    assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    assert!(orders.is_empty());

    Ok(())
}

#[test]
fn user_orders_are_kept_apart_and_status_can_change() -> TestResult {
    let fixture = fixture()?;
    let catalog = fixture.catalog();
    let coupons = fixture.coupon_table();
    let dir = tempfile::tempdir()?;
    let mut orders = JsonOrderStore::new(dir.path());
    let gateway = SimulatedGateway::new(SimulatedOutcome::Succeed);
    let mut service = CartService::new(
        fixture.currency()?,
        &catalog,
        &coupons,
        delivery(),
        MemoryCartStore::new(),
    );

    let watch = catalog.product(&ProductId::from("3")).ok_or("no watch")?;
    let backpack = catalog.product(&ProductId::from("4")).ok_or("no backpack")?;

    service.add(watch, 1)?;
    let user_order = place_order(
        &mut service,
        &gateway,
        &mut orders,
        &customer(Some("user-123456789")),
    )?;

    service.add(backpack, 1)?;
    let guest_order = place_order(&mut service, &gateway, &mut orders, &customer(None))?;

    let owner = OrderOwner::from_user(Some("user-123456789"));

    assert!(user_order.id.as_str().starts_with("user-1_ORD-"));
    assert_eq!(orders.orders_for(&owner)?, vec![user_order.clone()]);
    assert_eq!(orders.orders_for(&OrderOwner::Guest)?, vec![guest_order]);
    assert_eq!(orders.all_orders()?.len(), 2);

    assert!(orders.update_status(&user_order.id, OrderStatus::Shipped)?);
    assert_eq!(
        orders.order(&owner, &user_order.id)?.map(|order| order.status),
        Some(OrderStatus::Shipped)
    );
    assert!(!orders.update_status(&OrderId::from("ORD-missing"), OrderStatus::Delivered)?);

    Ok(())
}
