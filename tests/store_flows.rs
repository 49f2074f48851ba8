mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{RecordingDistributor, coupon_row, count, product_row, unique, user_row};
use mall_api::{
    store::{
        CartTxResult, CartUpdateType, CreateAdminUserTxParams, CreateOrderTxParams, CreateRoleTxParams,
        CreateVerifyEmailRow, ErrorKind, PENDING_STATUS_ID, Store, UpdateAdminUserTxParams,
        UpdateCartTxParams, UpdateOrderTxParams, UpdateRoleTxParams, VerifyEmailTxParams,
        pricing::LineItem,
    },
    worker::{PayloadSendVerifyEmail, TaskDistributor, TaskOptions},
};

async fn role_with(store: &Store, prefix: &str, permissions_id: Vec<i64>) -> anyhow::Result<i64> {
    let created = store
        .create_role_tx(CreateRoleTxParams {
            name: unique(prefix),
            permissions_id,
        })
        .await?;
    Ok(created.role.id)
}

fn admin_params(account: &str, roles_id: Vec<i64>) -> CreateAdminUserTxParams {
    CreateAdminUserTxParams {
        account: account.to_string(),
        full_name: "Alice".to_string(),
        hashed_password: "h".to_string(),
        status: 1,
        roles_id,
    }
}

async fn admin_accounts(pool: &sqlx::PgPool, account: &str) -> anyhow::Result<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin_users WHERE account = $1")
        .bind(account)
        .fetch_one(pool)
        .await?;
    Ok(n)
}

#[tokio::test]
async fn admin_user_with_two_roles_then_duplicate_account() -> anyhow::Result<()> {
    let Some(db) = common::setup().await? else {
        return Ok(());
    };

    let admin_role = role_with(&db.store, "admin", vec![1, 2]).await?;
    let auditor_role = role_with(&db.store, "auditor", vec![2, 3]).await?;
    let account = unique("alice");

    let created = db
        .store
        .create_admin_user_tx(admin_params(&account, vec![admin_role, auditor_role]))
        .await?;
    assert_eq!(created.admin_user.account, account);
    let permission_ids: Vec<i64> = created.permissions.iter().map(|p| p.id).collect();
    assert_eq!(permission_ids, vec![1, 2, 3]);
    let admin_id = created.admin_user.id;
    assert_eq!(
        count(&db.pool, "SELECT COUNT(*) FROM admin_user_roles WHERE admin_user_id = $1", admin_id).await?,
        2
    );

    let err = db
        .store
        .create_admin_user_tx(admin_params(&account, vec![admin_role, auditor_role]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UniqueViolation);
    assert_eq!(admin_accounts(&db.pool, &account).await?, 1);
    assert_eq!(
        count(&db.pool, "SELECT COUNT(*) FROM admin_user_roles WHERE admin_user_id = $1", admin_id).await?,
        2
    );
    Ok(())
}

#[tokio::test]
async fn admin_user_without_roles_leaves_nothing_behind() -> anyhow::Result<()> {
    let Some(db) = common::setup().await? else {
        return Ok(());
    };

    let account = unique("noroles");
    let err = db
        .store
        .create_admin_user_tx(admin_params(&account, Vec::new()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CheckViolation);
    assert_eq!(admin_accounts(&db.pool, &account).await?, 0);
    Ok(())
}

#[tokio::test]
async fn unknown_role_rolls_back_admin_user() -> anyhow::Result<()> {
    let Some(db) = common::setup().await? else {
        return Ok(());
    };

    let account = unique("ghostrole");
    let err = db
        .store
        .create_admin_user_tx(admin_params(&account, vec![i64::MAX]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ForeignKeyViolation);
    assert_eq!(admin_accounts(&db.pool, &account).await?, 0);
    Ok(())
}

#[tokio::test]
async fn admin_user_role_set_is_replaced_wholesale() -> anyhow::Result<()> {
    let Some(db) = common::setup().await? else {
        return Ok(());
    };

    let catalog = role_with(&db.store, "catalog", vec![1, 2]).await?;
    let coupons = role_with(&db.store, "coupons", vec![4]).await?;
    let news = role_with(&db.store, "news", vec![5, 3]).await?;
    let created = db
        .store
        .create_admin_user_tx(admin_params(&unique("rotate"), vec![catalog, coupons]))
        .await?;
    let admin_id = created.admin_user.id;
    let roles_sql = "SELECT COUNT(*) FROM admin_user_roles WHERE admin_user_id = $1";

    let narrowed = db
        .store
        .update_admin_user_tx(UpdateAdminUserTxParams {
            id: admin_id,
            roles_id: Some(vec![news]),
            ..Default::default()
        })
        .await?;
    let ids: Vec<i64> = narrowed.permissions.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![3, 5]);
    assert_eq!(narrowed.roles.len(), 1);
    assert_eq!(count(&db.pool, roles_sql, admin_id).await?, 1);

    let widened = db
        .store
        .update_admin_user_tx(UpdateAdminUserTxParams {
            id: admin_id,
            roles_id: Some(vec![catalog, news, catalog]),
            ..Default::default()
        })
        .await?;
    let ids: Vec<i64> = widened.permissions.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 5]);
    assert_eq!(count(&db.pool, roles_sql, admin_id).await?, 2);

    let untouched = db
        .store
        .update_admin_user_tx(UpdateAdminUserTxParams {
            id: admin_id,
            full_name: Some("Renamed".to_string()),
            ..Default::default()
        })
        .await?;
    assert_eq!(untouched.admin_user.full_name, "Renamed");
    assert_eq!(count(&db.pool, roles_sql, admin_id).await?, 2);
    Ok(())
}

#[tokio::test]
async fn role_delete_blocked_by_assigned_admin() -> anyhow::Result<()> {
    let Some(db) = common::setup().await? else {
        return Ok(());
    };

    let role_id = role_with(&db.store, "ops", vec![3]).await?;
    let admin = db
        .store
        .create_admin_user_tx(admin_params(&unique("opsadmin"), vec![role_id]))
        .await?;

    let err = db.store.delete_role_tx(role_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ForeignKeyViolation);

    let role = db.store.get_role_detail(role_id).await?;
    assert_eq!(role.permissions.len(), 1);
    assert_eq!(
        count(
            &db.pool,
            "SELECT COUNT(*) FROM admin_user_roles WHERE admin_user_id = $1",
            admin.admin_user.id
        )
        .await?,
        1
    );
    Ok(())
}

#[tokio::test]
async fn role_update_replaces_permission_set() -> anyhow::Result<()> {
    let Some(db) = common::setup().await? else {
        return Ok(());
    };

    let role_id = role_with(&db.store, "editor", vec![1, 2]).await?;
    let updated = db
        .store
        .update_role_tx(UpdateRoleTxParams {
            id: role_id,
            name: None,
            permissions_id: Some(vec![5, 2, 4]),
        })
        .await?;

    let ids: BTreeSet<i64> = updated.permissions.iter().map(|p| p.id).collect();
    assert_eq!(ids, BTreeSet::from([2, 4, 5]));

    let reread: BTreeSet<i64> = db
        .store
        .get_role_detail(role_id)
        .await?
        .permissions
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(reread, ids);
    Ok(())
}

struct OrderFixture {
    user_id: i64,
    p1: i64,
    p2: i64,
    coupon_id: i64,
}

async fn order_fixture(db: &common::TestDb) -> anyhow::Result<OrderFixture> {
    let queries = db.store.queries();
    let user = queries.create_user(user_row(&unique("buyer"))).await?;
    let p1 = queries.create_product(product_row("p1", 100, 90)).await?;
    let p2 = queries.create_product(product_row("p2", 50, 40)).await?;
    let coupon = queries.create_coupon(coupon_row(10)).await?;
    Ok(OrderFixture {
        user_id: user.id,
        p1: p1.id,
        p2: p2.id,
        coupon_id: coupon.id,
    })
}

fn order_params(fx: &OrderFixture, lines: Vec<LineItem>, coupon_id: Option<i64>) -> CreateOrderTxParams {
    CreateOrderTxParams {
        user_id: fx.user_id,
        full_name: "Buyer".to_string(),
        email: "buyer@example.com".to_string(),
        shipping_address: "1 Main St".to_string(),
        message: String::new(),
        pay_method_id: 1,
        status_id: PENDING_STATUS_ID,
        order_products: lines,
        coupon_id,
    }
}

#[tokio::test]
async fn order_with_coupon_then_line_replacement_then_delete() -> anyhow::Result<()> {
    let Some(db) = common::setup().await? else {
        return Ok(());
    };
    let fx = order_fixture(&db).await?;

    let created = db
        .store
        .create_order_tx(order_params(
            &fx,
            vec![
                LineItem { product_id: fx.p1, num: 2 },
                LineItem { product_id: fx.p2, num: 3 },
            ],
            Some(fx.coupon_id),
        ))
        .await?;
    let order_id = created.order.id;
    assert_eq!(created.order.total_price, 350);
    assert_eq!(created.order.final_price, 270);
    assert_eq!(created.coupon.as_ref().map(|c| c.id), Some(fx.coupon_id));
    assert_eq!(created.user_id, Some(fx.user_id));
    assert_eq!(created.product_list.len(), 2);
    assert_eq!(
        count(&db.pool, "SELECT COUNT(*) FROM order_coupons WHERE order_id = $1", order_id).await?,
        1
    );

    let updated = db
        .store
        .update_order_tx(UpdateOrderTxParams {
            id: order_id,
            order_products: Some(vec![LineItem { product_id: fx.p1, num: 1 }]),
            ..Default::default()
        })
        .await?;
    assert_eq!(updated.order.total_price, 100);
    assert_eq!(updated.order.final_price, 81);
    assert_eq!(
        count(&db.pool, "SELECT COUNT(*) FROM order_products WHERE order_id = $1", order_id).await?,
        1
    );

    db.store.delete_order_tx(order_id).await?;
    for table in ["order_users", "order_products", "order_coupons"] {
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE order_id = $1");
        assert_eq!(count(&db.pool, &sql, order_id).await?, 0, "{table} still references the order");
    }
    assert_eq!(
        db.store.delete_order_tx(order_id).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    Ok(())
}

#[tokio::test]
async fn order_without_coupon_keeps_line_prices() -> anyhow::Result<()> {
    let Some(db) = common::setup().await? else {
        return Ok(());
    };
    let fx = order_fixture(&db).await?;

    let created = db
        .store
        .create_order_tx(order_params(
            &fx,
            vec![
                LineItem { product_id: fx.p1, num: 1 },
                LineItem { product_id: fx.p2, num: 2 },
                LineItem { product_id: fx.p1, num: 1 },
            ],
            Some(0),
        ))
        .await?;
    assert!(created.coupon.is_none());
    assert_eq!(created.order.total_price, 2 * 100 + 2 * 50);
    assert_eq!(created.order.final_price, 2 * 90 + 2 * 40);
    assert_eq!(created.product_list.len(), 2);
    Ok(())
}

#[tokio::test]
async fn zero_coupon_id_removes_discount_from_order() -> anyhow::Result<()> {
    let Some(db) = common::setup().await? else {
        return Ok(());
    };
    let fx = order_fixture(&db).await?;

    let created = db
        .store
        .create_order_tx(order_params(
            &fx,
            vec![
                LineItem { product_id: fx.p1, num: 2 },
                LineItem { product_id: fx.p2, num: 3 },
            ],
            Some(fx.coupon_id),
        ))
        .await?;
    assert_eq!(created.order.final_price, 270);

    let cleared = db
        .store
        .update_order_tx(UpdateOrderTxParams {
            id: created.order.id,
            coupon_id: Some(0),
            ..Default::default()
        })
        .await?;
    assert!(cleared.coupon.is_none());
    assert_eq!(cleared.order.total_price, 350);
    assert_eq!(cleared.order.final_price, 300);
    assert_eq!(
        count(&db.pool, "SELECT COUNT(*) FROM order_coupons WHERE order_id = $1", created.order.id).await?,
        0
    );
    assert_eq!(cleared.product_list.len(), 2);
    Ok(())
}

#[tokio::test]
async fn coupon_added_later_discounts_existing_lines() -> anyhow::Result<()> {
    let Some(db) = common::setup().await? else {
        return Ok(());
    };
    let fx = order_fixture(&db).await?;

    let created = db
        .store
        .create_order_tx(order_params(
            &fx,
            vec![
                LineItem { product_id: fx.p1, num: 2 },
                LineItem { product_id: fx.p2, num: 3 },
            ],
            None,
        ))
        .await?;
    assert_eq!(created.order.final_price, 300);

    let discounted = db
        .store
        .update_order_tx(UpdateOrderTxParams {
            id: created.order.id,
            coupon_id: Some(fx.coupon_id),
            ..Default::default()
        })
        .await?;
    assert_eq!(discounted.coupon.as_ref().map(|c| c.id), Some(fx.coupon_id));
    assert_eq!(discounted.order.total_price, 350);
    assert_eq!(discounted.order.final_price, 270);
    assert_eq!(
        count(&db.pool, "SELECT COUNT(*) FROM order_products WHERE order_id = $1", created.order.id).await?,
        2
    );

    let message_only = db
        .store
        .update_order_tx(UpdateOrderTxParams {
            id: created.order.id,
            message: Some("leave at the door".to_string()),
            ..Default::default()
        })
        .await?;
    assert_eq!(message_only.order.final_price, 270);
    assert_eq!(message_only.coupon.map(|c| c.id), Some(fx.coupon_id));
    Ok(())
}

#[tokio::test]
async fn cart_totals_follow_lines_and_coupon() -> anyhow::Result<()> {
    let Some(db) = common::setup().await? else {
        return Ok(());
    };

    let account = unique("cart");
    db.store
        .create_user_tx(user_row(&account), |_| async { Ok(()) })
        .await?;
    let queries = db.store.queries();
    let p1 = queries.create_product(product_row("p1", 100, 90)).await?.id;
    let p2 = queries.create_product(product_row("p2", 50, 40)).await?.id;
    let ten = queries.create_coupon(coupon_row(10)).await?;
    let quarter = queries.create_coupon(coupon_row(25)).await?;

    let change = |update_type: CartUpdateType, product_id: i64, num: i32, coupon_code: Option<&str>| UpdateCartTxParams {
        account: account.clone(),
        update_type,
        product_id,
        num,
        coupon_code: coupon_code.map(str::to_string),
    };
    let num_of = |result: &CartTxResult, product_id: i64| {
        result
            .product_list
            .iter()
            .find(|line| line.product.id == product_id)
            .map(|line| line.num)
    };

    db.store.update_cart_tx(change(CartUpdateType::Add, p1, 1, None)).await?;
    let cart = db.store.update_cart_tx(change(CartUpdateType::Add, p1, 2, None)).await?;
    assert_eq!(num_of(&cart, p1), Some(3));
    assert_eq!((cart.cart.total_price, cart.cart.final_price), (300, 270));

    let cart = db.store.update_cart_tx(change(CartUpdateType::Update, p1, 1, None)).await?;
    assert_eq!(num_of(&cart, p1), Some(1));
    assert_eq!((cart.cart.total_price, cart.cart.final_price), (100, 90));

    let cart = db
        .store
        .update_cart_tx(change(CartUpdateType::Add, p2, 2, Some(&ten.code)))
        .await?;
    assert_eq!(cart.product_list.len(), 2);
    assert_eq!(cart.coupon.as_ref().map(|c| c.id), Some(ten.id));
    assert_eq!((cart.cart.total_price, cart.cart.final_price), (200, 153));

    // No code keeps the attached coupon.
    let cart = db.store.update_cart_tx(change(CartUpdateType::Add, p2, 1, None)).await?;
    assert_eq!(num_of(&cart, p2), Some(3));
    assert_eq!(cart.coupon.as_ref().map(|c| c.id), Some(ten.id));
    assert_eq!((cart.cart.total_price, cart.cart.final_price), (250, 189));

    let cart = db
        .store
        .update_cart_tx(change(CartUpdateType::Update, p2, 3, Some(&quarter.code)))
        .await?;
    assert_eq!(cart.coupon.as_ref().map(|c| c.id), Some(quarter.id));
    assert_eq!((cart.cart.total_price, cart.cart.final_price), (250, 157));
    assert_eq!(
        count(&db.pool, "SELECT COUNT(*) FROM cart_coupons WHERE cart_id = $1", cart.cart.id).await?,
        1
    );

    let reread = db.store.get_cart(&account).await?;
    assert_eq!(reread.cart.final_price, 157);
    assert_eq!(reread.product_list.len(), 2);
    Ok(())
}

#[tokio::test]
async fn order_without_lines_leaves_nothing_behind() -> anyhow::Result<()> {
    let Some(db) = common::setup().await? else {
        return Ok(());
    };
    let fx = order_fixture(&db).await?;

    let err = db
        .store
        .create_order_tx(order_params(&fx, Vec::new(), Some(fx.coupon_id)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CheckViolation);
    assert_eq!(
        count(&db.pool, "SELECT COUNT(*) FROM order_users WHERE user_id = $1", fx.user_id).await?,
        0
    );
    Ok(())
}

#[tokio::test]
async fn verify_email_code_is_single_use() -> anyhow::Result<()> {
    let Some(db) = common::setup().await? else {
        return Ok(());
    };

    let distributor = Arc::new(RecordingDistributor::default());
    let hook_distributor = distributor.clone();
    let account = unique("verify");
    let created = db
        .store
        .create_user_tx(user_row(&account), move |user| async move {
            hook_distributor
                .distribute_task_send_verify_email(
                    &PayloadSendVerifyEmail {
                        account: user.account,
                    },
                    TaskOptions::critical(),
                )
                .await
        })
        .await?;
    assert_eq!(distributor.sent.lock().unwrap().len(), 1);
    assert!(!created.user.is_email_verified);

    let secret_code = "x".repeat(32);
    let verify_email = db
        .store
        .queries()
        .create_verify_email(CreateVerifyEmailRow {
            user_id: created.user.id,
            email: created.user.email.clone(),
            secret_code: secret_code.clone(),
            expires_at: Utc::now() + Duration::minutes(15),
        })
        .await?;

    let params = VerifyEmailTxParams {
        email_id: verify_email.id,
        secret_code,
    };
    let first = db.store.verify_email_tx(params.clone()).await?;
    assert!(first.user.is_email_verified);

    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    let err = db.store.verify_email_tx(params).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let user = db.store.queries().get_user_by_account(&account).await?;
    assert!(user.is_email_verified);
    Ok(())
}

#[tokio::test]
async fn failed_enqueue_rolls_back_registration() -> anyhow::Result<()> {
    let Some(db) = common::setup().await? else {
        return Ok(());
    };

    let distributor = RecordingDistributor::failing();
    let account = unique("rollback");
    let err = db
        .store
        .create_user_tx(user_row(&account), move |user| async move {
            distributor
                .distribute_task_send_verify_email(
                    &PayloadSendVerifyEmail {
                        account: user.account,
                    },
                    TaskOptions::critical(),
                )
                .await
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Other);

    assert_eq!(
        db.store.queries().get_user_by_account(&account).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        db.store.queries().get_cart_by_owner(&account).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    Ok(())
}

#[tokio::test]
async fn concurrent_registration_of_one_account() -> anyhow::Result<()> {
    let Some(db) = common::setup().await? else {
        return Ok(());
    };

    let account = unique("race");
    let (a, b) = tokio::join!(
        db.store.create_user_tx(user_row(&account), |_| async { Ok(()) }),
        db.store.create_user_tx(user_row(&account), |_| async { Ok(()) }),
    );

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    let loser = outcomes.into_iter().find_map(Result::err).expect("one registration fails");
    assert_eq!(loser.kind(), ErrorKind::UniqueViolation);
    Ok(())
}
