//! Placing cash orders from carts, and reading placed orders back.
use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    db::models::{
        apporder::{AppOrder, AppOrderInsert, ShippingAddress},
        appuser::AppUser,
        cart::Cart,
    },
    services::errors::StorageError,
    store::OrderStore,
};

/// Load the cart an order is about to be placed from, checking the shipping
/// address first. Carts belonging to someone else are reported as missing.
pub async fn load_cart_for_order(
    user: &AppUser,
    cart_id: Uuid,
    shipping_address: &ShippingAddress,
    store: &dyn OrderStore,
) -> Result<Cart, errors::OrderPlacementError> {
    shipping_address
        .validate()
        .map_err(errors::OrderPlacementError::InvalidShippingAddress)?;
    let cart = store
        .find_cart(cart_id)
        .await?
        .ok_or(errors::OrderPlacementError::CartNonExistent(cart_id))?;
    if cart.user_id() != user.id() {
        tracing::warn!(
            user_id = %user.id(),
            %cart_id,
            owner = %cart.user_id(),
            "Attempted to order from a cart owned by another user"
        );
        return Err(errors::OrderPlacementError::CartNonExistent(cart_id));
    }
    if cart.items.is_empty() {
        return Err(errors::OrderPlacementError::CartEmpty(cart_id));
    }
    Ok(cart)
}

/// Place an unpaid cash-on-delivery order for everything in the user's cart.
pub async fn create_cash_order(
    user: &AppUser,
    cart_id: Uuid,
    shipping_address: ShippingAddress,
    store: &dyn OrderStore,
) -> Result<AppOrder, errors::OrderPlacementError> {
    load_cart_for_order(user, cart_id, &shipping_address, store).await?;
    let order = store
        .place_order(cart_id, AppOrderInsert::cash(user.id(), shipping_address))
        .await?
        .ok_or(errors::OrderPlacementError::CartNonExistent(cart_id))?;
    tracing::info!(
        order_id = %order.id(),
        user_id = %user.id(),
        amount = order.total_order_price,
        "Placed cash order"
    );
    Ok(order)
}

/// The user's most recent order, with product details attached to its items.
pub async fn get_user_order(
    user_id: Uuid,
    store: &dyn OrderStore,
) -> Result<Option<AppOrder>, StorageError> {
    let Some(order) = store.latest_order_for_user(user_id).await? else {
        return Ok(None);
    };
    let mut orders = [order];
    populate_products(&mut orders, store).await?;
    let [order] = orders;
    Ok(Some(order))
}

/// Every order, newest first, with product details attached to their items.
pub async fn get_all_orders(store: &dyn OrderStore) -> Result<Vec<AppOrder>, StorageError> {
    let mut orders = store.all_orders().await?;
    populate_products(&mut orders, store).await?;
    Ok(orders)
}

async fn populate_products(
    orders: &mut [AppOrder],
    store: &dyn OrderStore,
) -> Result<(), StorageError> {
    let mut product_ids: Vec<Uuid> = orders
        .iter()
        .flat_map(|order| order.items.iter().map(|item| item.product_id))
        .collect();
    product_ids.sort_unstable();
    product_ids.dedup();
    if product_ids.is_empty() {
        return Ok(());
    }
    let products: HashMap<Uuid, _> = store
        .find_products(&product_ids)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect();
    for item in orders.iter_mut().flat_map(|order| order.items.iter_mut()) {
        item.product = products.get(&item.product_id).cloned();
    }
    Ok(())
}

pub mod errors {
    use thiserror::Error;
    use uuid::Uuid;

    use crate::services::errors::StorageError;

    #[derive(Error, Debug)]
    pub enum OrderPlacementError {
        #[error(transparent)]
        StorageError(#[from] StorageError),
        #[error("{0}")]
        InvalidShippingAddress(String),
        #[error("Cart does not exist")]
        CartNonExistent(Uuid),
        #[error("Cart is empty")]
        CartEmpty(Uuid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::models::{
            apporder::PaymentMethod,
            appuser::AppUserRole,
            cart::CartItem,
            product::{ProductStock, ProductSummary},
        },
        store::InMemoryStore,
        utils::email::EmailAddress,
    };

    fn customer(email: &str) -> AppUser {
        AppUser::new(
            Uuid::new_v4(),
            "Karim",
            EmailAddress::try_from(email).unwrap(),
            AppUserRole::Customer,
        )
    }

    fn shipping() -> ShippingAddress {
        ShippingAddress {
            details: String::from("21 Salah Salem"),
            phone: String::from("+201005550000"),
            city: String::from("Cairo"),
        }
    }

    struct Fixture {
        store: InMemoryStore,
        user: AppUser,
        cart: Cart,
        product_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let user = customer("karim@example.com");
        store.insert_user(user.clone()).await;
        let product_id = Uuid::new_v4();
        store
            .insert_product(
                ProductSummary {
                    id: product_id,
                    title: String::from("Notebook"),
                    price: 4_500,
                },
                ProductStock {
                    quantity: 20,
                    sold: 3,
                },
            )
            .await;
        let cart = Cart::new(
            Uuid::new_v4(),
            user.id(),
            vec![CartItem {
                product_id,
                quantity: 4,
                price: 4_500,
            }],
            18_000,
            None,
        );
        store.insert_cart(cart.clone()).await;
        Fixture {
            store,
            user,
            cart,
            product_id,
        }
    }

    #[tokio::test]
    async fn cash_order_is_placed_from_cart() {
        let f = fixture().await;

        let order = create_cash_order(&f.user, f.cart.id(), shipping(), &f.store)
            .await
            .unwrap();

        assert_eq!(order.user_id(), f.user.id());
        assert_eq!(order.total_order_price, 18_000);
        assert_eq!(order.payment_method, PaymentMethod::Cash);
        assert!(!order.is_paid);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.shipping_address, Some(shipping()));
        assert!(!f.store.has_cart(f.cart.id()).await);
        assert_eq!(
            f.store.stock(f.product_id).await,
            Some(ProductStock {
                quantity: 16,
                sold: 7
            })
        );
    }

    #[tokio::test]
    async fn cash_order_for_missing_cart_is_rejected() {
        let f = fixture().await;
        let missing = Uuid::new_v4();

        let result = create_cash_order(&f.user, missing, shipping(), &f.store).await;

        assert!(matches!(
            result,
            Err(errors::OrderPlacementError::CartNonExistent(id)) if id == missing
        ));
        assert_eq!(f.store.order_count().await, 0);
    }

    #[tokio::test]
    async fn someone_elses_cart_looks_missing() {
        let f = fixture().await;
        let intruder = customer("intruder@example.com");

        let result = create_cash_order(&intruder, f.cart.id(), shipping(), &f.store).await;

        assert!(matches!(
            result,
            Err(errors::OrderPlacementError::CartNonExistent(_))
        ));
        assert!(f.store.has_cart(f.cart.id()).await);
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let f = fixture().await;
        let empty = Cart::new(Uuid::new_v4(), f.user.id(), Vec::new(), 0, None);
        f.store.insert_cart(empty.clone()).await;

        let result = create_cash_order(&f.user, empty.id(), shipping(), &f.store).await;

        assert!(matches!(result, Err(errors::OrderPlacementError::CartEmpty(_))));
        assert!(f.store.has_cart(empty.id()).await);
    }

    #[tokio::test]
    async fn invalid_shipping_address_is_rejected_before_touching_the_cart() {
        let f = fixture().await;
        let mut address = shipping();
        address.details = String::new();

        let result = create_cash_order(&f.user, f.cart.id(), address, &f.store).await;

        assert!(matches!(
            result,
            Err(errors::OrderPlacementError::InvalidShippingAddress(_))
        ));
        assert!(f.store.has_cart(f.cart.id()).await);
    }

    #[tokio::test]
    async fn user_order_has_product_details() {
        let f = fixture().await;
        create_cash_order(&f.user, f.cart.id(), shipping(), &f.store)
            .await
            .unwrap();

        let order = get_user_order(f.user.id(), &f.store).await.unwrap().unwrap();

        let product = order.items[0].product.as_ref().unwrap();
        assert_eq!(product.title, "Notebook");
        assert!(get_user_order(Uuid::new_v4(), &f.store).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn all_orders_lists_every_customer() {
        let f = fixture().await;
        create_cash_order(&f.user, f.cart.id(), shipping(), &f.store)
            .await
            .unwrap();
        let other = customer("other@example.com");
        let cart = Cart::new(
            Uuid::new_v4(),
            other.id(),
            vec![CartItem {
                product_id: Uuid::new_v4(),
                quantity: 1,
                price: 700,
            }],
            700,
            None,
        );
        f.store.insert_cart(cart.clone()).await;
        create_cash_order(&other, cart.id(), shipping(), &f.store)
            .await
            .unwrap();

        let orders = get_all_orders(&f.store).await.unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].user_id(), other.id(), "newest first");
        assert!(orders[0].items[0].product.is_none(), "unknown products stay unpopulated");
    }
}
