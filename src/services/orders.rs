use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::entities::{order, order_item, product, user};
use crate::error::StoreError;

#[derive(Serialize, Debug)]
pub struct OrderLine {
    pub product_id: i32,
    pub product_name: String,
    pub product_slug: String,
    pub quantity: i32,
    pub price: Decimal,
    pub line_total: Decimal,
}

#[derive(Serialize, Debug)]
pub struct OrderDetail {
    pub order: order::Model,
    pub items: Vec<OrderLine>,
}

#[derive(Serialize, Debug)]
pub struct Profile {
    pub username: String,
    pub email: String,
    pub orders: Vec<order::Model>,
}

/// The user's orders, newest first.
pub async fn list_orders<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Vec<order::Model>, StoreError> {
    Ok(order::Entity::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?)
}

/// Looks an order up on behalf of `user_id`. Orders of other users are
/// reported exactly like ids that do not exist.
pub async fn get_order<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    order_id: i32,
) -> Result<OrderDetail, StoreError> {
    let order = order::Entity::find_by_id(order_id)
        .filter(order::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| StoreError::not_found("Order"))?;

    let items = order_lines(db, order.id).await?;
    Ok(OrderDetail { order, items })
}

pub(crate) async fn order_lines<C: ConnectionTrait>(
    db: &C,
    order_id: i32,
) -> Result<Vec<OrderLine>, StoreError> {
    let rows = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .find_also_related(product::Entity)
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(item, product)| {
            let (product_name, product_slug) = product
                .map(|product| (product.name, product.slug))
                .unwrap_or_default();
            OrderLine {
                product_id: item.product_id,
                product_name,
                product_slug,
                quantity: item.quantity,
                price: item.price,
                line_total: item.price * Decimal::from(item.quantity),
            }
        })
        .collect())
}

pub async fn profile<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Profile, StoreError> {
    let user = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| StoreError::not_found("User"))?;
    let orders = list_orders(db, user_id).await?;

    Ok(Profile {
        username: user.username,
        email: user.email,
        orders,
    })
}
