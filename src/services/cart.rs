use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::Serialize;

use crate::entities::{cart, cart_item, product};
use crate::error::StoreError;

#[derive(Serialize, Debug, Clone)]
pub struct CartLine {
    pub product_id: i32,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

#[derive(Serialize, Debug)]
pub struct CartView {
    pub cart_id: i32,
    pub items: Vec<CartLine>,
    pub total: Decimal,
}

/// Cart item paired with the product it points at, as currently stored.
pub(crate) type StoredLine = (cart_item::Model, product::Model);

pub async fn find_cart<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<Option<cart::Model>, StoreError> {
    Ok(cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

/// Returns the user's cart, creating it first when there is none. The insert
/// is an upsert on `user_id`, so racing first requests still end with one cart.
pub async fn get_or_create_cart<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<cart::Model, StoreError> {
    let new_cart = cart::ActiveModel {
        user_id: Set(user_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match cart::Entity::insert(new_cart)
        .on_conflict(
            OnConflict::column(cart::Column::UserId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await
    {
        Ok(_) | Err(DbErr::RecordNotInserted) => {}
        Err(err) => return Err(err.into()),
    }

    find_cart(db, user_id)
        .await?
        .ok_or_else(|| StoreError::not_found("Cart"))
}

pub(crate) async fn load_lines<C: ConnectionTrait>(
    db: &C,
    cart_id: i32,
) -> Result<Vec<StoredLine>, StoreError> {
    let rows = cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .find_also_related(product::Entity)
        .order_by_asc(cart_item::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(item, product)| product.map(|product| (item, product)))
        .collect())
}

/// Σ(price × quantity) over the given lines, using the prices stored right now.
pub(crate) fn lines_total(lines: &[StoredLine]) -> Decimal {
    lines
        .iter()
        .map(|(item, product)| product.price * Decimal::from(item.quantity))
        .sum()
}

pub(crate) fn build_view(cart_id: i32, lines: Vec<StoredLine>) -> CartView {
    let total = lines_total(&lines);
    let items = lines
        .into_iter()
        .map(|(item, product)| CartLine {
            line_total: product.price * Decimal::from(item.quantity),
            product_id: product.id,
            name: product.name,
            slug: product.slug,
            price: product.price,
            quantity: item.quantity,
        })
        .collect();

    CartView {
        cart_id,
        items,
        total,
    }
}

pub async fn view_cart<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<CartView, StoreError> {
    let cart = get_or_create_cart(db, user_id).await?;
    let lines = load_lines(db, cart.id).await?;
    Ok(build_view(cart.id, lines))
}

async fn find_item<C: ConnectionTrait>(
    db: &C,
    cart_id: i32,
    product_id: i32,
) -> Result<Option<cart_item::Model>, StoreError> {
    Ok(cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(db)
        .await?)
}

/// Puts one more unit of the product into the user's cart.
///
/// New lines start at quantity 1, existing lines are incremented in the same
/// statement. Stock is not consulted.
pub async fn add_item<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    product_id: i32,
) -> Result<cart_item::Model, StoreError> {
    product::Entity::find_by_id(product_id)
        .filter(product::Column::Available.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| StoreError::not_found("Product"))?;

    let cart = get_or_create_cart(db, user_id).await?;

    let new_item = cart_item::ActiveModel {
        cart_id: Set(cart.id),
        product_id: Set(product_id),
        quantity: Set(1),
        ..Default::default()
    };
    cart_item::Entity::insert(new_item)
        .on_conflict(
            OnConflict::columns([cart_item::Column::CartId, cart_item::Column::ProductId])
                .value(
                    cart_item::Column::Quantity,
                    Expr::col((cart_item::Entity, cart_item::Column::Quantity)).add(1),
                )
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    find_item(db, cart.id, product_id)
        .await?
        .ok_or_else(|| StoreError::not_found("Cart item"))
}

/// Deletes the line for `product_id`. Missing carts and lines are not errors.
pub async fn remove_item<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    product_id: i32,
) -> Result<(), StoreError> {
    let Some(cart) = find_cart(db, user_id).await? else {
        return Ok(());
    };

    cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .exec(db)
        .await?;

    Ok(())
}

/// Sets the quantity of an existing line. A quantity of zero or less removes
/// the line instead, and `None` is returned.
pub async fn update_item<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    product_id: i32,
    quantity: i32,
) -> Result<Option<cart_item::Model>, StoreError> {
    if quantity <= 0 {
        remove_item(db, user_id, product_id).await?;
        return Ok(None);
    }

    let cart = find_cart(db, user_id)
        .await?
        .ok_or_else(|| StoreError::not_found("Cart item"))?;
    let item = find_item(db, cart.id, product_id)
        .await?
        .ok_or_else(|| StoreError::not_found("Cart item"))?;

    let mut item: cart_item::ActiveModel = item.into();
    item.quantity = Set(quantity);
    Ok(Some(item.update(db).await?))
}
