use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, JoinType, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::Deserialize;
use tracing::info;

use crate::entities::{category, image, order, order_item, product};
use crate::error::StoreError;
use crate::services::catalog::slugify;
use crate::services::orders::{order_lines, OrderDetail};

#[derive(Deserialize, Debug, Clone)]
pub struct CreateCategory {
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PatchCategory {
    pub name: Option<String>,
    pub slug: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateProduct {
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    pub available: Option<bool>,
    pub category_id: i32,
    pub image_id: Option<i32>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PatchProduct {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub available: Option<bool>,
    pub category_id: Option<i32>,
    /// `Some(None)` clears the image.
    #[serde(default, deserialize_with = "double_option")]
    pub image_id: Option<Option<i32>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<i32>::deserialize(deserializer).map(Some)
}

/// Slug from an explicit value, or derived from `name` when absent or blank.
fn resolve_slug(explicit: Option<&str>, name: &str) -> Result<String, StoreError> {
    let source = match explicit.map(str::trim) {
        Some(slug) if !slug.is_empty() => slug,
        _ => name,
    };
    let slug = slugify(source);
    if slug.is_empty() {
        return Err(StoreError::invalid(
            "slug",
            "Enter a slug made of letters, numbers or hyphens.",
        ));
    }
    Ok(slug)
}

fn require_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 200 {
        return Err(StoreError::invalid(
            "name",
            "Required. 200 characters or fewer.",
        ));
    }
    Ok(name.to_string())
}

fn check_price(price: Decimal) -> Result<Decimal, StoreError> {
    if price < Decimal::ZERO {
        return Err(StoreError::invalid("price", "Price cannot be negative."));
    }
    Ok(price.round_dp(2))
}

fn check_stock(stock: i32) -> Result<i32, StoreError> {
    if stock < 0 {
        return Err(StoreError::invalid("stock", "Stock cannot be negative."));
    }
    Ok(stock)
}

async fn ensure_category<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), StoreError> {
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| StoreError::invalid("category_id", format!("No category with id {id}.")))
}

async fn ensure_image<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), StoreError> {
    image::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| StoreError::invalid("image_id", format!("No image with id {id}.")))
}

/// Fails with `Conflict` when any product matched by `filter` appears in an
/// order.
async fn ensure_never_ordered<C: ConnectionTrait>(
    db: &C,
    filter: Condition,
    message: &str,
) -> Result<(), StoreError> {
    let ordered = order_item::Entity::find()
        .join(
            JoinType::InnerJoin,
            order_item::Relation::Product.def(),
        )
        .filter(filter)
        .count(db)
        .await?;
    if ordered > 0 {
        return Err(StoreError::Conflict(message.to_string()));
    }
    Ok(())
}

pub async fn create_category<C: ConnectionTrait>(
    db: &C,
    payload: CreateCategory,
) -> Result<category::Model, StoreError> {
    let name = require_name(&payload.name)?;
    let slug = resolve_slug(payload.slug.as_deref(), &name)?;

    let new_category = category::ActiveModel {
        name: Set(name),
        slug: Set(slug),
        ..Default::default()
    };
    let created = new_category
        .insert(db)
        .await
        .map_err(|err| StoreError::from_write(err, "Category"))?;
    info!(category_id = created.id, slug = %created.slug, "Created category");
    Ok(created)
}

pub async fn patch_category<C: ConnectionTrait>(
    db: &C,
    id: i32,
    payload: PatchCategory,
) -> Result<category::Model, StoreError> {
    let existing = category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| StoreError::not_found("Category"))?;
    let mut name = existing.name.clone();
    let mut model: category::ActiveModel = existing.into();

    if let Some(new_name) = payload.name {
        name = require_name(&new_name)?;
        model.name = Set(name.clone());
    }
    if let Some(slug) = payload.slug {
        model.slug = Set(resolve_slug(Some(&slug), &name)?);
    }

    model
        .update(db)
        .await
        .map_err(|err| StoreError::from_write(err, "Category"))
}

pub async fn delete_category<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), StoreError> {
    let existing = category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| StoreError::not_found("Category"))?;
    ensure_never_ordered(
        db,
        Condition::all().add(product::Column::CategoryId.eq(id)),
        "Category has products that appear in orders",
    )
    .await?;
    existing
        .delete(db)
        .await
        .map_err(|err| StoreError::from_write(err, "Category"))?;
    Ok(())
}

pub async fn create_product<C: ConnectionTrait>(
    db: &C,
    payload: CreateProduct,
) -> Result<product::Model, StoreError> {
    let name = require_name(&payload.name)?;
    let slug = resolve_slug(payload.slug.as_deref(), &name)?;
    let price = check_price(payload.price)?;
    let stock = check_stock(payload.stock)?;
    ensure_category(db, payload.category_id).await?;
    if let Some(image_id) = payload.image_id {
        ensure_image(db, image_id).await?;
    }

    let new_product = product::ActiveModel {
        name: Set(name),
        slug: Set(slug),
        description: Set(payload.description),
        price: Set(price),
        stock: Set(stock),
        available: Set(payload.available.unwrap_or(true)),
        category_id: Set(payload.category_id),
        image_id: Set(payload.image_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    let created = new_product
        .insert(db)
        .await
        .map_err(|err| StoreError::from_write(err, "Product"))?;
    info!(product_id = created.id, slug = %created.slug, price = %created.price, "Created product");
    Ok(created)
}

pub async fn get_product<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<product::Model, StoreError> {
    product::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| StoreError::not_found("Product"))
}

/// Every product, available or not, newest first.
pub async fn list_products<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<product::Model>, StoreError> {
    Ok(product::Entity::find()
        .order_by_desc(product::Column::CreatedAt)
        .order_by_desc(product::Column::Id)
        .all(db)
        .await?)
}

pub async fn patch_product<C: ConnectionTrait>(
    db: &C,
    id: i32,
    payload: PatchProduct,
) -> Result<product::Model, StoreError> {
    let existing = get_product(db, id).await?;
    let mut name = existing.name.clone();
    let mut model: product::ActiveModel = existing.into();

    if let Some(new_name) = payload.name {
        name = require_name(&new_name)?;
        model.name = Set(name.clone());
    }
    if let Some(slug) = payload.slug {
        model.slug = Set(resolve_slug(Some(&slug), &name)?);
    }
    if let Some(description) = payload.description {
        model.description = Set(description);
    }
    if let Some(price) = payload.price {
        model.price = Set(check_price(price)?);
    }
    if let Some(stock) = payload.stock {
        model.stock = Set(check_stock(stock)?);
    }
    if let Some(available) = payload.available {
        model.available = Set(available);
    }
    if let Some(category_id) = payload.category_id {
        ensure_category(db, category_id).await?;
        model.category_id = Set(category_id);
    }
    if let Some(image_id) = payload.image_id {
        if let Some(id) = image_id {
            ensure_image(db, id).await?;
        }
        model.image_id = Set(image_id);
    }

    model
        .update(db)
        .await
        .map_err(|err| StoreError::from_write(err, "Product"))
}

/// Fails with `Conflict` once the product appears in an order.
pub async fn delete_product<C: ConnectionTrait>(db: &C, id: i32) -> Result<(), StoreError> {
    let existing = get_product(db, id).await?;
    ensure_never_ordered(
        db,
        Condition::all().add(product::Column::Id.eq(id)),
        "Product appears in orders",
    )
    .await?;
    existing
        .delete(db)
        .await
        .map_err(|err| StoreError::from_write(err, "Product"))?;
    Ok(())
}

pub async fn list_orders<C: ConnectionTrait>(
    db: &C,
    status: Option<order::Status>,
) -> Result<Vec<order::Model>, StoreError> {
    let mut select = order::Entity::find();
    if let Some(status) = status {
        select = select.filter(order::Column::Status.eq(status));
    }

    Ok(select
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await?)
}

pub async fn get_order<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<OrderDetail, StoreError> {
    let order = order::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| StoreError::not_found("Order"))?;
    let items = order_lines(db, order.id).await?;
    Ok(OrderDetail { order, items })
}

/// The only mutation an order accepts after checkout.
pub async fn set_order_status<C: ConnectionTrait>(
    db: &C,
    id: i32,
    status: order::Status,
) -> Result<order::Model, StoreError> {
    let existing = order::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| StoreError::not_found("Order"))?;
    let previous = existing.status;

    let mut model: order::ActiveModel = existing.into();
    model.status = Set(status);
    let updated = model.update(db).await?;
    info!(order_id = id, from = %previous, to = %status, "Order status changed");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn negative_prices_are_rejected() {
        assert!(check_price(dec!(-0.01)).is_err());
        assert_eq!(check_price(dec!(0)).unwrap(), dec!(0));
        assert_eq!(check_price(dec!(12.345)).unwrap(), dec!(12.34));
    }

    #[test]
    fn slug_falls_back_to_name() {
        assert_eq!(resolve_slug(None, "Felted Owl").unwrap(), "felted-owl");
        assert_eq!(resolve_slug(Some("  "), "Felted Owl").unwrap(), "felted-owl");
        assert_eq!(resolve_slug(Some("Owl 2"), "Felted Owl").unwrap(), "owl-2");
        assert!(resolve_slug(None, "???").is_err());
    }
}
