use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use crate::entities::{cart, cart_item, order, order_item};
use crate::error::{field_errors, FieldErrors, StoreError};
use crate::services::cart::{build_view, find_cart, lines_total, load_lines, CartView};

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 ()-]{5,19}$").unwrap());

/// Contact and shipping fields submitted with a checkout.
#[derive(Deserialize, Validate, Debug, Clone, Default)]
pub struct CheckoutForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Enter your full name (at most 100 characters)."))]
    pub full_name: String,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "This field is required."),
        email(message = "Enter a valid email address.")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(regex(path = *PHONE_REGEX, message = "Enter a valid phone number."))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 500, message = "Enter a delivery address (at most 500 characters)."))]
    pub address: String,
}

/// Contact fields that passed validation, whitespace trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Validates a checkout form without touching storage.
pub fn validate_contact(form: &CheckoutForm) -> Result<ContactDetails, FieldErrors> {
    let cleaned = CheckoutForm {
        full_name: form.full_name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        address: form.address.trim().to_string(),
    };

    cleaned.validate().map_err(|errors| field_errors(&errors))?;

    Ok(ContactDetails {
        full_name: cleaned.full_name,
        email: cleaned.email,
        phone: cleaned.phone,
        address: cleaned.address,
    })
}

/// Read-only view of what a checkout would place right now.
pub async fn preview<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<CartView, StoreError> {
    let cart = find_cart(db, user_id)
        .await?
        .ok_or_else(|| StoreError::not_found("Cart"))?;
    let lines = load_lines(db, cart.id).await?;
    Ok(build_view(cart.id, lines))
}

/// Turns the user's cart into a pending order.
///
/// Loading the cart, writing the order with its item snapshots and deleting the
/// cart all happen in one transaction. Any error rolls the whole unit back, so
/// the cart survives and no partial order is ever visible.
pub async fn checkout(
    db: &DatabaseConnection,
    user_id: i32,
    form: &CheckoutForm,
) -> Result<order::Model, StoreError> {
    let txn = db.begin().await?;

    match place_order(&txn, user_id, form).await {
        Ok(order) => {
            txn.commit().await?;
            info!(
                order_id = order.id,
                user_id,
                total = %order.total_amount,
                "Order placed"
            );
            Ok(order)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(user_id, error = %rollback_err, "Checkout rollback failed");
            }
            Err(err)
        }
    }
}

async fn place_order<C: ConnectionTrait>(
    txn: &C,
    user_id: i32,
    form: &CheckoutForm,
) -> Result<order::Model, StoreError> {
    let cart = find_cart(txn, user_id)
        .await?
        .ok_or_else(|| StoreError::not_found("Cart"))?;
    let lines = load_lines(txn, cart.id).await?;
    let total = lines_total(&lines);

    let contact = validate_contact(form).map_err(StoreError::ValidationFailed)?;
    if lines.is_empty() {
        return Err(StoreError::invalid("cart", "Your cart is empty."));
    }

    let order = order::ActiveModel {
        user_id: Set(user_id),
        full_name: Set(contact.full_name),
        email: Set(contact.email),
        phone: Set(contact.phone),
        address: Set(contact.address),
        total_amount: Set(total),
        status: Set(order::Status::Pending),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    for (item, product) in &lines {
        order_item::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(product.id),
            quantity: Set(item.quantity),
            price: Set(product.price),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }

    cart_item::Entity::delete_many()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .exec(txn)
        .await?;
    let deleted = cart::Entity::delete_by_id(cart.id).exec(txn).await?;
    if deleted.rows_affected == 0 {
        // Another checkout consumed this cart first.
        return Err(StoreError::not_found("Cart"));
    }

    Ok(order)
}
