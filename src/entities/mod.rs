pub mod cart;
pub mod cart_item;
pub mod category;
pub mod image;
pub mod order;
pub mod order_item;
pub mod product;
pub mod revoked_token;
pub mod user;

use chrono::Utc;
use sea_orm::{
    sea_query::Index, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Schema, Set,
};
use tracing::info;

use crate::config::AdminSeed;
use crate::error::StoreError;
use crate::services::auth::hash_password;

/// Creates every table (if missing) and the composite unique index that makes
/// the cart item upsert possible.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut tables = [
        schema.create_table_from_entity(user::Entity),
        schema.create_table_from_entity(category::Entity),
        schema.create_table_from_entity(image::Entity),
        schema.create_table_from_entity(product::Entity),
        schema.create_table_from_entity(cart::Entity),
        schema.create_table_from_entity(cart_item::Entity),
        schema.create_table_from_entity(order::Entity),
        schema.create_table_from_entity(order_item::Entity),
        schema.create_table_from_entity(revoked_token::Entity),
    ];

    for table in tables.iter_mut() {
        table.if_not_exists();
        db.execute(backend.build(&*table)).await?;
    }

    let cart_item_unique = Index::create()
        .name("idx_cart_item_cart_product")
        .table(cart_item::Entity)
        .col(cart_item::Column::CartId)
        .col(cart_item::Column::ProductId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&cart_item_unique)).await?;

    Ok(())
}

/// Inserts the configured administrator unless a user with that name exists.
pub async fn seed_admin(db: &DatabaseConnection, seed: &AdminSeed) -> Result<(), StoreError> {
    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(&*seed.username))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let new_admin = user::ActiveModel {
        username: Set(seed.username.clone()),
        email: Set(seed.email.clone()),
        password: Set(hash_password(&seed.password)?),
        role: Set(user::Role::Admin),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    user::Entity::insert(new_admin).exec(db).await?;
    info!(username = %seed.username, "Seeded administrator account");

    Ok(())
}
