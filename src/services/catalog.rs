use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, ItemsAndPagesNumber, PaginatorTrait,
    QueryFilter, QueryOrder, Select,
};
use serde::Serialize;

use crate::entities::{category, product};
use crate::error::StoreError;

/// Products shown per listing page.
pub const PAGE_SIZE: u64 = 9;

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    Newest,
    #[default]
    Unspecified,
}

impl SortKey {
    /// Unknown or missing keys fall back to the default ordering.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("price_asc") => Self::PriceAsc,
            Some("price_desc") => Self::PriceDesc,
            Some("newest") => Self::Newest,
            _ => Self::Unspecified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Newest => "newest",
            Self::Unspecified => "",
        }
    }

    fn apply(self, select: Select<product::Entity>) -> Select<product::Entity> {
        match self {
            Self::PriceAsc => select
                .order_by_asc(product::Column::Price)
                .order_by_asc(product::Column::Id),
            Self::PriceDesc => select
                .order_by_desc(product::Column::Price)
                .order_by_asc(product::Column::Id),
            Self::Newest => select
                .order_by_desc(product::Column::CreatedAt)
                .order_by_desc(product::Column::Id),
            Self::Unspecified => select.order_by_asc(product::Column::Id),
        }
    }
}

/// Turns a raw page token into a 1-based page number within `1..=num_pages`.
///
/// Anything that is not an integer lands on the first page. Integers below one
/// clamp to the first page, integers past the end (including ones too large to
/// parse) clamp to the last.
pub fn resolve_page(raw: Option<&str>, num_pages: u64) -> u64 {
    let num_pages = num_pages.max(1);
    let Some(raw) = raw.map(str::trim) else {
        return 1;
    };

    match raw.parse::<i64>() {
        Ok(page) if page < 1 => 1,
        Ok(page) => (page as u64).min(num_pages),
        Err(_) if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) => num_pages,
        Err(_) => 1,
    }
}

/// Lowercase, dash-separated, ASCII-only identifier derived from `value`.
pub fn slugify(value: &str) -> String {
    let lowered = value.to_lowercase();
    NON_SLUG_CHARS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

#[derive(Serialize, Debug, Clone)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: i32,
    pub image_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<product::Model> for ProductView {
    fn from(value: product::Model) -> Self {
        ProductView {
            id: value.id,
            name: value.name,
            slug: value.slug,
            description: value.description,
            price: value.price,
            stock: value.stock,
            category_id: value.category_id,
            image_id: value.image_id,
            created_at: value.created_at,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ProductPage {
    pub items: Vec<ProductView>,
    pub page: u64,
    pub num_pages: u64,
    pub total_items: u64,
    pub sort: &'static str,
}

#[derive(Serialize, Debug)]
pub struct CategoryPage {
    pub category: category::Model,
    pub products: ProductPage,
}

fn visible_products() -> Select<product::Entity> {
    product::Entity::find().filter(product::Column::Available.eq(true))
}

async fn paginate<C: ConnectionTrait>(
    db: &C,
    select: Select<product::Entity>,
    sort: SortKey,
    page: Option<&str>,
) -> Result<ProductPage, StoreError> {
    let paginator = sort.apply(select).paginate(db, PAGE_SIZE);
    let ItemsAndPagesNumber {
        number_of_items,
        number_of_pages,
    } = paginator.num_items_and_pages().await?;

    let page = resolve_page(page, number_of_pages);
    let items = paginator.fetch_page(page - 1).await?;

    Ok(ProductPage {
        items: items.into_iter().map(ProductView::from).collect(),
        page,
        num_pages: number_of_pages.max(1),
        total_items: number_of_items,
        sort: sort.as_str(),
    })
}

pub async fn list_products<C: ConnectionTrait>(
    db: &C,
    sort: SortKey,
    page: Option<&str>,
) -> Result<ProductPage, StoreError> {
    paginate(db, visible_products(), sort, page).await
}

pub async fn list_categories<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<category::Model>, StoreError> {
    Ok(category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?)
}

pub async fn list_category_products<C: ConnectionTrait>(
    db: &C,
    category_slug: &str,
    sort: SortKey,
    page: Option<&str>,
) -> Result<CategoryPage, StoreError> {
    let category = category::Entity::find()
        .filter(category::Column::Slug.eq(category_slug))
        .one(db)
        .await?
        .ok_or_else(|| StoreError::not_found("Category"))?;

    let select = visible_products().filter(product::Column::CategoryId.eq(category.id));
    let products = paginate(db, select, sort, page).await?;

    Ok(CategoryPage { category, products })
}

pub async fn get_product<C: ConnectionTrait>(
    db: &C,
    slug: &str,
) -> Result<ProductView, StoreError> {
    visible_products()
        .filter(product::Column::Slug.eq(slug))
        .one(db)
        .await?
        .map(ProductView::from)
        .ok_or_else(|| StoreError::not_found("Product"))
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive substring search over name and description of available
/// products. A blank query matches nothing.
pub async fn search_products<C: ConnectionTrait>(
    db: &C,
    query: Option<&str>,
) -> Result<Vec<ProductView>, StoreError> {
    let query = query.map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    // SQLite's lower() only folds ASCII, so the pattern must fold the same way.
    let pattern = format!("%{}%", escape_like(&query.to_ascii_lowercase()));
    let lowered = |column: product::Column| {
        Expr::expr(Func::lower(Expr::col((product::Entity, column))))
            .like(LikeExpr::new(pattern.clone()).escape('\\'))
    };
    let matches = Condition::any()
        .add(lowered(product::Column::Name))
        .add(lowered(product::Column::Description));

    let products = visible_products()
        .filter(matches)
        .order_by_asc(product::Column::Id)
        .all(db)
        .await?;

    Ok(products.into_iter().map(ProductView::from).collect())
}
