use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::{
    dto::catalog::{
        CategoryView, HomePage, ProductDetail, ProductFilters, ProductIndex, ProductView,
        VariantView,
    },
    entity::{
        categories::{self, Column as CatCol, Entity as Categories},
        product_variants::{Column as VariantCol, Entity as ProductVariants},
        products::{self, Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    i18n::Locale,
    models::{Category, Product, ProductVariant},
    response::{ApiResponse, Meta},
    routes::params::{CATALOG_PER_PAGE, CatalogQuery},
    state::AppState,
};

const FEATURED_LIMIT: u64 = 8;
const RELATED_LIMIT: u64 = 4;

fn name_column(locale: Locale) -> ProdCol {
    match locale {
        Locale::En => ProdCol::NameEn,
        Locale::Id => ProdCol::NameId,
    }
}

fn to_view(
    (product, category): (products::Model, Option<categories::Model>),
    locale: Locale,
) -> ProductView {
    let category = category.map(Category::from);
    ProductView::new(&Product::from(product), category.as_ref(), locale)
}

pub async fn home(state: &AppState, locale: Locale) -> AppResult<ApiResponse<HomePage>> {
    let featured_products = Products::find()
        .filter(ProdCol::IsActive.eq(true))
        .filter(ProdCol::IsFeatured.eq(true))
        .order_by_desc(ProdCol::CreatedAt)
        .limit(FEATURED_LIMIT)
        .find_also_related(Categories)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|row| to_view(row, locale))
        .collect();

    Ok(ApiResponse::success(
        "OK",
        HomePage {
            featured_products,
            locale,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_products(
    state: &AppState,
    locale: Locale,
    query: CatalogQuery,
) -> AppResult<ApiResponse<ProductIndex>> {
    let (page, limit, offset) = query.pagination().normalize(CATALOG_PER_PAGE);
    let mut condition = Condition::all().add(ProdCol::IsActive.eq(true));

    if let Some(category_id) = query.category {
        condition = condition.add(ProdCol::CategoryId.eq(category_id));
    }

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned);
    if let Some(search) = search.as_ref() {
        let pattern = format!("%{search}%");
        condition = condition.add(
            Condition::any()
                .add(Expr::col((Products, name_column(locale))).ilike(pattern.clone()))
                .add(Expr::col((Products, ProdCol::Sku)).ilike(pattern)),
        );
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(ProdCol::IsFeatured)
        .order_by_desc(ProdCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let products = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .find_also_related(Categories)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|row| to_view(row, locale))
        .collect();

    let categories = active_categories(state, locale).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "OK",
        ProductIndex {
            products,
            categories,
            filters: ProductFilters {
                category: query.category,
                search,
            },
        },
        Some(meta),
    ))
}

pub async fn show_product(
    state: &AppState,
    locale: Locale,
    slug: &str,
) -> AppResult<ApiResponse<ProductDetail>> {
    let (product, category) = Products::find()
        .filter(ProdCol::Slug.eq(slug))
        .filter(ProdCol::IsActive.eq(true))
        .find_also_related(Categories)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let product = Product::from(product);
    let category = category.map(Category::from);

    let variants = ProductVariants::find()
        .filter(VariantCol::ProductId.eq(product.id))
        .filter(VariantCol::IsActive.eq(true))
        .order_by_asc(VariantCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|v| VariantView::new(&ProductVariant::from(v), product.base_price))
        .collect();

    let related_products = Products::find()
        .filter(ProdCol::CategoryId.eq(product.category_id))
        .filter(ProdCol::Id.ne(product.id))
        .filter(ProdCol::IsActive.eq(true))
        .order_by_desc(ProdCol::CreatedAt)
        .limit(RELATED_LIMIT)
        .find_also_related(Categories)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|row| to_view(row, locale))
        .collect();

    Ok(ApiResponse::success(
        "OK",
        ProductDetail {
            product: ProductView::new(&product, category.as_ref(), locale),
            variants,
            related_products,
        },
        Some(Meta::empty()),
    ))
}

pub async fn active_categories(state: &AppState, locale: Locale) -> AppResult<Vec<CategoryView>> {
    let categories = Categories::find()
        .filter(CatCol::IsActive.eq(true))
        .order_by_asc(CatCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|c| CategoryView::new(&Category::from(c), locale))
        .collect();
    Ok(categories)
}
