use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use rust_decimal::Decimal;
use toko_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    models::Role,
};
use uuid::Uuid;

struct SeedCategory {
    slug: &'static str,
    name_en: &'static str,
    name_id: &'static str,
}

struct SeedProduct {
    category: &'static str,
    slug: &'static str,
    sku: &'static str,
    name_en: &'static str,
    name_id: &'static str,
    description_en: &'static str,
    description_id: &'static str,
    price: i64,
    stock: i32,
    featured: bool,
    // (size, color, sku suffix, price adjustment)
    variants: &'static [(&'static str, &'static str, &'static str, i64)],
}

const CATEGORIES: &[SeedCategory] = &[
    SeedCategory {
        slug: "clothing",
        name_en: "Clothing",
        name_id: "Pakaian",
    },
    SeedCategory {
        slug: "accessories",
        name_en: "Accessories",
        name_id: "Aksesoris",
    },
    SeedCategory {
        slug: "home-living",
        name_en: "Home & Living",
        name_id: "Rumah & Gaya Hidup",
    },
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        category: "clothing",
        slug: "cotton-t-shirt",
        sku: "TS-001",
        name_en: "Cotton T-Shirt",
        name_id: "Kaos Katun",
        description_en: "Soft combed cotton, regular fit.",
        description_id: "Katun combed yang lembut, potongan reguler.",
        price: 150_000,
        stock: 40,
        featured: true,
        variants: &[
            ("M", "Black", "M-BLK", 0),
            ("L", "Black", "L-BLK", 0),
            ("XL", "Navy", "XL-NVY", 25_000),
        ],
    },
    SeedProduct {
        category: "clothing",
        slug: "batik-shirt",
        sku: "BTK-001",
        name_en: "Batik Shirt",
        name_id: "Kemeja Batik",
        description_en: "Hand-stamped batik with a modern cut.",
        description_id: "Batik cap dengan potongan modern.",
        price: 275_000,
        stock: 15,
        featured: true,
        variants: &[("M", "Brown", "M-BRN", 0), ("L", "Brown", "L-BRN", 10_000)],
    },
    SeedProduct {
        category: "accessories",
        slug: "canvas-tote-bag",
        sku: "TB-001",
        name_en: "Canvas Tote Bag",
        name_id: "Tas Tote Kanvas",
        description_en: "Heavy canvas tote for daily errands.",
        description_id: "Tas tote kanvas tebal untuk keperluan sehari-hari.",
        price: 85_000,
        stock: 60,
        featured: false,
        variants: &[],
    },
    SeedProduct {
        category: "home-living",
        slug: "ceramic-mug",
        sku: "MG-001",
        name_en: "Ceramic Mug",
        name_id: "Mug Keramik",
        description_en: "Glazed stoneware mug, 350 ml.",
        description_id: "Mug stoneware berglasir, 350 ml.",
        price: 65_000,
        stock: 100,
        featured: true,
        variants: &[],
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 2).await?;
    run_migrations(&create_orm_conn(&pool)).await?;

    let admin_id = ensure_user(&pool, "Admin", "admin@example.com", "admin123", Role::Admin).await?;
    let customer_id = ensure_user(
        &pool,
        "Budi Santoso",
        "customer@example.com",
        "customer123",
        Role::Customer,
    )
    .await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Customer ID: {customer_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={})", role.as_str());
    Ok(user_id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    for category in CATEGORIES {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name_en, name_id, slug)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(category.name_en)
        .bind(category.name_id)
        .bind(category.slug)
        .execute(pool)
        .await?;
    }

    for product in PRODUCTS {
        let (product_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO products (
                id, category_id, name_en, name_id, slug, description_en, description_id,
                base_price, sku, stock_quantity, is_featured
            )
            SELECT $1, c.id, $3, $4, $5, $6, $7, $8, $9, $10, $11
            FROM categories c WHERE c.slug = $2
            ON CONFLICT (slug) DO UPDATE SET base_price = EXCLUDED.base_price
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product.category)
        .bind(product.name_en)
        .bind(product.name_id)
        .bind(product.slug)
        .bind(product.description_en)
        .bind(product.description_id)
        .bind(Decimal::new(product.price, 0))
        .bind(product.sku)
        .bind(product.stock)
        .bind(product.featured)
        .fetch_one(pool)
        .await?;

        for (size, color, suffix, adjustment) in product.variants {
            sqlx::query(
                r#"
                INSERT INTO product_variants (
                    id, product_id, size, color, sku, price_adjustment, stock_quantity
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (sku) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(product_id)
            .bind(*size)
            .bind(*color)
            .bind(format!("{}-{}", product.sku, suffix))
            .bind(Decimal::new(*adjustment, 0))
            .bind(product.stock / 2)
            .execute(pool)
            .await?;
        }
    }

    println!("Seeded {} categories and {} products", CATEGORIES.len(), PRODUCTS.len());
    Ok(())
}
