use chrono::{Duration, Utc};
use mall_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    store::{CreateCouponRow, CreateProductRow, ErrorKind, Store},
};

const SEED_AUTHOR: &str = "seed";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;
    let store = Store::new(create_orm_conn(&pool));

    seed_products(&store).await?;
    seed_coupons(&store).await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_products(store: &Store) -> anyhow::Result<()> {
    let queries = store.queries();
    if queries.count_products().await? > 0 {
        println!("Products already present, skipping");
        return Ok(());
    }

    let products = [
        ("Ferris Plush", "toys", "Soft crab, 30cm", 1200, 990, "pcs"),
        ("Trail Backpack", "outdoor", "28L daypack with rain cover", 3600, 2880, "pcs"),
        ("Drip Coffee Set", "kitchen", "Ceramic dripper with 100 filters", 1500, 1350, "set"),
        ("Notebook A5", "stationery", "Dotted, 160 pages", 250, 220, "pcs"),
    ];

    for (title, category, description, origin_price, price, unit) in products {
        queries
            .create_product(CreateProductRow {
                title: title.to_string(),
                category: category.to_string(),
                description: description.to_string(),
                content: String::new(),
                origin_price,
                price,
                unit: unit.to_string(),
                status: 1,
                image_url: String::new(),
                images_url: Vec::new(),
                created_by: SEED_AUTHOR.to_string(),
            })
            .await?;
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_coupons(store: &Store) -> anyhow::Result<()> {
    let now = Utc::now();
    let coupons = [("Welcome", "WELCOME10", 10), ("Autumn Sale", "AUTUMN25", 25)];

    for (title, code, percent) in coupons {
        let result = store
            .queries()
            .create_coupon(CreateCouponRow {
                title: title.to_string(),
                code: code.to_string(),
                percent,
                created_by: SEED_AUTHOR.to_string(),
                start_at: now,
                expires_at: now + Duration::days(90),
            })
            .await;
        match result {
            Ok(_) => println!("Seeded coupon {code}"),
            Err(err) if err.kind() == ErrorKind::UniqueViolation => {
                println!("Coupon {code} already present")
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
