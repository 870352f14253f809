use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::PgPool;
use storefront_core::llm::azure::AzureOpenAiClient;
use storefront_core::llm::CompletionOptions;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "storefront_worker")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Insert demo orders (customer ids prefixed `testuser_`).
    Seed {
        #[arg(long, default_value_t = 50)]
        count: usize,
    },
    /// Delete all demo orders.
    Cleanup,
    /// Run the insight pipeline once and print the result. Nothing is
    /// persisted; the insight exists only for this invocation.
    Insights {
        #[arg(long, default_value_t = 30)]
        days: i64,

        /// Emit the raw JSON instead of formatted text.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = storefront_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let db_url = settings.require_database_url()?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context("db connect failed")?;
    storefront_core::storage::migrate(&pool).await?;

    let result = match args.command {
        Command::Seed { count } => seed(&pool, count).await,
        Command::Cleanup => cleanup(&pool).await,
        Command::Insights { days, json } => insights(&pool, &settings, days, json).await,
    };
    if let Err(err) = &result {
        report_failure(err);
    }
    result
}

fn report_failure(err: &anyhow::Error) {
    sentry_anyhow::capture_anyhow(err);
    tracing::error!(error = %err, "worker command failed");
}

async fn seed(pool: &PgPool, count: usize) -> anyhow::Result<()> {
    storefront_core::demo::ensure_demo_catalog(pool).await?;
    let summary = storefront_core::demo::seed_demo_orders(pool, count).await?;
    println!(
        "seeded {} orders ({} lines, ${:.2} revenue) between {} and {}",
        summary.orders_created,
        summary.order_lines_created,
        summary.total_revenue,
        summary.earliest_order.format("%Y-%m-%d"),
        summary.latest_order.format("%Y-%m-%d"),
    );
    Ok(())
}

async fn cleanup(pool: &PgPool) -> anyhow::Result<()> {
    let deleted = storefront_core::demo::cleanup_demo_orders(pool).await?;
    println!("deleted {deleted} demo orders");
    Ok(())
}

async fn insights(
    pool: &PgPool,
    settings: &storefront_core::config::Settings,
    days: i64,
    json: bool,
) -> anyhow::Result<()> {
    let completer =
        AzureOpenAiClient::from_settings(settings).context("completion client unavailable")?;

    let cutoff = chrono::Utc::now() - chrono::Duration::days(days);
    let orders = storefront_core::storage::orders::orders_since(pool, cutoff).await?;
    let catalog = storefront_core::storage::products::all_products(pool).await?;
    let data = storefront_core::analytics::aggregate::analyze_orders(&orders, &catalog);

    let insight = storefront_core::analytics::generate_sales_insight(
        &completer,
        &data,
        days,
        &CompletionOptions::from_env(),
    )
    .await;

    if json {
        println!("{}", serde_json::to_string_pretty(&insight)?);
        return Ok(());
    }

    println!("== Sales insight (last {days} days, {} orders) ==", data.total_orders);
    println!("\nSUMMARY\n{}", insight.summary);
    println!("\nTRENDS\n{}", insight.trends);
    println!("\nRECOMMENDATIONS\n{}", insight.recommendations);
    for rec in &insight.actionable_recommendations {
        let category = rec.category.map(|c| c.as_str()).unwrap_or("-");
        println!(
            "\n[{}] {} (category: {category})\n  {}\n  Action: {}",
            rec.priority.as_str(),
            rec.title,
            rec.description,
            rec.action,
        );
    }
    Ok(())
}

fn init_sentry(settings: &storefront_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
