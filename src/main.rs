use dotenvy::dotenv;
use stockroom::{
    config::{database, workflow},
    core::{category, order, product},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenv().ok();

    let workflow_config = workflow::load_or_default()
        .inspect_err(|e| error!("Failed to load workflow configuration: {e}"))?;

    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;

    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    workflow::seed_workflow_rows(&db, &workflow_config)
        .await
        .inspect(|_| info!("Workflow statuses and transaction types seeded."))
        .inspect_err(|e| error!("Failed to seed workflow rows: {e}"))?;

    let categories = category::get_all_categories(&db).await?;
    let products = product::get_all_products(&db).await?;
    let orders = order::get_all_orders(&db).await?;
    info!(
        categories = categories.len(),
        products = products.len(),
        orders = orders.len(),
        "Stockroom engine ready."
    );

    Ok(())
}
