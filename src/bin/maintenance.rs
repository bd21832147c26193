use std::env;

use anyhow::{bail, Context, Result};

use hr_backend::{
    auth::AdminRole,
    config::AppConfig,
    db,
    routes::admins::{insert_admin, AdminDraft},
};

const USAGE: &str = "Usage:\n  maintenance migrate\n  maintenance create-superadmin <username> <email>\n\nThe superadmin password is read from SUPERADMIN_PASSWORD.";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("migrate") => migrate()?,
        Some("create-superadmin") => {
            let username = args.next();
            let email = args.next();
            create_superadmin(username, email)?
        }
        Some(cmd) => {
            eprintln!("Unknown command: {cmd}\n{USAGE}");
            std::process::exit(1);
        }
        None => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn connect() -> Result<db::PgPool> {
    let config = AppConfig::from_env()?;
    tracing::info!(
        component = "maintenance",
        database_url = %config.redacted_database_url(),
        "loaded backend configuration"
    );
    db::init_pool_with(&config.database_url, 1, config.database_timeout_seconds)
}

fn migrate() -> Result<()> {
    let pool = connect()?;
    db::run_migrations(&pool)?;
    println!("Migrations applied.");
    Ok(())
}

fn create_superadmin(username: Option<String>, email: Option<String>) -> Result<()> {
    let password = env::var("SUPERADMIN_PASSWORD")
        .context("SUPERADMIN_PASSWORD must be set to create a superadmin")?;
    let draft = AdminDraft::parse(
        username,
        email,
        Some(password),
        Some(AdminRole::Superadmin.as_str().to_string()),
    )
    .map_err(|err| anyhow::anyhow!("{err}\n{USAGE}"))?;

    let pool = connect()?;
    db::run_migrations(&pool)?;
    let mut conn = pool.get().context("failed to get database connection")?;

    match insert_admin(&mut conn, draft) {
        Ok(admin) => {
            println!("Created superadmin {} ({})", admin.username, admin.id);
            Ok(())
        }
        Err(err) => bail!("failed to create superadmin: {}", err.message()),
    }
}
