//! # Super Admin Seeder
//!
//! Makes sure the platform has a SUPER_ADMIN. Nobody can register as one
//! through the API, so a fresh deployment runs this once.
//!
//! ## Usage
//! ```bash
//! # Default credentials (admin@stocky.io / Admin@123)
//! cargo run -p stocky-db --bin seed
//!
//! # Custom credentials and database
//! SEED_ADMIN_EMAIL=ops@example.com SEED_ADMIN_PASSWORD='s3cret!' \
//!     cargo run -p stocky-db --bin seed -- --db ./data/stocky.db
//! ```
//!
//! Idempotent: if the email already belongs to a super admin nothing is
//! changed. An email held by any other role is refused.

use std::env;

use anyhow::{anyhow, bail, Context};
use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use stocky_core::validation::{validate_email, validate_password};
use stocky_core::{Role, User};
use stocky_db::{migrations, Database, DbConfig};
use tracing_subscriber::EnvFilter;

const DEFAULT_EMAIL: &str = "admin@stocky.io";
const DEFAULT_PASSWORD: &str = "Admin@123";
const DEFAULT_DB_PATH: &str = "./stocky.db";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stocky_db=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from(DEFAULT_DB_PATH);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                db_path = args
                    .get(i + 1)
                    .cloned()
                    .ok_or_else(|| anyhow!("--db needs a path"))?;
                i += 1;
            }
            "--help" | "-h" => {
                println!("Stocky Super Admin Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: {DEFAULT_DB_PATH})");
                println!("  -h, --help         Show this help message");
                println!();
                println!("Environment:");
                println!("  SEED_ADMIN_EMAIL     (default: {DEFAULT_EMAIL})");
                println!("  SEED_ADMIN_PASSWORD  (default: {DEFAULT_PASSWORD})");
                return Ok(());
            }
            other => bail!("unknown argument: {other}"),
        }
        i += 1;
    }

    let email = env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_EMAIL.to_string());
    let password = env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.to_string());

    let email = validate_email(&email).context("SEED_ADMIN_EMAIL")?;
    validate_password(&password).context("SEED_ADMIN_PASSWORD")?;

    println!("🌱 Stocky Seeder");
    println!("================");
    println!("Database: {db_path}");

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let (total, applied) = migrations::migration_status(db.pool()).await?;
    println!("✓ Connected to database, {applied}/{total} migrations applied");

    match ensure_super_admin(&db, &email, &password).await? {
        Seeded::AlreadyPresent(admin) => println!("✓ Super admin already exists: {}", admin.email),
        Seeded::Created(admin) => println!("✓ Created super admin: {}", admin.email),
    }

    db.close().await;
    Ok(())
}

#[derive(Debug)]
enum Seeded {
    Created(User),
    AlreadyPresent(User),
}

/// Creates the super admin unless the email is already one.
///
/// An existing account with another role is an error: the platform would be
/// left without a super admin.
async fn ensure_super_admin(db: &Database, email: &str, password: &str) -> anyhow::Result<Seeded> {
    if let Some(existing) = db.users().get_by_email(email).await? {
        if existing.role != Role::SuperAdmin {
            bail!(
                "{} is already registered as {}; choose another SEED_ADMIN_EMAIL",
                existing.email,
                existing.role
            );
        }
        return Ok(Seeded::AlreadyPresent(existing));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {e}"))?
        .to_string();

    let admin = db.users().create(email, &hash, Role::SuperAdmin).await?;
    Ok(Seeded::Created(admin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = ensure_super_admin(&db, "ops@stocky.test", "Admin@123").await.unwrap();
        assert!(matches!(first, Seeded::Created(ref u) if u.role == Role::SuperAdmin));

        let again = ensure_super_admin(&db, "ops@stocky.test", "Admin@123").await.unwrap();
        assert!(matches!(again, Seeded::AlreadyPresent(_)));
        assert_eq!(db.users().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_email_taken_by_another_role_fails() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users()
            .create("ops@stocky.test", "hash", Role::CompanyAdmin)
            .await
            .unwrap();

        let err = ensure_super_admin(&db, "ops@stocky.test", "Admin@123")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("COMPANY_ADMIN"));
    }
}
