use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::auth::password;
use crate::catalog::FormCatalog;
use crate::config::AdminSeed;
use crate::errors::AppError;
use crate::models::user::{NewUser, Role};

pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(8)
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Create the bootstrap admin unless a user with that email already exists.
/// Returns true when a user was created.
pub async fn seed_admin(catalog: &dyn FormCatalog, seed: &AdminSeed) -> Result<bool, AppError> {
    if catalog.find_user_by_email(&seed.email).await?.is_some() {
        log::info!("Admin {} already present, skipping seed", seed.email);
        return Ok(false);
    }

    let new_user = NewUser {
        email: seed.email.clone(),
        name: "Administrator".to_string(),
        password_hash: password::hash_password(&seed.password)?,
        role: Role::Admin,
    };
    catalog.create_user(new_user).await?;
    log::info!("Seeded admin {}", seed.email);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryCatalog;

    #[tokio::test]
    async fn test_seed_admin_is_idempotent() {
        let catalog = MemoryCatalog::new();
        let seed = AdminSeed { email: "admin@example.com".into(), password: "rahasia123".into() };

        assert!(seed_admin(&catalog, &seed).await.expect("seed"));
        assert!(!seed_admin(&catalog, &seed).await.expect("seed again"));

        let admin = catalog
            .find_user_by_email("admin@example.com")
            .await
            .expect("query")
            .expect("admin exists");
        assert_eq!(admin.role, Role::Admin);
        assert!(password::verify_password("rahasia123", &admin.password_hash).expect("verify"));
    }
}
