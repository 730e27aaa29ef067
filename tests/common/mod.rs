//! Shared test infrastructure.
//!
//! Everything runs against `MemoryCatalog`, so no database is needed.
//!
//! # Setup
//! - `setup_catalog()` - Catalog with one admin, plus a token service
//! - `create_form()` / `add_question()` - Build forms question by question
//! - `test_app!` - actix test service wired like `main`
#![allow(dead_code)]

use std::sync::Arc;

use formulir::auth::password;
use formulir::auth::token::TokenService;
use formulir::catalog::{FormCatalog, MemoryCatalog};
use formulir::models::form::{Form, FormPatch, NewForm};
use formulir::models::question::{NewQuestion, Question, QuestionType};
use formulir::models::user::{NewUser, Role, User};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASS: &str = "admin123";
pub const TEST_SECRET: &[u8] = b"formulir-test-secret";

pub struct TestEnv {
    pub catalog: Arc<MemoryCatalog>,
    pub tokens: TokenService,
    pub admin: User,
}

impl TestEnv {
    pub fn catalog(&self) -> &dyn FormCatalog {
        self.catalog.as_ref()
    }

    pub fn token_for(&self, user: &User) -> String {
        self.tokens.issue(user).expect("issue token")
    }

    pub fn admin_token(&self) -> String {
        self.token_for(&self.admin)
    }
}

// ============================================================================
// SETUP
// ============================================================================

pub async fn setup_catalog() -> TestEnv {
    let catalog = Arc::new(MemoryCatalog::new());
    let admin = create_user(catalog.as_ref(), ADMIN_EMAIL, Role::Admin).await;
    TestEnv {
        catalog,
        tokens: TokenService::new(TEST_SECRET, 1),
        admin,
    }
}

pub async fn create_user(catalog: &dyn FormCatalog, email: &str, role: Role) -> User {
    let new_user = NewUser {
        email: email.to_string(),
        name: email.split('@').next().unwrap_or(email).to_string(),
        password_hash: password::hash_password(ADMIN_PASS).expect("hash"),
        role,
    };
    catalog.create_user(new_user).await.expect("create user")
}

pub async fn create_form(catalog: &dyn FormCatalog, owner: &User, title: &str, published: bool) -> Form {
    let new_form = NewForm {
        title: title.to_string(),
        description: None,
        is_published: false,
        header_image: None,
        logo_url: None,
        theme_color: None,
    };
    let form = catalog.create_form(owner.id, new_form).await.expect("create form");
    if published {
        catalog
            .update_form(form.id, &FormPatch::publish(true))
            .await
            .expect("publish form")
    } else {
        form
    }
}

pub async fn add_question(
    catalog: &dyn FormCatalog,
    form: &Form,
    title: &str,
    question_type: QuestionType,
    order: i32,
    required: bool,
    options: &[&str],
) -> Question {
    let new_question = NewQuestion {
        form_id: form.id,
        title: title.to_string(),
        description: None,
        question_type,
        is_required: required,
        order,
        options: options.iter().map(|s| s.to_string()).collect(),
    };
    catalog.create_question(new_question).await.expect("create question")
}

pub const AGAMA_OPTIONS: &[&str] = &["Islam", "Kristen", "Buddha", "Hindu", "Lainnya"];

// ============================================================================
// HTTP
// ============================================================================

/// Build an actix test service over `env`, wired the same way as `main`.
#[macro_export]
macro_rules! test_app {
    ($env:expr) => {{
        let catalog: std::sync::Arc<dyn formulir::catalog::FormCatalog> = $env.catalog.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::from(catalog))
                .app_data(actix_web::web::Data::new($env.tokens.clone()))
                .app_data(actix_web::web::Data::new(
                    formulir::auth::rate_limit::LoginThrottle::new(),
                ))
                .app_data(formulir::handlers::json_config())
                .configure(formulir::handlers::configure),
        )
        .await
    }};
}
