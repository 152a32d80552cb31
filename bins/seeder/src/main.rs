//! Database seeder for Claimflow development and testing.
//!
//! Seeds a demo company, a small user directory, an approval rule, and a
//! submitted expense so the workflow can be exercised immediately.
//!
//! Usage: cargo run --bin seeder

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::info;
use uuid::Uuid;

use claimflow_core::currency::{CachingConverter, MokaRateCache, StaticRateConverter};
use claimflow_core::workflow::Vote;
use claimflow_shared::AppConfig;
use claimflow_db::entities::{companies, sea_orm_active_enums::UserRole, users};
use claimflow_db::repositories::{
    ApprovalRepository, ApproverInput, CreateExpenseInput, CreateRuleInput, DirectoryRepository,
    ExpenseRepository, RuleRepository,
};
use claimflow_shared::types::{CurrencyCode, Money};

/// Demo company ID (consistent for all seeds)
const DEMO_COMPANY_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Demo admin user ID
const DEMO_ADMIN_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Demo manager user ID
const DEMO_MANAGER_ID: &str = "00000000-0000-0000-0000-000000000003";
/// Demo employee user ID
const DEMO_EMPLOYEE_ID: &str = "00000000-0000-0000-0000-000000000004";
/// Demo finance approver user ID
const DEMO_FINANCE_ID: &str = "00000000-0000-0000-0000-000000000005";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("loading configuration")?;

    info!("connecting to database");
    let db = claimflow_db::connect(&config.database.url)
        .await
        .context("failed to connect to database")?;

    if companies::Entity::find_by_id(parse(DEMO_COMPANY_ID))
        .one(&db)
        .await?
        .is_some()
    {
        info!("demo company already exists, skipping seed");
        return Ok(());
    }

    seed_directory(&db).await.context("seeding directory")?;
    seed_workflow(&db, &config)
        .await
        .context("seeding workflow")?;

    info!("seeding complete");
    Ok(())
}

fn parse(id: &str) -> Uuid {
    Uuid::parse_str(id).expect("seed ids are valid uuids")
}

/// Seeds the demo company and its users.
async fn seed_directory(db: &DatabaseConnection) -> anyhow::Result<()> {
    let now = Utc::now();

    info!("seeding demo company");
    companies::ActiveModel {
        id: Set(parse(DEMO_COMPANY_ID)),
        name: Set("Acme Corp".to_string()),
        base_currency: Set("USD".to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    info!("seeding demo users");
    let members = [
        (DEMO_ADMIN_ID, "admin@acme.dev", "Ada Admin", UserRole::Admin, None),
        (
            DEMO_MANAGER_ID,
            "manager@acme.dev",
            "Morgan Manager",
            UserRole::Manager,
            None,
        ),
        (
            DEMO_EMPLOYEE_ID,
            "employee@acme.dev",
            "Evan Employee",
            UserRole::Employee,
            Some(parse(DEMO_MANAGER_ID)),
        ),
        (
            DEMO_FINANCE_ID,
            "finance@acme.dev",
            "Frankie Finance",
            UserRole::Manager,
            None,
        ),
    ];

    for (id, email, name, role, manager_id) in members {
        users::ActiveModel {
            id: Set(parse(id)),
            company_id: Set(parse(DEMO_COMPANY_ID)),
            email: Set(email.to_string()),
            full_name: Set(name.to_string()),
            role: Set(role),
            manager_id: Set(manager_id),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

/// Seeds a rule, an expense, and walks it one step into the workflow.
async fn seed_workflow(db: &DatabaseConnection, config: &AppConfig) -> anyhow::Result<()> {
    let company_id = parse(DEMO_COMPANY_ID);
    let employee_id = parse(DEMO_EMPLOYEE_ID);

    let directory = DirectoryRepository::new(db.clone());
    let manager = directory.manager_of(employee_id).await?;
    info!(?manager, "employee manager resolved");

    info!("seeding approval rule");
    let rules = RuleRepository::new(db.clone());
    let rule = rules
        .create_rule(
            company_id,
            CreateRuleInput {
                name: "Manager then finance".to_string(),
                description: Some("Manager first, then finance sign-off".to_string()),
                is_manager_approver: true,
                min_approval_percentage: None,
            },
        )
        .await?;
    rules
        .replace_approvers(
            company_id,
            rule.id,
            vec![ApproverInput {
                approver_id: parse(DEMO_FINANCE_ID),
                sequence: Some(1),
                is_mandatory: true,
            }],
        )
        .await?;

    info!("seeding a submitted expense");
    let rates = StaticRateConverter::new().with_rate(
        CurrencyCode::new("EUR").expect("valid code"),
        CurrencyCode::new("USD").expect("valid code"),
        Decimal::new(109, 2), // 1 EUR = 1.09 USD
    );
    let cache = Arc::new(MokaRateCache::new(Duration::from_secs(
        config.currency.rate_cache_ttl_secs,
    )));
    let converter = Arc::new(CachingConverter::new(rates, cache));
    let expenses = ExpenseRepository::new(db.clone(), converter);
    let expense = expenses
        .create_expense(
            employee_id,
            CreateExpenseInput {
                description: "Client dinner in Berlin".to_string(),
                category: Some("Meals".to_string()),
                expense_date: NaiveDate::from_ymd_opt(2026, 7, 21).expect("valid date"),
                paid_by: Some("Personal card".to_string()),
                remarks: None,
                amount: Money::new(
                    Decimal::new(8450, 2), // EUR 84.50
                    CurrencyCode::new("EUR").expect("valid code"),
                ),
                rule_id: Some(rule.id),
            },
        )
        .await?;
    let submitted = expenses
        .submit_expense(employee_id, expense.id, None)
        .await?;
    info!(expense_id = %submitted.id, status = ?submitted.status, "expense submitted");

    // Walk the first step: the manager approves, finance stays pending.
    let approvals = ApprovalRepository::new(db.clone());
    let pending = approvals
        .list_pending_approvals(parse(DEMO_MANAGER_ID))
        .await?;
    if let Some(task) = pending.first() {
        let outcome = approvals
            .decide_approval(
                parse(DEMO_MANAGER_ID),
                task.approval.id,
                Vote::Approved,
                Some("Looks good".to_string()),
            )
            .await?;
        info!(expense_status = %outcome.expense_status, "manager approved the first step");
    }

    Ok(())
}
