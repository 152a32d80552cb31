//! Initial database migration.
//!
//! Creates all core tables, enums, and triggers for the expense approval
//! workflow.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TENANCY & DIRECTORY
        // ============================================================
        db.execute_unprepared(COMPANIES_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 3: APPROVAL RULES
        // ============================================================
        db.execute_unprepared(APPROVAL_RULES_SQL).await?;
        db.execute_unprepared(RULE_APPROVERS_SQL).await?;

        // ============================================================
        // PART 4: EXPENSES & APPROVAL TASKS
        // ============================================================
        db.execute_unprepared(EXPENSES_SQL).await?;
        db.execute_unprepared(EXPENSE_APPROVALS_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- User roles
CREATE TYPE user_role AS ENUM (
    'admin',
    'manager',
    'employee'
);

-- Expense status
CREATE TYPE expense_status AS ENUM (
    'draft',
    'waiting_approval',
    'approved',
    'rejected'
);

-- Approval task decision
CREATE TYPE approval_decision AS ENUM (
    'pending',
    'approved',
    'rejected'
);
";

const COMPANIES_SQL: &str = r"
CREATE TABLE companies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    base_currency CHAR(3) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_base_currency_format CHECK (base_currency ~ '^[A-Z]{3}$')
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    role user_role NOT NULL DEFAULT 'employee',
    manager_id UUID REFERENCES users(id) ON DELETE SET NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_company ON users(company_id) WHERE is_active = true;
CREATE INDEX idx_users_manager ON users(manager_id) WHERE manager_id IS NOT NULL;
";

const APPROVAL_RULES_SQL: &str = r"
CREATE TABLE approval_rules (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    is_manager_approver BOOLEAN NOT NULL DEFAULT false,
    min_approval_percentage SMALLINT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_percentage_range CHECK (
        min_approval_percentage IS NULL
        OR (min_approval_percentage >= 0 AND min_approval_percentage <= 100)
    )
);

CREATE INDEX idx_approval_rules_company ON approval_rules(company_id);
";

const RULE_APPROVERS_SQL: &str = r"
CREATE TABLE rule_approvers (
    id UUID PRIMARY KEY,
    rule_id UUID NOT NULL REFERENCES approval_rules(id) ON DELETE CASCADE,
    approver_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    sequence INTEGER,
    is_mandatory BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_rule_approver UNIQUE (rule_id, approver_id)
);

CREATE INDEX idx_rule_approvers_rule ON rule_approvers(rule_id);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    employee_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    rule_id UUID REFERENCES approval_rules(id) ON DELETE SET NULL,
    description TEXT NOT NULL,
    category VARCHAR(100),
    expense_date DATE NOT NULL,
    paid_by VARCHAR(255),
    remarks TEXT,
    amount NUMERIC(19, 4) NOT NULL,
    currency CHAR(3) NOT NULL,
    original_amount NUMERIC(19, 4) NOT NULL,
    original_currency CHAR(3) NOT NULL,
    status expense_status NOT NULL DEFAULT 'draft',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_original_amount_positive CHECK (original_amount > 0),
    CONSTRAINT chk_currency_format CHECK (currency ~ '^[A-Z]{3}$'),
    CONSTRAINT chk_original_currency_format CHECK (original_currency ~ '^[A-Z]{3}$')
);

CREATE INDEX idx_expenses_employee ON expenses(employee_id, created_at DESC);
CREATE INDEX idx_expenses_status ON expenses(status);
";

const EXPENSE_APPROVALS_SQL: &str = r"
CREATE TABLE expense_approvals (
    id UUID PRIMARY KEY,
    expense_id UUID NOT NULL REFERENCES expenses(id) ON DELETE CASCADE,
    approver_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    sequence INTEGER,
    is_mandatory BOOLEAN NOT NULL DEFAULT false,
    decision approval_decision NOT NULL DEFAULT 'pending',
    comments TEXT,
    decided_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_expense_approver UNIQUE (expense_id, approver_id)
);

CREATE INDEX idx_expense_approvals_expense ON expense_approvals(expense_id);

-- Index for an approver's pending queue (most common lookup)
CREATE INDEX idx_expense_approvals_pending
    ON expense_approvals(approver_id) WHERE decision = 'pending';
";

const TRIGGERS_SQL: &str = r"
-- Keep updated_at current on row updates
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_companies_updated_at
    BEFORE UPDATE ON companies
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_users_updated_at
    BEFORE UPDATE ON users
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_approval_rules_updated_at
    BEFORE UPDATE ON approval_rules
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_expenses_updated_at
    BEFORE UPDATE ON expenses
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS expense_approvals CASCADE;
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS rule_approvers CASCADE;
DROP TABLE IF EXISTS approval_rules CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TABLE IF EXISTS companies CASCADE;

DROP FUNCTION IF EXISTS set_updated_at CASCADE;

DROP TYPE IF EXISTS approval_decision;
DROP TYPE IF EXISTS expense_status;
DROP TYPE IF EXISTS user_role;
";
