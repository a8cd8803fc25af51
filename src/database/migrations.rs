//! Migraciones del schema del ledger
//!
//! Idempotentes: se pueden ejecutar en cada arranque.

use sqlx::PgPool;

const STATEMENTS: &[&str] = &[
    // ═══════════════════════════════════════
    // ENUMS
    // ═══════════════════════════════════════
    r#"DO $$ BEGIN
        CREATE TYPE quotation_status AS ENUM ('draft', 'sent', 'accepted', 'rejected', 'expired');
    EXCEPTION WHEN duplicate_object THEN NULL; END $$"#,
    r#"DO $$ BEGIN
        CREATE TYPE quotation_item_type AS ENUM ('service', 'part', 'custom');
    EXCEPTION WHEN duplicate_object THEN NULL; END $$"#,
    r#"DO $$ BEGIN
        CREATE TYPE payment_method AS ENUM ('cash', 'card', 'bank_transfer', 'cheque', 'other');
    EXCEPTION WHEN duplicate_object THEN NULL; END $$"#,
    // ═══════════════════════════════════════
    // TABLE: garages
    // ═══════════════════════════════════════
    r#"CREATE TABLE IF NOT EXISTS garages (
        id          BIGSERIAL    PRIMARY KEY,
        name        TEXT         NOT NULL,
        address     TEXT         NOT NULL,
        phone       TEXT         NOT NULL,
        email       TEXT         NOT NULL,
        created_at  TIMESTAMPTZ  NOT NULL DEFAULT NOW()
    )"#,
    // ═══════════════════════════════════════
    // TABLE: number_sequences
    // ═══════════════════════════════════════
    r#"CREATE TABLE IF NOT EXISTS number_sequences (
        garage_id   BIGINT  NOT NULL REFERENCES garages(id) ON DELETE RESTRICT,
        kind        TEXT    NOT NULL,
        last_value  BIGINT  NOT NULL CHECK (last_value > 0),
        PRIMARY KEY (garage_id, kind)
    )"#,
    // ═══════════════════════════════════════
    // TABLE: customers
    // ═══════════════════════════════════════
    r#"CREATE TABLE IF NOT EXISTS customers (
        id          BIGSERIAL    PRIMARY KEY,
        garage_id   BIGINT       NOT NULL REFERENCES garages(id) ON DELETE RESTRICT,
        first_name  TEXT         NOT NULL,
        last_name   TEXT         NOT NULL,
        phone       TEXT         NOT NULL,
        email       TEXT,
        address     TEXT,
        company     TEXT,
        created_at  TIMESTAMPTZ  NOT NULL DEFAULT NOW()
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_customers_garage ON customers(garage_id)",
    // ═══════════════════════════════════════
    // TABLE: vehicles
    // ═══════════════════════════════════════
    r#"CREATE TABLE IF NOT EXISTS vehicles (
        id                   BIGSERIAL    PRIMARY KEY,
        garage_id            BIGINT       NOT NULL REFERENCES garages(id) ON DELETE RESTRICT,
        customer_id          BIGINT       NOT NULL REFERENCES customers(id) ON DELETE RESTRICT,
        registration_number  TEXT         NOT NULL,
        make                 TEXT         NOT NULL,
        model                TEXT         NOT NULL,
        year                 INTEGER,
        color                TEXT,
        created_at           TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
        UNIQUE (garage_id, registration_number)
    )"#,
    // ═══════════════════════════════════════
    // TABLE: quotations + quotation_items
    // ═══════════════════════════════════════
    r#"CREATE TABLE IF NOT EXISTS quotations (
        id                BIGSERIAL         PRIMARY KEY,
        garage_id         BIGINT            NOT NULL REFERENCES garages(id) ON DELETE RESTRICT,
        customer_id       BIGINT            NOT NULL REFERENCES customers(id) ON DELETE RESTRICT,
        vehicle_id        BIGINT            NOT NULL REFERENCES vehicles(id) ON DELETE RESTRICT,
        quotation_number  TEXT              NOT NULL,
        status            quotation_status  NOT NULL DEFAULT 'draft',
        created_at        TIMESTAMPTZ       NOT NULL DEFAULT NOW(),
        valid_until       TIMESTAMPTZ       NOT NULL,
        total_amount      NUMERIC           NOT NULL CHECK (total_amount >= 0),
        notes             TEXT,
        UNIQUE (garage_id, quotation_number)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS quotation_items (
        id            BIGSERIAL            PRIMARY KEY,
        quotation_id  BIGINT               NOT NULL REFERENCES quotations(id) ON DELETE CASCADE,
        item_type     quotation_item_type  NOT NULL,
        item_id       BIGINT,
        description   TEXT                 NOT NULL,
        quantity      INTEGER              NOT NULL CHECK (quantity > 0),
        price         NUMERIC              NOT NULL CHECK (price >= 0)
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_quotation_items_quotation ON quotation_items(quotation_id)",
    // ═══════════════════════════════════════
    // TABLE: invoices
    // ═══════════════════════════════════════
    r#"CREATE TABLE IF NOT EXISTS invoices (
        id              BIGSERIAL    PRIMARY KEY,
        garage_id       BIGINT       NOT NULL REFERENCES garages(id) ON DELETE RESTRICT,
        customer_id     BIGINT       NOT NULL REFERENCES customers(id) ON DELETE RESTRICT,
        vehicle_id      BIGINT       NOT NULL REFERENCES vehicles(id) ON DELETE RESTRICT,
        quotation_id    BIGINT       UNIQUE REFERENCES quotations(id) ON DELETE RESTRICT,
        invoice_number  TEXT         NOT NULL,
        total_amount    NUMERIC      NOT NULL CHECK (total_amount > 0),
        created_at      TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
        UNIQUE (garage_id, invoice_number)
    )"#,
    // ═══════════════════════════════════════
    // TABLE: payments (append-only)
    // ═══════════════════════════════════════
    r#"CREATE TABLE IF NOT EXISTS payments (
        id              BIGSERIAL       PRIMARY KEY,
        invoice_id      BIGINT          NOT NULL REFERENCES invoices(id) ON DELETE RESTRICT,
        garage_id       BIGINT          NOT NULL REFERENCES garages(id) ON DELETE RESTRICT,
        payment_number  TEXT            NOT NULL,
        amount          NUMERIC         NOT NULL CHECK (amount > 0),
        payment_method  payment_method  NOT NULL,
        reference       TEXT,
        received_by     BIGINT,
        notes           TEXT,
        created_at      TIMESTAMPTZ     NOT NULL DEFAULT NOW(),
        UNIQUE (garage_id, payment_number)
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_payments_invoice ON payments(invoice_id)",
    // ═══════════════════════════════════════
    // TABLE: gate_passes (append-only)
    // ═══════════════════════════════════════
    r#"CREATE TABLE IF NOT EXISTS gate_passes (
        id              BIGSERIAL    PRIMARY KEY,
        garage_id       BIGINT       NOT NULL REFERENCES garages(id) ON DELETE RESTRICT,
        customer_id     BIGINT       NOT NULL REFERENCES customers(id) ON DELETE RESTRICT,
        vehicle_id      BIGINT       NOT NULL REFERENCES vehicles(id) ON DELETE RESTRICT,
        pass_number     TEXT         NOT NULL,
        purpose         TEXT         NOT NULL CHECK (length(trim(purpose)) > 0),
        security_notes  TEXT,
        created_at      TIMESTAMPTZ  NOT NULL DEFAULT NOW(),
        UNIQUE (garage_id, pass_number)
    )"#,
    // ═══════════════════════════════════════
    // Pagos y pases no admiten UPDATE ni DELETE
    // ═══════════════════════════════════════
    r#"CREATE OR REPLACE FUNCTION reject_ledger_mutation() RETURNS trigger AS $$
    BEGIN
        RAISE EXCEPTION '% is append-only', TG_TABLE_NAME;
    END;
    $$ LANGUAGE plpgsql"#,
    "DROP TRIGGER IF EXISTS payments_append_only ON payments",
    r#"CREATE TRIGGER payments_append_only
        BEFORE UPDATE OR DELETE ON payments
        FOR EACH ROW EXECUTE FUNCTION reject_ledger_mutation()"#,
    "DROP TRIGGER IF EXISTS gate_passes_append_only ON gate_passes",
    r#"CREATE TRIGGER gate_passes_append_only
        BEFORE UPDATE OR DELETE ON gate_passes
        FOR EACH ROW EXECUTE FUNCTION reject_ledger_mutation()"#,
];

/// Ejecutar todas las migraciones del ledger
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in STATEMENTS.iter().copied() {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("✅ Migraciones aplicadas ({} sentencias)", STATEMENTS.len());
    Ok(())
}
