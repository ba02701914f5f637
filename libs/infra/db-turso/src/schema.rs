// [libs/infra/db-turso/src/schema.rs]
/**
 * =================================================================
 * APARATO: RISK LEDGER SCHEMA (V9.2 - DIMENSION STRATA)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. FEATURE STRATA: Solidifica 'risk_features' con las columnas
 *    nominales del job de streaming; las columnas derivadas llegan
 *    por reparación evolutiva.
 * 2. LIST MATRIX: Las seis listas curadas comparten la tríada
 *    (status, expires_at, reason) para el predicado de vida.
 * 3. IDEMPOTENCIA: Gestión de errores para migraciones en caliente.
 * 4. PERFORMANCE: Índices de aceleración para el camino en línea.
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument, warn};

/**
 * ESTRATO 1: SOLIDIFICACIÓN (Génesis de Tablas)
 * Define las entidades base del ecosistema de riesgo.
 */
const TACTICAL_TABLES: &[(&str, &str)] = &[
    ("TABLE_RISK_FEATURES", r#"
        CREATE TABLE IF NOT EXISTS risk_features (
            user_code TEXT NOT NULL,
            txn_id TEXT NOT NULL,
            destination_address TEXT,
            chain TEXT,
            device_fingerprint TEXT,
            ip_address TEXT,
            user_email TEXT,
            withdraw_currency TEXT,
            withdrawal_amount REAL,
            is_new_device INTEGER,
            is_new_ip INTEGER,
            is_new_destination_address INTEGER,
            account_maturity INTEGER,
            update_time DATETIME DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (user_code, txn_id)
        );
    "#),
    ("TABLE_RISK_RULES", r#"
        CREATE TABLE IF NOT EXISTS risk_rules (
            rule_id INTEGER PRIMARY KEY,
            rule_name TEXT NOT NULL,
            priority INTEGER NOT NULL DEFAULT 100,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            logic_expression TEXT NOT NULL,
            action TEXT NOT NULL,
            narrative TEXT,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_WHITELIST_USER", r#"
        CREATE TABLE IF NOT EXISTS risk_whitelist_user (
            user_code TEXT PRIMARY KEY,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            expires_at DATETIME,
            reason TEXT
        );
    "#),
    ("TABLE_WHITELIST_ADDRESS", r#"
        CREATE TABLE IF NOT EXISTS risk_whitelist_address (
            address TEXT NOT NULL,
            chain TEXT,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            expires_at DATETIME,
            reason TEXT,
            PRIMARY KEY (address, chain)
        );
    "#),
    ("TABLE_BLACKLIST_USER", r#"
        CREATE TABLE IF NOT EXISTS risk_blacklist_user (
            user_code TEXT PRIMARY KEY,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            expires_at DATETIME,
            reason TEXT
        );
    "#),
    ("TABLE_BLACKLIST_ADDRESS", r#"
        CREATE TABLE IF NOT EXISTS risk_blacklist_address (
            address TEXT NOT NULL,
            chain TEXT,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            expires_at DATETIME,
            reason TEXT,
            PRIMARY KEY (address, chain)
        );
    "#),
    ("TABLE_BLACKLIST_FINGERPRINT", r#"
        CREATE TABLE IF NOT EXISTS risk_blacklist_fingerprint (
            fingerprint TEXT PRIMARY KEY,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            expires_at DATETIME,
            reason TEXT
        );
    "#),
    ("TABLE_BLACKLIST_IP", r#"
        CREATE TABLE IF NOT EXISTS risk_blacklist_ip (
            ip_address TEXT PRIMARY KEY,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            expires_at DATETIME,
            reason TEXT
        );
    "#),
    ("TABLE_BLACKLIST_EMAILDOMAIN", r#"
        CREATE TABLE IF NOT EXISTS risk_blacklist_emaildomain (
            email_domain TEXT PRIMARY KEY,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            expires_at DATETIME,
            reason TEXT
        );
    "#),
    ("TABLE_GREYLIST", r#"
        CREATE TABLE IF NOT EXISTS risk_greylist (
            entity_type TEXT NOT NULL,
            entity_value TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            expires_at DATETIME,
            reason TEXT,
            PRIMARY KEY (entity_type, entity_value)
        );
    "#),
    ("TABLE_WITHDRAW_DECISION", r#"
        CREATE TABLE IF NOT EXISTS risk_withdraw_decision (
            record_id TEXT PRIMARY KEY,
            user_code TEXT NOT NULL,
            txn_id TEXT NOT NULL,
            decision TEXT NOT NULL,
            primary_threat TEXT,
            confidence REAL,
            narrative TEXT,
            features_snapshot TEXT,
            decision_source TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
    "#),
    ("TABLE_LOGIN_HISTORY", r#"
        CREATE TABLE IF NOT EXISTS login_history (
            user_code TEXT NOT NULL,
            login_time DATETIME NOT NULL
        );
    "#),
    ("TABLE_USER_DEVICE", r#"
        CREATE TABLE IF NOT EXISTS user_device (
            user_code TEXT NOT NULL,
            event_type TEXT NOT NULL DEFAULT 'LOGIN',
            country_code TEXT,
            is_vpn INTEGER NOT NULL DEFAULT 0,
            event_time DATETIME NOT NULL
        );
    "#),
    ("TABLE_WITHDRAW_RECORD", r#"
        CREATE TABLE IF NOT EXISTS withdraw_record (
            user_code TEXT NOT NULL,
            txn_id TEXT NOT NULL,
            chain TEXT,
            destination_address TEXT,
            amount REAL,
            currency TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (user_code, txn_id)
        );
    "#),
    ("TABLE_DIM_SANCTIONS", r#"
        CREATE TABLE IF NOT EXISTS dim_sanctions_address (
            chain TEXT NOT NULL,
            address TEXT NOT NULL,
            is_sanctioned INTEGER NOT NULL DEFAULT 0,
            sanctions_status TEXT NOT NULL DEFAULT 'PENDING',
            last_checked_at DATETIME,
            last_error TEXT,
            PRIMARY KEY (chain, address)
        );
    "#),
    ("TABLE_DIM_DESTINATION_AGE", r#"
        CREATE TABLE IF NOT EXISTS dim_destination_age (
            chain TEXT NOT NULL,
            address TEXT NOT NULL,
            destination_age_hours INTEGER,
            age_status TEXT NOT NULL DEFAULT 'PENDING',
            first_seen_at DATETIME,
            last_checked_at DATETIME,
            last_error TEXT,
            PRIMARY KEY (chain, address)
        );
    "#),
];

/**
 * ESTRATO 2: EVOLUCIÓN (Mutaciones de Columna)
 * Columnas derivadas y de enriquecimiento que el camino en línea
 * escribe de vuelta sobre la fila de features.
 */
const EVOLUTIONARY_STRATA: &[(&str, &str)] = &[
    ("FEATURE_IMPOSSIBLE_TRAVEL", "ALTER TABLE risk_features ADD COLUMN is_impossible_travel INTEGER"),
    ("FEATURE_TIME_SINCE_LOGIN", "ALTER TABLE risk_features ADD COLUMN time_since_user_login REAL"),
    ("FEATURE_DESTINATION_AGE", "ALTER TABLE risk_features ADD COLUMN destination_age_hours REAL"),
    ("FEATURE_IS_SANCTIONED", "ALTER TABLE risk_features ADD COLUMN is_sanctioned INTEGER"),
    ("DECISION_LLM_REASONING", "ALTER TABLE risk_withdraw_decision ADD COLUMN llm_reasoning TEXT"),
];

/**
 * ESTRATO 3: ENDURECIMIENTO (Índices de Aceleración)
 * Optimiza el camino en línea (fetch por usuario) y la agregación
 * downstream del rastro de decisiones.
 */
const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    ("IDX_FEATURES_USER_TIME", "CREATE INDEX IF NOT EXISTS idx_features_user_time ON risk_features(user_code, update_time DESC);"),
    ("IDX_DECISION_SUBJECT", "CREATE INDEX IF NOT EXISTS idx_decision_subject ON risk_withdraw_decision(user_code, txn_id);"),
    ("IDX_RULES_DISPATCH", "CREATE INDEX IF NOT EXISTS idx_rules_dispatch ON risk_rules(status, priority);"),
    ("IDX_GREYLIST_LOOKUP", "CREATE INDEX IF NOT EXISTS idx_greylist_lookup ON risk_greylist(entity_type, entity_value);"),
    ("IDX_LOGIN_HISTORY", "CREATE INDEX IF NOT EXISTS idx_login_history ON login_history(user_code, login_time DESC);"),
    ("IDX_USER_DEVICE", "CREATE INDEX IF NOT EXISTS idx_user_device ON user_device(user_code, event_time DESC);"),
];

/**
 * Ejecuta la secuencia maestra de sincronización del esquema estructural.
 *
 * # Errors:
 * Retorna error si alguna tabla base falla en solidificarse, indicando
 * un colapso en el enlace con el cluster.
 */
#[instrument(skip(database_connection))]
pub async fn apply_full_risk_schema(database_connection: &Connection) -> Result<()> {
    info!("🏗️ [SCHEMA_ENGINE]: Initiating structural synchronization V9.2...");

    solidify_base_strata(database_connection).await?;
    execute_evolutionary_repair(database_connection).await?;
    harden_access_layer(database_connection).await?;

    info!("✅ [SCHEMA_ENGINE]: Risk Ledger V9.2 level and certified.");
    Ok(())
}

async fn solidify_base_strata(db: &Connection) -> Result<()> {
    for (identifier, sql) in TACTICAL_TABLES {
        debug!("  ↳ Solidifying: {}", identifier);
        db.execute(*sql, ()).await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {}", identifier))?;
    }
    Ok(())
}

async fn execute_evolutionary_repair(db: &Connection) -> Result<()> {
    for (identifier, sql) in EVOLUTIONARY_STRATA {
        match db.execute(*sql, ()).await {
            Ok(_) => debug!("  🟢 [REPAIR_OK]: Applied evolutionary stratum {}", identifier),
            Err(repair_fault) => {
                let message = repair_fault.to_string();
                if message.contains("duplicate column name") {
                    debug!("  ⚪ [REPAIR_SKIP]: {} already level.", identifier);
                } else {
                    warn!("  ⚠️ [REPAIR_BYPASS]: {} check incomplete: {}", identifier, message);
                }
            }
        }
    }
    Ok(())
}

async fn harden_access_layer(db: &Connection) -> Result<()> {
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  ↳ Hardening: {}", identifier);
        db.execute(*sql, ()).await
            .with_context(|| format!("CRITICAL_HARDENING_FAULT: {}", identifier))?;
    }
    Ok(())
}
