// [apps/decision-gateway/src/config.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY CONFIGURATION (V4.1 - ENV SOURCED)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: CAPTURA DE COORDENADAS TÁCTICAS DEL ENTORNO
 *
 * # Logic:
 * Toda la configuración es de origen ambiental con defaults de
 * producción razonables. Las llaves de API ausentes no detienen la
 * ignición: los adaptadores afectados degradan a fail-open o
 * fallback según su política.
 * =================================================================
 */

use std::time::Duration;

/// Valores operativos del perímetro de decisión.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub database_url: String,
    pub database_auth_token: Option<String>,
    pub listening_port: u16,

    pub sanctions_api_url: String,
    pub sanctions_api_key: Option<String>,
    pub explorer_api_url: String,
    pub explorer_api_key: Option<String>,

    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,

    pub alert_webhook_url: Option<String>,

    pub rule_cache_ttl_seconds: i64,
    pub sanctions_cache_ttl_seconds: u64,
    pub destination_age_cache_ttl_seconds: u64,

    pub feature_fetch_max_retries: u32,
    pub feature_fetch_retry_delay: Duration,
}

impl GatewayConfig {
    /**
     * Hidrata la configuración desde el espacio de nombres del proceso.
     *
     * # Errors:
     * Solo DATABASE_URL es imperativa; su ausencia aborta la ignición.
     */
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("CRITICAL_FAULT: DATABASE_URL not defined in runtime environment."))?;

        Ok(Self {
            database_url,
            database_auth_token: optional_env("TURSO_AUTH_TOKEN"),
            listening_port: parsed_env("PORT", 3000),

            sanctions_api_url: std::env::var("SANCTIONS_API_URL")
                .unwrap_or_else(|_| "https://public.chainalysis.com/api/v1/address".to_string()),
            sanctions_api_key: optional_env("SANCTIONS_API_KEY"),
            explorer_api_url: std::env::var("EXPLORER_API_URL")
                .unwrap_or_else(|_| "https://api.blockchair.com".to_string()),
            explorer_api_key: optional_env("EXPLORER_API_KEY"),

            llm_api_url: std::env::var("LLM_API_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            llm_model: std::env::var("LLM_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            llm_api_key: optional_env("LLM_API_KEY"),

            alert_webhook_url: optional_env("ALERT_WEBHOOK_URL"),

            rule_cache_ttl_seconds: parsed_env("RULE_CACHE_TTL_SECONDS", 300),
            sanctions_cache_ttl_seconds: parsed_env("SANCTIONS_CACHE_TTL_SECONDS", 3600),
            destination_age_cache_ttl_seconds: parsed_env("DEST_AGE_CACHE_TTL_SECONDS", 21600),

            feature_fetch_max_retries: parsed_env("FEATURE_FETCH_MAX_RETRIES", 5),
            feature_fetch_retry_delay: Duration::from_millis(parsed_env(
                "FEATURE_FETCH_RETRY_DELAY_MS",
                1000,
            )),
        })
    }
}

/// Variable opcional: vacía cuenta como ausente.
fn optional_env(variable_name: &str) -> Option<String> {
    std::env::var(variable_name).ok().filter(|value| !value.is_empty())
}

/// Variable numérica con default ante ausencia o texto ilegible.
fn parsed_env<T: std::str::FromStr>(variable_name: &str, default_value: T) -> T {
    std::env::var(variable_name)
        .ok()
        .and_then(|raw_value| raw_value.parse::<T>().ok())
        .unwrap_or(default_value)
}
