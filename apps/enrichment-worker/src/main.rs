// [apps/enrichment-worker/src/main.rs]
/*!
 * =================================================================
 * APARATO: ENRICHMENT WORKER SHELL (V3.2 - ZENITH SHELL)
 * CLASIFICACIÓN: APPLICATION LAYER (ENTRY POINT)
 * RESPONSABILIDAD: BOOTSTRAP DE ENTORNO E IGNICIÓN DEL MOTOR
 *
 * # Mathematical Proof (Deterministic Init):
 * El worker solo abre su superficie de ingesta cuando el enlace con
 * el Ledger y el bootstrap del esquema están sellados, garantizando
 * que todo upsert de dimensión aterrice sobre tablas solidificadas.
 * =================================================================
 */

use anyhow::Context;
use cerberus_enrichment_worker::engine::EnrichmentEngine;
use cerberus_enrichment_worker::shell::{create_worker_router, WorkerState};
use cerberus_infra_db::repositories::DimensionRepository;
use cerberus_infra_db::TursoClient;
use cerberus_infra_screening::{DestinationAgeClient, SanctionsClient};
use cerberus_shared_argus::init_tracing;
use clap::Parser;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;

/**
 * Directivas de mando para el worker de enriquecimiento.
 * Configuración inyectada vía CLI o variables de entorno.
 */
#[derive(Parser, Debug)]
#[command(
    author = "Cerberus Risk Engineering",
    version = "3.2",
    about = "Cerberus Enrichment Worker // Dimension freshness daemon"
)]
struct WorkerDirectives {
    /// URL del cluster libSQL (local, remoto o memoria).
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Token de acceso para clusters remotos.
    #[arg(long, env = "TURSO_AUTH_TOKEN")]
    database_auth_token: Option<String>,

    /// Puerto de la superficie de ingesta CDC.
    #[arg(long, env = "WORKER_PORT", default_value_t = 3100)]
    listening_port: u16,

    /// Endpoint raíz del proveedor de sanciones.
    #[arg(long, env = "SANCTIONS_API_URL", default_value = "https://public.chainalysis.com/api/v1/address")]
    sanctions_api_url: String,

    /// Llave del proveedor de sanciones.
    #[arg(long, env = "SANCTIONS_API_KEY")]
    sanctions_api_key: Option<String>,

    /// Endpoint raíz del dashboard del explorador.
    #[arg(long, env = "EXPLORER_API_URL", default_value = "https://api.blockchair.com")]
    explorer_api_url: String,

    /// Llave del explorador.
    #[arg(long, env = "EXPLORER_API_KEY")]
    explorer_api_key: Option<String>,

    /// TTL de la caché de sanciones en segundos.
    #[arg(long, env = "SANCTIONS_CACHE_TTL_SECONDS", default_value_t = 3600)]
    sanctions_cache_ttl_seconds: u64,

    /// TTL de la caché de edad de destino en segundos.
    #[arg(long, env = "DEST_AGE_CACHE_TTL_SECONDS", default_value_t = 21600)]
    destination_age_cache_ttl_seconds: u64,

    /// Ventana de re-chequeo de dimensiones en horas.
    #[arg(long, env = "DIMENSION_RECHECK_HOURS", default_value_t = 24)]
    dimension_recheck_hours: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. CARGA DE ENTORNO E INICIALIZACIÓN DE OBSERVABILIDAD
    dotenv().ok();
    init_tracing("cerberus_enrichment_worker");

    info!("💠 [WORKER_SHELL]: Global initiation sequence V3.2 starting...");

    // 2. PARSEO DE DIRECTIVAS ESTRATÉGICAS
    let worker_directives = WorkerDirectives::parse();

    // 3. ENLACE CON EL LEDGER TÁCTICO
    let database_client = TursoClient::connect(
        &worker_directives.database_url,
        worker_directives.database_auth_token.clone(),
    )
    .await
    .context("CRITICAL_FAULT: Tactical ledger link collapsed during ignition.")?;

    // 4. CONSTRUCCIÓN DEL MOTOR DE REFRESCO
    let enrichment_engine = Arc::new(EnrichmentEngine::new(
        DimensionRepository::new(database_client),
        Arc::new(SanctionsClient::new(
            worker_directives.sanctions_api_url,
            worker_directives.sanctions_api_key,
            worker_directives.sanctions_cache_ttl_seconds,
        )),
        Arc::new(DestinationAgeClient::new(
            worker_directives.explorer_api_url,
            worker_directives.explorer_api_key,
            worker_directives.destination_age_cache_ttl_seconds,
        )),
        worker_directives.dimension_recheck_hours,
    ));

    // 5. APERTURA DE LA SUPERFICIE DE INGESTA
    let worker_router = create_worker_router(WorkerState { enrichment_engine });
    let listening_address = format!("0.0.0.0:{}", worker_directives.listening_port);
    let tcp_listener = tokio::net::TcpListener::bind(&listening_address)
        .await
        .with_context(|| format!("NETWORK_FAULT: Unable to claim {listening_address}."))?;

    info!("🚀 [WORKER_SHELL]: Enrichment surface OPERATIONAL on {}.", listening_address);

    axum::serve(tcp_listener, worker_router)
        .await
        .context("KERNEL_FAULT: Worker server collapsed.")?;

    Ok(())
}
