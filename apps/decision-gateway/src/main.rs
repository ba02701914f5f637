// [apps/decision-gateway/src/main.rs]
/*!
 * =================================================================
 * APARATO: DECISION GATEWAY ENTRY POINT (V4.2 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * # Mathematical Proof (Deterministic Ignition):
 * El proceso garantiza que el bootstrap del esquema ocurra antes de
 * la apertura del socket TCP, previniendo estados de carrera donde
 * una solicitud de decisión aterrice sobre un Ledger sin solidificar.
 * =================================================================
 */

use anyhow::Context;
use cerberus_decision_gateway::config::GatewayConfig;
use cerberus_decision_gateway::{create_gateway_router, AppState};
use cerberus_infra_db::TursoClient;
use cerberus_shared_argus::init_tracing;
use dotenvy::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. CARGA DE ENTORNO SOBERANO
    dotenv().ok();

    // 2. INICIALIZACIÓN DE OBSERVABILIDAD (ARGUS)
    init_tracing("cerberus_decision_gateway");

    info!("🛰️  [GATEWAY]: Global ignition sequence starting...");

    // 3. ADQUISICIÓN DE COORDENADAS TÁCTICAS
    let gateway_config = GatewayConfig::from_env()?;

    // 4. ENLACE CON EL LEDGER TÁCTICO (bootstrap de esquema incluido)
    let database_client = TursoClient::connect(
        &gateway_config.database_url,
        gateway_config.database_auth_token.clone(),
    )
    .await
    .context("CRITICAL_FAULT: Tactical ledger link collapsed during ignition.")?;

    // 5. CONSTRUCCIÓN DE LA PLACA BASE Y LA MATRIZ DE RUTAS
    let application_state = AppState::new(database_client, &gateway_config);
    let gateway_router = create_gateway_router(application_state);

    // 6. APERTURA DEL SOCKET PERIMETRAL
    let listening_address = format!("0.0.0.0:{}", gateway_config.listening_port);
    let tcp_listener = tokio::net::TcpListener::bind(&listening_address)
        .await
        .with_context(|| format!("NETWORK_FAULT: Unable to claim {listening_address}."))?;

    info!("🚀 [GATEWAY]: Decision perimeter OPERATIONAL on {}.", listening_address);

    axum::serve(tcp_listener, gateway_router)
        .await
        .context("KERNEL_FAULT: Perimeter server collapsed.")?;

    Ok(())
}
