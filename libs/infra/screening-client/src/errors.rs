// [libs/infra/screening-client/src/errors.rs]
/*!
 * =================================================================
 * APARATO: SCREENING ERROR CATALOG (V4.0)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DE PROVEEDOR EXTERNO
 *
 * # Logic:
 * El catálogo es interno al adaptador: los métodos públicos
 * degradan a fail-open (false / None) y el fallo solo viaja al
 * rastro forense.
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreeningError {
    /// Fallo físico de red o timeout contra el proveedor.
    #[error("[L4_SCREEN_FAULT]: NETWORK_UNREACHABLE -> {0}")]
    ConnectionFault(#[from] reqwest::Error),

    /// El proveedor rechazó la solicitud (cuota, llave, estado HTTP).
    #[error("[L4_SCREEN_FAULT]: PROVIDER_REJECTION -> HTTP_{0}")]
    ProviderRejection(u16),

    /// El cuerpo del proveedor no decodifica al contrato esperado.
    #[error("[L4_SCREEN_FAULT]: MALFORMED_PAYLOAD -> {0}")]
    MalformedPayload(String),

    /// El prefijo de la dirección no mapea a ninguna cadena conocida.
    #[error("[L4_SCREEN_FAULT]: UNKNOWN_CHAIN_PREFIX")]
    UnknownChainPrefix,
}
