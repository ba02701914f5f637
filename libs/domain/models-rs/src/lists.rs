// [libs/domain/models-rs/src/lists.rs]
/*!
 * =================================================================
 * APARATO: CURATED LIST TYPOLOGY (V5.0 - LIVENESS CONTRACT)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: TIPOLOGÍA DE ENTIDADES DE LA GREYLIST GENÉRICA
 *
 * # Logic:
 * Las seis tablas de listas comparten el predicado de vida:
 * status='ACTIVE' AND (expires_at IS NULL OR expires_at > now()).
 * La greylist es la única tabla polimórfica; discrimina por entidad.
 * =================================================================
 */

use serde::{Deserialize, Serialize};

/// Discriminador de entidad para las filas de 'risk_greylist'.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GreylistEntityType {
    #[serde(rename = "USER_CODE")]
    UserCode,
    #[serde(rename = "IP_ADDRESS")]
    IpAddress,
    #[serde(rename = "DEVICE_FINGERPRINT")]
    DeviceFingerprint,
    #[serde(rename = "DESTINATION_ADDRESS")]
    DestinationAddress,
    #[serde(rename = "EMAIL_DOMAIN")]
    EmailDomain,
}

impl GreylistEntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GreylistEntityType::UserCode => "USER_CODE",
            GreylistEntityType::IpAddress => "IP_ADDRESS",
            GreylistEntityType::DeviceFingerprint => "DEVICE_FINGERPRINT",
            GreylistEntityType::DestinationAddress => "DESTINATION_ADDRESS",
            GreylistEntityType::EmailDomain => "EMAIL_DOMAIN",
        }
    }
}

impl std::fmt::Display for GreylistEntityType {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
