// [libs/domain/models-rs/src/history.rs]
/*!
 * =================================================================
 * APARATO: BEHAVIORAL HISTORY CONTRACTS (V5.0)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: EVENTOS HISTÓRICOS PARA RASGOS DERIVADOS EN LÍNEA
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Evento de dispositivo leído de 'user_device' (orden descendente).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceEvent {
    pub user_code: String,
    /// Código ISO de país observado; NULL inhibe el rasgo de viaje imposible.
    pub country_code: Option<String>,
    pub is_vpn: bool,
    pub event_time: DateTime<Utc>,
}
