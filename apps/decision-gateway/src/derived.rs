// [apps/decision-gateway/src/derived.rs]
/*!
 * =================================================================
 * APARATO: DERIVED FEATURE ENGINE (V4.2 - INLINE ENRICHMENT)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: RASGOS DERIVADOS EN CALIENTE PARA LAS REGLAS
 *
 * # Logic:
 * Dos rasgos calculados en línea, ambos best-effort:
 *
 * 'is_impossible_travel': último evento de dispositivo WITHDRAW
 * contra el evento inmediatamente anterior; verdadero sii ambos
 * traen país no nulo, ninguno es VPN, los países difieren y el
 * delta temporal es estrictamente menor a 1 hora.
 *
 * 'time_since_user_login': minutos entre la creación del retiro y
 * el login más reciente en o antes de ella; marca faltante colapsa
 * al centinela 999999 ("desconocido / muy largo").
 * =================================================================
 */

use cerberus_infra_db::repositories::HistoryRepository;
use chrono::Duration;
use tracing::{debug, instrument, warn};

/// Centinela de "desconocido / muy largo" para el tiempo desde login.
pub const UNKNOWN_LOGIN_GAP_MINUTES: f64 = 999_999.0;
/// Ventana de viaje imposible (estrictamente menor).
const IMPOSSIBLE_TRAVEL_WINDOW_MINUTES: i64 = 60;

/**
 * Rasgo de viaje imposible del usuario.
 * Historia insuficiente o incompleta colapsa a 'false'.
 */
#[instrument(skip(history_repository), fields(user = %user_code))]
pub async fn compute_impossible_travel(history_repository: &HistoryRepository, user_code: &str) -> bool {
    let latest_withdraw_event = match history_repository.latest_withdraw_device_event(user_code).await {
        Ok(Some(device_event)) => device_event,
        Ok(None) => return false,
        Err(history_fault) => {
            warn!("⚠️ [DERIVED]: Withdraw event read failed, travel flag neutral: {}", history_fault);
            return false;
        }
    };

    let prior_event = match history_repository
        .prior_device_event(user_code, latest_withdraw_event.event_time)
        .await
    {
        Ok(Some(device_event)) => device_event,
        Ok(None) => return false,
        Err(history_fault) => {
            warn!("⚠️ [DERIVED]: Prior event read failed, travel flag neutral: {}", history_fault);
            return false;
        }
    };

    let (Some(withdraw_country), Some(prior_country)) =
        (&latest_withdraw_event.country_code, &prior_event.country_code)
    else {
        return false;
    };

    if latest_withdraw_event.is_vpn || prior_event.is_vpn {
        return false;
    }

    if withdraw_country == prior_country {
        return false;
    }

    let event_gap = latest_withdraw_event.event_time - prior_event.event_time;
    let is_impossible = event_gap < Duration::minutes(IMPOSSIBLE_TRAVEL_WINDOW_MINUTES);

    if is_impossible {
        debug!(
            "🛫 [DERIVED]: Impossible travel flagged: {} -> {} in {} minutes.",
            prior_country,
            withdraw_country,
            event_gap.num_minutes()
        );
    }

    is_impossible
}

/**
 * Minutos entre la creación del retiro y el login más reciente en o
 * antes de ella. Cualquier marca faltante produce el centinela.
 */
#[instrument(skip(history_repository), fields(user = %user_code, txn = %txn_id))]
pub async fn compute_time_since_login(
    history_repository: &HistoryRepository,
    user_code: &str,
    txn_id: &str,
) -> f64 {
    let withdraw_created_at = match history_repository.withdraw_creation_time(user_code, txn_id).await {
        Ok(Some(creation_timestamp)) => creation_timestamp,
        Ok(None) => return UNKNOWN_LOGIN_GAP_MINUTES,
        Err(history_fault) => {
            warn!("⚠️ [DERIVED]: Withdraw timestamp read failed, sentinel applied: {}", history_fault);
            return UNKNOWN_LOGIN_GAP_MINUTES;
        }
    };

    let latest_login = match history_repository
        .latest_login_at_or_before(user_code, withdraw_created_at)
        .await
    {
        Ok(Some(login_timestamp)) => login_timestamp,
        Ok(None) => return UNKNOWN_LOGIN_GAP_MINUTES,
        Err(history_fault) => {
            warn!("⚠️ [DERIVED]: Login history read failed, sentinel applied: {}", history_fault);
            return UNKNOWN_LOGIN_GAP_MINUTES;
        }
    };

    let gap_minutes = (withdraw_created_at - latest_login).num_seconds() as f64 / 60.0;
    gap_minutes.max(0.0)
}
