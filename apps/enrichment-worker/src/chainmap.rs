// [apps/enrichment-worker/src/chainmap.rs]
/*!
 * =================================================================
 * APARATO: EXPLORER CHAIN MAP (V3.0 - CLOSED VOCABULARY)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-WORKER)
 * RESPONSABILIDAD: SÍMBOLO DE CADENA -> VOCABULARIO DEL EXPLORADOR
 *
 * # Logic:
 * El catálogo es cerrado; un símbolo fuera de él produce la etiqueta
 * de error 'UNMAPPED_CHAIN_<x>' que la dimensión sella como ERROR.
 * =================================================================
 */

/**
 * Mapea el símbolo de cadena del registro de retiro al identificador
 * que consume el dashboard del explorador.
 *
 * # Errors:
 * Retorna la etiqueta 'UNMAPPED_CHAIN_<x>' para símbolos desconocidos.
 */
pub fn map_chain_for_explorer(chain_symbol: &str) -> Result<&'static str, String> {
    match chain_symbol.trim().to_ascii_uppercase().as_str() {
        "BTC" => Ok("bitcoin"),
        "ETH" => Ok("ethereum"),
        "TRX" => Ok("tron"),
        "LTC" => Ok("litecoin"),
        "BCH" => Ok("bitcoin-cash"),
        _ => Err(format!("UNMAPPED_CHAIN_{}", chain_symbol.trim())),
    }
}
