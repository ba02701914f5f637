// [libs/domain/models-rs/src/envelope.rs]
/*!
 * =================================================================
 * APARATO: INGRESS ENVELOPE CONTRACTS (V5.2 - DUAL SHAPE)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: SOBRES CDC Y RAZONES DE OMISIÓN DE REGISTRO
 *
 * # Logic:
 * Un lote CDC es una secuencia de registros cuyo 'value' puede llegar
 * como objeto, como JSON plano o como JSON codificado en base64. El
 * documento interior {type, data[]} solo se procesa para INSERT (o
 * type ausente); el resto se omite con un código corto 'SKIPPED_*'
 * que NO es un objeto de respuesta.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Registro individual de un lote CDC; 'value' es polimórfico.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdcEnvelopeRecord {
    pub value: Value,
}

/// Documento CDC interior: mutación de fila con su tipo de operación.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdcDocument {
    /// Tipo de mutación (INSERT/UPDATE/DELETE); ausente se asume INSERT.
    #[serde(rename = "type", default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<Map<String, Value>>>,
}

impl CdcDocument {
    /// Solo las inserciones alimentan la cascada y al worker.
    pub fn is_insert(&self) -> bool {
        match &self.document_type {
            None => true,
            Some(label) => label.eq_ignore_ascii_case("INSERT"),
        }
    }

    /**
     * Decodifica el 'value' polimórfico de un registro CDC:
     * objeto directo, JSON plano o JSON codificado en base64
     * (probado en ese orden para las cadenas).
     */
    pub fn decode(raw_value: &Value) -> Option<Self> {
        use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
        use base64::Engine;

        match raw_value {
            Value::Object(_) => serde_json::from_value(raw_value.clone()).ok(),
            Value::String(encoded_text) => {
                if let Ok(decoded_bytes) = BASE64_STANDARD.decode(encoded_text.trim()) {
                    if let Ok(document) = serde_json::from_slice::<CdcDocument>(&decoded_bytes) {
                        return Some(document);
                    }
                }
                serde_json::from_str::<CdcDocument>(encoded_text).ok()
            }
            _ => None,
        }
    }
}

/// Razón de omisión de un registro CDC (código corto, no respuesta).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngressSkip {
    /// El 'value' no decodificó a ningún documento JSON válido.
    InvalidValue,
    /// El documento no es una inserción.
    NonInsert,
    /// El documento trae 'data' vacío o ausente.
    EmptyData,
    /// La fila no trae 'user_code' bajo ningún alias.
    NoUserCode,
}

impl IngressSkip {
    pub fn code(&self) -> &'static str {
        match self {
            IngressSkip::InvalidValue => "SKIPPED_INVALID_VALUE",
            IngressSkip::NonInsert => "SKIPPED_NON_INSERT",
            IngressSkip::EmptyData => "SKIPPED_EMPTY_DATA",
            IngressSkip::NoUserCode => "SKIPPED_NO_USER_CODE",
        }
    }
}

impl std::fmt::Display for IngressSkip {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.code())
    }
}
