// [apps/decision-gateway/src/ingress.rs]
/*!
 * =================================================================
 * APARATO: INGRESS ADAPTER (V4.3 - DUAL ENVELOPE)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: EXTRACCIÓN DE (user_code, txn_id) DE AMBOS SOBRES
 *
 * # Logic:
 * CDC: cada registro trae 'value' como objeto, JSON plano o JSON en
 * base64. Solo documentos INSERT (o sin tipo) avanzan; el resto se
 * omite con su código 'SKIPPED_*'. De la primera fila de datos se
 * extraen user_code|userCode y code|transaction_id|id.
 *
 * HTTP: cuerpo JSON directo, sobre FC {body, isBase64Encoded} o
 * form-urlencoded; alias de transacción txn_id|txnId|code|id.
 * user_code ausente es la única falta que produce 400.
 * =================================================================
 */

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use cerberus_domain_models::{CdcDocument, CdcEnvelopeRecord, IngressSkip};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Sujeto extraído de cualquiera de los dos sobres.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSubject {
    pub user_code: String,
    pub txn_id: Option<String>,
}

/// Falta del sobre HTTP que produce un 400 perimetral.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpEnvelopeFault {
    MissingUserCode,
    Unparseable(String),
}

// --- SOBRE CDC ---

/**
 * Extrae el sujeto de un registro CDC individual.
 * Los registros no procesables retornan su razón de omisión.
 */
pub fn extract_cdc_subject(record: &CdcEnvelopeRecord) -> Result<ExtractedSubject, IngressSkip> {
    let Some(cdc_document) = CdcDocument::decode(&record.value) else {
        warn!("⚠️ [INGRESS]: CDC value undecodable, record skipped.");
        return Err(IngressSkip::InvalidValue);
    };

    if !cdc_document.is_insert() {
        debug!("⏭️ [INGRESS]: Non-INSERT CDC document skipped.");
        return Err(IngressSkip::NonInsert);
    }

    let Some(data_rows) = cdc_document.data.filter(|rows| !rows.is_empty()) else {
        return Err(IngressSkip::EmptyData);
    };
    let first_row = &data_rows[0];

    let Some(user_code) = first_scalar(first_row, &["user_code", "userCode"]) else {
        return Err(IngressSkip::NoUserCode);
    };
    let txn_id = first_scalar(first_row, &["code", "transaction_id", "id"]);

    debug!("📦 [INGRESS]: CDC subject extracted: user={}, txn={:?}", user_code, txn_id);
    Ok(ExtractedSubject { user_code, txn_id })
}

// --- SOBRE HTTP ---

/**
 * Extrae el sujeto de un cuerpo HTTP (JSON, sobre FC o formulario).
 */
pub fn extract_http_subject(raw_body: &[u8]) -> Result<ExtractedSubject, HttpEnvelopeFault> {
    let body_text = String::from_utf8_lossy(raw_body);
    debug!("🌐 [INGRESS]: Raw event snippet: {}", &body_text[..body_text.len().min(500)]);

    let payload_map = resolve_http_payload(&body_text)?;

    let Some(user_code) = first_scalar(&payload_map, &["user_code", "userCode"]) else {
        return Err(HttpEnvelopeFault::MissingUserCode);
    };
    let txn_id = first_scalar(&payload_map, &["txn_id", "txnId", "code", "id"]);

    Ok(ExtractedSubject { user_code, txn_id })
}

/// Resuelve las tres formas de cuerpo al mapa de payload.
fn resolve_http_payload(body_text: &str) -> Result<Map<String, Value>, HttpEnvelopeFault> {
    match serde_json::from_str::<Value>(body_text) {
        Ok(Value::Object(envelope_map)) => {
            // Sobre FC: {body, isBase64Encoded} envolviendo el payload real.
            if let Some(inner_body) = envelope_map.get("body").and_then(Value::as_str) {
                let is_base64 = envelope_map
                    .get("isBase64Encoded")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);

                let decoded_body = if is_base64 {
                    let decoded_bytes = BASE64_STANDARD.decode(inner_body.trim()).map_err(|decode_fault| {
                        HttpEnvelopeFault::Unparseable(format!("base64 body: {decode_fault}"))
                    })?;
                    String::from_utf8_lossy(&decoded_bytes).into_owned()
                } else {
                    inner_body.to_string()
                };

                return match serde_json::from_str::<Value>(&decoded_body) {
                    Ok(Value::Object(inner_map)) => Ok(inner_map),
                    _ => Ok(parse_form_urlencoded(&decoded_body)),
                };
            }
            Ok(envelope_map)
        }
        Ok(_) => Err(HttpEnvelopeFault::Unparseable("body is not a JSON object".into())),
        Err(_) => {
            let form_map = parse_form_urlencoded(body_text);
            if form_map.is_empty() {
                return Err(HttpEnvelopeFault::Unparseable("body is neither JSON nor form data".into()));
            }
            Ok(form_map)
        }
    }
}

/// Decodificador mínimo application/x-www-form-urlencoded.
fn parse_form_urlencoded(form_text: &str) -> Map<String, Value> {
    let mut payload_map = Map::new();
    for raw_pair in form_text.split('&') {
        let mut pair_parts = raw_pair.splitn(2, '=');
        let (Some(raw_key), Some(raw_value)) = (pair_parts.next(), pair_parts.next()) else {
            continue;
        };
        if let (Some(key), Some(value)) = (percent_decode(raw_key), percent_decode(raw_value)) {
            if !key.is_empty() {
                payload_map.insert(key, Value::String(value));
            }
        }
    }
    payload_map
}

fn percent_decode(encoded_text: &str) -> Option<String> {
    let mut decoded = String::with_capacity(encoded_text.len());
    let mut byte_cursor = encoded_text.bytes();
    let mut pending_utf8: Vec<u8> = Vec::new();

    while let Some(current_byte) = byte_cursor.next() {
        match current_byte {
            b'+' => pending_utf8.push(b' '),
            b'%' => {
                let high_nibble = byte_cursor.next()?;
                let low_nibble = byte_cursor.next()?;
                let hex_pair = [high_nibble, low_nibble];
                let hex_text = std::str::from_utf8(&hex_pair).ok()?;
                pending_utf8.push(u8::from_str_radix(hex_text, 16).ok()?);
            }
            plain_byte => pending_utf8.push(plain_byte),
        }
    }

    decoded.push_str(std::str::from_utf8(&pending_utf8).ok()?);
    Some(decoded)
}

// --- NÚCLEO COMPARTIDO ---

/// Primer alias presente con valor escalar no vacío, como cadena.
fn first_scalar(payload_map: &Map<String, Value>, alias_chain: &[&str]) -> Option<String> {
    for alias in alias_chain {
        match payload_map.get(*alias) {
            Some(Value::String(text_value)) if !text_value.is_empty() => {
                return Some(text_value.clone());
            }
            Some(Value::Number(numeric_value)) => return Some(numeric_value.to_string()),
            _ => {}
        }
    }
    None
}
