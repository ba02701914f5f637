// [libs/domain/models-rs/src/feature.rs]
/*!
 * =================================================================
 * APARATO: FEATURE BAG CONTRACT (V5.1 - NEUTRAL ABSENCE)
 * CLASIFICACIÓN: DOMAIN MODELS (ESTRATO L2)
 * RESPONSABILIDAD: LECTURA TIPADA DE LA BOLSA DE ATRIBUTOS DE RIESGO
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. OPAQUE BAG: El esquema de 'risk_features' pertenece al job de
 *    streaming upstream; este contrato lo trata como un mapa opaco
 *    nombre -> escalar y nunca rechaza una fila por llaves faltantes.
 * 2. ALIAS AWARENESS: Los atributos históricos conviven con sus
 *    alias (withdrawal_amount_usd, client_ip, email, ...); los
 *    accesores prueban la cadena completa de nombres.
 * 3. NEUTRAL ABSENCE: Llave ausente o NULL se lee como valor neutro
 *    (false / None), jamás como fallo.
 * =================================================================
 */

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Nombres alternos aceptados para el monto de retiro.
const AMOUNT_ALIASES: &[&str] = &["withdrawal_amount", "withdrawal_amount_usd"];
/// Nombres alternos aceptados para la dirección IP del cliente.
const IP_ALIASES: &[&str] = &["ip_address", "client_ip"];
/// Nombres alternos aceptados para el correo del usuario.
const EMAIL_ALIASES: &[&str] = &["user_email", "email"];
/// Nombres alternos aceptados para la madurez de la cuenta en días.
const MATURITY_ALIASES: &[&str] = &["account_maturity", "account_maturity_days"];

/**
 * Bolsa opaca de atributos de un intento de retiro.
 *
 * Envuelve el mapa JSON crudo leído de 'risk_features' y expone lectura
 * tipada con semántica de ausencia neutra.
 */
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureBag {
    attributes: Map<String, Value>,
}

impl FeatureBag {
    pub fn new() -> Self {
        Self { attributes: Map::new() }
    }

    pub fn from_map(attributes: Map<String, Value>) -> Self {
        Self { attributes }
    }

    /// Acceso de solo lectura al mapa crudo (snapshot y evaluación de reglas).
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Inscribe o sobreescribe un atributo (rasgos derivados en caliente).
    pub fn set(&mut self, attribute_name: &str, attribute_value: Value) {
        self.attributes.insert(attribute_name.to_string(), attribute_value);
    }

    /// Valor crudo con NULL colapsado a ausencia.
    pub fn raw(&self, attribute_name: &str) -> Option<&Value> {
        match self.attributes.get(attribute_name) {
            Some(Value::Null) | None => None,
            Some(present_value) => Some(present_value),
        }
    }

    /**
     * Lectura booleana laxa: booleanos nativos, números distintos de cero
     * y las cadenas canónicas de verdad ("1", "true", "t", "yes", "y").
     */
    pub fn flag(&self, attribute_name: &str) -> Option<bool> {
        match self.raw(attribute_name)? {
            Value::Bool(boolean_value) => Some(*boolean_value),
            Value::Number(numeric_value) => Some(numeric_value.as_f64().unwrap_or(0.0) != 0.0),
            Value::String(text_value) => {
                match text_value.trim().to_ascii_lowercase().as_str() {
                    "1" | "true" | "t" | "yes" | "y" => Some(true),
                    "0" | "false" | "f" | "no" | "n" | "" => Some(false),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Verdad efectiva con ausencia neutra (ausente => false).
    pub fn is_truthy(&self, attribute_name: &str) -> bool {
        self.flag(attribute_name).unwrap_or(false)
    }

    /// Lectura numérica laxa: números nativos y cadenas parseables.
    pub fn number(&self, attribute_name: &str) -> Option<f64> {
        match self.raw(attribute_name)? {
            Value::Number(numeric_value) => numeric_value.as_f64(),
            Value::String(text_value) => text_value.trim().parse::<f64>().ok(),
            Value::Bool(boolean_value) => Some(if *boolean_value { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Lectura textual estricta (solo cadenas no vacías).
    pub fn text(&self, attribute_name: &str) -> Option<&str> {
        match self.raw(attribute_name)? {
            Value::String(text_value) if !text_value.is_empty() => Some(text_value.as_str()),
            _ => None,
        }
    }

    fn text_any(&self, alias_chain: &[&str]) -> Option<&str> {
        alias_chain.iter().find_map(|alias| self.text(alias))
    }

    fn number_any(&self, alias_chain: &[&str]) -> Option<f64> {
        alias_chain.iter().find_map(|alias| self.number(alias))
    }

    // --- ACCESORES NOMINALES DEL DOMINIO DE RETIROS ---

    pub fn user_code(&self) -> Option<&str> {
        self.text("user_code")
    }

    pub fn txn_id(&self) -> Option<&str> {
        self.text("txn_id")
    }

    pub fn destination_address(&self) -> Option<&str> {
        self.text("destination_address")
    }

    pub fn chain(&self) -> Option<&str> {
        self.text("chain")
    }

    pub fn device_fingerprint(&self) -> Option<&str> {
        self.text("device_fingerprint")
    }

    pub fn ip_address(&self) -> Option<&str> {
        self.text_any(IP_ALIASES)
    }

    pub fn user_email(&self) -> Option<&str> {
        self.text_any(EMAIL_ALIASES)
    }

    pub fn withdraw_currency(&self) -> Option<&str> {
        self.text("withdraw_currency")
    }

    pub fn withdrawal_amount(&self) -> Option<f64> {
        self.number_any(AMOUNT_ALIASES)
    }

    pub fn account_maturity_days(&self) -> Option<f64> {
        self.number_any(MATURITY_ALIASES)
    }

    pub fn destination_age_hours(&self) -> Option<f64> {
        self.number("destination_age_hours")
    }

    /**
     * Dominio del correo del usuario: subcadena tras '@' en minúsculas.
     * Correo sin '@' o ausente colapsa a None.
     */
    pub fn email_domain(&self) -> Option<String> {
        let email_text = self.user_email()?;
        let at_position = email_text.rfind('@')?;
        let domain_slice = &email_text[at_position + 1..];
        if domain_slice.is_empty() {
            return None;
        }
        Some(domain_slice.to_ascii_lowercase())
    }

    /// Serialización compacta del snapshot para el registro de decisión.
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.attributes).unwrap_or_else(|_| "{}".to_string())
    }
}
