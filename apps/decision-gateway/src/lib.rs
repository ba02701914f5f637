// [apps/decision-gateway/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DECISION GATEWAY LIBRARY (V4.0 - PERIMETER MASTER)
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1-APP)
 * RESPONSABILIDAD: TOPOLOGÍA NOMINAL DEL SERVICIO DE DECISIÓN
 * =================================================================
 */

/// Captura de entorno y parámetros operativos.
pub mod config;
/// Etiquetas canónicas de fuente de decisión por etapa.
pub mod sources;
/// Adaptador de ingesta: sobres CDC y HTTP.
pub mod ingress;
/// Rasgos derivados en línea (viaje imposible, tiempo desde login).
pub mod derived;
/// La cascada determinista de decisión.
pub mod cascade;
/// Placa base de estado compartido del servicio.
pub mod state;
/// Handlers HTTP del perímetro.
pub mod handlers;
/// Matriz de enrutamiento del servicio.
pub mod routes;

pub use routes::create_gateway_router;
pub use state::AppState;
