// [libs/infra/screening-client/src/cache.rs]
/*!
 * =================================================================
 * APARATO: TTL CACHE & FLIGHT DECK (V4.1 - PROCESS LOCAL)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L4)
 * RESPONSABILIDAD: CACHÉ TTL POR DIRECCIÓN Y COLAPSO DE MISSES
 *
 * # Logic:
 * Ambas estructuras son locales al proceso; no se requiere
 * coherencia entre procesos y un arranque frío simplemente
 * repuebla. El guardián de cada mapa es un mutex propio; la
 * expiración es perezosa (se evalúa en la lectura).
 *
 * La pizarra de vuelos entrega un cerrojo asíncrono por llave:
 * el primer miss ejecuta la llamada saliente mientras los demás
 * esperan el cerrojo y releen la caché (double-check).
 * =================================================================
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Caché TTL por llave con expiración perezosa.
pub struct TtlCache<V: Clone> {
    time_to_live: Duration,
    entries: Mutex<HashMap<String, (V, Instant)>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(time_to_live_seconds: u64) -> Self {
        Self {
            time_to_live: Duration::from_secs(time_to_live_seconds),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, cache_key: &str) -> Option<V> {
        let mut entries_guard = self.entries.lock().expect("FATAL: TTL cache lock poisoned.");
        match entries_guard.get(cache_key) {
            Some((cached_value, stored_at)) if stored_at.elapsed() < self.time_to_live => {
                Some(cached_value.clone())
            }
            Some(_) => {
                entries_guard.remove(cache_key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, cache_key: &str, fresh_value: V) {
        let mut entries_guard = self.entries.lock().expect("FATAL: TTL cache lock poisoned.");
        entries_guard.insert(cache_key.to_string(), (fresh_value, Instant::now()));
    }

    #[cfg(test)]
    pub fn entry_count(&self) -> usize {
        self.entries.lock().expect("FATAL: TTL cache lock poisoned.").len()
    }
}

/// Pizarra de vuelos: un cerrojo asíncrono por llave en curso.
#[derive(Default)]
pub struct FlightDeck {
    in_flight_latches: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl FlightDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cerrojo compartido de la llave; lo crea si no existe.
    pub fn latch_for(&self, flight_key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut latches_guard = self
            .in_flight_latches
            .lock()
            .expect("FATAL: Flight deck lock poisoned.");
        latches_guard
            .entry(flight_key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /**
     * Libera la llave cuando nadie más la referencia.
     * Dos referencias = el mapa + el llamador saliente.
     */
    pub fn release(&self, flight_key: &str) {
        let mut latches_guard = self
            .in_flight_latches
            .lock()
            .expect("FATAL: Flight deck lock poisoned.");
        if let Some(latch) = latches_guard.get(flight_key) {
            if Arc::strong_count(latch) <= 2 {
                latches_guard.remove(flight_key);
            }
        }
    }
}
