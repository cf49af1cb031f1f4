use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::feature_normalizer::normalize_landmarks;
use crate::persistence::PersistenceGateway;
use crate::sample_store::SampleStore;
use crate::types::{HandFrame, DEFAULT_AUTO_COUNT, DEFAULT_AUTO_INTERVAL_MS, MIN_AUTO_INTERVAL_MS};

/// Parámetros de la recolección automática
#[derive(Debug, Clone)]
pub struct CollectorParams {
    /// Cantidad de muestras a intentar capturar (default: 10)
    pub target_count: usize,
    /// Espera entre intentos en milisegundos (default: 200, mínimo 50)
    pub interval_ms: u64,
}

impl Default for CollectorParams {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_AUTO_COUNT,
            interval_ms: DEFAULT_AUTO_INTERVAL_MS,
        }
    }
}

/// Resultado de una corrida de recolección
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectReport {
    pub collected: usize,
    pub target: usize,
}

/// Recolector por lotes: muestrea el cuadro actual de landmarks cada
/// `interval_ms` hasta completar `target_count` intentos, añadiendo al
/// SampleStore los cuadros disponibles. Es de mejor esfuerzo: un intento
/// sin detección cuenta contra el objetivo y se salta en silencio.
pub struct AutoCollector {
    params: CollectorParams,
    cancel: Arc<AtomicBool>,
}

impl AutoCollector {
    pub fn new(params: CollectorParams) -> Self {
        Self {
            params,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Intervalo efectivo entre intentos, con el piso de 50 ms aplicado
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.params.interval_ms.max(MIN_AUTO_INTERVAL_MS))
    }

    /// Señal de cancelación: ponerla en `true` detiene la corrida antes
    /// del siguiente intento. Se puede compartir con otro hilo o tarea.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Ejecuta la recolección para la etiqueta dada. El proveedor entrega
    /// el último cuadro de landmarks detectado, si hay alguno. Al terminar
    /// persiste el dataset y reporta capturadas/objetivo.
    pub fn run<F>(
        &self,
        label: &str,
        store: &mut SampleStore,
        gateway: &PersistenceGateway,
        mut frame_provider: F,
    ) -> CollectReport
    where
        F: FnMut() -> Option<HandFrame>,
    {
        self.cancel.store(false, Ordering::Relaxed);

        let interval = self.interval();
        let mut collected = 0;

        for _ in 0..self.params.target_count {
            if self.cancel.load(Ordering::Relaxed) {
                break;
            }

            std::thread::sleep(interval);

            // Sin detección: el intento cuenta y se continúa en silencio
            if let Some(frame) = frame_provider() {
                let vector = normalize_landmarks(&frame);
                store.add_sample(label, vector);
                collected += 1;
            }
        }

        gateway.save_or_warn(store);

        CollectReport {
            collected,
            target: self.params.target_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Landmark, NUM_LANDMARKS};

    fn mano_de_prueba() -> HandFrame {
        (0..NUM_LANDMARKS)
            .map(|i| Landmark::new(i as f32, (i * 2) as f32))
            .collect()
    }

    fn gateway_temporal(nombre: &str) -> PersistenceGateway {
        let ruta = std::env::temp_dir().join(format!(
            "quirolector_auto_{}_{}.json",
            nombre,
            std::process::id()
        ));
        PersistenceGateway::new(ruta)
    }

    #[test]
    fn test_mejor_esfuerzo_con_detecciones_intermitentes() {
        // 5 intentos, el proveedor falla en 2: debe reportar 3/5
        let collector = AutoCollector::new(CollectorParams {
            target_count: 5,
            interval_ms: 0, // el piso de 50 ms aplica igual
        });

        let gateway = gateway_temporal("intermitente");
        let mut store = SampleStore::new();

        let mut intento = 0;
        let report = collector.run("A", &mut store, &gateway, || {
            intento += 1;
            // Intentos 2 y 4 sin detección
            if intento == 2 || intento == 4 {
                None
            } else {
                Some(mano_de_prueba())
            }
        });

        assert_eq!(report, CollectReport { collected: 3, target: 5 });
        assert_eq!(store.total_samples(), 3);

        let _ = std::fs::remove_file(gateway.path());
    }

    #[test]
    fn test_cancelacion_antes_de_cada_intento() {
        let collector = AutoCollector::new(CollectorParams {
            target_count: 10,
            interval_ms: 0,
        });

        let cancel = collector.cancel_handle();
        let gateway = gateway_temporal("cancelacion");
        let mut store = SampleStore::new();

        let mut intento = 0;
        let report = collector.run("A", &mut store, &gateway, || {
            intento += 1;
            // Cancelar después del tercer intento exitoso
            if intento == 3 {
                cancel.store(true, Ordering::Relaxed);
            }
            Some(mano_de_prueba())
        });

        assert_eq!(report.collected, 3);
        assert_eq!(report.target, 10);
        assert_eq!(store.total_samples(), 3);

        let _ = std::fs::remove_file(gateway.path());
    }

    #[test]
    fn test_cancelacion_pedida_desde_el_proveedor() {
        // Como en el daemon: el proveedor atiende la señal de stop y a
        // partir de ahí deja de entregar cuadros
        let collector = AutoCollector::new(CollectorParams {
            target_count: 8,
            interval_ms: 0,
        });

        let cancel = collector.cancel_handle();
        let gateway = gateway_temporal("stop_proveedor");
        let mut store = SampleStore::new();

        let mut intento = 0;
        let report = collector.run("C", &mut store, &gateway, || {
            intento += 1;
            if intento >= 2 {
                cancel.store(true, Ordering::Relaxed);
                return None;
            }
            Some(mano_de_prueba())
        });

        // Solo el primer intento añadió muestra; la corrida paró temprano
        assert_eq!(report.collected, 1);
        assert_eq!(intento, 2);
        assert_eq!(store.total_samples(), 1);

        let _ = std::fs::remove_file(gateway.path());
    }

    #[test]
    fn test_piso_de_intervalo() {
        let collector = AutoCollector::new(CollectorParams {
            target_count: 1,
            interval_ms: 5,
        });
        assert_eq!(collector.interval(), Duration::from_millis(50));

        let collector = AutoCollector::new(CollectorParams {
            target_count: 1,
            interval_ms: 200,
        });
        assert_eq!(collector.interval(), Duration::from_millis(200));
    }

    #[test]
    fn test_persiste_al_terminar() {
        let collector = AutoCollector::new(CollectorParams {
            target_count: 2,
            interval_ms: 0,
        });

        let gateway = gateway_temporal("persiste");
        let mut store = SampleStore::new();
        collector.run("B", &mut store, &gateway, || Some(mano_de_prueba()));

        let recargado = gateway.load_or_default();
        assert_eq!(recargado.total_samples(), 2);

        let _ = std::fs::remove_file(gateway.path());
    }
}
