use std::collections::VecDeque;

use crate::knn_classifier::majority_label;
use crate::types::DEFAULT_SMOOTH_WINDOW;

/// Estabiliza la predicción cruda por cuadro con un voto mayoritario
/// sobre una ventana deslizante de las últimas W predicciones.
/// Cada entrada es una etiqueta o `None` (cuadro sin detección).
#[derive(Debug)]
pub struct TemporalSmoother {
    buffer: VecDeque<Option<String>>,
    window_size: usize,
}

impl TemporalSmoother {
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            buffer: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Cambia W en caliente. Si la ventana actual excede el nuevo W se
    /// trunca desde el frente (se descartan las entradas más viejas);
    /// si W crece, la ventana simplemente crece en los próximos push.
    pub fn set_window_size(&mut self, window_size: usize) {
        self.window_size = window_size.max(1);
        while self.buffer.len() > self.window_size {
            self.buffer.pop_front();
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Añade la predicción cruda del cuadro y retorna la etiqueta estable.
    ///
    /// Si no hay entradas con etiqueta en la ventana retorna `None`.
    /// Desempate: entre etiquetas empatadas en conteo gana la que aparece
    /// primero recorriendo la ventana de la más vieja a la más nueva
    /// (persiste la evidencia que llegó antes).
    pub fn push(&mut self, raw: Option<String>) -> Option<String> {
        self.buffer.push_back(raw);
        if self.buffer.len() > self.window_size {
            self.buffer.pop_front();
        }

        majority_label(self.buffer.iter().filter_map(|p| p.as_deref())).map(str::to_string)
    }

    /// Última etiqueta estable sin mutar la ventana
    pub fn current(&self) -> Option<String> {
        majority_label(self.buffer.iter().filter_map(|p| p.as_deref())).map(str::to_string)
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }
}

impl Default for TemporalSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTH_WINDOW)
    }
}
