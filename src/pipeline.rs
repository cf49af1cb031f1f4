use crate::feature_normalizer::normalize_landmarks;
use crate::knn_classifier::KnnClassifier;
use crate::sample_store::SampleStore;
use crate::smoother::TemporalSmoother;
use crate::types::HandFrame;

/// Resultado de procesar un cuadro: la predicción cruda (para diagnóstico)
/// y la etiqueta estabilizada por la ventana temporal (para mostrar).
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub raw: Option<String>,
    pub stable: Option<String>,
}

/// Flujo por cuadro: detector externo → normalización → k-NN → suavizado.
/// El pipeline es dueño del historial de predicciones; el dataset lo
/// presta el llamador en cada cuadro.
pub struct ClassificationPipeline {
    classifier: KnnClassifier,
    smoother: TemporalSmoother,
}

impl ClassificationPipeline {
    pub fn new(classifier: KnnClassifier, smoother: TemporalSmoother) -> Self {
        Self {
            classifier,
            smoother,
        }
    }

    pub fn set_max_neighbors(&mut self, k: usize) {
        self.classifier.set_max_neighbors(k);
    }

    pub fn set_window_size(&mut self, window_size: usize) {
        self.smoother.set_window_size(window_size);
    }

    pub fn max_neighbors(&self) -> usize {
        self.classifier.max_neighbors()
    }

    pub fn window_size(&self) -> usize {
        self.smoother.window_size()
    }

    /// Procesa las manos detectadas en un cuadro. Solo se clasifica la
    /// primera mano reportada; un cuadro sin manos empuja `None` al
    /// suavizador para que la ausencia también pese en la ventana.
    pub fn process_frame(&mut self, hands: &[HandFrame], store: &SampleStore) -> FrameOutcome {
        let raw = hands
            .first()
            .and_then(|hand| self.classifier.predict(&normalize_landmarks(hand), store));

        let stable = self.smoother.push(raw.clone());

        FrameOutcome { raw, stable }
    }
}

impl Default for ClassificationPipeline {
    fn default() -> Self {
        Self::new(KnnClassifier::default(), TemporalSmoother::default())
    }
}
