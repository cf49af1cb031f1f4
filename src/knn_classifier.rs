use crate::sample_store::SampleStore;
use crate::types::{FeatureVector, DEFAULT_MAX_NEIGHBORS};

/// Clasificador k-NN sobre el conjunto de ejemplos del usuario.
/// Sin estado persistente: la predicción es función pura del vector
/// de consulta y del contenido actual del SampleStore.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    max_neighbors: usize,
}

impl KnnClassifier {
    pub fn new(max_neighbors: usize) -> Self {
        Self {
            max_neighbors: max_neighbors.max(1),
        }
    }

    pub fn set_max_neighbors(&mut self, k: usize) {
        self.max_neighbors = k.max(1);
    }

    pub fn max_neighbors(&self) -> usize {
        self.max_neighbors
    }

    /// Predice la etiqueta del vector de consulta por voto mayoritario
    /// entre los k vecinos más cercanos. Retorna `None` si y solo si el
    /// dataset no contiene ningún vector.
    ///
    /// Desempate canónico: entre etiquetas empatadas en votos gana la que
    /// aparece primero recorriendo los k vecinos en orden ascendente de
    /// distancia (la primera aparición más cercana).
    pub fn predict(&self, query: &FeatureVector, store: &SampleStore) -> Option<String> {
        let mut neighbors: Vec<(f32, &str)> = store
            .iter_samples()
            .map(|(label, vector)| (euclidean_distance(query, vector), label))
            .collect();

        if neighbors.is_empty() {
            return None;
        }

        neighbors.sort_by(|a, b| a.0.total_cmp(&b.0));

        let k = self.max_neighbors.min(neighbors.len());
        majority_label(neighbors[..k].iter().map(|(_, label)| *label)).map(str::to_string)
    }
}

impl Default for KnnClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NEIGHBORS)
    }
}

/// Distancia euclidiana sobre el rango de índices común
/// (defensivo ante desajustes de longitud; por invariante no ocurren)
fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum::<f32>()
        .sqrt()
}

/// Voto mayoritario con desempate determinista: ante empate de conteos
/// gana la etiqueta vista primero en el orden de iteración.
pub(crate) fn majority_label<'a>(labels: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    // Conteo ordenado por primera aparición
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, c)) => *c += 1,
            None => counts.push((label, 1)),
        }
    }

    // Solo un conteo estrictamente mayor desplaza al ganador: ante
    // empate se queda la etiqueta vista primero
    counts
        .into_iter()
        .reduce(|best, cur| if cur.1 > best.1 { cur } else { best })
        .map(|(label, _)| label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FEATURE_LEN;

    fn vector_constante(valor: f32) -> FeatureVector {
        vec![valor; FEATURE_LEN]
    }

    #[test]
    fn test_dataset_vacio_retorna_none() {
        let store = SampleStore::new();
        let clasificador = KnnClassifier::default();
        assert_eq!(clasificador.predict(&vector_constante(0.0), &store), None);
    }

    #[test]
    fn test_ejemplo_ceros_y_unos() {
        // dataset = {"A": [42 ceros], "B": [42 unos]}, consulta = 42 ceros
        let mut store = SampleStore::new();
        store.add_sample("A", vector_constante(0.0));
        store.add_sample("B", vector_constante(1.0));

        let clasificador = KnnClassifier::new(5);
        let pred = clasificador.predict(&vector_constante(0.0), &store);
        assert_eq!(pred.as_deref(), Some("A"));
    }

    #[test]
    fn test_coincidencia_exacta_gana() {
        let mut store = SampleStore::new();
        store.add_sample("A", vector_constante(0.3));
        store.add_sample("B", vector_constante(0.9));
        store.add_sample("C", vector_constante(0.31));

        let clasificador = KnnClassifier::new(1);
        let pred = clasificador.predict(&vector_constante(0.3), &store);
        assert_eq!(pred.as_deref(), Some("A"));
    }

    #[test]
    fn test_voto_mayoritario() {
        let mut store = SampleStore::new();
        // Tres muestras de A cerca de la consulta, una de B idéntica
        store.add_sample("A", vector_constante(0.11));
        store.add_sample("A", vector_constante(0.12));
        store.add_sample("A", vector_constante(0.13));
        store.add_sample("B", vector_constante(0.1));

        let clasificador = KnnClassifier::new(4);
        let pred = clasificador.predict(&vector_constante(0.1), &store);
        assert_eq!(pred.as_deref(), Some("A"));
    }

    #[test]
    fn test_desempate_prefiere_al_mas_cercano() {
        let mut store = SampleStore::new();
        // Con k=2: un voto para A (más cercano) y un voto para B
        store.add_sample("B", vector_constante(0.2));
        store.add_sample("A", vector_constante(0.15));

        let clasificador = KnnClassifier::new(2);
        let pred = clasificador.predict(&vector_constante(0.1), &store);
        assert_eq!(pred.as_deref(), Some("A"));
    }

    #[test]
    fn test_k_mayor_que_dataset() {
        let mut store = SampleStore::new();
        store.add_sample("A", vector_constante(0.5));

        let clasificador = KnnClassifier::new(50);
        let pred = clasificador.predict(&vector_constante(0.0), &store);
        assert_eq!(pred.as_deref(), Some("A"));
    }

    #[test]
    fn test_empate_gana_el_primero_visto() {
        // Empate 1-1: gana la etiqueta que aparece primero en el recorrido
        assert_eq!(majority_label(["A", "B"].into_iter()), Some("A"));
        // Empate 2-2 con orden intercalado: también gana la primera vista
        assert_eq!(majority_label(["B", "A", "A", "B"].into_iter()), Some("B"));
        // Sin empate: el conteo mayor desplaza al primero visto
        assert_eq!(majority_label(["A", "B", "B"].into_iter()), Some("B"));
    }

    #[test]
    fn test_distancia_longitudes_distintas() {
        // Rango común de índices: no entra en pánico ante desajuste
        let d = euclidean_distance(&[0.0, 0.0, 5.0], &[3.0, 4.0]);
        assert!((d - 5.0).abs() < 1e-6);
    }
}
