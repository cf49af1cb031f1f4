use std::collections::BTreeMap;

use thiserror::Error;

use crate::types::{FeatureVector, FEATURE_LEN};

/// Forma estructurada del dataset: etiqueta → lista de vectores.
/// Es la misma forma que se persiste, exporta e importa en JSON.
pub type Dataset = BTreeMap<String, Vec<FeatureVector>>;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Vector con longitud inválida para '{label}': esperado {expected}, encontrado {actual}")]
    InvalidVectorLength {
        label: String,
        expected: usize,
        actual: usize,
    },

    #[error("Vector con valor no finito para '{label}' en índice {index}")]
    NonFiniteValue { label: String, index: usize },
}

/// Dueño del conjunto de ejemplos etiquetados.
/// Toda mutación pasa por esta API; ningún otro componente toca el dataset.
#[derive(Debug, Default)]
pub struct SampleStore {
    dataset: Dataset,
}

impl SampleStore {
    pub fn new() -> Self {
        Self {
            dataset: Dataset::new(),
        }
    }

    /// Añade un vector a la lista de la etiqueta, creando la entrada
    /// si no existe. Siempre tiene éxito.
    pub fn add_sample(&mut self, label: &str, vector: FeatureVector) {
        self.dataset
            .entry(label.to_string())
            .or_insert_with(Vec::new)
            .push(vector);
    }

    /// Elimina todas las etiquetas y todas las muestras
    pub fn clear(&mut self) {
        self.dataset.clear();
    }

    /// Total de vectores almacenados en todas las etiquetas (para display)
    pub fn total_samples(&self) -> usize {
        self.dataset.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_samples() == 0
    }

    /// Pares (etiqueta, vector) en orden determinista, para clasificación
    pub fn iter_samples(&self) -> impl Iterator<Item = (&str, &FeatureVector)> {
        self.dataset
            .iter()
            .flat_map(|(label, vectors)| vectors.iter().map(move |v| (label.as_str(), v)))
    }

    /// Forma estructurada para almacenamiento durable o exportación
    pub fn serialize(&self) -> &Dataset {
        &self.dataset
    }

    /// Reemplaza el dataset completo de forma atómica.
    /// Valida que cada vector tenga la longitud fija y valores finitos;
    /// si la validación falla, el dataset previo queda intacto.
    pub fn replace_all(&mut self, data: Dataset) -> Result<(), DatasetError> {
        Self::validate(&data)?;
        self.dataset = data;
        Ok(())
    }

    fn validate(data: &Dataset) -> Result<(), DatasetError> {
        for (label, vectors) in data {
            for vector in vectors {
                if vector.len() != FEATURE_LEN {
                    return Err(DatasetError::InvalidVectorLength {
                        label: label.clone(),
                        expected: FEATURE_LEN,
                        actual: vector.len(),
                    });
                }
                for (index, value) in vector.iter().enumerate() {
                    if !value.is_finite() {
                        return Err(DatasetError::NonFiniteValue {
                            label: label.clone(),
                            index,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector_constante(valor: f32) -> FeatureVector {
        vec![valor; FEATURE_LEN]
    }

    #[test]
    fn test_add_crea_etiqueta() {
        let mut store = SampleStore::new();
        assert!(store.is_empty());

        store.add_sample("A", vector_constante(0.1));
        store.add_sample("A", vector_constante(0.2));
        store.add_sample("B", vector_constante(0.3));

        assert_eq!(store.total_samples(), 3);
        assert_eq!(store.serialize().get("A").unwrap().len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut store = SampleStore::new();
        store.add_sample("A", vector_constante(0.5));
        store.clear();
        assert!(store.is_empty());
        assert!(store.serialize().is_empty());
    }

    #[test]
    fn test_round_trip_replace_all() {
        let mut store = SampleStore::new();
        store.add_sample("A", vector_constante(0.0));
        store.add_sample("B", vector_constante(1.0));
        store.add_sample("B", vector_constante(0.5));

        let copia = store.serialize().clone();
        let mut otro = SampleStore::new();
        otro.replace_all(copia).unwrap();

        assert_eq!(store.serialize(), otro.serialize());
    }

    #[test]
    fn test_replace_all_rechaza_longitud_invalida() {
        let mut store = SampleStore::new();
        store.add_sample("A", vector_constante(0.7));

        let mut malformado = Dataset::new();
        malformado.insert("X".to_string(), vec![vec![1.0, 2.0, 3.0]]);

        let resultado = store.replace_all(malformado);
        assert!(matches!(
            resultado,
            Err(DatasetError::InvalidVectorLength { .. })
        ));

        // El dataset previo debe quedar intacto
        assert_eq!(store.total_samples(), 1);
        assert!(store.serialize().contains_key("A"));
    }

    #[test]
    fn test_replace_all_rechaza_no_finitos() {
        let mut store = SampleStore::new();
        let mut malformado = Dataset::new();
        let mut v = vector_constante(0.0);
        v[10] = f32::NAN;
        malformado.insert("X".to_string(), vec![v]);

        assert!(matches!(
            store.replace_all(malformado),
            Err(DatasetError::NonFiniteValue { index: 10, .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_iter_samples_orden_determinista() {
        let mut store = SampleStore::new();
        store.add_sample("B", vector_constante(0.2));
        store.add_sample("A", vector_constante(0.1));
        store.add_sample("A", vector_constante(0.3));

        let etiquetas: Vec<&str> = store.iter_samples().map(|(l, _)| l).collect();
        assert_eq!(etiquetas, vec!["A", "A", "B"]);
    }
}
