use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::sample_store::{Dataset, DatasetError, SampleStore};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Error de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON inválido: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dataset inválido: {0}")]
    Dataset(#[from] DatasetError),
}

/// Carga y guarda el dataset en un archivo JSON, y maneja la
/// exportación/importación a archivos elegidos por el usuario.
/// El formato es el mismo en los tres casos: etiqueta → lista de vectores.
#[derive(Debug, Clone)]
pub struct PersistenceGateway {
    path: PathBuf,
}

impl PersistenceGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Carga el dataset persistido al arranque. Si el archivo no existe
    /// o no se puede leer/parsear, arranca con un dataset vacío y solo
    /// emite una advertencia: el fallo de almacenamiento no es fatal.
    pub fn load_or_default(&self) -> SampleStore {
        let mut store = SampleStore::new();

        if !self.path.exists() {
            return store;
        }

        match self.try_load() {
            Ok(dataset) => {
                if let Err(e) = store.replace_all(dataset) {
                    eprintln!("⚠️  Dataset persistido inválido, arrancando vacío: {}", e);
                }
            }
            Err(e) => {
                eprintln!("⚠️  No se pudo cargar el dataset {:?}: {}", self.path, e);
            }
        }

        store
    }

    fn try_load(&self) -> Result<Dataset, StorageError> {
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Persiste la forma estructurada del dataset
    pub fn save(&self, store: &SampleStore) -> Result<(), StorageError> {
        let contents = serde_json::to_string(store.serialize())?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Guarda tras una mutación. Un fallo solo se advierte: el dataset
    /// en memoria sigue siendo la autoridad durante la sesión.
    pub fn save_or_warn(&self, store: &SampleStore) {
        if let Err(e) = self.save(store) {
            eprintln!("⚠️  No se pudo guardar el dataset en {:?}: {}", self.path, e);
        }
    }

    /// Exporta el dataset como artefacto JSON legible
    pub fn export(&self, store: &SampleStore, path: impl AsRef<Path>) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(store.serialize())?;
        fs::write(path.as_ref(), contents)?;
        Ok(())
    }

    /// Importa un artefacto JSON y reemplaza el dataset completo.
    /// Si el parseo o la validación fallan, el dataset previo queda
    /// intacto y se retorna el error. En éxito, persiste el resultado.
    pub fn import(
        &self,
        store: &mut SampleStore,
        path: impl AsRef<Path>,
    ) -> Result<usize, StorageError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let dataset: Dataset = serde_json::from_str(&contents)?;
        store.replace_all(dataset)?;
        self.save_or_warn(store);
        Ok(store.total_samples())
    }
}
