use serde::{Deserialize, Serialize};

/// Un punto anatómico detectado en la mano, en coordenadas 2D.
/// Puede venir en píxeles o normalizado [0,1] según el detector externo;
/// la normalización por bounding box es invariante a ambos casos.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Conjunto ordenado de landmarks de una mano (21 puntos MediaPipe)
pub type HandFrame = Vec<Landmark>;

/// Vector de características: aplanado normalizado de los landmarks
pub type FeatureVector = Vec<f32>;

/// Constantes del sistema
pub const NUM_LANDMARKS: usize = 21;
pub const FEATURE_LEN: usize = NUM_LANDMARKS * 2; // 42

/// Piso para evitar división por cero en bounding boxes degenerados
pub const BBOX_EPSILON: f32 = 1e-6;

/// Valores por defecto de la superficie de configuración
pub const DEFAULT_MAX_NEIGHBORS: usize = 5;
pub const DEFAULT_SMOOTH_WINDOW: usize = 5;
pub const DEFAULT_AUTO_COUNT: usize = 10;
pub const DEFAULT_AUTO_INTERVAL_MS: u64 = 200;
pub const MIN_AUTO_INTERVAL_MS: u64 = 50;
