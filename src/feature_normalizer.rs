use crate::types::{FeatureVector, Landmark, BBOX_EPSILON};

/// Convierte los landmarks crudos en un vector de características
/// invariante a escala y posición, usando el bounding box de la mano.
///
/// Para cada punto emite `(x - minX) / ancho` y luego `(y - minY) / alto`,
/// preservando el orden de entrada. La salida siempre es finita y sus
/// valores caen en [0,1]; un bounding box degenerado (todos los puntos
/// colineales en un eje) colapsa ese eje hacia 0, lo cual se acepta tal
/// cual en lugar de corregirse.
pub fn normalize_landmarks(points: &[Landmark]) -> FeatureVector {
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let width = (max_x - min_x).max(BBOX_EPSILON);
    let height = (max_y - min_y).max(BBOX_EPSILON);

    let mut features = Vec::with_capacity(points.len() * 2);
    for p in points {
        features.push((p.x - min_x) / width);
        features.push((p.y - min_y) / height);
    }

    features
}
