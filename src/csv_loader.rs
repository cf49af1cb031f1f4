use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use csv::ReaderBuilder;

use crate::types::{HandFrame, Landmark, NUM_LANDMARKS};

/// Carga una secuencia de cuadros de landmarks desde un CSV en el formato
/// frame,point,x,y ordenado por cuadro y punto.
pub fn load_frames_from_csv(path: impl AsRef<Path>) -> Result<Vec<HandFrame>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;

    let mut frames: BTreeMap<usize, Vec<Option<Landmark>>> = BTreeMap::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record =
            result.with_context(|| format!("Fila {} inválida en {:?}", row_idx + 1, path))?;
        if record.len() < 4 {
            bail!("La fila {} no tiene 4 columnas", row_idx + 1);
        }

        let frame_idx: usize = record[0]
            .parse()
            .with_context(|| format!("frame inválido en fila {}", row_idx + 1))?;
        let point_idx: usize = record[1]
            .parse()
            .with_context(|| format!("point inválido en fila {}", row_idx + 1))?;

        if point_idx >= NUM_LANDMARKS {
            bail!("Punto {} fuera de rango (fila {})", point_idx, row_idx + 1);
        }

        let x: f32 = record[2].parse()?;
        let y: f32 = record[3].parse()?;

        let puntos = frames
            .entry(frame_idx)
            .or_insert_with(|| vec![None; NUM_LANDMARKS]);
        puntos[point_idx] = Some(Landmark::new(x, y));
    }

    if frames.is_empty() {
        return Err(anyhow!("El CSV {:?} no contiene datos", path));
    }

    let mut result = Vec::with_capacity(frames.len());
    for (frame_idx, puntos) in frames {
        let completos: Option<HandFrame> = puntos.into_iter().collect();
        let frame = completos.ok_or_else(|| {
            anyhow!("El cuadro {} no tiene los {} puntos", frame_idx, NUM_LANDMARKS)
        })?;
        result.push(frame);
    }

    Ok(result)
}

/// Serializa cuadros de landmarks al mismo formato CSV, para grabar
/// sesiones que luego se puedan reproducir sin detector.
pub fn frames_to_csv(frames: &[HandFrame]) -> String {
    let mut csv = String::from("frame,point,x,y\n");

    for (frame_idx, frame) in frames.iter().enumerate() {
        for (point_idx, p) in frame.iter().enumerate() {
            csv.push_str(&format!("{},{},{},{}\n", frame_idx, point_idx, p.x, p.y));
        }
    }

    csv
}
