use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use quirolector::csv_loader::load_frames_from_csv;
use quirolector::knn_classifier::KnnClassifier;
use quirolector::persistence::PersistenceGateway;
use quirolector::pipeline::ClassificationPipeline;
use quirolector::smoother::TemporalSmoother;
use quirolector::types::{DEFAULT_MAX_NEIGHBORS, DEFAULT_SMOOTH_WINDOW};

struct ReplayOptions {
    dataset_path: PathBuf,
    max_neighbors: usize,
    window_size: usize,
    per_frame: bool,
}

fn parse_args() -> Result<(PathBuf, ReplayOptions)> {
    let mut dataset_path = PathBuf::from("sign-dataset.json");
    let mut max_neighbors = DEFAULT_MAX_NEIGHBORS;
    let mut window_size = DEFAULT_SMOOTH_WINDOW;
    let mut per_frame = false;
    let mut csv_path: Option<PathBuf> = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dataset" => {
                let valor = args.next().ok_or_else(|| anyhow!("--dataset requiere una ruta"))?;
                dataset_path = PathBuf::from(valor);
            }
            "--k" => {
                let valor = args.next().ok_or_else(|| anyhow!("--k requiere un número"))?;
                max_neighbors = valor.parse()?;
            }
            "--window" => {
                let valor = args.next().ok_or_else(|| anyhow!("--window requiere un número"))?;
                window_size = valor.parse()?;
            }
            "--per-frame" => per_frame = true,
            _ => {
                if csv_path.is_some() {
                    bail!("Uso: replay_csv [--dataset <json>] [--k N] [--window N] [--per-frame] <archivo.csv>");
                }
                csv_path = Some(PathBuf::from(arg));
            }
        }
    }

    let csv_path = csv_path.ok_or_else(|| anyhow!("Debes especificar un archivo CSV"))?;
    Ok((
        csv_path,
        ReplayOptions {
            dataset_path,
            max_neighbors,
            window_size,
            per_frame,
        },
    ))
}

fn main() -> Result<()> {
    let (csv_path, opts) = parse_args()?;
    println!("🎞️  Reproduciendo sesión desde {:?}", csv_path);

    let gateway = PersistenceGateway::new(&opts.dataset_path);
    let store = gateway.load_or_default();
    if store.is_empty() {
        bail!(
            "El dataset {:?} está vacío; añade muestras antes de reproducir",
            opts.dataset_path
        );
    }
    println!(
        "📚 Dataset: {} muestras, {} etiquetas",
        store.total_samples(),
        store.serialize().len()
    );

    let frames = load_frames_from_csv(&csv_path)?;
    println!("🎬 {} cuadros cargados\n", frames.len());

    let mut pipeline = ClassificationPipeline::new(
        KnnClassifier::new(opts.max_neighbors),
        TemporalSmoother::new(opts.window_size),
    );

    let mut conteos: BTreeMap<String, usize> = BTreeMap::new();
    let mut sin_etiqueta = 0usize;

    for (idx, frame) in frames.iter().enumerate() {
        let outcome = pipeline.process_frame(std::slice::from_ref(frame), &store);

        match &outcome.stable {
            Some(label) => *conteos.entry(label.clone()).or_insert(0) += 1,
            None => sin_etiqueta += 1,
        }

        if opts.per_frame {
            println!(
                "  {:>4}: crudo={:<8} estable={}",
                idx,
                outcome.raw.as_deref().unwrap_or("-"),
                outcome.stable.as_deref().unwrap_or("-")
            );
        }
    }

    println!("📊 Etiquetas estables por cuadro:");
    for (label, count) in &conteos {
        println!("  {:<12} {:>5} cuadros", label, count);
    }
    if sin_etiqueta > 0 {
        println!("  {:<12} {:>5} cuadros", "(ninguna)", sin_etiqueta);
    }

    if let Some((ganadora, _)) = conteos.iter().max_by_key(|(_, c)| **c) {
        println!("\n🥇 Etiqueta dominante de la sesión: {}", ganadora);
    }

    Ok(())
}
