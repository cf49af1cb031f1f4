/*
Entrenador interactivo de señas con k-NN - Rust

Clasifica señas de mano cuadro a cuadro a partir de landmarks 2D
(21 puntos por mano), usando un conjunto de ejemplos curado por el
usuario y voto k-NN, con suavizado temporal por mayoría.

Sin cámara ni detector: los cuadros llegan desde una grabación CSV
(frame,point,x,y) que se reproduce en bucle, y los comandos desde stdin.

Para ejecutar:
    ./target/release/quirolector --frames sesiones/hola.csv
    ./target/release/quirolector --dataset mi-dataset.json --frames sesiones/
*/

use std::env;
use std::fs;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, select, unbounded};

use quirolector::auto_collector::{AutoCollector, CollectorParams};
use quirolector::csv_loader::{frames_to_csv, load_frames_from_csv};
use quirolector::persistence::PersistenceGateway;
use quirolector::pipeline::ClassificationPipeline;
use quirolector::types::{HandFrame, DEFAULT_AUTO_COUNT, DEFAULT_AUTO_INTERVAL_MS};

/// Periodo de reproducción de cuadros grabados (~30 fps)
const FRAME_PERIOD_MS: u64 = 33;

/// Cuadros a grabar por defecto con `record` (~3 s a 30 fps)
const DEFAULT_RECORD_FRAMES: usize = 90;

fn parse_args() -> Result<(PathBuf, Option<PathBuf>)> {
    let mut dataset_path = PathBuf::from("sign-dataset.json");
    let mut frames_path: Option<PathBuf> = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dataset" => {
                let valor = args.next().ok_or_else(|| anyhow!("--dataset requiere una ruta"))?;
                dataset_path = PathBuf::from(valor);
            }
            "--frames" => {
                let valor = args.next().ok_or_else(|| anyhow!("--frames requiere una ruta"))?;
                frames_path = Some(PathBuf::from(valor));
            }
            _ => {
                return Err(anyhow!(
                    "Uso: quirolector [--dataset <json>] [--frames <csv|carpeta>]"
                ));
            }
        }
    }

    Ok((dataset_path, frames_path))
}

/// Si la ruta es una carpeta, elige un CSV al azar dentro de ella
fn resolve_frames_path(path: PathBuf) -> Result<PathBuf> {
    if !path.is_dir() {
        return Ok(path);
    }

    let csv_files: Vec<PathBuf> = fs::read_dir(&path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();

    if csv_files.is_empty() {
        return Err(anyhow!("No hay archivos CSV en {:?}", path));
    }

    use rand::Rng;
    let idx = rand::thread_rng().gen_range(0..csv_files.len());
    Ok(csv_files[idx].clone())
}

fn print_help() {
    println!("Comandos disponibles:");
    println!("  add <etiqueta>                      añade el cuadro actual al dataset");
    println!("  auto <etiqueta> [n] [intervalo_ms]  recolección automática (default 10 x 200ms)");
    println!("  stop                                cancela la recolección automática en curso");
    println!("  record <archivo.csv> [n]            graba los próximos n cuadros (default 90)");
    println!("  clear                               borra todas las muestras");
    println!("  export <archivo.json>               exporta el dataset");
    println!("  import <archivo.json>               importa y reemplaza el dataset");
    println!("  k <n>                               vecinos máximos del k-NN");
    println!("  window <n>                          tamaño de la ventana de suavizado");
    println!("  info                                estado del dataset y configuración");
    println!("  quit                                salir\n");
}

fn main() -> Result<()> {
    println!("🖐  Quirolector - Entrenador de señas k-NN\n");

    let (dataset_path, frames_path) = parse_args()?;

    let gateway = PersistenceGateway::new(&dataset_path);
    let mut store = gateway.load_or_default();
    println!(
        "📚 Dataset {:?}: {} muestras, {} etiquetas",
        dataset_path,
        store.total_samples(),
        store.serialize().len()
    );

    let mut pipeline = ClassificationPipeline::default();

    // Canal de cuadros: lo alimenta el hilo de reproducción CSV.
    // Sin --frames el canal queda mudo y solo funcionan los comandos.
    let (tx_frames, rx_frames) = bounded::<HandFrame>(64);

    if let Some(path) = frames_path {
        let csv_path = resolve_frames_path(path)?;
        println!("🎞️  Reproduciendo en bucle: {:?}", csv_path);

        let frames = load_frames_from_csv(&csv_path)?;
        let tx = tx_frames.clone();
        std::thread::spawn(move || loop {
            for frame in &frames {
                if tx.send(frame.clone()).is_err() {
                    return;
                }
                std::thread::sleep(Duration::from_millis(FRAME_PERIOD_MS));
            }
        });
    } else {
        println!("ℹ️  Sin fuente de cuadros (--frames); solo comandos");
    }

    // Hilo lector de comandos por stdin
    let (tx_cmd, rx_cmd) = unbounded::<String>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx_cmd.send(line).is_err() {
                        return;
                    }
                }
                Err(_) => return,
            }
        }
    });

    print_help();

    // Último cuadro detectado, compartido con el proveedor del recolector
    let last_frame: Arc<Mutex<Option<HandFrame>>> = Arc::new(Mutex::new(None));
    let mut last_stable: Option<String> = None;

    // Grabación de sesión en curso: cuadros acumulados, destino y objetivo
    let mut recording: Option<(Vec<HandFrame>, PathBuf, usize)> = None;

    loop {
        select! {
            recv(rx_frames) -> msg => {
                let Ok(frame) = msg else { continue };

                *last_frame.lock().unwrap() = Some(frame.clone());

                if let Some((cuadros, _, objetivo)) = recording.as_mut() {
                    cuadros.push(frame.clone());
                    if cuadros.len() >= *objetivo {
                        let (cuadros, ruta, objetivo) = recording.take().unwrap();
                        match fs::write(&ruta, frames_to_csv(&cuadros)) {
                            Ok(()) => {
                                println!("💾 Sesión grabada: {:?} ({} cuadros)", ruta, objetivo)
                            }
                            Err(e) => eprintln!("❌ Error grabando sesión: {}", e),
                        }
                    }
                }

                let outcome = pipeline.process_frame(std::slice::from_ref(&frame), &store);
                if outcome.stable != last_stable {
                    println!(
                        "🖐  Predicción: {} (cruda: {})",
                        outcome.stable.as_deref().unwrap_or("-"),
                        outcome.raw.as_deref().unwrap_or("-")
                    );
                    last_stable = outcome.stable;
                }
            }
            recv(rx_cmd) -> msg => {
                let Ok(line) = msg else {
                    println!("\n👋 Saliendo...");
                    return Ok(());
                };

                let partes: Vec<&str> = line.split_whitespace().collect();
                match partes.as_slice() {
                    [] => {}
                    ["quit"] | ["q"] => {
                        println!("👋 Saliendo...");
                        return Ok(());
                    }
                    ["help"] => print_help(),
                    ["info"] => {
                        println!(
                            "📚 {} muestras, {} etiquetas | k={} ventana={}",
                            store.total_samples(),
                            store.serialize().len(),
                            pipeline.max_neighbors(),
                            pipeline.window_size()
                        );
                        for (label, vectors) in store.serialize() {
                            println!("  {:<12} {:>4} muestras", label, vectors.len());
                        }
                    }
                    ["add", etiqueta] => {
                        // Sin detección no es un error: solo se avisa
                        let cuadro = last_frame.lock().unwrap().clone();
                        match cuadro {
                            Some(frame) => {
                                let vector =
                                    quirolector::feature_normalizer::normalize_landmarks(&frame);
                                store.add_sample(etiqueta, vector);
                                gateway.save_or_warn(&store);
                                println!(
                                    "✅ Muestra añadida a '{}' ({} en total)",
                                    etiqueta,
                                    store.total_samples()
                                );
                            }
                            None => println!("⚠️  No hay landmarks para guardar"),
                        }
                    }
                    ["auto", etiqueta, resto @ ..] => {
                        let target_count = resto
                            .first()
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(DEFAULT_AUTO_COUNT);
                        let interval_ms = resto
                            .get(1)
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(DEFAULT_AUTO_INTERVAL_MS);

                        println!(
                            "🤖 Auto-recolección: {} muestras de '{}' cada {} ms...",
                            target_count, etiqueta, interval_ms
                        );

                        let collector = AutoCollector::new(CollectorParams {
                            target_count,
                            interval_ms,
                        });
                        let cancel = collector.cancel_handle();

                        // El proveedor drena los cuadros que llegan durante
                        // cada espera para muestrear siempre el más reciente,
                        // y atiende stdin para que 'stop' cancele la corrida
                        let last_frame_auto = Arc::clone(&last_frame);
                        let rx = rx_frames.clone();
                        let rx_stdin = rx_cmd.clone();
                        let report = collector.run(etiqueta, &mut store, &gateway, || {
                            while let Ok(linea) = rx_stdin.try_recv() {
                                if linea.trim() == "stop" {
                                    cancel.store(true, Ordering::Relaxed);
                                    println!("🛑 Auto-recolección cancelada");
                                } else if !linea.trim().is_empty() {
                                    println!("⚠️  Recolección en curso; usa 'stop' para cancelar");
                                }
                            }
                            if cancel.load(Ordering::Relaxed) {
                                return None;
                            }

                            let mut guard = last_frame_auto.lock().unwrap();
                            while let Ok(frame) = rx.try_recv() {
                                *guard = Some(frame);
                            }
                            guard.clone()
                        });

                        println!(
                            "✅ Auto-recolección terminada: {}/{} añadidas",
                            report.collected, report.target
                        );
                    }
                    ["stop"] => {
                        println!("ℹ️  No hay recolección automática en curso");
                    }
                    ["record", archivo, resto @ ..] => {
                        let objetivo = resto
                            .first()
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(DEFAULT_RECORD_FRAMES);
                        recording =
                            Some((Vec::with_capacity(objetivo), PathBuf::from(archivo), objetivo));
                        println!("⏺️  Grabando {} cuadros en {}", objetivo, archivo);
                    }
                    ["clear"] => {
                        store.clear();
                        gateway.save_or_warn(&store);
                        println!("🗑️  Dataset borrado");
                    }
                    ["export", archivo] => match gateway.export(&store, archivo) {
                        Ok(()) => println!("💾 Dataset exportado a {}", archivo),
                        Err(e) => eprintln!("❌ Error exportando: {}", e),
                    },
                    ["import", archivo] => match gateway.import(&mut store, archivo) {
                        Ok(total) => {
                            println!("📥 Dataset importado correctamente ({} muestras)", total)
                        }
                        Err(e) => eprintln!("❌ Error al importar: {}", e),
                    },
                    ["k", valor] => match valor.parse() {
                        Ok(k) => {
                            pipeline.set_max_neighbors(k);
                            println!("⚙️  k = {}", pipeline.max_neighbors());
                        }
                        Err(_) => eprintln!("❌ Valor inválido: {}", valor),
                    },
                    ["window", valor] => match valor.parse() {
                        Ok(w) => {
                            pipeline.set_window_size(w);
                            println!("⚙️  ventana = {}", pipeline.window_size());
                        }
                        Err(_) => eprintln!("❌ Valor inválido: {}", valor),
                    },
                    _ => {
                        eprintln!("❌ Comando desconocido: {}", line);
                        print_help();
                    }
                }
            }
        }
    }
}
