pub mod auto_collector;
pub mod csv_loader;
pub mod feature_normalizer;
pub mod knn_classifier;
pub mod persistence;
pub mod pipeline;
pub mod sample_store;
pub mod smoother;
pub mod types;
