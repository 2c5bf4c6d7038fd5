/// Classification k-NN et persistance du training set pour pachylog.
///
/// Training set borné à éviction FIFO, vote pondéré par distance
/// euclidienne, et stockage binaire plat à enregistrements de largeur
/// fixe.

pub mod knn;
pub mod store;
pub mod training;

pub use knn::KnnClassifier;
pub use store::{DatasetStore, StoreError};
pub use training::TrainingSet;
