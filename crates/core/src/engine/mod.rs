//! Pure decision logic: price series in, recommendation out.

pub mod extractor;
pub mod resolver;

pub use extractor::{extract_signal, extract_signal_with_window, SignalFeatures};
pub use resolver::{resolve_recommendation, DecisionPolicy};
