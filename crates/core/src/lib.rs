pub mod advisor;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod time;

pub use advisor::{AdviceRequest, Advisor};
pub use domain::price::{PriceBar, PriceSeries};
pub use domain::recommendation::{AdviceReport, Recommendation, RecommendationOutcome};
pub use domain::sentiment::classify_sentiment;
pub use engine::{extract_signal, resolve_recommendation, DecisionPolicy, SignalFeatures};
pub use error::{AdvisorError, AdvisorResult};
