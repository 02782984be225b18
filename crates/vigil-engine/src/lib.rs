//! Search and evaluation for vigil.

pub mod config;
pub mod eval;
pub mod external;
pub mod search;

pub use config::{ConfigError, EngineConfig, SearchConfig};
pub use eval::{ClassicalEvaluator, EvalParams, Evaluation, Evaluator};
pub use external::{MemoryBook, NoBook, NoTablebase, OpeningBook, Tablebase, Wdl};
pub use search::control::{SearchControl, SearchLimits};
pub use search::pool::ThreadPool;
pub use search::{DepthOutcome, SearchContext, SearchResult, Searcher, ThreadData};
