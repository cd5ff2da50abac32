pub mod config;
pub mod emotion;
pub mod error;
pub mod http;
pub mod service;
pub mod session;

pub use config::Config;
pub use emotion::{
    AnalysisPipeline, Classification, EmotionClassifier, EmotionEvent, EmotionLabel,
    EntropySource, SuggestionCatalog, SuggestionEntry, WeightTable, WeightedClassifier,
};
pub use error::{AnalysisError, ConfigError, EmptyClientId, SendError};
pub use http::{create_router, AppState};
pub use service::EmotionService;
pub use session::{
    ClientId, CloseReason, ConnectionRegistry, FrameSource, InboundFrame, SessionChannel,
    SessionLoop, SessionState, SessionStats,
};
