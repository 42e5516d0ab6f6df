// Error types
pub mod error;

// Trait-based architecture (public API)
pub mod traits;

// Provider implementations
pub mod claude;
pub mod codex;
pub mod gemini;

// Canonical record builder shared by the parsers
pub(crate) mod builder;

// Discovery helpers
pub(crate) mod discovery;

// Cost calculation
pub mod pricing;

// Parser registry
pub mod registry;

// Source root resolution
pub mod roots;

// Traits
pub use traits::SessionParser;

// Parsers
pub use claude::ClaudeParser;
pub use codex::CodexParser;
pub use gemini::GeminiParser;

// Pricing
pub use pricing::{
    CostOrigin, CostResolution, ModelRates, PricingMode, TokenUsage, calculate_cost,
    normalize_model_name, resolve_cost,
};

// Registry
pub use registry::{
    ParserRegistry, SourceMetadata, create_parser, get_all_sources, get_source_metadata,
};

// Roots
pub use roots::SourceRoots;

// Error types
pub use error::{Error, Result};
