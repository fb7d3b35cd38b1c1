//! Tokenizer adapter for MedAlign prompt preparation.
//!
//! Resolves a tokenizer name to a shared [`TokenCodec`] handle:
//!
//! | Name | Codec |
//! |------|-------|
//! | `tiktoken`, `chatgpt`, `gpt-3.5-turbo`, `gpt-4`, `gpt-4-turbo`, `gpt-4o`, `cl100k_base` | [`TiktokenCodec`] (cl100k_base) |
//! | `o200k_base` | [`TiktokenCodec`] (o200k_base) |
//! | anything else | `HuggingFaceCodec` (requires the `hf` feature) |
//!
//! Resolution may download or parse a large vocabulary. Resolve once per
//! run and share the handle.

#[cfg(feature = "hf")]
pub mod huggingface;
pub mod spec;
pub mod tiktoken;

#[cfg(feature = "hf")]
pub use huggingface::HuggingFaceCodec;
pub use spec::{BuiltinEncoding, TokenizerSpec};
pub use tiktoken::TiktokenCodec;

use medalign_core::{SharedCodec, TokenizerError};
use std::sync::Arc;
use tracing::info;

/// Resolve a tokenizer name to a codec handle.
pub fn resolve(name: &str) -> Result<SharedCodec, TokenizerError> {
    resolve_spec(&TokenizerSpec::parse(name))
}

/// Resolve an already-parsed tokenizer spec.
pub fn resolve_spec(spec: &TokenizerSpec) -> Result<SharedCodec, TokenizerError> {
    let codec: SharedCodec = match spec {
        TokenizerSpec::Builtin(encoding) => Arc::new(TiktokenCodec::new(*encoding)?),
        TokenizerSpec::External(name) => load_external(name)?,
    };
    info!(codec = codec.name(), "Tokenizer ready");
    Ok(codec)
}

/// The fixed cl100k_base codec used for coarse length estimates.
pub fn fast_codec() -> Result<SharedCodec, TokenizerError> {
    Ok(Arc::new(TiktokenCodec::cl100k_base()?))
}

#[cfg(feature = "hf")]
fn load_external(name: &str) -> Result<SharedCodec, TokenizerError> {
    Ok(Arc::new(HuggingFaceCodec::load(name)?))
}

#[cfg(not(feature = "hf"))]
fn load_external(name: &str) -> Result<SharedCodec, TokenizerError> {
    Err(TokenizerError::Unavailable(name.to_string()))
}

/// The target codec for exact counts plus the fast codec for the coarse pass.
///
/// When the target already is cl100k_base both handles share one instance.
#[derive(Clone)]
pub struct TokenizerSet {
    pub target: SharedCodec,
    pub fast: SharedCodec,
}

impl TokenizerSet {
    pub fn resolve(name: &str) -> Result<Self, TokenizerError> {
        let spec = TokenizerSpec::parse(name);
        let target = resolve_spec(&spec)?;
        let fast = if spec.is_fast() {
            Arc::clone(&target)
        } else {
            fast_codec()?
        };
        Ok(Self { target, fast })
    }
}
