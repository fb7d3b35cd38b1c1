//! Tokenizer abstraction — the seam between truncation and concrete vocabularies.
//!
//! A codec turns text into token ids and back. Implementations are stateless
//! with respect to the documents they process, so one handle is shared
//! read-only across every truncation call in a run.

use crate::error::TokenizerError;
use std::sync::Arc;

/// A single token id. Both tiktoken ranks and Hugging Face ids fit in `u32`.
pub type TokenId = u32;

/// Shared handle to a resolved codec.
pub type SharedCodec = Arc<dyn TokenCodec>;

/// Encode/decode capability over a fixed vocabulary.
///
/// `encode` must be deterministic: repeated calls on the same string return
/// the same ids. `decode(encode(s))` is not required to reproduce `s` exactly.
pub trait TokenCodec: Send + Sync {
    /// Human-readable codec name (e.g. "cl100k_base").
    fn name(&self) -> &str;

    /// Encode text into token ids.
    fn encode(&self, text: &str) -> Result<Vec<TokenId>, TokenizerError>;

    /// Decode token ids back into text.
    ///
    /// May fail when `ids` starts or ends inside a multi-byte character.
    fn decode(&self, ids: &[TokenId]) -> Result<String, TokenizerError>;

    /// Count the tokens in `text`.
    fn count(&self, text: &str) -> Result<usize, TokenizerError> {
        Ok(self.encode(text)?.len())
    }
}
