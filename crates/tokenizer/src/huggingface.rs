//! External tokenizers backed by the Hugging Face `tokenizers` crate.
//!
//! A name is tried, in order, as:
//! 1. a path to a `tokenizer.json` file
//! 2. a directory containing `tokenizer.json`
//! 3. a Hugging Face Hub model id (downloaded and cached via `hf-hub`)

use hf_hub::api::sync::Api;
use medalign_core::{TokenCodec, TokenId, TokenizerError};
use std::path::Path;
use tokenizers::Tokenizer;
use tracing::info;

/// A tokenizer loaded from a `tokenizer.json` definition.
///
/// Encoding does not add special tokens (BOS/EOS), so counts reflect the
/// text alone. Decoding skips special tokens.
pub struct HuggingFaceCodec {
    name: String,
    tokenizer: Tokenizer,
}

impl HuggingFaceCodec {
    /// Resolve `name` as a local path or a hub model id.
    pub fn load(name: &str) -> Result<Self, TokenizerError> {
        let path = Path::new(name);
        if path.is_file() {
            return Self::from_file(name, path);
        }
        if path.is_dir() {
            return Self::from_file(name, &path.join("tokenizer.json"));
        }
        Self::from_pretrained(name)
    }

    /// Load a `tokenizer.json` file.
    pub fn from_file(name: &str, path: &Path) -> Result<Self, TokenizerError> {
        info!(tokenizer = name, path = %path.display(), "Loading tokenizer from file");
        let tokenizer = Tokenizer::from_file(path).map_err(|e| TokenizerError::Load {
            name: name.into(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            name: name.into(),
            tokenizer,
        })
    }

    /// Download (or reuse the cached) `tokenizer.json` of a hub model.
    pub fn from_pretrained(model_id: &str) -> Result<Self, TokenizerError> {
        info!(model = model_id, "Fetching tokenizer from Hugging Face Hub");

        let api = Api::new().map_err(|e| TokenizerError::Load {
            name: model_id.into(),
            reason: format!("Failed to initialize HuggingFace Hub API: {e}"),
        })?;

        let tokenizer_path = api
            .model(model_id.to_string())
            .get("tokenizer.json")
            .map_err(|e| TokenizerError::Load {
                name: model_id.into(),
                reason: format!("Failed to download tokenizer.json: {e}"),
            })?;

        Self::from_file(model_id, &tokenizer_path)
    }
}

impl TokenCodec for HuggingFaceCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self, text: &str) -> Result<Vec<TokenId>, TokenizerError> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| TokenizerError::Encode {
                codec: self.name.clone(),
                reason: e.to_string(),
            })?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[TokenId]) -> Result<String, TokenizerError> {
        self.tokenizer
            .decode(ids, true)
            .map_err(|e| TokenizerError::Decode {
                codec: self.name.clone(),
                reason: e.to_string(),
            })
    }
}
