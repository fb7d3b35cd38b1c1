//! Built-in BPE encodings backed by `tiktoken-rs`.

use crate::spec::BuiltinEncoding;
use medalign_core::{TokenCodec, TokenId, TokenizerError};
use tiktoken_rs::CoreBPE;

/// A compiled-in tiktoken encoding.
///
/// Text is encoded without special-token parsing, so a timeline containing
/// `<|endoftext|>` is tokenized as ordinary text.
pub struct TiktokenCodec {
    encoding: BuiltinEncoding,
    bpe: CoreBPE,
}

impl TiktokenCodec {
    pub fn new(encoding: BuiltinEncoding) -> Result<Self, TokenizerError> {
        let bpe = match encoding {
            BuiltinEncoding::Cl100kBase => tiktoken_rs::cl100k_base(),
            BuiltinEncoding::O200kBase => tiktoken_rs::o200k_base(),
        }
        .map_err(|e| TokenizerError::Load {
            name: encoding.name().into(),
            reason: e.to_string(),
        })?;

        Ok(Self { encoding, bpe })
    }

    pub fn cl100k_base() -> Result<Self, TokenizerError> {
        Self::new(BuiltinEncoding::Cl100kBase)
    }
}

impl TokenCodec for TiktokenCodec {
    fn name(&self) -> &str {
        self.encoding.name()
    }

    fn encode(&self, text: &str) -> Result<Vec<TokenId>, TokenizerError> {
        Ok(self
            .bpe
            .encode_ordinary(text)
            .into_iter()
            .map(|rank| rank as TokenId)
            .collect())
    }

    fn decode(&self, ids: &[TokenId]) -> Result<String, TokenizerError> {
        let ranks = ids.iter().map(|&id| id as _).collect();
        self.bpe.decode(ranks).map_err(|e| TokenizerError::Decode {
            codec: self.name().into(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_and_decodes_ascii() {
        let codec = TiktokenCodec::cl100k_base().unwrap();
        let ids = codec.encode("The patient was admitted for chest pain.").unwrap();
        assert!(!ids.is_empty());
        assert_eq!(
            codec.decode(&ids).unwrap(),
            "The patient was admitted for chest pain."
        );
    }

    #[test]
    fn encoding_is_length_stable() {
        let codec = TiktokenCodec::cl100k_base().unwrap();
        let text = "<encounter date=\"2019-04-01\">Metformin 500mg BID</encounter>";
        let first = codec.count(text).unwrap();
        for _ in 0..3 {
            assert_eq!(codec.count(text).unwrap(), first);
        }
    }

    #[test]
    fn special_token_text_is_ordinary() {
        let codec = TiktokenCodec::cl100k_base().unwrap();
        let ids = codec.encode("<|endoftext|>").unwrap();
        assert!(ids.len() > 1);
    }

    #[test]
    fn o200k_loads() {
        let codec = TiktokenCodec::new(BuiltinEncoding::O200kBase).unwrap();
        assert_eq!(codec.name(), "o200k_base");
        assert!(codec.count("hello world").unwrap() > 0);
    }

    #[test]
    fn empty_text_has_no_tokens() {
        let codec = TiktokenCodec::cl100k_base().unwrap();
        assert_eq!(codec.count("").unwrap(), 0);
        assert_eq!(codec.decode(&[]).unwrap(), "");
    }
}
