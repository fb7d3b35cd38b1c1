//! Budget truncation — fits an EHR timeline into the tokens left over after
//! the instruction, the template, and the generation reserve.
//!
//! # Algorithm
//!
//! 1. `ehr_budget = context_length - generation_length - template_tokens - instruction_tokens`
//!    (zero when EHR inclusion is disabled), all counted with the target codec.
//! 2. `ehr_budget <= 0` → the EHR is omitted entirely.
//! 3. Coarse pass: encode the whole timeline with the fast codec.
//!    - fits (`fast_tokens <= ehr_budget`): keep the last `2 × ehr_budget`
//!      fast tokens, re-encode that candidate with the target codec, keep its
//!      last `ehr_budget` tokens → [`TruncationStrategy::Refined`].
//!    - does not fit: keep the last `ehr_budget` fast tokens and stop →
//!      [`TruncationStrategy::Coarse`].
//!
//! The coarse branch skips the exact pass. Exact tokenizers can be far
//! slower than the fast codec on long documents, and the coarse branch is
//! hit precisely for the longest ones. When the target codec is less
//! efficient than cl100k_base, a coarse result can exceed `ehr_budget` in
//! target tokens. Callers that need a hard guarantee should pick a
//! cl100k_base alias as the target.
//!
//! Truncation always keeps the tail: timelines are in chronological order
//! and the most recent history matters most.

use crate::template::PromptTemplate;
use medalign_core::{Result, SharedCodec, TokenCodec, TokenId, TruncationStrategy};
use tracing::debug;

/// Context window limits for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextLimits {
    pub context_length: usize,
    pub generation_length: usize,
    pub include_ehr: bool,
}

impl ContextLimits {
    /// Tokens left for the EHR section. Negative when the instruction and
    /// template alone overflow the window.
    pub fn ehr_budget(&self, template_tokens: usize, instruction_tokens: usize) -> i64 {
        if !self.include_ehr {
            return 0;
        }
        let tokens = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
        tokens(self.context_length)
            .saturating_sub(tokens(self.generation_length))
            .saturating_sub(tokens(template_tokens))
            .saturating_sub(tokens(instruction_tokens))
    }
}

/// The EHR text that made it into a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncation {
    pub text: String,
    pub ehr_budget: i64,
    pub strategy: TruncationStrategy,
    /// Fast-codec length of the full timeline; zero when omitted.
    pub fast_tokens: usize,
}

/// A filled template and the truncation that produced it.
#[derive(Debug, Clone)]
pub struct FittedPrompt {
    pub prompt: String,
    pub truncation: Truncation,
}

/// Two-pass truncator. Cheap to clone; both codecs are shared handles.
#[derive(Clone)]
pub struct BudgetTruncator {
    target: SharedCodec,
    fast: SharedCodec,
}

impl BudgetTruncator {
    pub fn new(target: SharedCodec, fast: SharedCodec) -> Self {
        Self { target, fast }
    }

    pub fn target(&self) -> &dyn TokenCodec {
        self.target.as_ref()
    }

    pub fn fast(&self) -> &dyn TokenCodec {
        self.fast.as_ref()
    }

    /// Truncate `ehr` to at most `ehr_budget` tokens, keeping the tail.
    pub fn truncate(&self, ehr: &str, ehr_budget: i64) -> Result<Truncation> {
        if ehr_budget <= 0 {
            return Ok(Truncation {
                text: String::new(),
                ehr_budget,
                strategy: TruncationStrategy::Omitted,
                fast_tokens: 0,
            });
        }

        let budget = ehr_budget as usize;
        let fast_ids = self.fast.encode(ehr)?;
        let fast_tokens = fast_ids.len();

        let (text, strategy) = if fast_tokens <= budget {
            let candidate = decode_tail(self.fast(), &fast_ids, budget.saturating_mul(2))?;
            let target_ids = self.target.encode(&candidate)?;
            (
                decode_tail(self.target(), &target_ids, budget)?,
                TruncationStrategy::Refined,
            )
        } else {
            (
                decode_tail(self.fast(), &fast_ids, budget)?,
                TruncationStrategy::Coarse,
            )
        };

        debug!(
            ehr_budget,
            fast_tokens,
            strategy = %strategy,
            kept_chars = text.len(),
            "Truncated EHR"
        );

        Ok(Truncation {
            text,
            ehr_budget,
            strategy,
            fast_tokens,
        })
    }

    /// Count, truncate, and fill in one call.
    ///
    /// Batch callers should count the template once and use
    /// [`BudgetTruncator::truncate`] directly.
    pub fn fit(
        &self,
        instruction: &str,
        ehr: &str,
        template: &PromptTemplate,
        limits: &ContextLimits,
    ) -> Result<FittedPrompt> {
        let template_tokens = self.target.count(template.source())?;
        let instruction_tokens = self.target.count(instruction)?;
        let ehr_budget = limits.ehr_budget(template_tokens, instruction_tokens);
        let truncation = self.truncate(ehr, ehr_budget)?;
        Ok(FittedPrompt {
            prompt: template.fill(instruction, &truncation.text),
            truncation,
        })
    }
}

/// Decode the last `keep` ids.
///
/// A byte-level slice can start inside a multi-byte character, and merged
/// tokens can straddle several characters, so drop leading ids until the
/// slice decodes and re-counts within `keep`. Dropping everything yields the
/// empty string. The result is always a suffix of the decoded input.
fn decode_tail(codec: &dyn TokenCodec, ids: &[TokenId], keep: usize) -> Result<String> {
    let start = ids.len().saturating_sub(keep);
    for from in start..ids.len() {
        let Ok(text) = codec.decode(&ids[from..]) else {
            continue;
        };
        if codec.count(&text)? <= keep {
            if from > start {
                debug!(
                    codec = codec.name(),
                    dropped = from - start,
                    "Realigned tail to a character boundary"
                );
            }
            return Ok(text);
        }
    }
    Ok(String::new())
}
