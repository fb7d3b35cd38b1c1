//! Prompt template with `{question}` and `{ehr}` placeholders.
//!
//! The template is split into segments once; filling is a single pass, so
//! braces inside the substituted question or EHR text are never expanded.
//! `{{` and `}}` produce literal braces.

use medalign_core::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Question,
    Ehr,
}

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut field = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => field.push(ch),
                            None => {
                                return Err(Error::Template(format!(
                                    "unclosed placeholder '{{{field}'"
                                )));
                            }
                        }
                    }
                    let segment = match field.as_str() {
                        "question" => Segment::Question,
                        "ehr" => Segment::Ehr,
                        other => {
                            return Err(Error::Template(format!(
                                "unknown placeholder '{{{other}}}', expected {{question}} or {{ehr}}"
                            )));
                        }
                    };
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                }
                '}' => {
                    return Err(Error::Template(
                        "single '}' in template, use '}}' for a literal brace".into(),
                    ));
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        for (segment, name) in [(Segment::Question, "{question}"), (Segment::Ehr, "{ehr}")] {
            if !segments.contains(&segment) {
                return Err(Error::Template(format!("template has no {name} placeholder")));
            }
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The raw template text, placeholders included.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn fill(&self, question: &str, ehr: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + question.len() + ehr.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Question => out.push_str(question),
                Segment::Ehr => out.push_str(ehr),
            }
        }
        out
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::parse(medalign_config::DEFAULT_TEMPLATE)
            .expect("built-in template has both placeholders")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_fills() {
        let template = PromptTemplate::default();
        let prompt = template.fill("Any allergies?", "<allergy>penicillin</allergy>");
        assert_eq!(
            prompt,
            "Instruction: Answer the following question based on the EHR:\n\n\
             EHR: <allergy>penicillin</allergy>\n\nQuestion: Any allergies?\n\nAnswer:"
        );
    }

    #[test]
    fn empty_ehr_leaves_empty_section() {
        let prompt = PromptTemplate::default().fill("Q", "");
        assert!(prompt.contains("EHR: \n\nQuestion: Q"));
    }

    #[test]
    fn fill_is_single_pass() {
        let template = PromptTemplate::parse("{ehr}|{question}").unwrap();
        assert_eq!(template.fill("{ehr}", "{question}"), "{question}|{ehr}");
    }

    #[test]
    fn escaped_braces_are_literal() {
        let template = PromptTemplate::parse("{{json}} {question} {ehr}").unwrap();
        assert_eq!(template.fill("q", "e"), "{json} q e");
        assert_eq!(template.source(), "{{json}} {question} {ehr}");
    }

    #[test]
    fn placeholders_may_repeat() {
        let template = PromptTemplate::parse("{question} {ehr} {question}").unwrap();
        assert_eq!(template.fill("a", "b"), "a b a");
    }

    #[test]
    fn missing_placeholder_rejected() {
        let err = PromptTemplate::parse("Question: {question}").unwrap_err();
        assert!(err.to_string().contains("{ehr}"));
    }

    #[test]
    fn unknown_placeholder_rejected() {
        assert!(PromptTemplate::parse("{question} {ehr} {patient}").is_err());
    }

    #[test]
    fn unbalanced_braces_rejected() {
        assert!(PromptTemplate::parse("{question} {ehr").is_err());
        assert!(PromptTemplate::parse("{question} } {ehr}").is_err());
    }
}
