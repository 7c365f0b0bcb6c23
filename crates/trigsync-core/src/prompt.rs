//! Prompt abstraction and the "learn more" selection loop.
//!
//! The terminal itself lives behind [`Prompter`]; this module only decides
//! what to ask and when to ask again. A selection that is, or includes, the
//! [`LEARN_MORE`] sentinel re-renders the same question with a help prefix
//! built from the catalog. Any other selection ends the loop.

use crate::catalog::{Catalog, Choice, LEARN_MORE};
use crate::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectMode {
    Single,
    Multi,
}

/// A single- or multi-select question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub name: String,
    pub mode: SelectMode,
    pub message: String,
    pub choices: Vec<Choice>,
    /// Values pre-checked when the question is shown.
    pub defaults: Vec<String>,
    /// Text rendered above the question; set by the loop after "learn more".
    pub prefix: Option<String>,
}

impl Question {
    pub fn multi(name: impl Into<String>, message: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            name: name.into(),
            mode: SelectMode::Multi,
            message: message.into(),
            choices,
            defaults: Vec::new(),
            prefix: None,
        }
    }

    pub fn single(name: impl Into<String>, message: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            mode: SelectMode::Single,
            ..Self::multi(name, message, choices)
        }
    }

    pub fn with_defaults(mut self, defaults: Vec<String>) -> Self {
        self.defaults = defaults;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    One(String),
    Many(Vec<String>),
}

impl Answer {
    pub fn includes(&self, value: &str) -> bool {
        match self {
            Answer::One(v) => v == value,
            Answer::Many(vs) => vs.iter().any(|v| v == value),
        }
    }

    pub fn into_values(self) -> Vec<String> {
        match self {
            Answer::One(v) => vec![v],
            Answer::Many(vs) => vs,
        }
    }
}

/// The blocking request/response seam to whoever answers questions.
pub trait Prompter {
    fn select(&mut self, question: &Question) -> Result<Answer>;
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool>;
    fn input(&mut self, message: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Help text
// ---------------------------------------------------------------------------

/// What "learn more" explains: the `key` being chosen ("triggers",
/// "templates") within `subject`, described by `catalog`.
#[derive(Debug, Clone, Copy)]
pub struct HelpTopic<'a> {
    pub key: &'a str,
    pub subject: &'a str,
    pub catalog: &'a Catalog,
}

impl HelpTopic<'_> {
    pub fn render(&self) -> String {
        if let Some(url) = &self.catalog.url {
            return format!(
                "\nAdditional information about the {} available for {} can be found here: {url}\n\n",
                self.key, self.subject
            );
        }
        let mut out = format!(
            "\nThe following {} are available in {}\n",
            self.key, self.subject
        );
        for (_, entry) in self.catalog.iter() {
            out.push_str("\n\nName: ");
            out.push_str(&entry.name);
            out.push_str("\nDescription: ");
            out.push_str(entry.description.as_deref().unwrap_or(""));
            out.push_str("\n\n");
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Selection loop
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum LoopState {
    Prompting,
    ShowingHelp,
    Done(Answer),
}

/// Ask `question` until the answer no longer includes the sentinel.
pub fn resolve_selection(
    prompter: &mut dyn Prompter,
    mut question: Question,
    topic: HelpTopic<'_>,
) -> Result<Answer> {
    let mut state = LoopState::Prompting;
    loop {
        state = match state {
            LoopState::Prompting => {
                let answer = prompter.select(&question)?;
                if answer.includes(LEARN_MORE) {
                    LoopState::ShowingHelp
                } else {
                    LoopState::Done(answer)
                }
            }
            LoopState::ShowingHelp => {
                tracing::debug!(question = %question.name, "showing help");
                question.prefix = Some(topic.render());
                LoopState::Prompting
            }
            LoopState::Done(answer) => return Ok(answer),
        };
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;

    /// Answers from a script and records every question asked.
    #[derive(Default)]
    pub(crate) struct ScriptedPrompter {
        pub selects: VecDeque<Answer>,
        pub confirms: VecDeque<bool>,
        pub inputs: VecDeque<String>,
        pub asked: Vec<Question>,
    }

    impl ScriptedPrompter {
        pub(crate) fn many(mut self, values: &[&str]) -> Self {
            self.selects
                .push_back(Answer::Many(values.iter().map(|s| s.to_string()).collect()));
            self
        }

        pub(crate) fn confirm(mut self, yes: bool) -> Self {
            self.confirms.push_back(yes);
            self
        }
    }

    impl Prompter for ScriptedPrompter {
        fn select(&mut self, question: &Question) -> Result<Answer> {
            self.asked.push(question.clone());
            Ok(self.selects.pop_front().expect("unexpected select"))
        }

        fn confirm(&mut self, _message: &str, default: bool) -> Result<bool> {
            Ok(self.confirms.pop_front().unwrap_or(default))
        }

        fn input(&mut self, _message: &str) -> Result<String> {
            Ok(self.inputs.pop_front().unwrap_or_default())
        }
    }
}
