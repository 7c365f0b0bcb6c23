use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;
use trigsync_core::catalog::Choice;
use trigsync_core::prompt::{Answer, Prompter, Question, SelectMode};
use trigsync_core::reconcile::EditHook;
use trigsync_core::{Result, TriggerError};

/// Answers questions from the controlling terminal. Questions go to stderr
/// so stdout stays clean for command output.
pub struct StdinPrompter;

impl StdinPrompter {
    pub fn new() -> Result<Self> {
        if !io::stdin().is_terminal() {
            return Err(TriggerError::PromptUnavailable(
                "stdin is not a terminal; use 'trigsync apply' for scripted changes".to_string(),
            ));
        }
        Ok(Self)
    }

    fn read_line(&self, prompt: &str) -> Result<String> {
        eprint!("{prompt}");
        io::stderr().flush()?;
        read_answer(&mut io::stdin().lock())
    }
}

impl Prompter for StdinPrompter {
    fn select(&mut self, question: &Question) -> Result<Answer> {
        loop {
            eprint!("{}", render_question(question));
            let answer = self.read_line("> ")?;
            match parse_selection(&answer, question) {
                Ok(answer) => return Ok(answer),
                Err(msg) => eprintln!("{msg}"),
            }
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let answer = self.read_line(&format!("{message} {hint}: "))?;
        Ok(parse_yes_no(&answer, default))
    }

    fn input(&mut self, message: &str) -> Result<String> {
        let answer = self.read_line(&format!("{message}: "))?;
        Ok(answer.trim().to_string())
    }
}

/// Offers to open each freshly copied module in the user's editor.
pub struct OpenEditorHook {
    prompter: StdinPrompter,
}

impl OpenEditorHook {
    pub fn new(prompter: StdinPrompter) -> Self {
        Self { prompter }
    }
}

impl EditHook for OpenEditorHook {
    fn module_created(&mut self, _kind: &str, template: &str, path: &Path) -> Result<()> {
        let message = format!("Do you want to edit your {template} function now?");
        if self.prompter.confirm(&message, false)? {
            if let Err(e) = open::that(path) {
                tracing::warn!(path = %path.display(), error = %e, "could not open editor");
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rendering and parsing
// ---------------------------------------------------------------------------

fn render_question(question: &Question) -> String {
    let mut out = String::new();
    if let Some(prefix) = &question.prefix {
        out.push_str(prefix);
    }
    out.push_str(&question.message);
    out.push('\n');
    let mut n = 0;
    for choice in &question.choices {
        if !choice.is_selectable() {
            out.push_str(&format!("  {}\n", choice.label()));
            continue;
        }
        n += 1;
        let checked = choice
            .value()
            .is_some_and(|v| question.defaults.iter().any(|d| d == v));
        let mark = if checked { "*" } else { " " };
        out.push_str(&format!("  {mark}{n:>2}) {}\n", choice.label()));
    }
    let hint = match question.mode {
        SelectMode::Multi => "Enter numbers or names separated by commas; blank keeps the starred entries.",
        SelectMode::Single => "Enter a number or name; blank keeps the starred entry.",
    };
    out.push_str(hint);
    out.push('\n');
    out
}

/// One line of input. End of input means nobody is left to answer.
fn read_answer(reader: &mut impl BufRead) -> Result<String> {
    let mut answer = String::new();
    if reader.read_line(&mut answer)? == 0 {
        return Err(TriggerError::PromptUnavailable(
            "input closed before an answer was given".to_string(),
        ));
    }
    Ok(answer)
}

fn parse_yes_no(answer: &str, default: bool) -> bool {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no" => false,
        _ => default,
    }
}

fn parse_selection(answer: &str, question: &Question) -> std::result::Result<Answer, String> {
    let selectable: Vec<&Choice> = question.choices.iter().filter(|c| c.is_selectable()).collect();
    let trimmed = answer.trim();

    let values: Vec<String> = if trimmed.is_empty() {
        question.defaults.clone()
    } else {
        let mut values = Vec::new();
        for token in trimmed.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let choice = match token.parse::<usize>() {
                Ok(n) if n >= 1 => selectable.get(n - 1).copied(),
                Ok(_) => None,
                Err(_) => selectable.iter().copied().find(|c| c.value() == Some(token)),
            };
            let Some(value) = choice.and_then(Choice::value) else {
                return Err(format!("'{token}' is not one of the listed choices"));
            };
            if !values.iter().any(|v| v == value) {
                values.push(value.to_string());
            }
        }
        values
    };

    match question.mode {
        SelectMode::Multi => Ok(Answer::Many(values)),
        SelectMode::Single => match values.as_slice() {
            [one] => Ok(Answer::One(one.clone())),
            [] => Err("a choice is required".to_string()),
            _ => Err("choose exactly one entry".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question::multi(
            "templates",
            "What functionality do you want to use for Pre Sign-up",
            vec![
                Choice::LearnMore,
                Choice::Separator,
                Choice::item("Recaptcha", "recaptcha"),
                Choice::item("Create your own module", "custom"),
            ],
        )
        .with_defaults(vec!["custom".to_string()])
    }

    #[test]
    fn numbers_skip_the_separator() {
        let answer = parse_selection("2, 3", &question()).unwrap();
        assert_eq!(answer, Answer::Many(vec!["recaptcha".into(), "custom".into()]));
    }

    #[test]
    fn names_and_duplicates() {
        let answer = parse_selection("recaptcha,recaptcha,1", &question()).unwrap();
        assert_eq!(answer, Answer::Many(vec!["recaptcha".into(), "learn".into()]));
    }

    #[test]
    fn blank_keeps_defaults() {
        assert_eq!(
            parse_selection("\n", &question()).unwrap(),
            Answer::Many(vec!["custom".into()])
        );
    }

    #[test]
    fn unknown_entry_is_rejected() {
        assert!(parse_selection("9", &question()).is_err());
        assert!(parse_selection("0", &question()).is_err());
        assert!(parse_selection("nope", &question()).is_err());
    }

    #[test]
    fn single_mode_requires_one_value() {
        let mut q = question();
        q.mode = SelectMode::Single;
        assert_eq!(parse_selection("2", &q).unwrap(), Answer::One("recaptcha".into()));
        assert!(parse_selection("2,3", &q).is_err());
    }

    #[test]
    fn end_of_input_is_not_a_blank_answer() {
        let err = read_answer(&mut &b""[..]).unwrap_err();
        assert!(matches!(err, TriggerError::PromptUnavailable(_)));
        assert_eq!(read_answer(&mut &b"\n"[..]).unwrap(), "\n");
        assert_eq!(read_answer(&mut &b"2\n3\n"[..]).unwrap(), "2\n");
    }

    #[test]
    fn yes_no_falls_back_to_default() {
        assert!(parse_yes_no(" Yes ", false));
        assert!(!parse_yes_no("n", true));
        assert!(parse_yes_no("", true));
        assert!(!parse_yes_no("maybe", false));
    }

    #[test]
    fn render_marks_defaults_and_prefix() {
        let mut q = question();
        q.prefix = Some("Help text\n".to_string());
        let rendered = render_question(&q);
        assert!(rendered.starts_with("Help text\n"));
        assert!(rendered.contains("  * 3) Create your own module"));
        assert!(rendered.contains("    2) Recaptcha"));
    }
}
