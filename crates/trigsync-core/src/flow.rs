//! The interactive trigger question flow.
//!
//! Asks whether triggers should be configured at all, which trigger kinds
//! to enable, and then which templates to use for each chosen kind. The
//! answers come back as selection fragments ready for [`merge`], together
//! with the previously selected templates the user unchecked.
//!
//! [`merge`]: crate::selection::merge

use crate::catalog::{self, Catalog, Choice};
use crate::error::{Result, TriggerError};
use crate::paths::{self, CUSTOM_TEMPLATE};
use crate::prompt::{resolve_selection, HelpTopic, Prompter, Question};
use crate::selection::{Removal, SelectionFragment, SelectionSet, TemplateList};
use std::path::Path;

pub const CUSTOM_LABEL: &str = "Create your own module";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowOutcome {
    pub fragments: Vec<SelectionFragment>,
    pub removals: Vec<Removal>,
}

/// `cognito` -> `Cognito`.
pub fn display_resource(resource: &str) -> String {
    let mut chars = resource.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Run the flow for `resource` against the catalog at `catalog_root`.
///
/// `None` means the user declined to configure triggers; callers leave the
/// existing configuration untouched in that case.
pub fn trigger_flow(
    prompter: &mut dyn Prompter,
    resource: &str,
    category: &str,
    catalog_root: &Path,
    previous: Option<&SelectionSet>,
) -> Result<Option<FlowOutcome>> {
    if resource.is_empty() {
        return Err(TriggerError::MissingParameter("resource"));
    }
    if category.is_empty() {
        return Err(TriggerError::MissingParameter("category"));
    }

    let subject = display_resource(resource);
    let wanted = prompter.confirm(
        &format!("Do you want to configure Lambda Triggers for {subject}?"),
        false,
    )?;
    if !wanted {
        return Ok(None);
    }

    let trigger_catalog = Catalog::load(catalog_root, resource)?;
    let trigger_question = Question::multi(
        "triggers",
        format!("Which triggers do you want to enable for {subject}"),
        catalog::list_choices(catalog_root, resource, true)?,
    )
    .with_defaults(
        previous
            .map(|p| p.kinds().map(str::to_string).collect())
            .unwrap_or_default(),
    );
    let kinds = resolve_selection(
        prompter,
        trigger_question,
        HelpTopic {
            key: "triggers",
            subject: &subject,
            catalog: &trigger_catalog,
        },
    )?
    .into_values();

    let mut outcome = FlowOutcome::default();
    for kind in kinds {
        paths::validate_kind(&kind)?;
        let readable = trigger_catalog.display_name(&kind).to_string();
        let templates = ask_templates(prompter, catalog_root, &kind, &readable, previous)?;

        if let Some(before) = previous.and_then(|p| p.get(&kind)) {
            for template in before.iter().filter(|t| !templates.contains(t)) {
                outcome.removals.push(Removal::new(&kind, template));
            }
        }
        outcome.fragments.push(SelectionFragment::new(kind, templates));
    }

    tracing::debug!(
        fragments = outcome.fragments.len(),
        removals = outcome.removals.len(),
        "trigger flow finished"
    );
    Ok(Some(outcome))
}

fn ask_templates(
    prompter: &mut dyn Prompter,
    catalog_root: &Path,
    kind: &str,
    readable: &str,
    previous: Option<&SelectionSet>,
) -> Result<TemplateList> {
    let kind_dir = paths::kind_catalog_dir(catalog_root, kind);
    let template_catalog = Catalog::load(&kind_dir, kind)?;
    let mut choices = match catalog::list_choices(&kind_dir, kind, false) {
        Ok(choices) => choices,
        Err(TriggerError::NoImplementations(_)) => catalog::sentinel_choices(),
        Err(e) => return Err(e),
    };
    choices.push(Choice::item(CUSTOM_LABEL, CUSTOM_TEMPLATE));

    let question = Question::multi(
        "templates",
        format!("What functionality do you want to use for {readable}"),
        choices,
    )
    .with_defaults(
        previous
            .and_then(|p| p.get(kind))
            .map(TemplateList::to_vec)
            .unwrap_or_default(),
    );
    let answer = resolve_selection(
        prompter,
        question,
        HelpTopic {
            key: "templates",
            subject: readable,
            catalog: &template_catalog,
        },
    )?;
    Ok(answer.into_values().into_iter().collect())
}
