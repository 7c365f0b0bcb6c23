use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use trigsync_core::catalog::{self, Catalog};
use trigsync_core::config::Config;
use trigsync_core::paths;

pub fn run(root: &Path, trigger: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let catalog_root = config.catalog_root(root);

    let (dir, scope, directories) = match trigger {
        Some(kind) => {
            paths::validate_kind(kind)?;
            (paths::kind_catalog_dir(&catalog_root, kind), kind, false)
        }
        None => (catalog_root.clone(), config.resource.as_str(), true),
    };

    let choices = catalog::list_choices(&dir, scope, directories)
        .with_context(|| format!("failed to list choices for '{scope}'"))?;
    let meta = Catalog::load(&dir, scope)?;

    if json {
        let value = serde_json::json!({
            "scope": scope,
            "url": meta.url,
            "choices": choices,
        });
        return print_json(&value);
    }

    let rows: Vec<Vec<String>> = choices
        .iter()
        .filter_map(|c| {
            let value = c.value()?;
            let entry = meta.get(value)?;
            Some(vec![
                value.to_string(),
                entry.name.clone(),
                entry.description.clone().unwrap_or_default(),
            ])
        })
        .collect();
    print_table(&["ID", "NAME", "DESCRIPTION"], rows);
    if let Some(url) = &meta.url {
        println!("\nMore information: {url}");
    }
    Ok(())
}
