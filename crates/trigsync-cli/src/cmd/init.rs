use anyhow::Context;
use std::path::Path;
use trigsync_core::{config::Config, io, paths, state::TriggerState};

/// Boilerplate for the `custom` module, written when the project has none.
const CUSTOM_BOILERPLATE: &str = r#"exports.handler = (event, context, callback) => {
  // insert code to be executed by your lambda trigger
  callback(null, event);
};
"#;

pub fn run(
    root: &Path,
    resource: Option<String>,
    category: Option<String>,
    prefix: Option<String>,
) -> anyhow::Result<()> {
    let project_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());

    println!("Initializing trigsync in: {}", root.display());

    let dir = paths::trigsync_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    // Config: written once, flags only apply to a fresh config.
    let config = if paths::config_path(root).exists() {
        println!("  exists:  {}", paths::CONFIG_FILE);
        Config::load(root).context("failed to load config")?
    } else {
        let mut cfg = Config::new(&project_name);
        if let Some(resource) = resource {
            cfg.resource = resource;
        }
        if let Some(category) = category {
            cfg.category = category;
        }
        if let Some(prefix) = prefix {
            cfg.resource_name_prefix = prefix;
        }
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
        cfg
    };

    if paths::state_path(root).exists() {
        println!("  exists:  {}", paths::STATE_FILE);
    } else {
        TriggerState::default()
            .save(root)
            .context("failed to write state.yaml")?;
        println!("  created: {}", paths::STATE_FILE);
    }

    let custom = config.custom_template_path(root);
    if io::write_if_missing(&custom, CUSTOM_BOILERPLATE.as_bytes())
        .with_context(|| format!("failed to write {}", custom.display()))?
    {
        println!("  created: {}", config.custom_template.display());
    }

    for warning in config.validate(root) {
        tracing::warn!("{}", warning.message);
    }

    println!("\ntrigsync initialized. Run 'trigsync configure' to choose triggers.");
    Ok(())
}
