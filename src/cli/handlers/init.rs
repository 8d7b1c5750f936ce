use std::fs;

use crate::cli::commands::InitArgs;
use crate::io::workspace_io;
use crate::parse::{serialize_steps, serialize_substeps};

const CLOSE_TOML_TEMPLATE: &str = r##"[workspace]
name = "{name}"

[catalog]
# HTTP endpoint serving the task catalog as steps + substeps CSV text.
# Unset disables `cb fetch`.
# endpoint = "http://localhost:3001/api/daily-close-tasks"
steps_file = "data/steps.csv"
substeps_file = "data/substeps.csv"

[status]
# Substep roll-up policy: "independent" or "complete-parent"
rollup = "independent"

# --- UI Customization ---
# Uncomment and edit to override defaults.

[ui]
# show_key_hints = false
# kitty_keyboard = false
#
# [ui.colors]
# background = "#0C001B"
# text = "#A09BFE"
# text_bright = "#FFFFFF"
# highlight = "#FB4196"
# dim = "#5A5580"
# red = "#FF4444"
# yellow = "#FFD700"
# green = "#44FF88"
# cyan = "#44DDFF"
"##;

/// Infer a workspace name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + &chars.collect::<String>()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render close.toml, uncommenting the endpoint line when one was given.
fn render_close_toml(name: &str, endpoint: Option<&str>) -> String {
    let base = CLOSE_TOML_TEMPLATE.replace("{name}", name);
    match endpoint {
        Some(url) => base.replace(
            "# endpoint = \"http://localhost:3001/api/daily-close-tasks\"",
            &format!("endpoint = \"{}\"", url),
        ),
        None => base,
    }
}

pub fn cmd_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let close_dir = cwd.join("close");

    if close_dir.is_dir() && !args.force {
        return Err(
            "close workspace already exists in ./close/ (use --force to reinitialize)".into(),
        );
    }

    // Check for parent workspace and warn
    if let Some(parent) = cwd.parent()
        && let Ok(parent_root) = workspace_io::discover_workspace(parent)
    {
        eprintln!(
            "Note: parent workspace found at {}/",
            parent_root.join("close").display()
        );
        eprintln!("Creating new workspace in ./close/");
    }

    // Infer workspace name
    let name = args.name.unwrap_or_else(|| {
        cwd.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .unwrap_or_else(|| "Daily Close".to_string())
    });

    fs::create_dir_all(close_dir.join("data"))?;

    // Write close.toml
    let toml_content = render_close_toml(&name, args.endpoint.as_deref());
    fs::write(close_dir.join("close.toml"), toml_content)?;

    // Header-only snapshots; `cb fetch` fills them in
    fs::write(close_dir.join("data").join("steps.csv"), serialize_steps(&[]))?;
    fs::write(
        close_dir.join("data").join("substeps.csv"),
        serialize_substeps(&[]),
    )?;

    // Print summary
    println!("Initialized close workspace: {}", name);
    if let Some(endpoint) = args.endpoint.as_deref() {
        println!("  catalog endpoint: {}", endpoint);
    }
    println!("  run `cb fetch` to pull the catalog, or edit close/data/steps.csv");

    Ok(())
}
