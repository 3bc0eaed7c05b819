//! Doctor command - verify credentials and configuration.

use super::config::mask_key;
use crate::cli::preflight::ai_key_var;
use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge_base::KnowledgeBase;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: Option<&Path>) -> anyhow::Result<()> {
    Output::header(&format!("{} Doctor", settings.general.app_name));
    println!();
    println!("Checking credentials and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Configuration").bold());
    let api_checks = vec![
        check_key(
            ai_key_var(settings),
            settings.ai.api_key.as_deref(),
            &format!("{} ({})", settings.ai.provider, settings.ai.model),
        ),
        check_key("YOUTUBE_API_KEY", settings.youtube.api_key.as_deref(), "YouTube Data API"),
    ];
    for check in &api_checks {
        check.print();
    }
    checks.extend(api_checks);

    println!();

    println!("{}", style("Data").bold());
    let data_checks = vec![
        check_knowledge_base(&settings.knowledge_base_path()),
        check_upload_dir(&settings.upload_dir()),
    ];
    for check in &data_checks {
        check.print();
    }
    checks.extend(data_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let default_path = Settings::default_config_path();
    let config_check = check_config_file(config_path.unwrap_or(&default_path));
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Analysis requests will fail until they are fixed.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! The manual is ready to use.");
    }

    Ok(())
}

/// Check that a credential is present and non-empty.
fn check_key(name: &str, key: Option<&str>, service: &str) -> CheckResult {
    match key {
        Some(key) if !key.trim().is_empty() => {
            CheckResult::ok(name, &format!("configured for {} ({})", service, mask_key(key)))
        }
        Some(_) => CheckResult::error(name, "empty", &format!("Set with: export {}='...'", name)),
        None => CheckResult::error(name, "not set", &format!("Set with: export {}='...'", name)),
    }
}

/// Check the knowledge base file parses.
fn check_knowledge_base(path: &Path) -> CheckResult {
    if !path.exists() {
        return CheckResult::warning(
            "Knowledge base",
            &format!("{} (missing, an empty one is used)", path.display()),
            "Set KNOWLEDGE_BASE_PATH or knowledge_base.path",
        );
    }

    match KnowledgeBase::load(path) {
        Ok(_) => {
            let size = std::fs::metadata(path)
                .map(|m| format_size(m.len()))
                .unwrap_or_else(|_| "unknown size".to_string());
            CheckResult::ok("Knowledge base", &format!("{} ({})", path.display(), size))
        }
        Err(e) => CheckResult::error(
            "Knowledge base",
            &e.to_string(),
            "The file must contain a JSON document",
        ),
    }
}

/// Check the upload directory.
fn check_upload_dir(dir: &Path) -> CheckResult {
    if dir.is_dir() {
        CheckResult::ok("Upload directory", &format!("{}", dir.display()))
    } else if dir.exists() {
        CheckResult::error(
            "Upload directory",
            &format!("{} is not a directory", dir.display()),
            "Set UPLOAD_DIR or uploads.dir to a directory",
        )
    } else {
        CheckResult::warning(
            "Upload directory",
            &format!("{} (will be created)", dir.display()),
            "Directory will be created when the server starts",
        )
    }
}

/// Check if config file exists.
fn check_config_file(path: &Path) -> CheckResult {
    if path.exists() {
        CheckResult::ok("Config file", &format!("{}", path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: alto-manual config init",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
