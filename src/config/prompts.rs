//! Prompt templates for content analysis.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub analysis: AnalysisPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts sent to the generative model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisPrompts {
    /// Text question prompt. Placeholders: `{{query}}`, `{{knowledge_base}}`.
    pub text: String,
    /// Image prompt, sent alongside the image. Placeholder: `{{knowledge_base}}`.
    pub image: String,
}

impl Default for AnalysisPrompts {
    fn default() -> Self {
        Self {
            text: r#"You are an expert automotive technician specializing in Maruti Suzuki Alto cars.

User Question: {{query}}

Alto Car Knowledge Base:
{{knowledge_base}}

Provide a comprehensive answer that includes:
1. Direct answer to the question
2. Detailed explanation
3. Step-by-step troubleshooting if applicable
4. Safety precautions if relevant
5. 3-5 specific YouTube search keywords for video tutorials

Format your response clearly with proper sections."#
                .to_string(),

            image: r#"You are an expert automotive technician specializing in Maruti Suzuki Alto cars.

Analyze this image carefully and provide:

1. COMPONENT IDENTIFICATION: What car component, button, indicator, or part is shown?
2. FUNCTION: What is its purpose and how does it work?
3. LOCATION: Where is this located in the Alto car (dashboard, engine bay, interior, etc.)?
4. CONDITION ASSESSMENT: Based on the image, does it appear normal, damaged, or show any issues?
5. COMMON PROBLEMS: What are typical problems with this component in Alto cars?
6. TROUBLESHOOTING: If there's an issue visible, what could be the cause?
7. SOLUTION: What steps should be taken to fix or maintain this component?
8. SEARCH KEYWORDS: Provide 3-5 specific keywords for YouTube searches related to this component or issue.

Additional Context - Maruti Suzuki Alto Information:
{{knowledge_base}}

Provide a detailed, practical response that would help an Alto car owner understand and potentially fix issues."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let analysis_path = custom_path.join("analysis.toml");
            if analysis_path.exists() {
                let content = std::fs::read_to_string(&analysis_path)?;
                prompts.analysis = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is a single pass over the template: inserted values are
    /// never scanned for placeholders. Unknown placeholders are left as is.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let placeholder =
            PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid regex"));

        placeholder
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
