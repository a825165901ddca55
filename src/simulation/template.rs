use crate::core::params::ParamVector;
use crate::error::RunError;
use std::fs;
use std::path::Path;

pub const TEMPLATE_FILE: &str = "Input_ASD_template.inp";

/// A case's solver input template.
///
/// The file is solver-defined text carrying one `K*` placeholder per
/// parameter; line 2 leads with the drug–polymer case name.
pub struct InputTemplate {
    content: String,
}

impl InputTemplate {
    pub fn load(path: &Path) -> Result<Self, RunError> {
        let content = fs::read_to_string(path).map_err(|source| RunError::Template {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { content })
    }

    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// The case name: first whitespace-separated token of line 2.
    pub fn case_name(&self) -> Result<&str, RunError> {
        self.content
            .lines()
            .nth(1)
            .and_then(|line| line.split_whitespace().next())
            .ok_or(RunError::MissingCaseName)
    }

    /// Substitute every placeholder with the vector's decimal value.
    ///
    /// Pure textual substitution; the placeholders are distinct, so the
    /// replacement order does not matter.
    pub fn render(&self, params: &ParamVector) -> String {
        let mut rendered = self.content.clone();
        for (name, value) in params.iter() {
            let placeholder = format!("{}*", name);
            rendered = rendered.replace(&placeholder, &value.to_string());
        }
        rendered
    }
}
