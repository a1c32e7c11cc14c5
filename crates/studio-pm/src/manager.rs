//! Prompt manager implementation using minijinja.

use crate::{
    context::PromptContext,
    engine::PromptEngine,
    error::{PromptError, Result},
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Templates compiled into the binary, as `(name, source)` pairs.
pub const BUNDLED_TEMPLATES: &[(&str, &str)] = &[
    ("researcher", include_str!("../templates/researcher.j2")),
    (
        "researcher_system",
        include_str!("../templates/researcher_system.j2"),
    ),
    ("writer", include_str!("../templates/writer.j2")),
    ("writer_system", include_str!("../templates/writer_system.j2")),
    ("editor", include_str!("../templates/editor.j2")),
    ("editor_system", include_str!("../templates/editor_system.j2")),
    ("storyboard", include_str!("../templates/storyboard.j2")),
    (
        "storyboard_system",
        include_str!("../templates/storyboard_system.j2"),
    ),
];

/// Manager for loading and rendering prompt templates.
///
/// `PromptManager` wraps the minijinja template engine. It is built either
/// from a template directory (lazy path loader), from the bundled templates,
/// or from the bundled templates with a directory of overrides on top.
///
/// # Examples
///
/// ```
/// use studio_pm::{PromptContext, PromptEngine, PromptManager};
///
/// let manager = PromptManager::bundled()?;
/// let prompt = manager.render("writer", &PromptContext::for_brief("brief", "notes"))?;
/// assert!(prompt.contains("notes"));
/// # Ok::<(), studio_pm::PromptError>(())
/// ```
#[derive(Debug)]
pub struct PromptManager {
    /// Directory containing user template files, if any.
    pub templates_dir: Option<PathBuf>,
    /// Names of templates registered eagerly (bundled or overridden).
    registered: BTreeSet<String>,
    /// Minijinja environment for template rendering.
    env: minijinja::Environment<'static>,
}

impl PromptManager {
    /// Creates a `PromptManager` that loads `.j2` files from a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the template directory does not exist or is not a
    /// directory.
    pub fn new(templates_dir: PathBuf) -> Result<Self> {
        ensure_dir(&templates_dir)?;

        let mut env = minijinja::Environment::new();
        env.set_loader(minijinja::path_loader(&templates_dir));

        Ok(Self {
            templates_dir: Some(templates_dir),
            registered: BTreeSet::new(),
            env,
        })
    }

    /// Creates a `PromptManager` with only the bundled role templates.
    ///
    /// # Errors
    ///
    /// Returns an error if a bundled template fails to compile.
    pub fn bundled() -> Result<Self> {
        let mut env = minijinja::Environment::new();
        let mut registered = BTreeSet::new();

        for (name, source) in BUNDLED_TEMPLATES {
            env.add_template_owned(format!("{name}.j2"), *source)
                .map_err(|e| PromptError::TemplateSyntaxError(format!("{name}: {e}")))?;
            registered.insert((*name).to_string());
        }

        Ok(Self {
            templates_dir: None,
            registered,
            env,
        })
    }

    /// Creates a `PromptManager` with the bundled templates, replacing any of
    /// them (and adding new ones) with the `.j2` files found in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is missing, cannot be listed, or contains a
    /// template that fails to compile.
    pub fn with_overrides(dir: PathBuf) -> Result<Self> {
        ensure_dir(&dir)?;
        let mut manager = Self::bundled()?;

        for (name, path) in template_files(&dir)? {
            let source = std::fs::read_to_string(&path).map_err(|source| {
                PromptError::TemplateListError {
                    path: path.clone(),
                    source,
                }
            })?;
            manager
                .env
                .add_template_owned(format!("{name}.j2"), source)
                .map_err(|e| PromptError::TemplateSyntaxError(format!("{name}: {e}")))?;
            manager.registered.insert(name);
        }

        manager.templates_dir = Some(dir);
        Ok(manager)
    }

    /// Loads a template by name (without the `.j2` extension).
    fn load_template(&self, name: &str) -> Result<minijinja::Template<'_, '_>> {
        let template_name = format!("{name}.j2");
        self.env
            .get_template(&template_name)
            .map_err(|e| PromptError::TemplateNotFound(format!("{name}: {e}")))
    }
}

impl PromptEngine for PromptManager {
    fn render<T: Serialize>(&self, template: &str, ctx: &T) -> Result<String> {
        let tmpl = self.load_template(template)?;
        tmpl.render(ctx)
            .map_err(|e| PromptError::TemplateRenderError(format!("{template}: {e}")))
    }

    fn get_system_prompt(&self, role: &str) -> Result<String> {
        self.render(&format!("{role}_system"), &PromptContext::default())
    }

    fn list_templates(&self) -> Result<Vec<String>> {
        let mut names = self.registered.clone();
        if let Some(dir) = &self.templates_dir {
            names.extend(template_files(dir)?.into_iter().map(|(name, _)| name));
        }
        Ok(names.into_iter().collect())
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(PromptError::TemplateDirectoryNotFound(dir.to_path_buf()));
    }
    Ok(())
}

/// Lists `(stem, path)` for every `.j2` file directly inside `dir`.
fn template_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = std::fs::read_dir(dir).map_err(|source| PromptError::TemplateListError {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PromptError::TemplateListError {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = entry.path();
        if path.is_file()
            && let Some(ext) = path.extension()
            && ext == "j2"
            && let Some(name) = path.file_stem().and_then(|s| s.to_str())
        {
            files.push((name.to_string(), path.clone()));
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_template_dir() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let templates_path = temp_dir.path().join("templates");
        fs::create_dir(&templates_path).expect("failed to create templates dir");

        fs::write(templates_path.join("test.j2"), "Hello {{ name }}!")
            .expect("failed to write test template");

        fs::write(
            templates_path.join("researcher.j2"),
            "Custom research for: {{ idea }}",
        )
        .expect("failed to write override template");

        (temp_dir, templates_path)
    }

    #[test]
    fn test_new_with_valid_directory() {
        let (_temp, templates_path) = create_test_template_dir();
        let manager = PromptManager::new(templates_path.clone()).unwrap();
        assert_eq!(manager.templates_dir, Some(templates_path));
    }

    #[test]
    fn test_new_with_nonexistent_directory() {
        let result = PromptManager::new(PathBuf::from("/nonexistent/path"));
        assert!(matches!(
            result,
            Err(PromptError::TemplateDirectoryNotFound(_))
        ));
    }

    #[test]
    fn test_render_with_simple_context() {
        let (_temp, templates_path) = create_test_template_dir();
        let manager = PromptManager::new(templates_path).expect("failed to create manager");

        #[derive(Serialize)]
        struct TestContext {
            name: String,
        }

        let ctx = TestContext {
            name: "World".to_string(),
        };

        assert_eq!(manager.render("test", &ctx).unwrap(), "Hello World!");
    }

    #[test]
    fn test_bundled_renders_every_role() {
        let manager = PromptManager::bundled().unwrap();

        let research = manager
            .render("researcher", &PromptContext::for_idea("A robot chef on Mars"))
            .unwrap();
        assert!(research.contains("A robot chef on Mars"));

        let writing = manager
            .render(
                "writer",
                &PromptContext::for_brief("Mars colonies favor...", "too slow"),
            )
            .unwrap();
        assert!(writing.contains("Mars colonies favor..."));
        assert!(writing.contains("too slow"));

        let review = manager
            .render("editor", &PromptContext::for_script("INT. KITCHEN"))
            .unwrap();
        assert!(review.contains("INT. KITCHEN"));
        assert!(review.contains("\"approved\""));

        let board = manager
            .render("storyboard", &PromptContext::for_script("INT. KITCHEN"))
            .unwrap();
        assert!(board.contains("PANEL:"));
    }

    #[test]
    fn test_bundled_system_prompts() {
        let manager = PromptManager::bundled().unwrap();
        for role in ["researcher", "writer", "editor", "storyboard"] {
            let prompt = manager.get_system_prompt(role).unwrap();
            assert!(!prompt.trim().is_empty(), "empty system prompt for {role}");
        }
        assert!(manager.get_system_prompt("editor").unwrap().contains("JSON"));
    }

    #[test]
    fn test_render_template_not_found() {
        let manager = PromptManager::bundled().unwrap();
        let result = manager.render("nonexistent", &PromptContext::default());
        assert!(matches!(result, Err(PromptError::TemplateNotFound(_))));
    }

    #[test]
    fn test_overrides_replace_bundled_template() {
        let (_temp, templates_path) = create_test_template_dir();
        let manager = PromptManager::with_overrides(templates_path).unwrap();

        let research = manager
            .render("researcher", &PromptContext::for_idea("space whales"))
            .unwrap();
        assert_eq!(research, "Custom research for: space whales");

        // Untouched roles still come from the bundle
        let review = manager
            .render("editor", &PromptContext::for_script("FADE IN"))
            .unwrap();
        assert!(review.contains("FADE IN"));
    }

    #[test]
    fn test_list_templates() {
        let (_temp, templates_path) = create_test_template_dir();
        let manager = PromptManager::new(templates_path).unwrap();
        assert_eq!(
            manager.list_templates().unwrap(),
            vec!["researcher".to_string(), "test".to_string()]
        );

        let bundled = PromptManager::bundled().unwrap().list_templates().unwrap();
        assert_eq!(bundled.len(), BUNDLED_TEMPLATES.len());
        assert!(bundled.contains(&"storyboard_system".to_string()));
    }

    #[test]
    fn test_missing_context_fields_render_empty() {
        let manager = PromptManager::bundled().unwrap();
        let prompt = manager.render("researcher", &PromptContext::default()).unwrap();
        assert!(!prompt.contains("none"));
    }
}
