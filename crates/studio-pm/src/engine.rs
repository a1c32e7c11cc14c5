//! Core prompt engine trait definition.

use crate::error::Result;
use serde::Serialize;

/// Trait for rendering templates with dynamic context.
///
/// Implementations handle loading and rendering of templates using a
/// template engine like minijinja.
///
/// # Examples
///
/// ```
/// use studio_pm::{PromptContext, PromptEngine, PromptManager};
///
/// fn render_example(engine: &PromptManager) -> Result<String, studio_pm::PromptError> {
///     let context = PromptContext::for_script("INT. KITCHEN - NIGHT");
///     engine.render("editor", &context)
/// }
///
/// let manager = PromptManager::bundled()?;
/// assert!(render_example(&manager)?.contains("INT. KITCHEN"));
/// # Ok::<(), studio_pm::PromptError>(())
/// ```
pub trait PromptEngine {
    /// Renders a template with the provided context.
    ///
    /// # Arguments
    ///
    /// * `template` - Name of the template to render (without extension)
    /// * `ctx` - Context data to use for rendering
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not exist or rendering fails.
    fn render<T: Serialize>(&self, template: &str, ctx: &T) -> Result<String>;

    /// Gets the system prompt for a role.
    ///
    /// System prompts live in `<role>_system` templates and are rendered
    /// with an empty context.
    ///
    /// # Errors
    ///
    /// Returns an error if the role has no system template.
    fn get_system_prompt(&self, role: &str) -> Result<String>;

    /// Lists all available template names, sorted.
    fn list_templates(&self) -> Result<Vec<String>>;
}
