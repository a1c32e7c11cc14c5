//! Prompt manager crate for Story Studio.
//!
//! Renders the role prompts (researcher, writer, editor, storyboard) from
//! minijinja templates. A set of templates is bundled into the binary; a
//! directory of `.j2` files can override any of them.
//!
//! # Examples
//!
//! ```
//! use studio_pm::{PromptContext, PromptEngine, PromptManager};
//!
//! let manager = PromptManager::bundled()?;
//! let context = PromptContext::for_idea("A robot chef on Mars");
//!
//! let prompt = manager.render("researcher", &context)?;
//! assert!(prompt.contains("A robot chef on Mars"));
//! # Ok::<(), studio_pm::PromptError>(())
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod manager;

// Re-export public types for convenience
pub use context::PromptContext;
pub use engine::PromptEngine;
pub use error::{PromptError, Result};
pub use manager::{BUNDLED_TEMPLATES, PromptManager};
