//! Tera-based template renderer implementation

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::templates::{TemplateEngine, TemplateMetadata, TemplateRegistry};
use crate::generation::{GenerationError, TemplateModel, TemplateRenderer};

/// Renders registry templates from their source files through a shared
/// [`TemplateEngine`]
pub struct TeraTemplateRenderer {
    engine: Arc<TemplateEngine>,
    registry: Arc<TemplateRegistry>,
}

impl TeraTemplateRenderer {
    pub fn new(engine: Arc<TemplateEngine>, registry: Arc<TemplateRegistry>) -> Self {
        Self { engine, registry }
    }

    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }
}

#[async_trait]
impl TemplateRenderer for TeraTemplateRenderer {
    async fn render(
        &self,
        template: &TemplateMetadata,
        model: &TemplateModel,
    ) -> Result<String, GenerationError> {
        let path = self.registry.resolve(template);
        self.engine
            .render_from_file(&template.name, &path, model)
            .await
    }
}
