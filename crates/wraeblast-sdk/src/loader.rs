//! Rendering and loading of filter templates

use crate::config::{ItemFilterPrerenderOptions, RenderOptions};
use crate::environment::create_environment;
use crate::error::Result;
use minijinja::context;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use wraeblast_core::ItemFilter;
use wraeblast_insights::ItemFilterContext;
use wraeblast_parser::DocumentParser;

/// Renders templates against one context and one set of options
#[derive(Debug, Clone)]
pub struct FilterLoader {
    ctx: Arc<ItemFilterContext>,
    options: Arc<ItemFilterPrerenderOptions>,
    render_options: RenderOptions,
}

impl FilterLoader {
    pub fn new(
        ctx: ItemFilterContext,
        options: ItemFilterPrerenderOptions,
        render_options: RenderOptions,
    ) -> Self {
        Self {
            ctx: Arc::new(ctx),
            options: Arc::new(options),
            render_options,
        }
    }

    pub fn context(&self) -> &ItemFilterContext {
        &self.ctx
    }

    pub fn options(&self) -> &ItemFilterPrerenderOptions {
        &self.options
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.render_options
    }

    /// Expand a template into an extended document
    pub fn render(&self, template: &str) -> Result<String> {
        let env = create_environment(self.ctx.clone(), self.options.clone(), &self.render_options);
        let rendered = env.render_str(template, context! {})?;
        debug!(
            template_bytes = template.len(),
            rendered_bytes = rendered.len(),
            "template.render"
        );
        Ok(rendered)
    }

    /// Render `template` (unless `pre_rendered`) and load the result
    pub fn loads(&self, template: &str, pre_rendered: bool) -> Result<ItemFilter> {
        let document = if pre_rendered {
            template.to_string()
        } else {
            self.render(template)?
        };
        let filter = DocumentParser::parse(&document)?;
        info!(rules = filter.rules.len(), "filter.loaded");
        Ok(filter)
    }

    /// Read a template file and load it
    pub fn load(&self, path: impl AsRef<Path>) -> Result<ItemFilter> {
        let template = std::fs::read_to_string(path)?;
        self.loads(&template, false)
    }
}

/// Render a template, options defaulting to the built-in defaults scaled to `ctx`
pub fn render(
    template: &str,
    ctx: &ItemFilterContext,
    options: Option<&ItemFilterPrerenderOptions>,
    render_options: &RenderOptions,
) -> Result<String> {
    loader_for(ctx, options, render_options)?.render(template)
}

/// Render (unless `pre_rendered`) and load a template into a filter
pub fn loads(
    template: &str,
    ctx: &ItemFilterContext,
    options: Option<&ItemFilterPrerenderOptions>,
    pre_rendered: bool,
) -> Result<ItemFilter> {
    loader_for(ctx, options, &RenderOptions::default())?.loads(template, pre_rendered)
}

fn loader_for(
    ctx: &ItemFilterContext,
    options: Option<&ItemFilterPrerenderOptions>,
    render_options: &RenderOptions,
) -> Result<FilterLoader> {
    let options = match options {
        Some(options) => options.clone(),
        None => ItemFilterPrerenderOptions::with_defaults(None, Some(ctx), true)?,
    };
    Ok(FilterLoader::new(ctx.clone(), options, render_options.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wraeblast_core::Visibility;
    use wraeblast_insights::ItemTable;

    fn loader() -> FilterLoader {
        let ctx = ItemFilterContext::new().with_table(
            "currencies",
            ItemTable::from_prices([("Mirror of Kalandra", 40000.0), ("Chaos Orb", 1.0)]),
        );
        let options = ItemFilterPrerenderOptions::with_defaults(None, Some(&ctx), true).unwrap();
        FilterLoader::new(ctx, options, RenderOptions::default())
    }

    #[test]
    fn test_render_interpolates_context() {
        let rendered = loader()
            .render("{% for row in ctx.currencies %}- {{ row.item_name }}\n{% endfor %}")
            .unwrap();
        assert_eq!(rendered, "- Mirror of Kalandra\n- Chaos Orb\n");
    }

    #[test]
    fn test_loads_pre_rendered_skips_templating() {
        let document = "rules:\n  - visibility: Hide\n    name: \"{{ literal }}\"\n";
        let filter = loader().loads(document, true).unwrap();
        assert_eq!(filter.rules[0].visibility, Visibility::Hide);
        assert_eq!(filter.rules[0].name.as_deref(), Some("{{ literal }}"));
    }

    #[test]
    fn test_template_error_is_reported() {
        let err = loader().render("{% for %}").unwrap_err();
        assert!(matches!(err, crate::error::SdkError::Template(_)));
    }
}
