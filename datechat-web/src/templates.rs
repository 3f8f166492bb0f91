//! HTML rendering with handlebars templates embedded in the binary.

use crate::error::WebError;
use crate::flow::View;
use handlebars::Handlebars;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout", include_str!("../templates/layout.hbs")),
    ("api_key", include_str!("../templates/api_key.hbs")),
    ("chat", include_str!("../templates/chat.hbs")),
];

/// Renders [`View`]s to HTML. Values are HTML-escaped.
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self, WebError> {
        let mut registry = Handlebars::new();
        for (name, source) in TEMPLATES {
            registry.register_template_string(name, *source)?;
        }
        Ok(Self { registry })
    }

    pub fn render(&self, view: &View) -> Result<String, WebError> {
        let name = view.template_name();
        let html = match view {
            View::ApiKey(page) => self.registry.render(name, page)?,
            View::Chat(page) => self.registry.render(name, page)?,
        };
        Ok(html)
    }
}
