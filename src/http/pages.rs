use anyhow::{anyhow, Result};
use axum::response::Html;
use handlebars::Handlebars;
use serde::Serialize;
use std::sync::Arc;

use crate::http::AppError;

pub const INDEX: &str = "index";
pub const ADD: &str = "add";

/// HTML templates, registered once at startup.
#[derive(Clone)]
pub struct Pages {
    registry: Arc<Handlebars<'static>>,
}

impl Pages {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);

        registry
            .register_template_string(INDEX, include_str!("../../templates/index.hbs"))
            .map_err(|err| anyhow!("cannot read template {}: {}", INDEX, err))?;
        registry
            .register_template_string(ADD, include_str!("../../templates/add.hbs"))
            .map_err(|err| anyhow!("cannot read template {}: {}", ADD, err))?;

        Ok(Self {
            registry: Arc::new(registry),
        })
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<Html<String>, AppError> {
        self.registry.render(name, data).map(Html).map_err(|err| {
            tracing::error!(error = %err, template = name, "failed to render page");
            AppError::internal(format!("execute {}: {}", name, err))
        })
    }
}
