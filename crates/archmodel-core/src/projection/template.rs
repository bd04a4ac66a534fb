//! Name and value templates
//!
//! Two forms are understood:
//!
//! - literal placeholders, `{source.name} Service`, resolved directly;
//! - filter expressions, `{{ source.name | kebab }}`, handed to a
//!   `TemplateRenderer`. `FilterRenderer` is the built-in one.
//!
//! Variables live under `source.`: `id`, `type`, `layer`, `name`,
//! `name_pascal`, `name_kebab`, `name_snake`, `properties.<path>`, or a bare
//! property path. Single-brace placeholders outside `source.` are left as
//! written.

use std::fmt;

use crate::errors::{ArchModelError, Result};
use crate::model::Element;

use super::transform::{to_kebab_case, to_pascal_case, to_snake_case};

const SOURCE_PREFIX: &str = "source.";

/// Variables visible to a template
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    source: &'a Element,
}

impl<'a> TemplateContext<'a> {
    pub fn new(source: &'a Element) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &'a Element {
        self.source
    }

    /// Resolve a `source.*` variable to text
    ///
    /// Returns `None` for variables outside `source.` and for missing or null
    /// fields.
    pub fn resolve(&self, variable: &str) -> Option<String> {
        let path = variable.strip_prefix(SOURCE_PREFIX)?;
        match path {
            "name" => Some(self.source.name().to_string()),
            "name_pascal" => Some(to_pascal_case(self.source.name())),
            "name_kebab" => Some(to_kebab_case(self.source.name())),
            "name_snake" => Some(to_snake_case(self.source.name())),
            _ => self.source.field(path).map(|value| value.to_string()),
        }
    }
}

/// Rendering strategy for `{{ ... }}` templates
pub trait TemplateRenderer: fmt::Debug + Send + Sync {
    /// Render `template` against `context`
    ///
    /// # Errors
    ///
    /// `TemplateVariableMissing` when a variable has no value, and
    /// `InvalidTemplate` when the template cannot be parsed.
    fn render(&self, template: &str, context: &TemplateContext<'_>) -> Result<String>;
}

/// Resolve single-brace placeholders
///
/// # Errors
///
/// `TemplateVariableMissing` when a `source.*` placeholder has no value.
pub fn render_literal(template: &str, context: &TemplateContext<'_>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return Ok(out);
        };

        let placeholder = after[..close].trim();
        if placeholder.starts_with(SOURCE_PREFIX) {
            let value = context.resolve(placeholder).ok_or_else(|| {
                ArchModelError::TemplateVariableMissing {
                    template: template.to_string(),
                    variable: placeholder.to_string(),
                }
            })?;
            out.push_str(&value);
        } else {
            out.push_str(&rest[open..open + close + 2]);
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Render either template form, using `renderer` for `{{ ... }}` templates
pub fn render_template(
    template: &str,
    context: &TemplateContext<'_>,
    renderer: &dyn TemplateRenderer,
) -> Result<String> {
    if template.contains("{{") {
        renderer.render(template, context)
    } else {
        render_literal(template, context)
    }
}

/// Built-in renderer for `{{ source.x | filter | ... }}`
///
/// Filters: `upper`, `lower`, `kebab`, `snake`, `pascal`, `trim`, and
/// `default('text')`, which supplies a value when the variable is missing.
/// Text outside the double braces is copied unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterRenderer;

impl TemplateRenderer for FilterRenderer {
    fn render(&self, template: &str, context: &TemplateContext<'_>) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            let close = after.find("}}").ok_or_else(|| ArchModelError::InvalidTemplate {
                template: template.to_string(),
                reason: "unclosed '{{'".to_string(),
            })?;
            out.push_str(&evaluate_expression(template, &after[..close], context)?);
            rest = &after[close + 2..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

fn evaluate_expression(
    template: &str,
    expression: &str,
    context: &TemplateContext<'_>,
) -> Result<String> {
    let mut parts = expression.split('|').map(str::trim);
    let variable = parts.next().unwrap_or_default();
    if variable.is_empty() {
        return Err(ArchModelError::InvalidTemplate {
            template: template.to_string(),
            reason: "empty expression".to_string(),
        });
    }

    let mut value = context.resolve(variable);
    for filter in parts {
        let (name, arg) = parse_filter(template, filter)?;
        value = match (name, value) {
            ("default", None) => Some(arg.unwrap_or_default().to_string()),
            ("default", Some(v)) => Some(v),
            (_, None) => None,
            ("upper", Some(v)) => Some(v.to_uppercase()),
            ("lower", Some(v)) => Some(v.to_lowercase()),
            ("kebab", Some(v)) => Some(to_kebab_case(&v)),
            ("snake", Some(v)) => Some(to_snake_case(&v)),
            ("pascal", Some(v)) => Some(to_pascal_case(&v)),
            ("trim", Some(v)) => Some(v.trim().to_string()),
            (other, Some(_)) => {
                return Err(ArchModelError::InvalidTemplate {
                    template: template.to_string(),
                    reason: format!("unknown filter '{}'", other),
                })
            }
        };
    }

    value.ok_or_else(|| ArchModelError::TemplateVariableMissing {
        template: template.to_string(),
        variable: variable.to_string(),
    })
}

/// Split `name('arg')` into name and unquoted argument
fn parse_filter<'f>(template: &str, filter: &'f str) -> Result<(&'f str, Option<&'f str>)> {
    let invalid = |reason: String| ArchModelError::InvalidTemplate {
        template: template.to_string(),
        reason,
    };

    let Some(open) = filter.find('(') else {
        return match filter {
            "upper" | "lower" | "kebab" | "snake" | "pascal" | "trim" | "default" => {
                Ok((filter, None))
            }
            other => Err(invalid(format!("unknown filter '{}'", other))),
        };
    };

    let name = filter[..open].trim();
    let arg = filter[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| invalid(format!("unclosed argument in filter '{}'", filter)))?
        .trim();
    let arg = arg
        .strip_prefix('\'')
        .and_then(|a| a.strip_suffix('\''))
        .or_else(|| arg.strip_prefix('"').and_then(|a| a.strip_suffix('"')))
        .unwrap_or(arg);

    if name != "default" {
        return Err(invalid(format!("filter '{}' takes no argument", name)));
    }
    Ok((name, Some(arg)))
}
