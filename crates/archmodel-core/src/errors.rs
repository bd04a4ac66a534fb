use thiserror::Error;

/// Result type alias using ArchModelError
pub type Result<T> = std::result::Result<T, ArchModelError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and reporting by command handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    AlreadyExists,
    UnknownLayer,

    // Projection
    NoApplicableRule,
    MissingRequiredProperty,
    TemplateRender,

    // Rule / config loading
    RuleLoad,
    InvalidRule,
    InvalidPattern,
    InvalidConfig,

    // Integration/IO
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::UnknownLayer => "ERR_UNKNOWN_LAYER",
            ExErrorKind::NoApplicableRule => "ERR_NO_APPLICABLE_RULE",
            ExErrorKind::MissingRequiredProperty => "ERR_MISSING_REQUIRED_PROPERTY",
            ExErrorKind::TemplateRender => "ERR_TEMPLATE_RENDER",
            ExErrorKind::RuleLoad => "ERR_RULE_LOAD",
            ExErrorKind::InvalidRule => "ERR_INVALID_RULE",
            ExErrorKind::InvalidPattern => "ERR_INVALID_PATTERN",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether this kind is raised while loading rules or configuration
    ///
    /// Load errors happen once, offline, and are never recovered from.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            ExErrorKind::RuleLoad
                | ExErrorKind::InvalidRule
                | ExErrorKind::InvalidPattern
                | ExErrorKind::InvalidConfig
                | ExErrorKind::UnknownLayer
                | ExErrorKind::Io
                | ExErrorKind::Serialization
        )
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and context for
/// debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    rule: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            rule: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add element ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add projection rule context
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the element ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the rule context, if any
    pub fn rule(&self) -> Option<&str> {
        self.rule.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (element_id: {})", entity_id)?;
        }
        if let Some(rule) = &self.rule {
            write!(f, " (rule: {})", rule)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for reference analysis and projection
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArchModelError {
    // ===== Validation Errors =====
    /// No projection rule matches the source element and target layer
    #[error("No applicable projection rule for element {element_id} to layer {target_layer}")]
    NoApplicableRule {
        element_id: String,
        target_layer: String,
    },

    /// A required property mapping resolved to nothing and has no default
    #[error("Rule {rule}: required property '{target}' has no value (source '{source_path}')")]
    RequiredPropertyMissing {
        rule: String,
        source_path: String,
        target: String,
    },

    /// A template placeholder could not be resolved against the source element
    #[error("Template '{template}' references unknown variable '{variable}'")]
    TemplateVariableMissing { template: String, variable: String },

    /// A template is syntactically malformed
    #[error("Invalid template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// Projection would create an element whose ID is already in the model
    #[error("Element already exists: {element_id}")]
    ElementAlreadyExists { element_id: String },

    /// A layer name is not one of the twelve architecture layers
    #[error("Unknown layer: {layer}")]
    UnknownLayer { layer: String },

    // ===== Load Errors =====
    /// The rule file is structurally malformed
    #[error("Failed to load projection rules: {reason}")]
    RuleLoad { reason: String },

    /// A single projection entry is malformed
    #[error("Invalid projection rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    /// A `matches` condition carries a pattern that does not compile
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Configuration could not be parsed
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // ===== Integration Errors =====
    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<ArchModelError> for ExError {
    fn from(err: ArchModelError) -> Self {
        match err {
            ArchModelError::NoApplicableRule {
                element_id,
                target_layer,
            } => ExError::new(ExErrorKind::NoApplicableRule)
                .with_entity_id(element_id)
                .with_message(format!("No rule projects to layer {}", target_layer)),

            ArchModelError::RequiredPropertyMissing {
                rule,
                source_path,
                target,
            } => ExError::new(ExErrorKind::MissingRequiredProperty)
                .with_rule(rule)
                .with_message(format!(
                    "Required property '{}' resolved to no value from '{}'",
                    target, source_path
                )),

            ArchModelError::TemplateVariableMissing { template, variable } => {
                ExError::new(ExErrorKind::TemplateRender).with_message(format!(
                    "Unknown variable '{}' in template '{}'",
                    variable, template
                ))
            }

            ArchModelError::InvalidTemplate { template, reason } => {
                ExError::new(ExErrorKind::TemplateRender)
                    .with_message(format!("Invalid template '{}': {}", template, reason))
            }

            ArchModelError::ElementAlreadyExists { element_id } => {
                ExError::new(ExErrorKind::AlreadyExists)
                    .with_entity_id(element_id)
                    .with_message("Element already exists")
            }

            ArchModelError::UnknownLayer { layer } => ExError::new(ExErrorKind::UnknownLayer)
                .with_message(format!("Unknown layer: {}", layer)),

            ArchModelError::RuleLoad { reason } => ExError::new(ExErrorKind::RuleLoad)
                .with_op("load_rules")
                .with_message(reason),

            ArchModelError::InvalidRule { rule, reason } => ExError::new(ExErrorKind::InvalidRule)
                .with_op("load_rules")
                .with_rule(rule)
                .with_message(reason),

            ArchModelError::InvalidPattern { pattern, reason } => {
                ExError::new(ExErrorKind::InvalidPattern)
                    .with_message(format!("Pattern '{}' does not compile: {}", pattern, reason))
            }

            ArchModelError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(reason)
            }

            ArchModelError::Io { message } => ExError::new(ExErrorKind::Io).with_message(message),

            ArchModelError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            ArchModelError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<serde_yaml::Error> for ArchModelError {
    fn from(err: serde_yaml::Error) -> Self {
        ArchModelError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ArchModelError {
    fn from(err: serde_json::Error) -> Self {
        ArchModelError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ArchModelError {
    fn from(err: toml::de::Error) -> Self {
        ArchModelError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ArchModelError {
    fn from(err: std::io::Error) -> Self {
        ArchModelError::Io {
            message: err.to_string(),
        }
    }
}

impl From<archmodel_core_types::UnknownLayer> for ArchModelError {
    fn from(err: archmodel_core_types::UnknownLayer) -> Self {
        ArchModelError::UnknownLayer { layer: err.0 }
    }
}
