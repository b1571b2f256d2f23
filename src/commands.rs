//! Command pipeline.
//!
//! One invocation runs, in order: service lookup, listing commands, resource
//! and URI resolution, optional history replay, header setup, body assembly
//! and mutation, printing, a single network call, and one history append.

use crate::auth::basic_auth_from_arg;
use crate::body::{apply_replacements, read_address, AddressError, Replacement};
use crate::config::{resolve_service, ConfigError};
use crate::executor::{self, RequestError};
use crate::formatter::{format_json_safe, format_value};
use crate::history::{format_history_list, History, HistoryEntry, HistoryError, StoreOutcome};
use crate::models::{HttpMethod, PreparedRequest};
use crate::resources::{ResourceError, DEFAULT_TEMPLATE};
use crate::services::{format_service_line, Home, Service, ServiceError};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

/// Timeout used for requests sent without a service.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Editor used when `$EDITOR` is not set.
pub const DEFAULT_EDITOR: &str = "vi";

/// Scratch file the body is edited in, under the service directory or home.
pub const EDIT_FILE: &str = ".tmpbody";

/// Errors that end an invocation.
#[derive(Debug)]
pub enum CommandError {
    Config(ConfigError),
    Address(AddressError),
    Resource(ResourceError),
    History(HistoryError),
    Request(RequestError),
    Service(ServiceError),
    Io(io::Error),

    /// Neither a resource argument nor a history entry to replay was given.
    MissingResource,

    /// A service-only option was used without `--service`.
    ServiceRequired(&'static str),

    /// The method is not one restcli can send.
    UnsupportedMethod(String),

    /// A `-H` argument is not `name:value`.
    InvalidHeader(String),

    /// A `-u` argument is not `user:password`.
    InvalidCredentials,

    /// The editor could not be run or exited with failure.
    Editor(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Config(err) => write!(f, "{}", err),
            CommandError::Address(err) => write!(f, "{}", err),
            CommandError::Resource(err) => write!(f, "{}", err),
            CommandError::History(err) => write!(f, "{}", err),
            CommandError::Request(err) => write!(f, "{}", err),
            CommandError::Service(err) => write!(f, "{}", err),
            CommandError::Io(err) => write!(f, "IO error: {}", err),
            CommandError::MissingResource => write!(f, "Required resource/URI not given"),
            CommandError::ServiceRequired(flag) => {
                write!(f, "{} requires the --service argument", flag)
            }
            CommandError::UnsupportedMethod(method) => {
                write!(f, "Unsupported HTTP method: {}", method)
            }
            CommandError::InvalidHeader(header) => {
                write!(f, "Invalid header '{}': expected name:value", header)
            }
            CommandError::InvalidCredentials => {
                write!(f, "Invalid credentials: expected user:password")
            }
            CommandError::Editor(msg) => write!(f, "Editor failed: {}", msg),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Config(err) => Some(err),
            CommandError::Address(err) => Some(err),
            CommandError::Resource(err) => Some(err),
            CommandError::History(err) => Some(err),
            CommandError::Request(err) => Some(err),
            CommandError::Service(err) => Some(err),
            CommandError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        CommandError::Config(err)
    }
}

impl From<AddressError> for CommandError {
    fn from(err: AddressError) -> Self {
        CommandError::Address(err)
    }
}

impl From<ResourceError> for CommandError {
    fn from(err: ResourceError) -> Self {
        CommandError::Resource(err)
    }
}

impl From<HistoryError> for CommandError {
    fn from(err: HistoryError) -> Self {
        CommandError::History(err)
    }
}

impl From<RequestError> for CommandError {
    fn from(err: RequestError) -> Self {
        CommandError::Request(err)
    }
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        CommandError::Service(err)
    }
}

impl From<io::Error> for CommandError {
    fn from(err: io::Error) -> Self {
        CommandError::Io(err)
    }
}

/// Everything one invocation was asked to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    /// Relative resource path (with a service) or absolute URI.
    pub resource: Option<String>,
    pub method: Option<String>,
    /// `name:value` header overrides.
    pub headers: Vec<String>,
    /// `user:password` Basic credentials.
    pub user: Option<String>,
    /// With PUT, GET the resource first and use it as the body.
    pub get: bool,
    /// Literal body, or `@path` to read it from a file.
    pub data: Option<String>,
    pub edit: bool,
    /// `name=value` body replacements, applied in order.
    pub replacements: Vec<String>,
    /// Address of the response field to print instead of the whole body.
    pub output: Option<String>,
    pub print_only: bool,
    pub print: bool,
    pub history: bool,
    /// Recency index of the history entry to replay; 0 disables replay.
    pub last: usize,
    pub install_service: Option<PathBuf>,
    pub service: Option<String>,
    pub list_services: bool,
    pub template: Option<String>,
    pub list_templates: bool,
    pub uriprefix: Option<String>,
    pub resources: bool,
}

/// Body before mutation: either text as given, or a JSON document.
#[derive(Debug, Clone, PartialEq)]
enum RawBody {
    Text(String),
    Json(JsonValue),
}

/// Runs one invocation.
///
/// # Arguments
///
/// * `options` - Parsed command line
/// * `home` - The restcli home directory
/// * `lookup` - Environment lookup for service headers, URI prefix and `$EDITOR`
/// * `out` - Sink for responses and listings
///
/// # Errors
///
/// Configuration, addressing and indexed history failures abort before
/// anything is sent. A non-success status is returned as
/// `RequestError::ResponseError` after the request has been recorded.
pub async fn execute<F, W>(
    options: &CommandOptions,
    home: &Home,
    lookup: F,
    out: &mut W,
) -> Result<(), CommandError>
where
    F: Fn(&str) -> Option<String>,
    W: Write,
{
    if let Some(path) = &options.install_service {
        let config = home.install(path)?;
        writeln!(out, "Installed service {}", config.name)?;
        return Ok(());
    }

    if options.list_services {
        for (name, description) in home.list()? {
            writeln!(out, "{}", format_service_line(&name, &description))?;
        }
        return Ok(());
    }

    let service = match &options.service {
        Some(name) => Some(home.open_service(name)?),
        None => {
            require_service_options(options)?;
            None
        }
    };

    if let Some(service) = &service {
        if options.resources {
            for line in service.config.resources.help_lines() {
                writeln!(out, "{}", line)?;
            }
            return Ok(());
        }
        if options.list_templates {
            let resource = options
                .resource
                .as_deref()
                .ok_or(CommandError::MissingResource)?;
            for name in service.config.resources.require(resource)?.template_names() {
                writeln!(out, "{}", name)?;
            }
            return Ok(());
        }
    }

    let history = match &service {
        Some(service) => service.history.clone(),
        None => home.generic_history()?,
    };

    if options.history {
        for line in format_history_list(history.items(false)) {
            writeln!(out, "{}", line)?;
        }
        return Ok(());
    }

    let replayed = if options.last > 0 {
        Some(history.get(options.last)?)
    } else {
        None
    };

    let resource = options
        .resource
        .clone()
        .or_else(|| replayed.as_ref().map(|entry| entry.resource.clone()))
        .ok_or(CommandError::MissingResource)?;

    let method_name = options
        .method
        .clone()
        .or_else(|| replayed.as_ref().map(|entry| entry.method.clone()))
        .unwrap_or_else(|| HttpMethod::GET.to_string());
    let method = HttpMethod::parse(&method_name)
        .ok_or_else(|| CommandError::UnsupportedMethod(method_name.clone()))?;

    let resolved = service
        .as_ref()
        .map(|service| resolve_service(&service.config, &lookup))
        .unwrap_or_default();
    let prefix = options.uriprefix.as_deref().or(resolved.uri_prefix.as_deref());
    let uri = build_uri(&resource, prefix)?;

    let mut request = PreparedRequest {
        method,
        uri,
        resource,
        headers: BTreeMap::new(),
        body: None,
    };
    for (name, value) in &resolved.headers {
        request.set_header(name, value);
    }
    for header in &options.headers {
        let (name, value) = parse_header(header)?;
        request.set_header(name, value);
    }
    if let Some(user) = &options.user {
        let value = basic_auth_from_arg(user).ok_or(CommandError::InvalidCredentials)?;
        request.set_header("Authorization", &value);
    }

    let timeout = service
        .as_ref()
        .map(|service| service.config.timeout_duration())
        .unwrap_or(DEFAULT_TIMEOUT);

    let raw = assemble_body(options, service.as_ref(), &request, replayed.as_ref(), timeout).await?;
    let mut body = finish_body(raw, options, service.as_ref(), &request.resource)?;

    if options.edit {
        if let Some(text) = body.take() {
            let dir = service
                .as_ref()
                .map(|service| service.dir.as_path())
                .unwrap_or_else(|| home.root());
            let editor = lookup("EDITOR").filter(|e| !e.is_empty());
            body = Some(edit_body(
                &dir.join(EDIT_FILE),
                &text,
                editor.as_deref().unwrap_or(DEFAULT_EDITOR),
            )?);
        }
    }
    request.body = body;

    if options.print_only || options.print {
        writeln!(out, "{}", request.display())?;
        if options.print_only {
            return Ok(());
        }
    }

    let response = executor::send(&request, timeout).await?;
    record(&history, &request);

    if !response.is_success() {
        return Err(RequestError::ResponseError {
            status: response.status_code,
            body: format_json_safe(&response.body),
        }
        .into());
    }

    if response.body.is_empty() {
        return Ok(());
    }
    match &options.output {
        Some(address) => {
            let document = response.json().map_err(AddressError::from)?;
            writeln!(out, "{}", format_value(read_address(&document, address)?))?;
        }
        None => writeln!(out, "{}", format_json_safe(&response.body))?,
    }
    Ok(())
}

/// Builds the absolute URI for a resource.
///
/// A resource starting with `http` is already absolute. Otherwise it is
/// joined to `prefix` with exactly one `/`.
///
/// # Examples
///
/// ```
/// use restcli::commands::build_uri;
///
/// let uri = build_uri("groups/1", Some("https://as.example.com/v1.0/123/")).unwrap();
/// assert_eq!(uri, "https://as.example.com/v1.0/123/groups/1");
/// assert_eq!(build_uri("http://x/y", None).unwrap(), "http://x/y");
/// ```
pub fn build_uri(resource: &str, prefix: Option<&str>) -> Result<String, CommandError> {
    if resource.starts_with("http") {
        return Ok(resource.to_string());
    }
    let prefix = prefix.ok_or_else(|| {
        ConfigError::Invalid(format!(
            "no URI prefix to expand relative resource '{}' (use --uriprefix)",
            resource
        ))
    })?;
    Ok(format!("{}/{}", prefix.trim_end_matches('/'), resource))
}

/// Splits a `name:value` header argument on its first colon.
pub fn parse_header(arg: &str) -> Result<(&str, &str), CommandError> {
    let (name, value) = arg
        .split_once(':')
        .ok_or_else(|| CommandError::InvalidHeader(arg.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CommandError::InvalidHeader(arg.to_string()));
    }
    Ok((name, value.trim()))
}

fn require_service_options(options: &CommandOptions) -> Result<(), CommandError> {
    let flag = if options.template.is_some() {
        "--template"
    } else if options.list_templates {
        "--list-templates"
    } else if options.uriprefix.is_some() {
        "--uriprefix"
    } else if options.resources {
        "--resources"
    } else {
        return Ok(());
    };
    Err(CommandError::ServiceRequired(flag))
}

/// Picks the body source: data, template, GET-before-PUT, then replay.
async fn assemble_body(
    options: &CommandOptions,
    service: Option<&Service>,
    request: &PreparedRequest,
    replayed: Option<&HistoryEntry>,
    timeout: Duration,
) -> Result<Option<RawBody>, CommandError> {
    if let Some(data) = &options.data {
        let text = match data.strip_prefix('@') {
            Some(path) => fs::read_to_string(path)?,
            None => data.clone(),
        };
        return Ok(Some(RawBody::Text(text)));
    }

    if let Some(name) = &options.template {
        let service = service.ok_or(CommandError::ServiceRequired("--template"))?;
        let name = if name.is_empty() { DEFAULT_TEMPLATE } else { name };
        let template = service
            .config
            .resources
            .template(&request.resource, Some(name))?;
        return Ok(Some(RawBody::Json(template.clone())));
    }

    if options.get && request.method == HttpMethod::PUT {
        let get = PreparedRequest {
            method: HttpMethod::GET,
            body: None,
            ..request.clone()
        };
        let response = executor::send(&get, timeout).await?;
        if response.status_code != 200 {
            return Err(RequestError::ResponseError {
                status: response.status_code,
                body: format_json_safe(&response.body),
            }
            .into());
        }
        let document = response.json().map_err(AddressError::from)?;
        return Ok(Some(RawBody::Json(document)));
    }

    Ok(replayed
        .and_then(|entry| entry.body.clone())
        .map(RawBody::Text))
}

/// Applies replacements and serialises the body.
///
/// Text bodies are passed through untouched unless a replacement applies.
/// An empty text body counts as no body.
fn finish_body(
    raw: Option<RawBody>,
    options: &CommandOptions,
    service: Option<&Service>,
    resource: &str,
) -> Result<Option<String>, CommandError> {
    let raw = match raw {
        Some(RawBody::Text(text)) if text.is_empty() => None,
        other => other,
    };
    let raw = match raw {
        Some(raw) => raw,
        None => {
            if !options.replacements.is_empty() {
                log::warn!("no request body to apply replacements to");
            }
            return Ok(None);
        }
    };

    if options.replacements.is_empty() {
        return Ok(Some(match raw {
            RawBody::Text(text) => text,
            RawBody::Json(value) => format_value(&value),
        }));
    }

    let replacements = options
        .replacements
        .iter()
        .map(|arg| Replacement::parse(arg))
        .collect::<Result<Vec<_>, _>>()?;

    let mut document = match raw {
        RawBody::Text(text) => serde_json::from_str(&text).map_err(AddressError::from)?,
        RawBody::Json(value) => value,
    };
    let aliases = service
        .and_then(|service| service.config.resources.match_resource(resource))
        .and_then(|definition| definition.aliases());
    apply_replacements(&mut document, &replacements, aliases)?;
    Ok(Some(format_value(&document)))
}

/// Lets the user edit `body` in `editor`, returning the saved text.
fn edit_body(path: &Path, body: &str, editor: &str) -> Result<String, CommandError> {
    fs::write(path, body)?;
    let status = process::Command::new(editor)
        .arg(path)
        .status()
        .map_err(|e| CommandError::Editor(format!("{}: {}", editor, e)))?;
    if !status.success() {
        return Err(CommandError::Editor(format!("{} exited with {}", editor, status)));
    }
    Ok(fs::read_to_string(path)?)
}

fn record(history: &History, request: &PreparedRequest) {
    match history.store(
        request.method.as_str(),
        &request.resource,
        request.body.as_deref(),
    ) {
        Ok(StoreOutcome::Stored(sequence)) => {
            log::debug!("recorded request as history entry {}", sequence)
        }
        Ok(StoreOutcome::Duplicate) => {}
        Err(e) => log::warn!("request not recorded in history: {}", e),
    }
}
