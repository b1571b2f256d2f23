//! Command-line surface.
//!
//! [`Args`] is the clap model of the command line; [`run`] turns it into
//! [`CommandOptions`] and executes it against the real environment.

use crate::commands::{execute, CommandError, CommandOptions};
use crate::services::Home;
use clap::Parser;
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "restcli")]
#[command(
    version,
    about = "CLI to access JSON-based RESTful services",
    after_help = "Service options (--template, --list-templates, --uriprefix, --resources) need --service."
)]
pub struct Args {
    /// HTTP resource after the URI prefix when used with --service, otherwise an HTTP URI
    #[arg(value_name = "RESOURCE/URI")]
    pub resource: Option<String>,

    /// HTTP header. Can be used multiple times
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// HTTP Basic authentication credentials
    #[arg(short, long, value_name = "USER:PASSWORD")]
    pub user: Option<String>,

    /// HTTP method to apply on the resource. Defaults to GET
    #[arg(short, long)]
    pub method: Option<String>,

    /// With PUT, GET the resource and use it as body
    #[arg(long)]
    pub get: bool,

    /// Request body. Prefix with @ to read it from a file
    #[arg(short, long)]
    pub data: Option<String>,

    /// Edit request body before sending. Uses $EDITOR
    #[arg(short, long)]
    pub edit: bool,

    /// Replace JSON body part with new value. Can be used multiple times
    #[arg(short = 'r', long = "replace", value_name = "BODY_PART=VALUE")]
    pub replacements: Vec<String>,

    /// Output specific part of JSON response body
    #[arg(short, long, value_name = "BODY_PART")]
    pub output: Option<String>,

    /// Only print request going to be sent. Does not send
    #[arg(long)]
    pub print_only: bool,

    /// Print request before sending
    #[arg(long)]
    pub print: bool,

    /// List requests sent, newest first
    #[arg(long)]
    pub history: bool,

    /// Replay the Nth most recent request from history. N defaults to 1
    #[arg(
        short,
        long,
        value_name = "N",
        num_args = 0..=1,
        default_value_t = 0,
        default_missing_value = "1"
    )]
    pub last: usize,

    /// Install the service described in the config file
    #[arg(long, value_name = "CONFIG")]
    pub install_service: Option<PathBuf>,

    /// Installed service to use
    #[arg(short, long)]
    pub service: Option<String>,

    /// List installed services
    #[arg(long)]
    pub list_services: bool,

    /// Use a template of the resource as request body. Defaults to "default"
    #[arg(
        short,
        long,
        value_name = "NAME",
        num_args = 0..=1,
        default_missing_value = "default"
    )]
    pub template: Option<String>,

    /// List templates of the given resource
    #[arg(long)]
    pub list_templates: bool,

    /// URI prefix overriding the configured one
    #[arg(long)]
    pub uriprefix: Option<String>,

    /// List resources of the service
    #[arg(long)]
    pub resources: bool,

    /// Log debug diagnostics to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl From<Args> for CommandOptions {
    fn from(args: Args) -> Self {
        Self {
            resource: args.resource,
            method: args.method,
            headers: args.headers,
            user: args.user,
            get: args.get,
            data: args.data,
            edit: args.edit,
            replacements: args.replacements,
            output: args.output,
            print_only: args.print_only,
            print: args.print,
            history: args.history,
            last: args.last,
            install_service: args.install_service,
            service: args.service,
            list_services: args.list_services,
            template: args.template,
            list_templates: args.list_templates,
            uriprefix: args.uriprefix,
            resources: args.resources,
        }
    }
}

/// Runs the parsed command line against the process environment, writing
/// to stdout.
pub async fn run(args: Args, home: &Home) -> Result<(), CommandError> {
    let options = CommandOptions::from(args);
    let mut stdout = io::stdout();
    execute(&options, home, |name| std::env::var(name).ok(), &mut stdout).await
}
