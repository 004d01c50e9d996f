//! `apker deploy`

use std::io::Stdout;
use std::path::Path;

use anyhow::Result;
use tracing::{debug, warn};

use apker::application::deploy::CONFIG_FILE;
use apker::application::provision::resume_command;
use apker::application::{
    provision, ConnectivityWaiter, DeployOptions, LifecycleHooks, MachinePlan, MonitorOutcome,
    ProvisionEvent,
};
use apker::config::{expand_size_alias, with_env_overrides, Config, DEFAULT_REGION, DEFAULT_SIZE};
use apker::domain::ports::{CloudProvider, DeployEventSink};
use apker::infrastructure::{git, JsonEventSink};
use apker::presentation::factory::{create_executor, create_provider, create_worker, session_target};
use apker::presentation::DeployArgs;
use apker::{ApkerError, ProvisionRequest};

use super::prompts;
use crate::ui::context::UiContext;
use crate::ui::output::print_config_warnings;
use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;
use crate::ui::views::deploy::{
    render_deploy_header, render_deploy_summary, render_resume_hint, ConsoleView,
};

/// Progress goes either to the console or to NDJSON, never both
enum Reporter {
    Console(ConsoleView<Stdout>),
    Json(JsonEventSink),
}

impl Reporter {
    fn new(ui: UiContext, request: ProvisionRequest) -> Self {
        if ui.json {
            Reporter::Json(JsonEventSink::stdout())
        } else {
            Reporter::Console(ConsoleView::stdout(ui).reusing_existing(request.skips_prompts()))
        }
    }

    fn on_provision(&self, event: &ProvisionEvent) {
        match self {
            Reporter::Console(view) => view.on_provision(event),
            Reporter::Json(sink) => sink.on_provision(event),
        }
    }

    fn sink(&self) -> &dyn DeployEventSink {
        match self {
            Reporter::Console(view) => view as &dyn DeployEventSink,
            Reporter::Json(sink) => sink,
        }
    }
}

/// Deploy command entry point
pub fn cmd_deploy(args: &DeployArgs, ui: UiContext) -> Result<()> {
    let request = ProvisionRequest::from_ids(args.image, args.id);

    // Everything that can be rejected locally is rejected before any
    // provider or SSH call.
    let config = load_config(&args.config, args.url.as_deref(), &ui)?;
    config.validate()?;
    let steps = config.compile_steps()?;
    let repository = repository_url(args, &config)?;

    let plan = machine_plan(args, &config, request, &ui)?;
    debug!(name = %plan.name, size = %plan.size, region = %plan.region, ?request, "machine plan");

    let reporter = Reporter::new(ui, request);
    if !ui.json {
        print!("{}", render_deploy_header(&plan, &ui));
    }

    let worker = create_worker(&config, plan)?;
    let outcome = provision(worker, request, args.timeout, |event| {
        reporter.on_provision(&event)
    })?;

    if let MonitorOutcome::TimedOut { image_id, droplet_id } = &outcome {
        let argv: Vec<String> = std::env::args().collect();
        if let Some(command) = resume_command(&argv, *image_id, *droplet_id) {
            if !ui.json {
                println!("{}", render_resume_hint(&command, &ui));
            }
        }
    }

    let Some(machine) = outcome.into_result(!args.no_timeout_error)? else {
        return Ok(());
    };

    if !ui.json {
        println!(
            "{} {}",
            Icon::Pending.colored(ui.color, ui.unicode),
            ColoredText::dim(format!("Waiting for ssh on {}:{}...", machine.address, args.ssh.port))
                .render(ui.color)
        );
    }
    ConnectivityWaiter::default().wait_for_port(&machine.address, args.ssh.port)?;

    let executor = create_executor(&session_target(&args.ssh, &machine.address))?;
    let mut options = DeployOptions::new(repository)
        .with_auth(config.repository_auth.clone())
        .with_setup(config.deploy.setup.clone())
        .with_actions(config.actions.clone())
        .with_hooks(LifecycleHooks {
            success: config.events.success.clone(),
            failure: config.events.failure.clone(),
        });
    if args.no_hooks {
        options = options.without_hooks();
    }

    let report = executor.execute(&options, &steps, reporter.sink())?;
    if !ui.json {
        println!("{}", render_deploy_summary(&report, &ui));
    }
    Ok(())
}

/// Local `apker.yaml`, or the one committed to the repository when there is
/// no local file
fn load_config(path: &Path, url: Option<&str>, ui: &UiContext) -> Result<Config> {
    if path.exists() {
        return super::load_local_config(path, ui);
    }

    let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
        // Reports the missing file.
        return super::load_local_config(path, ui);
    };

    let auth = with_env_overrides(Config::default()).repository_auth;
    let content = git::fetch_file(url, auth.as_deref(), CONFIG_FILE)?;
    let origin = Path::new(url).join(CONFIG_FILE);
    let (config, warnings) = Config::from_yaml(&content, &origin)?;
    print_config_warnings(&warnings, ui);

    let mut config = with_env_overrides(config);
    if config.deploy.repository.is_none() {
        config.deploy.repository = Some(url.to_string());
    }
    Ok(config)
}

fn repository_url(args: &DeployArgs, config: &Config) -> Result<String, ApkerError> {
    args.url
        .clone()
        .or_else(|| config.deploy.repository.clone())
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ApkerError::InvalidConfig {
            message: "repository url is required (--url or deploy.repository)".to_string(),
        })
}

/// First value given on the command line or in the config (env overrides
/// are already merged into the config)
fn first_given(cli: Option<&str>, config: Option<&str>) -> Option<String> {
    [cli, config]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

fn fallback_name() -> String {
    format!("apker-image-{}", chrono::Utc::now().timestamp())
}

fn machine_plan(
    args: &DeployArgs,
    config: &Config,
    request: ProvisionRequest,
    ui: &UiContext,
) -> Result<MachinePlan> {
    let image = config.image_source().ok_or_else(|| ApkerError::InvalidConfig {
        message: "image name or url is required (image.from)".to_string(),
    })?;

    let mut name = first_given(args.name.as_deref(), None).or_else(|| config.default_machine_name());
    let mut size = first_given(args.size.as_deref(), config.image.size.as_deref());
    let mut region = first_given(args.region.as_deref(), config.image.region.as_deref());

    // Existing images and droplets were sized when they were created.
    if !request.skips_prompts() && ui.can_prompt() {
        if args.name.is_none() {
            let default_name = name.clone().unwrap_or_else(fallback_name);
            name = Some(prompts::machine_name(&default_name, ui)?);
        }

        if size.is_none() || region.is_none() {
            let provider = create_provider(config)?;
            if size.is_none() {
                size = pick(provider.list_sizes(), "sizes", |sizes| {
                    prompts::choose_size(&sizes, DEFAULT_SIZE, ui)
                })?;
            }
            if region.is_none() {
                region = pick(provider.list_regions(), "regions", |regions| {
                    prompts::choose_region(&regions, DEFAULT_REGION, ui)
                })?;
            }
        }
    }

    Ok(MachinePlan {
        name: name.filter(|n| !n.is_empty()).unwrap_or_else(fallback_name),
        region: region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
        size: expand_size_alias(size.as_deref().unwrap_or(DEFAULT_SIZE)),
        image,
        ssh_keys: config.provider.ssh_keys.clone(),
    })
}

/// Prompt from a provider listing; a listing failure falls back to the default
fn pick<T, E: std::fmt::Display>(
    listing: Result<Vec<T>, E>,
    what: &str,
    choose: impl FnOnce(Vec<T>) -> Result<Option<String>>,
) -> Result<Option<String>> {
    match listing {
        Ok(items) => choose(items),
        Err(e) => {
            warn!(error = %e, "could not list {}, using the default", what);
            Ok(None)
        }
    }
}
