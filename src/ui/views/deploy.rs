use std::cell::RefCell;
use std::io::Write;

use apker::application::{DeploymentReport, MachinePlan, ProvisionEvent};
use apker::domain::ports::{DeployEvent, DeployEventSink};
use apker::domain::value_objects::ImageSource;

use crate::ui::blocks::header::CommandHeader;
use crate::ui::context::UiContext;
use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;

pub fn render_deploy_header(plan: &MachinePlan, ui: &UiContext) -> String {
    let mut header = CommandHeader::new(Icon::Deploy, "Apker Deploy");
    header.add("Machine", plan.name.as_str());
    header.add("Size", plan.size.as_str());
    header.add("Region", plan.region.as_str());
    match &plan.image {
        ImageSource::Custom { url, .. } => header.add("Image", url.as_str()),
        ImageSource::Distribution(slug) => header.add("Image", slug.as_str()),
    }
    header.render(ui.color, ui.unicode)
}

pub fn render_success(message: &str, ui: &UiContext) -> String {
    format!(
        "{} {}",
        Icon::Success.colored(ui.color, ui.unicode),
        ColoredText::dim(message).render(ui.color)
    )
}

pub fn render_failure(message: &str, ui: &UiContext) -> String {
    format!(
        "{} {}",
        Icon::Error.colored(ui.color, ui.unicode),
        ColoredText::error(message).bold().render(ui.color)
    )
}

pub fn render_resume_hint(command: &str, ui: &UiContext) -> String {
    format!(
        "{} {}",
        Icon::Wait.colored(ui.color, ui.unicode),
        ColoredText::warning(format!("You can run: '{}' when image is ready.", command))
            .render(ui.color)
    )
}

pub fn render_deploy_summary(report: &DeploymentReport, ui: &UiContext) -> String {
    format!(
        "{} {}\n  {} {} deploy steps, {} setup steps",
        Icon::Success.colored(ui.color, ui.unicode),
        ColoredText::success("Deployed successfully.").bold().render(ui.color),
        Icon::Arrow.colored(ui.color, ui.unicode),
        report.user_steps(),
        report.prelude
    )
}

/// Console view for provisioning and deploy progress
///
/// Intermediate provider statuses are shown only when they change.
pub struct ConsoleView<W: Write> {
    ui: UiContext,
    /// Image or droplet came from `--image`/`--id`, so nothing is created
    reusing: bool,
    out: RefCell<W>,
    last_status: RefCell<Option<String>>,
}

impl ConsoleView<std::io::Stdout> {
    pub fn stdout(ui: UiContext) -> Self {
        Self::with_writer(ui, std::io::stdout())
    }
}

impl<W: Write> ConsoleView<W> {
    pub fn with_writer(ui: UiContext, out: W) -> Self {
        Self {
            ui,
            reusing: false,
            out: RefCell::new(out),
            last_status: RefCell::new(None),
        }
    }

    pub fn reusing_existing(mut self, reusing: bool) -> Self {
        self.reusing = reusing;
        self
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn line(&self, text: impl AsRef<str>) {
        let mut out = self.out.borrow_mut();
        let _ = writeln!(out, "{}", text.as_ref());
        let _ = out.flush();
    }

    fn output(&self, bytes: &[u8]) {
        let text = String::from_utf8_lossy(bytes);
        let text = text.trim_end();
        if !text.is_empty() {
            self.line(text);
        }
    }

    pub fn on_provision(&self, event: &ProvisionEvent) {
        let ui = &self.ui;
        match event {
            ProvisionEvent::ImageReady { .. } => {
                if !self.reusing {
                    self.line(render_success("Droplet image created.", ui));
                }
            }
            ProvisionEvent::Progress { status } => {
                let mut last = self.last_status.borrow_mut();
                if last.as_deref() != Some(status.as_str()) {
                    *last = Some(status.clone());
                    self.line(format!(
                        "{} {}",
                        Icon::Progress.colored(ui.color, ui.unicode),
                        ColoredText::dim(format!("Current droplet status: {}", status)).render(ui.color)
                    ));
                }
            }
            ProvisionEvent::MachineReady { .. } => self.line(render_success("Droplet now ready.", ui)),
            ProvisionEvent::Failed { message } => self.line(render_failure(message, ui)),
            ProvisionEvent::TimedOut { .. } => {}
        }
    }
}

impl<W: Write> DeployEventSink for ConsoleView<W> {
    fn on_event(&self, event: DeployEvent) {
        let ui = &self.ui;
        match event {
            DeployEvent::Started { .. } => {}
            DeployEvent::StepStarted { label, .. } => {
                if ui.verbose > 0 {
                    self.line(format!(
                        "{} {}",
                        Icon::Pending.colored(ui.color, ui.unicode),
                        ColoredText::dim(label).render(ui.color)
                    ));
                }
            }
            DeployEvent::StepSucceeded { message, output, .. } => {
                self.line(render_success(&message, ui));
                self.output(&output);
            }
            DeployEvent::StepFailed { command, output, .. } => {
                self.line(render_failure(&command, ui));
                self.output(&output);
            }
            DeployEvent::HookSucceeded { label, output } => {
                self.line(render_success(&format!("Hook: {}", label), ui));
                self.output(&output);
            }
            DeployEvent::HookFailed { label, output } => {
                self.line(render_failure(&format!("Hook: {}", label), ui));
                self.output(&output);
            }
            DeployEvent::Completed { .. } => {}
        }
    }
}
