use apker::domain::ports::ProviderError;
use apker::ApkerError;

use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;
use crate::ui::terminal::detect_capabilities;

fn fix_hint(err: &ApkerError) -> Option<&'static str> {
    match err {
        ApkerError::ConfigValidation(_) => Some("Fix the step in apker.yaml; nothing was created."),
        ApkerError::ConfigParse { .. } | ApkerError::InvalidConfig { .. } => {
            Some("Fix apker.yaml and run again.")
        }
        ApkerError::ConfigFetch { .. } => {
            Some("Check --url and APKER_AUTH, or pass --config with a local file.")
        }
        ApkerError::Provision(ProviderError::Unsupported(_)) => {
            Some("Set provider.credentials.API_KEY or APKER_API_KEY.")
        }
        ApkerError::Timeout { .. } => Some("Raise --timeout, or pass --no-timeout-error."),
        ApkerError::Session(_) => Some("Check --user, --key/--agent and that the machine accepts SSH."),
        _ => None,
    }
}

fn format_error_with(err: &anyhow::Error, supports_color: bool, supports_unicode: bool) -> String {
    let mut out = format!(
        "{} {}\n",
        Icon::Error.colored(supports_color, supports_unicode),
        ColoredText::error(err.to_string()).bold().render(supports_color)
    );

    let apker = err.downcast_ref::<ApkerError>();
    if let Some(ApkerError::RemoteExecution { output, .. }) = apker {
        let output = output.trim_end();
        if !output.is_empty() {
            out.push_str(output);
            out.push('\n');
        }
    }

    if let Some(hint) = apker.and_then(fix_hint) {
        out.push_str(&format!(
            "  {} {}\n",
            Icon::Arrow.colored(supports_color, supports_unicode),
            ColoredText::dim(hint).render(supports_color)
        ));
    }
    out
}

pub fn print_error(err: &anyhow::Error, json: bool) {
    if json {
        let output = serde_json::json!({
            "event": "error",
            "message": err.to_string(),
        });
        let _ = crate::ui::json::emit(output);
        return;
    }

    let caps = detect_capabilities();
    eprint!(
        "{}",
        format_error_with(err, caps.supports_color && !caps.is_ci, caps.supports_unicode)
    );
}
