use std::io::Read;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use temporal_engine::{
    build_recurrence_with, expand_recurring_windows, resolve_duration, resolve_instant,
    resolve_search_window, DefaultTimePolicy, DurationHint, PartialDateSpec, RecurrenceDescriptor,
    RecurrenceOptions, RruleMaterializer,
};
use tracing::debug;

use crate::cli::Command;
use crate::config::CliConfig;

/// Settings shared by every command after flag / env / file precedence.
#[derive(Debug, Clone)]
pub struct Settings {
    pub timezone: String,
    pub config: CliConfig,
}

impl Settings {
    fn recurrence_options(&self, max_occurrences: Option<u16>) -> RecurrenceOptions {
        RecurrenceOptions {
            max_occurrences: max_occurrences.unwrap_or(self.config.max_occurrences),
        }
    }
}

/// Run one subcommand and return its JSON output.
pub fn run(command: Command, settings: &Settings) -> Result<Value> {
    match command {
        Command::Instant { now, policy, input } => {
            let spec: PartialDateSpec = read_json(input.as_deref())?;
            let policy = policy.unwrap_or(settings.config.default_time_policy);
            instant(&spec, &current_time(now), &settings.timezone, policy)
        }
        Command::Window { now, old, target } => {
            let old = old.as_deref().map(|s| parse_spec(s, "--old")).transpose()?;
            let target = target.as_deref().map(|s| parse_spec(s, "--target")).transpose()?;
            let window = resolve_search_window(
                old.as_ref(),
                target.as_ref(),
                &current_time(now),
                &settings.timezone,
            )
            .context("failed to resolve search window")?;
            Ok(serde_json::to_value(window)?)
        }
        Command::Recur {
            max_occurrences,
            input,
        } => {
            let descriptor: RecurrenceDescriptor = read_json(input.as_deref())?;
            let built = build_recurrence_with(
                &descriptor,
                &settings.timezone,
                &settings.recurrence_options(max_occurrences),
                &RruleMaterializer,
            )
            .context("failed to build recurrence")?;
            Ok(serde_json::to_value(built)?)
        }
        Command::Windows {
            start,
            end,
            max_occurrences,
            input,
        } => {
            let descriptor: RecurrenceDescriptor = read_json(input.as_deref())?;
            let windows = expand_recurring_windows(
                &start,
                &end,
                &descriptor,
                &settings.timezone,
                &settings.recurrence_options(max_occurrences),
            )
            .context("failed to expand recurring windows")?;
            Ok(serde_json::to_value(windows)?)
        }
        Command::Duration { input } => {
            let hint: DurationHint = read_json(input.as_deref())?;
            let minutes = resolve_duration(&hint).context("failed to resolve duration")?;
            Ok(json!({ "minutes": minutes }))
        }
    }
}

fn instant(
    spec: &PartialDateSpec,
    now: &str,
    timezone: &str,
    policy: DefaultTimePolicy,
) -> Result<Value> {
    debug!(%now, %timezone, %policy, "Resolving instant");
    let instant =
        resolve_instant(spec, now, timezone, policy).context("failed to resolve instant")?;
    Ok(json!({ "instant": instant }))
}

/// `--now`, or the system clock in UTC.
fn current_time(now: Option<String>) -> String {
    now.unwrap_or_else(|| {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        debug!(%now, "No --now given, using system clock");
        now
    })
}

fn parse_spec(s: &str, flag: &str) -> Result<PartialDateSpec> {
    serde_json::from_str(s).with_context(|| format!("invalid JSON for {flag}"))
}

/// Read and parse a JSON document from a file, or stdin for `None` / `-`.
fn read_json<T: DeserializeOwned>(input: Option<&str>) -> Result<T> {
    let (content, source) = match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            (buf, "stdin".to_string())
        }
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read input: {path}"))?;
            (content, path.to_string())
        }
    };
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {source}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(timezone: &str) -> Settings {
        Settings {
            timezone: timezone.to_string(),
            config: CliConfig::default(),
        }
    }

    #[test]
    fn window_from_inline_specs() {
        let value = run(
            Command::Window {
                now: Some("2024-06-01T09:00".to_string()),
                old: Some(r#"{"day":"10"}"#.to_string()),
                target: Some("{}".to_string()),
            },
            &settings("UTC"),
        )
        .unwrap();
        assert_eq!(value, json!({"startDate": "2024-06-09", "endDate": "2024-07-07"}));
    }

    #[test]
    fn window_rejects_bad_inline_json() {
        let err = run(
            Command::Window {
                now: Some("2024-06-01T09:00".to_string()),
                old: Some("{day:".to_string()),
                target: None,
            },
            &settings("UTC"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("--old"), "got: {err}");
    }

    #[test]
    fn flag_cap_overrides_config_cap() {
        let settings = settings("UTC");
        assert_eq!(settings.recurrence_options(None).max_occurrences, 730);
        assert_eq!(settings.recurrence_options(Some(5)).max_occurrences, 5);
    }

    #[test]
    fn current_time_prefers_flag() {
        assert_eq!(current_time(Some("2024-01-01T00:00".to_string())), "2024-01-01T00:00");
        assert!(current_time(None).ends_with('Z'));
    }
}
