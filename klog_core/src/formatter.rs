//! Turns a message into the bytes handed to a backend.
//!
//! Terminal and file backends receive
//! `<prefix> <label> <message>\n`, optionally wrapped in the severity color,
//! where the prefix is the user prefix followed by the date/time and caller
//! location selected by the flags. The remote store receives
//! `<label>\t<message>` with no decoration at all.

use crate::{BackendKind, FormatFlags, Severity};
use chrono::{DateTime, Local};
use std::fmt::{self, Write};
use std::panic::Location;
use yansi::{Condition, Paint};

/// What the caller asked to log
#[derive(Clone, Copy)]
pub enum Message<'a> {
    /// Values rendered with `Display` and joined by single spaces
    Values(&'a [&'a dyn fmt::Display]),
    /// A `format_args!` template
    Format(fmt::Arguments<'a>),
}

impl fmt::Display for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Values(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
            Message::Format(args) => f.write_fmt(*args),
        }
    }
}

/// Logger configuration read by a single emission
#[derive(Clone, Debug)]
pub(crate) struct Settings {
    pub level: Severity,
    pub flags: FormatFlags,
    pub prefix: String,
    pub color_enabled: bool,
}

/// User prefix, then date/time and caller location as enabled by the flags
pub(crate) fn decoration_prefix(
    settings: &Settings,
    location: Option<&Location<'_>>,
    now: DateTime<Local>,
) -> String {
    let mut prefix = settings.prefix.clone();
    let flags = settings.flags;

    let layout = match (
        flags.contains(FormatFlags::DATE),
        flags.contains(FormatFlags::TIME),
    ) {
        (true, true) => Some("%Y/%m/%d %H:%M:%S"),
        (true, false) => Some("%Y/%m/%d"),
        (false, true) => Some("%H:%M:%S"),
        (false, false) => None,
    };
    if let Some(layout) = layout {
        let _ = write!(prefix, "{}", now.format(layout));
    }

    if flags.contains(FormatFlags::SHORTFILE) {
        match location {
            Some(location) => {
                let _ = write!(prefix, " {}:{}", basename(location.file()), location.line());
            }
            None => prefix.push_str(" <unknown>:-1"),
        }
    }

    prefix
}

fn basename(file: &str) -> &str {
    file.rsplit(['/', '\\']).next().unwrap_or(file)
}

/// Label plus message, e.g. `[INFO] server started`. Only a message with
/// no values at all is the bare label; an empty rendering keeps the space.
fn labeled(severity: Severity, message: &Message<'_>) -> String {
    match message {
        Message::Values(values) if values.is_empty() => severity.label().to_string(),
        _ => format!("{} {}", severity.label(), message),
    }
}

/// Build the full record for `kind`. The level gate is the caller's job.
pub(crate) fn format_record(
    settings: &Settings,
    kind: BackendKind,
    severity: Severity,
    message: &Message<'_>,
    location: Option<&Location<'_>>,
    now: DateTime<Local>,
) -> String {
    if kind == BackendKind::RemoteStore {
        return format!("{}\t{}", severity.label(), message);
    }

    let mut body = labeled(severity, message);
    if !body.ends_with('\n') {
        body.push('\n');
    }
    if settings.color_enabled && settings.flags.contains(FormatFlags::COLOR) {
        body = body
            .as_str()
            .paint(severity.color())
            .whenever(Condition::ALWAYS)
            .to_string();
    }

    format!("{} {}", decoration_prefix(settings, location, now), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn settings(flags: FormatFlags) -> Settings {
        Settings {
            level: Severity::Debug,
            flags,
            prefix: String::new(),
            color_enabled: true,
        }
    }

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
    }

    #[test]
    fn test_prefix_date_and_time_layouts() {
        let now = fixed_now();
        assert_eq!(
            decoration_prefix(&settings(FormatFlags::DATETIME), None, now),
            "2024/03/05 14:07:09"
        );
        assert_eq!(
            decoration_prefix(&settings(FormatFlags::DATE), None, now),
            "2024/03/05"
        );
        assert_eq!(
            decoration_prefix(&settings(FormatFlags::TIME), None, now),
            "14:07:09"
        );
        assert_eq!(decoration_prefix(&settings(FormatFlags::empty()), None, now), "");
    }

    #[test]
    fn test_prefix_starts_with_user_prefix() {
        let mut s = settings(FormatFlags::DATE);
        s.prefix = "api ".into();
        assert_eq!(decoration_prefix(&s, None, fixed_now()), "api 2024/03/05");
    }

    #[test]
    fn test_prefix_caller_location_is_basename() {
        let location = Location::caller();
        let prefix = decoration_prefix(&settings(FormatFlags::SHORTFILE), Some(location), fixed_now());

        assert_eq!(prefix, format!(" formatter.rs:{}", location.line()));
    }

    #[test]
    fn test_prefix_unknown_caller() {
        let prefix = decoration_prefix(&settings(FormatFlags::SHORTFILE), None, fixed_now());
        assert_eq!(prefix, " <unknown>:-1");
    }

    #[test]
    fn test_basename_strips_both_separators() {
        assert_eq!(basename("src/bin/main.rs"), "main.rs");
        assert_eq!(basename(r"src\bin\main.rs"), "main.rs");
        assert_eq!(basename("main.rs"), "main.rs");
    }

    #[test]
    fn test_values_joined_with_spaces() {
        let record = format_record(
            &settings(FormatFlags::empty()),
            BackendKind::Console,
            Severity::Info,
            &Message::Values(&[&"took", &42, &"ms"]),
            None,
            fixed_now(),
        );
        assert_eq!(record, " [INFO] took 42 ms\n");
    }

    #[test]
    fn test_template_substitution() {
        let record = format_record(
            &settings(FormatFlags::empty()),
            BackendKind::File,
            Severity::Error,
            &Message::Format(format_args!("{} of {:>3}", 7, 9)),
            None,
            fixed_now(),
        );
        assert_eq!(record, " [ERROR] 7 of   9\n");
    }

    #[test]
    fn test_empty_message_is_bare_label() {
        let record = format_record(
            &settings(FormatFlags::empty()),
            BackendKind::Console,
            Severity::Debug,
            &Message::Values(&[]),
            None,
            fixed_now(),
        );
        assert_eq!(record, " [DEBUG]\n");
    }

    #[test]
    fn test_empty_rendering_keeps_separator() {
        let empty_template = format_record(
            &settings(FormatFlags::empty()),
            BackendKind::Console,
            Severity::Info,
            &Message::Format(format_args!("{}", "")),
            None,
            fixed_now(),
        );
        assert_eq!(empty_template, " [INFO] \n");

        let empty_value = format_record(
            &settings(FormatFlags::empty()),
            BackendKind::Console,
            Severity::Info,
            &Message::Values(&[&""]),
            None,
            fixed_now(),
        );
        assert_eq!(empty_value, " [INFO] \n");
    }

    #[test]
    fn test_trailing_newline_not_duplicated() {
        let record = format_record(
            &settings(FormatFlags::empty()),
            BackendKind::Console,
            Severity::Info,
            &Message::Values(&[&"done\n"]),
            None,
            fixed_now(),
        );
        assert_eq!(record, " [INFO] done\n");
    }

    #[test]
    fn test_color_needs_flag_and_enable() {
        let values: [&dyn fmt::Display; 1] = [&"x"];
        let message = Message::Values(&values);

        let colored = format_record(
            &settings(FormatFlags::COLOR),
            BackendKind::Console,
            Severity::Warning,
            &message,
            None,
            fixed_now(),
        );
        assert!(colored.contains("\x1b["));
        assert!(colored.contains("[WARN] x\n"));

        let no_flag = format_record(
            &settings(FormatFlags::DATETIME | FormatFlags::SHORTFILE),
            BackendKind::Console,
            Severity::Warning,
            &message,
            None,
            fixed_now(),
        );
        assert!(!no_flag.contains('\x1b'));

        let mut disabled = settings(FormatFlags::COLOR);
        disabled.color_enabled = false;
        let not_enabled = format_record(
            &disabled,
            BackendKind::Console,
            Severity::Warning,
            &message,
            None,
            fixed_now(),
        );
        assert!(!not_enabled.contains('\x1b'));
    }

    #[test]
    fn test_store_record_has_no_decoration() {
        let record = format_record(
            &settings(FormatFlags::VERBOSE),
            BackendKind::RemoteStore,
            Severity::Warning,
            &Message::Values(&[&"disk", &"full"]),
            Some(Location::caller()),
            fixed_now(),
        );
        assert_eq!(record, "[WARN]\tdisk full");
    }
}
