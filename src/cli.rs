use crate::error::AppError;
use crate::logging::LogFormat;
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: vsr <module> [ARGS_FILE|-] [--check] [--log-format text|json] [-v|-vv]
       vsr help
       vsr version

Modules:
  host-graphics   Configure ESXi host graphics settings (alias: vmware_host_graphics)
  tag             Create, update or delete a vSphere tag (alias: vmware_tag)

ARGS_FILE is a JSON or YAML mapping of module arguments; '-' or no file reads stdin.
The result is printed to stdout as one JSON object. Logs go to stderr (VSR_LOG
overrides the level).";

/// Module to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    HostGraphics,
    Tag,
}

impl ModuleKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "host-graphics" | "vmware_host_graphics" => Some(Self::HostGraphics),
            "tag" | "vmware_tag" => Some(Self::Tag),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::HostGraphics => "host-graphics",
            Self::Tag => "tag",
        }
    }
}

/// A module run as requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub module: ModuleKind,
    /// `None` reads the arguments from stdin.
    pub args_file: Option<PathBuf>,
    pub check: bool,
    pub log_format: LogFormat,
    pub verbosity: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Invocation),
    Help,
    Version,
}

/// Parse CLI arguments (without the program name).
pub fn parse_args(args: &[&str]) -> Result<Command, AppError> {
    let Some(first) = args.first() else {
        return Err(AppError::Usage("No module specified. Run 'vsr help' for usage.".into()));
    };

    match *first {
        "help" | "--help" | "-h" => return Ok(Command::Help),
        "version" | "--version" | "-V" => return Ok(Command::Version),
        _ => {}
    }

    let module = ModuleKind::from_name(first)
        .ok_or_else(|| AppError::Usage(format!("Unknown module: '{first}'")))?;
    let mut inv = Invocation {
        module,
        args_file: None,
        check: false,
        log_format: LogFormat::Text,
        verbosity: 0,
    };
    let mut positional: Option<&str> = None;

    let rest = &args[1..];
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            "--check" | "-C" => inv.check = true,
            "-v" | "--verbose" => inv.verbosity = inv.verbosity.saturating_add(1),
            "-vv" => inv.verbosity = inv.verbosity.saturating_add(2),
            "-vvv" => inv.verbosity = inv.verbosity.saturating_add(3),
            "--log-format" => {
                i += 1;
                inv.log_format = parse_log_format(take_arg(rest, i, "--log-format")?)?;
            }
            flag if flag.starts_with("--log-format=") => {
                inv.log_format = parse_log_format(&flag["--log-format=".len()..])?;
            }
            "-" => set_positional(&mut positional, "-")?,
            flag if flag.starts_with('-') => {
                return Err(AppError::Usage(format!("Unknown flag for {}: '{flag}'", module.name())));
            }
            path => set_positional(&mut positional, path)?,
        }
        i += 1;
    }

    inv.args_file = positional.filter(|p| *p != "-").map(PathBuf::from);
    Ok(Command::Run(inv))
}

fn take_arg<'a>(args: &[&'a str], i: usize, flag: &str) -> Result<&'a str, AppError> {
    args.get(i)
        .copied()
        .ok_or_else(|| AppError::Usage(format!("Missing value for {flag}")))
}

fn set_positional<'a>(slot: &mut Option<&'a str>, value: &'a str) -> Result<(), AppError> {
    if slot.is_some() {
        return Err(AppError::Usage("Only one arguments file may be given".into()));
    }
    *slot = Some(value);
    Ok(())
}

fn parse_log_format(s: &str) -> Result<LogFormat, AppError> {
    match s {
        "text" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        other => Err(AppError::Usage(format!(
            "Invalid --log-format '{other}' (expected text or json)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(args: &[&str]) -> Invocation {
        match parse_args(args).unwrap() {
            Command::Run(inv) => inv,
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn module_with_file_and_flags() {
        let inv = run(&["vmware_host_graphics", "args.yaml", "--check", "-vv", "--log-format", "json"]);
        assert_eq!(inv.module, ModuleKind::HostGraphics);
        assert_eq!(inv.args_file, Some(PathBuf::from("args.yaml")));
        assert!(inv.check);
        assert_eq!(inv.verbosity, 2);
        assert_eq!(inv.log_format, LogFormat::Json);
    }

    #[test]
    fn dash_or_nothing_means_stdin() {
        assert_eq!(run(&["tag"]).args_file, None);
        assert_eq!(run(&["tag", "-"]).args_file, None);
        assert_eq!(run(&["tag", "--log-format=text", "-"]).log_format, LogFormat::Text);
    }

    #[test]
    fn repeated_verbose_flags_saturate() {
        let flags: Vec<&str> = std::iter::once("tag").chain(std::iter::repeat("-vvv").take(100)).collect();
        assert_eq!(run(&flags).verbosity, u8::MAX);
    }

    #[test]
    fn help_and_version() {
        assert_eq!(parse_args(&["help"]).unwrap(), Command::Help);
        assert_eq!(parse_args(&["--version"]).unwrap(), Command::Version);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&[]).is_err());
        assert!(parse_args(&["vm_power"]).is_err());
        assert!(parse_args(&["tag", "a.yaml", "b.yaml"]).is_err());
        assert!(parse_args(&["tag", "--log-format"]).is_err());
        assert!(parse_args(&["tag", "--log-format", "xml"]).is_err());
        let err = parse_args(&["tag", "--force"]).unwrap_err();
        assert_eq!(err.to_string(), "Unknown flag for tag: '--force'");
        assert_eq!(err.exit_code(), 2);
    }
}
