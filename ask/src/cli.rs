// ask/src/cli.rs
//! Command-line arguments for `dbin-ask`.
use ask_common::Config;
use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "dbin-ask", bin_name = "dbin-ask")]
pub struct CliArgs {
    /// Install request, e.g. dbin://ask/install/tool%23stable
    #[arg(value_name = "URI")]
    pub uri: String,

    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short, long, help = "Install without asking for confirmation")]
    pub yes: bool,

    #[arg(long, value_name = "PATH", help = "Package manager executable to drive")]
    pub tool: Option<String>,

    #[arg(long, value_name = "SCHEME", help = "URI scheme accepted for install requests")]
    pub scheme: Option<String>,

    #[arg(long, help = "Do not download the package icon and screenshots")]
    pub no_resources: bool,
}

impl CliArgs {
    /// Flags win over environment configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(tool) = &self.tool {
            config.tool = tool.clone();
        }
        if let Some(scheme) = &self.scheme {
            config.scheme = scheme.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    #[test]
    fn parses_uri_and_flags() {
        let args =
            CliArgs::try_parse_from(["dbin-ask", "-vv", "--yes", "dbin://ask/install/tool"]).unwrap();
        assert_eq!(args.uri, "dbin://ask/install/tool");
        assert_eq!(args.verbose, 2);
        assert!(args.yes);
        assert!(!args.no_resources);
    }

    #[test]
    fn uri_is_required() {
        assert!(CliArgs::try_parse_from(["dbin-ask"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let args = CliArgs::try_parse_from([
            "dbin-ask",
            "--tool",
            "/usr/local/bin/dbin",
            "--scheme",
            "pkg",
            "pkg://ask/install/tool",
        ])
        .unwrap();
        let mut config = base_config();
        args.apply_to(&mut config);
        assert_eq!(config.tool(), "/usr/local/bin/dbin");
        assert_eq!(config.scheme(), "pkg");

        let args = CliArgs::try_parse_from(["dbin-ask", "dbin://ask/install/tool"]).unwrap();
        let mut config = base_config();
        args.apply_to(&mut config);
        assert_eq!(config.tool(), "dbin");
    }
}
