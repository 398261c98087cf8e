use super::*;

#[test]
fn parses_run_command() {
    let cli = Cli::try_parse_from(["tubeload", "run"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Run {
            config: None,
            dry_run: false
        }
    ));
}

#[test]
fn parses_run_dry_run() {
    let cli = Cli::try_parse_from(["tubeload", "run", "--dry-run"]).unwrap();
    assert!(matches!(cli.command, Commands::Run { dry_run: true, .. }));
}

#[test]
fn parses_run_with_config_path() {
    let cli =
        Cli::try_parse_from(["tubeload", "run", "--config", "/etc/tubeload/channels.yaml"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Run {
            config: Some(ref p),
            dry_run: false
        } if p == std::path::Path::new("/etc/tubeload/channels.yaml")
    ));
}

#[test]
fn parses_check_config_command() {
    let cli = Cli::try_parse_from(["tubeload", "check-config"]).unwrap();
    assert!(matches!(cli.command, Commands::CheckConfig { config: None }));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["tubeload"]).is_err());
}

#[test]
fn unknown_flag_is_rejected() {
    assert!(Cli::try_parse_from(["tubeload", "run", "--incremental"]).is_err());
}
