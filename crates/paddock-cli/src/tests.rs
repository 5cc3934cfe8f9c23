use super::*;

#[test]
fn parses_seed_with_default_calendar() {
    let cli = Cli::try_parse_from(["paddock", "seed"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Seed { calendar: None }));
}

#[test]
fn parses_seed_with_calendar_override() {
    let cli = Cli::try_parse_from(["paddock", "seed", "--calendar", "other.yaml"])
        .expect("expected valid cli args");
    match cli.command {
        Commands::Seed { calendar: Some(path) } => {
            assert_eq!(path, PathBuf::from("other.yaml"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_plan_command() {
    let cli = Cli::try_parse_from(["paddock", "plan"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Plan));
}

#[test]
fn parses_trigger_with_category_year_and_round() {
    let cli = Cli::try_parse_from([
        "paddock", "trigger", "race", "--year", "2025", "--round", "4",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Trigger {
            category: TriggerKind::Race,
            year: 2025,
            round: 4
        }
    ));
}

#[test]
fn rejects_unknown_trigger_category() {
    let result = Cli::try_parse_from([
        "paddock", "trigger", "sprint", "--year", "2025", "--round", "4",
    ]);
    assert!(result.is_err());
}

#[test]
fn trigger_requires_year_and_round() {
    let result = Cli::try_parse_from(["paddock", "trigger", "race"]);
    assert!(result.is_err());
}
