use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["bizdir"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
    assert!(!cli.json);
}

#[test]
fn search_term_is_optional() {
    let cli = Cli::try_parse_from(["bizdir", "search"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Search { term: None })));

    let cli = Cli::try_parse_from(["bizdir", "search", "pizza"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Search { term: Some(ref t) }) if t == "pizza"
    ));
}

#[test]
fn json_flag_is_global() {
    let cli = Cli::try_parse_from(["bizdir", "list", "--json"]).unwrap();
    assert!(cli.json);
    assert!(matches!(cli.command, Some(Commands::List)));

    let cli = Cli::try_parse_from(["bizdir", "--json", "category", "Cafe"]).unwrap();
    assert!(cli.json);
}

#[test]
fn category_with_spaces_and_symbols() {
    let cli = Cli::try_parse_from(["bizdir", "category", "Fast-Food & Casual"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Category { ref category }) if category == "Fast-Food & Casual"
    ));
}

#[test]
fn show_requires_an_id() {
    assert!(Cli::try_parse_from(["bizdir", "show"]).is_err());
    let cli = Cli::try_parse_from(["bizdir", "show", "Joe's%20Cafe"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Show { ref id }) if id == "Joe's%20Cafe"
    ));
}

#[test]
fn apply_collects_repeated_keywords_and_addresses() {
    let cli = Cli::try_parse_from([
        "bizdir",
        "apply",
        "--name",
        "Joe's Cafe",
        "--category",
        "Cafe",
        "--keyword",
        "coffee",
        "--keyword",
        "tea",
        "--address",
        "1 Main St",
        "--extra-address",
        "9 Elm Ave",
        "--image",
        "photo.jpg",
    ])
    .unwrap();

    match cli.command {
        Some(Commands::Apply {
            name,
            keywords,
            extra_addresses,
            image,
            image_url,
            ..
        }) => {
            assert_eq!(name, "Joe's Cafe");
            assert_eq!(keywords, vec!["coffee", "tea"]);
            assert_eq!(extra_addresses, vec!["9 Elm Ave"]);
            assert_eq!(image, Some(PathBuf::from("photo.jpg")));
            assert_eq!(image_url, None);
        }
        other => panic!("expected apply, got {other:?}"),
    }
}

#[test]
fn apply_requires_name_category_and_address() {
    assert!(Cli::try_parse_from(["bizdir", "apply", "--name", "X", "--category", "Y"]).is_err());
}

#[test]
fn parses_review_add() {
    let cli = Cli::try_parse_from([
        "bizdir", "review", "add", "--business", "b1", "--rating", "4.5", "--text", "Lovely",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Review {
            command: ReviewCommands::Add {
                ref business,
                ref rating,
                author: None,
                ..
            }
        }) if business == "b1" && rating == "4.5"
    ));
}

#[test]
fn parses_review_list() {
    let cli = Cli::try_parse_from(["bizdir", "review", "list", "--business", "b1"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Review {
            command: ReviewCommands::List { ref business }
        }) if business.as_deref() == Some("b1")
    ));
}

#[test]
fn parses_review_list_without_business() {
    let cli = Cli::try_parse_from(["bizdir", "review", "list"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Review {
            command: ReviewCommands::List { business: None }
        })
    ));
}

#[test]
fn parses_pending_commands() {
    let cli = Cli::try_parse_from(["bizdir", "pending", "list"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Pending {
            command: PendingCommands::List
        })
    ));

    let cli = Cli::try_parse_from(["bizdir", "pending", "flush"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Pending {
            command: PendingCommands::Flush
        })
    ));
}

#[test]
fn truncate_marks_long_text() {
    assert_eq!(browse::truncate("Short", 10), "Short");
    assert_eq!(browse::truncate("A very long business name", 10), "A very ...");
}

#[test]
fn long_ids_do_not_shift_the_table_columns() {
    let record = bizdir_core::BusinessRecord {
        id: Some("Joe%27s%20Cafe%20and%20Bakery%20on%20Main%20Street".to_owned()),
        name: Some("Joe's Cafe".to_owned()),
        category: Some("Coffee Shop".to_owned()),
        address: Some("1 Main St".to_owned()),
        ..bizdir_core::BusinessRecord::default()
    };
    let row = browse::record_row(&record);
    assert_eq!(row.find("Joe's Cafe"), Some(32));
    assert_eq!(row.find("Coffee Shop"), Some(64));
    assert!(row.ends_with("1 Main St"));
}
