use session_cli::select::{choose, parse_choice, SelectError};

#[test]
fn parse_choice_is_one_based() {
    assert_eq!(parse_choice("1", 3), Some(0));
    assert_eq!(parse_choice(" 3 \n", 3), Some(2));
}

#[test]
fn parse_choice_rejects_out_of_range_and_garbage() {
    assert_eq!(parse_choice("0", 3), None);
    assert_eq!(parse_choice("4", 3), None);
    assert_eq!(parse_choice("-1", 3), None);
    assert_eq!(parse_choice("two", 3), None);
    assert_eq!(parse_choice("1", 0), None);
}

#[test]
fn choose_uses_preset_without_prompting() {
    let items = ["prod", "staging", "dev"];
    assert_eq!(*choose(&items, Some(2), "project").unwrap(), "staging");
}

#[test]
fn choose_reports_invalid_preset() {
    let items = ["prod"];
    match choose(&items, Some(5), "session") {
        Err(SelectError::Invalid { label, input }) => {
            assert_eq!(label, "session");
            assert_eq!(input, "5");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
