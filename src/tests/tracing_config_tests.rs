use super::*;

#[test]
fn test_format_names() {
    assert_eq!(LogFormat::parse("tree"), LogFormat::Tree);
    assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
    assert_eq!(LogFormat::parse(" Tree "), LogFormat::Tree);
    assert_eq!(LogFormat::parse("text"), LogFormat::Text);
}

#[test]
fn test_unknown_format_falls_back_to_text() {
    assert_eq!(LogFormat::parse(""), LogFormat::Text);
    assert_eq!(LogFormat::parse("yaml"), LogFormat::Text);
    assert_eq!(LogFormat::default(), LogFormat::Text);
}
