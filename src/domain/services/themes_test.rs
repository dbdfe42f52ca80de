use super::Themes;
use super::DEFAULT_THEME;

#[test]
fn it_lists_sorted_themes() {
    let themes = Themes::list();
    assert!(themes.contains(&DEFAULT_THEME.to_string()));

    let mut sorted = themes.clone();
    sorted.sort();
    assert_eq!(themes, sorted);
}

#[test]
fn it_gets_default_theme() {
    assert!(Themes::get(DEFAULT_THEME).is_ok());
}

#[test]
fn it_fails_on_unknown_theme() {
    let res = Themes::get("not-a-theme");
    assert_eq!(
        res.unwrap_err().to_string(),
        "Theme not-a-theme does not exist"
    );
}
