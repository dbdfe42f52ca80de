use crate::configuration::Config;
use crate::configuration::ConfigKey;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Author {
    User,
    Assistant,
    Natter,
}

impl ToString for Author {
    fn to_string(&self) -> String {
        match self {
            Author::User => return Config::get(ConfigKey::Username),
            Author::Assistant => return String::from("Assistant"),
            Author::Natter => return String::from("Natter"),
        }
    }
}
