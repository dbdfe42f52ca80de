/// Layout node produced from a message body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Paragraph(String),
    UnorderedList(Vec<String>),
    OrderedList(Vec<String>),
}
