#[cfg(test)]
#[path = "formatter_test.rs"]
mod tests;

use crate::domain::models::Block;

#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered,
}

fn bullet_item(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('-')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    return Some(rest.trim());
}

fn numbered_item(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    let rest = trimmed[digits..].strip_prefix('.')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    return Some(rest.trim());
}

fn flush(blocks: &mut Vec<Block>, list: &mut Option<(ListKind, Vec<String>)>) {
    if let Some((kind, items)) = list.take() {
        match kind {
            ListKind::Unordered => blocks.push(Block::UnorderedList(items)),
            ListKind::Ordered => blocks.push(Block::OrderedList(items)),
        }
    }
}

/// Splits a message body into paragraphs and lists. Lines starting with `- `
/// are bullet items, lines starting with `N. ` are numbered items. Runs of the
/// same kind form one list; a blank line or a different kind of line ends it.
pub fn format_text(text: &str) -> Vec<Block> {
    let mut blocks: Vec<Block> = vec![];
    let mut list: Option<(ListKind, Vec<String>)> = None;

    for raw_line in text.split('\n') {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);

        let item = bullet_item(line)
            .map(|e| return (ListKind::Unordered, e))
            .or_else(|| return numbered_item(line).map(|e| return (ListKind::Ordered, e)));

        if let Some((kind, item_text)) = item {
            if !matches!(&list, Some((current, _)) if *current == kind) {
                flush(&mut blocks, &mut list);
                list = Some((kind, vec![]));
            }
            if let Some((_, items)) = list.as_mut() {
                items.push(item_text.to_string());
            }
            continue;
        }

        flush(&mut blocks, &mut list);
        if !line.trim().is_empty() {
            blocks.push(Block::Paragraph(line.to_string()));
        }
    }
    flush(&mut blocks, &mut list);

    return blocks;
}

/// Turns blocks back into display lines. Ordered lists are renumbered from
/// one, and a blank line separates blocks.
pub fn render_blocks(blocks: &[Block]) -> Vec<String> {
    let mut lines: Vec<String> = vec![];

    for block in blocks {
        if !lines.is_empty() {
            lines.push("".to_string());
        }

        match block {
            Block::Paragraph(text) => lines.push(text.to_string()),
            Block::UnorderedList(items) => {
                lines.extend(items.iter().map(|item| return format!("• {item}")));
            }
            Block::OrderedList(items) => {
                lines.extend(
                    items
                        .iter()
                        .enumerate()
                        .map(|(idx, item)| return format!("{}. {item}", idx + 1)),
                );
            }
        }
    }

    return lines;
}

/// Markdown-style text for blocks, where the bullet marker is `- ` so the
/// result formats back into the same blocks.
pub fn blocks_to_text(blocks: &[Block]) -> String {
    return blocks
        .iter()
        .map(|block| {
            match block {
                Block::Paragraph(text) => return text.to_string(),
                Block::UnorderedList(items) => {
                    return items
                        .iter()
                        .map(|item| return format!("- {item}"))
                        .collect::<Vec<String>>()
                        .join("\n");
                }
                Block::OrderedList(items) => {
                    return items
                        .iter()
                        .enumerate()
                        .map(|(idx, item)| return format!("{}. {item}", idx + 1))
                        .collect::<Vec<String>>()
                        .join("\n");
                }
            }
        })
        .collect::<Vec<String>>()
        .join("\n\n");
}
