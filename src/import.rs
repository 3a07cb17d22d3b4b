//! Seed import of item collections from exported material lists.
//!
//! Two text formats are understood:
//!
//! - Material-list tables, one row per item:
//!   `| Item Name | Total | Missing | Available |`
//! - Quoted lists, one `"Name",Count` per line; a `✅` on the line marks
//!   the item as already complete.

use crate::types::{Collection, Item};

const HEADER_NAME: &str = "Item";
const TITLE_PREFIX: &str = "Material List for";
const DONE_MARK: char = '✅';

/// Parse a material-list table. Header, separator and malformed rows are
/// skipped. Every item starts with nothing gathered.
pub fn parse_material_list(text: &str) -> Collection {
    text.lines().filter_map(parse_table_row).collect()
}

/// Parse a quoted `"Name",Count` list.
pub fn parse_quoted_list(text: &str) -> Collection {
    text.lines()
        .filter_map(|line| {
            let (name, target) = parse_quoted_line(line)?;
            let mut item = Item::new(name, target);
            if line.contains(DONE_MARK) {
                item.gathered = target;
            }
            Some(item)
        })
        .collect()
}

fn parse_table_row(line: &str) -> Option<Item> {
    let body = line.trim_start().strip_prefix('|')?;
    let mut cells = body.split('|');

    let name = cells.next()?.trim();
    let total = parse_count(cells.next()?)?;
    // Missing and Available must be present and numeric, but are unused.
    parse_count(cells.next()?)?;
    parse_count(cells.next()?)?;
    // A closing pipe is required.
    cells.next()?;

    if name.is_empty() || name == HEADER_NAME || name.starts_with(TITLE_PREFIX) {
        return None;
    }

    Some(Item::new(name, total))
}

fn parse_count(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if cell.is_empty() || !cell.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    cell.parse().ok()
}

/// First `"Name"` followed by an optional comma and a count.
fn parse_quoted_line(line: &str) -> Option<(String, i64)> {
    let quotes: Vec<usize> = line.match_indices('"').map(|(i, _)| i).collect();

    for pair in quotes.windows(2) {
        let name = &line[pair[0] + 1..pair[1]];
        if name.is_empty() {
            continue;
        }

        let rest = line[pair[1] + 1..].trim_start();
        let rest = rest.strip_prefix(',').unwrap_or(rest).trim_start();
        let digits_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
        if digits_len == 0 {
            continue;
        }

        if let Ok(count) = rest[..digits_len].parse() {
            return Some((name.to_string(), count));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
+------------------------------------------------------------------+
| Material List for schematic 'Mountain - Fixed' (1 of 1 regions)  |
+------------------------------------------------------------------+
| Item                  | Total | Missing | Available |
+-----------------------+-------+---------+-----------+
| Stone Bricks          | 1024  | 1024    | 0         |
| Spruce Stairs         | 87    | 80      | 7         |
| Lantern               | 12    | 12      | 0         |
+-----------------------+-------+---------+-----------+
| Item                  | Total | Missing | Available |
";

    #[test]
    fn test_material_list_rows() {
        let items = parse_material_list(TABLE);
        let summary: Vec<_> = items.iter().map(|i| (i.name.as_str(), i.target, i.gathered)).collect();
        assert_eq!(
            summary,
            vec![("Stone Bricks", 1024, 0), ("Spruce Stairs", 87, 0), ("Lantern", 12, 0)]
        );
        assert!(items.iter().all(|i| i.claims.is_empty()));
    }

    #[test]
    fn test_material_list_skips_malformed() {
        let items = parse_material_list("| Torch | lots | 3 | 1 |\n| Torch | 4 | 3 |\nnot a row");
        assert!(items.is_empty());
    }

    #[test]
    fn test_quoted_list() {
        let text = "\"Oak Log\",64\n\"Glass Pane\" 32 ✅\nrandom note\n\"Torch\" , 8\n";
        let items = parse_quoted_list(text);

        assert_eq!(items.len(), 3);
        assert_eq!((items[0].name.as_str(), items[0].target, items[0].gathered), ("Oak Log", 64, 0));
        assert_eq!((items[1].name.as_str(), items[1].target, items[1].gathered), ("Glass Pane", 32, 32));
        assert_eq!((items[2].name.as_str(), items[2].target), ("Torch", 8));
    }

    #[test]
    fn test_quoted_list_later_pair_matches() {
        let items = parse_quoted_list("see \"notes\" then \"Chain\",5");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Chain");
        assert_eq!(items[0].target, 5);
    }
}
