//! Markdown tables.

/// A Markdown table built row by row.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Add a row; missing cells are left blank, extra cells dropped.
    pub fn row(&mut self, cells: Vec<String>) -> &mut Self {
        let mut cells = cells;
        cells.resize(self.headers.len(), String::new());
        self.rows.push(cells);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("| {} |\n", self.headers.iter().map(|h| escape(h)).collect::<Vec<_>>().join(" | ")));
        output.push_str(&format!("|{}|\n", vec!["---"; self.headers.len()].join("|")));
        for row in &self.rows {
            output.push_str(&format!("| {} |\n", row.iter().map(|c| escape(c)).collect::<Vec<_>>().join(" | ")));
        }
        output
    }
}

/// Escape pipes and flatten newlines so a value stays in its cell.
pub fn escape(value: &str) -> String {
    value.replace('|', "\\|").replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_markdown() {
        let mut table = Table::new(&["Name", "Zone"]);
        table.row(vec!["web".to_string(), "a|b".to_string()]);
        table.row(vec!["db".to_string()]);

        assert_eq!(
            table.to_markdown(),
            "| Name | Zone |\n|---|---|\n| web | a\\|b |\n| db |  |\n"
        );
    }
}
