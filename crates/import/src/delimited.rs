//! Line-oriented helpers for the CSV dialects: header discovery, delimiter
//! sniffing, quote-aware field splitting and header-name lookup.

use crate::util::fold;

/// Picks `;` when the header carries more semicolons than commas.
pub fn detect_delimiter(header: &str) -> u8 {
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Splits one physical line, honouring quoted fields that contain the delimiter.
pub fn split_record(line: &str, delimiter: u8) -> Result<Vec<String>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(record) => Ok(record?.iter().map(|f| f.to_string()).collect()),
        None => Ok(Vec::new()),
    }
}

/// Index of the first line whose folded text satisfies `is_header`.
pub fn find_header<F>(lines: &[&str], is_header: F) -> Option<usize>
where
    F: Fn(&str) -> bool,
{
    lines.iter().position(|line| is_header(&fold(line)))
}

/// Non-blank lines after the header, paired with their 1-based line number.
pub fn data_lines<'a>(
    lines: &'a [&'a str],
    header_idx: usize,
) -> impl Iterator<Item = (usize, &'a str)> + 'a {
    lines
        .iter()
        .enumerate()
        .skip(header_idx + 1)
        .filter(|(_, line)| !line.trim().trim_matches(|c: char| c == ',' || c == ';').is_empty())
        .map(|(idx, line)| (idx + 1, *line))
}

pub fn field(fields: &[String], idx: usize) -> &str {
    fields.get(idx).map(|f| f.as_str()).unwrap_or("")
}

/// Column lookup by (accent- and case-insensitive) header name.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    columns: Vec<String>,
}

impl HeaderIndex {
    pub fn new(fields: &[String]) -> Self {
        Self {
            columns: fields
                .iter()
                .map(|f| fold(f.trim_start_matches('\u{feff}').trim()))
                .collect(),
        }
    }

    /// Exact name match wins over substring match; earlier candidates win ties.
    pub fn find(&self, candidates: &[&str]) -> Option<usize> {
        candidates
            .iter()
            .find_map(|c| self.columns.iter().position(|col| col.as_str() == *c))
            .or_else(|| {
                candidates
                    .iter()
                    .find_map(|c| self.columns.iter().position(|col| col.contains(*c)))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_sniffing() {
        assert_eq!(detect_delimiter("a;b;c"), b';');
        assert_eq!(detect_delimiter("a,b,c"), b',');
        assert_eq!(detect_delimiter("Valor (em R$);Descrição, extra;x"), b';');
    }

    #[test]
    fn split_honours_quotes() {
        let fields = split_record(r#"02/01/2024,"Pix, recebido","1.500,00",,"#, b',').unwrap();
        assert_eq!(fields, vec!["02/01/2024", "Pix, recebido", "1.500,00", "", ""]);
    }

    #[test]
    fn split_semicolon_and_trim() {
        let fields = split_record(" 10/01/2024 ; LOJA ; 3/12 ", b';').unwrap();
        assert_eq!(fields, vec!["10/01/2024", "LOJA", "3/12"]);
    }

    #[test]
    fn split_empty_line_is_empty() {
        assert!(split_record("", b',').unwrap().is_empty());
    }

    #[test]
    fn header_scan_skips_preamble() {
        let lines = vec!["EXTRATO C6", "Agência: 1", "Data Lançamento,Título", "01/01/2024,x"];
        assert_eq!(find_header(&lines, |l| l.contains("data lancamento")), Some(2));
        assert_eq!(find_header(&lines, |l| l.contains("nada")), None);
    }

    #[test]
    fn data_lines_are_numbered_from_one_and_skip_blanks() {
        let lines = vec!["header", "a,1", "", ",,,", "b,2"];
        let got: Vec<_> = data_lines(&lines, 0).collect();
        assert_eq!(got, vec![(2, "a,1"), (5, "b,2")]);
    }

    #[test]
    fn header_index_prefers_exact_match() {
        let header: Vec<String> = ["Data de Compra", "Data", "Valor (em US$)", "Valor (em R$)"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let idx = HeaderIndex::new(&header);
        assert_eq!(idx.find(&["data"]), Some(1));
        assert_eq!(idx.find(&["data de compra"]), Some(0));
        assert_eq!(idx.find(&["valor (em r$)"]), Some(3));
        assert_eq!(idx.find(&["us$"]), Some(2));
        assert_eq!(idx.find(&["parcela"]), None);
    }
}
