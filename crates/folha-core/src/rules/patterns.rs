//! Common regex patterns for time card and pay slip extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Month marker shared by both layouts: "Mês/Ano: 01/2024"
    pub static ref MONTH_YEAR: Regex = Regex::new(
        r"(?i)(?:m[êe]s|month)/ano:\s*(\d{2}/\d{4})"
    ).unwrap();

    // Day line start: "03 SEG"
    pub static ref DAY_START: Regex = Regex::new(
        r"(\d{1,2})\s+(SAB|DOM|SEG|TER|QUA|QUI|SEX)"
    ).unwrap();

    // OCR output loses case and keeps the accented Saturday
    pub static ref DAY_START_OCR: Regex = Regex::new(
        r"(?i)(\d{1,2})\s+(SÁB|SAB|DOM|SEG|TER|QUA|QUI|SEX)"
    ).unwrap();

    pub static ref REST_DAY: Regex = Regex::new(
        r"(?i)descanso\s+semanal|feriado"
    ).unwrap();

    // "09:50 - 16:06", also glued "09:50-16:06"
    pub static ref TIME_INTERVAL: Regex = Regex::new(
        r"(\d{2}:\d{2})\s*-\s*(\d{2}:\d{2})"
    ).unwrap();

    pub static ref NUMERIC_TOKEN: Regex = Regex::new(
        r"\d+(?:,\d+)?"
    ).unwrap();

    pub static ref FUNCTION_CODE: Regex = Regex::new(
        r"\d{3}"
    ).unwrap();

    pub static ref SITUATION_CODE: Regex = Regex::new(
        r"(?:^|[^\p{L}])([SN])$"
    ).unwrap();

    // Pay slip metadata
    pub static ref EMPLOYEE: Regex = Regex::new(
        r"(?i)funcion[áa]rio:\s*([^\n\r]+)"
    ).unwrap();

    // Labels that end a free-text field in flattened OCR text
    pub static ref FIELD_LABEL: Regex = Regex::new(
        r"(?i)(?:m[êe]s|month)/ano|\bcpf\b|\bcargo\b|matr[íi]cula|admiss[ãa]o|per[íi]odo"
    ).unwrap();

    // Line item: code + description + quantity + value, e.g. "0020Horas Normais183,25 11,12"
    pub static ref PAYROLL_ITEM: Regex = Regex::new(
        r"([A-Z0-9/]{3,4})([A-Za-z\s.\-ÁÉÍÓÚáéíóúÂÊÎÔÛâêîôûÀÈÌÒÙàèìòùÃÕãõÇç]+?)(\d+(?:\.\d{3})*(?:,\d+)?)\s+(\d+(?:\.\d{3})*(?:,\d+)?)"
    ).unwrap();

    // OCR variant: optional letter prefix, digits-only code, loose spacing
    pub static ref PAYROLL_ITEM_OCR: Regex = Regex::new(
        r"(?i)([A-Z]?/?\d{3,4})\s*([A-Za-z\s.\-ÁÉÍÓÚáéíóúÂÊÎÔÛâêîôûÀÈÌÒÙàèìòùÃÕãõÇç]+?)\s*(\d+(?:\.\d{3})*(?:,\d+)?)\s+(\d+(?:\.\d{3})*(?:,\d+)?)"
    ).unwrap();

    // "TOTAL ......... 2.037,74 350,00"
    pub static ref TOTAL_LINE: Regex = Regex::new(
        r"(?i)\bTOTAL\b[\s.:]*(\d+(?:\.\d{3})*(?:,\d+)?)\s+(\d+(?:\.\d{3})*(?:,\d+)?)"
    ).unwrap();

    // Decimal punctuation: digits, separator, exactly two digits, then a boundary
    pub static ref DECIMAL_PUNCTUATION: Regex = Regex::new(
        r"([0-9]+)[,.]([0-9]{2})([^0-9A-Za-zÁÉÍÓÚáéíóúÂÊÎÔÛâêîôûÀÈÌÒÙàèìòùÃÕãõÇç]|$)"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_year_variants() {
        for text in ["Mês/Ano: 01/2024", "MÊS/ANO:01/2024", "Mes/Ano: 01/2024", "Month/Ano: 01/2024"] {
            let caps = MONTH_YEAR.captures(text).unwrap();
            assert_eq!(&caps[1], "01/2024", "{text}");
        }
        assert!(MONTH_YEAR.captures("Mês/Ano: 1/24").is_none());
    }

    #[test]
    fn test_time_interval_glued() {
        let found: Vec<_> = TIME_INTERVAL
            .captures_iter("03 SEG09:50 - 16:0613:45 - 14:00")
            .map(|c| (c[1].to_string(), c[2].to_string()))
            .collect();

        assert_eq!(
            found,
            vec![
                ("09:50".to_string(), "16:06".to_string()),
                ("13:45".to_string(), "14:00".to_string()),
            ]
        );
    }

    #[test]
    fn test_total_line() {
        let caps = TOTAL_LINE.captures("TOTAL ......... 2.037,74 350,00").unwrap();
        assert_eq!(&caps[1], "2.037,74");
        assert_eq!(&caps[2], "350,00");

        assert!(TOTAL_LINE.captures("Totalizador 10,00 5,00").is_none());
    }

    #[test]
    fn test_situation_code_is_standalone() {
        assert_eq!(&SITUATION_CODE.captures("610100S").unwrap()[1], "S");
        assert_eq!(&SITUATION_CODE.captures("8,00 N").unwrap()[1], "N");
        assert!(SITUATION_CODE.captures("HORAS").is_none());
    }
}
